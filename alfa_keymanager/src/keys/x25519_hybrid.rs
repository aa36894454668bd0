//! Szyfrowanie hybrydowe: X25519 + HKDF-SHA256 + AEAD (DEM)
//!
//! Szyfrogram: klucz efemeryczny (32 B) || DEM ciphertext || tag.
//! Klucz i nonce DEM = HKDF(salt, eph_pub || shared_secret, context_info).

use std::fmt;

use secrecy::{ExposeSecret, SecretBox};
use serde::{Deserialize, Serialize};
use x25519_dalek::{PublicKey as X25519PublicKey, StaticSecret};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use super::{to_array32, validate_len};
use crate::codec::KeyProto;
use crate::crypto::{derive_subkey, random_array, AeadCipher, AeadCore, TAG_LEN};
use crate::error::{KeyManagerError, Result};
use crate::key_data::KeyMaterialType;
use crate::primitive::{HybridDecrypt, HybridEncrypt};
use crate::typed::{
    validate_version, KeyTypeFactory, KeyTypeManager, OutputOnlyKeyManager, PrivateKeyManagerImpl,
    PrivateKeyTypeManager,
};

pub const X25519_HYBRID_PRIVATE_KEY_TYPE: &str =
    "type.alfa.dev/alfa.keymanager.X25519HybridPrivateKey";
pub const X25519_HYBRID_PUBLIC_KEY_TYPE: &str =
    "type.alfa.dev/alfa.keymanager.X25519HybridPublicKey";
pub const X25519_HYBRID_KEY_FORMAT_TYPE: &str =
    "type.alfa.dev/alfa.keymanager.X25519HybridKeyFormat";

const POINT_LEN: usize = 32;

/// Parametry KEM/DEM
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HybridParams {
    #[serde(with = "crate::codec::base64_bytes")]
    pub hkdf_salt: Vec<u8>,
    pub dem: AeadCipher,
}

impl Default for HybridParams {
    fn default() -> Self {
        Self::aes256_gcm()
    }
}

impl HybridParams {
    pub fn aes256_gcm() -> Self {
        Self {
            hkdf_salt: Vec::new(),
            dem: AeadCipher::Aes256Gcm,
        }
    }

    pub fn xchacha20_poly1305() -> Self {
        Self {
            hkdf_salt: Vec::new(),
            dem: AeadCipher::XChaCha20Poly1305,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct X25519HybridPublicKey {
    pub version: u32,
    pub params: HybridParams,
    #[serde(with = "crate::codec::base64_bytes")]
    pub key_value: Vec<u8>,
}

impl KeyProto for X25519HybridPublicKey {
    const TYPE_URL: &'static str = X25519_HYBRID_PUBLIC_KEY_TYPE;
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(deny_unknown_fields)]
pub struct X25519HybridPrivateKey {
    pub version: u32,
    #[serde(with = "crate::codec::base64_bytes")]
    pub key_value: Vec<u8>,
    #[zeroize(skip)]
    pub public_key: X25519HybridPublicKey,
}

impl fmt::Debug for X25519HybridPrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("X25519HybridPrivateKey")
            .field("version", &self.version)
            .field("key_value", &format_args!("<{} bytes redacted>", self.key_value.len()))
            .field("public_key", &self.public_key)
            .finish()
    }
}

impl KeyProto for X25519HybridPrivateKey {
    const TYPE_URL: &'static str = X25519_HYBRID_PRIVATE_KEY_TYPE;
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct X25519HybridKeyFormat {
    pub params: HybridParams,
    #[serde(default)]
    pub version: u32,
}

impl X25519HybridKeyFormat {
    pub fn new(params: HybridParams) -> Self {
        Self { params, version: 0 }
    }
}

impl KeyProto for X25519HybridKeyFormat {
    const TYPE_URL: &'static str = X25519_HYBRID_KEY_FORMAT_TYPE;
}

/// Klucz i nonce DEM z sekretu współdzielonego
fn derive_dem(
    params: &HybridParams,
    ephemeral_public: &[u8],
    shared_secret: &[u8],
    context_info: &[u8],
) -> Result<(AeadCore, Zeroizing<Vec<u8>>)> {
    let key_len = params.dem.key_len();
    let nonce_len = params.dem.nonce_len();

    let mut ikm = Zeroizing::new(Vec::with_capacity(ephemeral_public.len() + shared_secret.len()));
    ikm.extend_from_slice(ephemeral_public);
    ikm.extend_from_slice(shared_secret);

    let okm = derive_subkey(&ikm, Some(params.hkdf_salt.as_slice()), context_info, key_len + nonce_len)?;
    let core = AeadCore::new(params.dem, &okm[..key_len])?;
    let nonce = Zeroizing::new(okm[key_len..].to_vec());
    Ok((core, nonce))
}

/// Skalar po clampingu jest wielokrotnością 8, więc punkt z małej podgrupy daje zero
fn has_low_order(point: &X25519PublicKey) -> bool {
    let scalar = StaticSecret::from([1u8; 32]);
    !scalar.diffie_hellman(point).was_contributory()
}

/// Manager kluczy prywatnych (HybridDecrypt)
#[derive(Debug, Clone, Copy, Default)]
pub struct X25519HybridPrivateKeyManager;

impl X25519HybridPrivateKeyManager {
    pub fn key_manager() -> PrivateKeyManagerImpl<Self> {
        PrivateKeyManagerImpl::new(Self)
    }
}

impl KeyTypeManager for X25519HybridPrivateKeyManager {
    type Key = X25519HybridPrivateKey;
    type Primitive = dyn HybridDecrypt;

    const VERSION: u32 = 0;
    const MATERIAL_TYPE: KeyMaterialType = KeyMaterialType::AsymmetricPrivate;

    fn validate_key(&self, key: &X25519HybridPrivateKey) -> Result<()> {
        validate_version(key.version, Self::VERSION)?;
        X25519HybridPublicKeyManager.validate_key(&key.public_key)?;

        let secret = StaticSecret::from(*to_array32("X25519 private key", &key.key_value)?);
        if X25519PublicKey::from(&secret).as_bytes().as_slice() != key.public_key.key_value.as_slice() {
            return Err(KeyManagerError::InvalidKey(
                "X25519 public key does not match private key".into(),
            ));
        }
        Ok(())
    }

    fn create_primitive(&self, key: &X25519HybridPrivateKey) -> Result<Box<dyn HybridDecrypt>> {
        let secret = to_array32("X25519 private key", &key.key_value)?;
        Ok(Box::new(X25519HybridDecrypt {
            params: key.public_key.params.clone(),
            secret: SecretBox::new(Box::new(*secret)),
        }))
    }
}

impl KeyTypeFactory for X25519HybridPrivateKeyManager {
    type Format = X25519HybridKeyFormat;

    fn validate_format(&self, format: &X25519HybridKeyFormat) -> Result<()> {
        validate_version(format.version, Self::VERSION)
            .map_err(|e| KeyManagerError::InvalidFormat(e.to_string()))
    }

    fn create_key(&self, format: &X25519HybridKeyFormat) -> Result<X25519HybridPrivateKey> {
        let secret = StaticSecret::from(random_array::<32>()?);
        let public = X25519PublicKey::from(&secret);

        Ok(X25519HybridPrivateKey {
            version: Self::VERSION,
            key_value: secret.to_bytes().to_vec(),
            public_key: X25519HybridPublicKey {
                version: Self::VERSION,
                params: format.params.clone(),
                key_value: public.as_bytes().to_vec(),
            },
        })
    }
}

impl PrivateKeyTypeManager for X25519HybridPrivateKeyManager {
    type PublicKey = X25519HybridPublicKey;

    fn public_key(&self, private_key: &X25519HybridPrivateKey) -> Result<X25519HybridPublicKey> {
        Ok(private_key.public_key.clone())
    }
}

/// Manager kluczy publicznych (HybridEncrypt) - bez lokalnego generowania
#[derive(Debug, Clone, Copy, Default)]
pub struct X25519HybridPublicKeyManager;

impl X25519HybridPublicKeyManager {
    pub fn key_manager() -> OutputOnlyKeyManager<Self> {
        OutputOnlyKeyManager::new(Self)
    }
}

impl KeyTypeManager for X25519HybridPublicKeyManager {
    type Key = X25519HybridPublicKey;
    type Primitive = dyn HybridEncrypt;

    const VERSION: u32 = 0;
    const MATERIAL_TYPE: KeyMaterialType = KeyMaterialType::AsymmetricPublic;

    fn validate_key(&self, key: &X25519HybridPublicKey) -> Result<()> {
        validate_version(key.version, Self::VERSION)?;
        validate_len("X25519 public key", key.key_value.len(), POINT_LEN)?;

        let mut point = [0u8; POINT_LEN];
        point.copy_from_slice(&key.key_value);
        if has_low_order(&X25519PublicKey::from(point)) {
            return Err(KeyManagerError::InvalidKey(
                "X25519 public key has low order".into(),
            ));
        }
        Ok(())
    }

    fn create_primitive(&self, key: &X25519HybridPublicKey) -> Result<Box<dyn HybridEncrypt>> {
        let mut point = [0u8; POINT_LEN];
        point.copy_from_slice(&key.key_value);
        Ok(Box::new(X25519HybridEncrypt {
            params: key.params.clone(),
            recipient: X25519PublicKey::from(point),
        }))
    }
}

pub struct X25519HybridEncrypt {
    params: HybridParams,
    recipient: X25519PublicKey,
}

impl HybridEncrypt for X25519HybridEncrypt {
    fn encrypt(&self, plaintext: &[u8], context_info: &[u8]) -> Result<Vec<u8>> {
        let ephemeral = StaticSecret::from(random_array::<32>()?);
        let ephemeral_public = X25519PublicKey::from(&ephemeral);

        let shared = ephemeral.diffie_hellman(&self.recipient);
        if !shared.was_contributory() {
            return Err(KeyManagerError::Crypto(
                "X25519 recipient key has low order".into(),
            ));
        }

        let (dem, nonce) = derive_dem(
            &self.params,
            ephemeral_public.as_bytes(),
            shared.as_bytes(),
            context_info,
        )?;
        let ciphertext = dem.seal(&nonce, plaintext, &[])?;

        let mut out = Vec::with_capacity(POINT_LEN + ciphertext.len());
        out.extend_from_slice(ephemeral_public.as_bytes());
        out.extend_from_slice(&ciphertext);
        Ok(out)
    }
}

pub struct X25519HybridDecrypt {
    params: HybridParams,
    secret: SecretBox<[u8; 32]>,
}

impl HybridDecrypt for X25519HybridDecrypt {
    fn decrypt(&self, ciphertext: &[u8], context_info: &[u8]) -> Result<Vec<u8>> {
        if ciphertext.len() < POINT_LEN + TAG_LEN {
            return Err(KeyManagerError::AuthFailed);
        }
        let (ephemeral_bytes, dem_ciphertext) = ciphertext.split_at(POINT_LEN);
        let mut point = [0u8; POINT_LEN];
        point.copy_from_slice(ephemeral_bytes);
        let ephemeral_public = X25519PublicKey::from(point);

        let secret = StaticSecret::from(*self.secret.expose_secret());
        let shared = secret.diffie_hellman(&ephemeral_public);
        if !shared.was_contributory() {
            return Err(KeyManagerError::AuthFailed);
        }

        let (dem, nonce) = derive_dem(&self.params, ephemeral_bytes, shared.as_bytes(), context_info)?;
        dem.open(&nonce, dem_ciphertext, &[])
    }
}

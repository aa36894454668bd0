//! Ed25519 - podpisy (PublicKeySign / PublicKeyVerify)
//!
//! Klucz prywatny zawiera seed (32 B) oraz osadzony klucz publiczny; przy
//! walidacji klucz publiczny jest derywowany ponownie i porównywany.

use std::fmt;

use ed25519_dalek::{Signature, Signer, SigningKey, VerifyingKey};
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::{to_array32, validate_len};
use crate::codec::KeyProto;
use crate::crypto::random_array;
use crate::error::{KeyManagerError, Result};
use crate::key_data::KeyMaterialType;
use crate::primitive::{PublicKeySign, PublicKeyVerify};
use crate::typed::{
    validate_version, KeyTypeFactory, KeyTypeManager, OutputOnlyKeyManager, PrivateKeyManagerImpl,
    PrivateKeyTypeManager,
};

pub const ED25519_PRIVATE_KEY_TYPE: &str = "type.alfa.dev/alfa.keymanager.Ed25519PrivateKey";
pub const ED25519_PUBLIC_KEY_TYPE: &str = "type.alfa.dev/alfa.keymanager.Ed25519PublicKey";
pub const ED25519_KEY_FORMAT_TYPE: &str = "type.alfa.dev/alfa.keymanager.Ed25519KeyFormat";

pub const SIGNATURE_LEN: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Ed25519PublicKey {
    pub version: u32,
    #[serde(with = "crate::codec::base64_bytes")]
    pub key_value: Vec<u8>,
}

impl KeyProto for Ed25519PublicKey {
    const TYPE_URL: &'static str = ED25519_PUBLIC_KEY_TYPE;
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(deny_unknown_fields)]
pub struct Ed25519PrivateKey {
    pub version: u32,
    /// Seed RFC 8032
    #[serde(with = "crate::codec::base64_bytes")]
    pub key_value: Vec<u8>,
    #[zeroize(skip)]
    pub public_key: Ed25519PublicKey,
}

impl fmt::Debug for Ed25519PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ed25519PrivateKey")
            .field("version", &self.version)
            .field("key_value", &format_args!("<{} bytes redacted>", self.key_value.len()))
            .field("public_key", &self.public_key)
            .finish()
    }
}

impl KeyProto for Ed25519PrivateKey {
    const TYPE_URL: &'static str = ED25519_PRIVATE_KEY_TYPE;
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Ed25519KeyFormat {
    #[serde(default)]
    pub version: u32,
}

impl KeyProto for Ed25519KeyFormat {
    const TYPE_URL: &'static str = ED25519_KEY_FORMAT_TYPE;
}

fn parse_verifying_key(bytes: &[u8]) -> Result<VerifyingKey> {
    validate_len("Ed25519 public key", bytes.len(), 32)?;
    let mut raw = [0u8; 32];
    raw.copy_from_slice(bytes);

    let key = VerifyingKey::from_bytes(&raw)
        .map_err(|e| KeyManagerError::InvalidKey(format!("Ed25519 public key: {}", e)))?;
    if key.is_weak() {
        return Err(KeyManagerError::InvalidKey("Ed25519 public key has small order".into()));
    }
    Ok(key)
}

fn signing_key(private_key: &Ed25519PrivateKey) -> Result<SigningKey> {
    let seed = to_array32("Ed25519 private key", &private_key.key_value)?;
    Ok(SigningKey::from_bytes(&seed))
}

/// Manager kluczy prywatnych Ed25519
#[derive(Debug, Clone, Copy, Default)]
pub struct Ed25519PrivateKeyManager;

impl Ed25519PrivateKeyManager {
    pub fn key_manager() -> PrivateKeyManagerImpl<Self> {
        PrivateKeyManagerImpl::new(Self)
    }
}

impl KeyTypeManager for Ed25519PrivateKeyManager {
    type Key = Ed25519PrivateKey;
    type Primitive = dyn PublicKeySign;

    const VERSION: u32 = 0;
    const MATERIAL_TYPE: KeyMaterialType = KeyMaterialType::AsymmetricPrivate;

    fn validate_key(&self, key: &Ed25519PrivateKey) -> Result<()> {
        validate_version(key.version, Self::VERSION)?;
        Ed25519PublicKeyManager.validate_key(&key.public_key)?;

        let derived = signing_key(key)?.verifying_key();
        if derived.as_bytes().as_slice() != key.public_key.key_value.as_slice() {
            return Err(KeyManagerError::InvalidKey(
                "Ed25519 public key does not match private key".into(),
            ));
        }
        Ok(())
    }

    fn create_primitive(&self, key: &Ed25519PrivateKey) -> Result<Box<dyn PublicKeySign>> {
        Ok(Box::new(Ed25519Signer {
            signing_key: signing_key(key)?,
        }))
    }
}

impl KeyTypeFactory for Ed25519PrivateKeyManager {
    type Format = Ed25519KeyFormat;

    fn validate_format(&self, format: &Ed25519KeyFormat) -> Result<()> {
        validate_version(format.version, Self::VERSION)
            .map_err(|e| KeyManagerError::InvalidFormat(e.to_string()))
    }

    fn create_key(&self, _format: &Ed25519KeyFormat) -> Result<Ed25519PrivateKey> {
        let mut seed = random_array::<32>()?;
        let signing_key = SigningKey::from_bytes(&seed);
        seed.zeroize();

        Ok(Ed25519PrivateKey {
            version: Self::VERSION,
            key_value: signing_key.to_bytes().to_vec(),
            public_key: Ed25519PublicKey {
                version: Self::VERSION,
                key_value: signing_key.verifying_key().to_bytes().to_vec(),
            },
        })
    }
}

impl PrivateKeyTypeManager for Ed25519PrivateKeyManager {
    type PublicKey = Ed25519PublicKey;

    fn public_key(&self, private_key: &Ed25519PrivateKey) -> Result<Ed25519PublicKey> {
        Ok(private_key.public_key.clone())
    }
}

/// Manager kluczy publicznych Ed25519 - bez lokalnego generowania
#[derive(Debug, Clone, Copy, Default)]
pub struct Ed25519PublicKeyManager;

impl Ed25519PublicKeyManager {
    pub fn key_manager() -> OutputOnlyKeyManager<Self> {
        OutputOnlyKeyManager::new(Self)
    }
}

impl KeyTypeManager for Ed25519PublicKeyManager {
    type Key = Ed25519PublicKey;
    type Primitive = dyn PublicKeyVerify;

    const VERSION: u32 = 0;
    const MATERIAL_TYPE: KeyMaterialType = KeyMaterialType::AsymmetricPublic;

    fn validate_key(&self, key: &Ed25519PublicKey) -> Result<()> {
        validate_version(key.version, Self::VERSION)?;
        parse_verifying_key(&key.key_value).map(|_| ())
    }

    fn create_primitive(&self, key: &Ed25519PublicKey) -> Result<Box<dyn PublicKeyVerify>> {
        let verifying_key = parse_verifying_key(&key.key_value)
            .map_err(|e| KeyManagerError::PrimitiveConstruction(e.to_string()))?;
        Ok(Box::new(Ed25519Verifier { verifying_key }))
    }
}

pub struct Ed25519Signer {
    signing_key: SigningKey,
}

impl PublicKeySign for Ed25519Signer {
    fn sign(&self, data: &[u8]) -> Result<Vec<u8>> {
        Ok(self.signing_key.sign(data).to_bytes().to_vec())
    }
}

pub struct Ed25519Verifier {
    verifying_key: VerifyingKey,
}

impl PublicKeyVerify for Ed25519Verifier {
    fn verify(&self, signature: &[u8], data: &[u8]) -> Result<()> {
        if signature.len() != SIGNATURE_LEN {
            return Err(KeyManagerError::AuthFailed);
        }
        let signature = Signature::from_slice(signature).map_err(|_| KeyManagerError::AuthFailed)?;
        self.verifying_key
            .verify_strict(data, &signature)
            .map_err(|_| KeyManagerError::AuthFailed)
    }
}

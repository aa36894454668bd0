//! HMAC-SHA256 / HMAC-SHA512 - prymityw MAC

use std::fmt;

use hmac::{Hmac, Mac as _};
use secrecy::{ExposeSecret, SecretBox};
use serde::{Deserialize, Serialize};
use sha2::{Sha256, Sha512};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::codec::KeyProto;
use crate::crypto::random_bytes;
use crate::error::{KeyManagerError, Result};
use crate::key_data::KeyMaterialType;
use crate::primitive::Mac;
use crate::typed::{validate_version, KeyManagerImpl, KeyTypeFactory, KeyTypeManager};

pub const HMAC_KEY_TYPE: &str = "type.alfa.dev/alfa.keymanager.HmacKey";
pub const HMAC_KEY_FORMAT_TYPE: &str = "type.alfa.dev/alfa.keymanager.HmacKeyFormat";

/// Minimalna długość klucza HMAC (bajty)
pub const MIN_KEY_SIZE: usize = 16;
/// Minimalna długość tagu (bajty)
pub const MIN_TAG_SIZE: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HashType {
    Sha256,
    Sha512,
}

impl HashType {
    pub fn digest_len(&self) -> u32 {
        match self {
            Self::Sha256 => 32,
            Self::Sha512 => 64,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HmacParams {
    pub hash: HashType,
    /// Długość zwracanego tagu (obcięcie od lewej)
    pub tag_size: u32,
}

impl HmacParams {
    pub fn new(hash: HashType, tag_size: u32) -> Self {
        Self { hash, tag_size }
    }

    fn validate(&self) -> std::result::Result<(), String> {
        if self.tag_size < MIN_TAG_SIZE {
            return Err(format!("tag size {} below minimum {}", self.tag_size, MIN_TAG_SIZE));
        }
        if self.tag_size > self.hash.digest_len() {
            return Err(format!(
                "tag size {} exceeds {:?} digest length {}",
                self.tag_size,
                self.hash,
                self.hash.digest_len()
            ));
        }
        Ok(())
    }
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(deny_unknown_fields)]
pub struct HmacKey {
    pub version: u32,
    #[zeroize(skip)]
    pub params: HmacParams,
    #[serde(with = "crate::codec::base64_bytes")]
    pub key_value: Vec<u8>,
}

impl fmt::Debug for HmacKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HmacKey")
            .field("version", &self.version)
            .field("params", &self.params)
            .field("key_value", &format_args!("<{} bytes redacted>", self.key_value.len()))
            .finish()
    }
}

impl KeyProto for HmacKey {
    const TYPE_URL: &'static str = HMAC_KEY_TYPE;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HmacKeyFormat {
    pub params: HmacParams,
    pub key_size: u32,
    #[serde(default)]
    pub version: u32,
}

impl Default for HmacKeyFormat {
    fn default() -> Self {
        Self::sha256_256bittag()
    }
}

impl HmacKeyFormat {
    pub fn new(hash: HashType, key_size: u32, tag_size: u32) -> Self {
        Self {
            params: HmacParams::new(hash, tag_size),
            key_size,
            version: 0,
        }
    }

    pub fn sha256_128bittag() -> Self {
        Self::new(HashType::Sha256, 32, 16)
    }

    pub fn sha256_256bittag() -> Self {
        Self::new(HashType::Sha256, 32, 32)
    }

    pub fn sha512_256bittag() -> Self {
        Self::new(HashType::Sha512, 64, 32)
    }

    pub fn sha512_512bittag() -> Self {
        Self::new(HashType::Sha512, 64, 64)
    }
}

impl KeyProto for HmacKeyFormat {
    const TYPE_URL: &'static str = HMAC_KEY_FORMAT_TYPE;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HmacKeyManager;

impl HmacKeyManager {
    pub fn key_manager() -> KeyManagerImpl<Self> {
        KeyManagerImpl::new(Self)
    }
}

impl KeyTypeManager for HmacKeyManager {
    type Key = HmacKey;
    type Primitive = dyn Mac;

    const VERSION: u32 = 0;
    const MATERIAL_TYPE: KeyMaterialType = KeyMaterialType::Symmetric;

    fn validate_key(&self, key: &HmacKey) -> Result<()> {
        validate_version(key.version, Self::VERSION)?;
        if key.key_value.len() < MIN_KEY_SIZE {
            return Err(KeyManagerError::InvalidKey(format!(
                "HMAC key must be at least {} bytes, got {}",
                MIN_KEY_SIZE,
                key.key_value.len()
            )));
        }
        key.params.validate().map_err(KeyManagerError::InvalidKey)
    }

    fn create_primitive(&self, key: &HmacKey) -> Result<Box<dyn Mac>> {
        Ok(Box::new(HmacPrf::new(key.params, &key.key_value)))
    }
}

impl KeyTypeFactory for HmacKeyManager {
    type Format = HmacKeyFormat;

    fn validate_format(&self, format: &HmacKeyFormat) -> Result<()> {
        validate_version(format.version, Self::VERSION)
            .map_err(|e| KeyManagerError::InvalidFormat(e.to_string()))?;
        if (format.key_size as usize) < MIN_KEY_SIZE {
            return Err(KeyManagerError::InvalidFormat(format!(
                "HMAC key size must be at least {}, got {}",
                MIN_KEY_SIZE, format.key_size
            )));
        }
        format.params.validate().map_err(KeyManagerError::InvalidFormat)
    }

    fn create_key(&self, format: &HmacKeyFormat) -> Result<HmacKey> {
        Ok(HmacKey {
            version: Self::VERSION,
            params: format.params,
            key_value: random_bytes(format.key_size as usize)?.to_vec(),
        })
    }
}

/// Prymityw MAC; klucz trzymany w SecretBox, instancja HMAC per wywołanie
pub struct HmacPrf {
    params: HmacParams,
    key: SecretBox<[u8]>,
}

impl HmacPrf {
    fn new(params: HmacParams, key: &[u8]) -> Self {
        Self {
            params,
            key: SecretBox::new(key.to_vec().into_boxed_slice()),
        }
    }

    fn construction_error<E: fmt::Display>(e: E) -> KeyManagerError {
        KeyManagerError::PrimitiveConstruction(format!("HMAC init failed: {}", e))
    }
}

impl Mac for HmacPrf {
    fn compute_mac(&self, data: &[u8]) -> Result<Vec<u8>> {
        let key = self.key.expose_secret();
        let mut tag = match self.params.hash {
            HashType::Sha256 => {
                let mut mac = <Hmac<Sha256> as hmac::Mac>::new_from_slice(key)
                    .map_err(Self::construction_error)?;
                mac.update(data);
                mac.finalize().into_bytes().to_vec()
            }
            HashType::Sha512 => {
                let mut mac = <Hmac<Sha512> as hmac::Mac>::new_from_slice(key)
                    .map_err(Self::construction_error)?;
                mac.update(data);
                mac.finalize().into_bytes().to_vec()
            }
        };
        tag.truncate(self.params.tag_size as usize);
        Ok(tag)
    }

    fn verify_mac(&self, tag: &[u8], data: &[u8]) -> Result<()> {
        if tag.len() != self.params.tag_size as usize {
            return Err(KeyManagerError::AuthFailed);
        }

        let key = self.key.expose_secret();
        let verified = match self.params.hash {
            HashType::Sha256 => {
                let mut mac = <Hmac<Sha256> as hmac::Mac>::new_from_slice(key)
                    .map_err(Self::construction_error)?;
                mac.update(data);
                mac.verify_truncated_left(tag)
            }
            HashType::Sha512 => {
                let mut mac = <Hmac<Sha512> as hmac::Mac>::new_from_slice(key)
                    .map_err(Self::construction_error)?;
                mac.update(data);
                mac.verify_truncated_left(tag)
            }
        };
        verified.map_err(|_| KeyManagerError::AuthFailed)
    }
}

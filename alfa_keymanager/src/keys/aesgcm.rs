//! AES-GCM - klucze 128/256-bit, prymityw AEAD
//!
//! Szyfrogram: nonce (12 B) || ciphertext || tag (16 B).

use std::fmt;

use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::codec::KeyProto;
use crate::crypto::{random_bytes, AeadCipher, AeadCore};
use crate::error::{KeyManagerError, Result};
use crate::key_data::KeyMaterialType;
use crate::primitive::Aead;
use crate::typed::{validate_version, KeyManagerImpl, KeyTypeFactory, KeyTypeManager};

pub const AES_GCM_KEY_TYPE: &str = "type.alfa.dev/alfa.keymanager.AesGcmKey";
pub const AES_GCM_KEY_FORMAT_TYPE: &str = "type.alfa.dev/alfa.keymanager.AesGcmKeyFormat";

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(deny_unknown_fields)]
pub struct AesGcmKey {
    pub version: u32,
    #[serde(with = "crate::codec::base64_bytes")]
    pub key_value: Vec<u8>,
}

impl fmt::Debug for AesGcmKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AesGcmKey")
            .field("version", &self.version)
            .field("key_value", &format_args!("<{} bytes redacted>", self.key_value.len()))
            .finish()
    }
}

impl KeyProto for AesGcmKey {
    const TYPE_URL: &'static str = AES_GCM_KEY_TYPE;
}

/// Parametry generowania klucza AES-GCM
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AesGcmKeyFormat {
    /// Długość klucza w bajtach (16 lub 32)
    pub key_size: u32,
    #[serde(default)]
    pub version: u32,
}

impl Default for AesGcmKeyFormat {
    fn default() -> Self {
        Self::aes256()
    }
}

impl AesGcmKeyFormat {
    pub fn new(key_size: u32) -> Self {
        Self { key_size, version: 0 }
    }

    pub fn aes128() -> Self {
        Self::new(16)
    }

    pub fn aes256() -> Self {
        Self::new(32)
    }
}

impl KeyProto for AesGcmKeyFormat {
    const TYPE_URL: &'static str = AES_GCM_KEY_FORMAT_TYPE;
}

fn cipher_for_size(key_size: usize) -> Option<AeadCipher> {
    match key_size {
        16 => Some(AeadCipher::Aes128Gcm),
        32 => Some(AeadCipher::Aes256Gcm),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AesGcmKeyManager;

impl AesGcmKeyManager {
    pub fn key_manager() -> KeyManagerImpl<Self> {
        KeyManagerImpl::new(Self)
    }
}

impl KeyTypeManager for AesGcmKeyManager {
    type Key = AesGcmKey;
    type Primitive = dyn Aead;

    const VERSION: u32 = 0;
    const MATERIAL_TYPE: KeyMaterialType = KeyMaterialType::Symmetric;

    fn validate_key(&self, key: &AesGcmKey) -> Result<()> {
        validate_version(key.version, Self::VERSION)?;
        if cipher_for_size(key.key_value.len()).is_none() {
            return Err(KeyManagerError::InvalidKey(format!(
                "AES-GCM key must be 16 or 32 bytes, got {}",
                key.key_value.len()
            )));
        }
        Ok(())
    }

    fn create_primitive(&self, key: &AesGcmKey) -> Result<Box<dyn Aead>> {
        Ok(Box::new(AesGcmAead::new(&key.key_value)?))
    }
}

impl KeyTypeFactory for AesGcmKeyManager {
    type Format = AesGcmKeyFormat;

    fn validate_format(&self, format: &AesGcmKeyFormat) -> Result<()> {
        validate_version(format.version, Self::VERSION)
            .map_err(|e| KeyManagerError::InvalidFormat(e.to_string()))?;
        if cipher_for_size(format.key_size as usize).is_none() {
            return Err(KeyManagerError::InvalidFormat(format!(
                "AES-GCM key size must be 16 or 32, got {}",
                format.key_size
            )));
        }
        Ok(())
    }

    fn create_key(&self, format: &AesGcmKeyFormat) -> Result<AesGcmKey> {
        let key_value = random_bytes(format.key_size as usize)?;
        Ok(AesGcmKey {
            version: Self::VERSION,
            key_value: key_value.to_vec(),
        })
    }
}

/// Prymityw AEAD dla klucza AES-GCM
pub struct AesGcmAead {
    core: AeadCore,
}

impl AesGcmAead {
    pub fn new(key: &[u8]) -> Result<Self> {
        let cipher = cipher_for_size(key.len()).ok_or_else(|| {
            KeyManagerError::PrimitiveConstruction(format!("invalid AES-GCM key size {}", key.len()))
        })?;
        Ok(Self {
            core: AeadCore::new(cipher, key)?,
        })
    }
}

impl Aead for AesGcmAead {
    fn encrypt(&self, plaintext: &[u8], associated_data: &[u8]) -> Result<Vec<u8>> {
        self.core.seal_with_random_nonce(plaintext, associated_data)
    }

    fn decrypt(&self, ciphertext: &[u8], associated_data: &[u8]) -> Result<Vec<u8>> {
        self.core.open_with_prefixed_nonce(ciphertext, associated_data)
    }
}

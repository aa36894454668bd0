//! XChaCha20-Poly1305 - klucz 256-bit, prymityw AEAD

use std::fmt;

use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::validate_len;
use crate::codec::KeyProto;
use crate::crypto::{random_bytes, AeadCipher, AeadCore};
use crate::error::{KeyManagerError, Result};
use crate::key_data::KeyMaterialType;
use crate::primitive::Aead;
use crate::typed::{validate_version, KeyManagerImpl, KeyTypeFactory, KeyTypeManager};

pub const XCHACHA20_POLY1305_KEY_TYPE: &str = "type.alfa.dev/alfa.keymanager.XChaCha20Poly1305Key";
pub const XCHACHA20_POLY1305_KEY_FORMAT_TYPE: &str =
    "type.alfa.dev/alfa.keymanager.XChaCha20Poly1305KeyFormat";

const KEY_LEN: usize = 32;

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(deny_unknown_fields)]
pub struct XChaCha20Poly1305Key {
    pub version: u32,
    #[serde(with = "crate::codec::base64_bytes")]
    pub key_value: Vec<u8>,
}

impl fmt::Debug for XChaCha20Poly1305Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("XChaCha20Poly1305Key")
            .field("version", &self.version)
            .field("key_value", &format_args!("<{} bytes redacted>", self.key_value.len()))
            .finish()
    }
}

impl KeyProto for XChaCha20Poly1305Key {
    const TYPE_URL: &'static str = XCHACHA20_POLY1305_KEY_TYPE;
}

/// Format bez parametrów poza wersją - rozmiar klucza jest stały
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct XChaCha20Poly1305KeyFormat {
    #[serde(default)]
    pub version: u32,
}

impl KeyProto for XChaCha20Poly1305KeyFormat {
    const TYPE_URL: &'static str = XCHACHA20_POLY1305_KEY_FORMAT_TYPE;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct XChaCha20Poly1305KeyManager;

impl XChaCha20Poly1305KeyManager {
    pub fn key_manager() -> KeyManagerImpl<Self> {
        KeyManagerImpl::new(Self)
    }
}

impl KeyTypeManager for XChaCha20Poly1305KeyManager {
    type Key = XChaCha20Poly1305Key;
    type Primitive = dyn Aead;

    const VERSION: u32 = 0;
    const MATERIAL_TYPE: KeyMaterialType = KeyMaterialType::Symmetric;

    fn validate_key(&self, key: &XChaCha20Poly1305Key) -> Result<()> {
        validate_version(key.version, Self::VERSION)?;
        validate_len("XChaCha20-Poly1305 key", key.key_value.len(), KEY_LEN)
    }

    fn create_primitive(&self, key: &XChaCha20Poly1305Key) -> Result<Box<dyn Aead>> {
        Ok(Box::new(XChaCha20Poly1305Aead {
            core: AeadCore::new(AeadCipher::XChaCha20Poly1305, &key.key_value)?,
        }))
    }
}

impl KeyTypeFactory for XChaCha20Poly1305KeyManager {
    type Format = XChaCha20Poly1305KeyFormat;

    fn validate_format(&self, format: &XChaCha20Poly1305KeyFormat) -> Result<()> {
        validate_version(format.version, Self::VERSION)
            .map_err(|e| KeyManagerError::InvalidFormat(e.to_string()))
    }

    fn create_key(&self, _format: &XChaCha20Poly1305KeyFormat) -> Result<XChaCha20Poly1305Key> {
        Ok(XChaCha20Poly1305Key {
            version: Self::VERSION,
            key_value: random_bytes(KEY_LEN)?.to_vec(),
        })
    }
}

/// Szyfrogram: nonce (24 B) || ciphertext || tag (16 B)
pub struct XChaCha20Poly1305Aead {
    core: AeadCore,
}

impl Aead for XChaCha20Poly1305Aead {
    fn encrypt(&self, plaintext: &[u8], associated_data: &[u8]) -> Result<Vec<u8>> {
        self.core.seal_with_random_nonce(plaintext, associated_data)
    }

    fn decrypt(&self, ciphertext: &[u8], associated_data: &[u8]) -> Result<Vec<u8>> {
        self.core.open_with_prefixed_nonce(ciphertext, associated_data)
    }
}

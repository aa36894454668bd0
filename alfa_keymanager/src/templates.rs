//! Szablony kluczy - gotowe zestawy (typ klucza + zserializowany format)
//!
//! Szablon wskazuje managera przez `type_url` i niesie format w postaci,
//! którą przyjmuje [`KeyFactory::new_key_data`](crate::manager::KeyFactory::new_key_data).

use serde::{Deserialize, Serialize};

use crate::codec::KeyProto;
use crate::error::{KeyManagerError, Result};
use crate::key_data::KeyData;
use crate::keys::{
    AesGcmKey, AesGcmKeyFormat, Ed25519KeyFormat, Ed25519PrivateKey, HmacKey, HmacKeyFormat,
    HybridParams, X25519HybridKeyFormat, X25519HybridPrivateKey, XChaCha20Poly1305Key,
    XChaCha20Poly1305KeyFormat,
};
use crate::manager::KeyManager;
use crate::primitive::Primitive;

/// Prefiks wyjścia na poziomie keysetu (tu tylko przenoszony)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutputPrefixType {
    #[default]
    Tink,
    Legacy,
    Raw,
    Crunchy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KeyTemplate {
    /// Typ klucza, który powstanie z szablonu
    pub type_url: String,
    /// Zserializowany format klucza
    #[serde(with = "crate::codec::base64_bytes")]
    pub value: Vec<u8>,
    pub output_prefix_type: OutputPrefixType,
}

impl KeyTemplate {
    pub fn new<K: KeyProto, F: KeyProto>(format: &F) -> Result<Self> {
        Ok(Self {
            type_url: K::TYPE_URL.to_string(),
            value: format.encode()?,
            output_prefix_type: OutputPrefixType::Tink,
        })
    }

    pub fn with_output_prefix(mut self, output_prefix_type: OutputPrefixType) -> Self {
        self.output_prefix_type = output_prefix_type;
        self
    }

    /// Generuje klucz przez fabrykę managera obsługującego `type_url`
    pub fn generate<P: ?Sized + Primitive>(&self, manager: &dyn KeyManager<P>) -> Result<KeyData> {
        if !manager.does_support(&self.type_url) {
            return Err(KeyManagerError::UnsupportedKeyType {
                expected: manager.key_type().to_string(),
                got: self.type_url.clone(),
            });
        }
        let factory = manager
            .key_factory()
            .ok_or_else(|| KeyManagerError::KeyGenerationUnsupported(self.type_url.clone()))?;
        factory.new_key_data(&self.value)
    }
}

pub fn aes128_gcm() -> Result<KeyTemplate> {
    KeyTemplate::new::<AesGcmKey, _>(&AesGcmKeyFormat::aes128())
}

pub fn aes256_gcm() -> Result<KeyTemplate> {
    KeyTemplate::new::<AesGcmKey, _>(&AesGcmKeyFormat::aes256())
}

pub fn xchacha20_poly1305() -> Result<KeyTemplate> {
    KeyTemplate::new::<XChaCha20Poly1305Key, _>(&XChaCha20Poly1305KeyFormat::default())
}

pub fn hmac_sha256_128bittag() -> Result<KeyTemplate> {
    KeyTemplate::new::<HmacKey, _>(&HmacKeyFormat::sha256_128bittag())
}

pub fn hmac_sha256_256bittag() -> Result<KeyTemplate> {
    KeyTemplate::new::<HmacKey, _>(&HmacKeyFormat::sha256_256bittag())
}

pub fn hmac_sha512_256bittag() -> Result<KeyTemplate> {
    KeyTemplate::new::<HmacKey, _>(&HmacKeyFormat::sha512_256bittag())
}

pub fn hmac_sha512_512bittag() -> Result<KeyTemplate> {
    KeyTemplate::new::<HmacKey, _>(&HmacKeyFormat::sha512_512bittag())
}

/// Ed25519 bez prefiksu - podpisy zgodne z RFC 8032
pub fn ed25519() -> Result<KeyTemplate> {
    Ok(KeyTemplate::new::<Ed25519PrivateKey, _>(&Ed25519KeyFormat::default())?
        .with_output_prefix(OutputPrefixType::Raw))
}

pub fn x25519_hkdf_sha256_aes256_gcm() -> Result<KeyTemplate> {
    KeyTemplate::new::<X25519HybridPrivateKey, _>(&X25519HybridKeyFormat::new(
        HybridParams::aes256_gcm(),
    ))
}

pub fn x25519_hkdf_sha256_xchacha20_poly1305() -> Result<KeyTemplate> {
    KeyTemplate::new::<X25519HybridPrivateKey, _>(&X25519HybridKeyFormat::new(
        HybridParams::xchacha20_poly1305(),
    ))
}

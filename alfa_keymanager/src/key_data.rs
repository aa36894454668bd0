//! KeyData - przenośna, otagowana forma klucza

use std::fmt;

use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::codec::Message;
use crate::error::Result;

/// Przeznaczenie materiału klucza
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KeyMaterialType {
    Symmetric,
    AsymmetricPrivate,
    AsymmetricPublic,
    /// Klucz trzymany poza procesem (HSM, KMS)
    Remote,
}

impl KeyMaterialType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Symmetric => "SYMMETRIC",
            Self::AsymmetricPrivate => "ASYMMETRIC_PRIVATE",
            Self::AsymmetricPublic => "ASYMMETRIC_PUBLIC",
            Self::Remote => "REMOTE",
        }
    }
}

/// Klucz w formie przewodowej: identyfikator typu + bajty + przeznaczenie
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(deny_unknown_fields)]
pub struct KeyData {
    #[zeroize(skip)]
    pub type_url: String,

    #[serde(with = "crate::codec::base64_bytes")]
    pub value: Vec<u8>,

    #[zeroize(skip)]
    pub key_material_type: KeyMaterialType,
}

impl KeyData {
    pub fn new(
        type_url: impl Into<String>,
        value: Vec<u8>,
        key_material_type: KeyMaterialType,
    ) -> Self {
        Self {
            type_url: type_url.into(),
            value,
            key_material_type,
        }
    }

    /// Koduje wiadomość klucza do KeyData (bez utraty informacji)
    pub fn from_message(key: &dyn Message, key_material_type: KeyMaterialType) -> Result<Self> {
        Ok(Self::new(key.type_url(), key.encode_to_vec()?, key_material_type))
    }
}

impl fmt::Debug for KeyData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyData")
            .field("type_url", &self.type_url)
            .field("value", &format_args!("<{} bytes redacted>", self.value.len()))
            .field("key_material_type", &self.key_material_type)
            .finish()
    }
}

/// Klucz na granicy API - typowany albo otagowany
#[derive(Debug, Clone, Copy)]
pub enum Key<'a> {
    Typed(&'a dyn Message),
    Tagged(&'a KeyData),
}

impl Key<'_> {
    /// Identyfikator typu klucza (krok 1 walidacji)
    pub fn type_url(&self) -> &str {
        match self {
            Self::Typed(message) => message.type_url(),
            Self::Tagged(key_data) => &key_data.type_url,
        }
    }
}

impl<'a> From<&'a KeyData> for Key<'a> {
    fn from(key_data: &'a KeyData) -> Self {
        Self::Tagged(key_data)
    }
}

/// Parametry generowania klucza - typowane albo zserializowane
#[derive(Debug, Clone, Copy)]
pub enum KeyFormat<'a> {
    Typed(&'a dyn Message),
    Serialized(&'a [u8]),
}

impl<'a> From<&'a [u8]> for KeyFormat<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        Self::Serialized(bytes)
    }
}

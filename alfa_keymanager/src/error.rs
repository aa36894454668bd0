//! Typy błędów dla ALFA_KEYMANAGER

use thiserror::Error;

use crate::primitive::PrimitiveType;

#[derive(Debug, Error)]
pub enum KeyManagerError {
    #[error("Unsupported key type: expected {expected}, got {got}")]
    UnsupportedKeyType { expected: String, got: String },

    #[error("Unsupported primitive: manager produces {supported}, requested {requested}")]
    UnsupportedPrimitive {
        supported: PrimitiveType,
        requested: PrimitiveType,
    },

    #[error("Invalid key format: {0}")]
    InvalidFormat(String),

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Primitive construction failed: {0}")]
    PrimitiveConstruction(String),

    #[error("Key version {got} not supported (manager version {supported})")]
    UnsupportedVersion { supported: u32, got: u32 },

    #[error("Key generation not supported for {0}")]
    KeyGenerationUnsupported(String),

    #[error("Crypto error: {0}")]
    Crypto(String),

    #[error("Authentication failed - ciphertext or tag invalid")]
    AuthFailed,

    #[error("Random number generation failed: {0}")]
    RandomGeneration(String),
}

pub type Result<T> = std::result::Result<T, KeyManagerError>;

impl KeyManagerError {
    /// Błędy, po których nie wolno budować żadnego prymitywu
    pub fn is_security_critical(&self) -> bool {
        matches!(
            self,
            Self::InvalidKey(_)
                | Self::UnsupportedVersion { .. }
                | Self::AuthFailed
                | Self::PrimitiveConstruction(_)
        )
    }

    /// Błąd routingu - wywołujący może spróbować innego managera
    pub fn is_routing_error(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedKeyType { .. } | Self::UnsupportedPrimitive { .. }
        )
    }
}

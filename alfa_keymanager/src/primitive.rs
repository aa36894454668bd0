//! Prymitywy - obiekty kryptograficzne budowane ze zweryfikowanych kluczy
//!
//! Zbiór uprawnień jest zamknięty: tylko obiekty `dyn Aead`, `dyn Mac`,
//! `dyn PublicKeySign`, `dyn PublicKeyVerify`, `dyn HybridEncrypt` i
//! `dyn HybridDecrypt` implementują [`Primitive`], każdy z własnym tagiem.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Tag typu prymitywu (do weryfikacji w ścieżkach dynamicznych)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimitiveType {
    Aead,
    Mac,
    PublicKeySign,
    PublicKeyVerify,
    HybridEncrypt,
    HybridDecrypt,
}

impl PrimitiveType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Aead => "AEAD",
            Self::Mac => "MAC",
            Self::PublicKeySign => "PublicKeySign",
            Self::PublicKeyVerify => "PublicKeyVerify",
            Self::HybridEncrypt => "HybridEncrypt",
            Self::HybridDecrypt => "HybridDecrypt",
        }
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Szyfrowanie uwierzytelnione z danymi dodatkowymi
pub trait Aead: Send + Sync {
    fn encrypt(&self, plaintext: &[u8], associated_data: &[u8]) -> Result<Vec<u8>>;
    fn decrypt(&self, ciphertext: &[u8], associated_data: &[u8]) -> Result<Vec<u8>>;
}

/// Kod uwierzytelniający wiadomości
pub trait Mac: Send + Sync {
    fn compute_mac(&self, data: &[u8]) -> Result<Vec<u8>>;
    /// Porównanie w czasie stałym; `Err(AuthFailed)` przy niezgodności
    fn verify_mac(&self, tag: &[u8], data: &[u8]) -> Result<()>;
}

pub trait PublicKeySign: Send + Sync {
    fn sign(&self, data: &[u8]) -> Result<Vec<u8>>;
}

pub trait PublicKeyVerify: Send + Sync {
    fn verify(&self, signature: &[u8], data: &[u8]) -> Result<()>;
}

pub trait HybridEncrypt: Send + Sync {
    fn encrypt(&self, plaintext: &[u8], context_info: &[u8]) -> Result<Vec<u8>>;
}

pub trait HybridDecrypt: Send + Sync {
    fn decrypt(&self, ciphertext: &[u8], context_info: &[u8]) -> Result<Vec<u8>>;
}

mod sealed {
    pub trait Sealed {}
}

/// Obiekt prymitywu powiązany statycznie ze swoim tagiem
pub trait Primitive: sealed::Sealed + Send + Sync {
    const PRIMITIVE_TYPE: PrimitiveType;
}

macro_rules! primitive_tag {
    ($($capability:ident => $tag:ident),+ $(,)?) => {
        $(
            impl sealed::Sealed for dyn $capability {}

            impl Primitive for dyn $capability {
                const PRIMITIVE_TYPE: PrimitiveType = PrimitiveType::$tag;
            }
        )+
    };
}

primitive_tag! {
    Aead => Aead,
    Mac => Mac,
    PublicKeySign => PublicKeySign,
    PublicKeyVerify => PublicKeyVerify,
    HybridEncrypt => HybridEncrypt,
    HybridDecrypt => HybridDecrypt,
}

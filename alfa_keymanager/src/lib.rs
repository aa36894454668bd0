//! # ALFA_KEYMANAGER 4.0 - Polimorficzne managery kluczy
//!
//! ## Możliwości:
//! - Kontrakty `KeyFactory`, `PrivateKeyFactory`, `KeyManager<P>`
//! - Klucze typowane i KeyData (type URL + bajty + przeznaczenie)
//! - Wersjonowanie kluczy i formatów
//! - AEAD (AES-GCM, XChaCha20-Poly1305), MAC (HMAC-SHA2)
//! - Podpisy Ed25519, szyfrowanie hybrydowe X25519
//! - Szablony kluczy
//!
//! Rejestr managerów i format keysetu leżą poza tą biblioteką.

pub mod codec;
pub mod crypto;
pub mod error;
pub mod key_data;
pub mod keys;
pub mod manager;
pub mod primitive;
pub mod templates;
pub mod typed;

// Re-exports
pub use codec::{KeyProto, Message};
pub use error::{KeyManagerError, Result};
pub use key_data::{Key, KeyData, KeyFormat, KeyMaterialType};
pub use manager::{KeyFactory, KeyManager, PrivateKeyFactory};
pub use primitive::{
    Aead, HybridDecrypt, HybridEncrypt, Mac, Primitive, PrimitiveType, PublicKeySign,
    PublicKeyVerify,
};
pub use templates::{KeyTemplate, OutputPrefixType};
pub use typed::{
    KeyManagerImpl, KeyTypeFactory, KeyTypeManager, OutputOnlyKeyManager, PrivateKeyManagerImpl,
    PrivateKeyTypeManager,
};

/// Wersja biblioteki
pub const VERSION: &str = "4.0.0";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert_eq!(VERSION, env!("CARGO_PKG_VERSION"));
    }
}

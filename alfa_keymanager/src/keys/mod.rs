//! Managery konkretnych typów kluczy
//!
//! | Typ klucza | Prymityw | Materiał |
//! |---|---|---|
//! | AesGcmKey | AEAD | SYMMETRIC |
//! | XChaCha20Poly1305Key | AEAD | SYMMETRIC |
//! | HmacKey | MAC | SYMMETRIC |
//! | Ed25519PrivateKey / Ed25519PublicKey | PublicKeySign / PublicKeyVerify | ASYMMETRIC_* |
//! | X25519HybridPrivateKey / X25519HybridPublicKey | HybridDecrypt / HybridEncrypt | ASYMMETRIC_* |

pub mod aesgcm;
pub mod ed25519;
pub mod hmac_key;
pub mod x25519_hybrid;
pub mod xchacha;

pub use aesgcm::{AesGcmKey, AesGcmKeyFormat, AesGcmKeyManager};
pub use ed25519::{
    Ed25519KeyFormat, Ed25519PrivateKey, Ed25519PrivateKeyManager, Ed25519PublicKey,
    Ed25519PublicKeyManager,
};
pub use hmac_key::{HashType, HmacKey, HmacKeyFormat, HmacKeyManager, HmacParams};
pub use x25519_hybrid::{
    HybridParams, X25519HybridKeyFormat, X25519HybridPrivateKey, X25519HybridPrivateKeyManager,
    X25519HybridPublicKey, X25519HybridPublicKeyManager,
};
pub use xchacha::{XChaCha20Poly1305Key, XChaCha20Poly1305KeyFormat, XChaCha20Poly1305KeyManager};

use zeroize::Zeroizing;

use crate::error::{KeyManagerError, Result};

/// Sprawdza długość materiału klucza
pub(crate) fn validate_len(what: &str, actual: usize, expected: usize) -> Result<()> {
    if actual != expected {
        return Err(KeyManagerError::InvalidKey(format!(
            "{} must be {} bytes, got {}",
            what, expected, actual
        )));
    }
    Ok(())
}

/// Kopiuje 32 bajty klucza do tablicy czyszczonej przy drop
pub(crate) fn to_array32(what: &str, bytes: &[u8]) -> Result<Zeroizing<[u8; 32]>> {
    validate_len(what, bytes.len(), 32)?;
    let mut out = Zeroizing::new([0u8; 32]);
    out.copy_from_slice(bytes);
    Ok(out)
}

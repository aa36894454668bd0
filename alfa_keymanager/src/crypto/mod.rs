//! Moduł kryptograficzny - AEAD (AES-GCM, XChaCha20), HKDF, losowość

mod aead;
mod hkdf_derive;
mod random;

pub use aead::{AeadCipher, AeadCore, TAG_LEN};
pub use hkdf_derive::derive_subkey;
pub use random::{random_array, random_bytes};

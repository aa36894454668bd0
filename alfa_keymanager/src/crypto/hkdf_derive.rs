//! HKDF-SHA256 derywacja kluczy

use hkdf::Hkdf;
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::error::{KeyManagerError, Result};

/// Derywuje klucz o zmiennej długości
pub fn derive_subkey(
    ikm: &[u8],
    salt: Option<&[u8]>,
    info: &[u8],
    length: usize,
) -> Result<Zeroizing<Vec<u8>>> {
    let hk = Hkdf::<Sha256>::new(salt, ikm);
    let mut okm = Zeroizing::new(vec![0u8; length]);
    hk.expand(info, okm.as_mut_slice())
        .map_err(|e| KeyManagerError::Crypto(format!("HKDF expand failed: {}", e)))?;
    Ok(okm)
}

//! Losowość z systemowego źródła entropii
//!
//! Każde wywołanie losuje niezależnie - brak współdzielonego stanu RNG.

use zeroize::Zeroizing;

use crate::error::{KeyManagerError, Result};

/// Losowy bufor o zadanej długości
pub fn random_bytes(len: usize) -> Result<Zeroizing<Vec<u8>>> {
    let mut buf = Zeroizing::new(vec![0u8; len]);
    getrandom::getrandom(buf.as_mut_slice())
        .map_err(|e| KeyManagerError::RandomGeneration(e.to_string()))?;
    Ok(buf)
}

/// Losowa tablica o stałej długości (nonce, seed)
pub fn random_array<const N: usize>() -> Result<[u8; N]> {
    let mut buf = [0u8; N];
    getrandom::getrandom(&mut buf)
        .map_err(|e| KeyManagerError::RandomGeneration(e.to_string()))?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_bytes_len() {
        assert_eq!(random_bytes(48).unwrap().len(), 48);
        assert!(random_bytes(0).unwrap().is_empty());
    }

    #[test]
    fn test_draws_are_independent() {
        let a: [u8; 32] = random_array().unwrap();
        let b: [u8; 32] = random_array().unwrap();
        assert_ne!(a, b);
    }
}

//! AEAD - AES-GCM i XChaCha20-Poly1305

use aes_gcm::{
    aead::{generic_array::GenericArray, Aead as _, KeyInit, Payload},
    Aes128Gcm, Aes256Gcm,
};
use chacha20poly1305::{XChaCha20Poly1305, XNonce};
use serde::{Deserialize, Serialize};

use super::random::random_bytes;
use crate::error::{KeyManagerError, Result};

/// Długość tagu uwierzytelniającego (wszystkie szyfry)
pub const TAG_LEN: usize = 16;

/// Typ szyfru AEAD
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AeadCipher {
    /// AES-128-GCM (12-byte nonce)
    #[serde(rename = "aes-128-gcm")]
    Aes128Gcm,
    /// AES-256-GCM (12-byte nonce)
    #[serde(rename = "aes-256-gcm")]
    Aes256Gcm,
    /// XChaCha20-Poly1305 (24-byte nonce) - preferowany
    #[serde(rename = "xchacha20-poly1305")]
    XChaCha20Poly1305,
}

impl Default for AeadCipher {
    fn default() -> Self {
        Self::XChaCha20Poly1305
    }
}

impl AeadCipher {
    pub fn key_len(&self) -> usize {
        match self {
            Self::Aes128Gcm => 16,
            Self::Aes256Gcm | Self::XChaCha20Poly1305 => 32,
        }
    }

    pub fn nonce_len(&self) -> usize {
        match self {
            Self::Aes128Gcm | Self::Aes256Gcm => 12,
            Self::XChaCha20Poly1305 => 24,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Aes128Gcm => "AES-128-GCM",
            Self::Aes256Gcm => "AES-256-GCM",
            Self::XChaCha20Poly1305 => "XChaCha20-Poly1305",
        }
    }
}

/// Zainicjalizowany szyfr AEAD z kluczem
pub enum AeadCore {
    Aes128Gcm(Aes128Gcm),
    Aes256Gcm(Aes256Gcm),
    XChaCha20Poly1305(XChaCha20Poly1305),
}

impl AeadCore {
    pub fn new(cipher: AeadCipher, key: &[u8]) -> Result<Self> {
        if key.len() != cipher.key_len() {
            return Err(KeyManagerError::PrimitiveConstruction(format!(
                "{} requires a {}-byte key, got {}",
                cipher.name(),
                cipher.key_len(),
                key.len()
            )));
        }

        let invalid = |_| KeyManagerError::PrimitiveConstruction(format!("{} key rejected", cipher.name()));
        Ok(match cipher {
            AeadCipher::Aes128Gcm => Self::Aes128Gcm(Aes128Gcm::new_from_slice(key).map_err(invalid)?),
            AeadCipher::Aes256Gcm => Self::Aes256Gcm(Aes256Gcm::new_from_slice(key).map_err(invalid)?),
            AeadCipher::XChaCha20Poly1305 => {
                Self::XChaCha20Poly1305(XChaCha20Poly1305::new_from_slice(key).map_err(invalid)?)
            }
        })
    }

    pub fn cipher(&self) -> AeadCipher {
        match self {
            Self::Aes128Gcm(_) => AeadCipher::Aes128Gcm,
            Self::Aes256Gcm(_) => AeadCipher::Aes256Gcm,
            Self::XChaCha20Poly1305(_) => AeadCipher::XChaCha20Poly1305,
        }
    }

    /// Szyfruje z podanym nonce; wynik: ciphertext || tag
    pub fn seal(&self, nonce: &[u8], plaintext: &[u8], aad: &[u8]) -> Result<Vec<u8>> {
        self.check_nonce(nonce)?;
        let payload = Payload { msg: plaintext, aad };

        let result = match self {
            Self::Aes128Gcm(c) => c.encrypt(GenericArray::from_slice(nonce), payload),
            Self::Aes256Gcm(c) => c.encrypt(GenericArray::from_slice(nonce), payload),
            Self::XChaCha20Poly1305(c) => c.encrypt(XNonce::from_slice(nonce), payload),
        };

        result.map_err(|e| {
            KeyManagerError::Crypto(format!("{} encryption failed: {}", self.cipher().name(), e))
        })
    }

    pub fn open(&self, nonce: &[u8], ciphertext: &[u8], aad: &[u8]) -> Result<Vec<u8>> {
        self.check_nonce(nonce)?;
        if ciphertext.len() < TAG_LEN {
            return Err(KeyManagerError::AuthFailed);
        }
        let payload = Payload { msg: ciphertext, aad };

        let result = match self {
            Self::Aes128Gcm(c) => c.decrypt(GenericArray::from_slice(nonce), payload),
            Self::Aes256Gcm(c) => c.decrypt(GenericArray::from_slice(nonce), payload),
            Self::XChaCha20Poly1305(c) => c.decrypt(XNonce::from_slice(nonce), payload),
        };

        result.map_err(|_| KeyManagerError::AuthFailed)
    }

    /// Szyfruje z losowym nonce; wynik: nonce || ciphertext || tag
    pub fn seal_with_random_nonce(&self, plaintext: &[u8], aad: &[u8]) -> Result<Vec<u8>> {
        let nonce_len = self.cipher().nonce_len();
        let nonce = random_bytes(nonce_len)?;
        let ciphertext = self.seal(&nonce, plaintext, aad)?;

        let mut out = Vec::with_capacity(nonce_len + ciphertext.len());
        out.extend_from_slice(&nonce);
        out.extend_from_slice(&ciphertext);
        Ok(out)
    }

    pub fn open_with_prefixed_nonce(&self, data: &[u8], aad: &[u8]) -> Result<Vec<u8>> {
        let nonce_len = self.cipher().nonce_len();
        if data.len() < nonce_len + TAG_LEN {
            return Err(KeyManagerError::AuthFailed);
        }
        let (nonce, ciphertext) = data.split_at(nonce_len);
        self.open(nonce, ciphertext, aad)
    }

    fn check_nonce(&self, nonce: &[u8]) -> Result<()> {
        let expected = self.cipher().nonce_len();
        if nonce.len() != expected {
            return Err(KeyManagerError::Crypto(format!(
                "Invalid {} nonce length: expected {}, got {}",
                self.cipher().name(),
                expected,
                nonce.len()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aes_gcm_roundtrip() {
        let core = AeadCore::new(AeadCipher::Aes256Gcm, &[1u8; 32]).unwrap();
        let ct = core.seal_with_random_nonce(b"seed", b"ad").unwrap();
        assert_eq!(ct.len(), 12 + 4 + TAG_LEN);
        assert_eq!(core.open_with_prefixed_nonce(&ct, b"ad").unwrap(), b"seed");
    }

    #[test]
    fn test_xchacha_roundtrip() {
        let core = AeadCore::new(AeadCipher::XChaCha20Poly1305, &[1u8; 32]).unwrap();
        let ct = core.seal_with_random_nonce(b"seed", b"").unwrap();
        assert_eq!(ct.len(), 24 + 4 + TAG_LEN);
        assert_eq!(core.open_with_prefixed_nonce(&ct, b"").unwrap(), b"seed");
    }

    #[test]
    fn test_wrong_key_fails() {
        let c1 = AeadCore::new(AeadCipher::Aes128Gcm, &[1u8; 16]).unwrap();
        let c2 = AeadCore::new(AeadCipher::Aes128Gcm, &[2u8; 16]).unwrap();
        let ct = c1.seal_with_random_nonce(b"seed", b"").unwrap();
        assert!(matches!(
            c2.open_with_prefixed_nonce(&ct, b""),
            Err(KeyManagerError::AuthFailed)
        ));
    }

    #[test]
    fn test_wrong_key_length_rejected() {
        assert!(matches!(
            AeadCore::new(AeadCipher::Aes256Gcm, &[0u8; 16]),
            Err(KeyManagerError::PrimitiveConstruction(_))
        ));
    }

    #[test]
    fn test_truncated_ciphertext() {
        let core = AeadCore::new(AeadCipher::Aes256Gcm, &[1u8; 32]).unwrap();
        assert!(core.open_with_prefixed_nonce(&[0u8; 27], b"").is_err());
    }
}

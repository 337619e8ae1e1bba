//! Credential codec backed by AES-256-GCM.
//!
//! Repository passwords are encrypted before they are persisted and decrypted
//! only when the sync client needs them. The stored form is
//! `hex(nonce || ciphertext)` with a fresh random nonce per encryption, so the
//! same plaintext never produces the same ciphertext twice.

use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use sha2::{Digest, Sha256};

use trackboard_core::credentials::CredentialCodec;
use trackboard_core::{Error, Result};

const NONCE_LEN: usize = 12;

/// AES-256-GCM codec keyed by the configured master secret.
pub struct AesCredentialCodec {
    cipher: Aes256Gcm,
}

impl AesCredentialCodec {
    /// Derive the cipher key from the master secret via SHA-256.
    pub fn new(master_secret: &str) -> Self {
        let key_bytes = Sha256::digest(master_secret.as_bytes());
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key_bytes));
        Self { cipher }
    }
}

impl CredentialCodec for AesCredentialCodec {
    fn encrypt(&self, plaintext: &str) -> Result<String> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = self
            .cipher
            .encrypt(&nonce, plaintext.as_bytes())
            .map_err(|_| Error::CryptoFailed("encryption failed".to_string()))?;

        let mut out = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        out.extend_from_slice(&nonce);
        out.extend_from_slice(&ciphertext);
        Ok(hex::encode(out))
    }

    fn decrypt(&self, ciphertext: &str) -> Result<String> {
        let raw = hex::decode(ciphertext)
            .map_err(|_| Error::CryptoFailed("stored credential is not valid hex".to_string()))?;
        if raw.len() <= NONCE_LEN {
            return Err(Error::CryptoFailed(
                "stored credential is too short".to_string(),
            ));
        }

        let (nonce, payload) = raw.split_at(NONCE_LEN);
        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce), payload)
            .map_err(|_| Error::CryptoFailed("decryption failed".to_string()))?;

        String::from_utf8(plaintext)
            .map_err(|_| Error::CryptoFailed("decrypted credential is not UTF-8".to_string()))
    }
}

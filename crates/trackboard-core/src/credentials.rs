//! Credential codec abstraction.
//!
//! Repository passwords are never stored in the clear; a codec implementation
//! encrypts them before persistence and decrypts them only for use by the
//! sync client.

use crate::Result;

/// Trait for credential encryption backends.
pub trait CredentialCodec: Send + Sync {
    /// Encrypt a plaintext secret for storage.
    fn encrypt(&self, plaintext: &str) -> Result<String>;

    /// Decrypt a stored ciphertext back to the plaintext secret.
    fn decrypt(&self, ciphertext: &str) -> Result<String>;
}

//! PBKDF2-HMAC-SHA256 key derivation.
//!
//! Stretches a low-entropy secret into a 32-byte AES key. Deterministic for
//! identical inputs, so the salt (and the config that produced a key) must
//! be stored alongside the ciphertext it protects.

use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use zeroize::Zeroize;

use crate::error::CryptoError;
use crate::random::random_bytes;
use crate::types::{EncryptionKey, AES_KEY_LENGTH};

/// Floor on PBKDF2 rounds. Configs below this are rejected outright.
pub const MIN_ITERATIONS: u32 = 100_000;

/// Default salt length in bytes.
pub const DEFAULT_SALT_LENGTH: usize = 16;

/// Parameters for PBKDF2 derivation.
///
/// Injected at call time rather than read from process-wide state, so
/// multiple tenant configurations can coexist in one process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KdfConfig {
    /// PBKDF2 rounds, at least [`MIN_ITERATIONS`].
    pub iterations: u32,
    /// Salt length used by [`generate_salt`] when deriving fresh material.
    pub salt_length: usize,
    /// Output length; must be 32 (AES-256).
    pub key_length: usize,
}

impl Default for KdfConfig {
    fn default() -> Self {
        Self {
            iterations: MIN_ITERATIONS,
            salt_length: DEFAULT_SALT_LENGTH,
            key_length: AES_KEY_LENGTH,
        }
    }
}

/// Derive a 32-byte AES key from `secret` and `salt`.
pub fn derive_key(
    secret: &[u8],
    salt: &[u8],
    config: &KdfConfig,
) -> Result<EncryptionKey, CryptoError> {
    if config.iterations < MIN_ITERATIONS {
        return Err(CryptoError::InsufficientIterations {
            minimum: MIN_ITERATIONS,
            got: config.iterations,
        });
    }
    if config.key_length != AES_KEY_LENGTH {
        return Err(CryptoError::InvalidKdfOutputLength {
            expected: AES_KEY_LENGTH,
            got: config.key_length,
        });
    }

    let mut okm = [0u8; AES_KEY_LENGTH];
    pbkdf2_hmac::<Sha256>(secret, salt, config.iterations, &mut okm);
    let key = EncryptionKey::from_bytes(okm);
    okm.zeroize();
    Ok(key)
}

/// Generate a fresh random salt of `length` bytes.
pub fn generate_salt(length: usize) -> Result<Vec<u8>, CryptoError> {
    random_bytes(length)
}

//! Cryptographically secure byte generation.
//!
//! Fails closed: if the OS randomness source is unavailable the error is
//! surfaced, never substituted with a weaker source.

use crate::error::CryptoError;
use crate::types::AES_GCM_IV_LENGTH;

/// Fill `buf` with securely random bytes.
pub fn fill_random(buf: &mut [u8]) -> Result<(), CryptoError> {
    getrandom::getrandom(buf).map_err(|e| CryptoError::RngFailed(e.to_string()))
}

/// Return `len` securely random bytes.
pub fn random_bytes(len: usize) -> Result<Vec<u8>, CryptoError> {
    let mut buf = vec![0u8; len];
    fill_random(&mut buf)?;
    Ok(buf)
}

/// Generate a random 12-byte IV for AES-GCM.
pub fn generate_iv() -> Result<[u8; AES_GCM_IV_LENGTH], CryptoError> {
    let mut iv = [0u8; AES_GCM_IV_LENGTH];
    fill_random(&mut iv)?;
    Ok(iv)
}

//! AES-256-GCM field envelope.
//!
//! Persisted shape: `{ iv: base64(12B), data: base64(ciphertext), tag:
//! base64(16B), version }`. The tag is split from the ciphertext tail at
//! encryption time so the stored `data` is plaintext-length, and reassembled
//! before decrypt-and-verify.
//!
//! Encrypting the same plaintext under the same key twice must yield two
//! different `iv`/`data` pairs: a repeated IV under one key breaks GCM's
//! confidentiality and authenticity guarantees.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use zeroize::Zeroize;

use crate::error::CryptoError;
use crate::random::generate_iv;
use crate::types::{EncryptedField, EncryptionKey, AES_GCM_TAG_LENGTH, CURRENT_VERSION};

/// Encrypt one field value, producing a fresh envelope stamped with
/// [`CURRENT_VERSION`].
pub fn encrypt_field(
    plaintext: &str,
    key: &EncryptionKey,
) -> Result<EncryptedField, CryptoError> {
    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;
    let iv = generate_iv()?;
    let nonce = Nonce::from_slice(&iv);

    let mut sealed = cipher
        .encrypt(nonce, plaintext.as_bytes())
        .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;
    let tag = sealed.split_off(sealed.len() - AES_GCM_TAG_LENGTH);

    Ok(EncryptedField {
        iv: BASE64.encode(iv),
        data: BASE64.encode(&sealed),
        tag: BASE64.encode(&tag),
        version: CURRENT_VERSION,
    })
}

/// Decrypt-and-verify one envelope, returning the plaintext text.
///
/// The version guard runs before any decoding or cryptography: a field from
/// a newer scheme fails with [`CryptoError::UnsupportedVersion`] rather than
/// being silently mishandled by an older decrypt path. Every other failure
/// (wrong key, corrupted bytes, tampered tag, malformed encoding) collapses
/// to the undifferentiated [`CryptoError::DecryptionFailed`].
pub fn decrypt_field(
    field: &EncryptedField,
    key: &EncryptionKey,
) -> Result<String, CryptoError> {
    if field.version > CURRENT_VERSION {
        return Err(CryptoError::UnsupportedVersion(field.version));
    }

    let iv = field.decode_iv()?;
    let data = field.decode_data()?;
    let tag = field.decode_tag()?;

    let mut sealed = Vec::with_capacity(data.len() + tag.len());
    sealed.extend_from_slice(&data);
    sealed.extend_from_slice(&tag);

    let cipher =
        Aes256Gcm::new_from_slice(key.as_bytes()).map_err(|_| CryptoError::DecryptionFailed)?;
    let nonce = Nonce::from_slice(&iv);
    let plaintext = cipher
        .decrypt(nonce, sealed.as_slice())
        .map_err(|_| CryptoError::DecryptionFailed)?;

    String::from_utf8(plaintext).map_err(|e| {
        let mut bytes = e.into_bytes();
        bytes.zeroize();
        CryptoError::DecryptionFailed
    })
}

//! Shared constants and core types.
//!
//! `EncryptedField` is the storage/wire contract: any external persistence
//! layer or cross-service reader must preserve it byte-for-byte. The 12-byte
//! IV and 16-byte tag are interoperability anchors; changing either requires
//! bumping `CURRENT_VERSION` and keeping the old decrypt path alive until all
//! existing data is rotated.

use std::fmt;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::CryptoError;

/// AES-256 key length in bytes.
pub const AES_KEY_LENGTH: usize = 32;

/// AES-GCM IV length in bytes (96-bit nonce).
pub const AES_GCM_IV_LENGTH: usize = 12;

/// AES-GCM authentication tag length in bytes.
pub const AES_GCM_TAG_LENGTH: usize = 16;

/// Version stamped on newly produced ciphertexts.
pub const CURRENT_VERSION: u32 = 1;

/// The persisted representation of one protected value.
///
/// `data` holds the ciphertext without the tag (plaintext length), so the
/// tag is split from the ciphertext tail at encryption time and reassembled
/// before decryption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedField {
    /// Random 12-byte nonce, base64-encoded. Fresh on every encryption.
    pub iv: String,
    /// Ciphertext bytes (no tag), base64-encoded.
    pub data: String,
    /// 16-byte authentication tag, base64-encoded.
    pub tag: String,
    /// Algorithm-parameter version that produced this value.
    pub version: u32,
}

impl EncryptedField {
    /// Decode the IV, enforcing the 12-byte length. Any malformation maps to
    /// the undifferentiated `DecryptionFailed`.
    pub(crate) fn decode_iv(&self) -> Result<[u8; AES_GCM_IV_LENGTH], CryptoError> {
        let bytes = BASE64
            .decode(&self.iv)
            .map_err(|_| CryptoError::DecryptionFailed)?;
        bytes.try_into().map_err(|_| CryptoError::DecryptionFailed)
    }

    pub(crate) fn decode_data(&self) -> Result<Vec<u8>, CryptoError> {
        BASE64
            .decode(&self.data)
            .map_err(|_| CryptoError::DecryptionFailed)
    }

    pub(crate) fn decode_tag(&self) -> Result<[u8; AES_GCM_TAG_LENGTH], CryptoError> {
        let bytes = BASE64
            .decode(&self.tag)
            .map_err(|_| CryptoError::DecryptionFailed)?;
        bytes.try_into().map_err(|_| CryptoError::DecryptionFailed)
    }
}

/// Raw AES-256 key material, exactly 32 bytes.
///
/// The fixed-size array makes the length check a construction-time concern:
/// once an `EncryptionKey` exists, every cipher call can rely on it. Key
/// bytes are wiped when the value is dropped.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct EncryptionKey([u8; AES_KEY_LENGTH]);

impl EncryptionKey {
    pub fn from_bytes(bytes: [u8; AES_KEY_LENGTH]) -> Self {
        Self(bytes)
    }

    /// The single runtime length check at the API boundary. Keys supplied by
    /// the external secret-management service come through here.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CryptoError> {
        let array: [u8; AES_KEY_LENGTH] =
            bytes
                .try_into()
                .map_err(|_| CryptoError::InvalidKeyLength {
                    expected: AES_KEY_LENGTH,
                    got: bytes.len(),
                })?;
        Ok(Self(array))
    }

    pub fn as_bytes(&self) -> &[u8; AES_KEY_LENGTH] {
        &self.0
    }
}

impl fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EncryptionKey([REDACTED, {} bytes])", AES_KEY_LENGTH)
    }
}

/// A record field is either still plaintext or already an envelope.
///
/// The compiler enforces the distinction that the orchestrator relies on;
/// there is no runtime shape-sniffing. Serialized untagged so an encrypted
/// field stores as the `EncryptedField` object and a plaintext field as a
/// bare string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Encrypted(EncryptedField),
    Plaintext(String),
}

impl FieldValue {
    pub fn is_encrypted(&self) -> bool {
        matches!(self, FieldValue::Encrypted(_))
    }

    pub fn as_plaintext(&self) -> Option<&str> {
        match self {
            FieldValue::Plaintext(value) => Some(value),
            FieldValue::Encrypted(_) => None,
        }
    }

    pub fn as_encrypted(&self) -> Option<&EncryptedField> {
        match self {
            FieldValue::Encrypted(field) => Some(field),
            FieldValue::Plaintext(_) => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Plaintext(value.to_string())
    }
}

impl From<EncryptedField> for FieldValue {
    fn from(field: EncryptedField) -> Self {
        FieldValue::Encrypted(field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_field() -> EncryptedField {
        EncryptedField {
            iv: BASE64.encode([7u8; AES_GCM_IV_LENGTH]),
            data: BASE64.encode(b"ciphertext"),
            tag: BASE64.encode([9u8; AES_GCM_TAG_LENGTH]),
            version: CURRENT_VERSION,
        }
    }

    #[test]
    fn encrypted_field_wire_shape() {
        let json = serde_json::to_value(sample_field()).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), 4);
        assert!(obj["iv"].is_string());
        assert!(obj["data"].is_string());
        assert!(obj["tag"].is_string());
        assert_eq!(obj["version"], 1);
    }

    #[test]
    fn encrypted_field_serde_round_trip() {
        let field = sample_field();
        let json = serde_json::to_string(&field).unwrap();
        let back: EncryptedField = serde_json::from_str(&json).unwrap();
        assert_eq!(back, field);
    }

    #[test]
    fn field_value_untagged_serde() {
        let plain = FieldValue::Plaintext("hello".into());
        assert_eq!(serde_json::to_string(&plain).unwrap(), "\"hello\"");

        let enc = FieldValue::Encrypted(sample_field());
        let json = serde_json::to_string(&enc).unwrap();
        let back: FieldValue = serde_json::from_str(&json).unwrap();
        assert!(back.is_encrypted());

        let back_plain: FieldValue = serde_json::from_str("\"hello\"").unwrap();
        assert_eq!(back_plain.as_plaintext(), Some("hello"));
    }

    #[test]
    fn key_from_slice_enforces_length() {
        assert!(EncryptionKey::from_slice(&[0u8; 32]).is_ok());
        let err = EncryptionKey::from_slice(&[0u8; 16]).unwrap_err();
        assert!(matches!(
            err,
            CryptoError::InvalidKeyLength {
                expected: 32,
                got: 16
            }
        ));
        assert!(EncryptionKey::from_slice(&[0u8; 64]).is_err());
    }

    #[test]
    fn key_debug_is_redacted() {
        let key = EncryptionKey::from_bytes([0x42; 32]);
        let debug = format!("{:?}", key);
        assert!(debug.contains("REDACTED"));
        assert!(!debug.contains("42"));
    }

    #[test]
    fn decode_rejects_wrong_iv_length() {
        let mut field = sample_field();
        field.iv = BASE64.encode([7u8; 8]);
        assert!(matches!(
            field.decode_iv().unwrap_err(),
            CryptoError::DecryptionFailed
        ));
    }

    #[test]
    fn decode_rejects_garbage_base64() {
        let mut field = sample_field();
        field.data = "not base64!!!".into();
        assert!(matches!(
            field.decode_data().unwrap_err(),
            CryptoError::DecryptionFailed
        ));
    }
}

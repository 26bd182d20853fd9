//! Field-level encryption engine for multi-tenant records.
//!
//! Protects sensitive attributes (tax IDs, bank account numbers, API
//! secrets) with AES-256-GCM envelopes: PBKDF2 key derivation, per-record
//! and batch field orchestration, key rotation, and key-independent display
//! masking. Persistence of the resulting [`EncryptedField`] blobs and
//! master-key management belong to external collaborators.
//!
//! All operations are synchronous and free of shared mutable state; key
//! material is borrowed per call and never cached.

pub mod catalog;
pub mod cipher;
pub mod error;
pub mod fields;
pub mod kdf;
pub mod masking;
pub mod random;
pub mod rotation;
pub mod types;

pub use catalog::SensitiveFieldCatalog;
pub use cipher::{decrypt_field, encrypt_field};
pub use error::CryptoError;
pub use fields::{
    decrypt_batch, decrypt_fields, encrypt_batch, encrypt_fields, read_field, BatchFailure,
    BatchReport, FieldFailure, FieldReadback, Record,
};
pub use kdf::{derive_key, generate_salt, KdfConfig, DEFAULT_SALT_LENGTH, MIN_ITERATIONS};
pub use masking::{mask, mask_bank_account, mask_ssn, ACCOUNT_MASK, SSN_MASK};
pub use random::{fill_random, generate_iv, random_bytes};
pub use rotation::{rotate_batch, rotate_field, rotate_record_fields};
pub use types::{
    EncryptedField, EncryptionKey, FieldValue, AES_GCM_IV_LENGTH, AES_GCM_TAG_LENGTH,
    AES_KEY_LENGTH, CURRENT_VERSION,
};

//! Key rotation: decrypt under the old key, re-encrypt under the new one.
//!
//! Rotation is never an in-place ciphertext transform. It always round-trips
//! through plaintext with full tag verification, so corruption in the
//! original ciphertext is caught during the decrypt half rather than
//! propagated under the new key. The recovered plaintext is ephemeral and
//! wiped once the new envelope exists.

use std::sync::atomic::AtomicBool;

use tracing::{debug, warn};
use zeroize::Zeroize;

use crate::cipher::{decrypt_field, encrypt_field};
use crate::error::CryptoError;
use crate::fields::{is_cancelled, BatchFailure, BatchReport, FieldFailure, Record};
use crate::types::{EncryptedField, EncryptionKey, FieldValue};

/// Re-encrypt one envelope under `new_key`, returning a structurally new
/// field with a fresh IV and tag at the current version.
pub fn rotate_field(
    field: &EncryptedField,
    old_key: &EncryptionKey,
    new_key: &EncryptionKey,
) -> Result<EncryptedField, CryptoError> {
    let mut plaintext = decrypt_field(field, old_key)?;
    let rotated = encrypt_field(&plaintext, new_key);
    plaintext.zeroize();
    rotated
}

/// Rotate every named field currently in encrypted form. Plaintext or
/// absent fields are left alone (nothing to rotate).
///
/// A field that fails to decrypt under `old_key` is logged, left under the
/// old key, and reported; randomness or key failures on the re-encrypt half
/// are fatal and abort the call.
pub fn rotate_record_fields(
    record: &mut Record,
    field_names: &[&str],
    old_key: &EncryptionKey,
    new_key: &EncryptionKey,
) -> Result<Vec<FieldFailure>, CryptoError> {
    let mut failures = Vec::new();
    for name in field_names {
        let Some(FieldValue::Encrypted(sealed)) = record.get(*name) else {
            continue;
        };
        match rotate_field(sealed, old_key, new_key) {
            Ok(rotated) => {
                record.insert((*name).to_string(), FieldValue::Encrypted(rotated));
            }
            Err(error @ (CryptoError::RngFailed(_) | CryptoError::EncryptionFailed(_))) => {
                return Err(error);
            }
            Err(error) => {
                warn!(field = *name, %error, "field left under old key after rotation failure");
                failures.push(FieldFailure {
                    field: (*name).to_string(),
                    error,
                });
            }
        }
    }
    Ok(failures)
}

/// Rotate a batch of records with the same cancellation contract as the
/// field orchestrator: a set flag stops scheduling further records, and a
/// record in flight runs to completion.
pub fn rotate_batch(
    records: &mut [Record],
    field_names: &[&str],
    old_key: &EncryptionKey,
    new_key: &EncryptionKey,
    cancel: Option<&AtomicBool>,
) -> Result<BatchReport, CryptoError> {
    let mut report = BatchReport::default();
    for (index, record) in records.iter_mut().enumerate() {
        if is_cancelled(cancel) {
            report.cancelled = true;
            break;
        }
        for failure in rotate_record_fields(record, field_names, old_key, new_key)? {
            report.failures.push(BatchFailure {
                record: index,
                field: failure.field,
                error: failure.error,
            });
        }
        report.processed += 1;
    }
    debug!(
        processed = report.processed,
        failures = report.failures.len(),
        cancelled = report.cancelled,
        "rotation batch complete"
    );
    Ok(report)
}

//! Per-record and batch field orchestration.
//!
//! Single-field primitives fail immediately and precisely; orchestration
//! catches per-field decrypt failures, logs them, leaves the field in its
//! encrypted form, and reports them to the caller. One corrupted field never
//! aborts reading the rest of a record or batch.
//!
//! Records are independent: batch operations share no mutable state and are
//! safe to run across threads. A cancellation flag stops scheduling further
//! records; the record in flight always completes, so a field is never left
//! half-processed.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, warn};

use crate::cipher::{decrypt_field, encrypt_field};
use crate::error::CryptoError;
use crate::types::{EncryptionKey, FieldValue};

/// One record's protected surface: field name to value. Absent keys mean
/// "no value present".
pub type Record = BTreeMap<String, FieldValue>;

/// One field that could not be processed. The field keeps its encrypted
/// form in the record.
#[derive(Debug)]
pub struct FieldFailure {
    pub field: String,
    pub error: CryptoError,
}

/// Per-record failure within a batch.
#[derive(Debug)]
pub struct BatchFailure {
    pub record: usize,
    pub field: String,
    pub error: CryptoError,
}

/// Best-effort outcome of a batch operation.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Records processed before completion or cancellation.
    pub processed: usize,
    /// Whether the cancellation flag stopped the batch early.
    pub cancelled: bool,
    pub failures: Vec<BatchFailure>,
}

impl BatchReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && !self.cancelled
    }
}

/// UI-facing readback of one field: distinguishes "no value present" from
/// "present but unable to decrypt".
#[derive(Debug, PartialEq, Eq)]
pub enum FieldReadback {
    Missing,
    Plaintext(String),
    Undecryptable,
}

/// Encrypt each named field that holds a non-empty plaintext value.
///
/// Fields already in encrypted form are left untouched (idempotent, prevents
/// double-wrapping); absent or empty fields are skipped rather than encrypted
/// as empty ciphertext. Returns the number of fields encrypted. Key and
/// randomness failures are fatal and abort the call.
pub fn encrypt_fields(
    record: &mut Record,
    field_names: &[&str],
    key: &EncryptionKey,
) -> Result<usize, CryptoError> {
    let mut encrypted = 0;
    for name in field_names {
        let plaintext = match record.get(*name) {
            None => continue,
            Some(FieldValue::Encrypted(_)) => continue,
            Some(FieldValue::Plaintext(p)) if p.is_empty() => continue,
            Some(FieldValue::Plaintext(p)) => p.clone(),
        };
        let sealed = encrypt_field(&plaintext, key)?;
        record.insert((*name).to_string(), FieldValue::Encrypted(sealed));
        encrypted += 1;
    }
    Ok(encrypted)
}

/// Decrypt each named field that holds an encrypted value.
///
/// A field that fails to decrypt is logged, left encrypted, and included in
/// the returned report; the rest of the record is still processed.
pub fn decrypt_fields(
    record: &mut Record,
    field_names: &[&str],
    key: &EncryptionKey,
) -> Vec<FieldFailure> {
    let mut failures = Vec::new();
    for name in field_names {
        let Some(FieldValue::Encrypted(sealed)) = record.get(*name) else {
            continue;
        };
        match decrypt_field(sealed, key) {
            Ok(plaintext) => {
                record.insert((*name).to_string(), FieldValue::Plaintext(plaintext));
            }
            Err(error) => {
                warn!(field = *name, %error, "field left encrypted after decrypt failure");
                failures.push(FieldFailure {
                    field: (*name).to_string(),
                    error,
                });
            }
        }
    }
    failures
}

/// Apply [`encrypt_fields`] to each record. Records are independent; there
/// is no cross-record atomicity. A set cancellation flag stops the batch
/// before the next record.
pub fn encrypt_batch(
    records: &mut [Record],
    field_names: &[&str],
    key: &EncryptionKey,
    cancel: Option<&AtomicBool>,
) -> Result<BatchReport, CryptoError> {
    let mut report = BatchReport::default();
    for record in records.iter_mut() {
        if is_cancelled(cancel) {
            report.cancelled = true;
            break;
        }
        encrypt_fields(record, field_names, key)?;
        report.processed += 1;
    }
    debug!(
        processed = report.processed,
        cancelled = report.cancelled,
        "encrypt batch complete"
    );
    Ok(report)
}

/// Apply [`decrypt_fields`] to each record, collecting per-field failures
/// into a best-effort report instead of failing the batch.
pub fn decrypt_batch(
    records: &mut [Record],
    field_names: &[&str],
    key: &EncryptionKey,
    cancel: Option<&AtomicBool>,
) -> BatchReport {
    let mut report = BatchReport::default();
    for (index, record) in records.iter_mut().enumerate() {
        if is_cancelled(cancel) {
            report.cancelled = true;
            break;
        }
        for failure in decrypt_fields(record, field_names, key) {
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
        "decrypt batch complete"
    );
    report
}

/// Read one field for display: `Missing`, the plaintext, or an explicit
/// `Undecryptable` marker. Never exposes the raw cryptographic error.
pub fn read_field(record: &Record, name: &str, key: &EncryptionKey) -> FieldReadback {
    match record.get(name) {
        None => FieldReadback::Missing,
        Some(FieldValue::Plaintext(p)) => FieldReadback::Plaintext(p.clone()),
        Some(FieldValue::Encrypted(sealed)) => match decrypt_field(sealed, key) {
            Ok(plaintext) => FieldReadback::Plaintext(plaintext),
            Err(error) => {
                warn!(field = name, %error, "field unreadable for display");
                FieldReadback::Undecryptable
            }
        },
    }
}

pub(crate) fn is_cancelled(cancel: Option<&AtomicBool>) -> bool {
    cancel.is_some_and(|flag| flag.load(Ordering::Relaxed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::STANDARD as BASE64;
    use base64::Engine;

    fn random_key() -> EncryptionKey {
        let mut bytes = [0u8; 32];
        getrandom::getrandom(&mut bytes).unwrap();
        EncryptionKey::from_bytes(bytes)
    }

    fn employee_record() -> Record {
        let mut record = Record::new();
        record.insert("ssn".into(), "123-45-6789".into());
        record.insert("bank_account_number".into(), "000123456789".into());
        record.insert("first_name".into(), "Ada".into());
        record
    }

    const NAMES: &[&str] = &["ssn", "bank_account_number", "tax_id"];

    #[test]
    fn encrypts_present_fields_and_skips_absent() {
        let key = random_key();
        let mut record = employee_record();
        let count = encrypt_fields(&mut record, NAMES, &key).unwrap();
        assert_eq!(count, 2); // tax_id absent
        assert!(record["ssn"].is_encrypted());
        assert!(record["bank_account_number"].is_encrypted());
        assert_eq!(record["first_name"].as_plaintext(), Some("Ada"));
        assert!(!record.contains_key("tax_id"));
    }

    #[test]
    fn empty_plaintext_is_skipped() {
        let key = random_key();
        let mut record = Record::new();
        record.insert("ssn".into(), "".into());
        let count = encrypt_fields(&mut record, NAMES, &key).unwrap();
        assert_eq!(count, 0);
        assert_eq!(record["ssn"].as_plaintext(), Some(""));
    }

    #[test]
    fn double_encrypt_is_idempotent() {
        let key = random_key();
        let mut record = employee_record();
        encrypt_fields(&mut record, NAMES, &key).unwrap();
        let first = record.clone();

        let count = encrypt_fields(&mut record, NAMES, &key).unwrap();
        assert_eq!(count, 0);
        assert_eq!(record, first); // no double-wrapping, same envelopes
    }

    #[test]
    fn decrypt_restores_plaintext() {
        let key = random_key();
        let mut record = employee_record();
        encrypt_fields(&mut record, NAMES, &key).unwrap();

        let failures = decrypt_fields(&mut record, NAMES, &key);
        assert!(failures.is_empty());
        assert_eq!(record["ssn"].as_plaintext(), Some("123-45-6789"));
        assert_eq!(
            record["bank_account_number"].as_plaintext(),
            Some("000123456789")
        );
    }

    #[test]
    fn one_corrupted_field_does_not_abort_the_rest() {
        let key = random_key();
        let mut record = employee_record();
        encrypt_fields(&mut record, NAMES, &key).unwrap();

        // Corrupt the ssn ciphertext only.
        if let Some(FieldValue::Encrypted(sealed)) = record.get_mut("ssn") {
            let mut data = BASE64.decode(&sealed.data).unwrap();
            data[0] ^= 0xff;
            sealed.data = BASE64.encode(&data);
        }

        let failures = decrypt_fields(&mut record, NAMES, &key);
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].field, "ssn");
        assert!(matches!(failures[0].error, CryptoError::DecryptionFailed));
        // The corrupted field stays encrypted, the other one decrypted.
        assert!(record["ssn"].is_encrypted());
        assert_eq!(
            record["bank_account_number"].as_plaintext(),
            Some("000123456789")
        );
    }

    #[test]
    fn plaintext_fields_pass_through_decrypt() {
        let key = random_key();
        let mut record = employee_record();
        let failures = decrypt_fields(&mut record, NAMES, &key);
        assert!(failures.is_empty());
        assert_eq!(record["ssn"].as_plaintext(), Some("123-45-6789"));
    }

    #[test]
    fn batch_round_trip() {
        let key = random_key();
        let mut records = vec![employee_record(), employee_record(), employee_record()];
        let report = encrypt_batch(&mut records, NAMES, &key, None).unwrap();
        assert_eq!(report.processed, 3);
        assert!(report.is_clean());

        let report = decrypt_batch(&mut records, NAMES, &key, None);
        assert_eq!(report.processed, 3);
        assert!(report.is_clean());
        for record in &records {
            assert_eq!(record["ssn"].as_plaintext(), Some("123-45-6789"));
        }
    }

    #[test]
    fn batch_failures_name_the_record() {
        let key = random_key();
        let mut records = vec![employee_record(), employee_record()];
        encrypt_batch(&mut records, NAMES, &key, None).unwrap();

        if let Some(FieldValue::Encrypted(sealed)) = records[1].get_mut("ssn") {
            sealed.tag = BASE64.encode([0u8; 16]);
        }

        let report = decrypt_batch(&mut records, NAMES, &key, None);
        assert_eq!(report.processed, 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].record, 1);
        assert_eq!(report.failures[0].field, "ssn");
    }

    #[test]
    fn pre_set_cancel_flag_stops_before_first_record() {
        let key = random_key();
        let mut records = vec![employee_record(), employee_record()];
        let cancel = AtomicBool::new(true);

        let report = encrypt_batch(&mut records, NAMES, &key, Some(&cancel)).unwrap();
        assert!(report.cancelled);
        assert_eq!(report.processed, 0);
        // Nothing half-encrypted.
        assert_eq!(records[0]["ssn"].as_plaintext(), Some("123-45-6789"));
    }

    #[test]
    fn read_field_three_way() {
        let key = random_key();
        let mut record = employee_record();
        encrypt_fields(&mut record, NAMES, &key).unwrap();

        assert_eq!(read_field(&record, "tax_id", &key), FieldReadback::Missing);
        assert_eq!(
            read_field(&record, "ssn", &key),
            FieldReadback::Plaintext("123-45-6789".into())
        );

        let wrong_key = random_key();
        assert_eq!(
            read_field(&record, "ssn", &wrong_key),
            FieldReadback::Undecryptable
        );
    }
}

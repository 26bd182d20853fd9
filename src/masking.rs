//! Partial, non-reversible display representations.
//!
//! Masking is strictly weaker than decrypting: no function here ever touches
//! key material. Given an encrypted field, the masks short-circuit to a
//! fixed pattern without attempting decryption, so UI code that only needs a
//! display hint never requests a key.

use crate::types::FieldValue;

/// Fixed pattern returned for encrypted or malformed SSN values.
pub const SSN_MASK: &str = "***-**-****";

/// Fixed pattern returned for encrypted or malformed account numbers.
pub const ACCOUNT_MASK: &str = "********";

/// Replace all but the last `visible_chars` characters with `mask_char`.
///
/// A value no longer than `visible_chars` is masked entirely: partial
/// masking must never leak a short secret in full.
pub fn mask(value: &str, visible_chars: usize, mask_char: char) -> String {
    let total = value.chars().count();
    if total <= visible_chars {
        return std::iter::repeat(mask_char).take(total).collect();
    }
    let hidden = total - visible_chars;
    let mut masked: String = std::iter::repeat(mask_char).take(hidden).collect();
    masked.extend(value.chars().skip(hidden));
    masked
}

/// SSN display hint: `***-**-XXXX` for plaintext normalizing to exactly nine
/// digits, the fully-masked pattern for anything else (including any
/// encrypted field).
pub fn mask_ssn(value: &FieldValue) -> String {
    let FieldValue::Plaintext(plaintext) = value else {
        return SSN_MASK.to_string();
    };
    let digits = digits_of(plaintext);
    if digits.len() != 9 {
        // Malformed plaintext gets the full pattern, never a partially
        // correct one.
        return SSN_MASK.to_string();
    }
    format!("***-**-{}", &digits[5..])
}

/// Bank-account display hint: last four digits visible for plaintext with a
/// plausible digit count (4–17), fully masked otherwise.
pub fn mask_bank_account(value: &FieldValue) -> String {
    let FieldValue::Plaintext(plaintext) = value else {
        return ACCOUNT_MASK.to_string();
    };
    let digits = digits_of(plaintext);
    if digits.len() < 4 || digits.len() > 17 {
        return ACCOUNT_MASK.to_string();
    }
    mask(&digits, 4, '*')
}

fn digits_of(value: &str) -> String {
    value.chars().filter(|c| c.is_ascii_digit()).collect()
}

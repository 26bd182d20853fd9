use thiserror::Error;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("Invalid key length: expected {expected} bytes, got {got}")]
    InvalidKeyLength { expected: usize, got: usize },

    /// The ciphertext was produced by a newer scheme than this build
    /// understands. Raised before any cryptographic work is attempted.
    #[error("Unsupported ciphertext version: {0}")]
    UnsupportedVersion(u32),

    /// Wrong key, corrupted bytes, or a tampered tag. Deliberately carries
    /// no detail about which check failed.
    #[error("Decryption failed")]
    DecryptionFailed,

    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Random number generation failed: {0}")]
    RngFailed(String),

    #[error("Insufficient PBKDF2 iterations: minimum {minimum}, got {got}")]
    InsufficientIterations { minimum: u32, got: u32 },

    #[error("Invalid derived key length: expected {expected} bytes, got {got}")]
    InvalidKdfOutputLength { expected: usize, got: usize },
}

//! Cryptographic error types.

use thiserror::Error;

/// Errors that can occur during cryptographic operations.
///
/// `AuthenticationFailed` and `InvalidSignature` are the expected runtime
/// failures of decryption and verification. They are kept apart from the
/// configuration and malformed-input variants so callers can branch on
/// "integrity check failed" explicitly. Neither is worth retrying.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// The secure random source could not produce bytes.
    #[error("random source failed: {0}")]
    RandomSourceFailed(String),

    /// Key generation failed.
    #[error("key generation failed: {0}")]
    KeyGenerationFailed(String),

    /// Encryption failed.
    #[error("encryption failed: {0}")]
    EncryptionFailed(String),

    /// The AEAD tag did not match: tampered ciphertext, wrong key, wrong
    /// nonce or wrong associated data.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// Signature creation failed.
    #[error("signature creation failed: {0}")]
    SignatureFailed(String),

    /// The signature does not match the message under this public key and
    /// these parameters.
    #[error("invalid signature")]
    InvalidSignature,

    /// Invalid key format or size.
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// Configuration below the documented minimums.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Invalid input data.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

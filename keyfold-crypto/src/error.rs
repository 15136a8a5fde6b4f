//! Crypto error types.

use thiserror::Error;

/// Result type for crypto operations.
pub type CryptoResult<T> = Result<T, CryptoError>;

/// Errors that can occur in cryptographic operations.
///
/// [`CryptoError::Authentication`] is always distinct from format and
/// configuration failures so callers can tell "wrong master password"
/// apart from "corrupted input" or "bad parameters".
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Invalid KDF or generator parameters.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// AEAD or MAC verification failed — wrong key or tampered data.
    /// No partial plaintext is ever returned alongside this.
    #[error("authentication failed (wrong key or tampered data)")]
    Authentication,

    /// Blob carries a version this build has no decoder for.
    #[error("unsupported blob version {0}")]
    UnsupportedVersion(u16),

    /// Blob is not valid base64url or is too short for its layout.
    #[error("malformed blob: {0}")]
    Malformed(String),

    /// Public or private key import failed.
    #[error("invalid key encoding: {0}")]
    KeyFormat(String),

    /// Decrypted key material had the wrong length.
    #[error("invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    /// Key derivation backend failure.
    #[error("key derivation failed: {0}")]
    KeyDerivation(String),

    /// AEAD encryption failed.
    #[error("encryption failed: {0}")]
    Encryption(String),

    /// OS random generator unavailable.
    #[error("random generator unavailable: {0}")]
    Rng(String),
}

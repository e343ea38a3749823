//! Error types for ferry-crypt.

use thiserror::Error;

/// All errors the encryption library can report.
#[derive(Debug, Error)]
pub enum CryptError {
    /// The encrypted input is malformed, truncated, or fails
    /// authentication.
    #[error("encrypted message seems corrupted")]
    CorruptedMessage,

    /// The envelope declares a version this library cannot handle.
    #[error("unsupported key envelope version: {version}")]
    UnsupportedVersion { version: u32 },

    /// Key generation failed in the crypto backend.
    #[error("key generation failed")]
    KeyGeneration,

    /// Unspecified crypto backend failure.
    #[error("crypto backend failure")]
    Crypto(#[from] ring::error::Unspecified),

    /// Envelope JSON (de)serialization error.
    #[error("envelope encoding error: {0}")]
    Json(#[from] serde_json::Error),
}

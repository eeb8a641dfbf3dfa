//! Error types for content key protection.

use thiserror::Error;

/// Errors that can occur while protecting or unprotecting content keys.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtectError {
    /// Sealing or wrapping failed, or an input could not be encrypted.
    #[error("encryption error: {0}")]
    Encryption(String),

    /// An AEAD tag did not verify under a recovered key.
    #[error("decryption error: {0}")]
    Decryption(String),

    /// The document is encrypted and no recipient identity has unlocked it.
    #[error("document key unavailable: the document has not been decrypted")]
    DocumentKeyUnavailable,
}

/// Result type for protection operations.
pub type Result<T> = std::result::Result<T, ProtectError>;

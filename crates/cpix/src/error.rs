//! Error types for document operations.

use cpix_core::{NotDecryptedError, ValidationError};
use cpix_dsig::SigningError;
use cpix_protect::ProtectError;
use cpix_xml::FormatError;
use thiserror::Error;

/// Errors that can occur while building, saving or loading a document.
#[derive(Debug, Error)]
pub enum CpixError {
    /// A mutation would violate a document invariant.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Malformed or schema-violating input.
    #[error("format error: {0}")]
    Format(#[from] FormatError),

    /// Content key encryption or decryption failed.
    #[error("protection error: {0}")]
    Protect(#[from] ProtectError),

    /// A signature could not be created.
    #[error("signing error: {0}")]
    Signing(#[from] SigningError),

    /// A content key value was read before the document was decrypted.
    #[error(transparent)]
    NotDecrypted(#[from] NotDecryptedError),
}

/// Result type for document operations.
pub type Result<T> = std::result::Result<T, CpixError>;

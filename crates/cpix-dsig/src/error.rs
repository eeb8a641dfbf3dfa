//! Error types for signing and verification.

use thiserror::Error;

use cpix_core::Fingerprint;
use cpix_xml::FormatError;

/// Errors that abort signature creation. Fatal to the save that triggered it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SigningError {
    /// A pending signature's credential was not supplied, or a stale one was
    /// not re-requested.
    #[error("{scope} signature by {signer} needs its signer's credential")]
    MissingCredential { scope: String, signer: Fingerprint },

    /// A credential was supplied for a signature made by someone else.
    #[error("credential {got} does not match signer {expected}")]
    CredentialMismatch {
        expected: Fingerprint,
        got: Fingerprint,
    },

    /// The element a signature should reference is not in the document.
    #[error("signature reference target not found: {0}")]
    ScopeMissing(String),

    #[error(transparent)]
    Format(#[from] FormatError),
}

/// Why a signature failed verification. Non-fatal: reported per signature.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum VerificationFailure {
    /// Digest or signature mismatch: tampering, corruption, or a stale signature.
    #[error("signature does not match the signed content")]
    SignatureInvalid,

    /// The trust policy rejected the signer's certificate.
    #[error("signer certificate is not trusted")]
    CertificateUntrusted,

    /// The signature references content that is no longer present.
    #[error("signed content is missing")]
    ScopeMissing,
}

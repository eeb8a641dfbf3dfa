//! Error types for the CPIX core.

use thiserror::Error;

use crate::types::{Fingerprint, KeyId};

/// Core errors raised by the cryptographic primitives.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid signature")]
    InvalidSignature,

    #[error("invalid public key")]
    InvalidPublicKey,

    #[error("certificate error: {0}")]
    Certificate(#[from] CertificateError),
}

/// Errors decoding an encoded certificate.
#[derive(Debug, Error)]
pub enum CertificateError {
    #[error("malformed certificate: {0}")]
    Malformed(String),

    #[error("unsupported key algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("invalid key length: expected 32, got {0}")]
    InvalidKeyLength(usize),
}

/// Model invariant violations, raised by the mutating call.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("content key {0} already exists in the document")]
    DuplicateKeyId(KeyId),

    #[error("content key {0} does not exist in the document")]
    UnknownKeyId(KeyId),

    #[error("content key {0} is still referenced by a usage rule")]
    KeyInUse(KeyId),

    #[error("content key value must be 16 bytes, got {0}")]
    InvalidKeyLength(usize),

    #[error("time filter start must be before its end")]
    InvalidTimeWindow,

    #[error("video filter minimum pixels {min} exceeds maximum {max}")]
    InvalidPixelRange { min: u64, max: u64 },

    #[error("bitrate filter minimum {min} exceeds maximum {max}")]
    InvalidBitrateRange { min: u64, max: u64 },

    #[error("label filter must not be empty")]
    EmptyLabel,

    #[error("usage rule index {0} is out of range")]
    UnknownUsageRule(usize),

    #[error("recipient {0} already exists in the document")]
    DuplicateRecipient(Fingerprint),

    #[error("recipient {0} does not exist in the document")]
    UnknownRecipient(Fingerprint),

    #[error("certificate {0} cannot be used for this purpose")]
    UnsuitableCertificate(Fingerprint),

    #[error("a {scope} signature by {signer} already exists")]
    DuplicateSignature { scope: String, signer: Fingerprint },

    #[error("no {scope} signature by {signer} exists")]
    UnknownSignature { scope: String, signer: Fingerprint },

    #[error("{scope} is covered by a finalized signature")]
    SignedScope { scope: String },
}

/// Reading a content key value that is still encrypted.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("content key {key_id} has not been decrypted")]
pub struct NotDecryptedError {
    pub key_id: KeyId,
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

//! # CPIX Core
//!
//! Pure primitives for the CPIX engine: content keys, usage rules,
//! certificates, and model validation.
//!
//! This crate contains no I/O and no XML. It is pure computation over the
//! document's value types.
//!
//! ## Key Types
//!
//! - [`ContentKey`] - A 16-byte content key and its protection state
//! - [`KeyId`] - 128-bit content key identifier
//! - [`UsageRule`] - Binds a content key to filter conditions
//! - [`Certificate`] - Subject plus a signing or key-agreement public key
//! - [`SigningIdentity`] / [`RecipientIdentity`] - Caller-owned private keys
//!
//! ## Canonicalization
//!
//! Certificates are encoded using deterministic CBOR. See [`canonical`] module.

pub mod canonical;
pub mod certificate;
pub mod content_key;
pub mod crypto;
pub mod error;
pub mod types;
pub mod usage_rule;
pub mod validation;

pub use certificate::{Certificate, PublicKey, RecipientIdentity, SigningIdentity};
pub use content_key::{ContentKey, ContentKeyValue, KeyValue, SealedValue, CONTENT_KEY_LEN};
pub use crypto::{
    Ed25519PublicKey, Ed25519Signature, Keypair, Sha256Digest, X25519PublicKey,
    X25519StaticSecret,
};
pub use error::{CertificateError, CoreError, NotDecryptedError, ValidationError};
pub use types::{Fingerprint, KeyId};
pub use usage_rule::{
    AssignmentRule, AudioFilter, BitrateFilter, LabelFilter, TimeFilter, UsageRule, VideoFilter,
};
pub use validation::{validate_filters, validate_unique_key, validate_usage_rule};

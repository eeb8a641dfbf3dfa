//! # CPIX
//!
//! Build, protect, sign, save and load CPIX documents: the XML format that
//! carries DRM content keys from a key server to packagers.
//!
//! ## Overview
//!
//! A [`CpixDocument`] holds:
//!
//! - **Content keys**: 16-byte keys identified by a [`KeyId`]
//! - **Recipients**: certificates the content keys are encrypted for
//! - **Usage rules**: which key applies under which time, video, audio,
//!   bitrate or label conditions
//! - **Signatures**: over the content key list, the usage rule list, or the
//!   whole document
//!
//! Encryption and signing are optional and independent. With recipients,
//! every content key is sealed under a random document key and that key is
//! wrapped once per recipient. Signatures are requested on the document with
//! the signer's certificate and computed by [`CpixDocument::save_signed`],
//! which takes the signing credentials for that call only. The document
//! signature is always computed last.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use cpix::{ContentKey, CpixDocument, RecipientIdentity, SigningIdentity};
//!
//! fn example() -> cpix::Result<()> {
//!     let author = SigningIdentity::generate("Author1");
//!     let recipient = RecipientIdentity::generate("Recipient1");
//!
//!     let mut document = CpixDocument::new();
//!     document.add_content_key(ContentKey::generate())?;
//!     document.add_recipient(recipient.certificate().clone())?;
//!     document.add_content_key_signature(author.certificate())?;
//!     document.set_document_signature(author.certificate())?;
//!     let bytes = document.save_signed(&[author])?;
//!
//!     let loaded = CpixDocument::load(&bytes, &[recipient])?;
//!     assert!(loaded.verification_results().iter().all(|r| r.is_valid()));
//!     Ok(())
//! }
//! ```
//!
//! ## Signature lifecycle
//!
//! Mutating content that a signature covers marks it dirty. Saving fails
//! until a dirty signature is re-requested from its original signer with
//! [`CpixDocument::resign`] or removed, and a pending signature needs its
//! signer's credential at save. With
//! [`DocumentConfig::strict_signatures`] such mutations are rejected instead.
//!
//! ## Re-exports
//!
//! - `cpix::core` - Content keys, usage rules, certificates
//! - `cpix::xml` - Element tree, reader, writer, canonicalization
//! - `cpix::protect` - Envelope encryption
//! - `cpix::dsig` - Signature creation and verification

pub mod config;
pub mod document;
pub mod error;
pub mod signature;

mod load;
mod parse;
mod render;

// Re-export component crates
pub use cpix_core as core;
pub use cpix_dsig as dsig;
pub use cpix_protect as protect;
pub use cpix_xml as xml;

// Re-export main types for convenience
pub use config::{DocumentConfig, LoadOptions};
pub use document::CpixDocument;
pub use error::{CpixError, Result};
pub use render::{CONTENT_KEY_LIST_ID, USAGE_RULE_LIST_ID};
pub use signature::{SignatureEntry, SignatureStatus};

// Re-export commonly used component types
pub use cpix_core::{
    AssignmentRule, AudioFilter, BitrateFilter, Certificate, ContentKey, ContentKeyValue,
    Fingerprint, KeyId, LabelFilter, NotDecryptedError, RecipientIdentity, SigningIdentity,
    TimeFilter, UsageRule, ValidationError, VideoFilter,
};
pub use cpix_dsig::{
    SignatureScope, SigningError, TrustAll, TrustList, TrustPolicy, VerificationFailure,
    VerificationResult,
};
pub use cpix_protect::{ProtectError, Protection, UnprotectOutcome};
pub use cpix_xml::FormatError;

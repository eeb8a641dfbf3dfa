//! # CPIX Signatures
//!
//! XML signatures over CPIX document scopes.
//!
//! Each signature carries exactly one reference: either `#id` of the content
//! key list or usage rule list, or `""` for the whole document with the
//! enveloped-signature transform. Digests are SHA-256 over the Exclusive
//! XML Canonicalization of the referenced subtree; `SignedInfo` is signed with
//! Ed25519 and the signer's certificate travels in `KeyInfo`.
//!
//! Verification reports failures per signature instead of failing the load.
//! Whether a signer is acceptable is delegated to a [`TrustPolicy`].

pub mod algorithm;
pub mod error;
pub mod scope;
pub mod sign;
pub mod trust;
pub mod verify;

pub use error::{SigningError, VerificationFailure};
pub use scope::{Reference, SignatureScope};
pub use sign::sign;
pub use trust::{TrustAll, TrustList, TrustPolicy};
pub use verify::{verify, ParsedSignature, VerificationResult};

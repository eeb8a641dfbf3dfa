//! # CPIX Protect
//!
//! Envelope encryption of content keys for recipient certificates.
//!
//! ## Encryption Model
//!
//! Protected documents use a two-layer key model:
//!
//! 1. **Document Key**: A random ChaCha20-Poly1305 key that seals every
//!    content key value, with the key id as associated data
//! 2. **Delivery Records**: The document key is wrapped for each recipient via
//!    ephemeral X25519 key agreement and a BLAKE3-derived wrapping key
//!
//! Changing the recipient set regenerates the document key and reseals every
//! content key, so removed recipients cannot read keys sealed afterwards.
//!
//! Private keys are borrowed from the caller for the duration of
//! [`unprotect`] and never stored.

pub mod crypto;
pub mod error;
pub mod protection;
pub mod seal;
pub mod wrap;

pub use crypto::DocumentKey;
pub use error::{ProtectError, Result};
pub use protection::{protect, seal_into, unprotect, DeliveryRecord, Protection, UnprotectOutcome};
pub use seal::{open, seal, CONTENT_KEY_ALGORITHM};
pub use wrap::{WrappedKey, KEY_WRAP_ALGORITHM};

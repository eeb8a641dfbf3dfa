//! # CPIX Testkit
//!
//! Testing utilities for the CPIX engine.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Fixtures**: Fixed author and recipient identities and document helpers
//! - **Generators**: Proptest strategies for property-based testing
//! - **Samples**: The five sample documents written by `cpix-producer`
//!
//! ## Test Fixtures
//!
//! ```rust
//! use cpix::CpixDocument;
//! use cpix_testkit::fixtures::{generate_content_key, recipient1, reload};
//!
//! let mut document = CpixDocument::new();
//! document.add_content_key(generate_content_key()).unwrap();
//! document.add_recipient(recipient1().certificate().clone()).unwrap();
//!
//! let loaded = reload(&mut document, &[recipient1()]).unwrap();
//! assert!(loaded.content_keys()[0].value().is_ok());
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use cpix_testkit::generators::{document_from_params, DocumentParams};
//!
//! proptest! {
//!     #[test]
//!     fn save_is_loadable(params: DocumentParams) {
//!         let mut document = document_from_params(&params).unwrap();
//!         let bytes = document.save_signed(&cpix_testkit::fixtures::authors()).unwrap();
//!         prop_assert!(cpix::CpixDocument::load(&bytes, &[]).is_ok());
//!     }
//! }
//! ```

pub mod fixtures;
pub mod generators;
pub mod producer;
pub mod samples;

pub use fixtures::{
    add_usage_rule, author1, author2, authors, generate_content_key, generate_key_data, recipient1,
    recipient2, reload,
};
pub use generators::{document_from_params, DocumentParams};
pub use samples::{all_samples, Sample};

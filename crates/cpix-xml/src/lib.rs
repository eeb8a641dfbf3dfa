//! # CPIX XML
//!
//! The XML layer under the CPIX engine: an owned element tree, a reader and
//! writer built on `quick-xml`, namespace scopes, and Exclusive XML
//! Canonicalization for signature digests.
//!
//! The tree keeps names as written. Code that interprets a document works on
//! [`ScopedElement`] views, which resolve prefixes against the declarations
//! in effect, so a document written with different prefixes reads the same.

pub mod c14n;
pub mod error;
pub mod names;
pub mod reader;
pub mod scope;
pub mod tree;
pub mod writer;

pub use c14n::{canonicalize, canonicalize_without, EXC_C14N};
pub use error::FormatError;
pub use reader::parse;
pub use scope::{ExpandedName, Scope, ScopedElement};
pub use tree::{Attribute, Element, Node};
pub use writer::{write, write_to};

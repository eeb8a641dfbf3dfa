//! Error types for XML handling.

use thiserror::Error;

/// Malformed or schema-violating input. Fatal to deserialization.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("malformed XML: {0}")]
    Xml(String),

    #[error("document type declarations are not allowed")]
    DocumentType,

    #[error("document has no root element")]
    Empty,

    #[error("unbound namespace prefix: {0}")]
    UnboundPrefix(String),

    #[error("unexpected element: {0}")]
    UnexpectedElement(String),

    #[error("missing element: {0}")]
    MissingElement(String),

    #[error("element {element} is missing attribute {attribute}")]
    MissingAttribute { element: String, attribute: String },

    #[error("invalid value for {field}: {value:?}")]
    InvalidValue { field: String, value: String },

    #[error("section appears more than once: {0}")]
    DuplicateSection(String),

    #[error("id {0:?} is used by more than one element")]
    DuplicateId(String),

    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),
}

impl FormatError {
    pub fn invalid(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            value: value.into(),
        }
    }
}

impl From<quick_xml::Error> for FormatError {
    fn from(e: quick_xml::Error) -> Self {
        Self::Xml(e.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for FormatError {
    fn from(e: quick_xml::events::attributes::AttrError) -> Self {
        Self::Xml(e.to_string())
    }
}

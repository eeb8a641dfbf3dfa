//! Signature scopes and references.

use std::fmt;

use cpix_xml::names::{cpix, ns};
use cpix_xml::{FormatError, ScopedElement};

/// The part of a document a signature covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignatureScope {
    /// The content key list.
    ContentKeys,
    /// The usage rule list.
    UsageRules,
    /// The whole document, minus the signature itself.
    Document,
}

impl SignatureScope {
    pub fn name(&self) -> &'static str {
        match self {
            SignatureScope::ContentKeys => "content key list",
            SignatureScope::UsageRules => "usage rule list",
            SignatureScope::Document => "document",
        }
    }

    /// Classify the element a `#id` reference resolved to.
    pub fn of_target(target: &ScopedElement<'_>) -> Option<Self> {
        if target.is(ns::CPIX, cpix::CONTENT_KEY_LIST) {
            Some(SignatureScope::ContentKeys)
        } else if target.is(ns::CPIX, cpix::USAGE_RULE_LIST) {
            Some(SignatureScope::UsageRules)
        } else {
            None
        }
    }
}

impl fmt::Display for SignatureScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What a signature's single `Reference` points at.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Reference {
    /// `URI="#id"`: the element with that id.
    Element(String),
    /// `URI=""`: the enclosing document, with the enveloped-signature transform.
    Document,
}

impl Reference {
    pub fn uri(&self) -> String {
        match self {
            Reference::Element(id) => format!("#{}", id),
            Reference::Document => String::new(),
        }
    }

    /// Parse a same-document reference URI.
    pub fn from_uri(uri: &str) -> Result<Self, FormatError> {
        if uri.is_empty() {
            return Ok(Reference::Document);
        }
        match uri.strip_prefix('#') {
            Some(id) if !id.is_empty() => Ok(Reference::Element(id.to_string())),
            _ => Err(FormatError::invalid("Reference/@URI", uri)),
        }
    }
}

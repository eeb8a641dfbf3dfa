//! Exclusive XML Canonicalization 1.0, without comments.
//!
//! Rules applied to the element subtree:
//! - Only visibly utilised namespace declarations are rendered, and only when
//!   the nearest rendered ancestor does not already bind the prefix the same way
//! - Namespace declarations first, sorted by prefix; then attributes sorted by
//!   (namespace URI, local name)
//! - Empty elements are written as start/end tag pairs
//! - Text and attribute values use the canonical escaping
//!
//! Signature digests are computed over these bytes, so the output must not
//! depend on how the tree was built or on the prefixes' declaration sites.

use std::collections::BTreeMap;

use crate::error::FormatError;
use crate::names;
use crate::scope::{Scope, ScopedElement};
use crate::tree::{Element, Node};

/// Algorithm URI of Exclusive XML Canonicalization 1.0 (omits comments).
pub const EXC_C14N: &str = "http://www.w3.org/2001/10/xml-exc-c14n#";

/// Canonicalize an element subtree.
pub fn canonicalize(scoped: &ScopedElement<'_>) -> Result<Vec<u8>, FormatError> {
    canonicalize_inner(scoped, None)
}

/// Canonicalize an element subtree with one descendant removed.
///
/// `excluded` is matched by identity, not by value.
pub fn canonicalize_without(
    scoped: &ScopedElement<'_>,
    excluded: &Element,
) -> Result<Vec<u8>, FormatError> {
    canonicalize_inner(scoped, Some(excluded))
}

fn canonicalize_inner(
    scoped: &ScopedElement<'_>,
    excluded: Option<&Element>,
) -> Result<Vec<u8>, FormatError> {
    let mut out = String::new();
    write_element(
        &mut out,
        scoped.element(),
        scoped.scope(),
        &BTreeMap::new(),
        excluded,
    )?;
    Ok(out.into_bytes())
}

fn write_element(
    out: &mut String,
    element: &Element,
    scope: &Scope,
    rendered: &BTreeMap<String, String>,
    excluded: Option<&Element>,
) -> Result<(), FormatError> {
    // Prefixes visibly utilised by this element.
    let mut utilised: Vec<&str> = vec![element.prefix()];
    for attr in &element.attributes {
        if attr.is_namespace_decl() {
            continue;
        }
        let (prefix, _) = names::split(&attr.name);
        if !prefix.is_empty() && prefix != "xml" && !utilised.contains(&prefix) {
            utilised.push(prefix);
        }
    }
    utilised.retain(|p| *p != "xml");

    let mut declarations: BTreeMap<String, String> = BTreeMap::new();
    for prefix in utilised {
        let uri = if prefix.is_empty() {
            scope.resolve("").unwrap_or("")
        } else {
            scope
                .resolve(prefix)
                .ok_or_else(|| FormatError::UnboundPrefix(prefix.to_string()))?
        };
        let current = rendered.get(prefix).map(String::as_str).unwrap_or("");
        if current != uri {
            declarations.insert(prefix.to_string(), uri.to_string());
        }
    }

    let mut attributes = Vec::new();
    for attr in &element.attributes {
        if attr.is_namespace_decl() {
            continue;
        }
        let (prefix, local) = names::split(&attr.name);
        let namespace = if prefix.is_empty() {
            ""
        } else {
            scope
                .resolve(prefix)
                .ok_or_else(|| FormatError::UnboundPrefix(prefix.to_string()))?
        };
        attributes.push((namespace, local, attr));
    }
    attributes.sort_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)));

    out.push('<');
    out.push_str(&element.name);
    for (prefix, uri) in &declarations {
        out.push(' ');
        if prefix.is_empty() {
            out.push_str("xmlns");
        } else {
            out.push_str("xmlns:");
            out.push_str(prefix);
        }
        out.push_str("=\"");
        out.push_str(&escape_attr(uri));
        out.push('"');
    }
    for (_, _, attr) in &attributes {
        out.push(' ');
        out.push_str(&attr.name);
        out.push_str("=\"");
        out.push_str(&escape_attr(&attr.value));
        out.push('"');
    }
    out.push('>');

    let mut child_rendered = rendered.clone();
    child_rendered.extend(declarations);

    for child in &element.children {
        match child {
            Node::Text(text) => out.push_str(&escape_text(text)),
            Node::Element(child) => {
                if excluded.map_or(false, |e| std::ptr::eq(e, child)) {
                    continue;
                }
                let child_scope = scope.enter(child);
                write_element(out, child, &child_scope, &child_rendered, excluded)?;
            }
        }
    }

    out.push_str("</");
    out.push_str(&element.name);
    out.push('>');
    Ok(())
}

/// Escape character data.
pub(crate) fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\r' => out.push_str("&#xD;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape an attribute value.
pub(crate) fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '"' => out.push_str("&quot;"),
            '\t' => out.push_str("&#x9;"),
            '\n' => out.push_str("&#xA;"),
            '\r' => out.push_str("&#xD;"),
            _ => out.push(c),
        }
    }
    out
}

//! Namespace scopes and namespace-aware element views.

use std::collections::BTreeMap;

use crate::error::FormatError;
use crate::names::{self, ns};
use crate::tree::{Attribute, Element};

/// Namespace bindings in effect at some element. The empty prefix is the
/// default namespace.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scope {
    bindings: BTreeMap<String, String>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_binding(mut self, prefix: impl Into<String>, uri: impl Into<String>) -> Self {
        self.bindings.insert(prefix.into(), uri.into());
        self
    }

    /// The scope inside `element`, after applying its declarations.
    pub fn enter(&self, element: &Element) -> Scope {
        let mut scope = self.clone();
        for attr in &element.attributes {
            if let Some(prefix) = attr.declared_prefix() {
                if prefix.is_empty() && attr.value.is_empty() {
                    scope.bindings.remove("");
                } else {
                    scope
                        .bindings
                        .insert(prefix.to_string(), attr.value.clone());
                }
            }
        }
        scope
    }

    /// Resolve a prefix. The `xml` prefix is always bound.
    pub fn resolve(&self, prefix: &str) -> Option<&str> {
        if prefix == "xml" {
            return Some(ns::XML);
        }
        self.bindings
            .get(prefix)
            .map(String::as_str)
            .filter(|uri| !uri.is_empty())
    }

    pub fn bindings(&self) -> impl Iterator<Item = (&str, &str)> {
        self.bindings.iter().map(|(p, u)| (p.as_str(), u.as_str()))
    }
}

/// A namespace-qualified name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpandedName<'a> {
    pub namespace: Option<&'a str>,
    pub local: &'a str,
}

/// An element viewed together with the namespace scope in effect at it.
#[derive(Debug, Clone)]
pub struct ScopedElement<'a> {
    element: &'a Element,
    scope: Scope,
}

impl<'a> ScopedElement<'a> {
    /// View a document root.
    pub fn root(element: &'a Element) -> Self {
        Self::within(element, &Scope::new())
    }

    /// View an element whose parent scope is `parent`.
    pub fn within(element: &'a Element, parent: &Scope) -> Self {
        Self {
            element,
            scope: parent.enter(element),
        }
    }

    pub fn element(&self) -> &'a Element {
        self.element
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn expanded_name(&self) -> Result<ExpandedName<'_>, FormatError> {
        let (prefix, local) = names::split(&self.element.name);
        let namespace = if prefix.is_empty() {
            self.scope.resolve("")
        } else {
            Some(
                self.scope
                    .resolve(prefix)
                    .ok_or_else(|| FormatError::UnboundPrefix(prefix.to_string()))?,
            )
        };
        Ok(ExpandedName { namespace, local })
    }

    /// Whether this element is `{namespace}local`.
    pub fn is(&self, namespace: &str, local: &str) -> bool {
        matches!(
            self.expanded_name(),
            Ok(ExpandedName { namespace: Some(n), local: l }) if n == namespace && l == local
        )
    }

    /// Child elements in document order.
    pub fn children(&self) -> impl Iterator<Item = ScopedElement<'a>> + '_ {
        self.element
            .child_elements()
            .map(move |child| ScopedElement::within(child, &self.scope))
    }

    pub fn child(&self, namespace: &str, local: &str) -> Option<ScopedElement<'a>> {
        self.children().find(|c| c.is(namespace, local))
    }

    pub fn required_child(&self, namespace: &str, local: &str) -> Result<ScopedElement<'a>, FormatError> {
        self.child(namespace, local)
            .ok_or_else(|| FormatError::MissingElement(format!("{}/{}", self.element.name, local)))
    }

    /// Look up an unqualified attribute.
    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.element.attr(name)
    }

    pub fn required_attr(&self, name: &str) -> Result<&'a str, FormatError> {
        self.attr(name).ok_or_else(|| FormatError::MissingAttribute {
            element: self.element.name.clone(),
            attribute: name.to_string(),
        })
    }

    pub fn text(&self) -> String {
        self.element.text()
    }

    /// Find the element carrying `id` among this element and its descendants.
    pub fn find_by_id(&self, id: &str) -> Result<Option<ScopedElement<'a>>, FormatError> {
        let mut found = Vec::new();
        collect_by_id(self.clone(), id, &mut found);
        match found.len() {
            0 => Ok(None),
            1 => Ok(found.pop()),
            _ => Err(FormatError::DuplicateId(id.to_string())),
        }
    }

    /// Clone the element with the in-scope bindings that `target` does not
    /// already provide declared on it, so it can be placed under a parent
    /// with scope `target` without changing its meaning.
    pub fn detach_within(&self, target: &Scope) -> Element {
        let mut element = self.element.clone();
        let declared: Vec<String> = element
            .attributes
            .iter()
            .filter_map(|a| a.declared_prefix().map(str::to_string))
            .collect();

        let mut materialized = Vec::new();
        for (prefix, uri) in self.scope.bindings() {
            if declared.iter().any(|d| d == prefix) || target.resolve(prefix) == Some(uri) {
                continue;
            }
            materialized.push(Attribute {
                name: decl_name(prefix),
                value: uri.to_string(),
            });
        }
        if self.scope.resolve("").is_none()
            && target.resolve("").is_some()
            && !declared.iter().any(|d| d.is_empty())
        {
            materialized.push(Attribute {
                name: "xmlns".into(),
                value: String::new(),
            });
        }

        materialized.append(&mut element.attributes);
        element.attributes = materialized;
        element
    }
}

fn collect_by_id<'a>(scoped: ScopedElement<'a>, id: &str, found: &mut Vec<ScopedElement<'a>>) {
    if scoped.attr("id") == Some(id) {
        found.push(scoped.clone());
    }
    for child in scoped.children() {
        collect_by_id(child, id, found);
    }
}

fn decl_name(prefix: &str) -> String {
    if prefix.is_empty() {
        "xmlns".to_string()
    } else {
        format!("xmlns:{}", prefix)
    }
}

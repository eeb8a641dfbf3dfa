//! Load pipeline: parse, map to the model, verify signatures, unprotect.

use tracing::{debug, warn};

use cpix_core::validate_usage_rule;
use cpix_dsig::SignatureScope;
use cpix_protect::Protection;
use cpix_xml::names::{cpix, dsig, ns};
use cpix_xml::{parse, Element, FormatError, Node, ScopedElement};

use crate::config::LoadOptions;
use crate::document::{CpixDocument, Snapshots};
use crate::error::Result;
use crate::parse as section;
use crate::signature::SignatureEntry;

/// Root children in the order they must appear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Part {
    DeliveryData,
    ContentKeys,
    UsageRules,
    Signature,
}

impl Part {
    fn of(element: &ScopedElement<'_>) -> Option<Self> {
        if element.is(ns::CPIX, cpix::DELIVERY_DATA_LIST) {
            Some(Part::DeliveryData)
        } else if element.is(ns::CPIX, cpix::CONTENT_KEY_LIST) {
            Some(Part::ContentKeys)
        } else if element.is(ns::CPIX, cpix::USAGE_RULE_LIST) {
            Some(Part::UsageRules)
        } else if element.is(ns::DSIG, dsig::SIGNATURE) {
            Some(Part::Signature)
        } else {
            None
        }
    }
}

#[derive(Default)]
struct Parts<'a> {
    delivery: Option<ScopedElement<'a>>,
    content_keys: Option<ScopedElement<'a>>,
    usage_rules: Option<ScopedElement<'a>>,
    signatures: Vec<ScopedElement<'a>>,
}

pub(crate) fn read(bytes: &[u8], options: &LoadOptions) -> Result<CpixDocument> {
    let root = parse(bytes)?;
    let scoped = ScopedElement::root(&root);
    if !scoped.is(ns::CPIX, cpix::ROOT) {
        return Err(FormatError::UnexpectedElement(root.name.clone()).into());
    }
    let parts = split(&scoped)?;
    let root_scope = scoped.scope().clone();

    let delivery = match &parts.delivery {
        Some(list) => {
            let records = section::delivery_data_list(list)?;
            if records.is_empty() {
                return Err(FormatError::MissingElement(format!(
                    "{}/{}",
                    cpix::DELIVERY_DATA_LIST,
                    cpix::DELIVERY_DATA
                ))
                .into());
            }
            records
        }
        None => Vec::new(),
    };
    let protected = !delivery.is_empty();

    let content_keys = match &parts.content_keys {
        Some(list) => section::content_key_list(list, protected)?,
        None => Vec::new(),
    };
    let usage_rules = match &parts.usage_rules {
        Some(list) => section::usage_rule_list(list)?,
        None => Vec::new(),
    };
    for rule in &usage_rules {
        validate_usage_rule(rule, &content_keys)?;
    }

    let mut document = CpixDocument::with_config(options.config.clone());
    document.shell = Element {
        name: root.name.clone(),
        attributes: root.attributes.clone(),
        children: Vec::new(),
    };
    document.content_keys = content_keys;
    document.usage_rules = usage_rules;
    document.protection = if protected {
        Protection::Locked { delivery }
    } else {
        Protection::Unprotected
    };
    if let Some(list) = &parts.content_keys {
        document.content_key_list_id = list.attr("id").map(str::to_string);
    }
    if let Some(list) = &parts.usage_rules {
        document.usage_rule_list_id = list.attr("id").map(str::to_string);
    }
    document.snapshots = Snapshots {
        delivery: parts.delivery.as_ref().map(|e| e.detach_within(&root_scope)),
        content_keys: parts.content_keys.as_ref().map(|e| e.detach_within(&root_scope)),
        usage_rules: parts.usage_rules.as_ref().map(|e| e.detach_within(&root_scope)),
    };

    let mut dropped = 0;
    for signature in &parts.signatures {
        let result = cpix_dsig::verify(&scoped, signature, options.trust.as_ref())?;
        match result.scope {
            None => {
                warn!(
                    reference = %result.reference.uri(),
                    signer = %result.signer.fingerprint(),
                    "signed content is missing; signature dropped"
                );
                dropped += 1;
            }
            Some(SignatureScope::Document) => {
                if document.document_signature.is_some() {
                    return Err(FormatError::DuplicateSection("document signature".into()).into());
                }
                document.document_signature = Some(SignatureEntry::signed(
                    SignatureScope::Document,
                    result.signer.clone(),
                    signature.detach_within(&root_scope),
                ));
            }
            Some(scope) => {
                document.signatures.push(SignatureEntry::signed(
                    scope,
                    result.signer.clone(),
                    signature.detach_within(&root_scope),
                ));
            }
        }
        document.verification.push(result);
    }

    let invalid = document
        .verification
        .iter()
        .filter(|r| !r.is_valid())
        .count();
    debug!(
        keys = document.content_keys.len(),
        recipients = document.protection.delivery().len(),
        rules = document.usage_rules.len(),
        signatures = document.verification.len(),
        invalid,
        "document parsed"
    );

    if dropped > 0 {
        // The document no longer contains what its signature covered.
        if let Some(entry) = document.document_signature.as_mut() {
            entry.invalidate();
        }
    } else {
        document.source = Some(root.clone());
    }

    document.unprotect(&options.identities)?;
    Ok(document)
}

/// Sort the root's children into sections, enforcing order and uniqueness.
fn split<'a>(root: &ScopedElement<'a>) -> Result<Parts<'a>> {
    for node in &root.element().children {
        if let Node::Text(text) = node {
            if !text.trim().is_empty() {
                return Err(FormatError::invalid(cpix::ROOT, text.trim()).into());
            }
        }
    }

    let mut parts = Parts::default();
    let mut last: Option<Part> = None;
    for child in root.children() {
        let part = Part::of(&child)
            .ok_or_else(|| FormatError::UnexpectedElement(child.element().name.clone()))?;
        match last {
            Some(previous) if part == previous && part != Part::Signature => {
                return Err(FormatError::DuplicateSection(child.element().name.clone()).into());
            }
            Some(previous) if part < previous => {
                return Err(FormatError::UnexpectedElement(child.element().name.clone()).into());
            }
            _ => {}
        }
        last = Some(part);

        match part {
            Part::DeliveryData => parts.delivery = Some(child),
            Part::ContentKeys => parts.content_keys = Some(child),
            Part::UsageRules => parts.usage_rules = Some(child),
            Part::Signature => parts.signatures.push(child),
        }
    }
    Ok(parts)
}

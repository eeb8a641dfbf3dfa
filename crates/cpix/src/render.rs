//! Document model to XML element tree.
//!
//! Elements are built with the standard prefixes (`cpix`, `pskc`, `ds`,
//! `enc`). [`place`] adapts a freshly built section to a root that binds
//! different prefixes.

use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::{DateTime, SecondsFormat, Utc};

use cpix_core::{ContentKey, KeyValue, SealedValue, UsageRule};
use cpix_protect::{DeliveryRecord, CONTENT_KEY_ALGORITHM, KEY_WRAP_ALGORITHM};
use cpix_xml::names::{cpix, ns, pskc, xmlenc};
use cpix_xml::{names::prefix, Element, Scope, ScopedElement};

/// Default `id` of the content key list, the target of key signatures.
pub const CONTENT_KEY_LIST_ID: &str = "ContentKeyList";

/// Default `id` of the usage rule list, the target of rule signatures.
pub const USAGE_RULE_LIST_ID: &str = "ContentKeyUsageRuleList";

const BINDINGS: [(&str, &str); 4] = [
    (prefix::CPIX, ns::CPIX),
    (prefix::PSKC, ns::PSKC),
    (prefix::DSIG, ns::DSIG),
    (prefix::XMLENC, ns::XMLENC),
];

/// The scope fresh elements are built for.
pub(crate) fn standard_scope() -> Scope {
    BINDINGS
        .iter()
        .fold(Scope::new(), |scope, (p, uri)| scope.with_binding(*p, *uri))
}

/// An empty `cpix:CPIX` root declaring the standard prefixes.
pub(crate) fn root_shell() -> Element {
    BINDINGS
        .iter()
        .fold(cpix_element(cpix::ROOT), |root, (p, uri)| {
            root.with_attr(format!("xmlns:{}", p), *uri)
        })
}

/// Re-home a freshly built element under a root whose scope is `root_scope`.
pub(crate) fn place(fresh: Element, root_scope: &Scope) -> Element {
    let standard = standard_scope();
    if *root_scope == standard {
        return fresh;
    }
    ScopedElement::within(&fresh, &standard).detach_within(root_scope)
}

pub(crate) fn delivery_data_list(records: &[DeliveryRecord]) -> Element {
    let mut list = cpix_element(cpix::DELIVERY_DATA_LIST);
    for record in records {
        let delivery_key = cpix_element(cpix::DELIVERY_KEY).with_child(
            cpix_element(cpix::CERTIFICATE).with_text(encode(record.recipient.as_bytes())),
        );
        let document_key = cpix_element(cpix::DOCUMENT_KEY)
            .with_attr("Algorithm", CONTENT_KEY_ALGORITHM)
            .with_child(secret(encrypted_value(
                KEY_WRAP_ALGORITHM,
                &record.wrapped.to_bytes(),
            )));
        list.push_child(
            cpix_element(cpix::DELIVERY_DATA)
                .with_child(delivery_key)
                .with_child(document_key),
        );
    }
    list
}

pub(crate) fn content_key_list(id: Option<&str>, keys: &[ContentKey]) -> Element {
    let mut list = with_id(cpix_element(cpix::CONTENT_KEY_LIST), id);
    for key in keys {
        let value = match &key.state {
            KeyValue::Clear(value) => {
                pskc_element(pskc::PLAIN_VALUE).with_text(encode(value.as_bytes()))
            }
            KeyValue::Sealed(sealed) | KeyValue::Unsealed { sealed, .. } => sealed_value(sealed),
        };
        list.push_child(
            cpix_element(cpix::CONTENT_KEY)
                .with_attr("kid", key.id.to_string())
                .with_child(secret(value)),
        );
    }
    list
}

pub(crate) fn usage_rule_list(id: Option<&str>, rules: &[UsageRule]) -> Element {
    let mut list = with_id(cpix_element(cpix::USAGE_RULE_LIST), id);
    for rule in rules {
        list.push_child(usage_rule(rule));
    }
    list
}

fn usage_rule(rule: &UsageRule) -> Element {
    let mut element = cpix_element(cpix::USAGE_RULE).with_attr("kid", rule.key_id.to_string());

    if let Some(time) = &rule.time_filter {
        let mut filter = cpix_element(cpix::TIME_FILTER);
        optional_attr(&mut filter, "start", time.start.map(timestamp));
        optional_attr(&mut filter, "end", time.end.map(timestamp));
        element.push_child(filter);
    }
    if let Some(video) = &rule.video_filter {
        let mut filter = cpix_element(cpix::VIDEO_FILTER);
        optional_attr(&mut filter, "minPixels", video.min_pixels.map(|v| v.to_string()));
        optional_attr(&mut filter, "maxPixels", video.max_pixels.map(|v| v.to_string()));
        element.push_child(filter);
    }
    if rule.audio_filter.is_some() {
        element.push_child(cpix_element(cpix::AUDIO_FILTER));
    }
    if let Some(bitrate) = &rule.bitrate_filter {
        let mut filter = cpix_element(cpix::BITRATE_FILTER);
        optional_attr(&mut filter, "minBitrate", bitrate.min_bitrate.map(|v| v.to_string()));
        optional_attr(&mut filter, "maxBitrate", bitrate.max_bitrate.map(|v| v.to_string()));
        element.push_child(filter);
    }
    if let Some(label) = &rule.label_filter {
        element.push_child(cpix_element(cpix::LABEL_FILTER).with_attr("label", label.label.as_str()));
    }
    element
}

fn sealed_value(sealed: &SealedValue) -> Element {
    encrypted_value(CONTENT_KEY_ALGORITHM, &sealed.to_bytes())
}

fn encrypted_value(algorithm: &str, cipher: &[u8]) -> Element {
    pskc_element(pskc::ENCRYPTED_VALUE)
        .with_child(enc_element(xmlenc::ENCRYPTION_METHOD).with_attr("Algorithm", algorithm))
        .with_child(
            enc_element(xmlenc::CIPHER_DATA)
                .with_child(enc_element(xmlenc::CIPHER_VALUE).with_text(encode(cipher))),
        )
}

/// `cpix:Data/pskc:Secret/value`
fn secret(value: Element) -> Element {
    cpix_element(cpix::DATA).with_child(pskc_element(pskc::SECRET).with_child(value))
}

fn with_id(element: Element, id: Option<&str>) -> Element {
    match id {
        Some(id) => element.with_attr("id", id),
        None => element,
    }
}

fn optional_attr(element: &mut Element, name: &str, value: Option<String>) {
    if let Some(value) = value {
        element.set_attr(name, value);
    }
}

pub(crate) fn timestamp(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

pub(crate) fn encode(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

fn cpix_element(local: &str) -> Element {
    Element::prefixed(prefix::CPIX, local)
}

fn pskc_element(local: &str) -> Element {
    Element::prefixed(prefix::PSKC, local)
}

fn enc_element(local: &str) -> Element {
    Element::prefixed(prefix::XMLENC, local)
}

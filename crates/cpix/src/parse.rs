//! XML element tree to document model.
//!
//! Each function maps one section. Structure and value errors are
//! [`FormatError`]s; model invariants (dangling rule references, filter
//! bounds) are checked by the loader afterwards.

use std::collections::HashSet;

use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::{DateTime, Utc};

use cpix_core::{
    AudioFilter, BitrateFilter, Certificate, ContentKey, ContentKeyValue, KeyId, KeyValue,
    LabelFilter, SealedValue, TimeFilter, UsageRule, VideoFilter,
};
use cpix_protect::{DeliveryRecord, WrappedKey, CONTENT_KEY_ALGORITHM, KEY_WRAP_ALGORITHM};
use cpix_xml::names::{cpix, ns, pskc, xmlenc};
use cpix_xml::{FormatError, ScopedElement};

/// The value inside `cpix:Data/pskc:Secret`.
enum Secret {
    Plain(Vec<u8>),
    Encrypted(Vec<u8>),
}

pub(crate) fn delivery_data_list(list: &ScopedElement<'_>) -> Result<Vec<DeliveryRecord>, FormatError> {
    let mut records: Vec<DeliveryRecord> = Vec::new();
    for data in entries(list, cpix::DELIVERY_DATA)? {
        let certificate_text = data
            .required_child(ns::CPIX, cpix::DELIVERY_KEY)?
            .required_child(ns::CPIX, cpix::CERTIFICATE)?
            .text();
        let recipient = Certificate::from_bytes(&decode("DeliveryKey/Certificate", &certificate_text)?)
            .map_err(|e| FormatError::invalid("DeliveryKey/Certificate", e.to_string()))?;
        if recipient.encryption_key().is_none() {
            return Err(FormatError::invalid(
                "DeliveryKey/Certificate",
                "certificate has no key agreement key",
            ));
        }
        if records.iter().any(|r| r.recipient == recipient) {
            return Err(FormatError::invalid(
                "DeliveryData",
                format!("duplicate recipient {}", recipient.fingerprint()),
            ));
        }

        let document_key = data.required_child(ns::CPIX, cpix::DOCUMENT_KEY)?;
        let algorithm = document_key.required_attr("Algorithm")?;
        if algorithm != CONTENT_KEY_ALGORITHM {
            return Err(FormatError::UnsupportedAlgorithm(algorithm.to_string()));
        }
        let wrapped = match secret(&document_key, KEY_WRAP_ALGORITHM)? {
            Secret::Encrypted(bytes) => WrappedKey::from_bytes(&bytes)
                .ok_or_else(|| FormatError::invalid("DocumentKey/CipherValue", STANDARD.encode(&bytes)))?,
            Secret::Plain(_) => {
                return Err(FormatError::UnexpectedElement(format!(
                    "{}/{}",
                    cpix::DOCUMENT_KEY,
                    pskc::PLAIN_VALUE
                )))
            }
        };

        records.push(DeliveryRecord { recipient, wrapped });
    }
    Ok(records)
}

/// Map the content key list. `protected` tells whether the document has
/// delivery data; every value must then be encrypted, and otherwise plain.
pub(crate) fn content_key_list(list: &ScopedElement<'_>, protected: bool) -> Result<Vec<ContentKey>, FormatError> {
    let mut keys = Vec::new();
    let mut seen = HashSet::new();
    for element in entries(list, cpix::CONTENT_KEY)? {
        let id = key_id(&element)?;
        if !seen.insert(id) {
            return Err(FormatError::invalid("ContentKey/@kid", format!("duplicate {}", id)));
        }

        let state = match (secret(&element, CONTENT_KEY_ALGORITHM)?, protected) {
            (Secret::Plain(bytes), false) => KeyValue::Clear(
                ContentKeyValue::from_slice(&bytes)
                    .map_err(|e| FormatError::invalid("PlainValue", e.to_string()))?,
            ),
            (Secret::Encrypted(bytes), true) => KeyValue::Sealed(
                SealedValue::from_bytes(&bytes)
                    .ok_or_else(|| FormatError::invalid("ContentKey/CipherValue", STANDARD.encode(&bytes)))?,
            ),
            (Secret::Plain(_), true) => {
                return Err(FormatError::invalid(
                    "PlainValue",
                    format!("content key {} is in clear in an encrypted document", id),
                ))
            }
            (Secret::Encrypted(_), false) => {
                return Err(FormatError::MissingElement(cpix::DELIVERY_DATA_LIST.to_string()))
            }
        };
        keys.push(ContentKey { id, state });
    }
    Ok(keys)
}

pub(crate) fn usage_rule_list(list: &ScopedElement<'_>) -> Result<Vec<UsageRule>, FormatError> {
    let mut rules = Vec::new();
    for element in entries(list, cpix::USAGE_RULE)? {
        let mut rule = UsageRule::new(key_id(&element)?);
        for filter in element.children() {
            let local = filter.expanded_name()?.local;
            if !filter.is(ns::CPIX, local) {
                return Err(FormatError::UnexpectedElement(filter.element().name.clone()));
            }
            match local {
                cpix::TIME_FILTER if rule.time_filter.is_none() => {
                    rule.time_filter = Some(TimeFilter {
                        start: optional_time(&filter, "start")?,
                        end: optional_time(&filter, "end")?,
                    });
                }
                cpix::VIDEO_FILTER if rule.video_filter.is_none() => {
                    rule.video_filter = Some(VideoFilter {
                        min_pixels: optional_u64(&filter, "minPixels")?,
                        max_pixels: optional_u64(&filter, "maxPixels")?,
                    });
                }
                cpix::AUDIO_FILTER if rule.audio_filter.is_none() => {
                    rule.audio_filter = Some(AudioFilter);
                }
                cpix::BITRATE_FILTER if rule.bitrate_filter.is_none() => {
                    rule.bitrate_filter = Some(BitrateFilter {
                        min_bitrate: optional_u64(&filter, "minBitrate")?,
                        max_bitrate: optional_u64(&filter, "maxBitrate")?,
                    });
                }
                cpix::LABEL_FILTER if rule.label_filter.is_none() => {
                    rule.label_filter = Some(LabelFilter::new(filter.required_attr("label")?));
                }
                cpix::TIME_FILTER
                | cpix::VIDEO_FILTER
                | cpix::AUDIO_FILTER
                | cpix::BITRATE_FILTER
                | cpix::LABEL_FILTER => {
                    return Err(FormatError::DuplicateSection(filter.element().name.clone()))
                }
                _ => return Err(FormatError::UnexpectedElement(filter.element().name.clone())),
            }
        }
        rules.push(rule);
    }
    Ok(rules)
}

/// The children of a list, all of which must be `cpix:{local}`.
fn entries<'a>(list: &ScopedElement<'a>, local: &str) -> Result<Vec<ScopedElement<'a>>, FormatError> {
    let mut entries = Vec::new();
    for child in list.children() {
        if !child.is(ns::CPIX, local) {
            return Err(FormatError::UnexpectedElement(child.element().name.clone()));
        }
        entries.push(child);
    }
    Ok(entries)
}

fn key_id(element: &ScopedElement<'_>) -> Result<KeyId, FormatError> {
    let kid = element.required_attr("kid")?;
    KeyId::parse(kid).map_err(|_| FormatError::invalid("@kid", kid))
}

/// Read `cpix:Data/pskc:Secret` below `parent`. An encrypted value must use
/// `algorithm`.
fn secret(parent: &ScopedElement<'_>, algorithm: &str) -> Result<Secret, FormatError> {
    let secret = parent
        .required_child(ns::CPIX, cpix::DATA)?
        .required_child(ns::PSKC, pskc::SECRET)?;

    if let Some(plain) = secret.child(ns::PSKC, pskc::PLAIN_VALUE) {
        return Ok(Secret::Plain(decode("PlainValue", &plain.text())?));
    }

    let encrypted = secret.required_child(ns::PSKC, pskc::ENCRYPTED_VALUE)?;
    let method = encrypted
        .required_child(ns::XMLENC, xmlenc::ENCRYPTION_METHOD)?
        .required_attr("Algorithm")?;
    if method != algorithm {
        return Err(FormatError::UnsupportedAlgorithm(method.to_string()));
    }
    let cipher = encrypted
        .required_child(ns::XMLENC, xmlenc::CIPHER_DATA)?
        .required_child(ns::XMLENC, xmlenc::CIPHER_VALUE)?
        .text();
    Ok(Secret::Encrypted(decode("CipherValue", &cipher)?))
}

fn optional_u64(element: &ScopedElement<'_>, name: &str) -> Result<Option<u64>, FormatError> {
    element
        .attr(name)
        .map(|v| v.trim().parse().map_err(|_| FormatError::invalid(name, v)))
        .transpose()
}

fn optional_time(element: &ScopedElement<'_>, name: &str) -> Result<Option<DateTime<Utc>>, FormatError> {
    element
        .attr(name)
        .map(|v| {
            DateTime::parse_from_rfc3339(v.trim())
                .map(|t| t.with_timezone(&Utc))
                .map_err(|_| FormatError::invalid(name, v))
        })
        .transpose()
}

/// Decode base64 element content, ignoring line breaks and indentation.
fn decode(field: &str, text: &str) -> Result<Vec<u8>, FormatError> {
    let compact: String = text.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    STANDARD
        .decode(compact.as_bytes())
        .map_err(|_| FormatError::invalid(field, text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cpix_xml::parse;

    fn list(xml: &str) -> cpix_xml::Element {
        parse(xml.as_bytes()).unwrap()
    }

    #[test]
    fn test_plain_key_with_other_prefixes() {
        let root = list(
            r#"<ContentKeyList xmlns="urn:dashif:org:cpix" xmlns:p="urn:ietf:params:xml:ns:keyprov:pskc">
                <ContentKey kid="11111111-1111-1111-1111-111111111111">
                    <Data><p:Secret><p:PlainValue>
                        IiIiIiIiIiIiIiIiIiIiIg==
                    </p:PlainValue></p:Secret></Data>
                </ContentKey>
            </ContentKeyList>"#,
        );
        let keys = content_key_list(&ScopedElement::root(&root), false).unwrap();
        assert_eq!(keys.len(), 1);
        assert_eq!(keys[0].id, KeyId::from_bytes([0x11; 16]));
        assert_eq!(keys[0].value().unwrap().as_bytes(), &[0x22; 16]);
    }

    #[test]
    fn test_duplicate_kid_rejected() {
        let root = list(
            r#"<c:ContentKeyList xmlns:c="urn:dashif:org:cpix" xmlns:p="urn:ietf:params:xml:ns:keyprov:pskc">
                <c:ContentKey kid="11111111-1111-1111-1111-111111111111"><c:Data><p:Secret><p:PlainValue>IiIiIiIiIiIiIiIiIiIiIg==</p:PlainValue></p:Secret></c:Data></c:ContentKey>
                <c:ContentKey kid="11111111-1111-1111-1111-111111111111"><c:Data><p:Secret><p:PlainValue>IiIiIiIiIiIiIiIiIiIiIg==</p:PlainValue></p:Secret></c:Data></c:ContentKey>
            </c:ContentKeyList>"#,
        );
        assert!(matches!(
            content_key_list(&ScopedElement::root(&root), false),
            Err(FormatError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_short_key_rejected() {
        let root = list(
            r#"<c:ContentKeyList xmlns:c="urn:dashif:org:cpix" xmlns:p="urn:ietf:params:xml:ns:keyprov:pskc">
                <c:ContentKey kid="11111111-1111-1111-1111-111111111111"><c:Data><p:Secret><p:PlainValue>AAAA</p:PlainValue></p:Secret></c:Data></c:ContentKey>
            </c:ContentKeyList>"#,
        );
        assert!(content_key_list(&ScopedElement::root(&root), false).is_err());
    }

    #[test]
    fn test_rule_filters() {
        let root = list(
            r#"<c:ContentKeyUsageRuleList xmlns:c="urn:dashif:org:cpix">
                <c:ContentKeyUsageRule kid="11111111-1111-1111-1111-111111111111">
                    <c:TimeFilter start="2024-01-01T00:00:00+02:00"/>
                    <c:VideoFilter minPixels="100" maxPixels="200"/>
                    <c:AudioFilter/>
                    <c:LabelFilter label="hd"/>
                </c:ContentKeyUsageRule>
            </c:ContentKeyUsageRuleList>"#,
        );
        let rules = usage_rule_list(&ScopedElement::root(&root)).unwrap();
        let rule = &rules[0];
        let start = rule.time_filter.unwrap().start.unwrap();
        assert_eq!(crate::render::timestamp(start), "2023-12-31T22:00:00Z");
        assert_eq!(rule.video_filter, Some(VideoFilter::between(100, 200)));
        assert!(rule.audio_filter.is_some());
        assert_eq!(rule.label_filter, Some(LabelFilter::new("hd")));
        assert!(rule.bitrate_filter.is_none());
    }

    #[test]
    fn test_repeated_filter_rejected() {
        let root = list(
            r#"<c:ContentKeyUsageRuleList xmlns:c="urn:dashif:org:cpix">
                <c:ContentKeyUsageRule kid="11111111-1111-1111-1111-111111111111">
                    <c:AudioFilter/><c:AudioFilter/>
                </c:ContentKeyUsageRule>
            </c:ContentKeyUsageRuleList>"#,
        );
        assert_eq!(
            usage_rule_list(&ScopedElement::root(&root)).unwrap_err(),
            FormatError::DuplicateSection("c:AudioFilter".into())
        );
    }

    #[test]
    fn test_bad_pixel_count_rejected() {
        let root = list(
            r#"<c:ContentKeyUsageRuleList xmlns:c="urn:dashif:org:cpix">
                <c:ContentKeyUsageRule kid="11111111-1111-1111-1111-111111111111">
                    <c:VideoFilter maxPixels="lots"/>
                </c:ContentKeyUsageRule>
            </c:ContentKeyUsageRuleList>"#,
        );
        assert_eq!(
            usage_rule_list(&ScopedElement::root(&root)).unwrap_err(),
            FormatError::invalid("maxPixels", "lots")
        );
    }
}

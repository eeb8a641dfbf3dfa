//! Save and load round trips, and rejection of malformed input.

use cpix::{ContentKey, CpixDocument, CpixError, FormatError, KeyId, UsageRule, VideoFilter};
use cpix_testkit::fixtures::{generate_content_key, reload};

const PSKC: &str = "urn:ietf:params:xml:ns:keyprov:pskc";

fn load_err(xml: &str) -> CpixError {
    CpixDocument::load(xml.as_bytes(), &[]).unwrap_err()
}

#[test]
fn test_empty_document_round_trip() {
    let mut document = CpixDocument::new();
    let bytes = document.save().unwrap();
    let text = String::from_utf8(bytes.clone()).unwrap();
    assert!(text.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?><cpix:CPIX"#));
    assert!(!text.contains("ContentKeyList"));

    let loaded = CpixDocument::load(&bytes, &[]).unwrap();
    assert!(loaded.content_keys().is_empty());
    assert!(loaded.usage_rules().is_empty());
    assert_eq!(loaded.recipients().count(), 0);
    assert_eq!(loaded.signatures().count(), 0);
}

#[test]
fn test_clear_keys_round_trip() {
    let mut document = CpixDocument::new();
    let first = generate_content_key();
    let second = generate_content_key();
    document.add_content_key(first.clone()).unwrap();
    document.add_content_key(second.clone()).unwrap();

    let loaded = reload(&mut document, &[]).unwrap();
    assert!(!loaded.is_encrypted());
    assert_eq!(loaded.content_keys().len(), 2);
    assert_eq!(loaded.content_keys()[0].id, first.id);
    assert_eq!(loaded.content_keys()[1].id, second.id);
    assert_eq!(
        loaded.content_keys()[0].value().unwrap(),
        first.value().unwrap()
    );
    assert_eq!(
        loaded.content_key(&second.id).unwrap().value().unwrap(),
        second.value().unwrap()
    );
}

#[test]
fn test_content_id_round_trip() {
    let mut document = CpixDocument::new();
    document
        .set_content_id(Some("movie & trailer".to_string()))
        .unwrap();
    let mut loaded = reload(&mut document, &[]).unwrap();
    assert_eq!(loaded.content_id(), Some("movie & trailer"));

    loaded.set_content_id(None).unwrap();
    let loaded = reload(&mut loaded, &[]).unwrap();
    assert_eq!(loaded.content_id(), None);
}

#[test]
fn test_unchanged_document_saves_identically() {
    let mut document = CpixDocument::new();
    document.add_content_key(generate_content_key()).unwrap();
    let first = document.save().unwrap();
    assert_eq!(document.save().unwrap(), first);

    let mut loaded = CpixDocument::load(&first, &[]).unwrap();
    assert_eq!(loaded.save().unwrap(), first);
}

#[test]
fn test_loaded_document_accepts_changes() {
    let mut document = CpixDocument::new();
    let key = generate_content_key();
    document.add_content_key(key.clone()).unwrap();

    let mut loaded = reload(&mut document, &[]).unwrap();
    loaded.add_content_key(generate_content_key()).unwrap();
    loaded
        .add_usage_rule(UsageRule::new(key.id).with_video_filter(VideoFilter::between(0, 100)))
        .unwrap();

    let loaded = reload(&mut loaded, &[]).unwrap();
    assert_eq!(loaded.content_keys().len(), 2);
    assert_eq!(loaded.usage_rules_for(&key.id).count(), 1);
}

#[test]
fn test_remove_content_key_round_trip() {
    let mut document = CpixDocument::new();
    let keep = generate_content_key();
    let drop = generate_content_key();
    document.add_content_key(keep.clone()).unwrap();
    document.add_content_key(drop.clone()).unwrap();
    document.add_usage_rule(UsageRule::new(drop.id)).unwrap();

    assert!(matches!(
        document.remove_content_key(&drop.id),
        Err(CpixError::Validation(cpix::ValidationError::KeyInUse(_)))
    ));
    document.remove_usage_rule(0).unwrap();
    document.remove_content_key(&drop.id).unwrap();

    let loaded = reload(&mut document, &[]).unwrap();
    assert_eq!(loaded.content_keys().len(), 1);
    assert_eq!(loaded.content_keys()[0].id, keep.id);
}

#[test]
fn test_foreign_prefixes_load() {
    let xml = format!(
        r#"<?xml version="1.0"?>
        <CPIX xmlns="urn:dashif:org:cpix" xmlns:k="{PSKC}" contentId="c1">
          <ContentKeyList>
            <ContentKey kid="0a0b0c0d-0000-0000-0000-000000000001">
              <Data><k:Secret><k:PlainValue>AAAAAAAAAAAAAAAAAAAAAA==</k:PlainValue></k:Secret></Data>
            </ContentKey>
          </ContentKeyList>
        </CPIX>"#
    );
    let mut loaded = CpixDocument::load(xml.as_bytes(), &[]).unwrap();
    assert_eq!(loaded.content_id(), Some("c1"));
    let id = KeyId::parse("0a0b0c0d-0000-0000-0000-000000000001").unwrap();
    assert_eq!(
        loaded.content_key(&id).unwrap().value().unwrap().as_bytes(),
        &[0u8; 16]
    );

    // Adding a key re-renders the list under the original root.
    loaded.add_content_key(ContentKey::new(KeyId::from_bytes([7; 16]), [7; 16])).unwrap();
    let again = reload(&mut loaded, &[]).unwrap();
    assert_eq!(again.content_keys().len(), 2);
    assert_eq!(again.content_id(), Some("c1"));
}

#[test]
fn test_save_to_writer() {
    let mut document = CpixDocument::new();
    document.add_content_key(generate_content_key()).unwrap();
    let mut out = Vec::new();
    document.save_to(&mut out).unwrap();
    assert_eq!(out, document.save().unwrap());
}

#[test]
fn test_rejects_malformed_input() {
    assert!(matches!(load_err("not xml"), CpixError::Format(_)));
    assert!(matches!(load_err(""), CpixError::Format(_)));
    assert!(matches!(
        load_err(r#"<Other xmlns="urn:dashif:org:cpix"/>"#),
        CpixError::Format(FormatError::UnexpectedElement(_))
    ));
    assert!(matches!(
        load_err(r#"<CPIX xmlns="urn:example:other"/>"#),
        CpixError::Format(FormatError::UnexpectedElement(_))
    ));
    assert!(matches!(
        load_err(r#"<!DOCTYPE CPIX []><CPIX xmlns="urn:dashif:org:cpix"/>"#),
        CpixError::Format(FormatError::DocumentType)
    ));
}

#[test]
fn test_rejects_bad_structure() {
    assert!(matches!(
        load_err(
            r#"<CPIX xmlns="urn:dashif:org:cpix"><ContentKeyUsageRuleList/><ContentKeyList/></CPIX>"#
        ),
        CpixError::Format(FormatError::UnexpectedElement(_))
    ));
    assert!(matches!(
        load_err(r#"<CPIX xmlns="urn:dashif:org:cpix"><ContentKeyList/><ContentKeyList/></CPIX>"#),
        CpixError::Format(FormatError::DuplicateSection(_))
    ));
    assert!(matches!(
        load_err(r#"<CPIX xmlns="urn:dashif:org:cpix"><Unknown/></CPIX>"#),
        CpixError::Format(FormatError::UnexpectedElement(_))
    ));
    assert!(matches!(
        load_err(r#"<CPIX xmlns="urn:dashif:org:cpix">text</CPIX>"#),
        CpixError::Format(FormatError::InvalidValue { .. })
    ));
    assert!(matches!(
        load_err(r#"<CPIX xmlns="urn:dashif:org:cpix"><DeliveryDataList/></CPIX>"#),
        CpixError::Format(FormatError::MissingElement(_))
    ));
}

#[test]
fn test_rejects_rule_for_unknown_key() {
    let xml = r#"<CPIX xmlns="urn:dashif:org:cpix">
        <ContentKeyUsageRuleList>
          <ContentKeyUsageRule kid="0a0b0c0d-0000-0000-0000-000000000001"/>
        </ContentKeyUsageRuleList>
      </CPIX>"#;
    assert!(matches!(
        load_err(xml),
        CpixError::Validation(cpix::ValidationError::UnknownKeyId(_))
    ));
}

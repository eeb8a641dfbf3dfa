//! Signature creation, verification, invalidation and re-signing.

use std::sync::Once;

use cpix::{
    CpixDocument, CpixError, DocumentConfig, FormatError, KeyId, LoadOptions, SignatureScope,
    SignatureStatus, SigningError, TrustAll, TrustList, UsageRule, ValidationError,
    VerificationFailure,
};
use cpix_testkit::fixtures::{
    author1, author2, authors, generate_content_key, recipient1, recipient2, reload,
};
use cpix_testkit::samples::{encrypted_and_signed, signed, with_rules_encrypted_and_signed};

fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .init();
    });
}

fn tamper(bytes: &[u8], from: &str, to: &str) -> Vec<u8> {
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert_eq!(text.matches(from).count(), 1, "{from} must occur once");
    text.replace(from, to).into_bytes()
}

fn outcomes(document: &CpixDocument) -> Vec<(Option<SignatureScope>, Result<(), VerificationFailure>)> {
    document
        .verification_results()
        .iter()
        .map(|r| (r.scope, r.outcome))
        .collect()
}

#[test]
fn test_signed_document_verifies() {
    let mut document = signed().unwrap();
    let loaded = reload(&mut document, &[]).unwrap();
    assert_eq!(
        outcomes(&loaded),
        vec![
            (Some(SignatureScope::ContentKeys), Ok(())),
            (Some(SignatureScope::Document), Ok(())),
        ]
    );
    let signer = author1().certificate().fingerprint();
    assert!(loaded.signatures().all(|s| s.fingerprint() == signer));
    assert!(loaded.signatures().all(|s| s.status() == SignatureStatus::Signed));
    assert_eq!(
        loaded.document_signature().unwrap().signer(),
        author1().certificate()
    );
}

#[test]
fn test_three_scopes_with_two_signers() {
    let mut document = with_rules_encrypted_and_signed().unwrap();
    let loaded = reload(&mut document, &[recipient1()]).unwrap();
    let results = loaded.verification_results();
    assert_eq!(results.len(), 3);
    assert!(results.iter().all(|r| r.is_valid()));
    assert_eq!(results[0].signer, *author1().certificate());
    assert_eq!(results[1].scope, Some(SignatureScope::UsageRules));
    assert_eq!(results[1].signer, *author2().certificate());
    assert_eq!(results[2].scope, Some(SignatureScope::Document));
    assert_eq!(results[2].signer, *author2().certificate());
}

#[test]
fn test_tampering_in_scope_is_detected() {
    init_tracing();
    let mut document = signed().unwrap();
    let first = document.content_keys()[0].id;
    let bytes = document.save_signed(&authors()).unwrap();

    let other = KeyId::new();
    let tampered = tamper(&bytes, &format!(r#"kid="{first}""#), &format!(r#"kid="{other}""#));
    let loaded = CpixDocument::load(&tampered, &[]).unwrap();
    assert_eq!(
        outcomes(&loaded),
        vec![
            (
                Some(SignatureScope::ContentKeys),
                Err(VerificationFailure::SignatureInvalid)
            ),
            (
                Some(SignatureScope::Document),
                Err(VerificationFailure::SignatureInvalid)
            ),
        ]
    );
    assert!(loaded.content_key(&other).is_some());
}

#[test]
fn test_tampering_out_of_scope() {
    let mut document = CpixDocument::new();
    document.set_content_id(Some("before".into())).unwrap();
    document.add_content_key(generate_content_key()).unwrap();
    document.add_content_key_signature(author1().certificate()).unwrap();
    let bytes = document.save_signed(&authors()).unwrap();

    // The content key signature does not cover root attributes.
    let tampered = tamper(&bytes, r#"contentId="before""#, r#"contentId="after""#);
    let loaded = CpixDocument::load(&tampered, &[]).unwrap();
    assert_eq!(loaded.content_id(), Some("after"));
    assert!(loaded.verification_results()[0].is_valid());

    // The document signature does.
    document.set_document_signature(author2().certificate()).unwrap();
    let bytes = document.save_signed(&authors()).unwrap();
    let tampered = tamper(&bytes, r#"contentId="before""#, r#"contentId="after""#);
    let loaded = CpixDocument::load(&tampered, &[]).unwrap();
    assert_eq!(
        outcomes(&loaded),
        vec![
            (Some(SignatureScope::ContentKeys), Ok(())),
            (
                Some(SignatureScope::Document),
                Err(VerificationFailure::SignatureInvalid)
            ),
        ]
    );
}

#[test]
fn test_tampered_encrypted_key_still_loads() {
    init_tracing();
    let mut document = encrypted_and_signed().unwrap();
    let first = document.content_keys()[0].id;
    let second = document.content_keys()[1].id;
    let bytes = document.save_signed(&authors()).unwrap();

    let other = KeyId::new();
    let tampered = tamper(&bytes, &format!(r#"kid="{first}""#), &format!(r#"kid="{other}""#));
    for identities in [vec![], vec![recipient1()]] {
        let loaded = CpixDocument::load(&tampered, &identities).unwrap();
        assert_eq!(
            outcomes(&loaded),
            vec![
                (
                    Some(SignatureScope::ContentKeys),
                    Err(VerificationFailure::SignatureInvalid)
                ),
                (
                    Some(SignatureScope::Document),
                    Err(VerificationFailure::SignatureInvalid)
                ),
            ]
        );
        // The value was sealed under the original id and cannot be opened.
        assert!(loaded.content_key(&other).unwrap().value().is_err());
    }

    let loaded = CpixDocument::load(&tampered, &[recipient2()]).unwrap();
    assert!(!loaded.protection().is_locked());
    assert!(loaded.content_key(&second).unwrap().value().is_ok());
}

#[test]
fn test_save_requires_signer_credential() {
    let mut document = CpixDocument::new();
    document.add_content_key(generate_content_key()).unwrap();
    document
        .add_content_key_signature(author1().certificate())
        .unwrap();
    document
        .set_document_signature(author2().certificate())
        .unwrap();

    let err = document.save().unwrap_err();
    match err {
        CpixError::Signing(SigningError::MissingCredential { signer, .. }) => {
            assert_eq!(signer, author1().certificate().fingerprint());
        }
        other => panic!("unexpected error: {other:?}"),
    }

    // A partial set of credentials signs nothing.
    let err = document.save_signed(&[author1()]).unwrap_err();
    match err {
        CpixError::Signing(SigningError::MissingCredential { signer, .. }) => {
            assert_eq!(signer, author2().certificate().fingerprint());
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(document
        .signatures()
        .all(|s| s.status() == SignatureStatus::Pending));

    let mut out = Vec::new();
    document.save_signed_to(&authors(), &mut out).unwrap();
    assert!(document
        .signatures()
        .all(|s| s.status() == SignatureStatus::Signed));
    // Once signed, no credential is needed to write the document again.
    assert_eq!(document.save().unwrap(), out);
}

#[test]
fn test_signer_must_have_signing_key() {
    let mut document = CpixDocument::new();
    let recipient = recipient1().certificate().clone();
    assert!(matches!(
        document.add_content_key_signature(&recipient),
        Err(CpixError::Validation(ValidationError::UnsuitableCertificate(_)))
    ));
    assert!(matches!(
        document.set_document_signature(&recipient),
        Err(CpixError::Validation(ValidationError::UnsuitableCertificate(_)))
    ));
    assert_eq!(document.signatures().count(), 0);
}

#[test]
fn test_mutation_dirties_signatures() {
    init_tracing();
    let mut document = signed().unwrap();
    let mut loaded = reload(&mut document, &[]).unwrap();

    loaded.add_content_key(generate_content_key()).unwrap();
    assert!(loaded
        .signatures()
        .all(|s| s.status() == SignatureStatus::Dirty));

    // Credentials alone do not recompute a dirty signature.
    let err = loaded.save_signed(&authors()).unwrap_err();
    assert!(matches!(
        err,
        CpixError::Signing(SigningError::MissingCredential { .. })
    ));

    // Dirty signatures are reported as invalid until re-signed.
    let results = loaded.verify(&TrustAll).unwrap();
    assert!(results
        .iter()
        .any(|r| r.outcome == Err(VerificationFailure::SignatureInvalid)));

    loaded.resign(SignatureScope::ContentKeys, author1().certificate()).unwrap();
    assert!(loaded.save_signed(&authors()).is_err());
    loaded.resign(SignatureScope::Document, author1().certificate()).unwrap();

    let again = reload(&mut loaded, &[]).unwrap();
    assert_eq!(again.content_keys().len(), 3);
    assert!(again.verification_results().iter().all(|r| r.is_valid()));
}

#[test]
fn test_resign_requires_original_signer() {
    let mut document = signed().unwrap();
    let mut loaded = reload(&mut document, &[]).unwrap();
    loaded.add_content_key(generate_content_key()).unwrap();

    let err = loaded
        .resign(SignatureScope::ContentKeys, author2().certificate())
        .unwrap_err();
    match err {
        CpixError::Signing(SigningError::CredentialMismatch { expected, got }) => {
            assert_eq!(expected, author1().certificate().fingerprint());
            assert_eq!(got, author2().certificate().fingerprint());
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(matches!(
        loaded.resign(SignatureScope::Document, author2().certificate()),
        Err(CpixError::Signing(SigningError::CredentialMismatch { .. }))
    ));
    assert!(matches!(
        loaded.resign(SignatureScope::UsageRules, author1().certificate()),
        Err(CpixError::Validation(ValidationError::UnknownSignature { .. }))
    ));
}

#[test]
fn test_untouched_scope_stays_signed() {
    let mut document = with_rules_encrypted_and_signed().unwrap();
    let mut loaded = reload(&mut document, &[recipient1()]).unwrap();

    let key = loaded.content_keys()[0].id;
    loaded.add_usage_rule(UsageRule::new(key)).unwrap();
    let statuses: Vec<_> = loaded.signatures().map(|s| (s.scope(), s.status())).collect();
    assert_eq!(
        statuses,
        vec![
            (SignatureScope::ContentKeys, SignatureStatus::Signed),
            (SignatureScope::UsageRules, SignatureStatus::Dirty),
            (SignatureScope::Document, SignatureStatus::Dirty),
        ]
    );

    loaded.resign(SignatureScope::UsageRules, author2().certificate()).unwrap();
    loaded.resign(SignatureScope::Document, author2().certificate()).unwrap();
    let again = reload(&mut loaded, &[recipient1()]).unwrap();
    assert_eq!(again.usage_rules().len(), 6);
    assert_eq!(again.verification_results().len(), 3);
    assert!(again.verification_results().iter().all(|r| r.is_valid()));
}

#[test]
fn test_strict_mode_rejects_signed_mutation() {
    let mut document = CpixDocument::with_config(DocumentConfig::strict());
    let key = generate_content_key();
    document.add_content_key(key.clone()).unwrap();
    document.add_content_key_signature(author1().certificate()).unwrap();

    // Pending signatures do not block changes.
    document.add_content_key(generate_content_key()).unwrap();
    document.save_signed(&authors()).unwrap();

    let err = document.add_content_key(generate_content_key()).unwrap_err();
    assert!(matches!(
        err,
        CpixError::Validation(ValidationError::SignedScope { .. })
    ));
    assert_eq!(document.content_keys().len(), 2);

    // Usage rules are outside the signed scope.
    document.add_usage_rule(UsageRule::new(key.id)).unwrap();
    document.save().unwrap();

    let options = LoadOptions::new().with_config(DocumentConfig::strict());
    let bytes = document.save().unwrap();
    let mut loaded = CpixDocument::load_with(&bytes, &options).unwrap();
    assert!(loaded.config().strict_signatures);
    let id = loaded.content_keys()[1].id;
    assert!(loaded.remove_content_key(&id).is_err());
}

#[test]
fn test_missing_scope_is_dropped() {
    init_tracing();
    let mut document = signed().unwrap();
    let bytes = document.save_signed(&authors()).unwrap();

    let tampered = tamper(&bytes, r#"id="ContentKeyList""#, r#"id="Renamed""#);
    let mut loaded = CpixDocument::load(&tampered, &[]).unwrap();
    assert_eq!(
        outcomes(&loaded),
        vec![
            (None, Err(VerificationFailure::ScopeMissing)),
            (
                Some(SignatureScope::Document),
                Err(VerificationFailure::SignatureInvalid)
            ),
        ]
    );

    // Only the document signature is kept, and it must be redone.
    let statuses: Vec<_> = loaded.signatures().map(|s| (s.scope(), s.status())).collect();
    assert_eq!(statuses, vec![(SignatureScope::Document, SignatureStatus::Dirty)]);
    assert!(loaded.save().is_err());

    loaded.resign(SignatureScope::Document, author1().certificate()).unwrap();
    let again = reload(&mut loaded, &[]).unwrap();
    assert_eq!(outcomes(&again), vec![(Some(SignatureScope::Document), Ok(()))]);
}

#[test]
fn test_trust_policy() {
    init_tracing();
    let mut document = with_rules_encrypted_and_signed().unwrap();
    let bytes = document.save_signed(&authors()).unwrap();

    let options = LoadOptions::new()
        .with_identity(recipient1())
        .with_trust(TrustList::new().with(author1().certificate()));
    let loaded = CpixDocument::load_with(&bytes, &options).unwrap();
    assert_eq!(
        outcomes(&loaded),
        vec![
            (Some(SignatureScope::ContentKeys), Ok(())),
            (
                Some(SignatureScope::UsageRules),
                Err(VerificationFailure::CertificateUntrusted)
            ),
            (
                Some(SignatureScope::Document),
                Err(VerificationFailure::CertificateUntrusted)
            ),
        ]
    );

    let trusted = TrustList::new()
        .with(author1().certificate())
        .with(author2().certificate());
    assert!(loaded
        .verify(&trusted)
        .unwrap()
        .iter()
        .all(|r| r.is_valid()));
}

#[test]
fn test_verify_before_and_after_save() {
    let mut document = signed().unwrap();
    assert!(document.verify(&TrustAll).unwrap().is_empty());

    document.save_signed(&authors()).unwrap();
    let results = document.verify(&TrustAll).unwrap();
    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|r| r.is_valid()));
}

#[test]
fn test_signature_bookkeeping() {
    let mut document = CpixDocument::new();
    document.add_content_key(generate_content_key()).unwrap();
    document.add_content_key_signature(author1().certificate()).unwrap();
    document.add_content_key_signature(author2().certificate()).unwrap();

    assert!(matches!(
        document.add_content_key_signature(author1().certificate()),
        Err(CpixError::Validation(ValidationError::DuplicateSignature { .. }))
    ));

    document.set_document_signature(author1().certificate()).unwrap();
    document.set_document_signature(author2().certificate()).unwrap();
    assert_eq!(
        document.document_signature().unwrap().fingerprint(),
        author2().certificate().fingerprint()
    );
    assert!(document
        .signatures()
        .all(|s| s.status() == SignatureStatus::Pending));

    let loaded = reload(&mut document, &[]).unwrap();
    assert_eq!(loaded.verification_results().len(), 3);
    assert!(loaded.verification_results().iter().all(|r| r.is_valid()));

    let author2_fp = author2().certificate().fingerprint();
    document
        .remove_signature(SignatureScope::ContentKeys, &author2_fp)
        .unwrap();
    assert!(matches!(
        document.remove_signature(SignatureScope::ContentKeys, &author2_fp),
        Err(CpixError::Validation(ValidationError::UnknownSignature { .. }))
    ));
    assert!(document.remove_document_signature().is_some());
    assert!(document.remove_document_signature().is_none());

    let loaded = reload(&mut document, &[]).unwrap();
    assert_eq!(outcomes(&loaded), vec![(Some(SignatureScope::ContentKeys), Ok(()))]);
}

#[test]
fn test_rule_signature_on_empty_list() {
    let mut document = CpixDocument::new();
    document.add_usage_rule_signature(author1().certificate()).unwrap();
    let text = String::from_utf8(document.save_signed(&authors()).unwrap()).unwrap();
    assert!(text.contains(r#"id="ContentKeyUsageRuleList""#));

    let loaded = CpixDocument::load(text.as_bytes(), &[]).unwrap();
    assert_eq!(outcomes(&loaded), vec![(Some(SignatureScope::UsageRules), Ok(()))]);
}

#[test]
fn test_duplicate_document_signature_rejected() {
    let mut document = signed().unwrap();
    let text = String::from_utf8(document.save_signed(&authors()).unwrap()).unwrap();

    let start = text.rfind("<ds:Signature>").unwrap();
    let end = text.rfind("</cpix:CPIX>").unwrap();
    let mut doubled = text.clone();
    doubled.insert_str(end, &text[start..end]);

    let err = CpixDocument::load(doubled.as_bytes(), &[]).unwrap_err();
    assert!(matches!(err, CpixError::Format(FormatError::DuplicateSection(_))));
}

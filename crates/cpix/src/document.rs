//! The CPIX document: content keys, recipients, usage rules and signatures.
//!
//! Protection is applied when the model changes: adding a key seals it under
//! the current document key, and changing the recipient set re-protects every
//! key under a fresh one. Signatures are computed on save, with signing
//! credentials supplied to that call; the model holds signer certificates only.
//!
//! Sections read from input are kept as element snapshots and written back
//! unchanged until the part of the model they carry is mutated, so signatures
//! over them stay verifiable.

use std::io::Write;

use tracing::debug;

use cpix_core::{
    validate_unique_key, validate_usage_rule, Certificate, ContentKey, Fingerprint, KeyId, KeyValue,
    RecipientIdentity, SigningIdentity, UsageRule, ValidationError,
};
use cpix_dsig::{
    sign, Reference, SignatureScope, SigningError, TrustPolicy, VerificationFailure,
    VerificationResult,
};
use cpix_protect::{protect, seal_into, unprotect, ProtectError, Protection, UnprotectOutcome};
use cpix_xml::names::{dsig, ns};
use cpix_xml::{write, write_to, Element, Scope, ScopedElement};

use crate::config::{DocumentConfig, LoadOptions};
use crate::error::{CpixError, Result};
use crate::render::{self, place, CONTENT_KEY_LIST_ID, USAGE_RULE_LIST_ID};
use crate::signature::{SignatureEntry, SignatureState, SignatureStatus};

/// Sections as read from input, re-emitted until mutated.
#[derive(Debug, Clone, Default)]
pub(crate) struct Snapshots {
    pub delivery: Option<Element>,
    pub content_keys: Option<Element>,
    pub usage_rules: Option<Element>,
}

/// A CPIX document.
///
/// Not internally synchronized: mutate from one thread at a time.
#[derive(Debug, Clone)]
pub struct CpixDocument {
    /// The root element without children: name, declarations, attributes.
    pub(crate) shell: Element,
    pub(crate) content_keys: Vec<ContentKey>,
    pub(crate) protection: Protection,
    pub(crate) usage_rules: Vec<UsageRule>,
    pub(crate) content_key_list_id: Option<String>,
    pub(crate) usage_rule_list_id: Option<String>,
    /// Content key and usage rule signatures, in insertion order.
    pub(crate) signatures: Vec<SignatureEntry>,
    pub(crate) document_signature: Option<SignatureEntry>,
    pub(crate) snapshots: Snapshots,
    /// The complete tree last read or written, while nothing has changed since.
    pub(crate) source: Option<Element>,
    pub(crate) verification: Vec<VerificationResult>,
    pub(crate) config: DocumentConfig,
}

impl CpixDocument {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::with_config(DocumentConfig::default())
    }

    pub fn with_config(config: DocumentConfig) -> Self {
        Self {
            shell: render::root_shell(),
            content_keys: Vec::new(),
            protection: Protection::Unprotected,
            usage_rules: Vec::new(),
            content_key_list_id: Some(CONTENT_KEY_LIST_ID.to_string()),
            usage_rule_list_id: Some(USAGE_RULE_LIST_ID.to_string()),
            signatures: Vec::new(),
            document_signature: None,
            snapshots: Snapshots::default(),
            source: None,
            verification: Vec::new(),
            config,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn config(&self) -> &DocumentConfig {
        &self.config
    }

    /// The root `id` attribute of a loaded document.
    pub fn id(&self) -> Option<&str> {
        self.shell.attr("id")
    }

    pub fn content_id(&self) -> Option<&str> {
        self.shell.attr("contentId")
    }

    /// Content keys in insertion order.
    pub fn content_keys(&self) -> &[ContentKey] {
        &self.content_keys
    }

    pub fn content_key(&self, id: &KeyId) -> Option<&ContentKey> {
        self.content_keys.iter().find(|k| &k.id == id)
    }

    /// Recipient certificates in insertion order.
    pub fn recipients(&self) -> impl Iterator<Item = &Certificate> {
        self.protection.recipients()
    }

    /// Usage rules in insertion order.
    pub fn usage_rules(&self) -> &[UsageRule] {
        &self.usage_rules
    }

    /// Rules bound to one content key.
    pub fn usage_rules_for<'a>(&'a self, id: &'a KeyId) -> impl Iterator<Item = &'a UsageRule> + 'a {
        self.usage_rules.iter().filter(move |r| &r.key_id == id)
    }

    pub fn protection(&self) -> &Protection {
        &self.protection
    }

    /// Whether content key values are stored encrypted.
    pub fn is_encrypted(&self) -> bool {
        self.protection.is_protected()
    }

    /// All signatures: scope signatures in insertion order, then the
    /// document signature.
    pub fn signatures(&self) -> impl Iterator<Item = &SignatureEntry> {
        self.signatures.iter().chain(self.document_signature.iter())
    }

    pub fn document_signature(&self) -> Option<&SignatureEntry> {
        self.document_signature.as_ref()
    }

    /// Verification results for the signatures found when the document was
    /// loaded, including ones dropped because their content was missing.
    pub fn verification_results(&self) -> &[VerificationResult] {
        &self.verification
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Content keys
    // ─────────────────────────────────────────────────────────────────────────

    /// Add a content key. In an encrypted document the key is sealed under
    /// the current document key.
    pub fn add_content_key(&mut self, mut key: ContentKey) -> Result<()> {
        validate_unique_key(&self.content_keys, &key.id)?;
        self.ensure_unsigned(Some(SignatureScope::ContentKeys))?;

        let value = key.value()?.clone();
        key.state = KeyValue::Clear(value);
        seal_into(&mut key, &self.protection)?;

        debug!(key_id = %key.id, encrypted = key.is_encrypted(), "content key added");
        self.content_keys.push(key);
        self.snapshots.content_keys = None;
        self.invalidate(Some(SignatureScope::ContentKeys));
        Ok(())
    }

    /// Remove a content key. Fails while a usage rule references it.
    pub fn remove_content_key(&mut self, id: &KeyId) -> Result<ContentKey> {
        let index = self
            .content_keys
            .iter()
            .position(|k| &k.id == id)
            .ok_or(ValidationError::UnknownKeyId(*id))?;
        if self.usage_rules.iter().any(|r| &r.key_id == id) {
            return Err(ValidationError::KeyInUse(*id).into());
        }
        self.ensure_unsigned(Some(SignatureScope::ContentKeys))?;

        let key = self.content_keys.remove(index);
        debug!(key_id = %key.id, "content key removed");
        self.snapshots.content_keys = None;
        self.invalidate(Some(SignatureScope::ContentKeys));
        Ok(key)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Recipients
    // ─────────────────────────────────────────────────────────────────────────

    /// Add a recipient. All content keys are re-protected under a fresh
    /// document key wrapped for every recipient.
    pub fn add_recipient(&mut self, certificate: Certificate) -> Result<()> {
        let fingerprint = certificate.fingerprint();
        if certificate.encryption_key().is_none() {
            return Err(ValidationError::UnsuitableCertificate(fingerprint).into());
        }
        if self.recipients().any(|r| r.fingerprint() == fingerprint) {
            return Err(ValidationError::DuplicateRecipient(fingerprint).into());
        }
        self.ensure_unsigned(Some(SignatureScope::ContentKeys))?;

        let mut recipients: Vec<Certificate> = self.recipients().cloned().collect();
        recipients.push(certificate);
        self.reprotect(&recipients)?;
        debug!(recipient = %fingerprint, recipients = recipients.len(), "recipient added");
        Ok(())
    }

    /// Remove a recipient. Removing the last one returns content keys to
    /// clear storage.
    pub fn remove_recipient(&mut self, fingerprint: &Fingerprint) -> Result<Certificate> {
        let mut recipients: Vec<Certificate> = self.recipients().cloned().collect();
        let index = recipients
            .iter()
            .position(|r| r.fingerprint() == *fingerprint)
            .ok_or(ValidationError::UnknownRecipient(*fingerprint))?;
        self.ensure_unsigned(Some(SignatureScope::ContentKeys))?;

        let removed = recipients.remove(index);
        self.reprotect(&recipients)?;
        debug!(recipient = %fingerprint, recipients = recipients.len(), "recipient removed");
        Ok(removed)
    }

    fn reprotect(&mut self, recipients: &[Certificate]) -> Result<()> {
        if self.protection.is_locked() {
            return Err(ProtectError::DocumentKeyUnavailable.into());
        }
        self.protection = protect(&mut self.content_keys, recipients)?;
        self.snapshots.delivery = None;
        self.snapshots.content_keys = None;
        self.invalidate(Some(SignatureScope::ContentKeys));
        Ok(())
    }

    /// Try to decrypt the content keys with the given identities.
    ///
    /// Finding no matching identity is not an error; the keys stay
    /// encrypted and reading them fails with `NotDecryptedError`.
    pub fn unprotect(&mut self, identities: &[RecipientIdentity]) -> Result<UnprotectOutcome> {
        let outcome = unprotect(&mut self.content_keys, &mut self.protection, identities)?;
        debug!(?outcome, "unprotect");
        Ok(outcome)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Usage rules
    // ─────────────────────────────────────────────────────────────────────────

    /// Add a usage rule. Its key must exist and its filters must be valid.
    pub fn add_usage_rule(&mut self, rule: UsageRule) -> Result<()> {
        validate_usage_rule(&rule, &self.content_keys)?;
        self.ensure_unsigned(Some(SignatureScope::UsageRules))?;

        debug!(key_id = %rule.key_id, constrained = rule.has_constraints(), "usage rule added");
        self.usage_rules.push(rule);
        self.snapshots.usage_rules = None;
        self.invalidate(Some(SignatureScope::UsageRules));
        Ok(())
    }

    /// Remove the usage rule at `index`.
    pub fn remove_usage_rule(&mut self, index: usize) -> Result<UsageRule> {
        if index >= self.usage_rules.len() {
            return Err(ValidationError::UnknownUsageRule(index).into());
        }
        self.ensure_unsigned(Some(SignatureScope::UsageRules))?;

        let rule = self.usage_rules.remove(index);
        self.snapshots.usage_rules = None;
        self.invalidate(Some(SignatureScope::UsageRules));
        Ok(rule)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Document attributes
    // ─────────────────────────────────────────────────────────────────────────

    pub fn set_content_id(&mut self, content_id: Option<String>) -> Result<()> {
        self.ensure_unsigned(None)?;
        match content_id {
            Some(content_id) => self.shell.set_attr("contentId", content_id),
            None => {
                self.shell.remove_attr("contentId");
            }
        }
        self.invalidate(None);
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Signatures
    // ─────────────────────────────────────────────────────────────────────────

    /// Request a signature over the content key list by `signer`, computed
    /// by a save that is given the signer's credential.
    pub fn add_content_key_signature(&mut self, signer: &Certificate) -> Result<()> {
        self.add_scope_signature(SignatureScope::ContentKeys, signer)
    }

    /// Request a signature over the usage rule list, computed on save.
    pub fn add_usage_rule_signature(&mut self, signer: &Certificate) -> Result<()> {
        self.add_scope_signature(SignatureScope::UsageRules, signer)
    }

    fn add_scope_signature(&mut self, scope: SignatureScope, certificate: &Certificate) -> Result<()> {
        let signer = signing_fingerprint(certificate)?;
        if self
            .signatures
            .iter()
            .any(|s| s.scope() == scope && s.is_by(&signer))
        {
            return Err(ValidationError::DuplicateSignature {
                scope: scope.name().to_string(),
                signer,
            }
            .into());
        }
        self.ensure_unsigned(None)?;

        // The list needs an id to be referenced.
        match scope {
            SignatureScope::ContentKeys if self.content_key_list_id.is_none() => {
                self.content_key_list_id = Some(CONTENT_KEY_LIST_ID.to_string());
                self.snapshots.content_keys = None;
            }
            SignatureScope::UsageRules if self.usage_rule_list_id.is_none() => {
                self.usage_rule_list_id = Some(USAGE_RULE_LIST_ID.to_string());
                self.snapshots.usage_rules = None;
            }
            _ => {}
        }

        debug!(%scope, %signer, "signature requested");
        self.signatures.push(SignatureEntry::pending(scope, certificate.clone()));
        self.invalidate(None);
        Ok(())
    }

    /// Request the whole-document signature, replacing any existing one.
    /// It is computed on save, after every other signature.
    pub fn set_document_signature(&mut self, signer: &Certificate) -> Result<()> {
        let fingerprint = signing_fingerprint(signer)?;
        debug!(signer = %fingerprint, "document signature requested");
        self.document_signature = Some(SignatureEntry::pending(SignatureScope::Document, signer.clone()));
        self.source = None;
        Ok(())
    }

    /// Remove the signature `signer` made over `scope`.
    pub fn remove_signature(&mut self, scope: SignatureScope, signer: &Fingerprint) -> Result<SignatureEntry> {
        if scope == SignatureScope::Document {
            return match &self.document_signature {
                Some(entry) if entry.is_by(signer) => self
                    .remove_document_signature()
                    .ok_or_else(|| unknown_signature(scope, *signer)),
                _ => Err(unknown_signature(scope, *signer)),
            };
        }

        let index = self
            .signatures
            .iter()
            .position(|s| s.scope() == scope && s.is_by(signer))
            .ok_or_else(|| unknown_signature(scope, *signer))?;
        self.ensure_unsigned(None)?;

        let entry = self.signatures.remove(index);
        self.invalidate(None);
        Ok(entry)
    }

    /// Remove the document signature, if any.
    pub fn remove_document_signature(&mut self) -> Option<SignatureEntry> {
        let entry = self.document_signature.take();
        if entry.is_some() {
            self.source = None;
        }
        entry
    }

    /// Request `scope` to be signed again by its original signer. This is how
    /// a dirty signature becomes pending again; the signer's credential is
    /// needed by the next save.
    pub fn resign(&mut self, scope: SignatureScope, signer: &Certificate) -> Result<()> {
        let got = signer.fingerprint();

        if scope == SignatureScope::Document {
            let entry = self
                .document_signature
                .as_ref()
                .ok_or_else(|| unknown_signature(scope, got))?;
            if !entry.is_by(&got) {
                return Err(SigningError::CredentialMismatch {
                    expected: entry.fingerprint(),
                    got,
                }
                .into());
            }
            return self.set_document_signature(signer);
        }

        let index = match self
            .signatures
            .iter()
            .position(|s| s.scope() == scope && s.is_by(&got))
        {
            Some(index) => index,
            None => {
                let others = self.signatures.iter().filter(|s| s.scope() == scope);
                let expected = others
                    .clone()
                    .find(|s| s.status() == SignatureStatus::Dirty)
                    .or_else(|| others.clone().next());
                return Err(match expected {
                    Some(entry) => SigningError::CredentialMismatch {
                        expected: entry.fingerprint(),
                        got,
                    }
                    .into(),
                    None => unknown_signature(scope, got),
                });
            }
        };

        if self.signatures[index].is_signed() {
            self.ensure_unsigned(None)?;
        }
        debug!(%scope, signer = %got, "signature re-requested");
        self.signatures[index] = SignatureEntry::pending(scope, signer.clone());
        self.invalidate(None);
        Ok(())
    }

    /// Fail in strict mode if a finalized signature covers `section` or the
    /// whole document.
    fn ensure_unsigned(&self, section: Option<SignatureScope>) -> Result<()> {
        if !self.config.strict_signatures {
            return Ok(());
        }
        match self
            .signatures()
            .find(|s| s.is_signed() && covers(s.scope(), section))
        {
            Some(entry) => Err(ValidationError::SignedScope {
                scope: entry.scope().name().to_string(),
            }
            .into()),
            None => Ok(()),
        }
    }

    /// Record a change to `section`. The document scope is always affected.
    fn invalidate(&mut self, section: Option<SignatureScope>) {
        self.source = None;
        for entry in self
            .signatures
            .iter_mut()
            .chain(self.document_signature.iter_mut())
        {
            if covers(entry.scope(), section) && entry.invalidate() {
                debug!(scope = %entry.scope(), signer = %entry.fingerprint(), "signature is now dirty");
            }
        }
    }

    fn has_signature(&self, scope: SignatureScope) -> bool {
        self.signatures.iter().any(|s| s.scope() == scope)
    }

    fn reference(&self, scope: SignatureScope) -> Reference {
        let id = match scope {
            SignatureScope::Document => return Reference::Document,
            SignatureScope::ContentKeys => self.content_key_list_id.as_deref(),
            SignatureScope::UsageRules => self.usage_rule_list_id.as_deref(),
        };
        Reference::Element(
            id.unwrap_or(match scope {
                SignatureScope::UsageRules => USAGE_RULE_LIST_ID,
                _ => CONTENT_KEY_LIST_ID,
            })
            .to_string(),
        )
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Save
    // ─────────────────────────────────────────────────────────────────────────

    /// Serialize a document that has no pending signatures.
    ///
    /// Equivalent to [`save_signed`](Self::save_signed) with no credentials.
    pub fn save(&mut self) -> Result<Vec<u8>> {
        self.save_signed(&[])
    }

    /// Like [`save`](Self::save), writing to `sink`.
    pub fn save_to<W: Write>(&mut self, sink: W) -> Result<()> {
        self.save_signed_to(&[], sink)
    }

    /// Compute pending signatures with `signers` and serialize the document.
    ///
    /// Every pending signature needs its signer's credential among `signers`,
    /// and a dirty signature must be re-requested with
    /// [`resign`](Self::resign) or removed first. Otherwise the save fails with
    /// [`SigningError::MissingCredential`] and the document is unchanged.
    /// Credentials are used for this call only.
    pub fn save_signed(&mut self, signers: &[SigningIdentity]) -> Result<Vec<u8>> {
        let root = self.finalize(signers)?;
        let bytes = write(&root)?;
        debug!(bytes = bytes.len(), "document saved");
        Ok(bytes)
    }

    /// Like [`save_signed`](Self::save_signed), writing to `sink`.
    pub fn save_signed_to<W: Write>(&mut self, signers: &[SigningIdentity], sink: W) -> Result<()> {
        let root = self.finalize(signers)?;
        write_to(&root, sink)?;
        Ok(())
    }

    fn finalize(&mut self, signers: &[SigningIdentity]) -> Result<Element> {
        if let Some(stale) = self
            .signatures()
            .find(|s| s.status() == SignatureStatus::Dirty)
        {
            return Err(missing_credential(stale).into());
        }
        if let Some(source) = &self.source {
            return Ok(source.clone());
        }

        let mut root = self.render_sections();
        let key_list = self.reference(SignatureScope::ContentKeys);
        let rule_list = self.reference(SignatureScope::UsageRules);

        // Entries change state only once every signature has been computed.
        let mut computed = Vec::with_capacity(self.signatures.len());
        for entry in &self.signatures {
            let reference = match entry.scope() {
                SignatureScope::UsageRules => &rule_list,
                _ => &key_list,
            };
            let element = finalize_entry(entry, &root, reference, signers)?;
            root.push_child(element.clone());
            computed.push(element);
        }
        let document_element = match &self.document_signature {
            Some(entry) => {
                let element = finalize_entry(entry, &root, &Reference::Document, signers)?;
                root.push_child(element.clone());
                Some(element)
            }
            None => None,
        };

        for (entry, element) in self.signatures.iter_mut().zip(computed) {
            entry.state = SignatureState::Signed(element);
        }
        if let (Some(entry), Some(element)) = (self.document_signature.as_mut(), document_element) {
            entry.state = SignatureState::Signed(element);
        }

        debug!(
            keys = self.content_keys.len(),
            recipients = self.protection.delivery().len(),
            rules = self.usage_rules.len(),
            signatures = self.signatures.len() + usize::from(self.document_signature.is_some()),
            "document rendered"
        );
        self.source = Some(root.clone());
        Ok(root)
    }

    /// The root with its sections, without signatures.
    fn render_sections(&self) -> Element {
        let mut root = self.shell.clone();
        let scope = Scope::new().enter(&self.shell);

        let delivery = self.snapshots.delivery.clone().or_else(|| {
            self.protection
                .is_protected()
                .then(|| place(render::delivery_data_list(self.protection.delivery()), &scope))
        });
        let content_keys = self.snapshots.content_keys.clone().or_else(|| {
            (!self.content_keys.is_empty() || self.has_signature(SignatureScope::ContentKeys)).then(|| {
                place(
                    render::content_key_list(self.content_key_list_id.as_deref(), &self.content_keys),
                    &scope,
                )
            })
        });
        let usage_rules = self.snapshots.usage_rules.clone().or_else(|| {
            (!self.usage_rules.is_empty() || self.has_signature(SignatureScope::UsageRules)).then(|| {
                place(
                    render::usage_rule_list(self.usage_rule_list_id.as_deref(), &self.usage_rules),
                    &scope,
                )
            })
        });

        for section in [delivery, content_keys, usage_rules].into_iter().flatten() {
            root.push_child(section);
        }
        root
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Load and verify
    // ─────────────────────────────────────────────────────────────────────────

    /// Load a document, decrypting it with the first identity that matches a
    /// recipient. Signatures are verified and trusted regardless of signer;
    /// see [`load_with`](Self::load_with) for a trust policy.
    pub fn load(bytes: &[u8], identities: &[RecipientIdentity]) -> Result<Self> {
        Self::load_with(bytes, &LoadOptions::new().with_identities(identities.iter().cloned()))
    }

    /// Load a document with explicit options.
    ///
    /// Malformed input fails with a `FormatError` and no document. Signature
    /// failures do not fail the load; they are reported in
    /// [`verification_results`](Self::verification_results).
    pub fn load_with(bytes: &[u8], options: &LoadOptions) -> Result<Self> {
        crate::load::read(bytes, options)
    }

    /// Verify every signature against the current state of the document.
    ///
    /// Dirty signatures are reported as [`VerificationFailure::SignatureInvalid`];
    /// pending ones are not yet signatures and are skipped.
    pub fn verify(&self, trust: &dyn TrustPolicy) -> Result<Vec<VerificationResult>> {
        let rendered;
        let root = match &self.source {
            Some(source) => source,
            None => {
                let mut root = self.render_sections();
                for element in self.signatures().filter_map(SignatureEntry::element) {
                    root.push_child(element.clone());
                }
                rendered = root;
                &rendered
            }
        };

        let scoped = ScopedElement::root(root);
        let mut results = Vec::new();
        for signature in scoped.children().filter(|c| c.is(ns::DSIG, dsig::SIGNATURE)) {
            results.push(cpix_dsig::verify(&scoped, &signature, trust)?);
        }
        for entry in self
            .signatures()
            .filter(|s| s.status() == SignatureStatus::Dirty)
        {
            results.push(VerificationResult {
                scope: Some(entry.scope()),
                reference: self.reference(entry.scope()),
                signer: entry.signer().clone(),
                outcome: Err(VerificationFailure::SignatureInvalid),
            });
        }
        Ok(results)
    }
}

impl Default for CpixDocument {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether a change to `section` affects a signature over `scope`.
fn covers(scope: SignatureScope, section: Option<SignatureScope>) -> bool {
    scope == SignatureScope::Document || Some(scope) == section
}

fn finalize_entry(
    entry: &SignatureEntry,
    root: &Element,
    reference: &Reference,
    signers: &[SigningIdentity],
) -> Result<Element> {
    match &entry.state {
        SignatureState::Signed(element) => Ok(element.clone()),
        SignatureState::Pending => {
            let identity = signers
                .iter()
                .find(|s| entry.is_by(&s.certificate().fingerprint()))
                .ok_or_else(|| missing_credential(entry))?;
            let element = sign(&ScopedElement::root(root), reference, identity)?;
            debug!(scope = %entry.scope(), reference = %reference.uri(), "signature computed");
            Ok(element)
        }
        SignatureState::Dirty => Err(missing_credential(entry).into()),
    }
}

/// Fingerprint of a certificate that can sign.
fn signing_fingerprint(certificate: &Certificate) -> Result<Fingerprint> {
    let fingerprint = certificate.fingerprint();
    if certificate.signing_key().is_none() {
        return Err(ValidationError::UnsuitableCertificate(fingerprint).into());
    }
    Ok(fingerprint)
}

fn missing_credential(entry: &SignatureEntry) -> SigningError {
    SigningError::MissingCredential {
        scope: entry.scope().name().to_string(),
        signer: entry.fingerprint(),
    }
}

fn unknown_signature(scope: SignatureScope, signer: Fingerprint) -> CpixError {
    ValidationError::UnknownSignature {
        scope: scope.name().to_string(),
        signer,
    }
    .into()
}

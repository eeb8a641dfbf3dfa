//! Document-level protection state: protect, seal, unprotect.
//!
//! A protected document holds one random document key. Every content key is
//! sealed under it, and it is wrapped once per recipient. The document key is
//! regenerated whenever the recipient set changes.

use tracing::{debug, warn};

use cpix_core::{Certificate, ContentKey, ContentKeyValue, Fingerprint, KeyValue, RecipientIdentity};

use crate::crypto::DocumentKey;
use crate::error::{ProtectError, Result};
use crate::seal::{open, seal};
use crate::wrap::WrappedKey;

/// The document key wrapped for one recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryRecord {
    pub recipient: Certificate,
    pub wrapped: WrappedKey,
}

impl DeliveryRecord {
    /// Fingerprint of the recipient certificate; locates a party's own record.
    pub fn fingerprint(&self) -> Fingerprint {
        self.recipient.fingerprint()
    }
}

/// Whether and how a document's content keys are encrypted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Protection {
    /// No recipients; content keys are stored in clear.
    Unprotected,
    /// Encrypted, and the document key has not been recovered.
    Locked { delivery: Vec<DeliveryRecord> },
    /// Encrypted, and the document key is known.
    Unlocked {
        key: DocumentKey,
        delivery: Vec<DeliveryRecord>,
    },
}

impl Protection {
    /// Delivery records, one per recipient, in insertion order.
    pub fn delivery(&self) -> &[DeliveryRecord] {
        match self {
            Protection::Unprotected => &[],
            Protection::Locked { delivery } | Protection::Unlocked { delivery, .. } => delivery,
        }
    }

    pub fn is_protected(&self) -> bool {
        !matches!(self, Protection::Unprotected)
    }

    pub fn is_locked(&self) -> bool {
        matches!(self, Protection::Locked { .. })
    }

    /// Recipient certificates in insertion order.
    pub fn recipients(&self) -> impl Iterator<Item = &Certificate> {
        self.delivery().iter().map(|d| &d.recipient)
    }
}

/// Result of an unprotect attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnprotectOutcome {
    /// The document has no recipients.
    NotProtected,
    /// The document key was already known.
    AlreadyUnlocked,
    /// The record for this recipient unwrapped; all content keys are readable.
    Unlocked { recipient: Fingerprint },
    /// The record for this recipient unwrapped, but `unreadable` content keys
    /// failed authentication and stay encrypted.
    PartiallyUnlocked {
        recipient: Fingerprint,
        unreadable: usize,
    },
    /// No identity opened any record. The document stays locked.
    NoMatchingIdentity,
}

/// Protect `keys` for `recipients` under a fresh document key.
///
/// With no recipients the keys are returned to clear storage. Every key must
/// have a readable plaintext. On error `keys` are left unchanged.
pub fn protect(keys: &mut [ContentKey], recipients: &[Certificate]) -> Result<Protection> {
    let mut plaintexts = Vec::with_capacity(keys.len());
    for key in keys.iter() {
        let value = key.value().map_err(|e| ProtectError::Encryption(e.to_string()))?;
        plaintexts.push(value.clone());
    }

    if recipients.is_empty() {
        for (key, value) in keys.iter_mut().zip(plaintexts) {
            key.state = KeyValue::Clear(value);
        }
        debug!(keys = keys.len(), "content keys stored in clear");
        return Ok(Protection::Unprotected);
    }

    let document_key = DocumentKey::generate();

    let mut delivery = Vec::with_capacity(recipients.len());
    for certificate in recipients {
        let public = certificate.encryption_key().ok_or_else(|| {
            ProtectError::Encryption(format!(
                "certificate {} has no key agreement key",
                certificate.fingerprint()
            ))
        })?;
        delivery.push(DeliveryRecord {
            recipient: certificate.clone(),
            wrapped: WrappedKey::wrap(&document_key, public)?,
        });
    }

    let mut states = Vec::with_capacity(keys.len());
    for (key, value) in keys.iter().zip(plaintexts) {
        let sealed = seal(&value, &key.id, &document_key)?;
        states.push(KeyValue::Unsealed { sealed, value });
    }
    for (key, state) in keys.iter_mut().zip(states) {
        key.state = state;
    }

    debug!(
        keys = keys.len(),
        recipients = recipients.len(),
        "content keys protected under a new document key"
    );
    Ok(Protection::Unlocked {
        key: document_key,
        delivery,
    })
}

/// Seal a key being added to a document with the given protection.
pub fn seal_into(key: &mut ContentKey, protection: &Protection) -> Result<()> {
    match protection {
        Protection::Unprotected => Ok(()),
        Protection::Locked { .. } => Err(ProtectError::DocumentKeyUnavailable),
        Protection::Unlocked { key: document_key, .. } => {
            let value: ContentKeyValue = key
                .value()
                .map_err(|e| ProtectError::Encryption(e.to_string()))?
                .clone();
            let sealed = seal(&value, &key.id, document_key)?;
            key.state = KeyValue::Unsealed { sealed, value };
            Ok(())
        }
    }
}

/// Try to recover the document key and open every sealed content key.
///
/// Every delivery record is tried with every identity; the AEAD tag decides
/// success. Finding no match is not an error. A content key that fails to
/// open under the recovered document key keeps its sealed value, so reading
/// it fails with `NotDecryptedError`; the outcome counts such keys.
pub fn unprotect(
    keys: &mut [ContentKey],
    protection: &mut Protection,
    identities: &[RecipientIdentity],
) -> Result<UnprotectOutcome> {
    let delivery = match protection {
        Protection::Unprotected => return Ok(UnprotectOutcome::NotProtected),
        Protection::Unlocked { .. } => return Ok(UnprotectOutcome::AlreadyUnlocked),
        Protection::Locked { delivery } => delivery,
    };

    let mut recovered = None;
    'records: for record in delivery.iter() {
        for identity in identities {
            match record.wrapped.unwrap_with(identity.secret()) {
                Ok(document_key) => {
                    recovered = Some((document_key, identity.certificate().fingerprint()));
                    break 'records;
                }
                Err(e) => {
                    debug!(record = %record.fingerprint(), error = %e, "identity did not unwrap record");
                }
            }
        }
    }

    let (document_key, recipient) = match recovered {
        Some(found) => found,
        None => {
            if !identities.is_empty() {
                warn!(
                    records = delivery.len(),
                    identities = identities.len(),
                    "no identity could unwrap the document key"
                );
            }
            return Ok(UnprotectOutcome::NoMatchingIdentity);
        }
    };

    let mut opened = Vec::with_capacity(keys.len());
    for key in keys.iter() {
        let sealed = key.sealed().ok_or_else(|| {
            ProtectError::Decryption(format!("content key {} is not encrypted", key.id))
        })?;
        match open(sealed, &key.id, &document_key) {
            Ok(value) => opened.push(Some(KeyValue::Unsealed {
                sealed: sealed.clone(),
                value,
            })),
            Err(e) => {
                warn!(key_id = %key.id, error = %e, "content key failed to open; left encrypted");
                opened.push(None);
            }
        }
    }
    let mut unreadable = 0;
    for (key, state) in keys.iter_mut().zip(opened) {
        match state {
            Some(state) => key.state = state,
            None => unreadable += 1,
        }
    }

    let delivery = std::mem::take(delivery);
    *protection = Protection::Unlocked {
        key: document_key,
        delivery,
    };

    debug!(%recipient, keys = keys.len(), unreadable, "document unlocked");
    if unreadable > 0 {
        return Ok(UnprotectOutcome::PartiallyUnlocked {
            recipient,
            unreadable,
        });
    }
    Ok(UnprotectOutcome::Unlocked { recipient })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lock(keys: &mut [ContentKey], protection: Protection) -> Protection {
        for key in keys.iter_mut() {
            if let Some(sealed) = key.sealed().cloned() {
                key.state = KeyValue::Sealed(sealed);
            }
        }
        match protection {
            Protection::Unlocked { delivery, .. } => Protection::Locked { delivery },
            other => other,
        }
    }

    #[test]
    fn test_protect_then_unprotect_each_recipient() {
        let r1 = RecipientIdentity::generate("Recipient1");
        let r2 = RecipientIdentity::generate("Recipient2");
        let recipients = vec![r1.certificate().clone(), r2.certificate().clone()];

        let original = vec![ContentKey::generate(), ContentKey::generate()];
        let mut keys = original.clone();
        let protection = protect(&mut keys, &recipients).unwrap();
        assert_eq!(protection.delivery().len(), 2);

        for identity in [&r1, &r2] {
            let mut copy = keys.clone();
            let mut locked = lock(&mut copy, protection.clone());
            assert!(copy[0].value().is_err());

            let outcome = unprotect(&mut copy, &mut locked, &[identity.clone()]).unwrap();
            assert_eq!(
                outcome,
                UnprotectOutcome::Unlocked {
                    recipient: identity.certificate().fingerprint()
                }
            );
            for (a, b) in copy.iter().zip(&original) {
                assert_eq!(a.value().unwrap(), b.value().unwrap());
            }
        }
    }

    #[test]
    fn test_unrelated_identity_does_not_unlock() {
        let r1 = RecipientIdentity::generate("Recipient1");
        let stranger = RecipientIdentity::generate("Stranger");

        let mut keys = vec![ContentKey::generate()];
        let protection = protect(&mut keys, &[r1.certificate().clone()]).unwrap();
        let mut locked = lock(&mut keys, protection);

        let outcome = unprotect(&mut keys, &mut locked, &[stranger]).unwrap();
        assert_eq!(outcome, UnprotectOutcome::NoMatchingIdentity);
        assert!(locked.is_locked());
        assert_eq!(keys[0].value().unwrap_err().key_id, keys[0].id);
    }

    #[test]
    fn test_no_recipients_restores_clear() {
        let r1 = RecipientIdentity::generate("Recipient1");
        let mut keys = vec![ContentKey::generate()];
        protect(&mut keys, &[r1.certificate().clone()]).unwrap();
        assert!(keys[0].is_encrypted());

        let protection = protect(&mut keys, &[]).unwrap();
        assert_eq!(protection, Protection::Unprotected);
        assert!(!keys[0].is_encrypted());
    }

    #[test]
    fn test_empty_key_set_is_valid() {
        let r1 = RecipientIdentity::generate("Recipient1");
        let mut keys: Vec<ContentKey> = Vec::new();
        let protection = protect(&mut keys, &[r1.certificate().clone()]).unwrap();
        assert!(protection.is_protected());
    }

    #[test]
    fn test_reprotect_changes_ciphertext_not_plaintext() {
        let r1 = RecipientIdentity::generate("Recipient1");
        let recipients = vec![r1.certificate().clone()];
        let mut keys = vec![ContentKey::generate()];
        let plaintext = keys[0].value().unwrap().clone();

        protect(&mut keys, &recipients).unwrap();
        let first = keys[0].sealed().unwrap().clone();
        protect(&mut keys, &recipients).unwrap();
        let second = keys[0].sealed().unwrap().clone();

        assert_ne!(first, second);
        assert_eq!(keys[0].value().unwrap(), &plaintext);
    }

    #[test]
    fn test_locked_key_cannot_be_reprotected() {
        let r1 = RecipientIdentity::generate("Recipient1");
        let mut keys = vec![ContentKey::generate()];
        let protection = protect(&mut keys, &[r1.certificate().clone()]).unwrap();
        let _locked = lock(&mut keys, protection);

        let result = protect(&mut keys, &[r1.certificate().clone()]);
        assert!(matches!(result, Err(ProtectError::Encryption(_))));
        assert!(keys[0].value().is_err());
    }

    #[test]
    fn test_signer_certificate_rejected_as_recipient() {
        let signer = cpix_core::SigningIdentity::generate("Author1");
        let mut keys = vec![ContentKey::generate()];
        let result = protect(&mut keys, &[signer.certificate().clone()]);
        assert!(matches!(result, Err(ProtectError::Encryption(_))));
        assert!(!keys[0].is_encrypted());
    }

    #[test]
    fn test_seal_into() {
        let r1 = RecipientIdentity::generate("Recipient1");
        let mut keys = vec![ContentKey::generate()];
        let protection = protect(&mut keys, &[r1.certificate().clone()]).unwrap();

        let mut added = ContentKey::generate();
        seal_into(&mut added, &protection).unwrap();
        assert!(added.is_encrypted());
        assert!(added.value().is_ok());

        let locked = lock(&mut keys, protection);
        let mut another = ContentKey::generate();
        assert_eq!(
            seal_into(&mut another, &locked),
            Err(ProtectError::DocumentKeyUnavailable)
        );
    }

    #[test]
    fn test_corrupted_content_key_stays_sealed() {
        let r1 = RecipientIdentity::generate("Recipient1");
        let mut keys = vec![ContentKey::generate(), ContentKey::generate()];
        let expected = keys[0].value().unwrap().clone();
        let protection = protect(&mut keys, &[r1.certificate().clone()]).unwrap();
        let mut locked = lock(&mut keys, protection);

        if let KeyValue::Sealed(sealed) = &mut keys[1].state {
            sealed.ciphertext[0] ^= 0x01;
        }

        let outcome = unprotect(&mut keys, &mut locked, &[r1.clone()]).unwrap();
        assert_eq!(
            outcome,
            UnprotectOutcome::PartiallyUnlocked {
                recipient: r1.certificate().fingerprint(),
                unreadable: 1,
            }
        );
        assert!(!locked.is_locked());
        assert_eq!(keys[0].value().unwrap(), &expected);
        assert_eq!(keys[1].value().unwrap_err().key_id, keys[1].id);
        assert!(keys[1].is_encrypted());
    }

    #[test]
    fn test_key_sealed_under_another_id_stays_sealed() {
        let r1 = RecipientIdentity::generate("Recipient1");
        let mut keys = vec![ContentKey::generate()];
        let protection = protect(&mut keys, &[r1.certificate().clone()]).unwrap();
        let mut locked = lock(&mut keys, protection);

        // The key id is bound as associated data.
        keys[0].id = cpix_core::KeyId::new();
        let outcome = unprotect(&mut keys, &mut locked, &[r1]).unwrap();
        assert!(matches!(
            outcome,
            UnprotectOutcome::PartiallyUnlocked { unreadable: 1, .. }
        ));
        assert!(keys[0].value().is_err());
    }
}

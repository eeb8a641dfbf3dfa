//! Test fixtures and helpers.
//!
//! Fixed identities stand in for certificates loaded from disk: the same
//! seed always yields the same certificate, so documents produced in one
//! test run can be checked against identities created in another.

use cpix::{
    ContentKey, CpixDocument, KeyId, RecipientIdentity, Result, SigningIdentity, UsageRule,
};

const AUTHOR1_SEED: [u8; 32] = [0xA1; 32];
const AUTHOR2_SEED: [u8; 32] = [0xA2; 32];
const RECIPIENT1_SECRET: [u8; 32] = [0xB1; 32];
const RECIPIENT2_SECRET: [u8; 32] = [0xB2; 32];

/// First signing identity.
pub fn author1() -> SigningIdentity {
    SigningIdentity::from_seed("Author1", &AUTHOR1_SEED)
}

/// Second signing identity.
pub fn author2() -> SigningIdentity {
    SigningIdentity::from_seed("Author2", &AUTHOR2_SEED)
}

/// First recipient, with its private key.
pub fn recipient1() -> RecipientIdentity {
    RecipientIdentity::from_secret_bytes("Recipient1", RECIPIENT1_SECRET)
}

/// Second recipient, with its private key.
pub fn recipient2() -> RecipientIdentity {
    RecipientIdentity::from_secret_bytes("Recipient2", RECIPIENT2_SECRET)
}

/// Signing credentials of both authors.
pub fn authors() -> Vec<SigningIdentity> {
    vec![author1(), author2()]
}

/// Save a document with both authors' credentials and load it back with the
/// given identities.
pub fn reload(document: &mut CpixDocument, identities: &[RecipientIdentity]) -> Result<CpixDocument> {
    let bytes = document.save_signed(&authors())?;
    CpixDocument::load(&bytes, identities)
}

/// A random key id and 16-byte value.
pub fn generate_key_data() -> (KeyId, [u8; 16]) {
    (KeyId::new(), rand::random())
}

/// A random content key.
pub fn generate_content_key() -> ContentKey {
    let (id, value) = generate_key_data();
    ContentKey::new(id, value)
}

/// Add an unconstrained usage rule for the document's first content key.
pub fn add_usage_rule(document: &mut CpixDocument) -> Result<UsageRule> {
    let key_id = match document.content_keys().first() {
        Some(key) => key.id,
        None => return Err(cpix::ValidationError::UnknownKeyId(KeyId::from_bytes([0; 16])).into()),
    };
    let rule = UsageRule::new(key_id);
    document.add_usage_rule(rule.clone())?;
    Ok(rule)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identities_are_stable() {
        assert_eq!(author1().certificate(), author1().certificate());
        assert_eq!(recipient2().certificate(), recipient2().certificate());
        assert_ne!(author1().certificate(), author2().certificate());
        assert_ne!(recipient1().certificate(), recipient2().certificate());
    }

    #[test]
    fn test_generated_keys_differ() {
        let a = generate_content_key();
        let b = generate_content_key();
        assert_ne!(a.id, b.id);
        assert_ne!(a.value().unwrap(), b.value().unwrap());
    }

    #[test]
    fn test_add_usage_rule_binds_first_key() {
        let mut document = CpixDocument::new();
        assert!(add_usage_rule(&mut document).is_err());

        let key = generate_content_key();
        let id = key.id;
        document.add_content_key(key).unwrap();
        document.add_content_key(generate_content_key()).unwrap();

        let rule = add_usage_rule(&mut document).unwrap();
        assert_eq!(rule.key_id, id);
        assert!(!rule.has_constraints());
        assert_eq!(document.usage_rules().len(), 1);
    }
}

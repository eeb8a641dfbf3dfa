//! Sealing individual content key values under the document key.

use cpix_core::content_key::{SealedValue, CONTENT_KEY_LEN};
use cpix_core::{ContentKeyValue, KeyId};

use crate::crypto::{generate_nonce, DocumentKey};
use crate::error::{ProtectError, Result};

/// Algorithm identifier written for sealed content key values.
pub const CONTENT_KEY_ALGORITHM: &str = "urn:cpix-rs:enc:chacha20-poly1305";

/// Seal a content key value. The key id is bound as associated data, so a
/// sealed value only opens under the id it was sealed for.
pub fn seal(value: &ContentKeyValue, key_id: &KeyId, document_key: &DocumentKey) -> Result<SealedValue> {
    let nonce = generate_nonce();
    let ciphertext = document_key.encrypt(value.as_bytes(), &nonce, key_id.as_bytes())?;
    Ok(SealedValue { nonce, ciphertext })
}

/// Open a sealed content key value.
pub fn open(sealed: &SealedValue, key_id: &KeyId, document_key: &DocumentKey) -> Result<ContentKeyValue> {
    let plaintext = document_key
        .decrypt(&sealed.ciphertext, &sealed.nonce, key_id.as_bytes())
        .map_err(|_| ProtectError::Decryption(format!("content key {} failed to open", key_id)))?;

    if plaintext.len() != CONTENT_KEY_LEN {
        return Err(ProtectError::Decryption(format!(
            "invalid content key length: expected {}, got {}",
            CONTENT_KEY_LEN,
            plaintext.len()
        )));
    }
    ContentKeyValue::from_slice(&plaintext).map_err(|e| ProtectError::Decryption(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_seal_open_roundtrip() {
        let key = DocumentKey::generate();
        let id = KeyId::new();
        let value = ContentKeyValue::generate();

        let sealed = seal(&value, &id, &key).unwrap();
        assert_ne!(&sealed.ciphertext[..16], value.as_bytes());

        let opened = open(&sealed, &id, &key).unwrap();
        assert_eq!(opened, value);
    }

    #[test]
    fn test_swapped_key_id_fails() {
        let key = DocumentKey::generate();
        let value = ContentKeyValue::generate();
        let sealed = seal(&value, &KeyId::new(), &key).unwrap();

        assert!(matches!(
            open(&sealed, &KeyId::new(), &key),
            Err(ProtectError::Decryption(_))
        ));
    }

    #[test]
    fn test_fresh_nonce_per_seal() {
        let key = DocumentKey::generate();
        let id = KeyId::new();
        let value = ContentKeyValue::generate();

        let a = seal(&value, &id, &key).unwrap();
        let b = seal(&value, &id, &key).unwrap();
        assert_ne!(a.nonce, b.nonce);
        assert_ne!(a.ciphertext, b.ciphertext);
    }

    proptest! {
        #[test]
        fn prop_any_value_opens(bytes in any::<[u8; 16]>(), id in any::<[u8; 16]>()) {
            let key = DocumentKey::generate();
            let id = KeyId::from_bytes(id);
            let value = ContentKeyValue::from_bytes(bytes);

            let sealed = seal(&value, &id, &key).unwrap();
            prop_assert_eq!(open(&sealed, &id, &key).unwrap(), value);
        }
    }
}

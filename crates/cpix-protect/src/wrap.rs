//! Wrapping the document key for one recipient.
//!
//! The sender generates an ephemeral X25519 key, agrees a secret with the
//! recipient's certificate key, derives a wrapping key from it and seals the
//! document key. Only the holder of the recipient's private key can derive
//! the same wrapping key; the AEAD tag decides whether an attempt succeeded.

use std::fmt;

use cpix_core::{X25519PublicKey, X25519StaticSecret};

use crate::crypto::{derive_wrapping_key, generate_nonce, DocumentKey, EphemeralKeyPair};
use crate::error::{ProtectError, Result};

/// Algorithm identifier written for wrapped document keys.
pub const KEY_WRAP_ALGORITHM: &str = "urn:cpix-rs:enc:x25519-blake3-chacha20-poly1305";

/// Wire length: ephemeral key, nonce, wrapped key with tag.
pub const WRAPPED_KEY_LEN: usize = 32 + 12 + 32 + 16;

/// A document key wrapped for one recipient.
#[derive(Clone, PartialEq, Eq)]
pub struct WrappedKey {
    /// Ephemeral X25519 public key (sender's side of ECDH).
    pub ephemeral_public: X25519PublicKey,

    /// Nonce used for encryption.
    pub nonce: [u8; 12],

    /// The document key, encrypted with the derived wrapping key.
    pub ciphertext: Vec<u8>,
}

impl WrappedKey {
    /// Wrap `document_key` for the holder of `recipient`'s private key.
    pub fn wrap(document_key: &DocumentKey, recipient: &X25519PublicKey) -> Result<Self> {
        let ephemeral = EphemeralKeyPair::generate();
        let ephemeral_public = ephemeral.public_key();
        let shared = ephemeral.diffie_hellman(recipient);

        let wrapping_key = derive_wrapping_key(&shared, &ephemeral_public, recipient)
            .ok_or_else(|| ProtectError::Encryption("recipient key is a low-order point".into()))?;

        let nonce = generate_nonce();
        let ciphertext = wrapping_key.encrypt(document_key.as_bytes(), &nonce, &[])?;

        Ok(Self {
            ephemeral_public,
            nonce,
            ciphertext,
        })
    }

    /// Recover the document key with a recipient's private key.
    pub fn unwrap_with(&self, secret: &X25519StaticSecret) -> Result<DocumentKey> {
        let recipient = secret.public_key();
        let shared = secret.diffie_hellman(&self.ephemeral_public);

        let wrapping_key = derive_wrapping_key(&shared, &self.ephemeral_public, &recipient)
            .ok_or_else(|| ProtectError::Decryption("ephemeral key is a low-order point".into()))?;

        let key_bytes = wrapping_key.decrypt(&self.ciphertext, &self.nonce, &[])?;
        let arr: [u8; 32] = key_bytes.as_slice().try_into().map_err(|_| {
            ProtectError::Decryption(format!(
                "invalid document key length: expected 32, got {}",
                key_bytes.len()
            ))
        })?;
        Ok(DocumentKey::from_bytes(arr))
    }

    /// Serialize as `ephemeral || nonce || ciphertext`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(WRAPPED_KEY_LEN);
        out.extend_from_slice(self.ephemeral_public.as_bytes());
        out.extend_from_slice(&self.nonce);
        out.extend_from_slice(&self.ciphertext);
        out
    }

    /// Parse from `ephemeral || nonce || ciphertext`. Returns `None` on a
    /// length mismatch.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != WRAPPED_KEY_LEN {
            return None;
        }
        let mut ephemeral = [0u8; 32];
        ephemeral.copy_from_slice(&bytes[..32]);
        let mut nonce = [0u8; 12];
        nonce.copy_from_slice(&bytes[32..44]);
        Some(Self {
            ephemeral_public: X25519PublicKey::from_bytes(ephemeral),
            nonce,
            ciphertext: bytes[44..].to_vec(),
        })
    }
}

impl fmt::Debug for WrappedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WrappedKey(ephemeral={:?})", self.ephemeral_public)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_unwrap_roundtrip() {
        let recipient = X25519StaticSecret::generate();
        let document_key = DocumentKey::generate();

        let wrapped = WrappedKey::wrap(&document_key, &recipient.public_key()).unwrap();
        let recovered = wrapped.unwrap_with(&recipient).unwrap();

        assert_eq!(recovered, document_key);
    }

    #[test]
    fn test_wrong_recipient_fails() {
        let recipient = X25519StaticSecret::generate();
        let other = X25519StaticSecret::generate();
        let wrapped = WrappedKey::wrap(&DocumentKey::generate(), &recipient.public_key()).unwrap();

        assert!(matches!(
            wrapped.unwrap_with(&other),
            Err(ProtectError::Decryption(_))
        ));
    }

    #[test]
    fn test_byte_layout() {
        let recipient = X25519StaticSecret::generate();
        let wrapped = WrappedKey::wrap(&DocumentKey::generate(), &recipient.public_key()).unwrap();

        let bytes = wrapped.to_bytes();
        assert_eq!(bytes.len(), WRAPPED_KEY_LEN);
        assert_eq!(&bytes[..32], wrapped.ephemeral_public.as_bytes());

        let parsed = WrappedKey::from_bytes(&bytes).unwrap();
        assert_eq!(parsed, wrapped);
        assert!(parsed.unwrap_with(&recipient).is_ok());
        assert!(WrappedKey::from_bytes(&bytes[..WRAPPED_KEY_LEN - 1]).is_none());
    }

    #[test]
    fn test_tampered_ephemeral_fails() {
        let recipient = X25519StaticSecret::generate();
        let mut wrapped =
            WrappedKey::wrap(&DocumentKey::generate(), &recipient.public_key()).unwrap();
        wrapped.ephemeral_public = X25519StaticSecret::generate().public_key();

        assert!(wrapped.unwrap_with(&recipient).is_err());
    }

    #[test]
    fn test_low_order_recipient_rejected() {
        let result = WrappedKey::wrap(&DocumentKey::generate(), &X25519PublicKey::from_bytes([0; 32]));
        assert!(matches!(result, Err(ProtectError::Encryption(_))));
    }
}

//! Symmetric keys and key agreement for envelope encryption.
//!
//! Provides the ChaCha20-Poly1305 document key, ephemeral X25519 key pairs,
//! and BLAKE3 derivation of per-recipient wrapping keys.

use chacha20poly1305::{
    aead::{Aead, KeyInit, Payload},
    ChaCha20Poly1305, Nonce,
};
use rand::RngCore;
use std::fmt;
use x25519_dalek::{EphemeralSecret, PublicKey, SharedSecret};
use zeroize::{Zeroize, ZeroizeOnDrop};

use cpix_core::X25519PublicKey;

use crate::error::{ProtectError, Result};

/// BLAKE3 context for deriving wrapping keys.
const WRAP_CONTEXT: &str = "cpix-rs 2024-06 document key wrapping v1";

/// A 256-bit ChaCha20-Poly1305 key.
///
/// Used both as the per-document key that seals content keys and as the
/// derived key that wraps the document key for one recipient.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct DocumentKey([u8; 32]);

impl DocumentKey {
    /// Generate a fresh random key from the thread CSPRNG.
    pub fn generate() -> Self {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Encrypt `plaintext`, binding `aad`.
    pub fn encrypt(&self, plaintext: &[u8], nonce: &[u8; 12], aad: &[u8]) -> Result<Vec<u8>> {
        let cipher = ChaCha20Poly1305::new_from_slice(&self.0)
            .map_err(|e| ProtectError::Encryption(e.to_string()))?;

        cipher
            .encrypt(Nonce::from_slice(nonce), Payload { msg: plaintext, aad })
            .map_err(|e| ProtectError::Encryption(e.to_string()))
    }

    /// Decrypt and authenticate `ciphertext`.
    pub fn decrypt(&self, ciphertext: &[u8], nonce: &[u8; 12], aad: &[u8]) -> Result<Vec<u8>> {
        let cipher = ChaCha20Poly1305::new_from_slice(&self.0)
            .map_err(|e| ProtectError::Decryption(e.to_string()))?;

        cipher
            .decrypt(Nonce::from_slice(nonce), Payload { msg: ciphertext, aad })
            .map_err(|e| ProtectError::Decryption(e.to_string()))
    }
}

impl fmt::Debug for DocumentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DocumentKey([REDACTED])")
    }
}

/// Generate a fresh 96-bit nonce.
pub fn generate_nonce() -> [u8; 12] {
    let mut bytes = [0u8; 12];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes
}

/// Ephemeral key pair for one-time key agreement.
pub struct EphemeralKeyPair {
    secret: EphemeralSecret,
    public: X25519PublicKey,
}

impl EphemeralKeyPair {
    /// Generate a new ephemeral key pair.
    pub fn generate() -> Self {
        let secret = EphemeralSecret::random_from_rng(rand::thread_rng());
        let public = X25519PublicKey::from(PublicKey::from(&secret));
        Self { secret, public }
    }

    /// Get the public key.
    pub fn public_key(&self) -> X25519PublicKey {
        self.public
    }

    /// Perform key agreement with a peer's public key.
    ///
    /// Consumes the ephemeral secret (can only be used once).
    pub fn diffie_hellman(self, peer_public: &X25519PublicKey) -> SharedSecret {
        self.secret.diffie_hellman(&peer_public.to_dalek())
    }
}

/// Derive the key that wraps a document key for one recipient.
///
/// Both public keys are bound into the derivation, so a wrapped key cannot be
/// replayed under a different ephemeral key or toward another recipient.
/// Fails when the shared secret is not contributory (low-order peer key).
pub fn derive_wrapping_key(
    shared: &SharedSecret,
    ephemeral: &X25519PublicKey,
    recipient: &X25519PublicKey,
) -> Option<DocumentKey> {
    if !shared.was_contributory() {
        return None;
    }
    let mut hasher = blake3::Hasher::new_derive_key(WRAP_CONTEXT);
    hasher.update(shared.as_bytes());
    hasher.update(ephemeral.as_bytes());
    hasher.update(recipient.as_bytes());
    Some(DocumentKey(*hasher.finalize().as_bytes()))
}

//! Content keys and their protection state.

use rand::RngCore;
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{NotDecryptedError, ValidationError};
use crate::types::KeyId;

/// Length of a content key value in bytes.
pub const CONTENT_KEY_LEN: usize = 16;

/// Length of the AEAD nonce carried with a sealed value.
pub const NONCE_LEN: usize = 12;

/// Length of the AEAD authentication tag.
pub const TAG_LEN: usize = 16;

/// Wire length of a sealed content key: nonce, ciphertext, tag.
pub const SEALED_LEN: usize = NONCE_LEN + CONTENT_KEY_LEN + TAG_LEN;

/// A 16-byte content key value. Zeroized on drop.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct ContentKeyValue([u8; CONTENT_KEY_LEN]);

impl ContentKeyValue {
    /// Generate a random value from the thread CSPRNG.
    pub fn generate() -> Self {
        let mut bytes = [0u8; CONTENT_KEY_LEN];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; CONTENT_KEY_LEN]) -> Self {
        Self(bytes)
    }

    /// Create from a slice, which must be exactly 16 bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, ValidationError> {
        let arr: [u8; CONTENT_KEY_LEN] = bytes
            .try_into()
            .map_err(|_| ValidationError::InvalidKeyLength(bytes.len()))?;
        Ok(Self(arr))
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; CONTENT_KEY_LEN] {
        &self.0
    }
}

impl fmt::Debug for ContentKeyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ContentKeyValue([REDACTED])")
    }
}

/// AEAD output for one content key.
#[derive(Clone, PartialEq, Eq)]
pub struct SealedValue {
    /// 96-bit nonce, unique per seal.
    pub nonce: [u8; NONCE_LEN],
    /// Ciphertext with the authentication tag appended.
    pub ciphertext: Vec<u8>,
}

impl SealedValue {
    /// Serialize as `nonce || ciphertext`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(NONCE_LEN + self.ciphertext.len());
        out.extend_from_slice(&self.nonce);
        out.extend_from_slice(&self.ciphertext);
        out
    }

    /// Parse from `nonce || ciphertext`. Returns `None` on a length mismatch.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != SEALED_LEN {
            return None;
        }
        let mut nonce = [0u8; NONCE_LEN];
        nonce.copy_from_slice(&bytes[..NONCE_LEN]);
        Some(Self {
            nonce,
            ciphertext: bytes[NONCE_LEN..].to_vec(),
        })
    }
}

impl fmt::Debug for SealedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SealedValue({}..)",
            &hex::encode(&self.ciphertext)[..8.min(self.ciphertext.len() * 2)]
        )
    }
}

/// The stored form of a content key value.
#[derive(Clone, PartialEq, Eq)]
pub enum KeyValue {
    /// Plaintext; the document has no recipients.
    Clear(ContentKeyValue),
    /// Encrypted and not (yet) decrypted.
    Sealed(SealedValue),
    /// Encrypted, with the plaintext recovered or known locally.
    Unsealed {
        sealed: SealedValue,
        value: ContentKeyValue,
    },
}

impl fmt::Debug for KeyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyValue::Clear(_) => f.write_str("Clear"),
            KeyValue::Sealed(s) => write!(f, "Sealed({:?})", s),
            KeyValue::Unsealed { sealed, .. } => write!(f, "Unsealed({:?})", sealed),
        }
    }
}

/// A content key: identifier plus value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentKey {
    pub id: KeyId,
    pub state: KeyValue,
}

impl ContentKey {
    /// Create a clear content key.
    pub fn new(id: KeyId, value: [u8; CONTENT_KEY_LEN]) -> Self {
        Self {
            id,
            state: KeyValue::Clear(ContentKeyValue::from_bytes(value)),
        }
    }

    /// Create a clear content key from a slice of exactly 16 bytes.
    pub fn from_slice(id: KeyId, value: &[u8]) -> Result<Self, ValidationError> {
        Ok(Self {
            id,
            state: KeyValue::Clear(ContentKeyValue::from_slice(value)?),
        })
    }

    /// Generate a key with a random id and random value.
    pub fn generate() -> Self {
        Self {
            id: KeyId::new(),
            state: KeyValue::Clear(ContentKeyValue::generate()),
        }
    }

    /// The plaintext value.
    ///
    /// Fails if the key is encrypted and has not been decrypted.
    pub fn value(&self) -> Result<&ContentKeyValue, NotDecryptedError> {
        match &self.state {
            KeyValue::Clear(value) | KeyValue::Unsealed { value, .. } => Ok(value),
            KeyValue::Sealed(_) => Err(NotDecryptedError { key_id: self.id }),
        }
    }

    /// The encrypted form, if any.
    pub fn sealed(&self) -> Option<&SealedValue> {
        match &self.state {
            KeyValue::Clear(_) => None,
            KeyValue::Sealed(sealed) | KeyValue::Unsealed { sealed, .. } => Some(sealed),
        }
    }

    /// Whether the value is stored encrypted.
    pub fn is_encrypted(&self) -> bool {
        !matches!(self.state, KeyValue::Clear(_))
    }
}

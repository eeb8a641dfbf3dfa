//! Certificates and the caller-owned identities that hold private keys.
//!
//! A certificate binds a subject name to exactly one public key: Ed25519 for
//! document authors (signers) or X25519 for recipients of encrypted content
//! keys. Certificates are encoded as canonical CBOR; the SHA-256 of that
//! encoding is the certificate fingerprint.
//!
//! Identities pair a certificate with its private key. The engine borrows
//! them for the duration of a call and never serializes the private half.

use ciborium::value::Value;
use std::fmt;

use crate::canonical::{decode_value, encode_map, Field};
use crate::crypto::{
    Ed25519PublicKey, Ed25519Signature, Keypair, Sha256Digest, X25519PublicKey,
    X25519StaticSecret,
};
use crate::error::CertificateError;
use crate::types::Fingerprint;

/// Current certificate encoding version.
pub const CERTIFICATE_VERSION: u64 = 1;

mod keys {
    pub const ALG: &str = "alg";
    pub const KEY: &str = "key";
    pub const SUBJECT: &str = "subject";
    pub const VERSION: &str = "version";
}

mod alg {
    pub const ED25519: &str = "ed25519";
    pub const X25519: &str = "x25519";
}

/// The public key carried by a certificate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PublicKey {
    /// Signature verification key of a document author.
    Ed25519(Ed25519PublicKey),
    /// Key agreement key of a recipient.
    X25519(X25519PublicKey),
}

impl PublicKey {
    /// Algorithm name as encoded in the certificate.
    pub fn algorithm(&self) -> &'static str {
        match self {
            PublicKey::Ed25519(_) => alg::ED25519,
            PublicKey::X25519(_) => alg::X25519,
        }
    }

    /// Raw key bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        match self {
            PublicKey::Ed25519(k) => k.as_bytes(),
            PublicKey::X25519(k) => k.as_bytes(),
        }
    }
}

/// A public certificate: subject identity plus one public key.
#[derive(Clone, PartialEq, Eq)]
pub struct Certificate {
    subject: String,
    public_key: PublicKey,
    encoded: Vec<u8>,
    fingerprint: Fingerprint,
}

impl Certificate {
    /// Create a certificate for the given subject and key.
    pub fn new(subject: impl Into<String>, public_key: PublicKey) -> Self {
        let subject = subject.into();
        let encoded = encode_map(&[
            (keys::VERSION, Field::Uint(CERTIFICATE_VERSION)),
            (keys::SUBJECT, Field::Text(&subject)),
            (keys::ALG, Field::Text(public_key.algorithm())),
            (keys::KEY, Field::Bytes(public_key.as_bytes())),
        ]);
        let fingerprint = Fingerprint(Sha256Digest::hash(&encoded).0);

        Self {
            subject,
            public_key,
            encoded,
            fingerprint,
        }
    }

    /// Decode a certificate from its canonical encoding.
    ///
    /// Non-canonical encodings are rejected so that a fingerprint always
    /// identifies exactly one byte sequence.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CertificateError> {
        let value = decode_value(bytes)?;
        let map = match &value {
            Value::Map(m) => m,
            _ => return Err(CertificateError::Malformed("expected map".into())),
        };

        let get = |key: &str| -> Option<&Value> {
            map.iter()
                .find(|(k, _)| matches!(k, Value::Text(s) if s == key))
                .map(|(_, v)| v)
        };

        match get(keys::VERSION) {
            Some(Value::Integer(i)) if i128::from(*i) == CERTIFICATE_VERSION as i128 => {}
            _ => return Err(CertificateError::Malformed("unsupported version".into())),
        }

        let subject = match get(keys::SUBJECT) {
            Some(Value::Text(s)) => s.clone(),
            _ => return Err(CertificateError::Malformed("invalid subject".into())),
        };

        let key_bytes: [u8; 32] = match get(keys::KEY) {
            Some(Value::Bytes(b)) => b
                .as_slice()
                .try_into()
                .map_err(|_| CertificateError::InvalidKeyLength(b.len()))?,
            _ => return Err(CertificateError::Malformed("invalid key".into())),
        };

        let public_key = match get(keys::ALG) {
            Some(Value::Text(a)) if a == alg::ED25519 => {
                PublicKey::Ed25519(Ed25519PublicKey::from_bytes(key_bytes))
            }
            Some(Value::Text(a)) if a == alg::X25519 => {
                PublicKey::X25519(X25519PublicKey::from_bytes(key_bytes))
            }
            Some(Value::Text(a)) => return Err(CertificateError::UnsupportedAlgorithm(a.clone())),
            _ => return Err(CertificateError::Malformed("invalid alg".into())),
        };

        if map.len() != 4 {
            return Err(CertificateError::Malformed("unexpected fields".into()));
        }

        let certificate = Self::new(subject, public_key);
        if certificate.encoded != bytes {
            return Err(CertificateError::Malformed("non-canonical encoding".into()));
        }
        Ok(certificate)
    }

    /// The canonical encoding.
    pub fn as_bytes(&self) -> &[u8] {
        &self.encoded
    }

    /// The subject name.
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// The public key.
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// SHA-256 fingerprint of the canonical encoding.
    pub fn fingerprint(&self) -> Fingerprint {
        self.fingerprint
    }

    /// The signature verification key, if this is a signer certificate.
    pub fn signing_key(&self) -> Option<&Ed25519PublicKey> {
        match &self.public_key {
            PublicKey::Ed25519(k) => Some(k),
            PublicKey::X25519(_) => None,
        }
    }

    /// The key agreement key, if this is a recipient certificate.
    pub fn encryption_key(&self) -> Option<&X25519PublicKey> {
        match &self.public_key {
            PublicKey::X25519(k) => Some(k),
            PublicKey::Ed25519(_) => None,
        }
    }
}

impl fmt::Debug for Certificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Certificate")
            .field("subject", &self.subject)
            .field("alg", &self.public_key.algorithm())
            .field("fingerprint", &self.fingerprint)
            .finish()
    }
}

/// A signer certificate together with its Ed25519 private key.
#[derive(Clone)]
pub struct SigningIdentity {
    certificate: Certificate,
    keypair: Keypair,
}

impl SigningIdentity {
    /// Generate a fresh identity for the given subject.
    pub fn generate(subject: impl Into<String>) -> Self {
        Self::from_keypair(subject, Keypair::generate())
    }

    /// Create an identity from a 32-byte seed.
    pub fn from_seed(subject: impl Into<String>, seed: &[u8; 32]) -> Self {
        Self::from_keypair(subject, Keypair::from_seed(seed))
    }

    fn from_keypair(subject: impl Into<String>, keypair: Keypair) -> Self {
        let certificate = Certificate::new(subject, PublicKey::Ed25519(keypair.public_key()));
        Self {
            certificate,
            keypair,
        }
    }

    /// The public certificate.
    pub fn certificate(&self) -> &Certificate {
        &self.certificate
    }

    /// Sign a message.
    pub fn sign(&self, message: &[u8]) -> Ed25519Signature {
        self.keypair.sign(message)
    }
}

impl fmt::Debug for SigningIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SigningIdentity({:?})", self.certificate)
    }
}

/// A recipient certificate together with its X25519 private key.
#[derive(Clone)]
pub struct RecipientIdentity {
    certificate: Certificate,
    secret: X25519StaticSecret,
}

impl RecipientIdentity {
    /// Generate a fresh identity for the given subject.
    pub fn generate(subject: impl Into<String>) -> Self {
        Self::from_secret(subject, X25519StaticSecret::generate())
    }

    /// Create an identity from 32 secret key bytes.
    pub fn from_secret_bytes(subject: impl Into<String>, bytes: [u8; 32]) -> Self {
        Self::from_secret(subject, X25519StaticSecret::from_bytes(bytes))
    }

    fn from_secret(subject: impl Into<String>, secret: X25519StaticSecret) -> Self {
        let certificate = Certificate::new(subject, PublicKey::X25519(secret.public_key()));
        Self {
            certificate,
            secret,
        }
    }

    /// The public certificate.
    pub fn certificate(&self) -> &Certificate {
        &self.certificate
    }

    /// The private key agreement key.
    pub fn secret(&self) -> &X25519StaticSecret {
        &self.secret
    }
}

impl fmt::Debug for RecipientIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RecipientIdentity({:?})", self.certificate)
    }
}

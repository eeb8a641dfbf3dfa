//! Trust decisions for signer certificates.
//!
//! Verification surfaces the signer's certificate; whether that signer is
//! acceptable is the caller's decision, expressed as a [`TrustPolicy`].

use std::collections::HashSet;

use cpix_core::{Certificate, Fingerprint};

/// Decides whether a signer certificate is trusted.
pub trait TrustPolicy: Send + Sync {
    fn is_trusted(&self, certificate: &Certificate) -> bool;
}

/// Trusts every signer. Verification then only checks integrity.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrustAll;

impl TrustPolicy for TrustAll {
    fn is_trusted(&self, _certificate: &Certificate) -> bool {
        true
    }
}

/// Trusts signers whose certificate fingerprint is on the list.
#[derive(Debug, Clone, Default)]
pub struct TrustList {
    fingerprints: HashSet<Fingerprint>,
}

impl TrustList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, certificate: &Certificate) -> Self {
        self.insert(certificate.fingerprint());
        self
    }

    pub fn insert(&mut self, fingerprint: Fingerprint) {
        self.fingerprints.insert(fingerprint);
    }

    pub fn contains(&self, fingerprint: &Fingerprint) -> bool {
        self.fingerprints.contains(fingerprint)
    }
}

impl TrustPolicy for TrustList {
    fn is_trusted(&self, certificate: &Certificate) -> bool {
        self.contains(&certificate.fingerprint())
    }
}

impl<T: TrustPolicy + ?Sized> TrustPolicy for &T {
    fn is_trusted(&self, certificate: &Certificate) -> bool {
        (**self).is_trusted(certificate)
    }
}

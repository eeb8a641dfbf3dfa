//! Signature entries and their lifecycle.
//!
//! ```text
//! Pending --save(credential)--> Signed(element) --in-scope mutation--> Dirty
//!    ^                                                                  |
//!    +--------------------- resign(same signer) ------------------------+
//! ```
//!
//! Entries record the signer's certificate only. The signing credential is
//! passed to the save that computes the signature and is not kept.

use std::fmt;

use cpix_core::{Certificate, Fingerprint};
use cpix_dsig::SignatureScope;
use cpix_xml::Element;

/// Where a signature is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureStatus {
    /// Requested; computed on the next save.
    Pending,
    /// Computed and still covering the current content.
    Signed,
    /// Content in scope changed after signing.
    Dirty,
}

#[derive(Clone)]
pub(crate) enum SignatureState {
    Pending,
    Signed(Element),
    Dirty,
}

/// One signature of a document.
#[derive(Clone)]
pub struct SignatureEntry {
    scope: SignatureScope,
    signer: Certificate,
    pub(crate) state: SignatureState,
}

impl SignatureEntry {
    pub(crate) fn pending(scope: SignatureScope, signer: Certificate) -> Self {
        Self {
            scope,
            signer,
            state: SignatureState::Pending,
        }
    }

    pub(crate) fn signed(scope: SignatureScope, signer: Certificate, element: Element) -> Self {
        Self {
            scope,
            signer,
            state: SignatureState::Signed(element),
        }
    }

    pub fn scope(&self) -> SignatureScope {
        self.scope
    }

    /// The signer's certificate.
    pub fn signer(&self) -> &Certificate {
        &self.signer
    }

    pub fn fingerprint(&self) -> Fingerprint {
        self.signer.fingerprint()
    }

    pub fn status(&self) -> SignatureStatus {
        match self.state {
            SignatureState::Pending => SignatureStatus::Pending,
            SignatureState::Signed(_) => SignatureStatus::Signed,
            SignatureState::Dirty => SignatureStatus::Dirty,
        }
    }

    pub fn is_signed(&self) -> bool {
        self.status() == SignatureStatus::Signed
    }

    /// The `ds:Signature` element, once computed.
    pub fn element(&self) -> Option<&Element> {
        match &self.state {
            SignatureState::Signed(element) => Some(element),
            _ => None,
        }
    }

    pub(crate) fn is_by(&self, fingerprint: &Fingerprint) -> bool {
        self.signer.fingerprint() == *fingerprint
    }

    /// Content in scope changed. Returns true if a finalized signature went stale.
    pub(crate) fn invalidate(&mut self) -> bool {
        if let SignatureState::Signed(_) = self.state {
            self.state = SignatureState::Dirty;
            return true;
        }
        false
    }
}

impl fmt::Debug for SignatureEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignatureEntry")
            .field("scope", &self.scope)
            .field("signer", &self.signer.fingerprint())
            .field("status", &self.status())
            .finish()
    }
}

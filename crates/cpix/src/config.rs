//! Document and load configuration.

use std::fmt;

use cpix_core::RecipientIdentity;
use cpix_dsig::{TrustAll, TrustPolicy};

/// Configuration for a document.
#[derive(Debug, Clone, Default)]
pub struct DocumentConfig {
    /// Reject mutations that would invalidate a finalized signature instead
    /// of marking it dirty.
    pub strict_signatures: bool,
}

impl DocumentConfig {
    pub fn strict() -> Self {
        Self {
            strict_signatures: true,
        }
    }
}

/// Options for loading a document.
///
/// Identities are tried against every delivery record; the trust policy
/// decides whether signers of loaded signatures are accepted.
pub struct LoadOptions {
    pub identities: Vec<RecipientIdentity>,
    pub trust: Box<dyn TrustPolicy>,
    pub config: DocumentConfig,
}

impl LoadOptions {
    pub fn new() -> Self {
        Self {
            identities: Vec::new(),
            trust: Box::new(TrustAll),
            config: DocumentConfig::default(),
        }
    }

    pub fn with_identity(mut self, identity: RecipientIdentity) -> Self {
        self.identities.push(identity);
        self
    }

    pub fn with_identities(mut self, identities: impl IntoIterator<Item = RecipientIdentity>) -> Self {
        self.identities.extend(identities);
        self
    }

    pub fn with_trust(mut self, trust: impl TrustPolicy + 'static) -> Self {
        self.trust = Box::new(trust);
        self
    }

    pub fn with_config(mut self, config: DocumentConfig) -> Self {
        self.config = config;
        self
    }
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for LoadOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadOptions")
            .field("identities", &self.identities.len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

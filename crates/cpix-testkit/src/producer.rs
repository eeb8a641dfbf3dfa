//! Writes the sample documents to a directory, with a JSON manifest
//! describing each one.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::fixtures::authors;
use crate::samples::all_samples;

/// Manifest file written next to the samples.
pub const MANIFEST_FILE: &str = "manifest.json";

/// One written sample.
#[derive(Debug, Clone, Serialize)]
pub struct ManifestEntry {
    pub file: String,
    pub keys: usize,
    pub recipients: Vec<String>,
    pub rules: usize,
    /// `scope:signer-fingerprint` per signature, document signature last.
    pub signatures: Vec<String>,
    pub encrypted: bool,
    pub bytes: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Manifest {
    pub samples: Vec<ManifestEntry>,
}

/// Save every sample into `dir`, creating it if needed. Signatures are
/// computed with the fixed author credentials.
pub fn write_samples(dir: &Path) -> Result<Manifest> {
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;

    let signers = authors();
    let mut manifest = Manifest::default();
    for mut sample in all_samples().context("building samples")? {
        let bytes = sample
            .document
            .save_signed(&signers)
            .with_context(|| format!("saving {}", sample.name))?;
        let path = dir.join(sample.file_name());
        fs::write(&path, &bytes).with_context(|| format!("writing {}", path.display()))?;
        info!(sample = sample.name, bytes = bytes.len(), path = %path.display(), "sample written");

        let document = &sample.document;
        manifest.samples.push(ManifestEntry {
            file: sample.file_name(),
            keys: document.content_keys().len(),
            recipients: document.recipients().map(|c| c.subject().to_string()).collect(),
            rules: document.usage_rules().len(),
            signatures: document
                .signatures()
                .map(|s| format!("{}:{}", s.scope(), s.fingerprint().to_hex()))
                .collect(),
            encrypted: document.is_encrypted(),
            bytes: bytes.len(),
        });
    }

    let path = dir.join(MANIFEST_FILE);
    let json = serde_json::to_vec_pretty(&manifest)?;
    fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
    Ok(manifest)
}

//! Writes the sample CPIX documents to a directory.
//!
//! Usage: cpix-producer [OUTPUT_DIR]

use std::path::PathBuf;

use anyhow::Result;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let dir = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));

    let manifest = cpix_testkit::producer::write_samples(&dir)?;
    for entry in &manifest.samples {
        println!(
            "{:<40} {:>2} keys  {:>2} rules  {:>2} recipients  {:>2} signatures  {} bytes",
            entry.file,
            entry.keys,
            entry.rules,
            entry.recipients.len(),
            entry.signatures.len(),
            entry.bytes
        );
    }
    Ok(())
}

//! Algorithm identifiers and base64 helpers shared by signing and verification.

use base64::{engine::general_purpose::STANDARD, Engine};

use cpix_xml::FormatError;

pub use cpix_xml::EXC_C14N;

/// Enveloped-signature transform.
pub const ENVELOPED_SIGNATURE: &str = "http://www.w3.org/2000/09/xmldsig#enveloped-signature";

/// SHA-256 digest method.
pub const SHA256: &str = "http://www.w3.org/2001/04/xmlenc#sha256";

/// Ed25519 signature method (RFC 9231).
pub const ED25519: &str = "http://www.w3.org/2021/04/xmldsig-more#eddsa-ed25519";

pub(crate) fn encode(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decode base64 element content, ignoring line breaks and indentation.
pub(crate) fn decode(field: &str, text: &str) -> Result<Vec<u8>, FormatError> {
    let compact: String = text.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    STANDARD
        .decode(compact.as_bytes())
        .map_err(|_| FormatError::invalid(field, text))
}

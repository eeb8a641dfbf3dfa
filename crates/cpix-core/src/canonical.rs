//! Canonical CBOR encoding for deterministic certificate bytes.
//!
//! Certificates are encoded with RFC 8949 Core Deterministic Encoding:
//! - Map keys sorted by encoded byte comparison
//! - Integers use smallest valid encoding
//! - Definite lengths only
//!
//! Only the field types a certificate carries can be encoded, so encoding
//! cannot fail. Fingerprints are SHA-256 over these bytes, so the same
//! certificate must always encode identically.

use ciborium::value::Value;

use crate::error::CertificateError;

/// A map value with a canonical encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field<'a> {
    Uint(u64),
    Text(&'a str),
    Bytes(&'a [u8]),
}

/// Encode a map with text keys to canonical bytes.
pub fn encode_map(entries: &[(&str, Field<'_>)]) -> Vec<u8> {
    let mut sorted: Vec<_> = entries
        .iter()
        .map(|(k, v)| {
            let mut key_bytes = Vec::new();
            encode_text(&mut key_bytes, k);
            (key_bytes, v)
        })
        .collect();
    sorted.sort_by(|a, b| a.0.cmp(&b.0));

    let mut buf = Vec::new();
    encode_uint(&mut buf, 5, sorted.len() as u64);
    for (key_bytes, value) in sorted {
        buf.extend_from_slice(&key_bytes);
        encode_field(&mut buf, value);
    }
    buf
}

/// Decode a single CBOR value, rejecting trailing bytes.
pub fn decode_value(bytes: &[u8]) -> Result<Value, CertificateError> {
    let mut cursor = std::io::Cursor::new(bytes);
    let value: Value = ciborium::from_reader(&mut cursor)
        .map_err(|e| CertificateError::Malformed(e.to_string()))?;
    if cursor.position() as usize != bytes.len() {
        return Err(CertificateError::Malformed("trailing bytes".into()));
    }
    Ok(value)
}

fn encode_field(buf: &mut Vec<u8>, field: &Field<'_>) {
    match field {
        Field::Uint(n) => encode_uint(buf, 0, *n),
        Field::Text(s) => encode_text(buf, s),
        Field::Bytes(b) => {
            encode_uint(buf, 2, b.len() as u64);
            buf.extend_from_slice(b);
        }
    }
}

fn encode_uint(buf: &mut Vec<u8>, major: u8, n: u64) {
    let mt = major << 5;
    if n < 24 {
        buf.push(mt | (n as u8));
    } else if n <= 0xff {
        buf.push(mt | 24);
        buf.push(n as u8);
    } else if n <= 0xffff {
        buf.push(mt | 25);
        buf.extend_from_slice(&(n as u16).to_be_bytes());
    } else if n <= 0xffffffff {
        buf.push(mt | 26);
        buf.extend_from_slice(&(n as u32).to_be_bytes());
    } else {
        buf.push(mt | 27);
        buf.extend_from_slice(&n.to_be_bytes());
    }
}

fn encode_text(buf: &mut Vec<u8>, s: &str) {
    encode_uint(buf, 3, s.len() as u64);
    buf.extend_from_slice(s.as_bytes());
}

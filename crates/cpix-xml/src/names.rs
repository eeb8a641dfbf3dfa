//! Namespace URIs, prefixes and element names used by CPIX documents.

/// Namespace URIs.
pub mod ns {
    pub const CPIX: &str = "urn:dashif:org:cpix";
    pub const PSKC: &str = "urn:ietf:params:xml:ns:keyprov:pskc";
    pub const DSIG: &str = "http://www.w3.org/2000/09/xmldsig#";
    pub const XMLENC: &str = "http://www.w3.org/2001/04/xmlenc#";
    pub const XML: &str = "http://www.w3.org/XML/1998/namespace";
    pub const XMLNS: &str = "http://www.w3.org/2000/xmlns/";
}

/// Prefixes used when writing.
pub mod prefix {
    pub const CPIX: &str = "cpix";
    pub const PSKC: &str = "pskc";
    pub const DSIG: &str = "ds";
    pub const XMLENC: &str = "enc";
}

/// CPIX element local names.
pub mod cpix {
    pub const ROOT: &str = "CPIX";
    pub const DELIVERY_DATA_LIST: &str = "DeliveryDataList";
    pub const DELIVERY_DATA: &str = "DeliveryData";
    pub const DELIVERY_KEY: &str = "DeliveryKey";
    pub const DOCUMENT_KEY: &str = "DocumentKey";
    pub const CERTIFICATE: &str = "Certificate";
    pub const DATA: &str = "Data";
    pub const CONTENT_KEY_LIST: &str = "ContentKeyList";
    pub const CONTENT_KEY: &str = "ContentKey";
    pub const USAGE_RULE_LIST: &str = "ContentKeyUsageRuleList";
    pub const USAGE_RULE: &str = "ContentKeyUsageRule";
    pub const TIME_FILTER: &str = "TimeFilter";
    pub const VIDEO_FILTER: &str = "VideoFilter";
    pub const AUDIO_FILTER: &str = "AudioFilter";
    pub const BITRATE_FILTER: &str = "BitrateFilter";
    pub const LABEL_FILTER: &str = "LabelFilter";
}

/// PSKC element local names.
pub mod pskc {
    pub const SECRET: &str = "Secret";
    pub const PLAIN_VALUE: &str = "PlainValue";
    pub const ENCRYPTED_VALUE: &str = "EncryptedValue";
}

/// XML-Signature element local names.
pub mod dsig {
    pub const SIGNATURE: &str = "Signature";
    pub const SIGNED_INFO: &str = "SignedInfo";
    pub const CANONICALIZATION_METHOD: &str = "CanonicalizationMethod";
    pub const SIGNATURE_METHOD: &str = "SignatureMethod";
    pub const REFERENCE: &str = "Reference";
    pub const TRANSFORMS: &str = "Transforms";
    pub const TRANSFORM: &str = "Transform";
    pub const DIGEST_METHOD: &str = "DigestMethod";
    pub const DIGEST_VALUE: &str = "DigestValue";
    pub const SIGNATURE_VALUE: &str = "SignatureValue";
    pub const KEY_INFO: &str = "KeyInfo";
}

/// XML-Encryption element local names.
pub mod xmlenc {
    pub const ENCRYPTION_METHOD: &str = "EncryptionMethod";
    pub const CIPHER_DATA: &str = "CipherData";
    pub const CIPHER_VALUE: &str = "CipherValue";
}

/// Build a prefixed name.
pub fn qualified(prefix: &str, local: &str) -> String {
    if prefix.is_empty() {
        local.to_string()
    } else {
        format!("{}:{}", prefix, local)
    }
}

/// Split a qualified name into `(prefix, local)`. Unprefixed names yield `""`.
pub fn split(name: &str) -> (&str, &str) {
    match name.split_once(':') {
        Some((p, l)) => (p, l),
        None => ("", name),
    }
}

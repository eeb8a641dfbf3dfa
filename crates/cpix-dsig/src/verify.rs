//! Signature parsing and verification.

use tracing::{debug, warn};

use cpix_core::{Certificate, Ed25519Signature, Sha256Digest};
use cpix_xml::names::{cpix, dsig, ns};
use cpix_xml::{canonicalize, canonicalize_without, FormatError, ScopedElement};

use crate::algorithm::{decode, ED25519, ENVELOPED_SIGNATURE, EXC_C14N, SHA256};
use crate::error::VerificationFailure;
use crate::scope::{Reference, SignatureScope};
use crate::trust::TrustPolicy;

/// A `ds:Signature` element, checked for supported structure and algorithms.
#[derive(Debug, Clone)]
pub struct ParsedSignature {
    pub reference: Reference,
    pub digest: Sha256Digest,
    pub value: Ed25519Signature,
    pub signer: Certificate,
    signed_info: Vec<u8>,
}

impl ParsedSignature {
    /// Parse a signature element in its document scope.
    ///
    /// Fails with [`FormatError`] on unsupported algorithms, transforms other
    /// than those this engine produces, or anything but exactly one reference.
    pub fn parse(element: &ScopedElement<'_>) -> Result<Self, FormatError> {
        if !element.is(ns::DSIG, dsig::SIGNATURE) {
            return Err(FormatError::UnexpectedElement(element.element().name.clone()));
        }

        let signed_info = element.required_child(ns::DSIG, dsig::SIGNED_INFO)?;
        expect_algorithm(&signed_info, dsig::CANONICALIZATION_METHOD, EXC_C14N)?;
        expect_algorithm(&signed_info, dsig::SIGNATURE_METHOD, ED25519)?;

        let references: Vec<_> = signed_info
            .children()
            .filter(|c| c.is(ns::DSIG, dsig::REFERENCE))
            .collect();
        let reference_element = match references.as_slice() {
            [single] => single,
            _ => {
                return Err(FormatError::invalid(
                    "SignedInfo/Reference count",
                    references.len().to_string(),
                ))
            }
        };

        let reference = Reference::from_uri(reference_element.required_attr("URI")?)?;

        let transforms: Vec<String> = match reference_element.child(ns::DSIG, dsig::TRANSFORMS) {
            Some(t) => t
                .children()
                .filter(|c| c.is(ns::DSIG, dsig::TRANSFORM))
                .map(|c| c.required_attr("Algorithm").map(str::to_string))
                .collect::<Result<_, _>>()?,
            None => Vec::new(),
        };
        let expected: &[&str] = match reference {
            Reference::Document => &[ENVELOPED_SIGNATURE, EXC_C14N],
            Reference::Element(_) => &[EXC_C14N],
        };
        if transforms != expected {
            return Err(FormatError::UnsupportedAlgorithm(format!(
                "transforms [{}]",
                transforms.join(", ")
            )));
        }

        expect_algorithm(reference_element, dsig::DIGEST_METHOD, SHA256)?;
        let digest_text = reference_element
            .required_child(ns::DSIG, dsig::DIGEST_VALUE)?
            .text();
        let digest = Sha256Digest::try_from(decode("DigestValue", &digest_text)?.as_slice())
            .map_err(|_| FormatError::invalid("DigestValue", digest_text.clone()))?;

        let value_text = element
            .required_child(ns::DSIG, dsig::SIGNATURE_VALUE)?
            .text();
        let value = Ed25519Signature::try_from(decode("SignatureValue", &value_text)?.as_slice())
            .map_err(|_| FormatError::invalid("SignatureValue", value_text.clone()))?;

        let certificate_text = element
            .required_child(ns::DSIG, dsig::KEY_INFO)?
            .required_child(ns::CPIX, cpix::CERTIFICATE)?
            .text();
        let signer = Certificate::from_bytes(&decode("KeyInfo/Certificate", &certificate_text)?)
            .map_err(|e| FormatError::invalid("KeyInfo/Certificate", e.to_string()))?;
        if signer.signing_key().is_none() {
            return Err(FormatError::invalid(
                "KeyInfo/Certificate",
                "certificate has no signing key",
            ));
        }

        Ok(Self {
            reference,
            digest,
            value,
            signer,
            signed_info: canonicalize(&signed_info)?,
        })
    }
}

/// The outcome of verifying one signature.
#[derive(Debug, Clone)]
pub struct VerificationResult {
    /// `None` when the reference target is missing.
    pub scope: Option<SignatureScope>,
    pub reference: Reference,
    pub signer: Certificate,
    pub outcome: Result<(), VerificationFailure>,
}

impl VerificationResult {
    pub fn is_valid(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Verify `signature`, a child of `root`, against the current content of
/// `root`.
///
/// Malformed signatures are a [`FormatError`]; everything else, including a
/// missing reference target, is reported in the result.
pub fn verify(
    root: &ScopedElement<'_>,
    signature: &ScopedElement<'_>,
    trust: &dyn TrustPolicy,
) -> Result<VerificationResult, FormatError> {
    let parsed = ParsedSignature::parse(signature)?;

    let target = match &parsed.reference {
        Reference::Document => Some((
            SignatureScope::Document,
            canonicalize_without(root, signature.element())?,
        )),
        Reference::Element(id) => match root.find_by_id(id)? {
            Some(target) => {
                let scope = SignatureScope::of_target(&target).ok_or_else(|| {
                    FormatError::UnexpectedElement(format!(
                        "signature reference to {}",
                        target.element().name
                    ))
                })?;
                Some((scope, canonicalize(&target)?))
            }
            None => None,
        },
    };

    let (scope, outcome) = match target {
        None => (None, Err(VerificationFailure::ScopeMissing)),
        Some((scope, canonical)) => (Some(scope), check(&parsed, &canonical, trust)),
    };

    match &outcome {
        Ok(()) => debug!(reference = %parsed.reference.uri(), signer = %parsed.signer.fingerprint(), "signature valid"),
        Err(failure) => warn!(
            reference = %parsed.reference.uri(),
            signer = %parsed.signer.fingerprint(),
            %failure,
            "signature failed verification"
        ),
    }

    Ok(VerificationResult {
        scope,
        reference: parsed.reference,
        signer: parsed.signer,
        outcome,
    })
}

fn check(
    parsed: &ParsedSignature,
    canonical: &[u8],
    trust: &dyn TrustPolicy,
) -> Result<(), VerificationFailure> {
    if Sha256Digest::hash(canonical) != parsed.digest {
        return Err(VerificationFailure::SignatureInvalid);
    }

    let key = parsed
        .signer
        .signing_key()
        .ok_or(VerificationFailure::SignatureInvalid)?;
    key.verify(&parsed.signed_info, &parsed.value)
        .map_err(|_| VerificationFailure::SignatureInvalid)?;

    if !trust.is_trusted(&parsed.signer) {
        return Err(VerificationFailure::CertificateUntrusted);
    }
    Ok(())
}

fn expect_algorithm(parent: &ScopedElement<'_>, local: &str, expected: &str) -> Result<(), FormatError> {
    let algorithm = parent.required_child(ns::DSIG, local)?.required_attr("Algorithm")?;
    if algorithm != expected {
        return Err(FormatError::UnsupportedAlgorithm(algorithm.to_string()));
    }
    Ok(())
}

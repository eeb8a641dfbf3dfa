//! Signature creation.

use tracing::debug;

use cpix_core::{Sha256Digest, SigningIdentity};
use cpix_xml::names::{cpix, dsig, ns, prefix};
use cpix_xml::{canonicalize, Element, Scope, ScopedElement};

use crate::algorithm::{encode, ED25519, ENVELOPED_SIGNATURE, EXC_C14N, SHA256};
use crate::error::SigningError;
use crate::scope::Reference;

/// Sign `reference` within the document rooted at `root`.
///
/// Returns a `ds:Signature` element meant to be appended as a direct child of
/// `root`. For [`Reference::Document`], `root` must not yet contain the
/// signature; the digest covers the root as passed.
pub fn sign(
    root: &ScopedElement<'_>,
    reference: &Reference,
    identity: &SigningIdentity,
) -> Result<Element, SigningError> {
    let digest_input = match reference {
        Reference::Document => canonicalize(root)?,
        Reference::Element(id) => {
            let target = root
                .find_by_id(id)?
                .ok_or_else(|| SigningError::ScopeMissing(id.clone()))?;
            canonicalize(&target)?
        }
    };
    let digest = Sha256Digest::hash(&digest_input);

    let mut signature = Element::prefixed(prefix::DSIG, dsig::SIGNATURE);
    declare_if_missing(&mut signature, root.scope(), prefix::DSIG, ns::DSIG);
    declare_if_missing(&mut signature, root.scope(), prefix::CPIX, ns::CPIX);
    let signature_scope = root.scope().enter(&signature);

    let signed_info = signed_info(reference, &digest);
    let canonical = canonicalize(&ScopedElement::within(&signed_info, &signature_scope))?;
    let value = identity.sign(&canonical);

    let certificate = Element::prefixed(prefix::CPIX, cpix::CERTIFICATE)
        .with_text(encode(identity.certificate().as_bytes()));

    signature.push_child(signed_info);
    signature.push_child(ds(dsig::SIGNATURE_VALUE).with_text(encode(value.as_bytes())));
    signature.push_child(ds(dsig::KEY_INFO).with_child(certificate));

    debug!(
        reference = %reference.uri(),
        signer = %identity.certificate().fingerprint(),
        digest = ?digest,
        "signature created"
    );
    Ok(signature)
}

fn signed_info(reference: &Reference, digest: &Sha256Digest) -> Element {
    let mut transforms = ds(dsig::TRANSFORMS);
    if *reference == Reference::Document {
        transforms.push_child(algorithm(dsig::TRANSFORM, ENVELOPED_SIGNATURE));
    }
    transforms.push_child(algorithm(dsig::TRANSFORM, EXC_C14N));

    let reference = ds(dsig::REFERENCE)
        .with_attr("URI", reference.uri())
        .with_child(transforms)
        .with_child(algorithm(dsig::DIGEST_METHOD, SHA256))
        .with_child(ds(dsig::DIGEST_VALUE).with_text(encode(digest.as_bytes())));

    ds(dsig::SIGNED_INFO)
        .with_child(algorithm(dsig::CANONICALIZATION_METHOD, EXC_C14N))
        .with_child(algorithm(dsig::SIGNATURE_METHOD, ED25519))
        .with_child(reference)
}

fn ds(local: &str) -> Element {
    Element::prefixed(prefix::DSIG, local)
}

fn algorithm(local: &str, uri: &str) -> Element {
    ds(local).with_attr("Algorithm", uri)
}

fn declare_if_missing(element: &mut Element, scope: &Scope, prefix: &str, uri: &str) {
    if scope.resolve(prefix) != Some(uri) {
        element.set_attr(format!("xmlns:{}", prefix), uri);
    }
}

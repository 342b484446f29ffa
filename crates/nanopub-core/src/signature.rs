//! Ed25519 signatures over nanopublications.
//!
//! The signed bytes are the canonical form of the placeholder-normalized
//! head, assertion, and provenance graphs. The signature element itself
//! lives in pubinfo:
//!
//! ```text
//! <N/sig> npx:hasSignatureTarget <N> ;
//!         npx:hasAlgorithm "Ed25519" ;
//!         npx:hasPublicKey "<base64>" ;
//!         npx:hasSignature "<base64>" .
//! ```
//!
//! Signing happens on the draft, before identity assignment. Since the
//! signed bytes use the placeholder form, the signature still verifies
//! once the artifact code is in place.

use crate::canonical::{canonical_bytes, Canonicalizer};
use crate::crypto::{Ed25519PublicKey, Ed25519Signature, Keypair};
use crate::error::{GraphRole, SignatureError};
use crate::identity::{normalize_final, DraftNanopub, IdentityTransform, PLACEHOLDER};
use crate::nanopub::Nanopub;
use crate::term::{Iri, Literal, Statement, Term};
use crate::vocab::npx;

/// Value of `npx:hasAlgorithm` for signatures produced here.
pub const ALGORITHM: &str = "Ed25519";

const SIG_SUFFIX: &str = "sig";

fn signed_statements(np: &Nanopub) -> impl Iterator<Item = &Statement> {
    [GraphRole::Head, GraphRole::Assertion, GraphRole::Provenance]
        .into_iter()
        .flat_map(move |role| np.graph(role).iter())
}

fn has_signature_element(np: &Nanopub) -> bool {
    np.pubinfo()
        .iter()
        .any(|st| st.predicate.as_str() == npx::HAS_SIGNATURE_TARGET)
}

/// Sign a draft, adding the signature element to its pubinfo graph.
pub fn sign_draft<C: Canonicalizer>(
    transform: &IdentityTransform<C>,
    draft: DraftNanopub,
    keypair: &Keypair,
) -> Result<DraftNanopub, SignatureError> {
    if has_signature_element(draft.nanopub()) {
        return Err(SignatureError::DuplicateSignature);
    }
    let normalized = transform.normalize_draft(&draft, signed_statements(draft.nanopub()))?;
    let signature = keypair.sign(&canonical_bytes(&normalized, PLACEHOLDER));

    let uri = draft.uri().clone();
    let element = uri.join(SIG_SUFFIX);
    let triples: Vec<(Iri, Iri, Term)> = vec![
        (
            element.clone(),
            Iri::new(npx::HAS_SIGNATURE_TARGET),
            uri.into(),
        ),
        (
            element.clone(),
            Iri::new(npx::HAS_ALGORITHM),
            Literal::plain(ALGORITHM).into(),
        ),
        (
            element.clone(),
            Iri::new(npx::HAS_PUBLIC_KEY),
            Literal::plain(keypair.public_key().to_base64()).into(),
        ),
        (
            element,
            Iri::new(npx::HAS_SIGNATURE),
            Literal::plain(signature.to_base64()).into(),
        ),
    ];
    Ok(draft.extend_pubinfo(triples)?)
}

/// Check the signature of a final (content-addressed) nanopublication.
///
/// Returns the signer's public key.
pub fn verify_signature(np: &Nanopub) -> Result<Ed25519PublicKey, SignatureError> {
    let mut targets = np.pubinfo().iter().filter(|st| {
        st.predicate.as_str() == npx::HAS_SIGNATURE_TARGET && st.object.as_iri() == Some(np.uri())
    });
    let element = match (targets.next(), targets.next()) {
        (None, _) => return Err(SignatureError::MissingSignature),
        (Some(_), Some(_)) => return Err(SignatureError::DuplicateSignature),
        (Some(st), None) => &st.subject,
    };

    let algorithm = element_literal(np, element, npx::HAS_ALGORITHM, "algorithm")?;
    if !algorithm.eq_ignore_ascii_case(ALGORITHM) {
        return Err(SignatureError::UnsupportedAlgorithm(algorithm.to_string()));
    }
    let public_key =
        Ed25519PublicKey::from_base64(element_literal(np, element, npx::HAS_PUBLIC_KEY, "public key")?)?;
    let signature =
        Ed25519Signature::from_base64(element_literal(np, element, npx::HAS_SIGNATURE, "signature")?)?;

    let (_, normalized) = normalize_final(np, signed_statements(np))?;
    public_key.verify(&canonical_bytes(&normalized, PLACEHOLDER), &signature)?;
    Ok(public_key)
}

fn element_literal<'a>(
    np: &'a Nanopub,
    element: &Iri,
    predicate: &str,
    what: &'static str,
) -> Result<&'a str, SignatureError> {
    np.pubinfo()
        .iter()
        .find(|st| &st.subject == element && st.predicate.as_str() == predicate)
        .and_then(|st| st.object.as_literal())
        .map(|lit| lit.lexical())
        .ok_or(SignatureError::IncompleteElement(what))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::creator::NanopubCreator;
    use crate::identity::IdentityTransform;
    use crate::nanopub::ValidationMode;

    fn draft() -> DraftNanopub {
        NanopubCreator::draft("s1")
            .add_assertion(
                Iri::new("http://example.org/a"),
                Iri::new("http://example.org/p"),
                Literal::plain("x"),
            )
            .add_provenance_about_assertion(
                Iri::new("http://example.org/by"),
                Iri::new("http://example.org/alice"),
            )
            .finalize()
            .unwrap()
    }

    #[test]
    fn test_sign_assign_verify() {
        let transform = IdentityTransform::default();
        let keypair = Keypair::from_seed(&[3; 32]);
        let signed = sign_draft(&transform, draft(), &keypair).unwrap();
        let np = transform.assign(signed).unwrap();

        assert!(transform.verify(&np));
        assert_eq!(verify_signature(&np), Ok(keypair.public_key()));
    }

    #[test]
    fn test_double_sign_rejected() {
        let transform = IdentityTransform::default();
        let keypair = Keypair::from_seed(&[3; 32]);
        let signed = sign_draft(&transform, draft(), &keypair).unwrap();
        assert_eq!(
            sign_draft(&transform, signed, &keypair),
            Err(SignatureError::DuplicateSignature)
        );
    }

    #[test]
    fn test_unsigned_document() {
        let np = IdentityTransform::default().assign(draft()).unwrap();
        assert_eq!(verify_signature(&np), Err(SignatureError::MissingSignature));
    }

    #[test]
    fn test_tampered_assertion_fails_signature() {
        let transform = IdentityTransform::default();
        let keypair = Keypair::from_seed(&[9; 32]);
        let np = transform
            .assign(sign_draft(&transform, draft(), &keypair).unwrap())
            .unwrap();

        let mut statements = np.clone().into_statements();
        let victim = np.assertion().iter().next().unwrap().clone();
        statements.remove(&victim);
        statements.insert(Statement::new(
            victim.subject.clone(),
            victim.predicate.clone(),
            Literal::plain("y"),
            victim.graph.clone(),
        ));
        let tampered = Nanopub::from_statements(statements, ValidationMode::Lenient).unwrap();
        assert_eq!(
            verify_signature(&tampered),
            Err(SignatureError::VerificationFailed)
        );
    }
}

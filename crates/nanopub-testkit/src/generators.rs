//! Proptest generators for property-based testing.

use proptest::prelude::*;

use nanopub::{
    Ed25519PublicKey, IdentityConfig, IdentityTransform, Iri, Keypair, Literal, Nanopub,
    NanopubCreator, Term, DEFAULT_BASE,
};
use nanopub_core::sign_draft;

/// Generate a random keypair.
pub fn keypair() -> impl Strategy<Value = Keypair> {
    any::<[u8; 32]>().prop_map(|seed| Keypair::from_seed(&seed))
}

/// Generate a random Ed25519PublicKey.
pub fn public_key() -> impl Strategy<Value = Ed25519PublicKey> {
    keypair().prop_map(|kp| kp.public_key())
}

/// Generate an IRI outside the draft namespace.
pub fn iri() -> impl Strategy<Value = Iri> {
    "http://example\\.org/[a-z]{1,8}(/[a-z0-9]{1,8})?".prop_map(Iri::new)
}

/// Lexical forms including characters the canonical form must escape.
pub fn lexical() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 \\\\\n\"]{0,20}".prop_map(String::from)
}

/// Generate a plain, language-tagged, or typed literal.
pub fn literal() -> impl Strategy<Value = Literal> {
    prop_oneof![
        lexical().prop_map(Literal::plain),
        (lexical(), "[a-z]{2}(-[A-Z]{2})?").prop_map(|(s, lang)| Literal::lang(s, &lang)),
        (0i64..100_000).prop_map(|n| Literal::typed(
            n.to_string(),
            Iri::new("http://www.w3.org/2001/XMLSchema#integer")
        )),
    ]
}

/// Generate an object term.
pub fn term() -> impl Strategy<Value = Term> {
    prop_oneof![iri().prop_map(Term::from), literal().prop_map(Term::from)]
}

/// Generate a subject/predicate/object triple.
pub fn triple() -> impl Strategy<Value = (Iri, Iri, Term)> {
    (iri(), iri(), term())
}

/// Generate a draft local name.
pub fn local_name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9-]{0,15}".prop_map(String::from)
}

/// Generate a base namespace for final IRIs.
pub fn base_iri() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(DEFAULT_BASE.to_string()),
        Just("https://w3id.org/np/".to_string()),
        "https://[a-z]{1,8}\\.example/np/".prop_map(String::from),
    ]
}

/// Generate a query name accepted by the query client.
pub fn query_name() -> impl Strategy<Value = String> {
    ("[A-Za-z0-9_-]{43}", "[a-z][a-z-]{0,15}")
        .prop_map(|(code, local)| format!("RA{}/{}", code, local))
}

/// Generate query parameters, keys possibly repeated.
pub fn query_params() -> impl Strategy<Value = Vec<(String, String)>> {
    prop::collection::vec(("[a-z]{1,4}", "[ -~]{0,12}"), 0..8)
}

/// Parameters for generating a document.
#[derive(Debug, Clone)]
pub struct DraftParams {
    pub local: String,
    pub base: String,
    pub assertion: Vec<(Iri, Iri, Term)>,
    pub provenance: Vec<(Iri, Term)>,
    pub pubinfo: Vec<(Iri, Term)>,
    /// Sign with this keypair before assignment.
    pub keypair: Option<Keypair>,
}

impl Arbitrary for DraftParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (
            local_name(),
            base_iri(),
            prop::collection::vec(triple(), 1..6),
            prop::collection::vec((iri(), term()), 0..3),
            prop::collection::vec((iri(), term()), 0..3),
            prop::option::of(keypair()),
        )
            .prop_map(
                |(local, base, assertion, provenance, pubinfo, keypair)| DraftParams {
                    local,
                    base,
                    assertion,
                    provenance,
                    pubinfo,
                    keypair,
                },
            )
            .boxed()
    }
}

impl DraftParams {
    pub fn transform(&self) -> IdentityTransform {
        IdentityTransform::new(IdentityConfig {
            base_iri: self.base.clone(),
        })
    }

    /// The authoring builder for these parameters.
    pub fn creator(&self) -> NanopubCreator {
        let mut creator = NanopubCreator::draft(&self.local);
        for (s, p, o) in &self.assertion {
            creator = creator.add_assertion(s.clone(), p.clone(), o.clone());
        }
        for (p, o) in &self.provenance {
            creator = creator.add_provenance_about_assertion(p.clone(), o.clone());
        }
        for (p, o) in &self.pubinfo {
            creator = creator.add_pubinfo_about_nanopub(p.clone(), o.clone());
        }
        creator
    }
}

/// Build the final document for generated parameters.
pub fn nanopub_from_params(params: &DraftParams) -> nanopub::Result<Nanopub> {
    let transform = params.transform();
    let mut draft = params.creator().finalize()?;
    if let Some(keypair) = &params.keypair {
        draft = sign_draft(&transform, draft, keypair)?;
    }
    Ok(transform.assign(draft)?)
}

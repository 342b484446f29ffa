//! Golden test vectors for artifact codes.
//!
//! Each vector fixes a draft, a base namespace and optionally a signing
//! seed, together with the artifact code every conforming implementation
//! must produce. None of the drafts carry timestamps, so the codes are
//! stable across runs.

use nanopub::{
    IdentityConfig, IdentityTransform, Iri, Keypair, Literal, Nanopub, NanopubCreator,
    DEFAULT_BASE,
};
use nanopub_core::identity::normalize_final;
use nanopub_core::{canonical_bytes, sign_draft, PLACEHOLDER};
use serde::Serialize;
use thiserror::Error;

/// Failure to produce the vector report.
#[derive(Debug, Error)]
pub enum VectorError {
    #[error(transparent)]
    Kernel(#[from] nanopub::KernelError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A golden test vector.
#[derive(Debug, Clone)]
pub struct GoldenVector {
    pub name: &'static str,
    /// Builds the draft content.
    pub creator: fn() -> NanopubCreator,
    pub base: &'static str,
    /// Ed25519 seed, for vectors that are signed before assignment.
    pub seed: Option<[u8; 32]>,
    pub expected_artifact_code: &'static str,
}

/// What an implementation produced for one vector.
#[derive(Debug, Clone, Serialize)]
pub struct VectorReport {
    pub name: String,
    pub matches: bool,
    pub uri: String,
    pub artifact_code: String,
    /// Hex of the canonical bytes that were hashed.
    pub canonical_hex: String,
}

fn minimal() -> NanopubCreator {
    NanopubCreator::draft("golden-minimal").add_assertion(
        Iri::new("http://example.org/a"),
        Iri::new("http://example.org/p"),
        Literal::plain("x"),
    )
}

fn full() -> NanopubCreator {
    let mosquito = || Iri::new("http://example.org/mosquito");
    NanopubCreator::draft("golden-full")
        .add_assertion(
            mosquito(),
            Iri::new("http://example.org/transmits"),
            Iri::new("http://example.org/malaria"),
        )
        .add_assertion(
            mosquito(),
            Iri::new("http://www.w3.org/2000/01/rdf-schema#label"),
            Literal::lang("moustique", "fr"),
        )
        .add_assertion(
            mosquito(),
            Iri::new("http://www.w3.org/2000/01/rdf-schema#comment"),
            Literal::plain("line one\nline two \\ end"),
        )
        .add_provenance_about_assertion(
            Iri::new("http://www.w3.org/ns/prov#wasAttributedTo"),
            Iri::new("http://orcid.org/0000-0002-1825-0097"),
        )
        .add_creator_orcid("0000-0002-1825-0097")
}

fn signed() -> NanopubCreator {
    NanopubCreator::draft("golden-signed").add_assertion(
        Iri::new("http://example.org/a"),
        Iri::new("http://example.org/p"),
        Literal::plain("x"),
    )
}

/// All golden vectors.
pub fn all_vectors() -> Vec<GoldenVector> {
    vec![
        // Single assertion, nothing else
        GoldenVector {
            name: "minimal",
            creator: minimal,
            base: DEFAULT_BASE,
            seed: None,
            expected_artifact_code: "RAIkgrATscHS4DshfumeNW4jGCMlkoqsY5fM0NFP5CutY",
        },
        // Language tag, escaped literal, provenance and pubinfo
        GoldenVector {
            name: "full",
            creator: full,
            base: DEFAULT_BASE,
            seed: None,
            expected_artifact_code: "RAqNioQ7K0S-N97i7sK2pT_O-Jhru60gw_2IPLk2IVfh4",
        },
        // Same content as minimal; the base takes part in the hash
        GoldenVector {
            name: "custom-base",
            creator: minimal,
            base: "https://w3id.org/np/",
            seed: None,
            expected_artifact_code: "RALpxX7arIvkocLAmu3fUUQ1s8tYLaSni4b7yiAon4Ee0",
        },
        GoldenVector {
            name: "signed",
            creator: signed,
            base: DEFAULT_BASE,
            seed: Some([0x42; 32]),
            expected_artifact_code: "RAn-TcFYjjyLYrLeZga7gzeQSaX7wYrrS15hh0WfqfudE",
        },
    ]
}

/// Build the final document described by a vector.
pub fn generate_nanopub_from_vector(vector: &GoldenVector) -> nanopub::Result<Nanopub> {
    let transform = IdentityTransform::new(IdentityConfig {
        base_iri: vector.base.to_string(),
    });
    let mut draft = (vector.creator)().finalize()?;
    if let Some(seed) = &vector.seed {
        draft = sign_draft(&transform, draft, &Keypair::from_seed(seed))?;
    }
    Ok(transform.assign(draft)?)
}

/// Regenerate every vector and compare against the expected codes.
pub fn verify_all_vectors() -> nanopub::Result<Vec<VectorReport>> {
    all_vectors()
        .iter()
        .map(|v| {
            let np = generate_nanopub_from_vector(v)?;
            let (code, normalized) = normalize_final(&np, np.statements())?;
            Ok(VectorReport {
                name: v.name.to_string(),
                matches: code.as_str() == v.expected_artifact_code,
                uri: np.uri().to_string(),
                artifact_code: code.as_str().to_string(),
                canonical_hex: hex::encode(canonical_bytes(&normalized, PLACEHOLDER)),
            })
        })
        .collect()
}

/// The vector reports as pretty JSON, for comparing implementations.
pub fn vectors_json() -> Result<String, VectorError> {
    let reports = verify_all_vectors()?;
    Ok(serde_json::to_string_pretty(&reports)?)
}

//! Error types for nanopublication structure, identity, and signatures.

use thiserror::Error;

use crate::identity::ArtifactCode;
use crate::term::Iri;

/// The role a graph plays inside a nanopublication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GraphRole {
    Head,
    Assertion,
    Provenance,
    Pubinfo,
}

impl std::fmt::Display for GraphRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            GraphRole::Head => "head",
            GraphRole::Assertion => "assertion",
            GraphRole::Provenance => "provenance",
            GraphRole::Pubinfo => "publication info",
        })
    }
}

/// Structural errors: the statement set is not a well-formed nanopublication.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedNanopub {
    #[error("no content received for nanopub")]
    NoContent,

    #[error("no nanopub URI found")]
    MissingType,

    #[error("two nanopub URIs found: {first} and {second}")]
    DuplicateType { first: Iri, second: Iri },

    #[error("no {role} URI found for {nanopub}")]
    MissingGraph { role: GraphRole, nanopub: Iri },

    #[error("two {role} URIs found: {first} and {second}")]
    DuplicateGraph {
        role: GraphRole,
        first: Iri,
        second: Iri,
    },

    #[error("{role} pointer of {nanopub} is not an IRI")]
    GraphPointerNotIri { role: GraphRole, nanopub: Iri },

    #[error("each graph needs a unique URI: {0}")]
    DuplicateGraphUri(Iri),

    #[error("nanopub URI cannot be identical to one of the graph URIs: {0}")]
    UriIsGraph(Iri),

    #[error("disconnected graph: {0}")]
    DisconnectedGraph(Iri),

    #[error("empty {role} graph: {graph}")]
    EmptyGraph { role: GraphRole, graph: Iri },

    #[error("provenance does not refer to assertion: {0}")]
    ProvenanceUnlinked(Iri),

    #[error("publication info does not refer to nanopublication URI: {0}")]
    PubinfoUnlinked(Iri),
}

/// Errors from assigning or checking a content-derived identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    #[error("not a draft nanopub URI: {0}")]
    NotDraft(Iri),

    #[error("draft IRI cannot be mapped into the nanopub namespace: {0}")]
    UnmappableDraftIri(Iri),

    #[error("graph URI {graph} is not under the nanopub URI {nanopub}")]
    GraphOutsideNamespace { graph: Iri, nanopub: Iri },

    #[error("draft IRI left over after identity assignment: {0}")]
    LeftoverDraftIri(Iri),

    #[error("IRI contains the artifact-code placeholder or whitespace: {0}")]
    ReservedIri(Iri),

    #[error("not a content-addressed nanopub URI: {0}")]
    NotContentAddressed(Iri),

    #[error("invalid artifact code: {0}")]
    InvalidArtifactCode(String),

    #[error("artifact code mismatch: claimed {claimed}, recomputed {recomputed}")]
    Mismatch {
        claimed: ArtifactCode,
        recomputed: ArtifactCode,
    },

    #[error("malformed nanopub: {0}")]
    Malformed(#[from] MalformedNanopub),
}

/// Errors from attaching or checking a document signature.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
    #[error("no signature element in publication info")]
    MissingSignature,

    #[error("more than one signature element in publication info")]
    DuplicateSignature,

    #[error("signature element is missing {0}")]
    IncompleteElement(&'static str),

    #[error("unsupported signature algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("invalid public key")]
    InvalidPublicKey,

    #[error("invalid signature encoding")]
    InvalidEncoding,

    #[error("signature verification failed")]
    VerificationFailed,

    #[error("identity error: {0}")]
    Identity(#[from] IdentityError),
}

/// Errors from finishing a [`NanopubCreator`](crate::creator::NanopubCreator).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CreatorError {
    #[error("timestamp cannot be written as xsd:dateTime: {0}")]
    Timestamp(String),

    #[error("malformed nanopub: {0}")]
    Malformed(#[from] MalformedNanopub),

    #[error("identity error: {0}")]
    Identity(#[from] IdentityError),
}

/// Result type for structural operations.
pub type Result<T> = std::result::Result<T, MalformedNanopub>;

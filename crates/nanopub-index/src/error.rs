//! Error types for index documents and chains.

use thiserror::Error;

use nanopub_core::{CreatorError, IdentityError, Iri};

/// Errors that can occur while reading or building index chains.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndexError {
    /// Pubinfo does not type the document as a nanopub index.
    #[error("not a nanopub index: {0}")]
    NotAnIndex(Iri),

    /// More references than one index document may hold.
    #[error("nanopub index {index} exceeds maximum size: {count} references")]
    CapacityExceeded { index: Iri, count: usize },

    #[error("multiple appended indexes found in {0}")]
    MultipleAppends(Iri),

    #[error("{predicate} in {index} does not point to an IRI")]
    NonIriReference { index: Iri, predicate: &'static str },

    /// A node the chain points at is not available.
    #[error("index chain node not found: {0}")]
    MissingNode(Iri),

    #[error("index chain loops back to {0}")]
    Cycle(Iri),

    #[error("identity error: {0}")]
    Identity(#[from] IdentityError),

    #[error("could not build index node: {0}")]
    Creator(#[from] CreatorError),
}

/// Result type for index operations.
pub type Result<T> = std::result::Result<T, IndexError>;

//! Error types for the Kernel.

use nanopub_core::{CreatorError, IdentityError, MalformedNanopub, SignatureError};
use nanopub_index::IndexError;
use nanopub_query::QueryError;
use thiserror::Error;

/// Errors that can occur during Kernel operations.
#[derive(Debug, Error)]
pub enum KernelError {
    /// Structural error in a document.
    #[error("malformed nanopub: {0}")]
    Malformed(#[from] MalformedNanopub),

    /// Identity assignment or verification failed.
    #[error("identity error: {0}")]
    Identity(#[from] IdentityError),

    #[error("signature error: {0}")]
    Signature(#[from] SignatureError),

    #[error("creator error: {0}")]
    Creator(#[from] CreatorError),

    #[error("index error: {0}")]
    Index(#[from] IndexError),

    /// Network or availability error after retries.
    #[error("query error: {0}")]
    Query(#[from] QueryError),

    /// Signing was requested but no keypair is configured.
    #[error("no signing key configured")]
    NoSigningKey,
}

/// Result type for Kernel operations.
pub type Result<T> = std::result::Result<T, KernelError>;

//! Error types for federated queries.

use thiserror::Error;

/// Errors that can occur while resolving a query against the replicas.
///
/// Only [`QueryError::NotEnoughHealthyReplicas`] and
/// [`QueryError::ApiNotReachable`] escape the retry loop; the per-request
/// variants are logged and count as a failed request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("query name is empty")]
    EmptyQueryName,

    /// Query names look like `RA<43 chars>/<local name>`.
    #[error("invalid query name: {0}")]
    InvalidQueryName(String),

    #[error("query parameter key is empty")]
    EmptyParameterKey,

    #[error("invalid replica url {url}: {reason}")]
    InvalidReplicaUrl { url: String, reason: String },

    #[error("not enough healthy replicas: {healthy} of {required} required")]
    NotEnoughHealthyReplicas { healthy: usize, required: usize },

    #[error("API not reachable for query {query} after {attempts} attempts")]
    ApiNotReachable { query: String, attempts: usize },

    /// The request never produced a response.
    #[error("transport error from {replica}: {message}")]
    Transport { replica: String, message: String },

    #[error("replica {replica} answered with status {status}")]
    Status { replica: String, status: u16 },

    #[error("replica {replica} answered with an empty body")]
    EmptyBody { replica: String },

    #[error("could not decode response: {0}")]
    Decode(String),

    /// Another replica won the race.
    #[error("request cancelled")]
    Cancelled,
}

/// Result type for query operations.
pub type Result<T> = std::result::Result<T, QueryError>;

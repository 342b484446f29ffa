//! # Nanopub Query
//!
//! Client for the federated nanopub query services: several independently
//! operated replicas answering the same named queries with CSV tables.
//!
//! ## Resolution
//!
//! ```text
//! probe replicas (once, cached) --> healthy set (>= 2)
//!         |
//!         v
//! attempt: pick 2 at random, race them --> first usable answer wins,
//!          |                               the other is cancelled
//!          v
//! retry up to 3 attempts --> "API not reachable"
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use nanopub_query::{QueryClient, QueryConfig, QueryRef};
//!
//! async fn example() -> nanopub_query::Result<()> {
//!     let client = QueryClient::http(QueryConfig::default())?;
//!     let query = QueryRef::new("RA3qSfVzcnAeMOODdpgCg4e-bX6KjZYZ2JQXDsSwluMaI/get-newer-versions-of-np")?
//!         .with_param("np", "http://purl.org/np/RAabc")?;
//!     let response = client.query(&query).await?;
//!     for row in &response {
//!         println!("{:?}", row.get("newerVersion"));
//!     }
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;
pub mod health;
pub mod query_ref;
pub mod response;
pub mod transport;
pub mod versions;

pub use client::{QueryClient, QueryConfig, DEFAULT_REPLICAS};
pub use error::{QueryError, Result};
pub use health::HealthCache;
pub use query_ref::QueryRef;
pub use response::{ApiResponse, ApiResponseEntry};
pub use transport::{
    http::{HttpTransport, HttpTransportConfig},
    memory::{MemoryReplicas, ReplicaScript},
    ReplicaResponse, ReplicaTransport,
};
pub use versions::{unique_live_version, VersionCache, NEWER_VERSIONS_QUERY, VERSION_CACHE_TTL};

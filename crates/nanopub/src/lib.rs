//! # Nanopub
//!
//! The unified API for nanopublications: small RDF documents whose
//! identifier is derived from their own content, grouped into index
//! chains and retrieved from a federation of query services.
//!
//! ## Key Concepts
//!
//! - **Nanopub**: four named graphs (head, assertion, provenance, pubinfo).
//!   Immutable once its identifier is assigned.
//! - **Draft**: a document authored under the temporary namespace, before
//!   its artifact code is known.
//! - **Artifact code**: `RA` + base64url SHA-256 of the placeholder-normalized
//!   statements, forming the tail of the document IRI.
//! - **Index chain**: fixed-capacity index documents linked by
//!   `npx:appendsIndex`.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use nanopub::{Iri, Kernel, KernelConfig, Keypair, Literal};
//!
//! let kernel = Kernel::new(KernelConfig::default())
//!     .unwrap()
//!     .with_keypair(Keypair::generate());
//!
//! let creator = kernel
//!     .creator("example")
//!     .add_assertion(
//!         Iri::new("http://example.org/mosquito"),
//!         Iri::new("http://example.org/transmits"),
//!         Iri::new("http://example.org/malaria"),
//!     )
//!     .add_provenance_about_assertion(
//!         Iri::new("http://www.w3.org/ns/prov#wasAttributedTo"),
//!         Iri::new("https://orcid.org/0000-0002-1825-0097"),
//!     );
//! let np = kernel.publish(creator).unwrap();
//! let verification = kernel.verify(&np).unwrap();
//! assert!(verification.signer.is_some());
//! ```
//!
//! ## Re-exports
//!
//! - `nanopub::core` - Document model, identity and signatures
//! - `nanopub::index` - Index documents and chains
//! - `nanopub::query` - Federated query client

pub mod error;
pub mod kernel;

// Re-export component crates
pub use nanopub_core as core;
pub use nanopub_index as index;
pub use nanopub_query as query;

// Re-export main types for convenience
pub use error::{KernelError, Result};
pub use kernel::{Kernel, KernelConfig, Verification};

// Re-export commonly used types
pub use nanopub_core::{
    ArtifactCode, DraftNanopub, Ed25519PublicKey, IdentityConfig, IdentityTransform, Iri, Keypair,
    Literal, Nanopub, NanopubCreator, Statement, Term, ValidationMode, DEFAULT_BASE,
    DRAFT_NAMESPACE,
};
pub use nanopub_index::{IndexArena, IndexChain, IndexConfig, IndexReference, NanopubIndex};
pub use nanopub_query::{ApiResponse, QueryConfig, QueryRef};

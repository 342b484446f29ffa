//! # Nanopub Core
//!
//! Pure primitives for nanopublications: the four-graph document model,
//! content-derived identifiers, and document signatures.
//!
//! This crate contains no I/O and no networking.
//!
//! ## Key Types
//!
//! - [`Nanopub`] - A validated head/assertion/provenance/pubinfo document
//! - [`NanopubCreator`] - Builder for authoring documents under a draft IRI
//! - [`DraftNanopub`] - A document whose identity is not yet fixed
//! - [`IdentityTransform`] - Assigns and verifies artifact-code identifiers
//! - [`ArtifactCode`] - The digest token at the tail of a final IRI
//!
//! ## Lifecycle
//!
//! ```text
//! NanopubCreator --finalize--> DraftNanopub --sign_draft--> DraftNanopub
//!                                          \--assign------> Nanopub (final)
//! ```
//!
//! Assignment consumes the draft, so a document cannot be edited after its
//! identity is fixed.

pub mod canonical;
pub mod creator;
pub mod crypto;
pub mod error;
pub mod identity;
pub mod nanopub;
pub mod signature;
pub mod term;
pub mod vocab;

pub use canonical::{canonical_bytes, Canonicalizer, RdfHasher};
pub use creator::NanopubCreator;
pub use crypto::{Ed25519PublicKey, Ed25519Signature, Keypair};
pub use error::{CreatorError, GraphRole, IdentityError, MalformedNanopub, SignatureError};
pub use identity::{
    ArtifactCode, DraftNanopub, IdentityConfig, IdentityTransform, DEFAULT_BASE, DRAFT_NAMESPACE,
    PLACEHOLDER,
};
pub use nanopub::{Nanopub, ValidationMode};
pub use signature::{sign_draft, verify_signature};
pub use term::{Iri, Literal, Statement, Term};

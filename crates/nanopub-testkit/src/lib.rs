//! # Nanopub Testkit
//!
//! Testing utilities for nanopub-rs.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: Fixed drafts with the artifact codes every implementation must produce
//! - **Generators**: Proptest strategies for documents, terms and query parameters
//! - **Fixtures**: Signing identities and offline kernels backed by in-memory replicas
//!
//! ## Golden Vectors
//!
//! ```rust
//! use nanopub_testkit::vectors::{all_vectors, generate_nanopub_from_vector};
//!
//! for vector in all_vectors() {
//!     let np = generate_nanopub_from_vector(&vector).unwrap();
//!     assert!(np.uri().as_str().ends_with(vector.expected_artifact_code));
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use nanopub::IdentityTransform;
//! use nanopub_testkit::generators::{nanopub_from_params, DraftParams};
//!
//! proptest! {
//!     #[test]
//!     fn assigned_documents_verify(params: DraftParams) {
//!         let np = nanopub_from_params(&params).unwrap();
//!         prop_assert!(IdentityTransform::default().verify(&np));
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use nanopub_testkit::fixtures::TestFixture;
//!
//! let fixture = TestFixture::new();
//! let draft = fixture.creator("my-doc").finalize().unwrap();
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{csv_table, multi_party_fixtures, TestFixture};
pub use generators::{nanopub_from_params, DraftParams};
pub use vectors::{
    all_vectors, generate_nanopub_from_vector, verify_all_vectors, vectors_json, GoldenVector,
    VectorError, VectorReport,
};

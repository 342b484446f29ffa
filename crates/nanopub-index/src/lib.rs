//! # Nanopub Index
//!
//! Index nanopublications: documents whose assertion lists up to
//! [`MAX_INDEX_SIZE`] references to other documents or sub-indexes, chained
//! through `npx:appendsIndex` to describe sets of any size.
//!
//! ## Key Types
//!
//! - [`NanopubIndex`] - Validated view of one index document
//! - [`IndexChainBuilder`] - Packs a reference stream into a chain of nodes
//! - [`IndexArena`] - Nodes keyed by IRI, for walking a chain back
//!
//! ## Usage
//!
//! ```rust
//! use nanopub_core::Iri;
//! use nanopub_index::{IndexArena, IndexChainBuilder, IndexConfig};
//!
//! let mut builder = IndexChainBuilder::new(IndexConfig::default());
//! let mut arena = IndexArena::new();
//! for i in 0..3 {
//!     let iri = Iri::new(format!("http://example.org/np/{}", i));
//!     if let Some(closed) = builder.add_element(iri).unwrap() {
//!         arena.insert(closed);
//!     }
//! }
//! let complete = builder.finalize().unwrap();
//! let head = complete.uri().clone();
//! arena.insert(complete);
//! assert_eq!(arena.collect(&head).unwrap().elements.len(), 3);
//! ```

pub mod arena;
pub mod chain;
pub mod error;
pub mod index;

pub use arena::{ChainContents, IndexArena};
pub use chain::{
    build_chain, ChainState, IndexChain, IndexChainBuilder, IndexConfig, IndexMetadata,
    IndexReference,
};
pub use error::{IndexError, Result};
pub use index::{NanopubIndex, MAX_INDEX_SIZE};

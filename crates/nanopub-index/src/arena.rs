//! Index nodes addressed by IRI.
//!
//! Closed nodes are immutable and are usually fetched from the network by
//! identifier, so chains are reconstructed from an arena of nodes rather
//! than from live links.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use nanopub_core::Iri;

use crate::chain::IndexChain;
use crate::error::{IndexError, Result};
use crate::index::NanopubIndex;

/// Everything a chain references, oldest node first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChainContents {
    pub elements: Vec<Iri>,
    pub subindexes: Vec<Iri>,
}

/// In-memory collection of index nodes.
#[derive(Debug, Clone, Default)]
pub struct IndexArena {
    nodes: HashMap<Iri, NanopubIndex>,
}

impl IndexArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node. Returns the node previously stored under the same IRI.
    pub fn insert(&mut self, index: NanopubIndex) -> Option<NanopubIndex> {
        self.nodes.insert(index.uri().clone(), index)
    }

    pub fn get(&self, iri: &Iri) -> Option<&NanopubIndex> {
        self.nodes.get(iri)
    }

    pub fn contains(&self, iri: &Iri) -> bool {
        self.nodes.contains_key(iri)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Walk back from `head` through `appendsIndex`, returning the nodes
    /// oldest first.
    pub fn walk(&self, head: &Iri) -> Result<Vec<&NanopubIndex>> {
        let mut seen = HashSet::new();
        let mut nodes = Vec::new();
        let mut cursor = Some(head);
        while let Some(iri) = cursor {
            if !seen.insert(iri) {
                return Err(IndexError::Cycle(iri.clone()));
            }
            let node = self
                .nodes
                .get(iri)
                .ok_or_else(|| IndexError::MissingNode(iri.clone()))?;
            nodes.push(node);
            cursor = node.appended_index();
        }
        nodes.reverse();
        debug!(head = %head, nodes = nodes.len(), "walked index chain");
        Ok(nodes)
    }

    /// Collect every reference of the chain ending at `head`.
    ///
    /// Nodes contribute oldest first. A node is a statement set, so the
    /// references of one node come out in IRI order, not insertion order.
    pub fn collect(&self, head: &Iri) -> Result<ChainContents> {
        let mut contents = ChainContents::default();
        for node in self.walk(head)? {
            contents.elements.extend(node.elements().iter().cloned());
            contents.subindexes.extend(node.subindexes().iter().cloned());
        }
        Ok(contents)
    }
}

impl From<IndexChain> for IndexArena {
    fn from(chain: IndexChain) -> Self {
        let mut arena = IndexArena::new();
        for node in chain.nodes {
            arena.insert(node);
        }
        arena
    }
}

impl Extend<NanopubIndex> for IndexArena {
    fn extend<I: IntoIterator<Item = NanopubIndex>>(&mut self, iter: I) {
        for node in iter {
            self.insert(node);
        }
    }
}

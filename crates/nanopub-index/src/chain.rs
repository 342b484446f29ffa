//! Building chains of index nanopublications.
//!
//! References are packed into nodes of at most [`MAX_INDEX_SIZE`]. When a
//! reference arrives and the open node is already full, the open node is
//! closed as *incomplete* and a new node is opened that appends it:
//!
//! ```text
//! [incomplete 1..1000] <-appendsIndex- [incomplete 1001..2000] <-appendsIndex- [complete 2001..]
//! ```
//!
//! [`IndexChainBuilder::finalize`] closes the last node as *complete*.
//! Every node is closed through identity assignment, so each node's IRI is
//! content-derived and the `appendsIndex` pointers are stable.

use std::collections::BTreeSet;

use time::OffsetDateTime;
use tracing::{debug, info};

use nanopub_core::vocab::{dc, dct, np, npx, pav, rdf, rdfs, xsd};
use nanopub_core::{
    Canonicalizer, IdentityTransform, Iri, Literal, NanopubCreator, RdfHasher, DRAFT_NAMESPACE,
};

use crate::error::Result;
use crate::index::{NanopubIndex, MAX_INDEX_SIZE};

/// Descriptive metadata written into the pubinfo graph of every node.
///
/// The description only goes on the complete node.
#[derive(Debug, Clone, Default)]
pub struct IndexMetadata {
    pub title: Option<String>,
    pub description: Option<String>,
    pub creators: Vec<Iri>,
    pub license: Option<Iri>,
    pub see_also: Vec<Iri>,
}

/// Configuration for an index chain.
#[derive(Debug, Clone)]
pub struct IndexConfig {
    /// Draft IRI each node is authored under before identity assignment.
    pub draft_uri: String,
    pub metadata: IndexMetadata,
    /// When set, every node carries this `dct:created` timestamp.
    pub created_at: Option<OffsetDateTime>,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            draft_uri: format!("{}index/", DRAFT_NAMESPACE),
            metadata: IndexMetadata::default(),
            created_at: None,
        }
    }
}

/// A reference added to an index.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum IndexReference {
    Element(Iri),
    Subindex(Iri),
}

/// Where the builder is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainState {
    /// No node has been opened yet.
    Idle,
    /// A node is open and holds this many references.
    Accumulating(usize),
}

/// A fully built chain, oldest node first. The last node is complete.
#[derive(Debug, Clone)]
pub struct IndexChain {
    pub nodes: Vec<NanopubIndex>,
}

impl IndexChain {
    /// The terminal node representing the whole set.
    pub fn complete(&self) -> Option<&NanopubIndex> {
        self.nodes.last()
    }
}

struct OpenNode {
    creator: NanopubCreator,
    references: BTreeSet<IndexReference>,
    namespaces: BTreeSet<String>,
}

/// Sequential builder for one index chain.
///
/// Not meant for concurrent mutation; own one builder per chain.
/// `finalize` consumes the builder, so nothing can be added afterwards.
pub struct IndexChainBuilder<C: Canonicalizer = RdfHasher> {
    transform: IdentityTransform<C>,
    config: IndexConfig,
    open: Option<OpenNode>,
    previous: Option<Iri>,
}

impl IndexChainBuilder<RdfHasher> {
    /// Builder using the default identity transform.
    pub fn new(config: IndexConfig) -> Self {
        Self::with_transform(IdentityTransform::default(), config)
    }
}

impl<C: Canonicalizer> IndexChainBuilder<C> {
    pub fn with_transform(transform: IdentityTransform<C>, config: IndexConfig) -> Self {
        Self {
            transform,
            config,
            open: None,
            previous: None,
        }
    }

    pub fn state(&self) -> ChainState {
        match &self.open {
            None => ChainState::Idle,
            Some(node) => ChainState::Accumulating(node.references.len()),
        }
    }

    /// IRI of the most recently closed node.
    pub fn previous(&self) -> Option<&Iri> {
        self.previous.as_ref()
    }

    /// Add a document reference.
    ///
    /// Returns the incomplete node closed to make room, if any.
    pub fn add_element(&mut self, element: Iri) -> Result<Option<NanopubIndex>> {
        self.add(IndexReference::Element(element))
    }

    /// Add a sub-index reference.
    pub fn add_subindex(&mut self, subindex: Iri) -> Result<Option<NanopubIndex>> {
        self.add(IndexReference::Subindex(subindex))
    }

    /// Add a reference of either kind.
    ///
    /// A reference already held by the open node is skipped and takes no
    /// capacity. On error the builder should be discarded: the node being
    /// closed is not restored.
    pub fn add(&mut self, reference: IndexReference) -> Result<Option<NanopubIndex>> {
        if let Some(node) = &self.open {
            if node.references.contains(&reference) {
                debug!(reference = ?reference, "skipping duplicate index reference");
                return Ok(None);
            }
        }
        let mut closed = None;
        let node = match self.open.take() {
            Some(node) if node.references.len() < MAX_INDEX_SIZE => node,
            Some(full) => {
                closed = Some(self.close_incomplete(full)?);
                self.open_node()
            }
            None => self.open_node(),
        };

        let OpenNode {
            mut creator,
            mut references,
            mut namespaces,
        } = node;
        references.insert(reference.clone());
        let this = creator.uri().clone();
        creator = match reference {
            IndexReference::Element(iri) => {
                if let Some((ns, _)) = iri.split_namespace() {
                    if namespaces.insert(ns.to_string()) {
                        let prefix = format!("ns{}", namespaces.len());
                        creator = creator.add_namespace(&prefix, ns);
                    }
                }
                creator.add_assertion(this, Iri::new(npx::INCLUDES_ELEMENT), iri)
            }
            IndexReference::Subindex(iri) => {
                creator.add_assertion(this, Iri::new(npx::INCLUDES_SUBINDEX), iri)
            }
        };
        self.open = Some(OpenNode {
            creator,
            references,
            namespaces,
        });
        Ok(closed)
    }

    /// Close the chain, producing the complete terminal node.
    ///
    /// With no open node this closes an empty node that still appends the
    /// previous one, marking the end of the chain.
    pub fn finalize(mut self) -> Result<NanopubIndex> {
        let node = match self.open.take() {
            Some(node) => node,
            None => self.open_node(),
        };
        let mut creator = node.creator;
        creator = enrich(creator, &self.config.metadata);
        if let Some(description) = &self.config.metadata.description {
            creator = creator.add_pubinfo_about_nanopub(
                Iri::new(dc::DESCRIPTION),
                Literal::plain(description.as_str()),
            );
        }
        let index = self.close(creator)?;
        info!(index = %index.uri(), references = index.len(), "closed complete index");
        Ok(index)
    }

    fn open_node(&self) -> OpenNode {
        let mut creator = NanopubCreator::new(Iri::new(self.config.draft_uri.as_str()));
        for (prefix, ns) in [
            ("rdf", rdf::NS),
            ("rdfs", rdfs::NS),
            ("xsd", xsd::NS),
            ("dc", dct::NS),
            ("pav", pav::NS),
            ("np", np::NS),
            ("npx", npx::NS),
        ] {
            creator = creator.add_namespace(prefix, ns);
        }
        creator = creator
            .add_provenance_about_assertion(Iri::new(rdf::TYPE), Iri::new(npx::INDEX_ASSERTION))
            .add_pubinfo_about_nanopub(Iri::new(rdf::TYPE), Iri::new(npx::NANOPUB_INDEX));
        if let Some(prev) = &self.previous {
            let this = creator.uri().clone();
            creator = creator.add_assertion(this, Iri::new(npx::APPENDS_INDEX), prev.clone());
        }
        if let Some(at) = self.config.created_at {
            creator = creator.add_timestamp(at);
        }
        debug!(appends = ?self.previous, "opened index node");
        OpenNode {
            creator,
            references: BTreeSet::new(),
            namespaces: BTreeSet::new(),
        }
    }

    fn close_incomplete(&mut self, node: OpenNode) -> Result<NanopubIndex> {
        let creator = node
            .creator
            .add_pubinfo_about_nanopub(Iri::new(rdf::TYPE), Iri::new(npx::INCOMPLETE_INDEX));
        let creator = enrich(creator, &self.config.metadata);
        let index = self.close(creator)?;
        info!(index = %index.uri(), references = index.len(), "closed incomplete index");
        Ok(index)
    }

    fn close(&mut self, creator: NanopubCreator) -> Result<NanopubIndex> {
        let draft = creator.finalize()?;
        let nanopub = self.transform.assign(draft)?;
        let index = NanopubIndex::from_nanopub(nanopub)?;
        self.previous = Some(index.uri().clone());
        Ok(index)
    }
}

fn enrich(mut creator: NanopubCreator, metadata: &IndexMetadata) -> NanopubCreator {
    if let Some(title) = &metadata.title {
        creator = creator.add_pubinfo_about_nanopub(Iri::new(dc::TITLE), Literal::plain(title.as_str()));
    }
    for who in &metadata.creators {
        creator = creator.add_creator(who.clone());
    }
    if let Some(license) = &metadata.license {
        creator = creator.add_pubinfo_about_nanopub(Iri::new(dct::LICENSE), license.clone());
    }
    for iri in &metadata.see_also {
        creator = creator.add_pubinfo_about_nanopub(Iri::new(rdfs::SEE_ALSO), iri.clone());
    }
    creator
}

/// Build a whole chain from a reference stream.
pub fn build_chain<C: Canonicalizer>(
    mut builder: IndexChainBuilder<C>,
    references: impl IntoIterator<Item = IndexReference>,
) -> Result<IndexChain> {
    let mut nodes = Vec::new();
    for reference in references {
        if let Some(closed) = builder.add(reference)? {
            nodes.push(closed);
        }
    }
    nodes.push(builder.finalize()?);
    Ok(IndexChain { nodes })
}

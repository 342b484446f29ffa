//! Read-only view of an index nanopublication.
//!
//! An index is a nanopublication whose pubinfo types it `npx:NanopubIndex`
//! and whose assertion lists references:
//!
//! ```text
//! <N> npx:includesElement  <np>    (zero or more)
//! <N> npx:includesSubindex <idx>   (zero or more)
//! <N> npx:appendsIndex     <prev>  (at most one)
//! ```
//!
//! At most [`MAX_INDEX_SIZE`] element and sub-index references combined.
//! Within one node, references are held in IRI order.

use nanopub_core::vocab::{dc, npx, pav, rdfs};
use nanopub_core::{Iri, Nanopub, Term};

use crate::error::{IndexError, Result};

/// Maximum combined element and sub-index references per index document.
pub const MAX_INDEX_SIZE: usize = 1000;

/// A validated index document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NanopubIndex {
    nanopub: Nanopub,
    elements: Vec<Iri>,
    subindexes: Vec<Iri>,
    appends: Option<Iri>,
    incomplete: bool,
}

impl NanopubIndex {
    /// Whether a document is typed as an index.
    pub fn is_index(np: &Nanopub) -> bool {
        np.pubinfo_has_type(npx::NANOPUB_INDEX)
    }

    /// Interpret a nanopublication as an index.
    pub fn from_nanopub(nanopub: Nanopub) -> Result<Self> {
        if !Self::is_index(&nanopub) {
            return Err(IndexError::NotAnIndex(nanopub.uri().clone()));
        }

        let uri = nanopub.uri().clone();
        let mut elements = Vec::new();
        let mut subindexes = Vec::new();
        let mut appends = None;

        for st in nanopub.assertion().iter().filter(|st| st.subject == uri) {
            let (target, predicate) = match st.predicate.as_str() {
                npx::INCLUDES_ELEMENT => (&mut elements, npx::INCLUDES_ELEMENT),
                npx::INCLUDES_SUBINDEX => (&mut subindexes, npx::INCLUDES_SUBINDEX),
                npx::APPENDS_INDEX => {
                    let prev = reference(&uri, &st.object, npx::APPENDS_INDEX)?;
                    if appends.replace(prev).is_some() {
                        return Err(IndexError::MultipleAppends(uri.clone()));
                    }
                    continue;
                }
                _ => continue,
            };
            target.push(reference(&uri, &st.object, predicate)?);
        }

        let count = elements.len() + subindexes.len();
        if count > MAX_INDEX_SIZE {
            return Err(IndexError::CapacityExceeded { index: uri, count });
        }

        let incomplete = nanopub.pubinfo_has_type(npx::INCOMPLETE_INDEX);
        Ok(Self {
            nanopub,
            elements,
            subindexes,
            appends,
            incomplete,
        })
    }

    pub fn uri(&self) -> &Iri {
        self.nanopub.uri()
    }

    pub fn nanopub(&self) -> &Nanopub {
        &self.nanopub
    }

    pub fn into_nanopub(self) -> Nanopub {
        self.nanopub
    }

    /// Referenced nanopublications.
    pub fn elements(&self) -> &[Iri] {
        &self.elements
    }

    /// Referenced sub-indexes.
    pub fn subindexes(&self) -> &[Iri] {
        &self.subindexes
    }

    /// Combined number of element and sub-index references.
    pub fn len(&self) -> usize {
        self.elements.len() + self.subindexes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The predecessor this node extends, if any.
    pub fn appended_index(&self) -> Option<&Iri> {
        self.appends.as_ref()
    }

    /// Incomplete nodes are not meaningful without their successors.
    pub fn is_incomplete(&self) -> bool {
        self.incomplete
    }

    pub fn title(&self) -> Option<&str> {
        self.pubinfo_literal(dc::TITLE)
    }

    pub fn description(&self) -> Option<&str> {
        self.pubinfo_literal(dc::DESCRIPTION)
    }

    pub fn see_also(&self) -> Vec<&Iri> {
        self.pubinfo_iris(rdfs::SEE_ALSO)
    }

    pub fn creators(&self) -> Vec<&Iri> {
        self.pubinfo_iris(pav::CREATED_BY)
    }

    fn pubinfo_literal(&self, predicate: &str) -> Option<&str> {
        self.nanopub
            .pubinfo()
            .iter()
            .filter(|st| &st.subject == self.uri() && st.predicate.as_str() == predicate)
            .find_map(|st| st.object.as_literal())
            .map(|lit| lit.lexical())
    }

    fn pubinfo_iris(&self, predicate: &str) -> Vec<&Iri> {
        self.nanopub
            .pubinfo()
            .iter()
            .filter(|st| &st.subject == self.uri() && st.predicate.as_str() == predicate)
            .filter_map(|st| st.object.as_iri())
            .collect()
    }
}

fn reference(index: &Iri, object: &Term, predicate: &'static str) -> Result<Iri> {
    object
        .as_iri()
        .cloned()
        .ok_or_else(|| IndexError::NonIriReference {
            index: index.clone(),
            predicate,
        })
}

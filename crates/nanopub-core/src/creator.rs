//! Builder for authoring nanopublications.
//!
//! Graph IRIs are derived from the document IRI by appending `Head`,
//! `assertion`, `provenance`, and `pubinfo`.

use std::collections::BTreeMap;

use time::format_description::well_known::Rfc3339;
use time::{OffsetDateTime, UtcOffset};

use crate::error::CreatorError;
use crate::identity::{DraftNanopub, DRAFT_NAMESPACE};
use crate::nanopub::{Nanopub, ValidationMode};
use crate::term::{Iri, Literal, Statement, Term};
use crate::vocab::{dct, np, pav, rdf, xsd, ORCID_PREFIX};

const HEAD_SUFFIX: &str = "Head";
const ASSERTION_SUFFIX: &str = "assertion";
const PROVENANCE_SUFFIX: &str = "provenance";
const PUBINFO_SUFFIX: &str = "pubinfo";

type Triple = (Iri, Iri, Term);

/// Collects statements per graph and produces a validated document.
#[derive(Debug, Clone)]
pub struct NanopubCreator {
    uri: Iri,
    head_uri: Iri,
    assertion_uri: Iri,
    provenance_uri: Iri,
    pubinfo_uri: Iri,
    assertion: Vec<Triple>,
    provenance: Vec<Triple>,
    pubinfo: Vec<Triple>,
    timestamps: Vec<OffsetDateTime>,
    namespaces: BTreeMap<String, String>,
}

impl NanopubCreator {
    /// Start a document with the given IRI.
    pub fn new(uri: Iri) -> Self {
        Self {
            head_uri: uri.join(HEAD_SUFFIX),
            assertion_uri: uri.join(ASSERTION_SUFFIX),
            provenance_uri: uri.join(PROVENANCE_SUFFIX),
            pubinfo_uri: uri.join(PUBINFO_SUFFIX),
            uri,
            assertion: Vec::new(),
            provenance: Vec::new(),
            pubinfo: Vec::new(),
            timestamps: Vec::new(),
            namespaces: BTreeMap::new(),
        }
    }

    /// Start a draft document at `{DRAFT_NAMESPACE}{local}/`.
    pub fn draft(local: &str) -> Self {
        Self::new(Iri::new(format!("{}{}/", DRAFT_NAMESPACE, local)))
    }

    pub fn uri(&self) -> &Iri {
        &self.uri
    }

    pub fn assertion_uri(&self) -> &Iri {
        &self.assertion_uri
    }

    pub fn pubinfo_uri(&self) -> &Iri {
        &self.pubinfo_uri
    }

    pub fn with_head_uri(mut self, uri: Iri) -> Self {
        self.head_uri = uri;
        self
    }

    pub fn with_assertion_uri(mut self, uri: Iri) -> Self {
        self.assertion_uri = uri;
        self
    }

    pub fn with_provenance_uri(mut self, uri: Iri) -> Self {
        self.provenance_uri = uri;
        self
    }

    pub fn with_pubinfo_uri(mut self, uri: Iri) -> Self {
        self.pubinfo_uri = uri;
        self
    }

    pub fn add_assertion(mut self, s: Iri, p: Iri, o: impl Into<Term>) -> Self {
        self.assertion.push((s, p, o.into()));
        self
    }

    pub fn add_provenance(mut self, s: Iri, p: Iri, o: impl Into<Term>) -> Self {
        self.provenance.push((s, p, o.into()));
        self
    }

    /// Add a provenance statement whose subject is the assertion graph.
    pub fn add_provenance_about_assertion(self, p: Iri, o: impl Into<Term>) -> Self {
        let s = self.assertion_uri.clone();
        self.add_provenance(s, p, o)
    }

    pub fn add_pubinfo(mut self, s: Iri, p: Iri, o: impl Into<Term>) -> Self {
        self.pubinfo.push((s, p, o.into()));
        self
    }

    /// Add a pubinfo statement whose subject is the document itself.
    pub fn add_pubinfo_about_nanopub(self, p: Iri, o: impl Into<Term>) -> Self {
        let s = self.uri.clone();
        self.add_pubinfo(s, p, o)
    }

    /// Record a `dct:created` timestamp, written as UTC xsd:dateTime.
    pub fn add_timestamp(mut self, at: OffsetDateTime) -> Self {
        self.timestamps.push(at);
        self
    }

    /// Record a `pav:createdBy` creator.
    pub fn add_creator(self, creator: Iri) -> Self {
        self.add_pubinfo_about_nanopub(Iri::new(pav::CREATED_BY), creator)
    }

    /// Record a creator given as a bare ORCID identifier or ORCID IRI.
    pub fn add_creator_orcid(self, orcid: &str) -> Self {
        let iri = if orcid.starts_with(ORCID_PREFIX) {
            Iri::new(orcid)
        } else {
            Iri::new(format!("{}{}", ORCID_PREFIX, orcid))
        };
        self.add_creator(iri)
    }

    pub fn add_namespace(mut self, prefix: &str, namespace: &str) -> Self {
        self.namespaces
            .insert(prefix.to_string(), namespace.to_string());
        self
    }

    /// Number of assertion statements added so far.
    pub fn assertion_len(&self) -> usize {
        self.assertion.len()
    }

    fn collect_statements(self) -> Result<(Vec<Statement>, BTreeMap<String, String>), CreatorError> {
        let mut pubinfo = self.pubinfo;
        for at in self.timestamps {
            pubinfo.push((
                self.uri.clone(),
                Iri::new(dct::CREATED),
                xsd_date_time(at)?.into(),
            ));
        }

        let mut statements = vec![
            Statement::new(
                self.uri.clone(),
                Iri::new(rdf::TYPE),
                Iri::new(np::NANOPUBLICATION),
                self.head_uri.clone(),
            ),
            Statement::new(
                self.uri.clone(),
                Iri::new(np::HAS_ASSERTION),
                self.assertion_uri.clone(),
                self.head_uri.clone(),
            ),
            Statement::new(
                self.uri.clone(),
                Iri::new(np::HAS_PROVENANCE),
                self.provenance_uri.clone(),
                self.head_uri.clone(),
            ),
            Statement::new(
                self.uri.clone(),
                Iri::new(np::HAS_PUBLICATION_INFO),
                self.pubinfo_uri.clone(),
                self.head_uri.clone(),
            ),
        ];
        for (graph, triples) in [
            (&self.assertion_uri, self.assertion),
            (&self.provenance_uri, self.provenance),
            (&self.pubinfo_uri, pubinfo),
        ] {
            statements.extend(
                triples
                    .into_iter()
                    .map(|(s, p, o)| Statement::new(s, p, o, graph.clone())),
            );
        }
        Ok((statements, self.namespaces))
    }

    /// Finish as a validated document with the IRIs given so far.
    pub fn build(self, mode: ValidationMode) -> Result<Nanopub, CreatorError> {
        let (statements, namespaces) = self.collect_statements()?;
        Ok(Nanopub::from_statements(statements, mode)?.with_namespaces(namespaces))
    }

    /// Finish as a draft, ready for identity assignment.
    pub fn finalize(self) -> Result<DraftNanopub, CreatorError> {
        Ok(DraftNanopub::new(self.build(ValidationMode::Lenient)?)?)
    }
}

fn xsd_date_time(at: OffsetDateTime) -> Result<Literal, CreatorError> {
    let text = at
        .to_offset(UtcOffset::UTC)
        .format(&Rfc3339)
        .map_err(|e| CreatorError::Timestamp(e.to_string()))?;
    Ok(Literal::typed(text, Iri::new(xsd::DATE_TIME)))
}

//! The four-graph nanopublication model.
//!
//! A nanopublication `N` is a set of quads spread over four named graphs:
//! head `H`, assertion `A`, provenance `P`, and publication info `I`. The
//! head holds exactly one `N rdf:type np:Nanopublication` statement and one
//! pointer each to `A`, `P`, `I`.
//!
//! Parsing is a pure function of the input statements:
//!
//! 1. locate the unique type statement to fix `N` and `H`;
//! 2. locate the three graph pointers attached to `N` in `H`;
//! 3. bucket every statement by graph IRI.
//!
//! What happens to statements in graphs other than the four is governed by
//! [`ValidationMode`].

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::error::{GraphRole, MalformedNanopub, Result};
use crate::identity::ArtifactCode;
use crate::term::{Iri, Statement, Term};
use crate::vocab::{np, rdf};

/// How strictly [`Nanopub::from_statements`] checks its input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ValidationMode {
    /// Statements in unknown graphs are dropped without error.
    #[default]
    Lenient,
    /// Additionally reject unknown graphs, empty assertion/provenance/pubinfo
    /// graphs, provenance that never mentions `A`, and pubinfo that never
    /// mentions `N`.
    Strict,
}

/// A validated nanopublication.
///
/// Equality covers the document IRI and the four statement sets. Namespace
/// prefixes are presentation hints and do not take part.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Nanopub {
    uri: Iri,
    head_uri: Iri,
    assertion_uri: Iri,
    provenance_uri: Iri,
    pubinfo_uri: Iri,
    head: BTreeSet<Statement>,
    assertion: BTreeSet<Statement>,
    provenance: BTreeSet<Statement>,
    pubinfo: BTreeSet<Statement>,
    namespaces: BTreeMap<String, String>,
}

impl PartialEq for Nanopub {
    fn eq(&self, other: &Self) -> bool {
        self.uri == other.uri
            && self.head == other.head
            && self.assertion == other.assertion
            && self.provenance == other.provenance
            && self.pubinfo == other.pubinfo
    }
}

impl Eq for Nanopub {}

impl Nanopub {
    /// Parse a statement multiset into a nanopublication.
    pub fn from_statements(
        statements: impl IntoIterator<Item = Statement>,
        mode: ValidationMode,
    ) -> Result<Self> {
        let statements: BTreeSet<Statement> = statements.into_iter().collect();
        if statements.is_empty() {
            return Err(MalformedNanopub::NoContent);
        }

        let (uri, head_uri) = find_type_statement(&statements)?;
        let pointers = GraphPointers::collect(&statements, &uri, &head_uri)?;
        let assertion_uri = pointers.require(GraphRole::Assertion, &uri)?;
        let provenance_uri = pointers.require(GraphRole::Provenance, &uri)?;
        let pubinfo_uri = pointers.require(GraphRole::Pubinfo, &uri)?;

        let mut seen = BTreeSet::new();
        for g in [&head_uri, &assertion_uri, &provenance_uri, &pubinfo_uri] {
            if !seen.insert(g) {
                return Err(MalformedNanopub::DuplicateGraphUri(g.clone()));
            }
        }
        if seen.contains(&uri) {
            return Err(MalformedNanopub::UriIsGraph(uri));
        }

        let mut np = Nanopub {
            uri,
            head_uri,
            assertion_uri,
            provenance_uri,
            pubinfo_uri,
            head: BTreeSet::new(),
            assertion: BTreeSet::new(),
            provenance: BTreeSet::new(),
            pubinfo: BTreeSet::new(),
            namespaces: BTreeMap::new(),
        };

        for st in statements {
            let bucket = if st.graph == np.head_uri {
                &mut np.head
            } else if st.graph == np.assertion_uri {
                &mut np.assertion
            } else if st.graph == np.provenance_uri {
                &mut np.provenance
            } else if st.graph == np.pubinfo_uri {
                &mut np.pubinfo
            } else {
                match mode {
                    ValidationMode::Lenient => continue,
                    ValidationMode::Strict => {
                        return Err(MalformedNanopub::DisconnectedGraph(st.graph))
                    }
                }
            };
            bucket.insert(st);
        }

        if mode == ValidationMode::Strict {
            np.check_strict()?;
        }
        Ok(np)
    }

    fn check_strict(&self) -> Result<()> {
        if self.assertion.is_empty() {
            return Err(MalformedNanopub::EmptyGraph {
                role: GraphRole::Assertion,
                graph: self.assertion_uri.clone(),
            });
        }
        if self.provenance.is_empty() {
            return Err(MalformedNanopub::EmptyGraph {
                role: GraphRole::Provenance,
                graph: self.provenance_uri.clone(),
            });
        }
        if !mentions(&self.provenance, &self.assertion_uri) {
            return Err(MalformedNanopub::ProvenanceUnlinked(
                self.provenance_uri.clone(),
            ));
        }
        if self.pubinfo.is_empty() {
            return Err(MalformedNanopub::EmptyGraph {
                role: GraphRole::Pubinfo,
                graph: self.pubinfo_uri.clone(),
            });
        }
        if !mentions(&self.pubinfo, &self.uri) {
            return Err(MalformedNanopub::PubinfoUnlinked(self.pubinfo_uri.clone()));
        }
        Ok(())
    }

    /// Attach namespace prefix hints.
    pub fn with_namespaces(mut self, namespaces: BTreeMap<String, String>) -> Self {
        self.namespaces = namespaces;
        self
    }

    pub fn uri(&self) -> &Iri {
        &self.uri
    }

    pub fn head_uri(&self) -> &Iri {
        &self.head_uri
    }

    pub fn assertion_uri(&self) -> &Iri {
        &self.assertion_uri
    }

    pub fn provenance_uri(&self) -> &Iri {
        &self.provenance_uri
    }

    pub fn pubinfo_uri(&self) -> &Iri {
        &self.pubinfo_uri
    }

    pub fn head(&self) -> &BTreeSet<Statement> {
        &self.head
    }

    pub fn assertion(&self) -> &BTreeSet<Statement> {
        &self.assertion
    }

    pub fn provenance(&self) -> &BTreeSet<Statement> {
        &self.provenance
    }

    pub fn pubinfo(&self) -> &BTreeSet<Statement> {
        &self.pubinfo
    }

    /// Namespace prefix → namespace IRI.
    pub fn namespaces(&self) -> &BTreeMap<String, String> {
        &self.namespaces
    }

    /// The statements of one graph role.
    pub fn graph(&self, role: GraphRole) -> &BTreeSet<Statement> {
        match role {
            GraphRole::Head => &self.head,
            GraphRole::Assertion => &self.assertion,
            GraphRole::Provenance => &self.provenance,
            GraphRole::Pubinfo => &self.pubinfo,
        }
    }

    /// All statements, head first, then assertion, provenance, pubinfo.
    pub fn statements(&self) -> impl Iterator<Item = &Statement> {
        self.head
            .iter()
            .chain(&self.assertion)
            .chain(&self.provenance)
            .chain(&self.pubinfo)
    }

    /// Total number of statements across the four graphs.
    pub fn len(&self) -> usize {
        self.head.len() + self.assertion.len() + self.provenance.len() + self.pubinfo.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The artifact code at the tail of the document IRI, if it has one.
    pub fn artifact_code(&self) -> Option<ArtifactCode> {
        ArtifactCode::extract(&self.uri).map(|(_, code)| code)
    }

    /// Whether the pubinfo graph types `N` with the given class.
    pub fn pubinfo_has_type(&self, class: &str) -> bool {
        self.pubinfo.iter().any(|st| {
            st.subject == self.uri && st.predicate.as_str() == rdf::TYPE && st.object.is_iri(class)
        })
    }

    /// Consume into the flat statement set.
    pub fn into_statements(self) -> BTreeSet<Statement> {
        let mut all = self.head;
        all.extend(self.assertion);
        all.extend(self.provenance);
        all.extend(self.pubinfo);
        all
    }
}

fn mentions(graph: &BTreeSet<Statement>, iri: &Iri) -> bool {
    graph
        .iter()
        .any(|st| &st.subject == iri || st.object.as_iri() == Some(iri))
}

fn find_type_statement(statements: &BTreeSet<Statement>) -> Result<(Iri, Iri)> {
    let mut found: Option<(Iri, Iri)> = None;
    for st in statements {
        if st.predicate.as_str() == rdf::TYPE && st.object.is_iri(np::NANOPUBLICATION) {
            if let Some((first, _)) = &found {
                return Err(MalformedNanopub::DuplicateType {
                    first: first.clone(),
                    second: st.subject.clone(),
                });
            }
            found = Some((st.subject.clone(), st.graph.clone()));
        }
    }
    found.ok_or(MalformedNanopub::MissingType)
}

#[derive(Default)]
struct GraphPointers(HashMap<GraphRole, Iri>);

impl GraphPointers {
    fn collect(statements: &BTreeSet<Statement>, uri: &Iri, head_uri: &Iri) -> Result<Self> {
        let mut pointers = GraphPointers::default();
        for st in statements {
            if &st.graph != head_uri || &st.subject != uri {
                continue;
            }
            let role = match st.predicate.as_str() {
                np::HAS_ASSERTION => GraphRole::Assertion,
                np::HAS_PROVENANCE => GraphRole::Provenance,
                np::HAS_PUBLICATION_INFO => GraphRole::Pubinfo,
                _ => continue,
            };
            let target = match &st.object {
                Term::Iri(iri) => iri.clone(),
                Term::Literal(_) => {
                    return Err(MalformedNanopub::GraphPointerNotIri {
                        role,
                        nanopub: uri.clone(),
                    })
                }
            };
            if let Some(first) = pointers.0.get(&role) {
                return Err(MalformedNanopub::DuplicateGraph {
                    role,
                    first: first.clone(),
                    second: target,
                });
            }
            pointers.0.insert(role, target);
        }
        Ok(pointers)
    }

    fn require(&self, role: GraphRole, uri: &Iri) -> Result<Iri> {
        self.0
            .get(&role)
            .cloned()
            .ok_or_else(|| MalformedNanopub::MissingGraph {
                role,
                nanopub: uri.clone(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term::Literal;

    const N: &str = "http://example.org/np1";

    fn iri(s: &str) -> Iri {
        Iri::new(s)
    }

    fn g(suffix: &str) -> Iri {
        iri(&format!("{}#{}", N, suffix))
    }

    fn head_statements() -> Vec<Statement> {
        vec![
            Statement::new(iri(N), iri(rdf::TYPE), iri(np::NANOPUBLICATION), g("Head")),
            Statement::new(iri(N), iri(np::HAS_ASSERTION), g("assertion"), g("Head")),
            Statement::new(iri(N), iri(np::HAS_PROVENANCE), g("provenance"), g("Head")),
            Statement::new(iri(N), iri(np::HAS_PUBLICATION_INFO), g("pubinfo"), g("Head")),
        ]
    }

    fn full_statements() -> Vec<Statement> {
        let mut sts = head_statements();
        sts.push(Statement::new(
            iri("http://example.org/x"),
            iri("http://example.org/p"),
            Literal::plain("y"),
            g("assertion"),
        ));
        sts.push(Statement::new(
            g("assertion"),
            iri("http://example.org/by"),
            iri("http://example.org/alice"),
            g("provenance"),
        ));
        sts.push(Statement::new(
            iri(N),
            iri("http://example.org/created"),
            Literal::plain("today"),
            g("pubinfo"),
        ));
        sts
    }

    #[test]
    fn test_parse_well_formed() {
        let np = Nanopub::from_statements(full_statements(), ValidationMode::Strict).unwrap();
        assert_eq!(np.uri().as_str(), N);
        assert_eq!(np.head().len(), 4);
        assert_eq!(np.assertion().len(), 1);
        assert_eq!(np.provenance().len(), 1);
        assert_eq!(np.pubinfo().len(), 1);
        assert_eq!(np.len(), 7);
    }

    #[test]
    fn test_no_content() {
        let result = Nanopub::from_statements(Vec::new(), ValidationMode::Lenient);
        assert!(matches!(result, Err(MalformedNanopub::NoContent)));
    }

    #[test]
    fn test_missing_type() {
        let sts: Vec<_> = full_statements().into_iter().skip(1).collect();
        let result = Nanopub::from_statements(sts, ValidationMode::Lenient);
        assert!(matches!(result, Err(MalformedNanopub::MissingType)));
    }

    #[test]
    fn test_two_type_statements() {
        let mut sts = full_statements();
        sts.push(Statement::new(
            iri("http://example.org/np2"),
            iri(rdf::TYPE),
            iri(np::NANOPUBLICATION),
            g("Head"),
        ));
        let result = Nanopub::from_statements(sts, ValidationMode::Lenient);
        assert!(matches!(result, Err(MalformedNanopub::DuplicateType { .. })));
    }

    #[test]
    fn test_each_pointer_required() {
        for (skip, role) in [
            (1, GraphRole::Assertion),
            (2, GraphRole::Provenance),
            (3, GraphRole::Pubinfo),
        ] {
            let sts: Vec<_> = full_statements()
                .into_iter()
                .enumerate()
                .filter(|(i, _)| *i != skip)
                .map(|(_, st)| st)
                .collect();
            let result = Nanopub::from_statements(sts, ValidationMode::Lenient);
            assert_eq!(
                result,
                Err(MalformedNanopub::MissingGraph {
                    role,
                    nanopub: iri(N)
                })
            );
        }
    }

    #[test]
    fn test_duplicate_pointer() {
        let mut sts = full_statements();
        sts.push(Statement::new(iri(N), iri(np::HAS_PROVENANCE), g("prov2"), g("Head")));
        let result = Nanopub::from_statements(sts, ValidationMode::Lenient);
        assert!(matches!(
            result,
            Err(MalformedNanopub::DuplicateGraph {
                role: GraphRole::Provenance,
                ..
            })
        ));
    }

    #[test]
    fn test_pointer_must_be_iri() {
        let mut sts = head_statements();
        sts[1] = Statement::new(iri(N), iri(np::HAS_ASSERTION), Literal::plain("a"), g("Head"));
        let result = Nanopub::from_statements(sts, ValidationMode::Lenient);
        assert!(matches!(
            result,
            Err(MalformedNanopub::GraphPointerNotIri { .. })
        ));
    }

    #[test]
    fn test_shared_graph_uri_rejected() {
        let mut sts = head_statements();
        sts[2] = Statement::new(iri(N), iri(np::HAS_PROVENANCE), g("assertion"), g("Head"));
        let result = Nanopub::from_statements(sts, ValidationMode::Lenient);
        assert_eq!(result, Err(MalformedNanopub::DuplicateGraphUri(g("assertion"))));
    }

    #[test]
    fn test_uri_equal_to_graph_rejected() {
        let mut sts = head_statements();
        sts[3] = Statement::new(iri(N), iri(np::HAS_PUBLICATION_INFO), iri(N), g("Head"));
        let result = Nanopub::from_statements(sts, ValidationMode::Lenient);
        assert_eq!(result, Err(MalformedNanopub::UriIsGraph(iri(N))));
    }

    #[test]
    fn test_unknown_graph_lenient_drops() {
        let mut sts = full_statements();
        sts.push(Statement::new(
            iri("http://example.org/x"),
            iri("http://example.org/p"),
            Literal::plain("stray"),
            iri("http://example.org/other"),
        ));
        let np = Nanopub::from_statements(sts, ValidationMode::Lenient).unwrap();
        assert_eq!(np.len(), 7);
        assert!(np
            .statements()
            .all(|st| st.graph.as_str() != "http://example.org/other"));
    }

    #[test]
    fn test_unknown_graph_strict_rejects() {
        let mut sts = full_statements();
        sts.push(Statement::new(
            iri("http://example.org/x"),
            iri("http://example.org/p"),
            Literal::plain("stray"),
            iri("http://example.org/other"),
        ));
        let result = Nanopub::from_statements(sts, ValidationMode::Strict);
        assert_eq!(
            result,
            Err(MalformedNanopub::DisconnectedGraph(iri("http://example.org/other")))
        );
    }

    #[test]
    fn test_strict_requires_linked_provenance() {
        let mut sts = full_statements();
        sts[5] = Statement::new(
            iri("http://example.org/x"),
            iri("http://example.org/by"),
            iri("http://example.org/alice"),
            g("provenance"),
        );
        let lenient = Nanopub::from_statements(sts.clone(), ValidationMode::Lenient);
        assert!(lenient.is_ok());
        let strict = Nanopub::from_statements(sts, ValidationMode::Strict);
        assert_eq!(strict, Err(MalformedNanopub::ProvenanceUnlinked(g("provenance"))));
    }

    #[test]
    fn test_strict_requires_non_empty_assertion() {
        let sts: Vec<_> = full_statements()
            .into_iter()
            .filter(|st| st.graph != g("assertion"))
            .collect();
        let result = Nanopub::from_statements(sts, ValidationMode::Strict);
        assert!(matches!(
            result,
            Err(MalformedNanopub::EmptyGraph {
                role: GraphRole::Assertion,
                ..
            })
        ));
    }

    #[test]
    fn test_equality_ignores_namespaces_and_order() {
        let a = Nanopub::from_statements(full_statements(), ValidationMode::Lenient).unwrap();
        let mut reversed = full_statements();
        reversed.reverse();
        let mut ns = BTreeMap::new();
        ns.insert("ex".to_string(), "http://example.org/".to_string());
        let b = Nanopub::from_statements(reversed, ValidationMode::Lenient)
            .unwrap()
            .with_namespaces(ns);
        assert_eq!(a, b);
    }
}

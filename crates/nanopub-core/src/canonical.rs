//! Canonical serialization and the artifact-code hasher.
//!
//! The canonical form is independent of statement order and duplicates:
//!
//! - every occurrence of the placeholder token inside an IRI becomes a single space
//! - each quad is rendered as four lines: graph, subject, predicate, object
//! - literal objects render as `@lang lexical` or `^datatype lexical`
//! - quads are sorted by their rendered lines and deduplicated
//!
//! Backslashes and newlines in literals are escaped so that every quad is
//! exactly four lines long.
//!
//! This line format belongs to this crate. It is not the trusty-URI RDF
//! hash used by the deployed nanopub services (for one, sorting by rendered
//! lines puts literal objects before IRI objects), so codes minted here do
//! not match artifact codes minted elsewhere, and documents minted elsewhere
//! fail [`IdentityTransform::check`](crate::IdentityTransform::check).

use sha2::{Digest, Sha256};
use std::collections::BTreeSet;

use crate::identity::ArtifactCode;
use crate::term::{Iri, Statement, Term};

/// Produces an artifact code from a placeholder-normalized statement set.
///
/// Implementations must depend only on statement content (not order) and
/// must be stable across processes.
pub trait Canonicalizer: Send + Sync {
    fn artifact_code(&self, statements: &[Statement], placeholder: &str) -> ArtifactCode;
}

/// SHA-256 over [`canonical_bytes`], rendered as `RA` + unpadded base64url.
#[derive(Debug, Clone, Copy, Default)]
pub struct RdfHasher;

impl Canonicalizer for RdfHasher {
    fn artifact_code(&self, statements: &[Statement], placeholder: &str) -> ArtifactCode {
        let digest: [u8; 32] = Sha256::digest(canonical_bytes(statements, placeholder)).into();
        ArtifactCode::from_digest(&digest)
    }
}

/// Render a statement set into its canonical byte form.
pub fn canonical_bytes(statements: &[Statement], placeholder: &str) -> Vec<u8> {
    let quads: BTreeSet<[String; 4]> = statements
        .iter()
        .map(|st| {
            [
                render_iri(&st.graph, placeholder),
                render_iri(&st.subject, placeholder),
                render_iri(&st.predicate, placeholder),
                render_object(&st.object, placeholder),
            ]
        })
        .collect();

    let mut buf = Vec::new();
    for quad in &quads {
        for line in quad {
            buf.extend_from_slice(line.as_bytes());
            buf.push(b'\n');
        }
    }
    buf
}

fn render_iri(iri: &Iri, placeholder: &str) -> String {
    if placeholder.is_empty() {
        return iri.as_str().to_owned();
    }
    iri.as_str().replace(placeholder, " ")
}

fn render_object(term: &Term, placeholder: &str) -> String {
    match term {
        Term::Iri(iri) => render_iri(iri, placeholder),
        Term::Literal(lit) => match lit.language() {
            Some(lang) => format!("@{} {}", lang, escape(lit.lexical())),
            None => format!("^{} {}", lit.datatype(), escape(lit.lexical())),
        },
    }
}

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('\n', "\\n")
}

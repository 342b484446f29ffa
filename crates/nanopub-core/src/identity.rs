//! Content-derived identifiers.
//!
//! A nanopublication is authored under a draft IRI `D` in the reserved
//! [`DRAFT_NAMESPACE`]. Assigning its identity happens in three steps:
//!
//! ```text
//! D[/rest]                    draft
//!   -> {base}PLACEHOLDER[/rest]   normalized, hashed by the canonicalizer
//!   -> {base}{code}[/rest]        final
//! ```
//!
//! Because the hash input already contains the position of the document's
//! own IRI (as the placeholder), a verifier can recompute the code by
//! running the inverse substitution on the final document.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

use crate::canonical::{Canonicalizer, RdfHasher};
use crate::error::IdentityError;
use crate::nanopub::{Nanopub, ValidationMode};
use crate::term::{Iri, Statement, Term};

/// Reserved namespace for draft nanopublication IRIs.
pub const DRAFT_NAMESPACE: &str = "http://purl.org/nanopub/temp/";

/// Token standing in for the artifact code before it is known.
pub const PLACEHOLDER: &str = "ARTIFACTCODE-PLACEHOLDER";

/// Default namespace final identifiers are minted under.
pub const DEFAULT_BASE: &str = "http://purl.org/np/";

/// Module prefix of the artifact codes this crate produces.
pub const ARTIFACT_CODE_PREFIX: &str = "RA";

/// Length of an artifact code: prefix plus 43 base64url characters.
pub const ARTIFACT_CODE_LEN: usize = 45;

/// The digest token at the tail of a content-addressed IRI.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ArtifactCode(String);

impl ArtifactCode {
    /// Validate a candidate code.
    pub fn parse(s: &str) -> Result<Self, IdentityError> {
        let valid = s.len() == ARTIFACT_CODE_LEN
            && s.starts_with(ARTIFACT_CODE_PREFIX)
            && s.bytes().all(is_base64url);
        if valid {
            Ok(Self(s.to_owned()))
        } else {
            Err(IdentityError::InvalidArtifactCode(s.to_owned()))
        }
    }

    /// Render a SHA-256 digest.
    pub fn from_digest(digest: &[u8; 32]) -> Self {
        Self(format!(
            "{}{}",
            ARTIFACT_CODE_PREFIX,
            URL_SAFE_NO_PAD.encode(digest)
        ))
    }

    /// Split a content-addressed IRI into `(prefix, code)`.
    ///
    /// Returns `None` when the IRI does not end in a well-formed code or
    /// has nothing in front of it.
    pub fn extract(iri: &Iri) -> Option<(&str, ArtifactCode)> {
        let s = iri.as_str();
        let split = s.len().checked_sub(ARTIFACT_CODE_LEN)?;
        if split == 0 || !s.is_char_boundary(split) {
            return None;
        }
        let (prefix, tail) = s.split_at(split);
        ArtifactCode::parse(tail).ok().map(|code| (prefix, code))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn is_base64url(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_'
}

impl fmt::Debug for ArtifactCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ArtifactCode({})", self.0)
    }
}

impl fmt::Display for ArtifactCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A nanopublication that has not been given its identity yet.
///
/// The document IRI lies in [`DRAFT_NAMESPACE`] and every graph IRI starts
/// with the document IRI. Consumed by [`IdentityTransform::assign`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftNanopub(Nanopub);

impl DraftNanopub {
    pub fn new(nanopub: Nanopub) -> Result<Self, IdentityError> {
        let uri = nanopub.uri();
        if !uri.starts_with(DRAFT_NAMESPACE) {
            return Err(IdentityError::NotDraft(uri.clone()));
        }
        for graph in [
            nanopub.head_uri(),
            nanopub.assertion_uri(),
            nanopub.provenance_uri(),
            nanopub.pubinfo_uri(),
        ] {
            if !graph.starts_with(uri.as_str()) {
                return Err(IdentityError::GraphOutsideNamespace {
                    graph: graph.clone(),
                    nanopub: uri.clone(),
                });
            }
        }
        check_reserved_iris(&nanopub)?;
        Ok(Self(nanopub))
    }

    pub fn nanopub(&self) -> &Nanopub {
        &self.0
    }

    pub fn uri(&self) -> &Iri {
        self.0.uri()
    }

    pub fn into_inner(self) -> Nanopub {
        self.0
    }

    /// Add statements to the pubinfo graph, re-validating the structure.
    pub fn extend_pubinfo(
        self,
        statements: impl IntoIterator<Item = (Iri, Iri, Term)>,
    ) -> Result<Self, IdentityError> {
        let pubinfo_uri = self.0.pubinfo_uri().clone();
        let namespaces = self.0.namespaces().clone();
        let mut all = self.0.into_statements();
        all.extend(
            statements
                .into_iter()
                .map(|(s, p, o)| Statement::new(s, p, o, pubinfo_uri.clone())),
        );
        let np = Nanopub::from_statements(all, ValidationMode::Lenient)?;
        Self::new(np.with_namespaces(namespaces))
    }
}

/// Configuration for identity assignment.
#[derive(Debug, Clone)]
pub struct IdentityConfig {
    /// Namespace final identifiers are minted under.
    pub base_iri: String,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            base_iri: DEFAULT_BASE.to_string(),
        }
    }
}

/// Assigns and verifies content-derived identifiers.
///
/// Stateless apart from its configuration; safe to share between threads.
#[derive(Debug, Clone)]
pub struct IdentityTransform<C = RdfHasher> {
    canonicalizer: C,
    base: String,
}

impl IdentityTransform<RdfHasher> {
    pub fn new(config: IdentityConfig) -> Self {
        Self::with_canonicalizer(RdfHasher, config)
    }
}

impl Default for IdentityTransform<RdfHasher> {
    fn default() -> Self {
        Self::new(IdentityConfig::default())
    }
}

impl<C: Canonicalizer> IdentityTransform<C> {
    pub fn with_canonicalizer(canonicalizer: C, config: IdentityConfig) -> Self {
        Self {
            canonicalizer,
            base: config.base_iri,
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    fn placeholder_prefix(&self) -> String {
        format!("{}{}", self.base, PLACEHOLDER)
    }

    /// Map one draft IRI to its placeholder form.
    fn normalize_draft_iri(&self, draft: &Iri, iri: &Iri) -> Result<Iri, IdentityError> {
        if let Some(rest) = iri.as_str().strip_prefix(draft.as_str()) {
            let rest = rest.trim_start_matches(['/', '#']);
            let prefix = self.placeholder_prefix();
            return Ok(if rest.is_empty() {
                Iri::new(prefix)
            } else {
                Iri::new(format!("{}/{}", prefix, rest))
            });
        }
        if iri.starts_with(DRAFT_NAMESPACE) {
            return Err(IdentityError::UnmappableDraftIri(iri.clone()));
        }
        Ok(iri.clone())
    }

    /// Placeholder-normalize a selection of draft statements.
    pub fn normalize_draft<'a>(
        &self,
        draft: &DraftNanopub,
        statements: impl IntoIterator<Item = &'a Statement>,
    ) -> Result<Vec<Statement>, IdentityError> {
        statements
            .into_iter()
            .map(|st| st.try_map_iris(|iri| self.normalize_draft_iri(draft.uri(), iri)))
            .collect()
    }

    /// Give a draft its content-derived identity.
    ///
    /// Consumes the draft: a document either stays a draft or becomes final.
    pub fn assign(&self, draft: DraftNanopub) -> Result<Nanopub, IdentityError> {
        let normalized = self.normalize_draft(&draft, draft.nanopub().statements())?;
        let code = self.canonicalizer.artifact_code(&normalized, PLACEHOLDER);

        let from = self.placeholder_prefix();
        let to = format!("{}{}", self.base, code);
        let finished: Vec<Statement> = normalized
            .iter()
            .map(|st| {
                st.try_map_iris(|iri| {
                    let out = swap_prefix(iri, &from, &to);
                    if out.starts_with(DRAFT_NAMESPACE) {
                        Err(IdentityError::LeftoverDraftIri(out))
                    } else {
                        Ok(out)
                    }
                })
            })
            .collect::<Result<_, _>>()?;

        let mut namespaces = BTreeMap::new();
        for (prefix, ns) in draft.nanopub().namespaces() {
            let ns = self.normalize_draft_iri(draft.uri(), &Iri::new(ns.as_str()))?;
            namespaces.insert(prefix.clone(), swap_prefix(&ns, &from, &to).into_string());
        }

        let np = Nanopub::from_statements(finished, ValidationMode::Lenient)?;
        Ok(np.with_namespaces(namespaces))
    }

    /// Recompute the artifact code of a final document.
    ///
    /// Returns the code on success, [`IdentityError::Mismatch`] when the
    /// content does not hash to the claimed code, and
    /// [`IdentityError::NotContentAddressed`] (without hashing) when the
    /// document IRI carries no recognizable code.
    pub fn check(&self, nanopub: &Nanopub) -> Result<ArtifactCode, IdentityError> {
        let (claimed, normalized) = normalize_final(nanopub, nanopub.statements())?;
        let recomputed = self.canonicalizer.artifact_code(&normalized, PLACEHOLDER);
        if recomputed == claimed {
            Ok(claimed)
        } else {
            Err(IdentityError::Mismatch {
                claimed,
                recomputed,
            })
        }
    }

    /// Whether the document's content matches its claimed identifier.
    pub fn verify(&self, nanopub: &Nanopub) -> bool {
        self.check(nanopub).is_ok()
    }
}

/// Placeholder-normalize a selection of statements of a final document.
///
/// Returns the claimed artifact code alongside the normalized statements.
pub fn normalize_final<'a>(
    nanopub: &Nanopub,
    statements: impl IntoIterator<Item = &'a Statement>,
) -> Result<(ArtifactCode, Vec<Statement>), IdentityError> {
    let (prefix, code) = ArtifactCode::extract(nanopub.uri())
        .ok_or_else(|| IdentityError::NotContentAddressed(nanopub.uri().clone()))?;
    check_reserved_iris(nanopub)?;
    let from = format!("{}{}", prefix, code);
    let to = format!("{}{}", prefix, PLACEHOLDER);
    let normalized: Vec<Statement> = statements
        .into_iter()
        .map(|st| {
            st.try_map_iris(|iri| Ok::<_, IdentityError>(swap_prefix(iri, &from, &to)))
        })
        .collect::<Result<_, _>>()?;
    Ok((code, normalized))
}

/// Normalized IRIs render the placeholder as a single space, so input
/// IRIs may contain neither the placeholder token nor whitespace.
fn check_reserved_iris(nanopub: &Nanopub) -> Result<(), IdentityError> {
    let reserved = |iri: &str| iri.contains(PLACEHOLDER) || iri.contains(char::is_whitespace);
    for iri in nanopub.statements().flat_map(|st| st.iris()) {
        if reserved(iri.as_str()) {
            return Err(IdentityError::ReservedIri(iri.clone()));
        }
    }
    for ns in nanopub.namespaces().values() {
        if reserved(ns) {
            return Err(IdentityError::ReservedIri(Iri::new(ns.as_str())));
        }
    }
    Ok(())
}

/// Replace `from` with `to` when `from` is a whole path segment prefix:
/// followed by nothing, `/`, or `#`.
fn swap_prefix(iri: &Iri, from: &str, to: &str) -> Iri {
    match iri.as_str().strip_prefix(from) {
        Some(rest) if rest.is_empty() || rest.starts_with(['/', '#']) => {
            Iri::new(format!("{}{}", to, rest))
        }
        _ => iri.clone(),
    }
}

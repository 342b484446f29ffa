//! RDF terms and quads.
//!
//! Only IRIs and literals are modelled. Blank nodes never appear in a
//! content-addressed nanopublication, so there is no variant for them.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::vocab::{rdf, xsd};

/// An absolute IRI.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Iri(String);

impl Iri {
    /// Wrap an IRI string without checking it.
    pub fn new(iri: impl Into<String>) -> Self {
        Self(iri.into())
    }

    /// The IRI as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume into the owned string.
    pub fn into_string(self) -> String {
        self.0
    }

    /// Whether this IRI begins with the given prefix.
    pub fn starts_with(&self, prefix: &str) -> bool {
        self.0.starts_with(prefix)
    }

    /// Append a suffix, producing a new IRI.
    pub fn join(&self, suffix: &str) -> Self {
        Self(format!("{}{}", self.0, suffix))
    }

    /// Split into (namespace, local name) at the last `/` or `#`.
    ///
    /// Returns `None` when the separator is the final character or absent.
    pub fn split_namespace(&self) -> Option<(&str, &str)> {
        let idx = self.0.rfind(['/', '#'])?;
        if idx + 1 >= self.0.len() {
            return None;
        }
        Some(self.0.split_at(idx + 1))
    }
}

impl fmt::Debug for Iri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.0)
    }
}

impl fmt::Display for Iri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Iri {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Iri {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for Iri {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// An RDF literal.
///
/// A plain string literal is stored with `datatype == None`; an explicit
/// `xsd:string` datatype is normalized to the same representation so the
/// two compare equal. Language-tagged literals never carry a datatype.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Literal {
    lexical: String,
    datatype: Option<Iri>,
    language: Option<String>,
}

impl Literal {
    /// A plain `xsd:string` literal.
    pub fn plain(lexical: impl Into<String>) -> Self {
        Self {
            lexical: lexical.into(),
            datatype: None,
            language: None,
        }
    }

    /// A typed literal.
    pub fn typed(lexical: impl Into<String>, datatype: Iri) -> Self {
        let datatype = (datatype.as_str() != xsd::STRING).then_some(datatype);
        Self {
            lexical: lexical.into(),
            datatype,
            language: None,
        }
    }

    /// A language-tagged literal. Tags are stored lowercased.
    pub fn lang(lexical: impl Into<String>, language: &str) -> Self {
        Self {
            lexical: lexical.into(),
            datatype: None,
            language: Some(language.to_ascii_lowercase()),
        }
    }

    /// The lexical form.
    pub fn lexical(&self) -> &str {
        &self.lexical
    }

    /// The datatype IRI string, defaulting per RDF 1.1.
    pub fn datatype(&self) -> &str {
        match (&self.datatype, &self.language) {
            (Some(dt), _) => dt.as_str(),
            (None, Some(_)) => rdf::LANG_STRING,
            (None, None) => xsd::STRING,
        }
    }

    /// The language tag, if any.
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }
}

impl fmt::Debug for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.lexical)?;
        if let Some(lang) = &self.language {
            write!(f, "@{}", lang)
        } else if let Some(dt) = &self.datatype {
            write!(f, "^^{:?}", dt)
        } else {
            Ok(())
        }
    }
}

/// The object position of a statement.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Term {
    Iri(Iri),
    Literal(Literal),
}

impl Term {
    /// The IRI, if this term is one.
    pub fn as_iri(&self) -> Option<&Iri> {
        match self {
            Term::Iri(iri) => Some(iri),
            Term::Literal(_) => None,
        }
    }

    /// The literal, if this term is one.
    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Term::Iri(_) => None,
            Term::Literal(lit) => Some(lit),
        }
    }

    /// Whether this term is exactly the given IRI.
    pub fn is_iri(&self, iri: &str) -> bool {
        matches!(self, Term::Iri(i) if i.as_str() == iri)
    }
}

impl fmt::Debug for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Iri(iri) => fmt::Debug::fmt(iri, f),
            Term::Literal(lit) => fmt::Debug::fmt(lit, f),
        }
    }
}

impl From<Iri> for Term {
    fn from(iri: Iri) -> Self {
        Term::Iri(iri)
    }
}

impl From<Literal> for Term {
    fn from(lit: Literal) -> Self {
        Term::Literal(lit)
    }
}

/// A (subject, predicate, object, graph) quad.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Statement {
    pub subject: Iri,
    pub predicate: Iri,
    pub object: Term,
    pub graph: Iri,
}

impl Statement {
    pub fn new(subject: Iri, predicate: Iri, object: impl Into<Term>, graph: Iri) -> Self {
        Self {
            subject,
            predicate,
            object: object.into(),
            graph,
        }
    }

    /// Rewrite every IRI position (subject, predicate, IRI object, graph).
    ///
    /// Literals are left untouched.
    pub fn try_map_iris<E>(
        &self,
        mut f: impl FnMut(&Iri) -> Result<Iri, E>,
    ) -> Result<Statement, E> {
        let object = match &self.object {
            Term::Iri(iri) => Term::Iri(f(iri)?),
            Term::Literal(lit) => Term::Literal(lit.clone()),
        };
        Ok(Statement {
            subject: f(&self.subject)?,
            predicate: f(&self.predicate)?,
            object,
            graph: f(&self.graph)?,
        })
    }

    /// Iterate over the IRIs this statement mentions.
    pub fn iris(&self) -> impl Iterator<Item = &Iri> {
        [&self.subject, &self.predicate, &self.graph]
            .into_iter()
            .chain(self.object.as_iri())
    }
}

impl fmt::Debug for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?} {:?} {:?} {:?}",
            self.subject, self.predicate, self.object, self.graph
        )
    }
}

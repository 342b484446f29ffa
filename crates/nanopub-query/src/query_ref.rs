//! Query references.
//!
//! A query is named by the artifact code of the nanopublication that
//! defines it plus a local name, e.g.
//! `RA3qSfVzcnAeMOODdpgCg4e-bX6KjZYZ2JQXDsSwluMaI/get-newer-versions-of-np`.
//! Parameters form a multimap and are always rendered sorted by key, then
//! by value, so equal parameter sets give equal query strings.

use std::fmt;

use url::{form_urlencoded, Url};

use nanopub_core::identity::{ARTIFACT_CODE_LEN, ARTIFACT_CODE_PREFIX};

use crate::error::{QueryError, Result};

/// A named query with its parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryRef {
    name: String,
    params: Vec<(String, String)>,
}

impl QueryRef {
    /// Create a reference without parameters.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        validate_name(&name)?;
        Ok(Self {
            name,
            params: Vec::new(),
        })
    }

    /// Add a parameter. Keys may repeat.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Result<Self> {
        self.add_param(key, value)?;
        Ok(self)
    }

    pub fn add_param(&mut self, key: impl Into<String>, value: impl Into<String>) -> Result<()> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(QueryError::EmptyParameterKey);
        }
        self.params.push((key, value.into()));
        Ok(())
    }

    /// Parse `name` or `name?k=v&k=v`.
    pub fn parse(s: &str) -> Result<Self> {
        let (name, query) = match s.split_once('?') {
            Some((name, query)) => (name, query),
            None => (s, ""),
        };
        let mut query_ref = Self::new(name)?;
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            query_ref.add_param(key, value)?;
        }
        Ok(query_ref)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parameters in insertion order.
    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    /// Values given for `key`, in insertion order.
    pub fn param_values<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.params
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Parameters sorted by key, then value.
    pub fn sorted_params(&self) -> Vec<(&str, &str)> {
        let mut sorted: Vec<(&str, &str)> = self
            .params
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        sorted.sort();
        sorted
    }

    /// The canonical `k=v&k=v` string, empty without parameters.
    pub fn query_string(&self) -> String {
        self.sorted_params()
            .into_iter()
            .map(|(k, v)| format!("{}={}", encode(k), encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Request URL against one replica: `{replica}api/{name}?{params}`.
    pub fn url_for(&self, replica: &Url) -> Result<Url> {
        let mut relative = format!("api/{}", self.name.replace('#', "%23"));
        let query = self.query_string();
        if !query.is_empty() {
            relative.push('?');
            relative.push_str(&query);
        }
        replica
            .join(&relative)
            .map_err(|e| QueryError::InvalidReplicaUrl {
                url: replica.to_string(),
                reason: e.to_string(),
            })
    }
}

impl fmt::Display for QueryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let query = self.query_string();
        if query.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}?{}", self.name, query)
        }
    }
}

fn encode(s: &str) -> String {
    form_urlencoded::byte_serialize(s.as_bytes()).collect()
}

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(QueryError::EmptyQueryName);
    }
    let invalid = || QueryError::InvalidQueryName(name.to_string());
    if !name.starts_with(ARTIFACT_CODE_PREFIX)
        || name.len() <= ARTIFACT_CODE_LEN
        || !name.is_char_boundary(ARTIFACT_CODE_LEN)
    {
        return Err(invalid());
    }
    let (code, rest) = name.split_at(ARTIFACT_CODE_LEN);
    let code_ok = code[ARTIFACT_CODE_PREFIX.len()..]
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
    let mut rest = rest.chars();
    let separator_ok = matches!(rest.next(), Some('/') | Some('#'));
    let local = rest.as_str();
    if code_ok && separator_ok && !local.is_empty() && !local.contains(['/', '#']) {
        Ok(())
    } else {
        Err(invalid())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const NAME: &str = "RA3qSfVzcnAeMOODdpgCg4e-bX6KjZYZ2JQXDsSwluMaI/get-newer-versions-of-np";

    #[test]
    fn test_valid_names() {
        assert!(QueryRef::new(NAME).is_ok());
        assert!(QueryRef::new(NAME.replace('/', "#")).is_ok());
    }

    #[test]
    fn test_invalid_names() {
        assert_eq!(QueryRef::new(""), Err(QueryError::EmptyQueryName));
        assert_eq!(QueryRef::new("   "), Err(QueryError::EmptyQueryName));
        for bad in [
            "get-newer-versions-of-np",
            "RA3qSfVzcnAeMOODdpgCg4e-bX6KjZYZ2JQXDsSwluMaI",
            "RA3qSfVzcnAeMOODdpgCg4e-bX6KjZYZ2JQXDsSwluMaI/",
            "RA3qSfVzcnAeMOODdpgCg4e-bX6KjZYZ2JQXDsSwluMaI/a/b",
            "RA3qSfVzcnAeMOODdpgCg4e-bX6KjZYZ2JQXDsSwluMa!/q",
            "XX3qSfVzcnAeMOODdpgCg4e-bX6KjZYZ2JQXDsSwluMaI/q",
        ] {
            assert!(
                matches!(QueryRef::new(bad), Err(QueryError::InvalidQueryName(_))),
                "{} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_empty_param_key() {
        assert_eq!(
            QueryRef::new(NAME).unwrap().with_param("", "x"),
            Err(QueryError::EmptyParameterKey)
        );
    }

    #[test]
    fn test_params_sorted_by_key_then_value() {
        let q = QueryRef::new(NAME)
            .unwrap()
            .with_param("b", "2")
            .unwrap()
            .with_param("a", "z")
            .unwrap()
            .with_param("a", "y")
            .unwrap();
        assert_eq!(q.query_string(), "a=y&a=z&b=2");
        assert_eq!(q.param_values("a").collect::<Vec<_>>(), vec!["z", "y"]);
    }

    #[test]
    fn test_values_form_encoded() {
        let q = QueryRef::new(NAME)
            .unwrap()
            .with_param("np", "http://purl.org/np/RAabc?x=1&y")
            .unwrap();
        assert_eq!(
            q.to_string(),
            format!("{}?np=http%3A%2F%2Fpurl.org%2Fnp%2FRAabc%3Fx%3D1%26y", NAME)
        );
    }

    #[test]
    fn test_parse_roundtrip() {
        let q = QueryRef::parse(&format!("{}?user=alice+smith&n=2", NAME)).unwrap();
        assert_eq!(q.name(), NAME);
        assert_eq!(q.param_values("user").collect::<Vec<_>>(), vec!["alice smith"]);
        assert_eq!(QueryRef::parse(&q.to_string()).unwrap().query_string(), q.query_string());

        let bare = QueryRef::parse(&format!("{}?", NAME)).unwrap();
        assert!(bare.params().is_empty());
    }

    #[test]
    fn test_url_for_replica() {
        let replica = Url::parse("https://query.example.org/").unwrap();
        let q = QueryRef::new(NAME).unwrap().with_param("np", "a b").unwrap();
        assert_eq!(
            q.url_for(&replica).unwrap().as_str(),
            format!("https://query.example.org/api/{}?np=a+b", NAME)
        );

        let hashed = QueryRef::new(NAME.replace('/', "#")).unwrap();
        let url = hashed.url_for(&replica).unwrap();
        assert!(url.fragment().is_none());
        assert!(url.path().contains("%23"));
    }

    proptest! {
        #[test]
        fn test_query_string_separators_survive_any_value(
            params in prop::collection::vec(("[a-z&=]{1,4}", "[ -~]{0,10}"), 1..6),
        ) {
            let mut q = QueryRef::new(NAME).unwrap();
            for (k, v) in &params {
                q.add_param(k.as_str(), v.as_str()).unwrap();
            }
            let query = q.query_string();
            prop_assert_eq!(query.matches('&').count(), params.len() - 1);
            prop_assert_eq!(query.matches('=').count(), params.len());
        }
    }
}

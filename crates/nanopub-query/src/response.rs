//! Tabular query results.
//!
//! Replicas answer with CSV: a header row followed by data rows. Each data
//! row becomes an [`ApiResponseEntry`] keyed by column name.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{QueryError, Result};

/// One data row, keyed by column name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponseEntry {
    values: BTreeMap<String, String>,
}

impl ApiResponseEntry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// `true` for the values `1` and `true`; anything else, including a
    /// missing column, is `false`.
    pub fn get_as_bool(&self, key: &str) -> bool {
        matches!(self.get(key), Some("1") | Some("true"))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}

/// A decoded query result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse {
    header: Vec<String>,
    rows: Vec<ApiResponseEntry>,
}

impl ApiResponse {
    pub fn new(header: Vec<String>) -> Self {
        Self {
            header,
            rows: Vec::new(),
        }
    }

    /// Decode a CSV body. Every row must have as many fields as the header.
    pub fn from_csv(body: &[u8]) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(body);
        let header: Vec<String> = reader
            .headers()
            .map_err(|e| QueryError::Decode(e.to_string()))?
            .iter()
            .map(str::to_string)
            .collect();
        if header.is_empty() {
            return Err(QueryError::Decode("missing header row".into()));
        }

        let mut response = Self::new(header);
        for record in reader.records() {
            let record = record.map_err(|e| QueryError::Decode(e.to_string()))?;
            response.push_row(record.iter())?;
        }
        Ok(response)
    }

    /// Append a row given in header order.
    pub fn push_row<'a>(&mut self, fields: impl IntoIterator<Item = &'a str>) -> Result<()> {
        let fields: Vec<&str> = fields.into_iter().collect();
        if fields.len() != self.header.len() {
            return Err(QueryError::Decode(format!(
                "row has {} fields, header has {}",
                fields.len(),
                self.header.len()
            )));
        }
        let mut entry = ApiResponseEntry::new();
        for (key, value) in self.header.iter().zip(fields) {
            entry.insert(key.as_str(), value);
        }
        self.rows.push(entry);
        Ok(())
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn rows(&self) -> &[ApiResponseEntry] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ApiResponseEntry> {
        self.rows.iter()
    }
}

impl<'a> IntoIterator for &'a ApiResponse {
    type Item = &'a ApiResponseEntry;
    type IntoIter = std::slice::Iter<'a, ApiResponseEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_csv() {
        let body = b"np,label,retracted\nhttp://purl.org/np/RA1,\"first, quoted\",1\nhttp://purl.org/np/RA2,second,false\n";
        let response = ApiResponse::from_csv(body).unwrap();
        assert_eq!(response.header(), &["np", "label", "retracted"]);
        assert_eq!(response.len(), 2);

        let first = &response.rows()[0];
        assert_eq!(first.get("label"), Some("first, quoted"));
        assert!(first.get_as_bool("retracted"));
        assert!(!response.rows()[1].get_as_bool("retracted"));
        assert!(!first.get_as_bool("missing"));
    }

    #[test]
    fn test_header_only() {
        let response = ApiResponse::from_csv(b"a,b\n").unwrap();
        assert!(response.is_empty());
        assert_eq!(response.header().len(), 2);
    }

    #[test]
    fn test_ragged_rows_rejected() {
        assert!(matches!(
            ApiResponse::from_csv(b"a,b\n1,2,3\n"),
            Err(QueryError::Decode(_))
        ));
    }

    #[test]
    fn test_empty_body_rejected() {
        assert!(matches!(
            ApiResponse::from_csv(b""),
            Err(QueryError::Decode(_))
        ));
    }

    #[test]
    fn test_invalid_utf8_rejected() {
        assert!(matches!(
            ApiResponse::from_csv(b"a\n\xff\xfe\n"),
            Err(QueryError::Decode(_))
        ));
    }
}

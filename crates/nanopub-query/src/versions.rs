//! Latest-version lookup.
//!
//! Asks the query services for newer versions of a nanopublication and
//! keeps those that are neither retracted nor superseded. Answers are
//! cached for an hour.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::client::QueryClient;
use crate::error::Result;
use crate::query_ref::QueryRef;
use crate::response::ApiResponse;
use crate::transport::ReplicaTransport;

/// Query listing newer versions of the nanopublication given as `np`.
pub const NEWER_VERSIONS_QUERY: &str =
    "RA3qSfVzcnAeMOODdpgCg4e-bX6KjZYZ2JQXDsSwluMaI/get-newer-versions-of-np";

pub const VERSION_CACHE_TTL: Duration = Duration::from_secs(60 * 60);

const NEWER_VERSION: &str = "newerVersion";
const RETRACTED_BY: &str = "retractedBy";
const SUPERSEDED_BY: &str = "supersededBy";

/// Time-bounded cache of resolved latest versions.
#[derive(Debug)]
pub struct VersionCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, (Instant, String)>>,
}

impl Default for VersionCache {
    fn default() -> Self {
        Self::new(VERSION_CACHE_TTL)
    }
}

impl VersionCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub async fn get(&self, np: &str) -> Option<String> {
        let entries = self.entries.lock().await;
        entries
            .get(np)
            .filter(|(at, _)| at.elapsed() <= self.ttl)
            .map(|(_, latest)| latest.clone())
    }

    /// Store an answer, dropping every expired one.
    pub async fn insert(&self, np: &str, latest: String) {
        let mut entries = self.entries.lock().await;
        entries.retain(|_, (at, _)| at.elapsed() <= self.ttl);
        entries.insert(np.to_string(), (Instant::now(), latest));
    }

    pub async fn clear(&self) {
        self.entries.lock().await.clear();
    }
}

/// The unique live newer version listed in a response, if there is one.
pub fn unique_live_version(response: &ApiResponse) -> Option<&str> {
    let mut live = response.iter().filter(|row| {
        row.get(RETRACTED_BY).unwrap_or("").is_empty()
            && row.get(SUPERSEDED_BY).unwrap_or("").is_empty()
    });
    match (live.next(), live.next()) {
        (Some(row), None) => row.get(NEWER_VERSION).filter(|v| !v.is_empty()),
        _ => None,
    }
}

impl<T: ReplicaTransport + 'static> QueryClient<T> {
    /// The latest version of `np`, or `np` itself when there is no unique
    /// live newer version or the services cannot be reached.
    pub async fn latest_version(&self, np: &str) -> String {
        if let Some(latest) = self.versions.get(np).await {
            debug!(np, latest = %latest, "latest version from cache");
            return latest;
        }
        match self.lookup_latest(np).await {
            Ok(Some(latest)) => {
                self.versions.insert(np, latest.clone()).await;
                latest
            }
            Ok(None) => np.to_string(),
            Err(e) => {
                warn!(np, error = %e, "latest version lookup failed");
                np.to_string()
            }
        }
    }

    async fn lookup_latest(&self, np: &str) -> Result<Option<String>> {
        let query = QueryRef::new(NEWER_VERSIONS_QUERY)?.with_param("np", np)?;
        let response = self.query(&query).await?;
        Ok(unique_live_version(&response).map(str::to_string))
    }

    /// Drop cached latest-version answers.
    pub async fn clear_version_cache(&self) {
        self.versions.clear().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(rows: &[[&str; 3]]) -> ApiResponse {
        let mut r = ApiResponse::new(vec![
            NEWER_VERSION.to_string(),
            RETRACTED_BY.to_string(),
            SUPERSEDED_BY.to_string(),
        ]);
        for row in rows {
            r.push_row(row.iter().copied()).unwrap();
        }
        r
    }

    #[test]
    fn test_unique_live_version() {
        let r = response(&[
            ["http://purl.org/np/RA1", "", "http://purl.org/np/RA2"],
            ["http://purl.org/np/RA2", "", ""],
            ["http://purl.org/np/RA3", "http://purl.org/np/RAx", ""],
        ]);
        assert_eq!(unique_live_version(&r), Some("http://purl.org/np/RA2"));
    }

    #[test]
    fn test_ambiguous_or_missing_version() {
        let two = response(&[
            ["http://purl.org/np/RA1", "", ""],
            ["http://purl.org/np/RA2", "", ""],
        ]);
        assert_eq!(unique_live_version(&two), None);
        assert_eq!(unique_live_version(&response(&[])), None);
    }

    #[tokio::test]
    async fn test_cache_expiry() {
        let cache = VersionCache::new(Duration::ZERO);
        cache.insert("a", "b".to_string()).await;
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert_eq!(cache.get("a").await, None);

        let cache = VersionCache::default();
        cache.insert("a", "b".to_string()).await;
        assert_eq!(cache.get("a").await, Some("b".to_string()));
        cache.clear().await;
        assert_eq!(cache.get("a").await, None);
    }

    #[tokio::test]
    async fn test_insert_prunes_expired_entries() {
        let cache = VersionCache::new(Duration::ZERO);
        for i in 0..50 {
            cache.insert(&format!("np{}", i), "latest".to_string()).await;
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        assert_eq!(cache.entries.lock().await.len(), 1);

        let cache = VersionCache::default();
        cache.insert("a", "b".to_string()).await;
        cache.insert("c", "d".to_string()).await;
        assert_eq!(cache.entries.lock().await.len(), 2);
    }
}

//! Transport abstraction for talking to query replicas.
//!
//! The client only needs two operations: a liveness probe against a
//! replica's base URL and a GET of a query URL. [`http::HttpTransport`]
//! does this over HTTPS; [`memory::MemoryReplicas`] scripts replicas for
//! tests.

use async_trait::async_trait;
use bytes::Bytes;
use url::Url;

use crate::error::Result;

/// Raw answer from one replica.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplicaResponse {
    pub status: u16,
    /// Declared body length, when the replica sent one.
    pub content_length: Option<u64>,
    pub body: Bytes,
}

impl ReplicaResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// A 2xx answer whose declared length, if any, is positive.
    pub fn is_usable(&self) -> bool {
        self.is_success() && self.content_length != Some(0)
    }
}

/// Transport trait for reaching query replicas.
///
/// Implementations must be thread-safe (Send + Sync). Dropping a pending
/// `fetch` future must release whatever it holds.
#[async_trait]
pub trait ReplicaTransport: Send + Sync {
    /// Liveness probe. Returns the status code of a GET on the base URL.
    async fn probe(&self, replica: &Url) -> Result<u16>;

    /// GET a query URL, asking for CSV.
    async fn fetch(&self, url: &Url) -> Result<ReplicaResponse>;
}

/// HTTP transport backed by `reqwest`.
pub mod http {
    use super::*;
    use std::time::Duration;

    use reqwest::header::ACCEPT;

    use crate::error::QueryError;

    pub const CSV_MEDIA_TYPE: &str = "text/csv";

    /// Configuration for the HTTP transport.
    #[derive(Debug, Clone)]
    pub struct HttpTransportConfig {
        /// Timeout for a whole request, body included.
        pub timeout: Duration,
        pub connect_timeout: Duration,
        pub user_agent: String,
    }

    impl Default for HttpTransportConfig {
        fn default() -> Self {
            Self {
                timeout: Duration::from_secs(30),
                connect_timeout: Duration::from_secs(10),
                user_agent: format!("nanopub-rs/{}", env!("CARGO_PKG_VERSION")),
            }
        }
    }

    pub struct HttpTransport {
        client: reqwest::Client,
    }

    impl HttpTransport {
        pub fn new(config: HttpTransportConfig) -> Result<Self> {
            let client = reqwest::Client::builder()
                .timeout(config.timeout)
                .connect_timeout(config.connect_timeout)
                .user_agent(config.user_agent)
                .build()
                .map_err(|e| QueryError::Transport {
                    replica: String::new(),
                    message: e.to_string(),
                })?;
            Ok(Self { client })
        }
    }

    fn transport_error(url: &Url, err: reqwest::Error) -> QueryError {
        QueryError::Transport {
            replica: url.to_string(),
            message: err.to_string(),
        }
    }

    #[async_trait]
    impl ReplicaTransport for HttpTransport {
        async fn probe(&self, replica: &Url) -> Result<u16> {
            let response = self
                .client
                .get(replica.clone())
                .send()
                .await
                .map_err(|e| transport_error(replica, e))?;
            Ok(response.status().as_u16())
        }

        async fn fetch(&self, url: &Url) -> Result<ReplicaResponse> {
            let response = self
                .client
                .get(url.clone())
                .header(ACCEPT, CSV_MEDIA_TYPE)
                .send()
                .await
                .map_err(|e| transport_error(url, e))?;
            let status = response.status().as_u16();
            let content_length = response.content_length();
            // Error bodies are drained so the connection can be reused.
            let body = response.bytes().await.map_err(|e| transport_error(url, e))?;
            Ok(ReplicaResponse {
                status,
                content_length,
                body,
            })
        }
    }
}

/// Scripted in-memory replicas for testing.
pub mod memory {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use tokio::sync::RwLock;

    use crate::error::QueryError;

    /// How a scripted replica behaves.
    #[derive(Debug, Clone)]
    pub struct ReplicaScript {
        /// Status returned by the liveness probe; `None` means unreachable.
        pub probe_status: Option<u16>,
        /// Status of query answers; `None` means the request fails outright.
        pub status: Option<u16>,
        pub body: Bytes,
        /// Declared length; defaults to the body length.
        pub content_length: Option<Option<u64>>,
        pub latency: Duration,
    }

    impl ReplicaScript {
        /// A healthy replica answering 200 with `body`.
        pub fn ok(body: impl Into<Bytes>) -> Self {
            Self {
                probe_status: Some(200),
                status: Some(200),
                body: body.into(),
                content_length: None,
                latency: Duration::ZERO,
            }
        }

        /// A healthy replica answering every query with `status`.
        pub fn status(status: u16) -> Self {
            Self {
                status: Some(status),
                ..Self::ok(Bytes::new())
            }
        }

        /// A replica whose probe fails.
        pub fn down() -> Self {
            Self {
                probe_status: None,
                status: None,
                ..Self::ok(Bytes::new())
            }
        }

        pub fn with_latency(mut self, latency: Duration) -> Self {
            self.latency = latency;
            self
        }

        pub fn with_content_length(mut self, length: Option<u64>) -> Self {
            self.content_length = Some(length);
            self
        }
    }

    struct Replica {
        script: ReplicaScript,
        probes: AtomicUsize,
        started: AtomicUsize,
        completed: AtomicUsize,
    }

    /// A set of scripted replicas keyed by base URL.
    #[derive(Default)]
    pub struct MemoryReplicas {
        replicas: RwLock<HashMap<String, Arc<Replica>>>,
        requests: RwLock<Vec<Url>>,
    }

    impl MemoryReplicas {
        pub fn new() -> Arc<Self> {
            Arc::new(Self::default())
        }

        /// Register or replace a replica.
        pub async fn set_replica(&self, base: &str, script: ReplicaScript) {
            let replica = Arc::new(Replica {
                script,
                probes: AtomicUsize::new(0),
                started: AtomicUsize::new(0),
                completed: AtomicUsize::new(0),
            });
            self.replicas.write().await.insert(base.to_string(), replica);
        }

        async fn lookup(&self, url: &Url) -> Option<Arc<Replica>> {
            let replicas = self.replicas.read().await;
            replicas
                .iter()
                .filter(|(base, _)| url.as_str().starts_with(base.as_str()))
                .max_by_key(|(base, _)| base.len())
                .map(|(_, replica)| Arc::clone(replica))
        }

        async fn counter(&self, base: &str, pick: fn(&Replica) -> &AtomicUsize) -> usize {
            self.replicas
                .read()
                .await
                .get(base)
                .map(|r| pick(r).load(Ordering::SeqCst))
                .unwrap_or(0)
        }

        pub async fn probe_count(&self, base: &str) -> usize {
            self.counter(base, |r| &r.probes).await
        }

        /// Query requests that reached `base`.
        pub async fn fetch_count(&self, base: &str) -> usize {
            self.counter(base, |r| &r.started).await
        }

        /// Query requests to `base` that ran to completion.
        pub async fn completed_count(&self, base: &str) -> usize {
            self.counter(base, |r| &r.completed).await
        }

        pub async fn total_fetches(&self) -> usize {
            self.requests.read().await.len()
        }

        /// Every query URL requested, in order.
        pub async fn requests(&self) -> Vec<Url> {
            self.requests.read().await.clone()
        }
    }

    fn unreachable(url: &Url) -> QueryError {
        QueryError::Transport {
            replica: url.to_string(),
            message: "connection refused".into(),
        }
    }

    #[async_trait]
    impl ReplicaTransport for MemoryReplicas {
        async fn probe(&self, replica: &Url) -> Result<u16> {
            let scripted = self.lookup(replica).await.ok_or_else(|| unreachable(replica))?;
            scripted.probes.fetch_add(1, Ordering::SeqCst);
            scripted.script.probe_status.ok_or_else(|| unreachable(replica))
        }

        async fn fetch(&self, url: &Url) -> Result<ReplicaResponse> {
            self.requests.write().await.push(url.clone());
            let scripted = self.lookup(url).await.ok_or_else(|| unreachable(url))?;
            scripted.started.fetch_add(1, Ordering::SeqCst);
            if !scripted.script.latency.is_zero() {
                tokio::time::sleep(scripted.script.latency).await;
            }
            scripted.completed.fetch_add(1, Ordering::SeqCst);

            let status = scripted.script.status.ok_or_else(|| unreachable(url))?;
            let body = scripted.script.body.clone();
            let content_length = scripted
                .script
                .content_length
                .unwrap_or(Some(body.len() as u64));
            Ok(ReplicaResponse {
                status,
                content_length,
                body,
            })
        }
    }
}

//! Federated query client.
//!
//! Each attempt races `parallel_call_count` randomly chosen healthy
//! replicas. The first usable, decodable answer wins; the other requests
//! of that attempt are cancelled and joined before the attempt returns.
//! Failed attempts are retried up to `max_retry_count` times in total.

use std::sync::Arc;

use rand::seq::SliceRandom;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{QueryError, Result};
use crate::health::HealthCache;
use crate::query_ref::QueryRef;
use crate::response::ApiResponse;
use crate::transport::http::{HttpTransport, HttpTransportConfig};
use crate::transport::{ReplicaResponse, ReplicaTransport};
use crate::versions::VersionCache;

/// Public query service replicas.
pub const DEFAULT_REPLICAS: [&str; 3] = [
    "https://query.knowledgepixels.com/",
    "https://query.np.kpxl.org/",
    "https://query.np.trustyuri.net/",
];

/// Configuration for the federated client.
#[derive(Debug, Clone)]
pub struct QueryConfig {
    /// Base URLs of the replicas, each ending in `/`.
    pub replicas: Vec<String>,
    /// Replicas raced per attempt.
    pub parallel_call_count: usize,
    /// Total attempts before giving up.
    pub max_retry_count: usize,
    /// Fewer healthy replicas than this fails every query.
    pub min_healthy_replicas: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            replicas: DEFAULT_REPLICAS.iter().map(|r| r.to_string()).collect(),
            parallel_call_count: 2,
            max_retry_count: 3,
            min_healthy_replicas: 2,
        }
    }
}

impl QueryConfig {
    pub fn with_replicas<I, S>(mut self, replicas: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.replicas = replicas.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_parallel_call_count(mut self, count: usize) -> Self {
        self.parallel_call_count = count;
        self
    }

    pub fn with_max_retry_count(mut self, count: usize) -> Self {
        self.max_retry_count = count;
        self
    }

    pub fn with_min_healthy_replicas(mut self, count: usize) -> Self {
        self.min_healthy_replicas = count;
        self
    }
}

/// Client for the federated query services.
pub struct QueryClient<T: ReplicaTransport> {
    transport: Arc<T>,
    config: QueryConfig,
    replicas: Vec<Url>,
    health: Arc<HealthCache>,
    pub(crate) versions: VersionCache,
}

impl QueryClient<HttpTransport> {
    /// Client over HTTP, sharing the process-wide health cache.
    pub fn http(config: QueryConfig) -> Result<Self> {
        let transport = HttpTransport::new(HttpTransportConfig::default())?;
        Self::new(Arc::new(transport), config)
    }
}

impl<T: ReplicaTransport + 'static> QueryClient<T> {
    /// Create a client. Replica URLs are parsed and given a trailing `/`.
    pub fn new(transport: Arc<T>, config: QueryConfig) -> Result<Self> {
        let replicas = config
            .replicas
            .iter()
            .map(|r| parse_replica(r))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            transport,
            config,
            replicas,
            health: HealthCache::shared(),
            versions: VersionCache::default(),
        })
    }

    /// Use a dedicated health cache instead of the process-wide one.
    pub fn with_health_cache(mut self, health: Arc<HealthCache>) -> Self {
        self.health = health;
        self
    }

    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    pub fn health_cache(&self) -> &Arc<HealthCache> {
        &self.health
    }

    /// The healthy set, probing replicas if needed.
    pub async fn healthy_replicas(&self) -> Result<Vec<Url>> {
        self.health
            .healthy_replicas(
                &self.transport,
                &self.replicas,
                self.config.min_healthy_replicas,
            )
            .await
    }

    /// Run a query, racing replicas and retrying failed attempts.
    pub async fn query(&self, query: &QueryRef) -> Result<ApiResponse> {
        let healthy = self.healthy_replicas().await?;
        let attempts = self.config.max_retry_count;
        for attempt in 1..=attempts {
            if let Some(response) = self.attempt(query, &healthy, attempt).await? {
                return Ok(response);
            }
            warn!(query = %query, attempt, "query attempt failed");
        }
        Err(QueryError::ApiNotReachable {
            query: query.to_string(),
            attempts,
        })
    }

    async fn attempt(
        &self,
        query: &QueryRef,
        healthy: &[Url],
        attempt: usize,
    ) -> Result<Option<ApiResponse>> {
        let chosen: Vec<Url> = healthy
            .choose_multiple(&mut rand::thread_rng(), self.config.parallel_call_count)
            .cloned()
            .collect();

        let token = CancellationToken::new();
        let mut calls = JoinSet::new();
        for replica in chosen {
            let url = query.url_for(&replica)?;
            debug!(replica = %replica, attempt, "dispatching query");
            let transport = Arc::clone(&self.transport);
            let token = token.clone();
            calls.spawn(async move {
                let outcome = tokio::select! {
                    _ = token.cancelled() => Err(QueryError::Cancelled),
                    outcome = call(transport.as_ref(), &replica, &url) => outcome,
                };
                (replica, outcome)
            });
        }

        let mut winner = None;
        while let Some(joined) = calls.join_next().await {
            match joined {
                Ok((replica, Ok(response))) => {
                    info!(replica = %replica, rows = response.len(), "replica won query race");
                    winner = Some(response);
                    break;
                }
                Ok((replica, Err(e))) => {
                    warn!(replica = %replica, error = %e, "replica request failed");
                }
                Err(e) => warn!(error = %e, "replica request task failed"),
            }
        }

        token.cancel();
        calls.abort_all();
        while calls.join_next().await.is_some() {}
        Ok(winner)
    }
}

/// One request against one replica, including decoding.
async fn call<T: ReplicaTransport + ?Sized>(
    transport: &T,
    replica: &Url,
    url: &Url,
) -> Result<ApiResponse> {
    let response = transport.fetch(url).await?;
    check_response(replica, &response)?;
    ApiResponse::from_csv(&response.body)
}

fn check_response(replica: &Url, response: &ReplicaResponse) -> Result<()> {
    if !response.is_success() {
        return Err(QueryError::Status {
            replica: replica.to_string(),
            status: response.status,
        });
    }
    if !response.is_usable() || response.body.is_empty() {
        return Err(QueryError::EmptyBody {
            replica: replica.to_string(),
        });
    }
    Ok(())
}

fn parse_replica(replica: &str) -> Result<Url> {
    let normalized = if replica.ends_with('/') {
        replica.to_string()
    } else {
        format!("{}/", replica)
    };
    Url::parse(&normalized).map_err(|e| QueryError::InvalidReplicaUrl {
        url: replica.to_string(),
        reason: e.to_string(),
    })
}

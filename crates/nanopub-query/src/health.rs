//! Healthy-replica cache.
//!
//! The healthy set is computed once by probing every configured replica
//! and is then reused until [`HealthCache::reset`] is called. Population
//! holds the cache lock, so concurrent callers wait for the first prober
//! instead of probing again.

use std::sync::{Arc, OnceLock};

use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{QueryError, Result};
use crate::transport::ReplicaTransport;

#[derive(Debug, Clone)]
struct Populated {
    configured: Vec<Url>,
    healthy: Vec<Url>,
}

/// Cache of replicas that passed their liveness probe.
#[derive(Debug, Default)]
pub struct HealthCache {
    state: Mutex<Option<Populated>>,
}

static SHARED: OnceLock<Arc<HealthCache>> = OnceLock::new();

impl HealthCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide cache used by clients that are not given one.
    pub fn shared() -> Arc<HealthCache> {
        Arc::clone(SHARED.get_or_init(|| Arc::new(HealthCache::new())))
    }

    /// Forget the healthy set; the next query probes again.
    pub async fn reset(&self) {
        *self.state.lock().await = None;
    }

    /// The cached healthy set, if populated.
    pub async fn cached(&self) -> Option<Vec<Url>> {
        self.state.lock().await.as_ref().map(|p| p.healthy.clone())
    }

    /// Healthy replicas among `configured`, probing them if the cache is
    /// empty or was filled for a different replica list.
    ///
    /// Fails with [`QueryError::NotEnoughHealthyReplicas`] when fewer than
    /// `min_healthy` respond, leaving the cache empty.
    pub async fn healthy_replicas<T>(
        &self,
        transport: &Arc<T>,
        configured: &[Url],
        min_healthy: usize,
    ) -> Result<Vec<Url>>
    where
        T: ReplicaTransport + 'static,
    {
        let mut state = self.state.lock().await;
        if let Some(populated) = state.as_ref() {
            if populated.configured == configured {
                return Ok(populated.healthy.clone());
            }
        }

        let healthy = probe_all(transport, configured).await;
        info!(
            healthy = healthy.len(),
            configured = configured.len(),
            "probed query replicas"
        );
        if healthy.len() < min_healthy {
            *state = None;
            return Err(QueryError::NotEnoughHealthyReplicas {
                healthy: healthy.len(),
                required: min_healthy,
            });
        }
        *state = Some(Populated {
            configured: configured.to_vec(),
            healthy: healthy.clone(),
        });
        Ok(healthy)
    }
}

/// Probe all replicas concurrently. Result keeps the configured order.
async fn probe_all<T>(transport: &Arc<T>, configured: &[Url]) -> Vec<Url>
where
    T: ReplicaTransport + 'static,
{
    let mut probes = JoinSet::new();
    for (position, replica) in configured.iter().cloned().enumerate() {
        let transport = Arc::clone(transport);
        probes.spawn(async move {
            let outcome = transport.probe(&replica).await;
            (position, replica, outcome)
        });
    }

    let mut healthy = Vec::new();
    while let Some(joined) = probes.join_next().await {
        match joined {
            Ok((position, replica, Ok(status))) if (200..300).contains(&status) => {
                debug!(replica = %replica, status, "replica healthy");
                healthy.push((position, replica));
            }
            Ok((_, replica, Ok(status))) => {
                warn!(replica = %replica, status, "replica probe rejected");
            }
            Ok((_, replica, Err(e))) => {
                warn!(replica = %replica, error = %e, "replica probe failed");
            }
            Err(e) => warn!(error = %e, "replica probe task failed"),
        }
    }
    healthy.sort_by_key(|(position, _)| *position);
    healthy.into_iter().map(|(_, replica)| replica).collect()
}

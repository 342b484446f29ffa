//! Federated query behavior against scripted replicas.

use std::sync::Arc;
use std::time::{Duration, Instant};

use nanopub_query::{
    HealthCache, MemoryReplicas, QueryClient, QueryConfig, QueryError, QueryRef, ReplicaScript,
    NEWER_VERSIONS_QUERY,
};

const A: &str = "https://a.example/";
const B: &str = "https://b.example/";
const C: &str = "https://c.example/";

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

const TABLE: &str = "np,label\nhttp://purl.org/np/RA1,one\nhttp://purl.org/np/RA2,two\n";

fn query() -> QueryRef {
    QueryRef::new("RAWruhiSmyzgZhVRs8QY8YQPAgHzTfl7anxII1de-yaCs/get-labels")
        .unwrap()
        .with_param("type", "http://example.org/Thing")
        .unwrap()
}

async fn client_with(
    scripts: Vec<(&str, ReplicaScript)>,
) -> (Arc<MemoryReplicas>, QueryClient<MemoryReplicas>) {
    let replicas = MemoryReplicas::new();
    for (base, script) in &scripts {
        replicas.set_replica(base, script.clone()).await;
    }
    let config = QueryConfig::default().with_replicas(scripts.iter().map(|(base, _)| *base));
    let client = QueryClient::new(Arc::clone(&replicas), config)
        .unwrap()
        .with_health_cache(Arc::new(HealthCache::new()));
    (replicas, client)
}

#[tokio::test]
async fn test_no_reachable_replicas() {
    let (replicas, client) =
        client_with(vec![(A, ReplicaScript::down()), (B, ReplicaScript::down())]).await;
    assert_eq!(
        client.query(&query()).await,
        Err(QueryError::NotEnoughHealthyReplicas {
            healthy: 0,
            required: 2
        })
    );
    assert_eq!(replicas.total_fetches().await, 0);
}

#[tokio::test]
async fn test_single_reachable_replica_is_not_enough() {
    let (replicas, client) = client_with(vec![
        (A, ReplicaScript::ok(TABLE)),
        (B, ReplicaScript::down()),
        (C, ReplicaScript::down()),
    ])
    .await;
    assert!(matches!(
        client.query(&query()).await,
        Err(QueryError::NotEnoughHealthyReplicas { healthy: 1, .. })
    ));
    assert_eq!(replicas.total_fetches().await, 0);
    assert!(client.health_cache().cached().await.is_none());
}

#[tokio::test]
async fn test_one_good_replica_answers() {
    let (_, client) =
        client_with(vec![(A, ReplicaScript::ok(TABLE)), (B, ReplicaScript::status(500))]).await;
    let response = client.query(&query()).await.unwrap();
    assert_eq!(response.header(), &["np", "label"]);
    assert_eq!(response.len(), 2);
    assert_eq!(response.rows()[1].get("label"), Some("two"));
}

#[tokio::test]
async fn test_slow_success_beats_fast_error() {
    init_tracing();
    let (replicas, client) = client_with(vec![
        (
            A,
            ReplicaScript::ok(TABLE).with_latency(Duration::from_millis(200)),
        ),
        (
            B,
            ReplicaScript::status(503).with_latency(Duration::from_millis(10)),
        ),
    ])
    .await;
    let response = client.query(&query()).await.unwrap();
    assert_eq!(response.len(), 2);
    // Won in the first attempt.
    assert_eq!(replicas.fetch_count(A).await, 1);
    assert_eq!(replicas.fetch_count(B).await, 1);
}

#[tokio::test]
async fn test_losing_request_is_cancelled() {
    let (replicas, client) = client_with(vec![
        (A, ReplicaScript::ok(TABLE)),
        (
            B,
            ReplicaScript::ok(TABLE).with_latency(Duration::from_secs(5)),
        ),
    ])
    .await;
    let started = Instant::now();
    client.query(&query()).await.unwrap();
    assert!(started.elapsed() < Duration::from_secs(2));
    assert_eq!(replicas.completed_count(B).await, 0);
}

#[tokio::test]
async fn test_retry_exhaustion() {
    init_tracing();
    let (replicas, client) = client_with(vec![
        (A, ReplicaScript::status(500)),
        (B, ReplicaScript::status(502)),
    ])
    .await;
    assert_eq!(
        client.query(&query()).await,
        Err(QueryError::ApiNotReachable {
            query: query().to_string(),
            attempts: 3,
        })
    );
    // Two replicas raced per attempt, three attempts, nothing more.
    assert_eq!(replicas.total_fetches().await, 6);
}

#[tokio::test]
async fn test_retry_budget_is_configurable() {
    let replicas = MemoryReplicas::new();
    replicas.set_replica(A, ReplicaScript::status(500)).await;
    replicas.set_replica(B, ReplicaScript::status(500)).await;
    let config = QueryConfig::default()
        .with_replicas([A, B])
        .with_max_retry_count(5)
        .with_parallel_call_count(1);
    let client = QueryClient::new(Arc::clone(&replicas), config)
        .unwrap()
        .with_health_cache(Arc::new(HealthCache::new()));
    assert!(matches!(
        client.query(&query()).await,
        Err(QueryError::ApiNotReachable { attempts: 5, .. })
    ));
    assert_eq!(replicas.total_fetches().await, 5);
}

#[tokio::test]
async fn test_undecodable_answer_does_not_win() {
    let (_, client) = client_with(vec![
        (A, ReplicaScript::ok("a,b\n1,2,3\n")),
        (
            B,
            ReplicaScript::ok(TABLE).with_latency(Duration::from_millis(50)),
        ),
    ])
    .await;
    let response = client.query(&query()).await.unwrap();
    assert_eq!(response.header(), &["np", "label"]);
}

#[tokio::test]
async fn test_zero_length_answer_does_not_win() {
    let (_, client) = client_with(vec![
        (A, ReplicaScript::ok(TABLE).with_content_length(Some(0))),
        (
            B,
            ReplicaScript::ok(TABLE).with_latency(Duration::from_millis(50)),
        ),
    ])
    .await;
    assert_eq!(client.query(&query()).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_equal_parameter_sets_send_equal_requests() {
    let (replicas, client) =
        client_with(vec![(A, ReplicaScript::ok(TABLE)), (B, ReplicaScript::ok(TABLE))]).await;
    let name = "RAWruhiSmyzgZhVRs8QY8YQPAgHzTfl7anxII1de-yaCs/get-labels";
    let first = QueryRef::new(name)
        .unwrap()
        .with_param("b", "2")
        .unwrap()
        .with_param("a", "1")
        .unwrap();
    let second = QueryRef::new(name)
        .unwrap()
        .with_param("a", "1")
        .unwrap()
        .with_param("b", "2")
        .unwrap();
    client.query(&first).await.unwrap();
    client.query(&second).await.unwrap();

    let requests = replicas.requests().await;
    assert!(requests.len() >= 2);
    for url in &requests {
        assert_eq!(url.path(), format!("/api/{}", name));
        assert_eq!(url.query(), Some("a=1&b=2"));
    }
}

#[tokio::test]
async fn test_health_probed_once_across_queries() {
    let (replicas, client) =
        client_with(vec![(A, ReplicaScript::ok(TABLE)), (B, ReplicaScript::ok(TABLE))]).await;
    for _ in 0..3 {
        client.query(&query()).await.unwrap();
    }
    assert_eq!(replicas.probe_count(A).await, 1);
    assert_eq!(replicas.probe_count(B).await, 1);
}

#[tokio::test]
async fn test_concurrent_queries_share_one_probe() {
    let (replicas, client) =
        client_with(vec![(A, ReplicaScript::ok(TABLE)), (B, ReplicaScript::ok(TABLE))]).await;
    let client = Arc::new(client);
    let mut handles = Vec::new();
    for _ in 0..4 {
        let client = Arc::clone(&client);
        handles.push(tokio::spawn(async move { client.query(&query()).await }));
    }
    for handle in handles {
        assert!(handle.await.unwrap().is_ok());
    }
    assert_eq!(replicas.probe_count(A).await, 1);
}

#[tokio::test]
async fn test_latest_version_resolved_and_cached() {
    let table = "newerVersion,retractedBy,supersededBy\n\
                 http://purl.org/np/RA2,,http://purl.org/np/RA3\n\
                 http://purl.org/np/RA3,,\n";
    let (replicas, client) =
        client_with(vec![(A, ReplicaScript::ok(table)), (B, ReplicaScript::ok(table))]).await;

    let latest = client.latest_version("http://purl.org/np/RA1").await;
    assert_eq!(latest, "http://purl.org/np/RA3");
    let fetched = replicas.total_fetches().await;

    assert_eq!(
        client.latest_version("http://purl.org/np/RA1").await,
        "http://purl.org/np/RA3"
    );
    assert_eq!(replicas.total_fetches().await, fetched);

    let request = &replicas.requests().await[0];
    assert!(request.path().ends_with(NEWER_VERSIONS_QUERY));
}

#[tokio::test]
async fn test_latest_version_falls_back_to_input() {
    let (_, client) =
        client_with(vec![(A, ReplicaScript::status(500)), (B, ReplicaScript::status(500))]).await;
    assert_eq!(
        client.latest_version("http://purl.org/np/RA1").await,
        "http://purl.org/np/RA1"
    );
}

//! Test fixtures for common scenarios.

use std::sync::Arc;

use nanopub::query::{HealthCache, MemoryReplicas, ReplicaScript};
use nanopub::{
    Iri, Kernel, KernelConfig, Keypair, Literal, Nanopub, NanopubCreator, QueryConfig,
};

/// Query name whose syntax the query client accepts.
pub const SAMPLE_QUERY: &str = "RAWruhiSmyzgZhVRs8QY8YQPAgHzTfl7anxII1de-yaCs/get-labels";

/// Replica bases used by [`TestFixture::offline_kernel`].
pub const REPLICA_BASES: [&str; 2] = ["https://replica-a.example/", "https://replica-b.example/"];

/// A signing identity with helpers for authoring documents.
pub struct TestFixture {
    pub keypair: Keypair,
    /// ORCID recorded as creator of every sample document.
    pub orcid: String,
}

impl TestFixture {
    /// Create a new fixture with a random keypair.
    pub fn new() -> Self {
        Self {
            keypair: Keypair::generate(),
            orcid: "0000-0002-1825-0097".to_string(),
        }
    }

    /// Create a fixture with a deterministic keypair.
    pub fn with_seed(seed: [u8; 32]) -> Self {
        Self {
            keypair: Keypair::from_seed(&seed),
            ..Self::new()
        }
    }

    /// A complete draft: one assertion, attributed provenance, creator pubinfo.
    pub fn creator(&self, local: &str) -> NanopubCreator {
        NanopubCreator::draft(local)
            .add_assertion(
                Iri::new(format!("http://example.org/{}", local)),
                Iri::new("http://www.w3.org/2000/01/rdf-schema#label"),
                Literal::plain(local),
            )
            .add_provenance_about_assertion(
                Iri::new("http://www.w3.org/ns/prov#wasAttributedTo"),
                Iri::new(format!("http://orcid.org/{}", self.orcid)),
            )
            .add_creator_orcid(&self.orcid)
    }

    /// A kernel signing with this fixture's key, backed by two healthy
    /// in-memory replicas that answer every query with `table`.
    ///
    /// The kernel gets its own health cache so tests stay independent.
    pub async fn offline_kernel(
        &self,
        table: &str,
    ) -> nanopub::Result<(Arc<MemoryReplicas>, Kernel<MemoryReplicas>)> {
        let replicas = MemoryReplicas::new();
        for base in REPLICA_BASES {
            replicas
                .set_replica(base, ReplicaScript::ok(table.to_string()))
                .await;
        }
        let config =
            KernelConfig::default().with_query(QueryConfig::default().with_replicas(REPLICA_BASES));
        let kernel = Kernel::with_transport(Arc::clone(&replicas), config)?
            .with_keypair(self.keypair.clone())
            .with_health_cache(Arc::new(HealthCache::new()));
        Ok((replicas, kernel))
    }

    /// Publish `count` signed sample documents.
    pub fn publish_many(
        &self,
        kernel: &Kernel<MemoryReplicas>,
        count: usize,
    ) -> nanopub::Result<Vec<Nanopub>> {
        (0..count)
            .map(|i| kernel.publish(self.creator(&format!("doc{}", i))))
            .collect()
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Create multiple fixtures with distinct deterministic keys.
pub fn multi_party_fixtures(count: usize) -> Vec<TestFixture> {
    (0..count)
        .map(|i| {
            let mut seed = [0u8; 32];
            seed[0] = i as u8;
            TestFixture::with_seed(seed)
        })
        .collect()
}

/// Render a CSV table the way the query services answer.
pub fn csv_table(header: &[&str], rows: &[&[&str]]) -> String {
    let mut out = header.join(",");
    out.push('\n');
    for row in rows {
        out.push_str(&row.join(","));
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use nanopub::{IndexArena, IndexReference, QueryRef};

    #[tokio::test]
    async fn test_fixture_publishes_signed() {
        let fixture = TestFixture::with_seed([3; 32]);
        let (_, kernel) = fixture.offline_kernel("a\n1\n").await.unwrap();
        let np = kernel.publish(fixture.creator("one")).unwrap();

        let verification = kernel.verify(&np).unwrap();
        assert_eq!(verification.signer, Some(fixture.keypair.public_key()));
    }

    #[tokio::test]
    async fn test_fixture_index_over_documents() {
        let fixture = TestFixture::new();
        let (_, kernel) = fixture.offline_kernel("a\n1\n").await.unwrap();
        let docs = fixture.publish_many(&kernel, 5).unwrap();

        let chain = kernel
            .build_index(docs.iter().map(|np| IndexReference::Element(np.uri().clone())))
            .unwrap();
        let head = chain.complete().unwrap().uri().clone();
        let contents = IndexArena::from(chain).collect(&head).unwrap();
        assert_eq!(contents.elements.len(), 5);
    }

    #[tokio::test]
    async fn test_fixture_query() {
        let table = csv_table(&["np", "label"], &[&["http://purl.org/np/RA1", "one"]]);
        let (replicas, kernel) = TestFixture::new().offline_kernel(&table).await.unwrap();

        let response = kernel.query(&QueryRef::new(SAMPLE_QUERY).unwrap()).await.unwrap();
        assert_eq!(response.rows()[0].get("label"), Some("one"));
        assert!(replicas.total_fetches().await >= 1);
    }

    #[test]
    fn test_multi_party_keys_differ() {
        let parties = multi_party_fixtures(3);
        assert_ne!(parties[0].keypair.public_key(), parties[1].keypair.public_key());
        assert_ne!(parties[1].keypair.public_key(), parties[2].keypair.public_key());
    }
}

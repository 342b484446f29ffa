//! End-to-end tests through the Kernel facade.

use std::sync::Arc;

use nanopub::core::vocab::{npx, pav};
use nanopub::core::{IdentityError, SignatureError};
use nanopub::query::{HealthCache, MemoryReplicas, ReplicaScript};
use nanopub::{
    IdentityConfig, IndexArena, IndexReference, Iri, Kernel, KernelConfig, KernelError, Keypair,
    Literal, NanopubCreator, QueryConfig, QueryRef, Statement, ValidationMode,
};

const A: &str = "https://a.example/";
const B: &str = "https://b.example/";

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

async fn offline_kernel(config: KernelConfig) -> (Arc<MemoryReplicas>, Kernel<MemoryReplicas>) {
    let replicas = MemoryReplicas::new();
    let table = "np,label\nhttp://purl.org/np/RA1,one\n";
    replicas.set_replica(A, ReplicaScript::ok(table)).await;
    replicas.set_replica(B, ReplicaScript::ok(table)).await;
    let config = config.with_query(QueryConfig::default().with_replicas([A, B]));
    let kernel = Kernel::with_transport(Arc::clone(&replicas), config)
        .unwrap()
        .with_health_cache(Arc::new(HealthCache::new()));
    (replicas, kernel)
}

fn sample(kernel: &Kernel<MemoryReplicas>, local: &str) -> NanopubCreator {
    kernel
        .creator(local)
        .add_assertion(
            Iri::new("http://example.org/mosquito"),
            Iri::new("http://example.org/transmits"),
            Iri::new("http://example.org/malaria"),
        )
        .add_provenance_about_assertion(
            Iri::new("http://www.w3.org/ns/prov#wasAttributedTo"),
            Iri::new("https://orcid.org/0000-0002-1825-0097"),
        )
        .add_creator_orcid("0000-0002-1825-0097")
}

#[tokio::test]
async fn test_publish_and_verify_unsigned() {
    init_tracing();
    let (_, kernel) = offline_kernel(KernelConfig::default()).await;
    let np = kernel.publish(sample(&kernel, "one")).unwrap();

    assert!(np.uri().starts_with("http://purl.org/np/RA"));
    let verification = kernel.verify(&np).unwrap();
    assert_eq!(verification.signer, None);
    assert!(np.uri().as_str().ends_with(verification.artifact_code.as_str()));
}

#[tokio::test]
async fn test_publish_signed() {
    let (_, kernel) = offline_kernel(KernelConfig::default()).await;
    let keypair = Keypair::from_seed(&[7; 32]);
    let kernel = kernel.with_keypair(keypair.clone());

    let np = kernel.publish(sample(&kernel, "signed")).unwrap();
    assert!(np
        .pubinfo()
        .iter()
        .any(|st| st.predicate.as_str() == npx::HAS_SIGNATURE));
    assert_eq!(kernel.verify(&np).unwrap().signer, Some(keypair.public_key()));
}

#[tokio::test]
async fn test_publish_signed_needs_key() {
    let (_, kernel) = offline_kernel(KernelConfig::default()).await;
    assert!(matches!(
        kernel.publish_signed(sample(&kernel, "nokey")),
        Err(KernelError::NoSigningKey)
    ));
}

#[tokio::test]
async fn test_required_signature() {
    let (_, kernel) =
        offline_kernel(KernelConfig::default().with_require_signature(true)).await;
    let np = kernel.publish(sample(&kernel, "unsigned")).unwrap();
    assert!(matches!(
        kernel.verify(&np),
        Err(KernelError::Signature(SignatureError::MissingSignature))
    ));
}

#[tokio::test]
async fn test_tampered_pubinfo_detected() {
    init_tracing();
    let (_, kernel) = offline_kernel(KernelConfig::default()).await;
    let np = kernel.publish(sample(&kernel, "tamper")).unwrap();

    let mut statements = np.clone().into_statements();
    let victim = np
        .pubinfo()
        .iter()
        .find(|st| st.predicate.as_str() == pav::CREATED_BY)
        .cloned()
        .unwrap();
    statements.remove(&victim);
    statements.insert(Statement::new(
        victim.subject.clone(),
        victim.predicate.clone(),
        Iri::new("https://orcid.org/0000-0000-0000-0000"),
        victim.graph.clone(),
    ));

    assert!(matches!(
        kernel.verify_statements(statements),
        Err(KernelError::Identity(IdentityError::Mismatch { .. }))
    ));
}

#[tokio::test]
async fn test_verify_statements_roundtrip() {
    let (_, kernel) = offline_kernel(KernelConfig::default()).await;
    let np = kernel.publish(sample(&kernel, "rt")).unwrap();
    let (parsed, _) = kernel.verify_statements(np.clone().into_statements()).unwrap();
    assert_eq!(parsed, np);
}

#[tokio::test]
async fn test_custom_base() {
    let config = KernelConfig::default().with_identity(IdentityConfig {
        base_iri: "https://w3id.org/np/".to_string(),
    });
    let (_, kernel) = offline_kernel(config).await;
    let np = kernel.publish(sample(&kernel, "w3id")).unwrap();
    assert!(np.uri().starts_with("https://w3id.org/np/RA"));
    assert!(kernel.verify(&np).is_ok());
}

#[tokio::test]
async fn test_strict_mode_rejects_extra_graph() {
    let (_, lenient) = offline_kernel(KernelConfig::default()).await;
    let (_, strict) =
        offline_kernel(KernelConfig::default().with_validation(ValidationMode::Strict)).await;

    let np = lenient.publish(sample(&lenient, "extra")).unwrap();
    let mut statements = np.clone().into_statements();
    statements.insert(Statement::new(
        Iri::new("http://example.org/s"),
        Iri::new("http://example.org/p"),
        Literal::plain("stray"),
        Iri::new("http://example.org/other-graph"),
    ));

    let parsed = lenient.parse(statements.clone()).unwrap();
    assert_eq!(parsed, np);
    assert!(matches!(
        strict.parse(statements),
        Err(KernelError::Malformed(_))
    ));
}

#[tokio::test]
async fn test_index_chain_through_kernel() {
    let (_, kernel) = offline_kernel(KernelConfig::default()).await;
    let documents: Vec<Iri> = (0..3)
        .map(|i| {
            kernel
                .publish(sample(&kernel, &format!("doc{}", i)))
                .unwrap()
                .uri()
                .clone()
        })
        .collect();

    let chain = kernel
        .build_index(documents.iter().cloned().map(IndexReference::Element))
        .unwrap();
    assert_eq!(chain.nodes.len(), 1);
    let head = chain.complete().unwrap().uri().clone();
    assert!(kernel.verify(chain.complete().unwrap().nanopub()).is_ok());

    let arena = IndexArena::from(chain);
    assert_eq!(arena.collect(&head).unwrap().elements, {
        let mut sorted = documents.clone();
        sorted.sort();
        sorted
    });
}

#[tokio::test]
async fn test_query_through_kernel() {
    let (replicas, kernel) = offline_kernel(KernelConfig::default()).await;
    let query = QueryRef::new("RAWruhiSmyzgZhVRs8QY8YQPAgHzTfl7anxII1de-yaCs/get-labels").unwrap();
    let response = kernel.query(&query).await.unwrap();
    assert_eq!(response.rows()[0].get("label"), Some("one"));
    assert!(replicas.total_fetches().await >= 1);
}

//! The Kernel: unified API for nanopublications.
//!
//! The Kernel ties together the document model, identity assignment,
//! signatures, index chains and the federated query client behind one
//! configuration.

use std::sync::Arc;

use tracing::{debug, info, warn};

use nanopub_core::{
    sign_draft, verify_signature, ArtifactCode, DraftNanopub, Ed25519PublicKey, IdentityConfig,
    IdentityError, IdentityTransform, Keypair, Nanopub, NanopubCreator, SignatureError, Statement,
    ValidationMode,
};
use nanopub_index::{build_chain, IndexChain, IndexChainBuilder, IndexConfig, IndexReference};
use nanopub_query::{
    ApiResponse, HealthCache, HttpTransport, QueryClient, QueryConfig, QueryRef, ReplicaTransport,
};

use crate::error::{KernelError, Result};

/// Configuration for the Kernel.
#[derive(Debug, Clone, Default)]
pub struct KernelConfig {
    pub identity: IdentityConfig,
    /// How incoming statement sets are parsed.
    pub validation: ValidationMode,
    /// Reject documents without a valid signature on verification.
    pub require_signature: bool,
    pub index: IndexConfig,
    pub query: QueryConfig,
}

impl KernelConfig {
    pub fn with_identity(mut self, identity: IdentityConfig) -> Self {
        self.identity = identity;
        self
    }

    pub fn with_validation(mut self, validation: ValidationMode) -> Self {
        self.validation = validation;
        self
    }

    pub fn with_require_signature(mut self, require: bool) -> Self {
        self.require_signature = require;
        self
    }

    pub fn with_index(mut self, index: IndexConfig) -> Self {
        self.index = index;
        self
    }

    pub fn with_query(mut self, query: QueryConfig) -> Self {
        self.query = query;
        self
    }
}

/// Outcome of a successful verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verification {
    pub artifact_code: ArtifactCode,
    /// Signer, when the document carries a valid signature.
    pub signer: Option<Ed25519PublicKey>,
}

/// The main Kernel struct.
///
/// Provides a unified API for:
/// - Authoring, signing and publishing documents
/// - Verifying documents against their identifiers
/// - Building index chains
/// - Querying the federated services
pub struct Kernel<T: ReplicaTransport = HttpTransport> {
    /// Signing identity, if this kernel publishes signed documents.
    keypair: Option<Keypair>,
    transform: IdentityTransform,
    config: KernelConfig,
    client: QueryClient<T>,
}

impl Kernel<HttpTransport> {
    /// Create a kernel that reaches the query services over HTTP.
    pub fn new(config: KernelConfig) -> Result<Self> {
        let client = QueryClient::http(config.query.clone())?;
        Ok(Self::from_parts(client, config))
    }
}

impl<T: ReplicaTransport + 'static> Kernel<T> {
    /// Create a kernel over a custom replica transport.
    pub fn with_transport(transport: Arc<T>, config: KernelConfig) -> Result<Self> {
        let client = QueryClient::new(transport, config.query.clone())?;
        Ok(Self::from_parts(client, config))
    }

    fn from_parts(client: QueryClient<T>, config: KernelConfig) -> Self {
        Self {
            keypair: None,
            transform: IdentityTransform::new(config.identity.clone()),
            config,
            client,
        }
    }

    /// Sign every published document with this keypair.
    pub fn with_keypair(mut self, keypair: Keypair) -> Self {
        self.keypair = Some(keypair);
        self
    }

    /// Use a dedicated replica health cache.
    pub fn with_health_cache(mut self, health: Arc<HealthCache>) -> Self {
        self.client = self.client.with_health_cache(health);
        self
    }

    pub fn public_key(&self) -> Option<Ed25519PublicKey> {
        self.keypair.as_ref().map(Keypair::public_key)
    }

    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    pub fn transform(&self) -> &IdentityTransform {
        &self.transform
    }

    pub fn client(&self) -> &QueryClient<T> {
        &self.client
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Authoring
    // ─────────────────────────────────────────────────────────────────────────

    /// Start authoring a draft at `{DRAFT_NAMESPACE}{local}/`.
    pub fn creator(&self, local: &str) -> NanopubCreator {
        NanopubCreator::draft(local)
    }

    /// Finalize, sign if a keypair is configured, and assign identity.
    pub fn publish(&self, creator: NanopubCreator) -> Result<Nanopub> {
        let draft = creator.finalize()?;
        match &self.keypair {
            Some(keypair) => self.publish_draft_signed(draft, keypair),
            None => self.assign(draft),
        }
    }

    /// Like [`Kernel::publish`], but fails without a keypair.
    pub fn publish_signed(&self, creator: NanopubCreator) -> Result<Nanopub> {
        let keypair = self.keypair.as_ref().ok_or(KernelError::NoSigningKey)?;
        self.publish_draft_signed(creator.finalize()?, keypair)
    }

    fn publish_draft_signed(&self, draft: DraftNanopub, keypair: &Keypair) -> Result<Nanopub> {
        let signed = sign_draft(&self.transform, draft, keypair)?;
        self.assign(signed)
    }

    /// Assign identity to a draft as is.
    pub fn assign(&self, draft: DraftNanopub) -> Result<Nanopub> {
        let np = self.transform.assign(draft)?;
        info!(nanopub = %np.uri(), statements = np.len(), "published nanopub");
        Ok(np)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Verification
    // ─────────────────────────────────────────────────────────────────────────

    /// Parse a statement set with the configured validation mode.
    pub fn parse(&self, statements: impl IntoIterator<Item = Statement>) -> Result<Nanopub> {
        Ok(Nanopub::from_statements(statements, self.config.validation)?)
    }

    /// Check a document against its identifier and its signature.
    ///
    /// A missing signature is accepted unless `require_signature` is set;
    /// a present but invalid one is always an error.
    pub fn verify(&self, np: &Nanopub) -> Result<Verification> {
        let artifact_code = match self.transform.check(np) {
            Ok(code) => code,
            Err(e @ (IdentityError::Mismatch { .. } | IdentityError::ReservedIri(_))) => {
                warn!(nanopub = %np.uri(), error = %e, "artifact code mismatch");
                return Err(e.into());
            }
            Err(e) => return Err(e.into()),
        };

        let signer = match verify_signature(np) {
            Ok(key) => Some(key),
            Err(SignatureError::MissingSignature) if !self.config.require_signature => None,
            Err(e) => {
                warn!(nanopub = %np.uri(), error = %e, "signature check failed");
                return Err(e.into());
            }
        };
        debug!(nanopub = %np.uri(), signed = signer.is_some(), "verified nanopub");
        Ok(Verification {
            artifact_code,
            signer,
        })
    }

    /// Parse then verify.
    pub fn verify_statements(
        &self,
        statements: impl IntoIterator<Item = Statement>,
    ) -> Result<(Nanopub, Verification)> {
        let np = self.parse(statements)?;
        let verification = self.verify(&np)?;
        Ok((np, verification))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Indexes
    // ─────────────────────────────────────────────────────────────────────────

    /// A chain builder using this kernel's identity and index settings.
    pub fn index_builder(&self) -> IndexChainBuilder {
        IndexChainBuilder::with_transform(self.transform.clone(), self.config.index.clone())
    }

    /// Build a whole index chain over the given references.
    pub fn build_index(
        &self,
        references: impl IntoIterator<Item = IndexReference>,
    ) -> Result<IndexChain> {
        Ok(build_chain(self.index_builder(), references)?)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Network
    // ─────────────────────────────────────────────────────────────────────────

    pub async fn query(&self, query: &QueryRef) -> Result<ApiResponse> {
        Ok(self.client.query(query).await?)
    }

    /// Latest live version of a document, or the document itself.
    pub async fn latest_version(&self, np: &str) -> String {
        self.client.latest_version(np).await
    }
}

impl<T: ReplicaTransport> std::fmt::Debug for Kernel<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Kernel")
            .field("public_key", &self.keypair.as_ref().map(Keypair::public_key))
            .field("base", &self.transform.base())
            .field("validation", &self.config.validation)
            .finish()
    }
}

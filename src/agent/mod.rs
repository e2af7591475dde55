/// Identity Agent
///
/// The gateway never signs, stores or checks secrets itself. All of that is
/// delegated to an identity agent reached through [`IdentityAgent`].
/// Implementations must tolerate concurrent calls on one shared handle.

pub mod local;
pub mod memory;

pub use local::LocalAgent;
pub use memory::MemoryAgent;

use crate::{config::AgentBackend, error::AgentError, identity::Did};
use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Utc};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::{path::Path, sync::Arc};

/// Resolved DID document, opaque to the gateway
pub type Document = serde_json::Value;

/// Storage status snapshot, passed through untouched
pub type StatusInfo = serde_json::Value;

/// Result type alias for agent operations
pub type AgentResult<T> = Result<T, AgentError>;

/// Method name for identifiers issued by the bundled agents
pub const JLINX_DID_METHOD: &str = "jlinx";

/// Freshly issued identifier and the secret that controls it
///
/// The secret is only ever returned here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedDid {
    pub did: String,
    pub secret: String,
}

/// Request to replace the value behind a DID
#[derive(Debug, Clone)]
pub struct Amendment {
    pub did: Did,
    pub secret: String,
    pub value: serde_json::Value,
}

/// Async interface to the identity agent
#[async_trait]
pub trait IdentityAgent: Send + Sync {
    /// Resolves once the agent is ready to serve requests
    async fn connected(&self) -> AgentResult<()>;

    /// Current document for `did`, `None` if the agent has never seen it
    async fn resolve_did(&self, did: &Did) -> AgentResult<Option<Document>>;

    /// Issue a new identifier. Every call yields a distinct DID and secret.
    async fn create_did(&self) -> AgentResult<CreatedDid>;

    /// Replace the value behind a DID, proving control with its secret
    async fn amend_did(&self, amendment: Amendment) -> AgentResult<()>;

    /// Storage status snapshot
    async fn status(&self) -> AgentResult<StatusInfo>;

    /// Release the agent. Later calls fail with [`AgentError::Closed`].
    async fn destroy(&self) -> AgentResult<()>;
}

/// Build the agent selected by configuration
pub fn open_agent(backend: AgentBackend, storage_path: &Path) -> Arc<dyn IdentityAgent> {
    match backend {
        AgentBackend::Local => Arc::new(LocalAgent::new(storage_path.to_path_buf())),
        AgentBackend::Memory => Arc::new(MemoryAgent::new()),
    }
}

/// Stored state behind one DID, shared by the bundled agents
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct DidRecord {
    pub did: String,
    pub secret_digest: String,
    pub document: Document,
    pub revision: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DidRecord {
    /// Issue a new DID with a fresh secret
    pub fn issue() -> (Self, CreatedDid) {
        let did = format!("did:{}:{}", JLINX_DID_METHOD, random_token());
        let secret = random_token();
        let now = Utc::now();

        let record = DidRecord {
            did: did.clone(),
            secret_digest: secret_digest(&secret),
            document: initial_document(&did, now),
            revision: 0,
            created_at: now,
            updated_at: now,
        };

        (record, CreatedDid { did, secret })
    }

    /// Apply an amendment after checking the secret
    pub fn amend(&mut self, secret: &str, value: serde_json::Value) -> AgentResult<()> {
        if secret_digest(secret) != self.secret_digest {
            return Err(AgentError::InvalidSecret(self.did.clone()));
        }
        self.document = value;
        self.revision += 1;
        self.updated_at = Utc::now();
        Ok(())
    }
}

/// 32 random bytes, base64url without padding
fn random_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Hex SHA-256 of a secret; only digests are ever stored
pub(crate) fn secret_digest(secret: &str) -> String {
    hex::encode(Sha256::digest(secret.as_bytes()))
}

fn initial_document(did: &str, created: DateTime<Utc>) -> Document {
    serde_json::json!({
        "@context": "https://www.w3.org/ns/did/v1",
        "id": did,
        "created": created.to_rfc3339(),
    })
}

/// File-backed identity agent
use crate::{
    agent::{
        AgentResult, Amendment, CreatedDid, DidRecord, Document, IdentityAgent, StatusInfo,
    },
    error::AgentError,
    identity::Did,
};
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::{
    path::PathBuf,
    sync::atomic::{AtomicBool, Ordering},
};
use tokio::{
    fs,
    sync::{Mutex, OnceCell},
};

/// Running totals, also the write lock
#[derive(Debug, Default)]
struct Totals {
    dids: u64,
    revisions: u64,
}

/// Local storage agent
///
/// One JSON file per DID under `{storage}/dids/{shard}/{digest}.json`, where
/// digest is the hex SHA-256 of the DID and shard its first two characters.
/// Writes go to a temporary file and are renamed into place.
pub struct LocalAgent {
    storage_path: PathBuf,
    ready: OnceCell<()>,
    closed: AtomicBool,
    totals: Mutex<Totals>,
}

impl LocalAgent {
    pub fn new(storage_path: PathBuf) -> Self {
        Self {
            storage_path,
            ready: OnceCell::new(),
            closed: AtomicBool::new(false),
            totals: Mutex::new(Totals::default()),
        }
    }

    fn dids_dir(&self) -> PathBuf {
        self.storage_path.join("dids")
    }

    fn record_path(&self, did: &str) -> PathBuf {
        let digest = hex::encode(Sha256::digest(did.as_bytes()));
        self.dids_dir().join(&digest[0..2]).join(format!("{}.json", digest))
    }

    /// Open the storage directory and load totals, once
    async fn ensure_ready(&self) -> AgentResult<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(AgentError::Closed);
        }

        self.ready
            .get_or_try_init(|| async {
                fs::create_dir_all(self.dids_dir()).await?;
                let totals = self.scan().await?;
                tracing::debug!(
                    path = %self.storage_path.display(),
                    dids = totals.dids,
                    "local identity agent opened"
                );
                *self.totals.lock().await = totals;
                Ok::<(), AgentError>(())
            })
            .await?;

        Ok(())
    }

    async fn scan(&self) -> AgentResult<Totals> {
        let mut totals = Totals::default();
        let mut shards = fs::read_dir(self.dids_dir()).await?;

        while let Some(shard) = shards.next_entry().await? {
            if !shard.file_type().await?.is_dir() {
                continue;
            }
            let mut files = fs::read_dir(shard.path()).await?;
            while let Some(file) = files.next_entry().await? {
                let path = file.path();
                if path.extension().and_then(|e| e.to_str()) != Some("json") {
                    continue;
                }
                let record: DidRecord = serde_json::from_slice(&fs::read(&path).await?)?;
                totals.dids += 1;
                totals.revisions += record.revision;
            }
        }

        Ok(totals)
    }

    async fn read_record(&self, did: &str) -> AgentResult<Option<DidRecord>> {
        match fs::read(self.record_path(did)).await {
            Ok(data) => Ok(Some(serde_json::from_slice(&data)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AgentError::Storage(format!(
                "Failed to read record for {}: {}",
                did, e
            ))),
        }
    }

    async fn write_record(&self, record: &DidRecord) -> AgentResult<()> {
        let path = self.record_path(&record.did);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(record)?).await?;
        fs::rename(&tmp, &path).await?;
        Ok(())
    }
}

#[async_trait]
impl IdentityAgent for LocalAgent {
    async fn connected(&self) -> AgentResult<()> {
        self.ensure_ready().await
    }

    async fn resolve_did(&self, did: &Did) -> AgentResult<Option<Document>> {
        self.ensure_ready().await?;
        Ok(self.read_record(did.as_str()).await?.map(|r| r.document))
    }

    async fn create_did(&self) -> AgentResult<CreatedDid> {
        self.ensure_ready().await?;
        let (record, created) = DidRecord::issue();

        let mut totals = self.totals.lock().await;
        self.write_record(&record).await?;
        totals.dids += 1;

        tracing::info!(did = %created.did, "created did");
        Ok(created)
    }

    async fn amend_did(&self, amendment: Amendment) -> AgentResult<()> {
        self.ensure_ready().await?;

        // Held across read-modify-write so amendments to one DID never interleave
        let mut totals = self.totals.lock().await;
        let mut record = self
            .read_record(amendment.did.as_str())
            .await?
            .ok_or_else(|| AgentError::UnknownDid(amendment.did.to_string()))?;

        record.amend(&amendment.secret, amendment.value)?;
        self.write_record(&record).await?;
        totals.revisions += 1;

        tracing::info!(did = %record.did, revision = record.revision, "amended did");
        Ok(())
    }

    async fn status(&self) -> AgentResult<StatusInfo> {
        self.ensure_ready().await?;
        let totals = self.totals.lock().await;

        Ok(serde_json::json!({
            "storagePath": self.storage_path.display().to_string(),
            "open": !self.closed.load(Ordering::SeqCst),
            "dids": totals.dids,
            "revisions": totals.revisions,
        }))
    }

    async fn destroy(&self) -> AgentResult<()> {
        // Wait out any write in flight before closing
        let _totals = self.totals.lock().await;
        self.closed.store(true, Ordering::SeqCst);
        tracing::debug!(path = %self.storage_path.display(), "local identity agent closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn did(s: &str) -> Did {
        Did::parse(s).unwrap()
    }

    #[tokio::test]
    async fn test_create_resolve_amend() {
        let dir = tempfile::tempdir().unwrap();
        let agent = LocalAgent::new(dir.path().to_path_buf());
        agent.connected().await.unwrap();

        let created = agent.create_did().await.unwrap();
        let doc = agent.resolve_did(&did(&created.did)).await.unwrap().unwrap();
        assert_eq!(doc["id"], created.did.as_str());

        agent
            .amend_did(Amendment {
                did: did(&created.did),
                secret: created.secret.clone(),
                value: json!({"name": "alice"}),
            })
            .await
            .unwrap();

        let doc = agent.resolve_did(&did(&created.did)).await.unwrap().unwrap();
        assert_eq!(doc, json!({"name": "alice"}));
    }

    #[tokio::test]
    async fn test_unknown_did_resolves_to_none() {
        let dir = tempfile::tempdir().unwrap();
        let agent = LocalAgent::new(dir.path().to_path_buf());

        let doc = agent.resolve_did(&did("did:example:nonexistent")).await.unwrap();
        assert!(doc.is_none());
    }

    #[tokio::test]
    async fn test_amend_rejects_wrong_secret() {
        let dir = tempfile::tempdir().unwrap();
        let agent = LocalAgent::new(dir.path().to_path_buf());
        let created = agent.create_did().await.unwrap();

        let err = agent
            .amend_did(Amendment {
                did: did(&created.did),
                secret: "not-the-secret".to_string(),
                value: json!(1),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::InvalidSecret(_)));

        let err = agent
            .amend_did(Amendment {
                did: did("did:jlinx:missing"),
                secret: created.secret,
                value: json!(1),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::UnknownDid(_)));
    }

    #[tokio::test]
    async fn test_records_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let created = {
            let agent = LocalAgent::new(dir.path().to_path_buf());
            let created = agent.create_did().await.unwrap();
            agent
                .amend_did(Amendment {
                    did: did(&created.did),
                    secret: created.secret.clone(),
                    value: json!({"v": 2}),
                })
                .await
                .unwrap();
            agent.destroy().await.unwrap();
            created
        };

        let agent = LocalAgent::new(dir.path().to_path_buf());
        agent.connected().await.unwrap();
        let status = agent.status().await.unwrap();
        assert_eq!(status["dids"], 1);
        assert_eq!(status["revisions"], 1);

        let doc = agent.resolve_did(&did(&created.did)).await.unwrap().unwrap();
        assert_eq!(doc, json!({"v": 2}));
    }

    #[tokio::test]
    async fn test_destroy_closes_agent() {
        let dir = tempfile::tempdir().unwrap();
        let agent = LocalAgent::new(dir.path().to_path_buf());
        agent.connected().await.unwrap();
        agent.destroy().await.unwrap();

        assert_eq!(agent.create_did().await.unwrap_err(), AgentError::Closed);
        assert_eq!(agent.status().await.unwrap_err(), AgentError::Closed);
    }
}

/// In-process identity agent
use crate::{
    agent::{
        AgentResult, Amendment, CreatedDid, DidRecord, Document, IdentityAgent, StatusInfo,
    },
    error::AgentError,
    identity::Did,
};
use async_trait::async_trait;
use std::{
    collections::HashMap,
    sync::atomic::{AtomicBool, Ordering},
    time::Duration,
};
use tokio::sync::{OnceCell, RwLock};

/// Agent keeping every record in memory
///
/// Connecting can be slowed down or made to fail, which is how startup
/// ordering is exercised without a real agent.
#[derive(Default)]
pub struct MemoryAgent {
    records: RwLock<HashMap<String, DidRecord>>,
    ready: OnceCell<()>,
    closed: AtomicBool,
    connect_delay: Option<Duration>,
    connect_failure: Option<String>,
    destroy_failure: Option<String>,
}

impl MemoryAgent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay `connected()` by `delay`
    pub fn with_connect_delay(mut self, delay: Duration) -> Self {
        self.connect_delay = Some(delay);
        self
    }

    /// Make `connected()` fail with `message`
    pub fn with_connect_failure(mut self, message: impl Into<String>) -> Self {
        self.connect_failure = Some(message.into());
        self
    }

    /// Make `destroy()` fail with `message` (the agent still closes)
    pub fn with_destroy_failure(mut self, message: impl Into<String>) -> Self {
        self.destroy_failure = Some(message.into());
        self
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    async fn ensure_ready(&self) -> AgentResult<()> {
        if self.is_closed() {
            return Err(AgentError::Closed);
        }

        self.ready
            .get_or_try_init(|| async {
                if let Some(delay) = self.connect_delay {
                    tokio::time::sleep(delay).await;
                }
                match &self.connect_failure {
                    Some(message) => Err(AgentError::Rejected {
                        message: message.clone(),
                        status: None,
                    }),
                    None => Ok(()),
                }
            })
            .await?;

        Ok(())
    }
}

#[async_trait]
impl IdentityAgent for MemoryAgent {
    async fn connected(&self) -> AgentResult<()> {
        self.ensure_ready().await
    }

    async fn resolve_did(&self, did: &Did) -> AgentResult<Option<Document>> {
        self.ensure_ready().await?;
        let records = self.records.read().await;
        Ok(records.get(did.as_str()).map(|r| r.document.clone()))
    }

    async fn create_did(&self) -> AgentResult<CreatedDid> {
        self.ensure_ready().await?;
        let (record, created) = DidRecord::issue();
        self.records.write().await.insert(record.did.clone(), record);
        Ok(created)
    }

    async fn amend_did(&self, amendment: Amendment) -> AgentResult<()> {
        self.ensure_ready().await?;
        let mut records = self.records.write().await;
        let record = records
            .get_mut(amendment.did.as_str())
            .ok_or_else(|| AgentError::UnknownDid(amendment.did.to_string()))?;
        record.amend(&amendment.secret, amendment.value)
    }

    async fn status(&self) -> AgentResult<StatusInfo> {
        self.ensure_ready().await?;
        let records = self.records.read().await;
        let revisions: u64 = records.values().map(|r| r.revision).sum();

        Ok(serde_json::json!({
            "storagePath": null,
            "open": !self.is_closed(),
            "dids": records.len(),
            "revisions": revisions,
        }))
    }

    async fn destroy(&self) -> AgentResult<()> {
        self.closed.store(true, Ordering::SeqCst);
        match &self.destroy_failure {
            Some(message) => Err(AgentError::Storage(message.clone())),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Instant;

    #[tokio::test]
    async fn test_connect_delay_is_shared_by_waiters() {
        let agent = Arc::new(MemoryAgent::new().with_connect_delay(Duration::from_millis(50)));
        let started = Instant::now();

        let (a, b) = tokio::join!(agent.connected(), agent.connected());
        a.unwrap();
        b.unwrap();

        assert!(started.elapsed() >= Duration::from_millis(50));
        assert!(started.elapsed() < Duration::from_millis(2000));
    }

    #[tokio::test]
    async fn test_connect_failure_blocks_operations() {
        let agent = MemoryAgent::new().with_connect_failure("hypercore offline");
        let err = agent.connected().await.unwrap_err();
        assert_eq!(err.to_string(), "hypercore offline");
        assert!(agent.create_did().await.is_err());
    }

    #[tokio::test]
    async fn test_amend_and_status() {
        let agent = MemoryAgent::new();
        let created = agent.create_did().await.unwrap();
        let did = Did::parse(&created.did).unwrap();

        agent
            .amend_did(Amendment {
                did: did.clone(),
                secret: created.secret,
                value: json!(["x"]),
            })
            .await
            .unwrap();

        assert_eq!(agent.resolve_did(&did).await.unwrap(), Some(json!(["x"])));
        let status = agent.status().await.unwrap();
        assert_eq!(status["dids"], 1);
        assert_eq!(status["revisions"], 1);
    }

    #[tokio::test]
    async fn test_failing_destroy_still_closes() {
        let agent = MemoryAgent::new().with_destroy_failure("flush failed");
        assert!(agent.destroy().await.is_err());
        assert!(agent.is_closed());
        assert_eq!(agent.status().await.unwrap_err(), AgentError::Closed);
    }
}

/// Startup readiness gate
use std::sync::Arc;
use tokio::sync::watch;

/// Where the gateway is in bringing the agent up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Readiness {
    Pending,
    Ready,
    Failed(String),
}

/// Requests that need the agent wait here until startup settles
#[derive(Clone)]
pub struct ReadinessGate {
    tx: Arc<watch::Sender<Readiness>>,
}

impl ReadinessGate {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Readiness::Pending);
        Self { tx: Arc::new(tx) }
    }

    pub fn mark_ready(&self) {
        self.tx.send_replace(Readiness::Ready);
    }

    pub fn mark_failed(&self, reason: impl Into<String>) {
        self.tx.send_replace(Readiness::Failed(reason.into()));
    }

    pub fn current(&self) -> Readiness {
        self.tx.borrow().clone()
    }

    /// Wait until the gate leaves `Pending`
    ///
    /// Returns the failure reason if startup failed or the gateway is stopping.
    pub async fn wait(&self) -> Result<(), String> {
        let mut rx = self.tx.subscribe();
        let settled = rx
            .wait_for(|state| *state != Readiness::Pending)
            .await
            .map(|state| state.clone());

        match settled {
            Ok(Readiness::Ready) => Ok(()),
            Ok(Readiness::Failed(reason)) => Err(reason),
            Ok(Readiness::Pending) | Err(_) => Err("gateway is not running".to_string()),
        }
    }
}

impl Default for ReadinessGate {
    fn default() -> Self {
        Self::new()
    }
}

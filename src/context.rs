/// Application context and dependency injection
use crate::{agent::IdentityAgent, config::GatewayConfig, gateway::ReadinessGate};
use std::sync::Arc;

/// State shared by every request
///
/// The agent handle is the only thing requests share. It is created by
/// [`crate::gateway::Gateway::start`] and released by `stop`.
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<GatewayConfig>,
    pub agent: Arc<dyn IdentityAgent>,
    pub readiness: ReadinessGate,
}

impl AppContext {
    pub fn new(
        config: GatewayConfig,
        agent: Arc<dyn IdentityAgent>,
        readiness: ReadinessGate,
    ) -> Self {
        Self {
            config: Arc::new(config),
            agent,
            readiness,
        }
    }
}

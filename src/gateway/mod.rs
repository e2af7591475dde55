/// Gateway process lifecycle
///
/// ```text
/// Created --start--> Starting --(agent ready + listener bound)--> Ready
/// Ready --stop--> Stopping --> Stopped
/// ```
///
/// During `Starting` the listener already accepts connections, but requests
/// that need the agent wait on the [`ReadinessGate`] until startup settles.

pub mod readiness;

pub use readiness::{Readiness, ReadinessGate};

use crate::{
    agent::{open_agent, IdentityAgent},
    config::GatewayConfig,
    context::AppContext,
    error::{GatewayError, GatewayResult},
    server::{build_router, ServerHandle},
};
use std::{net::SocketAddr, sync::Arc};
use tracing::{debug, info, warn};

/// Builds the agent handle when the gateway starts
pub type AgentFactory = Arc<dyn Fn(&GatewayConfig) -> Arc<dyn IdentityAgent> + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayState {
    Created,
    Starting,
    Ready,
    Stopping,
    Stopped,
}

/// Owns the agent handle and the listener
pub struct Gateway {
    config: GatewayConfig,
    factory: AgentFactory,
    state: GatewayState,
    readiness: ReadinessGate,
    agent: Option<Arc<dyn IdentityAgent>>,
    server: Option<ServerHandle>,
}

impl Gateway {
    /// Gateway using the agent backend named in `config`
    pub fn new(config: GatewayConfig) -> Self {
        Self::with_agent_factory(config, |config| {
            open_agent(config.agent_backend, &config.storage_path)
        })
    }

    pub fn with_agent_factory<F>(config: GatewayConfig, factory: F) -> Self
    where
        F: Fn(&GatewayConfig) -> Arc<dyn IdentityAgent> + Send + Sync + 'static,
    {
        Self {
            config,
            factory: Arc::new(factory),
            state: GatewayState::Created,
            readiness: ReadinessGate::new(),
            agent: None,
            server: None,
        }
    }

    pub fn state(&self) -> GatewayState {
        self.state
    }

    pub fn readiness(&self) -> &ReadinessGate {
        &self.readiness
    }

    /// Address the listener is bound to, once started
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.server.as_ref().map(ServerHandle::local_addr)
    }

    /// Bring up the agent and the listener concurrently
    ///
    /// Only reaches `Ready` if both succeed. On failure whatever did come up
    /// is released and the gateway ends in `Stopped`.
    pub async fn start(&mut self) -> GatewayResult<SocketAddr> {
        if self.state != GatewayState::Created {
            return Err(GatewayError::Startup(format!(
                "cannot start gateway in state {:?}",
                self.state
            )));
        }
        self.state = GatewayState::Starting;
        debug!("starting");

        let agent = (self.factory)(&self.config);
        self.agent = Some(Arc::clone(&agent));

        let ctx = AppContext::new(self.config.clone(), Arc::clone(&agent), self.readiness.clone());
        let addr = self.config.bind_address();

        let (connected, listening) =
            tokio::join!(agent.connected(), ServerHandle::bind(&addr, build_router(ctx)));

        let mut failures = Vec::new();
        if let Err(e) = connected {
            failures.push(format!("identity agent: {}", e));
        }
        match listening {
            Ok(server) => self.server = Some(server),
            Err(e) => failures.push(format!("listener {}: {}", addr, e)),
        }

        if !failures.is_empty() {
            let reason = failures.join("; ");
            self.readiness.mark_failed(reason.clone());
            if let Err(e) = self.release().await {
                warn!(error = %e, "cleanup after failed startup");
            }
            self.state = GatewayState::Stopped;
            return Err(GatewayError::Startup(reason));
        }

        let local_addr = self
            .local_addr()
            .ok_or_else(|| GatewayError::Startup("listener missing after bind".to_string()))?;
        self.readiness.mark_ready();
        self.state = GatewayState::Ready;
        info!("jlinx http server running http://localhost:{}", local_addr.port());

        Ok(local_addr)
    }

    /// Close the listener, then release the agent
    ///
    /// Both are attempted even if one fails; failures are returned together.
    pub async fn stop(&mut self) -> GatewayResult<()> {
        match self.state {
            GatewayState::Stopped => return Ok(()),
            GatewayState::Created => {
                self.state = GatewayState::Stopped;
                return Ok(());
            }
            _ => {}
        }

        self.state = GatewayState::Stopping;
        debug!("stopping");
        self.readiness.mark_failed("gateway is stopping");

        let result = self.release().await;
        self.state = GatewayState::Stopped;
        result
    }

    async fn release(&mut self) -> GatewayResult<()> {
        let mut failures = Vec::new();

        if let Some(server) = self.server.take() {
            if let Err(e) = server.stop().await {
                failures.push(format!("listener: {}", e));
            }
        }
        if let Some(agent) = self.agent.take() {
            if let Err(e) = agent.destroy().await {
                failures.push(format!("identity agent: {}", e));
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(GatewayError::Shutdown(failures))
        }
    }
}

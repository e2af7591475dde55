/// Configuration management for the jlinx gateway
use crate::error::{GatewayError, GatewayResult};
use std::env;
use std::path::PathBuf;

/// Which identity agent backs the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentBackend {
    /// File-backed agent rooted at the storage path
    Local,
    /// In-process agent, nothing survives a restart
    Memory,
}

/// Main gateway configuration
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
    /// Data directory handed to the identity agent
    pub storage_path: PathBuf,
    /// Static assets served under `/assets`
    pub public_dir: PathBuf,
    pub agent_backend: AgentBackend,
}

impl GatewayConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> GatewayResult<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> GatewayResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = required(&lookup, "PORT")?
            .parse()
            .map_err(|_| GatewayError::Configuration("Invalid port number in PORT".to_string()))?;
        let storage_path: PathBuf = required(&lookup, "JLINX_STORAGE")?.into();

        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let public_dir = lookup("JLINX_PUBLIC_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./public"));

        let agent_backend = match lookup("JLINX_AGENT").as_deref() {
            None | Some("local") => AgentBackend::Local,
            Some("memory") => AgentBackend::Memory,
            Some(other) => {
                return Err(GatewayError::Configuration(format!(
                    "Unknown identity agent backend: {}",
                    other
                )))
            }
        };

        Ok(GatewayConfig {
            host,
            port,
            storage_path,
            public_dir,
            agent_backend,
        })
    }

    /// Address the listener binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn required<F>(lookup: &F, name: &str) -> GatewayResult<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| {
            GatewayError::Configuration(format!(
                "jlinx http server requires environment variable {}",
                name
            ))
        })
}

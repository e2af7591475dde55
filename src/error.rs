/// Unified error types for the jlinx gateway
use axum::http::StatusCode;
use thiserror::Error;

/// Status used when a failure does not carry its own
pub const DEFAULT_ERROR_STATUS: StatusCode = StatusCode::UNAUTHORIZED;

/// Errors raised by the identity agent
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AgentError {
    /// The secret presented for an amendment does not control the DID
    #[error("invalid secret for DID={0}")]
    InvalidSecret(String),

    /// The agent has no record of the DID
    #[error("unknown DID={0}")]
    UnknownDid(String),

    /// The agent was destroyed or never connected
    #[error("identity agent is closed")]
    Closed,

    /// Storage layer failure
    #[error("storage error: {0}")]
    Storage(String),

    /// Opaque rejection from the agent, optionally with its own status
    #[error("{message}")]
    Rejected {
        message: String,
        status: Option<u16>,
    },
}

impl AgentError {
    /// Status the agent attaches to this failure, if any
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            AgentError::InvalidSecret(_) => Some(StatusCode::UNAUTHORIZED),
            AgentError::UnknownDid(_) => Some(StatusCode::NOT_FOUND),
            AgentError::Closed => Some(StatusCode::SERVICE_UNAVAILABLE),
            AgentError::Storage(_) => None,
            AgentError::Rejected { status, .. } => {
                status.and_then(|code| StatusCode::from_u16(code).ok())
            }
        }
    }
}

impl From<std::io::Error> for AgentError {
    fn from(e: std::io::Error) -> Self {
        AgentError::Storage(e.to_string())
    }
}

impl From<serde_json::Error> for AgentError {
    fn from(e: serde_json::Error) -> Self {
        AgentError::Storage(e.to_string())
    }
}

/// Main error type for the gateway
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Required startup configuration missing or malformed
    #[error("{0}")]
    Configuration(String),

    /// Malformed identifier or request body
    #[error("{0}")]
    Validation(String),

    /// Syntactically valid identifier that resolves to nothing
    #[error("{0}")]
    NotFound(String),

    /// Known path, unsupported method
    #[error("{0}")]
    MethodNotAllowed(String),

    /// Identity agent rejected the operation
    #[error(transparent)]
    Agent(#[from] AgentError),

    /// Readiness gate failed, requests cannot be served
    #[error("{0}")]
    Unavailable(String),

    /// Agent or listener could not be brought up
    #[error("startup failed: {0}")]
    Startup(String),

    /// One or more resources failed to release
    #[error("shutdown failed: {}", .0.join("; "))]
    Shutdown(Vec<String>),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl GatewayError {
    /// HTTP status written before the error body
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::Validation(_) => StatusCode::BAD_REQUEST,
            GatewayError::NotFound(_) => StatusCode::NOT_FOUND,
            GatewayError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            GatewayError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            GatewayError::Agent(e) => e.status().unwrap_or(DEFAULT_ERROR_STATUS),
            GatewayError::Configuration(_)
            | GatewayError::Startup(_)
            | GatewayError::Shutdown(_)
            | GatewayError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message echoed to the client
    pub fn message(&self) -> String {
        self.to_string()
    }
}

/// Result type alias for gateway operations
pub type GatewayResult<T> = Result<T, GatewayError>;

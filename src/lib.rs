/// jlinx gateway
///
/// HTTP front end that resolves DIDs to DID documents and lets callers create
/// and amend DIDs. Everything cryptographic or durable is delegated to an
/// identity agent behind [`agent::IdentityAgent`]; this crate owns routing,
/// identifier validation, content negotiation and error rendering.

pub mod agent;
pub mod api;
pub mod config;
pub mod context;
pub mod error;
pub mod gateway;
pub mod identity;
pub mod render;
pub mod server;

pub use config::GatewayConfig;
pub use context::AppContext;
pub use error::{AgentError, GatewayError, GatewayResult};
pub use gateway::{Gateway, GatewayState};

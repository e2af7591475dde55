/// API routes and handlers
pub mod body;
pub mod did;
pub mod home;
pub mod middleware;
pub mod status;

use crate::{
    context::AppContext,
    error::{AgentError, GatewayError},
};
use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};
use std::future::Future;

/// Build API routes
///
/// Every route that touches the agent sits behind the readiness gate.
/// `/:did` routes additionally run identifier validation first, so an
/// invalid DID never reaches the resolve or amend handlers. A wrong method
/// on any route renders a 405 through the error renderer.
pub fn routes(ctx: AppContext) -> Router<AppContext> {
    let did_routes = Router::new()
        .route(
            "/:did",
            get(did::resolve_did)
                .post(did::amend_did)
                .fallback(home::method_not_allowed),
        )
        .route_layer(from_fn_with_state(ctx.clone(), middleware::await_ready))
        .route_layer(from_fn(middleware::validate_did));

    let agent_routes = Router::new()
        .route(
            "/status",
            get(status::status).fallback(home::method_not_allowed),
        )
        .route(
            "/new",
            post(did::create_did).fallback(home::method_not_allowed),
        )
        .route_layer(from_fn_with_state(ctx, middleware::await_ready));

    Router::new()
        .route("/", get(home::home).fallback(home::method_not_allowed))
        .merge(agent_routes)
        .merge(did_routes)
}

/// Run an agent call on its own task
///
/// If the client disconnects the handler future is dropped, but the agent
/// call still runs to completion.
pub(crate) async fn detached<T, F>(call: F) -> Result<T, GatewayError>
where
    F: Future<Output = Result<T, AgentError>> + Send + 'static,
    T: Send + 'static,
{
    match tokio::spawn(call).await {
        Ok(result) => result.map_err(GatewayError::from),
        Err(e) => Err(GatewayError::Agent(AgentError::Rejected {
            message: format!("identity agent task failed: {}", e),
            status: Some(500),
        })),
    }
}

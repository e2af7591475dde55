/// Request gating middleware
use crate::{
    context::AppContext,
    error::GatewayError,
    identity::Did,
    render::{render_error, Representation},
};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

/// Reject path identifiers that are not valid DIDs
///
/// The segment is checked as it appears on the wire. Percent-encoding is part
/// of DID syntax, so decoding first would change the identifier. On success
/// the parsed [`Did`] is stored in request extensions for the handler.
pub async fn validate_did(repr: Representation, mut req: Request, next: Next) -> Response {
    let raw = did_segment(req.uri().path()).to_string();

    match Did::parse(&raw) {
        Some(did) => {
            req.extensions_mut().insert(did);
            next.run(req).await
        }
        None => render_error(
            repr,
            &GatewayError::Validation(format!("invalid did DID={}", raw)),
        ),
    }
}

/// Hold the request until the identity agent is ready
///
/// Requests arriving during startup wait rather than race the agent. If
/// startup failed, or the gateway is stopping, they get a 503.
pub async fn await_ready(
    State(ctx): State<AppContext>,
    repr: Representation,
    req: Request,
    next: Next,
) -> Response {
    match ctx.readiness.wait().await {
        Ok(()) => next.run(req).await,
        Err(reason) => render_error(repr, &GatewayError::Unavailable(reason)),
    }
}

/// The single path segment matched by `/:did`
fn did_segment(path: &str) -> &str {
    path.strip_prefix('/').unwrap_or(path)
}

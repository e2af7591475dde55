/// DID endpoints: resolve, create and amend
use crate::{
    agent::{Amendment, CreatedDid},
    api::{body::AmendBody, detached},
    context::AppContext,
    error::GatewayError,
    identity::Did,
    render::{render_document, RenderedError, Representation},
};
use axum::{extract::State, response::Response, Extension, Json};
use serde_json::{json, Value};

/// `GET /:did`
///
/// 404 when the agent has no document or the document is `null`, otherwise the document as HTML or
/// JSON depending on the Accept header.
pub async fn resolve_did(
    State(ctx): State<AppContext>,
    repr: Representation,
    Extension(did): Extension<Did>,
) -> Result<Response, RenderedError> {
    let document = ctx
        .agent
        .resolve_did(&did)
        .await
        .map_err(|e| repr.error(e))?
        .filter(|document| !document.is_null())
        .ok_or_else(|| {
            repr.error(GatewayError::NotFound(format!(
                "unable to resolve DID={}",
                did
            )))
        })?;

    Ok(render_document(repr, &did, &document))
}

/// `POST /new`
///
/// Not idempotent: every call issues a new DID and secret.
pub async fn create_did(
    State(ctx): State<AppContext>,
    repr: Representation,
) -> Result<Json<CreatedDid>, RenderedError> {
    let agent = ctx.agent.clone();
    let created = detached(async move { agent.create_did().await })
        .await
        .map_err(|e| repr.error(e))?;

    Ok(Json(created))
}

/// `POST /:did`
///
/// The secret is not checked here; the agent fails the call if it is wrong.
pub async fn amend_did(
    State(ctx): State<AppContext>,
    repr: Representation,
    Extension(did): Extension<Did>,
    body: AmendBody,
) -> Result<Json<Value>, RenderedError> {
    tracing::debug!(did = %did, "amending did");

    let amendment = Amendment {
        did,
        secret: body.secret.unwrap_or_default(),
        value: body.value,
    };
    let agent = ctx.agent.clone();
    detached(async move { agent.amend_did(amendment).await })
        .await
        .map_err(|e| repr.error(e))?;

    Ok(Json(json!({})))
}

/// Agent storage status
use crate::{
    context::AppContext,
    render::{RenderedError, Representation},
};
use axum::{extract::State, Json};
use serde::Serialize;

/// `GET /status` body
///
/// The key reflects the agent's storage engine; its contents are opaque here.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub hypercore: serde_json::Value,
}

pub async fn status(
    State(ctx): State<AppContext>,
    repr: Representation,
) -> Result<Json<StatusResponse>, RenderedError> {
    let hypercore = ctx.agent.status().await.map_err(|e| repr.error(e))?;
    Ok(Json(StatusResponse { hypercore }))
}

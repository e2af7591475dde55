/// Amendment request body
use crate::{
    error::GatewayError,
    render::{RenderedError, Representation},
};
use axum::{
    async_trait,
    extract::{FromRequest, Request},
    http::header::CONTENT_TYPE,
    Form, Json,
};
use serde::Deserialize;

/// `{secret, value}` from a JSON or URL-encoded body
///
/// Missing fields are passed through as-is; judging the secret is the
/// agent's job.
#[derive(Debug, Default, Deserialize)]
pub struct AmendBody {
    #[serde(default)]
    pub secret: Option<String>,
    #[serde(default)]
    pub value: serde_json::Value,
}

#[async_trait]
impl<S> FromRequest<S> for AmendBody
where
    S: Send + Sync,
{
    type Rejection = RenderedError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let repr = Representation::from_headers(req.headers());
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        if content_type.starts_with("application/json") {
            let Json(body) = Json::<AmendBody>::from_request(req, state)
                .await
                .map_err(|e| repr.error(GatewayError::Validation(e.body_text())))?;
            Ok(body)
        } else if content_type.starts_with("application/x-www-form-urlencoded") {
            let Form(body) = Form::<AmendBody>::from_request(req, state)
                .await
                .map_err(|e| repr.error(GatewayError::Validation(e.body_text())))?;
            Ok(body)
        } else {
            Ok(AmendBody::default())
        }
    }
}

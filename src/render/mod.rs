/// Content negotiation and response rendering
///
/// Every endpoint picks its representation with [`Representation::negotiate`]
/// and every failure goes through [`render_error`], so the shape of an error
/// response never depends on which route produced it.

pub mod negotiate;
pub mod views;

pub use negotiate::Representation;

use crate::{agent::Document, error::GatewayError, identity::Did};
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// JSON error body
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// The single error rendering path
///
/// Logs the failure, sets the status, then writes either the HTML error view
/// or `{"error": message}`.
pub fn render_error(repr: Representation, error: &GatewayError) -> Response {
    let status = error.status();
    let message = error.message();

    if status.is_server_error() {
        tracing::error!(status = status.as_u16(), error = %message, "request failed");
    } else {
        tracing::warn!(status = status.as_u16(), error = %message, "request rejected");
    }

    match repr {
        Representation::Html => (status, Html(views::error(&message))).into_response(),
        Representation::Json => (status, Json(ErrorBody { error: message })).into_response(),
    }
}

/// Render a resolved document
pub fn render_document(repr: Representation, did: &Did, document: &Document) -> Response {
    match repr {
        Representation::Html => {
            let pretty =
                serde_json::to_string_pretty(document).unwrap_or_else(|_| document.to_string());
            (StatusCode::OK, Html(views::did(did.as_str(), &pretty))).into_response()
        }
        Representation::Json => (StatusCode::OK, Json(document)).into_response(),
    }
}

/// Landing page
pub fn render_index() -> Response {
    Html(views::index()).into_response()
}

/// A failure bound to the representation the client asked for
///
/// Handlers return this as their error type; converting it to a response
/// goes through [`render_error`].
#[derive(Debug)]
pub struct RenderedError {
    pub repr: Representation,
    pub error: GatewayError,
}

impl IntoResponse for RenderedError {
    fn into_response(self) -> Response {
        render_error(self.repr, &self.error)
    }
}

impl Representation {
    /// Bind an error to this representation
    pub fn error(self, error: impl Into<GatewayError>) -> RenderedError {
        RenderedError {
            repr: self,
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AgentError;
    use axum::http::header::CONTENT_TYPE;
    use http_body_util::BodyExt;

    async fn body_string(response: Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_json_error_shape() {
        let err = GatewayError::Validation("invalid did DID=nope".into());
        let response = render_error(Representation::Json, &err);

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(response.headers()[CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("application/json"));
        let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body, serde_json::json!({"error": "invalid did DID=nope"}));
    }

    #[tokio::test]
    async fn test_html_error_shape() {
        let err = GatewayError::NotFound("unable to resolve DID=did:a:<b>".into());
        let response = render_error(Representation::Html, &err);

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.headers()[CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/html"));
        let body = body_string(response).await;
        assert!(body.contains("unable to resolve DID=did:a:&lt;b&gt;"));
    }

    #[tokio::test]
    async fn test_agent_error_without_status_renders_401() {
        let err = GatewayError::from(AgentError::Storage("disk".into()));
        let response = render_error(Representation::Json, &err);
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_document_json_round_trip() {
        let did = Did::parse("did:example:1").unwrap();
        let document = serde_json::json!({
            "id": "did:example:1",
            "nested": {"list": [1, 2.5, null, true], "text": "caf\u{e9}"},
            "zeta": 1,
            "alpha": 2
        });

        let response = render_document(Representation::Json, &did, &document);
        assert_eq!(response.status(), StatusCode::OK);
        let back: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(back, document);
    }

    #[tokio::test]
    async fn test_document_html_is_pretty_printed() {
        let did = Did::parse("did:example:1").unwrap();
        let document = serde_json::json!({"id": "did:example:1"});

        let response = render_document(Representation::Html, &did, &document);
        let body = body_string(response).await;
        assert!(body.contains("did:example:1"));
        assert!(body.contains("{\n  &quot;id&quot;: &quot;did:example:1&quot;\n}"));
    }
}

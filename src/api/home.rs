/// Landing page and fallback
use crate::{
    error::GatewayError,
    render::{render_error, render_index, Representation},
};
use axum::{
    extract::Query,
    http::{header::LOCATION, HeaderValue, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct HomeQuery {
    pub did: Option<String>,
}

/// `GET /`
///
/// `?did=did:...` redirects to `/<did>` whatever the Accept header says.
/// The identifier is written into `Location` as-is, so an existing
/// percent-escape reaches `/:did` unchanged. Characters a DID cannot carry
/// literally are percent-encoded. Otherwise HTML clients get the landing page and everyone else falls
/// through to the 404 fallback.
pub async fn home(
    repr: Representation,
    method: Method,
    uri: Uri,
    query: Option<Query<HomeQuery>>,
) -> Response {
    let did = query.and_then(|Query(q)| q.did);

    if let Some(did) = did.filter(|did| did.starts_with("did:")) {
        return match HeaderValue::try_from(format!("/{}", redirect_target(&did))) {
            Ok(location) => (StatusCode::FOUND, [(LOCATION, location)]).into_response(),
            Err(_) => render_error(
                repr,
                &GatewayError::Validation(format!("invalid did DID={}", did)),
            ),
        };
    }

    match repr {
        Representation::Html => render_index(),
        Representation::Json => not_found(repr, method, uri).await,
    }
}

/// Percent-encode every character outside the DID alphabet
fn redirect_target(did: &str) -> String {
    let mut target = String::with_capacity(did.len());
    let mut buf = [0u8; 4];
    for c in did.chars() {
        if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | ':' | '%') {
            target.push(c);
        } else {
            target.push_str(&urlencoding::encode(c.encode_utf8(&mut buf)));
        }
    }
    target
}

/// Known path, wrong method
pub async fn method_not_allowed(repr: Representation, method: Method, uri: Uri) -> Response {
    render_error(
        repr,
        &GatewayError::MethodNotAllowed(format!("Cannot {} {}", method, uri.path())),
    )
}

/// Fallback for anything no route claimed
pub async fn not_found(repr: Representation, method: Method, uri: Uri) -> Response {
    render_error(
        repr,
        &GatewayError::NotFound(format!("Cannot {} {}", method, uri.path())),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redirect_target_keeps_did_characters() {
        assert_eq!(redirect_target("did:jlinx:Ab-9_x.y"), "did:jlinx:Ab-9_x.y");
        assert_eq!(redirect_target("did:example:abc%20def"), "did:example:abc%20def");
    }

    #[test]
    fn test_redirect_target_encodes_everything_else() {
        assert_eq!(redirect_target("did:example:a b"), "did:example:a%20b");
        assert_eq!(redirect_target("did:example:a/b?c#d"), "did:example:a%2Fb%3Fc%23d");
        assert_eq!(redirect_target("did:example:caf\u{e9}"), "did:example:caf%C3%A9");
    }
}

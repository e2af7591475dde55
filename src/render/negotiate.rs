/// Accept header negotiation between HTML and JSON
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::ACCEPT, request::Parts, HeaderMap},
};
use std::convert::Infallible;

/// Response representation chosen for a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Representation {
    Html,
    Json,
}

/// One entry of an Accept header
#[derive(Debug, Clone, PartialEq)]
pub struct MediaRange {
    pub kind: String,
    pub subtype: String,
    pub quality: f32,
}

impl MediaRange {
    fn matches(&self, kind: &str, subtype: &str) -> bool {
        (self.kind == "*" || self.kind == kind) && (self.subtype == "*" || self.subtype == subtype)
    }

    /// Exact ranges beat `type/*`, which beats `*/*`
    fn specificity(&self) -> u8 {
        match (self.kind.as_str(), self.subtype.as_str()) {
            ("*", _) => 0,
            (_, "*") => 1,
            _ => 2,
        }
    }
}

impl Representation {
    /// Pick HTML iff `text/html` is listed explicitly and no JSON-compatible
    /// range is preferred over it. JSON otherwise, including when no Accept
    /// header was sent.
    pub fn negotiate(accept: Option<&str>) -> Self {
        let Some(accept) = accept else {
            return Representation::Json;
        };
        let ranges = parse_accept(accept);

        let html = ranges
            .iter()
            .filter(|r| r.kind == "text" && r.subtype == "html")
            .map(|r| r.quality)
            .fold(0.0_f32, f32::max);
        let json = quality_for(&ranges, "application", "json");

        if html > 0.0 && html >= json {
            Representation::Html
        } else {
            Representation::Json
        }
    }

    /// Negotiate from every Accept header on a request
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let values: Vec<&str> = headers
            .get_all(ACCEPT)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect();

        if values.is_empty() {
            Representation::Json
        } else {
            Representation::negotiate(Some(&values.join(",")))
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Representation
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Representation::from_headers(&parts.headers))
    }
}

/// Parse an Accept header, skipping malformed entries
pub fn parse_accept(header: &str) -> Vec<MediaRange> {
    header
        .split(',')
        .filter_map(|entry| {
            let mut params = entry.split(';');
            let media = params.next()?.trim().to_ascii_lowercase();
            let (kind, subtype) = media.split_once('/')?;
            if kind.is_empty() || subtype.is_empty() {
                return None;
            }

            let mut quality = 1.0;
            for param in params {
                if let Some((name, value)) = param.split_once('=') {
                    if name.trim().eq_ignore_ascii_case("q") {
                        quality = value.trim().parse::<f32>().ok()?.clamp(0.0, 1.0);
                    }
                }
            }

            Some(MediaRange {
                kind: kind.to_string(),
                subtype: subtype.to_string(),
                quality,
            })
        })
        .collect()
}

/// Quality of the most specific range matching `kind/subtype`, 0 if none
fn quality_for(ranges: &[MediaRange], kind: &str, subtype: &str) -> f32 {
    ranges
        .iter()
        .filter(|r| r.matches(kind, subtype))
        .max_by(|a, b| {
            a.specificity()
                .cmp(&b.specificity())
                .then(a.quality.total_cmp(&b.quality))
        })
        .map(|r| r.quality)
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_negotiation_table() {
        let cases = [
            (None, Representation::Json),
            (Some(""), Representation::Json),
            (Some("*/*"), Representation::Json),
            (Some("application/json"), Representation::Json),
            (Some("text/html"), Representation::Html),
            (Some("TEXT/HTML"), Representation::Html),
            (
                Some("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
                Representation::Html,
            ),
            (Some("text/html, application/json"), Representation::Html),
            (Some("application/json, text/html;q=0.9"), Representation::Json),
            (Some("text/html;q=0.5, */*"), Representation::Json),
            (Some("text/html;q=0"), Representation::Json),
            (Some("text/*"), Representation::Json),
            (Some("text/html;q=0.7, application/*;q=0.7"), Representation::Html),
            (Some("text/html;q=bogus"), Representation::Json),
        ];

        for (accept, expected) in cases {
            assert_eq!(Representation::negotiate(accept), expected, "Accept: {:?}", accept);
        }
    }

    #[test]
    fn test_parse_accept() {
        let ranges = parse_accept("text/html; charset=utf-8; q=0.4, garbage, application/json");
        assert_eq!(
            ranges,
            vec![
                MediaRange {
                    kind: "text".into(),
                    subtype: "html".into(),
                    quality: 0.4
                },
                MediaRange {
                    kind: "application".into(),
                    subtype: "json".into(),
                    quality: 1.0
                },
            ]
        );
    }

    #[test]
    fn test_most_specific_range_wins() {
        // application/json;q=0 excludes JSON even though */* would allow it
        let ranges = parse_accept("*/*, application/json;q=0");
        assert_eq!(quality_for(&ranges, "application", "json"), 0.0);
        assert_eq!(quality_for(&ranges, "image", "png"), 1.0);
    }

    #[test]
    fn test_multiple_accept_headers_are_combined() {
        let mut headers = HeaderMap::new();
        headers.append(ACCEPT, HeaderValue::from_static("application/json;q=0.5"));
        headers.append(ACCEPT, HeaderValue::from_static("text/html"));
        assert_eq!(Representation::from_headers(&headers), Representation::Html);

        assert_eq!(Representation::from_headers(&HeaderMap::new()), Representation::Json);
    }
}

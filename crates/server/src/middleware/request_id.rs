//! Request correlation IDs.
//!
//! Every response carries `x-request-id`. An upstream value is reused when it
//! looks sane; otherwise a UUID v4 is generated. The ID is tagged on the Sentry
//! scope and recorded on the current span.

use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use tracing::Span;
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

const MAX_UPSTREAM_ID_LEN: usize = 128;

/// The correlation ID of the current request, available as an extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(pub String);

fn upstream_id(request: &Request) -> Option<String> {
    let raw = request.headers().get(REQUEST_ID_HEADER)?.to_str().ok()?;
    let valid = !raw.is_empty()
        && raw.len() <= MAX_UPSTREAM_ID_LEN
        && raw.bytes().all(|b| b.is_ascii_graphic());
    valid.then(|| raw.to_owned())
}

pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let request_id = upstream_id(&request).unwrap_or_else(|| Uuid::new_v4().to_string());

    Span::current().record("request_id", request_id.as_str());
    sentry::configure_scope(|scope| scope.set_tag("request_id", &request_id));
    request
        .extensions_mut()
        .insert(RequestId(request_id.clone()));

    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::Body;

    use super::*;

    fn with_header(value: &str) -> Request {
        Request::builder()
            .header(REQUEST_ID_HEADER, value)
            .body(Body::empty())
            .unwrap()
    }

    #[test]
    fn test_upstream_id_reused() {
        assert_eq!(upstream_id(&with_header("abc-123")).as_deref(), Some("abc-123"));
    }

    #[test]
    fn test_unreasonable_upstream_id_ignored() {
        assert!(upstream_id(&with_header("has space")).is_none());
        assert!(upstream_id(&with_header(&"x".repeat(MAX_UPSTREAM_ID_LEN + 1))).is_none());
        assert!(upstream_id(&Request::new(Body::empty())).is_none());
    }
}

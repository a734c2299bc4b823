//! Rate limiting middleware using governor and `tower_governor`.
//!
//! Only the unauthenticated write endpoints (login, setup, contact form) are
//! limited; everything else is either read-only or behind a bearer token.
//!
//! Clients are keyed by the TCP peer address. Proxy headers are only read when
//! `TRUST_PROXY_HEADERS` is set, since any client can send them.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::extract::ConnectInfo;
use axum::http::{HeaderMap, Request};
use axum::response::{IntoResponse, Response};
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use tower_governor::{GovernorError, GovernorLayer, governor::GovernorConfigBuilder};

use crate::error::AppError;

/// Key extractor for the client IP.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClientIpKeyExtractor {
    trust_proxy_headers: bool,
}

impl ClientIpKeyExtractor {
    /// Key on the peer address, or on proxy headers when `trust_proxy_headers`.
    #[must_use]
    pub const fn new(trust_proxy_headers: bool) -> Self {
        Self {
            trust_proxy_headers,
        }
    }

    /// The address our own reverse proxy appended: the right-most
    /// `X-Forwarded-For` hop, then `X-Real-IP`.
    fn forwarded_ip(headers: &HeaderMap) -> Option<IpAddr> {
        headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.rsplit(',').next())
            .and_then(|s| s.trim().parse::<IpAddr>().ok())
            .or_else(|| {
                headers
                    .get("x-real-ip")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|s| s.trim().parse::<IpAddr>().ok())
            })
    }
}

impl tower_governor::key_extractor::KeyExtractor for ClientIpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        let forwarded = if self.trust_proxy_headers {
            Self::forwarded_ip(req.headers())
        } else {
            None
        };

        forwarded
            .or_else(|| {
                req.extensions()
                    .get::<ConnectInfo<SocketAddr>>()
                    .map(|ConnectInfo(addr)| addr.ip())
            })
            .ok_or(GovernorError::UnableToExtractKey)
    }
}

/// Turn a limiter rejection into the API's JSON error body.
///
/// Keeps the `retry-after` and `x-ratelimit-*` headers governor attaches.
fn rate_limit_response(err: GovernorError) -> Response {
    let (error, headers) = match err {
        GovernorError::TooManyRequests { headers, .. } => (AppError::RateLimited, headers),
        GovernorError::UnableToExtractKey => (
            AppError::Internal("unable to determine client address".to_owned()),
            None,
        ),
        GovernorError::Other { msg, headers, .. } => (
            AppError::Internal(msg.unwrap_or_else(|| "rate limiter failure".to_owned())),
            headers,
        ),
    };

    let mut response = error.into_response();
    if let Some(headers) = headers {
        response.headers_mut().extend(headers);
    }
    response
}

/// Rate limiter layer type for Axum.
pub type RateLimiterLayer =
    GovernorLayer<ClientIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Create rate limiter for login and setup: ~10 requests per minute per IP.
///
/// Configuration: 1 request every 6 seconds (replenish), burst of 5.
///
/// # Panics
///
/// This function will not panic. The configuration uses only valid positive
/// integers (`per_second(6)` and `burst_size(5)`), which are always accepted
/// by `GovernorConfigBuilder`.
#[must_use]
pub fn auth_rate_limiter(trust_proxy_headers: bool) -> RateLimiterLayer {
    let config = GovernorConfigBuilder::default()
        .key_extractor(ClientIpKeyExtractor::new(trust_proxy_headers))
        .per_second(6) // Replenish 1 token every 6 seconds (~10/minute)
        .burst_size(5) // Allow burst of 5 requests
        .finish()
        .expect("rate limiter config with per_second(6) and burst_size(5) is valid");
    GovernorLayer::new(Arc::new(config)).error_handler(rate_limit_response)
}

/// Create rate limiter for the contact form: ~5 messages per minute per IP.
///
/// Configuration: 1 request every 12 seconds (replenish), burst of 3.
///
/// # Panics
///
/// This function will not panic. The configuration uses only valid positive
/// integers (`per_second(12)` and `burst_size(3)`), which are always accepted
/// by `GovernorConfigBuilder`.
#[must_use]
pub fn contact_rate_limiter(trust_proxy_headers: bool) -> RateLimiterLayer {
    let config = GovernorConfigBuilder::default()
        .key_extractor(ClientIpKeyExtractor::new(trust_proxy_headers))
        .per_second(12)
        .burst_size(3)
        .finish()
        .expect("rate limiter config with per_second(12) and burst_size(3) is valid");
    GovernorLayer::new(Arc::new(config)).error_handler(rate_limit_response)
}

//! Bearer token authentication for admin routes.
//!
//! [`require_admin`] runs in front of the admin router: a missing token is
//! 401, a token that fails verification is 403. On success the
//! [`AdminIdentity`] is stored in the request extensions, where handlers read
//! it through [`CurrentAdmin`].

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};

use portfolio_core::AdminIdentity;

use crate::error::{AppError, set_sentry_user};
use crate::state::AppState;

/// The token from an `Authorization: Bearer <token>` header, if any.
#[must_use]
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Middleware that rejects requests without a valid admin token.
///
/// # Errors
///
/// Returns `AppError::Unauthorized` when no bearer token is present and
/// `AppError::Forbidden` when it is invalid or expired.
pub async fn require_admin(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(request.headers()).ok_or(AppError::Unauthorized)?;

    let identity = state.tokens().verify(token).map_err(|e| {
        tracing::debug!(error = %e, "Rejected admin token");
        AppError::Forbidden
    })?;

    set_sentry_user(&identity.id, Some(&identity.username));
    request.extensions_mut().insert(identity);

    Ok(next.run(request).await)
}

/// Extractor for the admin attached by [`require_admin`].
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(CurrentAdmin(admin): CurrentAdmin) -> String {
///     format!("Hello, {}!", admin.username)
/// }
/// ```
pub struct CurrentAdmin(pub AdminIdentity);

impl<S> FromRequestParts<S> for CurrentAdmin
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AdminIdentity>()
            .cloned()
            .map(Self)
            .ok_or(AppError::Unauthorized)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token(&headers("Bearer abc.def.ghi")), Some("abc.def.ghi"));
        assert_eq!(bearer_token(&headers("bearer abc")), Some("abc"));
        assert_eq!(bearer_token(&headers("Basic dXNlcjpwYXNz")), None);
        assert_eq!(bearer_token(&headers("Bearer ")), None);
        assert_eq!(bearer_token(&headers("Bearer")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }
}

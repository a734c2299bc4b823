//! HS256 bearer tokens for admin sessions.

use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use jwt::{SignWithKey, VerifyWithKey};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;

use portfolio_core::{AdminId, AdminIdentity};

/// How long an issued token stays valid.
pub const TOKEN_LIFETIME_DAYS: i64 = 7;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("signing key rejected")]
    Key,

    #[error("failed to sign token: {0}")]
    Signing(#[source] jwt::Error),

    #[error("token signature or format is invalid")]
    Invalid,

    #[error("token expired")]
    Expired,
}

/// Claims carried by an admin token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminClaims {
    pub id: AdminId,
    pub username: String,
    /// Issued at, seconds since the epoch.
    pub iat: i64,
    /// Expiry, seconds since the epoch.
    pub exp: i64,
}

/// Issues and verifies admin bearer tokens with a shared secret.
#[derive(Clone)]
pub struct TokenService {
    secret: SecretString,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService").finish_non_exhaustive()
    }
}

impl TokenService {
    #[must_use]
    pub const fn new(secret: SecretString) -> Self {
        Self { secret }
    }

    fn key(&self) -> Result<Hmac<Sha256>, TokenError> {
        Hmac::<Sha256>::new_from_slice(self.secret.expose_secret().as_bytes())
            .map_err(|_| TokenError::Key)
    }

    /// Issue a token valid for [`TOKEN_LIFETIME_DAYS`] from now.
    ///
    /// # Errors
    ///
    /// Returns `TokenError` if the key is unusable or signing fails.
    pub fn issue(&self, identity: &AdminIdentity) -> Result<String, TokenError> {
        self.issue_at(identity, Utc::now())
    }

    /// Issue a token as if the current time were `issued_at`.
    ///
    /// # Errors
    ///
    /// Returns `TokenError` if the key is unusable or signing fails.
    pub fn issue_at(
        &self,
        identity: &AdminIdentity,
        issued_at: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let claims = AdminClaims {
            id: identity.id,
            username: identity.username.clone(),
            iat: issued_at.timestamp(),
            exp: (issued_at + Duration::days(TOKEN_LIFETIME_DAYS)).timestamp(),
        };
        claims
            .sign_with_key(&self.key()?)
            .map_err(TokenError::Signing)
    }

    /// Check signature and expiry, returning the identity the token carries.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Invalid` for a bad signature or malformed token and
    /// `TokenError::Expired` once the expiry has passed.
    pub fn verify(&self, token: &str) -> Result<AdminIdentity, TokenError> {
        self.verify_at(token, Utc::now())
    }

    /// [`TokenService::verify`] against an explicit clock.
    ///
    /// # Errors
    ///
    /// See [`TokenService::verify`].
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<AdminIdentity, TokenError> {
        let claims: AdminClaims = token
            .verify_with_key(&self.key()?)
            .map_err(|_| TokenError::Invalid)?;

        // The jwt crate checks the signature only.
        if claims.exp <= now.timestamp() {
            return Err(TokenError::Expired);
        }

        Ok(AdminIdentity {
            id: claims.id,
            username: claims.username,
        })
    }
}

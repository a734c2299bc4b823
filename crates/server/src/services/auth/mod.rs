//! Authentication service.
//!
//! Password login for the single site owner, the one-time admin bootstrap, and
//! bearer token issuance.

mod error;
pub mod token;

pub use error::AuthError;
pub use token::{AdminClaims, TOKEN_LIFETIME_DAYS, TokenError, TokenService};

use std::sync::LazyLock;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use portfolio_core::{AdminIdentity, AdminProfile, Email, LoginRequest, LoginResponse, SetupRequest};

use crate::db::Store;
use crate::models::NewAdmin;

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Hash verified when the username is unknown, so both failure paths cost
/// one Argon2 verification.
static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("not-a-real-admin-password").ok());

/// Authentication service.
///
/// Handles admin login and first-admin setup.
pub struct AuthService<'a> {
    store: &'a dyn Store,
    tokens: &'a TokenService,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(store: &'a dyn Store, tokens: &'a TokenService) -> Self {
        Self { store, tokens }
    }

    /// Login with username and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the username is unknown or
    /// the password is wrong.
    #[tracing::instrument(skip(self, request), fields(username = %request.username))]
    pub async fn login(&self, request: LoginRequest) -> Result<LoginResponse, AuthError> {
        if request.username.trim().is_empty() || request.password.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }

        let Some(credentials) = self
            .store
            .find_admin_credentials(&request.username)
            .await?
        else {
            if let Some(dummy) = DUMMY_HASH.as_ref() {
                let _ = verify_password_blocking(request.password, dummy.clone()).await;
            }
            return Err(AuthError::InvalidCredentials);
        };

        verify_password_blocking(request.password, credentials.password_hash).await?;

        let admin = credentials.profile;
        let token = self.tokens.issue(&AdminIdentity {
            id: admin.id,
            username: admin.username.clone(),
        })?;

        tracing::info!(admin_id = %admin.id, "Admin logged in");
        Ok(LoginResponse { token, admin })
    }

    /// Create the first admin if none exists.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::AdminExists` once any admin exists, and
    /// `AuthError::InvalidInput` for a blank username, a short password or a
    /// malformed email.
    #[tracing::instrument(skip(self, request))]
    pub async fn setup(&self, request: SetupRequest) -> Result<AdminProfile, AuthError> {
        if self.store.count_admins().await? > 0 {
            return Err(AuthError::AdminExists);
        }

        let username = request.username.unwrap_or_default().trim().to_owned();
        if username.is_empty() {
            return Err(AuthError::InvalidInput("Username is required".to_owned()));
        }
        let password = request.password.unwrap_or_default();
        validate_password(&password)?;
        let email = request
            .email
            .filter(|e| !e.trim().is_empty())
            .map(|e| Email::parse(e.trim()))
            .transpose()
            .map_err(|_| AuthError::InvalidInput("Please enter a valid email address".to_owned()))?;

        register_first_admin(self.store, username, password, email).await
    }
}

/// Hash the password and insert the first admin atomically.
///
/// # Errors
///
/// Returns `AuthError::AdminExists` if an admin was created first.
pub async fn register_first_admin(
    store: &dyn Store,
    username: String,
    password: String,
    email: Option<Email>,
) -> Result<AdminProfile, AuthError> {
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AuthError::PasswordHash(e.to_string()))??;

    let admin = store
        .create_first_admin(NewAdmin {
            username,
            email,
            password_hash,
        })
        .await?
        .ok_or(AuthError::AdminExists)?;

    tracing::info!(admin_id = %admin.id, username = %admin.username, "Admin created");
    Ok(admin)
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::InvalidInput(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::PasswordHash(e.to_string()))
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

async fn verify_password_blocking(password: String, hash: String) -> Result<(), AuthError> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| AuthError::PasswordHash(e.to_string()))?
}

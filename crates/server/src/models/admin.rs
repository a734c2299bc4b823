//! Admin credential types.
//!
//! These carry password hashes and are kept out of any serialized response.

use portfolio_core::{AdminProfile, Email};

/// A first admin ready to be inserted.
#[derive(Clone)]
pub struct NewAdmin {
    pub username: String,
    pub email: Option<Email>,
    /// Argon2id PHC string.
    pub password_hash: String,
}

impl std::fmt::Debug for NewAdmin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewAdmin")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password_hash", &"[REDACTED]")
            .finish()
    }
}

/// A stored admin together with its password hash, used only for login.
#[derive(Clone)]
pub struct AdminCredentials {
    pub profile: AdminProfile,
    pub password_hash: String,
}

impl std::fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("profile", &self.profile)
            .field("password_hash", &"[REDACTED]")
            .finish()
    }
}

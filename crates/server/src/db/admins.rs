//! `PostgreSQL` admin repository.

use async_trait::async_trait;

use portfolio_core::{AdminId, AdminProfile, Email};

use super::{AdminRepository, PgStore, RepositoryError, conflict_or_database};
use crate::models::{AdminCredentials, NewAdmin};

#[derive(sqlx::FromRow)]
struct AdminRow {
    id: AdminId,
    username: String,
    email: Option<String>,
    password_hash: String,
}

impl AdminRow {
    fn into_profile(self) -> Result<(AdminProfile, String), RepositoryError> {
        let email = self
            .email
            .map(|raw| {
                Email::parse(&raw).map_err(|e| {
                    RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
                })
            })
            .transpose()?;

        Ok((
            AdminProfile {
                id: self.id,
                username: self.username,
                email,
            },
            self.password_hash,
        ))
    }
}

#[async_trait]
impl AdminRepository for PgStore {
    async fn count_admins(&self) -> Result<i64, RepositoryError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM admins")
            .fetch_one(self.pool())
            .await?;
        Ok(count)
    }

    async fn find_admin_credentials(
        &self,
        username: &str,
    ) -> Result<Option<AdminCredentials>, RepositoryError> {
        let row: Option<AdminRow> = sqlx::query_as(
            "SELECT id, username, email, password_hash FROM admins WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(self.pool())
        .await?;

        row.map(|row| {
            let (profile, password_hash) = row.into_profile()?;
            Ok(AdminCredentials {
                profile,
                password_hash,
            })
        })
        .transpose()
    }

    async fn create_first_admin(
        &self,
        admin: NewAdmin,
    ) -> Result<Option<AdminProfile>, RepositoryError> {
        let mut tx = self.pool().begin().await?;

        // Serializes concurrent bootstraps; readers are not blocked.
        sqlx::query("LOCK TABLE admins IN EXCLUSIVE MODE")
            .execute(&mut *tx)
            .await?;

        let (existing,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM admins")
            .fetch_one(&mut *tx)
            .await?;
        if existing > 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        let row: AdminRow = sqlx::query_as(
            r"
            INSERT INTO admins (id, username, email, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING id, username, email, password_hash
            ",
        )
        .bind(AdminId::generate())
        .bind(&admin.username)
        .bind(admin.email.as_ref().map(Email::as_str))
        .bind(&admin.password_hash)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| conflict_or_database(e, "admin"))?;

        tx.commit().await?;

        let (profile, _) = row.into_profile()?;
        Ok(Some(profile))
    }
}

//! # User Repository
//!
//! Read-mostly access to the user directory. Orders only need the summary
//! projection for aggregate enrichment and notification addressing; account
//! management lives elsewhere.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use granja_core::UserSummary;

/// Repository for user lookups.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Creates a new UserRepository.
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Looks up the summary projection for a user.
    pub async fn summary(&self, id: &str) -> DbResult<Option<UserSummary>> {
        let user = sqlx::query_as::<_, UserSummary>(
            "SELECT id, nombre, email, telefono, direccion FROM users WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Inserts a user row. Used by the seed binary and tests.
    pub async fn insert(&self, user: &UserSummary) -> DbResult<()> {
        debug!(id = %user.id, "Inserting user");

        sqlx::query(
            r#"
            INSERT INTO users (id, nombre, email, telefono, direccion, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&user.id)
        .bind(&user.nombre)
        .bind(&user.email)
        .bind(&user.telefono)
        .bind(&user.direccion)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::pool::{Database, DbConfig};

    fn user(id: &str, email: &str) -> UserSummary {
        UserSummary {
            id: id.to_string(),
            nombre: "Ana".to_string(),
            email: email.to_string(),
            telefono: Some("+54 11 5555-0000".to_string()),
            direccion: None,
        }
    }

    #[tokio::test]
    async fn insert_and_summary_round_trip() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.users().insert(&user("u1", "ana@test.local")).await.unwrap();

        let loaded = db.users().summary("u1").await.unwrap().unwrap();
        assert_eq!(loaded.email, "ana@test.local");
        assert!(db.users().summary("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_email_is_a_unique_violation() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.users().insert(&user("u1", "ana@test.local")).await.unwrap();

        let err = db
            .users()
            .insert(&user("u2", "ana@test.local"))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }
}

//! # Settings Repository
//!
//! Accessor for the singleton store-configuration row.
//!
//! Exactly one row is expected; the accessor always reads the lowest-id row
//! so a polluted table still behaves deterministically. A missing row is
//! reported as `None`, never invented, so callers can distinguish "not
//! configured" from "closed".

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use granja_core::{StoreSettings, UpdateSettings};

/// Repository for the store settings row.
#[derive(Debug, Clone)]
pub struct SettingsRepository {
    pool: SqlitePool,
}

const SETTINGS_COLUMNS: &str = "id, esta_abierto, mensaje_alerta, costo_delivery, \
     direccion_local, whatsapp_notificaciones, updated_at";

impl SettingsRepository {
    /// Creates a new SettingsRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SettingsRepository { pool }
    }

    /// Reads the settings row, if one exists.
    pub async fn get(&self) -> DbResult<Option<StoreSettings>> {
        let settings = sqlx::query_as::<_, StoreSettings>(&format!(
            "SELECT {SETTINGS_COLUMNS} FROM settings ORDER BY id LIMIT 1"
        ))
        .fetch_optional(&self.pool)
        .await?;

        Ok(settings)
    }

    /// Inserts the initial settings row. Used by the seed binary.
    pub async fn insert(&self, settings: &StoreSettings) -> DbResult<()> {
        debug!(id = %settings.id, "Inserting settings row");

        sqlx::query(
            r#"
            INSERT INTO settings (
                id, esta_abierto, mensaje_alerta, costo_delivery,
                direccion_local, whatsapp_notificaciones, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&settings.id)
        .bind(settings.esta_abierto)
        .bind(&settings.mensaje_alerta)
        .bind(settings.costo_delivery)
        .bind(&settings.direccion_local)
        .bind(&settings.whatsapp_notificaciones)
        .bind(settings.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Applies a partial update to the settings row. `None` fields keep
    /// their stored value; returns the refreshed row.
    pub async fn update(&self, patch: &UpdateSettings) -> DbResult<StoreSettings> {
        let current = self
            .get()
            .await?
            .ok_or_else(|| DbError::not_found("Settings", "singleton"))?;

        sqlx::query(
            r#"
            UPDATE settings SET
                esta_abierto = COALESCE(?2, esta_abierto),
                mensaje_alerta = COALESCE(?3, mensaje_alerta),
                costo_delivery = COALESCE(?4, costo_delivery),
                direccion_local = COALESCE(?5, direccion_local),
                whatsapp_notificaciones = COALESCE(?6, whatsapp_notificaciones),
                updated_at = ?7
            WHERE id = ?1
            "#,
        )
        .bind(&current.id)
        .bind(patch.esta_abierto)
        .bind(&patch.mensaje_alerta)
        .bind(patch.costo_delivery)
        .bind(&patch.direccion_local)
        .bind(&patch.whatsapp_notificaciones)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        debug!("Settings row updated");

        self.get()
            .await?
            .ok_or_else(|| DbError::not_found("Settings", "singleton"))
    }

    /// Flips the open/closed gate, optionally replacing the alert message.
    pub async fn set_open(&self, open: bool, mensaje_alerta: Option<&str>) -> DbResult<()> {
        self.update(&UpdateSettings {
            esta_abierto: Some(open),
            mensaje_alerta: mensaje_alerta.map(str::to_string),
            ..Default::default()
        })
        .await?;

        Ok(())
    }
}

/// Builds a default settings row for first-time setup.
pub fn default_settings() -> StoreSettings {
    StoreSettings {
        id: Uuid::new_v4().to_string(),
        esta_abierto: true,
        mensaje_alerta: None,
        costo_delivery: 0.0,
        direccion_local: None,
        whatsapp_notificaciones: None,
        updated_at: Utc::now(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    #[tokio::test]
    async fn missing_row_reads_as_none() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        assert!(db.settings().get().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn insert_then_toggle_gate() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.settings().insert(&default_settings()).await.unwrap();

        let loaded = db.settings().get().await.unwrap().unwrap();
        assert!(loaded.esta_abierto);

        db.settings()
            .set_open(false, Some("Cerrado por feriado"))
            .await
            .unwrap();

        let loaded = db.settings().get().await.unwrap().unwrap();
        assert!(!loaded.esta_abierto);
        assert_eq!(loaded.mensaje_alerta.as_deref(), Some("Cerrado por feriado"));

        // Reopening without a message keeps the stored one.
        db.settings().set_open(true, None).await.unwrap();
        let loaded = db.settings().get().await.unwrap().unwrap();
        assert!(loaded.esta_abierto);
        assert_eq!(loaded.mensaje_alerta.as_deref(), Some("Cerrado por feriado"));
    }

    #[tokio::test]
    async fn partial_update_touches_only_patched_fields() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut seeded = default_settings();
        seeded.direccion_local = Some("Av. Siempre Viva 742".to_string());
        db.settings().insert(&seeded).await.unwrap();

        let updated = db
            .settings()
            .update(&UpdateSettings {
                costo_delivery: Some(750.0),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(updated.costo_delivery, 750.0);
        assert!(updated.esta_abierto);
        assert_eq!(updated.direccion_local.as_deref(), Some("Av. Siempre Viva 742"));
        assert!(updated.mensaje_alerta.is_none());
    }

    #[tokio::test]
    async fn update_without_a_row_is_not_found() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let err = db
            .settings()
            .update(&UpdateSettings::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}

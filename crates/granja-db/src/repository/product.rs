//! # Product Repository
//!
//! Database operations for the catalog store.
//!
//! ## Key Operations
//! - CRUD with soft delete (activo flag)
//! - Stock adjustments that always leave an audit movement
//! - Guarded hard delete: a product with historical order items stays
//!
//! ## Stock Update Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  ❌ WRONG: read stock, compute, write absolute value                │
//! │     (two concurrent sellers both read 10, both write 7)             │
//! │                                                                     │
//! │  ✅ CORRECT: conditional delta update in one statement              │
//! │     UPDATE products SET stock = stock + ?delta                      │
//! │     WHERE id = ? AND stock + ?delta >= 0                            │
//! │                                                                     │
//! │  Zero rows affected = the guard failed = no partial write.          │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use granja_core::{LowStockProduct, Product, StockMovement, LOW_STOCK_THRESHOLD};

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

const PRODUCT_COLUMNS: &str =
    "id, nombre, descripcion, precio, stock, activo, categoria_id, created_at, updated_at";

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Gets a product by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Lists active products sorted by name.
    pub async fn list_active(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE activo = 1 ORDER BY nombre"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Inserts a new product.
    pub async fn insert(&self, product: &Product) -> DbResult<Product> {
        debug!(id = %product.id, nombre = %product.nombre, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, nombre, descripcion, precio, stock, activo,
                categoria_id, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&product.id)
        .bind(&product.nombre)
        .bind(&product.descripcion)
        .bind(product.precio)
        .bind(product.stock)
        .bind(product.activo)
        .bind(&product.categoria_id)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(product.clone())
    }

    /// Updates an existing product's catalog fields.
    ///
    /// Does NOT touch stock; stock changes go through [`Self::adjust_stock`]
    /// or the order transaction so they always leave a movement.
    pub async fn update(&self, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, "Updating product");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products SET
                nombre = ?2,
                descripcion = ?3,
                precio = ?4,
                activo = ?5,
                categoria_id = ?6,
                updated_at = ?7
            WHERE id = ?1
            "#,
        )
        .bind(&product.id)
        .bind(&product.nombre)
        .bind(&product.descripcion)
        .bind(product.precio)
        .bind(product.activo)
        .bind(&product.categoria_id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", &product.id));
        }

        Ok(())
    }

    /// Adjusts stock by a signed delta and records the audit movement, both
    /// in one transaction.
    ///
    /// ## Arguments
    /// * `delta` - Positive for restocking, negative for corrections
    /// * `tipo` - Movement kind tag (`reposicion`, `ajuste`, ...)
    /// * `motivo` - Human-readable reason
    pub async fn adjust_stock(
        &self,
        id: &str,
        delta: f64,
        tipo: &str,
        motivo: &str,
    ) -> DbResult<()> {
        debug!(id = %id, delta = %delta, tipo = %tipo, "Adjusting stock");

        let existing = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))?;

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        // Conditional delta update: the guard runs inside the same atomic
        // statement, so concurrent adjustments cannot drive stock negative.
        let result = sqlx::query(
            r#"
            UPDATE products
            SET stock = stock + ?1, updated_at = ?2
            WHERE id = ?3 AND stock + ?1 >= 0
            "#,
        )
        .bind(delta)
        .bind(now)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::StockConflict {
                product_id: existing.id,
            });
        }

        sqlx::query(
            r#"
            INSERT INTO stock_movements (id, product_id, cantidad, tipo, motivo, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(id)
        .bind(delta)
        .bind(tipo)
        .bind(motivo)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(())
    }

    /// Soft-deletes a product by setting activo = false.
    ///
    /// Historical orders still reference it and listings hide it.
    pub async fn soft_delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Soft-deleting product");

        let now = Utc::now();

        let result = sqlx::query("UPDATE products SET activo = 0, updated_at = ?2 WHERE id = ?1")
            .bind(id)
            .bind(now)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Hard-deletes a product.
    ///
    /// Guarded: fails with [`DbError::InUse`] while any order item
    /// references the product.
    pub async fn delete(&self, id: &str) -> DbResult<Product> {
        let existing = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))?;

        let references: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM order_items WHERE product_id = ?1")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;

        if references > 0 {
            return Err(DbError::in_use("Product", id));
        }

        sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(existing)
    }

    /// Active products at or below the low-stock threshold, ascending.
    pub async fn low_stock(&self) -> DbResult<Vec<LowStockProduct>> {
        let products = sqlx::query_as::<_, LowStockProduct>(
            r#"
            SELECT id, nombre, stock
            FROM products
            WHERE activo = 1 AND stock <= ?1
            ORDER BY stock ASC
            "#,
        )
        .bind(LOW_STOCK_THRESHOLD)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Recent stock movements for a product, newest first.
    pub async fn movements(&self, product_id: &str, limit: u32) -> DbResult<Vec<StockMovement>> {
        let movements = sqlx::query_as::<_, StockMovement>(
            r#"
            SELECT id, product_id, cantidad, tipo, motivo, created_at
            FROM stock_movements
            WHERE product_id = ?1
            ORDER BY created_at DESC
            LIMIT ?2
            "#,
        )
        .bind(product_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(movements)
    }

    /// Counts active products (for diagnostics and the seed binary).
    pub async fn count_active(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE activo = 1")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Helper to generate a new product ID.
pub fn generate_product_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use granja_core::MOVEMENT_VENTA;

    fn sample_product(nombre: &str, precio: f64, stock: f64) -> Product {
        let now = Utc::now();
        Product {
            id: generate_product_id(),
            nombre: nombre.to_string(),
            descripcion: None,
            precio,
            stock,
            activo: true,
            categoria_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn insert_and_get_round_trip() {
        let db = test_db().await;
        let product = sample_product("Alas sueltas", 1200.0, 40.0);

        db.products().insert(&product).await.unwrap();

        let loaded = db.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(loaded.nombre, "Alas sueltas");
        assert_eq!(loaded.precio, 1200.0);
        assert_eq!(loaded.stock, 40.0);
        assert!(loaded.activo);
    }

    #[tokio::test]
    async fn adjust_stock_records_movement_and_guards_negative() {
        let db = test_db().await;
        let product = sample_product("Pata muslo", 900.0, 5.0);
        db.products().insert(&product).await.unwrap();

        db.products()
            .adjust_stock(&product.id, -3.0, MOVEMENT_VENTA, "venta manual")
            .await
            .unwrap();

        let loaded = db.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(loaded.stock, 2.0);

        let movements = db.products().movements(&product.id, 10).await.unwrap();
        assert_eq!(movements.len(), 1);
        assert_eq!(movements[0].cantidad, -3.0);

        // Would drive stock to -1: rejected, nothing written.
        let err = db
            .products()
            .adjust_stock(&product.id, -3.0, MOVEMENT_VENTA, "sobreventa")
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::StockConflict { .. }));

        let loaded = db.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(loaded.stock, 2.0);
        assert_eq!(db.products().movements(&product.id, 10).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn soft_delete_hides_from_active_list() {
        let db = test_db().await;
        let product = sample_product("Suprema", 2000.0, 12.0);
        db.products().insert(&product).await.unwrap();

        assert_eq!(db.products().list_active().await.unwrap().len(), 1);

        db.products().soft_delete(&product.id).await.unwrap();

        assert_eq!(db.products().list_active().await.unwrap().len(), 0);
        assert_eq!(db.products().count_active().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn low_stock_filters_and_sorts() {
        let db = test_db().await;
        db.products()
            .insert(&sample_product("Critico A", 100.0, 9.0))
            .await
            .unwrap();
        db.products()
            .insert(&sample_product("Critico B", 100.0, 2.0))
            .await
            .unwrap();
        db.products()
            .insert(&sample_product("Sano", 100.0, 50.0))
            .await
            .unwrap();

        let low = db.products().low_stock().await.unwrap();
        assert_eq!(low.len(), 2);
        assert_eq!(low[0].nombre, "Critico B");
        assert_eq!(low[1].nombre, "Critico A");
    }

    #[tokio::test]
    async fn missing_product_is_not_found() {
        let db = test_db().await;
        let err = db.products().soft_delete("no-such-id").await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}

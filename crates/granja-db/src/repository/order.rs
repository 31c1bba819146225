//! # Order Repository
//!
//! The transactional order write path plus listing, updates, deletes, and
//! the dashboard aggregation.
//!
//! ## The Placement Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  BEGIN                                                              │
//! │    INSERT order header (estado = pendiente, total snapshotted)      │
//! │    for each priced line:                                            │
//! │      INSERT order_item (precio_unitario frozen)                     │
//! │      UPDATE products SET stock = stock - deduct                     │
//! │        WHERE id = ? AND stock >= deduct   ←── conditional guard     │
//! │      rows_affected == 0 → ROLLBACK (StockConflict)                  │
//! │      INSERT stock_movement (negative delta + motivo)                │
//! │  COMMIT                                                             │
//! │                                                                     │
//! │  The guard re-checks stock inside the transaction, so a concurrent  │
//! │  order that consumed the stock between validation and commit fails  │
//! │  cleanly instead of driving stock negative. All-or-nothing: no      │
//! │  order row, item, deduction, or movement survives a failed line.    │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use granja_core::{
    pagination, Dashboard, ListQuery, LowStockProduct, NewOrder, Order, OrderAggregate,
    OrderItem, OrderLineDetail, OrderStatus, Page, PricedLine, Product, TopProduct, UpdateOrder,
    UserSummary, LOW_STOCK_THRESHOLD, MOVEMENT_VENTA,
};

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

const ORDER_COLUMNS: &str = "id, user_id, total, estado, tipo_entrega, metodo_pago, \
     notas, comprobante_url, created_at, updated_at";

/// Shared filter fragment for listing: `?1`/`?2` are the UTC date bounds,
/// `?3` the lowercased search term. NULL binds disable a filter, which keeps
/// the SQL static across every filter combination.
const LIST_FILTER: &str = r#"
    (?1 IS NULL OR o.created_at >= ?1)
    AND (?2 IS NULL OR o.created_at <= ?2)
    AND (?3 IS NULL
         OR instr(lower(o.estado), ?3) > 0
         OR instr(lower(o.tipo_entrega), ?3) > 0
         OR instr(lower(o.metodo_pago), ?3) > 0
         OR instr(lower(COALESCE(u.nombre, '')), ?3) > 0)
"#;

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    // =========================================================================
    // Placement
    // =========================================================================

    /// Atomically writes an order with all its lines, stock deductions, and
    /// audit movements. Returns the new order id.
    ///
    /// The caller (the engine) has already validated quantities, resolved
    /// products, and priced every line from the catalog. This method owns
    /// only the all-or-nothing write and the in-transaction stock guard.
    pub async fn place(&self, header: &NewOrder, lines: &[PricedLine]) -> DbResult<String> {
        let order_id = Uuid::new_v4().to_string();
        let now = Utc::now();

        debug!(
            order_id = %order_id,
            user_id = %header.user_id,
            lines = lines.len(),
            total = header.total,
            "Beginning order placement transaction"
        );

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO orders (
                id, user_id, total, estado, tipo_entrega, metodo_pago,
                notas, comprobante_url, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&order_id)
        .bind(&header.user_id)
        .bind(header.total)
        .bind(OrderStatus::Pendiente)
        .bind(&header.tipo_entrega)
        .bind(&header.metodo_pago)
        .bind(&header.notas)
        .bind(&header.comprobante_url)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        for line in lines {
            sqlx::query(
                r#"
                INSERT INTO order_items (id, order_id, product_id, cantidad, precio_unitario, created_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
            )
            .bind(Uuid::new_v4().to_string())
            .bind(&order_id)
            .bind(&line.product_id)
            .bind(line.cantidad)
            .bind(line.precio_unitario)
            .bind(now)
            .execute(&mut *tx)
            .await?;

            let deduct = line.stock_to_deduct();

            // The guard re-checks availability atomically with the write.
            let result = sqlx::query(
                r#"
                UPDATE products
                SET stock = stock - ?1, updated_at = ?2
                WHERE id = ?3 AND stock >= ?1
                "#,
            )
            .bind(deduct)
            .bind(now)
            .bind(&line.product_id)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                // Dropping tx rolls back everything written so far.
                return Err(DbError::StockConflict {
                    product_id: line.product_id.clone(),
                });
            }

            sqlx::query(
                r#"
                INSERT INTO stock_movements (id, product_id, cantidad, tipo, motivo, created_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
            )
            .bind(Uuid::new_v4().to_string())
            .bind(&line.product_id)
            .bind(-deduct)
            .bind(MOVEMENT_VENTA)
            .bind(line.movement_motivo(&order_id))
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!(order_id = %order_id, total = header.total, "Order placed");

        Ok(order_id)
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Gets an order header by id.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Order>> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(order)
    }

    /// Loads the full aggregate for one order: header, lines with product
    /// snapshots, and the owning-user summary.
    pub async fn get_aggregate(&self, id: &str) -> DbResult<Option<OrderAggregate>> {
        match self.get_by_id(id).await? {
            Some(order) => Ok(Some(self.load_aggregate(order).await?)),
            None => Ok(None),
        }
    }

    async fn load_aggregate(&self, order: Order) -> DbResult<OrderAggregate> {
        let items = sqlx::query_as::<_, OrderItem>(
            r#"
            SELECT id, order_id, product_id, cantidad, precio_unitario, created_at
            FROM order_items
            WHERE order_id = ?1
            ORDER BY created_at, id
            "#,
        )
        .bind(&order.id)
        .fetch_all(&self.pool)
        .await?;

        let mut details = Vec::with_capacity(items.len());
        for item in items {
            let producto = match &item.product_id {
                Some(pid) => {
                    sqlx::query_as::<_, Product>(
                        r#"
                        SELECT id, nombre, descripcion, precio, stock, activo,
                               categoria_id, created_at, updated_at
                        FROM products WHERE id = ?1
                        "#,
                    )
                    .bind(pid)
                    .fetch_optional(&self.pool)
                    .await?
                }
                None => None,
            };
            details.push(OrderLineDetail { item, producto });
        }

        let usuario = sqlx::query_as::<_, UserSummary>(
            "SELECT id, nombre, email, telefono, direccion FROM users WHERE id = ?1",
        )
        .bind(&order.user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(OrderAggregate {
            order,
            items: details,
            usuario,
        })
    }

    /// Filtered, paginated order listing.
    ///
    /// Filters combine with AND; the free-text search ORs across estado,
    /// tipo_entrega, metodo_pago, and the owning user's name. The total is
    /// counted before pagination so page math stays consistent with the
    /// filters actually applied.
    pub async fn list(&self, query: &ListQuery) -> DbResult<Page<OrderAggregate>> {
        let date_from = query.date_from_utc();
        let date_to = query.date_to_utc();
        let search = query.search_term();

        let total_data: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM orders o LEFT JOIN users u ON u.id = o.user_id WHERE {LIST_FILTER}"
        ))
        .bind(date_from)
        .bind(date_to)
        .bind(&search)
        .fetch_one(&self.pool)
        .await?;

        // Unset page_size serves everything in one page (see ListQuery docs).
        let page = query.effective_page();
        let page_size: i64 = match query.page_size {
            Some(size) => i64::from(size),
            None => total_data.max(1),
        };
        let offset = i64::from(page - 1) * page_size;

        // Direction comes from a closed enum, never from user text.
        let direction = query.sort.as_sql();

        let orders = sqlx::query_as::<_, Order>(&format!(
            r#"
            SELECT o.id, o.user_id, o.total, o.estado, o.tipo_entrega, o.metodo_pago,
                   o.notas, o.comprobante_url, o.created_at, o.updated_at
            FROM orders o
            LEFT JOIN users u ON u.id = o.user_id
            WHERE {LIST_FILTER}
            ORDER BY o.created_at {direction}, o.id {direction}
            LIMIT ?4 OFFSET ?5
            "#
        ))
        .bind(date_from)
        .bind(date_to)
        .bind(&search)
        .bind(page_size)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let mut data = Vec::with_capacity(orders.len());
        for order in orders {
            data.push(self.load_aggregate(order).await?);
        }

        Ok(Page {
            total_data,
            page,
            page_size,
            data,
        })
    }

    // =========================================================================
    // Update / Delete
    // =========================================================================

    /// Partially updates an order header. `None` fields keep their stored
    /// value.
    ///
    /// Returns the refreshed aggregate plus whether `estado` actually
    /// changed, so the caller can skip notifications for no-op writes
    /// (setting `pagado` on an already-paid order).
    pub async fn update(
        &self,
        id: &str,
        patch: &UpdateOrder,
    ) -> DbResult<(OrderAggregate, bool)> {
        let before = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Order", id))?;

        let estado_changed = matches!(patch.estado, Some(nuevo) if nuevo != before.estado);

        let now = Utc::now();

        sqlx::query(
            r#"
            UPDATE orders SET
                estado = COALESCE(?2, estado),
                tipo_entrega = COALESCE(?3, tipo_entrega),
                metodo_pago = COALESCE(?4, metodo_pago),
                notas = COALESCE(?5, notas),
                comprobante_url = COALESCE(?6, comprobante_url),
                updated_at = ?7
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(patch.estado)
        .bind(&patch.tipo_entrega)
        .bind(&patch.metodo_pago)
        .bind(&patch.notas)
        .bind(&patch.comprobante_url)
        .bind(now)
        .execute(&self.pool)
        .await?;

        debug!(order_id = %id, estado_changed, "Order updated");

        let aggregate = self
            .get_aggregate(id)
            .await?
            .ok_or_else(|| DbError::not_found("Order", id))?;

        Ok((aggregate, estado_changed))
    }

    /// Deletes an order and (via cascade) its line items. Returns the
    /// deleted header.
    ///
    /// Stock is NOT restored: deletion is an administrative cleanup, and
    /// the movement trail keeps the historical deduction on record.
    pub async fn delete(&self, id: &str) -> DbResult<Order> {
        let existing = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Order", id))?;

        sqlx::query("DELETE FROM orders WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        info!(order_id = %id, "Order deleted");

        Ok(existing)
    }

    // =========================================================================
    // Dashboard
    // =========================================================================

    /// Computes the operational snapshot for the store-local day containing
    /// `now`.
    ///
    /// The six figures are independent, so they run concurrently. Each is a
    /// fresh aggregate query; nothing here is cached.
    pub async fn dashboard(&self, now: DateTime<Utc>) -> DbResult<Dashboard> {
        let (day_start, day_end) = pagination::today_bounds(now);

        let ventas_hoy = async {
            let sum: f64 = sqlx::query_scalar(
                r#"
                SELECT COALESCE(SUM(total), 0.0)
                FROM orders
                WHERE created_at >= ?1 AND created_at <= ?2
                "#,
            )
            .bind(day_start)
            .bind(day_end)
            .fetch_one(&self.pool)
            .await?;
            Ok::<_, DbError>(sum)
        };

        let pendientes = async {
            // The in-flight set is owned by OrderStatus; bind it instead of
            // repeating the tokens here.
            let placeholders = (1..=OrderStatus::IN_FLIGHT.len())
                .map(|i| format!("?{i}"))
                .collect::<Vec<_>>()
                .join(", ");
            let sql = format!("SELECT COUNT(*) FROM orders WHERE estado IN ({placeholders})");

            let mut query = sqlx::query_scalar::<_, i64>(&sql);
            for estado in OrderStatus::IN_FLIGHT {
                query = query.bind(estado);
            }

            let count = query.fetch_one(&self.pool).await?;
            Ok::<_, DbError>(count)
        };

        let top_products = async {
            // LEFT JOIN keeps best sellers whose product was since removed;
            // they show under the placeholder name.
            let rows = sqlx::query_as::<_, TopProduct>(
                r#"
                SELECT oi.product_id AS product_id,
                       COALESCE(p.nombre, ?1) AS nombre,
                       SUM(oi.cantidad) AS cantidad_vendida
                FROM order_items oi
                LEFT JOIN products p ON p.id = oi.product_id
                WHERE oi.product_id IS NOT NULL
                GROUP BY oi.product_id
                ORDER BY cantidad_vendida DESC
                LIMIT 5
                "#,
            )
            .bind(granja_core::PRODUCTO_DESCONOCIDO)
            .fetch_all(&self.pool)
            .await?;
            Ok::<_, DbError>(rows)
        };

        let stock_critico = async {
            let rows = sqlx::query_as::<_, LowStockProduct>(
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
            Ok::<_, DbError>(rows)
        };

        let precio_promedio = async {
            let avg: f64 =
                sqlx::query_scalar("SELECT COALESCE(AVG(precio), 0.0) FROM products WHERE activo = 1")
                    .fetch_one(&self.pool)
                    .await?;
            Ok::<_, DbError>(avg)
        };

        let stock_total = async {
            let sum: f64 =
                sqlx::query_scalar("SELECT COALESCE(SUM(stock), 0.0) FROM products WHERE activo = 1")
                    .fetch_one(&self.pool)
                    .await?;
            Ok::<_, DbError>(sum)
        };

        let (
            ventas_totales_hoy,
            pedidos_pendientes,
            productos_mas_vendidos,
            stock_critico,
            precio_promedio,
            stock_total,
        ) = tokio::try_join!(
            ventas_hoy,
            pendientes,
            top_products,
            stock_critico,
            precio_promedio,
            stock_total
        )?;

        Ok(Dashboard {
            ventas_totales_hoy,
            pedidos_pendientes,
            productos_mas_vendidos,
            stock_critico,
            precio_promedio,
            stock_total,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use granja_core::pricing;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn seed_user(db: &Database, id: &str, nombre: &str) {
        sqlx::query(
            "INSERT INTO users (id, nombre, email, created_at) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(id)
        .bind(nombre)
        .bind(format!("{id}@test.local"))
        .bind(Utc::now())
        .execute(db.pool())
        .await
        .unwrap();
    }

    async fn seed_product(db: &Database, nombre: &str, precio: f64, stock: f64) -> Product {
        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4().to_string(),
            nombre: nombre.to_string(),
            descripcion: None,
            precio,
            stock,
            activo: true,
            categoria_id: None,
            created_at: now,
            updated_at: now,
        };
        db.products().insert(&product).await.unwrap();
        product
    }

    fn header(user_id: &str, total: f64) -> NewOrder {
        NewOrder {
            user_id: user_id.to_string(),
            total,
            tipo_entrega: "retiro".to_string(),
            metodo_pago: "efectivo".to_string(),
            notas: None,
            comprobante_url: None,
        }
    }

    #[tokio::test]
    async fn place_writes_order_items_and_deducts_stock() {
        let db = test_db().await;
        seed_user(&db, "u1", "Ana").await;
        let product = seed_product(&db, "Alas sueltas", 1200.0, 40.0).await;

        let lines = vec![pricing::price_line(&product, 3.0)];
        let total = pricing::order_total(&lines);

        let order_id = db.orders().place(&header("u1", total), &lines).await.unwrap();

        let aggregate = db.orders().get_aggregate(&order_id).await.unwrap().unwrap();
        assert_eq!(aggregate.order.total, 3600.0);
        assert_eq!(aggregate.order.estado, OrderStatus::Pendiente);
        assert_eq!(aggregate.items.len(), 1);
        assert_eq!(aggregate.items[0].item.cantidad, 3.0);
        assert_eq!(aggregate.usuario.as_ref().unwrap().nombre, "Ana");

        let loaded = db.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(loaded.stock, 37.0);

        let movements = db.products().movements(&product.id, 10).await.unwrap();
        assert_eq!(movements.len(), 1);
        assert_eq!(movements[0].cantidad, -3.0);
        assert_eq!(movements[0].tipo, MOVEMENT_VENTA);
    }

    #[tokio::test]
    async fn place_rolls_back_everything_on_stock_conflict() {
        let db = test_db().await;
        seed_user(&db, "u1", "Ana").await;
        let plenty = seed_product(&db, "Alas sueltas", 1200.0, 40.0).await;
        let scarce = seed_product(&db, "Suprema", 2000.0, 1.0).await;

        // Second line needs 2 units, only 1 available: the whole order fails.
        let lines = vec![
            pricing::price_line(&plenty, 3.0),
            pricing::price_line(&scarce, 2.0),
        ];
        let total = pricing::order_total(&lines);

        let err = db
            .orders()
            .place(&header("u1", total), &lines)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::StockConflict { ref product_id } if *product_id == scarce.id));

        // First line's deduction is rolled back too.
        let loaded = db.products().get_by_id(&plenty.id).await.unwrap().unwrap();
        assert_eq!(loaded.stock, 40.0);
        assert!(db.products().movements(&plenty.id, 10).await.unwrap().is_empty());

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn promo_line_deducts_multiplied_stock_with_motivo() {
        let db = test_db().await;
        seed_user(&db, "u1", "Ana").await;
        let promo = seed_product(&db, "Promoción 3kg de Alas", 9500.0, 30.0).await;

        let lines = vec![pricing::price_line(&promo, 2.0)];
        let order_id = db
            .orders()
            .place(&header("u1", pricing::order_total(&lines)), &lines)
            .await
            .unwrap();

        let loaded = db.products().get_by_id(&promo.id).await.unwrap().unwrap();
        assert_eq!(loaded.stock, 24.0);

        let movements = db.products().movements(&promo.id, 10).await.unwrap();
        assert_eq!(movements[0].cantidad, -6.0);
        assert_eq!(
            movements[0].motivo,
            format!("Pedido {order_id} (2 unidad(es) x 3kg)")
        );
    }

    #[tokio::test]
    async fn update_detects_real_estado_changes_only() {
        let db = test_db().await;
        seed_user(&db, "u1", "Ana").await;
        let product = seed_product(&db, "Alas sueltas", 1200.0, 40.0).await;
        let lines = vec![pricing::price_line(&product, 1.0)];
        let order_id = db
            .orders()
            .place(&header("u1", pricing::order_total(&lines)), &lines)
            .await
            .unwrap();

        let patch = UpdateOrder {
            estado: Some(OrderStatus::Pagado),
            ..Default::default()
        };
        let (aggregate, changed) = db.orders().update(&order_id, &patch).await.unwrap();
        assert!(changed);
        assert_eq!(aggregate.order.estado, OrderStatus::Pagado);

        // Same value again: stored row updates, but no state transition.
        let (_, changed) = db.orders().update(&order_id, &patch).await.unwrap();
        assert!(!changed);

        // Patching an unrelated field leaves estado alone.
        let notes_only = UpdateOrder {
            notas: Some("sin sal".to_string()),
            ..Default::default()
        };
        let (aggregate, changed) = db.orders().update(&order_id, &notes_only).await.unwrap();
        assert!(!changed);
        assert_eq!(aggregate.order.estado, OrderStatus::Pagado);
        assert_eq!(aggregate.order.notas.as_deref(), Some("sin sal"));
    }

    #[tokio::test]
    async fn delete_cascades_items_but_keeps_stock_and_movements() {
        let db = test_db().await;
        seed_user(&db, "u1", "Ana").await;
        let product = seed_product(&db, "Alas sueltas", 1200.0, 40.0).await;
        let lines = vec![pricing::price_line(&product, 5.0)];
        let order_id = db
            .orders()
            .place(&header("u1", pricing::order_total(&lines)), &lines)
            .await
            .unwrap();

        let deleted = db.orders().delete(&order_id).await.unwrap();
        assert_eq!(deleted.id, order_id);

        assert!(db.orders().get_by_id(&order_id).await.unwrap().is_none());
        let items: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM order_items")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(items, 0);

        // No restock, and the audit trail survives.
        let loaded = db.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(loaded.stock, 35.0);
        assert_eq!(db.products().movements(&product.id, 10).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn list_filters_search_across_fields_and_paginates() {
        let db = test_db().await;
        seed_user(&db, "u1", "Ana García").await;
        seed_user(&db, "u2", "Bruno").await;
        let product = seed_product(&db, "Alas sueltas", 100.0, 1000.0).await;
        let lines = vec![pricing::price_line(&product, 1.0)];
        let total = pricing::order_total(&lines);

        for user in ["u1", "u1", "u2"] {
            db.orders().place(&header(user, total), &lines).await.unwrap();
        }

        // No filters, no page size: everything in one page.
        let all = db.orders().list(&ListQuery::default()).await.unwrap();
        assert_eq!(all.total_data, 3);
        assert_eq!(all.data.len(), 3);
        assert_eq!(all.page_size, 3);

        // Search by the owning user's name, case-insensitively.
        let by_name = db
            .orders()
            .list(&ListQuery {
                search: Some("garcía".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_name.total_data, 2);

        // Search matches estado tokens too.
        let by_estado = db
            .orders()
            .list(&ListQuery {
                search: Some("PENDIENTE".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_estado.total_data, 3);

        // Explicit paging: 2 per page, second page holds the remainder.
        let page2 = db
            .orders()
            .list(&ListQuery {
                page: Some(2),
                page_size: Some(2),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(page2.total_data, 3);
        assert_eq!(page2.data.len(), 1);
        assert_eq!(page2.page, 2);
    }

    #[tokio::test]
    async fn list_is_read_only() {
        let db = test_db().await;
        seed_user(&db, "u1", "Ana").await;
        let product = seed_product(&db, "Alas sueltas", 100.0, 50.0).await;
        let lines = vec![pricing::price_line(&product, 1.0)];
        db.orders()
            .place(&header("u1", pricing::order_total(&lines)), &lines)
            .await
            .unwrap();

        let first = db.orders().list(&ListQuery::default()).await.unwrap();
        let second = db.orders().list(&ListQuery::default()).await.unwrap();
        assert_eq!(first.total_data, second.total_data);
        assert_eq!(
            db.products()
                .get_by_id(&product.id)
                .await
                .unwrap()
                .unwrap()
                .stock,
            49.0
        );
    }

    #[tokio::test]
    async fn dashboard_counts_in_flight_and_ranks_sellers() {
        let db = test_db().await;
        seed_user(&db, "u1", "Ana").await;
        let top = seed_product(&db, "Alas sueltas", 100.0, 1000.0).await;
        let other = seed_product(&db, "Suprema", 200.0, 8.0).await;

        let big = vec![pricing::price_line(&top, 10.0)];
        let small = vec![pricing::price_line(&other, 2.0)];
        db.orders()
            .place(&header("u1", pricing::order_total(&big)), &big)
            .await
            .unwrap();
        let paid_id = db
            .orders()
            .place(&header("u1", pricing::order_total(&small)), &small)
            .await
            .unwrap();
        db.orders()
            .update(
                &paid_id,
                &UpdateOrder {
                    estado: Some(OrderStatus::Entregado),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let dashboard = db.orders().dashboard(Utc::now()).await.unwrap();

        // Both orders were created "today"; only one is still in flight.
        assert_eq!(dashboard.ventas_totales_hoy, 1400.0);
        assert_eq!(dashboard.pedidos_pendientes, 1);

        assert_eq!(dashboard.productos_mas_vendidos.len(), 2);
        assert_eq!(dashboard.productos_mas_vendidos[0].nombre, "Alas sueltas");
        assert_eq!(dashboard.productos_mas_vendidos[0].cantidad_vendida, 10.0);

        // "Suprema" dropped to 6, below the threshold of 10.
        assert_eq!(dashboard.stock_critico.len(), 1);
        assert_eq!(dashboard.stock_critico[0].nombre, "Suprema");

        assert_eq!(dashboard.precio_promedio, 150.0);
        assert_eq!(dashboard.stock_total, 990.0 + 6.0);
    }

    #[tokio::test]
    async fn pending_count_covers_every_in_flight_state() {
        let db = test_db().await;
        seed_user(&db, "u1", "Ana").await;
        let product = seed_product(&db, "Alas sueltas", 100.0, 1000.0).await;
        let lines = vec![pricing::price_line(&product, 1.0)];
        let total = pricing::order_total(&lines);

        // One order in each lifecycle state.
        for estado in [
            OrderStatus::Pendiente,
            OrderStatus::Pagado,
            OrderStatus::EnProceso,
            OrderStatus::EnCamino,
            OrderStatus::Entregado,
            OrderStatus::Cancelado,
        ] {
            let id = db.orders().place(&header("u1", total), &lines).await.unwrap();
            if estado != OrderStatus::Pendiente {
                db.orders()
                    .update(
                        &id,
                        &UpdateOrder {
                            estado: Some(estado),
                            ..Default::default()
                        },
                    )
                    .await
                    .unwrap();
            }
        }

        let dashboard = db.orders().dashboard(Utc::now()).await.unwrap();
        assert_eq!(
            dashboard.pedidos_pendientes,
            OrderStatus::IN_FLIGHT.len() as i64
        );
    }

    #[tokio::test]
    async fn concurrent_placements_never_oversell() {
        // File-backed pool: two tasks racing the same product through real
        // connections, unlike the single-connection in-memory config.
        let path = std::env::temp_dir().join(format!("granja-race-{}.db", Uuid::new_v4()));
        let db = Database::new(DbConfig::new(&path)).await.unwrap();
        seed_user(&db, "u1", "Ana").await;
        let product = seed_product(&db, "Pollo entero", 3400.0, 10.0).await;

        // Each order wants 7 of 10: at most one can commit.
        let lines = vec![pricing::price_line(&product, 7.0)];
        let total = pricing::order_total(&lines);

        let repo_a = db.orders();
        let repo_b = db.orders();
        let (header_a, lines_a) = (header("u1", total), lines.clone());
        let (header_b, lines_b) = (header("u1", total), lines.clone());

        let task_a = tokio::spawn(async move { repo_a.place(&header_a, &lines_a).await });
        let task_b = tokio::spawn(async move { repo_b.place(&header_b, &lines_b).await });
        let results = [task_a.await.unwrap(), task_b.await.unwrap()];

        let successes = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(successes, 1);
        for result in &results {
            if let Err(e) = result {
                assert!(matches!(e, DbError::StockConflict { .. }));
            }
        }

        let loaded = db.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(loaded.stock, 3.0);

        let committed: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(committed, 1);

        db.close().await;
        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{}", path.display(), suffix));
        }
    }

    #[tokio::test]
    async fn dashboard_day_boundary_is_store_local() {
        use chrono::TimeZone;
        use granja_core::pagination::{day_end_utc, day_start_utc};

        let db = test_db().await;
        seed_user(&db, "u1", "Ana").await;

        let jan_15 = chrono::NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
        let jan_16 = chrono::NaiveDate::from_ymd_opt(2026, 1, 16).unwrap();

        // Local 23:59:59.999 on Jan 15 and local midnight of Jan 16.
        let last_ms = day_end_utc(jan_15);
        let next_midnight = day_start_utc(jan_16);

        for (total, created_at) in [(100.0, last_ms), (999.0, next_midnight)] {
            sqlx::query(
                r#"
                INSERT INTO orders (id, user_id, total, estado, tipo_entrega, metodo_pago,
                                    created_at, updated_at)
                VALUES (?1, 'u1', ?2, 'entregado', 'retiro', 'efectivo', ?3, ?3)
                "#,
            )
            .bind(Uuid::new_v4().to_string())
            .bind(total)
            .bind(created_at)
            .execute(db.pool())
            .await
            .unwrap();
        }

        // Midday Jan 15 store time = 15:00Z.
        let now = Utc.with_ymd_and_hms(2026, 1, 15, 15, 0, 0).unwrap();
        let dashboard = db.orders().dashboard(now).await.unwrap();
        assert_eq!(dashboard.ventas_totales_hoy, 100.0);
    }

    #[tokio::test]
    async fn missing_order_maps_to_not_found() {
        let db = test_db().await;
        let err = db.orders().delete("no-such-order").await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));

        let err = db
            .orders()
            .update("no-such-order", &UpdateOrder::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}

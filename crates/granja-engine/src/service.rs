//! # Order Service
//!
//! The orchestration layer: validates requests, enforces the store gate,
//! prices carts from the catalog, hands the atomic write to storage, and
//! dispatches notifications after commit.
//!
//! ## Placement Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  place_order(request)                                               │
//! │                                                                     │
//! │   1. Validate shape (UUID ids, bounded cart, positive cantidades)   │
//! │   2. Read settings → gate: closed store rejects BEFORE touching     │
//! │      products, so a closed store leaks no catalog information       │
//! │   3. Resolve each product: exists? active? enough stock for the     │
//! │      REAL deduction (cantidad × multiplier)?                        │
//! │   4. Price lines from the CATALOG (client amounts are ignored)      │
//! │   5. Storage writes everything atomically (in-tx guard re-checks    │
//! │      stock, closing the race window left by step 3)                 │
//! │   6. Reload the aggregate, dispatch the notification, return        │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use granja_core::{
    pricing, validation, Dashboard, ListQuery, NewOrder, Order, OrderAggregate, Page, PricedLine,
    UpdateOrder, DEFAULT_CLOSED_MESSAGE,
};
use granja_db::{Database, DbError};

use crate::error::{OrderError, OrderResult};
use crate::notifier::{
    dispatch_new_order, dispatch_status_change, LogNotifier, NewOrderNotice, OrderNotifier,
    StatusChangeNotice,
};

// =============================================================================
// Request DTOs
// =============================================================================

/// One cart line as submitted by the customer.
///
/// Deliberately carries NO price: unit prices always come from the catalog
/// at validation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: String,
    pub cantidad: f64,
}

/// A request to place an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceOrderRequest {
    pub user_id: String,
    pub tipo_entrega: String,
    pub metodo_pago: String,
    pub notas: Option<String>,
    pub comprobante_url: Option<String>,
    pub items: Vec<CartItem>,
}

// =============================================================================
// Order Service
// =============================================================================

/// The order engine's public entry point.
///
/// Cheap to clone; clones share the pool and the notifier.
#[derive(Clone)]
pub struct OrderService {
    db: Database,
    notifier: Arc<dyn OrderNotifier>,
}

impl OrderService {
    /// Creates a service with the given notification channel.
    pub fn new(db: Database, notifier: Arc<dyn OrderNotifier>) -> Self {
        OrderService { db, notifier }
    }

    /// Creates a service that only logs notifications.
    pub fn with_log_notifier(db: Database) -> Self {
        OrderService::new(db, Arc::new(LogNotifier))
    }

    /// The underlying database handle, for callers needing catalog or
    /// settings access alongside order operations.
    pub fn database(&self) -> &Database {
        &self.db
    }

    // =========================================================================
    // Placement
    // =========================================================================

    /// Places an order: the only path that creates order rows.
    #[instrument(skip(self, request), fields(user_id = %request.user_id, items = request.items.len()))]
    pub async fn place_order(&self, request: PlaceOrderRequest) -> OrderResult<OrderAggregate> {
        validation::validate_uuid(&request.user_id)?;
        validation::validate_required("tipo_entrega", &request.tipo_entrega)?;
        validation::validate_required("metodo_pago", &request.metodo_pago)?;
        validation::validate_cart_len(request.items.len())?;
        for item in &request.items {
            validation::validate_uuid(&item.product_id)?;
            validation::validate_cantidad(item.cantidad)?;
        }

        // The gate comes before any product access: a closed store answers
        // the same way no matter what the cart contains.
        let settings = self
            .db
            .settings()
            .get()
            .await?
            .ok_or(OrderError::SettingsMissing)?;
        if !settings.esta_abierto {
            return Err(OrderError::StoreClosed {
                message: settings
                    .mensaje_alerta
                    .unwrap_or_else(|| DEFAULT_CLOSED_MESSAGE.to_string()),
            });
        }

        let lines = self.resolve_cart(&request.items).await?;
        let total = pricing::order_total(&lines);

        let header = NewOrder {
            user_id: request.user_id,
            total,
            tipo_entrega: request.tipo_entrega,
            metodo_pago: request.metodo_pago,
            notas: request.notas,
            comprobante_url: request.comprobante_url,
        };

        let order_id = match self.db.orders().place(&header, &lines).await {
            Ok(id) => id,
            // The in-transaction guard fired: a concurrent order consumed
            // the stock after our pre-check. Same taxonomy as the pre-check.
            Err(DbError::StockConflict { product_id }) => {
                return Err(self.stock_conflict_to_insufficient(&product_id, &lines).await);
            }
            Err(e) => return Err(e.into()),
        };

        let aggregate = self
            .db
            .orders()
            .get_aggregate(&order_id)
            .await?
            .ok_or_else(|| OrderError::OrderNotFound(order_id.clone()))?;

        info!(order_id = %order_id, total, "Pedido creado");

        dispatch_new_order(
            self.notifier.clone(),
            NewOrderNotice {
                order_id,
                customer_name: aggregate.usuario.as_ref().map(|u| u.nombre.clone()),
                total,
            },
        );

        Ok(aggregate)
    }

    /// Resolves and prices every cart line, enforcing existence, activity,
    /// and a stock pre-check in real stock units.
    async fn resolve_cart(&self, items: &[CartItem]) -> OrderResult<Vec<PricedLine>> {
        let mut lines = Vec::with_capacity(items.len());

        for item in items {
            let product = self
                .db
                .products()
                .get_by_id(&item.product_id)
                .await?
                .ok_or_else(|| OrderError::ProductNotFound(item.product_id.clone()))?;

            if !product.activo {
                return Err(OrderError::ProductInactive(product.nombre));
            }

            if granja_core::promo::marker_without_figure(
                &product.nombre,
                product.descripcion.as_deref(),
            ) {
                warn!(
                    product = %product.nombre,
                    "Marca de promoción sin figura de kg; se descuenta 1 a 1"
                );
            }

            let line = pricing::price_line(&product, item.cantidad);
            let requested = line.stock_to_deduct();

            if product.stock < requested {
                return Err(OrderError::InsufficientStock {
                    nombre: product.nombre,
                    available: product.stock,
                    requested,
                });
            }

            debug!(
                product = %line.nombre,
                cantidad = line.cantidad,
                multiplier = line.multiplier,
                deduct = requested,
                "Cart line priced"
            );

            lines.push(line);
        }

        Ok(lines)
    }

    /// Rebuilds an [`OrderError::InsufficientStock`] for a guard conflict,
    /// reporting the freshest stock figure available.
    async fn stock_conflict_to_insufficient(
        &self,
        product_id: &str,
        lines: &[PricedLine],
    ) -> OrderError {
        let line = lines.iter().find(|l| l.product_id == product_id);
        let nombre = line
            .map(|l| l.nombre.clone())
            .unwrap_or_else(|| product_id.to_string());
        let requested = line.map(PricedLine::stock_to_deduct).unwrap_or(0.0);

        let available = match self.db.products().get_by_id(product_id).await {
            Ok(Some(p)) => p.stock,
            Ok(None) => 0.0,
            Err(e) => {
                warn!(product_id = %product_id, error = %e, "Stock re-read after conflict failed");
                0.0
            }
        };

        OrderError::InsufficientStock {
            nombre,
            available,
            requested,
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Loads the full aggregate for one order.
    pub async fn get_order(&self, id: &str) -> OrderResult<OrderAggregate> {
        self.db
            .orders()
            .get_aggregate(id)
            .await?
            .ok_or_else(|| OrderError::OrderNotFound(id.to_string()))
    }

    /// Filtered, paginated order listing. Read-only.
    pub async fn list_orders(&self, query: &ListQuery) -> OrderResult<Page<OrderAggregate>> {
        Ok(self.db.orders().list(query).await?)
    }

    /// The operational dashboard for the current store-local day.
    pub async fn dashboard(&self) -> OrderResult<Dashboard> {
        Ok(self.db.orders().dashboard(Utc::now()).await?)
    }

    // =========================================================================
    // Updates
    // =========================================================================

    /// Partially updates an order. Notifies only on real estado changes:
    /// writing `pagado` onto an already-paid order updates the row but
    /// sends nothing.
    #[instrument(skip(self, patch), fields(order_id = %id))]
    pub async fn update_order(
        &self,
        id: &str,
        patch: &UpdateOrder,
    ) -> OrderResult<OrderAggregate> {
        let (aggregate, estado_changed) = match self.db.orders().update(id, patch).await {
            Ok(result) => result,
            Err(DbError::NotFound { .. }) => {
                return Err(OrderError::OrderNotFound(id.to_string()))
            }
            Err(e) => return Err(e.into()),
        };

        if estado_changed {
            info!(order_id = %id, estado = %aggregate.order.estado, "Estado actualizado");
            dispatch_status_change(
                self.notifier.clone(),
                StatusChangeNotice {
                    order_id: id.to_string(),
                    new_estado: aggregate.order.estado,
                    customer_name: aggregate.usuario.as_ref().map(|u| u.nombre.clone()),
                    customer_email: aggregate.usuario.as_ref().map(|u| u.email.clone()),
                },
            );
        }

        Ok(aggregate)
    }

    /// Deletes an order. Stock is not restored; the movement trail keeps
    /// the historical deduction on record.
    pub async fn delete_order(&self, id: &str) -> OrderResult<Order> {
        match self.db.orders().delete(id).await {
            Ok(order) => Ok(order),
            Err(DbError::NotFound { .. }) => Err(OrderError::OrderNotFound(id.to_string())),
            Err(e) => Err(e.into()),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

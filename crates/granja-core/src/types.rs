//! # Domain Types
//!
//! Core domain types used throughout the order engine.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                │
//! │                                                                     │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐   │
//! │  │    Product      │   │     Order       │   │   OrderItem     │   │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │   │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │   │
//! │  │  nombre         │   │  user_id (FK)   │   │  order_id (FK)  │   │
//! │  │  precio (f64)   │   │  estado         │   │  cantidad       │   │
//! │  │  stock (f64 kg) │   │  total          │   │  precio_unitario│   │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘   │
//! │                                                                     │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐   │
//! │  │  StockMovement  │   │  StoreSettings  │   │   OrderStatus   │   │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │   │
//! │  │  cantidad (±kg) │   │  esta_abierto   │   │  Pendiente      │   │
//! │  │  tipo, motivo   │   │  mensaje_alerta │   │  EnCamino ...   │   │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quantities are `f64`
//! The store sells bulk goods by weight: stock is fractional kilograms and
//! promotional units consume `3.5 kg` of stock at a time. Prices follow the
//! same representation so a line extension is a single multiplication.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// Order Status
// =============================================================================

/// Lifecycle state of an order.
///
/// Stored and serialized as the Spanish snake_case tokens the storefront
/// uses (`pendiente`, `en_proceso`, ...). The in-flight set feeds the
/// dashboard's pending-order count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Order placed, not yet confirmed or paid.
    Pendiente,
    /// Payment received.
    Pagado,
    /// Being prepared.
    EnProceso,
    /// Out for delivery.
    EnCamino,
    /// Delivered to the customer.
    Entregado,
    /// Cancelled.
    Cancelado,
}

impl OrderStatus {
    /// The canonical stored token for this state.
    pub const fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pendiente => "pendiente",
            OrderStatus::Pagado => "pagado",
            OrderStatus::EnProceso => "en_proceso",
            OrderStatus::EnCamino => "en_camino",
            OrderStatus::Entregado => "entregado",
            OrderStatus::Cancelado => "cancelado",
        }
    }

    /// States considered not yet finalized (dashboard "pending" count).
    pub const IN_FLIGHT: [OrderStatus; 3] = [
        OrderStatus::Pendiente,
        OrderStatus::EnProceso,
        OrderStatus::EnCamino,
    ];

    /// Whether this state counts as in-flight.
    pub fn is_in_flight(&self) -> bool {
        Self::IN_FLIGHT.contains(self)
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Pendiente
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pendiente" => Ok(OrderStatus::Pendiente),
            "pagado" => Ok(OrderStatus::Pagado),
            "en_proceso" => Ok(OrderStatus::EnProceso),
            "en_camino" => Ok(OrderStatus::EnCamino),
            "entregado" => Ok(OrderStatus::Entregado),
            "cancelado" => Ok(OrderStatus::Cancelado),
            other => Err(format!("estado desconocido: {other}")),
        }
    }
}

// =============================================================================
// Product
// =============================================================================

/// A catalog product, unit or bulk (weight-based).
///
/// Promotional metadata lives in free text: a product whose name or
/// description carries the promotion marker plus a `<n>kg` figure consumes
/// `n` kg of stock per ordered unit. See [`crate::promo`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name shown to customers.
    pub nombre: String,

    /// Optional free-text description (also scanned for promo metadata).
    pub descripcion: Option<String>,

    /// Unit price, ≥ 0.
    pub precio: f64,

    /// Current stock in units/kg. Can reach exactly 0, never negative.
    pub stock: f64,

    /// Whether the product can currently be ordered (soft delete flag).
    pub activo: bool,

    /// Optional category reference.
    pub categoria_id: Option<String>,

    /// When the product was created.
    pub created_at: DateTime<Utc>,

    /// When the product was last updated.
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Order
// =============================================================================

/// An order header. Created only by the transaction coordinator; an order
/// with no line items must never exist.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Order {
    pub id: String,
    /// Owning user.
    pub user_id: String,
    /// Sum of line extensions, snapshotted at creation time.
    pub total: f64,
    pub estado: OrderStatus,
    /// Delivery type (`retiro`, `delivery`, ...). Free text, searched.
    pub tipo_entrega: String,
    /// Payment method (`efectivo`, `transferencia`, ...). Free text, searched.
    pub metodo_pago: String,
    pub notas: Option<String>,
    /// Payment-proof reference (uploaded receipt), if any.
    pub comprobante_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Header fields for an order about to be created.
///
/// The transaction coordinator computes `total` from priced lines before
/// handing this to storage; the order id and timestamps are assigned inside
/// the transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrder {
    pub user_id: String,
    pub total: f64,
    pub tipo_entrega: String,
    pub metodo_pago: String,
    pub notas: Option<String>,
    pub comprobante_url: Option<String>,
}

/// Partial update of an order header. `None` fields keep their stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateOrder {
    pub estado: Option<OrderStatus>,
    pub tipo_entrega: Option<String>,
    pub metodo_pago: Option<String>,
    pub notas: Option<String>,
    pub comprobante_url: Option<String>,
}

impl UpdateOrder {
    /// Whether the patch carries no changes at all.
    pub fn is_empty(&self) -> bool {
        self.estado.is_none()
            && self.tipo_entrega.is_none()
            && self.metodo_pago.is_none()
            && self.notas.is_none()
            && self.comprobante_url.is_none()
    }
}

// =============================================================================
// Order Item
// =============================================================================

/// A line item in an order.
/// Uses the snapshot pattern: the unit price is frozen at order time and
/// never tracks later catalog price changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct OrderItem {
    pub id: String,
    pub order_id: String,
    /// Product reference. Nullable: the product may be removed later while
    /// the historical line survives.
    pub product_id: Option<String>,
    /// Quantity in ordered units (e.g. "2 bags"), not stock units.
    pub cantidad: f64,
    /// Unit price at order time (frozen).
    pub precio_unitario: f64,
    pub created_at: DateTime<Utc>,
}

impl OrderItem {
    /// The line extension: `cantidad × precio_unitario`.
    #[inline]
    pub fn line_total(&self) -> f64 {
        self.cantidad * self.precio_unitario
    }
}

// =============================================================================
// Stock Movement
// =============================================================================

/// Append-only inventory audit record.
///
/// One row per order line, recording the *real* stock units consumed, which
/// under promotional multipliers differs from the ordered quantity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct StockMovement {
    pub id: String,
    pub product_id: Option<String>,
    /// Signed delta in stock units. Negative for sales.
    pub cantidad: f64,
    /// Movement kind tag (`venta`, `ajuste`, `reposicion`).
    pub tipo: String,
    /// Human-readable reason, e.g. `Pedido <id> (2 unidad(es) x 3.5kg)`.
    pub motivo: String,
    pub created_at: DateTime<Utc>,
}

/// Movement kind for order-placement deductions.
pub const MOVEMENT_VENTA: &str = "venta";

// =============================================================================
// Store Settings
// =============================================================================

/// Singleton configuration row gating order placement.
///
/// ## Single-row contract
/// Exactly one row is expected. The accessor reads the lowest-id row;
/// "no row at all" is a distinct configuration error for callers, never
/// silently treated as "closed".
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct StoreSettings {
    pub id: String,
    /// Open/closed gate checked before any order write.
    pub esta_abierto: bool,
    /// User-facing message shown while closed.
    pub mensaje_alerta: Option<String>,
    /// Flat delivery surcharge.
    pub costo_delivery: f64,
    pub direccion_local: Option<String>,
    pub whatsapp_notificaciones: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// Partial update of the settings row. `None` fields keep their stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateSettings {
    pub esta_abierto: Option<bool>,
    pub mensaje_alerta: Option<String>,
    pub costo_delivery: Option<f64>,
    pub direccion_local: Option<String>,
    pub whatsapp_notificaciones: Option<String>,
}

// =============================================================================
// User Summary
// =============================================================================

/// Read-only projection of a user from the external user directory, joined
/// into order aggregates for confirmation enrichment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct UserSummary {
    pub id: String,
    pub nombre: String,
    pub email: String,
    pub telefono: Option<String>,
    pub direccion: Option<String>,
}

// =============================================================================
// Aggregates
// =============================================================================

/// An order line joined with its product snapshot (if the product still
/// exists in the catalog).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLineDetail {
    pub item: OrderItem,
    pub producto: Option<Product>,
}

/// The full order aggregate returned by placement and listing: header,
/// lines with product snapshots, and the owning-user summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderAggregate {
    pub order: Order,
    pub items: Vec<OrderLineDetail>,
    pub usuario: Option<UserSummary>,
}

// =============================================================================
// Dashboard
// =============================================================================

/// One entry of the top-5 best sellers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct TopProduct {
    pub product_id: String,
    /// Falls back to a placeholder when the product was since deleted.
    pub nombre: String,
    /// Cumulative ordered quantity across all order lines.
    pub cantidad_vendida: f64,
}

/// Name shown for best sellers whose product row no longer exists.
pub const PRODUCTO_DESCONOCIDO: &str = "Desconocido";

/// A product at or below the low-stock threshold.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct LowStockProduct {
    pub id: String,
    pub nombre: String,
    pub stock: f64,
}

/// Read-only operational snapshot, computed fresh on every call.
///
/// The six figures are independent of each other; the aggregator computes
/// them concurrently.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dashboard {
    /// Revenue for orders created within the current store-local day.
    pub ventas_totales_hoy: f64,
    /// Orders in an in-flight state (see [`OrderStatus::IN_FLIGHT`]).
    pub pedidos_pendientes: i64,
    /// Top 5 products by cumulative ordered quantity.
    pub productos_mas_vendidos: Vec<TopProduct>,
    /// Active products at or below the low-stock threshold, ascending.
    pub stock_critico: Vec<LowStockProduct>,
    /// Average unit price across active products.
    pub precio_promedio: f64,
    /// Total stock across active products.
    pub stock_total: f64,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_tokens() {
        for status in [
            OrderStatus::Pendiente,
            OrderStatus::Pagado,
            OrderStatus::EnProceso,
            OrderStatus::EnCamino,
            OrderStatus::Entregado,
            OrderStatus::Cancelado,
        ] {
            assert_eq!(status.as_str().parse::<OrderStatus>(), Ok(status));
        }
    }

    #[test]
    fn status_parse_is_case_insensitive() {
        assert_eq!("PAGADO".parse::<OrderStatus>(), Ok(OrderStatus::Pagado));
        assert!("despachado".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn in_flight_set_matches_dashboard_contract() {
        assert!(OrderStatus::Pendiente.is_in_flight());
        assert!(OrderStatus::EnProceso.is_in_flight());
        assert!(OrderStatus::EnCamino.is_in_flight());
        assert!(!OrderStatus::Pagado.is_in_flight());
        assert!(!OrderStatus::Entregado.is_in_flight());
        assert!(!OrderStatus::Cancelado.is_in_flight());
    }

    #[test]
    fn order_item_line_total() {
        let item = OrderItem {
            id: "i".into(),
            order_id: "o".into(),
            product_id: Some("p".into()),
            cantidad: 2.0,
            precio_unitario: 100.0,
            created_at: Utc::now(),
        };
        assert_eq!(item.line_total(), 200.0);
    }
}

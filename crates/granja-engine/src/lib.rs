//! # granja-engine: Order Placement & Inventory Engine
//!
//! The orchestration crate: the ONLY authority for creating orders.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                 Caller (HTTP layer, CLI, tests)                     │
//! │                              │                                      │
//! │  ┌───────────────────────────▼───────────────────────────────────┐ │
//! │  │               ★ granja-engine (THIS CRATE) ★                  │ │
//! │  │                                                               │ │
//! │  │   ┌────────────┐  ┌────────────┐  ┌────────────────────────┐ │ │
//! │  │   │  service   │  │   error    │  │       notifier         │ │ │
//! │  │   │OrderService│  │ OrderError │  │ OrderNotifier (trait)  │ │ │
//! │  │   │ place/list │  │  taxonomy  │  │ fire-and-forget spawn  │ │ │
//! │  │   └────────────┘  └────────────┘  └────────────────────────┘ │ │
//! │  └───────────────────────────┬───────────────────────────────────┘ │
//! │                              │                                      │
//! │      granja-core (pricing, promos, validation, pagination)          │
//! │      granja-db   (repositories, the atomic write, dashboard SQL)    │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use granja_db::{Database, DbConfig};
//! use granja_engine::{OrderService, PlaceOrderRequest, CartItem};
//!
//! let db = Database::new(DbConfig::new("./granja.db")).await?;
//! let service = OrderService::with_log_notifier(db);
//!
//! let aggregate = service
//!     .place_order(PlaceOrderRequest {
//!         user_id: "u-1".into(),
//!         tipo_entrega: "retiro".into(),
//!         metodo_pago: "efectivo".into(),
//!         notas: None,
//!         comprobante_url: None,
//!         items: vec![CartItem { product_id: "p-1".into(), cantidad: 2.0 }],
//!     })
//!     .await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod notifier;
pub mod service;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{OrderError, OrderResult};
pub use notifier::{
    LogNotifier, NewOrderNotice, NotifyError, OrderNotifier, StatusChangeNotice,
};
pub use service::{CartItem, OrderService, PlaceOrderRequest};

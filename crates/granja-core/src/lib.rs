//! # granja-core: Pure Business Logic for the Order Engine
//!
//! This crate is the **heart** of the order backend. It contains all business
//! logic as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                     Granja Pedidos Architecture                     │
//! │                                                                     │
//! │  ┌───────────────────────────────────────────────────────────────┐ │
//! │  │                 Caller (HTTP layer, CLI, tests)               │ │
//! │  └─────────────────────────────┬─────────────────────────────────┘ │
//! │                                │                                    │
//! │  ┌─────────────────────────────▼─────────────────────────────────┐ │
//! │  │                  granja-engine (OrderService)                 │ │
//! │  │    place_order, list_orders, update_order, dashboard          │ │
//! │  └─────────────────────────────┬─────────────────────────────────┘ │
//! │                                │                                    │
//! │  ┌─────────────────────────────▼─────────────────────────────────┐ │
//! │  │               ★ granja-core (THIS CRATE) ★                    │ │
//! │  │                                                               │ │
//! │  │   ┌───────────┐ ┌───────────┐ ┌───────────┐ ┌────────────┐  │ │
//! │  │   │   types   │ │   promo   │ │  pricing  │ │ pagination │  │ │
//! │  │   │  Product  │ │ kg parser │ │ PricedLine│ │ ListQuery  │  │ │
//! │  │   │   Order   │ │ multiplier│ │ stock math│ │ day bounds │  │ │
//! │  │   └───────────┘ └───────────┘ └───────────┘ └────────────┘  │ │
//! │  │                                                               │ │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS         │ │
//! │  └───────────────────────────────────────────────────────────────┘ │
//! │                                │                                    │
//! │  ┌─────────────────────────────▼─────────────────────────────────┐ │
//! │  │                  granja-db (Database Layer)                   │ │
//! │  │           SQLite queries, migrations, repositories            │ │
//! │  └───────────────────────────────────────────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Order, StockMovement, etc.)
//! - [`promo`] - Promotional-text parser producing the stock multiplier
//! - [`pricing`] - Line pricing and real stock consumption
//! - [`pagination`] - List queries, pages, and UTC-3 calendar windows
//! - [`validation`] - Business rule validation
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Explicit Errors**: All errors are typed, never strings or panics
//! 4. **Catalog Prices Only**: Line totals are computed from catalog prices,
//!    never from client-supplied amounts

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod pagination;
pub mod pricing;
pub mod promo;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use granja_core::Product` instead of
// `use granja_core::types::Product`

pub use error::ValidationError;
pub use pagination::{ListQuery, Page, SortDirection};
pub use pricing::PricedLine;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Fixed store timezone offset in hours west of UTC (Argentina, UTC-3).
///
/// ## Why a constant?
/// All calendar-day anchoring (listing date filters, "revenue today") is
/// defined against the store's wall clock, not the server's. The store does
/// not observe DST, so a fixed offset is correct.
pub const STORE_UTC_OFFSET_HOURS: i32 = 3;

/// Stock level (in units/kg) at or below which a product counts as critical.
pub const LOW_STOCK_THRESHOLD: f64 = 10.0;

/// Message shown to customers when the store is closed and no alert
/// message has been configured.
pub const DEFAULT_CLOSED_MESSAGE: &str =
    "El local está cerrado en este momento. No se pueden realizar pedidos.";

/// Maximum line items allowed in a single order.
///
/// ## Business Reason
/// Prevents runaway carts and ensures reasonable transaction sizes.
pub const MAX_ORDER_ITEMS: usize = 100;

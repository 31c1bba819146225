//! # Engine Error Taxonomy
//!
//! The public error surface callers match on. Every precondition failure
//! maps to a distinct variant so an API layer can render each one
//! differently (closed banner vs. per-product stock message vs. 404).
//!
//! ## Precondition Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  place_order checks, in order:                                      │
//! │                                                                     │
//! │   1. Cart shape           → Validation (empty, too many, cantidad)  │
//! │   2. Settings row exists  → SettingsMissing                         │
//! │   3. Store gate open      → StoreClosed { message }                 │
//! │   4. Product exists       → ProductNotFound                         │
//! │   5. Product active       → ProductInactive                         │
//! │   6. Stock sufficient     → InsufficientStock (pre-check AND the    │
//! │                              in-transaction guard map here)         │
//! │                                                                     │
//! │  Anything the database refuses past that point is Transaction(...). │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use granja_core::ValidationError;
use granja_db::DbError;

/// Errors returned by the order engine.
#[derive(Debug, Error)]
pub enum OrderError {
    /// The store gate is closed. Carries the configured alert message (or
    /// the default one) for display to the customer.
    #[error("{message}")]
    StoreClosed { message: String },

    /// No settings row exists. A configuration fault, deliberately distinct
    /// from [`OrderError::StoreClosed`]: an unconfigured store is an
    /// operator problem, not a customer-facing state.
    #[error("store settings are not configured")]
    SettingsMissing,

    /// A cart line references a product id that does not exist.
    #[error("producto no encontrado: {0}")]
    ProductNotFound(String),

    /// The product exists but was deactivated.
    #[error("producto no disponible: {0}")]
    ProductInactive(String),

    /// Not enough stock for a line, in real stock units (after the
    /// promotional multiplier).
    #[error("stock insuficiente para {nombre}: disponible {available}, solicitado {requested}")]
    InsufficientStock {
        nombre: String,
        available: f64,
        requested: f64,
    },

    /// The referenced order does not exist.
    #[error("pedido no encontrado: {0}")]
    OrderNotFound(String),

    /// Cart or field validation failure.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Storage-level failure not covered by a more specific variant.
    #[error(transparent)]
    Transaction(#[from] DbError),
}

/// Result type for engine operations.
pub type OrderResult<T> = Result<T, OrderError>;

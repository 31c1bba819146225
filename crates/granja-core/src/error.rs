//! # Error Types
//!
//! Validation errors for granja-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                 │
//! │                                                                     │
//! │  granja-core (this file)                                            │
//! │  └── ValidationError  - Input validation failures                   │
//! │                                                                     │
//! │  granja-db (separate crate)                                         │
//! │  └── DbError          - Database operation failures                 │
//! │                                                                     │
//! │  granja-engine (separate crate)                                     │
//! │  └── OrderError       - The public taxonomy callers see             │
//! │                         (StoreClosed, InsufficientStock, ...)       │
//! │                                                                     │
//! │  Flow: ValidationError / DbError → OrderError → caller              │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (product name, order id)
//! 3. Errors are enum variants, never String

use thiserror::Error;

/// Input validation errors.
///
/// These occur when a request doesn't meet basic requirements, before any
/// business logic or storage access runs.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Value must be strictly positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must be a finite number (no NaN/infinity through JSON edges).
    #[error("{field} must be a finite number")]
    NotFinite { field: String },

    /// Value doesn't match the expected format.
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// An order must carry at least one line item.
    #[error("order must contain at least one item")]
    EmptyOrder,

    /// Too many line items in a single order.
    #[error("order cannot have more than {max} items")]
    TooManyItems { max: usize },
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

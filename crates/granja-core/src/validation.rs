//! # Validation Module
//!
//! Business rule validation for order requests.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                              │
//! │                                                                     │
//! │  Layer 1: Caller (HTTP framework, external)                         │
//! │  └── Shape/type validation (deserialization)                        │
//! │           │                                                         │
//! │           ▼                                                         │
//! │  Layer 2: THIS MODULE (pure, before any storage access)             │
//! │  └── Positive quantities, non-empty carts, finite numbers           │
//! │           │                                                         │
//! │           ▼                                                         │
//! │  Layer 3: Database (SQLite)                                         │
//! │  └── NOT NULL, CHECK(stock >= 0), foreign keys                      │
//! │                                                                     │
//! │  Defense in depth: multiple layers catch different errors           │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::{ValidationError, ValidationResult};
use crate::MAX_ORDER_ITEMS;

/// Validates an ordered quantity.
///
/// Quantities are positive and finite; fractional values are legal for
/// weight-based goods ("1.5 kg of wings").
pub fn validate_cantidad(cantidad: f64) -> ValidationResult<()> {
    if !cantidad.is_finite() {
        return Err(ValidationError::NotFinite {
            field: "cantidad".to_string(),
        });
    }
    if cantidad <= 0.0 {
        return Err(ValidationError::MustBePositive {
            field: "cantidad".to_string(),
        });
    }
    Ok(())
}

/// Validates a required identifier or free-text field.
pub fn validate_required(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates a UUID string format.
///
/// ## Example
/// ```rust
/// use granja_core::validation::validate_uuid;
///
/// assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("not-a-uuid").is_err());
/// ```
pub fn validate_uuid(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: "id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

/// Validates the cart size: at least one line, bounded above.
pub fn validate_cart_len(len: usize) -> ValidationResult<()> {
    if len == 0 {
        return Err(ValidationError::EmptyOrder);
    }
    if len > MAX_ORDER_ITEMS {
        return Err(ValidationError::TooManyItems {
            max: MAX_ORDER_ITEMS,
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cantidad_must_be_positive_and_finite() {
        assert!(validate_cantidad(1.0).is_ok());
        assert!(validate_cantidad(0.5).is_ok());

        assert!(validate_cantidad(0.0).is_err());
        assert!(validate_cantidad(-2.0).is_err());
        assert!(validate_cantidad(f64::NAN).is_err());
        assert!(validate_cantidad(f64::INFINITY).is_err());
    }

    #[test]
    fn required_rejects_blank() {
        assert!(validate_required("user_id", "u-1").is_ok());
        assert_eq!(
            validate_required("user_id", "   "),
            Err(ValidationError::Required {
                field: "user_id".to_string()
            })
        );
    }

    #[test]
    fn uuid_format() {
        assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(matches!(
            validate_uuid("not-a-uuid"),
            Err(ValidationError::InvalidFormat { .. })
        ));
        assert!(matches!(
            validate_uuid("  "),
            Err(ValidationError::Required { .. })
        ));
    }

    #[test]
    fn cart_len_bounds() {
        assert_eq!(validate_cart_len(0), Err(ValidationError::EmptyOrder));
        assert!(validate_cart_len(1).is_ok());
        assert!(validate_cart_len(MAX_ORDER_ITEMS).is_ok());
        assert!(validate_cart_len(MAX_ORDER_ITEMS + 1).is_err());
    }
}

//! # Pricing & Stock Calculator
//!
//! Pure functions turning a requested line item into a priced quantity plus
//! the real stock units to deduct.
//!
//! ## Two Different Quantities
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │   "2 units of Promoción 3kg de Alas"                                │
//! │                                                                     │
//! │   line_total      = 2 × precio          (catalog price per UNIT)    │
//! │   stock_to_deduct = 2 × 3 = 6 kg        (multiplier per unit)       │
//! │                                                                     │
//! │   The multiplier affects stock bookkeeping ONLY, never the price.   │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Prices are always read from the catalog at validation time, never taken
//! from the client. This is what prevents price tampering.

use crate::promo;
use crate::types::Product;
use serde::{Deserialize, Serialize};

/// A validated, priced order line ready for the transactional write.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricedLine {
    pub product_id: String,
    /// Product name, carried for error messages and movement reasons.
    pub nombre: String,
    /// Ordered units (what the customer asked for).
    pub cantidad: f64,
    /// Catalog unit price at validation time.
    pub precio_unitario: f64,
    /// Stock units consumed per ordered unit (see [`crate::promo`]).
    pub multiplier: f64,
}

impl PricedLine {
    /// Price charged for this line: `cantidad × precio_unitario`.
    #[inline]
    pub fn line_total(&self) -> f64 {
        self.cantidad * self.precio_unitario
    }

    /// Real stock units this line removes from inventory.
    #[inline]
    pub fn stock_to_deduct(&self) -> f64 {
        self.cantidad * self.multiplier
    }

    /// Human-readable reason for the stock-movement audit row.
    ///
    /// Includes the ordered-unit breakdown only when the multiplier makes
    /// the deduction differ from the ordered quantity.
    pub fn movement_motivo(&self, order_id: &str) -> String {
        if self.multiplier != 1.0 {
            format!(
                "Pedido {} ({} unidad(es) x {}kg)",
                order_id, self.cantidad, self.multiplier
            )
        } else {
            format!("Pedido {order_id}")
        }
    }
}

/// Prices a requested quantity of a product.
///
/// Pure and infallible: promotional parsing degrades to multiplier 1 on
/// malformed text, and the caller has already validated `cantidad`.
pub fn price_line(product: &Product, cantidad: f64) -> PricedLine {
    let multiplier = promo::stock_multiplier(&product.nombre, product.descripcion.as_deref());

    PricedLine {
        product_id: product.id.clone(),
        nombre: product.nombre.clone(),
        cantidad,
        precio_unitario: product.precio,
        multiplier,
    }
}

/// Order total: sum of line extensions.
pub fn order_total(lines: &[PricedLine]) -> f64 {
    lines.iter().map(PricedLine::line_total).sum()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn product(nombre: &str, descripcion: Option<&str>, precio: f64, stock: f64) -> Product {
        let now = Utc::now();
        Product {
            id: "prod-1".to_string(),
            nombre: nombre.to_string(),
            descripcion: descripcion.map(str::to_string),
            precio,
            stock,
            activo: true,
            categoria_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn unit_product_deducts_one_to_one() {
        let line = price_line(&product("Alas sueltas", None, 1200.0, 40.0), 3.0);
        assert_eq!(line.multiplier, 1.0);
        assert_eq!(line.stock_to_deduct(), 3.0);
        assert_eq!(line.line_total(), 3600.0);
    }

    #[test]
    fn promo_multiplies_stock_but_not_price() {
        let line = price_line(&product("Promoción 3kg de Alas", None, 9500.0, 30.0), 2.0);
        assert_eq!(line.multiplier, 3.0);
        assert_eq!(line.stock_to_deduct(), 6.0);
        // Price stays per ordered unit.
        assert_eq!(line.line_total(), 19000.0);
    }

    #[test]
    fn total_sums_line_extensions() {
        let lines = vec![
            price_line(&product("A", None, 100.0, 10.0), 2.0),
            price_line(&product("B", None, 50.0, 10.0), 1.0),
        ];
        assert_eq!(order_total(&lines), 250.0);
    }

    #[test]
    fn movement_motivo_includes_breakdown_for_promos() {
        let promo = price_line(&product("Promoción 3,5 kg Pata Muslo", None, 9000.0, 20.0), 2.0);
        assert_eq!(
            promo.movement_motivo("abc"),
            "Pedido abc (2 unidad(es) x 3.5kg)"
        );

        let plain = price_line(&product("Alas sueltas", None, 1200.0, 20.0), 2.0);
        assert_eq!(plain.movement_motivo("abc"), "Pedido abc");
    }
}

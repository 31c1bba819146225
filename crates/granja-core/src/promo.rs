//! # Promotional Text Parser
//!
//! Detects weight-based promotions from free-text product metadata and
//! extracts the **stock multiplier**: the kilograms of real inventory one
//! ordered unit consumes.
//!
//! ## The Grammar
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │              How the Stock Multiplier Is Derived                    │
//! │                                                                     │
//! │  text = nombre + " " + descripcion                                  │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  Marker present? ("promocion" / "promoción", case-insensitive)      │
//! │       │                                                             │
//! │       ├── No  → multiplier = 1  (one unit ordered = one stock unit) │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  First `<number><optional space>kg` match                           │
//! │  (decimal separator `.` or `,`)                                     │
//! │       │                                                             │
//! │       ├── "Promoción 3kg de Alas"        → 3.0                      │
//! │       ├── "Promoción 3,5 kg Pata Muslo"  → 3.5                      │
//! │       └── "Promoción sin peso"           → 1.0 (documented fallback)│
//! │                                                                     │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! This parser silently changes inventory semantics, so it is written as an
//! explicit scanner returning a typed result instead of incidental string
//! matching. The multiplier only affects stock bookkeeping; the price per
//! ordered unit is always the catalog price.

use serde::{Deserialize, Serialize};

/// Typed result of promotional-text parsing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Promo {
    /// Stock units consumed per ordered unit. `1.0` for non-promotional
    /// products and for promotional text without a parseable kg figure.
    pub multiplier: f64,
}

impl Promo {
    /// The non-promotional identity: one ordered unit, one stock unit.
    pub const NONE: Promo = Promo { multiplier: 1.0 };

    /// Whether this promo changes stock bookkeeping at all.
    #[inline]
    pub fn is_weighted(&self) -> bool {
        self.multiplier != 1.0
    }
}

/// Parses the combined name + description text of a product.
///
/// Never fails: malformed numeric text degrades to multiplier 1 rather than
/// erroring (documented fallback, not a defect).
pub fn parse(nombre: &str, descripcion: Option<&str>) -> Promo {
    let text = match descripcion {
        Some(desc) => format!("{nombre} {desc}").to_lowercase(),
        None => nombre.to_lowercase(),
    };

    if !has_promo_marker(&text) {
        return Promo::NONE;
    }

    match first_kg_figure(&text) {
        Some(multiplier) => Promo { multiplier },
        None => Promo::NONE,
    }
}

/// Convenience wrapper returning just the multiplier.
///
/// `stock_to_deduct = cantidad * stock_multiplier(nombre, descripcion)`
#[inline]
pub fn stock_multiplier(nombre: &str, descripcion: Option<&str>) -> f64 {
    parse(nombre, descripcion).multiplier
}

/// Whether the text carries the promotion marker but no parseable kg
/// figure. The multiplier degrades to 1 in that case; callers may want to
/// surface the likely catalog misconfiguration.
pub fn marker_without_figure(nombre: &str, descripcion: Option<&str>) -> bool {
    let text = match descripcion {
        Some(desc) => format!("{nombre} {desc}").to_lowercase(),
        None => nombre.to_lowercase(),
    };
    has_promo_marker(&text) && first_kg_figure(&text).is_none()
}

/// Case has already been folded; accept both accented and plain spellings.
fn has_promo_marker(text: &str) -> bool {
    text.contains("promocion") || text.contains("promoción")
}

/// Scans for the first `<number><optional whitespace>kg` occurrence and
/// returns its numeric value, with `,` normalized to `.`.
fn first_kg_figure(text: &str) -> Option<f64> {
    let chars: Vec<char> = text.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        if !chars[i].is_ascii_digit() {
            i += 1;
            continue;
        }

        // Integer part.
        let start = i;
        while i < chars.len() && chars[i].is_ascii_digit() {
            i += 1;
        }

        // Optional fractional part: one separator followed by digits.
        let mut end = i;
        if i < chars.len() && (chars[i] == '.' || chars[i] == ',') {
            let mut j = i + 1;
            while j < chars.len() && chars[j].is_ascii_digit() {
                j += 1;
            }
            if j > i + 1 {
                end = j;
            }
        }

        // Optional whitespace, then the unit.
        let mut k = end;
        while k < chars.len() && chars[k].is_whitespace() {
            k += 1;
        }
        if k + 1 < chars.len() && chars[k] == 'k' && chars[k + 1] == 'g' {
            let number: String = chars[start..end]
                .iter()
                .map(|&c| if c == ',' { '.' } else { c })
                .collect();
            if let Ok(value) = number.parse::<f64>() {
                return Some(value);
            }
            // Unparseable figure: keep scanning, later matches may be valid.
        }

        i = end.max(i + 1);
    }

    None
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn promo_with_integer_kg() {
        assert_eq!(stock_multiplier("Promoción 3kg de Alas", None), 3.0);
    }

    #[test]
    fn promo_with_comma_decimal_and_space() {
        assert_eq!(stock_multiplier("Promoción 3,5 kg Pata Muslo", None), 3.5);
    }

    #[test]
    fn promo_with_dot_decimal() {
        assert_eq!(stock_multiplier("Promocion 2.5kg Suprema", None), 2.5);
    }

    #[test]
    fn no_marker_means_unit_product() {
        assert_eq!(stock_multiplier("Alas sueltas", None), 1.0);
        // A kg figure without the marker is plain description text.
        assert_eq!(stock_multiplier("Bolsa 5kg de Milanesas", None), 1.0);
    }

    #[test]
    fn marker_without_kg_falls_back_to_one() {
        assert_eq!(stock_multiplier("Promoción sin peso", None), 1.0);
        assert!(marker_without_figure("Promoción sin peso", None));
        assert!(!marker_without_figure("Promoción 3kg", None));
        assert!(!marker_without_figure("Alas sueltas", None));
    }

    #[test]
    fn marker_is_case_insensitive() {
        assert_eq!(stock_multiplier("PROMOCIÓN 4kg", None), 4.0);
        assert_eq!(stock_multiplier("pRoMoCiOn 4 kg", None), 4.0);
    }

    #[test]
    fn kg_figure_may_live_in_description() {
        assert_eq!(
            stock_multiplier("Combo Parrillero", Some("Promoción 7kg surtidos")),
            7.0
        );
        // Marker in the name, figure in the description.
        assert_eq!(
            stock_multiplier("Promoción Alitas", Some("lleva 2,5 kg")),
            2.5
        );
    }

    #[test]
    fn first_match_wins() {
        assert_eq!(
            stock_multiplier("Promoción 3kg", Some("antes vendida como 5kg")),
            3.0
        );
    }

    #[test]
    fn trailing_separator_is_not_a_fraction() {
        // "3." is the integer 3 followed by a full stop.
        assert_eq!(stock_multiplier("Promoción 3. kg no, 2kg sí", None), 2.0);
    }

    #[test]
    fn typed_result_reports_weighting() {
        assert!(parse("Promoción 3kg", None).is_weighted());
        assert!(!parse("Alas sueltas", None).is_weighted());
        assert_eq!(parse("Alas sueltas", None), Promo::NONE);
    }
}

//! # Pagination, Filtering, and Calendar Windows
//!
//! Pure types and date math backing the order query engine and the
//! dashboard's "today" figure.
//!
//! ## Calendar Days Are Store-Local
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │         Date filters are anchored in UTC-3 (store wall clock)       │
//! │                                                                     │
//! │  dateFrom = 2026-01-15  →  2026-01-15T00:00:00.000-03:00            │
//! │                         =  2026-01-15T03:00:00.000Z                 │
//! │                                                                     │
//! │  dateTo   = 2026-01-15  →  2026-01-15T23:59:59.999-03:00            │
//! │                         =  2026-01-16T02:59:59.999Z                 │
//! │                                                                     │
//! │  Both bounds inclusive. An order at local 23:59:59.999 belongs to   │
//! │  the day; one at local 00:00:00.000 of the next day does not.       │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::STORE_UTC_OFFSET_HOURS;

// =============================================================================
// Sort Direction
// =============================================================================

/// Sort direction on the order creation timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    /// The SQL keyword for this direction. Interpolated as a literal, never
    /// bound, so it must stay a closed set.
    pub const fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

impl Default for SortDirection {
    fn default() -> Self {
        SortDirection::Asc
    }
}

// =============================================================================
// List Query
// =============================================================================

/// Parameters for the filtered, paginated order listing.
///
/// All filters are optional. The free-text `search` is OR-combined across
/// estado, tipo_entrega, metodo_pago, and the owning user's name
/// (case-insensitive substring); everything else combines with AND.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListQuery {
    /// 1-based page number. Defaults to 1; values below 1 are clamped.
    pub page: Option<u32>,

    /// Rows per page. When unset, defaults to the total matching row count,
    /// i.e. everything in one page. That mirrors the storefront's original
    /// behavior and is an unbounded-response hazard under table growth;
    /// callers serving untrusted input should pass an explicit size.
    pub page_size: Option<u32>,

    /// Sort direction on `created_at`. Defaults to ascending.
    #[serde(default)]
    pub sort: SortDirection,

    /// Free-text filter, matched case-insensitively as a substring.
    pub search: Option<String>,

    /// Inclusive lower bound, anchored to 00:00:00.000 store time.
    pub date_from: Option<NaiveDate>,

    /// Inclusive upper bound, anchored to 23:59:59.999 store time.
    pub date_to: Option<NaiveDate>,
}

impl ListQuery {
    /// The page to serve, clamped to ≥ 1.
    pub fn effective_page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    /// The normalized search term: trimmed, lowercased, `None` when blank.
    pub fn search_term(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }

    /// UTC instant of the lower date bound, if set.
    pub fn date_from_utc(&self) -> Option<DateTime<Utc>> {
        self.date_from.map(day_start_utc)
    }

    /// UTC instant of the upper date bound, if set.
    pub fn date_to_utc(&self) -> Option<DateTime<Utc>> {
        self.date_to.map(day_end_utc)
    }
}

// =============================================================================
// Page
// =============================================================================

/// One page of results plus the pre-pagination total and the effective
/// paging parameters echoed back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    /// Total matching rows before pagination.
    pub total_data: i64,
    /// The effective 1-based page served.
    pub page: u32,
    /// The effective page size used.
    pub page_size: i64,
    pub data: Vec<T>,
}

// =============================================================================
// Store-Local Calendar Math
// =============================================================================

/// The store's fixed UTC-3 offset.
pub fn store_offset() -> FixedOffset {
    // Statically valid: 3h west is inside chrono's ±24h bound.
    FixedOffset::west_opt(STORE_UTC_OFFSET_HOURS * 3600).expect("UTC-3 is a valid fixed offset")
}

/// UTC instant of `00:00:00.000` store time on the given day.
pub fn day_start_utc(date: NaiveDate) -> DateTime<Utc> {
    let naive = date
        .and_hms_milli_opt(0, 0, 0, 0)
        .expect("midnight exists on every calendar day");
    naive
        .and_local_timezone(store_offset())
        .single()
        .expect("fixed offsets map local times unambiguously")
        .with_timezone(&Utc)
}

/// UTC instant of `23:59:59.999` store time on the given day.
pub fn day_end_utc(date: NaiveDate) -> DateTime<Utc> {
    let naive = date
        .and_hms_milli_opt(23, 59, 59, 999)
        .expect("23:59:59.999 exists on every calendar day");
    naive
        .and_local_timezone(store_offset())
        .single()
        .expect("fixed offsets map local times unambiguously")
        .with_timezone(&Utc)
}

/// Inclusive UTC bounds of the store-local calendar day containing `now`.
///
/// Used by the dashboard's revenue-today figure.
pub fn today_bounds(now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let today = now.with_timezone(&store_offset()).date_naive();
    (day_start_utc(today), day_end_utc(today))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn day_bounds_are_shifted_by_store_offset() {
        let start = day_start_utc(date(2026, 1, 15));
        let end = day_end_utc(date(2026, 1, 15));

        assert_eq!(start, Utc.with_ymd_and_hms(2026, 1, 15, 3, 0, 0).unwrap());
        assert_eq!(
            end,
            Utc.with_ymd_and_hms(2026, 1, 16, 2, 59, 59).unwrap()
                + chrono::Duration::milliseconds(999)
        );
    }

    #[test]
    fn last_millisecond_belongs_to_the_day_next_midnight_does_not() {
        let (start, end) = today_bounds(Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).unwrap());

        // Local 23:59:59.999 on Jan 15 = 02:59:59.999Z on Jan 16.
        let last_ms = Utc.with_ymd_and_hms(2026, 1, 16, 2, 59, 59).unwrap()
            + chrono::Duration::milliseconds(999);
        // Local 00:00:00.000 on Jan 16 = 03:00:00Z on Jan 16.
        let next_midnight = Utc.with_ymd_and_hms(2026, 1, 16, 3, 0, 0).unwrap();

        assert!(start <= last_ms && last_ms <= end);
        assert!(next_midnight > end);
    }

    #[test]
    fn effective_page_clamps_to_one() {
        assert_eq!(ListQuery::default().effective_page(), 1);
        let q = ListQuery {
            page: Some(0),
            ..Default::default()
        };
        assert_eq!(q.effective_page(), 1);
    }

    #[test]
    fn search_term_normalizes() {
        let q = ListQuery {
            search: Some("  PENDIENTE ".to_string()),
            ..Default::default()
        };
        assert_eq!(q.search_term().as_deref(), Some("pendiente"));

        let blank = ListQuery {
            search: Some("   ".to_string()),
            ..Default::default()
        };
        assert_eq!(blank.search_term(), None);
    }

    #[test]
    fn list_query_bounds_use_store_offset() {
        let q = ListQuery {
            date_from: Some(date(2026, 3, 1)),
            date_to: Some(date(2026, 3, 2)),
            ..Default::default()
        };
        assert_eq!(
            q.date_from_utc().unwrap(),
            Utc.with_ymd_and_hms(2026, 3, 1, 3, 0, 0).unwrap()
        );
        assert!(q.date_to_utc().unwrap() > Utc.with_ymd_and_hms(2026, 3, 3, 2, 59, 59).unwrap());
    }
}

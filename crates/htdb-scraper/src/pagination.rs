//! Offset-based pagination cursors for listing endpoints.
//!
//! The site pages with `offset`/`count` query parameters and reports a
//! `totalCount` per listing. A cursor describes one page's position; the
//! discovery loop advances it by the number of items a page actually
//! returned (not the nominal page size) so short final pages terminate
//! cleanly.

use serde::{Deserialize, Serialize};

/// Hard stop on pages per discovery call. Prevents infinite loops when the
/// site reports a bogus `totalCount` or keeps `hasMore` stuck on.
pub const MAX_PAGES: usize = 500;

/// Position of one listing page within a discovery run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageCursor {
    /// Listing endpoint path, e.g. `/api/brands`.
    pub endpoint: String,
    pub offset: u64,
    pub count: u64,
    pub total_count: u64,
}

impl PageCursor {
    #[must_use]
    pub fn new(endpoint: impl Into<String>, offset: u64, count: u64, total_count: u64) -> Self {
        Self {
            endpoint: endpoint.into(),
            offset,
            count,
            total_count,
        }
    }

    /// Whether another page exists beyond this one.
    #[must_use]
    pub fn has_next(&self) -> bool {
        self.offset + self.count < self.total_count
    }

    /// Next cursor after a page that returned `items_returned` items.
    ///
    /// Offsets are monotonically non-decreasing: a page that returned zero
    /// items yields an identical cursor, which callers must treat as
    /// termination (via [`Self::has_next`] or the page guard).
    #[must_use]
    pub fn advanced_by(&self, items_returned: u64) -> Self {
        Self {
            endpoint: self.endpoint.clone(),
            offset: self.offset + items_returned,
            count: self.count,
            total_count: self.total_count,
        }
    }

    /// Completion of this listing as a percentage, for progress logs.
    #[must_use]
    pub fn percent_complete(&self) -> f64 {
        if self.total_count == 0 {
            return 100.0;
        }
        // Cast is fine: catalog sizes are thousands, nowhere near 2^52.
        #[allow(clippy::cast_precision_loss)]
        let pct = (self.offset as f64 / self.total_count as f64) * 100.0;
        pct.min(100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn has_next_true_mid_listing() {
        let cursor = PageCursor::new("/api/brands", 0, 25, 100);
        assert!(cursor.has_next());
    }

    #[test]
    fn has_next_false_on_last_page() {
        let cursor = PageCursor::new("/api/brands", 75, 25, 100);
        assert!(!cursor.has_next());
    }

    #[test]
    fn has_next_false_when_page_overshoots_total() {
        let cursor = PageCursor::new("/api/brands", 90, 25, 100);
        assert!(!cursor.has_next());
    }

    #[test]
    fn advanced_by_moves_offset_by_actual_items() {
        let cursor = PageCursor::new("/api/brands", 0, 25, 30);
        // Short page: only 5 items came back.
        let next = cursor.advanced_by(5);
        assert_eq!(next.offset, 5);
        assert_eq!(next.count, 25);
        assert_eq!(next.total_count, 30);
    }

    #[test]
    fn advanced_by_zero_keeps_offset() {
        let cursor = PageCursor::new("/api/brands", 10, 25, 100);
        assert_eq!(cursor.advanced_by(0).offset, 10);
    }

    #[test]
    fn percent_complete_zero_total_is_done() {
        let cursor = PageCursor::new("/api/brands", 0, 25, 0);
        assert!((cursor.percent_complete() - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn percent_complete_mid_listing() {
        let cursor = PageCursor::new("/api/brands", 50, 25, 100);
        assert!((cursor.percent_complete() - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn serde_roundtrip_for_checkpointing() {
        let cursor = PageCursor::new("/api/brands/sarma/products", 25, 25, 60);
        let json = serde_json::to_string(&cursor).unwrap();
        let decoded: PageCursor = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, cursor);
    }
}

//! Bounded-window pagination arithmetic
//!
//! The store is never asked to skip more than the configured max result
//! window in one query. Pages past the window boundary are reached by
//! offsetting in whole window multiples and skipping the remainder in
//! memory, which keeps page semantics stable across the boundary.

/// Store-side offset plus in-memory skip for one logical page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    /// Offset sent to the store
    pub store_offset: u64,
    /// Rows the mapper drops from the front of the fetched window
    pub in_memory_skip: u64,
}

impl Window {
    /// Compute the window for a page
    ///
    /// * `max_window == 0` means unbounded: the raw offset goes straight
    ///   to the store.
    /// * Faceted/aggregated requests never page; the whole bounded window
    ///   is scanned to build counts.
    /// * `page_number` is 1-based; values below 1 are treated as 1.
    pub fn compute(max_window: u64, page_size: u64, page_number: u64, is_faceted: bool) -> Self {
        if is_faceted {
            return Self {
                store_offset: 0,
                in_memory_skip: 0,
            };
        }
        let raw_offset = page_number.max(1).saturating_sub(1) * page_size;
        if max_window == 0 {
            return Self {
                store_offset: raw_offset,
                in_memory_skip: 0,
            };
        }
        if raw_offset < max_window {
            Self {
                store_offset: 0,
                in_memory_skip: raw_offset,
            }
        } else {
            let store_offset = max_window * (raw_offset / max_window);
            Self {
                store_offset,
                in_memory_skip: raw_offset - store_offset,
            }
        }
    }

    /// Row count the store should be asked for, `None` when the page size
    /// is 0 (no limit)
    pub fn fetch_limit(&self, page_size: u64) -> Option<u64> {
        if page_size == 0 {
            None
        } else {
            Some(self.in_memory_skip + page_size)
        }
    }
}

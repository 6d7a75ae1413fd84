//! Pagination types for list endpoints.

use serde::{Deserialize, Serialize};

/// Page used when the client does not ask for one.
pub const DEFAULT_PAGE: u64 = 1;
/// Page size used when the client does not ask for one.
pub const DEFAULT_LIMIT: u64 = 10;
/// Largest page size a client may request.
pub const MAX_LIMIT: u64 = 100;
/// Largest row offset a page may start at. SQL offsets are signed 64-bit.
pub const MAX_OFFSET: u64 = i64::MAX.unsigned_abs();

/// Request parameters for paginated queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Page number (1-indexed).
    pub page: u64,
    /// Number of items per page.
    pub limit: u64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl PageRequest {
    /// Creates a page request. Callers validate the bounds beforehand.
    #[must_use]
    pub const fn new(page: u64, limit: u64) -> Self {
        Self { page, limit }
    }

    /// Calculates the offset for database queries.
    ///
    /// Saturates instead of overflowing; see [`PageRequest::max_page`] for
    /// the bound that keeps it within [`MAX_OFFSET`].
    #[must_use]
    pub const fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }

    /// Highest page number whose offset fits in [`MAX_OFFSET`] for `limit`.
    #[must_use]
    pub const fn max_page(limit: u64) -> u64 {
        if limit == 0 {
            return u64::MAX;
        }
        MAX_OFFSET / limit + 1
    }

    /// Returns the limit for database queries.
    #[must_use]
    pub const fn limit(&self) -> u64 {
        self.limit
    }
}

/// Pagination metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    /// Current page number.
    pub current_page: u64,
    /// Total number of pages.
    pub total_pages: u64,
    /// Total number of items across all pages.
    pub total_transactions: u64,
    /// Items per page.
    pub limit: u64,
    /// Whether a page exists after this one.
    pub has_next_page: bool,
    /// Whether a page exists before this one.
    pub has_prev_page: bool,
}

impl PageMeta {
    /// Computes metadata for `request` given the total number of matches.
    ///
    /// `total_pages` is `ceil(total / limit)`, so an empty result has zero
    /// pages and neither a next nor a previous page.
    #[must_use]
    pub const fn new(request: PageRequest, total: u64) -> Self {
        let total_pages = if request.limit == 0 {
            0
        } else {
            total.div_ceil(request.limit)
        };

        Self {
            current_page: request.page,
            total_pages,
            total_transactions: total,
            limit: request.limit,
            has_next_page: request.page < total_pages,
            has_prev_page: request.page > 1,
        }
    }
}

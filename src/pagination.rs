//! Pagination parameters attached to collection requests.
//!
//! Dependency-Track pages with `pageSize`/`pageNumber`. The client asks for
//! one very large page instead of walking pages; collections larger than
//! [`DEFAULT_PAGE_SIZE`] are truncated.

use serde::{Deserialize, Serialize};

/// Page size requested on every paginated GET.
pub const DEFAULT_PAGE_SIZE: u32 = 10_000;

/// Query parameters for paginated requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageParams {
    /// Number of items per page.
    pub page_size: u32,
    /// Page number (1-indexed).
    pub page_number: u32,
}

impl PageParams {
    /// Create pagination params for a specific page.
    #[must_use]
    pub fn for_page(page_number: u32, page_size: u32) -> Self {
        Self {
            page_size,
            page_number,
        }
    }
}

impl Default for PageParams {
    fn default() -> Self {
        Self::for_page(1, DEFAULT_PAGE_SIZE)
    }
}

//! Shared query parameter types for API handlers.
//!
//! Common query structs that appear across multiple handler modules are
//! extracted here to avoid duplication.

use serde::Deserialize;
use yamdb_core::pagination::PageRequest;

/// Page-number pagination (`?page=`).
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<i64>,
}

impl PageParams {
    pub fn request(&self, page_size: i64) -> PageRequest {
        PageRequest::new(self.page, page_size)
    }
}

/// Pagination plus a free-text `?search=` term.
///
/// Used by the user, category and genre lists.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub page: Option<i64>,
    pub search: Option<String>,
}

impl SearchParams {
    pub fn request(&self, page_size: i64) -> PageRequest {
        PageRequest::new(self.page, page_size)
    }

    /// The search term, or `None` when absent or blank.
    pub fn term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

//! Page-number pagination (`?page=N`, 1-based).

use serde::Serialize;

pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;

/// A clamped page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub page_size: i64,
}

impl PageRequest {
    /// Clamp `page` to at least 1 and `page_size` to `1..=MAX_PAGE_SIZE`.
    pub fn new(page: Option<i64>, page_size: i64) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn limit(&self) -> i64 {
        self.page_size
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.page_size)
    }
}

/// Neighbouring page numbers for a list response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageLinks {
    pub next: Option<i64>,
    pub previous: Option<i64>,
}

impl PageLinks {
    pub fn compute(request: PageRequest, count: i64) -> Self {
        let last_page = if count == 0 {
            1
        } else {
            (count + request.page_size - 1) / request.page_size
        };
        let next = (request.page < last_page).then_some(request.page + 1);
        let previous = (request.page > 1).then(|| (request.page - 1).min(last_page));
        Self { next, previous }
    }
}

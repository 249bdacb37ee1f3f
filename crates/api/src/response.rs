//! Shared response envelope types for API handlers.
//!
//! List endpoints return a [`Page`]: the total row count, the neighbouring
//! page numbers and the current page of results.

use serde::Serialize;
use yamdb_core::pagination::{PageLinks, PageRequest};

/// Standard `{count, next, previous, results}` list envelope.
///
/// # Example
///
/// ```ignore
/// let (items, count) = CategoryRepo::list(&state.pool, search, page).await?;
/// Ok(Json(Page::new(items, count, page)))
/// ```
#[derive(Debug, Serialize)]
pub struct Page<T: Serialize> {
    pub count: i64,
    pub next: Option<i64>,
    pub previous: Option<i64>,
    pub results: Vec<T>,
}

impl<T: Serialize> Page<T> {
    pub fn new(results: Vec<T>, count: i64, request: PageRequest) -> Self {
        let links = PageLinks::compute(request, count);
        Self {
            count,
            next: links.next,
            previous: links.previous,
            results,
        }
    }
}

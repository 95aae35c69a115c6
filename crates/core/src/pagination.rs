//! Pagination metadata for listing endpoints.
//!
//! The engine computes metadata from raw counts; the transport owns the
//! wire envelope around it. Page-size bounds are enforced at the boundary
//! as structural validation failures rather than silently clamped, so
//! out-of-range requests behave predictably.

use crate::constants::{DEFAULT_PER_PAGE, MAX_PER_PAGE};
use crate::error::{PatientResult, ValidationFailure};
use serde::{Deserialize, Serialize};

/// Listing query parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PageRequest {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

fn default_page() -> u32 {
    1
}

fn default_per_page() -> u32 {
    DEFAULT_PER_PAGE
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: default_page(),
            per_page: default_per_page(),
        }
    }
}

impl PageRequest {
    pub fn new(page: u32, per_page: u32) -> Self {
        Self { page, per_page }
    }

    /// Checks the bounds: `page >= 1` and `1 <= per_page <= 100`.
    ///
    /// # Errors
    ///
    /// A structural `Validation` failure naming the offending field.
    pub fn validate(&self) -> PatientResult<()> {
        let mut failure = ValidationFailure::new();
        if self.page < 1 {
            failure.push("page", "page must be at least 1");
        }
        if self.per_page < 1 || self.per_page > MAX_PER_PAGE {
            failure.push(
                "per_page",
                format!("per_page must be between 1 and {MAX_PER_PAGE}"),
            );
        }
        failure.into_result()
    }

    fn offset(&self) -> usize {
        (self.page.saturating_sub(1) as usize) * self.per_page as usize
    }
}

/// Pagination metadata for one page of results.
///
/// An empty collection still reports one (empty) page: `total_pages` is
/// never 0, so `current_page = 1` is always in range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageMeta {
    pub current_page: u32,
    pub per_page: u32,
    pub total_pages: u32,
    pub total_items: u64,
    pub has_prev_page: bool,
    pub has_next_page: bool,
    pub prev_page: Option<u32>,
    pub next_page: Option<u32>,
    pub first_page: u32,
    pub last_page: u32,
}

impl PageMeta {
    /// Computes the metadata for `current_page` of `total_items` split into
    /// pages of `per_page`. Expects `per_page >= 1`; callers validate the
    /// request first.
    pub fn build(total_items: u64, per_page: u32, current_page: u32) -> Self {
        debug_assert!(per_page >= 1);
        let total_pages = if total_items == 0 {
            1
        } else {
            (total_items.div_ceil(per_page as u64)) as u32
        };
        let has_prev_page = current_page > 1;
        let has_next_page = current_page < total_pages;
        Self {
            current_page,
            per_page,
            total_pages,
            total_items,
            has_prev_page,
            has_next_page,
            prev_page: has_prev_page.then(|| current_page - 1),
            next_page: has_next_page.then(|| current_page + 1),
            first_page: 1,
            last_page: total_pages,
        }
    }
}

/// One page of results with its metadata, in the shape listing endpoints
/// return.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub pagination: PageMeta,
}

impl<T> Page<T> {
    /// Windows `items` (already in presentation order) down to the
    /// requested page. A page past the end yields empty data.
    pub fn slice(items: Vec<T>, request: &PageRequest) -> Self {
        let pagination = PageMeta::build(items.len() as u64, request.per_page, request.page);
        let data = items
            .into_iter()
            .skip(request.offset())
            .take(request.per_page as usize)
            .collect();
        Self { data, pagination }
    }
}

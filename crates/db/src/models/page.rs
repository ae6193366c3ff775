//! Pagination envelope returned by list endpoints.

use serde::Serialize;

/// One page of results plus paging metadata.
///
/// `items_per_page` echoes the normalized request, so `-1` means the page
/// holds every matching row.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub items_per_page: i64,
}

use indexmap::IndexMap;
use serde::Serialize;

use crate::filtering::pagination::PageRequest;

/// Raw query-string parameters in request order.
pub type ParameterMap = IndexMap<String, String>;

/// Build a [`ParameterMap`] from key/value pairs.
pub fn parameter_map<I, K, V>(pairs: I) -> ParameterMap
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    pairs
        .into_iter()
        .map(|(key, value)| (key.into(), value.into()))
        .collect()
}

/// Pagination metadata returned with every page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PaginationMeta {
    pub current_page: u64,
    pub last_page: u64,
    pub per_page: u64,
    pub total: u64,
}

impl PaginationMeta {
    #[must_use]
    pub fn new(request: PageRequest, total: u64) -> Self {
        Self {
            current_page: request.page,
            last_page: total.div_ceil(request.per_page.max(1)).max(1),
            per_page: request.per_page,
            total,
        }
    }
}

/// One page of results.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub meta: PaginationMeta,
}

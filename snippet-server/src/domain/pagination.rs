use serde::Serialize;

use super::error::DomainError;

pub(crate) const PAGE_SIZE: i64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Page {
    pub(crate) page: i64,
    pub(crate) limit: i64,
    pub(crate) offset: i64,
    pub(crate) total_pages: i64,
}

/// Turns a raw `page` query value into limit/offset for a result set of `count` rows.
///
/// A missing or blank value means page 1. Pages past the end are `NotFound`,
/// so an empty result set has no valid page at all.
pub(crate) fn calculate_pagination(
    count: i64,
    page_param: Option<&str>,
) -> Result<Page, DomainError> {
    let raw = page_param.map(str::trim).unwrap_or_default();
    let page = if raw.is_empty() {
        1
    } else {
        raw.parse::<i64>().map_err(|_| invalid_page())?
    };
    if page < 1 {
        return Err(invalid_page());
    }

    let count = count.max(0);
    let total_pages = (count + PAGE_SIZE - 1) / PAGE_SIZE;
    if total_pages < page {
        return Err(DomainError::NotFound(format!("page {page}")));
    }

    Ok(Page {
        page,
        limit: PAGE_SIZE,
        offset: (page - 1) * PAGE_SIZE,
        total_pages,
    })
}

fn invalid_page() -> DomainError {
    DomainError::Validation {
        field: "page",
        message: "must be an integer >= 1",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct PaginationInfo {
    pub(crate) next: Option<String>,
    pub(crate) prev: Option<String>,
    pub(crate) pages: i64,
    pub(crate) count: i64,
}

impl PaginationInfo {
    /// `path` may already carry a query string, e.g. `/post/search?q=rust`.
    pub(crate) fn build(page: &Page, count: i64, fetched: usize, path: &str) -> Self {
        let has_more = fetched as i64 == page.limit && page.page < page.total_pages;
        let next = has_more.then(|| page_link(path, page.page + 1));
        let prev = (page.page > 1).then(|| page_link(path, page.page - 1));

        Self {
            next,
            prev,
            pages: page.total_pages,
            count,
        }
    }
}

fn page_link(path: &str, page: i64) -> String {
    let separator = if path.contains('?') { '&' } else { '?' };
    format!("{path}{separator}page={page}")
}

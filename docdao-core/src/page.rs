//! Pagination parameters and paged results.

use serde::{Deserialize, Serialize};

/// Which slice of a result set to read. Pages are 1-based: page 1 is the
/// first page.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationParams {
    /// The page number (1-based).
    pub page: usize,
    /// Number of items per page.
    pub per_page: usize,
}

impl PaginationParams {
    /// Creates pagination parameters for the given page and page size.
    pub fn new(page: usize, per_page: usize) -> Self {
        Self { page, per_page }
    }

    /// Number of documents skipped before this page starts.
    ///
    /// ```ignore
    /// assert_eq!(PaginationParams::new(3, 20).offset(), 40);
    /// ```
    pub fn offset(&self) -> usize {
        self.page.saturating_sub(1) * self.per_page
    }
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self { page: 1, per_page: 10 }
    }
}

/// One page of results plus the metadata to navigate from it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Page<T> {
    /// The items on this page.
    pub items: Vec<T>,
    /// Total matches across every page.
    pub total: u64,
    /// The page number these items came from (1-based).
    pub page: usize,
    /// The page size the result was read with.
    pub per_page: usize,
}

impl<T> Page<T> {
    /// Assembles a page from its items, the total match count, and the
    /// parameters the read used.
    pub fn new(items: Vec<T>, total: u64, params: PaginationParams) -> Self {
        Self {
            items,
            total,
            page: params.page,
            per_page: params.per_page,
        }
    }

    /// The next page number, if more matches remain past this page.
    pub fn next_page(&self) -> Option<usize> {
        if (self.page * self.per_page) as u64 >= self.total {
            None
        } else {
            Some(self.page + 1)
        }
    }

    /// The previous page number, if this is not the first page.
    pub fn previous_page(&self) -> Option<usize> {
        if self.page > 1 { Some(self.page - 1) } else { None }
    }
}

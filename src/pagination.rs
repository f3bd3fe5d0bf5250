use serde::Serialize;

/// Default number of items rendered per page by catalog listings.
pub const DEFAULT_ITEMS_PER_PAGE: usize = 20;

/// Page selection applied to list queries (1-based page numbers).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: usize,
    pub per_page: usize,
}

impl Pagination {
    /// Number of rows to skip before the requested page.
    pub fn offset(&self) -> i64 {
        ((self.page.max(1) - 1) * self.per_page) as i64
    }

    /// Maximum number of rows returned for the requested page.
    pub fn limit(&self) -> i64 {
        self.per_page as i64
    }
}

/// A page of items together with the information needed to render a pager.
#[derive(Debug, Clone, Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub pages: usize,
    pub total: usize,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, page: usize, per_page: usize, total: usize) -> Self {
        let pages = if per_page == 0 {
            0
        } else {
            total.div_ceil(per_page)
        };
        Self {
            items,
            page: page.max(1),
            pages,
            total,
        }
    }
}

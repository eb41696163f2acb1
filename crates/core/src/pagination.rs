//! Page-number pagination for admin listings.

use serde::Serialize;

/// Rows per page on every listing.
pub const PAGE_SIZE: i64 = 15;

/// Clamp a user-provided 1-based page number to at least 1.
pub fn clamp_page(page: Option<i64>) -> i64 {
    page.unwrap_or(1).max(1)
}

/// SQL offset for a 1-based page number.
pub fn page_offset(page: i64, per_page: i64) -> i64 {
    (clamp_page(Some(page)) - 1).saturating_mul(per_page.max(1))
}

/// One page of rows plus the numbers needed to render pagination links.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: i64, page: i64, per_page: i64) -> Self {
        Self {
            items,
            total: total.max(0),
            page: clamp_page(Some(page)),
            per_page: per_page.max(1),
        }
    }

    /// Last page number; an empty listing still has one (empty) page.
    pub fn last_page(&self) -> i64 {
        ((self.total + self.per_page - 1) / self.per_page).max(1)
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.last_page()
    }

    /// 1-based position of the first row on this page, 0 when empty.
    pub fn first_item(&self) -> i64 {
        if self.items.is_empty() {
            0
        } else {
            page_offset(self.page, self.per_page) + 1
        }
    }

    /// 1-based position of the last row on this page, 0 when empty.
    pub fn last_item(&self) -> i64 {
        if self.items.is_empty() {
            0
        } else {
            page_offset(self.page, self.per_page) + self.items.len() as i64
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            per_page: self.per_page,
        }
    }
}

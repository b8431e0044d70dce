//! Page arithmetic for paginated listings.
//!
//! Pages are 1-indexed. A [`PageRequest`] is only constructible with
//! `page >= 1` and `items_per_page >= 1`, so `skip()` always starts page 1 at
//! offset 0.

use serde::{Deserialize, Serialize};

use crate::error::{TaskboardError, ValidationErrors};
use crate::result::TaskboardResult;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_ITEMS_PER_PAGE: u32 = 12;

/// A validated page selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
    page: u32,
    items_per_page: u32,
}

impl PageRequest {
    pub fn new(page: u32, items_per_page: u32) -> TaskboardResult<Self> {
        let mut errors = ValidationErrors::new();
        if page < 1 {
            errors.add("page", "must be greater than or equal to 1");
        }
        if items_per_page < 1 {
            errors.add("itemsPerPage", "must be greater than or equal to 1");
        }
        if !errors.is_empty() {
            return Err(TaskboardError::Validation(errors));
        }
        Ok(Self {
            page,
            items_per_page,
        })
    }

    /// Build from optional query values, substituting defaults for missing ones.
    pub fn from_optional(
        page: Option<u32>,
        items_per_page: Option<u32>,
        default_items_per_page: u32,
    ) -> TaskboardResult<Self> {
        Self::new(
            page.unwrap_or(DEFAULT_PAGE),
            items_per_page.unwrap_or(default_items_per_page),
        )
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn items_per_page(&self) -> u32 {
        self.items_per_page
    }

    /// Number of records belonging to earlier pages.
    pub fn skip(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.items_per_page)
    }

    pub fn limit(&self) -> u64 {
        u64::from(self.items_per_page)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            items_per_page: DEFAULT_ITEMS_PER_PAGE,
        }
    }
}

/// One page of results plus the total size of the unpaginated result set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub items_per_page: u32,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, total: u64, request: PageRequest) -> Self {
        Self {
            items,
            total,
            page: request.page(),
            items_per_page: request.items_per_page(),
        }
    }

    pub fn total_pages(&self) -> u64 {
        self.total.div_ceil(u64::from(self.items_per_page.max(1)))
    }

    pub fn has_next(&self) -> bool {
        u64::from(self.page) < self.total_pages()
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            items_per_page: self.items_per_page,
        }
    }
}

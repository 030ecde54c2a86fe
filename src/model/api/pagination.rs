use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: usize = 50;

/// Query parameters selecting one page of a listing. Pages are numbered from 1
/// and hold at most 500 items.
#[derive(Debug, Clone, Copy, FromForm)]
pub struct PaginationRequest {
    #[field(default = 1, validate = range(1..))]
    page_num: usize,
    #[field(default = DEFAULT_PAGE_SIZE, validate = range(1..=500))]
    page_size: usize,
}

impl PaginationRequest {
    pub fn new(page_num: usize, page_size: usize) -> Self {
        Self {
            page_num,
            page_size,
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Number of items before this page.
    pub fn skip(&self) -> usize {
        self.page_num.saturating_sub(1).saturating_mul(self.page_size)
    }

    pub fn to_paginated<T>(self, total: usize, items: Vec<T>) -> Paginated<T> {
        Paginated {
            items,
            pagination: PaginationResult {
                page_num: self.page_num,
                page_size: self.page_size,
                total,
            },
        }
    }
}

/// One page of results.
#[derive(Debug, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    #[serde(flatten)]
    pub pagination: PaginationResult,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationResult {
    pub page_num: usize,
    pub page_size: usize,
    pub total: usize,
}

//! Pagination for list endpoints

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

const DEFAULT_PAGE_SIZE: u64 = 20;
const MAX_PAGE_SIZE: u64 = 100;

#[derive(Debug, Clone, Copy, Deserialize, Serialize, ToSchema)]
pub struct PaginationParams {
    pub page: u64,
    pub page_size: u64,
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PaginationParams {
    pub fn new(page: Option<u32>, per_page: Option<u32>) -> Self {
        Self {
            page: page.map_or(1, u64::from).max(1),
            page_size: per_page
                .map_or(DEFAULT_PAGE_SIZE, u64::from)
                .clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn get_offset(&self) -> u64 {
        (self.page - 1) * self.page_size
    }

    pub fn get_limit(&self) -> u64 {
        self.page_size
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub page: u64,
    pub page_size: u64,
    pub total: u64,
    pub total_pages: u64,
}

impl<T> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, params: &PaginationParams, total: u64) -> Self {
        let total_pages = total.div_ceil(params.page_size);
        Self {
            data,
            page: params.page,
            page_size: params.page_size,
            total,
            total_pages,
        }
    }
}

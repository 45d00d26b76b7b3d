use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::AppError;

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

/// A validated page window. Pages are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
}

impl PageRequest {
    /// Applies defaults and rejects out-of-range values.
    pub fn new(page: Option<u32>, page_size: Option<u32>) -> Result<Self, AppError> {
        let page = page.unwrap_or(1);
        let page_size = page_size.unwrap_or(DEFAULT_PAGE_SIZE);

        if page < 1 {
            return Err(AppError::InvalidInput("page must be >= 1".to_string()));
        }
        if page_size < 1 || page_size > MAX_PAGE_SIZE {
            return Err(AppError::InvalidInput(format!(
                "page_size must be between 1 and {MAX_PAGE_SIZE}"
            )));
        }
        Ok(Self { page, page_size })
    }

    pub fn offset(&self) -> i64 {
        (i64::from(self.page) - 1) * i64::from(self.page_size)
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.page_size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Paginated
///
/// List envelope consumed by the frontend: `{results, total, page, page_size}`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Paginated<T> {
    pub results: Vec<T>,
    pub total: i64,
    pub page: u32,
    pub page_size: u32,
}

impl<T> Paginated<T> {
    pub fn new(results: Vec<T>, total: i64, window: PageRequest) -> Self {
        Self {
            results,
            total,
            page: window.page,
            page_size: window.page_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_absent() {
        let window = PageRequest::new(None, None).unwrap();
        assert_eq!(window, PageRequest::default());
        assert_eq!(window.offset(), 0);
        assert_eq!(window.limit(), 20);
    }

    #[test]
    fn offset_skips_previous_pages() {
        let window = PageRequest::new(Some(3), Some(10)).unwrap();
        assert_eq!(window.offset(), 20);
    }

    #[test]
    fn rejects_out_of_range_values() {
        assert!(PageRequest::new(Some(0), None).is_err());
        assert!(PageRequest::new(None, Some(0)).is_err());
        assert!(PageRequest::new(None, Some(MAX_PAGE_SIZE + 1)).is_err());
    }
}

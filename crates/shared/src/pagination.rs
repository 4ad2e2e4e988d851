//! Page-based pagination utilities.

use serde::Serialize;
use thiserror::Error;

/// Page size used when the client does not ask for one.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Upper bound for a single page.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Error type for pagination parameters.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PaginationError {
    #[error("page must be 1 or greater")]
    InvalidPage,
    #[error("page_size must be between 1 and {MAX_PAGE_SIZE}")]
    InvalidPageSize,
}

/// A validated page request (1-based page number).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    /// Builds a page request from optional query parameters.
    pub fn new(page: Option<u32>, page_size: Option<u32>) -> Result<Self, PaginationError> {
        let page = page.unwrap_or(1);
        let page_size = page_size.unwrap_or(DEFAULT_PAGE_SIZE);

        if page == 0 {
            return Err(PaginationError::InvalidPage);
        }
        if page_size == 0 || page_size > MAX_PAGE_SIZE {
            return Err(PaginationError::InvalidPageSize);
        }

        Ok(Self { page, page_size })
    }

    /// Number of rows to skip.
    pub fn offset(&self) -> i64 {
        (self.page as i64 - 1) * self.page_size as i64
    }

    /// Number of rows to return.
    pub fn limit(&self) -> i64 {
        self.page_size as i64
    }
}

/// Computes the number of pages needed for `total` items.
pub fn total_pages(total: i64, page_size: u32) -> u32 {
    if total <= 0 || page_size == 0 {
        return 0;
    }
    ((total + page_size as i64 - 1) / page_size as i64) as u32
}

/// Paginated list envelope returned by every list endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub total_count: i64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
}

impl<T> Paginated<T> {
    pub fn new(data: Vec<T>, total_count: i64, request: PageRequest) -> Self {
        Self {
            data,
            total_count,
            page: request.page,
            page_size: request.page_size,
            total_pages: total_pages(total_count, request.page_size),
        }
    }

    /// Converts the items while keeping the paging metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            data: self.data.into_iter().map(f).collect(),
            total_count: self.total_count,
            page: self.page,
            page_size: self.page_size,
            total_pages: self.total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_absent() {
        let request = PageRequest::new(None, None).unwrap();
        assert_eq!(request, PageRequest::default());
        assert_eq!(request.offset(), 0);
        assert_eq!(request.limit(), DEFAULT_PAGE_SIZE as i64);
    }

    #[test]
    fn test_offset_for_later_pages() {
        let request = PageRequest::new(Some(3), Some(10)).unwrap();
        assert_eq!(request.offset(), 20);
        assert_eq!(request.limit(), 10);
    }

    #[test]
    fn test_rejects_page_zero() {
        assert_eq!(
            PageRequest::new(Some(0), None),
            Err(PaginationError::InvalidPage)
        );
    }

    #[test]
    fn test_rejects_oversized_page() {
        assert_eq!(
            PageRequest::new(None, Some(MAX_PAGE_SIZE + 1)),
            Err(PaginationError::InvalidPageSize)
        );
        assert_eq!(
            PageRequest::new(None, Some(0)),
            Err(PaginationError::InvalidPageSize)
        );
    }

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(1, 10), 1);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
        assert_eq!(total_pages(25, 10), 3);
    }

    #[test]
    fn test_envelope_serialization() {
        let page = Paginated::new(vec![1, 2, 3], 13, PageRequest::new(Some(2), Some(3)).unwrap());
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["total_count"], 13);
        assert_eq!(json["page"], 2);
        assert_eq!(json["total_pages"], 5);
        assert_eq!(json["data"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_map_keeps_metadata() {
        let page = Paginated::new(vec![1, 2], 2, PageRequest::default()).map(|n| n * 10);
        assert_eq!(page.data, vec![10, 20]);
        assert_eq!(page.total_count, 2);
        assert_eq!(page.total_pages, 1);
    }
}

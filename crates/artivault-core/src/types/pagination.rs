//! Pagination types for list operations.

use serde::{Deserialize, Serialize};

/// Default page size.
const DEFAULT_PAGE_SIZE: u64 = 10;
/// Maximum page size.
const MAX_PAGE_SIZE: u64 = 100;

/// Request parameters for paginated queries.
///
/// Values are clamped on construction and on deserialization, so
/// `page >= 1` and `1 <= page_size <= MAX_PAGE_SIZE` always hold.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(from = "RawPageRequest")]
pub struct PageRequest {
    page: u64,
    page_size: u64,
}

/// Wire shape of [`PageRequest`] before clamping.
#[derive(Deserialize)]
struct RawPageRequest {
    #[serde(default = "default_page")]
    page: u64,
    #[serde(default = "default_page_size")]
    page_size: u64,
}

impl From<RawPageRequest> for PageRequest {
    fn from(raw: RawPageRequest) -> Self {
        Self::new(raw.page, raw.page_size)
    }
}

impl PageRequest {
    /// Create a new page request, clamping out-of-range values.
    pub fn new(page: u64, page_size: u64) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// Page number (1-based).
    pub fn page(&self) -> u64 {
        self.page
    }

    /// Number of items per page.
    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    /// Calculate the SQL `OFFSET` value, capped so it still fits a `BIGINT`.
    pub fn offset(&self) -> u64 {
        self.page
            .saturating_sub(1)
            .saturating_mul(self.page_size)
            .min(i64::MAX as u64)
    }

    /// Return the SQL `LIMIT` value.
    pub fn limit(&self) -> u64 {
        self.page_size
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

/// Paginated response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResponse<T> {
    /// The items on this page.
    pub items: Vec<T>,
    /// Current page number (1-based).
    pub page: u64,
    /// Number of items per page.
    pub page_size: u64,
    /// Total number of items across all pages.
    pub total_items: u64,
    /// Total number of pages.
    pub total_pages: u64,
    /// Whether there is a next page.
    pub has_next: bool,
    /// Whether there is a previous page.
    pub has_previous: bool,
}

impl<T> PageResponse<T> {
    /// Create a new paginated response.
    pub fn new(items: Vec<T>, page: &PageRequest, total_items: u64) -> Self {
        let total_pages = if total_items == 0 {
            1
        } else {
            total_items.div_ceil(page.page_size)
        };
        Self {
            items,
            page: page.page,
            page_size: page.page_size,
            total_items,
            total_pages,
            has_next: page.page < total_pages,
            has_previous: page.page > 1,
        }
    }

    /// Slice one page out of an already ordered, fully materialised list.
    pub fn from_ordered(all: Vec<T>, page: &PageRequest) -> Self {
        let total = all.len() as u64;
        let items = all
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect();
        Self::new(items, page, total)
    }
}

fn default_page() -> u64 {
    1
}

fn default_page_size() -> u64 {
    DEFAULT_PAGE_SIZE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_clamps() {
        let req = PageRequest::new(0, 1_000);
        assert_eq!(req.page(), 1);
        assert_eq!(req.page_size(), MAX_PAGE_SIZE);
        assert_eq!(req.offset(), 0);
    }

    #[test]
    fn test_from_ordered_slices_second_page() {
        let page = PageRequest::new(2, 3);
        let resp = PageResponse::from_ordered((1..=7).collect::<Vec<_>>(), &page);
        assert_eq!(resp.items, vec![4, 5, 6]);
        assert_eq!(resp.total_items, 7);
        assert_eq!(resp.total_pages, 3);
        assert!(resp.has_next);
        assert!(resp.has_previous);
    }

    #[test]
    fn test_deserialize_clamps_zero_page_size() {
        let req: PageRequest = serde_json::from_str(r#"{"page":1,"page_size":0}"#).expect("parse");
        assert_eq!(req.page_size(), 1);

        let resp = PageResponse::<u8>::new(Vec::new(), &req, 5);
        assert_eq!(resp.total_pages, 5);
    }

    #[test]
    fn test_deserialize_defaults_and_caps() {
        let req: PageRequest = serde_json::from_str("{}").expect("parse");
        assert_eq!((req.page(), req.page_size()), (1, DEFAULT_PAGE_SIZE));

        let req: PageRequest =
            serde_json::from_str(&format!(r#"{{"page":{},"page_size":{}}}"#, u64::MAX, u64::MAX)).expect("parse");
        assert_eq!(req.page_size(), MAX_PAGE_SIZE);
        assert_eq!(req.offset(), i64::MAX as u64);
    }

    #[test]
    fn test_empty_has_one_page() {
        let resp = PageResponse::<u8>::new(Vec::new(), &PageRequest::default(), 0);
        assert_eq!(resp.total_pages, 1);
        assert!(!resp.has_next);
    }
}

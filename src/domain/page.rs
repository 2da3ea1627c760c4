//! Pagination primitives shared by the admin read paths

use serde::Serialize;

const DEFAULT_PAGE_SIZE: usize = 25;
const MAX_PAGE_SIZE: usize = 100;
/// Keeps `offset()` well inside the range of a SQL `BIGINT`
const MAX_PAGE: usize = 1_000_000;

/// A clamped page request (1-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: usize,
    page_size: usize,
}

impl PageRequest {
    /// Page is clamped to 1..=1_000_000, page size to 1..=100
    pub fn new(page: Option<usize>, page_size: Option<usize>) -> Self {
        Self {
            page: page.unwrap_or(1).clamp(1, MAX_PAGE),
            page_size: page_size
                .unwrap_or(DEFAULT_PAGE_SIZE)
                .clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn offset(&self) -> usize {
        (self.page - 1).saturating_mul(self.page_size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// One page of results plus the total match count
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub page_size: usize,
    pub total: usize,
    pub total_pages: usize,
    pub has_next: bool,
    pub has_prev: bool,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, request: PageRequest, total: usize) -> Self {
        let total_pages = total.div_ceil(request.page_size()).max(1);

        Self {
            items,
            page: request.page(),
            page_size: request.page_size(),
            total,
            total_pages,
            has_next: request.page() < total_pages,
            has_prev: request.page() > 1,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            page_size: self.page_size,
            total: self.total,
            total_pages: self.total_pages,
            has_next: self.has_next,
            has_prev: self.has_prev,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_request_clamping() {
        let req = PageRequest::new(Some(0), Some(500));
        assert_eq!(req.page(), 1);
        assert_eq!(req.page_size(), 100);

        let req = PageRequest::new(None, Some(0));
        assert_eq!(req.page_size(), 1);

        let req = PageRequest::default();
        assert_eq!(req.page(), 1);
        assert_eq!(req.page_size(), 25);
    }

    #[test]
    fn test_offset() {
        let req = PageRequest::new(Some(3), Some(10));
        assert_eq!(req.offset(), 20);
    }

    #[test]
    fn test_huge_page_is_bounded() {
        let req = PageRequest::new(Some(usize::MAX), Some(100));
        assert_eq!(req.page(), MAX_PAGE);
        assert!(i64::try_from(req.offset()).is_ok());
    }

    #[test]
    fn test_page_navigation_flags() {
        let page = Page::new(vec![1, 2, 3], PageRequest::new(Some(1), Some(3)), 7);
        assert_eq!(page.total_pages, 3);
        assert!(page.has_next);
        assert!(!page.has_prev);

        let empty: Page<u8> = Page::new(vec![], PageRequest::default(), 0);
        assert_eq!(empty.total_pages, 1);
        assert!(!empty.has_next);
    }
}

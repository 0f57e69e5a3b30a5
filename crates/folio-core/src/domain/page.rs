use serde::{Deserialize, Serialize};

/// Posts per page on listing screens.
pub const DEFAULT_PAGE_SIZE: u64 = 6;

/// Upper bounds on a page selection. Page numbers come straight from the
/// query string, so both are capped before any offset arithmetic.
pub const MAX_PAGE: u64 = 100_000;
pub const MAX_PAGE_SIZE: u64 = 100;

/// A 1-based page selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub per_page: u64,
}

impl PageRequest {
    /// Build a request, clamping page and size into `1..=MAX_PAGE` and
    /// `1..=MAX_PAGE_SIZE`.
    pub fn new(page: u64, per_page: u64) -> Self {
        Self {
            page: page.clamp(1, MAX_PAGE),
            per_page: per_page.clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.per_page)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, DEFAULT_PAGE_SIZE)
    }
}

/// One page of results plus the total match count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u64,
    pub per_page: u64,
    pub total: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, request: PageRequest, total: u64) -> Self {
        Self {
            items,
            page: request.page,
            per_page: request.per_page,
            total,
        }
    }

    pub fn empty(request: PageRequest) -> Self {
        Self::new(Vec::new(), request, 0)
    }

    /// Slice an already-filtered, already-ordered collection.
    pub fn from_vec(all: Vec<T>, request: PageRequest) -> Self {
        let total = all.len() as u64;
        let items = all
            .into_iter()
            .skip(request.offset() as usize)
            .take(request.per_page as usize)
            .collect();
        Self::new(items, request, total)
    }

    pub fn total_pages(&self) -> u64 {
        self.total.div_ceil(self.per_page)
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            per_page: self.per_page,
            total: self.total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_request_clamps() {
        let req = PageRequest::new(0, 0);
        assert_eq!(req.page, 1);
        assert_eq!(req.per_page, 1);
        assert_eq!(req.offset(), 0);
    }

    #[test]
    fn test_page_request_caps_huge_values() {
        let req = PageRequest::new(u64::MAX, u64::MAX);
        assert_eq!(req.page, MAX_PAGE);
        assert_eq!(req.per_page, MAX_PAGE_SIZE);
        assert_eq!(req.offset(), (MAX_PAGE - 1) * MAX_PAGE_SIZE);
    }

    #[test]
    fn test_from_vec_past_the_end_is_empty() {
        let page = Page::from_vec(vec![1, 2, 3], PageRequest::new(u64::MAX, 6));
        assert!(page.items.is_empty());
        assert_eq!(page.total, 3);
    }

    #[test]
    fn test_from_vec_slices_second_page() {
        let page = Page::from_vec((1..=14).collect::<Vec<u32>>(), PageRequest::new(2, 6));
        assert_eq!(page.items, vec![7, 8, 9, 10, 11, 12]);
        assert_eq!(page.total, 14);
        assert_eq!(page.total_pages(), 3);
    }
}

/// 0-based page request passed to repository queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub index: u32,
    pub size: u32,
}

impl PageRequest {
    pub fn new(index: u32, size: u32) -> Self {
        Self { index, size }
    }

    /// Row offset of the first item on this page
    pub fn offset(&self) -> u64 {
        self.index as u64 * self.size as u64
    }
}

/// One repository page of rows plus the total row count across all pages.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_items: u64,
}

/// Caller-facing page: items plus 1-based page number and totals.
#[derive(Debug, Clone, PartialEq)]
pub struct PagedResult<T> {
    pub current_page: u32,
    pub total_pages: u32,
    pub size: u32,
    pub total_items: u64,
    pub items: Vec<T>,
}

impl<T> PagedResult<T> {
    /// Builds the pagination metadata. `total_pages` is the ceiling of
    /// `total_items / size`; an empty result set yields zero pages.
    pub fn new(items: Vec<T>, current_page: u32, size: u32, total_items: u64) -> Self {
        let total_pages = if size == 0 {
            0
        } else {
            total_items.div_ceil(size as u64) as u32
        };

        Self {
            current_page,
            total_pages,
            size,
            total_items,
            items,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_request_offset() {
        assert_eq!(PageRequest::new(0, 10).offset(), 0);
        assert_eq!(PageRequest::new(2, 5).offset(), 10);
    }

    #[test]
    fn total_pages_rounds_up() {
        let result = PagedResult::new(vec![1, 2, 3], 1, 10, 11);
        assert_eq!(result.total_pages, 2);
        assert_eq!(result.total_items, 11);
    }

    #[test]
    fn exact_multiple_does_not_round_up() {
        let result = PagedResult::new(vec![1, 2], 3, 5, 15);
        assert_eq!(result.total_pages, 3);
        assert_eq!(result.current_page, 3);
    }

    #[test]
    fn empty_result_set_has_zero_pages() {
        let result: PagedResult<i32> = PagedResult::new(Vec::new(), 1, 10, 0);
        assert_eq!(result.total_pages, 0);
        assert!(result.items.is_empty());
    }
}

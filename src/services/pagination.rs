use std::ops::RangeInclusive;

/// Number of search results per page
pub const PAGE_SIZE: u32 = 20;

/// Page arithmetic over a 1-based, rank-ordered result set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub current_page: u32,
    pub page_size: u32,
}

impl Pagination {
    /// `current_page` below 1 is treated as the first page
    pub fn new(current_page: u32, page_size: u32) -> Self {
        Self {
            current_page: current_page.max(1),
            page_size: page_size.max(1),
        }
    }

    /// Inclusive window of rankings that belong on this page
    pub fn ranking_window(&self) -> RangeInclusive<i64> {
        let size = i64::from(self.page_size);
        let start = size * (i64::from(self.current_page) - 1) + 1;
        start..=start + size - 1
    }

    pub fn total_pages(&self, total_items: u64) -> u64 {
        total_items.div_ceil(u64::from(self.page_size))
    }

    pub fn next_page(&self, total_items: u64) -> Option<u32> {
        let next = self.current_page.checked_add(1)?;
        (u64::from(next) <= self.total_pages(total_items)).then_some(next)
    }

    pub fn prev_page(&self) -> Option<u32> {
        (self.current_page != 1).then(|| self.current_page - 1)
    }
}

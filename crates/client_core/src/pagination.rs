//! Page arithmetic over the sorted collection. Pages are 1-based.

use std::ops::Range;

pub const DEFAULT_PAGE_SIZE: usize = 6;

/// Number of non-empty pages needed for `total_items`. Zero for an empty
/// collection.
pub fn page_count(total_items: usize, page_size: usize) -> usize {
    total_items.div_ceil(page_size.max(1))
}

/// Page to show after the collection shrank to `total_items`. Pulls the page
/// back to the last non-empty one, never below 1.
pub fn clamp_page(current_page: usize, total_items: usize, page_size: usize) -> usize {
    let max_page = page_count(total_items, page_size);
    if current_page > max_page {
        max_page.max(1)
    } else {
        current_page.max(1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page: usize,
    pub page_size: usize,
    pub total_items: usize,
}

impl PageWindow {
    pub fn new(page: usize, page_size: usize, total_items: usize) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.max(1),
            total_items,
        }
    }

    /// Page count as shown to the user: an empty list still has page 1.
    pub fn total_pages(&self) -> usize {
        page_count(self.total_items, self.page_size).max(1)
    }

    pub fn start_index(&self) -> usize {
        (self.page - 1).saturating_mul(self.page_size)
    }

    /// Index range of the visible slice, empty when the page is past the end.
    pub fn range(&self) -> Range<usize> {
        let start = self.start_index().min(self.total_items);
        let end = start.saturating_add(self.page_size).min(self.total_items);
        start..end
    }

    /// 1-based "showing X to Y" bounds, `None` for an empty slice.
    pub fn showing(&self) -> Option<(usize, usize)> {
        let range = self.range();
        if range.is_empty() {
            None
        } else {
            Some((range.start + 1, range.end))
        }
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }
}

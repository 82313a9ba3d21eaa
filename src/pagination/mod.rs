pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Page bookkeeping for one filtered collection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageWindow {
    pub page_count: usize,
    pub page_index: usize,
    pub start: usize,
    pub end: usize,
}

impl PageWindow {
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Number of pages needed for `filtered_count` items; never less than one so
/// that page controls stay renderable for an empty result.
pub fn page_count(filtered_count: usize, page_size: usize) -> usize {
    let page_size = page_size.max(1);
    filtered_count.div_ceil(page_size).max(1)
}

pub fn reconcile(filtered_count: usize, page_size: usize, requested_page_index: usize) -> PageWindow {
    let page_size = page_size.max(1);
    let page_count = page_count(filtered_count, page_size);
    let page_index = requested_page_index.min(page_count - 1);
    let start = page_index.saturating_mul(page_size).min(filtered_count);
    let end = start.saturating_add(page_size).min(filtered_count);
    PageWindow {
        page_count,
        page_index,
        start,
        end,
    }
}

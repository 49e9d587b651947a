use std::ops::RangeInclusive;

use super::model::EventPage;
use crate::constants::MAX_VISIBLE_PAGES;

/// One slot in a pager
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageItem {
    Page(u32),
    Ellipsis,
}

/// Pager arithmetic for a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub current_page: u32,
    pub total_pages: u32,
    pub total_items: u64,
    pub page_size: u32,
}

impl Pagination {
    /// `current_page` is clamped into `1..=total_pages`
    pub fn new(current_page: u32, total_pages: u32, total_items: u64, page_size: u32) -> Self {
        let total_pages = total_pages.max(1);
        Self {
            current_page: current_page.clamp(1, total_pages),
            total_pages,
            total_items,
            page_size: page_size.max(1),
        }
    }

    pub fn from_page(page: &EventPage, page_size: u32) -> Self {
        Self::new(page.current_page, page.total_pages, page.total_events, page_size)
    }

    /// A single page needs no pager
    pub fn is_needed(&self) -> bool {
        self.total_pages > 1
    }

    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }

    /// Up to five pages around the current one, shifted to stay in range
    pub fn visible_pages(&self) -> RangeInclusive<u32> {
        let half = MAX_VISIBLE_PAGES / 2;
        let mut start = self.current_page.saturating_sub(half).max(1);
        let end = start.saturating_add(MAX_VISIBLE_PAGES - 1).min(self.total_pages);
        if end - start < MAX_VISIBLE_PAGES - 1 {
            start = end.saturating_sub(MAX_VISIBLE_PAGES - 1).max(1);
        }
        start..=end
    }

    /// Full pager: first page, gap, window, gap, last page
    pub fn items(&self) -> Vec<PageItem> {
        let window = self.visible_pages();
        let (start, end) = (*window.start(), *window.end());
        let mut items = Vec::new();

        if start > 1 {
            items.push(PageItem::Page(1));
            if start > 2 {
                items.push(PageItem::Ellipsis);
            }
        }
        items.extend(window.map(PageItem::Page));
        if end < self.total_pages {
            if end < self.total_pages - 1 {
                items.push(PageItem::Ellipsis);
            }
            items.push(PageItem::Page(self.total_pages));
        }
        items
    }

    /// 1-based first and last item shown on the current page
    pub fn item_range(&self) -> (u64, u64) {
        if self.total_items == 0 {
            return (0, 0);
        }
        let size = u64::from(self.page_size);
        let first = u64::from(self.current_page - 1) * size + 1;
        let last = (u64::from(self.current_page) * size).min(self.total_items);
        (first.min(last), last)
    }

    pub fn summary(&self) -> String {
        let (first, last) = self.item_range();
        format!("Showing {} - {} of {} events", first, last, self.total_items)
    }
}

//! Fixed-size page slicing for post listings.
//!
//! Page numbers are 1-based. Requests outside `1..=num_pages` are clipped
//! to the nearest valid page, and an empty listing still has one (empty)
//! page, so every request resolves to a page.

use serde::Serialize;

use super::error::DomainError;

pub(crate) const DEFAULT_PAGE_SIZE: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Paginator {
    per_page: u32,
}

/// Position of one page inside a listing of `total` records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub(crate) struct PageWindow {
    pub(crate) number: u64,
    pub(crate) num_pages: u64,
    pub(crate) per_page: u32,
    pub(crate) total: u64,
    pub(crate) offset: u64,
    pub(crate) len: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Page<T> {
    pub(crate) items: Vec<T>,
    pub(crate) window: PageWindow,
}

impl Paginator {
    pub(crate) fn new(per_page: u32) -> Result<Self, DomainError> {
        if per_page == 0 {
            return Err(DomainError::Validation {
                field: "page_size",
                message: "must be > 0",
            });
        }
        Ok(Self { per_page })
    }

    pub(crate) fn per_page(&self) -> u32 {
        self.per_page
    }

    pub(crate) fn window(&self, total: u64, requested: u64) -> PageWindow {
        let per_page = u64::from(self.per_page);
        let num_pages = total.div_ceil(per_page).max(1);
        let number = requested.clamp(1, num_pages);
        let offset = (number - 1) * per_page;
        let len = total.saturating_sub(offset).min(per_page);

        PageWindow {
            number,
            num_pages,
            per_page: self.per_page,
            total,
            offset,
            len,
        }
    }

    pub(crate) fn paginate<T: Clone>(&self, items: &[T], requested: u64) -> Page<T> {
        let window = self.window(items.len() as u64, requested);
        let start = usize::try_from(window.offset).unwrap_or(items.len());
        let len = usize::try_from(window.len).unwrap_or(0);
        let items = items.iter().skip(start).take(len).cloned().collect();

        Page { items, window }
    }
}

impl Default for Paginator {
    fn default() -> Self {
        Self {
            per_page: DEFAULT_PAGE_SIZE,
        }
    }
}

impl<T> Page<T> {
    pub(crate) fn number(&self) -> u64 {
        self.window.number
    }

    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }

    pub(crate) fn has_next(&self) -> bool {
        self.window.number < self.window.num_pages
    }

    pub(crate) fn has_previous(&self) -> bool {
        self.window.number > 1
    }

    pub(crate) fn next_page_number(&self) -> Option<u64> {
        self.has_next().then(|| self.window.number + 1)
    }

    pub(crate) fn previous_page_number(&self) -> Option<u64> {
        self.has_previous().then(|| self.window.number - 1)
    }

    pub(crate) fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            window: self.window,
        }
    }
}

/// Reads the `page` query value; anything that is not a positive integer
/// means the first page.
pub(crate) fn requested_page(raw: Option<&str>) -> u64 {
    raw.and_then(|value| value.trim().parse::<u64>().ok())
        .filter(|page| *page > 0)
        .unwrap_or(1)
}

//! Page-number pagination.
//!
//! Mirrors the lenient `get_page` behaviour of classic page-number
//! paginators: a missing or garbled page parameter yields the first page, a
//! page past either end yields the last page, and an empty sequence still has
//! one (empty) page. Callers pick the page size; the paginator does not care
//! which feed it is slicing.

use std::num::IntErrorKind;

use serde::Deserialize;

/// `?page=` query parameter shared by every paginated view.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

impl PageQuery {
    pub fn page(&self) -> Option<&str> {
        self.page.as_deref()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Paginator {
    per_page: usize,
}

/// Where a resolved page sits inside the full result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub number: usize,
    pub num_pages: usize,
    pub offset: usize,
    pub limit: usize,
}

impl Paginator {
    pub fn new(per_page: usize) -> Self {
        Self {
            per_page: per_page.max(1),
        }
    }

    pub fn per_page(&self) -> usize {
        self.per_page
    }

    pub fn num_pages(&self, count: usize) -> usize {
        count.div_ceil(self.per_page).max(1)
    }

    /// Resolves a raw page parameter against `count` items.
    pub fn locate(&self, count: usize, requested: Option<&str>) -> PageWindow {
        let num_pages = self.num_pages(count);
        let number = match requested.map(str::trim).map(str::parse::<i64>) {
            None => 1,
            Some(Err(e)) => match e.kind() {
                IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => num_pages,
                _ => 1,
            },
            Some(Ok(n)) if n < 1 => num_pages,
            Some(Ok(n)) => usize::try_from(n).map_or(num_pages, |n| n.min(num_pages)),
        };

        PageWindow {
            number,
            num_pages,
            offset: (number - 1) * self.per_page,
            limit: self.per_page,
        }
    }

    /// Slices an already ordered sequence.
    #[cfg(test)]
    pub(crate) fn paginate<T>(&self, items: Vec<T>, requested: Option<&str>) -> Page<T> {
        let count = items.len();
        let window = self.locate(count, requested);
        let object_list = items
            .into_iter()
            .skip(window.offset)
            .take(window.limit)
            .collect();

        Page::new(object_list, window, count, self.per_page)
    }
}

#[derive(Debug, Clone)]
pub struct Page<T> {
    pub object_list: Vec<T>,
    /// 1-indexed.
    pub number: usize,
    pub num_pages: usize,
    /// Items across all pages.
    pub count: usize,
    pub per_page: usize,
}

impl<T> Page<T> {
    pub fn new(object_list: Vec<T>, window: PageWindow, count: usize, per_page: usize) -> Self {
        Self {
            object_list,
            number: window.number,
            num_pages: window.num_pages,
            count,
            per_page,
        }
    }

    pub fn len(&self) -> usize {
        self.object_list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.object_list.is_empty()
    }

    pub fn has_next(&self) -> bool {
        self.number < self.num_pages
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn next_page_number(&self) -> Option<usize> {
        self.has_next().then(|| self.number + 1)
    }

    pub fn previous_page_number(&self) -> Option<usize> {
        self.has_previous().then(|| self.number - 1)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.object_list.iter()
    }
}

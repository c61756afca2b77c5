//! Pagination with a clamped, 1-indexed current page.

use serde::{Deserialize, Serialize};

/// Page sizes offered to the viewer.
pub const PAGE_SIZES: [usize; 3] = [10, 20, 50];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSize(usize);

impl PageSize {
    /// Accept only one of [`PAGE_SIZES`].
    pub fn new(n: usize) -> Option<Self> { PAGE_SIZES.contains(&n).then_some(Self(n)) }
    pub fn get(self) -> usize { self.0 }
}

impl Default for PageSize {
    fn default() -> Self { Self(PAGE_SIZES[0]) }
}

/// Number of pages for `total` rows; never less than 1.
pub fn total_pages(total: usize, size: PageSize) -> usize { total.div_ceil(size.get()).max(1) }

/// Clamp a requested page into `[1, total_pages]`.
pub fn clamp_page(requested: usize, total: usize, size: PageSize) -> usize {
    requested.clamp(1, total_pages(total, size))
}

/// One page of rows plus where it sits.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub rows: Vec<T>,
    /// Effective page after clamping.
    pub page: usize,
    pub total_pages: usize,
    /// Rows across all pages.
    pub total: usize,
}

/// Slice `rows[(page-1)*size .. min(page*size, n)]` after clamping `page`.
/// A page past the end therefore shows the last page.
pub fn paginate<T: Clone>(rows: &[T], requested: usize, size: PageSize) -> Page<T> {
    let total = rows.len();
    let page = clamp_page(requested, total, size);
    let start = ((page - 1) * size.get()).min(total);
    let end = (start + size.get()).min(total);
    Page { rows: rows[start..end].to_vec(), page, total_pages: total_pages(total, size), total }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes_are_restricted() {
        assert!(PageSize::new(20).is_some());
        assert!(PageSize::new(15).is_none());
        assert_eq!(PageSize::default().get(), 10);
    }

    #[test]
    fn empty_input_has_one_empty_page() {
        let p = paginate::<u8>(&[], 5, PageSize::default());
        assert_eq!((p.page, p.total_pages, p.rows.len()), (1, 1, 0));
        assert_eq!(clamp_page(0, 0, PageSize::default()), 1);
    }
}

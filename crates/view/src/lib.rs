//! FluxRadar viewer derivation.
//!
//! Everything a viewer shows is recomputed from the latest fetched snapshot plus
//! the current selection state: filter → sort → paginate for the table, and a
//! per-cluster overview over the unfiltered snapshot. No caches are kept between
//! derivations.

#![forbid(unsafe_code)]

pub mod facets;
pub mod filter;
pub mod overview;
pub mod page;
pub mod sort;

use fluxradar_core::{Field, Resource};

pub use facets::{facets, Facets};
pub use filter::{choice, Choice, Filter, ALL};
pub use overview::{cluster_overview, ClusterOverview, StatusCounts};
pub use page::{paginate, Page, PageSize, PAGE_SIZES};
pub use sort::{locale_cmp, Direction, SortConfig};

/// Viewer selection state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    filter: Filter,
    sort: SortConfig,
    page: usize,
    page_size: PageSize,
}

impl Default for ViewState {
    fn default() -> Self {
        Self { filter: Filter::default(), sort: SortConfig::default(), page: 1, page_size: PageSize::default() }
    }
}

impl ViewState {
    pub fn filter(&self) -> &Filter { &self.filter }
    pub fn sort(&self) -> SortConfig { self.sort }
    pub fn page(&self) -> usize { self.page }
    pub fn page_size(&self) -> PageSize { self.page_size }

    /// Replace the filter; the view returns to the first page.
    pub fn set_filter(&mut self, filter: Filter) {
        self.filter = filter;
        self.page = 1;
    }

    pub fn set_page_size(&mut self, size: PageSize) {
        self.page_size = size;
        self.page = 1;
    }

    pub fn request_sort(&mut self, key: Field) { self.sort.request(key); }

    pub fn set_sort(&mut self, sort: SortConfig) { self.sort = sort; }

    /// Requested page; clamped when the view is derived.
    pub fn go_to(&mut self, page: usize) { self.page = page; }
}

/// Everything derived for one render.
#[derive(Debug, Clone)]
pub struct View<'a> {
    pub page: Page<&'a Resource>,
    pub overview: Vec<ClusterOverview>,
    pub facets: Facets,
}

/// Run the full pipeline over `items`.
pub fn derive<'a>(items: &'a [Resource], state: &ViewState) -> View<'a> {
    let mut rows = state.filter.apply(items);
    state.sort.apply(&mut rows);
    View {
        page: paginate(&rows, state.page, state.page_size),
        overview: cluster_overview(items),
        facets: facets(items),
    }
}

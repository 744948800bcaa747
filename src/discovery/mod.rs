//! Tutorial discovery: search, filter and paginate
//!
//! A pure pipeline over a slice of tutorials. Input order is preserved; the pipeline
//! never sorts. Requesting a page past the end yields an empty page rather than the
//! last one, see [`clamp_page`] for callers that want to pin a page number into range.

pub mod filters;

use serde::Serialize;
use tracing::debug;

use crate::catalog::Tutorial;

pub use filters::Filters;

/// Tutorials per page when no page size is configured
pub const DEFAULT_PAGE_SIZE: usize = 6;

/// One page of discovery results
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<'a> {
    /// Tutorials on this page, in input order
    pub items: Vec<&'a Tutorial>,
    /// 1-based page number this page was built for
    pub page: usize,
    /// Number of tutorials matching the filters, across all pages
    pub total_matched: usize,
    /// `ceil(total_matched / page_size)`; zero when nothing matched
    pub total_pages: usize,
}

impl Page<'_> {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1 && self.total_pages > 0
    }
}

/// Run the full pipeline: filter, then cut out page `page` (1-based).
///
/// Page 0 is read as page 1 and a page size of 0 falls back to [`DEFAULT_PAGE_SIZE`].
pub fn discover<'a>(
    tutorials: &'a [Tutorial],
    filters: &Filters,
    page: usize,
    page_size: usize,
) -> Page<'a> {
    paginate(filter(tutorials, filters), page, page_size)
}

/// Tutorials passing all filters, in input order
pub fn filter<'a>(tutorials: &'a [Tutorial], filters: &Filters) -> Vec<&'a Tutorial> {
    let matches = filters.matcher();
    tutorials.iter().filter(|t| matches(*t)).collect()
}

/// Slice an already-filtered list into a page
pub fn paginate(matched: Vec<&Tutorial>, page: usize, page_size: usize) -> Page<'_> {
    let page = page.max(1);
    let page_size = if page_size == 0 {
        debug!("Page size 0 requested, using {DEFAULT_PAGE_SIZE}");
        DEFAULT_PAGE_SIZE
    } else {
        page_size
    };

    let total_matched = matched.len();
    let total_pages = total_matched.div_ceil(page_size);

    let start = (page - 1).saturating_mul(page_size);
    let items = matched.into_iter().skip(start).take(page_size).collect();

    Page { items, page, total_matched, total_pages }
}

/// Pin a requested page into `1..=total_pages` (1 when there are no pages)
pub fn clamp_page(page: usize, total_pages: usize) -> usize {
    page.clamp(1, total_pages.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Difficulty;
    use crate::catalog::model::fixtures::tutorial;
    use pretty_assertions::assert_eq;

    fn numbered(n: usize) -> Vec<Tutorial> {
        (1..=n).map(|i| tutorial(&i.to_string(), &format!("Tutorial {i}"))).collect()
    }

    fn ids(page: &Page<'_>) -> Vec<String> {
        page.items.iter().map(|t| t.id.clone()).collect()
    }

    #[test]
    fn seven_matches_span_two_pages() {
        let tutorials = numbered(7);
        let filters = Filters::new();

        let first = discover(&tutorials, &filters, 1, 6);
        assert_eq!(first.items.len(), 6);
        assert_eq!(first.total_pages, 2);
        assert_eq!(first.total_matched, 7);
        assert!(first.has_next());

        let second = discover(&tutorials, &filters, 2, 6);
        assert_eq!(ids(&second), vec!["7"]);
        assert!(!second.has_next());
        assert!(second.has_previous());

        let third = discover(&tutorials, &filters, 3, 6);
        assert!(third.is_empty());
        assert_eq!(third.total_matched, 7);
        assert_eq!(third.total_pages, 2);
    }

    #[test]
    fn unfiltered_first_page_is_catalog_prefix() {
        let tutorials = numbered(10);
        let page = discover(&tutorials, &Filters::new(), 1, DEFAULT_PAGE_SIZE);
        assert_eq!(ids(&page), vec!["1", "2", "3", "4", "5", "6"]);
    }

    #[test]
    fn no_matches_means_zero_pages() {
        let tutorials = numbered(3);
        let page = discover(&tutorials, &Filters::new().with_search("nothing like this"), 1, 6);
        assert!(page.is_empty());
        assert_eq!(page.total_matched, 0);
        assert_eq!(page.total_pages, 0);
        assert!(!page.has_previous());
    }

    #[test]
    fn filtering_preserves_input_order() {
        let mut tutorials = numbered(6);
        for t in tutorials.iter_mut().filter(|t| t.id.parse::<usize>().unwrap() % 2 == 0) {
            t.difficulty = Difficulty::Advanced;
        }

        let page = discover(&tutorials, &Filters::new().with_difficulty(Difficulty::Advanced), 1, 6);
        assert_eq!(ids(&page), vec!["2", "4", "6"]);
    }

    #[test]
    fn page_zero_and_page_size_zero_fall_back() {
        let tutorials = numbered(8);
        let page = discover(&tutorials, &Filters::new(), 0, 0);
        assert_eq!(page.page, 1);
        assert_eq!(page.items.len(), DEFAULT_PAGE_SIZE);
        assert_eq!(page.total_pages, 2);
    }

    #[test]
    fn clamp_page_pins_into_range() {
        assert_eq!(clamp_page(5, 2), 2);
        assert_eq!(clamp_page(0, 2), 1);
        assert_eq!(clamp_page(3, 0), 1);
        assert_eq!(clamp_page(2, 4), 2);
    }
}

//! Page-number handling shared by the book grid and the admin table.

use crate::db::books::PAGE_SIZE;

/// Parse a `?page=` value. Anything that is not a positive integer means page 1.
#[must_use]
pub fn parse_page(raw: Option<&str>) -> u32 {
    raw.and_then(|s| s.trim().parse::<u32>().ok())
        .filter(|&p| p >= 1)
        .unwrap_or(1)
}

/// Prev/next links for a paged listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub total_pages: u32,
    pub prev_href: Option<String>,
    pub next_href: Option<String>,
}

impl Pagination {
    /// Build links for `page` of a listing with `total` matches at `base`,
    /// carrying the search term along.
    #[must_use]
    pub fn new(base: &str, search: Option<&str>, page: u32, total: i64) -> Self {
        let total_pages = total_pages(total);
        let search = search.map(str::trim).filter(|s| !s.is_empty());

        let href = |target: u32| match search {
            Some(q) => format!("{base}?search={}&page={target}", urlencoding::encode(q)),
            None => format!("{base}?page={target}"),
        };

        Self {
            page,
            total_pages,
            prev_href: (page > 1).then(|| href(page - 1)),
            next_href: (page < total_pages).then(|| href(page + 1)),
        }
    }
}

/// `max(1, ceil(total / PAGE_SIZE))`.
fn total_pages(total: i64) -> u32 {
    let pages = (total.max(0) + PAGE_SIZE - 1) / PAGE_SIZE;
    u32::try_from(pages).unwrap_or(u32::MAX).max(1)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_page() {
        assert_eq!(parse_page(None), 1);
        assert_eq!(parse_page(Some("3")), 3);
        assert_eq!(parse_page(Some("0")), 1);
        assert_eq!(parse_page(Some("-2")), 1);
        assert_eq!(parse_page(Some("two")), 1);
        assert_eq!(parse_page(Some("")), 1);
    }

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(0), 1);
        assert_eq!(total_pages(12), 1);
        assert_eq!(total_pages(13), 2);
        assert_eq!(total_pages(24), 2);
        assert_eq!(total_pages(25), 3);
    }

    #[test]
    fn test_first_page_has_no_prev() {
        let p = Pagination::new("/", None, 1, 30);
        assert_eq!(p.total_pages, 3);
        assert_eq!(p.prev_href, None);
        assert_eq!(p.next_href.as_deref(), Some("/?page=2"));
    }

    #[test]
    fn test_last_page_has_no_next() {
        let p = Pagination::new("/admin/book/Table", Some("sci fi"), 3, 30);
        assert_eq!(
            p.prev_href.as_deref(),
            Some("/admin/book/Table?search=sci%20fi&page=2")
        );
        assert_eq!(p.next_href, None);
    }

    #[test]
    fn test_empty_listing_is_single_page() {
        let p = Pagination::new("/", Some("   "), 1, 0);
        assert_eq!(p.total_pages, 1);
        assert_eq!(p.prev_href, None);
        assert_eq!(p.next_href, None);
    }
}

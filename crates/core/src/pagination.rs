//! Feed pagination.
//!
//! Feeds are split into fixed-size pages of [`POSTS_PER_PAGE`] items.
//! Page numbers come straight from the `?page=` query parameter and
//! fail closed: anything unparseable becomes page 1, anything past the
//! end becomes the last page. Callers always get a valid page back.

/// Number of posts per feed page.
pub const POSTS_PER_PAGE: u64 = 10;

/// A requested page number, 1-indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    number: u64,
}

impl PageRequest {
    /// The first page.
    #[must_use]
    pub const fn first() -> Self {
        Self { number: 1 }
    }

    /// A specific page number. Zero is treated as page 1.
    #[must_use]
    pub const fn new(number: u64) -> Self {
        Self {
            number: if number == 0 { 1 } else { number },
        }
    }

    /// Parse a raw `?page=` query parameter value.
    ///
    /// Missing, non-numeric or zero values all resolve to page 1.
    #[must_use]
    pub fn from_param(raw: Option<&str>) -> Self {
        let number = raw
            .and_then(|s| s.trim().parse::<u64>().ok())
            .unwrap_or(1);
        Self::new(number)
    }

    /// The requested page number, before clamping against a feed.
    #[must_use]
    pub const fn number(self) -> u64 {
        self.number
    }

    /// Resolve the request against a feed of `total_items` items.
    ///
    /// Returns the clamped page number and the query offset of its
    /// first item. Requests beyond the last page land on the last page.
    #[must_use]
    pub fn resolve(self, total_items: u64) -> (u64, u64) {
        let total_pages = total_pages_for(total_items);
        let number = self.number.min(total_pages);
        (number, (number - 1) * POSTS_PER_PAGE)
    }
}

/// Number of pages needed for `total_items` items.
///
/// An empty feed still has one (empty) page.
#[must_use]
pub const fn total_pages_for(total_items: u64) -> u64 {
    if total_items == 0 {
        1
    } else {
        total_items.div_ceil(POSTS_PER_PAGE)
    }
}

/// One page of a feed, plus the navigation metadata templates need.
#[derive(Debug, Clone)]
pub struct Page<T> {
    /// Items on this page, in feed order.
    pub items: Vec<T>,
    /// 1-indexed page number, already clamped to the valid range.
    pub number: u64,
    /// Total number of pages in the feed.
    pub total_pages: u64,
    /// Total number of items in the feed.
    pub total_items: u64,
}

impl<T> Page<T> {
    /// Assemble a page from a fetched slice.
    ///
    /// `number` must already be clamped via [`PageRequest::resolve`].
    #[must_use]
    pub fn new(items: Vec<T>, total_items: u64, number: u64) -> Self {
        Self {
            items,
            number,
            total_pages: total_pages_for(total_items),
            total_items,
        }
    }

    /// An empty first page.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(Vec::new(), 0, 1)
    }

    /// Whether a page follows this one.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.number < self.total_pages
    }

    /// Whether a page precedes this one.
    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.number > 1
    }

    /// Number of the next page.
    #[must_use]
    pub const fn next_number(&self) -> u64 {
        self.number + 1
    }

    /// Number of the previous page.
    #[must_use]
    pub const fn previous_number(&self) -> u64 {
        self.number.saturating_sub(1)
    }

    /// Map the page items, keeping the navigation metadata.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            number: self.number,
            total_pages: self.total_pages,
            total_items: self.total_items,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages_is_ceil_division() {
        for total in 0..=45 {
            let expected = if total == 0 {
                1
            } else {
                (total + POSTS_PER_PAGE - 1) / POSTS_PER_PAGE
            };
            assert_eq!(total_pages_for(total), expected, "total = {total}");
        }
    }

    #[test]
    fn test_from_param_fails_closed() {
        assert_eq!(PageRequest::from_param(None).number(), 1);
        assert_eq!(PageRequest::from_param(Some("abc")).number(), 1);
        assert_eq!(PageRequest::from_param(Some("")).number(), 1);
        assert_eq!(PageRequest::from_param(Some("-3")).number(), 1);
        assert_eq!(PageRequest::from_param(Some("0")).number(), 1);
        assert_eq!(PageRequest::from_param(Some("2")).number(), 2);
        assert_eq!(PageRequest::from_param(Some(" 7 ")).number(), 7);
    }

    #[test]
    fn test_resolve_clamps_to_last_page() {
        // 42 items -> 5 pages
        let (number, offset) = PageRequest::new(99).resolve(42);
        assert_eq!(number, 5);
        assert_eq!(offset, 40);
    }

    #[test]
    fn test_resolve_first_page_of_empty_feed() {
        let (number, offset) = PageRequest::first().resolve(0);
        assert_eq!(number, 1);
        assert_eq!(offset, 0);
    }

    #[test]
    fn test_last_page_item_count() {
        // L mod 10 items on the last page, or 10 when it divides evenly
        for total in [1_u64, 9, 10, 11, 25, 30] {
            let (number, offset) = PageRequest::new(u64::MAX).resolve(total);
            assert_eq!(number, total_pages_for(total));
            let on_last = total - offset;
            let expected = if total % POSTS_PER_PAGE == 0 {
                POSTS_PER_PAGE
            } else {
                total % POSTS_PER_PAGE
            };
            assert_eq!(on_last, expected, "total = {total}");
        }
    }

    #[test]
    fn test_page_navigation_metadata() {
        let page = Page::new(vec![1, 2, 3], 23, 2);
        assert_eq!(page.total_pages, 3);
        assert!(page.has_next());
        assert!(page.has_previous());
        assert_eq!(page.next_number(), 3);
        assert_eq!(page.previous_number(), 1);

        let first = Page::<u8>::empty();
        assert!(!first.has_next());
        assert!(!first.has_previous());
        assert_eq!(first.total_pages, 1);
    }

    #[test]
    fn test_map_keeps_metadata() {
        let page = Page::new(vec![1, 2], 12, 2).map(|n| n * 10);
        assert_eq!(page.items, vec![10, 20]);
        assert_eq!(page.number, 2);
        assert_eq!(page.total_pages, 2);
    }
}

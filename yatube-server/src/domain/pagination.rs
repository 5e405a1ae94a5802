use serde::Serialize;

/// Posts shown per page on every listing.
pub const POSTS_PER_PAGE: u64 = 10;

/// Resolved position of one page inside a result set of `count` items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub number: u64,
    pub num_pages: u64,
    pub count: u64,
    pub per_page: u64,
}

impl PageWindow {
    /// Clamp a requested page number into `1..=num_pages`. An empty result
    /// still has one (empty) page.
    pub fn resolve(requested: Option<i64>, count: u64, per_page: u64) -> Self {
        let per_page = per_page.max(1);
        let num_pages = count.div_ceil(per_page).max(1);
        let number = match requested {
            Some(n) if n > 0 => (n as u64).min(num_pages),
            _ => 1,
        };
        Self {
            number,
            num_pages,
            count,
            per_page,
        }
    }

    pub fn offset(&self) -> u64 {
        (self.number - 1) * self.per_page
    }

    pub fn limit(&self) -> u64 {
        self.per_page
    }
}

/// One page of items plus the metadata templates need for navigation.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: u64,
    pub num_pages: u64,
    pub count: u64,
    pub has_next: bool,
    pub has_previous: bool,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, window: PageWindow) -> Self {
        Self {
            items,
            number: window.number,
            num_pages: window.num_pages,
            count: window.count,
            has_next: window.number < window.num_pages,
            has_previous: window.number > 1,
        }
    }
}

/// Parse the raw `page` query value. Anything that is not an integer means
/// "first page".
pub fn parse_page_number(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|value| value.trim().parse::<i64>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thirteen_items_split_ten_and_three() {
        let first = PageWindow::resolve(Some(1), 13, POSTS_PER_PAGE);
        let second = PageWindow::resolve(Some(2), 13, POSTS_PER_PAGE);
        assert_eq!(first.num_pages, 2);
        assert_eq!((first.offset(), first.limit()), (0, 10));
        assert_eq!(second.offset(), 10);
        assert_eq!(13 - second.offset(), 3);
    }

    #[test]
    fn out_of_range_numbers_clamp() {
        assert_eq!(PageWindow::resolve(Some(99), 13, 10).number, 2);
        assert_eq!(PageWindow::resolve(Some(0), 13, 10).number, 1);
        assert_eq!(PageWindow::resolve(Some(-4), 13, 10).number, 1);
        assert_eq!(PageWindow::resolve(None, 13, 10).number, 1);
    }

    #[test]
    fn empty_result_has_one_empty_page() {
        let window = PageWindow::resolve(Some(3), 0, 10);
        assert_eq!((window.number, window.num_pages), (1, 1));
        let page: Page<u8> = Page::new(Vec::new(), window);
        assert!(page.items.is_empty());
        assert!(!page.has_next && !page.has_previous);
    }

    #[test]
    fn navigation_flags() {
        let page = Page::new(vec![1, 2, 3], PageWindow::resolve(Some(2), 13, 10));
        assert!(page.has_previous);
        assert!(!page.has_next);
        assert_eq!(page.items.len(), 3);
    }

    #[test]
    fn page_query_parsing() {
        assert_eq!(parse_page_number(Some("2")), Some(2));
        assert_eq!(parse_page_number(Some("abc")), None);
        assert_eq!(parse_page_number(None), None);
    }
}

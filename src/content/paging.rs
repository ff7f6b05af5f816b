//! Page windows for paginated listings
//!
//! A window is derived per invocation from a total-count probe and the
//! requested page size; it is never stored.

/// Paging failures reported before any page is fetched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PagingError {
    /// The requested page lies past the last page
    PageOutOfRange { page: u32, total_pages: u32 },
    /// A search matched nothing
    NoResults,
}

impl std::fmt::Display for PagingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PageOutOfRange { page, total_pages } => write!(
                f,
                "Page {} does not exist. Total pages: {}.",
                page, total_pages
            ),
            Self::NoResults => write!(f, "No results found."),
        }
    }
}

impl std::error::Error for PagingError {}

/// `{page, perPage, totalPages}` for one listing invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page: u32,
    pub per_page: u32,
    pub total_pages: u32,
    pub total: u64,
}

impl PageWindow {
    /// Window for `ls`. An empty store yields a zero-page window rather than
    /// an error; the caller prints an empty listing.
    pub fn for_listing(total: u64, page: u32, per_page: u32) -> Result<Self, PagingError> {
        let window = Self::compute(total, page, per_page);
        if window.total_pages > 0 && window.page > window.total_pages {
            return Err(PagingError::PageOutOfRange {
                page: window.page,
                total_pages: window.total_pages,
            });
        }
        Ok(window)
    }

    /// Window for `search`. Zero matches is `NoResults`, never out-of-range.
    pub fn for_search(total: u64, page: u32, per_page: u32) -> Result<Self, PagingError> {
        if total == 0 {
            return Err(PagingError::NoResults);
        }
        Self::for_listing(total, page, per_page)
    }

    fn compute(total: u64, page: u32, per_page: u32) -> Self {
        let per_page = per_page.max(1);
        let pages = total.div_ceil(u64::from(per_page));
        Self {
            page: page.max(1),
            per_page,
            total_pages: u32::try_from(pages).unwrap_or(u32::MAX),
            total,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages_rounds_up() {
        let w = PageWindow::for_listing(12, 3, 5).unwrap();
        assert_eq!(w.total_pages, 3);
        assert!(w.has_previous());
        assert!(!w.has_next());

        let w = PageWindow::for_listing(10, 1, 5).unwrap();
        assert_eq!(w.total_pages, 2);
        assert!(w.has_next());
    }

    #[test]
    fn test_page_out_of_range() {
        assert_eq!(
            PageWindow::for_listing(12, 4, 5),
            Err(PagingError::PageOutOfRange {
                page: 4,
                total_pages: 3
            })
        );
    }

    #[test]
    fn test_empty_listing_is_not_out_of_range() {
        let w = PageWindow::for_listing(0, 1, 10).unwrap();
        assert!(w.is_empty());
        assert_eq!(w.total_pages, 0);
        assert!(!w.has_next());
        // Any page of an empty store is just empty
        assert!(PageWindow::for_listing(0, 7, 10).is_ok());
    }

    #[test]
    fn test_search_without_matches() {
        assert_eq!(PageWindow::for_search(0, 1, 10), Err(PagingError::NoResults));
        assert_eq!(PageWindow::for_search(0, 50, 10), Err(PagingError::NoResults));
    }

    #[test]
    fn test_search_out_of_range() {
        assert_eq!(
            PageWindow::for_search(3, 2, 10),
            Err(PagingError::PageOutOfRange {
                page: 2,
                total_pages: 1
            })
        );
    }

    #[test]
    fn test_message_names_both_numbers() {
        let err = PagingError::PageOutOfRange {
            page: 4,
            total_pages: 3,
        };
        assert_eq!(err.to_string(), "Page 4 does not exist. Total pages: 3.");
    }
}

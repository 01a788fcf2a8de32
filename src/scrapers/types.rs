use crate::extraction::Fragment;

/// Where a site's listing data lives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingMode {
    /// Search result cards carry the listing fields themselves
    Cards,
    /// Search results only link to detail pages, which must be fetched
    DetailPages,
}

/// Outcome of scanning one search results page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageScan {
    Fragments(Vec<Fragment>),
    /// No fragments: past the last page, or the site blocked us
    EndOfResults,
}

impl From<Vec<Fragment>> for PageScan {
    fn from(fragments: Vec<Fragment>) -> Self {
        if fragments.is_empty() {
            PageScan::EndOfResults
        } else {
            PageScan::Fragments(fragments)
        }
    }
}

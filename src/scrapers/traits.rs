use crate::extraction::convention::visible_text;
use crate::extraction::{DetailFields, Fragment, SiteConvention};
use crate::models::Platform;
use crate::scrapers::types::{ListingMode, PageScan};
use anyhow::Result;
use async_trait::async_trait;
use scraper::Html;
use url::Url;

/// Common contract for every listing site.
///
/// An adapter is a convention plus a search URL builder; adding a site never
/// requires touching the extraction code.
pub trait SourceAdapter: Send + Sync {
    fn platform(&self) -> Platform;

    fn convention(&self) -> &SiteConvention;

    fn listing_mode(&self) -> ListingMode;

    /// Search results page `page` (1-based) for `locality`
    fn search_url(&self, locality: &str, page: u32) -> Result<Url, url::ParseError>;

    /// Listing fragments on a search results page
    fn list_fragments(&self, page_markup: &str) -> Vec<Fragment> {
        let document = Html::parse_document(page_markup);
        let root = document.root_element();
        let context = self.convention().price_from_page.then(|| visible_text(root));

        self.convention()
            .fragments
            .matches(root)
            .into_iter()
            .map(|el| {
                let fragment = Fragment::card(el.html());
                match &context {
                    Some(text) => fragment.with_context(text.as_str()),
                    None => fragment,
                }
            })
            .collect()
    }

    /// Labelled fields on a detail page, used to report pages whose layout
    /// no longer carries the expected labels
    fn detail_fields(&self, page_markup: &str) -> DetailFields {
        let document = Html::parse_document(page_markup);
        self.convention().detail_fields(document.root_element())
    }

    fn scan_page(&self, page_markup: &str) -> PageScan {
        self.list_fragments(page_markup).into()
    }
}

/// Fetches raw page markup
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String>;

    /// Get the name of the fetcher
    fn name(&self) -> &'static str;
}

/// `"Den Haag "` -> `"den-haag"`
pub fn locality_slug(locality: &str) -> String {
    locality
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

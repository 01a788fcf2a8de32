use super::address::{title_case, AddressResolver};
use super::convention::{visible_text, SiteConvention};
use crate::models::{ListingRecord, Platform};
use scraper::{ElementRef, Html};
use tracing::debug;

/// Markup describing one listing: a search-result card or a whole detail page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub markup: String,
    /// URL the markup was fetched from, set for detail pages
    pub page_url: Option<String>,
    /// Text of the page a card was cut from, searched before the card itself
    pub context: Option<String>,
}

impl Fragment {
    pub fn card(markup: impl Into<String>) -> Self {
        Self {
            markup: markup.into(),
            page_url: None,
            context: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn detail_page(url: impl Into<String>, markup: impl Into<String>) -> Self {
        Self {
            markup: markup.into(),
            page_url: Some(url.into()),
            context: None,
        }
    }

    pub fn is_page(&self) -> bool {
        self.page_url.is_some()
    }

    fn parse(&self) -> Html {
        if self.is_page() {
            Html::parse_document(&self.markup)
        } else {
            Html::parse_fragment(&self.markup)
        }
    }
}

/// Turns fragments into [`ListingRecord`]s using a site's convention
#[derive(Debug, Clone)]
pub struct ListingNormalizer {
    resolver: AddressResolver,
}

impl ListingNormalizer {
    pub fn new(resolver: AddressResolver) -> Self {
        Self { resolver }
    }

    /// Canonical URL of the listing a fragment describes
    pub fn resolve_url(&self, fragment: &Fragment, convention: &SiteConvention) -> Option<String> {
        let document = fragment.parse();
        Self::url_in(fragment, document.root_element(), convention)
    }

    fn url_in(fragment: &Fragment, root: ElementRef, convention: &SiteConvention) -> Option<String> {
        if let Some(page_url) = &fragment.page_url {
            return convention.canonical_url(page_url);
        }

        convention
            .links
            .all(root)
            .filter_map(|a| a.value().attr("href"))
            .filter(|href| convention.accepts_link(href))
            .find_map(|href| convention.canonical_url(href))
    }

    /// Build a record from one fragment.
    ///
    /// Returns `None` only when no canonical URL can be resolved; every other
    /// missing field becomes an empty string.
    pub fn normalize(
        &self,
        fragment: &Fragment,
        convention: &SiteConvention,
        fallback_city: &str,
        platform: Platform,
    ) -> Option<ListingRecord> {
        let document = fragment.parse();
        let root = document.root_element();

        let Some(url) = Self::url_in(fragment, root, convention) else {
            debug!("Skipping {} fragment without a listing URL", platform);
            return None;
        };

        let text = visible_text(root);
        let fields = convention.detail_fields(root);

        let address = convention.address.first_text(root).unwrap_or_default();
        let locality = if address.is_empty() && convention.locality_from_text {
            text.as_str()
        } else {
            address.as_str()
        };
        let (postcode, mut city) = self.resolver.resolve(locality);
        if city.is_empty() {
            city = title_case(fallback_city);
        }

        // Broadest scope first: the price is not always next to the other fields.
        let mut price_scopes: Vec<&str> = Vec::with_capacity(2);
        if let Some(context) = &fragment.context {
            price_scopes.push(context);
        }
        price_scopes.push(&text);
        let price = convention
            .price
            .resolve(&fields, root, &price_scopes)
            .unwrap_or_default();

        let area = convention
            .area
            .resolve(&fields, root, &[text.as_str()])
            .unwrap_or_default();
        let rooms = convention
            .rooms
            .resolve(&fields, root, &[text.as_str()])
            .unwrap_or_default();

        let title = convention
            .title
            .first_text(root)
            .or_else(|| (!address.is_empty()).then(|| address.clone()))
            .unwrap_or_else(|| url.clone());

        Some(ListingRecord {
            title,
            price,
            address,
            postcode,
            city,
            area,
            rooms,
            url,
            platform,
        })
    }
}

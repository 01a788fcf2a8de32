use crate::extraction::{ConventionError, FallbackChain, FieldChain, SelectorChain, SiteConvention};
use crate::models::Platform;
use crate::scrapers::patterns::{AREA_M2, EURO_PRICE, PRICE_ON_REQUEST, ROOMS_NL};
use crate::scrapers::traits::{locality_slug, SourceAdapter};
use crate::scrapers::types::ListingMode;
use url::Url;

/// Jaap: cards with a street line, a zip/city line and a free-text feature block
pub struct JaapAdapter {
    convention: SiteConvention,
}

impl JaapAdapter {
    pub const BASE_URL: &'static str = "https://www.jaap.nl";

    pub fn new() -> Result<Self, ConventionError> {
        Self::with_base_url(Self::BASE_URL)
    }

    pub fn with_base_url(base_url: &str) -> Result<Self, ConventionError> {
        let mut convention = SiteConvention::new(base_url)?.with_link_filter("/te-koop/")?;

        convention.fragments = SelectorChain::new(&["div.property", "li.property"])?;
        convention.links = SelectorChain::new(&["a.property-inner", "a[href]"])?;
        convention.title = SelectorChain::new(&["h2.property-address-street", ".property-address-street"])?;
        convention.address = SelectorChain::new(&["div.property-address-zipcity", ".property-address"])?;
        convention.price = FieldChain {
            patterns: FallbackChain::new(&[EURO_PRICE, PRICE_ON_REQUEST])?,
            ..FieldChain::default()
        };
        // Features come as one line: "Woonhuis 120m² 4 kamers"
        convention.area = FieldChain {
            patterns: FallbackChain::new(&[r"(?i)woonoppervlakte\s*:?\s*(\d+\s*m[²2])", AREA_M2])?,
            ..FieldChain::default()
        };
        convention.rooms = FieldChain {
            patterns: FallbackChain::new(&[r"(?i)aantal kamers\s*:?\s*(\d+)", ROOMS_NL])?,
            ..FieldChain::default()
        };

        Ok(Self { convention })
    }
}

impl SourceAdapter for JaapAdapter {
    fn platform(&self) -> Platform {
        Platform::Jaap
    }

    fn convention(&self) -> &SiteConvention {
        &self.convention
    }

    fn listing_mode(&self) -> ListingMode {
        ListingMode::Cards
    }

    fn search_url(&self, locality: &str, page: u32) -> Result<Url, url::ParseError> {
        let path = match page {
            0 | 1 => format!("/koophuizen/{}", locality_slug(locality)),
            n => format!("/koophuizen/{}/p{}", locality_slug(locality), n),
        };
        self.convention.base_url.join(&path)
    }
}

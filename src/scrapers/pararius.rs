use crate::extraction::{ConventionError, FallbackChain, FieldChain, SelectorChain, SiteConvention};
use crate::models::Platform;
use crate::scrapers::patterns::{AREA_M2, EURO_PRICE, PRICE_ON_REQUEST, ROOMS_EN, ROOMS_NL};
use crate::scrapers::traits::{locality_slug, SourceAdapter};
use crate::scrapers::types::ListingMode;
use url::Url;

/// Pararius: search result cards carry title, price and features
pub struct ParariusAdapter {
    convention: SiteConvention,
}

impl ParariusAdapter {
    pub const BASE_URL: &'static str = "https://www.pararius.nl";

    pub fn new() -> Result<Self, ConventionError> {
        Self::with_base_url(Self::BASE_URL)
    }

    pub fn with_base_url(base_url: &str) -> Result<Self, ConventionError> {
        let mut convention = SiteConvention::new(base_url)?;

        convention.fragments =
            SelectorChain::new(&["section.search-list__item", "section.listing-search-item", "article"])?;
        convention.links = SelectorChain::new(&["a.listing-search-item__link--title", "a[href]"])?;
        convention.title = SelectorChain::new(&[".listing-search-item__title", "a[href]"])?;
        convention.address =
            SelectorChain::new(&[".listing-search-item__sub-title", ".listing-search-item__location"])?;
        convention.locality_from_text = true;
        convention.price = FieldChain {
            patterns: FallbackChain::new(&[EURO_PRICE, PRICE_ON_REQUEST])?,
            ..FieldChain::default()
        };
        convention.area = FieldChain {
            selectors: SelectorChain::new(&["li.illustrated-features__item--surface-area"])?,
            patterns: FallbackChain::new(&[AREA_M2])?,
            ..FieldChain::default()
        };
        convention.rooms = FieldChain {
            selectors: SelectorChain::new(&["li.illustrated-features__item--number-of-rooms"])?,
            patterns: FallbackChain::new(&[ROOMS_NL, ROOMS_EN])?,
            ..FieldChain::default()
        };

        Ok(Self { convention })
    }
}

impl SourceAdapter for ParariusAdapter {
    fn platform(&self) -> Platform {
        Platform::Pararius
    }

    fn convention(&self) -> &SiteConvention {
        &self.convention
    }

    fn listing_mode(&self) -> ListingMode {
        ListingMode::Cards
    }

    fn search_url(&self, locality: &str, page: u32) -> Result<Url, url::ParseError> {
        let path = match page {
            0 | 1 => format!("/koopwoningen/{}", locality_slug(locality)),
            n => format!("/koopwoningen/{}/page-{}", locality_slug(locality), n),
        };
        self.convention.base_url.join(&path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::{AddressResolver, CityPolicy, ListingNormalizer};
    use crate::scrapers::types::PageScan;

    const RESULTS_PAGE: &str = r#"<html><body>
<ul class="search-list">
  <li class="search-list__item search-list__item--listing">
    <section class="listing-search-item">
      <h2 class="listing-search-item__title">
        <a class="listing-search-item__link listing-search-item__link--title" href="/huis-te-koop/amsterdam/2f9a1c3e/keizersgracht">Huis Keizersgracht 100</a>
      </h2>
      <div class="listing-search-item__sub-title">1015 CV Amsterdam (Grachtengordel-West)</div>
      <div class="listing-search-item__price">€ 1.250.000 k.k.</div>
      <ul class="illustrated-features">
        <li class="illustrated-features__item illustrated-features__item--surface-area">142 m²</li>
        <li class="illustrated-features__item illustrated-features__item--number-of-rooms">5 kamers</li>
      </ul>
    </section>
  </li>
  <li class="search-list__item search-list__item--listing">
    <section class="listing-search-item">
      <h2 class="listing-search-item__title">
        <a class="listing-search-item__link listing-search-item__link--title" href="/appartement-te-koop/amsterdam/8b7e6d5c/kinkerstraat">Appartement Kinkerstraat 2</a>
      </h2>
      <div class="listing-search-item__price">Prijs op aanvraag</div>
    </section>
  </li>
</ul>
</body></html>"#;

    fn normalizer() -> ListingNormalizer {
        ListingNormalizer::new(AddressResolver::dutch(CityPolicy::NameRun).unwrap())
    }

    #[test]
    fn search_url_per_page() {
        let adapter = ParariusAdapter::new().unwrap();
        assert_eq!(
            adapter.search_url("amsterdam", 1).unwrap().as_str(),
            "https://www.pararius.nl/koopwoningen/amsterdam"
        );
        assert_eq!(
            adapter.search_url("Den Haag", 3).unwrap().as_str(),
            "https://www.pararius.nl/koopwoningen/den-haag/page-3"
        );
    }

    #[test]
    fn normalizes_cards() {
        let adapter = ParariusAdapter::new().unwrap();
        let fragments = adapter.list_fragments(RESULTS_PAGE);
        assert_eq!(fragments.len(), 2);

        let records: Vec<_> = fragments
            .iter()
            .filter_map(|f| normalizer().normalize(f, adapter.convention(), "amsterdam", Platform::Pararius))
            .collect();
        assert_eq!(records.len(), 2);

        let first = &records[0];
        assert_eq!(first.title, "Huis Keizersgracht 100");
        assert_eq!(first.url, "https://www.pararius.nl/huis-te-koop/amsterdam/2f9a1c3e/keizersgracht");
        assert_eq!(first.price, "€ 1.250.000 k.k.");
        assert_eq!(first.address, "1015 CV Amsterdam (Grachtengordel-West)");
        assert_eq!(first.postcode, "1015 CV");
        assert_eq!(first.city, "Amsterdam");
        assert_eq!(first.area, "142 m²");
        assert_eq!(first.rooms, "5 kamers");

        let second = &records[1];
        assert_eq!(second.price, "Prijs op aanvraag");
        assert_eq!(second.address, "");
        assert_eq!(second.postcode, "");
        assert_eq!(second.city, "Amsterdam");
        assert_eq!(second.area, "");
        assert_eq!(second.rooms, "");
    }

    #[test]
    fn empty_results_page_ends_pagination() {
        let adapter = ParariusAdapter::new().unwrap();
        let page = r#"<html><body><p class="search-list__no-results">Geen resultaten</p></body></html>"#;
        assert_eq!(adapter.scan_page(page), PageScan::EndOfResults);
    }
}

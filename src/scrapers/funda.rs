use crate::extraction::{
    ConventionError, FallbackChain, FieldChain, LabelPair, LabelRule, SelectorChain, SiteConvention,
};
use crate::models::Platform;
use crate::scrapers::patterns::{AREA_M2, EURO_PRICE, PRICE_ON_REQUEST, ROOMS_NL};
use crate::scrapers::traits::SourceAdapter;
use crate::scrapers::types::ListingMode;
use url::Url;

/// Funda: search results link to detail pages holding the listing fields
pub struct FundaAdapter {
    convention: SiteConvention,
}

impl FundaAdapter {
    pub const BASE_URL: &'static str = "https://www.funda.nl";

    pub fn new() -> Result<Self, ConventionError> {
        Self::with_base_url(Self::BASE_URL)
    }

    pub fn with_base_url(base_url: &str) -> Result<Self, ConventionError> {
        let mut convention = SiteConvention::new(base_url)?.with_link_filter("/detail/koop/")?;

        convention.fragments = SelectorChain::new(&["a[href*='/detail/koop/']"])?;
        convention.title = SelectorChain::new(&["h1", "h1.object-header__title"])?;
        convention.address = SelectorChain::new(&["h2, .object-header__subtitle"])?;
        convention.price = FieldChain {
            patterns: FallbackChain::new(&[EURO_PRICE, PRICE_ON_REQUEST])?,
            ..FieldChain::default()
        };
        convention.label_pairs = vec![LabelPair::new("dt", "dd")?];
        convention.area = FieldChain {
            labels: vec![
                LabelRule::Contains("Gebruiksoppervlakte wonen"),
                LabelRule::Contains("Woonoppervlakte"),
                LabelRule::Exact("Wonen"),
            ],
            patterns: FallbackChain::new(&[AREA_M2])?,
            ..FieldChain::default()
        };
        convention.rooms = FieldChain {
            labels: vec![LabelRule::Contains("Aantal kamers"), LabelRule::Exact("Kamers")],
            patterns: FallbackChain::new(&[ROOMS_NL])?,
            ..FieldChain::default()
        };

        Ok(Self { convention })
    }
}

impl SourceAdapter for FundaAdapter {
    fn platform(&self) -> Platform {
        Platform::Funda
    }

    fn convention(&self) -> &SiteConvention {
        &self.convention
    }

    fn listing_mode(&self) -> ListingMode {
        ListingMode::DetailPages
    }

    fn search_url(&self, locality: &str, page: u32) -> Result<Url, url::ParseError> {
        let mut url = self.convention.base_url.join("/zoeken/koop/")?;
        url.query_pairs_mut()
            .append_pair("selected_area", &format!("[\"{}\"]", locality.trim().to_lowercase()))
            .append_pair("search_result", &page.to_string());
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::{AddressResolver, CityPolicy, Fragment, ListingNormalizer};

    const DETAIL_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
  <title>Huis te koop: Keizersgracht 100 1015 CV Amsterdam [funda]</title>
  <script>window.__data = {"price":"€ 1"};</script>
</head>
<body>
  <h1 class="object-header__title">Keizersgracht 100</h1>
  <h2 class="object-header__subtitle">1015 CV Amsterdam</h2>
  <div class="object-header__pricing">
    <strong class="object-header__price">€ 1.250.000 k.k.</strong>
  </div>
  <section class="object-kenmerken">
    <dl>
      <dt>Vraagprijs</dt><dd>€ 1.250.000 kosten koper</dd>
      <dt>Gebruiksoppervlakte wonen</dt><dd>142 m²</dd>
      <dt>Perceel</dt><dd>88 m²</dd>
      <dt>Aantal kamers</dt><dd>5 kamers (3 slaapkamers)</dd>
    </dl>
  </section>
</body>
</html>"#;

    #[test]
    fn search_url_encodes_area() {
        let adapter = FundaAdapter::new().unwrap();
        assert_eq!(
            adapter.search_url("Amsterdam", 2).unwrap().as_str(),
            "https://www.funda.nl/zoeken/koop/?selected_area=%5B%22amsterdam%22%5D&search_result=2"
        );
    }

    #[test]
    fn lists_detail_links_only() {
        let adapter = FundaAdapter::new().unwrap();
        let page = r#"<html><body>
            <a href="/zoeken/koop/?search_result=2">Volgende</a>
            <a href="/detail/koop/amsterdam/huis-keizersgracht-100/43000001/">Keizersgracht 100</a>
            <a href="https://www.funda.nl/detail/koop/amsterdam/appartement-jan-luijkenstraat-3/43000002/">Jan Luijkenstraat 3</a>
        </body></html>"#;

        let fragments = adapter.list_fragments(page);
        assert_eq!(fragments.len(), 2);
        assert!(fragments.iter().all(|f| !f.is_page()));
    }

    #[test]
    fn normalizes_detail_page() {
        let adapter = FundaAdapter::new().unwrap();
        let normalizer = ListingNormalizer::new(AddressResolver::dutch(CityPolicy::NameRun).unwrap());
        let url = "https://www.funda.nl/detail/koop/amsterdam/huis-keizersgracht-100/43000001/";

        let record = normalizer
            .normalize(
                &Fragment::detail_page(url, DETAIL_PAGE),
                adapter.convention(),
                "amsterdam",
                Platform::Funda,
            )
            .unwrap();

        assert_eq!(record.title, "Keizersgracht 100");
        assert_eq!(record.price, "€ 1.250.000 k.k.");
        assert_eq!(record.address, "1015 CV Amsterdam");
        assert_eq!(record.postcode, "1015 CV");
        assert_eq!(record.city, "Amsterdam");
        assert_eq!(record.area, "142 m²");
        assert_eq!(record.rooms, "5 kamers (3 slaapkamers)");
        assert_eq!(record.url, url);
        assert_eq!(record.platform, Platform::Funda);
    }

    #[test]
    fn subtitle_wins_over_later_section_headings() {
        let adapter = FundaAdapter::new().unwrap();
        let normalizer = ListingNormalizer::new(AddressResolver::dutch(CityPolicy::NameRun).unwrap());
        let url = "https://www.funda.nl/detail/koop/amsterdam/huis-keizersgracht-100/43000001/";
        let page = r#"<html><body>
            <h1>Keizersgracht 100</h1>
            <span class="object-header__subtitle">1015 CV Amsterdam</span>
            <p>€ 1.250.000 k.k.</p>
            <h2>Omschrijving</h2>
            <p>Ruim grachtenpand.</p>
        </body></html>"#;

        let record = normalizer
            .normalize(&Fragment::detail_page(url, page), adapter.convention(), "utrecht", Platform::Funda)
            .unwrap();

        assert_eq!(record.address, "1015 CV Amsterdam");
        assert_eq!(record.postcode, "1015 CV");
        assert_eq!(record.city, "Amsterdam");
    }

    #[test]
    fn detail_fields_are_collected_in_order() {
        let adapter = FundaAdapter::new().unwrap();
        let fields = adapter.detail_fields(DETAIL_PAGE);
        let labels: Vec<&str> = fields.pairs().iter().map(|(l, _)| l.as_str()).collect();
        assert_eq!(labels, ["Vraagprijs", "Gebruiksoppervlakte wonen", "Perceel", "Aantal kamers"]);
    }

    #[test]
    fn blocked_page_has_no_fragments() {
        let adapter = FundaAdapter::new().unwrap();
        let captcha = "<html><body><h1>Je bent bijna op de pagina die je zoekt</h1></body></html>";
        assert!(adapter.list_fragments(captcha).is_empty());
    }
}

use crate::extraction::{Fragment, ListingNormalizer};
use crate::models::ListingRecord;
use crate::scrapers::{ListingMode, PageFetcher, PageScan, SourceAdapter};
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Whether to keep paginating a source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageOutcome {
    Continue,
    Stop,
}

/// Walks search pages of each source and accumulates normalized records
pub struct Orchestrator<'a> {
    fetcher: &'a dyn PageFetcher,
    normalizer: ListingNormalizer,
}

impl<'a> Orchestrator<'a> {
    pub fn new(fetcher: &'a dyn PageFetcher, normalizer: ListingNormalizer) -> Self {
        Self { fetcher, normalizer }
    }

    /// Scrape every adapter in turn, appending to `records`
    pub async fn run(
        &self,
        adapters: &[Box<dyn SourceAdapter>],
        locality: &str,
        pages: u32,
        records: &mut Vec<ListingRecord>,
    ) {
        for adapter in adapters {
            let before = records.len();
            self.scrape_source(adapter.as_ref(), locality, pages, records).await;
            info!("TOTAL {}: {} listings", adapter.platform(), records.len() - before);
        }
    }

    /// Scrape up to `pages` search pages, stopping early at the end of results
    pub async fn scrape_source(
        &self,
        adapter: &dyn SourceAdapter,
        locality: &str,
        pages: u32,
        records: &mut Vec<ListingRecord>,
    ) {
        info!("=== Scraping {} for {} ===", adapter.platform(), locality);

        for page in 1..=pages {
            if self.scrape_page(adapter, locality, page, records).await == PageOutcome::Stop {
                break;
            }
        }
    }

    pub async fn scrape_page(
        &self,
        adapter: &dyn SourceAdapter,
        locality: &str,
        page: u32,
        records: &mut Vec<ListingRecord>,
    ) -> PageOutcome {
        let platform = adapter.platform();
        let url = match adapter.search_url(locality, page) {
            Ok(url) => url,
            Err(e) => {
                warn!("Cannot build {} search URL for '{}': {}", platform, locality, e);
                return PageOutcome::Stop;
            }
        };
        info!("{} results page {}: {}", platform, page, url);

        let markup = match self.fetcher.fetch(url.as_str()).await {
            Ok(markup) => markup,
            Err(e) => {
                warn!("Failed to load {} page {}: {:#}", platform, page, e);
                return PageOutcome::Continue;
            }
        };

        let fragments = match adapter.scan_page(&markup) {
            PageScan::Fragments(fragments) => fragments,
            PageScan::EndOfResults => {
                info!("   No listings found; end of results or blocked.");
                return PageOutcome::Stop;
            }
        };

        let before = records.len();
        match adapter.listing_mode() {
            ListingMode::Cards => {
                records.extend(fragments.iter().filter_map(|fragment| {
                    self.normalizer
                        .normalize(fragment, adapter.convention(), locality, platform)
                }));
            }
            ListingMode::DetailPages => {
                let links = self.detail_links(adapter, &fragments);
                info!("   {} unique detail links on page {}", links.len(), page);

                for link in links {
                    if let Some(record) = self.scrape_detail(adapter, locality, &link).await {
                        records.push(record);
                    }
                }
            }
        }

        info!("   >>> {} listings collected from {} page {}", records.len() - before, platform, page);
        PageOutcome::Continue
    }

    /// Resolved listing links, first occurrence order, without repeats
    fn detail_links(&self, adapter: &dyn SourceAdapter, fragments: &[Fragment]) -> Vec<String> {
        let mut seen = HashSet::new();
        fragments
            .iter()
            .filter_map(|f| self.normalizer.resolve_url(f, adapter.convention()))
            .filter(|url| seen.insert(url.clone()))
            .collect()
    }

    async fn scrape_detail(&self, adapter: &dyn SourceAdapter, locality: &str, url: &str) -> Option<ListingRecord> {
        let markup = match self.fetcher.fetch(url).await {
            Ok(markup) => markup,
            Err(e) => {
                warn!("   Failed to open {} detail {}: {:#}", adapter.platform(), url, e);
                return None;
            }
        };

        let fields = adapter.detail_fields(&markup);
        if fields.pairs().is_empty() {
            debug!("   No labelled fields on {}; layout changed or page blocked", url);
        } else {
            debug!("   {} labelled fields on {}", fields.pairs().len(), url);
        }

        self.normalizer.normalize(
            &Fragment::detail_page(url, markup),
            adapter.convention(),
            locality,
            adapter.platform(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dedup::{dedupe, DedupMode};
    use crate::extraction::{AddressResolver, CityPolicy};
    use crate::models::Platform;
    use crate::scrapers::{FundaAdapter, ParariusAdapter};
    use anyhow::Result;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Serves canned pages and records every requested URL
    struct StaticFetcher {
        pages: HashMap<String, String>,
        requested: Mutex<Vec<String>>,
    }

    impl StaticFetcher {
        fn new(pages: &[(&str, &str)]) -> Self {
            Self {
                pages: pages.iter().map(|(u, m)| (u.to_string(), m.to_string())).collect(),
                requested: Mutex::new(Vec::new()),
            }
        }

        fn requested(&self) -> Vec<String> {
            self.requested.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PageFetcher for StaticFetcher {
        async fn fetch(&self, url: &str) -> Result<String> {
            self.requested.lock().unwrap().push(url.to_string());
            self.pages
                .get(url)
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("404 for {}", url))
        }

        fn name(&self) -> &'static str {
            "static"
        }
    }

    fn normalizer() -> ListingNormalizer {
        ListingNormalizer::new(AddressResolver::dutch(CityPolicy::NameRun).unwrap())
    }

    const FUNDA_BASE: &str = "https://example-a.test";

    fn funda_results(page: u32) -> String {
        format!("{}/zoeken/koop/?selected_area=%5B%22amsterdam%22%5D&search_result={}", FUNDA_BASE, page)
    }

    const FUNDA_RESULTS: &str = r#"<html><body>
        <a href="/detail/koop/amsterdam/foo/123/">Foo 1</a>
        <a href="https://example-a.test/detail/koop/amsterdam/foo/123/">Foo 1 (again)</a>
        <a href="/detail/koop/amsterdam/bar/456/">Bar 2</a>
        <a href="/detail/koop/amsterdam/gone/789/">Gone</a>
    </body></html>"#;

    const FUNDA_DETAIL: &str = r#"<html><body>
        <h1>Foo 1</h1><h2>1083 HH Amsterdam</h2><p>€ 450.000 k.k.</p>
        <dl><dt>Wonen</dt><dd>90 m²</dd><dt>Aantal kamers</dt><dd>3 kamers</dd></dl>
    </body></html>"#;

    #[tokio::test]
    async fn detail_links_are_fetched_once_and_pagination_stops() {
        let fetcher = StaticFetcher::new(&[
            (funda_results(1).as_str(), FUNDA_RESULTS),
            (funda_results(2).as_str(), "<html><body>Geen resultaten</body></html>"),
            ("https://example-a.test/detail/koop/amsterdam/foo/123/", FUNDA_DETAIL),
            ("https://example-a.test/detail/koop/amsterdam/bar/456/", "<html><body><h1>Bar 2</h1></body></html>"),
        ]);
        let adapters: Vec<Box<dyn SourceAdapter>> = vec![Box::new(FundaAdapter::with_base_url(FUNDA_BASE).unwrap())];

        let mut records = Vec::new();
        Orchestrator::new(&fetcher, normalizer())
            .run(&adapters, "amsterdam", 5, &mut records)
            .await;

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].title, "Foo 1");
        assert_eq!(records[0].postcode, "1083 HH");
        assert_eq!(records[0].area, "90 m²");
        assert_eq!(records[0].rooms, "3 kamers");
        assert_eq!(records[1].title, "Bar 2");
        assert_eq!(records[1].city, "Amsterdam");

        let requested = fetcher.requested();
        let foo_fetches = requested.iter().filter(|u| u.ends_with("/foo/123/")).count();
        assert_eq!(foo_fetches, 1);
        // Page 2 is empty, so page 3 is never requested
        assert!(requested.contains(&funda_results(2)));
        assert!(!requested.contains(&funda_results(3)));
    }

    #[tokio::test]
    async fn empty_source_does_not_stop_the_next_one() {
        let pararius_base = "https://example-b.test";
        let fetcher = StaticFetcher::new(&[
            (funda_results(1).as_str(), "<html><body>captcha</body></html>"),
            (
                "https://example-b.test/koopwoningen/amsterdam",
                r#"<html><body>
                    <section class="listing-search-item"><a href="/huis-te-koop/amsterdam/1/a">A</a> € 300.000 k.k.</section>
                    <section class="listing-search-item"><a href="/huis-te-koop/amsterdam/2/b">B</a></section>
                </body></html>"#,
            ),
        ]);
        let adapters: Vec<Box<dyn SourceAdapter>> = vec![
            Box::new(FundaAdapter::with_base_url(FUNDA_BASE).unwrap()),
            Box::new(ParariusAdapter::with_base_url(pararius_base).unwrap()),
        ];

        let mut records = Vec::new();
        Orchestrator::new(&fetcher, normalizer())
            .run(&adapters, "amsterdam", 1, &mut records)
            .await;

        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.platform == Platform::Pararius));
        assert_eq!(records[0].price, "€ 300.000 k.k.");
        assert_eq!(records[1].price, "");
    }

    #[tokio::test]
    async fn failed_page_fetch_moves_to_next_page() {
        let fetcher = StaticFetcher::new(&[(
            "https://example-b.test/koopwoningen/amsterdam/page-2",
            r#"<html><body><article><a href="/huis-te-koop/amsterdam/3/c">C</a></article></body></html>"#,
        )]);
        let adapter = ParariusAdapter::with_base_url("https://example-b.test").unwrap();
        let orchestrator = Orchestrator::new(&fetcher, normalizer());

        let mut records = Vec::new();
        let first = orchestrator.scrape_page(&adapter, "amsterdam", 1, &mut records).await;
        let second = orchestrator.scrape_page(&adapter, "amsterdam", 2, &mut records).await;

        assert_eq!(first, PageOutcome::Continue);
        assert_eq!(second, PageOutcome::Continue);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].url, "https://example-b.test/huis-te-koop/amsterdam/3/c");
    }

    #[tokio::test]
    async fn relative_and_absolute_cards_collapse_after_dedup() {
        let fetcher = StaticFetcher::new(&[
            (
                "https://example-b.test/koopwoningen/amsterdam",
                r#"<html><body><article><a href="/huis-te-koop/amsterdam/1/a">A</a></article></body></html>"#,
            ),
            (
                "https://example-b.test/koopwoningen/amsterdam/page-2",
                r#"<html><body><article><a href="https://example-b.test/huis-te-koop/amsterdam/1/a">A</a></article></body></html>"#,
            ),
        ]);
        let adapters: Vec<Box<dyn SourceAdapter>> =
            vec![Box::new(ParariusAdapter::with_base_url("https://example-b.test").unwrap())];

        let mut records = Vec::new();
        Orchestrator::new(&fetcher, normalizer())
            .run(&adapters, "amsterdam", 3, &mut records)
            .await;

        assert_eq!(records.len(), 2);
        assert_eq!(dedupe(records, DedupMode::PerSource).len(), 1);
    }
}

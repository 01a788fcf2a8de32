mod config;
mod dedup;
mod export;
mod extraction;
mod models;
mod pipeline;
mod scrapers;

use anyhow::Context;
use clap::Parser;
use config::{ActorInput, Cli, FetcherKind, ScrapeConfig};
use extraction::{AddressResolver, ListingNormalizer};
use pipeline::Orchestrator;
use scrapers::{BrowserFetcher, HttpFetcher, PageFetcher};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let input = match &cli.input {
        Some(path) => ActorInput::from_file(path)?,
        None => ActorInput::default(),
    };
    let config = ScrapeConfig::resolve(&cli, &input)?;

    let platform_names: Vec<&str> = config.platforms.iter().map(|p| p.name()).collect();
    info!("============================================================");
    info!("🏠 Woning Scout");
    info!("============================================================");
    info!("Locality   : {}", config.locality);
    info!("Pages      : {}", config.pages);
    info!("Platforms  : {}", platform_names.join(", "));
    info!("Dedup      : {:?}", cli.dedup);
    info!("============================================================");

    let fetcher: Box<dyn PageFetcher> = match cli.fetcher {
        FetcherKind::Browser => Box::new(BrowserFetcher::new()?),
        FetcherKind::Http => Box::new(HttpFetcher::new()?),
    };
    info!("Fetching pages with the {} fetcher", fetcher.name());

    let adapters = scrapers::adapters_for(&config.platforms).context("Invalid site convention")?;
    let resolver = AddressResolver::dutch(cli.city_policy).context("Invalid postal code pattern")?;
    let orchestrator = Orchestrator::new(fetcher.as_ref(), ListingNormalizer::new(resolver));

    let mut records = Vec::new();
    orchestrator
        .run(&adapters, &config.locality, config.pages, &mut records)
        .await;

    let scraped = records.len();
    let listings = dedup::dedupe(records, cli.dedup);
    info!("Duplicates removed: {} -> {} unique listings", scraped, listings.len());

    for (i, listing) in listings.iter().enumerate() {
        println!("{}. {} ({})", i + 1, listing.title, listing.platform);
        println!("   {} | {} | {}", listing.price, listing.area, listing.rooms);
        println!("   {} {}", listing.postcode, listing.city);
        println!("   URL: {}", listing.url);
        println!();
    }

    let today = chrono::Local::now().date_naive();
    export::export_records(&cli.output_dir, &listings, cli.format, cli.excel_bom, today).await?;

    info!("✅ Done: {} listings exported", listings.len());

    Ok(())
}

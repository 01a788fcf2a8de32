use crate::dedup::DedupMode;
use crate::export::ExportFormat;
use crate::extraction::CityPolicy;
use crate::models::Platform;
use clap::{Parser, ValueEnum};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

pub const DEFAULT_LOCALITY: &str = "amsterdam";
pub const DEFAULT_PAGES: u32 = 3;
pub const DEFAULT_PLATFORMS: [Platform; 2] = [Platform::Funda, Platform::Pararius];

/// Sentinel enabling every known platform
const ALL_PLATFORMS: &str = "ALL";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read input file {path}: {source}")]
    ReadInput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse input file {path}: {source}")]
    ParseInput {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("page count must be at least 1, got {0}")]
    InvalidPages(String),

    #[error("locality must not be empty")]
    EmptyLocality,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum FetcherKind {
    /// Headless Chrome; renders JavaScript and dismisses cookie banners
    #[default]
    Browser,
    /// Plain HTTP requests
    Http,
}

/// Scrape Dutch listing sites into a deduplicated CSV/JSON export
#[derive(Parser, Debug)]
#[command(name = "woning-scout", version)]
pub struct Cli {
    /// Place to search, e.g. "amsterdam" [default: amsterdam]
    #[arg(long)]
    pub locality: Option<String>,

    /// Number of search result pages per platform [default: 3]
    #[arg(long)]
    pub pages: Option<u32>,

    /// Comma-separated platforms (FUNDA, PARARIUS, JAAP or ALL) [default: FUNDA,PARARIUS]
    #[arg(long)]
    pub platforms: Option<String>,

    /// JSON input file with "plaats", "paginas" and "platforms"
    #[arg(long)]
    pub input: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = FetcherKind::Browser)]
    pub fetcher: FetcherKind,

    #[arg(long, default_value = ".")]
    pub output_dir: PathBuf,

    #[arg(long, value_enum, default_value_t = ExportFormat::Both)]
    pub format: ExportFormat,

    /// Prefix the CSV with a UTF-8 byte order mark for spreadsheet tools
    #[arg(long)]
    pub excel_bom: bool,

    #[arg(long, value_enum, default_value_t = DedupMode::PerSource)]
    pub dedup: DedupMode,

    #[arg(long, value_enum, default_value_t = CityPolicy::NameRun)]
    pub city_policy: CityPolicy,
}

/// Either `"FUNDA, PARARIUS"` or `["FUNDA", "PARARIUS"]`
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum PlatformList {
    Joined(String),
    List(Vec<String>),
}

impl PlatformList {
    fn names(&self) -> Vec<String> {
        match self {
            PlatformList::Joined(joined) => joined.split(',').map(str::to_string).collect(),
            PlatformList::List(list) => list.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum PageCount {
    Number(i64),
    Text(String),
}

/// Input file in the shape the scraper actor accepted
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct ActorInput {
    pub plaats: Option<String>,
    pub paginas: Option<PageCount>,
    pub platforms: Option<PlatformList>,
}

impl ActorInput {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadInput {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::ParseInput {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// What to scrape
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeConfig {
    pub locality: String,
    pub pages: u32,
    pub platforms: Vec<Platform>,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            locality: DEFAULT_LOCALITY.to_string(),
            pages: DEFAULT_PAGES,
            platforms: DEFAULT_PLATFORMS.to_vec(),
        }
    }
}

impl ScrapeConfig {
    /// Merge explicit CLI flags over the input file over the defaults
    pub fn resolve(cli: &Cli, input: &ActorInput) -> Result<Self, ConfigError> {
        let locality = cli
            .locality
            .clone()
            .or_else(|| input.plaats.clone())
            .unwrap_or_else(|| DEFAULT_LOCALITY.to_string())
            .trim()
            .to_lowercase();
        if locality.is_empty() {
            return Err(ConfigError::EmptyLocality);
        }

        let pages = match (cli.pages, &input.paginas) {
            (Some(pages), _) => pages,
            (None, Some(count)) => parse_pages(count)?,
            (None, None) => DEFAULT_PAGES,
        };
        if pages == 0 {
            return Err(ConfigError::InvalidPages(pages.to_string()));
        }

        let names = match (&cli.platforms, &input.platforms) {
            (Some(joined), _) => PlatformList::Joined(joined.clone()).names(),
            (None, Some(list)) => list.names(),
            (None, None) => Vec::new(),
        };

        Ok(Self {
            locality,
            pages,
            platforms: parse_platforms(&names),
        })
    }
}

fn parse_pages(count: &PageCount) -> Result<u32, ConfigError> {
    match count {
        PageCount::Number(n) => u32::try_from(*n).map_err(|_| ConfigError::InvalidPages(n.to_string())),
        PageCount::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidPages(text.clone())),
    }
}

/// Case-insensitive platform names to platforms in scrape order.
///
/// `ALL` enables everything, unknown names are ignored, and an empty
/// selection falls back to the defaults.
pub fn parse_platforms(names: &[String]) -> Vec<Platform> {
    let mut enabled = Vec::new();

    for name in names.iter().map(|n| n.trim().to_uppercase()).filter(|n| !n.is_empty()) {
        if name == ALL_PLATFORMS {
            return Platform::ALL.to_vec();
        }
        match Platform::from_name(&name) {
            Some(platform) => enabled.push(platform),
            None => warn!("Ignoring unknown platform '{}'", name),
        }
    }

    if enabled.is_empty() {
        return DEFAULT_PLATFORMS.to_vec();
    }

    Platform::ALL
        .into_iter()
        .filter(|p| enabled.contains(p))
        .collect()
}

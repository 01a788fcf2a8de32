pub mod browser;
pub mod funda;
pub mod http;
pub mod jaap;
pub mod pararius;
pub mod patterns;
pub mod traits;
pub mod types;

pub use browser::BrowserFetcher;
pub use funda::FundaAdapter;
pub use http::HttpFetcher;
pub use jaap::JaapAdapter;
pub use pararius::ParariusAdapter;
pub use traits::{PageFetcher, SourceAdapter};
pub use types::{ListingMode, PageScan};

use crate::extraction::ConventionError;
use crate::models::Platform;

/// Adapter for one platform
pub fn adapter_for(platform: Platform) -> Result<Box<dyn SourceAdapter>, ConventionError> {
    Ok(match platform {
        Platform::Funda => Box::new(FundaAdapter::new()?),
        Platform::Pararius => Box::new(ParariusAdapter::new()?),
        Platform::Jaap => Box::new(JaapAdapter::new()?),
    })
}

/// Adapters for the enabled platforms, in the given order
pub fn adapters_for(platforms: &[Platform]) -> Result<Vec<Box<dyn SourceAdapter>>, ConventionError> {
    platforms.iter().map(|p| adapter_for(*p)).collect()
}

use crate::scrapers::traits::PageFetcher;
use anyhow::{Context, Result};
use async_trait::async_trait;
use headless_chrome::{Browser, LaunchOptions, Tab};
use std::thread;
use std::time::Duration;
use tracing::{debug, info};

pub const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

const NAVIGATION_TIMEOUT: Duration = Duration::from_secs(60);

// Clicks the first consent button it recognises; harmless when there is none
const DISMISS_COOKIES_JS: &str = r#"
    const button = document.querySelector(
        '#didomi-notice-agree-button, #onetrust-accept-btn-handler, button[id*="accept"], button[class*="accept"], button[data-testid*="accept"]'
    );
    if (button) button.click();
"#;

/// Page fetcher driving headless Chrome
pub struct BrowserFetcher {
    browser: Browser,
    settle: Duration,
}

impl BrowserFetcher {
    /// Launch a headless browser
    pub fn new() -> Result<Self> {
        Self::with_settle(Duration::from_secs(3))
    }

    /// Launch a headless browser that waits `settle` after each navigation
    pub fn with_settle(settle: Duration) -> Result<Self> {
        info!("Launching headless Chrome...");

        let options = LaunchOptions::default_builder()
            .headless(true)
            .sandbox(false)
            .window_size(Some((1400, 900)))
            .build()
            .context("Failed to build launch options")?;

        let browser = Browser::new(options)
            .context("Failed to launch Chrome browser")?;

        Ok(Self { browser, settle })
    }

    fn fetch_blocking(browser: &Browser, url: &str, settle: Duration) -> Result<String> {
        let tab = browser.new_tab().context("Failed to open browser tab")?;
        // Failed loads must not leave tabs behind in the shared browser
        closing(
            || Self::load(&tab, url, settle),
            || {
                if let Err(e) = tab.close(true) {
                    debug!("Failed to close tab for {}: {}", url, e);
                }
            },
        )
    }

    fn load(tab: &Tab, url: &str, settle: Duration) -> Result<String> {
        tab.set_default_timeout(NAVIGATION_TIMEOUT);
        tab.set_user_agent(USER_AGENT, Some("nl-NL,nl;q=0.9"), None)?;

        tab.navigate_to(url)?;
        tab.wait_until_navigated()
            .with_context(|| format!("Timed out loading {}", url))?;

        // Listing grids render after the DOM is ready
        thread::sleep(settle);

        let _ = tab.evaluate(DISMISS_COOKIES_JS, false);
        thread::sleep(Duration::from_millis(500));

        let html = tab.get_content().context("Failed to read page HTML")?;
        debug!("Fetched {} ({} bytes)", url, html.len());

        Ok(html)
    }
}

#[async_trait]
impl PageFetcher for BrowserFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        let browser = self.browser.clone();
        let url = url.to_string();
        let settle = self.settle;

        tokio::task::spawn_blocking(move || Self::fetch_blocking(&browser, &url, settle))
            .await
            .context("Browser task failed")?
    }

    fn name(&self) -> &'static str {
        "browser"
    }
}

/// Run `work`, then `close`, whatever `work` returned
fn closing<T>(work: impl FnOnce() -> Result<T>, close: impl FnOnce()) -> Result<T> {
    let result = work();
    close();
    result
}

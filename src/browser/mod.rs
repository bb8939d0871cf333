//! Browser automation for the catalog site
//!
//! The pipeline only talks to the browser through [`BrowserSession`] and
//! [`PageDriver`]. [`BrowserManager`] and [`BrowserScraper`] implement them on top
//! of headless Chrome.
//!
//! # Example
//!
//! ```no_run
//! use catalog_scraper::browser::{BrowserConfig, BrowserManager, BrowserSession, PageDriver};
//! use std::time::Duration;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = BrowserManager::new(BrowserConfig::default())?;
//! let page = manager.open_page()?;
//!
//! page.navigate("https://example.com")?;
//! page.wait_for_selector("h1", Duration::from_secs(5))?;
//! println!("{}", page.inner_text("h1")?);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod manager;
pub mod scraper;

use std::time::Duration;

pub use self::config::BrowserConfig;
pub use self::manager::{BrowserError, BrowserManager};
pub use self::scraper::BrowserScraper;

/// Operations on one browser page (tab)
pub trait PageDriver {
    /// Navigate and wait until the document is parsed
    fn navigate(&self, url: &str) -> Result<(), BrowserError>;

    fn wait_for_selector(&self, selector: &str, timeout: Duration) -> Result<(), BrowserError>;

    /// Run a script against the current DOM and return its JSON value
    fn evaluate(&self, script: &str) -> Result<serde_json::Value, BrowserError>;

    fn click(&self, selector: &str) -> Result<(), BrowserError>;

    /// Rendered text of the first element matching `selector`
    fn inner_text(&self, selector: &str) -> Result<String, BrowserError>;

    /// Serialized HTML of the current DOM
    fn content(&self) -> Result<String, BrowserError>;

    fn url(&self) -> String;

    fn bring_to_front(&self) -> Result<(), BrowserError>;

    fn close(&self) -> Result<(), BrowserError>;
}

/// Outcome of clicking something that should open a new tab
#[derive(Debug)]
pub enum NewPage<P> {
    Opened(P),
    TimedOut,
    Failed(String),
}

/// A running browser able to hand out pages
pub trait BrowserSession {
    type Page: PageDriver;

    fn open_page(&self) -> Result<Self::Page, BrowserError>;

    /// Click `selector` on `opener` and wait up to `timeout` for a new page target.
    ///
    /// Existing targets are recorded before the click, so it does not matter
    /// whether the click returns before or after the target shows up.
    fn click_and_await_page(
        &self,
        opener: &Self::Page,
        selector: &str,
        timeout: Duration,
    ) -> NewPage<Self::Page>;
}

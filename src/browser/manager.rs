use super::config::BrowserConfig;
use super::scraper::BrowserScraper;
use super::{BrowserSession, NewPage, PageDriver};
use headless_chrome::{Browser, LaunchOptions, Tab};
use std::collections::HashSet;
use std::ffi::OsStr;
use std::sync::Arc;
use std::time::{Duration, Instant};

const NEW_TAB_POLL: Duration = Duration::from_millis(100);

/// Owns the browser process and hands out pages
pub struct BrowserManager {
    browser: Browser,
    config: BrowserConfig,
}

impl BrowserManager {
    /// Launch a browser with the given configuration
    pub fn new(config: BrowserConfig) -> Result<Self, BrowserError> {
        let args = config.chrome_args();
        let launch_options = Self::build_launch_options(&config, &args)?;

        let browser = Browser::new(launch_options)
            .map_err(|e| BrowserError::InitializationError(e.to_string()))?;

        log::info!(
            "Browser launched (headless: {}, window: {}x{})",
            config.headless,
            config.window_size.0,
            config.window_size.1
        );

        Ok(Self { browser, config })
    }

    /// Build Chrome launch options from our config
    fn build_launch_options<'a>(
        config: &BrowserConfig,
        args: &'a [String],
    ) -> Result<LaunchOptions<'a>, BrowserError> {
        LaunchOptions::default_builder()
            .headless(config.headless)
            .window_size(Some((config.window_size.0, config.window_size.1)))
            .idle_browser_timeout(config.idle_timeout())
            .args(args.iter().map(OsStr::new).collect())
            .build()
            .map_err(|e| BrowserError::ConfigurationError(e.to_string()))
    }

    fn target_ids(&self) -> Result<HashSet<String>, BrowserError> {
        let tabs = self
            .browser
            .get_tabs()
            .lock()
            .map_err(|e| BrowserError::TabCreationError(format!("Tab list unavailable: {}", e)))?;

        Ok(tabs.iter().map(|t| t.get_target_id().to_string()).collect())
    }

    fn find_new_tab(&self, known: &HashSet<String>) -> Result<Option<Arc<Tab>>, BrowserError> {
        let tabs = self
            .browser
            .get_tabs()
            .lock()
            .map_err(|e| BrowserError::TabCreationError(format!("Tab list unavailable: {}", e)))?;

        Ok(tabs
            .iter()
            .find(|t| !known.contains(t.get_target_id().as_str()))
            .cloned())
    }
}

impl BrowserSession for BrowserManager {
    type Page = BrowserScraper;

    fn open_page(&self) -> Result<BrowserScraper, BrowserError> {
        let tab = self
            .browser
            .new_tab()
            .map_err(|e| BrowserError::TabCreationError(e.to_string()))?;

        Ok(BrowserScraper::with_timeout(tab, self.config.timeout()))
    }

    fn click_and_await_page(
        &self,
        opener: &BrowserScraper,
        selector: &str,
        timeout: Duration,
    ) -> NewPage<BrowserScraper> {
        let known = match self.target_ids() {
            Ok(ids) => ids,
            Err(e) => return NewPage::Failed(e.to_string()),
        };

        if let Err(e) = opener.click(selector) {
            return NewPage::Failed(e.to_string());
        }

        let start = Instant::now();
        loop {
            match self.find_new_tab(&known) {
                Ok(Some(tab)) => {
                    log::debug!("New tab opened: {}", tab.get_target_id());
                    return NewPage::Opened(BrowserScraper::with_timeout(tab, self.config.timeout()));
                }
                Ok(None) => {}
                Err(e) => return NewPage::Failed(e.to_string()),
            }

            if start.elapsed() > timeout {
                return NewPage::TimedOut;
            }
            std::thread::sleep(NEW_TAB_POLL);
        }
    }
}

/// Errors that can occur during browser operations
#[derive(Debug, thiserror::Error)]
pub enum BrowserError {
    #[error("Browser initialization failed: {0}")]
    InitializationError(String),

    #[error("Browser configuration error: {0}")]
    ConfigurationError(String),

    #[error("Tab creation failed: {0}")]
    TabCreationError(String),

    #[error("Navigation error: {0}")]
    NavigationError(String),

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("Timeout waiting for: {0}")]
    Timeout(String),

    #[error("JavaScript execution error: {0}")]
    JavaScriptError(String),

    #[error("HTML extraction error: {0}")]
    HtmlExtractionError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_launch_options_build() {
        let config = BrowserConfig::default();
        let args = config.chrome_args();
        let options = BrowserManager::build_launch_options(&config, &args).unwrap();

        assert!(options
            .args
            .iter()
            .any(|arg| arg.to_string_lossy().contains("AutomationControlled")));
        assert!(options
            .args
            .iter()
            .any(|arg| arg.to_string_lossy().starts_with("--user-agent=")));
    }

    #[test]
    fn test_error_messages() {
        let err = BrowserError::Timeout("Waiting for selector: content".to_string());
        assert_eq!(err.to_string(), "Timeout waiting for: Waiting for selector: content");
    }

    #[test]
    #[ignore] // Requires Chrome to be installed
    fn test_browser_manager_creation() {
        let manager = BrowserManager::new(BrowserConfig::default()).unwrap();
        assert!(manager.open_page().is_ok());
    }

    #[test]
    #[ignore] // Requires Chrome to be installed
    fn test_click_without_popup_times_out() {
        let manager = BrowserManager::new(BrowserConfig::default()).unwrap();
        let page = manager.open_page().unwrap();
        page.navigate("https://example.com").unwrap();

        let outcome = manager.click_and_await_page(&page, "h1", Duration::from_millis(500));
        assert!(matches!(outcome, NewPage::TimedOut));
    }
}

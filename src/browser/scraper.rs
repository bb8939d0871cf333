use super::manager::BrowserError;
use super::PageDriver;
use headless_chrome::Tab;
use std::sync::Arc;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// High-level page operations for a browser tab
pub struct BrowserScraper {
    tab: Arc<Tab>,
}

impl BrowserScraper {
    /// Wrap a tab; `timeout` also becomes the tab's own element-lookup timeout
    pub fn with_timeout(tab: Arc<Tab>, timeout: Duration) -> Self {
        tab.set_default_timeout(timeout);
        Self { tab }
    }

    fn selector_exists(&self, selector: &str) -> bool {
        let script = format!("document.querySelector({}) !== null", js_string(selector));
        match self.tab.evaluate(&script, false) {
            Ok(result) => result.value.and_then(|v| v.as_bool()) == Some(true),
            // Document may be mid-navigation
            Err(_) => false,
        }
    }
}

impl PageDriver for BrowserScraper {
    fn navigate(&self, url: &str) -> Result<(), BrowserError> {
        self.tab
            .navigate_to(url)
            .map_err(|e| BrowserError::NavigationError(format!("Failed to navigate to {}: {}", url, e)))?;

        self.tab
            .wait_until_navigated()
            .map_err(|e| BrowserError::NavigationError(format!("Navigation timeout for {}: {}", url, e)))?;

        Ok(())
    }

    fn wait_for_selector(&self, selector: &str, timeout: Duration) -> Result<(), BrowserError> {
        let start = Instant::now();

        loop {
            if self.selector_exists(selector) {
                return Ok(());
            }
            if start.elapsed() > timeout {
                return Err(BrowserError::Timeout(format!(
                    "Waiting for selector: {}",
                    selector
                )));
            }
            std::thread::sleep(POLL_INTERVAL);
        }
    }

    fn evaluate(&self, script: &str) -> Result<serde_json::Value, BrowserError> {
        let result = self
            .tab
            .evaluate(script, false)
            .map_err(|e| BrowserError::JavaScriptError(e.to_string()))?;

        Ok(result.value.unwrap_or(serde_json::Value::Null))
    }

    fn click(&self, selector: &str) -> Result<(), BrowserError> {
        // Dispatches real mouse events
        let element = self
            .tab
            .find_element(selector)
            .map_err(|e| BrowserError::ElementNotFound(format!("{}: {}", selector, e)))?;

        element
            .click()
            .map_err(|e| BrowserError::JavaScriptError(format!("Click failed on {}: {}", selector, e)))?;

        Ok(())
    }

    fn inner_text(&self, selector: &str) -> Result<String, BrowserError> {
        let element = self
            .tab
            .find_element(selector)
            .map_err(|e| BrowserError::ElementNotFound(format!("{}: {}", selector, e)))?;

        element
            .get_inner_text()
            .map_err(|e| BrowserError::HtmlExtractionError(format!("{}: {}", selector, e)))
    }

    fn content(&self) -> Result<String, BrowserError> {
        self.tab
            .get_content()
            .map_err(|e| BrowserError::HtmlExtractionError(e.to_string()))
    }

    fn url(&self) -> String {
        self.tab.get_url()
    }

    fn bring_to_front(&self) -> Result<(), BrowserError> {
        self.tab
            .bring_to_front()
            .map(|_| ())
            .map_err(|e| BrowserError::JavaScriptError(format!("Bring to front failed: {}", e)))
    }

    fn close(&self) -> Result<(), BrowserError> {
        self.tab
            .close(true)
            .map(|_| ())
            .map_err(|e| BrowserError::TabCreationError(format!("Closing tab failed: {}", e)))
    }
}

/// Quote a value as a JavaScript string literal
pub(crate) fn js_string(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::{BrowserConfig, BrowserManager, BrowserSession};

    #[test]
    fn test_js_string_escapes_quotes() {
        assert_eq!(js_string("a[href='x']"), "\"a[href='x']\"");
        assert_eq!(js_string("div \"q\""), "\"div \\\"q\\\"\"");
    }

    #[test]
    #[ignore] // Requires Chrome to be installed
    fn test_basic_navigation() {
        let manager = BrowserManager::new(BrowserConfig::default()).unwrap();
        let page = manager.open_page().unwrap();

        assert!(page.navigate("https://example.com").is_ok());
        assert!(page.url().contains("example.com"));
    }

    #[test]
    #[ignore] // Requires Chrome to be installed
    fn test_wait_and_inner_text() {
        let manager = BrowserManager::new(BrowserConfig::default()).unwrap();
        let page = manager.open_page().unwrap();

        page.navigate("https://example.com").unwrap();
        assert!(page.wait_for_selector("h1", Duration::from_secs(5)).is_ok());
        assert!(page.inner_text("h1").unwrap().contains("Example"));
        assert!(page
            .wait_for_selector("#does-not-exist", Duration::from_millis(300))
            .is_err());
    }
}

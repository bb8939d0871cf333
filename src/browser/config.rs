use std::time::Duration;

/// Configuration for the browser instance driving the catalog
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    /// Run browser in headless mode
    pub headless: bool,

    /// Browser window size
    pub window_size: (u32, u32),

    /// Custom user agent
    pub user_agent: Option<String>,

    /// Default wait for navigation and selectors, in seconds
    pub timeout_seconds: u64,

    /// Keep the DevTools connection open this long without events
    pub idle_timeout_seconds: u64,

    /// Additional Chrome flags
    pub chrome_flags: Vec<String>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            window_size: (1920, 1080),
            user_agent: Some(
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36"
                    .to_string(),
            ),
            timeout_seconds: 30,
            idle_timeout_seconds: 300,
            chrome_flags: vec![
                "--disable-blink-features=AutomationControlled".to_string(),
                "--disable-dev-shm-usage".to_string(),
            ],
        }
    }
}

impl BrowserConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_seconds)
    }

    /// Full Chrome argument list, user agent included
    pub fn chrome_args(&self) -> Vec<String> {
        let mut args = self.chrome_flags.clone();
        if let Some(ua) = &self.user_agent {
            args.push(format!("--user-agent={}", ua));
        }
        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BrowserConfig::default();
        assert!(config.headless);
        assert_eq!(config.window_size, (1920, 1080));
        assert!(config.user_agent.is_some());
        assert_eq!(config.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_chrome_args_include_user_agent() {
        let config = BrowserConfig {
            user_agent: Some("Agent/1.0".to_string()),
            ..Default::default()
        };
        let args = config.chrome_args();
        assert!(args.iter().any(|a| a == "--user-agent=Agent/1.0"));
        assert!(args.iter().any(|a| a.contains("AutomationControlled")));
    }

    #[test]
    fn test_chrome_args_without_user_agent() {
        let config = BrowserConfig {
            user_agent: None,
            chrome_flags: vec![],
            ..Default::default()
        };
        assert!(config.chrome_args().is_empty());
    }
}

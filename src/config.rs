use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::browser::BrowserConfig;

pub const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub browser: BrowserSection,
    #[serde(default)]
    pub timeouts: TimeoutConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Fixed layout of the catalog site
#[derive(Debug, Deserialize, Clone)]
pub struct SiteConfig {
    #[serde(default = "default_listing_url")]
    pub listing_url: String,

    #[serde(default = "default_card_selector")]
    pub card_selector: String,

    #[serde(default = "default_title_selector")]
    pub title_selector: String,

    #[serde(default = "default_image_selector")]
    pub image_selector: String,

    #[serde(default = "default_link_selector")]
    pub link_selector: String,

    #[serde(default = "default_manufacturer_selector")]
    pub manufacturer_selector: String,

    /// Button opening the detail view in a new tab, for cards without a link
    #[serde(default = "default_trigger_selector")]
    pub trigger_selector: String,

    /// Container holding the description on a detail view
    #[serde(default = "default_content_selector")]
    pub content_selector: String,

    /// Waited for after the listing loads, when set
    #[serde(default)]
    pub ready_selector: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BrowserSection {
    #[serde(default = "default_true")]
    pub headless: bool,

    #[serde(default = "default_window_width")]
    pub window_width: u32,

    #[serde(default = "default_window_height")]
    pub window_height: u32,

    #[serde(default)]
    pub user_agent: Option<String>,

    /// Additional Chrome flags
    #[serde(default)]
    pub chrome_flags: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TimeoutConfig {
    /// Wait for the content container on a navigated detail page
    #[serde(default = "default_detail_secs")]
    pub detail_secs: u64,

    /// Wait for a trigger click to open a new tab
    #[serde(default = "default_new_page_secs")]
    pub new_page_secs: u64,

    /// Wait for the content container inside the opened tab
    #[serde(default = "default_popup_content_secs")]
    pub popup_content_secs: u64,

    #[serde(default = "default_listing_secs")]
    pub listing_secs: u64,

    #[serde(default = "default_image_secs")]
    pub image_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OutputConfig {
    #[serde(default = "default_images_dir")]
    pub images_dir: String,

    #[serde(default = "default_output_path")]
    pub output_path: String,

    /// Rewrite the dataset after every item instead of once at the end
    #[serde(default)]
    pub persist_each_item: bool,
}

fn default_true() -> bool { true }
fn default_listing_url() -> String { "url_to_website".to_string() }
fn default_card_selector() -> String { ".site_cell".to_string() }
fn default_title_selector() -> String { ".title_holder".to_string() }
fn default_image_selector() -> String { "img".to_string() }
fn default_link_selector() -> String { "a".to_string() }
fn default_manufacturer_selector() -> String { "div.d-flex.justify-content-between.w-100".to_string() }
fn default_trigger_selector() -> String {
    "div.button.btn-light.btn-bright-hover.w-100.fs-10.fs-sm-12.fs-lg-16.fw-500".to_string()
}
fn default_content_selector() -> String { "content".to_string() }
fn default_window_width() -> u32 { 1920 }
fn default_window_height() -> u32 { 1080 }
fn default_detail_secs() -> u64 { 5 }
fn default_new_page_secs() -> u64 { 10 }
fn default_popup_content_secs() -> u64 { 30 }
fn default_listing_secs() -> u64 { 30 }
fn default_image_secs() -> u64 { 30 }
fn default_images_dir() -> String { "images".to_string() }
fn default_output_path() -> String { "data.json".to_string() }

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            listing_url: default_listing_url(),
            card_selector: default_card_selector(),
            title_selector: default_title_selector(),
            image_selector: default_image_selector(),
            link_selector: default_link_selector(),
            manufacturer_selector: default_manufacturer_selector(),
            trigger_selector: default_trigger_selector(),
            content_selector: default_content_selector(),
            ready_selector: None,
        }
    }
}

impl Default for BrowserSection {
    fn default() -> Self {
        Self {
            headless: true,
            window_width: default_window_width(),
            window_height: default_window_height(),
            user_agent: None,
            chrome_flags: vec![],
        }
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            detail_secs: default_detail_secs(),
            new_page_secs: default_new_page_secs(),
            popup_content_secs: default_popup_content_secs(),
            listing_secs: default_listing_secs(),
            image_secs: default_image_secs(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            images_dir: default_images_dir(),
            output_path: default_output_path(),
            persist_each_item: false,
        }
    }
}

impl Config {
    /// Load `config.toml` from the working directory, falling back to defaults
    pub fn load() -> Self {
        Self::load_from(Path::new(CONFIG_FILE))
    }

    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match fs::read_to_string(path) {
            Ok(content) => match toml::from_str::<Config>(&content) {
                Ok(cfg) => cfg,
                Err(e) => {
                    log::warn!("Invalid {}, using defaults: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("Failed to read {}, using defaults: {}", path.display(), e);
                Self::default()
            }
        }
    }
}

impl BrowserSection {
    /// Build the launch configuration for the browser manager
    pub fn browser_config(&self, timeouts: &TimeoutConfig) -> BrowserConfig {
        let mut config = BrowserConfig::default();
        config.headless = self.headless;
        config.window_size = (self.window_width, self.window_height);
        if self.user_agent.is_some() {
            config.user_agent = self.user_agent.clone();
        }
        config.chrome_flags.extend(self.chrome_flags.iter().cloned());
        config.timeout_seconds = timeouts.listing_secs;
        config
    }
}

impl TimeoutConfig {
    pub fn detail(&self) -> Duration {
        Duration::from_secs(self.detail_secs)
    }

    pub fn new_page(&self) -> Duration {
        Duration::from_secs(self.new_page_secs)
    }

    pub fn popup_content(&self) -> Duration {
        Duration::from_secs(self.popup_content_secs)
    }

    pub fn listing(&self) -> Duration {
        Duration::from_secs(self.listing_secs)
    }

    pub fn image(&self) -> Duration {
        Duration::from_secs(self.image_secs)
    }
}

// Library interface for catalog_scraper
// The binary wires these together; tests drive the pipeline with fake browsers.

pub mod browser;
pub mod config;
pub mod extractor;
pub mod helpers;
pub mod http_client;
pub mod logging;
pub mod models;
pub mod pipeline;
pub mod resolver;
pub mod session;

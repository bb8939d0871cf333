use catalog_scraper::browser::BrowserManager;
use catalog_scraper::config::Config;
use catalog_scraper::http_client::{HttpAssetFetcher, HttpClientConfig};
use catalog_scraper::logging;
use catalog_scraper::pipeline::Pipeline;
use log::{error, info};

#[tokio::main]
async fn main() {
    if let Err(e) = logging::init() {
        eprintln!("Failed to initialise logging: {}", e);
    }

    let cfg = Config::load();

    if let Err(e) = run(&cfg).await {
        error!("Run aborted: {}", e);
        std::process::exit(1);
    }
}

async fn run(cfg: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let mut http_config = HttpClientConfig {
        timeout: cfg.timeouts.image(),
        ..Default::default()
    };
    if let Some(ua) = &cfg.browser.user_agent {
        http_config.user_agent = ua.clone();
    }
    let fetcher = HttpAssetFetcher::with_config(http_config)?;

    let browser = BrowserManager::new(cfg.browser.browser_config(&cfg.timeouts))?;

    info!("Scraping {}", cfg.site.listing_url);
    let mut pipeline = Pipeline::new(&browser, &fetcher, cfg)?;
    let report = pipeline.run().await?;
    info!("Done: {}", report);

    Ok(())
}

use crate::browser::{BrowserError, BrowserSession};
use crate::config::Config;
use crate::extractor::{CardSelectors, ExtractError};
use crate::helpers::slug_for;
use crate::http_client::AssetFetch;
use crate::models::{Field, RawCard, ResolvedRecord};
use crate::resolver::DetailResolver;
use crate::session::ListingSession;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Errors that stop the whole run. Per-item failures never end up here.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("browser session failed: {0}")]
    Session(#[from] BrowserError),

    #[error("listing extraction failed: {0}")]
    Extract(#[from] ExtractError),

    #[error("could not serialize dataset: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("could not write {path}: {source}")]
    Persist {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Where a run currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Init,
    ListingLoaded,
    Extracted,
    ImageFetched,
    DetailResolved,
    Recorded,
    Persisted,
    Closed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Init => "init",
            Stage::ListingLoaded => "listing-loaded",
            Stage::Extracted => "extracted",
            Stage::ImageFetched => "image-fetched",
            Stage::DetailResolved => "detail-resolved",
            Stage::Recorded => "recorded",
            Stage::Persisted => "persisted",
            Stage::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// Counters for one run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub cards: usize,
    pub images_downloaded: usize,
    pub images_failed: usize,
    pub descriptions_resolved: usize,
    pub descriptions_empty: usize,
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} cards, {} images ({} failed), {} descriptions ({} empty)",
            self.cards,
            self.images_downloaded,
            self.images_failed,
            self.descriptions_resolved,
            self.descriptions_empty
        )
    }
}

/// Drives one run: listing, cards, images, details, dataset
pub struct Pipeline<'a, B: BrowserSession, F: AssetFetch> {
    browser: &'a B,
    fetcher: &'a F,
    config: &'a Config,
    selectors: CardSelectors,
    stage: Stage,
}

impl<'a, B: BrowserSession, F: AssetFetch> Pipeline<'a, B, F> {
    pub fn new(browser: &'a B, fetcher: &'a F, config: &'a Config) -> Result<Self, PipelineError> {
        Ok(Self {
            browser,
            fetcher,
            config,
            selectors: CardSelectors::from_site(&config.site)?,
            stage: Stage::Init,
        })
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    fn enter(&mut self, stage: Stage) {
        log::debug!("Pipeline stage: {} -> {}", self.stage, stage);
        self.stage = stage;
    }

    /// Run end to end. Only session bootstrap and the final write are fatal.
    pub async fn run(&mut self) -> Result<RunReport, PipelineError> {
        let site = &self.config.site;
        let mut session = ListingSession::open(
            self.browser,
            &site.listing_url,
            site.ready_selector.as_deref(),
            self.config.timeouts.listing(),
        )?;
        self.enter(Stage::ListingLoaded);

        let cards = session.extract_cards(&self.selectors)?;
        let (records, report) = self.process_cards(&mut session, &cards).await;

        write_dataset(&records, Path::new(&self.config.output.output_path))?;
        log::info!("Data saved to {}", self.config.output.output_path);
        self.enter(Stage::Persisted);

        session.close();
        self.enter(Stage::Closed);

        log::info!("Run finished: {}", report);
        Ok(report)
    }

    /// Turn every card into exactly one record, in order
    pub async fn process_cards(
        &mut self,
        session: &mut ListingSession<'_, B>,
        cards: &[RawCard],
    ) -> (Vec<ResolvedRecord>, RunReport) {
        let selectors = self.selectors.clone();
        let resolver = DetailResolver::new(&selectors, self.config);
        let images_dir = PathBuf::from(&self.config.output.images_dir);
        let mut records = Vec::with_capacity(cards.len());
        let mut report = RunReport {
            cards: cards.len(),
            ..Default::default()
        };

        for (i, card) in cards.iter().enumerate() {
            self.enter(Stage::Extracted);
            log::info!("Processing card {}/{}: {:?}", i + 1, cards.len(), card.title);

            let slug = slug_for(card.title.as_ref().into_option().map(String::as_str));
            let dest = images_dir.join(format!("{}.jpg", slug));

            if let Field::Present(url) = &card.image_url {
                match self.fetcher.fetch(url, &dest).await {
                    Ok(()) => {
                        log::info!("Downloaded: {} -> {}", url, dest.display());
                        report.images_downloaded += 1;
                    }
                    Err(e) => {
                        log::error!("Failed to download {}: {}", url, e);
                        report.images_failed += 1;
                    }
                }
            }
            self.enter(Stage::ImageFetched);

            let outcome = resolver.resolve(session, card);
            if outcome.is_resolved() {
                report.descriptions_resolved += 1;
            }
            self.enter(Stage::DetailResolved);

            let record = ResolvedRecord::from_card(card, outcome);
            if record.description.is_empty() {
                report.descriptions_empty += 1;
            }
            records.push(record);
            self.enter(Stage::Recorded);

            if self.config.output.persist_each_item {
                let path = Path::new(&self.config.output.output_path);
                if let Err(e) = write_dataset(&records, path) {
                    log::warn!("Checkpoint write failed: {}", e);
                }
            }
        }

        (records, report)
    }
}

/// Write records as a pretty-printed JSON array, replacing any previous file
pub fn write_dataset(records: &[ResolvedRecord], path: &Path) -> Result<(), PipelineError> {
    let json = serde_json::to_string_pretty(records)?;
    let persist_err = |source| PipelineError::Persist {
        path: path.display().to_string(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(persist_err)?;
    }
    std::fs::write(path, json).map_err(persist_err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_empty_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        write_dataset(&[], &path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[]");
    }

    #[test]
    fn test_write_dataset_pretty_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("data.json");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "stale").unwrap();

        let records = vec![ResolvedRecord {
            title: Some("Acme Widget!!".to_string()),
            link: Some("http://x/detail/1".to_string()),
            manufacturer: None,
            description: "Sturdy.".to_string(),
        }];
        write_dataset(&records, &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("[\n  {"));
        let parsed: Vec<ResolvedRecord> = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, records);
    }

    #[test]
    fn test_report_display() {
        let report = RunReport {
            cards: 3,
            images_downloaded: 2,
            images_failed: 1,
            descriptions_resolved: 1,
            descriptions_empty: 2,
        };
        assert_eq!(
            report.to_string(),
            "3 cards, 2 images (1 failed), 1 descriptions (2 empty)"
        );
    }

    #[test]
    fn test_stage_names() {
        assert_eq!(Stage::ListingLoaded.to_string(), "listing-loaded");
        assert_eq!(Stage::Closed.to_string(), "closed");
    }
}

use crate::browser::{BrowserError, BrowserSession, PageDriver};
use crate::extractor::{self, CardSelectors, ExtractError};
use crate::models::RawCard;
use std::time::Duration;

/// The listing page shared by every step of a run.
///
/// Steps borrow the session mutably, so only one navigation of the listing
/// page can be outstanding at a time. Each load of the listing bumps
/// `generation`; trigger handles minted under an older generation point at a
/// DOM that no longer exists until the listing is tagged again.
pub struct ListingSession<'b, B: BrowserSession> {
    browser: &'b B,
    page: B::Page,
    listing_url: String,
    ready_selector: Option<String>,
    ready_timeout: Duration,
    generation: u64,
    tagged_generation: Option<u64>,
    card_count: usize,
    on_listing: bool,
}

impl<'b, B: BrowserSession> ListingSession<'b, B> {
    /// Open a page on the listing and optionally wait for a results marker
    pub fn open(
        browser: &'b B,
        listing_url: &str,
        ready_selector: Option<&str>,
        timeout: Duration,
    ) -> Result<Self, BrowserError> {
        let page = browser.open_page()?;

        log::info!("Loading listing: {}", listing_url);
        page.navigate(listing_url)?;

        let session = Self {
            browser,
            page,
            listing_url: listing_url.to_string(),
            ready_selector: ready_selector.map(str::to_string),
            ready_timeout: timeout,
            generation: 1,
            tagged_generation: None,
            card_count: 0,
            on_listing: true,
        };
        session.wait_until_ready()?;
        Ok(session)
    }

    /// Wait for the results marker, if one is configured
    fn wait_until_ready(&self) -> Result<(), BrowserError> {
        match &self.ready_selector {
            Some(selector) => self.page.wait_for_selector(selector, self.ready_timeout),
            None => Ok(()),
        }
    }

    pub fn browser(&self) -> &'b B {
        self.browser
    }

    pub fn page(&self) -> &B::Page {
        &self.page
    }

    pub fn listing_url(&self) -> &str {
        &self.listing_url
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Extract all cards from the current listing load
    pub fn extract_cards(&mut self, selectors: &CardSelectors) -> Result<Vec<RawCard>, ExtractError> {
        let cards = extractor::extract_cards(&self.page, selectors, self.generation)?;
        self.tagged_generation = Some(self.generation);
        self.card_count = cards.len();
        Ok(cards)
    }

    /// Move the shared page off the listing
    pub fn navigate_away(&mut self, url: &str) -> Result<(), BrowserError> {
        self.on_listing = false;
        self.page.navigate(url)
    }

    /// Reload the listing; always starts a new generation
    pub fn return_to_listing(&mut self) -> Result<(), BrowserError> {
        self.generation += 1;
        self.page.navigate(&self.listing_url)?;
        self.on_listing = true;
        Ok(())
    }

    /// Make sure the page shows the listing with trigger tags for this generation.
    ///
    /// A reloaded listing is re-tagged only once its results marker is back.
    /// Finding no cards where the first load had some is an error.
    pub fn ensure_triggers_tagged(&mut self, selectors: &CardSelectors) -> Result<(), ExtractError> {
        if !self.on_listing {
            self.return_to_listing()?;
        }
        if self.tagged_generation != Some(self.generation) {
            self.wait_until_ready()?;
            log::debug!("Re-tagging listing triggers (load {})", self.generation);
            let texts = extractor::tag_listing(&self.page, selectors)?;
            if texts.is_empty() && self.card_count > 0 {
                return Err(ExtractError::EmptyListing {
                    expected: self.card_count,
                });
            }
            if texts.len() != self.card_count {
                log::warn!(
                    "Listing reload shows {} cards, {} were extracted",
                    texts.len(),
                    self.card_count
                );
            }
            self.tagged_generation = Some(self.generation);
        }
        Ok(())
    }

    pub fn close(self) {
        if let Err(e) = self.page.close() {
            log::warn!("Failed to close listing page: {}", e);
        }
    }
}

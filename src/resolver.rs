use crate::browser::{BrowserError, BrowserSession, NewPage, PageDriver};
use crate::config::Config;
use crate::extractor::CardSelectors;
use crate::models::{ActionHandle, DetailOutcome, DetailStrategy, RawCard};
use crate::session::ListingSession;
use std::time::Duration;

/// Fetches the description for one card, by link or by trigger button
pub struct DetailResolver<'a> {
    selectors: &'a CardSelectors,
    content_selector: String,
    detail_timeout: Duration,
    new_page_timeout: Duration,
    popup_content_timeout: Duration,
}

impl<'a> DetailResolver<'a> {
    pub fn new(selectors: &'a CardSelectors, config: &Config) -> Self {
        Self {
            selectors,
            content_selector: config.site.content_selector.clone(),
            detail_timeout: config.timeouts.detail(),
            new_page_timeout: config.timeouts.new_page(),
            popup_content_timeout: config.timeouts.popup_content(),
        }
    }

    /// Never fails: every error degrades to a non-resolved outcome
    pub fn resolve<B: BrowserSession>(
        &self,
        session: &mut ListingSession<'_, B>,
        card: &RawCard,
    ) -> DetailOutcome {
        match card.detail_strategy() {
            DetailStrategy::Navigate(link) => self.via_navigation(session, &link),
            DetailStrategy::Trigger(handle) => self.via_trigger(session, &handle),
            DetailStrategy::None => DetailOutcome::Missing,
        }
    }

    fn via_navigation<B: BrowserSession>(
        &self,
        session: &mut ListingSession<'_, B>,
        link: &str,
    ) -> DetailOutcome {
        log::info!("Navigating to: {}", link);

        let outcome = match self.read_detail_page(session, link) {
            Ok(text) => {
                log::info!("Description extracted ({} chars)", text.chars().count());
                DetailOutcome::Resolved(text)
            }
            Err(e) => {
                log::warn!("Failed to extract description from {}: {}", link, e);
                DetailOutcome::Failed(e.to_string())
            }
        };

        if let Err(e) = session.return_to_listing() {
            log::error!("Failed to return to listing {}: {}", session.listing_url(), e);
        }

        outcome
    }

    fn read_detail_page<B: BrowserSession>(
        &self,
        session: &mut ListingSession<'_, B>,
        link: &str,
    ) -> Result<String, BrowserError> {
        session.navigate_away(link)?;
        let page = session.page();
        page.wait_for_selector(&self.content_selector, self.detail_timeout)?;
        page.inner_text(&self.content_selector)
    }

    fn via_trigger<B: BrowserSession>(
        &self,
        session: &mut ListingSession<'_, B>,
        handle: &ActionHandle,
    ) -> DetailOutcome {
        if let Err(e) = session.ensure_triggers_tagged(self.selectors) {
            log::warn!("Listing not ready for trigger {}: {}", handle.selector, e);
            return DetailOutcome::Failed(e.to_string());
        }
        if handle.generation != session.generation() {
            log::debug!(
                "Trigger {} minted on listing load {}, clicking on load {}",
                handle.selector,
                handle.generation,
                session.generation()
            );
        }

        log::info!("Clicking trigger: {}", handle.selector);
        let opened = session.browser().click_and_await_page(
            session.page(),
            &handle.selector,
            self.new_page_timeout,
        );

        let outcome = match opened {
            NewPage::Opened(popup) => {
                let result = self.read_popup(&popup);
                if let Err(e) = popup.close() {
                    log::warn!("Failed to close detail tab: {}", e);
                }
                match result {
                    Ok(text) => {
                        log::info!("Description extracted ({} chars)", text.chars().count());
                        DetailOutcome::Resolved(text)
                    }
                    Err(e) => {
                        log::warn!("Failed to read detail tab for {}: {}", handle.selector, e);
                        DetailOutcome::Failed(e.to_string())
                    }
                }
            }
            NewPage::TimedOut => {
                log::warn!(
                    "No detail tab opened by {} within {:?}",
                    handle.selector,
                    self.new_page_timeout
                );
                DetailOutcome::Failed("no new tab".to_string())
            }
            NewPage::Failed(reason) => {
                log::warn!("Trigger {} failed: {}", handle.selector, reason);
                DetailOutcome::Failed(reason)
            }
        };

        if let Err(e) = session.page().bring_to_front() {
            log::debug!("Could not refocus listing: {}", e);
        }

        outcome
    }

    fn read_popup<P: PageDriver>(&self, popup: &P) -> Result<String, BrowserError> {
        popup.bring_to_front()?;
        popup.wait_for_selector(&self.content_selector, self.popup_content_timeout)?;
        popup.inner_text(&self.content_selector)
    }
}

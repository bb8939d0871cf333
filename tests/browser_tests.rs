/// Browser tests
/// These tests require Chrome/Chromium to be installed
/// Run with: cargo test --test browser_tests -- --ignored
use catalog_scraper::browser::{BrowserConfig, BrowserManager, BrowserSession, NewPage, PageDriver};
use catalog_scraper::config::SiteConfig;
use catalog_scraper::extractor::{extract_cards, CardSelectors};
use catalog_scraper::models::Field;
use std::time::Duration;

const LISTING: &str = "data:text/html,<html><body>\
<div class='site_cell'><div class='title_holder'>Acme Widget</div>\
<a href='https://example.com/' target='_blank'>go</a></div>\
<div class='site_cell'><div class='title_holder'>Boxed</div>\
<div class='d-flex justify-content-between w-100'><div>Acme</div><div>Germany</div></div></div>\
</body></html>";

#[test]
#[ignore] // Requires Chrome/Chromium
fn test_extract_cards_from_rendered_page() {
    let manager = BrowserManager::new(BrowserConfig::default()).expect("Chrome/Chromium not installed");
    let page = manager.open_page().unwrap();
    page.navigate(LISTING).unwrap();

    let selectors = CardSelectors::from_site(&SiteConfig::default()).unwrap();
    let cards = extract_cards(&page, &selectors, 1).unwrap();

    assert_eq!(cards.len(), 2);
    assert_eq!(cards[0].title, Field::Present("Acme Widget".to_string()));
    assert_eq!(cards[0].link, Field::Present("https://example.com/".to_string()));
    assert_eq!(cards[1].link, Field::Absent);
    assert_eq!(cards[1].manufacturer, Field::Present("Acme\nGermany".to_string()));

    // Link targets are stripped in the live DOM
    let targets = page
        .evaluate("document.querySelectorAll('a[target]').length")
        .unwrap();
    assert_eq!(targets.as_u64(), Some(0));
}

#[test]
#[ignore] // Requires Chrome/Chromium
fn test_click_without_new_tab_times_out() {
    let manager = BrowserManager::new(BrowserConfig::default()).expect("Chrome/Chromium not installed");
    let page = manager.open_page().unwrap();
    page.navigate(LISTING).unwrap();

    let outcome = manager.click_and_await_page(&page, ".title_holder", Duration::from_millis(500));
    assert!(matches!(outcome, NewPage::TimedOut));
}

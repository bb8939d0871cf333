//! Reads product cards off the rendered listing page.
//!
//! Extraction runs in two steps. A small script prepares the live DOM: it
//! strips `target` from each card link, tags each trigger button with its
//! card index and reports the rendered text (`innerText`) of each card's title
//! and manufacturer. Then the rendered HTML is parsed with `scraper` and each
//! card is read independently, so a missing sub-element only blanks that field.

use crate::browser::scraper::js_string;
use crate::browser::{BrowserError, PageDriver};
use crate::config::SiteConfig;
use crate::models::{ActionHandle, Field, RawCard};
use reqwest::Url;
use scraper::{ElementRef, Html, Selector};
use serde::Deserialize;

/// Attribute used to find a card's trigger button again
pub const TRIGGER_ATTR: &str = "data-catalog-trigger";

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("invalid selector {selector}: {reason}")]
    Selector { selector: String, reason: String },

    #[error("listing prepare script returned {0}")]
    Script(String),

    #[error("listing shows no cards after reload, {expected} were extracted")]
    EmptyListing { expected: usize },

    #[error(transparent)]
    Browser(#[from] BrowserError),
}

/// Rendered text the prepare script read for one card
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CardText {
    pub title: Option<String>,
    pub manufacturer: Option<String>,
}

/// Parsed card selectors, plus the raw strings the DOM script needs
#[derive(Debug, Clone)]
pub struct CardSelectors {
    raw_card: String,
    raw_title: String,
    raw_link: String,
    raw_manufacturer: String,
    raw_trigger: String,
    card: Selector,
    title: Selector,
    image: Selector,
    link: Selector,
    manufacturer: Selector,
    trigger: Selector,
}

fn parse_selector(selector: &str) -> Result<Selector, ExtractError> {
    Selector::parse(selector).map_err(|e| ExtractError::Selector {
        selector: selector.to_string(),
        reason: format!("{:?}", e),
    })
}

impl CardSelectors {
    pub fn from_site(site: &SiteConfig) -> Result<Self, ExtractError> {
        Ok(Self {
            raw_card: site.card_selector.clone(),
            raw_title: site.title_selector.clone(),
            raw_link: site.link_selector.clone(),
            raw_manufacturer: site.manufacturer_selector.clone(),
            raw_trigger: site.trigger_selector.clone(),
            card: parse_selector(&site.card_selector)?,
            title: parse_selector(&site.title_selector)?,
            image: parse_selector(&site.image_selector)?,
            link: parse_selector(&site.link_selector)?,
            manufacturer: parse_selector(&site.manufacturer_selector)?,
            trigger: parse_selector(&site.trigger_selector)?,
        })
    }

    /// Script that strips link targets and tags trigger buttons.
    ///
    /// Returns a JSON string with one `{title, manufacturer}` entry of
    /// `innerText` per card, in DOM order.
    pub fn prepare_script(&self) -> String {
        format!(
            r#"(() => {{
    const textOf = (card, selector) => {{
        const el = card.querySelector(selector);
        return el ? el.innerText : null;
    }};
    const cards = Array.from(document.querySelectorAll({card}));
    return JSON.stringify(cards.map((card, i) => {{
        const link = card.querySelector({link});
        if (link) {{
            link.removeAttribute('target');
        }}
        const trigger = card.querySelector({trigger});
        if (trigger) {{
            trigger.setAttribute({attr}, String(i));
        }}
        return {{ title: textOf(card, {title}), manufacturer: textOf(card, {manufacturer}) }};
    }}));
}})()"#,
            card = js_string(&self.raw_card),
            title = js_string(&self.raw_title),
            link = js_string(&self.raw_link),
            manufacturer = js_string(&self.raw_manufacturer),
            trigger = js_string(&self.raw_trigger),
            attr = js_string(TRIGGER_ATTR),
        )
    }
}

/// CSS locator for the trigger tagged with `index`
pub fn trigger_locator(index: &str) -> String {
    format!("[{}=\"{}\"]", TRIGGER_ATTR, index)
}

/// Prepare the live listing DOM. Returns the rendered text of every card it saw.
pub fn tag_listing<P: PageDriver>(
    page: &P,
    selectors: &CardSelectors,
) -> Result<Vec<CardText>, ExtractError> {
    let value = page.evaluate(&selectors.prepare_script())?;
    let parsed = match value {
        serde_json::Value::String(json) => serde_json::from_str(&json),
        other => serde_json::from_value(other),
    };
    parsed.map_err(|e| ExtractError::Script(e.to_string()))
}

/// Extract every card on the current listing page, in DOM order
pub fn extract_cards<P: PageDriver>(
    page: &P,
    selectors: &CardSelectors,
    generation: u64,
) -> Result<Vec<RawCard>, ExtractError> {
    let texts = tag_listing(page, selectors)?;
    let html = page.content()?;
    let base = Url::parse(&page.url()).ok();

    let cards = parse_cards(&html, base.as_ref(), selectors, generation, &texts);
    if cards.len() != texts.len() {
        log::warn!(
            "Card count mismatch: script saw {}, parsed {}",
            texts.len(),
            cards.len()
        );
    }
    log::info!("Extracted {} cards", cards.len());
    Ok(cards)
}

/// Read cards out of rendered listing HTML.
///
/// `texts` holds the rendered text the prepare script reported. It is used for
/// title and manufacturer when it lines up with the parsed cards; otherwise the
/// text is rebuilt from the HTML.
pub fn parse_cards(
    html: &str,
    base: Option<&Url>,
    selectors: &CardSelectors,
    generation: u64,
    texts: &[CardText],
) -> Vec<RawCard> {
    let document = Html::parse_document(html);
    let cards: Vec<ElementRef<'_>> = document.select(&selectors.card).collect();
    let rendered = texts.len() == cards.len();

    cards
        .into_iter()
        .enumerate()
        .map(|(i, card)| {
            let (title, manufacturer) = if rendered {
                (
                    non_blank(texts[i].title.as_deref()),
                    non_blank(texts[i].manufacturer.as_deref()),
                )
            } else {
                (
                    text_of(card, &selectors.title),
                    text_of(card, &selectors.manufacturer),
                )
            };
            (card, title, manufacturer)
        })
        .map(|(card, title, manufacturer)| RawCard {
            title,
            image_url: card
                .select(&selectors.image)
                .next()
                .and_then(|img| img.value().attr("src").or_else(|| img.value().attr("data-src")))
                .and_then(|src| resolve_url(base, src))
                .into(),
            link: card
                .select(&selectors.link)
                .next()
                .and_then(|a| a.value().attr("href"))
                .and_then(|href| resolve_url(base, href))
                .filter(|url| url.starts_with("http://") || url.starts_with("https://"))
                .into(),
            manufacturer,
            action: card
                .select(&selectors.trigger)
                .next()
                .and_then(|button| button.value().attr(TRIGGER_ATTR))
                .map(|index| ActionHandle {
                    selector: trigger_locator(index),
                    generation,
                })
                .into(),
        })
        .collect()
}

fn non_blank(text: Option<&str>) -> Field<String> {
    text.map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
        .into()
}

fn text_of(card: ElementRef<'_>, selector: &Selector) -> Field<String> {
    let text = card.select(selector).next().map(block_text);
    non_blank(text.as_deref())
}

/// Approximate `innerText`: child elements go on their own lines, scripts are skipped
fn block_text(el: ElementRef<'_>) -> String {
    let mut parts = Vec::new();
    for node in el.children() {
        if let Some(text) = node.value().as_text() {
            let text = text.trim();
            if !text.is_empty() {
                parts.push(text.to_string());
            }
        } else if let Some(child) = ElementRef::wrap(node) {
            if matches!(child.value().name(), "script" | "style" | "template" | "noscript") {
                continue;
            }
            let text = block_text(child);
            if !text.is_empty() {
                parts.push(text);
            }
        }
    }
    parts.join("\n")
}

fn resolve_url(base: Option<&Url>, raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    match base {
        Some(base) => base.join(raw).ok().map(|u| u.to_string()),
        None => Url::parse(raw).ok().map(|u| u.to_string()),
    }
}

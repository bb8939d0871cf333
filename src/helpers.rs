//! Small pure helpers shared by the pipeline.
//!
//! # Examples
//!
//! ```
//! use catalog_scraper::helpers::sanitize_title;
//!
//! assert_eq!(sanitize_title("Acme Widget!!"), "acme_widget__");
//! ```

/// Title used for cards that carry none.
pub const UNKNOWN_ITEM: &str = "unknown_item";

/// Map a free-text title to a filesystem-safe slug.
///
/// Every char outside `[A-Za-z0-9]` becomes `_`, then the result is lowercased.
/// Non-ASCII chars are replaced one-for-one, so the slug has as many chars as the title.
pub fn sanitize_title(title: &str) -> String {
    title
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}

/// Slug for an optional title, falling back to [`UNKNOWN_ITEM`].
pub fn slug_for(title: Option<&str>) -> String {
    sanitize_title(title.unwrap_or(UNKNOWN_ITEM))
}

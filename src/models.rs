use serde::{Deserialize, Serialize};

/// Result of looking up one sub-element of a card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field<T> {
    Present(T),
    Absent,
}

impl<T> Field<T> {
    pub fn as_ref(&self) -> Field<&T> {
        match self {
            Field::Present(v) => Field::Present(v),
            Field::Absent => Field::Absent,
        }
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Field::Present(v) => Some(v),
            Field::Absent => None,
        }
    }
}

impl<T> From<Option<T>> for Field<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Field::Present(v),
            None => Field::Absent,
        }
    }
}

impl<T> Default for Field<T> {
    fn default() -> Self {
        Field::Absent
    }
}

/// Locator for a card's trigger button on the listing page.
///
/// `generation` is the listing load that tagged the element. Once the listing
/// page navigates away the handle is stale and has to be re-tagged before use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionHandle {
    pub selector: String,
    pub generation: u64,
}

/// One card as read from the listing page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawCard {
    pub title: Field<String>,
    pub image_url: Field<String>,
    pub link: Field<String>,
    pub manufacturer: Field<String>,
    pub action: Field<ActionHandle>,
}

/// How the description of a card gets fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailStrategy {
    Navigate(String),
    Trigger(ActionHandle),
    None,
}

impl RawCard {
    /// A direct link always wins over a trigger button.
    pub fn detail_strategy(&self) -> DetailStrategy {
        match (&self.link, &self.action) {
            (Field::Present(link), _) => DetailStrategy::Navigate(link.clone()),
            (Field::Absent, Field::Present(handle)) => DetailStrategy::Trigger(handle.clone()),
            (Field::Absent, Field::Absent) => DetailStrategy::None,
        }
    }
}

/// What detail resolution produced for one card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailOutcome {
    Resolved(String),
    Missing,
    Failed(String),
}

impl DetailOutcome {
    pub fn into_description(self) -> String {
        match self {
            DetailOutcome::Resolved(text) => text,
            DetailOutcome::Missing | DetailOutcome::Failed(_) => String::new(),
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, DetailOutcome::Resolved(_))
    }
}

/// Output row written to the dataset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResolvedRecord {
    pub title: Option<String>,
    pub link: Option<String>,
    pub manufacturer: Option<String>,
    pub description: String,
}

impl ResolvedRecord {
    pub fn from_card(card: &RawCard, outcome: DetailOutcome) -> Self {
        Self {
            title: card.title.clone().into_option(),
            link: card.link.clone().into_option(),
            manufacturer: card.manufacturer.clone().into_option(),
            description: outcome.into_description(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle() -> ActionHandle {
        ActionHandle {
            selector: "[data-catalog-trigger=\"0\"]".to_string(),
            generation: 1,
        }
    }

    #[test]
    fn test_link_takes_precedence_over_trigger() {
        let card = RawCard {
            link: Field::Present("http://x/detail/1".to_string()),
            action: Field::Present(handle()),
            ..Default::default()
        };
        assert_eq!(
            card.detail_strategy(),
            DetailStrategy::Navigate("http://x/detail/1".to_string())
        );
    }

    #[test]
    fn test_trigger_used_without_link() {
        let card = RawCard {
            action: Field::Present(handle()),
            ..Default::default()
        };
        assert_eq!(card.detail_strategy(), DetailStrategy::Trigger(handle()));
        assert_eq!(RawCard::default().detail_strategy(), DetailStrategy::None);
    }

    #[test]
    fn test_failed_outcome_degrades_to_empty_description() {
        let card = RawCard {
            title: Field::Present("Acme".to_string()),
            ..Default::default()
        };
        let record = ResolvedRecord::from_card(&card, DetailOutcome::Failed("timeout".into()));
        assert_eq!(record.description, "");
        assert_eq!(record.title.as_deref(), Some("Acme"));
        assert_eq!(record.link, None);
    }

    #[test]
    fn test_resolved_text_kept_verbatim() {
        let text = "  Sturdy widget.\n\n  Ships flat.\n";
        let record = ResolvedRecord::from_card(
            &RawCard::default(),
            DetailOutcome::Resolved(text.to_string()),
        );
        assert_eq!(record.description, text);
    }

    #[test]
    fn test_record_serializes_nulls() {
        let record = ResolvedRecord::from_card(&RawCard::default(), DetailOutcome::Missing);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "title": null,
                "link": null,
                "manufacturer": null,
                "description": ""
            })
        );
    }
}

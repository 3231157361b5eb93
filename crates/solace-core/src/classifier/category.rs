//! Emergency categories and detection results.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Category of emergency language a phrase belongs to.
///
/// The four built-in categories cover the default taxonomy. A taxonomy
/// loaded from a file may introduce its own categories, which are kept
/// verbatim as [`Category::Custom`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    /// Suicidal ideation.
    Suicide,
    /// Self-harm.
    SelfHarm,
    /// Violence toward others.
    Violence,
    /// Abuse suffered by the writer.
    Abuse,
    /// A category defined by a custom taxonomy.
    Custom(String),
}

impl Category {
    /// Returns the built-in categories in taxonomy order.
    pub fn builtin() -> [Category; 4] {
        [
            Category::Suicide,
            Category::SelfHarm,
            Category::Violence,
            Category::Abuse,
        ]
    }

    /// Resolves a category name, falling back to [`Category::Custom`].
    ///
    /// Matching is case-insensitive and ignores surrounding whitespace, so
    /// `"Self-Harm"` and `" self-harm "` both resolve to [`Category::SelfHarm`].
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "suicide" => Category::Suicide,
            "self-harm" | "self_harm" => Category::SelfHarm,
            "violence" => Category::Violence,
            "abuse" => Category::Abuse,
            _ => Category::Custom(name.trim().to_string()),
        }
    }

    /// Returns the serialized name of this category.
    pub fn name(&self) -> &str {
        match self {
            Category::Suicide => "suicide",
            Category::SelfHarm => "self-harm",
            Category::Violence => "violence",
            Category::Abuse => "abuse",
            Category::Custom(name) => name,
        }
    }

    /// Returns a human-readable label for dashboards.
    pub fn label(&self) -> &str {
        match self {
            Category::Suicide => "Suicide",
            Category::SelfHarm => "Self-Harm",
            Category::Violence => "Violence",
            Category::Abuse => "Abuse",
            Category::Custom(name) => name,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<String> for Category {
    fn from(name: String) -> Self {
        Category::from_name(&name)
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        category.name().to_string()
    }
}

/// A single phrase hit found in a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhraseMatch {
    /// Category the phrase belongs to.
    pub category: Category,
    /// The trigger phrase, lower-cased as stored in the taxonomy.
    pub phrase: String,
}

impl PhraseMatch {
    /// Creates a new phrase match.
    pub fn new(category: Category, phrase: impl Into<String>) -> Self {
        Self {
            category,
            phrase: phrase.into(),
        }
    }
}

/// Result of running the emergency classifier over a message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Detection {
    /// Whether any phrase matched.
    pub is_emergency: bool,
    /// Phrase hits in taxonomy order.
    pub matches: Vec<PhraseMatch>,
    /// Classification duration in microseconds.
    pub duration_us: u64,
}

impl Detection {
    /// Creates a result with no matches.
    pub fn clear(duration_us: u64) -> Self {
        Self {
            is_emergency: false,
            matches: Vec::new(),
            duration_us,
        }
    }

    /// Creates a result from phrase hits.
    pub fn with_matches(matches: Vec<PhraseMatch>, duration_us: u64) -> Self {
        Self {
            is_emergency: !matches.is_empty(),
            matches,
            duration_us,
        }
    }

    /// Returns the first hit in taxonomy order, if any.
    pub fn primary(&self) -> Option<&PhraseMatch> {
        self.matches.first()
    }

    /// Returns the distinct categories that matched, in taxonomy order.
    pub fn categories(&self) -> Vec<&Category> {
        let mut seen: Vec<&Category> = Vec::new();
        for m in &self.matches {
            if !seen.contains(&&m.category) {
                seen.push(&m.category);
            }
        }
        seen
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_names_round_trip() {
        for category in Category::builtin() {
            assert_eq!(Category::from_name(category.name()), category);
        }
    }

    #[test]
    fn unknown_name_becomes_custom() {
        assert_eq!(
            Category::from_name(" Eating Disorder "),
            Category::Custom("Eating Disorder".to_string())
        );
    }

    #[test]
    fn name_lookup_is_case_insensitive() {
        assert_eq!(Category::from_name("Self-Harm"), Category::SelfHarm);
        assert_eq!(Category::from_name("SUICIDE"), Category::Suicide);
    }

    #[test]
    fn serializes_as_plain_string() {
        let json = serde_json::to_string(&Category::SelfHarm).unwrap();
        assert_eq!(json, "\"self-harm\"");

        let parsed: Category = serde_json::from_str("\"abuse\"").unwrap();
        assert_eq!(parsed, Category::Abuse);
    }

    #[test]
    fn clear_detection_has_no_primary() {
        let detection = Detection::clear(12);
        assert!(!detection.is_emergency);
        assert!(detection.primary().is_none());
        assert_eq!(detection.duration_us, 12);
    }

    #[test]
    fn categories_are_deduplicated() {
        let detection = Detection::with_matches(
            vec![
                PhraseMatch::new(Category::Suicide, "kill myself"),
                PhraseMatch::new(Category::Suicide, "end my life"),
                PhraseMatch::new(Category::Abuse, "hit me"),
            ],
            5,
        );
        assert!(detection.is_emergency);
        assert_eq!(
            detection.categories(),
            vec![&Category::Suicide, &Category::Abuse]
        );
        assert_eq!(detection.primary().unwrap().phrase, "kill myself");
    }
}

//! Keyword taxonomy: emergency categories mapped to trigger phrases.
//!
//! A taxonomy is built once and never mutated afterwards. Phrases are
//! lower-cased at construction so classification only has to lower-case the
//! incoming text.
//!
//! Taxonomies can be loaded from JSON of the form:
//!
//! ```json
//! {
//!   "suicide": ["kill myself", "end my life"],
//!   "abuse": ["hit me"]
//! }
//! ```
//!
//! Key order is preserved and decides which match is reported first. A
//! category repeated in the same file is rejected rather than merged.

use std::fmt;
use std::path::Path;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use super::Category;

/// Errors that can occur while building a taxonomy.
#[derive(Debug, Error)]
pub enum TaxonomyError {
    /// The taxonomy file could not be read.
    #[error("failed to read taxonomy file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The taxonomy JSON is malformed.
    #[error("invalid taxonomy JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The taxonomy has no categories.
    #[error("taxonomy has no categories")]
    Empty,

    /// A category name is blank.
    #[error("taxonomy contains a blank category name")]
    BlankCategory,

    /// A category appears more than once.
    #[error("category {0} is defined more than once")]
    DuplicateCategory(String),

    /// A phrase is blank.
    #[error("category {0} contains a blank phrase")]
    BlankPhrase(String),

    /// A word-boundary pattern failed to compile.
    #[error("invalid phrase pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Result type for taxonomy operations.
pub type Result<T> = std::result::Result<T, TaxonomyError>;

/// A category with its ordered trigger phrases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxonomyEntry {
    category: Category,
    phrases: Vec<String>,
}

impl TaxonomyEntry {
    /// Returns the category.
    pub fn category(&self) -> &Category {
        &self.category
    }

    /// Returns the lower-cased phrases in their configured order.
    pub fn phrases(&self) -> &[String] {
        &self.phrases
    }
}

/// Read-only mapping from category to trigger phrases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Taxonomy {
    entries: Vec<TaxonomyEntry>,
}

impl Taxonomy {
    /// Builds a taxonomy from `(category name, phrases)` pairs.
    ///
    /// Rejects empty taxonomies, blank or duplicate category names, and
    /// blank phrases. Phrases are lower-cased; surrounding whitespace is kept
    /// because it is part of the substring being matched.
    pub fn new<C, P, S>(entries: impl IntoIterator<Item = (C, P)>) -> Result<Self>
    where
        C: AsRef<str>,
        P: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut built: Vec<TaxonomyEntry> = Vec::new();

        for (name, phrases) in entries {
            let name = name.as_ref();
            if name.trim().is_empty() {
                return Err(TaxonomyError::BlankCategory);
            }

            let category = Category::from_name(name);
            if built.iter().any(|e| e.category == category) {
                return Err(TaxonomyError::DuplicateCategory(category.name().to_string()));
            }

            let mut lowered = Vec::new();
            for phrase in phrases {
                let phrase = phrase.as_ref();
                if phrase.trim().is_empty() {
                    return Err(TaxonomyError::BlankPhrase(category.name().to_string()));
                }
                lowered.push(phrase.to_lowercase());
            }

            built.push(TaxonomyEntry {
                category,
                phrases: lowered,
            });
        }

        if built.is_empty() {
            return Err(TaxonomyError::Empty);
        }

        Ok(Self { entries: built })
    }

    /// Returns the built-in taxonomy used by the chat.
    pub fn builtin() -> Self {
        let entries = [
            (
                Category::Suicide,
                vec![
                    "kill myself",
                    "end my life",
                    "suicide",
                    "don't want to live",
                    "better off dead",
                ],
            ),
            (
                Category::SelfHarm,
                vec!["cut myself", "hurt myself", "self-harm", "harming myself"],
            ),
            (
                Category::Violence,
                vec!["hurt someone", "kill someone", "attack", "violent thoughts"],
            ),
            (
                Category::Abuse,
                vec!["being abused", "abusing me", "hit me", "hurting me"],
            ),
        ];

        Self {
            entries: entries
                .into_iter()
                .map(|(category, phrases)| TaxonomyEntry {
                    category,
                    phrases: phrases.into_iter().map(str::to_string).collect(),
                })
                .collect(),
        }
    }

    /// Parses a taxonomy from a JSON object of category to phrase list.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawEntries = serde_json::from_str(json)?;
        Self::new(raw.0)
    }

    /// Loads a taxonomy from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| TaxonomyError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let taxonomy = Self::from_json(&json)?;
        tracing::info!(
            path = %path.display(),
            categories = taxonomy.entries.len(),
            phrases = taxonomy.phrase_count(),
            "Loaded taxonomy"
        );
        Ok(taxonomy)
    }

    /// Returns the entries in iteration order.
    pub fn entries(&self) -> &[TaxonomyEntry] {
        &self.entries
    }

    /// Returns the categories in iteration order.
    pub fn categories(&self) -> impl Iterator<Item = &Category> {
        self.entries.iter().map(|e| &e.category)
    }

    /// Returns the phrases for a category, if present.
    pub fn phrases(&self, category: &Category) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|e| &e.category == category)
            .map(|e| e.phrases.as_slice())
    }

    /// Returns the total number of phrases across all categories.
    pub fn phrase_count(&self) -> usize {
        self.entries.iter().map(|e| e.phrases.len()).sum()
    }
}

impl Default for Taxonomy {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Serialize for Taxonomy {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for entry in &self.entries {
            map.serialize_entry(entry.category.name(), &entry.phrases)?;
        }
        map.end()
    }
}

/// Category entries in file order, repeated keys included.
struct RawEntries(Vec<(String, Vec<String>)>);

impl<'de> Deserialize<'de> for RawEntries {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = RawEntries;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object mapping category names to phrase lists")
            }

            fn visit_map<A>(self, mut map: A) -> std::result::Result<RawEntries, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry::<String, Vec<String>>()? {
                    entries.push(entry);
                }
                Ok(RawEntries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn builtin_has_four_categories_in_order() {
        let taxonomy = Taxonomy::builtin();
        let categories: Vec<_> = taxonomy.categories().cloned().collect();
        assert_eq!(categories, Category::builtin().to_vec());
        assert_eq!(taxonomy.phrase_count(), 17);
    }

    #[test]
    fn builtin_phrases_are_lowercase() {
        for entry in Taxonomy::builtin().entries() {
            for phrase in entry.phrases() {
                assert_eq!(phrase, &phrase.to_lowercase());
            }
        }
    }

    #[test]
    fn builtin_suicide_phrases() {
        let taxonomy = Taxonomy::builtin();
        let phrases = taxonomy.phrases(&Category::Suicide).unwrap();
        assert!(phrases.contains(&"don't want to live".to_string()));
        assert!(phrases.contains(&"end my life".to_string()));
    }

    #[test]
    fn new_lowercases_phrases() {
        let taxonomy = Taxonomy::new([("Grief", vec!["Lost EVERYTHING"])]).unwrap();
        let category = Category::Custom("Grief".to_string());
        assert_eq!(
            taxonomy.phrases(&category).unwrap(),
            &["lost everything".to_string()]
        );
    }

    #[test]
    fn new_rejects_empty() {
        let entries: Vec<(String, Vec<String>)> = Vec::new();
        assert!(matches!(Taxonomy::new(entries), Err(TaxonomyError::Empty)));
    }

    #[test]
    fn new_rejects_blank_category() {
        let result = Taxonomy::new([("  ", vec!["phrase"])]);
        assert!(matches!(result, Err(TaxonomyError::BlankCategory)));
    }

    #[test]
    fn new_rejects_blank_phrase() {
        let result = Taxonomy::new([("abuse", vec!["hit me", "   "])]);
        assert!(matches!(result, Err(TaxonomyError::BlankPhrase(c)) if c == "abuse"));
    }

    #[test]
    fn new_rejects_duplicate_category() {
        let result = Taxonomy::new([("abuse", vec!["hit me"]), ("Abuse", vec!["abusing me"])]);
        assert!(matches!(result, Err(TaxonomyError::DuplicateCategory(c)) if c == "abuse"));
    }

    #[test]
    fn from_json_preserves_order() {
        let taxonomy =
            Taxonomy::from_json(r#"{"violence": ["attack"], "suicide": ["suicide"]}"#).unwrap();
        let categories: Vec<_> = taxonomy.categories().cloned().collect();
        assert_eq!(categories, vec![Category::Violence, Category::Suicide]);
    }

    #[test]
    fn from_json_rejects_repeated_category() {
        let result = Taxonomy::from_json(r#"{"abuse": ["hit me"], "abuse": ["abusing me"]}"#);
        assert!(matches!(result, Err(TaxonomyError::DuplicateCategory(c)) if c == "abuse"));

        let result = Taxonomy::from_json(r#"{"self-harm": ["cut myself"], "self_harm": ["x"]}"#);
        assert!(matches!(result, Err(TaxonomyError::DuplicateCategory(c)) if c == "self-harm"));
    }

    #[test]
    fn from_json_rejects_non_object() {
        let result = Taxonomy::from_json(r#"[["abuse", ["hit me"]]]"#);
        assert!(matches!(result, Err(TaxonomyError::Json(_))));
    }

    #[test]
    fn from_json_rejects_non_list_values() {
        let result = Taxonomy::from_json(r#"{"violence": "attack"}"#);
        assert!(matches!(result, Err(TaxonomyError::Json(_))));
    }

    #[test]
    fn from_path_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"abuse": ["Hit Me"]}}"#).unwrap();

        let taxonomy = Taxonomy::from_path(file.path()).unwrap();
        assert_eq!(
            taxonomy.phrases(&Category::Abuse).unwrap(),
            &["hit me".to_string()]
        );
    }

    #[test]
    fn from_path_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = Taxonomy::from_path(dir.path().join("missing.json"));
        assert!(matches!(result, Err(TaxonomyError::Io { .. })));
    }

    #[test]
    fn serializes_as_object() {
        let taxonomy = Taxonomy::new([("abuse", vec!["hit me"])]).unwrap();
        let json = serde_json::to_string(&taxonomy).unwrap();
        assert_eq!(json, r#"{"abuse":["hit me"]}"#);
    }
}

//! Keyword-based emergency classifier.
//!
//! Lower-cases the message and checks it against every phrase in the
//! taxonomy. In the default [`MatchMode::Substring`] mode a phrase matches
//! anywhere it appears as a contiguous substring, with no tokenization,
//! stemming, or negation handling. This means "hitting me" does not match
//! "hit me" while "attacked" does match "attack".

use std::convert::Infallible;
use std::time::Instant;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::taxonomy::{Result, Taxonomy};
use super::{Category, Detection, PhraseMatch};

/// How phrases are matched against message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Case-insensitive contiguous substring match.
    #[default]
    Substring,
    /// Phrases must begin and end on word boundaries.
    WordBoundary,
}

/// Compiled matcher for one phrase.
enum PhraseMatcher {
    Substring(String),
    Pattern { phrase: String, regex: Regex },
}

impl PhraseMatcher {
    fn compile(phrase: &str, mode: MatchMode) -> Result<Self> {
        Ok(match mode {
            MatchMode::Substring => PhraseMatcher::Substring(phrase.to_string()),
            MatchMode::WordBoundary => PhraseMatcher::Pattern {
                phrase: phrase.to_string(),
                regex: Regex::new(&word_boundary_pattern(phrase))?,
            },
        })
    }

    fn phrase(&self) -> &str {
        match self {
            PhraseMatcher::Substring(phrase) => phrase,
            PhraseMatcher::Pattern { phrase, .. } => phrase,
        }
    }

    fn is_match(&self, text_lower: &str) -> bool {
        match self {
            PhraseMatcher::Substring(phrase) => text_lower.contains(phrase.as_str()),
            PhraseMatcher::Pattern { regex, .. } => regex.is_match(text_lower),
        }
    }
}

/// Matchers for every phrase of one category.
struct CategoryMatchers {
    category: Category,
    phrases: Vec<PhraseMatcher>,
}

/// Emergency text classifier.
///
/// Holds a read-only taxonomy and is safe to share across threads without
/// locking.
pub struct EmergencyClassifier {
    taxonomy: Taxonomy,
    mode: MatchMode,
    matchers: Vec<CategoryMatchers>,
}

impl EmergencyClassifier {
    /// Creates a classifier over the built-in taxonomy.
    pub fn new() -> Self {
        let taxonomy = Taxonomy::builtin();
        let matchers = match build_matchers(&taxonomy, |phrase| {
            Ok::<_, Infallible>(PhraseMatcher::Substring(phrase.to_string()))
        }) {
            Ok(matchers) => matchers,
            Err(never) => match never {},
        };

        Self {
            taxonomy,
            mode: MatchMode::Substring,
            matchers,
        }
    }

    /// Creates a classifier over a custom taxonomy with the given match mode.
    pub fn with_taxonomy(taxonomy: Taxonomy, mode: MatchMode) -> Result<Self> {
        let matchers = build_matchers(&taxonomy, |phrase| PhraseMatcher::compile(phrase, mode))?;

        tracing::debug!(
            categories = matchers.len(),
            phrases = taxonomy.phrase_count(),
            mode = ?mode,
            "Built emergency classifier"
        );

        Ok(Self {
            taxonomy,
            mode,
            matchers,
        })
    }

    /// Returns the taxonomy this classifier matches against.
    pub fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }

    /// Returns the match mode.
    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    /// Returns true if the text contains any taxonomy phrase.
    ///
    /// Stops at the first hit. Never fails; the empty string is not an
    /// emergency.
    pub fn is_emergency(&self, text: &str) -> bool {
        let text_lower = text.to_lowercase();
        self.matchers
            .iter()
            .any(|cat| cat.phrases.iter().any(|p| p.is_match(&text_lower)))
    }

    /// Classifies the text and reports the first matching phrase.
    pub fn detect(&self, text: &str) -> Detection {
        let start = Instant::now();
        let text_lower = text.to_lowercase();

        let hit = self.matchers.iter().find_map(|cat| {
            cat.phrases
                .iter()
                .find(|p| p.is_match(&text_lower))
                .map(|p| PhraseMatch::new(cat.category.clone(), p.phrase()))
        });

        let duration_us = start.elapsed().as_micros() as u64;

        match hit {
            Some(m) => {
                tracing::debug!(
                    category = %m.category,
                    phrase = %m.phrase,
                    duration_us,
                    "Emergency language detected"
                );
                Detection::with_matches(vec![m], duration_us)
            }
            None => Detection::clear(duration_us),
        }
    }

    /// Classifies the text and reports every matching phrase.
    pub fn detect_all(&self, text: &str) -> Detection {
        let start = Instant::now();
        let text_lower = text.to_lowercase();
        let text_lower = text_lower.as_str();

        let matches: Vec<PhraseMatch> = self
            .matchers
            .iter()
            .flat_map(|cat| {
                cat.phrases
                    .iter()
                    .filter(move |p| p.is_match(text_lower))
                    .map(move |p| PhraseMatch::new(cat.category.clone(), p.phrase()))
            })
            .collect();

        let duration_us = start.elapsed().as_micros() as u64;

        if matches.is_empty() {
            Detection::clear(duration_us)
        } else {
            Detection::with_matches(matches, duration_us)
        }
    }
}

impl Default for EmergencyClassifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds one matcher per phrase, keeping taxonomy order.
fn build_matchers<E>(
    taxonomy: &Taxonomy,
    mut compile: impl FnMut(&str) -> std::result::Result<PhraseMatcher, E>,
) -> std::result::Result<Vec<CategoryMatchers>, E> {
    taxonomy
        .entries()
        .iter()
        .map(|entry| -> std::result::Result<CategoryMatchers, E> {
            Ok(CategoryMatchers {
                category: entry.category().clone(),
                phrases: entry
                    .phrases()
                    .iter()
                    .map(|p| compile(p))
                    .collect::<std::result::Result<_, E>>()?,
            })
        })
        .collect()
}

/// Anchors a phrase on word boundaries where its edges are word characters.
fn word_boundary_pattern(phrase: &str) -> String {
    let is_word = |c: char| c.is_alphanumeric() || c == '_';
    let starts = phrase.chars().next().is_some_and(is_word);
    let ends = phrase.chars().last().is_some_and(is_word);

    format!(
        "{}{}{}",
        if starts { r"\b" } else { "" },
        regex::escape(phrase),
        if ends { r"\b" } else { "" }
    )
}

//! Emergency language detection for chat messages.
//!
//! The classifier answers one question for every user message: does the
//! text contain a phrase from the keyword taxonomy? The answer tags the
//! message as an emergency and switches the assistant to its
//! crisis-escalation reply.

mod category;
mod keyword;
mod taxonomy;

pub use category::{Category, Detection, PhraseMatch};
pub use keyword::{EmergencyClassifier, MatchMode};
pub use taxonomy::{Taxonomy, TaxonomyEntry, TaxonomyError};

//! Solace Core - Emergency detection, demo chat, and dashboard directory.
//!
//! This crate holds everything the Solace server and CLI build on:
//!
//! - [`classifier`]: keyword taxonomy and the emergency text classifier
//! - [`chat`]: messages, chats, and the demo assistant session
//! - [`directory`]: counselors, resources, emergency review, and stats
//!
//! ## Example
//!
//! ```
//! use solace_core::classifier::EmergencyClassifier;
//!
//! let classifier = EmergencyClassifier::new();
//! assert!(classifier.is_emergency("I don't want to live anymore."));
//! assert!(!classifier.is_emergency("I've been feeling really anxious lately."));
//! ```

pub mod chat;
pub mod classifier;
pub mod directory;

pub use chat::{Assistant, Chat, ChatError, ChatSession, Exchange, Message, Sender};
pub use classifier::{Category, Detection, EmergencyClassifier, MatchMode, Taxonomy};
pub use directory::{Directory, DirectoryError};

//! Application state for the API server.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use solace_core::{Assistant, Directory, EmergencyClassifier};

use crate::error::{ApiError, Result};
use crate::DEFAULT_MAX_CHATS;

/// Shared application state.
///
/// The directory owns every chat, demo chats included. Handlers that append
/// messages do so under a single directory write lock.
#[derive(Clone)]
pub struct AppState {
    /// Emergency classifier (read-only, no lock needed).
    pub classifier: Arc<EmergencyClassifier>,
    /// Demo assistant answering chats started through the API.
    pub assistant: Arc<Assistant>,
    /// Counselors, resources, and chats.
    pub directory: Arc<RwLock<Directory>>,
    /// Chats kept before idle demo chats are pruned.
    pub max_chats: usize,
    next_chat: Arc<AtomicU64>,
}

impl AppState {
    /// Creates state around a classifier with the sample directory.
    pub fn new(classifier: EmergencyClassifier) -> Self {
        let directory = Directory::with_sample_data(&classifier);
        Self::with_directory(classifier, directory)
    }

    /// Creates state with an explicit directory.
    pub fn with_directory(classifier: EmergencyClassifier, directory: Directory) -> Self {
        let classifier = Arc::new(classifier);
        Self {
            assistant: Arc::new(Assistant::new(classifier.clone())),
            classifier,
            directory: Arc::new(RwLock::new(directory)),
            max_chats: DEFAULT_MAX_CHATS,
            next_chat: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Replaces the demo assistant.
    pub fn with_assistant(mut self, assistant: Assistant) -> Self {
        self.assistant = Arc::new(assistant);
        self
    }

    /// Sets how many chats are kept before idle demo chats are pruned.
    pub fn with_max_chats(mut self, max_chats: usize) -> Self {
        self.max_chats = max_chats;
        self
    }

    /// Creates state with the built-in taxonomy and sample data.
    pub fn sample() -> Self {
        Self::new(EmergencyClassifier::new())
    }

    /// Returns a fresh demo chat id.
    pub fn next_chat_id(&self) -> String {
        format!("demo-{}", self.next_chat.fetch_add(1, Ordering::Relaxed))
    }

    /// Locks the directory for reading.
    pub fn directory(&self) -> Result<RwLockReadGuard<'_, Directory>> {
        self.directory
            .read()
            .map_err(|_| ApiError::Internal("directory lock poisoned".to_string()))
    }

    /// Locks the directory for writing.
    pub fn directory_mut(&self) -> Result<RwLockWriteGuard<'_, Directory>> {
        self.directory
            .write()
            .map_err(|_| ApiError::Internal("directory lock poisoned".to_string()))
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::sample()
    }
}

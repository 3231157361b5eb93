//! In-memory directory of counselors, resources, and chats.
//!
//! Backs the administration dashboard: counselor and resource management,
//! the emergency review queue, and the headline statistics.

mod models;
mod sample;

use thiserror::Error;
use tracing::info;

use crate::chat::Chat;
use crate::classifier::EmergencyClassifier;

pub use models::{
    Counselor, CounselorStatus, CounselorUpdate, DashboardStats, EmergencyCase, NewCounselor,
    NewResource, Resource, ResourceKind, ResourceUpdate,
};

/// Name shown for a chat with no counselor.
pub const UNASSIGNED: &str = "Unassigned";

/// Name shown when the assigned counselor no longer exists.
pub const UNKNOWN_COUNSELOR: &str = "Unknown Counselor";

/// Directory errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DirectoryError {
    /// No record with the given id.
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// A required field is missing or blank.
    #[error("invalid {kind}: {reason}")]
    Invalid { kind: &'static str, reason: String },
}

/// Result type for directory operations.
pub type Result<T> = std::result::Result<T, DirectoryError>;

/// In-memory store of dashboard records.
#[derive(Debug, Clone, Default)]
pub struct Directory {
    counselors: Vec<Counselor>,
    resources: Vec<Resource>,
    chats: Vec<Chat>,
    next_id: u64,
}

impl Directory {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self {
            next_id: 1,
            ..Self::default()
        }
    }

    /// Creates a directory seeded with sample counselors, resources, and chats.
    pub fn with_sample_data(classifier: &EmergencyClassifier) -> Self {
        Self {
            counselors: sample::counselors(),
            resources: sample::resources(),
            chats: sample::chats(classifier),
            next_id: 1,
        }
    }

    fn generate_id(&mut self, prefix: &str) -> String {
        let id = format!("{}-{}", prefix, self.next_id);
        self.next_id += 1;
        id
    }

    // === Counselors ===

    /// Returns all counselors in insertion order.
    pub fn counselors(&self) -> &[Counselor] {
        &self.counselors
    }

    /// Returns a counselor by id.
    pub fn counselor(&self, id: &str) -> Result<&Counselor> {
        self.counselors
            .iter()
            .find(|c| c.id == id)
            .ok_or_else(|| not_found("counselor", id))
    }

    /// Adds a counselor with a fresh id and a chat count of zero.
    pub fn add_counselor(&mut self, new: NewCounselor) -> Result<Counselor> {
        require("counselor", "name", &new.name)?;

        let counselor = Counselor {
            id: self.generate_id("counselor"),
            name: new.name,
            specialty: new.specialty,
            bio: new.bio,
            avatar_url: new.avatar_url,
            status: new.status,
            chat_count: 0,
        };
        info!(id = %counselor.id, name = %counselor.name, "Added counselor");
        self.counselors.push(counselor.clone());
        Ok(counselor)
    }

    /// Applies a partial update to a counselor.
    pub fn update_counselor(&mut self, id: &str, update: CounselorUpdate) -> Result<Counselor> {
        if let Some(ref name) = update.name {
            require("counselor", "name", name)?;
        }

        let counselor = self
            .counselors
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| not_found("counselor", id))?;

        if let Some(name) = update.name {
            counselor.name = name;
        }
        if let Some(specialty) = update.specialty {
            counselor.specialty = specialty;
        }
        if let Some(bio) = update.bio {
            counselor.bio = bio;
        }
        if let Some(avatar_url) = update.avatar_url {
            counselor.avatar_url = avatar_url;
        }
        if let Some(status) = update.status {
            counselor.status = status;
        }

        info!(id, "Updated counselor");
        Ok(counselor.clone())
    }

    /// Removes a counselor. Chats assigned to them keep the stale id.
    pub fn delete_counselor(&mut self, id: &str) -> Result<Counselor> {
        let index = self
            .counselors
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| not_found("counselor", id))?;
        info!(id, "Deleted counselor");
        Ok(self.counselors.remove(index))
    }

    /// Resolves the display name of a chat's counselor.
    pub fn counselor_name(&self, counselor_id: Option<&str>) -> String {
        match counselor_id {
            None => UNASSIGNED.to_string(),
            Some(id) => self
                .counselors
                .iter()
                .find(|c| c.id == id)
                .map(|c| c.name.clone())
                .unwrap_or_else(|| UNKNOWN_COUNSELOR.to_string()),
        }
    }

    // === Resources ===

    /// Returns all resources in insertion order.
    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    /// Returns a resource by id.
    pub fn resource(&self, id: &str) -> Result<&Resource> {
        self.resources
            .iter()
            .find(|r| r.id == id)
            .ok_or_else(|| not_found("resource", id))
    }

    /// Adds a resource with a fresh id.
    pub fn add_resource(&mut self, new: NewResource) -> Result<Resource> {
        require("resource", "title", &new.title)?;
        require("resource", "link", &new.link)?;

        let resource = Resource {
            id: self.generate_id("resource"),
            title: new.title,
            description: new.description,
            category: new.category,
            link: new.link,
            kind: new.kind,
        };
        info!(id = %resource.id, title = %resource.title, "Added resource");
        self.resources.push(resource.clone());
        Ok(resource)
    }

    /// Applies a partial update to a resource.
    pub fn update_resource(&mut self, id: &str, update: ResourceUpdate) -> Result<Resource> {
        if let Some(ref title) = update.title {
            require("resource", "title", title)?;
        }
        if let Some(ref link) = update.link {
            require("resource", "link", link)?;
        }

        let resource = self
            .resources
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| not_found("resource", id))?;

        if let Some(title) = update.title {
            resource.title = title;
        }
        if let Some(description) = update.description {
            resource.description = description;
        }
        if let Some(category) = update.category {
            resource.category = category;
        }
        if let Some(link) = update.link {
            resource.link = link;
        }
        if let Some(kind) = update.kind {
            resource.kind = kind;
        }

        info!(id, "Updated resource");
        Ok(resource.clone())
    }

    /// Removes a resource.
    pub fn delete_resource(&mut self, id: &str) -> Result<Resource> {
        let index = self
            .resources
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| not_found("resource", id))?;
        info!(id, "Deleted resource");
        Ok(self.resources.remove(index))
    }

    // === Chats ===

    /// Returns all chats in insertion order.
    pub fn chats(&self) -> &[Chat] {
        &self.chats
    }

    /// Returns a chat by id.
    pub fn chat(&self, id: &str) -> Result<&Chat> {
        self.chats
            .iter()
            .find(|c| c.id == id)
            .ok_or_else(|| not_found("chat", id))
    }

    /// Stores a chat, replacing any earlier copy with the same id.
    pub fn record_chat(&mut self, chat: Chat) {
        match self.chats.iter_mut().find(|c| c.id == chat.id) {
            Some(existing) => *existing = chat,
            None => self.chats.push(chat),
        }
    }

    /// Returns a chat by id for appending messages.
    pub fn chat_mut(&mut self, id: &str) -> Result<&mut Chat> {
        self.chats
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| not_found("chat", id))
    }

    /// Removes a chat. Emergency chats stay on record for follow-up.
    pub fn close_chat(&mut self, id: &str) -> Result<Chat> {
        let index = self
            .chats
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| not_found("chat", id))?;
        if self.chats[index].is_emergency() {
            return Err(DirectoryError::Invalid {
                kind: "chat",
                reason: "emergency chats cannot be closed".to_string(),
            });
        }
        info!(chat_id = %id, "Closed chat");
        Ok(self.chats.remove(index))
    }

    /// Drops the oldest unassigned, unflagged chats until at most `max`
    /// remain, never touching `keep`. Returns how many were dropped.
    ///
    /// Emergency chats and chats with a counselor are never dropped, so the
    /// count can stay above `max`.
    pub fn prune_chats(&mut self, max: usize, keep: &str) -> usize {
        let mut excess = self.chats.len().saturating_sub(max);
        if excess == 0 {
            return 0;
        }

        let before = self.chats.len();
        self.chats.retain(|c| {
            let evictable = c.id != keep && c.counselor_id.is_none() && !c.is_emergency();
            if evictable && excess > 0 {
                excess -= 1;
                false
            } else {
                true
            }
        });

        let dropped = before - self.chats.len();
        if dropped > 0 {
            info!(dropped, remaining = self.chats.len(), "Pruned idle chats");
        }
        dropped
    }

    /// Returns the chats that contain at least one flagged message.
    pub fn emergency_chats(&self) -> impl Iterator<Item = &Chat> {
        self.chats.iter().filter(|c| c.is_emergency())
    }

    /// Returns the emergency chats prepared for review.
    pub fn emergency_cases(&self) -> Vec<EmergencyCase> {
        self.emergency_chats()
            .map(|chat| EmergencyCase::new(chat, self.counselor_name(chat.counselor_id.as_deref())))
            .collect()
    }

    /// Returns the dashboard counts.
    pub fn stats(&self) -> DashboardStats {
        DashboardStats {
            counselor_count: self.counselors.len(),
            active_counselor_count: self
                .counselors
                .iter()
                .filter(|c| c.status == CounselorStatus::Active)
                .count(),
            resource_count: self.resources.len(),
            chat_count: self.chats.len(),
            message_count: self.chats.iter().map(|c| c.messages().len()).sum(),
            emergency_count: self.emergency_chats().count(),
        }
    }
}

fn not_found(kind: &'static str, id: &str) -> DirectoryError {
    DirectoryError::NotFound {
        kind,
        id: id.to_string(),
    }
}

fn require(kind: &'static str, field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(DirectoryError::Invalid {
            kind,
            reason: format!("{} is required", field),
        });
    }
    Ok(())
}

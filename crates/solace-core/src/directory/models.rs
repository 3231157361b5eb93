//! Directory records: counselors, resources, and dashboard summaries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::chat::{Chat, Message};

/// Whether a counselor is taking chats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CounselorStatus {
    /// Available for chats.
    #[default]
    Active,
    /// Not currently taking chats.
    Inactive,
}

/// A counselor profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counselor {
    pub id: String,
    pub name: String,
    pub specialty: String,
    pub bio: String,
    pub avatar_url: String,
    pub status: CounselorStatus,
    /// Number of chats handled so far.
    pub chat_count: u32,
}

/// Fields for adding a counselor. Id and chat count are assigned.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewCounselor {
    pub name: String,
    #[serde(default)]
    pub specialty: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub avatar_url: String,
    #[serde(default)]
    pub status: CounselorStatus,
}

/// Partial counselor update. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CounselorUpdate {
    pub name: Option<String>,
    pub specialty: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub status: Option<CounselorStatus>,
}

/// Media type of a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    #[default]
    Article,
    Video,
    Audio,
    Pdf,
}

/// A self-help resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub link: String,
    #[serde(rename = "type")]
    pub kind: ResourceKind,
}

/// Fields for adding a resource. The id is assigned.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewResource {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    pub link: String,
    #[serde(rename = "type", default)]
    pub kind: ResourceKind,
}

/// Partial resource update. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResourceUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub link: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<ResourceKind>,
}

/// A flagged chat prepared for review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmergencyCase {
    pub chat_id: String,
    /// Short case label, e.g. `Case #2`.
    pub label: String,
    pub counselor_name: String,
    pub created_at: DateTime<Utc>,
    /// Only the messages that were flagged.
    pub flagged_messages: Vec<Message>,
}

impl EmergencyCase {
    pub(crate) fn new(chat: &Chat, counselor_name: String) -> Self {
        let short_id: String = chat.id.chars().take(5).collect();
        Self {
            chat_id: chat.id.clone(),
            label: format!("Case #{}", short_id),
            counselor_name,
            created_at: chat.created_at,
            flagged_messages: chat.flagged_messages().cloned().collect(),
        }
    }
}

/// Counts shown on the dashboard home page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub counselor_count: usize,
    pub active_counselor_count: usize,
    pub resource_count: usize,
    pub chat_count: usize,
    pub message_count: usize,
    pub emergency_count: usize,
}

//! API request and response models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use solace_core::classifier::{Category, MatchMode, PhraseMatch, Taxonomy};
use solace_core::directory::{DashboardStats, EmergencyCase};
use solace_core::{Chat, Detection, Message};

/// Request body for POST /api/classify.
#[derive(Debug, Deserialize)]
pub struct ClassifyRequest {
    /// The text to classify, taken verbatim.
    pub text: String,
}

/// Response body for POST /api/classify.
#[derive(Debug, Serialize)]
pub struct ClassifyResponse {
    pub is_emergency: bool,
    /// Category of the first match in taxonomy order.
    pub category: Option<Category>,
    /// Phrase of the first match in taxonomy order.
    pub phrase: Option<String>,
    /// Every matching phrase.
    pub matches: Vec<PhraseMatch>,
    pub latency_us: u64,
}

impl From<Detection> for ClassifyResponse {
    fn from(detection: Detection) -> Self {
        let primary = detection.primary().cloned();
        Self {
            is_emergency: detection.is_emergency,
            category: primary.as_ref().map(|m| m.category.clone()),
            phrase: primary.map(|m| m.phrase),
            matches: detection.matches,
            latency_us: detection.duration_us,
        }
    }
}

/// One category in GET /api/taxonomy.
#[derive(Debug, Serialize)]
pub struct TaxonomyCategory {
    pub category: Category,
    pub phrases: Vec<String>,
}

/// Response body for GET /api/taxonomy.
#[derive(Debug, Serialize)]
pub struct TaxonomyResponse {
    pub mode: MatchMode,
    pub categories: Vec<TaxonomyCategory>,
}

impl TaxonomyResponse {
    pub fn new(taxonomy: &Taxonomy, mode: MatchMode) -> Self {
        Self {
            mode,
            categories: taxonomy
                .entries()
                .iter()
                .map(|e| TaxonomyCategory {
                    category: e.category().clone(),
                    phrases: e.phrases().to_vec(),
                })
                .collect(),
        }
    }
}

/// Request body for POST /api/chats.
#[derive(Debug, Default, Deserialize)]
pub struct StartChatRequest {
    /// Who is chatting (default: "anonymous").
    pub user_id: Option<String>,
}

/// Request body for POST /api/chats/{id}/messages.
#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub text: String,
}

/// A chat with its derived emergency flag.
#[derive(Debug, Serialize)]
pub struct ChatView {
    pub id: String,
    pub user_id: String,
    pub counselor_id: Option<String>,
    pub is_emergency: bool,
    pub messages: Vec<Message>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Chat> for ChatView {
    fn from(chat: &Chat) -> Self {
        Self {
            id: chat.id.clone(),
            user_id: chat.user_id.clone(),
            counselor_id: chat.counselor_id.clone(),
            is_emergency: chat.is_emergency(),
            messages: chat.messages().to_vec(),
            created_at: chat.created_at,
            updated_at: chat.updated_at,
        }
    }
}

/// Response body for GET /api/chats.
#[derive(Debug, Serialize)]
pub struct ChatsResponse {
    pub chats: Vec<ChatView>,
    pub total: usize,
}

/// Response body for POST /api/chats/{id}/messages.
#[derive(Debug, Serialize)]
pub struct SendMessageResponse {
    pub user_message: Message,
    pub reply: Message,
    pub detection: ClassifyResponse,
    /// Whether the chat as a whole is now an emergency.
    pub chat_is_emergency: bool,
}

/// Response body for GET /api/chats/emergency.
#[derive(Debug, Serialize)]
pub struct EmergencyResponse {
    pub cases: Vec<EmergencyCase>,
    pub total: usize,
}

/// Response body for GET /api/stats.
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    #[serde(flatten)]
    pub stats: DashboardStats,
}

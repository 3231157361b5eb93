//! Chat messages, chats, and the demo assistant session.
//!
//! Every user message is classified once, when it is created. The emergency
//! flag is stored on the message and has no setter, so a flagged message
//! stays flagged. A chat is an emergency when any of its messages is.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::classifier::{Detection, EmergencyClassifier};

/// Greeting the assistant opens every demo chat with.
pub const WELCOME_MESSAGE: &str =
    "Hello! I'm your AI therapy assistant. How are you feeling today?";

/// Reply sent instead of a supportive line when a message is flagged.
pub const CRISIS_REPLY: &str = "I notice you may be going through a crisis. Remember, you're not alone. Would you like me to connect you with a human counselor immediately?";

/// Supportive replies the assistant picks from for ordinary messages.
pub const SUPPORTIVE_REPLIES: [&str; 9] = [
    "I understand you're going through a difficult time. Could you tell me more about what you're experiencing?",
    "Thank you for sharing that with me. It takes courage to talk about these things.",
    "It sounds like you're feeling overwhelmed. Let's explore some coping strategies that might help.",
    "Your feelings are valid. Many people go through similar experiences.",
    "Have you tried deep breathing exercises when you feel anxious? It can help calm your nervous system.",
    "Remember that healing is not linear. Some days will be better than others, and that's okay.",
    "Would it help to talk about what triggered these feelings?",
    "Self-care is important. What activities bring you joy or peace?",
    "I'm here to support you through this journey. You don't have to face this alone.",
];

/// Chat errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChatError {
    /// The submitted text is empty or whitespace.
    #[error("message is empty")]
    EmptyMessage,
}

/// Result type for chat operations.
pub type Result<T> = std::result::Result<T, ChatError>;

/// Who wrote a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    /// The person seeking support.
    User,
    /// A human counselor.
    Counselor,
    /// The demo assistant.
    Ai,
}

/// A single chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    id: String,
    content: String,
    sender: Sender,
    timestamp: DateTime<Utc>,
    #[serde(default)]
    is_emergency: bool,
}

impl Message {
    /// Creates a user message carrying the classifier's verdict.
    pub fn from_user(id: impl Into<String>, content: impl Into<String>, is_emergency: bool) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            sender: Sender::User,
            timestamp: Utc::now(),
            is_emergency,
        }
    }

    /// Creates a counselor message.
    pub fn from_counselor(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self::unflagged(id, content, Sender::Counselor)
    }

    /// Creates an assistant message.
    pub fn from_ai(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self::unflagged(id, content, Sender::Ai)
    }

    fn unflagged(id: impl Into<String>, content: impl Into<String>, sender: Sender) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            sender,
            timestamp: Utc::now(),
            is_emergency: false,
        }
    }

    /// Sets the creation timestamp.
    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Returns the message id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the message text exactly as submitted.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Returns the sender.
    pub fn sender(&self) -> Sender {
        self.sender
    }

    /// Returns the creation timestamp.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Returns true if the message was flagged when created.
    pub fn is_emergency(&self) -> bool {
        self.is_emergency
    }
}

/// An ordered conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chat {
    /// Chat id.
    pub id: String,
    /// Id of the person seeking support.
    pub user_id: String,
    /// Assigned counselor, if any.
    pub counselor_id: Option<String>,
    messages: Vec<Message>,
    /// When the chat started.
    pub created_at: DateTime<Utc>,
    /// Timestamp of the latest message.
    pub updated_at: DateTime<Utc>,
}

impl Chat {
    /// Creates an empty chat.
    pub fn new(
        id: impl Into<String>,
        user_id: impl Into<String>,
        counselor_id: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            user_id: user_id.into(),
            counselor_id,
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Sets the creation timestamp.
    pub fn created(mut self, timestamp: DateTime<Utc>) -> Self {
        self.created_at = timestamp;
        self.updated_at = timestamp;
        self
    }

    /// Appends a message.
    pub fn push(&mut self, message: Message) {
        if message.timestamp > self.updated_at {
            self.updated_at = message.timestamp;
        }
        self.messages.push(message);
    }

    /// Builder form of [`Chat::push`].
    pub fn with_message(mut self, message: Message) -> Self {
        self.push(message);
        self
    }

    /// Returns the messages in order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Returns true if any message is flagged.
    pub fn is_emergency(&self) -> bool {
        self.messages.iter().any(Message::is_emergency)
    }

    /// Returns the flagged messages in order.
    pub fn flagged_messages(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter().filter(|m| m.is_emergency())
    }
}

/// Chooses which supportive reply to send.
pub trait ReplyPicker: Send + Sync {
    /// Returns an index in `0..len`. `len` is never zero.
    fn pick(&self, len: usize) -> usize;
}

/// Uniformly random reply selection.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomPicker;

impl ReplyPicker for RandomPicker {
    fn pick(&self, len: usize) -> usize {
        rand::thread_rng().gen_range(0..len)
    }
}

/// Always picks the same reply; wraps around if out of range.
#[derive(Debug, Clone, Copy)]
pub struct FixedPicker(pub usize);

impl ReplyPicker for FixedPicker {
    fn pick(&self, len: usize) -> usize {
        self.0 % len
    }
}

/// One round trip through the assistant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange {
    /// The stored user message.
    pub user_message: Message,
    /// The assistant's reply.
    pub reply: Message,
    /// Why the user message was or was not flagged.
    pub detection: Detection,
}

/// The demo assistant: classifies user text and picks the reply.
///
/// Holds no conversation state, so one assistant can answer any number of
/// chats. The chat itself is owned by the caller.
pub struct Assistant {
    classifier: Arc<EmergencyClassifier>,
    picker: Box<dyn ReplyPicker>,
}

impl Assistant {
    /// Creates an assistant with uniformly random supportive replies.
    pub fn new(classifier: Arc<EmergencyClassifier>) -> Self {
        Self {
            classifier,
            picker: Box::new(RandomPicker),
        }
    }

    /// Replaces the supportive reply picker.
    pub fn with_picker(mut self, picker: impl ReplyPicker + 'static) -> Self {
        self.picker = Box::new(picker);
        self
    }

    /// Opens a chat with the welcome message.
    pub fn open(&self, id: impl Into<String>, user_id: impl Into<String>) -> Chat {
        let id = id.into();
        let welcome = Message::from_ai(format!("{}-welcome", id), WELCOME_MESSAGE);
        Chat::new(id, user_id, None).with_message(welcome)
    }

    /// Appends the user text and the assistant's reply to `chat`.
    ///
    /// The text is stored verbatim. Blank input is rejected and leaves the
    /// chat untouched.
    pub fn respond(&self, chat: &mut Chat, text: &str) -> Result<Exchange> {
        if text.trim().is_empty() {
            return Err(ChatError::EmptyMessage);
        }

        let seq = chat.messages.iter().filter(|m| m.sender == Sender::User).count() + 1;

        let detection = self.classifier.detect_all(text);
        let user_message = Message::from_user(
            format!("{}-user-{}", chat.id, seq),
            text,
            detection.is_emergency,
        );
        chat.push(user_message.clone());

        let reply = if detection.is_emergency {
            tracing::warn!(
                chat_id = %chat.id,
                category = ?detection.primary().map(|m| m.category.name()),
                "Emergency message received, escalating"
            );
            Message::from_ai(format!("{}-emergency-{}", chat.id, seq), CRISIS_REPLY)
        } else {
            let index = self.picker.pick(SUPPORTIVE_REPLIES.len());
            Message::from_ai(
                format!("{}-ai-{}", chat.id, seq),
                SUPPORTIVE_REPLIES[index % SUPPORTIVE_REPLIES.len()],
            )
        };
        chat.push(reply.clone());

        tracing::debug!(
            chat_id = %chat.id,
            messages = chat.messages.len(),
            is_emergency = detection.is_emergency,
            "Chat exchange complete"
        );

        Ok(Exchange {
            user_message,
            reply,
            detection,
        })
    }
}

/// A single chat together with the assistant answering it.
pub struct ChatSession {
    chat: Chat,
    assistant: Assistant,
}

impl ChatSession {
    /// Starts a session with the assistant's welcome message.
    pub fn new(
        id: impl Into<String>,
        user_id: impl Into<String>,
        classifier: Arc<EmergencyClassifier>,
    ) -> Self {
        let assistant = Assistant::new(classifier);
        let chat = assistant.open(id, user_id);
        Self { chat, assistant }
    }

    /// Replaces the supportive reply picker.
    pub fn with_picker(mut self, picker: impl ReplyPicker + 'static) -> Self {
        self.assistant = self.assistant.with_picker(picker);
        self
    }

    /// Returns the conversation so far.
    pub fn chat(&self) -> &Chat {
        &self.chat
    }

    /// Ends the session and returns the conversation.
    pub fn into_chat(self) -> Chat {
        self.chat
    }

    /// Submits user text and appends the assistant's reply.
    pub fn submit(&mut self, text: &str) -> Result<Exchange> {
        self.assistant.respond(&mut self.chat, text)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn session() -> ChatSession {
        ChatSession::new("demo", "user1", Arc::new(EmergencyClassifier::new()))
            .with_picker(FixedPicker(3))
    }

    #[test]
    fn session_starts_with_welcome() {
        let session = session();
        let messages = session.chat().messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].sender(), Sender::Ai);
        assert_eq!(messages[0].content(), WELCOME_MESSAGE);
        assert!(!session.chat().is_emergency());
    }

    #[test]
    fn ordinary_message_gets_supportive_reply() {
        let mut session = session();
        let exchange = session
            .submit("I've been feeling really anxious lately.")
            .unwrap();

        assert!(!exchange.user_message.is_emergency());
        assert_eq!(exchange.reply.sender(), Sender::Ai);
        assert_eq!(exchange.reply.content(), SUPPORTIVE_REPLIES[3]);
        assert_eq!(session.chat().messages().len(), 3);
        assert!(!session.chat().is_emergency());
    }

    #[test]
    fn emergency_message_gets_crisis_reply() {
        let mut session = session();
        let exchange = session.submit("I don't want to live anymore.").unwrap();

        assert!(exchange.user_message.is_emergency());
        assert!(exchange.detection.is_emergency);
        assert_eq!(exchange.reply.content(), CRISIS_REPLY);
        assert!(!exchange.reply.is_emergency());
        assert!(session.chat().is_emergency());
    }

    #[test]
    fn chat_stays_emergency_after_calm_messages() {
        let mut session = session();
        session.submit("I want to end my life").unwrap();
        session.submit("Thanks, I feel a bit calmer now").unwrap();
        session.submit("Let's talk tomorrow").unwrap();

        assert!(session.chat().is_emergency());
        assert_eq!(session.chat().flagged_messages().count(), 1);
    }

    #[test]
    fn blank_message_is_rejected() {
        let mut session = session();
        assert_eq!(session.submit(""), Err(ChatError::EmptyMessage));
        assert_eq!(session.submit("   \n\t"), Err(ChatError::EmptyMessage));
        assert_eq!(session.chat().messages().len(), 1);
    }

    #[test]
    fn user_text_is_stored_verbatim() {
        let mut session = session();
        let exchange = session.submit("  Hello there  ").unwrap();
        assert_eq!(exchange.user_message.content(), "  Hello there  ");
    }

    #[test]
    fn message_ids_are_unique() {
        let mut session = session();
        session.submit("one").unwrap();
        session.submit("two").unwrap();
        let mut ids: Vec<_> = session.chat().messages().iter().map(Message::id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 5);
    }

    #[test]
    fn detection_lists_every_match() {
        let mut session = session();
        let exchange = session.submit("I want to kill myself, I cut myself").unwrap();
        let phrases: Vec<_> = exchange
            .detection
            .matches
            .iter()
            .map(|m| m.phrase.as_str())
            .collect();
        assert_eq!(phrases, vec!["kill myself", "cut myself"]);
    }

    #[test]
    fn assistant_answers_many_chats() {
        let assistant =
            Assistant::new(Arc::new(EmergencyClassifier::new())).with_picker(FixedPicker(0));
        let mut first = assistant.open("a", "user1");
        let mut second = assistant.open("b", "user2");

        assistant.respond(&mut first, "hello").unwrap();
        assistant.respond(&mut second, "I want to end my life").unwrap();
        let exchange = assistant.respond(&mut first, "still here").unwrap();

        assert_eq!(exchange.user_message.id(), "a-user-2");
        assert_eq!(first.messages().len(), 5);
        assert!(!first.is_emergency());
        assert!(second.is_emergency());
        assert_eq!(second.messages()[2].content(), CRISIS_REPLY);
    }

    #[test]
    fn random_picker_stays_in_range() {
        let picker = RandomPicker;
        for _ in 0..100 {
            assert!(picker.pick(SUPPORTIVE_REPLIES.len()) < SUPPORTIVE_REPLIES.len());
        }
    }

    #[test]
    fn fixed_picker_wraps() {
        assert_eq!(FixedPicker(11).pick(9), 2);
    }

    #[test]
    fn chat_updated_at_follows_latest_message() {
        let start = Utc.with_ymd_and_hms(2023, 6, 16, 9, 15, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2023, 6, 16, 9, 16, 0).unwrap();
        let chat = Chat::new("2", "user2", Some("2".to_string()))
            .created(start)
            .with_message(Message::from_user("m3", "help", false).at(start))
            .with_message(Message::from_counselor("m4", "I'm here").at(later));

        assert_eq!(chat.created_at, start);
        assert_eq!(chat.updated_at, later);
    }

    #[test]
    fn message_flag_survives_serialization() {
        let message = Message::from_user("m1", "I want to kill myself", true);
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["is_emergency"], true);
        assert_eq!(json["sender"], "user");

        let parsed: Message = serde_json::from_value(json).unwrap();
        assert!(parsed.is_emergency());
    }
}

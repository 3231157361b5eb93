//! Sample records the directory is seeded with.

use chrono::{DateTime, TimeZone, Utc};

use super::models::{Counselor, CounselorStatus, Resource, ResourceKind};
use crate::chat::{Chat, Message};
use crate::classifier::EmergencyClassifier;

pub(super) fn counselors() -> Vec<Counselor> {
    vec![
        Counselor {
            id: "1".to_string(),
            name: "Dr. Sarah Johnson".to_string(),
            specialty: "Anxiety & Depression".to_string(),
            bio: "Licensed therapist with 15 years of experience in cognitive behavioral therapy."
                .to_string(),
            avatar_url: "https://randomuser.me/api/portraits/women/44.jpg".to_string(),
            status: CounselorStatus::Active,
            chat_count: 24,
        },
        Counselor {
            id: "2".to_string(),
            name: "Dr. Michael Chen".to_string(),
            specialty: "Trauma Recovery".to_string(),
            bio: "Specializes in PTSD and trauma recovery with a focus on mindfulness techniques."
                .to_string(),
            avatar_url: "https://randomuser.me/api/portraits/men/46.jpg".to_string(),
            status: CounselorStatus::Active,
            chat_count: 18,
        },
        Counselor {
            id: "3".to_string(),
            name: "Lisa Patel, LCSW".to_string(),
            specialty: "Family Therapy".to_string(),
            bio: "Family therapist helping improve communication and resolve conflicts."
                .to_string(),
            avatar_url: "https://randomuser.me/api/portraits/women/65.jpg".to_string(),
            status: CounselorStatus::Inactive,
            chat_count: 12,
        },
    ]
}

pub(super) fn resources() -> Vec<Resource> {
    vec![
        Resource {
            id: "1".to_string(),
            title: "Understanding Anxiety".to_string(),
            description: "A comprehensive guide to identifying and managing anxiety symptoms."
                .to_string(),
            category: "Mental Health".to_string(),
            link: "https://example.com/anxiety-guide".to_string(),
            kind: ResourceKind::Article,
        },
        Resource {
            id: "2".to_string(),
            title: "Mindfulness Meditation".to_string(),
            description: "10-minute guided meditation for stress reduction.".to_string(),
            category: "Wellness".to_string(),
            link: "https://example.com/mindfulness".to_string(),
            kind: ResourceKind::Audio,
        },
        Resource {
            id: "3".to_string(),
            title: "Coping with Depression".to_string(),
            description: "Evidence-based strategies for managing depression symptoms.".to_string(),
            category: "Mental Health".to_string(),
            link: "https://example.com/depression-coping".to_string(),
            kind: ResourceKind::Pdf,
        },
    ]
}

/// Sample chats. User messages are classified as they are created.
pub(super) fn chats(classifier: &EmergencyClassifier) -> Vec<Chat> {
    let user = |id: &str, text: &str, at: DateTime<Utc>| {
        Message::from_user(id, text, classifier.is_emergency(text)).at(at)
    };

    let first = ts(2023, 6, 15, 14, 30);
    let second = ts(2023, 6, 16, 9, 15);

    vec![
        Chat::new("1", "user1", Some("1".to_string()))
            .created(first)
            .with_message(user("m1", "I've been feeling really anxious lately.", first))
            .with_message(
                Message::from_counselor(
                    "m2",
                    "I'm sorry to hear that. Could you tell me more about when you notice this anxiety?",
                )
                .at(ts(2023, 6, 15, 14, 32)),
            ),
        Chat::new("2", "user2", Some("2".to_string()))
            .created(second)
            .with_message(user(
                "m3",
                "I don't know if I can continue like this. I don't want to live anymore.",
                second,
            ))
            .with_message(
                Message::from_counselor(
                    "m4",
                    "I'm very concerned about what you're sharing. Your life matters and I want to help. Can we talk about what's going on right now?",
                )
                .at(ts(2023, 6, 16, 9, 16)),
            ),
    ]
}

fn ts(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0)
        .single()
        .unwrap_or_default()
}

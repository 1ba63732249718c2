//! HTTP API request/response DTOs.

use chrono::{DateTime, Utc};
use leasewire_shared::event::{
    ConversationCreatedPayload, MessageDeletedPayload, MessageReadPayload, NewMessagePayload,
    NotificationPayload, TypingPayload,
};
use serde::{Deserialize, Serialize};

/// Body of `POST /internal/push`, one variant per push API operation.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum PushRequest {
    NewMessage {
        payload: NewMessagePayload,
    },
    MessageRead {
        payload: MessageReadPayload,
    },
    MessageDeleted {
        payload: MessageDeletedPayload,
    },
    Typing {
        payload: TypingPayload,
    },
    ConversationCreated {
        participant_ids: Vec<String>,
        payload: ConversationCreatedPayload,
    },
    Notification {
        user_id: String,
        payload: NotificationPayload,
    },
    ConversationUpdated {
        participant_ids: Vec<String>,
        conversation_id: String,
        last_message_at: DateTime<Utc>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushResponse {
    /// Number of live connections the event was enqueued for
    pub delivered: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsDto {
    pub active_connections: usize,
    /// Conversation rooms and mailboxes with at least one member
    pub active_rooms: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDto {
    pub error: String,
}

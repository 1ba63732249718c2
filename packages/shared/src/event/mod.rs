//! Event contract between connection endpoints and the messaging server.
//!
//! Every frame is a JSON text message of the form
//! `{"event": "<name>", "data": {...}}`. The set of names is closed: a frame
//! whose name is not listed here, or whose payload is missing a required
//! field, is rejected by [`ClientEvent::decode`] / [`ServerEvent::decode`].

mod error;
mod payload;

use serde::{Deserialize, Serialize};

pub use error::ContractError;
pub use payload::{
    ContentType, ConversationCreatedPayload, ConversationRef, ConversationType,
    ConversationUpdatedPayload, MessageDeletedPayload, MessageReadPayload, NewMessagePayload,
    NotificationPayload, NotificationType, ParticipantSummary, ReadReceiptRequest, TypingPayload,
    UserRef, Validate,
};

/// Events pushed from the server to connected clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerEvent {
    #[serde(rename = "message:new")]
    MessageNew(NewMessagePayload),
    #[serde(rename = "message:read")]
    MessageRead(MessageReadPayload),
    #[serde(rename = "message:deleted")]
    MessageDeleted(MessageDeletedPayload),
    #[serde(rename = "typing:start")]
    TypingStart(TypingPayload),
    #[serde(rename = "typing:stop")]
    TypingStop(TypingPayload),
    #[serde(rename = "conversation:created")]
    ConversationCreated(ConversationCreatedPayload),
    #[serde(rename = "conversation:updated")]
    ConversationUpdated(ConversationUpdatedPayload),
    #[serde(rename = "notification")]
    Notification(NotificationPayload),
}

impl ServerEvent {
    pub fn event_name(&self) -> &'static str {
        match self {
            ServerEvent::MessageNew(_) => "message:new",
            ServerEvent::MessageRead(_) => "message:read",
            ServerEvent::MessageDeleted(_) => "message:deleted",
            ServerEvent::TypingStart(_) => "typing:start",
            ServerEvent::TypingStop(_) => "typing:stop",
            ServerEvent::ConversationCreated(_) => "conversation:created",
            ServerEvent::ConversationUpdated(_) => "conversation:updated",
            ServerEvent::Notification(_) => "notification",
        }
    }

    /// Parse and validate a text frame received from the server.
    pub fn decode(text: &str) -> Result<Self, ContractError> {
        let event: ServerEvent = serde_json::from_str(text)?;
        event.validate()?;
        Ok(event)
    }

    pub fn encode(&self) -> Result<String, ContractError> {
        Ok(serde_json::to_string(self)?)
    }
}

impl Validate for ServerEvent {
    fn validate(&self) -> Result<(), ContractError> {
        match self {
            ServerEvent::MessageNew(p) => p.validate(),
            ServerEvent::MessageRead(p) => p.validate(),
            ServerEvent::MessageDeleted(p) => p.validate(),
            ServerEvent::TypingStart(p) | ServerEvent::TypingStop(p) => p.validate(),
            ServerEvent::ConversationCreated(p) => p.validate(),
            ServerEvent::ConversationUpdated(p) => p.validate(),
            ServerEvent::Notification(p) => p.validate(),
        }
    }
}

/// Events sent from a client to the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ClientEvent {
    #[serde(rename = "join:conversation")]
    JoinConversation(ConversationRef),
    #[serde(rename = "leave:conversation")]
    LeaveConversation(ConversationRef),
    /// Mailbox join; the server performs it automatically at admission
    #[serde(rename = "join:user")]
    JoinUser(UserRef),
    #[serde(rename = "typing:start")]
    TypingStart(ConversationRef),
    #[serde(rename = "typing:stop")]
    TypingStop(ConversationRef),
    #[serde(rename = "message:read")]
    MessageRead(ReadReceiptRequest),
}

impl ClientEvent {
    pub fn event_name(&self) -> &'static str {
        match self {
            ClientEvent::JoinConversation(_) => "join:conversation",
            ClientEvent::LeaveConversation(_) => "leave:conversation",
            ClientEvent::JoinUser(_) => "join:user",
            ClientEvent::TypingStart(_) => "typing:start",
            ClientEvent::TypingStop(_) => "typing:stop",
            ClientEvent::MessageRead(_) => "message:read",
        }
    }

    /// Parse and validate a text frame received from a client.
    pub fn decode(text: &str) -> Result<Self, ContractError> {
        let event: ClientEvent = serde_json::from_str(text)?;
        event.validate()?;
        Ok(event)
    }

    pub fn encode(&self) -> Result<String, ContractError> {
        Ok(serde_json::to_string(self)?)
    }
}

impl Validate for ClientEvent {
    fn validate(&self) -> Result<(), ContractError> {
        match self {
            ClientEvent::JoinConversation(r)
            | ClientEvent::LeaveConversation(r)
            | ClientEvent::TypingStart(r)
            | ClientEvent::TypingStop(r) => r.validate(),
            ClientEvent::JoinUser(r) => r.validate(),
            ClientEvent::MessageRead(r) => r.validate(),
        }
    }
}

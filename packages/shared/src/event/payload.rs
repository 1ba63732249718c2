//! Payload shapes for every event of the contract.
//!
//! All keys are camelCase on the wire. Optional fields are marked with
//! `Option` and omitted when absent.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::ContractError;
use crate::handshake::UserType;

/// Payload validation beyond what deserialization already enforces.
pub trait Validate {
    fn validate(&self) -> Result<(), ContractError>;
}

fn require(field: &'static str, value: &str) -> Result<(), ContractError> {
    if value.trim().is_empty() {
        return Err(ContractError::EmptyField { field });
    }
    Ok(())
}

fn require_ids(field: &'static str, values: &[String]) -> Result<(), ContractError> {
    if values.is_empty() {
        return Err(ContractError::EmptyList { field });
    }
    values.iter().try_for_each(|v| require(field, v))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContentType {
    Text,
    Image,
    File,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConversationType {
    LandlordTenant,
    Internal,
    Support,
    AiAssistant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationType {
    NewMessage,
    PaymentReceived,
    MaintenanceUpdate,
    LeaseReminder,
}

// ---------------------------------------------------------------------------
// server -> client
// ---------------------------------------------------------------------------

/// `message:new`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMessagePayload {
    pub id: String,
    pub conversation_id: String,
    pub sender_id: String,
    pub sender_type: UserType,
    pub sender_name: String,
    pub content: String,
    pub content_type: ContentType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Validate for NewMessagePayload {
    fn validate(&self) -> Result<(), ContractError> {
        require("id", &self.id)?;
        require("conversationId", &self.conversation_id)?;
        require("senderId", &self.sender_id)?;
        Ok(())
    }
}

/// `message:read` as relayed by the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageReadPayload {
    pub conversation_id: String,
    pub message_ids: Vec<String>,
    pub reader_id: String,
    pub read_at: DateTime<Utc>,
}

impl Validate for MessageReadPayload {
    fn validate(&self) -> Result<(), ContractError> {
        require("conversationId", &self.conversation_id)?;
        require_ids("messageIds", &self.message_ids)?;
        require("readerId", &self.reader_id)
    }
}

/// `message:deleted`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageDeletedPayload {
    pub conversation_id: String,
    pub message_id: String,
}

impl Validate for MessageDeletedPayload {
    fn validate(&self) -> Result<(), ContractError> {
        require("conversationId", &self.conversation_id)?;
        require("messageId", &self.message_id)
    }
}

/// `typing:start` / `typing:stop` as relayed by the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypingPayload {
    pub conversation_id: String,
    pub user_id: String,
    pub user_name: String,
    pub is_typing: bool,
}

impl Validate for TypingPayload {
    fn validate(&self) -> Result<(), ContractError> {
        require("conversationId", &self.conversation_id)?;
        require("userId", &self.user_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantSummary {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub user_type: UserType,
}

/// `conversation:created`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationCreatedPayload {
    pub id: String,
    #[serde(rename = "type")]
    pub conversation_type: ConversationType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub participants: Vec<ParticipantSummary>,
    pub created_at: DateTime<Utc>,
}

impl Validate for ConversationCreatedPayload {
    fn validate(&self) -> Result<(), ContractError> {
        require("id", &self.id)?;
        if self.participants.is_empty() {
            return Err(ContractError::EmptyList {
                field: "participants",
            });
        }
        self.participants
            .iter()
            .try_for_each(|p| require("participants.id", &p.id))
    }
}

/// `conversation:updated`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationUpdatedPayload {
    pub conversation_id: String,
    pub last_message_at: DateTime<Utc>,
}

impl Validate for ConversationUpdatedPayload {
    fn validate(&self) -> Result<(), ContractError> {
        require("conversationId", &self.conversation_id)
    }
}

/// `notification`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPayload {
    pub id: String,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub title: String,
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

impl Validate for NotificationPayload {
    fn validate(&self) -> Result<(), ContractError> {
        require("id", &self.id)?;
        require("title", &self.title)
    }
}

// ---------------------------------------------------------------------------
// client -> server
// ---------------------------------------------------------------------------

/// Body of `join:conversation`, `leave:conversation` and the client form of
/// `typing:start` / `typing:stop`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationRef {
    pub conversation_id: String,
}

impl ConversationRef {
    pub fn new(conversation_id: impl Into<String>) -> Self {
        Self {
            conversation_id: conversation_id.into(),
        }
    }
}

impl Validate for ConversationRef {
    fn validate(&self) -> Result<(), ContractError> {
        require("conversationId", &self.conversation_id)
    }
}

/// Body of `join:user`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRef {
    pub user_id: String,
}

impl Validate for UserRef {
    fn validate(&self) -> Result<(), ContractError> {
        require("userId", &self.user_id)
    }
}

/// Client form of `message:read`.
///
/// Reader identity and read time are never taken from the client; any such
/// keys in the frame are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadReceiptRequest {
    pub conversation_id: String,
    pub message_ids: Vec<String>,
}

impl Validate for ReadReceiptRequest {
    fn validate(&self) -> Result<(), ContractError> {
        require("conversationId", &self.conversation_id)?;
        require_ids("messageIds", &self.message_ids)
    }
}

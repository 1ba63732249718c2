//! UseCase: 会話ルームへの参加

use std::sync::Arc;

use crate::domain::{ConnectionId, ConversationId, MembershipStore, RoomKey};

use super::error::RoomCommandError;

/// 会話ルーム参加のユースケース
///
/// Whether the user may see the conversation is decided by the CRUD layer
/// that hands out conversation ids; this only records membership.
pub struct JoinConversationUseCase {
    store: Arc<dyn MembershipStore>,
}

impl JoinConversationUseCase {
    pub fn new(store: Arc<dyn MembershipStore>) -> Self {
        Self { store }
    }

    /// Returns `Ok(false)` when the connection was already in the room.
    pub async fn execute(
        &self,
        connection_id: &ConnectionId,
        conversation_id: String,
    ) -> Result<bool, RoomCommandError> {
        let conversation_id = ConversationId::new(conversation_id)?;
        let room = RoomKey::conversation(conversation_id);
        let joined = self.store.join(connection_id, room.clone()).await?;
        if joined {
            tracing::info!("Connection '{}' joined '{}'", connection_id, room);
        }
        Ok(joined)
    }
}

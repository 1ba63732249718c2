//! UseCase: 既読通知のリレー

use std::sync::Arc;

use leasewire_shared::{
    ServerEvent, Validate,
    event::{MessageReadPayload, ReadReceiptRequest},
    time::now_utc,
};

use crate::domain::{Connection, ConversationId, MembershipStore, RoomKey};

use super::error::RoomCommandError;

/// 既読通知リレーのユースケース
pub struct RelayReadReceiptUseCase {
    store: Arc<dyn MembershipStore>,
}

impl RelayReadReceiptUseCase {
    pub fn new(store: Arc<dyn MembershipStore>) -> Self {
        Self { store }
    }

    /// Relay `message:read` to the rest of the room.
    ///
    /// `readerId` is the sender's bound user id and `readAt` is the server
    /// clock at relay time; neither is taken from the request.
    pub async fn execute(
        &self,
        sender: &Connection,
        request: ReadReceiptRequest,
    ) -> Result<usize, RoomCommandError> {
        request.validate()?;
        let conversation_id = ConversationId::new(request.conversation_id)?;

        let event = ServerEvent::MessageRead(MessageReadPayload {
            conversation_id: conversation_id.as_str().to_string(),
            message_ids: request.message_ids,
            reader_id: sender.user_id().as_str().to_string(),
            read_at: now_utc(),
        });

        let room = RoomKey::conversation(conversation_id);
        let sender_id = sender.id();
        Ok(self.store.fan_out(&room, &event, Some(&sender_id)).await)
    }
}

//! UseCase: 会話ルームからの退出

use std::sync::Arc;

use crate::domain::{ConnectionId, ConversationId, MembershipStore, RoomKey};

use super::error::RoomCommandError;

/// 会話ルーム退出のユースケース
pub struct LeaveConversationUseCase {
    store: Arc<dyn MembershipStore>,
}

impl LeaveConversationUseCase {
    pub fn new(store: Arc<dyn MembershipStore>) -> Self {
        Self { store }
    }

    /// Returns `Ok(false)` when the connection was not in the room.
    pub async fn execute(
        &self,
        connection_id: &ConnectionId,
        conversation_id: String,
    ) -> Result<bool, RoomCommandError> {
        let room = RoomKey::conversation(ConversationId::new(conversation_id)?);
        let left = self.store.leave(connection_id, &room).await?;
        if left {
            tracing::info!("Connection '{}' left '{}'", connection_id, room);
        }
        Ok(left)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{infrastructure::repository::InMemoryMembershipStore, test_support::admit};

    #[tokio::test]
    async fn test_leave_removes_membership() {
        // テスト項目: 退出するとルームのメンバーから外れる
        // given (前提条件):
        let store = Arc::new(InMemoryMembershipStore::new());
        let (alice, _rx) = admit(store.as_ref(), "alice").await;
        let room = RoomKey::conversation(ConversationId::new("42").unwrap());
        store.join(&alice.id(), room.clone()).await.unwrap();
        let usecase = LeaveConversationUseCase::new(store.clone());

        // when (操作):
        let result = usecase.execute(&alice.id(), "42".to_string()).await;

        // then (期待する結果):
        assert_eq!(result, Ok(true));
        assert!(store.members_of(&room).await.is_empty());
    }

    #[tokio::test]
    async fn test_leave_not_joined_is_noop() {
        // テスト項目: 参加していないルームからの退出は何もしない
        let store = Arc::new(InMemoryMembershipStore::new());
        let (alice, _rx) = admit(store.as_ref(), "alice").await;
        let usecase = LeaveConversationUseCase::new(store.clone());

        let result = usecase.execute(&alice.id(), "42".to_string()).await;

        assert_eq!(result, Ok(false));
        assert_eq!(store.rooms_of(&alice.id()).await.len(), 1);
    }
}

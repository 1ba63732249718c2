//! UseCase: `join:user` の処理
//!
//! Mailboxes are joined at admission, so an explicit request can only confirm
//! the connection's own mailbox; any other user id is refused.

use std::sync::Arc;

use crate::domain::{ConnectionId, MembershipStore, RoomKey, UserId};

use super::error::RoomCommandError;

pub struct JoinMailboxUseCase {
    store: Arc<dyn MembershipStore>,
}

impl JoinMailboxUseCase {
    pub fn new(store: Arc<dyn MembershipStore>) -> Self {
        Self { store }
    }

    pub async fn execute(
        &self,
        connection_id: &ConnectionId,
        user_id: String,
    ) -> Result<bool, RoomCommandError> {
        let room = RoomKey::mailbox(UserId::new(user_id)?);
        Ok(self.store.join(connection_id, room).await?)
    }
}

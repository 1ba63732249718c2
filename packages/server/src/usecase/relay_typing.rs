//! UseCase: 入力中インジケーターのリレー
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - RelayTypingUseCase::execute()
//!
//! ### なぜこのテストが必要か
//! - 送信者自身には typing イベントが返らないことを保証
//! - userId / userName はハンドシェイクで束縛した値が使われることを保証

use std::sync::Arc;

use leasewire_shared::{ServerEvent, event::TypingPayload};

use crate::domain::{Connection, ConversationId, MembershipStore, RoomKey};

use super::error::RoomCommandError;

/// 入力中シグナルのリレーのユースケース
pub struct RelayTypingUseCase {
    store: Arc<dyn MembershipStore>,
}

impl RelayTypingUseCase {
    pub fn new(store: Arc<dyn MembershipStore>) -> Self {
        Self { store }
    }

    /// 送信者以外のルームメンバーに typing:start / typing:stop を送る
    ///
    /// # Returns
    ///
    /// * `Ok(usize)` - 送信キューに積んだ接続数
    pub async fn execute(
        &self,
        sender: &Connection,
        conversation_id: String,
        is_typing: bool,
    ) -> Result<usize, RoomCommandError> {
        let conversation_id = ConversationId::new(conversation_id)?;
        let payload = TypingPayload {
            conversation_id: conversation_id.as_str().to_string(),
            user_id: sender.user_id().as_str().to_string(),
            user_name: sender.display_name().as_str().to_string(),
            is_typing,
        };
        let event = if is_typing {
            ServerEvent::TypingStart(payload)
        } else {
            ServerEvent::TypingStop(payload)
        };

        let room = RoomKey::conversation(conversation_id);
        let sender_id = sender.id();
        Ok(self.store.fan_out(&room, &event, Some(&sender_id)).await)
    }
}

//! UseCase: CRUD 層からのイベント配信 (Push API)
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - EventPusher の各 emit_* メソッド
//!
//! ### なぜこのテストが必要か
//! - ルーム / メールボックスの現メンバー全員に届くことを保証
//! - 不正なペイロードは呼び出し元にエラーとして返り、何も配信されないことを保証
//! - 重複した参加者 ID は 1 回だけ配信されることを保証
//! - 配信先とペイロードの conversationId が食い違う呼び出しは拒否されることを保証

use std::{collections::BTreeSet, sync::Arc};

use chrono::{DateTime, Utc};
use leasewire_shared::{
    ServerEvent, Validate,
    event::{
        ConversationCreatedPayload, ConversationUpdatedPayload, MessageDeletedPayload,
        MessageReadPayload, NewMessagePayload, NotificationPayload, TypingPayload,
    },
};

use crate::domain::{ConversationId, MembershipStore, RoomKey, UserId};

use super::error::PushError;

/// In-process push API used by the CRUD layer.
///
/// Every method returns the number of connections the event was enqueued
/// for. A room or mailbox with no members yields `Ok(0)`.
#[derive(Clone)]
pub struct EventPusher {
    store: Arc<dyn MembershipStore>,
}

impl EventPusher {
    pub fn new(store: Arc<dyn MembershipStore>) -> Self {
        Self { store }
    }

    pub async fn emit_new_message(
        &self,
        conversation_id: &str,
        payload: NewMessagePayload,
    ) -> Result<usize, PushError> {
        payload.validate()?;
        ensure_same_conversation(conversation_id, &payload.conversation_id)?;
        self.to_conversation(conversation_id, ServerEvent::MessageNew(payload))
            .await
    }

    pub async fn emit_message_read(
        &self,
        conversation_id: &str,
        payload: MessageReadPayload,
    ) -> Result<usize, PushError> {
        payload.validate()?;
        ensure_same_conversation(conversation_id, &payload.conversation_id)?;
        self.to_conversation(conversation_id, ServerEvent::MessageRead(payload))
            .await
    }

    pub async fn emit_message_deleted(
        &self,
        conversation_id: &str,
        payload: MessageDeletedPayload,
    ) -> Result<usize, PushError> {
        payload.validate()?;
        ensure_same_conversation(conversation_id, &payload.conversation_id)?;
        self.to_conversation(conversation_id, ServerEvent::MessageDeleted(payload))
            .await
    }

    /// `typing:start` or `typing:stop` depending on `payload.is_typing`
    pub async fn emit_typing(
        &self,
        conversation_id: &str,
        payload: TypingPayload,
    ) -> Result<usize, PushError> {
        payload.validate()?;
        ensure_same_conversation(conversation_id, &payload.conversation_id)?;
        let event = if payload.is_typing {
            ServerEvent::TypingStart(payload)
        } else {
            ServerEvent::TypingStop(payload)
        };
        self.to_conversation(conversation_id, event).await
    }

    pub async fn emit_conversation_created(
        &self,
        participant_ids: &[String],
        payload: ConversationCreatedPayload,
    ) -> Result<usize, PushError> {
        payload.validate()?;
        self.to_mailboxes(participant_ids, ServerEvent::ConversationCreated(payload))
            .await
    }

    pub async fn emit_notification(
        &self,
        user_id: &str,
        payload: NotificationPayload,
    ) -> Result<usize, PushError> {
        payload.validate()?;
        let room = RoomKey::mailbox(UserId::new(user_id)?);
        let event = ServerEvent::Notification(payload);
        Ok(self.dispatch(&room, &event).await)
    }

    pub async fn emit_conversation_updated(
        &self,
        participant_ids: &[String],
        conversation_id: &str,
        last_message_at: DateTime<Utc>,
    ) -> Result<usize, PushError> {
        let payload = ConversationUpdatedPayload {
            conversation_id: conversation_id.to_string(),
            last_message_at,
        };
        payload.validate()?;
        self.to_mailboxes(participant_ids, ServerEvent::ConversationUpdated(payload))
            .await
    }

    async fn to_conversation(
        &self,
        conversation_id: &str,
        event: ServerEvent,
    ) -> Result<usize, PushError> {
        let room = RoomKey::conversation(ConversationId::new(conversation_id)?);
        Ok(self.dispatch(&room, &event).await)
    }

    async fn to_mailboxes(
        &self,
        participant_ids: &[String],
        event: ServerEvent,
    ) -> Result<usize, PushError> {
        // All ids are checked before anything is sent.
        let rooms = participant_ids
            .iter()
            .map(|id| UserId::new(id.as_str()).map(RoomKey::mailbox))
            .collect::<Result<BTreeSet<_>, _>>()?;

        let mut delivered = 0;
        for room in &rooms {
            delivered += self.dispatch(room, &event).await;
        }
        Ok(delivered)
    }

    async fn dispatch(&self, room: &RoomKey, event: &ServerEvent) -> usize {
        let delivered = self.store.fan_out(room, event, None).await;
        tracing::debug!(
            "Pushed '{}' to '{}' ({} connections)",
            event.event_name(),
            room,
            delivered
        );
        delivered
    }
}

/// A conversation event is only routed to the room its payload names
fn ensure_same_conversation(target: &str, in_payload: &str) -> Result<(), PushError> {
    if target == in_payload {
        Ok(())
    } else {
        Err(PushError::ConversationMismatch {
            target: target.to_string(),
            in_payload: in_payload.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::ValueObjectError,
        infrastructure::repository::InMemoryMembershipStore,
        test_support::{admit, drain},
    };
    use leasewire_shared::{
        ContractError, UserType,
        event::{ContentType, ConversationType, NotificationType, ParticipantSummary},
    };

    fn room(id: &str) -> RoomKey {
        RoomKey::conversation(ConversationId::new(id).unwrap())
    }

    fn new_message(conversation_id: &str) -> NewMessagePayload {
        NewMessagePayload {
            id: "m-1".to_string(),
            conversation_id: conversation_id.to_string(),
            sender_id: "landlord-1".to_string(),
            sender_type: UserType::User,
            sender_name: "Lee".to_string(),
            content: "Rent is due on Friday".to_string(),
            content_type: ContentType::Text,
            attachment_url: None,
            attachment_name: None,
            created_at: Utc::now(),
        }
    }

    fn created(participants: &[&str]) -> ConversationCreatedPayload {
        ConversationCreatedPayload {
            id: "c-9".to_string(),
            conversation_type: ConversationType::LandlordTenant,
            title: Some("Unit 4B".to_string()),
            participants: participants
                .iter()
                .map(|id| ParticipantSummary {
                    id: id.to_string(),
                    name: id.to_string(),
                    user_type: UserType::User,
                })
                .collect(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_new_message_reaches_only_room_members() {
        // テスト項目: A/B が conversation:42 に参加し、C は未参加のとき、
        //             message:new は A/B に 1 回ずつ届き C には届かない
        // given (前提条件):
        let store = Arc::new(InMemoryMembershipStore::new());
        let (a, mut a_rx) = admit(store.as_ref(), "a").await;
        let (b, mut b_rx) = admit(store.as_ref(), "b").await;
        let (_c, mut c_rx) = admit(store.as_ref(), "c").await;
        store.join(&a.id(), room("42")).await.unwrap();
        store.join(&b.id(), room("42")).await.unwrap();
        let pusher = EventPusher::new(store.clone());
        let payload = new_message("42");

        // when (操作):
        let delivered = pusher.emit_new_message("42", payload.clone()).await.unwrap();

        // then (期待する結果):
        assert_eq!(delivered, 2);
        let expected = vec![ServerEvent::MessageNew(payload)];
        assert_eq!(drain(&mut a_rx), expected);
        assert_eq!(drain(&mut b_rx), expected);
        assert!(drain(&mut c_rx).is_empty());
    }

    #[tokio::test]
    async fn test_new_message_to_empty_room_is_not_an_error() {
        // テスト項目: メンバーのいないルームへの配信は Ok(0)
        let store = Arc::new(InMemoryMembershipStore::new());
        let pusher = EventPusher::new(store.clone());

        let delivered = pusher.emit_new_message("42", new_message("42")).await;

        assert_eq!(delivered, Ok(0));
    }

    #[tokio::test]
    async fn test_malformed_payload_is_not_dispatched() {
        // テスト項目: 不正なペイロードはエラーとなり、誰にも配信されない
        // given (前提条件):
        let store = Arc::new(InMemoryMembershipStore::new());
        let (a, mut a_rx) = admit(store.as_ref(), "a").await;
        store.join(&a.id(), room("42")).await.unwrap();
        let pusher = EventPusher::new(store.clone());
        let mut payload = new_message("42");
        payload.id = String::new();

        // when (操作):
        let result = pusher.emit_new_message("42", payload).await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(PushError::Contract(ContractError::EmptyField { field: "id" }))
        );
        assert!(drain(&mut a_rx).is_empty());
    }

    #[tokio::test]
    async fn test_message_deleted_reaches_room() {
        // テスト項目: message:deleted はルームメンバーに届く
        let store = Arc::new(InMemoryMembershipStore::new());
        let (a, mut a_rx) = admit(store.as_ref(), "a").await;
        store.join(&a.id(), room("42")).await.unwrap();
        let pusher = EventPusher::new(store.clone());
        let payload = MessageDeletedPayload {
            conversation_id: "42".to_string(),
            message_id: "m-1".to_string(),
        };

        let delivered = pusher.emit_message_deleted("42", payload.clone()).await;

        assert_eq!(delivered, Ok(1));
        assert_eq!(drain(&mut a_rx), vec![ServerEvent::MessageDeleted(payload)]);
    }

    #[tokio::test]
    async fn test_typing_push_maps_flag_to_event() {
        // テスト項目: isTyping=false の push は typing:stop として届く
        let store = Arc::new(InMemoryMembershipStore::new());
        let (a, mut a_rx) = admit(store.as_ref(), "a").await;
        store.join(&a.id(), room("42")).await.unwrap();
        let pusher = EventPusher::new(store.clone());
        let payload = TypingPayload {
            conversation_id: "42".to_string(),
            user_id: "ai-assistant".to_string(),
            user_name: "Assistant".to_string(),
            is_typing: false,
        };

        pusher.emit_typing("42", payload.clone()).await.unwrap();

        assert_eq!(drain(&mut a_rx), vec![ServerEvent::TypingStop(payload)]);
    }

    #[tokio::test]
    async fn test_conversation_created_dedupes_participants() {
        // テスト項目: 重複した参加者 ID でも各接続に 1 回だけ届く
        // given (前提条件):
        let store = Arc::new(InMemoryMembershipStore::new());
        let (_a, mut a_rx) = admit(store.as_ref(), "a").await;
        let (_b, mut b_rx) = admit(store.as_ref(), "b").await;
        let pusher = EventPusher::new(store.clone());
        let ids = vec!["a".to_string(), "b".to_string(), "a".to_string()];

        // when (操作):
        let delivered = pusher
            .emit_conversation_created(&ids, created(&["a", "b"]))
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(delivered, 2);
        assert_eq!(drain(&mut a_rx).len(), 1);
        assert_eq!(drain(&mut b_rx).len(), 1);
    }

    #[tokio::test]
    async fn test_conversation_created_reaches_every_connection_of_user() {
        // テスト項目: 同じユーザーの複数接続 (タブ) すべてに届く
        let store = Arc::new(InMemoryMembershipStore::new());
        let (_tab1, mut tab1_rx) = admit(store.as_ref(), "a").await;
        let (_tab2, mut tab2_rx) = admit(store.as_ref(), "a").await;
        let pusher = EventPusher::new(store.clone());

        let delivered = pusher
            .emit_conversation_created(&["a".to_string()], created(&["a"]))
            .await
            .unwrap();

        assert_eq!(delivered, 2);
        assert_eq!(drain(&mut tab1_rx).len(), 1);
        assert_eq!(drain(&mut tab2_rx).len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_participant_id_dispatches_nothing() {
        // テスト項目: 参加者 ID に空文字が含まれると誰にも配信されない
        let store = Arc::new(InMemoryMembershipStore::new());
        let (_a, mut a_rx) = admit(store.as_ref(), "a").await;
        let pusher = EventPusher::new(store.clone());
        let ids = vec!["a".to_string(), String::new()];

        let result = pusher
            .emit_conversation_updated(&ids, "42", Utc::now())
            .await;

        assert_eq!(
            result,
            Err(PushError::InvalidTarget(ValueObjectError::IdEmpty {
                kind: "UserId"
            }))
        );
        assert!(drain(&mut a_rx).is_empty());
    }

    #[tokio::test]
    async fn test_notification_reaches_mailbox_only() {
        // テスト項目: notification は対象ユーザーのメールボックスにのみ届く
        // given (前提条件):
        let store = Arc::new(InMemoryMembershipStore::new());
        let (_a, mut a_rx) = admit(store.as_ref(), "a").await;
        let (_b, mut b_rx) = admit(store.as_ref(), "b").await;
        let pusher = EventPusher::new(store.clone());
        let payload = NotificationPayload {
            id: "n-1".to_string(),
            notification_type: NotificationType::PaymentReceived,
            title: "Payment received".to_string(),
            body: "May rent".to_string(),
            data: Some(serde_json::json!({"amount": 1200})),
            created_at: Utc::now(),
        };

        // when (操作):
        let delivered = pusher.emit_notification("a", payload.clone()).await;

        // then (期待する結果):
        assert_eq!(delivered, Ok(1));
        assert_eq!(drain(&mut a_rx), vec![ServerEvent::Notification(payload)]);
        assert!(drain(&mut b_rx).is_empty());
    }

    #[tokio::test]
    async fn test_conversation_updated_carries_timestamp() {
        // テスト項目: conversation:updated に lastMessageAt がそのまま載る
        let store = Arc::new(InMemoryMembershipStore::new());
        let (_a, mut a_rx) = admit(store.as_ref(), "a").await;
        let pusher = EventPusher::new(store.clone());
        let at = Utc::now();

        pusher
            .emit_conversation_updated(&["a".to_string()], "42", at)
            .await
            .unwrap();

        assert_eq!(
            drain(&mut a_rx),
            vec![ServerEvent::ConversationUpdated(ConversationUpdatedPayload {
                conversation_id: "42".to_string(),
                last_message_at: at,
            })]
        );
    }

    #[tokio::test]
    async fn test_conversation_mismatch_is_not_dispatched() {
        // テスト項目: 配信先とペイロードの conversationId が異なる場合はエラーとなり、どちらのルームにも届かない
        // given (前提条件):
        let store = Arc::new(InMemoryMembershipStore::new());
        let (a, mut a_rx) = admit(store.as_ref(), "a").await;
        let (b, mut b_rx) = admit(store.as_ref(), "b").await;
        store.join(&a.id(), room("42")).await.unwrap();
        store.join(&b.id(), room("7")).await.unwrap();
        let pusher = EventPusher::new(store.clone());

        // when (操作):
        let result = pusher.emit_new_message("42", new_message("7")).await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(PushError::ConversationMismatch {
                target: "42".to_string(),
                in_payload: "7".to_string(),
            })
        );
        assert!(drain(&mut a_rx).is_empty());
        assert!(drain(&mut b_rx).is_empty());
    }
}

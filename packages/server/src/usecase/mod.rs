//! UseCase 層
//!
//! 接続の受け入れ・ルーム操作・リレー・Push API を実装するレイヤー。
//! UI 層から呼び出され、Domain 層のトレイトを操作します。

pub mod connect_connection;
pub mod disconnect_connection;
pub mod error;
pub mod join_conversation;
pub mod join_mailbox;
pub mod leave_conversation;
pub mod push_event;
pub mod relay_read_receipt;
pub mod relay_typing;

pub use connect_connection::ConnectConnectionUseCase;
pub use disconnect_connection::DisconnectConnectionUseCase;
pub use error::{ConnectError, PushError, RoomCommandError};
pub use join_conversation::JoinConversationUseCase;
pub use join_mailbox::JoinMailboxUseCase;
pub use leave_conversation::LeaveConversationUseCase;
pub use push_event::EventPusher;
pub use relay_read_receipt::RelayReadReceiptUseCase;
pub use relay_typing::RelayTypingUseCase;

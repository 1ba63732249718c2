//! UseCase 層のエラー定義

use leasewire_shared::ContractError;
use thiserror::Error;

use crate::domain::{AuthError, MembershipError, ValueObjectError};

/// 接続処理のエラー
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConnectError {
    #[error("authentication failed: {0}")]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Membership(#[from] MembershipError),
}

/// ルーム参加・退出・リレー処理のエラー
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RoomCommandError {
    #[error("invalid identifier: {0}")]
    InvalidId(#[from] ValueObjectError),

    #[error(transparent)]
    Membership(#[from] MembershipError),

    #[error(transparent)]
    Contract(#[from] ContractError),
}

/// Push API のエラー
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PushError {
    #[error(transparent)]
    Contract(#[from] ContractError),

    #[error("invalid push target: {0}")]
    InvalidTarget(#[from] ValueObjectError),

    #[error("push targets conversation '{target}' but the payload names '{in_payload}'")]
    ConversationMismatch { target: String, in_payload: String },
}

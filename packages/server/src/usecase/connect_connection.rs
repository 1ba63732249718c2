//! UseCase: 接続の認証と受け入れ
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ConnectConnectionUseCase::authenticate() / execute()
//!
//! ### なぜこのテストが必要か
//! - 認証に失敗した接続は、接続オブジェクトもメンバーシップも作らないことを保証
//! - 受け入れた接続が必ず自分のメールボックスに参加していることを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：認証成功、メールボックス自動参加
//! - 異常系：トークン拒否、認証サービス停止
//! - エッジケース：同じユーザーの複数接続

use std::sync::Arc;

use leasewire_shared::{Handshake, time::now_utc};

use crate::domain::{
    Connection, ConnectionIdFactory, EventSender, Identity, MembershipStore, TokenVerifier,
};

use super::error::ConnectError;

/// 接続受け入れのユースケース
pub struct ConnectConnectionUseCase {
    store: Arc<dyn MembershipStore>,
    verifier: Arc<dyn TokenVerifier>,
}

impl ConnectConnectionUseCase {
    pub fn new(store: Arc<dyn MembershipStore>, verifier: Arc<dyn TokenVerifier>) -> Self {
        Self { store, verifier }
    }

    /// ハンドシェイクを検証し、束縛する ID を返す
    ///
    /// Runs before the upgrade; it has no membership side effects.
    pub async fn authenticate(&self, handshake: &Handshake) -> Result<Identity, ConnectError> {
        let identity = self.verifier.verify(handshake).await?;
        Ok(identity)
    }

    /// 認証済み ID で接続を受け入れ、メールボックスに参加させる
    ///
    /// # Arguments
    ///
    /// * `identity` - `authenticate` が返した ID
    /// * `sender` - この接続の送信キュー
    ///
    /// # Returns
    ///
    /// * `Ok(Connection)` - 受け入れた接続
    /// * `Err(ConnectError)` - 受け入れ失敗
    pub async fn execute(
        &self,
        identity: Identity,
        sender: EventSender,
    ) -> Result<Connection, ConnectError> {
        let connection = Connection::new(ConnectionIdFactory::generate(), identity, now_utc());
        self.store.admit(connection.clone(), sender).await?;
        Ok(connection)
    }
}

//! UseCase: 接続の切断処理

use std::sync::Arc;

use crate::domain::{ConnectionId, MembershipError, MembershipStore, RoomKey};

/// 接続切断のユースケース
pub struct DisconnectConnectionUseCase {
    store: Arc<dyn MembershipStore>,
}

impl DisconnectConnectionUseCase {
    pub fn new(store: Arc<dyn MembershipStore>) -> Self {
        Self { store }
    }

    /// 接続をすべてのルームとメールボックスから外す
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<RoomKey>)` - 外したルームのキー
    /// * `Err(MembershipError)` - 既に切断済み
    pub async fn execute(&self, connection_id: &ConnectionId) -> Result<Vec<RoomKey>, MembershipError> {
        self.store.evict(connection_id).await
    }
}

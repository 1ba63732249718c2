//! Helpers shared by unit tests.

use chrono::Utc;
use leasewire_shared::{ServerEvent, UserType};
use tokio::sync::mpsc::{self, UnboundedReceiver};

use crate::domain::{
    Connection, ConnectionIdFactory, DisplayName, Identity, MembershipStore, UserId,
};

pub fn connection(user: &str, name: &str) -> Connection {
    let user_id = UserId::new(user).unwrap();
    Connection::new(
        ConnectionIdFactory::generate(),
        Identity {
            display_name: DisplayName::new_or(Some(name.to_string()), &user_id).unwrap(),
            user_id,
            user_type: UserType::User,
            organization_id: None,
        },
        Utc::now(),
    )
}

/// Admit a fresh connection for `user` and return it with its outbound queue
pub async fn admit(
    store: &dyn MembershipStore,
    user: &str,
) -> (Connection, UnboundedReceiver<ServerEvent>) {
    let conn = connection(user, user);
    let (tx, rx) = mpsc::unbounded_channel();
    store.admit(conn.clone(), tx).await.unwrap();
    (conn, rx)
}

pub fn drain(rx: &mut UnboundedReceiver<ServerEvent>) -> Vec<ServerEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

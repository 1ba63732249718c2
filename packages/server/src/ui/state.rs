//! Shared application state.

use std::sync::Arc;

use tokio::sync::watch;

use crate::{
    config::Heartbeat,
    domain::{MembershipStore, TokenVerifier},
    usecase::EventPusher,
};

pub struct AppState {
    /// Repository（メンバーシップの唯一の保持者）
    pub store: Arc<dyn MembershipStore>,
    pub verifier: Arc<dyn TokenVerifier>,
    pub pusher: EventPusher,
    pub heartbeat: Heartbeat,
    pub push_secret: Option<String>,
    /// Flips to `true` once the server starts shutting down
    pub shutdown: watch::Receiver<bool>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn MembershipStore>,
        verifier: Arc<dyn TokenVerifier>,
        heartbeat: Heartbeat,
        push_secret: Option<String>,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            pusher: EventPusher::new(store.clone()),
            store,
            verifier,
            heartbeat,
            push_secret,
            shutdown,
        }
    }
}

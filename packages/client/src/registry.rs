//! Single live client per session.

use std::sync::{Arc, Mutex, PoisonError};

use leasewire_shared::Handshake;

use crate::{
    client::{ClientOptions, ConnectionClient},
    transport::Connector,
};

/// Hands out one [`ConnectionClient`] at a time.
///
/// `initialize` returns the live client if there is one; a new client is
/// created only after the previous one has terminated.
#[derive(Default)]
pub struct ClientRegistry {
    current: Mutex<Option<ConnectionClient>>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn initialize(
        &self,
        connector: Arc<dyn Connector>,
        handshake: Handshake,
        options: ClientOptions,
    ) -> ConnectionClient {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(client) = current.as_ref()
            && !client.is_terminated()
        {
            tracing::debug!("Reusing live client");
            return client.clone();
        }

        let client = ConnectionClient::connect(connector, handshake, options);
        *current = Some(client.clone());
        client
    }

    /// The live client, if any
    pub fn current(&self) -> Option<ConnectionClient> {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .filter(|client| !client.is_terminated())
    }

    /// Disconnect and forget the current client.
    pub async fn disconnect(&self) {
        let client = self
            .current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(client) = client {
            client.disconnect().await;
        }
    }
}

//! In-memory transports for unit tests.

use std::{
    collections::VecDeque,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use leasewire_shared::{ClientEvent, Handshake};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::{
    error::ClientError,
    transport::{Connector, Transport},
};

pub struct ChannelTransport {
    incoming: UnboundedReceiver<String>,
    outgoing: UnboundedSender<String>,
}

#[async_trait]
impl Transport for ChannelTransport {
    async fn send(&mut self, text: String) -> Result<(), ClientError> {
        self.outgoing
            .send(text)
            .map_err(|_| ClientError::Transport("peer gone".to_string()))
    }

    async fn recv(&mut self) -> Option<Result<String, ClientError>> {
        self.incoming.recv().await.map(Ok)
    }

    async fn close(&mut self) {}
}

/// Server side of a [`ChannelTransport`]. Dropping it drops the connection.
pub struct Peer {
    pub to_client: UnboundedSender<String>,
    pub from_client: UnboundedReceiver<String>,
}

impl Peer {
    pub async fn next_event(&mut self) -> ClientEvent {
        let text = self.from_client.recv().await.expect("client closed");
        ClientEvent::decode(&text).expect("client sent a malformed frame")
    }
}

pub fn channel_transport() -> (ChannelTransport, Peer) {
    let (to_client, incoming) = mpsc::unbounded_channel();
    let (outgoing, from_client) = mpsc::unbounded_channel();
    (
        ChannelTransport { incoming, outgoing },
        Peer {
            to_client,
            from_client,
        },
    )
}

/// Hands out connect results in order, then fails.
pub struct ScriptedConnector {
    script: Mutex<VecDeque<Result<ChannelTransport, ClientError>>>,
    calls: AtomicUsize,
    hang: bool,
}

impl ScriptedConnector {
    pub fn new(script: Vec<Result<ChannelTransport, ClientError>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            calls: AtomicUsize::new(0),
            hang: false,
        })
    }

    /// A connector whose attempts never complete
    pub fn hanging() -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::default(),
            calls: AtomicUsize::new(0),
            hang: true,
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connector for ScriptedConnector {
    async fn connect(&self, _handshake: &Handshake) -> Result<Box<dyn Transport>, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.hang {
            std::future::pending::<()>().await;
        }
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(Ok(transport)) => Ok(Box::new(transport)),
            Some(Err(e)) => Err(e),
            None => Err(ClientError::Transport("script exhausted".to_string())),
        }
    }
}

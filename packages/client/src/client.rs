//! Persistent connection client with automatic reconnection.
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ConnectionClient の状態遷移とヘルパー
//!
//! ### なぜこのテストが必要か
//! - 再接続が有限回で止まり、遅延が短くならないことを保証
//! - 401 と明示的な disconnect() で再接続しないことを保証
//! - 未接続中のヘルパー呼び出しはキューに積まれないことを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：接続、イベント受信、再接続後の会話への再参加
//! - 異常系：接続失敗の連続、ハンドシェイク拒否
//! - エッジケース：再接続待ちの間のヘルパー呼び出し、不正なフレーム

use std::{collections::BTreeSet, future::Future, sync::Arc, time::Duration};

use leasewire_shared::{
    ClientEvent, Handshake, ServerEvent,
    event::{ConversationRef, ReadReceiptRequest},
};
use tokio::{
    sync::{broadcast, mpsc, watch},
    time::{sleep, timeout},
};

use crate::{
    error::ClientError,
    reconnect::ReconnectPolicy,
    state::ConnectionState,
    transport::{Connector, Transport},
};

/// Default bound on a single connect attempt.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(20);

/// Server events buffered per subscriber before it starts lagging
const EVENT_BUFFER: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientOptions {
    pub reconnect: ReconnectPolicy,
    pub connect_timeout: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            reconnect: ReconnectPolicy::default(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

enum Command {
    Send(ClientEvent),
    Disconnect,
}

/// Handle to one persistent connection.
///
/// Cloning yields another handle to the same connection. The connection is
/// driven by a background task started in [`ConnectionClient::connect`].
#[derive(Clone)]
pub struct ConnectionClient {
    commands: mpsc::UnboundedSender<Command>,
    state: watch::Receiver<ConnectionState>,
    events: broadcast::Sender<ServerEvent>,
}

impl ConnectionClient {
    /// Start connecting in the background and return immediately.
    pub fn connect(
        connector: Arc<dyn Connector>,
        handshake: Handshake,
        options: ClientOptions,
    ) -> Self {
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(ConnectionState::Connecting);
        let (events_tx, _) = broadcast::channel(EVENT_BUFFER);

        let driver = Driver {
            connector,
            handshake,
            options,
            commands: commands_rx,
            state: state_tx,
            events: events_tx.clone(),
            joined: BTreeSet::new(),
        };
        tokio::spawn(driver.run());

        Self {
            commands: commands_tx,
            state: state_rx,
            events: events_tx,
        }
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    pub fn is_connected(&self) -> bool {
        self.state().is_connected()
    }

    /// Whether the client has stopped for good
    pub fn is_terminated(&self) -> bool {
        self.state() == ConnectionState::Disconnected
    }

    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.state.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.events.subscribe()
    }

    /// Joined conversations are joined again after every reconnect.
    pub fn join_conversation(&self, conversation_id: impl Into<String>) {
        self.send(ClientEvent::JoinConversation(ConversationRef::new(
            conversation_id,
        )));
    }

    pub fn leave_conversation(&self, conversation_id: impl Into<String>) {
        self.send(ClientEvent::LeaveConversation(ConversationRef::new(
            conversation_id,
        )));
    }

    pub fn send_typing_start(&self, conversation_id: impl Into<String>) {
        self.send(ClientEvent::TypingStart(ConversationRef::new(
            conversation_id,
        )));
    }

    pub fn send_typing_stop(&self, conversation_id: impl Into<String>) {
        self.send(ClientEvent::TypingStop(ConversationRef::new(conversation_id)));
    }

    pub fn send_message_read(&self, conversation_id: impl Into<String>, message_ids: Vec<String>) {
        self.send(ClientEvent::MessageRead(ReadReceiptRequest {
            conversation_id: conversation_id.into(),
            message_ids,
        }));
    }

    /// Close the connection and stop reconnecting. Resolves once the client
    /// has settled in [`ConnectionState::Disconnected`].
    pub async fn disconnect(&self) {
        // Fails only when the driver has already stopped
        let _ = self.commands.send(Command::Disconnect);
        let mut state = self.state.clone();
        let _ = state
            .wait_for(|s| *s == ConnectionState::Disconnected)
            .await;
    }

    /// Helpers are dropped, not queued, while not connected.
    fn send(&self, event: ClientEvent) {
        if !self.is_connected() {
            tracing::debug!("Not connected, dropping '{}'", event.event_name());
            return;
        }
        if self.commands.send(Command::Send(event)).is_err() {
            tracing::debug!("Client stopped, dropping event");
        }
    }
}

enum SessionEnd {
    /// Explicit disconnect, or every handle was dropped
    Stopped,
    /// The transport failed or the server went away
    Dropped,
}

/// Background task owning the transport and the state machine.
struct Driver {
    connector: Arc<dyn Connector>,
    handshake: Handshake,
    options: ClientOptions,
    commands: mpsc::UnboundedReceiver<Command>,
    state: watch::Sender<ConnectionState>,
    events: broadcast::Sender<ServerEvent>,
    joined: BTreeSet<String>,
}

impl Driver {
    async fn run(mut self) {
        // Consecutive failed attempts since the last successful connect
        let mut failures = 0;

        loop {
            let connect = timeout(
                self.options.connect_timeout,
                self.connector.connect(&self.handshake),
            );
            let Some(result) = unless_stopped(connect, &mut self.commands).await else {
                break;
            };

            match result.unwrap_or(Err(ClientError::Timeout(self.options.connect_timeout))) {
                Ok(mut transport) => {
                    failures = 0;
                    match self.session(transport.as_mut()).await {
                        SessionEnd::Stopped => {
                            transport.close().await;
                            break;
                        }
                        SessionEnd::Dropped => tracing::warn!("Connection lost"),
                    }
                }
                Err(ClientError::Unauthorized) => {
                    tracing::error!("Handshake rejected, not reconnecting");
                    break;
                }
                Err(e) => tracing::warn!("Connect attempt failed: {}", e),
            }

            failures += 1;
            let Some(delay) = self.options.reconnect.delay_for(failures) else {
                tracing::warn!("Giving up after {} reconnect attempts", failures - 1);
                break;
            };
            self.state
                .send_replace(ConnectionState::Reconnecting { attempt: failures });
            tracing::info!("Reconnecting in {:?} (attempt {})", delay, failures);
            if unless_stopped(sleep(delay), &mut self.commands).await.is_none() {
                break;
            }
        }

        self.state.send_replace(ConnectionState::Disconnected);
        tracing::info!("Client disconnected");
    }

    async fn session(&mut self, transport: &mut dyn Transport) -> SessionEnd {
        for conversation_id in self.joined.clone() {
            let event = ClientEvent::JoinConversation(ConversationRef::new(conversation_id));
            if let Err(e) = write(transport, &event).await {
                tracing::warn!("Failed to re-join conversation: {}", e);
                return SessionEnd::Dropped;
            }
        }
        self.state.send_replace(ConnectionState::Connected);
        tracing::info!("Connected");

        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(Command::Send(event)) => {
                        track_membership(&mut self.joined, &event);
                        if let Err(e) = write(transport, &event).await {
                            tracing::warn!("Failed to send '{}': {}", event.event_name(), e);
                            return SessionEnd::Dropped;
                        }
                    }
                    Some(Command::Disconnect) | None => return SessionEnd::Stopped,
                },
                frame = transport.recv() => match frame {
                    Some(Ok(text)) => match ServerEvent::decode(&text) {
                        Ok(event) => {
                            tracing::debug!("Received '{}'", event.event_name());
                            // No subscribers is fine
                            let _ = self.events.send(event);
                        }
                        Err(e) => tracing::warn!("Dropping malformed frame: {}", e),
                    },
                    Some(Err(e)) => {
                        tracing::warn!("Transport error: {}", e);
                        return SessionEnd::Dropped;
                    }
                    None => return SessionEnd::Dropped,
                },
            }
        }
    }
}

async fn write(transport: &mut dyn Transport, event: &ClientEvent) -> Result<(), ClientError> {
    transport.send(event.encode()?).await
}

fn track_membership(joined: &mut BTreeSet<String>, event: &ClientEvent) {
    match event {
        ClientEvent::JoinConversation(r) => {
            joined.insert(r.conversation_id.clone());
        }
        ClientEvent::LeaveConversation(r) => {
            joined.remove(&r.conversation_id);
        }
        _ => {}
    }
}

/// Await `fut` while discarding helper commands.
///
/// Returns `None` if a disconnect was requested (or every handle dropped)
/// before `fut` completed.
async fn unless_stopped<F: Future>(
    fut: F,
    commands: &mut mpsc::UnboundedReceiver<Command>,
) -> Option<F::Output> {
    tokio::pin!(fut);
    loop {
        tokio::select! {
            output = &mut fut => return Some(output),
            command = commands.recv() => match command {
                Some(Command::Send(event)) => {
                    tracing::debug!("Not connected, dropping '{}'", event.event_name());
                }
                Some(Command::Disconnect) | None => return None,
            },
        }
    }
}

//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::StatusCode,
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use leasewire_shared::{ClientEvent, Handshake, time::now_utc};
use tokio::{
    sync::mpsc,
    time::{Instant, interval_at, timeout},
};

use crate::{
    domain::{AuthError, Connection, Identity, MembershipStore},
    infrastructure::dto::websocket::HandshakeQuery,
    ui::state::AppState,
    usecase::{
        ConnectConnectionUseCase, ConnectError, DisconnectConnectionUseCase,
        JoinConversationUseCase, JoinMailboxUseCase, LeaveConversationUseCase,
        RelayReadReceiptUseCase, RelayTypingUseCase, RoomCommandError,
    },
};

/// Authenticate the handshake, then upgrade.
///
/// The connection is admitted only once the upgrade has completed, so a
/// rejected or abandoned handshake leaves no membership behind.
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<HandshakeQuery>,
) -> Result<impl IntoResponse, StatusCode> {
    let handshake = Handshake::try_from(query).map_err(|e| {
        tracing::warn!("Rejected handshake: {}", e);
        StatusCode::UNAUTHORIZED
    })?;

    let connect_usecase = ConnectConnectionUseCase::new(state.store.clone(), state.verifier.clone());
    match connect_usecase.authenticate(&handshake).await {
        Ok(identity) => {
            tracing::debug!("Handshake of '{}' accepted", identity.user_id);
            Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, identity)))
        }
        Err(ConnectError::Auth(AuthError::Unavailable(reason))) => {
            tracing::error!(
                "Cannot verify handshake of '{}': {}",
                handshake.user_id,
                reason
            );
            Err(StatusCode::SERVICE_UNAVAILABLE)
        }
        Err(e) => {
            tracing::warn!("Rejected handshake of '{}': {}", handshake.user_id, e);
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, identity: Identity) {
    // Create a channel for this connection to receive events
    let (tx, mut rx) = mpsc::unbounded_channel();

    let connect_usecase = ConnectConnectionUseCase::new(state.store.clone(), state.verifier.clone());
    let connection = match connect_usecase.execute(identity, tx).await {
        Ok(connection) => connection,
        Err(e) => {
            tracing::error!("Failed to admit connection: {}", e);
            return;
        }
    };
    let connection_id = connection.id();
    tracing::info!(
        "Connection '{}' of user '{}' admitted",
        connection_id,
        connection.user_id()
    );

    let (mut sender, mut receiver) = socket.split();
    let heartbeat = state.heartbeat;
    let mut shutdown = state.shutdown.clone();

    // Drain the outbound queue, ping on every heartbeat tick
    let mut send_task = tokio::spawn(async move {
        let mut ping = interval_at(Instant::now() + heartbeat.interval, heartbeat.interval);
        loop {
            tokio::select! {
                event = rx.recv() => {
                    let Some(event) = event else { break };
                    let text = match event.encode() {
                        Ok(text) => text,
                        Err(e) => {
                            tracing::warn!("Failed to encode '{}': {}", event.event_name(), e);
                            continue;
                        }
                    };
                    if sender.send(Message::Text(text.into())).await.is_err() {
                        break;
                    }
                }
                _ = ping.tick() => {
                    if sender.send(Message::Ping(Bytes::new())).await.is_err() {
                        break;
                    }
                }
                // The watch guard must not outlive this arm's future
                Ok(()) = async { shutdown.wait_for(|stopping| *stopping).await.map(drop) } => {
                    let _ = sender.send(Message::Close(None)).await;
                    break;
                }
            }
        }
    });

    // Read client events until close, error, or the connection goes silent
    let idle_limit = heartbeat.idle_limit();
    let dispatcher = ClientEventDispatcher::new(state.store.clone());
    let reader_connection = connection.clone();
    let mut recv_task = tokio::spawn(async move {
        loop {
            let msg = match timeout(idle_limit, receiver.next()).await {
                Err(_) => {
                    tracing::info!(
                        "Connection '{}' silent for {:?}, dropping",
                        reader_connection.id(),
                        idle_limit
                    );
                    break;
                }
                Ok(None) => break,
                Ok(Some(Err(e))) => {
                    tracing::warn!("WebSocket error on '{}': {}", reader_connection.id(), e);
                    break;
                }
                Ok(Some(Ok(msg))) => msg,
            };

            match msg {
                Message::Text(text) => dispatcher.dispatch(&reader_connection, text.as_str()).await,
                Message::Close(_) => {
                    tracing::info!("Connection '{}' requested close", reader_connection.id());
                    break;
                }
                Message::Binary(_) => {
                    tracing::warn!(
                        "Dropping binary frame from '{}'",
                        reader_connection.id()
                    );
                }
                // Ping/pong only count as liveness
                _ => {}
            }
        }
    });

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    let disconnect_usecase = DisconnectConnectionUseCase::new(state.store.clone());
    match disconnect_usecase.execute(&connection_id).await {
        Ok(rooms) => tracing::info!(
            "Connection '{}' disconnected after {}s, left {} rooms",
            connection_id,
            (now_utc() - connection.connected_at()).num_seconds(),
            rooms.len()
        ),
        Err(e) => tracing::warn!("Failed to evict '{}': {}", connection_id, e),
    }
}

/// Routes decoded client events to their use cases.
struct ClientEventDispatcher {
    join: JoinConversationUseCase,
    leave: LeaveConversationUseCase,
    join_mailbox: JoinMailboxUseCase,
    typing: RelayTypingUseCase,
    read_receipt: RelayReadReceiptUseCase,
}

impl ClientEventDispatcher {
    fn new(store: Arc<dyn MembershipStore>) -> Self {
        Self {
            join: JoinConversationUseCase::new(store.clone()),
            leave: LeaveConversationUseCase::new(store.clone()),
            join_mailbox: JoinMailboxUseCase::new(store.clone()),
            typing: RelayTypingUseCase::new(store.clone()),
            read_receipt: RelayReadReceiptUseCase::new(store),
        }
    }

    /// Malformed or refused events are logged and dropped.
    async fn dispatch(&self, connection: &Connection, text: &str) {
        let event = match ClientEvent::decode(text) {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!("Dropping malformed frame from '{}': {}", connection.id(), e);
                return;
            }
        };
        let name = event.event_name();
        tracing::debug!("Received '{}' from '{}'", name, connection.id());

        let connection_id = connection.id();
        let result: Result<(), RoomCommandError> = match event {
            ClientEvent::JoinConversation(r) => self
                .join
                .execute(&connection_id, r.conversation_id)
                .await
                .map(drop),
            ClientEvent::LeaveConversation(r) => self
                .leave
                .execute(&connection_id, r.conversation_id)
                .await
                .map(drop),
            ClientEvent::JoinUser(r) => self
                .join_mailbox
                .execute(&connection_id, r.user_id)
                .await
                .map(drop),
            ClientEvent::TypingStart(r) => self
                .typing
                .execute(connection, r.conversation_id, true)
                .await
                .map(drop),
            ClientEvent::TypingStop(r) => self
                .typing
                .execute(connection, r.conversation_id, false)
                .await
                .map(drop),
            ClientEvent::MessageRead(request) => self
                .read_receipt
                .execute(connection, request)
                .await
                .map(drop),
        };

        if let Err(e) = result {
            tracing::warn!("Refused '{}' from '{}': {}", name, connection_id, e);
        }
    }
}

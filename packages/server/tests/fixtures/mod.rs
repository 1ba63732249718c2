//! Test server and WebSocket helpers shared by the integration tests.

#![allow(dead_code)]

use std::{net::SocketAddr, sync::Arc, time::Duration};

use futures_util::{SinkExt, StreamExt};
use leasewire_server::{
    config::Heartbeat,
    infrastructure::{auth::PresenceTokenVerifier, repository::InMemoryMembershipStore},
    ui::{build_router, state::AppState},
};
use leasewire_shared::{ClientEvent, Handshake, ServerEvent, UserType, handshake::WEBSOCKET_PATH};
use serde_json::Value;
use tokio::{net::TcpStream, sync::watch, task::JoinHandle};
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async,
    tungstenite::{self, Message},
};

pub type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// How long a test waits for something that should happen
const WAIT: Duration = Duration::from_secs(2);
/// How long a test waits before concluding nothing will arrive
const QUIET: Duration = Duration::from_millis(200);

pub struct TestServer {
    addr: SocketAddr,
    handle: JoinHandle<()>,
    shutdown_tx: watch::Sender<bool>,
}

impl TestServer {
    pub async fn start() -> Self {
        Self::start_with(Heartbeat::default(), None).await
    }

    pub async fn start_with_secret(push_secret: Option<&str>) -> Self {
        Self::start_with(Heartbeat::default(), push_secret).await
    }

    /// Start on an ephemeral port with the development token verifier
    pub async fn start_with(heartbeat: Heartbeat, push_secret: Option<&str>) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let state = Arc::new(AppState::new(
            Arc::new(InMemoryMembershipStore::new()),
            Arc::new(PresenceTokenVerifier),
            heartbeat,
            push_secret.map(str::to_string),
            shutdown_rx,
        ));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Failed to read local address");
        let handle = tokio::spawn(async move {
            axum::serve(listener, build_router(state))
                .await
                .expect("Test server failed");
        });

        Self {
            addr,
            handle,
            shutdown_tx,
        }
    }

    /// Signal shutdown to every open connection
    pub fn shutdown(&self) {
        self.shutdown_tx.send_replace(true);
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn ws_url(&self, handshake: &Handshake) -> String {
        let base = format!("ws://{}{}", self.addr, WEBSOCKET_PATH);
        reqwest::Url::parse_with_params(&base, handshake.query_pairs())
            .expect("Failed to build WebSocket URL")
            .to_string()
    }

    pub fn raw_ws_url(&self, query: &str) -> String {
        format!("ws://{}{}?{}", self.addr, WEBSOCKET_PATH, query)
    }

    /// Connect as `user_id` and wait until the server has admitted it
    pub async fn connect(&self, user_id: &str) -> WsStream {
        let before = self.stats().await["active_connections"]
            .as_u64()
            .unwrap_or_default();
        let handshake = Handshake::new("test-token", user_id, UserType::User)
            .with_user_name(format!("{user_id} name"));
        let (ws, _) = connect_async(self.ws_url(&handshake))
            .await
            .expect("Failed to connect");
        self.wait_for_connections(before + 1).await;
        ws
    }

    pub async fn stats(&self) -> Value {
        reqwest::get(format!("{}/api/stats", self.base_url()))
            .await
            .expect("Failed to fetch stats")
            .json()
            .await
            .expect("Failed to parse stats")
    }

    pub async fn wait_for_connections(&self, expected: u64) {
        self.wait_for_stats(|stats| stats["active_connections"] == expected)
            .await;
    }

    pub async fn wait_for_rooms(&self, expected: u64) {
        self.wait_for_stats(|stats| stats["active_rooms"] == expected)
            .await;
    }

    async fn wait_for_stats(&self, done: impl Fn(&Value) -> bool) {
        let deadline = tokio::time::Instant::now() + WAIT;
        loop {
            let stats = self.stats().await;
            if done(&stats) {
                return;
            }
            if tokio::time::Instant::now() > deadline {
                panic!("Stats never reached the expected state: {stats}");
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    pub async fn push(&self, body: Value) -> reqwest::Response {
        reqwest::Client::new()
            .post(format!("{}/internal/push", self.base_url()))
            .json(&body)
            .send()
            .await
            .expect("Failed to send push request")
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

pub async fn send(ws: &mut WsStream, event: ClientEvent) {
    let text = event.encode().expect("Failed to encode event");
    ws.send(Message::Text(text.into()))
        .await
        .expect("Failed to send event");
}

pub async fn send_raw(ws: &mut WsStream, text: &str) {
    ws.send(Message::Text(text.to_string().into()))
        .await
        .expect("Failed to send frame");
}

/// Next server event, skipping control frames
pub async fn recv_event(ws: &mut WsStream) -> ServerEvent {
    tokio::time::timeout(WAIT, next_event(ws))
        .await
        .expect("Timed out waiting for an event")
        .expect("Connection closed before an event arrived")
}

/// Asserts that no event arrives within a short window
pub async fn assert_silent(ws: &mut WsStream) {
    if let Ok(Some(event)) = tokio::time::timeout(QUIET, next_event(ws)).await {
        panic!("Expected no event, got {event:?}");
    }
}

async fn next_event(ws: &mut WsStream) -> Option<ServerEvent> {
    while let Some(msg) = ws.next().await {
        match msg.ok()? {
            Message::Text(text) => {
                return Some(ServerEvent::decode(text.as_str()).expect("Malformed server frame"));
            }
            Message::Close(_) => return None,
            _ => continue,
        }
    }
    None
}

/// Status code of a refused upgrade
pub fn rejection_status<T>(result: Result<T, tungstenite::Error>) -> u16 {
    match result {
        Ok(_) => panic!("Expected the upgrade to be refused"),
        Err(tungstenite::Error::Http(response)) => response.status().as_u16(),
        Err(e) => panic!("Expected an HTTP rejection, got {e}"),
    }
}

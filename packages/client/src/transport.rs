//! Transport seam between the connection client and the wire.
//!
//! [`Connector`] opens one [`Transport`] per connect attempt. The production
//! implementation speaks WebSocket through `tokio-tungstenite`.

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use leasewire_shared::{Handshake, handshake::WEBSOCKET_PATH};
use tokio::net::TcpStream;
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async,
    tungstenite::{self, Message, http::StatusCode},
};
use url::Url;

use crate::error::ClientError;

/// An open, bidirectional text-frame channel to the server.
#[async_trait]
pub trait Transport: Send {
    async fn send(&mut self, text: String) -> Result<(), ClientError>;

    /// Next text frame. `None` once the server closed the connection.
    async fn recv(&mut self) -> Option<Result<String, ClientError>>;

    async fn close(&mut self);
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Connector: Send + Sync {
    /// Open a transport carrying `handshake`.
    ///
    /// A refused handshake is reported as [`ClientError::Unauthorized`].
    async fn connect(&self, handshake: &Handshake) -> Result<Box<dyn Transport>, ClientError>;
}

pub struct WebSocketTransport {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait]
impl Transport for WebSocketTransport {
    async fn send(&mut self, text: String) -> Result<(), ClientError> {
        self.stream
            .send(Message::Text(text.into()))
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))
    }

    async fn recv(&mut self) -> Option<Result<String, ClientError>> {
        loop {
            match self.stream.next().await? {
                Ok(Message::Text(text)) => return Some(Ok(text.as_str().to_string())),
                Ok(Message::Close(_)) => return None,
                // Pongs are answered by tungstenite
                Ok(_) => continue,
                Err(e) => return Some(Err(ClientError::Transport(e.to_string()))),
            }
        }
    }

    async fn close(&mut self) {
        if let Err(e) = self.stream.close(None).await {
            tracing::debug!("Close handshake failed: {}", e);
        }
    }
}

/// Connects to `<server>/ws` with the handshake as query parameters.
#[derive(Debug, Clone)]
pub struct WebSocketConnector {
    endpoint: Url,
}

impl WebSocketConnector {
    /// Accepts `ws://`, `wss://`, `http://` or `https://` server URLs.
    pub fn new(server_url: &str) -> Result<Self, ClientError> {
        let mut endpoint =
            Url::parse(server_url).map_err(|e| ClientError::InvalidUrl(e.to_string()))?;
        let scheme = match endpoint.scheme() {
            "ws" | "http" => "ws",
            "wss" | "https" => "wss",
            other => {
                return Err(ClientError::InvalidUrl(format!(
                    "unsupported scheme '{other}'"
                )));
            }
        };
        endpoint
            .set_scheme(scheme)
            .map_err(|_| ClientError::InvalidUrl(server_url.to_string()))?;
        endpoint.set_path(WEBSOCKET_PATH);
        endpoint.set_query(None);
        Ok(Self { endpoint })
    }

    pub fn url_for(&self, handshake: &Handshake) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().extend_pairs(handshake.query_pairs());
        url
    }
}

#[async_trait]
impl Connector for WebSocketConnector {
    async fn connect(&self, handshake: &Handshake) -> Result<Box<dyn Transport>, ClientError> {
        let url = self.url_for(handshake);
        match connect_async(url.as_str()).await {
            Ok((stream, _)) => Ok(Box::new(WebSocketTransport { stream })),
            Err(tungstenite::Error::Http(response))
                if response.status() == StatusCode::UNAUTHORIZED =>
            {
                Err(ClientError::Unauthorized)
            }
            Err(e) => Err(ClientError::Transport(e.to_string())),
        }
    }
}

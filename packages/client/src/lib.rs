//! Connection client for the Leasewire messaging server.
//!
//! [`ConnectionClient`] keeps one persistent connection per UI session,
//! reconnects with bounded backoff, and exposes imperative helpers for the
//! client events of the wire contract.

pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod reconnect;
pub mod registry;
pub mod state;
pub mod transport;

#[cfg(test)]
mod test_support;

pub use client::{ClientOptions, ConnectionClient};
pub use config::ClientConfig;
pub use error::ClientError;
pub use reconnect::ReconnectPolicy;
pub use registry::ClientRegistry;
pub use state::ConnectionState;
pub use transport::{Connector, Transport, WebSocketConnector};

// Re-export entry point
pub use cli::run_client;

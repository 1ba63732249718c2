//! Real-time messaging server for the property-management dashboard.
//!
//! Accepts authenticated WebSocket connections, tracks which connection
//! belongs to which conversation room and user mailbox, relays typing and
//! read-receipt signals, and exposes [`EventPusher`] so the CRUD layer can
//! deliver domain events to everyone currently subscribed.

pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

#[cfg(test)]
mod test_support;

// Re-export entry points
pub use config::ServerConfig;
pub use ui::run;
pub use usecase::EventPusher;

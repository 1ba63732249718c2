//! HTTP and WebSocket surface of the messaging server.

mod handler;
mod runner;
mod signal;
pub mod state;

pub use handler::http::PUSH_SECRET_HEADER;
pub use runner::{build_router, run};

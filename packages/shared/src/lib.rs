//! Shared building blocks for Leasewire.
//!
//! This crate holds the wire contract spoken between the messaging server and
//! its clients (event vocabulary and handshake fields), together with the
//! logging and time helpers both binaries use.

pub mod event;
pub mod handshake;
pub mod logger;
pub mod time;

pub use event::{ClientEvent, ContractError, ServerEvent, Validate};
pub use handshake::{Handshake, UserType};

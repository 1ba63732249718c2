//! Domain layer for the messaging server.
//!
//! This module contains membership rules that are independent of
//! the wire transport and infrastructure concerns.

pub mod auth;
pub mod entity;
pub mod error;
pub mod factory;
pub mod repository;
pub mod value_object;

pub use auth::{AuthError, TokenVerifier};
pub use entity::{Connection, Identity, Room};
pub use error::{MembershipError, ValueObjectError};
pub use factory::ConnectionIdFactory;
pub use repository::{EventSender, MembershipStore};
pub use value_object::{ConnectionId, ConversationId, DisplayName, OrganizationId, RoomKey, UserId};

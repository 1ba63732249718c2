//! Repository traits owned by the domain layer.
//!
//! Infrastructure provides the implementations; use cases depend only on
//! these traits.

use async_trait::async_trait;
use leasewire_shared::ServerEvent;
use tokio::sync::mpsc::UnboundedSender;

use super::{Connection, ConnectionId, MembershipError, RoomKey};

/// Outbound queue of a single connection, drained by its writer task
pub type EventSender = UnboundedSender<ServerEvent>;

/// The single store of Room/Mailbox membership.
///
/// Mutations (`admit`, `join`, `leave`, `evict`) are mutually exclusive with
/// `fan_out`, so a dispatch always sees a consistent member set.
#[async_trait]
pub trait MembershipStore: Send + Sync {
    /// Register a connection and join it to its mailbox in one step.
    async fn admit(&self, connection: Connection, sender: EventSender)
    -> Result<(), MembershipError>;

    /// Remove a connection from every room and its mailbox.
    ///
    /// Returns the keys of the rooms it was removed from.
    async fn evict(&self, connection_id: &ConnectionId) -> Result<Vec<RoomKey>, MembershipError>;

    /// Join a room. Returns `false` if the connection was already a member.
    async fn join(&self, connection_id: &ConnectionId, room: RoomKey)
    -> Result<bool, MembershipError>;

    /// Leave a room. Returns `false` if the connection was not a member.
    async fn leave(&self, connection_id: &ConnectionId, room: &RoomKey)
    -> Result<bool, MembershipError>;

    /// Enqueue `event` for every current member of `room`, except `exclude`.
    ///
    /// Returns the number of connections the event was enqueued for.
    async fn fan_out(
        &self,
        room: &RoomKey,
        event: &ServerEvent,
        exclude: Option<&ConnectionId>,
    ) -> usize;

    /// Rooms (mailbox included) the connection currently belongs to
    async fn rooms_of(&self, connection_id: &ConnectionId) -> Vec<RoomKey>;

    async fn members_of(&self, room: &RoomKey) -> Vec<ConnectionId>;

    async fn count_connections(&self) -> usize;

    /// Number of non-empty rooms, mailboxes included
    async fn count_rooms(&self) -> usize;
}

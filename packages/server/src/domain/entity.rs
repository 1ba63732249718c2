//! Core domain models for the messaging layer.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use leasewire_shared::UserType;

use super::value_object::{ConnectionId, DisplayName, OrganizationId, RoomKey, UserId};

/// Identity bound to a connection at handshake time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: UserId,
    pub user_type: UserType,
    pub organization_id: Option<OrganizationId>,
    pub display_name: DisplayName,
}

/// One live bidirectional channel to a single client process.
///
/// Fields are private: the identity cannot change after admission, a new
/// connection is required to re-authenticate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    id: ConnectionId,
    identity: Identity,
    connected_at: DateTime<Utc>,
}

impl Connection {
    pub fn new(id: ConnectionId, identity: Identity, connected_at: DateTime<Utc>) -> Self {
        Self {
            id,
            identity,
            connected_at,
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn user_id(&self) -> &UserId {
        &self.identity.user_id
    }

    pub fn display_name(&self) -> &DisplayName {
        &self.identity.display_name
    }

    pub fn connected_at(&self) -> DateTime<Utc> {
        self.connected_at
    }

    /// Key of the mailbox this connection belongs to for its whole lifetime
    pub fn mailbox(&self) -> RoomKey {
        RoomKey::mailbox(self.identity.user_id.clone())
    }
}

/// A membership group: a conversation room or a mailbox.
///
/// Rooms exist only while they have members; the store keys them by
/// [`RoomKey`], creates one on first join and drops it once
/// [`Room::is_empty`] holds.
#[derive(Debug, Clone, Default)]
pub struct Room {
    members: HashSet<ConnectionId>,
}

impl Room {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a member. Returns `false` if it was already a member.
    pub fn join(&mut self, connection_id: ConnectionId) -> bool {
        self.members.insert(connection_id)
    }

    /// Remove a member. Returns `false` if it was not a member.
    pub fn leave(&mut self, connection_id: &ConnectionId) -> bool {
        self.members.remove(connection_id)
    }

    pub fn contains(&self, connection_id: &ConnectionId) -> bool {
        self.members.contains(connection_id)
    }

    pub fn members(&self) -> impl Iterator<Item = &ConnectionId> {
        self.members.iter()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

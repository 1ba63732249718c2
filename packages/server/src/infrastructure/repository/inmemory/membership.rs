//! InMemory membership store.
//!
//! Implements the domain's `MembershipStore` with two maps behind one
//! `RwLock`: connection id → member (connection, outbound queue, joined room
//! keys) and room key → `Room`. Keeping both maps under the same lock lets
//! eviction remove a connection from every room before any later dispatch
//! can observe it.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use leasewire_shared::ServerEvent;
use tokio::sync::RwLock;

use crate::domain::{
    Connection, ConnectionId, EventSender, MembershipError, MembershipStore, Room, RoomKey,
};

struct Member {
    connection: Connection,
    sender: EventSender,
    rooms: HashSet<RoomKey>,
}

#[derive(Default)]
struct MembershipTable {
    members: HashMap<ConnectionId, Member>,
    rooms: HashMap<RoomKey, Room>,
}

impl MembershipTable {
    fn insert_into_room(&mut self, connection_id: ConnectionId, room: RoomKey) -> bool {
        self.rooms
            .entry(room)
            .or_insert_with(Room::new)
            .join(connection_id)
    }

    fn remove_from_room(&mut self, connection_id: &ConnectionId, room: &RoomKey) -> bool {
        let Some(entry) = self.rooms.get_mut(room) else {
            return false;
        };
        let removed = entry.leave(connection_id);
        if entry.is_empty() {
            self.rooms.remove(room);
            tracing::debug!("Removed empty room '{}'", room);
        }
        removed
    }
}

/// インメモリ membership store
pub struct InMemoryMembershipStore {
    table: RwLock<MembershipTable>,
}

impl InMemoryMembershipStore {
    pub fn new() -> Self {
        Self {
            table: RwLock::new(MembershipTable::default()),
        }
    }
}

impl Default for InMemoryMembershipStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MembershipStore for InMemoryMembershipStore {
    async fn admit(
        &self,
        connection: Connection,
        sender: EventSender,
    ) -> Result<(), MembershipError> {
        let mut table = self.table.write().await;
        let id = connection.id();
        if table.members.contains_key(&id) {
            return Err(MembershipError::AlreadyAdmitted(id.to_string()));
        }

        let mailbox = connection.mailbox();
        table.insert_into_room(id, mailbox.clone());
        table.members.insert(
            id,
            Member {
                connection,
                sender,
                rooms: HashSet::from([mailbox]),
            },
        );

        tracing::debug!(
            connection_id = %id,
            total_connections = table.members.len(),
            "Connection admitted"
        );
        Ok(())
    }

    async fn evict(&self, connection_id: &ConnectionId) -> Result<Vec<RoomKey>, MembershipError> {
        let mut table = self.table.write().await;
        let member = table
            .members
            .remove(connection_id)
            .ok_or_else(|| MembershipError::ConnectionNotFound(connection_id.to_string()))?;

        let mut rooms: Vec<RoomKey> = member.rooms.into_iter().collect();
        rooms.sort();
        for room in &rooms {
            table.remove_from_room(connection_id, room);
        }

        tracing::debug!(
            connection_id = %connection_id,
            room_count = rooms.len(),
            remaining_connections = table.members.len(),
            "Connection evicted from all rooms"
        );
        Ok(rooms)
    }

    async fn join(
        &self,
        connection_id: &ConnectionId,
        room: RoomKey,
    ) -> Result<bool, MembershipError> {
        let mut table = self.table.write().await;
        let member = table
            .members
            .get_mut(connection_id)
            .ok_or_else(|| MembershipError::ConnectionNotFound(connection_id.to_string()))?;

        if room.is_mailbox() && room != member.connection.mailbox() {
            return Err(MembershipError::ForeignMailbox {
                connection_id: connection_id.to_string(),
                room: room.to_string(),
            });
        }

        if !member.rooms.insert(room.clone()) {
            return Ok(false);
        }
        table.insert_into_room(*connection_id, room);
        Ok(true)
    }

    async fn leave(
        &self,
        connection_id: &ConnectionId,
        room: &RoomKey,
    ) -> Result<bool, MembershipError> {
        if room.is_mailbox() {
            return Err(MembershipError::MailboxIsPermanent {
                connection_id: connection_id.to_string(),
            });
        }

        let mut table = self.table.write().await;
        let member = table
            .members
            .get_mut(connection_id)
            .ok_or_else(|| MembershipError::ConnectionNotFound(connection_id.to_string()))?;

        if !member.rooms.remove(room) {
            return Ok(false);
        }
        table.remove_from_room(connection_id, room);
        Ok(true)
    }

    async fn fan_out(
        &self,
        room: &RoomKey,
        event: &ServerEvent,
        exclude: Option<&ConnectionId>,
    ) -> usize {
        // Enqueue under the read lock: eviction waits for the write lock, so
        // no dispatch that starts after it can reach the evicted connection.
        let table = self.table.read().await;
        let Some(entry) = table.rooms.get(room) else {
            tracing::debug!("No members in room '{}', dropping {}", room, event.event_name());
            return 0;
        };

        let mut delivered = 0;
        for connection_id in entry.members() {
            if exclude == Some(connection_id) {
                continue;
            }
            let Some(member) = table.members.get(connection_id) else {
                continue;
            };
            if member.sender.send(event.clone()).is_err() {
                tracing::warn!(
                    "Failed to enqueue {} for connection '{}' (writer closed)",
                    event.event_name(),
                    connection_id
                );
                continue;
            }
            delivered += 1;
        }

        tracing::debug!(
            room = %room,
            event = event.event_name(),
            recipients = delivered,
            "Fanned out event"
        );
        delivered
    }

    async fn rooms_of(&self, connection_id: &ConnectionId) -> Vec<RoomKey> {
        let table = self.table.read().await;
        let mut rooms: Vec<RoomKey> = table
            .members
            .get(connection_id)
            .map(|m| m.rooms.iter().cloned().collect())
            .unwrap_or_default();
        rooms.sort();
        rooms
    }

    async fn members_of(&self, room: &RoomKey) -> Vec<ConnectionId> {
        let table = self.table.read().await;
        let mut members: Vec<ConnectionId> = table
            .rooms
            .get(room)
            .map(|r| r.members().copied().collect())
            .unwrap_or_default();
        members.sort();
        members
    }

    async fn count_connections(&self) -> usize {
        self.table.read().await.members.len()
    }

    async fn count_rooms(&self) -> usize {
        self.table.read().await.rooms.len()
    }
}

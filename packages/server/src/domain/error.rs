//! Domain layer error definitions.

use thiserror::Error;

/// Errors related to Value Objects validation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueObjectError {
    /// Identifier validation error
    #[error("{kind} cannot be empty")]
    IdEmpty { kind: &'static str },

    /// Identifier too long error
    #[error("{kind} cannot exceed {max} characters (got {actual})")]
    IdTooLong {
        kind: &'static str,
        max: usize,
        actual: usize,
    },

    /// ConnectionId invalid format error (not a valid UUID)
    #[error("ConnectionId must be a valid UUID (got: {0})")]
    ConnectionIdInvalidFormat(String),

    /// DisplayName too long error
    #[error("DisplayName cannot exceed {max} characters (got {actual})")]
    DisplayNameTooLong { max: usize, actual: usize },
}

/// Errors related to membership bookkeeping
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MembershipError {
    /// The connection is not (or no longer) admitted
    #[error("Connection not found: {0}")]
    ConnectionNotFound(String),

    /// The connection id is already admitted
    #[error("Connection already admitted: {0}")]
    AlreadyAdmitted(String),

    /// A connection may only be in its own user's mailbox
    #[error("Connection {connection_id} cannot join mailbox {room}")]
    ForeignMailbox { connection_id: String, room: String },

    /// The mailbox is held for the connection's whole lifetime
    #[error("Connection {connection_id} cannot leave its mailbox")]
    MailboxIsPermanent { connection_id: String },
}

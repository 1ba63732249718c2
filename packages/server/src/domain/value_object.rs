//! Value Objects for domain models.
//!
//! Value Objects are immutable objects that represent values in the domain.
//! They are compared by their value, not by identity.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::ValueObjectError;

/// Maximum length of externally supplied identifiers
pub const MAX_ID_LENGTH: usize = 128;

/// Maximum length of a display name
pub const MAX_DISPLAY_NAME_LENGTH: usize = 200;

fn validate_id(kind: &'static str, id: &str) -> Result<(), ValueObjectError> {
    if id.trim().is_empty() {
        return Err(ValueObjectError::IdEmpty { kind });
    }
    let len = id.chars().count();
    if len > MAX_ID_LENGTH {
        return Err(ValueObjectError::IdTooLong {
            kind,
            max: MAX_ID_LENGTH,
            actual: len,
        });
    }
    Ok(())
}

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Result<Self, ValueObjectError> {
                let id = id.into();
                validate_id(stringify!($name), &id)?;
                Ok(Self(id))
            }

            /// Get the inner string value.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValueObjectError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

string_id!(
    /// Identifier of a dashboard user or tenant, issued by the auth service.
    UserId
);
string_id!(
    /// Identifier of a conversation, owned by the CRUD layer.
    ConversationId
);
string_id!(
    /// Identifier of the landlord organization a user belongs to.
    OrganizationId
);

/// Server-assigned identifier of a single live connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl TryFrom<&str> for ConnectionId {
    type Error = ValueObjectError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Uuid::parse_str(value)
            .map(Self)
            .map_err(|_| ValueObjectError::ConnectionIdInvalidFormat(value.to_string()))
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Name shown to other participants (e.g. next to a typing indicator).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayName(String);

impl DisplayName {
    /// Create a display name, falling back to `fallback` when `name` is blank.
    pub fn new_or(name: Option<String>, fallback: &UserId) -> Result<Self, ValueObjectError> {
        let name = match name {
            Some(n) if !n.trim().is_empty() => n.trim().to_string(),
            _ => fallback.as_str().to_string(),
        };
        let len = name.chars().count();
        if len > MAX_DISPLAY_NAME_LENGTH {
            return Err(ValueObjectError::DisplayNameTooLong {
                max: MAX_DISPLAY_NAME_LENGTH,
                actual: len,
            });
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Key of a membership group.
///
/// Conversation rooms are joined explicitly; every connection is in exactly
/// one mailbox, its own user's.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RoomKey {
    Conversation(ConversationId),
    Mailbox(UserId),
}

impl RoomKey {
    pub fn conversation(id: ConversationId) -> Self {
        RoomKey::Conversation(id)
    }

    pub fn mailbox(user_id: UserId) -> Self {
        RoomKey::Mailbox(user_id)
    }

    pub fn is_mailbox(&self) -> bool {
        matches!(self, RoomKey::Mailbox(_))
    }
}

impl fmt::Display for RoomKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoomKey::Conversation(id) => write!(f, "conversation:{id}"),
            RoomKey::Mailbox(id) => write!(f, "user:{id}"),
        }
    }
}

//! WebSocket handshake DTO.

use leasewire_shared::{Handshake, UserType};
use serde::Deserialize;

use crate::domain::AuthError;

/// Query parameters of the upgrade request.
///
/// Every field is optional at the HTTP level so that a missing token or user
/// id is answered with `401` instead of a generic query rejection.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandshakeQuery {
    pub token: Option<String>,
    pub user_id: Option<String>,
    pub user_type: Option<String>,
    pub organization_id: Option<String>,
    pub user_name: Option<String>,
}

impl TryFrom<HandshakeQuery> for Handshake {
    type Error = AuthError;

    fn try_from(query: HandshakeQuery) -> Result<Self, Self::Error> {
        let token = query
            .token
            .filter(|t| !t.trim().is_empty())
            .ok_or(AuthError::MissingToken)?;
        let user_id = query
            .user_id
            .filter(|u| !u.trim().is_empty())
            .ok_or(AuthError::MissingUserId)?;
        let user_type = match query.user_type.as_deref() {
            None | Some("") => UserType::default(),
            Some(raw) => raw.parse().map_err(AuthError::InvalidField)?,
        };

        Ok(Handshake {
            token,
            user_id,
            user_type,
            organization_id: query.organization_id,
            user_name: query.user_name,
        })
    }
}

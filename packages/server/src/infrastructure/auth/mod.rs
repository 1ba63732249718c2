//! Token verifier implementations.

mod http;
mod presence;

pub use http::HttpTokenVerifier;
pub use presence::PresenceTokenVerifier;

use leasewire_shared::{Handshake, UserType};

use crate::domain::{AuthError, DisplayName, Identity, OrganizationId, UserId};

/// Build the identity to bind from handshake fields, optionally overridden
/// by what the auth service reported.
pub(crate) fn build_identity(
    handshake: &Handshake,
    user_type: UserType,
    organization_id: Option<String>,
) -> Result<Identity, AuthError> {
    let user_id = UserId::new(handshake.user_id.clone())
        .map_err(|e| AuthError::InvalidField(e.to_string()))?;
    let organization_id = organization_id
        .filter(|o| !o.trim().is_empty())
        .map(OrganizationId::new)
        .transpose()
        .map_err(|e| AuthError::InvalidField(e.to_string()))?;
    let display_name = DisplayName::new_or(handshake.user_name.clone(), &user_id)
        .map_err(|e| AuthError::InvalidField(e.to_string()))?;

    Ok(Identity {
        user_id,
        user_type,
        organization_id,
        display_name,
    })
}

use async_trait::async_trait;
use leasewire_shared::Handshake;

use super::build_identity;
use crate::domain::{AuthError, Identity, TokenVerifier};

/// Accepts any non-empty token and trusts the handshake identity.
///
/// For local development only; production deployments configure
/// [`super::HttpTokenVerifier`].
#[derive(Debug, Default, Clone)]
pub struct PresenceTokenVerifier;

#[async_trait]
impl TokenVerifier for PresenceTokenVerifier {
    async fn verify(&self, handshake: &Handshake) -> Result<Identity, AuthError> {
        if handshake.token.trim().is_empty() {
            return Err(AuthError::MissingToken);
        }
        build_identity(
            handshake,
            handshake.user_type,
            handshake.organization_id.clone(),
        )
    }
}

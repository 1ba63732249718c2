//! Token verification seam.

use async_trait::async_trait;
use leasewire_shared::Handshake;
use thiserror::Error;

use super::Identity;

/// Why a handshake was refused.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("token is missing")]
    MissingToken,

    #[error("userId is missing")]
    MissingUserId,

    #[error("invalid handshake field: {0}")]
    InvalidField(String),

    #[error("token rejected: {0}")]
    Rejected(String),

    /// The auth service could not be reached or answered unexpectedly
    #[error("auth service unavailable: {0}")]
    Unavailable(String),
}

/// Verifies the token of a handshake and returns the identity to bind.
///
/// Called once per connection attempt, after the presence of `token` and
/// `userId` has been checked.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, handshake: &Handshake) -> Result<Identity, AuthError>;
}

//! Client error definitions.

use std::time::Duration;

use leasewire_shared::ContractError;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// The server refused the handshake; retrying with the same token is pointless
    #[error("handshake rejected by server")]
    Unauthorized,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("connect attempt timed out after {0:?}")]
    Timeout(Duration),

    #[error("invalid server url: {0}")]
    InvalidUrl(String),

    #[error(transparent)]
    Contract(#[from] ContractError),
}

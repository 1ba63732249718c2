//! Token verification against the external session service.
//!
//! The service is called with `Authorization: Bearer <token>` and answers
//! `200` with the verified identity, or `401`/`403` for a bad token.

use std::time::Duration;

use async_trait::async_trait;
use leasewire_shared::{Handshake, UserType};
use reqwest::StatusCode;
use serde::Deserialize;

use super::build_identity;
use crate::domain::{AuthError, Identity, TokenVerifier};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Identity as reported by the session service
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionIdentity {
    user_id: String,
    #[serde(default)]
    user_type: Option<UserType>,
    #[serde(default)]
    organization_id: Option<String>,
}

pub struct HttpTokenVerifier {
    client: reqwest::Client,
    verify_url: String,
}

impl HttpTokenVerifier {
    pub fn new(verify_url: impl Into<String>) -> Result<Self, AuthError> {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| AuthError::Unavailable(e.to_string()))?;
        Ok(Self {
            client,
            verify_url: verify_url.into(),
        })
    }
}

#[async_trait]
impl TokenVerifier for HttpTokenVerifier {
    async fn verify(&self, handshake: &Handshake) -> Result<Identity, AuthError> {
        let response = self
            .client
            .get(&self.verify_url)
            .bearer_auth(&handshake.token)
            .send()
            .await
            .map_err(|e| AuthError::Unavailable(e.to_string()))?;

        match response.status() {
            StatusCode::OK => {}
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(AuthError::Rejected(format!(
                    "session service answered {}",
                    response.status()
                )));
            }
            other => {
                return Err(AuthError::Unavailable(format!(
                    "session service answered {other}"
                )));
            }
        }

        let session: SessionIdentity = response
            .json()
            .await
            .map_err(|e| AuthError::Unavailable(e.to_string()))?;

        if session.user_id != handshake.user_id {
            tracing::warn!(
                "Handshake userId '{}' does not match session user '{}'",
                handshake.user_id,
                session.user_id
            );
            return Err(AuthError::Rejected("userId does not match token".to_string()));
        }

        build_identity(
            handshake,
            session.user_type.unwrap_or(handshake.user_type),
            session.organization_id.or_else(|| handshake.organization_id.clone()),
        )
    }
}

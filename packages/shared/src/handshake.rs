//! Handshake contract.
//!
//! The handshake is carried once, as query parameters of the upgrade request
//! on the `/ws` endpoint, before any event is exchanged.

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Path of the single long-lived endpoint.
pub const WEBSOCKET_PATH: &str = "/ws";

/// Kind of account a connection is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserType {
    /// Landlord / property-manager staff account
    #[default]
    User,
    /// Tenant account
    Tenant,
}

impl UserType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserType::User => "USER",
            UserType::Tenant => "TENANT",
        }
    }
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "USER" => Ok(UserType::User),
            "TENANT" => Ok(UserType::Tenant),
            other => Err(format!("unknown user type: {other}")),
        }
    }
}

/// Authentication fields sent by a client when it opens a connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Handshake {
    pub token: String,
    pub user_id: String,
    #[serde(default)]
    pub user_type: UserType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<String>,
    /// Display name relayed with typing indicators
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
}

impl Handshake {
    pub fn new(token: impl Into<String>, user_id: impl Into<String>, user_type: UserType) -> Self {
        Self {
            token: token.into(),
            user_id: user_id.into(),
            user_type,
            organization_id: None,
            user_name: None,
        }
    }

    pub fn with_organization_id(mut self, organization_id: impl Into<String>) -> Self {
        self.organization_id = Some(organization_id.into());
        self
    }

    pub fn with_user_name(mut self, user_name: impl Into<String>) -> Self {
        self.user_name = Some(user_name.into());
        self
    }

    /// Query parameter pairs in wire order (camelCase keys).
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("token", self.token.clone()),
            ("userId", self.user_id.clone()),
            ("userType", self.user_type.as_str().to_string()),
        ];
        if let Some(org) = &self.organization_id {
            pairs.push(("organizationId", org.clone()));
        }
        if let Some(name) = &self.user_name {
            pairs.push(("userName", name.clone()));
        }
        pairs
    }
}

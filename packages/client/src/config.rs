//! Client configuration from command-line arguments and environment.

use std::time::Duration;

use clap::Parser;
use leasewire_shared::{Handshake, UserType};

use crate::{client::ClientOptions, reconnect::ReconnectPolicy};

#[derive(Debug, Clone, Parser)]
#[command(name = "leasewire-client", about = "Interactive Leasewire connection client")]
pub struct ClientConfig {
    #[arg(long, env = "LEASEWIRE_SERVER_URL", default_value = "ws://127.0.0.1:8080")]
    pub server_url: String,

    #[arg(long, env = "LEASEWIRE_TOKEN")]
    pub token: String,

    #[arg(long, env = "LEASEWIRE_USER_ID")]
    pub user_id: String,

    #[arg(long, env = "LEASEWIRE_USER_TYPE", default_value = "USER")]
    pub user_type: UserType,

    #[arg(long, env = "LEASEWIRE_ORGANIZATION_ID")]
    pub organization_id: Option<String>,

    /// Name shown to others in typing indicators
    #[arg(long, env = "LEASEWIRE_USER_NAME")]
    pub user_name: Option<String>,

    #[arg(long, env = "LEASEWIRE_CONNECT_TIMEOUT_SECS", default_value_t = 20)]
    pub connect_timeout_secs: u64,

    #[arg(long, env = "LEASEWIRE_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl ClientConfig {
    pub fn handshake(&self) -> Handshake {
        let mut handshake = Handshake::new(&self.token, &self.user_id, self.user_type);
        if let Some(org) = &self.organization_id {
            handshake = handshake.with_organization_id(org);
        }
        if let Some(name) = &self.user_name {
            handshake = handshake.with_user_name(name);
        }
        handshake
    }

    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            reconnect: ReconnectPolicy::default(),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
        }
    }
}

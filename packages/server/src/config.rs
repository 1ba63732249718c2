//! Server configuration from command-line arguments and environment.

use std::{net::SocketAddr, time::Duration};

use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "leasewire-server", about = "Real-time messaging server")]
pub struct ServerConfig {
    /// Address to bind
    #[arg(long, env = "LEASEWIRE_HOST", default_value = "127.0.0.1")]
    pub host: String,

    #[arg(short, long, env = "LEASEWIRE_PORT", default_value_t = 8080)]
    pub port: u16,

    /// Session endpoint of the auth service. Without it any non-empty
    /// token is accepted.
    #[arg(long, env = "LEASEWIRE_AUTH_URL")]
    pub auth_url: Option<String>,

    /// Shared secret required in `x-push-secret` on `/internal/push`
    #[arg(long, env = "LEASEWIRE_PUSH_SECRET")]
    pub push_secret: Option<String>,

    /// Seconds between pings; must be at least 1
    #[arg(
        long,
        env = "LEASEWIRE_HEARTBEAT_INTERVAL_SECS",
        default_value_t = 25,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub heartbeat_interval_secs: u64,

    #[arg(long, env = "LEASEWIRE_HEARTBEAT_TIMEOUT_SECS", default_value_t = 20)]
    pub heartbeat_timeout_secs: u64,

    #[arg(long, env = "LEASEWIRE_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl ServerConfig {
    pub fn bind_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }

    pub fn heartbeat(&self) -> Heartbeat {
        Heartbeat {
            interval: Duration::from_secs(self.heartbeat_interval_secs),
            timeout: Duration::from_secs(self.heartbeat_timeout_secs),
        }
    }
}

/// Ping cadence and the grace period for a silent connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Heartbeat {
    pub interval: Duration,
    pub timeout: Duration,
}

impl Heartbeat {
    /// Longest a connection may stay silent before it is dropped
    pub fn idle_limit(&self) -> Duration {
        self.interval + self.timeout
    }
}

impl Default for Heartbeat {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(25),
            timeout: Duration::from_secs(20),
        }
    }
}

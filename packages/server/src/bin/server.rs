//! Real-time messaging server.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin leasewire-server -- --port 8080
//! ```

use clap::Parser;
use leasewire_server::ServerConfig;
use leasewire_shared::logger::setup_logger;

#[tokio::main]
async fn main() {
    let config = ServerConfig::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), &config.log_level);

    // Run the server
    if let Err(e) = leasewire_server::run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

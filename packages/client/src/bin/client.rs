//! Interactive client for the messaging server.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin leasewire-client -- --token dev --user-id u-1
//! ```

use clap::Parser;
use leasewire_client::ClientConfig;
use leasewire_shared::logger::setup_logger;

#[tokio::main]
async fn main() {
    let config = ClientConfig::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), &config.log_level);

    if let Err(e) = leasewire_client::run_client(config).await {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}

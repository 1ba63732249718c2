//! Logger setup shared by the server and client binaries.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the global tracing subscriber.
///
/// `RUST_LOG` takes precedence; otherwise `default_level` is applied to the
/// calling binary and the Leasewire crates, and `warn` to everything else.
///
/// # Arguments
///
/// * `bin_name` - Name of the calling binary (usually `env!("CARGO_BIN_NAME")`)
/// * `default_level` - Level used when `RUST_LOG` is not set (e.g. `"debug"`)
pub fn setup_logger(bin_name: &str, default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(default_directives(bin_name, default_level))
    });

    // A second call (tests, re-initialization) keeps the first subscriber
    if tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .try_init()
        .is_err()
    {
        tracing::debug!("Global subscriber already installed");
    }
}

fn default_directives(bin_name: &str, default_level: &str) -> String {
    let bin_target = bin_name.replace('-', "_");
    format!(
        "warn,{bin_target}={default_level},leasewire_shared={default_level},leasewire_server={default_level},leasewire_client={default_level},tower_http={default_level}"
    )
}

//! Application glue module
//!
//! Configuration and logging setup shared by the binaries.

mod config;

pub use config::{default_config_path, Config, ConfigError};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the stderr logger, honoring `RUST_LOG` and falling back to
/// `default_filter`
pub fn init_logging(default_filter: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

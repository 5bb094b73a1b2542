use tracing_subscriber::{fmt, EnvFilter};

use crate::config::{LogFormat, LoggingConfig};

/// Installs the stderr subscriber. `RUST_LOG` takes precedence over the configured level;
/// calling this again after a subscriber is set is a no-op.
pub fn init_logging(config: &LoggingConfig) {
    if tracing::dispatcher::has_been_set() {
        return;
    }

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let builder = fmt().with_env_filter(env_filter).with_writer(std::io::stderr);

    match config.format {
        LogFormat::Full => builder.init(),
        LogFormat::Compact => builder.compact().init(),
    }
}

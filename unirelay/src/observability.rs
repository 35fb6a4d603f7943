//! Tracing subscriber setup for binaries embedding the relay

use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Output format for relay logs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable text
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

fn level_str(level: Level) -> &'static str {
    match level {
        Level::TRACE => "trace",
        Level::DEBUG => "debug",
        Level::INFO => "info",
        Level::WARN => "warn",
        Level::ERROR => "error",
    }
}

/// Filter used when `RUST_LOG` is unset: relay crates at `level`, everything
/// else at `warn`.
pub fn default_filter(level: Level) -> String {
    let level = level_str(level);
    format!(
        "warn,unirelay={level},unirelay_core={level},unirelay_spec={level},unirelay_provider_zhipu={level}"
    )
}

/// Install a global fmt subscriber. `RUST_LOG` wins over `level`.
///
/// Returns `false` when a global subscriber was already installed; the
/// existing one is left in place.
pub fn init_tracing_with(level: Level, format: LogFormat) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(level)));
    let result = match format {
        LogFormat::Text => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .try_init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .json()
            .try_init(),
    };
    result.is_ok()
}

/// Text output at `level`.
pub fn init_tracing(level: Level) -> bool {
    init_tracing_with(level, LogFormat::Text)
}

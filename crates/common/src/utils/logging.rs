//! Global `tracing` subscriber setup.

use std::io;
use tracing_subscriber::{fmt, EnvFilter};

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "info,service::accounts=debug,service::storage=debug,tower_http=info";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

impl LogFormat {
    /// `json` (any case) selects JSON lines; anything else is compact text.
    pub fn from_name(name: &str) -> Self {
        if name.trim().eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Compact
        }
    }
}

/// Install the global subscriber writing to stdout.
///
/// Returns `false` when a subscriber was already installed; the first one
/// stays in effect.
pub fn init_logging(format: LogFormat) -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let builder = fmt().with_env_filter(filter).with_writer(io::stdout);
    match format {
        LogFormat::Compact => builder.with_target(false).compact().try_init().is_ok(),
        LogFormat::Json => builder.with_target(true).json().flatten_event(true).try_init().is_ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_names() {
        assert_eq!(LogFormat::from_name("json"), LogFormat::Json);
        assert_eq!(LogFormat::from_name(" JSON "), LogFormat::Json);
        assert_eq!(LogFormat::from_name("compact"), LogFormat::Compact);
        assert_eq!(LogFormat::from_name(""), LogFormat::Compact);
    }

    #[test]
    fn second_install_is_reported() {
        // whichever test installs first wins; a later call must say so
        init_logging(LogFormat::Json);
        assert!(!init_logging(LogFormat::Compact));
    }
}

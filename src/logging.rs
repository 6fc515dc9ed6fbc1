//! Tracing subscriber setup.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Map `-q` / `-v` flags to a default filter directive.
///
/// `RUST_LOG` takes precedence when set.
pub fn filter_directive(verbosity: u8, quiet: bool) -> String {
    let level = if quiet {
        "error"
    } else {
        match verbosity {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };
    format!("{}={}", env!("CARGO_PKG_NAME"), level)
}

/// Install the global subscriber. Logs go to stderr; stdout is left for results.
///
/// Calling it twice is harmless: the second install is ignored.
pub fn init(verbosity: u8, quiet: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(verbosity, quiet)));

    let _already_set = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init()
        .is_err();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_directive_levels() {
        assert_eq!(filter_directive(0, false), "mockview=warn");
        assert_eq!(filter_directive(1, false), "mockview=info");
        assert_eq!(filter_directive(2, false), "mockview=debug");
        assert_eq!(filter_directive(7, false), "mockview=trace");
    }

    #[test]
    fn test_quiet_wins_over_verbosity() {
        assert_eq!(filter_directive(3, true), "mockview=error");
    }

    #[test]
    fn test_init_twice_does_not_panic() {
        init(0, true);
        init(2, false);
    }
}

//! logging
//!
//! Tracing subscriber setup for the `rlens` binary.
//!
//! The library only emits events; installing a subscriber is left to the
//! binary so embedding applications keep control of their own output.
//!
//! The filter comes from `REPOLENS_LOG` (standard `EnvFilter` directives),
//! defaulting to `warn`. `--debug` adds `repolens=debug` on top of those
//! directives; it replaces only a directive that also targets this crate.

use tracing_subscriber::filter::{Directive, EnvFilter, LevelFilter};
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Environment variable holding filter directives.
pub const LOG_ENV: &str = "REPOLENS_LOG";

const DEBUG_DIRECTIVE: &str = "repolens=debug";

fn env_filter(debug: bool) -> EnvFilter {
    let directives = std::env::var(LOG_ENV).ok();
    filter_from(directives.as_deref(), debug)
}

fn filter_from(directives: Option<&str>, debug: bool) -> EnvFilter {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .parse_lossy(directives.unwrap_or_default());

    match DEBUG_DIRECTIVE.parse::<Directive>() {
        Ok(directive) if debug => filter.add_directive(directive),
        _ => filter,
    }
}

/// Install the global subscriber. Logs go to stderr.
///
/// Calling it twice is harmless; the second call leaves the first
/// subscriber in place.
pub fn setup_logger(debug: bool) {
    let fmt = fmt::layer()
        .with_ansi(false)
        .with_target(true)
        .with_file(debug)
        .with_line_number(debug)
        .with_thread_names(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr)
        .compact();

    let _ = tracing_subscriber::registry()
        .with(fmt)
        .with(env_filter(debug))
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_flag_enables_crate_debug() {
        let filter = filter_from(None, true).to_string();
        assert!(filter.contains("repolens=debug"));
        assert!(filter.contains("warn"));
    }

    #[test]
    fn debug_flag_keeps_env_directives() {
        let filter = filter_from(Some("git2=trace,info"), true).to_string();
        assert!(filter.contains("git2=trace"));
        assert!(filter.contains("info"));
        assert!(filter.contains("repolens=debug"));
    }

    #[test]
    fn env_directives_without_debug() {
        assert_eq!(filter_from(None, false).to_string(), "warn");
        let filter = filter_from(Some("repolens=trace"), false).to_string();
        assert_eq!(filter, "repolens=trace");
    }

    #[test]
    fn setup_twice_does_not_panic() {
        setup_logger(false);
        setup_logger(true);
    }
}

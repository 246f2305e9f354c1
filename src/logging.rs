//! Tracing setup for hosts embedding quala.
//!
//! Logging is off unless `QUALA_LOG` holds an `EnvFilter` directive, e.g.
//! `QUALA_LOG=quala_sema=debug` to see the calls the checker skipped.
//! `QUALA_LOG_STYLE=full` adds timestamps.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::fmt::time::FormatTime;

pub const LOG_ENV: &str = "QUALA_LOG";
pub const LOG_STYLE_ENV: &str = "QUALA_LOG_STYLE";

/// A timer that outputs nothing but still enables span timing calculation
struct NoTimestamp;

impl FormatTime for NoTimestamp {
    fn format_time(&self, _w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        Ok(())
    }
}

/// Install a global stderr subscriber from `QUALA_LOG`.
///
/// Returns false when the variable is unset or invalid, or when the host
/// already installed a global subscriber.
pub fn init_tracing() -> bool {
    let Ok(filter) = EnvFilter::try_from_env(LOG_ENV) else {
        return false;
    };
    let style = std::env::var(LOG_STYLE_ENV).unwrap_or_default();
    let installed = if style == "full" {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_level(true)
            .with_span_events(FmtSpan::NEW | FmtSpan::CLOSE)
            .with_writer(std::io::stderr)
            .try_init()
    } else {
        // Compact output: no timestamp prefix, keep target/level/ANSI
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_level(true)
            .with_timer(NoTimestamp)
            .with_writer(std::io::stderr)
            .try_init()
    };
    if installed.is_ok() {
        tracing::debug!("tracing initialized");
    }
    installed.is_ok()
}

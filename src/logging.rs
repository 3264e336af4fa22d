//! Logging setup for the REPL.
//!
//! Logs go to stdout only. Set `DEBUG_LOGGING=1` to enable debug output for
//! the labelplay crates.

use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

const DEBUG_DIRECTIVE: &str = "info,labelplay=debug,labelplay_core=debug,labelplay_overlay=debug";

/// Filter directive for the current environment
pub fn directive(debug_logging: bool) -> &'static str {
    if debug_logging { DEBUG_DIRECTIVE } else { "info" }
}

/// Install the global subscriber. Call once at startup.
pub fn init() {
    let debug_logging = std::env::var("DEBUG_LOGGING").is_ok();
    let filter = EnvFilter::new(directive(debug_logging));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stdout)
                .with_target(true)
                .with_span_events(FmtSpan::NONE),
        )
        .with(filter)
        .init();

    tracing::info!(debug_logging, "labelplay logging initialized (stdout only)");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directive_parses() {
        assert_eq!(directive(false), "info");
        for debug in [false, true] {
            assert!(EnvFilter::try_new(directive(debug)).is_ok());
        }
    }
}

//! Diagnostic logging setup
//!
//! Logs go to stderr so command output on stdout stays clean. `RUST_LOG`
//! takes precedence over the configured level.

use tracing_subscriber::EnvFilter;

/// Filter directive for a configured level, e.g. "warn" becomes
/// "meterbook=warn"; `verbose` forces debug
pub fn filter_directive(level: &str, verbose: bool) -> String {
    let level = if verbose { "debug" } else { level.trim() };
    let level = if level.is_empty() { "warn" } else { level };
    format!("warn,meterbook={}", level)
}

/// Install the global subscriber; a second call is a no-op
pub fn init_logging(level: &str, verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(level, verbose)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .ok();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_directive() {
        assert_eq!(filter_directive("info", false), "warn,meterbook=info");
        assert_eq!(filter_directive("info", true), "warn,meterbook=debug");
        assert_eq!(filter_directive(" ", false), "warn,meterbook=warn");
    }
}

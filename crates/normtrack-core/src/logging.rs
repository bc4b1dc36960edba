//! Process-wide tracing setup.

use tracing::Level;

/// Install the global tracing subscriber at the given level.
///
/// Unknown level strings fall back to `info`. Calling this twice is a no-op
/// (the second install attempt is ignored).
pub fn init(level: &str) {
    let level = match level {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        init("debug");
        // Second install must not panic.
        init("not-a-level");
    }
}

//! Tracing subscriber setup
//!
//! Terraform owns stdout for the plugin handshake, so logs go to stderr.

use tracing::Level;

pub const LOG_LEVEL_ENV: &str = "TELNYX_LOG_LEVEL";

/// Install the global fmt subscriber. Safe to call more than once.
pub fn init() {
    let level = level_from_env();
    let result = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();

    if result.is_ok() {
        tracing::debug!("Logging initialised at {}", level);
    }
}

fn level_from_env() -> Level {
    std::env::var(LOG_LEVEL_ENV)
        .ok()
        .and_then(|v| parse_level(&v))
        .unwrap_or(Level::INFO)
}

fn parse_level(value: &str) -> Option<Level> {
    value.trim().parse::<Level>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn parses_known_levels() {
        assert_eq!(parse_level("debug"), Some(Level::DEBUG));
        assert_eq!(parse_level("WARN"), Some(Level::WARN));
        assert_eq!(parse_level(" error "), Some(Level::ERROR));
        assert_eq!(parse_level("chatty"), None);
    }

    #[test]
    #[serial]
    fn unset_or_invalid_env_falls_back_to_info() {
        std::env::remove_var(LOG_LEVEL_ENV);
        assert_eq!(level_from_env(), Level::INFO);

        std::env::set_var(LOG_LEVEL_ENV, "nonsense");
        assert_eq!(level_from_env(), Level::INFO);

        std::env::set_var(LOG_LEVEL_ENV, "trace");
        assert_eq!(level_from_env(), Level::TRACE);

        std::env::remove_var(LOG_LEVEL_ENV);
    }

    #[test]
    fn init_is_idempotent() {
        init();
        init();
    }
}

//! Process-wide tracing setup.
//!
//! Logs go to stderr so JSON written to stdout stays machine-readable.

use once_cell::sync::OnceCell;
use tracing::Level;

static INIT: OnceCell<()> = OnceCell::new();

/// Install the default subscriber at `INFO`. Safe to call more than once.
pub fn init() {
    init_with_level(Level::INFO);
}

/// Install the fmt subscriber at `level`. Only the first call has an effect,
/// and an already-installed global subscriber is left in place.
pub fn init_with_level(level: Level) {
    INIT.get_or_init(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(level)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    });
}

/// Map `--verbose` / `--quiet` counts to a level.
pub fn level_from_flags(verbose: u8, quiet: bool) -> Level {
    if quiet {
        return Level::ERROR;
    }
    match verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_from_flags() {
        assert_eq!(level_from_flags(0, false), Level::INFO);
        assert_eq!(level_from_flags(1, false), Level::DEBUG);
        assert_eq!(level_from_flags(3, false), Level::TRACE);
        assert_eq!(level_from_flags(2, true), Level::ERROR);
    }

    #[test]
    fn test_init_is_idempotent() {
        init();
        init_with_level(Level::DEBUG);
    }
}

use std::sync::Mutex;

use slog::{Drain, Fuse, Never};
use slog_async::Async;
use slog_json::Json;

pub use slog::{debug, error, info, o, trace, warn, Discard, Level, Logger};

/// The environment variable holding the minimum level to log.
pub const LEVEL_VARIABLE: &str = "RECIPES_LOG_LEVEL";

/// The level used when `RECIPES_LOG_LEVEL` is unset or unparsable.
pub const DEFAULT_LEVEL: Level = Level::Info;

/// Creates the root logger, which writes JSON lines to stderr.
pub fn initialize_logger() -> Logger {
    let drain = Mutex::new(Json::default(std::io::stderr())).map(Fuse);
    let drain = filter(drain);
    let drain = Async::new(drain).build().fuse();

    Logger::root(
        drain,
        o!(
            "service" => info::NAME,
            "version" => info::VERSION,
            "revision" => info::REVISION,
            "build_timestamp" => info::BUILD_TIMESTAMP
        ),
    )
}

/// Parses a level name such as `debug` or `warn`, falling back to
/// `DEFAULT_LEVEL`.
pub fn parse_level(name: Option<&str>) -> Level {
    name.and_then(|n| n.trim().parse().ok())
        .unwrap_or(DEFAULT_LEVEL)
}

#[cfg(not(feature = "env_logging"))]
fn filter<D>(drain: D) -> impl Drain<Ok = (), Err = Never> + Send + 'static
where
    D: Drain<Ok = (), Err = Never> + Send + 'static,
{
    let level = parse_level(std::env::var(LEVEL_VARIABLE).ok().as_deref());

    drain.filter_level(level).ignore_res()
}

// `RUST_LOG` takes over when this feature is active
#[cfg(feature = "env_logging")]
fn filter<D>(drain: D) -> impl Drain<Ok = (), Err = Never> + Send + 'static
where
    D: Drain<Ok = (), Err = Never> + Send + 'static,
{
    slog_envlogger::new(drain).ignore_res()
}

#[cfg(test)]
mod tests {
    use super::{parse_level, Level, DEFAULT_LEVEL};

    #[test]
    fn known_levels_are_parsed() {
        assert_eq!(parse_level(Some("debug")), Level::Debug);
        assert_eq!(parse_level(Some(" trace ")), Level::Trace);
        assert_eq!(parse_level(Some("error")), Level::Error);
    }

    #[test]
    fn unknown_levels_fall_back_to_default() {
        assert_eq!(parse_level(None), DEFAULT_LEVEL);
        assert_eq!(parse_level(Some("loud")), DEFAULT_LEVEL);
        assert_eq!(parse_level(Some("")), DEFAULT_LEVEL);
    }
}

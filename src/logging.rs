#![cfg(feature = "std")]

use std::env;
use log::{self, LevelFilter, Metadata, Record};

struct SimpleLogger;

impl log::Log for SimpleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            println!("{} [{}] {}", record.level(), record.target(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: SimpleLogger = SimpleLogger;

/// Level named by the `SEABATTLE_LOG` environment variable, if it parses.
pub fn env_level() -> Option<LevelFilter> {
    env::var("SEABATTLE_LOG").ok().and_then(|lvl| lvl.parse().ok())
}

/// Install the stdout logger. `level` wins over `SEABATTLE_LOG`; without
/// either the level is `info`. Calling this twice keeps the first logger.
pub fn init_logging(level: Option<LevelFilter>) {
    let level = level.or_else(env_level).unwrap_or(LevelFilter::Info);
    let _ = log::set_logger(&LOGGER).map(|()| log::set_max_level(level));
}

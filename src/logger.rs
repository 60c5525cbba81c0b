// src/logger.rs
use lazy_static::lazy_static;
use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::time::Instant;

lazy_static! {
    static ref START: Instant = Instant::now();
}

/// Writes `[  1.234s INFO  module] message` lines to stderr.
struct StderrLogger;

static LOGGER: StderrLogger = StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let elapsed = START.elapsed();
        let mut err = std::io::stderr().lock();
        // Nowhere left to report a failed log write.
        let _ = writeln!(
            err,
            "[{:>4}.{:03}s {:<5} {}] {}",
            elapsed.as_secs(),
            elapsed.subsec_millis(),
            record.level(),
            record.target(),
            record.args()
        );
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

/// Installs the stderr logger. Fails if another logger is already set.
pub fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
    lazy_static::initialize(&START);
    log::set_logger(&LOGGER)?;
    log::set_max_level(level);
    Ok(())
}

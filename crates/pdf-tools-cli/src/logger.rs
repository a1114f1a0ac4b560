use chrono::{DateTime, Local};
use log::{Level, LevelFilter, Metadata, Record};
use std::io::Write;

/// Logs to stderr with a local timestamp
pub struct CliLogger {
    level: LevelFilter,
}

impl CliLogger {
    /// `-v` count: none is info, one is debug, more is trace
    pub fn new(verbosity: u8) -> Self {
        Self {
            level: level_for(verbosity),
        }
    }

    pub fn init(self) -> Result<(), log::SetLoggerError> {
        let level = self.level;
        log::set_boxed_logger(Box::new(self))?;
        log::set_max_level(level);
        Ok(())
    }
}

fn level_for(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

fn format_entry(timestamp: DateTime<Local>, level: Level, target: &str, message: &str) -> String {
    format!(
        "{} {:<5} [{}] {}",
        timestamp.format("%H:%M:%S%.3f"),
        level,
        target,
        message
    )
}

impl log::Log for CliLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let line = format_entry(
                Local::now(),
                record.level(),
                record.target(),
                &record.args().to_string(),
            );
            let _ = writeln!(std::io::stderr().lock(), "{}", line);
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

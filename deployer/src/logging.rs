//! A minimal stderr backend for the `log` facade.
//!
//! Diagnostic detail (commands, paths, patched fields) is logged at `debug`
//! and only shown with `--verbose`.

use log::{Level, LevelFilter, Log, Metadata, Record};
use std::io::Write;

/// Writes records to stderr as `<level>: <message>`.
#[derive(Debug)]
pub struct StderrLogger {
    level: LevelFilter,
}

impl StderrLogger {
    /// A logger that passes records up to `level`.
    #[must_use]
    pub const fn new(level: LevelFilter) -> Self {
        Self { level }
    }

    /// Format a record the way it is written.
    #[must_use]
    pub fn format(record: &Record<'_>) -> String {
        let label = match record.level() {
            Level::Error => "error",
            Level::Warn => "warning",
            Level::Info => "info",
            Level::Debug => "debug",
            Level::Trace => "trace",
        };
        format!("{label}: {}", record.args())
    }
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record<'_>) {
        if self.enabled(record.metadata()) {
            let mut stderr = std::io::stderr().lock();
            if writeln!(stderr, "{}", Self::format(record)).is_err() {
                // Nowhere left to report to.
            }
        }
    }

    fn flush(&self) {
        if std::io::stderr().flush().is_err() {
            // As above.
        }
    }
}

/// The level for a run: `debug` when verbose, `info` otherwise.
#[must_use]
pub const fn level_for(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

/// Install the stderr logger as the global logger.
///
/// Installing twice is harmless: the first logger stays in place.
pub fn init(verbose: bool) {
    let level = level_for(verbose);
    if log::set_boxed_logger(Box::new(StderrLogger::new(level))).is_ok() {
        log::set_max_level(level);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::quiet(false, LevelFilter::Info)]
    #[case::verbose(true, LevelFilter::Debug)]
    fn verbosity_selects_level(#[case] verbose: bool, #[case] expected: LevelFilter) {
        assert_eq!(level_for(verbose), expected);
    }

    #[test]
    fn records_are_prefixed_with_level() {
        let line = StderrLogger::format(
            &Record::builder()
                .level(Level::Warn)
                .args(format_args!("binary reports {}", "1.4.0.0"))
                .build(),
        );
        assert_eq!(line, "warning: binary reports 1.4.0.0");
    }

    #[test]
    fn debug_records_are_filtered_when_quiet() {
        let logger = StderrLogger::new(level_for(false));
        let debug = Metadata::builder().level(Level::Debug).build();
        let info = Metadata::builder().level(Level::Info).build();
        assert!(!logger.enabled(&debug));
        assert!(logger.enabled(&info));
    }
}

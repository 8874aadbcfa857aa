//! Subscriber setup for the binary.
//!
//! Every event goes to an append-only log file, and optionally to stderr,
//! as `YYYY-MM-DD HH:MM:SS - LEVEL - message` lines in local time.

use core::fmt;
use std::io;
use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::{Event, Subscriber};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt as _;

use crate::error::{CouponError, Result};

/// Log file written when none is configured.
pub const DEFAULT_LOG_FILE: &str = "coupon-tracker.log";

/// Timestamp format of each log line.
pub const LOG_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Filter used when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "info";

/// Where and what to log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Log file, created if missing and appended to otherwise.
    pub file: PathBuf,
    /// `EnvFilter` directives used when `RUST_LOG` is unset.
    pub filter: String,
    /// Also write events to stderr.
    pub console: bool,
}

impl Default for LoggingConfig {
    #[inline]
    fn default() -> Self {
        Self {
            file: PathBuf::from(DEFAULT_LOG_FILE),
            filter: DEFAULT_FILTER.to_owned(),
            console: true,
        }
    }
}

/// Renders events as `<time> - <LEVEL> - <fields>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineFormat;

impl<S, N> FormatEvent<S, N> for LineFormat
where
    S: Subscriber + for<'lookup> LookupSpan<'lookup>,
    N: for<'writer> FormatFields<'writer> + 'static,
{
    #[inline]
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        write!(
            writer,
            "{} - {} - ",
            Local::now().format(LOG_TIME_FORMAT),
            event.metadata().level()
        )?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Installs the global subscriber.
///
/// The returned guard flushes the file writer when dropped and must be
/// held until the process exits.
///
/// # Errors
///
/// Returns [`CouponError::Logging`] if the filter is invalid, the log file
/// cannot be opened, or a global subscriber is already installed.
pub fn init(config: &LoggingConfig) -> Result<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.filter))
        .map_err(|err| {
            CouponError::Logging(format!("invalid log filter `{}`: {err}", config.filter))
        })?;

    let (writer, guard) = tracing_appender::non_blocking(file_appender(&config.file)?);
    let file_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_writer(writer)
        .event_format(LineFormat);
    let console_layer = config.console.then(|| {
        tracing_subscriber::fmt::layer()
            .event_format(LineFormat)
            .with_writer(io::stderr)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .map_err(|err| CouponError::Logging(err.to_string()))?;
    Ok(guard)
}

/// Opens `path` for appending without rotation.
fn file_appender(path: &Path) -> Result<RollingFileAppender> {
    let name = path.file_name().ok_or_else(|| {
        CouponError::Logging(format!("log file path {} has no file name", path.display()))
    })?;
    let dir = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(name.to_string_lossy())
        .build(dir)
        .map_err(|err| {
            CouponError::Logging(format!("cannot open log file {}: {err}", path.display()))
        })
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use chrono::NaiveDateTime;

    use super::*;
    use crate::test_support::CapturedLogs;

    fn capture<F: FnOnce()>(emit: F) -> String {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .event_format(LineFormat)
            .finish();
        tracing::subscriber::with_default(subscriber, emit);
        logs.contents()
    }

    #[test]
    fn line_has_time_level_and_message() {
        let output = capture(|| tracing::info!("Coupon scheduled successfully for Coupon ID: 7"));
        let line = output.lines().next().unwrap();
        let (time, rest) = line.split_once(" - ").unwrap();

        let _parsed: NaiveDateTime = NaiveDateTime::parse_from_str(time, LOG_TIME_FORMAT).unwrap();
        assert_eq!(rest, "INFO - Coupon scheduled successfully for Coupon ID: 7");
    }

    #[test]
    fn error_level_is_rendered_upper_case() {
        let output = capture(|| tracing::error!("Error during login: boom"));
        assert!(output.contains(" - ERROR - Error during login: boom"));
    }

    #[test]
    fn structured_fields_follow_the_message() {
        let output = capture(|| tracing::info!(available = 2, "----- Run ended -----"));
        assert!(output.contains("- INFO - ----- Run ended ----- available=2"));
    }

    #[test]
    fn default_config_writes_next_to_the_binary() {
        let config = LoggingConfig::default();
        assert_eq!(config.file, PathBuf::from("coupon-tracker.log"));
        assert_eq!(config.filter, "info");
        assert!(config.console);
    }

    #[test]
    fn appender_keeps_previous_runs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tracker.log");

        let mut first = file_appender(&path).unwrap();
        first.write_all(b"first run\n").unwrap();
        first.flush().unwrap();
        drop(first);

        let mut second = file_appender(&path).unwrap();
        second.write_all(b"second run\n").unwrap();
        second.flush().unwrap();
        drop(second);

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "first run\nsecond run\n");
    }

    #[test]
    fn appender_creates_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("tracker.log");

        let mut appender = file_appender(&path).unwrap();
        appender.write_all(b"line\n").unwrap();
        appender.flush().unwrap();

        assert!(path.exists());
    }

    #[test]
    fn path_without_file_name_is_rejected() {
        let result = file_appender(Path::new("/"));
        assert!(matches!(result, Err(CouponError::Logging(_))));
    }
}

//! Diagnostic logging for debugging datapipe.
//!
//! This is the developer-facing log written to `~/.datapipe/datapipe.log`.
//! The pipeline's own user-facing feed lives in `pipeline::log_feed`.
//!
//! Levels, most to least severe: ERROR, WARN, INFO, DEBUG, TRACE.
//! The default threshold is INFO. `--debug` or `DATAPIPE_DEBUG=1` lowers it
//! to DEBUG; `DATAPIPE_LOG=<level>` sets it explicitly and wins over both.

use std::fs::File;
use std::io::Write;
use std::str::FromStr;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Mutex, OnceLock};

use crate::config::Config;

const LOG_FILE: &str = "datapipe.log";

static SINK: OnceLock<Mutex<File>> = OnceLock::new();
static THRESHOLD: AtomicU8 = AtomicU8::new(LogLevel::Info as u8);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum LogLevel {
    Error = 0,
    Warn = 1,
    Info = 2,
    Debug = 3,
    Trace = 4,
}

impl LogLevel {
    const ALL: [LogLevel; 5] = [
        LogLevel::Error,
        LogLevel::Warn,
        LogLevel::Info,
        LogLevel::Debug,
        LogLevel::Trace,
    ];

    pub fn label(self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warn => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
            LogLevel::Trace => "TRACE",
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|level| level.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("unknown log level '{}'", wanted))
    }
}

/// Pick the threshold from the CLI flag and the environment.
fn resolve_level(debug_flag: bool, env_debug: Option<&str>, env_level: Option<&str>) -> LogLevel {
    if let Some(level) = env_level.and_then(|v| v.parse().ok()) {
        return level;
    }
    let env_debug = env_debug.is_some_and(|v| v == "1" || v.eq_ignore_ascii_case("true"));
    if debug_flag || env_debug {
        LogLevel::Debug
    } else {
        LogLevel::Info
    }
}

/// Set the threshold and open (truncating) the log file.
///
/// Without a home directory the threshold still applies but nothing is
/// written.
pub fn init_with_debug(debug: bool) {
    let level = resolve_level(
        debug,
        std::env::var("DATAPIPE_DEBUG").ok().as_deref(),
        std::env::var("DATAPIPE_LOG").ok().as_deref(),
    );
    set_level(level);

    let Ok(dir) = Config::datapipe_dir() else {
        return;
    };
    if std::fs::create_dir_all(&dir).is_err() {
        return;
    }
    if let Ok(file) = File::create(dir.join(LOG_FILE)) {
        let _ = SINK.set(Mutex::new(file));
    }
}

pub fn set_level(level: LogLevel) {
    THRESHOLD.store(level as u8, Ordering::SeqCst);
}

pub fn enabled(level: LogLevel) -> bool {
    level as u8 <= THRESHOLD.load(Ordering::Relaxed)
}

/// Write one line if `level` passes the threshold. Never fails.
pub fn write(level: LogLevel, msg: std::fmt::Arguments<'_>) {
    if !enabled(level) {
        return;
    }
    let Some(sink) = SINK.get() else { return };
    if let Ok(mut file) = sink.lock() {
        let _ = writeln!(
            file,
            "[{}] [{}] {}",
            chrono::Local::now().format("%H:%M:%S%.3f"),
            level.label(),
            msg
        );
    }
}

#[doc(hidden)]
#[macro_export]
macro_rules! dlog_at {
    ($level:expr, $($arg:tt)*) => {
        $crate::log::write($level, format_args!($($arg)*))
    };
}

/// INFO-level diagnostic line.
#[macro_export]
macro_rules! dlog {
    ($($arg:tt)*) => { $crate::dlog_at!($crate::log::LogLevel::Info, $($arg)*) };
}

#[macro_export]
macro_rules! dlog_error {
    ($($arg:tt)*) => { $crate::dlog_at!($crate::log::LogLevel::Error, $($arg)*) };
}

#[macro_export]
macro_rules! dlog_warn {
    ($($arg:tt)*) => { $crate::dlog_at!($crate::log::LogLevel::Warn, $($arg)*) };
}

#[macro_export]
macro_rules! dlog_debug {
    ($($arg:tt)*) => { $crate::dlog_at!($crate::log::LogLevel::Debug, $($arg)*) };
}

#[macro_export]
macro_rules! dlog_trace {
    ($($arg:tt)*) => { $crate::dlog_at!($crate::log::LogLevel::Trace, $($arg)*) };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_ordering() {
        assert!(LogLevel::Error < LogLevel::Warn);
        assert!(LogLevel::Info < LogLevel::Debug);
        assert!(LogLevel::Debug < LogLevel::Trace);
    }

    #[test]
    fn test_level_parse() {
        assert_eq!("trace".parse::<LogLevel>(), Ok(LogLevel::Trace));
        assert_eq!(" WARN ".parse::<LogLevel>(), Ok(LogLevel::Warn));
        assert!("verbose".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_resolve_level() {
        assert_eq!(resolve_level(false, None, None), LogLevel::Info);
        assert_eq!(resolve_level(true, None, None), LogLevel::Debug);
        assert_eq!(resolve_level(false, Some("1"), None), LogLevel::Debug);
        assert_eq!(resolve_level(false, Some("TRUE"), None), LogLevel::Debug);
        assert_eq!(resolve_level(false, Some("0"), None), LogLevel::Info);
        assert_eq!(resolve_level(true, None, Some("error")), LogLevel::Error);
        // An unparseable explicit level falls back to the flags.
        assert_eq!(resolve_level(true, None, Some("loud")), LogLevel::Debug);
    }

    #[test]
    fn test_write_without_init_is_noop() {
        write(LogLevel::Error, format_args!("nothing to see {}", 1));
        dlog_error!("nor here {}", 2);
    }
}

//! Structured logging setup with tracing

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Logging options, usually taken from the `[logging]` config section
#[derive(Debug, Clone)]
pub struct LogOptions {
    /// Filter used when `RUST_LOG` is not set
    pub default_level: String,
    /// Write JSON lines to a daily rolling file
    pub json_file: bool,
    /// Overrides [`crate::log_dir`]
    pub directory: Option<PathBuf>,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self {
            default_level: "info".to_string(),
            json_file: true,
            directory: None,
        }
    }
}

impl LogOptions {
    pub fn directory(&self) -> PathBuf {
        self.directory.clone().unwrap_or_else(super::log_dir)
    }
}

/// Flushes the file writer when dropped
pub struct LogGuard {
    _file: Option<WorkerGuard>,
}

/// Initialize the logging system
pub fn init_logging(options: &LogOptions) -> anyhow::Result<LogGuard> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&options.default_level));

    let (file_layer, guard) = if options.json_file {
        let log_dir = options.directory();
        std::fs::create_dir_all(&log_dir)?;

        let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, "client.log");
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        (
            Some(fmt::layer().json().with_writer(non_blocking)),
            Some(guard),
        )
    } else {
        (None, None)
    };

    #[cfg(debug_assertions)]
    {
        // Development: pretty console output + file
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().pretty())
            .with(file_layer)
            .try_init()?;
    }

    #[cfg(not(debug_assertions))]
    {
        // Release: compact console output + file
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().compact())
            .with(file_layer)
            .try_init()?;
    }

    tracing::info!("Logging initialized");
    Ok(LogGuard { _file: guard })
}

/// Clean up log files in the application log directory older than `days`
pub fn cleanup_old_logs(days: u32) -> anyhow::Result<usize> {
    cleanup_logs_in(&super::log_dir(), days)
}

/// Clean up `.log*` files in `log_dir` older than `days`
pub fn cleanup_logs_in(log_dir: &Path, days: u32) -> anyhow::Result<usize> {
    if !log_dir.exists() {
        return Ok(0);
    }

    let threshold = SystemTime::now() - Duration::from_secs(u64::from(days) * 24 * 60 * 60);
    let mut deleted = 0;

    for entry in std::fs::read_dir(log_dir)? {
        let entry = entry?;
        let path = entry.path();

        // Rolling files are named `client.log.YYYY-MM-DD`
        let is_log = path
            .file_name()
            .and_then(|name| name.to_str())
            .map_or(false, |name| name.contains(".log"));
        if !is_log {
            continue;
        }

        let modified = entry.metadata().and_then(|m| m.modified());
        if let Ok(modified) = modified {
            if modified < threshold && std::fs::remove_file(&path).is_ok() {
                deleted += 1;
                tracing::debug!("Deleted old log: {:?}", path);
            }
        }
    }

    tracing::info!("Cleaned up {} old log files", deleted);
    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};

    #[test]
    fn test_cleanup_removes_only_old_logs() {
        let dir = tempfile::tempdir().unwrap();
        let old_log = dir.path().join("client.log.2020-01-01");
        let fresh_log = dir.path().join("client.log.2099-01-01");
        let other = dir.path().join("notes.txt");

        for path in [&old_log, &fresh_log, &other] {
            fs::write(path, b"x").unwrap();
        }

        let ten_days_ago = SystemTime::now() - Duration::from_secs(10 * 24 * 60 * 60);
        for path in [&old_log, &other] {
            File::options()
                .write(true)
                .open(path)
                .unwrap()
                .set_modified(ten_days_ago)
                .unwrap();
        }

        let deleted = cleanup_logs_in(dir.path(), 7).unwrap();
        assert_eq!(deleted, 1);
        assert!(!old_log.exists());
        assert!(fresh_log.exists());
        assert!(other.exists());
    }

    #[test]
    fn test_cleanup_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(cleanup_logs_in(&dir.path().join("nope"), 7).unwrap(), 0);
    }

    #[test]
    fn test_default_options() {
        let options = LogOptions::default();
        assert_eq!(options.default_level, "info");
        assert!(options.json_file);
        assert_eq!(options.directory(), crate::log_dir());
    }
}

//! Logging & observability for the file-management client
//!
//! Provides structured logging, log retention and panic crash reports.

mod logging;
mod panic_hook;

pub use logging::{cleanup_logs_in, cleanup_old_logs, init_logging, LogGuard, LogOptions};
pub use panic_hook::init_panic_hook;

use directories::ProjectDirs;
use std::path::PathBuf;

/// Application identity used for platform directories
pub const QUALIFIER: &str = "com";
pub const ORGANIZATION: &str = "FileManager";
pub const APPLICATION: &str = "ssh-file-manager";

/// Get the application log directory
pub fn log_dir() -> PathBuf {
    ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION)
        .map(|dirs| dirs.data_dir().join("logs"))
        .unwrap_or_else(|| PathBuf::from("./logs"))
}

/// Initialize logging and the panic hook
///
/// Keep the returned guard alive for as long as file logs should be flushed.
pub fn init(options: &LogOptions) -> anyhow::Result<LogGuard> {
    let guard = init_logging(options)?;
    init_panic_hook();
    Ok(guard)
}

//! Path navigation and operation history core
//!
//! This crate contains:
//! - Browse session (path picker controller)
//! - Operation log and undo engine
//! - Backend collaborator contract
//! - UI events
//! - Configuration
//! - Error types

pub mod backend;
pub mod browse;
pub mod config;
pub mod error;
pub mod events;
pub mod history;
pub mod state;
pub mod undo;

pub use backend::{Backend, BackendResult, JsonBackend, Transport};
pub use browse::{
    BrowseController, BrowseSession, ListingOutcome, ListingTicket, NavTarget, OpenRequest, Selection,
};
pub use config::{AppConfig, BrowseConfig, HistoryConfig, LoggingConfig};
pub use error::{AppError, BackendError, BrowseError, UndoError};
pub use events::{EventSink, NoticeLevel, UiEvent};
pub use history::{EntryId, OperationLog, OperationLogEntry, Status, UndoAction};
pub use state::AppState;
pub use undo::{UndoEngine, UndoOutcome, UndoPhase};

/// Install logging from configuration and prune old log files
///
/// Keep the returned guard alive for the lifetime of the process.
pub fn init_logging(config: &AppConfig) -> anyhow::Result<app_log::LogGuard> {
    let guard = app_log::init(&config.logging.to_options())?;

    if let Err(e) = app_log::cleanup_old_logs(config.logging.retention_days) {
        tracing::warn!("Failed to clean up old logs: {}", e);
    }

    Ok(guard)
}

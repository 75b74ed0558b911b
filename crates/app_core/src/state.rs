//! Application state management

use crate::backend::Backend;
use crate::browse::{BrowseController, ListingOutcome, OpenRequest};
use crate::error::{AppError, BrowseError, UndoError};
use crate::events::EventSink;
use crate::history::{EntryId, OperationLog};
use crate::undo::{UndoEngine, UndoOutcome};
use crate::AppConfig;
use app_fs::{Platform, SelectionIntent};
use ipc_proto::Mode;
use std::sync::Arc;

/// Main application state
pub struct AppState<B> {
    /// Application configuration
    pub config: AppConfig,

    /// Active file-access mode
    mode: Mode,

    /// Path picker
    pub browser: BrowseController<B>,

    /// Operation history
    pub history: OperationLog,

    /// Undo dispatch
    pub undo: UndoEngine<B>,
}

impl<B: Backend> AppState<B> {
    /// Create a new application state
    pub fn new(
        config: AppConfig,
        backend: Arc<B>,
        events: EventSink,
        platform: Platform,
        mode: Mode,
    ) -> Result<Self, AppError> {
        config.validate()?;

        let browser = BrowseController::new(backend.clone(), events.clone(), platform, config.browse.clone());
        let history = OperationLog::new(config.history.clone(), events.clone());
        let undo = UndoEngine::new(backend, events, mode);

        tracing::info!(%mode, ?platform, "Application state initialized");
        Ok(Self {
            config,
            mode,
            browser,
            history,
            undo,
        })
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Switch between local and remote access
    pub fn set_mode(&mut self, mode: Mode) {
        if self.mode != mode {
            tracing::info!(from = %self.mode, to = %mode, "Mode changed");
        }
        self.mode = mode;
        self.undo.set_mode(mode);
    }

    /// Open the path picker for an input field in the active mode
    pub async fn browse(
        &mut self,
        target_field_id: impl Into<String>,
        current_value: impl Into<String>,
        intent: SelectionIntent,
    ) -> Result<ListingOutcome, BrowseError> {
        self.browser
            .open(OpenRequest {
                target_field_id: target_field_id.into(),
                mode: self.mode,
                current_field_value: current_value.into(),
                intent,
            })
            .await
    }

    /// Undo a specific log entry
    pub async fn undo(&mut self, id: EntryId) -> Result<UndoOutcome, UndoError> {
        self.undo.undo(&mut self.history, id).await
    }

    /// Undo the newest log entry
    pub async fn undo_last(&mut self) -> Result<UndoOutcome, UndoError> {
        self.undo.undo_last(&mut self.history).await
    }

    /// Save the current configuration
    pub fn save_config(&self) -> anyhow::Result<()> {
        self.config.save()
    }
}

//! Operation log - bounded, newest-first ledger of completed operations

use crate::config::HistoryConfig;
use crate::events::{EventSink, UiEvent};
use chrono::{DateTime, Local, Utc};
use ipc_proto::{ProtoError, WireUndo};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Unique, monotonically increasing entry id (milliseconds since the epoch, bumped on collision)
pub type EntryId = u64;

/// Operation labels recorded by the core itself
pub mod labels {
    pub const CLEAN_EMPTY_DIRS: &str = "clean empty dirs";
    pub const CLEAN_DETAIL: &str = "clean details";
    pub const UNDO: &str = "undo";
    pub const UNDO_FAILED: &str = "undo failed";
}

/// Outcome of a logged operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Warning,
    Error,
}

/// How a logged operation can be reversed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UndoAction {
    /// Recreate directories removed by an empty-directory cleanup
    RestoreEmptyDirectories { directories: Vec<String> },
    /// Deleted content has no backup; undo is always refused
    DeleteFiles { paths: Vec<String> },
    /// Recorded by a producer this engine cannot reverse
    Unrecognized { kind: String },
}

impl UndoAction {
    /// Convert a producer's `{type, data}` payload
    pub fn from_wire(wire: &WireUndo) -> Result<Self, ProtoError> {
        match wire.kind.as_str() {
            WireUndo::CLEAN_EMPTY_DIRS => Ok(UndoAction::RestoreEmptyDirectories {
                directories: wire.paths()?,
            }),
            WireUndo::DELETE_FILES => Ok(UndoAction::DeleteFiles {
                paths: wire.paths().unwrap_or_default(),
            }),
            other => Ok(UndoAction::Unrecognized {
                kind: other.to_string(),
            }),
        }
    }

    pub fn is_reversible(&self) -> bool {
        matches!(self, UndoAction::RestoreEmptyDirectories { .. })
    }

    pub fn kind(&self) -> &str {
        match self {
            UndoAction::RestoreEmptyDirectories { .. } => WireUndo::CLEAN_EMPTY_DIRS,
            UndoAction::DeleteFiles { .. } => WireUndo::DELETE_FILES,
            UndoAction::Unrecognized { kind } => kind,
        }
    }
}

/// One logged operation
#[derive(Debug, Clone)]
pub struct OperationLogEntry {
    id: EntryId,
    operation: String,
    description: String,
    status: Status,
    timestamp: DateTime<Local>,
    undo: Option<UndoAction>,
}

impl OperationLogEntry {
    pub fn id(&self) -> EntryId {
        self.id
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn timestamp(&self) -> DateTime<Local> {
        self.timestamp
    }

    pub fn undo(&self) -> Option<&UndoAction> {
        self.undo.as_ref()
    }

    pub fn is_undoable(&self) -> bool {
        self.undo.is_some()
    }

    /// Carries a descriptor the undo engine can actually apply
    pub fn is_reversible(&self) -> bool {
        self.undo.as_ref().map_or(false, UndoAction::is_reversible)
    }
}

/// Newest-first operation log with a fixed capacity
pub struct OperationLog {
    entries: VecDeque<OperationLogEntry>,
    config: HistoryConfig,
    events: EventSink,
    visible: bool,
    last_id: EntryId,
}

impl OperationLog {
    pub fn new(config: HistoryConfig, events: EventSink) -> Self {
        Self {
            entries: VecDeque::with_capacity(config.capacity + 1),
            config,
            events,
            visible: false,
            last_id: 0,
        }
    }

    fn next_id(&mut self) -> EntryId {
        let now = u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0);
        self.last_id = now.max(self.last_id + 1);
        self.last_id
    }

    /// Record an operation at the front of the log
    pub fn record(
        &mut self,
        operation: impl Into<String>,
        description: impl Into<String>,
        status: Status,
        undo: Option<UndoAction>,
    ) -> EntryId {
        let id = self.push(operation.into(), description.into(), status, undo);
        while self.entries.len() > self.config.capacity {
            if let Some(evicted) = self.entries.pop_back() {
                tracing::trace!(id = evicted.id, "Evicted oldest log entry");
            }
        }
        id
    }

    /// Record a rejected undo of `target`
    ///
    /// Overflow evicts the oldest entry that is neither `target` nor still
    /// reversible, so the rejected entry stays available for a retry.
    pub fn record_undo_failure(&mut self, description: impl Into<String>, target: EntryId) -> EntryId {
        let id = self.push(labels::UNDO_FAILED.to_string(), description.into(), Status::Error, None);
        while self.entries.len() > self.config.capacity {
            let evictable = self
                .entries
                .iter()
                .rposition(|entry| entry.id != target && !entry.is_reversible());
            match evictable.and_then(|index| self.entries.remove(index)) {
                Some(evicted) => tracing::trace!(id = evicted.id, "Evicted log entry"),
                None => break,
            }
        }
        id
    }

    fn push(&mut self, operation: String, description: String, status: Status, undo: Option<UndoAction>) -> EntryId {
        let entry = OperationLogEntry {
            id: self.next_id(),
            operation,
            description,
            status,
            timestamp: Local::now(),
            undo,
        };
        let id = entry.id;

        tracing::debug!(
            id,
            operation = %entry.operation,
            ?status,
            undoable = entry.undo.is_some(),
            "{}",
            entry.description
        );

        self.entries.push_front(entry);

        // Errors never auto-reveal
        if self.config.auto_reveal && !self.visible && status != Status::Error {
            self.show();
        }

        id
    }

    /// Record the outcome of an empty-directory cleanup
    ///
    /// The summary entry carries the undo descriptor; per-directory details
    /// follow it, capped at `cleanup_detail_limit`.
    pub fn record_cleanup(&mut self, cleaned_directories: Vec<String>) -> EntryId {
        if cleaned_directories.is_empty() {
            return self.record(
                labels::CLEAN_EMPTY_DIRS,
                "No empty directories found",
                Status::Success,
                None,
            );
        }

        let count = cleaned_directories.len();
        let limit = self.config.cleanup_detail_limit;
        let details: Vec<String> = cleaned_directories.iter().take(limit).cloned().collect();

        let summary = self.record(
            labels::CLEAN_EMPTY_DIRS,
            format!("Removed {} empty directories", count),
            Status::Success,
            Some(UndoAction::RestoreEmptyDirectories {
                directories: cleaned_directories,
            }),
        );

        for dir in details {
            self.record(
                labels::CLEAN_DETAIL,
                format!("Removed empty directory: {}", dir),
                Status::Success,
                None,
            );
        }
        if count > limit {
            self.record(
                labels::CLEAN_DETAIL,
                format!("... and {} more directories", count - limit),
                Status::Success,
                None,
            );
        }

        summary
    }

    /// Empty the log
    pub fn clear(&mut self) {
        tracing::debug!(count = self.entries.len(), "Operation log cleared");
        self.entries.clear();
    }

    /// True iff the newest entry carries an undo descriptor
    pub fn can_undo_most_recent(&self) -> bool {
        self.entries.front().map_or(false, OperationLogEntry::is_undoable)
    }

    pub fn most_recent(&self) -> Option<&OperationLogEntry> {
        self.entries.front()
    }

    pub fn get(&self, id: EntryId) -> Option<&OperationLogEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    /// Remove an entry; returns it if it was present
    pub fn remove(&mut self, id: EntryId) -> Option<OperationLogEntry> {
        let index = self.entries.iter().position(|entry| entry.id == id)?;
        self.entries.remove(index)
    }

    /// Entries, newest first
    pub fn entries(&self) -> impl Iterator<Item = &OperationLogEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.config.capacity
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn show(&mut self) {
        self.set_visible(true);
    }

    pub fn hide(&mut self) {
        self.set_visible(false);
    }

    pub fn toggle(&mut self) {
        self.set_visible(!self.visible);
    }

    fn set_visible(&mut self, visible: bool) {
        if self.visible != visible {
            self.visible = visible;
            self.events.emit(UiEvent::LogVisibility(visible));
        }
    }

    /// Count shown on the collapsed log button
    pub fn badge_count(&self) -> Option<usize> {
        if self.visible || self.entries.is_empty() {
            None
        } else {
            Some(self.entries.len())
        }
    }
}

//! Undo engine - reverses logged operations through the backend

use crate::backend::Backend;
use crate::error::UndoError;
use crate::events::EventSink;
use crate::history::{labels, EntryId, OperationLog, Status, UndoAction};
use ipc_proto::{Mode, RestoreRequest};
use std::sync::Arc;

/// Where the most recent undo attempt stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UndoPhase {
    Idle,
    Dispatching,
    Applied,
    Rejected,
}

/// A successful undo
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UndoOutcome {
    /// Entry that was reversed and removed
    pub undone: EntryId,
    /// Success entry describing the undo
    pub recorded: EntryId,
}

pub struct UndoEngine<B> {
    backend: Arc<B>,
    events: EventSink,
    mode: Mode,
    phase: UndoPhase,
}

impl<B: Backend> UndoEngine<B> {
    pub fn new(backend: Arc<B>, events: EventSink, mode: Mode) -> Self {
        Self {
            backend,
            events,
            mode,
            phase: UndoPhase::Idle,
        }
    }

    /// Mode sent along with restoration requests
    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    pub fn phase(&self) -> UndoPhase {
        self.phase
    }

    /// Undo the newest entry, if it is undoable
    ///
    /// Nothing is attempted (and nothing logged) when the newest entry has no
    /// descriptor.
    pub async fn undo_last(&mut self, log: &mut OperationLog) -> Result<UndoOutcome, UndoError> {
        let id = match log.most_recent() {
            Some(entry) if entry.is_undoable() => entry.id(),
            _ => return Err(UndoError::NotUndoable),
        };
        self.undo(log, id).await
    }

    /// Undo a specific entry
    ///
    /// On success the entry is removed and one success entry is recorded. On
    /// failure one error entry is recorded and nothing else changes.
    pub async fn undo(&mut self, log: &mut OperationLog, id: EntryId) -> Result<UndoOutcome, UndoError> {
        self.phase = UndoPhase::Dispatching;

        match self.dispatch(log, id).await {
            Ok(outcome) => {
                self.phase = UndoPhase::Applied;
                tracing::info!(entry = id, "Operation undone");
                self.events.success("Operation undone");
                Ok(outcome)
            }
            Err(e) => {
                self.phase = UndoPhase::Rejected;
                tracing::warn!(entry = id, "Undo rejected: {}", e);
                log.record_undo_failure(format!("Undo failed: {}", e), id);
                self.events.error(format!("Undo failed: {}", e));
                Err(e)
            }
        }
    }

    async fn dispatch(&self, log: &mut OperationLog, id: EntryId) -> Result<UndoOutcome, UndoError> {
        let (action, description) = match log.get(id) {
            Some(entry) => match entry.undo() {
                Some(action) => (action.clone(), entry.description().to_string()),
                None => return Err(UndoError::NotUndoable),
            },
            None => return Err(UndoError::NotUndoable),
        };

        match action {
            UndoAction::RestoreEmptyDirectories { directories } => {
                self.restore_directories(directories).await?;
            }
            UndoAction::DeleteFiles { .. } => return Err(UndoError::Irreversible),
            UndoAction::Unrecognized { kind } => return Err(UndoError::UnsupportedUndoKind(kind)),
        }

        log.remove(id);
        let recorded = log.record(
            labels::UNDO,
            format!("Undone: {}", description),
            Status::Success,
            None,
        );

        Ok(UndoOutcome {
            undone: id,
            recorded,
        })
    }

    async fn restore_directories(&self, directories: Vec<String>) -> Result<(), UndoError> {
        let request = RestoreRequest {
            directories,
            mode: self.mode,
        };
        tracing::debug!(count = request.directories.len(), mode = %self.mode, "Restoring directories");

        let response = self
            .backend
            .restore_directories(&request)
            .await
            .map_err(|e| UndoError::RestoreFailed(e.to_string()))?;

        if response.success {
            Ok(())
        } else {
            Err(UndoError::RestoreFailed(
                response
                    .message
                    .unwrap_or_else(|| "Failed to restore directories".to_string()),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::fake::FakeBackend;
    use crate::config::HistoryConfig;
    use crate::events::{drain, NoticeLevel, UiEvent};
    use crate::history::OperationLogEntry;
    use ipc_proto::RestoreResponse;

    fn setup(backend: FakeBackend) -> (UndoEngine<FakeBackend>, Arc<FakeBackend>, OperationLog) {
        let backend = Arc::new(backend);
        let engine = UndoEngine::new(backend.clone(), EventSink::disconnected(), Mode::Remote);
        let log = OperationLog::new(HistoryConfig::default(), EventSink::disconnected());
        (engine, backend, log)
    }

    fn restore_action() -> Option<UndoAction> {
        Some(UndoAction::RestoreEmptyDirectories {
            directories: vec!["/srv/a".into(), "/srv/b".into()],
        })
    }

    fn ids(log: &OperationLog) -> Vec<EntryId> {
        log.entries().map(OperationLogEntry::id).collect()
    }

    #[tokio::test]
    async fn test_restore_success_replaces_entry() {
        let (mut engine, backend, mut log) = setup(FakeBackend::connected(Mode::Remote));
        let older = log.record("rename", "renamed", Status::Success, None);
        let target = log.record("clean empty dirs", "Removed 2 empty directories", Status::Success, restore_action());

        let outcome = engine.undo(&mut log, target).await.unwrap();

        assert_eq!(outcome.undone, target);
        assert_eq!(ids(&log), vec![outcome.recorded, older]);
        let recorded = log.get(outcome.recorded).unwrap();
        assert_eq!(recorded.status(), Status::Success);
        assert_eq!(recorded.description(), "Undone: Removed 2 empty directories");
        assert_eq!(engine.phase(), UndoPhase::Applied);

        let calls = backend.restore_calls.lock().clone();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].directories, vec!["/srv/a".to_string(), "/srv/b".to_string()]);
        assert_eq!(calls[0].mode, Mode::Remote);
    }

    #[tokio::test]
    async fn test_restore_failure_keeps_entry_for_retry() {
        let backend = FakeBackend::connected(Mode::Local);
        *backend.restore_result.lock() = Ok(RestoreResponse::failed("disk is read-only"));
        let (mut engine, _backend, mut log) = setup(backend);
        engine.set_mode(Mode::Local);
        let target = log.record("clean empty dirs", "Removed 2", Status::Success, restore_action());

        let err = engine.undo(&mut log, target).await.unwrap_err();

        assert_eq!(err, UndoError::RestoreFailed("disk is read-only".into()));
        assert_eq!(log.len(), 2);
        assert!(log.get(target).is_some());
        assert_eq!(log.most_recent().unwrap().status(), Status::Error);
        assert_eq!(engine.phase(), UndoPhase::Rejected);
    }

    #[tokio::test]
    async fn test_transport_failure_is_restore_failed() {
        let backend = FakeBackend::connected(Mode::Remote);
        *backend.restore_result.lock() = Err("connection reset".into());
        let (mut engine, _backend, mut log) = setup(backend);
        let target = log.record("clean", "x", Status::Success, restore_action());

        let err = engine.undo(&mut log, target).await.unwrap_err();
        assert!(matches!(err, UndoError::RestoreFailed(msg) if msg.contains("connection reset")));
        assert!(log.get(target).is_some());
    }

    #[tokio::test]
    async fn test_delete_files_is_irreversible() {
        let (mut engine, backend, mut log) = setup(FakeBackend::connected(Mode::Remote));
        let reversible = log.record("clean", "x", Status::Success, restore_action());
        let deletion = log.record(
            "delete",
            "deleted /srv/file",
            Status::Success,
            Some(UndoAction::DeleteFiles {
                paths: vec!["/srv/file".into()],
            }),
        );

        for _ in 0..2 {
            let err = engine.undo(&mut log, deletion).await.unwrap_err();
            assert_eq!(err, UndoError::Irreversible);
        }

        assert!(log.get(reversible).unwrap().is_undoable());
        assert!(log.get(deletion).is_some());
        // two rejection entries on top of the original two
        assert_eq!(log.len(), 4);
        assert!(backend.restore_calls.lock().is_empty());
    }

    #[tokio::test]
    async fn test_not_undoable() {
        let (mut engine, _backend, mut log) = setup(FakeBackend::connected(Mode::Remote));
        let plain = log.record("rename", "x", Status::Success, None);

        assert_eq!(engine.undo(&mut log, plain).await.unwrap_err(), UndoError::NotUndoable);
        assert_eq!(engine.undo(&mut log, 42).await.unwrap_err(), UndoError::NotUndoable);
        assert_eq!(log.len(), 3);
    }

    #[tokio::test]
    async fn test_rejection_on_full_log_keeps_reversible_entries() {
        let (mut engine, _backend, mut log) = setup(FakeBackend::connected(Mode::Remote));
        let reversible = log.record("clean", "oldest", Status::Success, restore_action());
        for i in 0..48 {
            log.record("rename", format!("entry {}", i), Status::Success, None);
        }
        let deletion = log.record(
            "delete",
            "deleted /srv/file",
            Status::Success,
            Some(UndoAction::DeleteFiles {
                paths: vec!["/srv/file".into()],
            }),
        );
        assert_eq!(log.len(), 50);

        assert_eq!(engine.undo(&mut log, deletion).await.unwrap_err(), UndoError::Irreversible);

        assert_eq!(log.len(), 50);
        assert!(log.get(reversible).is_some());
        assert!(log.get(deletion).is_some());
    }

    #[tokio::test]
    async fn test_failed_restore_of_oldest_entry_can_be_retried() {
        let backend = FakeBackend::connected(Mode::Remote);
        *backend.restore_result.lock() = Ok(RestoreResponse::failed("disk is read-only"));
        let (mut engine, backend, mut log) = setup(backend);
        let target = log.record("clean", "oldest", Status::Success, restore_action());
        for i in 0..49 {
            log.record("rename", format!("entry {}", i), Status::Success, None);
        }

        assert!(engine.undo(&mut log, target).await.is_err());
        assert_eq!(log.len(), 50);
        assert!(log.get(target).is_some());

        *backend.restore_result.lock() = Ok(RestoreResponse::ok());
        let outcome = engine.undo(&mut log, target).await.unwrap();
        assert_eq!(outcome.undone, target);
        assert!(log.get(target).is_none());
    }

    #[tokio::test]
    async fn test_unrecognized_kind() {
        let (mut engine, _backend, mut log) = setup(FakeBackend::connected(Mode::Remote));
        let id = log.record(
            "move",
            "x",
            Status::Success,
            Some(UndoAction::Unrecognized {
                kind: "move_files".into(),
            }),
        );
        let err = engine.undo(&mut log, id).await.unwrap_err();
        assert_eq!(err, UndoError::UnsupportedUndoKind("move_files".into()));
    }

    #[tokio::test]
    async fn test_second_undo_of_same_entry_fails() {
        let (mut engine, _backend, mut log) = setup(FakeBackend::connected(Mode::Remote));
        let target = log.record("clean", "x", Status::Success, restore_action());

        engine.undo(&mut log, target).await.unwrap();
        assert_eq!(engine.undo(&mut log, target).await.unwrap_err(), UndoError::NotUndoable);
    }

    #[tokio::test]
    async fn test_undo_last_requires_undoable_front() {
        let (mut engine, _backend, mut log) = setup(FakeBackend::connected(Mode::Remote));
        assert_eq!(engine.undo_last(&mut log).await.unwrap_err(), UndoError::NotUndoable);
        assert!(log.is_empty());
        assert_eq!(engine.phase(), UndoPhase::Idle);

        let target = log.record("clean", "x", Status::Success, restore_action());
        let outcome = engine.undo_last(&mut log).await.unwrap();
        assert_eq!(outcome.undone, target);
    }

    #[tokio::test]
    async fn test_per_entry_undo_of_older_entry() {
        let (mut engine, _backend, mut log) = setup(FakeBackend::connected(Mode::Remote));
        let target = log.record("clean", "older", Status::Success, restore_action());
        log.record("rename", "newer", Status::Success, None);

        assert!(!log.can_undo_most_recent());
        let outcome = engine.undo(&mut log, target).await.unwrap();
        assert!(log.get(outcome.undone).is_none());
    }

    #[tokio::test]
    async fn test_notices() {
        let backend = Arc::new(FakeBackend::connected(Mode::Remote));
        let (sink, rx) = EventSink::channel();
        let mut engine = UndoEngine::new(backend, sink, Mode::Remote);
        let mut log = OperationLog::new(HistoryConfig::default(), EventSink::disconnected());

        let target = log.record("clean", "x", Status::Success, restore_action());
        engine.undo(&mut log, target).await.unwrap();
        engine.undo(&mut log, target).await.unwrap_err();

        let levels: Vec<_> = drain(&rx)
            .into_iter()
            .filter_map(|event| match event {
                UiEvent::Notice { level, .. } => Some(level),
                _ => None,
            })
            .collect();
        assert_eq!(levels, vec![NoticeLevel::Success, NoticeLevel::Error]);
    }
}

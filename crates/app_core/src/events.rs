//! UI events emitted by the core
//!
//! The core never touches widgets; it reports what the UI layer should show
//! over a channel and the UI drains it on its own schedule.

use crossbeam_channel::{Receiver, Sender};
use ipc_proto::Mode;

/// Severity of a user-facing notice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// Something the UI layer should reflect
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    /// Toast message
    Notice { level: NoticeLevel, message: String },
    /// Connection indicator for `mode` changed
    ConnectionChanged { connected: bool, mode: Mode },
    /// Operation log panel shown or hidden
    LogVisibility(bool),
    /// The browse view should close
    BrowseClosed,
}

/// Sending half of the UI event channel
///
/// A disconnected sink drops everything, which is what headless callers want.
#[derive(Debug, Clone, Default)]
pub struct EventSink {
    tx: Option<Sender<UiEvent>>,
}

impl EventSink {
    /// Create a sink and the receiver the UI drains
    pub fn channel() -> (Self, Receiver<UiEvent>) {
        let (tx, rx) = crossbeam_channel::unbounded();
        (Self { tx: Some(tx) }, rx)
    }

    /// A sink that discards events
    pub fn disconnected() -> Self {
        Self { tx: None }
    }

    pub fn emit(&self, event: UiEvent) {
        if let Some(tx) = &self.tx {
            if tx.send(event).is_err() {
                tracing::trace!("UI event receiver dropped");
            }
        }
    }

    pub fn notice(&self, level: NoticeLevel, message: impl Into<String>) {
        let message = message.into();
        tracing::debug!(?level, "{}", message);
        self.emit(UiEvent::Notice { level, message });
    }

    pub fn success(&self, message: impl Into<String>) {
        self.notice(NoticeLevel::Success, message);
    }

    pub fn warning(&self, message: impl Into<String>) {
        self.notice(NoticeLevel::Warning, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.notice(NoticeLevel::Error, message);
    }
}

/// Drain everything currently queued; handy for UI frames and tests
pub fn drain(rx: &Receiver<UiEvent>) -> Vec<UiEvent> {
    rx.try_iter().collect()
}

//! Application error types

use thiserror::Error;

/// Failure talking to a backend collaborator
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Malformed response: {0}")]
    Protocol(#[from] ipc_proto::ProtoError),
}

/// Browse session errors
#[derive(Error, Debug)]
pub enum BrowseError {
    #[error("Not connected to the SSH server")]
    ConnectionRequired,

    #[error("Directory listing failed: {0}")]
    ListingFailed(String),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("No browse session is open")]
    NoSession,

    #[error("Browse target field id is empty")]
    EmptyTargetField,

    #[error("Cannot select: {0}")]
    InvalidSelection(String),

    #[error("The drive list is not a selectable location")]
    SyntheticLocation,

    #[error("Path is empty")]
    EmptyPath,
}

/// Undo errors; every variant leaves the log's existing entries untouched
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UndoError {
    #[error("This operation cannot be undone")]
    NotUndoable,

    #[error("Unsupported undo type: {0}")]
    UnsupportedUndoKind(String),

    #[error("File deletion cannot be undone")]
    Irreversible,

    #[error("Restoring directories failed: {0}")]
    RestoreFailed(String),
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    // ===== Recoverable Errors (notify user, continue) =====
    #[error(transparent)]
    Browse(#[from] BrowseError),

    #[error(transparent)]
    Undo(#[from] UndoError),

    // ===== Fatal Errors (refuse to start) =====
    #[error("Configuration error: {0}")]
    Config(String),
}

impl BrowseError {
    /// Warnings ask the user to do something first; everything else is an error
    pub fn is_warning(&self) -> bool {
        matches!(self, BrowseError::ConnectionRequired | BrowseError::EmptyPath)
    }
}

impl AppError {
    /// Is this error recoverable?
    pub fn is_recoverable(&self) -> bool {
        matches!(self, AppError::Browse(_) | AppError::Undo(_))
    }

    /// Is this a fatal error?
    pub fn is_fatal(&self) -> bool {
        !self.is_recoverable()
    }

    /// Get a user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            AppError::Browse(BrowseError::ConnectionRequired) => {
                "Please connect to the SSH server first".to_string()
            }
            AppError::Browse(BrowseError::EmptyPath) => "Please enter a valid path".to_string(),
            AppError::Browse(BrowseError::ListingFailed(msg)) => msg.clone(),
            AppError::Undo(e) => format!("Undo failed: {}", e),
            _ => self.to_string(),
        }
    }
}

//! Wire protocol between the client core and the file-management backend
//!
//! These are the JSON request/response shapes of the backend endpoints the
//! core talks to:
//! - `/connection_status` -> [`ConnectionStatus`]
//! - `/browse?path=...` -> [`ListingResponse`]
//! - `/restore_directories` <- [`RestoreRequest`] -> [`RestoreResponse`]
//!
//! Undo payloads recorded by operation producers travel as [`WireUndo`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Backend endpoints
pub mod endpoint {
    pub const CONNECTION_STATUS: &str = "/connection_status";
    pub const BROWSE: &str = "/browse";
    /// Query parameter of [`BROWSE`]
    pub const BROWSE_PATH: &str = "path";
    pub const RESTORE_DIRECTORIES: &str = "/restore_directories";
}

/// Which side the backend is operating on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// The machine the backend runs on
    Local,
    /// An SSH target the backend is connected to
    #[default]
    Remote,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Local => "local",
            Mode::Remote => "remote",
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Response of the connection status endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionStatus {
    pub connected: bool,
    /// Older backends omit the mode; they only ever serve remote targets.
    #[serde(default)]
    pub mode: Mode,
}

/// One entry of a directory listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirItem {
    pub name: String,
    pub path: String,
    pub is_dir: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// Backend formatted timestamp (`%Y-%m-%d %H:%M:%S`)
    #[serde(default)]
    pub modified: String,
}

/// Response of the directory listing endpoint
///
/// Success carries `items` and the authoritative `current_path`; failure only
/// carries `message`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingResponse {
    pub success: bool,
    #[serde(default)]
    pub items: Vec<DirItem>,
    #[serde(default)]
    pub current_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// A successful listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing {
    pub items: Vec<DirItem>,
    pub current_path: String,
}

impl ListingResponse {
    pub fn ok(current_path: impl Into<String>, items: Vec<DirItem>) -> Self {
        Self {
            success: true,
            items,
            current_path: current_path.into(),
            message: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            items: Vec::new(),
            current_path: String::new(),
            message: Some(message.into()),
        }
    }

    /// Split into the listing or the backend's failure message
    pub fn into_result(self) -> Result<Listing, String> {
        if self.success {
            Ok(Listing {
                items: self.items,
                current_path: self.current_path,
            })
        } else {
            Err(self.message.unwrap_or_else(|| "Directory listing failed".to_string()))
        }
    }
}

/// Request body of the directory restoration endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestoreRequest {
    pub directories: Vec<String>,
    pub mode: Mode,
}

/// Response of the directory restoration endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestoreResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl RestoreResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            message: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
        }
    }
}

/// Undo payload as produced by operation producers: `{"type": ..., "data": ...}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireUndo {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

impl WireUndo {
    pub const CLEAN_EMPTY_DIRS: &'static str = "clean_empty_dirs";
    pub const DELETE_FILES: &'static str = "delete_files";

    /// Interpret `data` as a list of paths
    pub fn paths(&self) -> Result<Vec<String>, ProtoError> {
        serde_json::from_value(self.data.clone()).map_err(|e| ProtoError::Payload {
            kind: self.kind.clone(),
            source: e,
        })
    }
}

/// Protocol decoding errors
#[derive(Debug, Error)]
pub enum ProtoError {
    #[error("Malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed payload for undo kind '{kind}': {source}")]
    Payload {
        kind: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Decode a listing response body
pub fn decode_listing(body: &str) -> Result<ListingResponse, ProtoError> {
    Ok(serde_json::from_str(body)?)
}

/// Decode a connection status body
pub fn decode_status(body: &str) -> Result<ConnectionStatus, ProtoError> {
    Ok(serde_json::from_str(body)?)
}

/// Encode a restoration request body
pub fn encode_restore(request: &RestoreRequest) -> Result<String, ProtoError> {
    Ok(serde_json::to_string(request)?)
}

/// Decode a restoration response body
pub fn decode_restore(body: &str) -> Result<RestoreResponse, ProtoError> {
    Ok(serde_json::from_str(body)?)
}

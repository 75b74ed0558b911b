//! Backend collaborator contract
//!
//! The core never lists directories or restores anything itself; it issues
//! these requests and reacts to the responses.

use crate::error::BackendError;
use async_trait::async_trait;
use ipc_proto::{endpoint, ConnectionStatus, ListingResponse, RestoreRequest, RestoreResponse};

pub type BackendResult<T> = std::result::Result<T, BackendError>;

/// Requests the core sends to the file-management backend
#[async_trait]
pub trait Backend: Send + Sync {
    /// Latest connection status as reported by the backend
    async fn connection_status(&self) -> BackendResult<ConnectionStatus>;

    /// List a directory; `path` is a serialized [`app_fs::Address`]
    async fn list_directory(&self, path: &str) -> BackendResult<ListingResponse>;

    /// Recreate directories removed by an empty-directory cleanup
    async fn restore_directories(&self, request: &RestoreRequest) -> BackendResult<RestoreResponse>;
}

/// Raw request/response exchange with the backend service
///
/// Implementations own connection handling and query encoding; bodies are
/// JSON text.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, endpoint: &str, query: &[(&str, &str)]) -> BackendResult<String>;

    async fn post(&self, endpoint: &str, body: String) -> BackendResult<String>;
}

/// [`Backend`] speaking the JSON endpoints over a [`Transport`]
pub struct JsonBackend<T> {
    transport: T,
}

impl<T: Transport> JsonBackend<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl<T: Transport> Backend for JsonBackend<T> {
    async fn connection_status(&self) -> BackendResult<ConnectionStatus> {
        let body = self.transport.get(endpoint::CONNECTION_STATUS, &[]).await?;
        Ok(ipc_proto::decode_status(&body)?)
    }

    async fn list_directory(&self, path: &str) -> BackendResult<ListingResponse> {
        let body = self
            .transport
            .get(endpoint::BROWSE, &[(endpoint::BROWSE_PATH, path)])
            .await?;
        Ok(ipc_proto::decode_listing(&body)?)
    }

    async fn restore_directories(&self, request: &RestoreRequest) -> BackendResult<RestoreResponse> {
        let body = ipc_proto::encode_restore(request)?;
        let body = self.transport.post(endpoint::RESTORE_DIRECTORIES, body).await?;
        Ok(ipc_proto::decode_restore(&body)?)
    }
}

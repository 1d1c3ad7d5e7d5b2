//! The remote store boundary.
//!
//! The engine only ever talks to persistence through [`RemoteStore::execute`]:
//! a named operation plus JSON variables in, `{data, error}` out. Transport,
//! schema and auth are the store's business.

mod client;
mod file;
mod memory;
mod operation;

pub use client::RemoteClient;
pub use file::{BoardFileLock, JsonFileRemote};
pub use memory::{InMemoryRemote, RecordedCall, RemoteTables};
pub use operation::{ArchiveAck, BatchAck, BoardData, CardPlacement, RemoteOperation};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// What a remote store answers: data on success, an error string on failure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RemoteResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RemoteResponse {
    pub fn data(data: Value) -> Self {
        Self {
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            data: None,
            error: Some(message.into()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Executes named operations against the authoritative store
#[async_trait]
pub trait RemoteStore: Send + Sync {
    async fn execute(&self, operation: &str, variables: Value) -> RemoteResponse;
}

#[async_trait]
impl<R: RemoteStore + ?Sized> RemoteStore for Arc<R> {
    async fn execute(&self, operation: &str, variables: Value) -> RemoteResponse {
        (**self).execute(operation, variables).await
    }
}

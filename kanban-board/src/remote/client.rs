//! Typed, time-bounded calls over a [`RemoteStore`].

use super::{RemoteOperation, RemoteStore};
use crate::error::{BoardError, Result};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio::time::Instant;
use tracing::trace;

/// Wraps a store with a per-call timeout and typed payload decoding.
///
/// Every failure mode of a call maps onto one `BoardError`: an error string
/// becomes `Remote`, expiry becomes `Timeout`, and a payload that does not
/// decode becomes `MalformedPayload`.
#[derive(Debug, Clone)]
pub struct RemoteClient<R> {
    store: R,
    timeout: Duration,
}

impl<R: RemoteStore> RemoteClient<R> {
    pub fn new(store: R, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    pub fn store(&self) -> &R {
        &self.store
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Execute an operation and decode its `data` as `T`
    pub async fn call<T: DeserializeOwned>(&self, operation: &RemoteOperation) -> Result<T> {
        let name = operation.name();
        let variables = operation.variables()?;
        trace!(operation = name, %variables, "remote call");

        let started = Instant::now();
        let response = tokio::time::timeout(self.timeout, self.store.execute(name, variables))
            .await
            .map_err(|_| BoardError::Timeout {
                operation: name.to_string(),
                elapsed_ms: started.elapsed().as_millis() as u64,
            })?;

        if let Some(message) = response.error {
            return Err(BoardError::remote(name, message));
        }
        let data = response
            .data
            .ok_or_else(|| BoardError::malformed(name, "response carried neither data nor error"))?;
        serde_json::from_value(data).map_err(|e| BoardError::malformed(name, e.to_string()))
    }
}

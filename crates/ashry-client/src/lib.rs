//! Client SDK for the two endpoints an editing session talks to
//!
//! The execution endpoint runs submitted code and answers over plain HTTP; the
//! sync endpoint mirrors editor contents over a WebSocket. Both are reached
//! through traits so the session controller can be driven by in-memory fakes
//! in tests and by the real network clients in the binary.

use anyhow::Result;
use ashry_types::{CodeUpdate, ExecutionError, RunRequest};
use async_trait::async_trait;

pub mod http_client;
pub mod sync;

pub use sync::{wait_finished, SyncConnection, SyncEvent};

/// ExecutionClient trait for submitting code to an execution endpoint
#[async_trait]
pub trait ExecutionClient: Send + Sync {
    /// Submit a run request and return the raw response body on success
    async fn execute(&self, request: &RunRequest) -> Result<String, ExecutionError>;

    /// Check if the execution endpoint is reachable
    async fn health_check(&self) -> Result<()>;
}

pub type ExecutionClientBox = Box<dyn ExecutionClient>;

/// Outbound half of a sync channel, owned by exactly one session.
pub trait SyncTransport: Send + Sync {
    /// Queue an update for delivery to the sync endpoint
    fn send(&self, update: &CodeUpdate) -> Result<()>;

    /// Tear the channel down; further sends fail
    fn close(&self);
}

pub type SyncTransportBox = Box<dyn SyncTransport>;

/// Factory for creating ExecutionClient instances
pub struct ExecutionClientFactory;

impl ExecutionClientFactory {
    /// Create an HTTP client for a remote execution server
    pub fn create_http_client(base_url: String) -> ExecutionClientBox {
        Box::new(http_client::HttpExecutionClient::new(base_url))
    }
}

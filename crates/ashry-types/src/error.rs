//! Error types for execution and synchronization payloads.

use thiserror::Error;

/// Failures of a submission to the execution endpoint.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecutionError {
    /// The endpoint answered with a non-success status.
    #[error("HTTP error! status: {status}")]
    Status { status: u16 },

    /// The request never produced a response (unreachable host, reset, ...).
    #[error("{message}")]
    Transport { message: String },
}

impl ExecutionError {
    pub fn status(status: u16) -> Self {
        Self::Status { status }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }
}

/// An inbound sync frame that could not be interpreted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    #[error("Malformed sync frame: {message}")]
    Malformed { message: String },
}

impl FrameError {
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }
}

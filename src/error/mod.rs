//! Error types for Convoy.

use std::path::PathBuf;

use thiserror::Error;

/// Primary error type for all Convoy operations.
#[derive(Error, Debug)]
pub enum ConvoyError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("API error (status {status}): {body}")]
    Api { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Create conversation failed: {0}")]
    CreationFailed(#[source] Box<ConvoyError>),

    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error("Malformed trajectory: {0}")]
    MalformedTrajectory(String),

    #[error("No agent message or finish action found in trajectory")]
    NoAgentMessage,

    #[error("Trajectory file not found: {}", .0.display())]
    TrajectoryNotFound(PathBuf),
}

impl ConvoyError {
    /// Create an API error from a non-2xx response.
    pub fn api(status: u16, body: impl Into<String>) -> Self {
        Self::Api {
            status,
            body: body.into(),
        }
    }

    /// Wrap a transport failure raised while creating a conversation.
    pub fn creation_failed(source: ConvoyError) -> Self {
        Self::CreationFailed(Box::new(source))
    }

    /// Whether this error aborts the run instead of degrading to a warning.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Configuration(_) | Self::CreationFailed(_) | Self::UnexpectedResponse(_)
        )
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Configuration(_) => 2,
            Self::CreationFailed(_) | Self::UnexpectedResponse(_) => 3,
            _ => 1,
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, ConvoyError>;

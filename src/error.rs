//! Error types for samtools-mcp.
//!
//! Uses thiserror for ergonomic error handling with proper
//! error chain propagation.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level server error.
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Execution error: {0}")]
    Exec(#[from] ExecError),

    #[error("Validation error: {0}")]
    Security(#[from] crate::security::SecurityError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Tool error: {0}")]
    Tool(String),
}

/// Subprocess execution errors.
#[derive(Error, Debug)]
pub enum ExecError {
    #[error("Failed to launch '{bin}': {source}. Is samtools installed and on PATH?")]
    Spawn {
        bin: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("samtools exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },

    #[error("samtools was terminated by a signal")]
    Signalled,
}

/// Result type alias for server operations.
pub type Result<T> = std::result::Result<T, ServerError>;

/// Result type alias for subprocess execution.
pub type ExecResult<T> = std::result::Result<T, ExecError>;

// Error code implementations for machine-readable error responses
impl ServerError {
    /// Returns a machine-readable error code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Exec(e) => e.code(),
            Self::Security(e) => e.code(),
            Self::Io(_) => "IO_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Tool(_) => "TOOL_ERROR",
        }
    }
}

impl ExecError {
    /// Returns a machine-readable error code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Spawn { .. } => "SPAWN_ERROR",
            Self::Failed { .. } => "COMMAND_FAILED",
            Self::Signalled => "SIGNALLED",
        }
    }
}

// Conversion to rmcp tool errors
impl From<ServerError> for rmcp::Error {
    fn from(err: ServerError) -> Self {
        rmcp::Error::internal_error(err.to_string(), None)
    }
}

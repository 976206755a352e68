use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MetasiftError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Missing dependency: {tool}. {hint}")]
    MissingDependency { tool: String, hint: String },

    #[error("File not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    #[error("Not a regular file: {}", path.display())]
    NotAFile { path: PathBuf },

    #[error(
        "Metadata extraction failed (exit code {}): {stderr}. command={command_args}",
        code.map_or_else(|| "none".to_string(), |c| c.to_string())
    )]
    ExtractionFailed {
        code: Option<i32>,
        stderr: String,
        command_args: String,
    },

    #[error("Extraction timed out after {after:?}. command={command_args}")]
    Timeout {
        command_args: String,
        after: Duration,
    },

    #[error("Could not write report to {}: {source}", path.display())]
    ReportWriteFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Interrupted by user")]
    Interrupted,
}

impl MetasiftError {
    /// Process exit code for this error. Interruption is a clean exit.
    pub fn exit_code(&self) -> i32 {
        match self {
            MetasiftError::Interrupted => 0,
            _ => 1,
        }
    }
}

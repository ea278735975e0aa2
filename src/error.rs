use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Fatal errors that abort generation
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("version file not found: {}", path.display())]
    MissingVersionFile { path: PathBuf },

    #[error("failed to read version file {}", path.display())]
    VersionRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("project config {} is missing metadata field '{key}'", path.display())]
    MissingMetadataField { key: String, path: PathBuf },

    #[error("failed to read project config {}: {reason}", path.display())]
    ConfigRead { path: PathBuf, reason: String },

    #[error("invalid settings file {}: {reason}", path.display())]
    Settings { path: PathBuf, reason: String },

    #[error("failed to write {}", path.display())]
    WriteFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Why a best-effort source-control lookup produced no value
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("'{0}' not found on PATH")]
    ToolNotFound(String),

    #[error("failed to run '{tool}': {source}")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{tool}' did not finish within {timeout:?}")]
    Timeout { tool: String, timeout: Duration },

    #[error("'{tool}' exited with {status}: {stderr}")]
    ExitStatus {
        tool: String,
        status: std::process::ExitStatus,
        stderr: String,
    },

    #[error("'{0}' produced no output")]
    EmptyOutput(String),

    #[error("unexpected output from '{tool}': {output:?}")]
    MalformedOutput { tool: String, output: String },
}

pub type Result<T, E = GenerateError> = std::result::Result<T, E>;

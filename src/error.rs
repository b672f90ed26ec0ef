//! Error types for component code generation

use std::path::PathBuf;

use thiserror::Error;

/// Result type for codegen operations
pub type Result<T> = std::result::Result<T, CodegenError>;

/// Codegen errors
#[derive(Error, Debug)]
pub enum CodegenError {
    #[error("Malformed schema {}: {reason}", .file.display())]
    MalformedSchema { file: PathBuf, reason: String },

    #[error("Duplicate component id {id}: declared in {} and {}", .first.display(), .second.display())]
    DuplicateId {
        id: String,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("Unknown {field} tag {tag:?} on parameter {parameter} of component {schema_id}")]
    UnknownCodecTag {
        schema_id: String,
        parameter: String,
        field: &'static str,
        tag: String,
    },

    #[error("Command failed ({status}): {command}{}", format_stderr(.stderr))]
    CollaboratorFailure {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("Directory not found: {}", .0.display())]
    MissingDirectory(PathBuf),

    #[error("IO error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config_crate::ConfigError),

    #[error("Failed to publish {}: {}", .0.file.path().display(), .0.error)]
    Persist(#[from] tempfile::PersistError),
}

impl CodegenError {
    /// Attach a path to an IO error
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CodegenError::Io {
            path: path.into(),
            source,
        }
    }

    /// Build a malformed schema error for a file
    pub fn malformed(file: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        CodegenError::MalformedSchema {
            file: file.into(),
            reason: reason.into(),
        }
    }
}

fn format_stderr(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("\n{}", trimmed)
    }
}

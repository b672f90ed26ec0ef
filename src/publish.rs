//! Artifact publication
//!
//! Every artifact of a batch is staged in a temporary file next to its
//! target before any target is replaced. A failure while staging leaves all
//! previously published files untouched.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use similar::TextDiff;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::codegen::normalize_timestamp;
use crate::error::{CodegenError, Result};

/// A rendered file waiting to be published
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub path: PathBuf,
    pub content: String,
}

impl Artifact {
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

/// An artifact whose published file differs from its rendering
#[derive(Debug, Clone)]
pub struct StaleArtifact {
    pub path: PathBuf,
    /// Unified diff from the published file to the fresh rendering
    pub diff: String,
}

/// Publish a batch of artifacts all-or-nothing
pub fn publish(artifacts: &[Artifact]) -> Result<()> {
    let mut staged = Vec::with_capacity(artifacts.len());

    for artifact in artifacts {
        staged.push(stage(artifact)?);
    }

    for (file, artifact) in staged.into_iter().zip(artifacts) {
        file.persist(&artifact.path)?;
        info!(path = %artifact.path.display(), bytes = artifact.content.len(), "file written");
    }

    Ok(())
}

fn stage(artifact: &Artifact) -> Result<NamedTempFile> {
    let dir = parent_dir(&artifact.path);
    fs::create_dir_all(dir).map_err(|e| CodegenError::io(dir, e))?;

    let mut file = NamedTempFile::new_in(dir).map_err(|e| CodegenError::io(dir, e))?;
    file.write_all(artifact.content.as_bytes())
        .and_then(|_| file.as_file().sync_all())
        .map_err(|e| CodegenError::io(file.path(), e))?;

    debug!(path = %artifact.path.display(), staged = %file.path().display(), "staged artifact");
    Ok(file)
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// Compare artifacts against their published files, ignoring the header timestamp
pub fn check(artifacts: &[Artifact]) -> Result<Vec<StaleArtifact>> {
    let mut stale = Vec::new();

    for artifact in artifacts {
        let published = match fs::read_to_string(&artifact.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(CodegenError::io(&artifact.path, e)),
        };

        let old = normalize_timestamp(&published);
        let new = normalize_timestamp(&artifact.content);
        if old != new {
            let name = artifact.path.display().to_string();
            let diff = TextDiff::from_lines(&*old, &*new)
                .unified_diff()
                .header(&name, &name)
                .to_string();
            stale.push(StaleArtifact {
                path: artifact.path.clone(),
                diff,
            });
        }
    }

    Ok(stale)
}

//! Protobuf message modules
//!
//! Runs `protoc` over the prototypes directory and patches its Python output
//! so generated message modules import each other relative to the package.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, info};

use crate::error::{CodegenError, Result};
use crate::loader::matching_files;
use crate::publish::{publish, Artifact};

/// Suffix of protoc-generated Python modules
pub const MESSAGE_SUFFIX: &str = "_pb2.py";

const PROTO_SUFFIX: &str = ".proto";

/// Summary of an import rewrite pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RewriteReport {
    pub files_scanned: usize,
    pub files_changed: usize,
    pub lines_rewritten: usize,
}

fn absolute_import() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^import.*_pb2.*").unwrap())
}

/// Rewrite absolute `*_pb2` imports in one module's text.
///
/// Returns the new text and the number of rewritten lines. Line endings and
/// non-matching lines are kept byte for byte.
pub fn rewrite_imports(text: &str) -> (String, usize) {
    let mut output = String::with_capacity(text.len() + 64);
    let mut rewritten = 0;

    for line in text.split_inclusive('\n') {
        if absolute_import().is_match(line) {
            output.push_str("from . ");
            rewritten += 1;
        }
        output.push_str(line);
    }

    (output, rewritten)
}

/// Rewrite every message module directly inside `package_dir`
pub fn rewrite_package(package_dir: &Path) -> Result<RewriteReport> {
    if !package_dir.is_dir() {
        return Err(CodegenError::MissingDirectory(package_dir.to_path_buf()));
    }

    let mut report = RewriteReport::default();
    let mut artifacts = Vec::new();

    for path in matching_files(package_dir, MESSAGE_SUFFIX)? {
        let text = fs::read_to_string(&path).map_err(|e| CodegenError::io(&path, e))?;
        let (rewritten, count) = rewrite_imports(&text);
        report.files_scanned += 1;

        if count > 0 {
            debug!(file = %path.display(), lines = count, "rewrote message imports");
            report.files_changed += 1;
            report.lines_rewritten += count;
            artifacts.push(Artifact::new(path, rewritten));
        }
    }

    publish(&artifacts)?;

    info!(
        scanned = report.files_scanned,
        changed = report.files_changed,
        lines = report.lines_rewritten,
        "rewrote message module imports"
    );
    Ok(report)
}

/// The `protoc` invocation for a prototypes directory
#[derive(Debug, Clone)]
pub struct MessageCompiler {
    pub program: PathBuf,
    pub prototypes_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl MessageCompiler {
    pub fn new(prototypes_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            program: PathBuf::from("protoc"),
            prototypes_dir: prototypes_dir.into(),
            output_dir: output_dir.into(),
        }
    }

    /// Proto sources, sorted by file name, relative to the prototypes directory
    pub fn sources(&self) -> Result<Vec<PathBuf>> {
        if !self.prototypes_dir.is_dir() {
            return Err(CodegenError::MissingDirectory(self.prototypes_dir.clone()));
        }

        Ok(matching_files(&self.prototypes_dir, PROTO_SUFFIX)?
            .into_iter()
            .filter_map(|p| p.file_name().map(PathBuf::from))
            .collect())
    }

    pub fn command(&self) -> Result<Command> {
        let mut command = Command::new(&self.program);
        command
            .arg(format!("--python_out={}", self.output_dir.display()))
            .args(self.sources()?)
            .current_dir(&self.prototypes_dir);
        Ok(command)
    }

    /// Compile all protos, then patch the generated imports
    pub fn run(&self) -> Result<RewriteReport> {
        fs::create_dir_all(&self.output_dir).map_err(|e| CodegenError::io(&self.output_dir, e))?;

        let mut command = self.command()?;
        info!(command = ?command, "compiling protobuf messages");
        crate::native::run_collaborator(&mut command)?;

        rewrite_package(&self.output_dir)
    }
}

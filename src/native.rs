//! Native library build
//!
//! Builds the FFI crate with cargo and copies the resulting shared library
//! into the package. The generator never looks inside the artifact.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, info};

use crate::config::{CodegenConfig, NativeConfig};
use crate::error::{CodegenError, Result};

/// Run a collaborator to completion; a non-zero exit is fatal and not retried
pub fn run_collaborator(command: &mut Command) -> Result<()> {
    let description = format!("{:?}", command);

    let output = command.output().map_err(|e| CodegenError::CollaboratorFailure {
        command: description.clone(),
        status: "failed to start".to_string(),
        stderr: e.to_string(),
    })?;

    if !output.status.success() {
        return Err(CodegenError::CollaboratorFailure {
            command: description,
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }

    debug!(command = %description, stderr = %String::from_utf8_lossy(&output.stderr), "collaborator finished");
    Ok(())
}

/// A cargo build of the FFI crate plus installation of its library
#[derive(Debug, Clone)]
pub struct NativeBuild {
    pub settings: NativeConfig,
    pub rust_dir: PathBuf,
    pub lib_dir: PathBuf,
    pub program: PathBuf,
}

impl NativeBuild {
    pub fn new(settings: NativeConfig, rust_dir: impl Into<PathBuf>, lib_dir: impl Into<PathBuf>) -> Self {
        Self {
            settings,
            rust_dir: rust_dir.into(),
            lib_dir: lib_dir.into(),
            program: PathBuf::from("cargo"),
        }
    }

    pub fn from_config(config: &CodegenConfig) -> Self {
        Self::new(config.native.clone(), config.rust_dir(), config.lib_dir())
    }

    /// Cargo profile directory name
    pub fn profile(&self) -> &'static str {
        if self.settings.debug {
            "debug"
        } else {
            "release"
        }
    }

    /// Feature flags; vulnerable noise takes precedence over system libraries
    pub fn feature_args(&self) -> Vec<&'static str> {
        if self.settings.use_vulnerable_noise {
            vec!["--no-default-features", "--features", "use-runtime use-direct-api"]
        } else if self.settings.use_system_libs {
            vec!["--features", "use-system-libs use-direct-api"]
        } else {
            vec!["--features", "use-direct-api"]
        }
    }

    pub fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        if self.settings.debug {
            command.arg("build");
        } else {
            command.args(["+stable", "build", "--release"]);
        }
        command
            .args(self.feature_args())
            .arg(format!(
                "--manifest-path={}",
                self.rust_dir.join(&self.settings.manifest).display()
            ))
            .env("RUST_BACKTRACE", "full")
            .env("RUSTFLAGS", "")
            .current_dir(&self.rust_dir);
        command
    }

    /// Build, then install the library. Returns the installed files.
    pub fn run(&self) -> Result<Vec<PathBuf>> {
        let mut command = self.command();
        info!(profile = self.profile(), command = ?command, "building native library");
        run_collaborator(&mut command)?;
        self.install_artifacts()
    }

    /// Replace the library directory with the freshly built artifacts
    pub fn install_artifacts(&self) -> Result<Vec<PathBuf>> {
        let build_dir = self.rust_dir.join("target").join(self.profile());
        if !build_dir.is_dir() {
            return Err(CodegenError::MissingDirectory(build_dir));
        }

        match fs::remove_dir_all(&self.lib_dir) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(CodegenError::io(&self.lib_dir, e)),
        }
        fs::create_dir_all(&self.lib_dir).map_err(|e| CodegenError::io(&self.lib_dir, e))?;

        let mut installed = Vec::new();
        for entry in fs::read_dir(&build_dir).map_err(|e| CodegenError::io(&build_dir, e))? {
            let entry = entry.map_err(|e| CodegenError::io(&build_dir, e))?;
            let name = entry.file_name();
            if !name.to_string_lossy().starts_with(&self.settings.artifact_prefix) || !is_file(&entry.path()) {
                continue;
            }

            let target = self.lib_dir.join(&name);
            fs::copy(entry.path(), &target).map_err(|e| CodegenError::io(entry.path(), e))?;
            debug!(file = %target.display(), "installed native artifact");
            installed.push(target);
        }

        installed.sort();
        info!(count = installed.len(), dir = %self.lib_dir.display(), "installed native library");
        Ok(installed)
    }
}

fn is_file(path: &Path) -> bool {
    fs::metadata(path).map(|m| m.is_file()).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn args(command: &Command) -> Vec<String> {
        command
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_release_command() {
        let build = NativeBuild::new(NativeConfig::default(), "/src/core", "/pkg/lib");
        assert_eq!(
            args(&build.command()),
            vec![
                "+stable",
                "build",
                "--release",
                "--features",
                "use-direct-api",
                "--manifest-path=/src/core/ffi-rust/Cargo.toml",
            ]
        );
    }

    #[test]
    fn test_debug_system_libs_command() {
        let settings = NativeConfig {
            debug: true,
            use_system_libs: true,
            ..NativeConfig::default()
        };
        let build = NativeBuild::new(settings, "/src/core", "/pkg/lib");
        assert_eq!(build.profile(), "debug");
        assert_eq!(
            args(&build.command()),
            vec![
                "build",
                "--features",
                "use-system-libs use-direct-api",
                "--manifest-path=/src/core/ffi-rust/Cargo.toml",
            ]
        );
    }

    #[test]
    fn test_vulnerable_noise_wins() {
        let settings = NativeConfig {
            use_system_libs: true,
            use_vulnerable_noise: true,
            ..NativeConfig::default()
        };
        let build = NativeBuild::new(settings, "/src", "/lib");
        assert_eq!(
            build.feature_args(),
            vec!["--no-default-features", "--features", "use-runtime use-direct-api"]
        );
    }

    #[test]
    fn test_install_artifacts() {
        let dir = TempDir::new().unwrap();
        let rust_dir = dir.path().join("core");
        let target = rust_dir.join("target/release");
        fs::create_dir_all(&target).unwrap();
        fs::write(target.join("libwhitenoise_ffi.so"), "so").unwrap();
        fs::write(target.join("libwhitenoise_ffi.d"), "dep").unwrap();
        fs::write(target.join("libother.so"), "other").unwrap();

        let lib_dir = dir.path().join("pkg/lib");
        fs::create_dir_all(&lib_dir).unwrap();
        fs::write(lib_dir.join("stale.so"), "old").unwrap();

        let build = NativeBuild::new(NativeConfig::default(), &rust_dir, &lib_dir);
        let installed = build.install_artifacts().unwrap();

        assert_eq!(
            installed,
            vec![lib_dir.join("libwhitenoise_ffi.d"), lib_dir.join("libwhitenoise_ffi.so")]
        );
        assert!(!lib_dir.join("stale.so").exists());
        assert!(!lib_dir.join("libother.so").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_nonzero_exit_reports_stderr() {
        let mut command = Command::new("sh");
        command.args(["-c", "echo boom >&2; exit 3"]);

        match run_collaborator(&mut command).unwrap_err() {
            CodegenError::CollaboratorFailure { status, stderr, .. } => {
                assert!(status.contains('3'), "{}", status);
                assert_eq!(stderr.trim(), "boom");
            }
            other => panic!("Expected CollaboratorFailure, got {:?}", other),
        }
    }

    #[test]
    fn test_failed_build_is_collaborator_failure() {
        let dir = TempDir::new().unwrap();
        let mut build = NativeBuild::new(NativeConfig::default(), dir.path(), dir.path().join("lib"));
        build.program = PathBuf::from("definitely-not-a-cargo-binary");

        match build.run().unwrap_err() {
            CodegenError::CollaboratorFailure { status, .. } => assert_eq!(status, "failed to start"),
            other => panic!("Expected CollaboratorFailure, got {:?}", other),
        }
    }
}

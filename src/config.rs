//! Configuration management for component code generation
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (codegen.toml)
//! - Environment variables (CODEGEN__*)
//! - Build mode variables (WN_DEBUG, WN_USE_SYSTEM_LIBS, WN_USE_VULNERABLE_NOISE)
//!
//! ## Example config file (codegen.toml):
//! ```toml
//! [paths]
//! root = "."
//! package_dir = "opendp/whitenoise/core"
//! rust_dir = "whitenoise-core"
//!
//! [native]
//! debug = true
//!
//! [codec]
//! known_type_values = ["Array", "Jagged", "Dataframe"]
//!
//! [output]
//! variant_map_json = true
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration for the generator and its collaborators
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CodegenConfig {
    /// Filesystem layout
    #[serde(default)]
    pub paths: PathsConfig,

    /// Native library build settings
    #[serde(default)]
    pub native: NativeConfig,

    /// Codec tag allow-lists
    #[serde(default)]
    pub codec: CodecConfig,

    /// Generated artifact names
    #[serde(default)]
    pub output: OutputConfig,
}

/// Filesystem layout. Relative paths are resolved against `root`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Repository root
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Python package receiving generated modules
    #[serde(default = "default_package_dir")]
    pub package_dir: PathBuf,

    /// Native sources (contains validator-rust/ and ffi-rust/)
    #[serde(default = "default_rust_dir")]
    pub rust_dir: PathBuf,

    /// Protobuf sources; defaults to `<rust_dir>/validator-rust/prototypes`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prototypes_dir: Option<PathBuf>,

    /// Component schemas; defaults to `<prototypes_dir>/components`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub components_dir: Option<PathBuf>,

    /// Destination for the native library; defaults to `<package_dir>/lib`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lib_dir: Option<PathBuf>,
}

/// Native build settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NativeConfig {
    /// Build without optimizations
    #[serde(default)]
    pub debug: bool,

    /// Link against system gmp/mpfr instead of vendored builds
    #[serde(default)]
    pub use_system_libs: bool,

    /// Drop the gmp/mpfr noise sources entirely
    #[serde(default)]
    pub use_vulnerable_noise: bool,

    /// Manifest of the shared library crate, relative to `rust_dir`
    #[serde(default = "default_manifest")]
    pub manifest: PathBuf,

    /// File name prefix of the built library artifacts
    #[serde(default = "default_artifact_prefix")]
    pub artifact_prefix: String,
}

/// Type tags the codec rules recognize
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodecConfig {
    /// Accepted `type_value` tags on arguments
    #[serde(default = "default_type_values")]
    pub known_type_values: Vec<String>,

    /// Accepted message names in `type_proto` (scalars are always accepted)
    #[serde(default = "default_type_protos")]
    pub known_type_protos: Vec<String>,
}

/// Generated artifact names, relative to the package directory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_components_file")]
    pub components_file: String,

    #[serde(default = "default_variant_map_file")]
    pub variant_map_file: String,

    /// Also publish the variant map as plain JSON package data
    #[serde(default)]
    pub variant_map_json: bool,
}

// Default value functions
fn default_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_package_dir() -> PathBuf {
    PathBuf::from("opendp/whitenoise/core")
}

fn default_rust_dir() -> PathBuf {
    PathBuf::from("whitenoise-core")
}

fn default_manifest() -> PathBuf {
    PathBuf::from("ffi-rust/Cargo.toml")
}

fn default_artifact_prefix() -> String {
    "libwhitenoise_ffi".to_string()
}

fn default_type_values() -> Vec<String> {
    ["Array", "Jagged", "Dataframe", "Partitions", "Indexmap", "Function"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_type_protos() -> Vec<String> {
    ["Value", "ArrayND", "PrivacyUsage", "Mechanism"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_components_file() -> String {
    "components.py".to_string()
}

fn default_variant_map_file() -> String {
    "variant_message_map.py".to_string()
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            package_dir: default_package_dir(),
            rust_dir: default_rust_dir(),
            prototypes_dir: None,
            components_dir: None,
            lib_dir: None,
        }
    }
}

impl Default for NativeConfig {
    fn default() -> Self {
        Self {
            debug: false,
            use_system_libs: false,
            use_vulnerable_noise: false,
            manifest: default_manifest(),
            artifact_prefix: default_artifact_prefix(),
        }
    }
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            known_type_values: default_type_values(),
            known_type_protos: default_type_protos(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            components_file: default_components_file(),
            variant_map_file: default_variant_map_file(),
            variant_map_json: false,
        }
    }
}

impl NativeConfig {
    /// Apply the WN_* build mode variables on top of file configuration
    pub fn apply_env(&mut self) {
        self.apply_vars(|key| std::env::var(key).ok());
    }

    fn apply_vars(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let flag = |key: &str| lookup(key).map(|value| value != "false");

        if let Some(debug) = flag("WN_DEBUG") {
            self.debug = debug;
        }
        if let Some(system_libs) = flag("WN_USE_SYSTEM_LIBS") {
            self.use_system_libs = system_libs;
        }
        if let Some(vulnerable) = flag("WN_USE_VULNERABLE_NOISE") {
            self.use_vulnerable_noise = vulnerable;
        }
    }
}

impl CodegenConfig {
    /// Load configuration from the default locations plus an optional explicit file
    pub fn load_from(config_path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        let config_locations = ["codegen.toml", ".codegen.toml", "config/codegen.toml"];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        if let Some(config_dir) = directories::ProjectDirs::from("org", "opendp", "component-codegen") {
            let xdg_config = config_dir.config_dir().join("codegen.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // CODEGEN__NATIVE__DEBUG=true etc.
        builder = builder.add_source(
            Environment::with_prefix("CODEGEN")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let mut config: Self = builder.build()?.try_deserialize()?;
        config.native.apply_env();
        Ok(config)
    }

    /// Render the effective configuration as TOML
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Repository root (resolves relative paths against the working directory)
    pub fn root(&self) -> PathBuf {
        if self.paths.root.is_absolute() {
            self.paths.root.clone()
        } else {
            std::env::current_dir()
                .unwrap_or_default()
                .join(&self.paths.root)
        }
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root().join(path)
        }
    }

    pub fn package_dir(&self) -> PathBuf {
        self.resolve(&self.paths.package_dir)
    }

    pub fn rust_dir(&self) -> PathBuf {
        self.resolve(&self.paths.rust_dir)
    }

    pub fn prototypes_dir(&self) -> PathBuf {
        match &self.paths.prototypes_dir {
            Some(dir) => self.resolve(dir),
            None => self.rust_dir().join("validator-rust").join("prototypes"),
        }
    }

    pub fn components_dir(&self) -> PathBuf {
        match &self.paths.components_dir {
            Some(dir) => self.resolve(dir),
            None => self.prototypes_dir().join("components"),
        }
    }

    pub fn lib_dir(&self) -> PathBuf {
        match &self.paths.lib_dir {
            Some(dir) => self.resolve(dir),
            None => self.package_dir().join("lib"),
        }
    }

    pub fn components_path(&self) -> PathBuf {
        self.package_dir().join(&self.output.components_file)
    }

    pub fn variant_map_path(&self) -> PathBuf {
        self.package_dir().join(&self.output.variant_map_file)
    }

    /// Plain JSON variant map, next to the Python one
    pub fn variant_map_json_path(&self) -> PathBuf {
        self.variant_map_path().with_extension("json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CodegenConfig::default();
        assert!(!config.native.debug);
        assert_eq!(config.output.components_file, "components.py");
        assert!(config.codec.known_type_values.iter().any(|t| t == "Jagged"));
    }

    #[test]
    fn test_derived_paths() {
        let mut config = CodegenConfig::default();
        config.paths.root = PathBuf::from("/repo");

        assert_eq!(
            config.components_dir(),
            PathBuf::from("/repo/whitenoise-core/validator-rust/prototypes/components")
        );
        assert_eq!(config.lib_dir(), PathBuf::from("/repo/opendp/whitenoise/core/lib"));
        assert_eq!(
            config.variant_map_json_path(),
            PathBuf::from("/repo/opendp/whitenoise/core/variant_message_map.json")
        );
    }

    #[test]
    fn test_explicit_components_dir() {
        let mut config = CodegenConfig::default();
        config.paths.root = PathBuf::from("/repo");
        config.paths.components_dir = Some(PathBuf::from("schemas"));
        assert_eq!(config.components_dir(), PathBuf::from("/repo/schemas"));
    }

    #[test]
    fn test_build_mode_flags() {
        let mut native = NativeConfig::default();
        native.apply_vars(|key| match key {
            "WN_DEBUG" => Some("1".to_string()),
            "WN_USE_SYSTEM_LIBS" => Some("false".to_string()),
            _ => None,
        });
        assert!(native.debug);
        assert!(!native.use_system_libs);
        assert!(!native.use_vulnerable_noise);
    }

    #[test]
    fn test_serialize_config() {
        let config = CodegenConfig::default();
        let toml_str = config.to_toml().unwrap();
        assert!(toml_str.contains("[paths]"));
        assert!(toml_str.contains("[native]"));
    }
}

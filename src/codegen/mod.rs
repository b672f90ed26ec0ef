//! Code Generation
//!
//! Turns the loaded component schemas into the builder module and the
//! variant map module.
//!
//! Architecture:
//! - signature: parameter ordering (required, defaulted, catch-all)
//! - codec: how each argument/option is passed to the `Component`
//! - docstring: fixed-order documentation sections
//! - python: one builder function per schema
//! - variant_map: `id -> name` accumulator threaded through emission
//! - writer: indentation-aware text builder shared by all emitters
//!
//! Output depends only on the schema list and the timestamp passed in.

pub mod codec;
pub mod docstring;
pub mod python;
pub mod signature;
pub mod variant_map;
pub mod writer;

use std::borrow::Cow;
use std::path::Path;
use std::sync::OnceLock;

use chrono::{Local, NaiveDateTime};
use regex::Regex;
use tracing::{debug, info, warn};

use crate::checksum::Checksum;
use crate::config::CodegenConfig;
use crate::error::Result;
use crate::loader::load_components;
use crate::publish::Artifact;
use crate::schema::ComponentSchema;

pub use codec::{ArgumentCodec, CodecRules, OptionCodec};
pub use docstring::{DocSection, Docstring};
pub use signature::{plan_signature, Parameter, ParameterKind, Signature};
pub use variant_map::VariantMap;
pub use writer::CodeWriter;

/// Name the header credits as the generator
pub const GENERATOR_NAME: &str = "component-codegen";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

// =============================================================================
// Header
// =============================================================================

/// Header shared by every generated module
pub fn header(generated_at: &NaiveDateTime) -> String {
    format!(
        "\"\"\"\nWarning, this file is autogenerated by {}.\nDon't modify this file manually. (Generated: {})\n\"\"\"\n",
        GENERATOR_NAME,
        generated_at.format(TIMESTAMP_FORMAT)
    )
}

/// Replace the generation timestamp so two renders can be compared
pub fn normalize_timestamp(text: &str) -> Cow<'_, str> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN.get_or_init(|| Regex::new(r"\(Generated: [^)\n]*\)").unwrap());
    pattern.replace(text, "(Generated: )")
}

// =============================================================================
// Generated Output
// =============================================================================

/// Output from code generation
#[derive(Debug, Clone)]
pub struct GeneratedArtifacts {
    /// Builder module source
    pub components: String,
    /// Variant map module source
    pub variant_map_module: String,
    /// The accumulated map itself
    pub variant_map: VariantMap,
    /// Number of builder functions emitted
    pub function_count: usize,
    /// Digest of both bodies, timestamp excluded
    pub fingerprint: Checksum,
}

impl GeneratedArtifacts {
    /// Files to publish for this generation under `config`
    pub fn artifacts(&self, config: &CodegenConfig) -> Result<Vec<Artifact>> {
        let mut artifacts = vec![
            Artifact::new(config.components_path(), self.components.clone()),
            Artifact::new(config.variant_map_path(), self.variant_map_module.clone()),
        ];
        if config.output.variant_map_json {
            let json = format!("{}\n", self.variant_map.to_json()?);
            artifacts.push(Artifact::new(config.variant_map_json_path(), json));
        }
        Ok(artifacts)
    }
}

// =============================================================================
// Generator
// =============================================================================

/// Renders the builder and variant map modules for a schema set
#[derive(Debug, Clone)]
pub struct Generator {
    rules: CodecRules,
    generated_at: NaiveDateTime,
}

impl Generator {
    pub fn new(rules: CodecRules) -> Self {
        Self {
            rules,
            generated_at: Local::now().naive_local(),
        }
    }

    /// Pin the header timestamp
    pub fn with_timestamp(mut self, generated_at: NaiveDateTime) -> Self {
        self.generated_at = generated_at;
        self
    }

    /// Render both modules. Schemas are emitted in the order given; the
    /// loader supplies them sorted by file name.
    pub fn generate(&self, schemas: &[ComponentSchema]) -> Result<GeneratedArtifacts> {
        let mut body = CodeWriter::new();
        body.lines(python::PREAMBLE);

        let variant_map = schemas.iter().try_fold(VariantMap::new(), |variants, schema| {
            let (function, variants) = python::emit_function(schema, &self.rules, variants)?;
            debug!(id = %schema.id, name = %schema.name, file = %schema.file_name(), "emitted builder");
            body.blank().blank().raw(&function);
            Ok::<_, crate::error::CodegenError>(variants)
        })?;

        if variant_map.is_empty() {
            warn!("no component schemas, generated modules will be empty");
        }

        let components_body = body.finish();
        let variant_map_body = variant_map.render_module_body()?;
        let fingerprint = Checksum::from_parts([components_body.as_str(), variant_map_body.as_str()]);

        let header = header(&self.generated_at);
        let components = format!("{}\n{}", header, components_body);
        let variant_map_module = format!("{}\n{}", header, variant_map_body);

        info!(
            functions = schemas.len(),
            fingerprint = %fingerprint.short(),
            "generated component builders"
        );

        Ok(GeneratedArtifacts {
            components,
            variant_map_module,
            variant_map,
            function_count: schemas.len(),
            fingerprint,
        })
    }
}

// =============================================================================
// Public API
// =============================================================================

/// Load the configured components directory and render both modules
pub fn generate_from_dir(components_dir: &Path, config: &CodegenConfig) -> Result<GeneratedArtifacts> {
    let schemas = load_components(components_dir)?;
    Generator::new(CodecRules::new(&config.codec)).generate(&schemas)
}

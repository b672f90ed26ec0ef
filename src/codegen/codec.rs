//! Argument/option codec rules
//!
//! Decides how each parameter is handed to the `Component` constructor.
//! Only two tags change the rendering; every other tag must be on the
//! allow-list, so a new tag cannot silently fall through as pass-through.

use std::collections::HashSet;

use crate::config::CodecConfig;
use crate::error::{CodegenError, Result};
use crate::schema::{ComponentSchema, ParameterSpec};

/// `type_value` marking irregular nested arrays
pub const JAGGED: &str = "Jagged";

/// `type_proto` marking a collection of privacy budgets
pub const REPEATED_PRIVACY_USAGE: &str = "repeated PrivacyUsage";

const PROTO_SCALARS: &[&str] = &[
    "double", "float", "int32", "int64", "uint32", "uint64", "sint32", "sint64", "fixed32",
    "fixed64", "sfixed32", "sfixed64", "bool", "string", "bytes",
];

/// Rendering of an argument inside the node's `arguments` map
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgumentCodec {
    Value,
    Jagged,
}

/// Rendering of an option inside the node's `options` map
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionCodec {
    Plain,
    PrivacyUsage,
}

impl ArgumentCodec {
    pub fn render(self, name: &str) -> String {
        match self {
            ArgumentCodec::Value => format!("Component.of({})", name),
            ArgumentCodec::Jagged => format!("Component.of({}, value_format=\"jagged\")", name),
        }
    }
}

impl OptionCodec {
    pub fn render(self, name: &str) -> String {
        match self {
            OptionCodec::Plain => name.to_string(),
            OptionCodec::PrivacyUsage => format!("serialize_privacy_usage({})", name),
        }
    }
}

/// Tag allow-lists built from configuration
#[derive(Debug, Clone)]
pub struct CodecRules {
    type_values: HashSet<String>,
    type_protos: HashSet<String>,
}

impl Default for CodecRules {
    fn default() -> Self {
        Self::new(&CodecConfig::default())
    }
}

impl CodecRules {
    pub fn new(config: &CodecConfig) -> Self {
        let mut type_values: HashSet<String> = config.known_type_values.iter().cloned().collect();
        type_values.insert(JAGGED.to_string());

        let type_protos = config
            .known_type_protos
            .iter()
            .map(String::as_str)
            .chain(PROTO_SCALARS.iter().copied())
            .map(str::to_string)
            .collect();

        Self { type_values, type_protos }
    }

    /// Codec for an entry of the `arguments` section
    pub fn argument(&self, schema: &ComponentSchema, name: &str, spec: &ParameterSpec) -> Result<ArgumentCodec> {
        self.check_type_proto(schema, name, spec)?;
        match spec.type_value.as_deref() {
            None => Ok(ArgumentCodec::Value),
            Some(JAGGED) => Ok(ArgumentCodec::Jagged),
            Some(tag) if self.type_values.contains(tag) => Ok(ArgumentCodec::Value),
            Some(tag) => Err(unknown(schema, name, "type_value", tag)),
        }
    }

    /// Codec for an entry of the `options` section
    pub fn option(&self, schema: &ComponentSchema, name: &str, spec: &ParameterSpec) -> Result<OptionCodec> {
        if let Some(tag) = spec.type_value.as_deref() {
            if !self.type_values.contains(tag) {
                return Err(unknown(schema, name, "type_value", tag));
            }
        }
        self.check_type_proto(schema, name, spec)?;
        match spec.type_proto.as_deref() {
            Some(REPEATED_PRIVACY_USAGE) => Ok(OptionCodec::PrivacyUsage),
            _ => Ok(OptionCodec::Plain),
        }
    }

    fn check_type_proto(&self, schema: &ComponentSchema, name: &str, spec: &ParameterSpec) -> Result<()> {
        let Some(tag) = spec.type_proto.as_deref() else {
            return Ok(());
        };
        let base = tag.strip_prefix("repeated ").unwrap_or(tag).trim();
        if self.type_protos.contains(base) {
            Ok(())
        } else {
            Err(unknown(schema, name, "type_proto", tag))
        }
    }
}

fn unknown(schema: &ComponentSchema, parameter: &str, field: &'static str, tag: &str) -> CodegenError {
    CodegenError::UnknownCodecTag {
        schema_id: schema.id.clone(),
        parameter: parameter.to_string(),
        field,
        tag: tag.to_string(),
    }
}

//! Component schema types
//!
//! One `ComponentSchema` is loaded per JSON file in the components directory.
//! Map fields keep declaration order, which drives signature and docstring
//! ordering downstream.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{CodegenError, Result};

/// A parameter declared in either the `arguments` or the `options` section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Default as target-language source; presence makes the parameter optional
    #[serde(default, alias = "default_python", skip_serializing_if = "Option::is_none")]
    pub default_value: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_value: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_proto: Option<String>,
}

pub type ArgumentSpec = ParameterSpec;
pub type OptionSpec = ParameterSpec;

impl ParameterSpec {
    pub fn has_default(&self) -> bool {
        self.default_value.is_some()
    }

    /// Render the default as it appears after `=` in a signature
    pub fn default_literal(&self) -> Option<String> {
        self.default_value.as_ref().map(python_literal)
    }
}

/// Description of the value a component returns
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReturnSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A single component description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentSchema {
    /// Variant identifier in the Component proto
    pub id: String,

    /// Name of the generated builder function
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub arguments: IndexMap<String, ArgumentSpec>,

    #[serde(default)]
    pub options: IndexMap<String, OptionSpec>,

    #[serde(rename = "return")]
    pub returns: ReturnSpec,

    /// Accept an open-ended `arguments` mapping instead of fixed arguments
    #[serde(default)]
    pub any_argument: bool,

    /// File the schema was loaded from
    #[serde(skip)]
    pub source: PathBuf,
}

/// Sections every schema must declare unless it accepts any argument
const REQUIRED_SECTIONS: &[&str] = &["id", "name", "arguments", "options", "return"];

/// Names synthesized by the signature planner
const KWARGS: &str = "kwargs";
const ARGUMENTS: &str = "arguments";

const DOCSTRING_QUOTE: &str = "\"\"\"";

/// Reserved words of the generated language; unusable as function or parameter names
const KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class", "continue",
    "def", "del", "elif", "else", "except", "finally", "for", "from", "global", "if", "import", "in",
    "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return", "try", "while", "with",
    "yield",
];

impl ComponentSchema {
    /// Parse and validate a schema from JSON text
    pub fn from_json(source: &Path, content: &str) -> Result<Self> {
        let raw: serde_json::Value = serde_json::from_str(content)
            .map_err(|e| CodegenError::malformed(source, format!("invalid JSON: {}", e)))?;

        let object = raw
            .as_object()
            .ok_or_else(|| CodegenError::malformed(source, "expected a JSON object"))?;

        let any_argument = object
            .get("any_argument")
            .and_then(|v| v.as_bool())
            .unwrap_or(false);

        for section in REQUIRED_SECTIONS {
            let optional = any_argument && matches!(*section, "arguments" | "options");
            if !optional && !object.contains_key(*section) {
                return Err(CodegenError::malformed(
                    source,
                    format!("missing required section `{}`", section),
                ));
            }
        }

        // Deserialize from the text, not `raw`: `serde_json::Map` does not keep key order.
        let mut schema: ComponentSchema = serde_json::from_str(content)
            .map_err(|e| CodegenError::malformed(source, e.to_string()))?;
        schema.source = source.to_path_buf();
        schema.validate()?;
        Ok(schema)
    }

    fn validate(&self) -> Result<()> {
        let malformed = |reason: String| CodegenError::malformed(&self.source, reason);

        if !is_identifier(&self.id) {
            return Err(malformed(format!("id {:?} is not a valid identifier", self.id)));
        }
        if !is_identifier(&self.name) || is_keyword(&self.name) {
            return Err(malformed(format!("name {:?} is not a valid identifier", self.name)));
        }

        for name in self.arguments.keys().chain(self.options.keys()) {
            if !is_identifier(name) || is_keyword(name) {
                return Err(malformed(format!("parameter {:?} is not a valid identifier", name)));
            }
            if name == KWARGS || (self.any_argument && name == ARGUMENTS) {
                return Err(malformed(format!(
                    "parameter `{}` collides with a generated parameter",
                    name
                )));
            }
        }

        // Descriptions land inside a triple-quoted docstring
        let parameters = self.arguments.values().chain(self.options.values());
        let mut descriptions = self
            .description
            .iter()
            .chain(self.returns.description.iter())
            .chain(parameters.filter_map(|p| p.description.as_ref()));
        if descriptions.any(|d| d.contains(DOCSTRING_QUOTE)) {
            return Err(malformed(format!("description contains {}", DOCSTRING_QUOTE)));
        }

        Ok(())
    }

    /// Metadata for a merged parameter name; the arguments section wins on overlap
    pub fn parameter(&self, name: &str) -> Option<&ParameterSpec> {
        self.arguments.get(name).or_else(|| self.options.get(name))
    }

    /// File name of the source schema, for messages
    pub fn file_name(&self) -> String {
        self.source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

fn is_keyword(s: &str) -> bool {
    KEYWORDS.contains(&s)
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
}

/// Render a JSON default as target-language source.
///
/// Strings are already source text and are emitted verbatim.
fn python_literal(value: &serde_json::Value) -> String {
    use serde_json::Value;

    match value {
        Value::String(source) => source.clone(),
        Value::Null => "None".to_string(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => {
            let items: Vec<String> = items.iter().map(python_value).collect();
            format!("[{}]", items.join(", "))
        }
        Value::Object(map) => {
            let entries: Vec<String> = map
                .iter()
                .map(|(k, v)| format!("{:?}: {}", k, python_value(v)))
                .collect();
            format!("{{{}}}", entries.join(", "))
        }
    }
}

/// Nested values are data, so strings inside containers are quoted
fn python_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => format!("{:?}", s),
        other => python_literal(other),
    }
}

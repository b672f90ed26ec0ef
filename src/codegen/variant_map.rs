//! Variant map
//!
//! Links each variant of the Component proto (`id`) to the builder function
//! that produces it (`name`).

use indexmap::IndexMap;
use serde::Serialize;

use crate::error::Result;

/// Ordered `id -> name` accumulator, threaded through function emission
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct VariantMap {
    entries: IndexMap<String, String>,
}

impl VariantMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a variant, returning the updated map
    pub fn with(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        self.entries.insert(id.into(), name.into());
        self
    }

    pub fn get(&self, id: &str) -> Option<&str> {
        self.entries.get(id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// JSON object with 4-space indentation
    pub fn to_json(&self) -> Result<String> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut serializer)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    /// Body of the generated Python module, without header
    pub fn render_module_body(&self) -> Result<String> {
        Ok(format!("variant_message_map = {}\n", self.to_json()?))
    }
}

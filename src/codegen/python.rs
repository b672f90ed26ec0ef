//! Python Builder Emitter
//!
//! Emits one builder function per component. Each function returns a
//! `Component` carrying the variant id, the argument map, the option map
//! and, unless the component accepts any argument, the `kwargs` constraints.

use super::codec::CodecRules;
use super::docstring::Docstring;
use super::signature::plan_signature;
use super::variant_map::VariantMap;
use super::writer::CodeWriter;
use crate::error::Result;
use crate::schema::ComponentSchema;

/// Imports every generated builder module starts with
pub const PREAMBLE: &[&str] = &[
    "from .base import Component",
    "from .value import serialize_privacy_usage",
];

/// A keyword argument of the `Component(...)` call
enum Keyword {
    Inline { name: &'static str, value: String },
    Map { name: &'static str, entries: Vec<(String, String)> },
}

/// Emit the builder function for `schema` and record its variant.
///
/// The variant map is passed in and handed back so emission stays a fold
/// over the schema list.
pub fn emit_function(
    schema: &ComponentSchema,
    rules: &CodecRules,
    variants: VariantMap,
) -> Result<(String, VariantMap)> {
    let signature = plan_signature(schema);
    let docstring = Docstring::for_schema(schema);
    let keywords = component_keywords(schema, rules)?;

    let mut w = CodeWriter::new();
    w.line(format!("def {}({}):", schema.name, signature));
    w.indented(|w| {
        w.line("\"\"\"");
        w.lines(docstring.lines());
        w.line("\"\"\"");
        w.line("return Component(");
        w.indented(|w| {
            w.line(format!("\"{}\",", schema.id));
            let last = keywords.len() - 1;
            for (i, keyword) in keywords.iter().enumerate() {
                let terminator = if i == last { ")" } else { "," };
                write_keyword(w, keyword, terminator);
            }
        });
    });

    let variants = variants.with(schema.id.clone(), schema.name.clone());
    Ok((w.finish(), variants))
}

fn component_keywords(schema: &ComponentSchema, rules: &CodecRules) -> Result<Vec<Keyword>> {
    let mut keywords = Vec::with_capacity(3);

    if schema.any_argument {
        keywords.push(Keyword::Inline {
            name: "arguments",
            value: "arguments".to_string(),
        });
    } else {
        let mut entries = Vec::with_capacity(schema.arguments.len());
        for (name, spec) in &schema.arguments {
            let codec = rules.argument(schema, name, spec)?;
            entries.push((name.clone(), codec.render(name)));
        }
        keywords.push(Keyword::Map { name: "arguments", entries });
    }

    let mut entries = Vec::with_capacity(schema.options.len());
    for (name, spec) in &schema.options {
        let codec = rules.option(schema, name, spec)?;
        entries.push((name.clone(), codec.render(name)));
    }
    keywords.push(Keyword::Map { name: "options", entries });

    if !schema.any_argument {
        keywords.push(Keyword::Inline {
            name: "constraints",
            value: "kwargs".to_string(),
        });
    }

    Ok(keywords)
}

fn write_keyword(w: &mut CodeWriter, keyword: &Keyword, terminator: &str) {
    match keyword {
        Keyword::Inline { name, value } => {
            w.line(format!("{}={}{}", name, value, terminator));
        }
        Keyword::Map { name, entries } if entries.is_empty() => {
            w.line(format!("{}={{}}{}", name, terminator));
        }
        Keyword::Map { name, entries } => {
            w.block(format!("{}={{", name), format!("}}{}", terminator), |w| {
                let last = entries.len() - 1;
                for (i, (key, value)) in entries.iter().enumerate() {
                    let comma = if i == last { "" } else { "," };
                    w.line(format!("'{}': {}{}", key, value, comma));
                }
            });
        }
    }
}

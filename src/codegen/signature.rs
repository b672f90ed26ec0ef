//! Signature planning
//!
//! Orders parameters so the emitted signature is always legal: required
//! parameters first, defaulted ones after, the keyword catch-all last.

use std::fmt;

use indexmap::IndexSet;

use crate::schema::ComponentSchema;

/// How a parameter appears in the signature
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterKind {
    /// Open-ended `arguments` mapping of `any_argument` components
    ArgumentMap,
    Required,
    /// Carries the default, already rendered as source
    Defaulted(String),
    /// Trailing `**kwargs` holding data bounds
    KeywordCatchAll,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub kind: ParameterKind,
}

impl Parameter {
    pub fn is_defaulted(&self) -> bool {
        matches!(self.kind, ParameterKind::Defaulted(_))
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ParameterKind::Defaulted(default) => write!(f, "{}={}", self.name, default),
            ParameterKind::KeywordCatchAll => write!(f, "**{}", self.name),
            ParameterKind::ArgumentMap | ParameterKind::Required => f.write_str(&self.name),
        }
    }
}

/// Ordered parameter list of one builder function
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub parameters: Vec<Parameter>,
}

impl Signature {
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.parameters.iter().map(|p| p.name.as_str())
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, parameter) in self.parameters.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", parameter)?;
        }
        Ok(())
    }
}

/// Plan the parameter list of a component's builder function
pub fn plan_signature(schema: &ComponentSchema) -> Signature {
    let mut required = Vec::new();
    let mut defaulted = Vec::new();

    if schema.any_argument {
        required.push(Parameter {
            name: "arguments".to_string(),
            kind: ParameterKind::ArgumentMap,
        });
    }

    // Arguments then options, first occurrence wins.
    let merged: IndexSet<&String> = schema.arguments.keys().chain(schema.options.keys()).collect();

    for name in merged {
        let default = schema.parameter(name).and_then(|spec| spec.default_literal());
        match default {
            Some(default) => defaulted.push(Parameter {
                name: name.clone(),
                kind: ParameterKind::Defaulted(default),
            }),
            None => required.push(Parameter {
                name: name.clone(),
                kind: ParameterKind::Required,
            }),
        }
    }

    let mut parameters = required;
    parameters.append(&mut defaulted);

    if !schema.any_argument {
        parameters.push(Parameter {
            name: "kwargs".to_string(),
            kind: ParameterKind::KeywordCatchAll,
        });
    }

    Signature { parameters }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn schema(content: &str) -> ComponentSchema {
        ComponentSchema::from_json(Path::new("Test.json"), content).unwrap()
    }

    #[test]
    fn test_plain_signature() {
        let s = schema(r#"{"id": "Add", "name": "add", "arguments": {"left": {}, "right": {}}, "options": {}, "return": {}}"#);
        assert_eq!(plan_signature(&s).to_string(), "left, right, **kwargs");
    }

    #[test]
    fn test_defaults_move_to_end() {
        let s = schema(
            r#"{"id": "Mean", "name": "mean",
                "arguments": {"data": {}, "lower": {"default_python": "None"}, "upper": {}},
                "options": {"finite": {"default_python": "True"}, "mechanism": {}},
                "return": {}}"#,
        );
        assert_eq!(
            plan_signature(&s).to_string(),
            "data, upper, mechanism, lower=None, finite=True, **kwargs"
        );
    }

    #[test]
    fn test_duplicate_names_merged() {
        let s = schema(
            r#"{"id": "Resize", "name": "resize",
                "arguments": {"data": {}, "number_rows": {}},
                "options": {"number_rows": {"default_python": "None"}, "sample_proportion": {}},
                "return": {}}"#,
        );
        let signature = plan_signature(&s);
        let names: Vec<&str> = signature.names().collect();
        assert_eq!(names, vec!["data", "number_rows", "sample_proportion", "kwargs"]);
        // the argument section's metadata decides: no default
        assert!(!signature.parameters[1].is_defaulted());
    }

    #[test]
    fn test_any_argument_signature() {
        let s = schema(r#"{"id": "Materialize", "name": "materialize", "any_argument": true, "options": {"value": {}, "public": {"default_python": "False"}}, "return": {}}"#);
        let signature = plan_signature(&s);
        assert_eq!(signature.to_string(), "arguments, value, public=False");
        assert_eq!(signature.parameters[0].kind, ParameterKind::ArgumentMap);
    }

    #[test]
    fn test_required_never_follows_defaulted() {
        let s = schema(
            r#"{"id": "X", "name": "x",
                "arguments": {"a": {"default_python": "1"}, "b": {}, "c": {"default_python": "2"}},
                "options": {"d": {}, "e": {"default_python": "3"}, "f": {}},
                "return": {}}"#,
        );
        let signature = plan_signature(&s);
        let first_default = signature.parameters.iter().position(Parameter::is_defaulted).unwrap();
        assert!(signature.parameters[first_default..]
            .iter()
            .all(|p| p.kind != ParameterKind::Required));
        assert_eq!(
            signature.parameters.last().map(|p| &p.kind),
            Some(&ParameterKind::KeywordCatchAll)
        );
        assert_eq!(signature.to_string(), "b, d, f, a=1, c=2, e=3, **kwargs");
    }
}

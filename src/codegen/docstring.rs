//! Docstring synthesis
//!
//! A docstring is a list of typed sections built in one fixed order
//! (title, description, parameters, kwargs, return) and rendered in one place.

use crate::schema::{ComponentSchema, ParameterSpec};

const ARGUMENTS_NOTE: &str = "dictionary of arguments to supply to the function";
const KWARGS_NOTE: &str = "data bounds of the form [argument]_[bound]=[lower | upper | categories | ...]";

/// One docstring section, in output order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocSection {
    Title(String),
    Description(String),
    ArgumentMap,
    Param { name: String, description: String },
    Kwargs,
    Return(String),
}

impl DocSection {
    fn render(&self, lines: &mut Vec<String>) {
        match self {
            DocSection::Title(id) => {
                lines.push(format!("{} Component", id));
                lines.push(String::new());
            }
            DocSection::Description(text) => {
                lines.push(text.clone());
                lines.push(String::new());
            }
            DocSection::ArgumentMap => lines.push(format!(":param arguments: {}", ARGUMENTS_NOTE)),
            DocSection::Param { name, description } => {
                lines.push(format!(":param {}: {}", name, description))
            }
            DocSection::Kwargs => lines.push(format!(":param kwargs: {}", KWARGS_NOTE)),
            DocSection::Return(description) => lines.push(format!(":return: {}", description)),
        }
    }
}

/// Docstring of one builder function
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Docstring {
    sections: Vec<DocSection>,
}

impl Docstring {
    pub fn for_schema(schema: &ComponentSchema) -> Self {
        let mut sections = vec![DocSection::Title(schema.id.clone())];

        if let Some(description) = &schema.description {
            sections.push(DocSection::Description(description.clone()));
        }
        if schema.any_argument {
            sections.push(DocSection::ArgumentMap);
        }

        // Both sections are documented in full, even on name overlap.
        sections.extend(schema.arguments.iter().map(param));
        sections.extend(schema.options.iter().map(param));

        if !schema.any_argument {
            sections.push(DocSection::Kwargs);
        }
        sections.push(DocSection::Return(
            schema.returns.description.clone().unwrap_or_default(),
        ));

        Self { sections }
    }

    pub fn sections(&self) -> &[DocSection] {
        &self.sections
    }

    /// Docstring lines without indentation; the writer indents them.
    ///
    /// Multi-line descriptions are split so every physical line gets indented.
    pub fn lines(&self) -> Vec<String> {
        let mut rendered = Vec::new();
        for section in &self.sections {
            section.render(&mut rendered);
        }
        // Empty descriptions must not leave trailing whitespace
        rendered
            .iter()
            .flat_map(|text| text.split('\n'))
            .map(|line| line.trim_end().to_string())
            .collect()
    }
}

fn param((name, spec): (&String, &ParameterSpec)) -> DocSection {
    DocSection::Param {
        name: name.clone(),
        description: spec.description.clone().unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn schema(content: &str) -> ComponentSchema {
        ComponentSchema::from_json(Path::new("Test.json"), content).unwrap()
    }

    #[test]
    fn test_full_docstring() {
        let s = schema(
            r#"{"id": "Clamp", "name": "clamp", "description": "Clamp values to bounds.",
                "arguments": {"data": {"description": "data to clamp"}},
                "options": {"strict": {}},
                "return": {"description": "clamped data"}}"#,
        );
        assert_eq!(
            Docstring::for_schema(&s).lines(),
            vec![
                "Clamp Component",
                "",
                "Clamp values to bounds.",
                "",
                ":param data: data to clamp",
                ":param strict:",
                ":param kwargs: data bounds of the form [argument]_[bound]=[lower | upper | categories | ...]",
                ":return: clamped data",
            ]
        );
    }

    #[test]
    fn test_any_argument_docstring() {
        let s = schema(r#"{"id": "Literal", "name": "literal", "any_argument": true, "return": {}}"#);
        assert_eq!(
            Docstring::for_schema(&s).lines(),
            vec![
                "Literal Component",
                "",
                ":param arguments: dictionary of arguments to supply to the function",
                ":return:",
            ]
        );
    }

    #[test]
    fn test_multi_line_descriptions_split() {
        let s = schema(
            r#"{"id": "Mean", "name": "mean",
                "arguments": {"data": {"description": "first line\nsecond line"}},
                "options": {},
                "return": {"description": "mean of each column\r\none value per column"}}"#,
        );
        let lines = Docstring::for_schema(&s).lines();
        assert!(lines.iter().all(|line| !line.contains('\n')));
        assert_eq!(lines[2], ":param data: first line");
        assert_eq!(lines[3], "second line");
        assert_eq!(
            &lines[lines.len() - 2..],
            [":return: mean of each column", "one value per column"]
        );
    }

    #[test]
    fn test_sections_in_declared_order() {
        let s = schema(
            r#"{"id": "X", "name": "x", "description": "d",
                "arguments": {"b": {}, "a": {}}, "options": {"z": {}, "y": {}},
                "return": {}}"#,
        );
        let doc = Docstring::for_schema(&s);
        let sections = doc.sections();
        assert!(sections.windows(2).all(|w| discriminant_rank(&w[0]) <= discriminant_rank(&w[1])));

        let params: Vec<&str> = sections
            .iter()
            .filter_map(|s| match s {
                DocSection::Param { name, .. } => Some(name.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(params, vec!["b", "a", "z", "y"]);
    }

    fn discriminant_rank(section: &DocSection) -> u8 {
        match section {
            DocSection::Title(_) => 0,
            DocSection::Description(_) => 1,
            DocSection::ArgumentMap => 2,
            DocSection::Param { .. } => 3,
            DocSection::Kwargs => 4,
            DocSection::Return(_) => 5,
        }
    }
}

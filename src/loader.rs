//! Schema Loading
//!
//! Reads every `*.json` file directly inside the components directory, in
//! file name order. One malformed file fails the whole load.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use walkdir::WalkDir;

use crate::error::{CodegenError, Result};
use crate::schema::ComponentSchema;

/// Suffix of component schema files
pub const SCHEMA_SUFFIX: &str = ".json";

/// Load all component schemas from a directory, sorted by file name
pub fn load_components(components_dir: &Path) -> Result<Vec<ComponentSchema>> {
    if !components_dir.is_dir() {
        return Err(CodegenError::MissingDirectory(components_dir.to_path_buf()));
    }

    let mut schemas = Vec::new();
    let mut seen_ids: HashMap<String, PathBuf> = HashMap::new();

    for path in schema_files(components_dir)? {
        let content = fs::read_to_string(&path).map_err(|e| CodegenError::io(&path, e))?;
        let schema = ComponentSchema::from_json(&path, &content)?;

        if let Some(first) = seen_ids.get(&schema.id) {
            return Err(CodegenError::DuplicateId {
                id: schema.id.clone(),
                first: first.clone(),
                second: path,
            });
        }
        seen_ids.insert(schema.id.clone(), path.clone());

        debug!(file = %path.display(), id = %schema.id, "loaded component schema");
        schemas.push(schema);
    }

    info!(count = schemas.len(), dir = %components_dir.display(), "loaded component schemas");
    Ok(schemas)
}

/// Schema files directly inside `dir`, sorted by file name.
///
/// Ordering comes only from the sort, never from directory iteration order.
pub fn schema_files(dir: &Path) -> Result<Vec<PathBuf>> {
    matching_files(dir, SCHEMA_SUFFIX)
}

/// Regular files directly inside `dir` whose name ends with `suffix`, sorted by file name
pub(crate) fn matching_files(dir: &Path, suffix: &str) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(dir).to_path_buf();
            let source = e
                .into_io_error()
                .unwrap_or_else(|| std::io::Error::new(std::io::ErrorKind::Other, "walk error"));
            CodegenError::io(path, source)
        })?;

        if !entry.file_type().is_file() {
            continue;
        }
        if entry.file_name().to_string_lossy().ends_with(suffix) {
            files.push(entry.into_path());
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, content: &str) {
        fs::write(dir.join(name), content).unwrap();
    }

    fn schema(id: &str, name: &str) -> String {
        format!(
            r#"{{"id": "{}", "name": "{}", "arguments": {{}}, "options": {{}}, "return": {{}}}}"#,
            id, name
        )
    }

    #[test]
    fn test_sorted_by_file_name() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "Mean.json", &schema("Mean", "mean"));
        write(dir.path(), "Add.json", &schema("Add", "add"));
        write(dir.path(), "Count.json", &schema("Count", "count"));

        let ids: Vec<String> = load_components(dir.path())
            .unwrap()
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(ids, vec!["Add", "Count", "Mean"]);
    }

    #[test]
    fn test_non_schema_files_skipped() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "Add.json", &schema("Add", "add"));
        write(dir.path(), "README.md", "# components");
        write(dir.path(), "Add.json.bak", "{");
        fs::create_dir(dir.path().join("nested.json")).unwrap();

        let schemas = load_components(dir.path()).unwrap();
        assert_eq!(schemas.len(), 1);
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "A.json", &schema("Add", "add"));
        write(dir.path(), "B.json", &schema("Add", "plus"));

        let err = load_components(dir.path()).unwrap_err();
        match err {
            CodegenError::DuplicateId { id, first, second } => {
                assert_eq!(id, "Add");
                assert!(first.ends_with("A.json"));
                assert!(second.ends_with("B.json"));
            }
            other => panic!("Expected DuplicateId, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_directory() {
        let dir = TempDir::new().unwrap();
        let err = load_components(&dir.path().join("absent")).unwrap_err();
        assert!(matches!(err, CodegenError::MissingDirectory(_)));
    }
}

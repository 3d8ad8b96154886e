//! Metadata sidecar persistence
//!
//! Uploads may carry a free-form metadata string. Well-formed JSON objects
//! are persisted as-is; anything else is wrapped under a single known key,
//! so malformed metadata never aborts an upload.

use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Suffix appended to the stored file's full name
pub const SIDECAR_SUFFIX: &str = ".meta.json";

/// Key used when the raw metadata string is not a JSON object
pub const RAW_METADATA_KEY: &str = "raw_metadata";

/// Parse a metadata string into a JSON object, wrapping anything that is
/// not one (invalid JSON, arrays, bare scalars) under [`RAW_METADATA_KEY`].
pub fn parse_or_wrap(raw: &str) -> Map<String, Value> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => map,
        _ => {
            let mut map = Map::new();
            map.insert(RAW_METADATA_KEY.to_string(), Value::String(raw.to_string()));
            map
        }
    }
}

/// Sidecar path for a stored file: `<file_path>.meta.json`
pub fn sidecar_path(file_path: &Path) -> PathBuf {
    let mut name = file_path.as_os_str().to_owned();
    name.push(SIDECAR_SUFFIX);
    PathBuf::from(name)
}

/// Write the sidecar next to the stored file.
///
/// Pretty-printed UTF-8; serde_json leaves non-ASCII characters unescaped.
pub async fn write_sidecar(file_path: &Path, metadata: &Map<String, Value>) -> Result<PathBuf> {
    let path = sidecar_path(file_path);
    let content = serde_json::to_string_pretty(&Value::Object(metadata.clone()))?;
    tokio::fs::write(&path, content).await?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_objects_pass_through_unchanged() {
        let map = parse_or_wrap(r#"{"author": "Ada", "year": 1843}"#);
        assert_eq!(Value::Object(map), json!({"author": "Ada", "year": 1843}));
    }

    #[test]
    fn non_objects_are_wrapped_under_raw_metadata() {
        // Invalid JSON
        let map = parse_or_wrap("hello");
        assert_eq!(Value::Object(map), json!({"raw_metadata": "hello"}));

        // Valid JSON, but not an object
        let map = parse_or_wrap("[1,2,3]");
        assert_eq!(Value::Object(map), json!({"raw_metadata": "[1,2,3]"}));

        let map = parse_or_wrap("\"quoted\"");
        assert_eq!(Value::Object(map), json!({"raw_metadata": "\"quoted\""}));
    }

    #[test]
    fn sidecar_path_appends_the_full_suffix() {
        let path = sidecar_path(Path::new("/data/inputs/report.pdf"));
        assert_eq!(path, PathBuf::from("/data/inputs/report.pdf.meta.json"));
    }

    #[tokio::test]
    async fn written_sidecars_preserve_non_ascii() {
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("café.txt");

        let metadata = parse_or_wrap(r#"{"title": "Déjà vu", "city": "東京"}"#);
        let path = write_sidecar(&file_path, &metadata).await.unwrap();

        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.contains("Déjà vu"));
        assert!(content.contains("東京"));
        // Pretty-printed, one key per line
        assert!(content.contains("\n"));
    }
}

use std::collections::BTreeMap;
use std::path::Path;

use serde_json::Value;

use super::error::{ExportError, ExportResult};
use crate::traits::FileSystem;

/// Parsed selection document: `selection key -> enabled`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    entries: BTreeMap<String, bool>,
}

impl Selection {
    /// Parse a selection from JSON text
    pub fn from_json(text: &str) -> ExportResult<Self> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| ExportError::ConfigParse(format!("invalid JSON: {}", e)))?;

        let Value::Object(map) = value else {
            return Err(ExportError::ConfigParse(
                "selection document must be a JSON object".to_string(),
            ));
        };

        let mut entries = BTreeMap::new();
        for (key, value) in map {
            let Value::Bool(enabled) = value else {
                return Err(ExportError::ConfigParse(format!(
                    "value for '{}' must be true or false, got {}",
                    key, value
                )));
            };
            entries.insert(key, enabled);
        }

        Ok(Self { entries })
    }

    /// Load and parse a selection document
    pub fn load(fs: &dyn FileSystem, path: &Path) -> ExportResult<Self> {
        let text = fs.read_to_string(path).map_err(|e| {
            ExportError::ConfigParse(format!("cannot read {}: {:#}", path.display(), e))
        })?;

        Self::from_json(&text).map_err(|e| match e {
            ExportError::ConfigParse(msg) => {
                ExportError::ConfigParse(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })
    }

    /// Whether a key is present and set to `true`
    pub fn is_enabled(&self, key: &str) -> bool {
        self.entries.get(key).copied().unwrap_or(false)
    }

    /// All keys in the document, sorted
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::MockFileSystem;
    use std::path::PathBuf;

    #[test]
    fn test_parse_flags() {
        let selection = Selection::from_json(r#"{"policy": true, "script": false}"#).unwrap();

        assert!(selection.is_enabled("policy"));
        assert!(!selection.is_enabled("script"));
        assert!(!selection.is_enabled("category"));
    }

    #[test]
    fn test_rejects_non_object() {
        let err = Selection::from_json("[true]").unwrap_err();
        assert!(matches!(err, ExportError::ConfigParse(_)));
    }

    #[test]
    fn test_rejects_non_boolean_value() {
        let err = Selection::from_json(r#"{"policy": "yes"}"#).unwrap_err();
        assert!(err.to_string().contains("'policy' must be true or false"));
    }

    #[test]
    fn test_rejects_invalid_json() {
        let err = Selection::from_json("{ policy: true").unwrap_err();
        assert!(matches!(err, ExportError::ConfigParse(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let fs = MockFileSystem::new();
        let err = Selection::load(&fs, &PathBuf::from("/nope.json")).unwrap_err();

        assert!(matches!(err, ExportError::ConfigParse(_)));
        assert!(err.to_string().contains("/nope.json"));
    }

    #[test]
    fn test_load_from_filesystem() {
        let fs = MockFileSystem::new();
        let path = PathBuf::from("/work/jamftf.config.json");
        fs.write(&path, r#"{"category": true}"#).unwrap();

        let selection = Selection::load(&fs, &path).unwrap();
        assert!(selection.is_enabled("category"));
        assert_eq!(selection.keys().collect::<Vec<_>>(), vec!["category"]);
    }
}

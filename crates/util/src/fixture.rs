//! Record fixtures for seeding an in-memory store.
//!
//! A fixture maps model names to record lists:
//!
//! ```yaml
//! user:
//!   - name: Huey
//!   - name: Dewey
//! ```

use std::{fs, path::Path};

use indexmap::IndexMap;
use serde_json::Value;
use thiserror::Error;

/// Records keyed by model name, in file order.
pub type Fixture = IndexMap<String, Vec<Value>>;

/// Errors that can occur while loading a fixture.
#[derive(Debug, Error)]
pub enum FixtureError {
    /// The file could not be read.
    #[error("failed to read fixture {path}: {source}")]
    Io { path: String, source: std::io::Error },
    /// The file is not valid JSON.
    #[error("invalid JSON fixture: {0}")]
    Json(#[from] serde_json::Error),
    /// The file is not valid YAML.
    #[error("invalid YAML fixture: {0}")]
    Yaml(#[from] serde_yaml::Error),
    /// The document root is not a mapping.
    #[error("fixture must be an object of model name to record list")]
    NotAnObject,
    /// A model maps to something other than a list of records.
    #[error("records for model '{model_name}' must be a list of objects")]
    InvalidRecords { model_name: String },
}

/// Load a fixture from `.json`, `.yaml` or `.yml`. Other extensions are tried
/// as JSON first, then YAML.
pub fn load_fixture(path: impl AsRef<Path>) -> Result<Fixture, FixtureError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| FixtureError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    let value: Value = match extension.as_deref() {
        Some("json") => serde_json::from_str(&content)?,
        Some("yaml") | Some("yml") => serde_yaml::from_str(&content)?,
        _ => match serde_json::from_str(&content) {
            Ok(value) => value,
            Err(_) => serde_yaml::from_str(&content)?,
        },
    };
    fixture_from_value(value)
}

/// Validate and convert a parsed document into a [`Fixture`].
pub fn fixture_from_value(value: Value) -> Result<Fixture, FixtureError> {
    let Value::Object(models) = value else {
        return Err(FixtureError::NotAnObject);
    };

    let mut fixture = Fixture::new();
    for (model_name, records) in models {
        let records = match records {
            Value::Array(records) if records.iter().all(Value::is_object) => records,
            _ => return Err(FixtureError::InvalidRecords { model_name }),
        };
        fixture.insert(model_name, records);
    }
    Ok(fixture)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn loads_yaml_fixture_in_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("users.yml");
        fs::write(&path, "user:\n  - name: Huey\n  - name: Dewey\npost: []\n").unwrap();

        let fixture = load_fixture(&path).unwrap();
        assert_eq!(fixture.keys().collect::<Vec<_>>(), vec!["user", "post"]);
        assert_eq!(fixture["user"][1], json!({ "name": "Dewey" }));
    }

    #[test]
    fn loads_json_fixture() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("users.json");
        fs::write(&path, r#"{ "user": [{ "id": "1", "name": "Daffy" }] }"#).unwrap();

        let fixture = load_fixture(&path).unwrap();
        assert_eq!(fixture["user"].len(), 1);
    }

    #[test]
    fn unknown_extension_falls_back_to_yaml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("users.fixture");
        fs::write(&path, "user:\n  - name: Louie\n").unwrap();
        assert_eq!(load_fixture(&path).unwrap()["user"][0]["name"], json!("Louie"));
    }

    #[test]
    fn rejects_invalid_shapes() {
        assert!(matches!(fixture_from_value(json!([1])), Err(FixtureError::NotAnObject)));
        let err = fixture_from_value(json!({ "user": ["Huey"] })).unwrap_err();
        assert!(matches!(err, FixtureError::InvalidRecords { ref model_name } if model_name == "user"));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = load_fixture("/definitely/not/here.json").unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.json"));
    }
}

//! Locating and loading spotform configuration documents
//!
//! A document is a JSON or YAML object whose top-level keys are field names
//! of one resource type. It is loaded into a [`serde_json::Value`] so the
//! field registry can decode it against its schema.

pub mod error;

pub use error::*;

use std::path::{Path, PathBuf};

/// Environment variable pointing directly at a configuration document
pub const CONFIG_PATH_ENV: &str = "SPOTFORM_CONFIG_PATH";

/// Candidate file names in the current directory, highest priority first
pub const CANDIDATES: [&str; 4] = [
    "spotform.local.yaml",
    "spotform.yaml",
    "spotform.yml",
    "spotform.json",
];

/// `~/.config/spotform`, if the platform has a config directory
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("spotform"))
}

/// Find the configuration document to use
///
/// Search order:
/// 1. `explicit` (the `--config` flag); it must exist
/// 2. `SPOTFORM_CONFIG_PATH`
/// 3. current directory: [`CANDIDATES`] in order
/// 4. `~/.config/spotform/spotform.yaml`
pub fn find_config_file(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        if path.exists() {
            return Ok(path.to_path_buf());
        }
        tracing::debug!("explicit config {} does not exist", path.display());
        return Err(ConfigError::ConfigFileNotFound);
    }

    if let Ok(config_path) = std::env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(config_path);
        if path.exists() {
            return Ok(path);
        }
        tracing::debug!("{} points at missing {}", CONFIG_PATH_ENV, path.display());
    }

    let current_dir = std::env::current_dir()?;
    for filename in &CANDIDATES {
        let path = current_dir.join(filename);
        if path.exists() {
            return Ok(path);
        }
    }

    if let Some(dir) = config_dir() {
        let global = dir.join("spotform.yaml");
        if global.exists() {
            return Ok(global);
        }
    }

    Err(ConfigError::ConfigFileNotFound)
}

/// Parse a document by file extension
pub fn load_document(path: &Path) -> Result<serde_json::Value> {
    let content = std::fs::read_to_string(path)?;
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    let document = match extension.as_deref() {
        Some("json") => serde_json::from_str(&content)?,
        Some("yaml") | Some("yml") => parse_yaml(&content)?,
        _ => return Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
    };
    tracing::debug!("loaded configuration from {}", path.display());
    Ok(document)
}

/// Discover and load in one step
pub fn load_config(explicit: Option<&Path>) -> Result<serde_json::Value> {
    let path = find_config_file(explicit)?;
    load_document(&path)
}

fn parse_yaml(content: &str) -> Result<serde_json::Value> {
    // an empty YAML file is an empty configuration
    if content.trim().is_empty() {
        return Ok(serde_json::Value::Object(Default::default()));
    }
    Ok(serde_yaml::from_str(content)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use serial_test::serial;
    use std::fs;

    fn in_dir<T>(dir: &Path, f: impl FnOnce() -> T) -> T {
        let original_dir = std::env::current_dir().unwrap();
        std::env::set_current_dir(dir).unwrap();
        let result = temp_env::with_var_unset(CONFIG_PATH_ENV, f);
        std::env::set_current_dir(original_dir).unwrap();
        result
    }

    #[test]
    #[serial]
    fn test_find_in_current_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(temp_dir.path().join("spotform.yaml"), "image_id: ami-1\n").unwrap();

        let found = in_dir(temp_dir.path(), || find_config_file(None)).unwrap();
        assert!(found.ends_with("spotform.yaml"));
    }

    #[test]
    #[serial]
    fn test_local_file_wins() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(temp_dir.path().join("spotform.json"), "{}").unwrap();
        fs::write(temp_dir.path().join("spotform.yaml"), "{}").unwrap();
        fs::write(temp_dir.path().join("spotform.local.yaml"), "{}").unwrap();

        let found = in_dir(temp_dir.path(), || find_config_file(None)).unwrap();
        assert!(found.ends_with("spotform.local.yaml"));
    }

    #[test]
    #[serial]
    fn test_env_var_beats_current_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(temp_dir.path().join("spotform.yaml"), "{}").unwrap();
        let custom = temp_dir.path().join("custom.json");
        fs::write(&custom, "{}").unwrap();

        let original_dir = std::env::current_dir().unwrap();
        std::env::set_current_dir(temp_dir.path()).unwrap();
        let found = temp_env::with_var(CONFIG_PATH_ENV, Some(&custom), || find_config_file(None));
        std::env::set_current_dir(original_dir).unwrap();

        assert_eq!(found.unwrap(), custom);
    }

    #[test]
    #[serial]
    fn test_explicit_path_must_exist() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(temp_dir.path().join("spotform.yaml"), "{}").unwrap();

        let missing = temp_dir.path().join("missing.yaml");
        let result = in_dir(temp_dir.path(), || find_config_file(Some(&missing)));
        assert!(matches!(result, Err(ConfigError::ConfigFileNotFound)));
    }

    #[test]
    #[serial]
    fn test_not_found() {
        let temp_dir = tempfile::tempdir().unwrap();
        let home = tempfile::tempdir().unwrap();

        let original_dir = std::env::current_dir().unwrap();
        std::env::set_current_dir(temp_dir.path()).unwrap();
        // keep a real ~/.config/spotform out of the search
        let result = temp_env::with_vars(
            [
                ("HOME", Some(home.path().as_os_str())),
                ("XDG_CONFIG_HOME", Some(home.path().as_os_str())),
                (CONFIG_PATH_ENV, None),
            ],
            || find_config_file(None),
        );
        std::env::set_current_dir(original_dir).unwrap();
        assert!(matches!(result, Err(ConfigError::ConfigFileNotFound)));
    }

    #[test]
    fn test_load_yaml_and_json() {
        let temp_dir = tempfile::tempdir().unwrap();
        let yaml = temp_dir.path().join("spotform.yaml");
        fs::write(
            &yaml,
            "image_id: ami-123\nsecurity_groups:\n  - sg-1\nmetadata_options:\n  - http_tokens: required\n",
        )
        .unwrap();
        let json_path = temp_dir.path().join("spotform.json");
        fs::write(&json_path, r#"{"image_id": "ami-123", "security_groups": ["sg-1"]}"#).unwrap();

        assert_eq!(
            load_document(&yaml).unwrap(),
            json!({
                "image_id": "ami-123",
                "security_groups": ["sg-1"],
                "metadata_options": [{"http_tokens": "required"}]
            })
        );
        assert_eq!(
            load_document(&json_path).unwrap(),
            json!({"image_id": "ami-123", "security_groups": ["sg-1"]})
        );
    }

    #[test]
    fn test_empty_yaml_is_empty_object() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("spotform.yaml");
        fs::write(&path, "\n").unwrap();
        assert_eq!(load_document(&path).unwrap(), json!({}));
    }

    #[test]
    fn test_unsupported_extension() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("spotform.toml");
        fs::write(&path, "image_id = 'ami-1'").unwrap();
        assert!(matches!(
            load_document(&path),
            Err(ConfigError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_malformed_json_surfaces() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("spotform.json");
        fs::write(&path, "{").unwrap();
        assert!(matches!(load_document(&path), Err(ConfigError::Json(_))));
    }
}

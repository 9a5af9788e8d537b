use crate::store::FileStore;
use crate::subjects::DEFAULT_STORAGE_KEY;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A validation error in the configuration
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]: {}", self.field, self.message)
    }
}

/// Where the subject list is kept
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct StorageConfig {
    /// Storage file; defaults to ~/.vakken/storage.json
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Key of the slot holding the list
    #[serde(default)]
    pub key: Option<String>,
}

/// Table rendering options
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DisplayConfig {
    #[serde(default = "default_true")]
    pub highlight_overrun: bool,
}

fn default_true() -> bool {
    true
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            highlight_overrun: default_true(),
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

impl Config {
    /// Load configuration from default paths
    /// Priority: local (.vakken/config.local.toml) > project (.vakken/config.toml) > user (~/.vakken/config.toml)
    pub fn load() -> Result<Self> {
        let mut config = Self::default();

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".vakken").join("config.toml");
            if user_config.exists() {
                let user = Self::load_from(&user_config)?;
                config.merge(user);
            }
        }

        let project_config = Path::new(".vakken").join("config.toml");
        if project_config.exists() {
            let project = Self::load_from(&project_config)?;
            config.merge(project);
        }

        // Should be gitignored
        let local_config = Path::new(".vakken").join("config.local.toml");
        if local_config.exists() {
            let local = Self::load_from(&local_config)?;
            config.merge(local);
        }

        Ok(config)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        tracing::debug!(path = %path.display(), "config loaded");
        Ok(config)
    }

    /// Merge another config into this one (other takes priority)
    pub fn merge(&mut self, other: Config) {
        if other.storage.path.is_some() {
            self.storage.path = other.storage.path;
        }
        if other.storage.key.is_some() {
            self.storage.key = other.storage.key;
        }
        self.display = other.display;
    }

    /// Resolved storage file path
    pub fn storage_path(&self) -> Option<PathBuf> {
        self.storage.path.clone().or_else(FileStore::default_path)
    }

    /// Resolved storage key
    pub fn storage_key(&self) -> &str {
        self.storage.key.as_deref().unwrap_or(DEFAULT_STORAGE_KEY)
    }

    /// Validate configuration and return any errors found
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Some(key) = &self.storage.key {
            if key.trim().is_empty() {
                errors.push(ValidationError {
                    field: "storage.key".to_string(),
                    message: "Key must not be empty".to_string(),
                });
            }
        }

        if let Some(path) = &self.storage.path {
            if path.is_dir() {
                errors.push(ValidationError {
                    field: "storage.path".to_string(),
                    message: format!("'{}' is a directory, expected a file", path.display()),
                });
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.storage_key(), "vakkenLijst");
        assert!(config.display.highlight_overrun);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[storage]
path = "/tmp/vakken.json"
key = "mijnVakken"

[display]
highlight_overrun = false
"#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.storage_key(), "mijnVakken");
        assert_eq!(
            config.storage_path(),
            Some(PathBuf::from("/tmp/vakken.json"))
        );
        assert!(!config.display.highlight_overrun);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[storage]\nkey = \"k\"\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.storage_key(), "k");
        assert!(config.storage.path.is_none());
        assert!(config.display.highlight_overrun);
    }

    #[test]
    fn test_merge_prefers_other() {
        let mut base = Config::default();
        base.storage.key = Some("base".to_string());
        base.storage.path = Some(PathBuf::from("/base.json"));

        let mut other = Config::default();
        other.storage.key = Some("other".to_string());
        base.merge(other);

        assert_eq!(base.storage_key(), "other");
        assert_eq!(base.storage.path, Some(PathBuf::from("/base.json")));
    }

    #[test]
    fn test_validate_empty_key() {
        let mut config = Config::default();
        config.storage.key = Some("  ".to_string());
        let errors = config.validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].field.contains("storage.key"));
    }

    #[test]
    fn test_validate_directory_path() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.storage.path = Some(dir.path().to_path_buf());
        let errors = config.validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("directory"));
    }
}

//! config.toml storage.
//!
//! Reads TOML, converts it to `serde_json::Value` (intermediate format), then
//! deserializes the domain `AppConfig`. Writes go through a temporary file and
//! an atomic rename.

use std::fs::{self, File};
use std::io::Write as IoWrite;
use std::path::PathBuf;

use quarry_core::config::AppConfig;
use quarry_core::{QuarryError, Result};
use serde_json::Value as JsonValue;

/// A config file storage handle.
///
/// Does NOT know about credentials; those live in secret.json.
pub struct ConfigStorage {
    path: PathBuf,
}

impl ConfigStorage {
    /// Creates a new config storage handle.
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Loads the config file as a serde_json::Value.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(JsonValue))`: Successfully loaded and converted to JSON
    /// - `Ok(None)`: File doesn't exist or is empty
    /// - `Err`: Failed to read or parse the file
    pub fn load_raw(&self) -> Result<Option<JsonValue>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(None);
        }

        let toml_value: toml::Value = toml::from_str(&content)?;
        let json_value = serde_json::to_value(toml_value)?;
        Ok(Some(json_value))
    }

    /// Loads and validates the application config, defaulting when absent.
    pub fn load(&self) -> Result<AppConfig> {
        let config = match self.load_raw()? {
            Some(value) => serde_json::from_value::<AppConfig>(value)?,
            None => {
                tracing::debug!(
                    "[ConfigStorage] No config at {}, using defaults",
                    self.path.display()
                );
                AppConfig::default()
            }
        };
        config.pipeline.validate()?;
        Ok(config)
    }

    /// Saves the config atomically (tmp file + fsync + rename).
    pub fn save(&self, config: &AppConfig) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let toml_string = toml::to_string_pretty(config)?;

        let tmp_path = self.temp_path()?;
        let mut tmp_file = File::create(&tmp_path)?;
        tmp_file.write_all(toml_string.as_bytes())?;
        tmp_file.sync_all()?;
        drop(tmp_file);

        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }

    fn temp_path(&self) -> Result<PathBuf> {
        let parent = self
            .path
            .parent()
            .ok_or_else(|| QuarryError::io("Config path has no parent directory"))?;
        let file_name = self
            .path
            .file_name()
            .ok_or_else(|| QuarryError::io("Config path has no file name"))?;
        Ok(parent.join(format!(".{}.tmp", file_name.to_string_lossy())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quarry_core::PipelineMode;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let storage = ConfigStorage::new(temp_dir.path().join("config.toml"));
        assert_eq!(storage.load().unwrap(), AppConfig::default());
    }

    #[test]
    fn test_save_then_load() {
        let temp_dir = TempDir::new().unwrap();
        let storage = ConfigStorage::new(temp_dir.path().join("sub").join("config.toml"));

        let mut config = AppConfig::default();
        config.pipeline.mode = PipelineMode::MultiAgent;
        config.pipeline.parallel_research = true;
        config.pipeline.max_queries = 3;
        storage.save(&config).unwrap();

        assert_eq!(storage.load().unwrap(), config);
        assert!(!temp_dir.path().join("sub").join(".config.toml.tmp").exists());
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[pipeline]\nmax_queries = 40\n").unwrap();

        let err = ConfigStorage::new(path).load().unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_malformed_toml_is_serialization_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[pipeline\nmode = ").unwrap();

        let err = ConfigStorage::new(path).load().unwrap_err();
        assert!(matches!(err, QuarryError::Serialization { .. }));
    }
}

//! Unified path management for quarry configuration files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/quarry/            # Config directory (platform config dir)
//! ├── config.toml              # Pipeline tuning ([pipeline] table)
//! └── secret.json              # API keys
//! ```
//!
//! `QUARRY_CONFIG_DIR` overrides the directory, which keeps tests and
//! throwaway runs away from the real user config.

use std::path::PathBuf;

use quarry_core::config::{GroqConfig, SecretConfig, SerperConfig};

pub const CONFIG_DIR_ENV: &str = "QUARRY_CONFIG_DIR";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Home/config directory could not be determined.
    ConfigDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::ConfigDirNotFound => write!(f, "Cannot find configuration directory"),
        }
    }
}

impl std::error::Error for PathError {}

/// Unified path management for quarry.
pub struct QuarryPaths;

impl QuarryPaths {
    /// Returns the quarry configuration directory.
    ///
    /// # Returns
    ///
    /// - `Ok(PathBuf)`: `$QUARRY_CONFIG_DIR`, or `<config dir>/quarry`
    /// - `Err(PathError::ConfigDirNotFound)`: Could not determine directory
    pub fn config_dir() -> Result<PathBuf, PathError> {
        if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV).filter(|v| !v.is_empty()) {
            return Ok(PathBuf::from(dir));
        }
        dirs::config_dir()
            .map(|dir| dir.join("quarry"))
            .ok_or(PathError::ConfigDirNotFound)
    }

    /// Returns the path to config.toml.
    pub fn config_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Returns the path to secret.json.
    pub fn secret_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("secret.json"))
    }

    /// Ensures the secret file exists, creating it with a template if it doesn't.
    ///
    /// # Security Note
    ///
    /// This function sets file permissions to 600 (user read/write only) on Unix systems.
    ///
    /// # Returns
    ///
    /// - `Ok((PathBuf, bool))`: Path to the secret file, and whether it was created
    /// - `Err(std::io::Error)`: If file creation or permission setting fails
    pub fn ensure_secret_file() -> Result<(PathBuf, bool), std::io::Error> {
        let secret_path = Self::secret_file()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::NotFound, e.to_string()))?;
        let created = write_secret_template(&secret_path)?;
        Ok((secret_path, created))
    }
}

/// Writes a typed secret.json template unless the file already exists.
pub(crate) fn write_secret_template(secret_path: &std::path::Path) -> Result<bool, std::io::Error> {
    if secret_path.exists() {
        return Ok(false);
    }

    if let Some(parent) = secret_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let template_config = SecretConfig {
        groq: Some(GroqConfig {
            api_key: String::new(),
            model_name: Some(quarry_core::config::DEFAULT_COMPLETION_MODEL.to_string()),
        }),
        serper: Some(SerperConfig {
            api_key: String::new(),
        }),
    };

    let template_json = serde_json::to_string_pretty(&template_config)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    std::fs::write(secret_path, template_json)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let permissions = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(secret_path, permissions)?;
    }

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_template_written_once() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("secret.json");

        assert!(write_secret_template(&path).unwrap());
        let content = std::fs::read_to_string(&path).unwrap();
        let parsed: SecretConfig = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed.groq.unwrap().api_key, "");

        std::fs::write(&path, "{}").unwrap();
        assert!(!write_secret_template(&path).unwrap());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{}");
    }
}

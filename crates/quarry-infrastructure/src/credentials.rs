//! Credential resolution.
//!
//! Priority per key:
//! 1. secret.json (`groq.api_key`, `serper.api_key`)
//! 2. Environment variables (`GROQ_API_KEY`, `SERPER_API_KEY`), after loading
//!    a `.env` file from the working directory if one exists
//!
//! A key missing from both is a startup-time configuration error.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use quarry_core::config::{Credentials, SecretConfig};
use quarry_core::{QuarryError, Result};

use crate::paths::QuarryPaths;

pub const COMPLETION_KEY_ENV: &str = "GROQ_API_KEY";
pub const SEARCH_KEY_ENV: &str = "SERPER_API_KEY";
pub const MODEL_ENV: &str = "GROQ_MODEL_NAME";

/// Loads `.env` into the process environment. Missing files are fine.
pub fn load_dotenv() {
    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!("[Credentials] Loaded environment from {}", path.display()),
        Err(err) if err.not_found() => {}
        Err(err) => tracing::warn!("[Credentials] Failed to load .env: {}", err),
    }
}

/// Resolves credentials from the default secret file and the process environment.
pub fn resolve_credentials() -> Result<Credentials> {
    load_dotenv();

    let secrets = match QuarryPaths::secret_file() {
        Ok(path) => secrets_or_default(&path),
        Err(err) => {
            tracing::debug!("[Credentials] No config directory: {}", err);
            SecretConfig::default()
        }
    };

    resolve_with(&secrets, |name| std::env::var(name).ok())
}

/// Reads secret.json. `Ok(None)` when the file does not exist.
///
/// An unreadable or malformed file is a [`QuarryError::Configuration`]
/// naming the file.
pub fn read_secret_file(path: &Path) -> Result<Option<SecretConfig>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
        Err(err) => {
            return Err(QuarryError::configuration(format!(
                "Failed to read {}: {err}",
                path.display()
            )));
        }
    };

    serde_json::from_str(&content).map(Some).map_err(|err| {
        QuarryError::configuration(format!("Invalid JSON in {}: {err}", path.display()))
    })
}

/// Falls back to empty secrets when the file is missing or broken.
///
/// A broken file is logged at warn level so a typo does not silently fall
/// through to environment variables.
fn secrets_or_default(path: &Path) -> SecretConfig {
    match read_secret_file(path) {
        Ok(Some(secrets)) => secrets,
        Ok(None) => SecretConfig::default(),
        Err(err) => {
            tracing::warn!("[Credentials] Ignoring secret file: {}", err);
            SecretConfig::default()
        }
    }
}

/// Merges secret file values with an environment lookup.
pub fn resolve_with<F>(secrets: &SecretConfig, env: F) -> Result<Credentials>
where
    F: Fn(&str) -> Option<String>,
{
    let from_file = |value: Option<&String>| value.filter(|v| !v.trim().is_empty()).cloned();

    let completion_key = from_file(secrets.groq.as_ref().map(|g| &g.api_key))
        .or_else(|| env(COMPLETION_KEY_ENV));
    let search_key =
        from_file(secrets.serper.as_ref().map(|s| &s.api_key)).or_else(|| env(SEARCH_KEY_ENV));
    let model = secrets
        .groq
        .as_ref()
        .and_then(|g| g.model_name.clone())
        .or_else(|| env(MODEL_ENV));

    Credentials::new(completion_key, search_key, model)
}

use anyhow::{Context, Result};
use quarry_core::config::AppConfig;
use quarry_infrastructure::{ConfigStorage, QuarryPaths};

pub fn path() -> Result<()> {
    let config_file = QuarryPaths::config_file().context("Failed to resolve config directory")?;
    let secret_file = QuarryPaths::secret_file().context("Failed to resolve config directory")?;

    println!("config: {}", config_file.display());
    println!("secret: {}", secret_file.display());
    Ok(())
}

pub fn init() -> Result<()> {
    let config_file = QuarryPaths::config_file().context("Failed to resolve config directory")?;
    if config_file.exists() {
        println!("Config already exists: {}", config_file.display());
    } else {
        ConfigStorage::new(config_file.clone()).save(&AppConfig::default())?;
        println!("Created {}", config_file.display());
    }

    let (secret_file, created) =
        QuarryPaths::ensure_secret_file().context("Failed to create secret.json")?;
    if created {
        println!("Created {}", secret_file.display());
        println!("Fill in groq.api_key and serper.api_key, or set GROQ_API_KEY / SERPER_API_KEY.");
    } else {
        println!("Secret file already exists: {}", secret_file.display());
    }
    Ok(())
}

//! Application configuration handling.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Default server to talk to when nothing is configured.
pub const DEFAULT_SERVER_URL: &str = "http://localhost:5000";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// User-facing configuration, read from
/// `<config_dir>/crail/config.toml` merged with `CRAIL_*` environment
/// variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Base URL of the crayon-rails server.
    pub server_url: String,
    /// Per-request timeout for API calls.
    pub request_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path, with environment
    /// overrides applied on top.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path()?)
    }

    /// Load configuration from an explicit file path. A missing file
    /// is fine; defaults and environment variables still apply.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config = config::Config::builder()
            .set_default("server_url", DEFAULT_SERVER_URL)?
            .set_default("request_timeout_secs", DEFAULT_TIMEOUT_SECS as i64)?
            .add_source(config::File::from(path.to_path_buf()).required(false))
            .add_source(config::Environment::with_prefix("CRAIL"))
            .build()
            .with_context(|| format!("failed to read config {}", path.display()))?;
        config
            .try_deserialize()
            .with_context(|| format!("failed to parse config {}", path.display()))
    }
}

/// Path of the default configuration file.
pub fn default_config_path() -> Result<PathBuf> {
    let dir = dirs::config_dir().context("no configuration directory available")?;
    Ok(dir.join("crail").join("config.toml"))
}

/// Write a commented default configuration file if none exists yet.
pub fn ensure_default_config() -> Result<()> {
    ensure_default_config_at(default_config_path()?)
}

fn ensure_default_config_at(path: PathBuf) -> Result<()> {
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create config directory {}", parent.display()))?;
    }
    let contents = format!(
        "# crail client configuration\n\
         server_url = \"{DEFAULT_SERVER_URL}\"\n\
         request_timeout_secs = {DEFAULT_TIMEOUT_SECS}\n"
    );
    fs::write(&path, contents)
        .with_context(|| format!("failed to write default config {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_defaults() -> Result<()> {
        let temp = tempdir()?;
        let config = AppConfig::load_from(temp.path().join("config.toml"))?;
        assert_eq!(config.server_url, DEFAULT_SERVER_URL);
        assert_eq!(config.request_timeout_secs, 30);
        Ok(())
    }

    #[test]
    fn default_file_round_trips() -> Result<()> {
        let temp = tempdir()?;
        let path = temp.path().join("crail").join("config.toml");
        ensure_default_config_at(path.clone())?;
        assert!(path.exists());
        let config = AppConfig::load_from(&path)?;
        assert_eq!(config.server_url, DEFAULT_SERVER_URL);
        Ok(())
    }

    #[test]
    fn file_values_override_defaults() -> Result<()> {
        let temp = tempdir()?;
        let path = temp.path().join("config.toml");
        fs::write(
            &path,
            "server_url = \"http://rails.example:8080\"\nrequest_timeout_secs = 5\n",
        )?;
        let config = AppConfig::load_from(&path)?;
        assert_eq!(config.server_url, "http://rails.example:8080");
        assert_eq!(config.request_timeout_secs, 5);
        Ok(())
    }
}

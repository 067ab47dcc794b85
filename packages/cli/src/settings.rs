//! Locating and loading `blogclient.toml`.
//!
//! Lookup order: `--config <path>`, then `<config_dir>/blogclient/blogclient.toml`
//! from [`dirs::config_dir`], then built-in defaults. `BLOG_API_URL` (from the
//! environment or a `.env` file) overrides the base URL last.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use store::ClientConfig;

pub const BASE_URL_ENV: &str = "BLOG_API_URL";

const APP_DIR: &str = "blogclient";

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(ClientConfig::filename()))
}

pub fn load(explicit: Option<&Path>) -> Result<ClientConfig> {
    dotenvy::dotenv().ok();

    let config = match explicit {
        Some(path) => {
            if !path.exists() {
                bail!("Config file {} does not exist", path.display());
            }
            read(path)?
        }
        None => match default_config_path() {
            Some(path) if path.exists() => read(&path)?,
            _ => ClientConfig::default(),
        },
    };

    Ok(apply_env(config, std::env::var(BASE_URL_ENV).ok()))
}

fn read(path: &Path) -> Result<ClientConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let config = ClientConfig::from_toml(&text)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    tracing::debug!("Loaded config from {}", path.display());
    Ok(config)
}

/// Override the base URL with a non-blank environment value.
pub fn apply_env(mut config: ClientConfig, base_url: Option<String>) -> ClientConfig {
    if let Some(url) = base_url.filter(|u| !u.trim().is_empty()) {
        config.api.base_url = url.trim().to_string();
    }
    config
}

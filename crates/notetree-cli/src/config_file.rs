//! Persistent CLI configuration.

use std::path::{Path, PathBuf};

use notetree_core::util::normalize_text_option;
use notetree_core::ClientConfig;

use crate::error::CliError;

const CONFIG_DIR_NAME: &str = "notetree";
const CONFIG_FILE_NAME: &str = "config.json";

pub fn default_config_path() -> Result<PathBuf, CliError> {
    dirs::config_dir()
        .map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
        .ok_or_else(|| CliError::Config("Failed to resolve CLI config directory".to_string()))
}

/// Effective configuration: config file, then `NOTETREE_*` environment, then
/// the `--base-url` flag.
pub fn load_client_config(base_url: Option<&str>) -> Result<ClientConfig, CliError> {
    resolve_client_config(&default_config_path()?, |key| std::env::var(key).ok(), base_url)
}

pub fn resolve_client_config(
    path: &Path,
    lookup: impl Fn(&str) -> Option<String>,
    base_url: Option<&str>,
) -> Result<ClientConfig, CliError> {
    let mut config = ClientConfig::load_from_path(path)?;
    config.apply_overrides(lookup)?;
    if let Some(base_url) = normalize_text_option(base_url.map(ToString::to_string)) {
        config.base_url = base_url;
    }

    if config.base_url.trim().is_empty() {
        return Err(CliError::NotConfigured);
    }
    Ok(config.validate()?)
}

use std::path::PathBuf;
use std::sync::Arc;

use notetree_core::session::CredentialContext;
use notetree_core::util::normalize_text_option;
use notetree_core::ClientConfig;

use crate::cli::ConfigCommands;
use crate::config_file::default_config_path;
use crate::error::CliError;
use crate::store::KeyringStore;

pub fn run_config(command: ConfigCommands, global_base_url: Option<&str>) -> Result<(), CliError> {
    match command {
        ConfigCommands::Show => run_config_show(global_base_url),
        ConfigCommands::Init {
            base_url,
            tenant,
            download_dir,
        } => run_config_init(
            base_url.as_deref().or(global_base_url),
            tenant.as_deref(),
            download_dir,
        ),
    }
}

fn run_config_show(global_base_url: Option<&str>) -> Result<(), CliError> {
    let path = default_config_path()?;
    let mut config = ClientConfig::load_from_path(&path)?;
    config.apply_env()?;
    if let Some(base_url) = normalize_text_option(global_base_url.map(ToString::to_string)) {
        config.base_url = base_url;
    }

    println!("Config file: {}", path.display());
    println!("{}", serde_json::to_string_pretty(&config)?);
    let credentials = CredentialContext::init(Arc::new(KeyringStore::default()));
    match credentials.tenant_code()? {
        Some(code) => println!("Tenant code: {code}"),
        None => println!("Tenant code: (none)"),
    }
    Ok(())
}

fn run_config_init(
    base_url: Option<&str>,
    tenant: Option<&str>,
    download_dir: Option<PathBuf>,
) -> Result<(), CliError> {
    let path = default_config_path()?;
    let config = apply_init(ClientConfig::load_from_path(&path)?, base_url, download_dir)?;
    config.save_to_path(&path)?;
    println!("Saved config to {}", path.display());

    if let Some(code) = normalize_text_option(tenant.map(ToString::to_string)) {
        CredentialContext::init(Arc::new(KeyringStore::default())).set_tenant_code(&code)?;
        println!("Stored tenant code {code}");
    }
    Ok(())
}

/// Merge `config init` flags into an existing file config and validate it.
pub fn apply_init(
    mut config: ClientConfig,
    base_url: Option<&str>,
    download_dir: Option<PathBuf>,
) -> Result<ClientConfig, CliError> {
    if let Some(base_url) = normalize_text_option(base_url.map(ToString::to_string)) {
        config.base_url = base_url;
    }
    if download_dir.is_some() {
        config.download_dir = download_dir;
    }
    if config.base_url.trim().is_empty() {
        return Err(CliError::NotConfigured);
    }
    Ok(config.validate()?)
}

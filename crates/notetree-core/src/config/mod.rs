//! Client configuration.
//!
//! `ClientConfig` describes where the note service lives and how the client
//! behaves (API root, login path, tenant header, sync cadence, downloads).
//! Values come from a JSON file, environment overrides, or code.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::util::{is_http_url, normalize_path_prefix, normalize_text_option};

pub const DEFAULT_API_ROOT: &str = "/api";
pub const DEFAULT_LOGIN_PATH: &str = "/login";
pub const DEFAULT_TENANT_HEADER: &str = "Organ-Code";
pub const DEFAULT_SYNC_INTERVAL_MS: u64 = 3_000;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

pub const ENV_BASE_URL: &str = "NOTETREE_BASE_URL";
pub const ENV_DOWNLOAD_DIR: &str = "NOTETREE_DOWNLOAD_DIR";
pub const ENV_SYNC_INTERVAL_MS: &str = "NOTETREE_SYNC_INTERVAL_MS";

/// Runtime configuration shared by the transport, session and sync scheduler.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    /// Service origin, e.g. `https://notes.example.com`
    #[serde(default)]
    pub base_url: String,
    /// Fixed prefix placed before every request path
    #[serde(default = "default_api_root")]
    pub api_root: String,
    /// Path the navigator is sent to when authentication expires
    #[serde(default = "default_login_path")]
    pub login_path: String,
    /// Header carrying the stored tenant/organization code
    #[serde(default = "default_tenant_header")]
    pub tenant_header: String,
    #[serde(default = "default_sync_interval_ms")]
    pub sync_interval_ms: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Where downloadable responses are saved; downloads are not saved when unset
    #[serde(default)]
    pub download_dir: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_root: default_api_root(),
            login_path: default_login_path(),
            tenant_header: default_tenant_header(),
            sync_interval_ms: DEFAULT_SYNC_INTERVAL_MS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            download_dir: None,
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Load a config file. A missing file yields the defaults.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path)?;
        serde_json::from_str(&raw).map_err(|error| {
            Error::InvalidConfiguration(format!(
                "failed to parse config at {}: {error}",
                path.display()
            ))
        })
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let serialized = serde_json::to_string_pretty(self)?;
        std::fs::write(path, serialized)?;
        Ok(())
    }

    /// Apply `NOTETREE_*` environment overrides.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary lookup (the environment in production).
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(base_url) = normalize_text_option(lookup(ENV_BASE_URL)) {
            self.base_url = base_url;
        }
        if let Some(dir) = normalize_text_option(lookup(ENV_DOWNLOAD_DIR)) {
            self.download_dir = Some(PathBuf::from(dir));
        }
        if let Some(raw) = normalize_text_option(lookup(ENV_SYNC_INTERVAL_MS)) {
            self.sync_interval_ms = raw.parse().map_err(|_| {
                Error::InvalidConfiguration(format!(
                    "{ENV_SYNC_INTERVAL_MS} must be a positive integer, got '{raw}'"
                ))
            })?;
        }
        Ok(())
    }

    /// Normalize fields in place and reject unusable values.
    pub fn validate(mut self) -> Result<Self> {
        let base_url = normalize_text_option(Some(self.base_url)).ok_or_else(|| {
            Error::InvalidConfiguration("base_url must not be empty".to_string())
        })?;
        if !is_http_url(&base_url) {
            return Err(Error::InvalidConfiguration(
                "base_url must include http:// or https://".to_string(),
            ));
        }
        self.base_url = base_url.trim_end_matches('/').to_string();
        self.api_root = normalize_path_prefix(&self.api_root);

        self.login_path = normalize_path_prefix(&self.login_path);
        if self.login_path.is_empty() {
            self.login_path = "/".to_string();
        }

        self.tenant_header = self.tenant_header.trim().to_string();
        if self.tenant_header.is_empty() {
            return Err(Error::InvalidConfiguration(
                "tenant_header must not be empty".to_string(),
            ));
        }
        if self.sync_interval_ms == 0 {
            return Err(Error::InvalidConfiguration(
                "sync_interval_ms must be greater than zero".to_string(),
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(Error::InvalidConfiguration(
                "request_timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(self)
    }

    pub const fn sync_interval(&self) -> Duration {
        Duration::from_millis(self.sync_interval_ms)
    }

    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Absolute URL for an API path: base URL + API root + path.
    pub fn endpoint(&self, path: &str) -> String {
        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{path}")
        };
        format!("{}{}{}", self.base_url, self.api_root, path)
    }
}

fn default_api_root() -> String {
    DEFAULT_API_ROOT.to_string()
}

fn default_login_path() -> String {
    DEFAULT_LOGIN_PATH.to_string()
}

fn default_tenant_header() -> String {
    DEFAULT_TENANT_HEADER.to_string()
}

const fn default_sync_interval_ms() -> u64 {
    DEFAULT_SYNC_INTERVAL_MS
}

const fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

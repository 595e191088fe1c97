//! Credential storage.
//!
//! `KeyValueStore` is the opaque persistence capability supplied by the host
//! (keyring, file, memory). `CredentialContext` is the typed view over it that
//! the transport reads and the session mutates.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use crate::error::{Error, Result};
use crate::models::User;

pub const TOKEN_KEY: &str = "token";
pub const TENANT_CODE_KEY: &str = "organ-code";
pub const USER_PROFILE_KEY: &str = "user-info";
pub const SESSION_COOKIE_KEY: &str = "session-cookie";

/// Every key the client writes; `clear` implementations that cannot enumerate
/// their backing store remove exactly these.
pub const CREDENTIAL_KEYS: [&str; 4] = [
    TOKEN_KEY,
    TENANT_CODE_KEY,
    USER_PROFILE_KEY,
    SESSION_COOKIE_KEY,
];

pub trait KeyValueStore: Send + Sync + 'static {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

/// Process-local store; contents are lost when the process exits
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_entries<T>(&self, apply: impl FnOnce(&mut HashMap<String, String>) -> T) -> Result<T> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|error| Error::Storage(error.to_string()))?;
        Ok(apply(&mut guard))
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.with_entries(|entries| entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.with_entries(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.with_entries(|entries| {
            entries.remove(key);
        })
    }

    fn clear(&self) -> Result<()> {
        self.with_entries(HashMap::clear)
    }
}

/// Typed access to the stored token, tenant code, user profile and session
/// cookie. Cloning shares the underlying store.
#[derive(Clone)]
pub struct CredentialContext {
    store: Arc<dyn KeyValueStore>,
}

impl fmt::Debug for CredentialContext {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("CredentialContext")
            .field("store", &"[opaque]")
            .finish()
    }
}

impl CredentialContext {
    /// Wrap a store at application start; reports whether a profile was restored.
    pub fn init(store: Arc<dyn KeyValueStore>) -> Self {
        let context = Self { store };
        match context.user() {
            Ok(Some(user)) => tracing::info!("Restored session for user {}", user.id),
            Ok(None) => tracing::debug!("No stored session"),
            Err(error) => tracing::warn!("Stored session could not be read: {}", error),
        }
        context
    }

    pub fn token(&self) -> Result<Option<String>> {
        self.non_empty(TOKEN_KEY)
    }

    pub fn set_token(&self, token: &str) -> Result<()> {
        self.store.set(TOKEN_KEY, token)
    }

    pub fn tenant_code(&self) -> Result<Option<String>> {
        self.non_empty(TENANT_CODE_KEY)
    }

    pub fn set_tenant_code(&self, code: &str) -> Result<()> {
        self.store.set(TENANT_CODE_KEY, code)
    }

    pub fn session_cookie(&self) -> Result<Option<String>> {
        self.non_empty(SESSION_COOKIE_KEY)
    }

    pub fn set_session_cookie(&self, cookie: &str) -> Result<()> {
        self.store.set(SESSION_COOKIE_KEY, cookie)
    }

    pub fn remove_session_cookie(&self) -> Result<()> {
        self.store.remove(SESSION_COOKIE_KEY)
    }

    /// Last-known profile of the logged-in user.
    pub fn user(&self) -> Result<Option<User>> {
        match self.non_empty(USER_PROFILE_KEY)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    pub fn set_user(&self, user: &User) -> Result<()> {
        let raw = serde_json::to_string(user)?;
        self.store.set(USER_PROFILE_KEY, &raw)
    }

    pub fn remove_user(&self) -> Result<()> {
        self.store.remove(USER_PROFILE_KEY)
    }

    /// Drop every stored credential and the cached profile.
    pub fn clear(&self) -> Result<()> {
        self.store.clear()
    }

    fn non_empty(&self, key: &str) -> Result<Option<String>> {
        Ok(self.store.get(key)?.filter(|value| !value.trim().is_empty()))
    }
}

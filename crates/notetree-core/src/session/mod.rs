//! Session state: who is logged in, and the stored credentials behind it.

mod navigator;
mod store;

use std::sync::Arc;

use crate::api::UsersClient;
use crate::error::Result;
use crate::models::{Credentials, RegisterUser, User};

pub use navigator::{MemoryNavigator, Navigator};
pub use store::{
    CredentialContext, KeyValueStore, MemoryStore, CREDENTIAL_KEYS, SESSION_COOKIE_KEY,
    TENANT_CODE_KEY, TOKEN_KEY, USER_PROFILE_KEY,
};

/// Login, logout and the cached profile of the current user
#[derive(Clone)]
pub struct Session {
    users: UsersClient,
    credentials: CredentialContext,
    navigator: Arc<dyn Navigator>,
    login_path: String,
}

impl Session {
    pub fn new(
        users: UsersClient,
        credentials: CredentialContext,
        navigator: Arc<dyn Navigator>,
        login_path: impl Into<String>,
    ) -> Self {
        Self {
            users,
            credentials,
            navigator,
            login_path: login_path.into(),
        }
    }

    /// Log in and remember the returned profile. A failed login forgets any
    /// previously stored profile.
    pub async fn login(&self, credentials: &Credentials) -> Result<User> {
        match self.users.login(credentials).await {
            Ok(user) => {
                self.credentials.set_user(&user)?;
                tracing::info!("Logged in as user {}", user.id);
                Ok(user)
            }
            Err(error) => {
                if let Err(clear_error) = self.credentials.remove_user() {
                    tracing::warn!("Failed to clear stored profile: {}", clear_error);
                }
                Err(error)
            }
        }
    }

    /// Create an account. The session is left untouched.
    pub async fn register(&self, account: &RegisterUser) -> Result<User> {
        self.users.register(account).await
    }

    /// Log out: tell the server if possible, then always clear local state
    /// and go to the login view.
    pub async fn logout(&self) -> Result<()> {
        if let Err(error) = self.users.logout().await {
            tracing::warn!("Server logout failed, clearing local session anyway: {}", error);
        }

        let cleared = self.credentials.clear();
        self.navigator.redirect(&self.login_path);
        tracing::info!("Logged out");
        cleared
    }

    pub fn current_user(&self) -> Result<Option<User>> {
        self.credentials.user()
    }

    pub fn is_logged_in(&self) -> bool {
        match self.current_user() {
            Ok(user) => user.is_some(),
            Err(error) => {
                tracing::warn!("Stored profile is unreadable: {}", error);
                false
            }
        }
    }

    pub const fn credentials(&self) -> &CredentialContext {
        &self.credentials
    }
}

//! Terminal stand-in for view navigation.

use std::sync::Mutex;

use notetree_core::session::Navigator;

/// Tracks the "current view" of a command and tells the user when the client
/// sends them to the login view.
#[derive(Debug)]
pub struct TerminalNavigator {
    current: Mutex<String>,
    login_path: String,
}

impl TerminalNavigator {
    pub fn new(current: impl Into<String>, login_path: impl Into<String>) -> Self {
        Self {
            current: Mutex::new(current.into()),
            login_path: login_path.into(),
        }
    }
}

impl Navigator for TerminalNavigator {
    fn current_path(&self) -> String {
        self.current
            .lock()
            .map(|current| current.clone())
            .unwrap_or_default()
    }

    fn redirect(&self, path: &str) {
        if let Ok(mut current) = self.current.lock() {
            path.clone_into(&mut *current);
        }
        if path == self.login_path {
            eprintln!("Session ended. Run `notetree auth login` to sign in again.");
        } else {
            tracing::debug!("Redirected to {}", path);
        }
    }
}

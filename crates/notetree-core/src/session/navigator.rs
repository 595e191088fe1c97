//! Navigation capability used for auth redirects.

use std::sync::{Arc, Mutex};

pub trait Navigator: Send + Sync + 'static {
    /// Path of the view currently shown.
    fn current_path(&self) -> String;

    fn redirect(&self, path: &str);
}

/// Navigator that only tracks the current path and the redirect history
#[derive(Debug, Clone)]
pub struct MemoryNavigator {
    state: Arc<Mutex<NavigationState>>,
}

#[derive(Debug, Default)]
struct NavigationState {
    current: String,
    redirects: Vec<String>,
}

impl MemoryNavigator {
    pub fn new(initial_path: impl Into<String>) -> Self {
        Self {
            state: Arc::new(Mutex::new(NavigationState {
                current: initial_path.into(),
                redirects: Vec::new(),
            })),
        }
    }

    pub fn redirects(&self) -> Vec<String> {
        self.state
            .lock()
            .map(|state| state.redirects.clone())
            .unwrap_or_default()
    }
}

impl Default for MemoryNavigator {
    fn default() -> Self {
        Self::new("/")
    }
}

impl Navigator for MemoryNavigator {
    fn current_path(&self) -> String {
        self.state
            .lock()
            .map(|state| state.current.clone())
            .unwrap_or_default()
    }

    fn redirect(&self, path: &str) {
        if let Ok(mut state) = self.state.lock() {
            state.current = path.to_string();
            state.redirects.push(path.to_string());
        }
    }
}

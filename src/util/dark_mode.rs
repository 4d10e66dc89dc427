//! Dark mode preference and toggle.
//!
//! The preference is a single `true`/`false` file. A missing file means
//! light mode. Failing to read or write it is logged and otherwise ignored:
//! the theme is cosmetic and must never stop the client.

#[cfg(test)]
#[path = "dark_mode_test.rs"]
mod dark_mode_test;

use std::path::{Path, PathBuf};

use tracing::warn;

/// File name used under the home directory when no path is configured.
pub const DEFAULT_PREFS_FILE: &str = ".roomchat_dark_mode";

/// Read the stored preference; `false` when absent or unreadable.
pub fn read_preference(path: &Path) -> bool {
    match std::fs::read_to_string(path) {
        Ok(contents) => contents.trim() == "true",
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => false,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "could not read dark mode preference");
            false
        }
    }
}

/// Persist the preference.
///
/// # Errors
///
/// Returns the underlying I/O error if the file cannot be written.
pub fn write_preference(path: &Path, enabled: bool) -> std::io::Result<()> {
    std::fs::write(path, if enabled { "true" } else { "false" })
}

/// Current theme plus where it is stored.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DarkMode {
    enabled: bool,
    store: Option<PathBuf>,
}

impl DarkMode {
    /// Load the stored preference; without a store, start in light mode.
    #[must_use]
    pub fn load(store: Option<PathBuf>) -> Self {
        let enabled = store.as_deref().is_some_and(read_preference);
        Self { enabled, store }
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Flip the theme and persist it. Returns the new value.
    pub fn toggle(&mut self) -> bool {
        self.enabled = !self.enabled;
        if let Some(path) = &self.store {
            if let Err(e) = write_preference(path, self.enabled) {
                warn!(path = %path.display(), error = %e, "could not save dark mode preference");
            }
        }
        self.enabled
    }
}

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Local preference store for the incident map client.
//!
//! The browser build kept these values in `localStorage`; this crate is
//! the native analog: a flat string-keyed map persisted as JSON in a
//! single file. Every write replaces the whole file. A missing or
//! corrupt file is treated as an empty store so the client always starts.

use std::collections::BTreeMap;
use std::path::PathBuf;

/// Preference keys shared across the client.
pub mod keys {
    /// Admin session flag (`"true"` when logged in).
    pub const IS_ADMIN: &str = "isAdmin";
    /// Admin login time, milliseconds since the epoch.
    pub const ADMIN_LOGIN_TIME: &str = "adminLoginTime";
    /// Dark mode preference (`"true"` / `"false"`).
    pub const DARK_MODE_GLOBAL: &str = "darkModeGlobal";
}

/// A file-backed string-keyed preference store.
#[derive(Debug, Clone, Default)]
pub struct PrefsStore {
    path: Option<PathBuf>,
    values: BTreeMap<String, String>,
}

impl PrefsStore {
    /// Opens the store backed by the file at `path`.
    ///
    /// A missing file yields an empty store; a corrupt file is logged
    /// and treated as empty.
    #[must_use]
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match std::fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(values) => values,
                Err(e) => {
                    log::warn!("Corrupt prefs file {}, starting empty: {e}", path.display());
                    BTreeMap::new()
                },
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                log::warn!("Failed to read prefs file {}: {e}", path.display());
                BTreeMap::new()
            },
        };
        Self {
            path: Some(path),
            values,
        }
    }

    /// Creates an unbacked in-memory store.
    #[must_use]
    pub const fn in_memory() -> Self {
        Self {
            path: None,
            values: BTreeMap::new(),
        }
    }

    /// Returns the value for `key`, if set.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Returns whether `key` is set to the string `"true"`.
    #[must_use]
    pub fn get_bool(&self, key: &str) -> bool {
        self.get(key) == Some("true")
    }

    /// Sets `key` to `value` and persists the store.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
        self.persist();
    }

    /// Sets `key` to `"true"` or `"false"` and persists the store.
    pub fn set_bool(&mut self, key: impl Into<String>, value: bool) {
        self.set(key, if value { "true" } else { "false" });
    }

    /// Removes `key` and persists the store.
    pub fn remove(&mut self, key: &str) {
        self.values.remove(key);
        self.persist();
    }

    /// Writes the whole map back to disk. Write failures are logged,
    /// never propagated: losing a preference is not worth stopping the
    /// client for.
    fn persist(&self) {
        let Some(path) = &self.path else {
            return;
        };
        let serialized = match serde_json::to_string_pretty(&self.values) {
            Ok(s) => s,
            Err(e) => {
                log::error!("Failed to serialize prefs: {e}");
                return;
            },
        };
        if let Some(parent) = path.parent()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            log::error!("Failed to create prefs directory: {e}");
            return;
        }
        if let Err(e) = std::fs::write(path, serialized) {
            log::error!("Failed to write prefs file {}: {e}", path.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_store_has_no_values() {
        let store = PrefsStore::in_memory();
        assert_eq!(store.get(keys::IS_ADMIN), None);
        assert!(!store.get_bool(keys::DARK_MODE_GLOBAL));
    }

    #[test]
    fn set_get_remove() {
        let mut store = PrefsStore::in_memory();
        store.set(keys::ADMIN_LOGIN_TIME, "1700000000000");
        assert_eq!(store.get(keys::ADMIN_LOGIN_TIME), Some("1700000000000"));
        store.remove(keys::ADMIN_LOGIN_TIME);
        assert_eq!(store.get(keys::ADMIN_LOGIN_TIME), None);
    }

    #[test]
    fn bools_round_trip_as_strings() {
        let mut store = PrefsStore::in_memory();
        store.set_bool(keys::DARK_MODE_GLOBAL, true);
        assert_eq!(store.get(keys::DARK_MODE_GLOBAL), Some("true"));
        assert!(store.get_bool(keys::DARK_MODE_GLOBAL));
        store.set_bool(keys::DARK_MODE_GLOBAL, false);
        assert!(!store.get_bool(keys::DARK_MODE_GLOBAL));
    }

    #[test]
    fn persists_and_reloads() {
        let dir = std::env::temp_dir().join(format!("incident_map_prefs_{}", std::process::id()));
        let path = dir.join("prefs.json");
        let _ = std::fs::remove_file(&path);

        let mut store = PrefsStore::open(&path);
        store.set_bool(keys::IS_ADMIN, true);
        store.set(keys::ADMIN_LOGIN_TIME, "123");

        let reloaded = PrefsStore::open(&path);
        assert!(reloaded.get_bool(keys::IS_ADMIN));
        assert_eq!(reloaded.get(keys::ADMIN_LOGIN_TIME), Some("123"));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn corrupt_file_starts_empty() {
        let dir = std::env::temp_dir().join(format!("incident_map_prefs_bad_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("prefs.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = PrefsStore::open(&path);
        assert_eq!(store.get(keys::IS_ADMIN), None);

        let _ = std::fs::remove_dir_all(&dir);
    }
}

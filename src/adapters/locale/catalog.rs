//! Implements TranslatePort using a JSON catalog file.
//!
//! Catalogs live at `<data_dir>/<lang>.json` as a flat key -> string map.
//! A missing or malformed catalog degrades to an empty map; unresolved keys
//! fall back to the key itself so the UI never fails on translation.

use crate::ports::TranslatePort;
use std::collections::HashMap;
use std::path::Path;
use tracing::{info, warn};

/// Default language when the requested catalog is absent.
pub const DEFAULT_LANG: &str = "en-CA";

/// JSON file-based translation catalog.
pub struct JsonCatalog {
    entries: HashMap<String, String>,
}

impl JsonCatalog {
    /// Load the catalog for `lang` from `data_dir`, falling back to the
    /// default language and then to an empty catalog.
    pub fn load(data_dir: impl AsRef<Path>, lang: &str) -> Self {
        let dir = data_dir.as_ref();
        let entries = Self::read_catalog(&dir.join(format!("{lang}.json")))
            .or_else(|| {
                if lang != DEFAULT_LANG {
                    warn!(lang, "language catalog not found, falling back to {DEFAULT_LANG}");
                    Self::read_catalog(&dir.join(format!("{DEFAULT_LANG}.json")))
                } else {
                    None
                }
            })
            .unwrap_or_default();
        if entries.is_empty() {
            warn!(lang, "no translation catalog loaded, keys pass through");
        } else {
            info!(lang, count = entries.len(), "language catalog loaded");
        }
        Self { entries }
    }

    /// Empty catalog: every lookup returns the key.
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    fn read_catalog(path: &Path) -> Option<HashMap<String, String>> {
        let raw = std::fs::read_to_string(path).ok()?;
        match serde_json::from_str(&raw) {
            Ok(map) => Some(map),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "malformed language catalog, ignoring");
                None
            }
        }
    }
}

impl TranslatePort for JsonCatalog {
    fn translate(&self, key: &str) -> String {
        self.entries
            .get(key)
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unresolved_keys_fall_back_to_the_key() {
        let catalog = JsonCatalog::empty();
        assert_eq!(catalog.translate("main_menu"), "main_menu");
    }

    #[test]
    fn missing_catalog_never_fails() {
        let catalog = JsonCatalog::load("/nonexistent", "xx-XX");
        assert_eq!(catalog.translate("add_victim"), "add_victim");
    }

    #[test]
    fn loaded_entries_resolve() {
        let dir = std::env::temp_dir().join("relief-registry-locale-test");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("en-CA.json"),
            r#"{"main_menu": "Main Menu", "exit_program": "Exit"}"#,
        )
        .unwrap();

        let catalog = JsonCatalog::load(&dir, "en-CA");
        assert_eq!(catalog.translate("main_menu"), "Main Menu");
        assert_eq!(catalog.translate("unknown_key"), "unknown_key");
    }
}

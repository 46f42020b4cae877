//! Application configuration. Paths, language, storage backend selection.

use serde::Deserialize;

/// Storage backend, chosen once at startup. Every service sees the same
/// RegistryPort regardless of the choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Sqlite,
    Memory,
}

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    /// Data directory for the database and language catalogs. Read from RELIEF_DATA_DIR.
    pub data_dir: Option<String>,

    /// Language code, e.g. "en-CA". Read from RELIEF_LANGUAGE.
    #[serde(default)]
    pub language: Option<String>,

    /// Storage backend: "sqlite" (default) or "memory". Read from RELIEF_STORAGE.
    #[serde(default)]
    pub storage: Option<String>,

    /// Purge expired allocations at startup (default false: expired records
    /// are retained for audit). Read from RELIEF_PURGE_EXPIRED_ON_LOAD.
    #[serde(default)]
    pub purge_expired_on_load: Option<bool>,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();
        let mut c = config::Config::builder();
        c = c.add_source(config::Environment::with_prefix("RELIEF"));
        if let Ok(path) = std::env::var("RELIEF_CONFIG") {
            c = c.add_source(config::File::with_name(&path));
        }
        let cfg: Self = c.build()?.try_deserialize()?;
        Ok(cfg)
    }

    /// Returns the data directory. Defaults to "./data".
    pub fn data_dir_or_default(&self) -> String {
        self.data_dir.clone().unwrap_or_else(|| "./data".to_string())
    }

    /// Returns the language code. Defaults to "en-CA".
    pub fn language_or_default(&self) -> String {
        self.language.clone().unwrap_or_else(|| "en-CA".to_string())
    }

    /// Returns the storage backend. Unrecognized values fall back to SQLite.
    pub fn storage_backend(&self) -> StorageBackend {
        match self.storage.as_deref() {
            Some(s) if s.eq_ignore_ascii_case("memory") => StorageBackend::Memory,
            _ => StorageBackend::Sqlite,
        }
    }

    /// Returns whether expired allocations are purged at startup.
    pub fn purge_expired_on_load(&self) -> bool {
        self.purge_expired_on_load.unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sqlite_and_no_purge() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.storage_backend(), StorageBackend::Sqlite);
        assert!(!cfg.purge_expired_on_load());
        assert_eq!(cfg.language_or_default(), "en-CA");
    }

    #[test]
    fn memory_backend_is_case_insensitive() {
        let cfg = AppConfig {
            storage: Some("Memory".into()),
            ..Default::default()
        };
        assert_eq!(cfg.storage_backend(), StorageBackend::Memory);
    }
}

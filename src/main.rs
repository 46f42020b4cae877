//! Wiring & DI. Entry point: bootstrap adapters, inject into services, run UI.
//! No business logic here; the storage backend is chosen once from config.

use dotenv::dotenv;
use relief_registry::adapters::locale::JsonCatalog;
use relief_registry::adapters::persistence::{MemoryRegistry, SqliteRegistry};
use relief_registry::adapters::ui::ReliefTui;
use relief_registry::ports::{InputPort, RegistryPort, TranslatePort};
use relief_registry::shared::config::{AppConfig, StorageBackend};
use relief_registry::usecases::{InquiryService, RegistryService, SupplyService};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_loaded = dotenv();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Ok(path) = &env_loaded {
        info!(path = %path.display(), "loaded .env");
    }

    let cfg = AppConfig::load().unwrap_or_default();
    let data_dir = PathBuf::from(cfg.data_dir_or_default());

    // --- Storage: one RegistryPort, backend selected once ---
    let repo: Arc<dyn RegistryPort> = match cfg.storage_backend() {
        StorageBackend::Sqlite => {
            let sqlite = SqliteRegistry::connect(&data_dir)
                .await
                .map_err(|e| anyhow::anyhow!("SQLite connect failed: {}", e))?;
            Arc::new(sqlite)
        }
        StorageBackend::Memory => {
            warn!("using in-memory storage, nothing will survive exit");
            Arc::new(MemoryRegistry::new())
        }
    };

    // --- Localization ---
    let lang = cfg.language_or_default();
    let i18n: Arc<dyn TranslatePort> = Arc::new(JsonCatalog::load(&data_dir, &lang));

    // --- Services ---
    let registry_service = Arc::new(RegistryService::new(Arc::clone(&repo)));
    let supply_service = Arc::new(SupplyService::new(Arc::clone(&repo)));
    let inquiry_service = Arc::new(InquiryService::new(Arc::clone(&repo)));

    // --- Startup maintenance: sweep stale water; purge only when asked ---
    let expired = supply_service
        .sweep_expired(chrono::Utc::now())
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;
    if expired > 0 {
        info!(expired, "stale water allocations expired at startup");
    }
    if cfg.purge_expired_on_load() {
        let purged = supply_service
            .purge_expired()
            .await
            .map_err(|e| anyhow::anyhow!("{}", e))?;
        info!(purged, "expired allocations purged at startup");
    }

    // --- Run (main menu -> registry / inquiries / supplies) ---
    let input_port: Arc<dyn InputPort> = Arc::new(ReliefTui::new(
        registry_service,
        supply_service,
        inquiry_service,
        i18n,
    ));
    input_port.run().await.map_err(|e| anyhow::anyhow!("{}", e))?;

    Ok(())
}

use std::sync::Arc;

use crate::config::Config;
use crate::db::Store;
use crate::services::password::decoy_hash;
use crate::services::{
    Argon2Verifier, AuthService, AuthenticationGate, CatalogService, ContentService,
    SeaOrmCatalogService, SeaOrmContentService, SeaOrmSettingsService, SessionIssuer,
    SettingsService,
};

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<Config>,

    pub store: Store,

    pub auth_service: Arc<dyn AuthService>,

    pub content_service: Arc<dyn ContentService>,

    pub catalog_service: Arc<dyn CatalogService>,

    pub settings_service: Arc<dyn SettingsService>,
}

impl SharedState {
    /// Connects the database, applies migrations and first-run data, and
    /// wires the domain services.
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;
        store.ensure_seed_data(&config).await?;
        let decoy = decoy_hash(&config.security).await?;

        Ok(Self::from_store(config, store, decoy))
    }

    #[must_use]
    pub fn from_store(config: Config, store: Store, decoy_hash: String) -> Self {
        let auth_service = Arc::new(AuthenticationGate::new(
            Arc::new(store.users()),
            Arc::new(Argon2Verifier),
            SessionIssuer::new(config.session_window()),
            decoy_hash,
        ));

        let content_service = Arc::new(SeaOrmContentService::new(
            store.clone(),
            config.content.default_hero_image.clone(),
        ));

        let catalog_service = Arc::new(SeaOrmCatalogService::new(store.clone()));
        let settings_service = Arc::new(SeaOrmSettingsService::new(store.clone()));

        Self {
            config: Arc::new(config),
            store,
            auth_service,
            content_service,
            catalog_service,
            settings_service,
        }
    }
}

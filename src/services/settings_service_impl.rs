//! `SeaORM` implementation of the `SettingsService` trait.

use async_trait::async_trait;

use crate::db::Store;
use crate::domain::Actor;
use crate::services::settings_service::{
    SettingView, SettingsError, SettingsService, validate_key,
};

pub struct SeaOrmSettingsService {
    store: Store,
}

impl SeaOrmSettingsService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait]
impl SettingsService for SeaOrmSettingsService {
    async fn list(&self) -> Result<Vec<SettingView>, SettingsError> {
        let settings = self.store.settings().list().await?;
        Ok(settings.into_iter().map(SettingView::from).collect())
    }

    async fn upsert(
        &self,
        key: &str,
        value: Option<String>,
        description: Option<String>,
        actor: &Actor,
    ) -> Result<SettingView, SettingsError> {
        validate_key(key)?;

        let setting = self
            .store
            .settings()
            .upsert(key, value, description, actor)
            .await?;

        tracing::info!(key, actor = %actor, "Site setting saved");
        Ok(SettingView::from(setting))
    }
}

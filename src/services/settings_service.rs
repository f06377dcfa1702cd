//! Domain service for free-form site settings.

use serde::Serialize;
use thiserror::Error;

use crate::domain::Actor;
use crate::entities::site_settings;

pub const MAX_SETTING_KEY_LEN: usize = 100;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<anyhow::Error> for SettingsError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(format!("{err:#}"))
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingView {
    pub id: i32,
    pub key: String,
    pub value: Option<String>,
    pub description: Option<String>,
    pub updated_at: String,
    pub updated_by: String,
}

impl From<site_settings::Model> for SettingView {
    fn from(model: site_settings::Model) -> Self {
        Self {
            id: model.id,
            key: model.key,
            value: model.value,
            description: model.description,
            updated_at: model.updated_at,
            updated_by: model.updated_by,
        }
    }
}

#[async_trait::async_trait]
pub trait SettingsService: Send + Sync {
    async fn list(&self) -> Result<Vec<SettingView>, SettingsError>;

    /// Creates the key if needed and overwrites its value.
    async fn upsert(
        &self,
        key: &str,
        value: Option<String>,
        description: Option<String>,
        actor: &Actor,
    ) -> Result<SettingView, SettingsError>;
}

/// Keys are short identifiers: letters, digits, `.`, `_` and `-`.
pub fn validate_key(key: &str) -> Result<(), SettingsError> {
    if key.is_empty() || key.len() > MAX_SETTING_KEY_LEN {
        return Err(SettingsError::Validation(format!(
            "Setting key must be 1 to {MAX_SETTING_KEY_LEN} characters"
        )));
    }
    if !key
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
    {
        return Err(SettingsError::Validation(
            "Setting key can only contain letters, numbers, '.', '_' and '-'".to_string(),
        ));
    }
    Ok(())
}

use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::db::AuditStamp;
use crate::domain::Actor;
use crate::entities::site_settings;

pub struct SettingsRepository {
    conn: DatabaseConnection,
}

impl SettingsRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list(&self) -> Result<Vec<site_settings::Model>> {
        site_settings::Entity::find()
            .order_by_asc(site_settings::Column::Key)
            .all(&self.conn)
            .await
            .context("Failed to list site settings")
    }

    pub async fn get(&self, key: &str) -> Result<Option<site_settings::Model>> {
        site_settings::Entity::find()
            .filter(site_settings::Column::Key.eq(key))
            .one(&self.conn)
            .await
            .context("Failed to query site setting")
    }

    /// Inserts or overwrites the value for `key`. An absent description keeps
    /// the stored one.
    pub async fn upsert(
        &self,
        key: &str,
        value: Option<String>,
        description: Option<String>,
        actor: &Actor,
    ) -> Result<site_settings::Model> {
        let stamp = AuditStamp::now(actor);

        if let Some(existing) = self.get(key).await? {
            let mut active: site_settings::ActiveModel = existing.into();
            active.value = Set(value);
            if description.is_some() {
                active.description = Set(description);
            }
            active.updated_at = Set(stamp.at);
            active.updated_by = Set(stamp.actor);

            return active
                .update(&self.conn)
                .await
                .context("Failed to update site setting");
        }

        site_settings::ActiveModel {
            key: Set(key.to_string()),
            value: Set(value),
            description: Set(description),
            updated_at: Set(stamp.at),
            updated_by: Set(stamp.actor),
            ..Default::default()
        }
        .insert(&self.conn)
        .await
        .context("Failed to insert site setting")
    }
}

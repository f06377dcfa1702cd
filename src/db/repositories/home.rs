use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};

use crate::db::{AuditStamp, Audited};
use crate::domain::Actor;
use crate::entities::home_content;

/// Editable columns of a home content row. Sidebar links arrive already
/// encoded; the store never looks inside them.
#[derive(Debug, Clone, Default)]
pub struct HomeFields {
    pub site_title: String,
    pub tagline: String,
    pub about_content: String,
    pub about_section_title: String,
    pub hero_image_path: Option<String>,
    pub profile_image_path: Option<String>,
    pub profile_image_caption: String,
    pub sidebar_links: String,
    pub huron_title: String,
    pub huron_image_path: Option<String>,
    pub sanilac_title: String,
    pub sanilac_image_path: Option<String>,
    pub tuscola_title: String,
    pub tuscola_image_path: Option<String>,
}

impl HomeFields {
    fn apply(self, active: &mut home_content::ActiveModel) {
        active.site_title = Set(self.site_title);
        active.tagline = Set(self.tagline);
        active.about_content = Set(self.about_content);
        active.about_section_title = Set(self.about_section_title);
        active.hero_image_path = Set(self.hero_image_path);
        active.profile_image_path = Set(self.profile_image_path);
        active.profile_image_caption = Set(self.profile_image_caption);
        active.sidebar_links = Set(self.sidebar_links);
        active.huron_title = Set(self.huron_title);
        active.huron_image_path = Set(self.huron_image_path);
        active.sanilac_title = Set(self.sanilac_title);
        active.sanilac_image_path = Set(self.sanilac_image_path);
        active.tuscola_title = Set(self.tuscola_title);
        active.tuscola_image_path = Set(self.tuscola_image_path);
    }
}

pub struct HomeRepository {
    conn: DatabaseConnection,
}

impl HomeRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// The active row with the latest `updated_at`. Ties go to the higher id.
    pub async fn latest_active(&self) -> Result<Option<home_content::Model>> {
        home_content::Entity::find()
            .filter(home_content::Column::IsActive.eq(true))
            .order_by_desc(home_content::Column::UpdatedAt)
            .order_by_desc(home_content::Column::Id)
            .one(&self.conn)
            .await
            .context("Failed to query current home content")
    }

    pub async fn get_by_id(&self, id: i32) -> Result<Option<home_content::Model>> {
        home_content::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query home content by ID")
    }

    /// Every stored version, newest first.
    pub async fn list_versions(&self) -> Result<Vec<home_content::Model>> {
        home_content::Entity::find()
            .order_by_desc(home_content::Column::UpdatedAt)
            .order_by_desc(home_content::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list home content versions")
    }

    pub async fn count(&self) -> Result<u64> {
        home_content::Entity::find()
            .count(&self.conn)
            .await
            .context("Failed to count home content rows")
    }

    pub async fn insert(&self, fields: HomeFields, actor: &Actor) -> Result<home_content::Model> {
        let mut active = home_content::ActiveModel {
            is_active: Set(true),
            ..Default::default()
        };
        fields.apply(&mut active);
        active.stamp_created(&AuditStamp::now(actor));

        active
            .insert(&self.conn)
            .await
            .context("Failed to insert home content")
    }

    /// Overwrites the editable columns of an existing row. `None` when the id
    /// does not exist; nothing is created in that case.
    pub async fn update(
        &self,
        id: i32,
        fields: HomeFields,
        actor: &Actor,
    ) -> Result<Option<home_content::Model>> {
        let Some(existing) = self.get_by_id(id).await? else {
            return Ok(None);
        };

        let mut active: home_content::ActiveModel = existing.into();
        fields.apply(&mut active);
        active.stamp_modified(&AuditStamp::now(actor));

        let updated = active
            .update(&self.conn)
            .await
            .context("Failed to update home content")?;

        Ok(Some(updated))
    }

    /// Marks a row active and re-stamps it so it becomes the current version.
    pub async fn activate(&self, id: i32, actor: &Actor) -> Result<Option<home_content::Model>> {
        let Some(existing) = self.get_by_id(id).await? else {
            return Ok(None);
        };

        let mut active: home_content::ActiveModel = existing.into();
        active.is_active = Set(true);
        active.stamp_modified(&AuditStamp::now(actor));

        let updated = active
            .update(&self.conn)
            .await
            .context("Failed to activate home content")?;

        Ok(Some(updated))
    }
}

use std::collections::HashMap;

use anyhow::{Context, Result};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};

use crate::db::{AuditStamp, Audited};
use crate::domain::Actor;
use crate::entities::{resource_tags, tags};

#[derive(Debug, Clone)]
pub struct TagFields {
    pub name: String,
    pub description: Option<String>,
    pub color: Option<String>,
    pub is_active: bool,
}

impl TagFields {
    fn apply(self, active: &mut tags::ActiveModel) {
        active.name = Set(self.name);
        active.description = Set(self.description);
        active.color = Set(self.color);
        active.is_active = Set(self.is_active);
    }
}

#[derive(Debug, Clone)]
pub struct TagRow {
    pub tag: tags::Model,
    pub resource_count: u64,
}

pub struct TagRepository {
    conn: DatabaseConnection,
}

impl TagRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list(&self, active_only: bool) -> Result<Vec<TagRow>> {
        let mut query = tags::Entity::find();
        if active_only {
            query = query.filter(tags::Column::IsActive.eq(true));
        }

        let rows = query
            .order_by_asc(tags::Column::Name)
            .all(&self.conn)
            .await
            .context("Failed to list tags")?;

        let counts = self.link_counts().await?;

        Ok(rows
            .into_iter()
            .map(|tag| TagRow {
                resource_count: counts.get(&tag.id).copied().unwrap_or(0),
                tag,
            })
            .collect())
    }

    pub async fn get(&self, id: i32) -> Result<Option<TagRow>> {
        let Some(tag) = tags::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query tag by ID")?
        else {
            return Ok(None);
        };

        let resource_count = resource_tags::Entity::find()
            .filter(resource_tags::Column::TagId.eq(id))
            .count(&self.conn)
            .await
            .context("Failed to count tag links")?;

        Ok(Some(TagRow {
            tag,
            resource_count,
        }))
    }

    pub async fn name_taken(&self, name: &str, excluding: Option<i32>) -> Result<bool> {
        let mut query = tags::Entity::find().filter(tags::Column::Name.eq(name));
        if let Some(id) = excluding {
            query = query.filter(tags::Column::Id.ne(id));
        }

        let count = query
            .count(&self.conn)
            .await
            .context("Failed to check tag name")?;
        Ok(count > 0)
    }

    pub async fn create(&self, fields: TagFields, actor: &Actor) -> Result<tags::Model> {
        let mut active = tags::ActiveModel {
            ..Default::default()
        };
        fields.apply(&mut active);
        active.stamp_created(&AuditStamp::now(actor));

        active
            .insert(&self.conn)
            .await
            .context("Failed to insert tag")
    }

    pub async fn update(
        &self,
        id: i32,
        fields: TagFields,
        actor: &Actor,
    ) -> Result<Option<tags::Model>> {
        let Some(existing) = tags::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query tag for update")?
        else {
            return Ok(None);
        };

        let mut active: tags::ActiveModel = existing.into();
        fields.apply(&mut active);
        active.stamp_modified(&AuditStamp::now(actor));

        let updated = active
            .update(&self.conn)
            .await
            .context("Failed to update tag")?;
        Ok(Some(updated))
    }

    /// Removes the tag and every link to it.
    pub async fn delete(&self, id: i32) -> Result<bool> {
        let txn = self.conn.begin().await?;

        resource_tags::Entity::delete_many()
            .filter(resource_tags::Column::TagId.eq(id))
            .exec(&txn)
            .await
            .context("Failed to delete tag links")?;

        let result = tags::Entity::delete_by_id(id)
            .exec(&txn)
            .await
            .context("Failed to delete tag")?;

        txn.commit().await?;
        Ok(result.rows_affected > 0)
    }

    async fn link_counts(&self) -> Result<HashMap<i32, u64>> {
        let counts: Vec<(i32, i64)> = resource_tags::Entity::find()
            .select_only()
            .column(resource_tags::Column::TagId)
            .column_as(Expr::col(resource_tags::Column::ResourceId).count(), "link_count")
            .group_by(resource_tags::Column::TagId)
            .into_tuple()
            .all(&self.conn)
            .await
            .context("Failed to count tag links")?;

        Ok(counts
            .into_iter()
            .map(|(tag_id, count)| (tag_id, u64::try_from(count).unwrap_or(0)))
            .collect())
    }
}

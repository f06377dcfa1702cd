use std::collections::HashMap;

use anyhow::{Context, Result};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};

use crate::db::{AuditStamp, Audited};
use crate::domain::Actor;
use crate::entities::{counties, resources};

#[derive(Debug, Clone)]
pub struct CountyFields {
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub display_order: i32,
    pub is_active: bool,
}

impl CountyFields {
    fn apply(self, active: &mut counties::ActiveModel) {
        active.name = Set(self.name);
        active.description = Set(self.description);
        active.image_url = Set(self.image_url);
        active.display_order = Set(self.display_order);
        active.is_active = Set(self.is_active);
    }
}

/// A county together with the number of its active resources.
#[derive(Debug, Clone)]
pub struct CountyRow {
    pub county: counties::Model,
    pub resource_count: u64,
}

pub struct CountyRepository {
    conn: DatabaseConnection,
}

impl CountyRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Ordered by display order, then name.
    pub async fn list(&self, active_only: bool) -> Result<Vec<CountyRow>> {
        let mut query = counties::Entity::find();
        if active_only {
            query = query.filter(counties::Column::IsActive.eq(true));
        }

        let rows = query
            .order_by_asc(counties::Column::DisplayOrder)
            .order_by_asc(counties::Column::Name)
            .all(&self.conn)
            .await
            .context("Failed to list counties")?;

        let counts = self.active_resource_counts().await?;

        Ok(rows
            .into_iter()
            .map(|county| CountyRow {
                resource_count: counts.get(&county.id).copied().unwrap_or(0),
                county,
            })
            .collect())
    }

    pub async fn get(&self, id: i32) -> Result<Option<CountyRow>> {
        let Some(county) = counties::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query county by ID")?
        else {
            return Ok(None);
        };

        let resource_count = resources::Entity::find()
            .filter(resources::Column::CountyId.eq(id))
            .filter(resources::Column::IsActive.eq(true))
            .count(&self.conn)
            .await
            .context("Failed to count county resources")?;

        Ok(Some(CountyRow {
            county,
            resource_count,
        }))
    }

    pub async fn exists(&self, id: i32) -> Result<bool> {
        let count = counties::Entity::find_by_id(id)
            .count(&self.conn)
            .await
            .context("Failed to check county existence")?;
        Ok(count > 0)
    }

    /// Exact, case-sensitive name match, optionally ignoring one row.
    pub async fn name_taken(&self, name: &str, excluding: Option<i32>) -> Result<bool> {
        let mut query = counties::Entity::find().filter(counties::Column::Name.eq(name));
        if let Some(id) = excluding {
            query = query.filter(counties::Column::Id.ne(id));
        }

        let count = query
            .count(&self.conn)
            .await
            .context("Failed to check county name")?;
        Ok(count > 0)
    }

    pub async fn create(&self, fields: CountyFields, actor: &Actor) -> Result<counties::Model> {
        let mut active = counties::ActiveModel {
            ..Default::default()
        };
        fields.apply(&mut active);
        active.stamp_created(&AuditStamp::now(actor));

        active
            .insert(&self.conn)
            .await
            .context("Failed to insert county")
    }

    pub async fn update(
        &self,
        id: i32,
        fields: CountyFields,
        actor: &Actor,
    ) -> Result<Option<counties::Model>> {
        let Some(existing) = counties::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query county for update")?
        else {
            return Ok(None);
        };

        let mut active: counties::ActiveModel = existing.into();
        fields.apply(&mut active);
        active.stamp_modified(&AuditStamp::now(actor));

        let updated = active
            .update(&self.conn)
            .await
            .context("Failed to update county")?;
        Ok(Some(updated))
    }

    /// Returns `false` when no row had that id.
    pub async fn delete(&self, id: i32) -> Result<bool> {
        let result = counties::Entity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete county")?;
        Ok(result.rows_affected > 0)
    }

    /// Applies `(id, position)` pairs in one transaction. Unknown ids match
    /// no row and are skipped.
    pub async fn reorder(&self, positions: &[(i32, i32)], actor: &Actor) -> Result<()> {
        let stamp = AuditStamp::now(actor);
        let txn = self.conn.begin().await?;

        for &(id, position) in positions {
            counties::Entity::update_many()
                .col_expr(counties::Column::DisplayOrder, Expr::value(position))
                .col_expr(counties::Column::UpdatedAt, Expr::value(stamp.at.clone()))
                .col_expr(counties::Column::UpdatedBy, Expr::value(stamp.actor.clone()))
                .filter(counties::Column::Id.eq(id))
                .exec(&txn)
                .await
                .with_context(|| format!("Failed to reorder county {id}"))?;
        }

        txn.commit().await?;
        Ok(())
    }

    pub async fn count(&self) -> Result<u64> {
        counties::Entity::find()
            .count(&self.conn)
            .await
            .context("Failed to count counties")
    }

    async fn active_resource_counts(&self) -> Result<HashMap<i32, u64>> {
        let counts: Vec<(i32, i64)> = resources::Entity::find()
            .select_only()
            .column(resources::Column::CountyId)
            .column_as(Expr::col(resources::Column::Id).count(), "resource_count")
            .filter(resources::Column::IsActive.eq(true))
            .group_by(resources::Column::CountyId)
            .into_tuple()
            .all(&self.conn)
            .await
            .context("Failed to count active resources per county")?;

        Ok(counts
            .into_iter()
            .map(|(county_id, count)| (county_id, u64::try_from(count).unwrap_or(0)))
            .collect())
    }
}

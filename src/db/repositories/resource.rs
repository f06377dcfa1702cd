use anyhow::{Context, Result};
use sea_orm::sea_query::{Expr, Func, LikeExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DatabaseTransaction,
    EntityTrait, JoinType, LoaderTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    RelationTrait, Set, TransactionTrait,
};

use crate::db::{AuditStamp, Audited, timestamp_now};
use crate::domain::{Actor, ResourceType};
use crate::entities::{counties, prelude::*, resource_tags, resources, tags};

#[derive(Debug, Clone)]
pub struct ResourceFields {
    pub county_id: i32,
    pub resource_type: ResourceType,
    pub title: String,
    pub description: Option<String>,
    pub url: Option<String>,
    pub content: Option<String>,
    pub thumbnail_url: Option<String>,
    pub video_id: Option<String>,
    pub file_size: Option<String>,
    pub file_type: Option<String>,
    pub display_order: i32,
    pub is_active: bool,
}

impl ResourceFields {
    fn apply(self, active: &mut resources::ActiveModel) {
        active.county_id = Set(self.county_id);
        active.resource_type = Set(self.resource_type);
        active.title = Set(self.title);
        active.description = Set(self.description);
        active.url = Set(self.url);
        active.content = Set(self.content);
        active.thumbnail_url = Set(self.thumbnail_url);
        active.video_id = Set(self.video_id);
        active.file_size = Set(self.file_size);
        active.file_type = Set(self.file_type);
        active.display_order = Set(self.display_order);
        active.is_active = Set(self.is_active);
    }
}

/// A resource with its county name and active tags resolved.
#[derive(Debug, Clone)]
pub struct ResourceRow {
    pub resource: resources::Model,
    pub county_name: String,
    pub tags: Vec<tags::Model>,
}

#[derive(Debug, Clone, Default)]
pub struct ResourceSearch {
    pub query: Option<String>,
    pub county_id: Option<i32>,
    pub resource_type: Option<ResourceType>,
    /// 1-based.
    pub page: u64,
    pub page_size: u64,
}

pub struct ResourceRepository {
    conn: DatabaseConnection,
}

impl ResourceRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list_by_county(
        &self,
        county_id: i32,
        resource_type: Option<ResourceType>,
        active_only: bool,
    ) -> Result<Vec<ResourceRow>> {
        let mut query = Resources::find().filter(resources::Column::CountyId.eq(county_id));
        if let Some(resource_type) = resource_type {
            query = query.filter(resources::Column::ResourceType.eq(resource_type));
        }
        if active_only {
            query = query.filter(resources::Column::IsActive.eq(true));
        }

        let models = query
            .order_by_asc(resources::Column::DisplayOrder)
            .order_by_asc(resources::Column::Title)
            .all(&self.conn)
            .await
            .context("Failed to list county resources")?;

        self.hydrate(models).await
    }

    pub async fn get(&self, id: i32) -> Result<Option<ResourceRow>> {
        let Some(model) = Resources::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query resource by ID")?
        else {
            return Ok(None);
        };

        Ok(self.hydrate(vec![model]).await?.into_iter().next())
    }

    /// Case-insensitive match over title, description and content of active
    /// resources. Returns the requested page and the total match count.
    pub async fn search(&self, search: &ResourceSearch) -> Result<(Vec<ResourceRow>, u64)> {
        let mut query = Resources::find()
            .join(JoinType::InnerJoin, resources::Relation::Counties.def())
            .filter(resources::Column::IsActive.eq(true));

        if let Some(term) = search
            .query
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
        {
            let pattern = format!("%{}%", escape_like(&term.to_lowercase()));
            let lowered = |col: resources::Column| {
                Expr::expr(Func::lower(Expr::col((Resources, col))))
                    .like(LikeExpr::new(pattern.clone()).escape(LIKE_ESCAPE))
            };
            query = query.filter(
                Condition::any()
                    .add(lowered(resources::Column::Title))
                    .add(lowered(resources::Column::Description))
                    .add(lowered(resources::Column::Content)),
            );
        }

        if let Some(county_id) = search.county_id {
            query = query.filter(resources::Column::CountyId.eq(county_id));
        }
        if let Some(resource_type) = search.resource_type {
            query = query.filter(resources::Column::ResourceType.eq(resource_type));
        }

        let paginator = query
            .order_by_asc(counties::Column::DisplayOrder)
            .order_by_asc(resources::Column::DisplayOrder)
            .order_by_asc(resources::Column::Id)
            .paginate(&self.conn, search.page_size.max(1));

        let total = paginator
            .num_items()
            .await
            .context("Failed to count resource search results")?;
        let models = paginator
            .fetch_page(search.page.saturating_sub(1))
            .await
            .context("Failed to fetch resource search page")?;

        Ok((self.hydrate(models).await?, total))
    }

    /// Inserts the resource and links it to the active subset of `tag_ids`.
    pub async fn create(
        &self,
        fields: ResourceFields,
        tag_ids: &[i32],
        actor: &Actor,
    ) -> Result<resources::Model> {
        let txn = self.conn.begin().await?;

        let mut active = resources::ActiveModel {
            ..Default::default()
        };
        fields.apply(&mut active);
        active.stamp_created(&AuditStamp::now(actor));

        let model = active
            .insert(&txn)
            .await
            .context("Failed to insert resource")?;

        link_tags(&txn, model.id, tag_ids).await?;

        txn.commit().await?;
        Ok(model)
    }

    /// Overwrites the resource. Tag links are replaced only when `tag_ids`
    /// is provided.
    pub async fn update(
        &self,
        id: i32,
        fields: ResourceFields,
        tag_ids: Option<&[i32]>,
        actor: &Actor,
    ) -> Result<Option<resources::Model>> {
        let txn = self.conn.begin().await?;

        let Some(existing) = Resources::find_by_id(id)
            .one(&txn)
            .await
            .context("Failed to query resource for update")?
        else {
            return Ok(None);
        };

        let mut active: resources::ActiveModel = existing.into();
        fields.apply(&mut active);
        active.stamp_modified(&AuditStamp::now(actor));

        let model = active
            .update(&txn)
            .await
            .context("Failed to update resource")?;

        if let Some(tag_ids) = tag_ids {
            ResourceTags::delete_many()
                .filter(resource_tags::Column::ResourceId.eq(id))
                .exec(&txn)
                .await
                .context("Failed to clear resource tags")?;
            link_tags(&txn, id, tag_ids).await?;
        }

        txn.commit().await?;
        Ok(Some(model))
    }

    /// Removes the resource and its tag links. Returns `false` when no row
    /// had that id.
    pub async fn delete(&self, id: i32) -> Result<bool> {
        let txn = self.conn.begin().await?;

        ResourceTags::delete_many()
            .filter(resource_tags::Column::ResourceId.eq(id))
            .exec(&txn)
            .await
            .context("Failed to delete resource tags")?;

        let result = Resources::delete_by_id(id)
            .exec(&txn)
            .await
            .context("Failed to delete resource")?;

        txn.commit().await?;
        Ok(result.rows_affected > 0)
    }

    pub async fn reorder(&self, positions: &[(i32, i32)], actor: &Actor) -> Result<()> {
        let stamp = AuditStamp::now(actor);
        let txn = self.conn.begin().await?;

        for &(id, position) in positions {
            Resources::update_many()
                .col_expr(resources::Column::DisplayOrder, Expr::value(position))
                .col_expr(resources::Column::UpdatedAt, Expr::value(stamp.at.clone()))
                .col_expr(resources::Column::UpdatedBy, Expr::value(stamp.actor.clone()))
                .filter(resources::Column::Id.eq(id))
                .exec(&txn)
                .await
                .with_context(|| format!("Failed to reorder resource {id}"))?;
        }

        txn.commit().await?;
        Ok(())
    }

    /// Counts every resource of a county, active or not.
    pub async fn count_for_county(&self, county_id: i32) -> Result<u64> {
        Resources::find()
            .filter(resources::Column::CountyId.eq(county_id))
            .count(&self.conn)
            .await
            .context("Failed to count county resources")
    }

    async fn hydrate(&self, models: Vec<resources::Model>) -> Result<Vec<ResourceRow>> {
        let counties = models
            .load_one(Counties, &self.conn)
            .await
            .context("Failed to load resource counties")?;
        let tags = models
            .load_many_to_many(Tags, ResourceTags, &self.conn)
            .await
            .context("Failed to load resource tags")?;

        Ok(models
            .into_iter()
            .zip(counties)
            .zip(tags)
            .map(|((resource, county), mut tags)| {
                tags.retain(|t| t.is_active);
                tags.sort_by(|a, b| a.name.cmp(&b.name));
                ResourceRow {
                    resource,
                    county_name: county.map(|c| c.name).unwrap_or_default(),
                    tags,
                }
            })
            .collect())
    }
}

const LIKE_ESCAPE: char = '\\';

/// Makes `%`, `_` and the escape character match literally inside a LIKE
/// pattern.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | LIKE_ESCAPE) {
            escaped.push(LIKE_ESCAPE);
        }
        escaped.push(c);
    }
    escaped
}

/// Links a resource to each id in `tag_ids` that names an active tag.
/// Anything else is dropped silently.
async fn link_tags(txn: &DatabaseTransaction, resource_id: i32, tag_ids: &[i32]) -> Result<()> {
    if tag_ids.is_empty() {
        return Ok(());
    }

    let valid: Vec<i32> = Tags::find()
        .select_only()
        .column(tags::Column::Id)
        .filter(tags::Column::Id.is_in(tag_ids.iter().copied()))
        .filter(tags::Column::IsActive.eq(true))
        .into_tuple()
        .all(txn)
        .await
        .context("Failed to resolve resource tags")?;

    if valid.is_empty() {
        return Ok(());
    }

    let created_at = timestamp_now();
    let links = valid.into_iter().map(|tag_id| resource_tags::ActiveModel {
        resource_id: Set(resource_id),
        tag_id: Set(tag_id),
        created_at: Set(created_at.clone()),
    });

    ResourceTags::insert_many(links)
        .exec_without_returning(txn)
        .await
        .context("Failed to link resource tags")?;

    Ok(())
}

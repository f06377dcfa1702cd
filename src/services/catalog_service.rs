//! Domain service for counties, their resources and tags.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::db::repositories::county::{CountyFields, CountyRow};
use crate::db::repositories::resource::{ResourceFields, ResourceRow};
use crate::db::repositories::tag::{TagFields, TagRow};
use crate::domain::{Actor, ResourceType};
use crate::entities::tags;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Duplicate(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<anyhow::Error> for CatalogError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(format!("{err:#}"))
    }
}

const fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CountyView {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub display_order: i32,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
    pub resource_count: u64,
}

impl From<CountyRow> for CountyView {
    fn from(row: CountyRow) -> Self {
        let county = row.county;
        Self {
            id: county.id,
            name: county.name,
            description: county.description,
            image_url: county.image_url,
            display_order: county.display_order,
            is_active: county.is_active,
            created_at: county.created_at,
            updated_at: county.updated_at,
            resource_count: row.resource_count,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountyInput {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub display_order: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl From<CountyInput> for CountyFields {
    fn from(input: CountyInput) -> Self {
        Self {
            name: input.name.trim().to_string(),
            description: input.description,
            image_url: input.image_url,
            display_order: input.display_order,
            is_active: input.is_active,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TagView {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub color: Option<String>,
    pub is_active: bool,
    pub created_at: String,
    pub resource_count: u64,
}

impl From<TagRow> for TagView {
    fn from(row: TagRow) -> Self {
        let tag = row.tag;
        Self {
            id: tag.id,
            name: tag.name,
            description: tag.description,
            color: tag.color,
            is_active: tag.is_active,
            created_at: tag.created_at,
            resource_count: row.resource_count,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagInput {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl From<TagInput> for TagFields {
    fn from(input: TagInput) -> Self {
        Self {
            name: input.name.trim().to_string(),
            description: input.description,
            color: input.color,
            is_active: input.is_active,
        }
    }
}

/// Tag as embedded in a resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TagRef {
    pub id: i32,
    pub name: String,
    pub color: Option<String>,
}

impl From<tags::Model> for TagRef {
    fn from(tag: tags::Model) -> Self {
        Self {
            id: tag.id,
            name: tag.name,
            color: tag.color,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceView {
    pub id: i32,
    pub county_id: i32,
    pub county_name: String,
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
    pub title: String,
    pub description: Option<String>,
    pub url: Option<String>,
    pub content: Option<String>,
    pub display_order: i32,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
    pub thumbnail_url: Option<String>,
    pub video_id: Option<String>,
    pub file_size: Option<String>,
    pub file_type: Option<String>,
    pub tags: Vec<TagRef>,
}

impl From<ResourceRow> for ResourceView {
    fn from(row: ResourceRow) -> Self {
        let r = row.resource;
        Self {
            id: r.id,
            county_id: r.county_id,
            county_name: row.county_name,
            resource_type: r.resource_type,
            title: r.title,
            description: r.description,
            url: r.url,
            content: r.content,
            display_order: r.display_order,
            is_active: r.is_active,
            created_at: r.created_at,
            updated_at: r.updated_at,
            thumbnail_url: r.thumbnail_url,
            video_id: r.video_id,
            file_size: r.file_size,
            file_type: r.file_type,
            tags: row.tags.into_iter().map(TagRef::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceInput {
    pub county_id: i32,
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub display_order: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub video_id: Option<String>,
    #[serde(default)]
    pub file_size: Option<String>,
    #[serde(default)]
    pub file_type: Option<String>,
    /// Absent on update means "leave tags alone".
    #[serde(default)]
    pub tag_ids: Option<Vec<i32>>,
}

impl ResourceInput {
    /// Splits the payload into stored columns and requested tag ids.
    #[must_use]
    pub fn into_parts(self) -> (ResourceFields, Option<Vec<i32>>) {
        let fields = ResourceFields {
            county_id: self.county_id,
            resource_type: self.resource_type,
            title: self.title.trim().to_string(),
            description: self.description,
            url: self.url,
            content: self.content,
            thumbnail_url: self.thumbnail_url,
            video_id: self.video_id,
            file_size: self.file_size,
            file_type: self.file_type,
            display_order: self.display_order,
            is_active: self.is_active,
        };
        (fields, self.tag_ids)
    }
}

/// Search over active resources. `page` is 1-based.
#[derive(Debug, Clone)]
pub struct ResourceQuery {
    pub query: Option<String>,
    pub county_id: Option<i32>,
    pub resource_type: Option<ResourceType>,
    pub page: u64,
    pub page_size: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage {
    pub resources: Vec<ResourceView>,
    pub total_count: u64,
    pub page: u64,
    pub page_size: u64,
    pub total_pages: u64,
}

/// Domain service trait for the county catalog.
#[async_trait::async_trait]
pub trait CatalogService: Send + Sync {
    /// Ordered by display order, then name.
    async fn list_counties(&self, active_only: bool) -> Result<Vec<CountyView>, CatalogError>;

    async fn get_county(&self, id: i32) -> Result<CountyView, CatalogError>;

    /// # Errors
    ///
    /// Returns [`CatalogError::Duplicate`] without writing when the name is
    /// already taken (exact, case-sensitive match).
    async fn create_county(
        &self,
        input: CountyInput,
        actor: &Actor,
    ) -> Result<CountyView, CatalogError>;

    async fn update_county(
        &self,
        id: i32,
        input: CountyInput,
        actor: &Actor,
    ) -> Result<CountyView, CatalogError>;

    /// # Errors
    ///
    /// Returns [`CatalogError::Conflict`] while any resource references the
    /// county.
    async fn delete_county(&self, id: i32) -> Result<(), CatalogError>;

    /// Assigns positions 1..n in the given order. Unknown ids are ignored.
    async fn reorder_counties(&self, ids: &[i32], actor: &Actor) -> Result<(), CatalogError>;

    async fn list_county_resources(
        &self,
        county_id: i32,
        resource_type: Option<ResourceType>,
        active_only: bool,
    ) -> Result<Vec<ResourceView>, CatalogError>;

    async fn get_resource(&self, id: i32) -> Result<ResourceView, CatalogError>;

    async fn search_resources(&self, query: ResourceQuery) -> Result<SearchPage, CatalogError>;

    async fn create_resource(
        &self,
        input: ResourceInput,
        actor: &Actor,
    ) -> Result<ResourceView, CatalogError>;

    async fn update_resource(
        &self,
        id: i32,
        input: ResourceInput,
        actor: &Actor,
    ) -> Result<ResourceView, CatalogError>;

    async fn delete_resource(&self, id: i32) -> Result<(), CatalogError>;

    async fn reorder_resources(&self, ids: &[i32], actor: &Actor) -> Result<(), CatalogError>;

    async fn list_tags(&self, active_only: bool) -> Result<Vec<TagView>, CatalogError>;

    async fn get_tag(&self, id: i32) -> Result<TagView, CatalogError>;

    async fn create_tag(&self, input: TagInput, actor: &Actor) -> Result<TagView, CatalogError>;

    async fn update_tag(
        &self,
        id: i32,
        input: TagInput,
        actor: &Actor,
    ) -> Result<TagView, CatalogError>;

    async fn delete_tag(&self, id: i32) -> Result<(), CatalogError>;
}

/// Total pages for `total` items, never zero-sized pages.
#[must_use]
pub const fn total_pages(total: u64, page_size: u64) -> u64 {
    if page_size == 0 {
        return 0;
    }
    total.div_ceil(page_size)
}

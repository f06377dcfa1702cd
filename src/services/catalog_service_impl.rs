//! `SeaORM` implementation of the `CatalogService` trait.

use async_trait::async_trait;
use sea_orm::{DbErr, SqlErr};
use tracing::info;

use crate::db::Store;
use crate::db::repositories::resource::ResourceSearch;
use crate::domain::{Actor, ResourceType, display_positions};
use crate::services::catalog_service::{
    CatalogError, CatalogService, CountyInput, CountyView, ResourceInput, ResourceQuery,
    ResourceView, SearchPage, TagInput, TagView, total_pages,
};

const MAX_COUNTY_NAME_LEN: usize = 200;
const MAX_RESOURCE_TITLE_LEN: usize = 300;
const MAX_TAG_NAME_LEN: usize = 100;
const MAX_URL_LEN: usize = 1000;
const MAX_DESCRIPTION_LEN: usize = 2000;

fn require_name(field: &str, value: &str, max: usize) -> Result<(), CatalogError> {
    if value.trim().is_empty() {
        return Err(CatalogError::Validation(format!("{field} is required")));
    }
    check_len(field, Some(value), max)
}

fn check_len(field: &str, value: Option<&str>, max: usize) -> Result<(), CatalogError> {
    match value {
        Some(v) if v.chars().count() > max => Err(CatalogError::Validation(format!(
            "{field} must be at most {max} characters"
        ))),
        _ => Ok(()),
    }
}

fn validate_county(input: &CountyInput) -> Result<(), CatalogError> {
    require_name("Name", &input.name, MAX_COUNTY_NAME_LEN)?;
    check_len("Description", input.description.as_deref(), MAX_DESCRIPTION_LEN)?;
    check_len("Image URL", input.image_url.as_deref(), MAX_URL_LEN)
}

fn validate_resource(input: &ResourceInput) -> Result<(), CatalogError> {
    require_name("Title", &input.title, MAX_RESOURCE_TITLE_LEN)?;
    check_len("Description", input.description.as_deref(), MAX_DESCRIPTION_LEN)?;
    check_len("URL", input.url.as_deref(), MAX_URL_LEN)?;
    check_len("Thumbnail URL", input.thumbnail_url.as_deref(), MAX_URL_LEN)
}

fn validate_tag(input: &TagInput) -> Result<(), CatalogError> {
    require_name("Name", &input.name, MAX_TAG_NAME_LEN)?;
    check_len("Description", input.description.as_deref(), MAX_DESCRIPTION_LEN)
}

/// True when a repository error came from a unique index rejecting the write.
fn is_unique_violation(err: &anyhow::Error) -> bool {
    err.downcast_ref::<DbErr>()
        .and_then(DbErr::sql_err)
        .is_some_and(|e| matches!(e, SqlErr::UniqueConstraintViolation(_)))
}

/// Maps a lost race on a unique name to the same error the pre-check gives.
fn duplicate_or_database(err: anyhow::Error, message: &str) -> CatalogError {
    if is_unique_violation(&err) {
        CatalogError::Duplicate(message.to_string())
    } else {
        CatalogError::from(err)
    }
}

const DUPLICATE_COUNTY: &str = "A county with this name already exists";
const DUPLICATE_TAG: &str = "A tag with this name already exists";

pub struct SeaOrmCatalogService {
    store: Store,
}

impl SeaOrmCatalogService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    async fn ensure_county(&self, county_id: i32) -> Result<(), CatalogError> {
        if self.store.counties().exists(county_id).await? {
            Ok(())
        } else {
            Err(CatalogError::Validation("County not found".to_string()))
        }
    }
}

#[async_trait]
impl CatalogService for SeaOrmCatalogService {
    async fn list_counties(&self, active_only: bool) -> Result<Vec<CountyView>, CatalogError> {
        let rows = self.store.counties().list(active_only).await?;
        Ok(rows.into_iter().map(CountyView::from).collect())
    }

    async fn get_county(&self, id: i32) -> Result<CountyView, CatalogError> {
        self.store
            .counties()
            .get(id)
            .await?
            .map(CountyView::from)
            .ok_or(CatalogError::NotFound("County"))
    }

    async fn create_county(
        &self,
        input: CountyInput,
        actor: &Actor,
    ) -> Result<CountyView, CatalogError> {
        validate_county(&input)?;

        let counties = self.store.counties();
        if counties.name_taken(input.name.trim(), None).await? {
            return Err(CatalogError::Duplicate(DUPLICATE_COUNTY.to_string()));
        }

        let county = counties
            .create(input.into(), actor)
            .await
            .map_err(|e| duplicate_or_database(e, DUPLICATE_COUNTY))?;
        info!(id = county.id, name = %county.name, actor = %actor, "County created");
        self.get_county(county.id).await
    }

    async fn update_county(
        &self,
        id: i32,
        input: CountyInput,
        actor: &Actor,
    ) -> Result<CountyView, CatalogError> {
        validate_county(&input)?;

        let counties = self.store.counties();
        if !counties.exists(id).await? {
            return Err(CatalogError::NotFound("County"));
        }
        if counties.name_taken(input.name.trim(), Some(id)).await? {
            return Err(CatalogError::Duplicate(DUPLICATE_COUNTY.to_string()));
        }

        counties
            .update(id, input.into(), actor)
            .await
            .map_err(|e| duplicate_or_database(e, DUPLICATE_COUNTY))?
            .ok_or(CatalogError::NotFound("County"))?;

        self.get_county(id).await
    }

    async fn delete_county(&self, id: i32) -> Result<(), CatalogError> {
        if self.store.counties().get(id).await?.is_none() {
            return Err(CatalogError::NotFound("County"));
        }

        if self.store.resources().count_for_county(id).await? > 0 {
            return Err(CatalogError::Conflict(
                "Cannot delete county with existing resources. Please remove all resources first."
                    .to_string(),
            ));
        }

        self.store.counties().delete(id).await?;
        info!(id, "County deleted");
        Ok(())
    }

    async fn reorder_counties(&self, ids: &[i32], actor: &Actor) -> Result<(), CatalogError> {
        let positions = display_positions(ids);
        self.store.counties().reorder(&positions, actor).await?;
        Ok(())
    }

    async fn list_county_resources(
        &self,
        county_id: i32,
        resource_type: Option<ResourceType>,
        active_only: bool,
    ) -> Result<Vec<ResourceView>, CatalogError> {
        let rows = self
            .store
            .resources()
            .list_by_county(county_id, resource_type, active_only)
            .await?;
        Ok(rows.into_iter().map(ResourceView::from).collect())
    }

    async fn get_resource(&self, id: i32) -> Result<ResourceView, CatalogError> {
        self.store
            .resources()
            .get(id)
            .await?
            .map(ResourceView::from)
            .ok_or(CatalogError::NotFound("Resource"))
    }

    async fn search_resources(&self, query: ResourceQuery) -> Result<SearchPage, CatalogError> {
        let search = ResourceSearch {
            query: query.query,
            county_id: query.county_id,
            resource_type: query.resource_type,
            page: query.page,
            page_size: query.page_size,
        };

        let (rows, total) = self.store.resources().search(&search).await?;

        Ok(SearchPage {
            resources: rows.into_iter().map(ResourceView::from).collect(),
            total_count: total,
            page: search.page,
            page_size: search.page_size,
            total_pages: total_pages(total, search.page_size),
        })
    }

    async fn create_resource(
        &self,
        input: ResourceInput,
        actor: &Actor,
    ) -> Result<ResourceView, CatalogError> {
        validate_resource(&input)?;
        self.ensure_county(input.county_id).await?;

        let (fields, tag_ids) = input.into_parts();
        let resource = self
            .store
            .resources()
            .create(fields, tag_ids.as_deref().unwrap_or_default(), actor)
            .await?;

        info!(id = resource.id, county_id = resource.county_id, actor = %actor, "Resource created");
        self.get_resource(resource.id).await
    }

    async fn update_resource(
        &self,
        id: i32,
        input: ResourceInput,
        actor: &Actor,
    ) -> Result<ResourceView, CatalogError> {
        validate_resource(&input)?;
        self.ensure_county(input.county_id).await?;

        let (fields, tag_ids) = input.into_parts();
        self.store
            .resources()
            .update(id, fields, tag_ids.as_deref(), actor)
            .await?
            .ok_or(CatalogError::NotFound("Resource"))?;

        self.get_resource(id).await
    }

    async fn delete_resource(&self, id: i32) -> Result<(), CatalogError> {
        if !self.store.resources().delete(id).await? {
            return Err(CatalogError::NotFound("Resource"));
        }
        info!(id, "Resource deleted");
        Ok(())
    }

    async fn reorder_resources(&self, ids: &[i32], actor: &Actor) -> Result<(), CatalogError> {
        let positions = display_positions(ids);
        self.store.resources().reorder(&positions, actor).await?;
        Ok(())
    }

    async fn list_tags(&self, active_only: bool) -> Result<Vec<TagView>, CatalogError> {
        let rows = self.store.tags().list(active_only).await?;
        Ok(rows.into_iter().map(TagView::from).collect())
    }

    async fn get_tag(&self, id: i32) -> Result<TagView, CatalogError> {
        self.store
            .tags()
            .get(id)
            .await?
            .map(TagView::from)
            .ok_or(CatalogError::NotFound("Tag"))
    }

    async fn create_tag(&self, input: TagInput, actor: &Actor) -> Result<TagView, CatalogError> {
        validate_tag(&input)?;

        let tags = self.store.tags();
        if tags.name_taken(input.name.trim(), None).await? {
            return Err(CatalogError::Duplicate(DUPLICATE_TAG.to_string()));
        }

        let tag = tags
            .create(input.into(), actor)
            .await
            .map_err(|e| duplicate_or_database(e, DUPLICATE_TAG))?;
        self.get_tag(tag.id).await
    }

    async fn update_tag(
        &self,
        id: i32,
        input: TagInput,
        actor: &Actor,
    ) -> Result<TagView, CatalogError> {
        validate_tag(&input)?;

        let tags = self.store.tags();
        if tags.get(id).await?.is_none() {
            return Err(CatalogError::NotFound("Tag"));
        }
        if tags.name_taken(input.name.trim(), Some(id)).await? {
            return Err(CatalogError::Duplicate(DUPLICATE_TAG.to_string()));
        }

        tags.update(id, input.into(), actor)
            .await
            .map_err(|e| duplicate_or_database(e, DUPLICATE_TAG))?
            .ok_or(CatalogError::NotFound("Tag"))?;

        self.get_tag(id).await
    }

    async fn delete_tag(&self, id: i32) -> Result<(), CatalogError> {
        if !self.store.tags().delete(id).await? {
            return Err(CatalogError::NotFound("Tag"));
        }
        info!(id, "Tag deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn service() -> (SeaOrmCatalogService, Store) {
        let store = Store::with_pool_options("sqlite::memory:", 1, 1)
            .await
            .unwrap();
        (SeaOrmCatalogService::new(store.clone()), store)
    }

    fn county(name: &str, order: i32) -> CountyInput {
        CountyInput {
            name: name.to_string(),
            description: None,
            image_url: None,
            display_order: order,
            is_active: true,
        }
    }

    fn resource(county_id: i32, title: &str, tag_ids: Option<Vec<i32>>) -> ResourceInput {
        ResourceInput {
            county_id,
            resource_type: ResourceType::Link,
            title: title.to_string(),
            description: None,
            url: Some("https://example.org/".to_string()),
            content: None,
            display_order: 0,
            is_active: true,
            thumbnail_url: None,
            video_id: None,
            file_size: None,
            file_type: None,
            tag_ids,
        }
    }

    fn tag(name: &str, is_active: bool) -> TagInput {
        TagInput {
            name: name.to_string(),
            description: None,
            color: None,
            is_active,
        }
    }

    #[tokio::test]
    async fn reorder_assigns_positions_in_caller_order() {
        let (service, _) = service().await;
        let actor = Actor::new("admin");
        let a = service.create_county(county("Huron", 1), &actor).await.unwrap();
        let b = service.create_county(county("Tuscola", 2), &actor).await.unwrap();
        let c = service.create_county(county("Sanilac", 3), &actor).await.unwrap();

        service
            .reorder_counties(&[c.id, a.id, b.id, 999], &actor)
            .await
            .unwrap();

        let listed: Vec<(i32, i32)> = service
            .list_counties(true)
            .await
            .unwrap()
            .into_iter()
            .map(|c| (c.id, c.display_order))
            .collect();
        assert_eq!(listed, vec![(c.id, 1), (a.id, 2), (b.id, 3)]);
    }

    #[tokio::test]
    async fn duplicate_county_name_is_rejected_without_write() {
        let (service, store) = service().await;
        let actor = Actor::new("admin");
        service.create_county(county("Huron", 1), &actor).await.unwrap();

        let err = service
            .create_county(county("Huron", 2), &actor)
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::Duplicate(_)));
        assert_eq!(store.counties().count().await.unwrap(), 1);

        // Different case is a different name.
        assert!(service.create_county(county("huron", 2), &actor).await.is_ok());
    }

    #[tokio::test]
    async fn rename_to_own_name_is_allowed() {
        let (service, _) = service().await;
        let actor = Actor::new("admin");
        let huron = service.create_county(county("Huron", 1), &actor).await.unwrap();
        service.create_county(county("Tuscola", 2), &actor).await.unwrap();

        assert!(
            service
                .update_county(huron.id, county("Huron", 5), &actor)
                .await
                .is_ok()
        );
        assert!(matches!(
            service.update_county(huron.id, county("Tuscola", 5), &actor).await,
            Err(CatalogError::Duplicate(_))
        ));
    }

    #[tokio::test]
    async fn update_of_missing_row_is_not_found_before_name_check() {
        let (service, _) = service().await;
        let actor = Actor::new("admin");
        service.create_county(county("Huron", 1), &actor).await.unwrap();
        service.create_tag(tag("Census", true), &actor).await.unwrap();

        assert!(matches!(
            service.update_county(999, county("Huron", 1), &actor).await,
            Err(CatalogError::NotFound("County"))
        ));
        assert!(matches!(
            service.update_tag(999, tag("Census", true), &actor).await,
            Err(CatalogError::NotFound("Tag"))
        ));
    }

    #[tokio::test]
    async fn unique_index_rejection_maps_to_duplicate() {
        let (_, store) = service().await;
        let actor = Actor::new("admin");
        store
            .counties()
            .create(county("Huron", 1).into(), &actor)
            .await
            .unwrap();

        let err = store
            .counties()
            .create(county("Huron", 2).into(), &actor)
            .await
            .unwrap_err();
        assert!(is_unique_violation(&err));
        assert!(matches!(
            duplicate_or_database(err, DUPLICATE_COUNTY),
            CatalogError::Duplicate(msg) if msg == DUPLICATE_COUNTY
        ));

        let other = anyhow::anyhow!("disk full");
        assert!(matches!(
            duplicate_or_database(other, DUPLICATE_COUNTY),
            CatalogError::Database(_)
        ));
    }

    #[tokio::test]
    async fn county_with_resources_cannot_be_deleted() {
        let (service, _) = service().await;
        let actor = Actor::new("admin");
        let huron = service.create_county(county("Huron", 1), &actor).await.unwrap();
        let mut inactive = resource(huron.id, "Old census", None);
        inactive.is_active = false;
        let res = service.create_resource(inactive, &actor).await.unwrap();

        assert!(matches!(
            service.delete_county(huron.id).await,
            Err(CatalogError::Conflict(_))
        ));

        service.delete_resource(res.id).await.unwrap();
        service.delete_county(huron.id).await.unwrap();
        assert!(matches!(
            service.get_county(huron.id).await,
            Err(CatalogError::NotFound("County"))
        ));
    }

    #[tokio::test]
    async fn resource_tags_keep_only_active_known_ids() {
        let (service, _) = service().await;
        let actor = Actor::new("admin");
        let huron = service.create_county(county("Huron", 1), &actor).await.unwrap();
        let census = service.create_tag(tag("Census", true), &actor).await.unwrap();
        let retired = service.create_tag(tag("Retired", false), &actor).await.unwrap();

        let created = service
            .create_resource(
                resource(huron.id, "1880 Census", Some(vec![census.id, retired.id, 404])),
                &actor,
            )
            .await
            .unwrap();
        assert_eq!(
            created.tags.iter().map(|t| t.id).collect::<Vec<_>>(),
            vec![census.id]
        );
        assert_eq!(created.county_name, "Huron");

        // No tag ids on update leaves links alone.
        let updated = service
            .update_resource(created.id, resource(huron.id, "1880 Census", None), &actor)
            .await
            .unwrap();
        assert_eq!(updated.tags.len(), 1);

        let cleared = service
            .update_resource(
                created.id,
                resource(huron.id, "1880 Census", Some(vec![])),
                &actor,
            )
            .await
            .unwrap();
        assert!(cleared.tags.is_empty());
    }

    #[tokio::test]
    async fn resource_requires_existing_county() {
        let (service, _) = service().await;
        let err = service
            .create_resource(resource(77, "Orphan", None), &Actor::new("admin"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "County not found");
    }

    #[tokio::test]
    async fn search_is_case_insensitive_and_paged() {
        let (service, _) = service().await;
        let actor = Actor::new("admin");
        let huron = service.create_county(county("Huron", 2), &actor).await.unwrap();
        let tuscola = service.create_county(county("Tuscola", 1), &actor).await.unwrap();

        service
            .create_resource(resource(huron.id, "Huron CEMETERY index", None), &actor)
            .await
            .unwrap();
        let mut described = resource(tuscola.id, "Plat maps", None);
        described.description = Some("Includes cemetery plots".to_string());
        service.create_resource(described, &actor).await.unwrap();
        let mut hidden = resource(tuscola.id, "Cemetery draft", None);
        hidden.is_active = false;
        service.create_resource(hidden, &actor).await.unwrap();

        let page = service
            .search_resources(ResourceQuery {
                query: Some("cemetery".to_string()),
                county_id: None,
                resource_type: None,
                page: 1,
                page_size: 1,
            })
            .await
            .unwrap();

        assert_eq!(page.total_count, 2);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.resources.len(), 1);
        // Tuscola sorts first by county display order.
        assert_eq!(page.resources[0].title, "Plat maps");
    }

    #[tokio::test]
    async fn search_matches_wildcard_characters_literally() {
        let (service, _) = service().await;
        let actor = Actor::new("admin");
        let huron = service.create_county(county("Huron", 1), &actor).await.unwrap();

        for title in ["Courthouse", "plat_map 1900", "Census 100% indexed"] {
            service
                .create_resource(resource(huron.id, title, None), &actor)
                .await
                .unwrap();
        }

        let titles = |query: &str| {
            let query = ResourceQuery {
                query: Some(query.to_string()),
                county_id: None,
                resource_type: None,
                page: 1,
                page_size: 20,
            };
            let service = &service;
            async move {
                service
                    .search_resources(query)
                    .await
                    .unwrap()
                    .resources
                    .into_iter()
                    .map(|r| r.title)
                    .collect::<Vec<_>>()
            }
        };

        assert_eq!(titles("_").await, vec!["plat_map 1900"]);
        assert_eq!(titles("%").await, vec!["Census 100% indexed"]);
        assert!(titles("\\").await.is_empty());
    }

    #[tokio::test]
    async fn deleting_a_tag_unlinks_resources() {
        let (service, _) = service().await;
        let actor = Actor::new("admin");
        let huron = service.create_county(county("Huron", 1), &actor).await.unwrap();
        let census = service.create_tag(tag("Census", true), &actor).await.unwrap();
        let res = service
            .create_resource(resource(huron.id, "Census", Some(vec![census.id])), &actor)
            .await
            .unwrap();

        service.delete_tag(census.id).await.unwrap();

        assert!(service.get_resource(res.id).await.unwrap().tags.is_empty());
    }
}

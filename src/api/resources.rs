use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use std::sync::Arc;

use super::auth::CurrentAdmin;
use super::validation::{
    DEFAULT_PAGE_SIZE, normalize_search_query, validate_id, validate_page, validate_page_size,
    validate_reorder_ids,
};
use super::{ApiError, ApiResponse, AppState, CountyResourcesQuery, SearchQuery};
use crate::services::catalog_service::{ResourceInput, ResourceQuery, ResourceView, SearchPage};

/// GET /resources/county/{county_id}?type=&activeOnly=
pub async fn list_by_county(
    State(state): State<Arc<AppState>>,
    Path(county_id): Path<i32>,
    Query(query): Query<CountyResourcesQuery>,
) -> Result<Json<ApiResponse<Vec<ResourceView>>>, ApiError> {
    let county_id = validate_id("county", county_id)?;
    let resources = state
        .catalog()
        .list_county_resources(
            county_id,
            query.resource_type,
            query.active_only.unwrap_or(true),
        )
        .await?;
    Ok(Json(ApiResponse::success(resources)))
}

/// GET /resources/{id}
pub async fn get_resource(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<ResourceView>>, ApiError> {
    let id = validate_id("resource", id)?;
    Ok(Json(ApiResponse::success(
        state.catalog().get_resource(id).await?,
    )))
}

/// GET /resources/search?query=&countyId=&type=&page=&pageSize=
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<ApiResponse<SearchPage>>, ApiError> {
    let page = validate_page(query.page.unwrap_or(1))?;
    let page_size = validate_page_size(query.page_size.unwrap_or(DEFAULT_PAGE_SIZE))?;

    let results = state
        .catalog()
        .search_resources(ResourceQuery {
            query: normalize_search_query(query.query),
            county_id: query.county_id,
            resource_type: query.resource_type,
            page,
            page_size,
        })
        .await?;

    Ok(Json(ApiResponse::success(results)))
}

/// POST /resources
pub async fn create_resource(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<CurrentAdmin>,
    Json(payload): Json<ResourceInput>,
) -> Result<Json<ApiResponse<ResourceView>>, ApiError> {
    let resource = state
        .catalog()
        .create_resource(payload, &admin.actor())
        .await?;
    Ok(Json(ApiResponse::success(resource)))
}

/// PUT /resources/{id}
pub async fn update_resource(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<CurrentAdmin>,
    Path(id): Path<i32>,
    Json(payload): Json<ResourceInput>,
) -> Result<Json<ApiResponse<ResourceView>>, ApiError> {
    let id = validate_id("resource", id)?;
    let resource = state
        .catalog()
        .update_resource(id, payload, &admin.actor())
        .await?;
    Ok(Json(ApiResponse::success(resource)))
}

/// DELETE /resources/{id}
pub async fn delete_resource(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let id = validate_id("resource", id)?;
    state.catalog().delete_resource(id).await?;
    Ok(Json(ApiResponse::ok()))
}

/// POST /resources/reorder with a JSON array of ids.
pub async fn reorder_resources(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<CurrentAdmin>,
    Json(ids): Json<Vec<i32>>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let ids = validate_reorder_ids(&ids)?;
    state
        .catalog()
        .reorder_resources(ids, &admin.actor())
        .await?;
    Ok(Json(ApiResponse::ok()))
}

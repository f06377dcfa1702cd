use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use std::sync::Arc;

use super::auth::CurrentAdmin;
use super::validation::validate_id;
use super::{ActiveOnlyQuery, ApiError, ApiResponse, AppState};
use crate::services::catalog_service::{TagInput, TagView};

pub async fn list_tags(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ActiveOnlyQuery>,
) -> Result<Json<ApiResponse<Vec<TagView>>>, ApiError> {
    let tags = state
        .catalog()
        .list_tags(query.active_only.unwrap_or(true))
        .await?;
    Ok(Json(ApiResponse::success(tags)))
}

pub async fn get_tag(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<TagView>>, ApiError> {
    let id = validate_id("tag", id)?;
    Ok(Json(ApiResponse::success(state.catalog().get_tag(id).await?)))
}

pub async fn create_tag(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<CurrentAdmin>,
    Json(payload): Json<TagInput>,
) -> Result<Json<ApiResponse<TagView>>, ApiError> {
    let tag = state.catalog().create_tag(payload, &admin.actor()).await?;
    Ok(Json(ApiResponse::success(tag)))
}

pub async fn update_tag(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<CurrentAdmin>,
    Path(id): Path<i32>,
    Json(payload): Json<TagInput>,
) -> Result<Json<ApiResponse<TagView>>, ApiError> {
    let id = validate_id("tag", id)?;
    let tag = state
        .catalog()
        .update_tag(id, payload, &admin.actor())
        .await?;
    Ok(Json(ApiResponse::success(tag)))
}

pub async fn delete_tag(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let id = validate_id("tag", id)?;
    state.catalog().delete_tag(id).await?;
    Ok(Json(ApiResponse::ok()))
}

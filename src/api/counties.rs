use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use std::sync::Arc;

use super::auth::CurrentAdmin;
use super::validation::{validate_id, validate_reorder_ids};
use super::{ActiveOnlyQuery, ApiError, ApiResponse, AppState};
use crate::services::catalog_service::{CountyInput, CountyView};

/// GET /counties?activeOnly=
pub async fn list_counties(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ActiveOnlyQuery>,
) -> Result<Json<ApiResponse<Vec<CountyView>>>, ApiError> {
    let counties = state
        .catalog()
        .list_counties(query.active_only.unwrap_or(true))
        .await?;
    Ok(Json(ApiResponse::success(counties)))
}

/// GET /counties/{id}
pub async fn get_county(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<CountyView>>, ApiError> {
    let id = validate_id("county", id)?;
    Ok(Json(ApiResponse::success(
        state.catalog().get_county(id).await?,
    )))
}

/// POST /counties
pub async fn create_county(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<CurrentAdmin>,
    Json(payload): Json<CountyInput>,
) -> Result<Json<ApiResponse<CountyView>>, ApiError> {
    let county = state
        .catalog()
        .create_county(payload, &admin.actor())
        .await?;
    Ok(Json(ApiResponse::success(county)))
}

/// PUT /counties/{id}
pub async fn update_county(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<CurrentAdmin>,
    Path(id): Path<i32>,
    Json(payload): Json<CountyInput>,
) -> Result<Json<ApiResponse<CountyView>>, ApiError> {
    let id = validate_id("county", id)?;
    let county = state
        .catalog()
        .update_county(id, payload, &admin.actor())
        .await?;
    Ok(Json(ApiResponse::success(county)))
}

/// DELETE /counties/{id}
pub async fn delete_county(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let id = validate_id("county", id)?;
    state.catalog().delete_county(id).await?;
    Ok(Json(ApiResponse::ok()))
}

/// POST /counties/reorder with a JSON array of ids.
pub async fn reorder_counties(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<CurrentAdmin>,
    Json(ids): Json<Vec<i32>>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let ids = validate_reorder_ids(&ids)?;
    state
        .catalog()
        .reorder_counties(ids, &admin.actor())
        .await?;
    Ok(Json(ApiResponse::ok()))
}

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use std::sync::Arc;

use super::auth::CurrentAdmin;
use super::validation::validate_id;
use super::{ApiError, ApiResponse, AppState};
use crate::services::{ContentError, HomeSnapshot};
use crate::services::HomeUpdate;
use crate::services::content_service::HomeVersion;

async fn current(state: &AppState) -> Result<HomeSnapshot, ApiError> {
    state
        .content()
        .get_current()
        .await?
        .ok_or_else(|| ApiError::NotFound("Home content not found".to_string()))
}

/// GET /home-content/public
pub async fn get_public(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<HomeSnapshot>>, ApiError> {
    Ok(Json(ApiResponse::success(current(&state).await?)))
}

/// GET /home-content/admin
pub async fn get_admin(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<HomeSnapshot>>, ApiError> {
    Ok(Json(ApiResponse::success(current(&state).await?)))
}

/// PUT /home-content/admin
pub async fn update(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<CurrentAdmin>,
    Json(payload): Json<HomeUpdate>,
) -> Result<Json<ApiResponse<HomeSnapshot>>, ApiError> {
    validate_id("home content", payload.id)?;
    let snapshot = state
        .content()
        .update(payload, &admin.actor())
        .await
        .map_err(|err| match err {
            // A save against a stale id is a bad request, not a missing page.
            ContentError::NotFound(_) => ApiError::validation(err.to_string()),
            other => ApiError::from(other),
        })?;
    Ok(Json(ApiResponse::success(snapshot)))
}

/// GET /home-content/admin/versions
pub async fn list_versions(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<HomeVersion>>>, ApiError> {
    Ok(Json(ApiResponse::success(
        state.content().list_versions().await?,
    )))
}

/// POST /home-content/admin/{id}/activate
pub async fn activate(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<CurrentAdmin>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<HomeSnapshot>>, ApiError> {
    let id = validate_id("home content", id)?;
    let snapshot = state.content().activate(id, &admin.actor()).await?;
    Ok(Json(ApiResponse::success(snapshot)))
}

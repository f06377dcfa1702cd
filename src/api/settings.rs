use axum::{
    Extension, Json,
    extract::{Path, State},
};
use std::sync::Arc;

use super::auth::CurrentAdmin;
use super::{ApiError, ApiResponse, AppState, SettingUpdateRequest};
use crate::services::settings_service::SettingView;

/// GET /settings
pub async fn list_settings(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<SettingView>>>, ApiError> {
    Ok(Json(ApiResponse::success(state.settings().list().await?)))
}

/// PUT /settings/{key}
pub async fn put_setting(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<CurrentAdmin>,
    Path(key): Path<String>,
    Json(payload): Json<SettingUpdateRequest>,
) -> Result<Json<ApiResponse<SettingView>>, ApiError> {
    let setting = state
        .settings()
        .upsert(&key, payload.value, payload.description, &admin.actor())
        .await?;
    Ok(Json(ApiResponse::success(setting)))
}

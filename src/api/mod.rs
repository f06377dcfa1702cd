use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{delete, get, post, put},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer, cookie::SameSite};

use crate::config::Config;
use crate::state::SharedState;

pub mod auth;
mod counties;
mod error;
mod home;
mod observability;
mod resources;
mod settings;
mod tags;
mod types;
mod validation;

pub use error::ApiError;
pub use types::*;

use crate::services::{AuthService, CatalogService, ContentService, SettingsService};
use metrics_exporter_prometheus::PrometheusHandle;

pub const SESSION_COOKIE_NAME: &str = "lineage_session";

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub start_time: std::time::Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.shared.config
    }

    #[must_use]
    pub fn store(&self) -> &crate::db::Store {
        &self.shared.store
    }

    #[must_use]
    pub fn auth(&self) -> &dyn AuthService {
        self.shared.auth_service.as_ref()
    }

    #[must_use]
    pub fn content(&self) -> &dyn ContentService {
        self.shared.content_service.as_ref()
    }

    #[must_use]
    pub fn catalog(&self) -> &dyn CatalogService {
        self.shared.catalog_service.as_ref()
    }

    #[must_use]
    pub fn settings(&self) -> &dyn SettingsService {
        self.shared.settings_service.as_ref()
    }
}

#[must_use]
pub fn create_app_state(
    shared: Arc<SharedState>,
    prometheus_handle: Option<PrometheusHandle>,
) -> Arc<AppState> {
    Arc::new(AppState {
        shared,
        start_time: std::time::Instant::now(),
        prometheus_handle,
    })
}

pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    Ok(create_app_state(shared, prometheus_handle))
}

pub fn router(state: Arc<AppState>) -> Router {
    let config = state.config();
    let images_path = config.general.images_path.clone();
    let cors_origins = config.server.cors_allowed_origins.clone();

    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_name(SESSION_COOKIE_NAME)
        .with_secure(config.server.secure_cookies)
        .with_http_only(true)
        .with_same_site(SameSite::Strict)
        .with_expiry(Expiry::OnInactivity(time::Duration::hours(i64::from(
            config.server.session_hours,
        ))));

    let api_router = Router::new()
        .merge(create_admin_router(state.clone()))
        .merge(create_public_router())
        .layer(session_layer)
        .with_state(state.clone());

    let cors_layer = if cors_origins.iter().any(|o| o == "*") {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .nest("/api", api_router)
        .nest_service("/images", tower_http::services::ServeDir::new(images_path))
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(middleware::from_fn(observability::security_headers_middleware))
        .layer(middleware::from_fn(observability::logging_middleware))
        .layer(TraceLayer::new_for_http())
}

fn create_public_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(observability::health))
        .route("/auth/login", post(auth::login))
        .route("/auth/status", get(auth::status))
        .route("/home-content/public", get(home::get_public))
        .route("/counties", get(counties::list_counties))
        .route("/counties/{id}", get(counties::get_county))
        .route("/resources/search", get(resources::search))
        .route(
            "/resources/county/{county_id}",
            get(resources::list_by_county),
        )
        .route("/resources/{id}", get(resources::get_resource))
        .route("/tags", get(tags::list_tags))
        .route("/tags/{id}", get(tags::get_tag))
        .route("/settings", get(settings::list_settings))
}

fn create_admin_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me))
        .route("/home-content/admin", get(home::get_admin))
        .route("/home-content/admin", put(home::update))
        .route("/home-content/admin/versions", get(home::list_versions))
        .route("/home-content/admin/{id}/activate", post(home::activate))
        .route("/counties", post(counties::create_county))
        .route("/counties/{id}", put(counties::update_county))
        .route("/counties/{id}", delete(counties::delete_county))
        .route("/counties/reorder", post(counties::reorder_counties))
        .route("/resources", post(resources::create_resource))
        .route("/resources/{id}", put(resources::update_resource))
        .route("/resources/{id}", delete(resources::delete_resource))
        .route("/resources/reorder", post(resources::reorder_resources))
        .route("/tags", post(tags::create_tag))
        .route("/tags/{id}", put(tags::update_tag))
        .route("/tags/{id}", delete(tags::delete_tag))
        .route("/settings/{key}", put(settings::put_setting))
        .route("/metrics", get(observability::get_metrics))
        .route_layer(middleware::from_fn_with_state(state, auth::require_admin))
}

use axum::{
    Extension, Json,
    extract::{ConnectInfo, FromRequestParts, Request, State},
    http::{HeaderMap, StatusCode, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_sessions::Session;

use super::{ApiError, ApiResponse, AppState, LoginRequest, LoginResponse};
use crate::domain::Actor;
use crate::services::{AdminProfile, AuthError, AuthStatus};

// ============================================================================
// Request context
// ============================================================================

/// The signed-in admin, placed in request extensions by [`require_admin`].
#[derive(Debug, Clone)]
pub struct CurrentAdmin {
    pub user_id: i32,
    pub username: String,
}

impl CurrentAdmin {
    #[must_use]
    pub fn actor(&self) -> Actor {
        Actor::new(self.username.clone())
    }
}

/// Caller address: first `X-Forwarded-For` entry, else the socket peer.
#[derive(Debug, Clone)]
pub struct ClientOrigin(pub Option<String>);

impl<S: Send + Sync> FromRequestParts<S> for ClientOrigin {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);
        Ok(Self(client_origin(&parts.headers, peer)))
    }
}

#[must_use]
pub fn client_origin(headers: &HeaderMap, peer: Option<SocketAddr>) -> Option<String> {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|list| list.split(',').next())
        .map(str::trim)
        .filter(|first| !first.is_empty());

    forwarded
        .map(str::to_string)
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
}

// ============================================================================
// Middleware
// ============================================================================

/// Admin gate for every mutating route. Anonymous or expired sessions get 401.
pub async fn require_admin(
    State(state): State<Arc<AppState>>,
    session: Session,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let claims = state.auth().current_claims(&session).await?;

    let Some(claims) = claims.filter(crate::services::SessionClaims::is_admin) else {
        return Err(ApiError::unauthorized());
    };

    tracing::Span::current().record("user", claims.username.as_str());
    request.extensions_mut().insert(CurrentAdmin {
        user_id: claims.user_id,
        username: claims.username,
    });

    Ok(next.run(request).await)
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    session: Session,
    ClientOrigin(origin): ClientOrigin,
    Json(payload): Json<LoginRequest>,
) -> Response {
    let result = state
        .auth()
        .authenticate(&payload.username, &payload.password, origin, &session)
        .await;

    match result {
        Ok(outcome) => Json(LoginResponse::succeeded(outcome.username)).into_response(),
        Err(err) => {
            let status = match &err {
                AuthError::CredentialsRequired => StatusCode::BAD_REQUEST,
                AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                AuthError::UserNotFound
                | AuthError::Unavailable(_)
                | AuthError::Session(_) => {
                    tracing::error!(detail = ?err.detail(), "Login failed");
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            };
            (status, Json(LoginResponse::failed(err.to_string()))).into_response()
        }
    }
}

/// POST /auth/logout
pub async fn logout(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state.auth().sign_out(&session).await?;
    Ok(Json(ApiResponse::ok()))
}

/// GET /auth/status
pub async fn status(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Json<AuthStatus>, ApiError> {
    Ok(Json(state.auth().status(&session).await?))
}

/// GET /auth/me
pub async fn me(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<CurrentAdmin>,
) -> Result<Json<ApiResponse<AdminProfile>>, ApiError> {
    let profile = state.auth().profile(admin.user_id).await?;
    Ok(Json(ApiResponse::success(profile)))
}

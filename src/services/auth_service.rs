//! Domain service for admin authentication.
//!
//! Handles login, logout and the per-request session status query.

use anyhow::Result as AnyResult;
use serde::Serialize;
use thiserror::Error;

use crate::db::AdminUserRecord;
use crate::services::session::{SessionClaims, SessionError, SessionTransport};

/// Errors specific to authentication operations.
///
/// The display text of every variant is safe to show to the caller.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Username and password are required")]
    CredentialsRequired,

    #[error("Invalid username or password")]
    InvalidCredentials,

    /// Storage failure. The detail is for logs only.
    #[error("An error occurred during authentication")]
    Unavailable(String),

    #[error("An error occurred during authentication")]
    Session(String),

    #[error("Admin user not found")]
    UserNotFound,
}

impl From<SessionError> for AuthError {
    fn from(err: SessionError) -> Self {
        Self::Session(err.0)
    }
}

impl AuthError {
    /// Internal detail for logging, if any.
    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Unavailable(detail) | Self::Session(detail) => Some(detail),
            _ => None,
        }
    }
}

/// Lookups the login flow needs from the user table.
#[async_trait::async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_active_user(&self, username: &str) -> AnyResult<Option<AdminUserRecord>>;

    async fn find_user(&self, user_id: i32) -> AnyResult<Option<AdminUserRecord>>;

    async fn record_login(&self, user_id: i32, at: String, origin: Option<String>)
    -> AnyResult<()>;
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginOutcome {
    pub username: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthStatus {
    pub is_authenticated: bool,
    pub is_admin: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminProfile {
    pub username: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub last_login_at: Option<String>,
    pub last_login_ip: Option<String>,
}

impl From<AdminUserRecord> for AdminProfile {
    fn from(user: AdminUserRecord) -> Self {
        Self {
            username: user.username,
            display_name: user.display_name,
            email: user.email,
            last_login_at: user.last_login_at,
            last_login_ip: user.last_login_ip,
        }
    }
}

/// Domain service trait for authentication.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Verifies credentials, records the login and starts a session.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::CredentialsRequired`] for blank input without
    /// touching the store, and [`AuthError::InvalidCredentials`] for an
    /// unknown user or a wrong password alike.
    async fn authenticate(
        &self,
        username: &str,
        password: &str,
        origin: Option<String>,
        transport: &dyn SessionTransport,
    ) -> Result<LoginOutcome, AuthError>;

    /// Ends the current session. Succeeds when there is none.
    async fn sign_out(&self, transport: &dyn SessionTransport) -> Result<(), AuthError>;

    async fn status(&self, transport: &dyn SessionTransport) -> Result<AuthStatus, AuthError>;

    /// Valid claims for this request, renewed if due. Expired claims, and
    /// claims whose account is gone or deactivated, are cleared and read as
    /// `None`.
    async fn current_claims(
        &self,
        transport: &dyn SessionTransport,
    ) -> Result<Option<SessionClaims>, AuthError>;

    async fn profile(&self, user_id: i32) -> Result<AdminProfile, AuthError>;
}

//! Admin session claims and the transport that carries them.
//!
//! Claims live server-side in the `tower-sessions` store under a single key.
//! The browser only ever holds the opaque session id cookie.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tower_sessions::Session;

use crate::db::AdminUserRecord;
use crate::domain::Capability;

pub const CLAIMS_KEY: &str = "admin_session";

#[derive(Debug, Error)]
#[error("Session transport failure: {0}")]
pub struct SessionError(pub String);

impl From<tower_sessions::session::Error> for SessionError {
    fn from(err: tower_sessions::session::Error) -> Self {
        Self(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub user_id: i32,
    pub username: String,
    pub capabilities: Vec<Capability>,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl SessionClaims {
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.capabilities.contains(&Capability::Admin)
    }
}

/// Builds claims for verified identities and applies the sliding window.
#[derive(Debug, Clone, Copy)]
pub struct SessionIssuer {
    window: Duration,
}

impl SessionIssuer {
    #[must_use]
    pub const fn new(window: Duration) -> Self {
        Self { window }
    }

    /// Every admin user gets the admin capability; there is no lesser role.
    #[must_use]
    pub fn issue(&self, user: &AdminUserRecord, now: DateTime<Utc>) -> SessionClaims {
        SessionClaims {
            user_id: user.id,
            username: user.username.clone(),
            capabilities: vec![Capability::Admin],
            issued_at: now,
            expires_at: now + self.window,
        }
    }

    #[must_use]
    pub fn is_expired(&self, claims: &SessionClaims, now: DateTime<Utc>) -> bool {
        now >= claims.expires_at
    }

    /// Pushes the expiry out to `now + window` once less than half of the
    /// window remains. Returns whether the claims changed.
    pub fn renew(&self, claims: &mut SessionClaims, now: DateTime<Utc>) -> bool {
        if claims.expires_at - now < self.window / 2 {
            claims.expires_at = now + self.window;
            true
        } else {
            false
        }
    }
}

/// Where session claims are kept between requests.
#[async_trait]
pub trait SessionTransport: Send + Sync {
    async fn load_claims(&self) -> Result<Option<SessionClaims>, SessionError>;

    async fn store_claims(&self, claims: &SessionClaims) -> Result<(), SessionError>;

    /// Issues a fresh session id, keeping the stored data.
    async fn rotate(&self) -> Result<(), SessionError>;

    /// Drops all session data and expires the cookie.
    async fn clear(&self) -> Result<(), SessionError>;
}

#[async_trait]
impl SessionTransport for Session {
    async fn load_claims(&self) -> Result<Option<SessionClaims>, SessionError> {
        Ok(self.get::<SessionClaims>(CLAIMS_KEY).await?)
    }

    async fn store_claims(&self, claims: &SessionClaims) -> Result<(), SessionError> {
        self.insert(CLAIMS_KEY, claims).await?;
        Ok(())
    }

    async fn rotate(&self) -> Result<(), SessionError> {
        self.cycle_id().await?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), SessionError> {
        self.flush().await?;
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> AdminUserRecord {
        AdminUserRecord {
            id: 7,
            username: "archivist".to_string(),
            password_hash: String::new(),
            display_name: None,
            email: None,
            is_active: true,
            created_at: "2025-01-01T00:00:00.000000Z".to_string(),
            last_login_at: None,
            last_login_ip: None,
        }
    }

    #[test]
    fn issued_claims_carry_admin_and_window() {
        let issuer = SessionIssuer::new(Duration::hours(8));
        let now = Utc::now();
        let claims = issuer.issue(&user(), now);

        assert!(claims.is_admin());
        assert_eq!(claims.user_id, 7);
        assert_eq!(claims.expires_at - claims.issued_at, Duration::hours(8));
        assert!(!issuer.is_expired(&claims, now));
        assert!(issuer.is_expired(&claims, now + Duration::hours(8)));
    }

    #[test]
    fn renewal_only_after_half_window() {
        let issuer = SessionIssuer::new(Duration::hours(8));
        let start = Utc::now();
        let mut claims = issuer.issue(&user(), start);

        assert!(!issuer.renew(&mut claims, start + Duration::hours(2)));
        assert_eq!(claims.expires_at, start + Duration::hours(8));

        let later = start + Duration::hours(5);
        assert!(issuer.renew(&mut claims, later));
        assert_eq!(claims.expires_at, later + Duration::hours(8));
    }
}

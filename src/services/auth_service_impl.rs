//! Login orchestration over a credential store, a password verifier and a
//! session issuer.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{error, info, warn};

use crate::db::timestamp_now;
use crate::services::auth_service::{
    AdminProfile, AuthError, AuthService, AuthStatus, CredentialStore, LoginOutcome,
};
use crate::services::password::PasswordVerifier;
use crate::services::session::{SessionClaims, SessionIssuer, SessionTransport};

fn record_attempt(outcome: &'static str) {
    metrics::counter!("auth_login_attempts_total", "outcome" => outcome).increment(1);
}

pub struct AuthenticationGate {
    credentials: Arc<dyn CredentialStore>,
    verifier: Arc<dyn PasswordVerifier>,
    issuer: SessionIssuer,
    decoy_hash: String,
}

impl AuthenticationGate {
    /// `decoy_hash` is verified against when the username is unknown.
    #[must_use]
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        verifier: Arc<dyn PasswordVerifier>,
        issuer: SessionIssuer,
        decoy_hash: String,
    ) -> Self {
        Self {
            credentials,
            verifier,
            issuer,
            decoy_hash,
        }
    }
}

#[async_trait]
impl AuthService for AuthenticationGate {
    async fn authenticate(
        &self,
        username: &str,
        password: &str,
        origin: Option<String>,
        transport: &dyn SessionTransport,
    ) -> Result<LoginOutcome, AuthError> {
        if username.trim().is_empty() || password.trim().is_empty() {
            record_attempt("rejected");
            return Err(AuthError::CredentialsRequired);
        }

        let user = match self.credentials.find_active_user(username).await {
            Ok(user) => user,
            Err(e) => {
                record_attempt("error");
                error!(error = ?e, "Credential lookup failed");
                return Err(AuthError::Unavailable(e.to_string()));
            }
        };

        let Some(user) = user else {
            // Same hashing cost as a wrong password; the outcome is ignored.
            let _ = self.verifier.verify(password, &self.decoy_hash).await;
            record_attempt("invalid");
            info!(username, "Login rejected");
            return Err(AuthError::InvalidCredentials);
        };

        if !self.verifier.verify(password, &user.password_hash).await {
            record_attempt("invalid");
            info!(username, "Login rejected");
            return Err(AuthError::InvalidCredentials);
        }

        if let Err(e) = self
            .credentials
            .record_login(user.id, timestamp_now(), origin.clone())
            .await
        {
            record_attempt("error");
            error!(error = ?e, user_id = user.id, "Failed to record login");
            return Err(AuthError::Unavailable(e.to_string()));
        }

        let claims = self.issuer.issue(&user, Utc::now());
        transport.rotate().await?;
        transport.store_claims(&claims).await?;

        record_attempt("success");
        info!(username = %user.username, origin = ?origin, "Admin signed in");

        Ok(LoginOutcome {
            username: user.username,
        })
    }

    async fn sign_out(&self, transport: &dyn SessionTransport) -> Result<(), AuthError> {
        if let Some(claims) = transport.load_claims().await? {
            info!(username = %claims.username, "Admin signed out");
        }
        transport.clear().await?;
        Ok(())
    }

    async fn status(&self, transport: &dyn SessionTransport) -> Result<AuthStatus, AuthError> {
        Ok(self
            .current_claims(transport)
            .await?
            .map_or_else(AuthStatus::default, |claims| AuthStatus {
                is_authenticated: true,
                is_admin: claims.is_admin(),
                username: Some(claims.username),
            }))
    }

    async fn current_claims(
        &self,
        transport: &dyn SessionTransport,
    ) -> Result<Option<SessionClaims>, AuthError> {
        let Some(mut claims) = transport.load_claims().await? else {
            return Ok(None);
        };

        let now = Utc::now();
        if self.issuer.is_expired(&claims, now) {
            warn!(username = %claims.username, "Session expired");
            transport.clear().await?;
            return Ok(None);
        }

        let account = self
            .credentials
            .find_user(claims.user_id)
            .await
            .map_err(|e| AuthError::Unavailable(e.to_string()))?;
        if !account.is_some_and(|user| user.is_active) {
            warn!(username = %claims.username, "Session belongs to an inactive account");
            transport.clear().await?;
            return Ok(None);
        }

        if self.issuer.renew(&mut claims, now) {
            transport.store_claims(&claims).await?;
        }

        Ok(Some(claims))
    }

    async fn profile(&self, user_id: i32) -> Result<AdminProfile, AuthError> {
        let user = self
            .credentials
            .find_user(user_id)
            .await
            .map_err(|e| AuthError::Unavailable(e.to_string()))?
            .ok_or(AuthError::UserNotFound)?;

        Ok(AdminProfile::from(user))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::Duration;

    use super::*;
    use crate::db::AdminUserRecord;
    use crate::domain::Capability;
    use crate::services::session::testing::MemoryTransport;

    #[derive(Default)]
    struct CountingStore {
        users: Vec<AdminUserRecord>,
        reads: AtomicUsize,
        logins: Mutex<Vec<(i32, Option<String>)>>,
        broken: bool,
    }

    impl CountingStore {
        fn with_user(username: &str, password: &str) -> Self {
            Self {
                users: vec![AdminUserRecord {
                    id: 1,
                    username: username.to_string(),
                    password_hash: format!("plain:{password}"),
                    display_name: Some("The Archivist".to_string()),
                    email: None,
                    is_active: true,
                    created_at: "2025-01-01T00:00:00.000000Z".to_string(),
                    last_login_at: None,
                    last_login_ip: None,
                }],
                ..Self::default()
            }
        }

        fn reads(&self) -> usize {
            self.reads.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CredentialStore for CountingStore {
        async fn find_active_user(
            &self,
            username: &str,
        ) -> anyhow::Result<Option<AdminUserRecord>> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            if self.broken {
                anyhow::bail!("database is locked");
            }
            Ok(self
                .users
                .iter()
                .find(|u| u.username == username && u.is_active)
                .cloned())
        }

        async fn find_user(&self, user_id: i32) -> anyhow::Result<Option<AdminUserRecord>> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            Ok(self.users.iter().find(|u| u.id == user_id).cloned())
        }

        async fn record_login(
            &self,
            user_id: i32,
            _at: String,
            origin: Option<String>,
        ) -> anyhow::Result<()> {
            self.logins.lock().unwrap().push((user_id, origin));
            Ok(())
        }
    }

    struct PlainVerifier;

    #[async_trait]
    impl PasswordVerifier for PlainVerifier {
        async fn verify(&self, password: &str, stored_hash: &str) -> bool {
            stored_hash.strip_prefix("plain:") == Some(password)
        }
    }

    const DECOY: &str = "plain:decoy-password";

    fn gate(store: Arc<CountingStore>) -> AuthenticationGate {
        AuthenticationGate::new(
            store,
            Arc::new(PlainVerifier),
            SessionIssuer::new(Duration::hours(8)),
            DECOY.to_string(),
        )
    }

    #[derive(Default)]
    struct RecordingVerifier {
        checked: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl PasswordVerifier for RecordingVerifier {
        async fn verify(&self, password: &str, stored_hash: &str) -> bool {
            self.checked.lock().unwrap().push(stored_hash.to_string());
            PlainVerifier.verify(password, stored_hash).await
        }
    }

    #[tokio::test]
    async fn unknown_user_still_runs_a_hash_check() {
        let store = Arc::new(CountingStore::with_user("admin", "secret"));
        let verifier = Arc::new(RecordingVerifier::default());
        let gate = AuthenticationGate::new(
            store,
            verifier.clone(),
            SessionIssuer::new(Duration::hours(8)),
            DECOY.to_string(),
        );
        let transport = MemoryTransport::default();

        // Even the decoy's own password does not sign anyone in.
        let err = gate
            .authenticate("nobody", "decoy-password", None, &transport)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
        assert_eq!(verifier.checked.lock().unwrap().as_slice(), [DECOY]);

        gate.authenticate("admin", "guess", None, &transport)
            .await
            .unwrap_err();
        assert_eq!(verifier.checked.lock().unwrap().len(), 2);
        assert!(transport.current().is_none());
    }

    #[tokio::test]
    async fn blank_credentials_never_touch_the_store() {
        let store = Arc::new(CountingStore::with_user("admin", "secret"));
        let gate = gate(store.clone());
        let transport = MemoryTransport::default();

        for (username, password) in [("", "x"), ("x", ""), ("   ", "x"), ("x", "  ")] {
            let err = gate
                .authenticate(username, password, None, &transport)
                .await
                .unwrap_err();
            assert!(matches!(err, AuthError::CredentialsRequired));
        }

        assert_eq!(store.reads(), 0);
        assert!(transport.current().is_none());
    }

    #[tokio::test]
    async fn unknown_user_and_wrong_password_look_the_same() {
        let store = Arc::new(CountingStore::with_user("admin", "secret"));
        let gate = gate(store.clone());
        let transport = MemoryTransport::default();

        let unknown = gate
            .authenticate("nobody", "secret", None, &transport)
            .await
            .unwrap_err();
        let wrong = gate
            .authenticate("admin", "guess", None, &transport)
            .await
            .unwrap_err();
        let wrong_case = gate
            .authenticate("Admin", "secret", None, &transport)
            .await
            .unwrap_err();

        for err in [unknown, wrong, wrong_case] {
            assert_eq!(err.to_string(), "Invalid username or password");
        }
        assert!(store.logins.lock().unwrap().is_empty());
        assert!(transport.current().is_none());
    }

    #[tokio::test]
    async fn successful_login_then_status_reports_admin() {
        let store = Arc::new(CountingStore::with_user("admin", "secret"));
        let gate = gate(store.clone());
        let transport = MemoryTransport::default();

        let outcome = gate
            .authenticate("admin", "secret", Some("203.0.113.9".to_string()), &transport)
            .await
            .unwrap();
        assert_eq!(outcome.username, "admin");
        assert_eq!(transport.rotations(), 1);
        assert_eq!(
            store.logins.lock().unwrap().as_slice(),
            &[(1, Some("203.0.113.9".to_string()))]
        );

        let status = gate.status(&transport).await.unwrap();
        assert_eq!(
            status,
            AuthStatus {
                is_authenticated: true,
                is_admin: true,
                username: Some("admin".to_string()),
            }
        );
    }

    #[tokio::test]
    async fn sign_out_returns_to_anonymous_and_is_idempotent() {
        let store = Arc::new(CountingStore::with_user("admin", "secret"));
        let gate = gate(store);
        let transport = MemoryTransport::default();

        gate.authenticate("admin", "secret", None, &transport)
            .await
            .unwrap();
        gate.sign_out(&transport).await.unwrap();

        let status = gate.status(&transport).await.unwrap();
        assert!(!status.is_authenticated);
        assert!(!status.is_admin);
        assert!(status.username.is_none());

        gate.sign_out(&transport).await.unwrap();
    }

    #[tokio::test]
    async fn storage_failure_is_generic() {
        let store = Arc::new(CountingStore {
            broken: true,
            ..CountingStore::with_user("admin", "secret")
        });
        let gate = gate(store);
        let transport = MemoryTransport::default();

        let err = gate
            .authenticate("admin", "secret", None, &transport)
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "An error occurred during authentication");
        assert_eq!(err.detail(), Some("database is locked"));
    }

    #[tokio::test]
    async fn expired_claims_read_as_anonymous_and_are_cleared() {
        let gate = gate(Arc::new(CountingStore::default()));
        let issued = Utc::now() - Duration::hours(9);
        let transport = MemoryTransport::with_claims(SessionClaims {
            user_id: 1,
            username: "admin".to_string(),
            capabilities: vec![Capability::Admin],
            issued_at: issued,
            expires_at: issued + Duration::hours(8),
        });

        assert!(gate.current_claims(&transport).await.unwrap().is_none());
        assert!(transport.current().is_none());
    }

    #[tokio::test]
    async fn deactivated_account_loses_its_session() {
        let mut store = CountingStore::with_user("admin", "secret");
        store.users[0].is_active = false;
        let gate = gate(Arc::new(store));
        let now = Utc::now();
        let transport = MemoryTransport::with_claims(SessionClaims {
            user_id: 1,
            username: "admin".to_string(),
            capabilities: vec![Capability::Admin],
            issued_at: now,
            expires_at: now + Duration::hours(8),
        });

        assert!(gate.current_claims(&transport).await.unwrap().is_none());
        assert!(transport.current().is_none());

        let status = gate.status(&transport).await.unwrap();
        assert!(!status.is_authenticated);
    }

    #[tokio::test]
    async fn stale_claims_are_renewed() {
        let gate = gate(Arc::new(CountingStore::with_user("admin", "secret")));
        let issued = Utc::now() - Duration::hours(6);
        let transport = MemoryTransport::with_claims(SessionClaims {
            user_id: 1,
            username: "admin".to_string(),
            capabilities: vec![Capability::Admin],
            issued_at: issued,
            expires_at: issued + Duration::hours(8),
        });

        let claims = gate.current_claims(&transport).await.unwrap().unwrap();
        assert!(claims.expires_at > Utc::now() + Duration::hours(7));
        assert_eq!(transport.current(), Some(claims));
    }
}

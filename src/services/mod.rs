pub mod password;
pub use password::{Argon2Verifier, PasswordVerifier};

pub mod session;
pub use session::{SessionClaims, SessionIssuer, SessionTransport};

pub mod auth_service;
pub mod auth_service_impl;
pub use auth_service::{AdminProfile, AuthError, AuthService, AuthStatus, CredentialStore};
pub use auth_service_impl::AuthenticationGate;

pub mod content_service;
pub mod content_service_impl;
pub use content_service::{ContentError, ContentService, HomeSnapshot, HomeUpdate};
pub use content_service_impl::SeaOrmContentService;

pub mod catalog_service;
pub mod catalog_service_impl;
pub use catalog_service::{CatalogError, CatalogService};
pub use catalog_service_impl::SeaOrmCatalogService;

pub mod settings_service;
pub mod settings_service_impl;
pub use settings_service::{SettingsError, SettingsService};
pub use settings_service_impl::SeaOrmSettingsService;

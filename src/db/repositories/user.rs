use anyhow::{Context, Result};
use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    Set,
};

use crate::db::timestamp_now;
use crate::entities::admin_users;
use crate::services::auth_service::CredentialStore;

/// Admin account as the auth layer sees it, hash included.
#[derive(Debug, Clone)]
pub struct AdminUserRecord {
    pub id: i32,
    pub username: String,
    pub password_hash: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub is_active: bool,
    pub created_at: String,
    pub last_login_at: Option<String>,
    pub last_login_ip: Option<String>,
}

impl From<admin_users::Model> for AdminUserRecord {
    fn from(model: admin_users::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            password_hash: model.password_hash,
            display_name: model.display_name,
            email: model.email,
            is_active: model.is_active,
            created_at: model.created_at,
            last_login_at: model.last_login_at,
            last_login_ip: model.last_login_ip,
        }
    }
}

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Exact, case-sensitive match restricted to active accounts.
    pub async fn find_active_by_username(&self, username: &str) -> Result<Option<AdminUserRecord>> {
        let user = admin_users::Entity::find()
            .filter(admin_users::Column::Username.eq(username))
            .filter(admin_users::Column::IsActive.eq(true))
            .one(&self.conn)
            .await
            .context("Failed to query active admin user by username")?;

        Ok(user.map(AdminUserRecord::from))
    }

    pub async fn get_by_username(&self, username: &str) -> Result<Option<AdminUserRecord>> {
        let user = admin_users::Entity::find()
            .filter(admin_users::Column::Username.eq(username))
            .one(&self.conn)
            .await
            .context("Failed to query admin user by username")?;

        Ok(user.map(AdminUserRecord::from))
    }

    pub async fn get_by_id(&self, id: i32) -> Result<Option<AdminUserRecord>> {
        let user = admin_users::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query admin user by ID")?;

        Ok(user.map(AdminUserRecord::from))
    }

    pub async fn count(&self) -> Result<u64> {
        admin_users::Entity::find()
            .count(&self.conn)
            .await
            .context("Failed to count admin users")
    }

    pub async fn record_login(&self, id: i32, at: String, origin: Option<String>) -> Result<()> {
        let user = admin_users::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query admin user for login update")?
            .ok_or_else(|| anyhow::anyhow!("Admin user not found: {id}"))?;

        let mut active: admin_users::ActiveModel = user.into();
        active.last_login_at = Set(Some(at));
        active.last_login_ip = Set(origin);
        active
            .update(&self.conn)
            .await
            .context("Failed to record admin login")?;

        Ok(())
    }

    /// Inserts a new admin, or re-activates an existing one with the new hash.
    /// Returns `true` when a row was inserted.
    pub async fn create_or_reactivate(&self, username: &str, password_hash: String) -> Result<bool> {
        if let Some(existing) = admin_users::Entity::find()
            .filter(admin_users::Column::Username.eq(username))
            .one(&self.conn)
            .await
            .context("Failed to query admin user")?
        {
            let mut active: admin_users::ActiveModel = existing.into();
            active.password_hash = Set(password_hash);
            active.is_active = Set(true);
            active.update(&self.conn).await?;
            return Ok(false);
        }

        admin_users::ActiveModel {
            username: Set(username.to_string()),
            password_hash: Set(password_hash),
            display_name: Set(Some(username.to_string())),
            is_active: Set(true),
            created_at: Set(timestamp_now()),
            ..Default::default()
        }
        .insert(&self.conn)
        .await
        .context("Failed to insert admin user")?;

        Ok(true)
    }

    pub async fn set_password(&self, username: &str, password_hash: String) -> Result<()> {
        let user = admin_users::Entity::find()
            .filter(admin_users::Column::Username.eq(username))
            .one(&self.conn)
            .await
            .context("Failed to query admin user for password update")?
            .ok_or_else(|| anyhow::anyhow!("Admin user not found: {username}"))?;

        let mut active: admin_users::ActiveModel = user.into();
        active.password_hash = Set(password_hash);
        active.update(&self.conn).await?;

        Ok(())
    }

    pub async fn deactivate(&self, username: &str) -> Result<()> {
        let user = admin_users::Entity::find()
            .filter(admin_users::Column::Username.eq(username))
            .one(&self.conn)
            .await
            .context("Failed to query admin user for deactivation")?
            .ok_or_else(|| anyhow::anyhow!("Admin user not found: {username}"))?;

        let mut active: admin_users::ActiveModel = user.into();
        active.is_active = Set(false);
        active.update(&self.conn).await?;

        Ok(())
    }
}

#[async_trait]
impl CredentialStore for UserRepository {
    async fn find_active_user(&self, username: &str) -> Result<Option<AdminUserRecord>> {
        self.find_active_by_username(username).await
    }

    async fn find_user(&self, user_id: i32) -> Result<Option<AdminUserRecord>> {
        self.get_by_id(user_id).await
    }

    async fn record_login(&self, user_id: i32, at: String, origin: Option<String>) -> Result<()> {
        Self::record_login(self, user_id, at, origin).await
    }
}

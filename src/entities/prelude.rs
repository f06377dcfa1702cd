pub use super::admin_users::Entity as AdminUsers;
pub use super::counties::Entity as Counties;
pub use super::home_content::Entity as HomeContent;
pub use super::resource_tags::Entity as ResourceTags;
pub use super::resources::Entity as Resources;
pub use super::site_settings::Entity as SiteSettings;
pub use super::tags::Entity as Tags;

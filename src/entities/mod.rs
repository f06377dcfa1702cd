pub mod prelude;

pub mod admin_users;
pub mod counties;
pub mod home_content;
pub mod resource_tags;
pub mod resources;
pub mod site_settings;
pub mod tags;

mod admin;

pub use admin::{cmd_create_admin, cmd_deactivate_admin, cmd_set_password};

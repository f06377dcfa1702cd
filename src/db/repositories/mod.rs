pub mod county;
pub mod home;
pub mod resource;
pub mod settings;
pub mod tag;
pub mod user;

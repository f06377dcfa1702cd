use sea_orm::entity::prelude::*;

/// One version of the homepage content. The current version is the active
/// row with the latest `updated_at`.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "home_content")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub site_title: String,

    pub tagline: String,

    #[sea_orm(column_type = "Text")]
    pub about_content: String,

    pub about_section_title: String,

    pub hero_image_path: Option<String>,

    pub profile_image_path: Option<String>,

    pub profile_image_caption: String,

    /// JSON array of `{title, url}` objects. Opaque to the store.
    #[sea_orm(column_type = "Text")]
    pub sidebar_links: String,

    pub huron_title: String,
    pub huron_image_path: Option<String>,

    pub sanilac_title: String,
    pub sanilac_image_path: Option<String>,

    pub tuscola_title: String,
    pub tuscola_image_path: Option<String>,

    pub is_active: bool,

    pub created_at: String,
    pub created_by: String,
    pub updated_at: String,
    pub updated_by: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

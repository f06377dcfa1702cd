use sea_orm::entity::prelude::*;

use crate::domain::ResourceType;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "resources")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub county_id: i32,

    pub resource_type: ResourceType,

    pub title: String,

    pub description: Option<String>,

    pub url: Option<String>,

    /// Rich body for articles and guides.
    #[sea_orm(column_type = "Text", nullable)]
    pub content: Option<String>,

    pub thumbnail_url: Option<String>,

    /// Embed id for videos.
    pub video_id: Option<String>,

    pub file_size: Option<String>,

    pub file_type: Option<String>,

    pub display_order: i32,

    pub is_active: bool,

    pub created_at: String,
    pub created_by: String,
    pub updated_at: String,
    pub updated_by: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::counties::Entity",
        from = "Column::CountyId",
        to = "super::counties::Column::Id",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    Counties,
    #[sea_orm(has_many = "super::resource_tags::Entity")]
    ResourceTags,
}

impl Related<super::counties::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Counties.def()
    }
}

impl Related<super::resource_tags::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ResourceTags.def()
    }
}

impl Related<super::tags::Entity> for Entity {
    fn to() -> RelationDef {
        super::resource_tags::Relation::Tags.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::resource_tags::Relation::Resources.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}

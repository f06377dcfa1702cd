use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "tags")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub name: String,

    pub description: Option<String>,

    pub color: Option<String>,

    pub is_active: bool,

    pub created_at: String,
    pub created_by: String,
    pub updated_at: String,
    pub updated_by: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::resource_tags::Entity")]
    ResourceTags,
}

impl Related<super::resource_tags::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ResourceTags.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

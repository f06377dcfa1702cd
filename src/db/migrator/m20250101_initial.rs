use crate::entities::prelude::*;
use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::{EntityTrait, Schema};

#[derive(DeriveMigrationName)]
pub struct Migration;

async fn create<E: EntityTrait>(
    manager: &SchemaManager<'_>,
    schema: &Schema,
    entity: E,
) -> Result<(), DbErr> {
    manager
        .create_table(
            schema
                .create_table_from_entity(entity)
                .if_not_exists()
                .to_owned(),
        )
        .await
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();
        let schema = Schema::new(backend);

        // Parents before children so foreign keys resolve.
        create(manager, &schema, AdminUsers).await?;
        create(manager, &schema, HomeContent).await?;
        create(manager, &schema, SiteSettings).await?;
        create(manager, &schema, Counties).await?;
        create(manager, &schema, Tags).await?;
        create(manager, &schema, Resources).await?;
        create(manager, &schema, ResourceTags).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ResourceTags).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Resources).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Tags).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Counties).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SiteSettings).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(HomeContent).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AdminUsers).to_owned())
            .await?;

        Ok(())
    }
}

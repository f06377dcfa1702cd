use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_counties_display_order")
                    .table(Counties::Table)
                    .col(Counties::DisplayOrder)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_resources_county_display_order")
                    .table(Resources::Table)
                    .col(Resources::CountyId)
                    .col(Resources::DisplayOrder)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_home_content_active_updated")
                    .table(HomeContent::Table)
                    .col(HomeContent::IsActive)
                    .col(HomeContent::UpdatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_home_content_active_updated")
                    .table(HomeContent::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_resources_county_display_order")
                    .table(Resources::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_counties_display_order")
                    .table(Counties::Table)
                    .to_owned(),
            )
            .await
    }
}

#[derive(DeriveIden)]
enum Counties {
    Table,
    DisplayOrder,
}

#[derive(DeriveIden)]
enum Resources {
    Table,
    CountyId,
    DisplayOrder,
}

#[derive(DeriveIden)]
enum HomeContent {
    Table,
    IsActive,
    UpdatedAt,
}

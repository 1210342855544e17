use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(UserRegions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserRegions::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(UserRegions::UserId).integer().not_null())
                    .col(ColumnDef::new(UserRegions::RegionId).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_regions_user_id")
                            .from(UserRegions::Table, UserRegions::UserId)
                            .to(Users::Table, Users::Id)
                            .on_update(ForeignKeyAction::Cascade)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 同一用户同一区域只允许一条记录
        manager
            .create_index(
                Index::create()
                    .name("idx_user_regions_user_region")
                    .table(UserRegions::Table)
                    .col(UserRegions::UserId)
                    .col(UserRegions::RegionId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UserRegions::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum UserRegions {
    Table,
    Id,
    UserId,
    RegionId,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}

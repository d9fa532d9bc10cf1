use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_departments_table::Migration),
            Box::new(m20240101_000002_create_users_table::Migration),
            Box::new(m20240101_000003_create_assets_table::Migration),
            Box::new(m20240101_000004_create_asset_requests_table::Migration),
            Box::new(m20240101_000005_create_stock_take_tables::Migration),
        ]
    }
}

// Migration implementations

mod m20240101_000001_create_departments_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000001_create_departments_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Departments::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Departments::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Departments::Name)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(Departments::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Departments::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    pub enum Departments {
        Table,
        Id,
        Name,
        CreatedAt,
    }
}

mod m20240101_000002_create_users_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000002_create_users_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Users::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Users::Id).uuid().primary_key().not_null())
                        .col(
                            ColumnDef::new(Users::Username)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Users::FullName).string().null())
                        .col(ColumnDef::new(Users::Email).string().null())
                        .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                        .col(
                            ColumnDef::new(Users::IsAdmin)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(Users::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Users::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    pub enum Users {
        Table,
        Id,
        Username,
        FullName,
        Email,
        PasswordHash,
        IsAdmin,
        CreatedAt,
    }
}

mod m20240101_000003_create_assets_table {

    use super::m20240101_000001_create_departments_table::Departments;
    use super::m20240101_000002_create_users_table::Users;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000003_create_assets_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Assets::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Assets::Id).uuid().primary_key().not_null())
                        .col(
                            ColumnDef::new(Assets::AssetNo)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Assets::Category).text().not_null())
                        .col(ColumnDef::new(Assets::Status).text().not_null())
                        .col(ColumnDef::new(Assets::DepartmentId).uuid().not_null())
                        .col(ColumnDef::new(Assets::AssignedTo).uuid().null())
                        .col(ColumnDef::new(Assets::SerialNo).string().null())
                        .col(ColumnDef::new(Assets::PurchaseDate).date().null())
                        .col(ColumnDef::new(Assets::PurchaseCost).decimal().null())
                        .col(ColumnDef::new(Assets::Depreciation).decimal().null())
                        .col(ColumnDef::new(Assets::Supplier).string().null())
                        .col(ColumnDef::new(Assets::Warranty).string().null())
                        .col(ColumnDef::new(Assets::Condition).string().null())
                        .col(ColumnDef::new(Assets::Description).text().null())
                        .col(ColumnDef::new(Assets::ImagePath).string().null())
                        .col(
                            ColumnDef::new(Assets::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Assets::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_assets_department")
                                .from(Assets::Table, Assets::DepartmentId)
                                .to(Departments::Table, Departments::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_assets_assigned_to")
                                .from(Assets::Table, Assets::AssignedTo)
                                .to(Users::Table, Users::Id)
                                .on_delete(ForeignKeyAction::SetNull),
                        )
                        .to_owned(),
                )
                .await?;

            // Partition scan for the asset number generator
            manager
                .create_index(
                    Index::create()
                        .name("idx_assets_department_category")
                        .table(Assets::Table)
                        .col(Assets::DepartmentId)
                        .col(Assets::Category)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_assets_status")
                        .table(Assets::Table)
                        .col(Assets::Status)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Assets::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    pub enum Assets {
        Table,
        Id,
        AssetNo,
        Category,
        Status,
        DepartmentId,
        AssignedTo,
        SerialNo,
        PurchaseDate,
        PurchaseCost,
        Depreciation,
        Supplier,
        Warranty,
        Condition,
        Description,
        ImagePath,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000004_create_asset_requests_table {

    use super::m20240101_000002_create_users_table::Users;
    use super::m20240101_000003_create_assets_table::Assets;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000004_create_asset_requests_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(AssetRequests::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(AssetRequests::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(AssetRequests::AssetId).uuid().not_null())
                        .col(ColumnDef::new(AssetRequests::UserId).uuid().not_null())
                        .col(ColumnDef::new(AssetRequests::Purpose).text().null())
                        .col(ColumnDef::new(AssetRequests::Status).text().not_null())
                        .col(
                            ColumnDef::new(AssetRequests::RequestDate)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(AssetRequests::ApprovalDate)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_asset_requests_asset")
                                .from(AssetRequests::Table, AssetRequests::AssetId)
                                .to(Assets::Table, Assets::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_asset_requests_user")
                                .from(AssetRequests::Table, AssetRequests::UserId)
                                .to(Users::Table, Users::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            // Duplicate-submission guard queries by (asset, user, status)
            manager
                .create_index(
                    Index::create()
                        .name("idx_asset_requests_asset_user")
                        .table(AssetRequests::Table)
                        .col(AssetRequests::AssetId)
                        .col(AssetRequests::UserId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_asset_requests_status")
                        .table(AssetRequests::Table)
                        .col(AssetRequests::Status)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(AssetRequests::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    pub enum AssetRequests {
        Table,
        Id,
        AssetId,
        UserId,
        Purpose,
        Status,
        RequestDate,
        ApprovalDate,
    }
}

mod m20240101_000005_create_stock_take_tables {

    use super::m20240101_000001_create_departments_table::Departments;
    use super::m20240101_000002_create_users_table::Users;
    use super::m20240101_000003_create_assets_table::Assets;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000005_create_stock_take_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(StockTakes::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(StockTakes::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(StockTakes::DepartmentId).uuid().not_null())
                        .col(ColumnDef::new(StockTakes::Status).text().not_null())
                        .col(ColumnDef::new(StockTakes::Notes).text().null())
                        .col(ColumnDef::new(StockTakes::CreatedBy).uuid().not_null())
                        .col(
                            ColumnDef::new(StockTakes::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockTakes::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_stock_takes_department")
                                .from(StockTakes::Table, StockTakes::DepartmentId)
                                .to(Departments::Table, Departments::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_stock_takes_creator")
                                .from(StockTakes::Table, StockTakes::CreatedBy)
                                .to(Users::Table, Users::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(StockTakeItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(StockTakeItems::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockTakeItems::StockTakeId)
                                .uuid()
                                .not_null(),
                        )
                        .col(ColumnDef::new(StockTakeItems::AssetId).uuid().not_null())
                        .col(
                            ColumnDef::new(StockTakeItems::ExpectedQuantity)
                                .integer()
                                .not_null()
                                .default(1),
                        )
                        .col(
                            ColumnDef::new(StockTakeItems::ActualQuantity)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(StockTakeItems::Counted)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(ColumnDef::new(StockTakeItems::Notes).text().null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_stock_take_items_stock_take")
                                .from(StockTakeItems::Table, StockTakeItems::StockTakeId)
                                .to(StockTakes::Table, StockTakes::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_stock_take_items_asset")
                                .from(StockTakeItems::Table, StockTakeItems::AssetId)
                                .to(Assets::Table, Assets::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_stock_take_items_stock_take")
                        .table(StockTakeItems::Table)
                        .col(StockTakeItems::StockTakeId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(StockTakeItems::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(StockTakes::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    pub enum StockTakes {
        Table,
        Id,
        DepartmentId,
        Status,
        Notes,
        CreatedBy,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(Iden)]
    pub enum StockTakeItems {
        Table,
        Id,
        StockTakeId,
        AssetId,
        ExpectedQuantity,
        ActualQuantity,
        Counted,
        Notes,
    }
}

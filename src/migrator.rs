use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_master_data_tables::Migration),
            Box::new(m20250301_000002_create_inventory_records_table::Migration),
            Box::new(m20250301_000003_create_stock_movements_table::Migration),
            Box::new(m20250301_000004_create_allocations_table::Migration),
            Box::new(m20250301_000005_create_monthly_snapshots_table::Migration),
        ]
    }
}

mod m20250301_000001_create_master_data_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000001_create_master_data_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Items::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Items::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(Items::ItemCode)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Items::Name).string().not_null())
                        .col(ColumnDef::new(Items::Description).string().null())
                        .col(ColumnDef::new(Items::CreatedAt).timestamp_with_time_zone().not_null())
                        .col(ColumnDef::new(Items::UpdatedAt).timestamp_with_time_zone().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Units::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Units::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Units::Name).string().not_null().unique_key())
                        .col(
                            ColumnDef::new(Units::ConversionRate)
                                .decimal_len(16, 4)
                                .not_null()
                                .default(1),
                        )
                        .col(ColumnDef::new(Units::CreatedAt).timestamp_with_time_zone().not_null())
                        .col(ColumnDef::new(Units::UpdatedAt).timestamp_with_time_zone().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Warehouses::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Warehouses::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(Warehouses::Name)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Warehouses::Location).string().null())
                        .col(ColumnDef::new(Warehouses::CreatedAt).timestamp_with_time_zone().not_null())
                        .col(ColumnDef::new(Warehouses::UpdatedAt).timestamp_with_time_zone().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Lots::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Lots::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(Lots::LotNumber)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Lots::ItemId).big_integer().not_null())
                        .col(ColumnDef::new(Lots::ProductionDate).date().not_null())
                        .col(ColumnDef::new(Lots::CreatedAt).timestamp_with_time_zone().not_null())
                        .col(ColumnDef::new(Lots::UpdatedAt).timestamp_with_time_zone().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_lots_item_id")
                        .table(Lots::Table)
                        .col(Lots::ItemId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_lots_production_date")
                        .table(Lots::Table)
                        .col(Lots::ProductionDate)
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Lots::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Warehouses::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Units::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Items::Table).to_owned())
                .await?;
            Ok(())
        }
    }

    #[derive(Iden)]
    enum Items {
        Table,
        Id,
        ItemCode,
        Name,
        Description,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(Iden)]
    enum Units {
        Table,
        Id,
        Name,
        ConversionRate,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(Iden)]
    enum Warehouses {
        Table,
        Id,
        Name,
        Location,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(Iden)]
    enum Lots {
        Table,
        Id,
        LotNumber,
        ItemId,
        ProductionDate,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20250301_000002_create_inventory_records_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000002_create_inventory_records_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(InventoryRecords::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(InventoryRecords::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(InventoryRecords::LotId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryRecords::WarehouseId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryRecords::UnitId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryRecords::Quantity)
                                .decimal_len(16, 4)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(InventoryRecords::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryRecords::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            // One stock bucket per ledger key
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("uq_inventory_records_ledger_key")
                        .table(InventoryRecords::Table)
                        .col(InventoryRecords::LotId)
                        .col(InventoryRecords::WarehouseId)
                        .col(InventoryRecords::UnitId)
                        .unique()
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(InventoryRecords::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum InventoryRecords {
        Table,
        Id,
        LotId,
        WarehouseId,
        UnitId,
        Quantity,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20250301_000003_create_stock_movements_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000003_create_stock_movements_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(StockMovements::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(StockMovements::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(StockMovements::MovementType)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockMovements::LotId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockMovements::WarehouseId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockMovements::UnitId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockMovements::Quantity)
                                .decimal_len(16, 4)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockMovements::OccurredAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockMovements::ReferenceNumber)
                                .string()
                                .null(),
                        )
                        .col(ColumnDef::new(StockMovements::BarcodeData).string().null())
                        .col(
                            ColumnDef::new(StockMovements::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_stock_movements_ledger_key")
                        .table(StockMovements::Table)
                        .col(StockMovements::LotId)
                        .col(StockMovements::WarehouseId)
                        .col(StockMovements::UnitId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_stock_movements_occurred_at")
                        .table(StockMovements::Table)
                        .col(StockMovements::OccurredAt)
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(StockMovements::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum StockMovements {
        Table,
        Id,
        MovementType,
        LotId,
        WarehouseId,
        UnitId,
        Quantity,
        OccurredAt,
        ReferenceNumber,
        BarcodeData,
        CreatedAt,
    }
}

mod m20250301_000004_create_allocations_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000004_create_allocations_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Allocations::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Allocations::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Allocations::LotId).big_integer().not_null())
                        .col(
                            ColumnDef::new(Allocations::WarehouseId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Allocations::UnitId).big_integer().not_null())
                        .col(
                            ColumnDef::new(Allocations::Quantity)
                                .decimal_len(16, 4)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Allocations::AllocationDate)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Allocations::ReferenceNumber)
                                .string()
                                .null(),
                        )
                        .col(ColumnDef::new(Allocations::CreatedAt).timestamp_with_time_zone().not_null())
                        .col(ColumnDef::new(Allocations::UpdatedAt).timestamp_with_time_zone().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_allocations_ledger_key")
                        .table(Allocations::Table)
                        .col(Allocations::LotId)
                        .col(Allocations::WarehouseId)
                        .col(Allocations::UnitId)
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Allocations::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum Allocations {
        Table,
        Id,
        LotId,
        WarehouseId,
        UnitId,
        Quantity,
        AllocationDate,
        ReferenceNumber,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20250301_000005_create_monthly_snapshots_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000005_create_monthly_snapshots_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(MonthlySnapshots::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(MonthlySnapshots::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(MonthlySnapshots::ItemId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(MonthlySnapshots::LotId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(MonthlySnapshots::WarehouseId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(MonthlySnapshots::UnitId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(MonthlySnapshots::Month).date().not_null())
                        .col(
                            ColumnDef::new(MonthlySnapshots::OpeningQuantity)
                                .decimal_len(16, 4)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(MonthlySnapshots::IncomingQuantity)
                                .decimal_len(16, 4)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(MonthlySnapshots::OutgoingQuantity)
                                .decimal_len(16, 4)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(MonthlySnapshots::ClosingQuantity)
                                .decimal_len(16, 4)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(MonthlySnapshots::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("uq_monthly_snapshots_key_month")
                        .table(MonthlySnapshots::Table)
                        .col(MonthlySnapshots::ItemId)
                        .col(MonthlySnapshots::LotId)
                        .col(MonthlySnapshots::WarehouseId)
                        .col(MonthlySnapshots::UnitId)
                        .col(MonthlySnapshots::Month)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_monthly_snapshots_month")
                        .table(MonthlySnapshots::Table)
                        .col(MonthlySnapshots::Month)
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(MonthlySnapshots::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum MonthlySnapshots {
        Table,
        Id,
        ItemId,
        LotId,
        WarehouseId,
        UnitId,
        Month,
        OpeningQuantity,
        IncomingQuantity,
        OutgoingQuantity,
        ClosingQuantity,
        CreatedAt,
    }
}

use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240301_000001_create_products_table::Migration),
            Box::new(m20240301_000002_create_sale_order_tables::Migration),
            Box::new(m20240301_000003_create_purchase_order_tables::Migration),
            Box::new(m20240301_000004_create_inventory_units_table::Migration),
            Box::new(m20240301_000005_create_adjustment_tables::Migration),
            Box::new(m20240301_000006_create_preorder_reservations_table::Migration),
            Box::new(m20240301_000007_create_job_runs_table::Migration),
        ]
    }
}

mod m20240301_000001_create_products_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000001_create_products_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Products::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Products::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Products::Name).string().not_null())
                        .col(ColumnDef::new(Products::Sku).string().not_null().unique_key())
                        .col(ColumnDef::new(Products::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Products::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Products::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Products {
        Table,
        Id,
        Name,
        Sku,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240301_000002_create_sale_order_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000002_create_sale_order_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(SaleOrders::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(SaleOrders::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(SaleOrders::UserId).uuid().not_null())
                        .col(ColumnDef::new(SaleOrders::Status).string().not_null())
                        .col(
                            ColumnDef::new(SaleOrders::TotalAmount)
                                .decimal_len(16, 4)
                                .not_null(),
                        )
                        .col(ColumnDef::new(SaleOrders::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(SaleOrders::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(SaleOrderLines::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(SaleOrderLines::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(SaleOrderLines::SaleOrderId).uuid().not_null())
                        .col(ColumnDef::new(SaleOrderLines::ProductId).uuid().not_null())
                        .col(ColumnDef::new(SaleOrderLines::Quantity).integer().not_null())
                        .col(
                            ColumnDef::new(SaleOrderLines::UnitPrice)
                                .decimal_len(16, 4)
                                .null(),
                        )
                        .col(
                            ColumnDef::new(SaleOrderLines::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(ColumnDef::new(SaleOrderLines::UpdatedAt).timestamp().null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_sale_order_lines_order")
                                .from(SaleOrderLines::Table, SaleOrderLines::SaleOrderId)
                                .to(SaleOrders::Table, SaleOrders::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Payments::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Payments::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Payments::SaleOrderId).uuid().not_null())
                        .col(
                            ColumnDef::new(Payments::Amount)
                                .decimal_len(16, 4)
                                .not_null(),
                        )
                        .col(ColumnDef::new(Payments::Status).string().not_null())
                        .col(ColumnDef::new(Payments::PaidAt).timestamp().null())
                        .col(ColumnDef::new(Payments::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Payments::UpdatedAt).timestamp().null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_payments_order")
                                .from(Payments::Table, Payments::SaleOrderId)
                                .to(SaleOrders::Table, SaleOrders::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Shipments::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Shipments::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Shipments::SaleOrderId).uuid().not_null())
                        .col(ColumnDef::new(Shipments::Status).string().not_null())
                        .col(ColumnDef::new(Shipments::TrackingNumber).string().null())
                        .col(ColumnDef::new(Shipments::ShippedAt).timestamp().null())
                        .col(ColumnDef::new(Shipments::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Shipments::UpdatedAt).timestamp().null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_shipments_order")
                                .from(Shipments::Table, Shipments::SaleOrderId)
                                .to(SaleOrders::Table, SaleOrders::Id),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Shipments::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Payments::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(SaleOrderLines::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(SaleOrders::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum SaleOrders {
        Table,
        Id,
        UserId,
        Status,
        TotalAmount,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum SaleOrderLines {
        Table,
        Id,
        SaleOrderId,
        ProductId,
        Quantity,
        UnitPrice,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum Payments {
        Table,
        Id,
        SaleOrderId,
        Amount,
        Status,
        PaidAt,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum Shipments {
        Table,
        Id,
        SaleOrderId,
        Status,
        TrackingNumber,
        ShippedAt,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240301_000003_create_purchase_order_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000003_create_purchase_order_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(PurchaseOrders::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(PurchaseOrders::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrders::Reference)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(PurchaseOrders::SupplierName).string().null())
                        .col(ColumnDef::new(PurchaseOrders::Status).string().not_null())
                        .col(ColumnDef::new(PurchaseOrders::OrderedAt).timestamp().null())
                        .col(
                            ColumnDef::new(PurchaseOrders::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(ColumnDef::new(PurchaseOrders::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(PurchaseOrderLines::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(PurchaseOrderLines::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrderLines::PurchaseOrderId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrderLines::ProductId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrderLines::Quantity)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrderLines::UnitCost)
                                .decimal_len(16, 4)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrderLines::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrderLines::UpdatedAt)
                                .timestamp()
                                .null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_purchase_order_lines_po")
                                .from(
                                    PurchaseOrderLines::Table,
                                    PurchaseOrderLines::PurchaseOrderId,
                                )
                                .to(PurchaseOrders::Table, PurchaseOrders::Id),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(PurchaseOrderLines::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(PurchaseOrders::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum PurchaseOrders {
        Table,
        Id,
        Reference,
        SupplierName,
        Status,
        OrderedAt,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum PurchaseOrderLines {
        Table,
        Id,
        PurchaseOrderId,
        ProductId,
        Quantity,
        UnitCost,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240301_000004_create_inventory_units_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000004_create_inventory_units_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(InventoryUnits::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(InventoryUnits::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(InventoryUnits::ProductId).uuid().not_null())
                        .col(
                            ColumnDef::new(InventoryUnits::PurchaseOrderId)
                                .uuid()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(InventoryUnits::PurchaseOrderLineId)
                                .uuid()
                                .null(),
                        )
                        .col(ColumnDef::new(InventoryUnits::SaleOrderId).uuid().null())
                        .col(
                            ColumnDef::new(InventoryUnits::SaleOrderLineId)
                                .uuid()
                                .null(),
                        )
                        .col(ColumnDef::new(InventoryUnits::Status).string().not_null())
                        .col(
                            ColumnDef::new(InventoryUnits::ItemCondition)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryUnits::PurchaseCost)
                                .decimal_len(16, 4)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryUnits::SoldPrice)
                                .decimal_len(16, 4)
                                .null(),
                        )
                        .col(ColumnDef::new(InventoryUnits::LocationId).uuid().null())
                        .col(
                            ColumnDef::new(InventoryUnits::StatusChangedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryUnits::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(ColumnDef::new(InventoryUnits::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_inventory_units_product_status")
                        .table(InventoryUnits::Table)
                        .col(InventoryUnits::ProductId)
                        .col(InventoryUnits::Status)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_inventory_units_sale_order_line")
                        .table(InventoryUnits::Table)
                        .col(InventoryUnits::SaleOrderLineId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_inventory_units_purchase_order_line")
                        .table(InventoryUnits::Table)
                        .col(InventoryUnits::PurchaseOrderLineId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(InventoryUnits::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum InventoryUnits {
        Table,
        Id,
        ProductId,
        PurchaseOrderId,
        PurchaseOrderLineId,
        SaleOrderId,
        SaleOrderLineId,
        Status,
        ItemCondition,
        PurchaseCost,
        SoldPrice,
        LocationId,
        StatusChangedAt,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240301_000005_create_adjustment_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000005_create_adjustment_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(InventoryAdjustments::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(InventoryAdjustments::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryAdjustments::Status)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryAdjustments::AdjustmentType)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryAdjustments::Reference)
                                .string()
                                .null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(InventoryAdjustments::Note).string().null())
                        .col(
                            ColumnDef::new(InventoryAdjustments::AppliedAt)
                                .timestamp()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(InventoryAdjustments::AppliedBy)
                                .uuid()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(InventoryAdjustments::ReversedAt)
                                .timestamp()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(InventoryAdjustments::ReversedBy)
                                .uuid()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(InventoryAdjustments::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryAdjustments::UpdatedAt)
                                .timestamp()
                                .null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(InventoryAdjustmentLines::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(InventoryAdjustmentLines::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryAdjustmentLines::AdjustmentId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryAdjustmentLines::Direction)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryAdjustmentLines::Quantity)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryAdjustmentLines::ProductId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryAdjustmentLines::ItemCondition)
                                .string()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(InventoryAdjustmentLines::UnitCost)
                                .decimal_len(16, 4)
                                .null(),
                        )
                        .col(
                            ColumnDef::new(InventoryAdjustmentLines::SellingPrice)
                                .decimal_len(16, 4)
                                .null(),
                        )
                        .col(
                            ColumnDef::new(InventoryAdjustmentLines::Reason)
                                .string()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(InventoryAdjustmentLines::Note)
                                .string()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(InventoryAdjustmentLines::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryAdjustmentLines::UpdatedAt)
                                .timestamp()
                                .null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_adjustment_lines_adjustment")
                                .from(
                                    InventoryAdjustmentLines::Table,
                                    InventoryAdjustmentLines::AdjustmentId,
                                )
                                .to(InventoryAdjustments::Table, InventoryAdjustments::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(InventoryAdjustmentEntries::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(InventoryAdjustmentEntries::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(InventoryAdjustmentEntries::AdjustmentId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryAdjustmentEntries::LineId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryAdjustmentEntries::InventoryUnitId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryAdjustmentEntries::Action)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryAdjustmentEntries::PreviousStatus)
                                .string()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(InventoryAdjustmentEntries::NewStatus)
                                .string()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(InventoryAdjustmentEntries::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_adjustment_entries_adjustment")
                                .from(
                                    InventoryAdjustmentEntries::Table,
                                    InventoryAdjustmentEntries::AdjustmentId,
                                )
                                .to(InventoryAdjustments::Table, InventoryAdjustments::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_adjustment_entries_adjustment")
                        .table(InventoryAdjustmentEntries::Table)
                        .col(InventoryAdjustmentEntries::AdjustmentId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(
                    Table::drop()
                        .table(InventoryAdjustmentEntries::Table)
                        .to_owned(),
                )
                .await?;
            manager
                .drop_table(
                    Table::drop()
                        .table(InventoryAdjustmentLines::Table)
                        .to_owned(),
                )
                .await?;
            manager
                .drop_table(Table::drop().table(InventoryAdjustments::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum InventoryAdjustments {
        Table,
        Id,
        Status,
        AdjustmentType,
        Reference,
        Note,
        AppliedAt,
        AppliedBy,
        ReversedAt,
        ReversedBy,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum InventoryAdjustmentLines {
        Table,
        Id,
        AdjustmentId,
        Direction,
        Quantity,
        ProductId,
        ItemCondition,
        UnitCost,
        SellingPrice,
        Reason,
        Note,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum InventoryAdjustmentEntries {
        Table,
        Id,
        AdjustmentId,
        LineId,
        InventoryUnitId,
        Action,
        PreviousStatus,
        NewStatus,
        CreatedAt,
    }
}

mod m20240301_000006_create_preorder_reservations_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000006_create_preorder_reservations_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(PreorderReservations::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(PreorderReservations::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PreorderReservations::ProductId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PreorderReservations::UserId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PreorderReservations::SaleOrderId)
                                .uuid()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(PreorderReservations::SaleOrderLineId)
                                .uuid()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(PreorderReservations::Status)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PreorderReservations::Quantity)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PreorderReservations::ReservedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PreorderReservations::AssignedAt)
                                .timestamp()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(PreorderReservations::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PreorderReservations::UpdatedAt)
                                .timestamp()
                                .null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_preorder_reservations_fifo")
                        .table(PreorderReservations::Table)
                        .col(PreorderReservations::ProductId)
                        .col(PreorderReservations::Status)
                        .col(PreorderReservations::ReservedAt)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(PreorderReservations::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum PreorderReservations {
        Table,
        Id,
        ProductId,
        UserId,
        SaleOrderId,
        SaleOrderLineId,
        Status,
        Quantity,
        ReservedAt,
        AssignedAt,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240301_000007_create_job_runs_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000007_create_job_runs_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(JobRuns::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(JobRuns::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(JobRuns::JobName).string().not_null())
                        .col(ColumnDef::new(JobRuns::Status).string().not_null())
                        .col(ColumnDef::new(JobRuns::Stats).text().null())
                        .col(ColumnDef::new(JobRuns::Error).text().null())
                        .col(ColumnDef::new(JobRuns::StartedAt).timestamp().null())
                        .col(ColumnDef::new(JobRuns::FinishedAt).timestamp().null())
                        .col(ColumnDef::new(JobRuns::CreatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(JobRuns::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum JobRuns {
        Table,
        Id,
        JobName,
        Status,
        Stats,
        StartedAt,
        FinishedAt,
        Error,
        CreatedAt,
    }
}

use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240301_000001_create_master_data_tables::Migration),
            Box::new(m20240301_000002_create_inventory_balances_table::Migration),
            Box::new(m20240301_000003_create_relief_package_tables::Migration),
            Box::new(m20240301_000004_create_event_and_request_tables::Migration),
        ]
    }
}

/// Audit columns carried by every mutable table.
#[derive(DeriveIden)]
enum Audit {
    CreateById,
    CreateDtime,
    UpdateById,
    UpdateDtime,
    VersionNbr,
}

fn with_audit_columns(table: &mut TableCreateStatement) -> &mut TableCreateStatement {
    table
        .col(ColumnDef::new(Audit::CreateById).string_len(64).not_null())
        .col(
            ColumnDef::new(Audit::CreateDtime)
                .timestamp_with_time_zone()
                .not_null(),
        )
        .col(ColumnDef::new(Audit::UpdateById).string_len(64).not_null())
        .col(
            ColumnDef::new(Audit::UpdateDtime)
                .timestamp_with_time_zone()
                .not_null(),
        )
        .col(
            ColumnDef::new(Audit::VersionNbr)
                .integer()
                .not_null()
                .default(1),
        )
        .check(Expr::cust("version_nbr >= 1"))
}

mod m20240301_000001_create_master_data_tables {
    use super::with_audit_columns;
    use crate::rules::agency_warehouse_check_sql;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000001_create_master_data_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            let mut warehouses = Table::create();
            warehouses
                .table(Warehouses::Table)
                .if_not_exists()
                .col(
                    ColumnDef::new(Warehouses::Id)
                        .uuid()
                        .primary_key()
                        .not_null(),
                )
                .col(
                    ColumnDef::new(Warehouses::WarehouseName)
                        .string_len(120)
                        .not_null()
                        .unique_key(),
                )
                .col(
                    ColumnDef::new(Warehouses::WarehouseType)
                        .string_len(32)
                        .not_null(),
                )
                .col(ColumnDef::new(Warehouses::PhoneNo).string_len(32).null())
                .col(
                    ColumnDef::new(Warehouses::StatusCode)
                        .string_len(1)
                        .not_null()
                        .default("A"),
                )
                .check(Expr::cust("status_code IN ('A', 'I')"));
            manager
                .create_table(with_audit_columns(&mut warehouses).to_owned())
                .await?;

            let mut items = Table::create();
            items
                .table(Items::Table)
                .if_not_exists()
                .col(ColumnDef::new(Items::Id).uuid().primary_key().not_null())
                .col(ColumnDef::new(Items::ItemName).string_len(120).not_null())
                .col(
                    ColumnDef::new(Items::SkuCode)
                        .string_len(40)
                        .not_null()
                        .unique_key(),
                )
                .col(ColumnDef::new(Items::ItemDesc).text().null())
                .col(
                    ColumnDef::new(Items::ReorderQty)
                        .big_integer()
                        .not_null()
                        .default(0),
                )
                .col(
                    ColumnDef::new(Items::StatusCode)
                        .string_len(1)
                        .not_null()
                        .default("A"),
                )
                .check(Expr::cust("reorder_qty >= 0"))
                .check(Expr::cust("status_code IN ('A', 'I')"));
            manager
                .create_table(with_audit_columns(&mut items).to_owned())
                .await?;

            let mut agencies = Table::create();
            agencies
                .table(Agencies::Table)
                .if_not_exists()
                .col(ColumnDef::new(Agencies::Id).uuid().primary_key().not_null())
                .col(
                    ColumnDef::new(Agencies::AgencyName)
                        .string_len(120)
                        .not_null()
                        .unique_key(),
                )
                .col(
                    ColumnDef::new(Agencies::AgencyType)
                        .string_len(16)
                        .not_null(),
                )
                .col(ColumnDef::new(Agencies::WarehouseId).uuid().null())
                .col(ColumnDef::new(Agencies::ContactName).string_len(120).null())
                .col(ColumnDef::new(Agencies::PhoneNo).string_len(32).null())
                .col(ColumnDef::new(Agencies::EmailText).string_len(254).null())
                .col(
                    ColumnDef::new(Agencies::StatusCode)
                        .string_len(1)
                        .not_null()
                        .default("A"),
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_agencies_warehouse_id")
                        .from(Agencies::Table, Agencies::WarehouseId)
                        .to(Warehouses::Table, Warehouses::Id)
                        .on_delete(ForeignKeyAction::Restrict),
                )
                .check(Expr::cust(agency_warehouse_check_sql()))
                .check(Expr::cust("status_code IN ('A', 'I')"));
            manager
                .create_table(with_audit_columns(&mut agencies).to_owned())
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_agencies_warehouse_id")
                        .table(Agencies::Table)
                        .col(Agencies::WarehouseId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Agencies::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Items::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Warehouses::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(crate) enum Warehouses {
        Table,
        Id,
        WarehouseName,
        WarehouseType,
        PhoneNo,
        StatusCode,
    }

    #[derive(DeriveIden)]
    pub(crate) enum Items {
        Table,
        Id,
        ItemName,
        SkuCode,
        ItemDesc,
        ReorderQty,
        StatusCode,
    }

    #[derive(DeriveIden)]
    pub(crate) enum Agencies {
        Table,
        Id,
        AgencyName,
        AgencyType,
        WarehouseId,
        ContactName,
        PhoneNo,
        EmailText,
        StatusCode,
    }
}

mod m20240301_000002_create_inventory_balances_table {
    use super::m20240301_000001_create_master_data_tables::{Items, Warehouses};
    use super::with_audit_columns;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000002_create_inventory_balances_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            let mut balances = Table::create();
            balances
                .table(InventoryBalances::Table)
                .if_not_exists()
                .col(
                    ColumnDef::new(InventoryBalances::Id)
                        .uuid()
                        .primary_key()
                        .not_null(),
                )
                .col(
                    ColumnDef::new(InventoryBalances::WarehouseId)
                        .uuid()
                        .not_null(),
                )
                .col(ColumnDef::new(InventoryBalances::ItemId).uuid().not_null())
                .col(
                    ColumnDef::new(InventoryBalances::UsableQty)
                        .big_integer()
                        .not_null()
                        .default(0),
                )
                .col(
                    ColumnDef::new(InventoryBalances::ReservedQty)
                        .big_integer()
                        .not_null()
                        .default(0),
                )
                .col(
                    ColumnDef::new(InventoryBalances::DefectiveQty)
                        .big_integer()
                        .not_null()
                        .default(0),
                )
                .col(
                    ColumnDef::new(InventoryBalances::ExpiredQty)
                        .big_integer()
                        .not_null()
                        .default(0),
                )
                .col(
                    ColumnDef::new(InventoryBalances::StatusCode)
                        .string_len(1)
                        .not_null()
                        .default("A"),
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_inventory_balances_warehouse_id")
                        .from(InventoryBalances::Table, InventoryBalances::WarehouseId)
                        .to(Warehouses::Table, Warehouses::Id)
                        .on_delete(ForeignKeyAction::Restrict),
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_inventory_balances_item_id")
                        .from(InventoryBalances::Table, InventoryBalances::ItemId)
                        .to(Items::Table, Items::Id)
                        .on_delete(ForeignKeyAction::Restrict),
                )
                .check(Expr::cust(
                    "usable_qty >= 0 AND reserved_qty >= 0 AND defective_qty >= 0 AND expired_qty >= 0",
                ))
                .check(Expr::cust("reserved_qty <= usable_qty"))
                .check(Expr::cust("status_code IN ('A', 'U')"));
            manager
                .create_table(with_audit_columns(&mut balances).to_owned())
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_inventory_balances_warehouse_item")
                        .table(InventoryBalances::Table)
                        .col(InventoryBalances::WarehouseId)
                        .col(InventoryBalances::ItemId)
                        .unique()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(InventoryBalances::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(crate) enum InventoryBalances {
        Table,
        Id,
        WarehouseId,
        ItemId,
        UsableQty,
        ReservedQty,
        DefectiveQty,
        ExpiredQty,
        StatusCode,
    }
}

mod m20240301_000003_create_relief_package_tables {
    use super::m20240301_000001_create_master_data_tables::{Agencies, Items, Warehouses};
    use super::m20240301_000002_create_inventory_balances_table::InventoryBalances;
    use super::with_audit_columns;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000003_create_relief_package_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            let mut packages = Table::create();
            packages
                .table(ReliefPackages::Table)
                .if_not_exists()
                .col(
                    ColumnDef::new(ReliefPackages::Id)
                        .uuid()
                        .primary_key()
                        .not_null(),
                )
                .col(ColumnDef::new(ReliefPackages::AgencyId).uuid().not_null())
                .col(
                    ColumnDef::new(ReliefPackages::WarehouseId)
                        .uuid()
                        .not_null(),
                )
                .col(
                    ColumnDef::new(ReliefPackages::StatusCode)
                        .string_len(12)
                        .not_null()
                        .default("DRAFT"),
                )
                .col(ColumnDef::new(ReliefPackages::VerifyById).string_len(64).null())
                .col(
                    ColumnDef::new(ReliefPackages::VerifyDtime)
                        .timestamp_with_time_zone()
                        .null(),
                )
                .col(
                    ColumnDef::new(ReliefPackages::DispatchById)
                        .string_len(64)
                        .null(),
                )
                .col(
                    ColumnDef::new(ReliefPackages::DispatchDtime)
                        .timestamp_with_time_zone()
                        .null(),
                )
                .col(ColumnDef::new(ReliefPackages::CommentsText).text().null())
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_relief_packages_agency_id")
                        .from(ReliefPackages::Table, ReliefPackages::AgencyId)
                        .to(Agencies::Table, Agencies::Id)
                        .on_delete(ForeignKeyAction::Restrict),
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_relief_packages_warehouse_id")
                        .from(ReliefPackages::Table, ReliefPackages::WarehouseId)
                        .to(Warehouses::Table, Warehouses::Id)
                        .on_delete(ForeignKeyAction::Restrict),
                )
                .check(Expr::cust(
                    "status_code IN ('DRAFT', 'VERIFIED', 'DISPATCHED', 'CANCELLED')",
                ))
                .check(Expr::cust(
                    "status_code <> 'DISPATCHED' OR dispatch_dtime IS NOT NULL",
                ));
            manager
                .create_table(with_audit_columns(&mut packages).to_owned())
                .await?;

            let mut package_items = Table::create();
            package_items
                .table(ReliefPackageItems::Table)
                .if_not_exists()
                .col(
                    ColumnDef::new(ReliefPackageItems::Id)
                        .uuid()
                        .primary_key()
                        .not_null(),
                )
                .col(
                    ColumnDef::new(ReliefPackageItems::PackageId)
                        .uuid()
                        .not_null(),
                )
                .col(ColumnDef::new(ReliefPackageItems::ItemId).uuid().not_null())
                .col(
                    ColumnDef::new(ReliefPackageItems::ItemQty)
                        .big_integer()
                        .not_null(),
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_relief_package_items_package_id")
                        .from(ReliefPackageItems::Table, ReliefPackageItems::PackageId)
                        .to(ReliefPackages::Table, ReliefPackages::Id)
                        .on_delete(ForeignKeyAction::Cascade),
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_relief_package_items_item_id")
                        .from(ReliefPackageItems::Table, ReliefPackageItems::ItemId)
                        .to(Items::Table, Items::Id)
                        .on_delete(ForeignKeyAction::Restrict),
                )
                .check(Expr::cust("item_qty > 0"));
            manager
                .create_table(with_audit_columns(&mut package_items).to_owned())
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_relief_package_items_package_item")
                        .table(ReliefPackageItems::Table)
                        .col(ReliefPackageItems::PackageId)
                        .col(ReliefPackageItems::ItemId)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(InventoryReservations::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(InventoryReservations::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryReservations::PackageItemId)
                                .uuid()
                                .not_null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(InventoryReservations::InventoryId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryReservations::ReservedQty)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryReservations::CreateById)
                                .string_len(64)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryReservations::CreateDtime)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_inventory_reservations_package_item_id")
                                .from(
                                    InventoryReservations::Table,
                                    InventoryReservations::PackageItemId,
                                )
                                .to(ReliefPackageItems::Table, ReliefPackageItems::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_inventory_reservations_inventory_id")
                                .from(
                                    InventoryReservations::Table,
                                    InventoryReservations::InventoryId,
                                )
                                .to(InventoryBalances::Table, InventoryBalances::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .check(Expr::cust("reserved_qty > 0"))
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_inventory_reservations_inventory_id")
                        .table(InventoryReservations::Table)
                        .col(InventoryReservations::InventoryId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(InventoryReservations::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(ReliefPackageItems::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(ReliefPackages::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum ReliefPackages {
        Table,
        Id,
        AgencyId,
        WarehouseId,
        StatusCode,
        VerifyById,
        VerifyDtime,
        DispatchById,
        DispatchDtime,
        CommentsText,
    }

    #[derive(DeriveIden)]
    enum ReliefPackageItems {
        Table,
        Id,
        PackageId,
        ItemId,
        ItemQty,
    }

    #[derive(DeriveIden)]
    enum InventoryReservations {
        Table,
        Id,
        PackageItemId,
        InventoryId,
        ReservedQty,
        CreateById,
        CreateDtime,
    }
}

mod m20240301_000004_create_event_and_request_tables {
    use super::m20240301_000001_create_master_data_tables::{Agencies, Items};
    use super::with_audit_columns;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000004_create_event_and_request_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            let mut events = Table::create();
            events
                .table(DisasterEvents::Table)
                .if_not_exists()
                .col(
                    ColumnDef::new(DisasterEvents::Id)
                        .uuid()
                        .primary_key()
                        .not_null(),
                )
                .col(
                    ColumnDef::new(DisasterEvents::EventName)
                        .string_len(60)
                        .not_null()
                        .unique_key(),
                )
                .col(
                    ColumnDef::new(DisasterEvents::EventType)
                        .string_len(16)
                        .not_null(),
                )
                .col(ColumnDef::new(DisasterEvents::StartDate).date().not_null())
                .col(ColumnDef::new(DisasterEvents::EventDesc).text().not_null())
                .col(ColumnDef::new(DisasterEvents::ImpactDesc).text().null())
                .col(
                    ColumnDef::new(DisasterEvents::StatusCode)
                        .string_len(1)
                        .not_null()
                        .default("A"),
                )
                .col(ColumnDef::new(DisasterEvents::ClosedDate).date().null())
                .col(ColumnDef::new(DisasterEvents::ReasonDesc).string_len(255).null())
                .check(Expr::cust(
                    "event_type IN ('STORM', 'TORNADO', 'FLOOD', 'TSUNAMI', 'FIRE', 'EARTHQUAKE', 'WAR', 'EPIDEMIC')",
                ))
                .check(Expr::cust("status_code IN ('A', 'C')"))
                .check(Expr::cust(
                    "(status_code = 'A' AND closed_date IS NULL) OR (status_code = 'C' AND closed_date IS NOT NULL)",
                ));
            manager
                .create_table(with_audit_columns(&mut events).to_owned())
                .await?;

            let mut requests = Table::create();
            requests
                .table(ReliefRequests::Table)
                .if_not_exists()
                .col(
                    ColumnDef::new(ReliefRequests::Id)
                        .uuid()
                        .primary_key()
                        .not_null(),
                )
                .col(ColumnDef::new(ReliefRequests::AgencyId).uuid().not_null())
                .col(ColumnDef::new(ReliefRequests::EventId).uuid().null())
                .col(ColumnDef::new(ReliefRequests::RequestDate).date().not_null())
                .col(
                    ColumnDef::new(ReliefRequests::UrgencyInd)
                        .string_len(1)
                        .not_null(),
                )
                .col(
                    ColumnDef::new(ReliefRequests::StatusCode)
                        .integer()
                        .not_null()
                        .default(0),
                )
                .col(ColumnDef::new(ReliefRequests::ReviewById).string_len(64).null())
                .col(
                    ColumnDef::new(ReliefRequests::ReviewDtime)
                        .timestamp_with_time_zone()
                        .null(),
                )
                .col(
                    ColumnDef::new(ReliefRequests::StatusReasonDesc)
                        .string_len(255)
                        .null(),
                )
                .col(ColumnDef::new(ReliefRequests::CommentsText).text().null())
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_relief_requests_agency_id")
                        .from(ReliefRequests::Table, ReliefRequests::AgencyId)
                        .to(Agencies::Table, Agencies::Id)
                        .on_delete(ForeignKeyAction::Restrict),
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_relief_requests_event_id")
                        .from(ReliefRequests::Table, ReliefRequests::EventId)
                        .to(DisasterEvents::Table, DisasterEvents::Id)
                        .on_delete(ForeignKeyAction::Restrict),
                )
                .check(Expr::cust("urgency_ind IN ('L', 'M', 'H', 'C')"))
                .check(Expr::cust("status_code BETWEEN 0 AND 7"));
            manager
                .create_table(with_audit_columns(&mut requests).to_owned())
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_relief_requests_agency_id")
                        .table(ReliefRequests::Table)
                        .col(ReliefRequests::AgencyId)
                        .to_owned(),
                )
                .await?;

            let mut request_items = Table::create();
            request_items
                .table(ReliefRequestItems::Table)
                .if_not_exists()
                .col(
                    ColumnDef::new(ReliefRequestItems::Id)
                        .uuid()
                        .primary_key()
                        .not_null(),
                )
                .col(
                    ColumnDef::new(ReliefRequestItems::RequestId)
                        .uuid()
                        .not_null(),
                )
                .col(ColumnDef::new(ReliefRequestItems::ItemId).uuid().not_null())
                .col(
                    ColumnDef::new(ReliefRequestItems::RequestQty)
                        .big_integer()
                        .not_null(),
                )
                .col(
                    ColumnDef::new(ReliefRequestItems::UrgencyInd)
                        .string_len(1)
                        .not_null(),
                )
                .col(
                    ColumnDef::new(ReliefRequestItems::StatusCode)
                        .string_len(1)
                        .not_null()
                        .default("R"),
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_relief_request_items_request_id")
                        .from(ReliefRequestItems::Table, ReliefRequestItems::RequestId)
                        .to(ReliefRequests::Table, ReliefRequests::Id)
                        .on_delete(ForeignKeyAction::Cascade),
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_relief_request_items_item_id")
                        .from(ReliefRequestItems::Table, ReliefRequestItems::ItemId)
                        .to(Items::Table, Items::Id)
                        .on_delete(ForeignKeyAction::Restrict),
                )
                .check(Expr::cust("request_qty > 0"))
                .check(Expr::cust("urgency_ind IN ('L', 'M', 'H', 'C')"))
                .check(Expr::cust(
                    "status_code IN ('R', 'U', 'W', 'D', 'P', 'L', 'F')",
                ));
            manager
                .create_table(with_audit_columns(&mut request_items).to_owned())
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_relief_request_items_request_item")
                        .table(ReliefRequestItems::Table)
                        .col(ReliefRequestItems::RequestId)
                        .col(ReliefRequestItems::ItemId)
                        .unique()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ReliefRequestItems::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(ReliefRequests::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(DisasterEvents::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum DisasterEvents {
        Table,
        Id,
        EventName,
        EventType,
        StartDate,
        EventDesc,
        ImpactDesc,
        StatusCode,
        ClosedDate,
        ReasonDesc,
    }

    #[derive(DeriveIden)]
    enum ReliefRequests {
        Table,
        Id,
        AgencyId,
        EventId,
        RequestDate,
        UrgencyInd,
        StatusCode,
        ReviewById,
        ReviewDtime,
        StatusReasonDesc,
        CommentsText,
    }

    #[derive(DeriveIden)]
    enum ReliefRequestItems {
        Table,
        Id,
        RequestId,
        ItemId,
        RequestQty,
        UrgencyInd,
        StatusCode,
    }
}

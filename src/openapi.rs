use utoipa::OpenApi;

use crate::errors::ErrorResponse;
use crate::handlers;
use crate::services::allocations::{AllocationDetail, CreateAllocationInput, UpdateAllocationInput};
use crate::services::inventory::InventoryView;
use crate::services::master_data::{
    CreateItemInput, CreateLotInput, CreateUnitInput, CreateWarehouseInput, UpdateItemInput,
    UpdateLotInput, UpdateUnitInput, UpdateWarehouseInput,
};
use crate::services::movements::{RecordInboundInput, RecordOutboundInput};
use crate::services::reports::{
    DailyFlow, InventoryReport, InventoryReportRow, MonthlyItemReport, MonthlyReport,
};
use crate::services::rollup::MonthlyRollupResult;

/// API documentation served at /api-docs/openapi.json.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Stocklot API",
        version = "0.1.0",
        description = "Lot-level inventory ledger with allocations and monthly rollups. \
            Stock is tracked per (lot, warehouse, unit) bucket; inbound and outbound \
            movements keep an append-only journal, allocations reserve stock against \
            available capacity, and monthly snapshots chain opening balances from the \
            prior month's closing."
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "movements", description = "Inbound and outbound stock movements"),
        (name = "allocations", description = "Stock reservations"),
        (name = "inventory", description = "Current stock levels"),
        (name = "monthly", description = "Monthly rollup snapshots"),
        (name = "master-data", description = "Items, units, warehouses, and lots"),
        (name = "reports", description = "Exportable inventory and monthly reports")
    ),
    paths(
        handlers::movements::record_inbound,
        handlers::movements::record_outbound,
        handlers::movements::list_movements,
        handlers::movements::get_movement,
        handlers::allocations::create_allocation,
        handlers::allocations::list_allocations,
        handlers::allocations::get_allocation,
        handlers::allocations::update_allocation,
        handlers::allocations::release_allocation,
        handlers::inventory::list_inventory,
        handlers::inventory::list_inventory_for_item,
        handlers::inventory::list_inventory_for_lot,
        handlers::inventory::list_inventory_for_warehouse,
        handlers::monthly::list_months,
        handlers::monthly::get_snapshots,
        handlers::monthly::calculate_month,
        handlers::master_data::list_items,
        handlers::master_data::get_item,
        handlers::master_data::create_item,
        handlers::master_data::update_item,
        handlers::master_data::delete_item,
        handlers::master_data::list_units,
        handlers::master_data::get_unit,
        handlers::master_data::create_unit,
        handlers::master_data::update_unit,
        handlers::master_data::delete_unit,
        handlers::master_data::list_warehouses,
        handlers::master_data::get_warehouse,
        handlers::master_data::create_warehouse,
        handlers::master_data::update_warehouse,
        handlers::master_data::delete_warehouse,
        handlers::master_data::list_lots,
        handlers::master_data::get_lot,
        handlers::master_data::create_lot,
        handlers::master_data::update_lot,
        handlers::master_data::delete_lot,
        handlers::reports::inventory_report,
        handlers::reports::monthly_report,
    ),
    components(schemas(
        ErrorResponse,
        RecordInboundInput,
        RecordOutboundInput,
        CreateAllocationInput,
        UpdateAllocationInput,
        AllocationDetail,
        InventoryView,
        MonthlyRollupResult,
        CreateItemInput,
        UpdateItemInput,
        CreateUnitInput,
        UpdateUnitInput,
        CreateWarehouseInput,
        UpdateWarehouseInput,
        CreateLotInput,
        UpdateLotInput,
        InventoryReport,
        InventoryReportRow,
        MonthlyReport,
        MonthlyItemReport,
        DailyFlow,
    ))
)]
pub struct ApiDoc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use crate::errors::ServiceError;
use crate::handlers::AppState;
use crate::services::inventory::InventoryFilters;
use crate::ApiResponse;

/// Create the inventory router
pub fn inventory_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_inventory))
        .route("/item/:item_id", get(list_inventory_for_item))
        .route("/lot/:lot_id", get(list_inventory_for_lot))
        .route("/warehouse/:warehouse_id", get(list_inventory_for_warehouse))
}

/// List inventory records with allocation breakdowns
#[utoipa::path(
    get,
    path = "/api/v1/inventory",
    params(InventoryFilters),
    responses(
        (status = 200, description = "Inventory records returned"),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "inventory"
)]
pub async fn list_inventory(
    State(state): State<AppState>,
    Query(filters): Query<InventoryFilters>,
) -> Result<impl IntoResponse, ServiceError> {
    let records = state.services.inventory.list_inventory(filters).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(records))))
}

/// List inventory for every lot of an item
#[utoipa::path(
    get,
    path = "/api/v1/inventory/item/{item_id}",
    params(("item_id" = i64, Path, description = "Item id")),
    responses(
        (status = 200, description = "Inventory records returned"),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "inventory"
)]
pub async fn list_inventory_for_item(
    State(state): State<AppState>,
    Path(item_id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    let filters = InventoryFilters {
        item_id: Some(item_id),
        ..Default::default()
    };
    let records = state.services.inventory.list_inventory(filters).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(records))))
}

/// List inventory for a single lot
#[utoipa::path(
    get,
    path = "/api/v1/inventory/lot/{lot_id}",
    params(("lot_id" = i64, Path, description = "Lot id")),
    responses(
        (status = 200, description = "Inventory records returned"),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "inventory"
)]
pub async fn list_inventory_for_lot(
    State(state): State<AppState>,
    Path(lot_id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    let filters = InventoryFilters {
        lot_id: Some(lot_id),
        ..Default::default()
    };
    let records = state.services.inventory.list_inventory(filters).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(records))))
}

/// List inventory held in a warehouse
#[utoipa::path(
    get,
    path = "/api/v1/inventory/warehouse/{warehouse_id}",
    params(("warehouse_id" = i64, Path, description = "Warehouse id")),
    responses(
        (status = 200, description = "Inventory records returned"),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "inventory"
)]
pub async fn list_inventory_for_warehouse(
    State(state): State<AppState>,
    Path(warehouse_id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    let filters = InventoryFilters {
        warehouse_id: Some(warehouse_id),
        ..Default::default()
    };
    let records = state.services.inventory.list_inventory(filters).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(records))))
}

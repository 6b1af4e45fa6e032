use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::errors::ServiceError;
use crate::handlers::AppState;
use crate::services::master_data::{
    CreateItemInput, CreateLotInput, CreateUnitInput, CreateWarehouseInput, UpdateItemInput,
    UpdateLotInput, UpdateUnitInput, UpdateWarehouseInput,
};
use crate::ApiResponse;

pub fn items_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_items).post(create_item))
        .route("/:id", get(get_item).put(update_item).delete(delete_item))
}

pub fn units_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_units).post(create_unit))
        .route("/:id", get(get_unit).put(update_unit).delete(delete_unit))
}

pub fn warehouses_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_warehouses).post(create_warehouse))
        .route(
            "/:id",
            get(get_warehouse).put(update_warehouse).delete(delete_warehouse),
        )
}

pub fn lots_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_lots).post(create_lot))
        .route("/:id", get(get_lot).put(update_lot).delete(delete_lot))
}

#[utoipa::path(
    get,
    path = "/api/v1/items",
    responses((status = 200, description = "Items returned")),
    tag = "master-data"
)]
pub async fn list_items(State(state): State<AppState>) -> Result<impl IntoResponse, ServiceError> {
    let items = state.services.master_data.list_items().await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(items))))
}

#[utoipa::path(
    get,
    path = "/api/v1/items/{id}",
    params(("id" = i64, Path, description = "Item id")),
    responses(
        (status = 200, description = "Item returned"),
        (status = 404, description = "Item not found", body = crate::errors::ErrorResponse)
    ),
    tag = "master-data"
)]
pub async fn get_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    let item = state.services.master_data.get_item(id).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(item))))
}

#[utoipa::path(
    post,
    path = "/api/v1/items",
    request_body = CreateItemInput,
    responses(
        (status = 201, description = "Item created"),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 409, description = "Item code already in use", body = crate::errors::ErrorResponse)
    ),
    tag = "master-data"
)]
pub async fn create_item(
    State(state): State<AppState>,
    Json(payload): Json<CreateItemInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let item = state.services.master_data.create_item(payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(item))))
}

#[utoipa::path(
    put,
    path = "/api/v1/items/{id}",
    params(("id" = i64, Path, description = "Item id")),
    request_body = UpdateItemInput,
    responses(
        (status = 200, description = "Item updated"),
        (status = 404, description = "Item not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Item code already in use", body = crate::errors::ErrorResponse)
    ),
    tag = "master-data"
)]
pub async fn update_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateItemInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let item = state.services.master_data.update_item(id, payload).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(item))))
}

#[utoipa::path(
    delete,
    path = "/api/v1/items/{id}",
    params(("id" = i64, Path, description = "Item id")),
    responses(
        (status = 200, description = "Item deleted"),
        (status = 404, description = "Item not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Item is still referenced", body = crate::errors::ErrorResponse)
    ),
    tag = "master-data"
)]
pub async fn delete_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    let item = state.services.master_data.delete_item(id).await?;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::success_with_message(item, "item deleted")),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/units",
    responses((status = 200, description = "Units returned")),
    tag = "master-data"
)]
pub async fn list_units(State(state): State<AppState>) -> Result<impl IntoResponse, ServiceError> {
    let units = state.services.master_data.list_units().await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(units))))
}

#[utoipa::path(
    get,
    path = "/api/v1/units/{id}",
    params(("id" = i64, Path, description = "Unit id")),
    responses(
        (status = 200, description = "Unit returned"),
        (status = 404, description = "Unit not found", body = crate::errors::ErrorResponse)
    ),
    tag = "master-data"
)]
pub async fn get_unit(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    let unit = state.services.master_data.get_unit(id).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(unit))))
}

#[utoipa::path(
    post,
    path = "/api/v1/units",
    request_body = CreateUnitInput,
    responses(
        (status = 201, description = "Unit created"),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 409, description = "Unit name already in use", body = crate::errors::ErrorResponse)
    ),
    tag = "master-data"
)]
pub async fn create_unit(
    State(state): State<AppState>,
    Json(payload): Json<CreateUnitInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let unit = state.services.master_data.create_unit(payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(unit))))
}

#[utoipa::path(
    put,
    path = "/api/v1/units/{id}",
    params(("id" = i64, Path, description = "Unit id")),
    request_body = UpdateUnitInput,
    responses(
        (status = 200, description = "Unit updated"),
        (status = 404, description = "Unit not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Unit name already in use", body = crate::errors::ErrorResponse)
    ),
    tag = "master-data"
)]
pub async fn update_unit(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateUnitInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let unit = state.services.master_data.update_unit(id, payload).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(unit))))
}

#[utoipa::path(
    delete,
    path = "/api/v1/units/{id}",
    params(("id" = i64, Path, description = "Unit id")),
    responses(
        (status = 200, description = "Unit deleted"),
        (status = 404, description = "Unit not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Unit is still referenced", body = crate::errors::ErrorResponse)
    ),
    tag = "master-data"
)]
pub async fn delete_unit(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    let unit = state.services.master_data.delete_unit(id).await?;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::success_with_message(unit, "unit deleted")),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/warehouses",
    responses((status = 200, description = "Warehouses returned")),
    tag = "master-data"
)]
pub async fn list_warehouses(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    let warehouses = state.services.master_data.list_warehouses().await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(warehouses))))
}

#[utoipa::path(
    get,
    path = "/api/v1/warehouses/{id}",
    params(("id" = i64, Path, description = "Warehouse id")),
    responses(
        (status = 200, description = "Warehouse returned"),
        (status = 404, description = "Warehouse not found", body = crate::errors::ErrorResponse)
    ),
    tag = "master-data"
)]
pub async fn get_warehouse(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    let warehouse = state.services.master_data.get_warehouse(id).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(warehouse))))
}

#[utoipa::path(
    post,
    path = "/api/v1/warehouses",
    request_body = CreateWarehouseInput,
    responses(
        (status = 201, description = "Warehouse created"),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 409, description = "Warehouse name already in use", body = crate::errors::ErrorResponse)
    ),
    tag = "master-data"
)]
pub async fn create_warehouse(
    State(state): State<AppState>,
    Json(payload): Json<CreateWarehouseInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let warehouse = state.services.master_data.create_warehouse(payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(warehouse))))
}

#[utoipa::path(
    put,
    path = "/api/v1/warehouses/{id}",
    params(("id" = i64, Path, description = "Warehouse id")),
    request_body = UpdateWarehouseInput,
    responses(
        (status = 200, description = "Warehouse updated"),
        (status = 404, description = "Warehouse not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Warehouse name already in use", body = crate::errors::ErrorResponse)
    ),
    tag = "master-data"
)]
pub async fn update_warehouse(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateWarehouseInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let warehouse = state
        .services
        .master_data
        .update_warehouse(id, payload)
        .await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(warehouse))))
}

#[utoipa::path(
    delete,
    path = "/api/v1/warehouses/{id}",
    params(("id" = i64, Path, description = "Warehouse id")),
    responses(
        (status = 200, description = "Warehouse deleted"),
        (status = 404, description = "Warehouse not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Warehouse is still referenced", body = crate::errors::ErrorResponse)
    ),
    tag = "master-data"
)]
pub async fn delete_warehouse(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    let warehouse = state.services.master_data.delete_warehouse(id).await?;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::success_with_message(
            warehouse,
            "warehouse deleted",
        )),
    ))
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct LotListQuery {
    pub item_id: Option<i64>,
}

#[utoipa::path(
    get,
    path = "/api/v1/lots",
    params(LotListQuery),
    responses((status = 200, description = "Lots returned")),
    tag = "master-data"
)]
pub async fn list_lots(
    State(state): State<AppState>,
    Query(query): Query<LotListQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let lots = state.services.master_data.list_lots(query.item_id).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(lots))))
}

#[utoipa::path(
    get,
    path = "/api/v1/lots/{id}",
    params(("id" = i64, Path, description = "Lot id")),
    responses(
        (status = 200, description = "Lot returned"),
        (status = 404, description = "Lot not found", body = crate::errors::ErrorResponse)
    ),
    tag = "master-data"
)]
pub async fn get_lot(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    let lot = state.services.master_data.get_lot(id).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(lot))))
}

#[utoipa::path(
    post,
    path = "/api/v1/lots",
    request_body = CreateLotInput,
    responses(
        (status = 201, description = "Lot created"),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Item not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Lot number already in use", body = crate::errors::ErrorResponse)
    ),
    tag = "master-data"
)]
pub async fn create_lot(
    State(state): State<AppState>,
    Json(payload): Json<CreateLotInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let lot = state.services.master_data.create_lot(payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(lot))))
}

#[utoipa::path(
    put,
    path = "/api/v1/lots/{id}",
    params(("id" = i64, Path, description = "Lot id")),
    request_body = UpdateLotInput,
    responses(
        (status = 200, description = "Lot updated"),
        (status = 404, description = "Lot not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Lot number already in use", body = crate::errors::ErrorResponse)
    ),
    tag = "master-data"
)]
pub async fn update_lot(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateLotInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let lot = state.services.master_data.update_lot(id, payload).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(lot))))
}

#[utoipa::path(
    delete,
    path = "/api/v1/lots/{id}",
    params(("id" = i64, Path, description = "Lot id")),
    responses(
        (status = 200, description = "Lot deleted"),
        (status = 404, description = "Lot not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Lot is still referenced", body = crate::errors::ErrorResponse)
    ),
    tag = "master-data"
)]
pub async fn delete_lot(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    let lot = state.services.master_data.delete_lot(id).await?;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::success_with_message(lot, "lot deleted")),
    ))
}

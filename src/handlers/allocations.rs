use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use crate::errors::ServiceError;
use crate::handlers::AppState;
use crate::services::allocations::{
    AllocationFilters, CreateAllocationInput, UpdateAllocationInput,
};
use crate::ApiResponse;

/// Create the allocations router
pub fn allocations_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_allocations).post(create_allocation))
        .route(
            "/:id",
            get(get_allocation)
                .put(update_allocation)
                .delete(release_allocation),
        )
}

/// Create an allocation against available stock
#[utoipa::path(
    post,
    path = "/api/v1/allocations",
    request_body = CreateAllocationInput,
    responses(
        (status = 201, description = "Allocation created"),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Referenced entity or inventory not found", body = crate::errors::ErrorResponse),
        (status = 422, description = "Requested quantity exceeds available quantity", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "allocations"
)]
pub async fn create_allocation(
    State(state): State<AppState>,
    Json(payload): Json<CreateAllocationInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let allocation = state.services.allocations.create_allocation(payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(allocation))))
}

/// List allocations with optional filters
#[utoipa::path(
    get,
    path = "/api/v1/allocations",
    params(AllocationFilters),
    responses(
        (status = 200, description = "Allocations returned"),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "allocations"
)]
pub async fn list_allocations(
    State(state): State<AppState>,
    Query(filters): Query<AllocationFilters>,
) -> Result<impl IntoResponse, ServiceError> {
    let allocations = state.services.allocations.list_allocations(filters).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(allocations))))
}

/// Get an allocation with its ledger context
#[utoipa::path(
    get,
    path = "/api/v1/allocations/{id}",
    params(("id" = i64, Path, description = "Allocation id")),
    responses(
        (status = 200, description = "Allocation returned"),
        (status = 404, description = "Allocation not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "allocations"
)]
pub async fn get_allocation(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    let detail = state.services.allocations.get_allocation(id).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(detail))))
}

/// Update an allocation's quantity, date, or reference
#[utoipa::path(
    put,
    path = "/api/v1/allocations/{id}",
    params(("id" = i64, Path, description = "Allocation id")),
    request_body = UpdateAllocationInput,
    responses(
        (status = 200, description = "Allocation updated"),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Allocation not found", body = crate::errors::ErrorResponse),
        (status = 422, description = "Requested quantity exceeds available quantity", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "allocations"
)]
pub async fn update_allocation(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateAllocationInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let allocation = state
        .services
        .allocations
        .update_allocation(id, payload)
        .await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(allocation))))
}

/// Release an allocation, returning the removed record
#[utoipa::path(
    delete,
    path = "/api/v1/allocations/{id}",
    params(("id" = i64, Path, description = "Allocation id")),
    responses(
        (status = 200, description = "Allocation released"),
        (status = 404, description = "Allocation not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "allocations"
)]
pub async fn release_allocation(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    let released = state.services.allocations.release_allocation(id).await?;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::success_with_message(
            released,
            "allocation released",
        )),
    ))
}

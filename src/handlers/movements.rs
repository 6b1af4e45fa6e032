use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use crate::errors::ServiceError;
use crate::handlers::AppState;
use crate::services::movements::{MovementFilters, RecordInboundInput, RecordOutboundInput};
use crate::ApiResponse;

/// Create the movements router
pub fn movements_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_movements))
        .route("/inbound", post(record_inbound))
        .route("/outbound", post(record_outbound))
        .route("/:id", get(get_movement))
}

/// Record an inbound stock movement
#[utoipa::path(
    post,
    path = "/api/v1/movements/inbound",
    request_body = RecordInboundInput,
    responses(
        (status = 201, description = "Inbound movement recorded"),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Referenced lot, warehouse, or unit not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "movements"
)]
pub async fn record_inbound(
    State(state): State<AppState>,
    Json(payload): Json<RecordInboundInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let movement = state.services.movements.record_inbound(payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(movement))))
}

/// Record an outbound stock movement, optionally consuming an allocation
#[utoipa::path(
    post,
    path = "/api/v1/movements/outbound",
    request_body = RecordOutboundInput,
    responses(
        (status = 201, description = "Outbound movement recorded"),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Referenced lot, warehouse, or unit not found", body = crate::errors::ErrorResponse),
        (status = 422, description = "Insufficient stock", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "movements"
)]
pub async fn record_outbound(
    State(state): State<AppState>,
    Json(payload): Json<RecordOutboundInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let movement = state.services.movements.record_outbound(payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(movement))))
}

/// List movement history with optional filters
#[utoipa::path(
    get,
    path = "/api/v1/movements",
    params(MovementFilters),
    responses(
        (status = 200, description = "Movement history returned"),
        (status = 400, description = "Invalid filters", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "movements"
)]
pub async fn list_movements(
    State(state): State<AppState>,
    Query(filters): Query<MovementFilters>,
) -> Result<impl IntoResponse, ServiceError> {
    let movements = state.services.movements.list_movements(filters).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(movements))))
}

/// Get a single movement by id
#[utoipa::path(
    get,
    path = "/api/v1/movements/{id}",
    params(("id" = i64, Path, description = "Movement id")),
    responses(
        (status = 200, description = "Movement returned"),
        (status = 404, description = "Movement not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "movements"
)]
pub async fn get_movement(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    let movement = state.services.movements.get_movement(id).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(movement))))
}

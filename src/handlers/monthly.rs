use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use crate::errors::ServiceError;
use crate::handlers::AppState;
use crate::ApiResponse;

/// Create the monthly rollup router
pub fn monthly_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_months))
        .route("/:year/:month", get(get_snapshots))
        .route("/:year/:month/calculate", post(calculate_month))
}

/// List the months that have stored snapshots, newest first
#[utoipa::path(
    get,
    path = "/api/v1/monthly",
    responses(
        (status = 200, description = "Snapshot months returned"),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "monthly"
)]
pub async fn list_months(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    let months = state.services.rollup.list_months().await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(months))))
}

/// Get the stored snapshots for a month
#[utoipa::path(
    get,
    path = "/api/v1/monthly/{year}/{month}",
    params(
        ("year" = i32, Path, description = "Calendar year"),
        ("month" = u32, Path, description = "Month number, 1 through 12")
    ),
    responses(
        (status = 200, description = "Snapshots returned"),
        (status = 400, description = "Invalid year or month", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "monthly"
)]
pub async fn get_snapshots(
    State(state): State<AppState>,
    Path((year, month)): Path<(i32, u32)>,
) -> Result<impl IntoResponse, ServiceError> {
    let snapshots = state.services.rollup.list_snapshots(year, month).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(snapshots))))
}

/// Recompute and store the snapshots for a month
#[utoipa::path(
    post,
    path = "/api/v1/monthly/{year}/{month}/calculate",
    params(
        ("year" = i32, Path, description = "Calendar year"),
        ("month" = u32, Path, description = "Month number, 1 through 12")
    ),
    responses(
        (status = 200, description = "Rollup computed"),
        (status = 400, description = "Invalid year or month", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "monthly"
)]
pub async fn calculate_month(
    State(state): State<AppState>,
    Path((year, month)): Path<(i32, u32)>,
) -> Result<impl IntoResponse, ServiceError> {
    let result = state.services.rollup.compute(year, month).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(result))))
}

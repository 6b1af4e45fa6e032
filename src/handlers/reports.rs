use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::errors::ServiceError;
use crate::handlers::AppState;
use crate::services::reports::ReportFilters;
use crate::ApiResponse;

/// Create the reports router
pub fn reports_router() -> Router<AppState> {
    Router::new()
        .route("/inventory", get(inventory_report))
        .route("/monthly/:year/:month", get(monthly_report))
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ReportQuery {
    pub item_id: Option<i64>,
    pub warehouse_id: Option<i64>,
    /// "json" (default) or "csv"
    pub format: Option<String>,
}

impl ReportQuery {
    fn filters(&self) -> ReportFilters {
        ReportFilters {
            item_id: self.item_id,
            warehouse_id: self.warehouse_id,
        }
    }

    fn wants_csv(&self) -> Result<bool, ServiceError> {
        match self.format.as_deref() {
            None | Some("json") => Ok(false),
            Some("csv") => Ok(true),
            Some(other) => Err(ServiceError::ValidationError(format!(
                "format must be json or csv, got {other}"
            ))),
        }
    }
}

fn csv_response(filename: String, body: String) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        body,
    )
        .into_response()
}

/// Current stock report with allocation columns
#[utoipa::path(
    get,
    path = "/api/v1/reports/inventory",
    params(ReportQuery),
    responses(
        (status = 200, description = "Report returned as JSON or CSV"),
        (status = 400, description = "Unknown format", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "reports"
)]
pub async fn inventory_report(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> Result<Response, ServiceError> {
    let csv = query.wants_csv()?;
    let report = state.services.reports.inventory_report(query.filters()).await?;

    if csv {
        Ok(csv_response(
            "inventory-report.csv".to_string(),
            report.to_csv(),
        ))
    } else {
        Ok((StatusCode::OK, Json(ApiResponse::success(report))).into_response())
    }
}

/// Day-by-day stock flow report for one month
#[utoipa::path(
    get,
    path = "/api/v1/reports/monthly/{year}/{month}",
    params(
        ("year" = i32, Path, description = "Calendar year"),
        ("month" = u32, Path, description = "Month number, 1 through 12"),
        ReportQuery
    ),
    responses(
        (status = 200, description = "Report returned as JSON or CSV"),
        (status = 400, description = "Invalid year, month, or format", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "reports"
)]
pub async fn monthly_report(
    State(state): State<AppState>,
    Path((year, month)): Path<(i32, u32)>,
    Query(query): Query<ReportQuery>,
) -> Result<Response, ServiceError> {
    let csv = query.wants_csv()?;
    let report = state
        .services
        .reports
        .monthly_report(year, month, query.filters())
        .await?;

    if csv {
        Ok(csv_response(
            format!("inventory-monthly-report-{year}-{month}.csv"),
            report.to_csv(),
        ))
    } else {
        Ok((StatusCode::OK, Json(ApiResponse::success(report))).into_response())
    }
}

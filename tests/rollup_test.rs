mod common;

use axum::http::{Method, StatusCode};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use std::str::FromStr;

use common::TestApp;

fn qty(value: &Value) -> Decimal {
    match value {
        Value::String(s) => Decimal::from_str(s).expect("parse decimal string"),
        Value::Number(n) => Decimal::from_str(&n.to_string()).expect("parse decimal number"),
        other => panic!("unexpected quantity value: {other:?}"),
    }
}

async fn record(
    app: &TestApp,
    direction: &str,
    key: (i64, i64, i64),
    quantity: &str,
    occurred_at: &str,
) {
    let (lot_id, warehouse_id, unit_id) = key;
    let payload = json!({
        "lot_id": lot_id,
        "warehouse_id": warehouse_id,
        "unit_id": unit_id,
        "quantity": quantity,
        "occurred_at": occurred_at,
    });
    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/movements/{direction}"),
            Some(payload),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn rollup_totals_movements_within_the_month() {
    let app = TestApp::new().await;
    let key = app
        .seed_ledger_key(NaiveDate::from_ymd_opt(2024, 1, 10).unwrap())
        .await;

    record(&app, "inbound", key, "100", "2024-03-05T09:00:00Z").await;
    record(&app, "outbound", key, "45", "2024-03-12T14:30:00Z").await;
    record(&app, "inbound", key, "30", "2024-03-20T08:15:00Z").await;
    // April movement must not leak into the March totals.
    record(&app, "inbound", key, "500", "2024-04-02T10:00:00Z").await;

    let response = app
        .request(Method::POST, "/api/v1/monthly/2024/3/calculate", None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = TestApp::json_body(response).await;
    let rows = body["data"]["rows"].as_array().expect("snapshot rows");
    assert_eq!(rows.len(), 1);
    assert_eq!(qty(&rows[0]["opening_quantity"]), dec!(0));
    assert_eq!(qty(&rows[0]["incoming_quantity"]), dec!(130));
    assert_eq!(qty(&rows[0]["outgoing_quantity"]), dec!(45));
    assert_eq!(qty(&rows[0]["closing_quantity"]), dec!(85));
}

#[tokio::test]
async fn rollup_rerun_replaces_prior_results() {
    let app = TestApp::new().await;
    let key = app
        .seed_ledger_key(NaiveDate::from_ymd_opt(2024, 1, 10).unwrap())
        .await;

    record(&app, "inbound", key, "60", "2024-03-03T09:00:00Z").await;

    let response = app
        .request(Method::POST, "/api/v1/monthly/2024/3/calculate", None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    // New data lands, then the rerun must reflect it without duplicate rows.
    record(&app, "outbound", key, "10", "2024-03-25T16:00:00Z").await;

    let response = app
        .request(Method::POST, "/api/v1/monthly/2024/3/calculate", None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = TestApp::json_body(response).await;
    let rows = body["data"]["rows"].as_array().expect("snapshot rows");
    assert_eq!(rows.len(), 1);
    assert_eq!(qty(&rows[0]["incoming_quantity"]), dec!(60));
    assert_eq!(qty(&rows[0]["outgoing_quantity"]), dec!(10));
    assert_eq!(qty(&rows[0]["closing_quantity"]), dec!(50));
}

#[tokio::test]
async fn rollup_chains_opening_from_prior_closing() {
    let app = TestApp::new().await;
    let key = app
        .seed_ledger_key(NaiveDate::from_ymd_opt(2024, 1, 10).unwrap())
        .await;

    record(&app, "inbound", key, "85", "2024-03-08T09:00:00Z").await;

    let response = app
        .request(Method::POST, "/api/v1/monthly/2024/3/calculate", None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    // April has no movements, but the balance carries forward.
    let response = app
        .request(Method::POST, "/api/v1/monthly/2024/4/calculate", None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = TestApp::json_body(response).await;
    let rows = body["data"]["rows"].as_array().expect("snapshot rows");
    assert_eq!(rows.len(), 1);
    assert_eq!(qty(&rows[0]["opening_quantity"]), dec!(85));
    assert_eq!(qty(&rows[0]["incoming_quantity"]), dec!(0));
    assert_eq!(qty(&rows[0]["outgoing_quantity"]), dec!(0));
    assert_eq!(qty(&rows[0]["closing_quantity"]), dec!(85));
}

#[tokio::test]
async fn rollup_excludes_lots_produced_in_or_after_the_month() {
    let app = TestApp::new().await;
    let item_id = app.seed_item("ITEM-NEW").await;
    let warehouse_id = app.seed_warehouse("Main Warehouse").await;
    let unit_id = app.seed_unit("kg").await;
    // Produced mid-March: not part of the March rollup.
    let lot_id = app
        .seed_lot(
            item_id,
            "LOT-MARCH",
            NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
        )
        .await;

    record(
        &app,
        "inbound",
        (lot_id, warehouse_id, unit_id),
        "40",
        "2024-03-16T09:00:00Z",
    )
    .await;

    let response = app
        .request(Method::POST, "/api/v1/monthly/2024/3/calculate", None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = TestApp::json_body(response).await;
    assert_eq!(body["data"]["count"].as_u64(), Some(0));

    // By April the lot qualifies, so April movements show up. The March
    // snapshot never existed for this lot, so the opening balance starts at
    // zero rather than carrying the March inbound.
    record(
        &app,
        "inbound",
        (lot_id, warehouse_id, unit_id),
        "5",
        "2024-04-03T09:00:00Z",
    )
    .await;

    let response = app
        .request(Method::POST, "/api/v1/monthly/2024/4/calculate", None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = TestApp::json_body(response).await;
    let rows = body["data"]["rows"].as_array().expect("snapshot rows");
    assert_eq!(rows.len(), 1);
    assert_eq!(qty(&rows[0]["opening_quantity"]), dec!(0));
    assert_eq!(qty(&rows[0]["incoming_quantity"]), dec!(5));
}

#[tokio::test]
async fn rollup_skips_all_zero_rows() {
    let app = TestApp::new().await;
    let item_id = app.seed_item("ITEM-IDLE").await;
    app.seed_warehouse("Main Warehouse").await;
    app.seed_unit("kg").await;
    app.seed_lot(
        item_id,
        "LOT-IDLE",
        NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
    )
    .await;

    // Eligible lot, but nothing ever moved.
    let response = app
        .request(Method::POST, "/api/v1/monthly/2024/3/calculate", None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = TestApp::json_body(response).await;
    assert_eq!(body["data"]["count"].as_u64(), Some(0));
}

#[tokio::test]
async fn rollup_rejects_invalid_month() {
    let app = TestApp::new().await;

    let response = app
        .request(Method::POST, "/api/v1/monthly/2024/13/calculate", None)
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn snapshot_months_listing_reflects_computed_months() {
    let app = TestApp::new().await;
    let key = app
        .seed_ledger_key(NaiveDate::from_ymd_opt(2024, 1, 10).unwrap())
        .await;

    record(&app, "inbound", key, "10", "2024-03-05T09:00:00Z").await;

    app.request(Method::POST, "/api/v1/monthly/2024/3/calculate", None)
        .await;
    app.request(Method::POST, "/api/v1/monthly/2024/4/calculate", None)
        .await;

    let response = app.request(Method::GET, "/api/v1/monthly", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = TestApp::json_body(response).await;
    let months = body["data"].as_array().expect("month list");
    assert_eq!(months.len(), 2);
    // Newest month first.
    assert_eq!(months[0].as_str(), Some("2024-04-01"));
    assert_eq!(months[1].as_str(), Some("2024-03-01"));

    let response = app
        .request(Method::GET, "/api/v1/monthly/2024/3", None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = TestApp::json_body(response).await;
    assert_eq!(body["data"].as_array().map(|a| a.len()), Some(1));
}

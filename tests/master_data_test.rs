mod common;

use axum::http::{Method, StatusCode};
use chrono::NaiveDate;
use serde_json::json;

use common::TestApp;

#[tokio::test]
async fn item_crud_round_trip() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/items",
            Some(json!({
                "item_code": "WIDGET-1",
                "name": "Widget",
                "description": "standard widget",
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = TestApp::json_body(response).await;
    let id = body["data"]["id"].as_i64().expect("item id");
    assert_eq!(body["data"]["item_code"], "WIDGET-1");

    let response = app
        .request(
            Method::PUT,
            &format!("/api/v1/items/{id}"),
            Some(json!({ "name": "Widget Mk2" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = TestApp::json_body(response).await;
    assert_eq!(body["data"]["name"], "Widget Mk2");
    assert_eq!(body["data"]["item_code"], "WIDGET-1");

    let response = app.request(Method::GET, "/api/v1/items", None).await;
    let body = TestApp::json_body(response).await;
    assert_eq!(body["data"].as_array().map(|a| a.len()), Some(1));

    let response = app
        .request(Method::DELETE, &format!("/api/v1/items/{id}"), None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .request(Method::GET, &format!("/api/v1/items/{id}"), None)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn item_code_must_be_unique() {
    let app = TestApp::new().await;
    app.seed_item("DUP-1").await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/items",
            Some(json!({
                "item_code": "DUP-1",
                "name": "Duplicate",
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn blank_names_are_rejected() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/items",
            Some(json!({
                "item_code": "  ",
                "name": "Widget",
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .request(
            Method::POST,
            "/api/v1/warehouses",
            Some(json!({ "name": "" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn lot_requires_existing_item() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/lots",
            Some(json!({
                "lot_number": "LOT-X",
                "item_id": 42,
                "production_date": "2024-01-10",
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn lots_filter_by_item() {
    let app = TestApp::new().await;
    let first_item = app.seed_item("ITEM-A").await;
    let second_item = app.seed_item("ITEM-B").await;
    app.seed_lot(
        first_item,
        "LOT-A1",
        NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
    )
    .await;
    app.seed_lot(
        first_item,
        "LOT-A2",
        NaiveDate::from_ymd_opt(2024, 2, 5).unwrap(),
    )
    .await;
    app.seed_lot(
        second_item,
        "LOT-B1",
        NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
    )
    .await;

    let response = app
        .request(
            Method::GET,
            &format!("/api/v1/lots?item_id={first_item}"),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = TestApp::json_body(response).await;
    assert_eq!(body["data"].as_array().map(|a| a.len()), Some(2));

    let response = app.request(Method::GET, "/api/v1/lots", None).await;
    let body = TestApp::json_body(response).await;
    assert_eq!(body["data"].as_array().map(|a| a.len()), Some(3));
}

#[tokio::test]
async fn referenced_master_data_cannot_be_deleted() {
    let app = TestApp::new().await;
    let (lot_id, warehouse_id, unit_id) = app
        .seed_ledger_key(NaiveDate::from_ymd_opt(2024, 1, 10).unwrap())
        .await;

    let payload = json!({
        "lot_id": lot_id,
        "warehouse_id": warehouse_id,
        "unit_id": unit_id,
        "quantity": "10",
    });
    let response = app
        .request(Method::POST, "/api/v1/movements/inbound", Some(payload))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    for uri in [
        format!("/api/v1/lots/{lot_id}"),
        format!("/api/v1/warehouses/{warehouse_id}"),
        format!("/api/v1/units/{unit_id}"),
    ] {
        let response = app.request(Method::DELETE, &uri, None).await;
        assert_eq!(response.status(), StatusCode::CONFLICT, "{uri}");
    }

    // Items with lots are also protected.
    let response = app.request(Method::GET, "/api/v1/items", None).await;
    let body = TestApp::json_body(response).await;
    let item_id = body["data"][0]["id"].as_i64().expect("item id");
    let response = app
        .request(Method::DELETE, &format!("/api/v1/items/{item_id}"), None)
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn unreferenced_master_data_deletes_cleanly() {
    let app = TestApp::new().await;
    let warehouse_id = app.seed_warehouse("Spare Warehouse").await;
    let unit_id = app.seed_unit("pallet").await;

    let response = app
        .request(
            Method::DELETE,
            &format!("/api/v1/warehouses/{warehouse_id}"),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .request(Method::DELETE, &format!("/api/v1/units/{unit_id}"), None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn health_and_status_endpoints_respond() {
    let app = TestApp::new().await;

    let response = app.request(Method::GET, "/health", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = TestApp::json_body(response).await;
    assert_eq!(body["data"]["status"], "healthy");

    let response = app.request(Method::GET, "/api/v1/status", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .request(Method::GET, "/api-docs/openapi.json", None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

mod common;

use axum::http::{Method, StatusCode};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::EntityTrait;
use serde_json::{json, Value};
use std::str::FromStr;

use common::TestApp;
use stocklot_api::entities::{allocation, inventory_record, stock_movement};

fn qty(value: &Value) -> Decimal {
    match value {
        Value::String(s) => Decimal::from_str(s).expect("parse decimal string"),
        Value::Number(n) => Decimal::from_str(&n.to_string()).expect("parse decimal number"),
        other => panic!("unexpected quantity value: {other:?}"),
    }
}

fn production_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 10).unwrap()
}

#[tokio::test]
async fn inbound_creates_and_accumulates_inventory() {
    let app = TestApp::new().await;
    let (lot_id, warehouse_id, unit_id) = app.seed_ledger_key(production_date()).await;

    let payload = json!({
        "lot_id": lot_id,
        "warehouse_id": warehouse_id,
        "unit_id": unit_id,
        "quantity": "100",
    });
    let response = app
        .request(Method::POST, "/api/v1/movements/inbound", Some(payload))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    // A second inbound adds to the same bucket rather than creating another.
    let payload = json!({
        "lot_id": lot_id,
        "warehouse_id": warehouse_id,
        "unit_id": unit_id,
        "quantity": "30",
        "reference_number": "PO-42",
    });
    let response = app
        .request(Method::POST, "/api/v1/movements/inbound", Some(payload))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let records = inventory_record::Entity::find()
        .all(app.state.db.as_ref())
        .await
        .expect("load inventory records");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].quantity, dec!(130));

    let movements = stock_movement::Entity::find()
        .all(app.state.db.as_ref())
        .await
        .expect("load movements");
    assert_eq!(movements.len(), 2);
    assert!(movements.iter().all(|m| m.movement_type == "INBOUND"));
}

#[tokio::test]
async fn inbound_rejects_non_positive_quantity() {
    let app = TestApp::new().await;
    let (lot_id, warehouse_id, unit_id) = app.seed_ledger_key(production_date()).await;

    for quantity in ["0", "-5"] {
        let payload = json!({
            "lot_id": lot_id,
            "warehouse_id": warehouse_id,
            "unit_id": unit_id,
            "quantity": quantity,
        });
        let response = app
            .request(Method::POST, "/api/v1/movements/inbound", Some(payload))
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    let records = inventory_record::Entity::find()
        .all(app.state.db.as_ref())
        .await
        .expect("load inventory records");
    assert!(records.is_empty());
}

#[tokio::test]
async fn inbound_rejects_unknown_lot() {
    let app = TestApp::new().await;
    let (_lot_id, warehouse_id, unit_id) = app.seed_ledger_key(production_date()).await;

    let payload = json!({
        "lot_id": 9999,
        "warehouse_id": warehouse_id,
        "unit_id": unit_id,
        "quantity": "10",
    });
    let response = app
        .request(Method::POST, "/api/v1/movements/inbound", Some(payload))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = TestApp::json_body(response).await;
    assert!(body["message"]
        .as_str()
        .unwrap_or_default()
        .contains("lot"));
}

#[tokio::test]
async fn outbound_reduces_stock_and_rejects_overdraw() {
    let app = TestApp::new().await;
    let (lot_id, warehouse_id, unit_id) = app.seed_ledger_key(production_date()).await;

    let payload = json!({
        "lot_id": lot_id,
        "warehouse_id": warehouse_id,
        "unit_id": unit_id,
        "quantity": "50",
    });
    app.request(Method::POST, "/api/v1/movements/inbound", Some(payload))
        .await;

    let payload = json!({
        "lot_id": lot_id,
        "warehouse_id": warehouse_id,
        "unit_id": unit_id,
        "quantity": "20",
    });
    let response = app
        .request(Method::POST, "/api/v1/movements/outbound", Some(payload))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    // Overdraw leaves the ledger untouched and records no movement.
    let payload = json!({
        "lot_id": lot_id,
        "warehouse_id": warehouse_id,
        "unit_id": unit_id,
        "quantity": "31",
    });
    let response = app
        .request(Method::POST, "/api/v1/movements/outbound", Some(payload))
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let records = inventory_record::Entity::find()
        .all(app.state.db.as_ref())
        .await
        .expect("load inventory records");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].quantity, dec!(30));

    let movements = stock_movement::Entity::find()
        .all(app.state.db.as_ref())
        .await
        .expect("load movements");
    assert_eq!(movements.len(), 2);
}

#[tokio::test]
async fn outbound_to_zero_deletes_the_record() {
    let app = TestApp::new().await;
    let (lot_id, warehouse_id, unit_id) = app.seed_ledger_key(production_date()).await;

    let payload = json!({
        "lot_id": lot_id,
        "warehouse_id": warehouse_id,
        "unit_id": unit_id,
        "quantity": "25",
    });
    app.request(Method::POST, "/api/v1/movements/inbound", Some(payload))
        .await;

    let payload = json!({
        "lot_id": lot_id,
        "warehouse_id": warehouse_id,
        "unit_id": unit_id,
        "quantity": "25",
    });
    let response = app
        .request(Method::POST, "/api/v1/movements/outbound", Some(payload))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let records = inventory_record::Entity::find()
        .all(app.state.db.as_ref())
        .await
        .expect("load inventory records");
    assert!(records.is_empty());

    // The journal still holds both movements.
    let movements = stock_movement::Entity::find()
        .all(app.state.db.as_ref())
        .await
        .expect("load movements");
    assert_eq!(movements.len(), 2);
}

#[tokio::test]
async fn outbound_consumes_linked_allocation() {
    let app = TestApp::new().await;
    let (lot_id, warehouse_id, unit_id) = app.seed_ledger_key(production_date()).await;

    let payload = json!({
        "lot_id": lot_id,
        "warehouse_id": warehouse_id,
        "unit_id": unit_id,
        "quantity": "100",
    });
    app.request(Method::POST, "/api/v1/movements/inbound", Some(payload))
        .await;

    // Allocation fully consumed by an equal or larger outbound is removed.
    let response = app
        .request(
            Method::POST,
            "/api/v1/allocations",
            Some(json!({
                "lot_id": lot_id,
                "warehouse_id": warehouse_id,
                "unit_id": unit_id,
                "quantity": "10",
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = TestApp::json_body(response).await;
    let full_alloc_id = body["data"]["id"].as_i64().expect("allocation id");

    let payload = json!({
        "lot_id": lot_id,
        "warehouse_id": warehouse_id,
        "unit_id": unit_id,
        "quantity": "10",
        "allocation_id": full_alloc_id,
    });
    let response = app
        .request(Method::POST, "/api/v1/movements/outbound", Some(payload))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert!(allocation::Entity::find_by_id(full_alloc_id)
        .one(app.state.db.as_ref())
        .await
        .expect("load allocation")
        .is_none());

    // A partial outbound only shrinks the allocation.
    let response = app
        .request(
            Method::POST,
            "/api/v1/allocations",
            Some(json!({
                "lot_id": lot_id,
                "warehouse_id": warehouse_id,
                "unit_id": unit_id,
                "quantity": "10",
            })),
        )
        .await;
    let body = TestApp::json_body(response).await;
    let partial_alloc_id = body["data"]["id"].as_i64().expect("allocation id");

    let payload = json!({
        "lot_id": lot_id,
        "warehouse_id": warehouse_id,
        "unit_id": unit_id,
        "quantity": "4",
        "allocation_id": partial_alloc_id,
    });
    let response = app
        .request(Method::POST, "/api/v1/movements/outbound", Some(payload))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let remaining = allocation::Entity::find_by_id(partial_alloc_id)
        .one(app.state.db.as_ref())
        .await
        .expect("load allocation")
        .expect("allocation still present");
    assert_eq!(remaining.quantity, dec!(6));
}

#[tokio::test]
async fn outbound_ignores_missing_allocation_id() {
    let app = TestApp::new().await;
    let (lot_id, warehouse_id, unit_id) = app.seed_ledger_key(production_date()).await;

    let payload = json!({
        "lot_id": lot_id,
        "warehouse_id": warehouse_id,
        "unit_id": unit_id,
        "quantity": "40",
    });
    app.request(Method::POST, "/api/v1/movements/inbound", Some(payload))
        .await;

    let payload = json!({
        "lot_id": lot_id,
        "warehouse_id": warehouse_id,
        "unit_id": unit_id,
        "quantity": "15",
        "allocation_id": 9999,
    });
    let response = app
        .request(Method::POST, "/api/v1/movements/outbound", Some(payload))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let records = inventory_record::Entity::find()
        .all(app.state.db.as_ref())
        .await
        .expect("load inventory records");
    assert_eq!(records[0].quantity, dec!(25));
}

#[tokio::test]
async fn concurrent_outbounds_cannot_both_drain_the_same_stock() {
    let app = TestApp::new().await;
    let (lot_id, warehouse_id, unit_id) = app.seed_ledger_key(production_date()).await;

    let payload = json!({
        "lot_id": lot_id,
        "warehouse_id": warehouse_id,
        "unit_id": unit_id,
        "quantity": "5",
    });
    app.request(Method::POST, "/api/v1/movements/inbound", Some(payload))
        .await;

    // Both requests try to ship the full on-hand quantity at once. The
    // stock check reads under a row lock, so exactly one may pass.
    let drain = json!({
        "lot_id": lot_id,
        "warehouse_id": warehouse_id,
        "unit_id": unit_id,
        "quantity": "5",
    });
    let (first, second) = tokio::join!(
        app.request(Method::POST, "/api/v1/movements/outbound", Some(drain.clone())),
        app.request(Method::POST, "/api/v1/movements/outbound", Some(drain)),
    );

    let statuses = [first.status(), second.status()];
    assert_eq!(
        statuses
            .iter()
            .filter(|s| **s == StatusCode::CREATED)
            .count(),
        1,
        "exactly one outbound must land, got {statuses:?}"
    );
    assert_eq!(
        statuses
            .iter()
            .filter(|s| **s == StatusCode::UNPROCESSABLE_ENTITY)
            .count(),
        1,
        "the losing outbound must see insufficient stock, got {statuses:?}"
    );

    let records = inventory_record::Entity::find()
        .all(app.state.db.as_ref())
        .await
        .expect("load inventory records");
    assert!(records.is_empty());

    let outbound_count = stock_movement::Entity::find()
        .all(app.state.db.as_ref())
        .await
        .expect("load movements")
        .iter()
        .filter(|m| m.movement_type == "OUTBOUND")
        .count();
    assert_eq!(outbound_count, 1);
}

#[tokio::test]
async fn quantity_validation_precedes_existence_checks() {
    let app = TestApp::new().await;

    // Both defects at once: the structural failure must win over the
    // unknown lot, for either direction.
    let payload = json!({
        "lot_id": 9999,
        "warehouse_id": 9999,
        "unit_id": 9999,
        "quantity": "0",
    });
    for uri in ["/api/v1/movements/inbound", "/api/v1/movements/outbound"] {
        let response = app.request(Method::POST, uri, Some(payload.clone())).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn movements_list_filters_by_type() {
    let app = TestApp::new().await;
    let (lot_id, warehouse_id, unit_id) = app.seed_ledger_key(production_date()).await;

    let inbound = json!({
        "lot_id": lot_id,
        "warehouse_id": warehouse_id,
        "unit_id": unit_id,
        "quantity": "60",
    });
    app.request(Method::POST, "/api/v1/movements/inbound", Some(inbound))
        .await;
    let outbound = json!({
        "lot_id": lot_id,
        "warehouse_id": warehouse_id,
        "unit_id": unit_id,
        "quantity": "20",
    });
    app.request(Method::POST, "/api/v1/movements/outbound", Some(outbound))
        .await;

    let response = app
        .request(
            Method::GET,
            "/api/v1/movements?movement_type=OUTBOUND",
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = TestApp::json_body(response).await;
    let rows = body["data"].as_array().expect("movement list");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["movement_type"], "OUTBOUND");
    assert_eq!(qty(&rows[0]["quantity"]), dec!(20));

    let response = app
        .request(Method::GET, "/api/v1/movements?movement_type=SIDEWAYS", None)
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn get_movement_returns_404_for_unknown_id() {
    let app = TestApp::new().await;

    let response = app.request(Method::GET, "/api/v1/movements/123", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

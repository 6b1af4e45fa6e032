#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request},
    Router,
};
use chrono::NaiveDate;
use serde_json::Value;
use tower::ServiceExt;

use stocklot_api::{
    config::AppConfig,
    db,
    events::{self},
    AppState,
};

/// Harness that spins up the full router against a throwaway SQLite database.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    _event_task: tokio::task::JoinHandle<()>,
    _db_dir: tempfile::TempDir,
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        let db_dir = tempfile::tempdir().expect("create temp dir for test database");
        let db_path = db_dir.path().join("stocklot_test.db");

        let mut cfg = AppConfig::new(
            format!("sqlite://{}?mode=rwc", db_path.display()),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let db_arc = Arc::new(pool);
        let (event_sender, event_rx) = events::channel(256);
        let event_task = tokio::spawn(events::process_events(event_rx));

        let state = AppState::new(db_arc, cfg, event_sender);
        let router = stocklot_api::app_router().with_state(state.clone());

        Self {
            router,
            state,
            _event_task: event_task,
            _db_dir: db_dir,
        }
    }

    /// Send a JSON request against the router.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> axum::response::Response {
        let mut builder = Request::builder().method(method).uri(uri);

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// Parse a response body as JSON.
    pub async fn json_body(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read response body");
        serde_json::from_slice(&bytes).expect("parse response body")
    }

    /// Read a response body as plain text.
    pub async fn text_body(response: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read response body");
        String::from_utf8(bytes.to_vec()).expect("response body is not utf-8")
    }

    pub async fn seed_item(&self, item_code: &str) -> i64 {
        self.state
            .services
            .master_data
            .create_item(stocklot_api::services::master_data::CreateItemInput {
                item_code: item_code.to_string(),
                name: format!("Item {item_code}"),
                description: None,
            })
            .await
            .expect("seed item")
            .id
    }

    pub async fn seed_unit(&self, name: &str) -> i64 {
        self.state
            .services
            .master_data
            .create_unit(stocklot_api::services::master_data::CreateUnitInput {
                name: name.to_string(),
                conversion_rate: None,
            })
            .await
            .expect("seed unit")
            .id
    }

    pub async fn seed_warehouse(&self, name: &str) -> i64 {
        self.state
            .services
            .master_data
            .create_warehouse(stocklot_api::services::master_data::CreateWarehouseInput {
                name: name.to_string(),
                location: None,
            })
            .await
            .expect("seed warehouse")
            .id
    }

    pub async fn seed_lot(&self, item_id: i64, lot_number: &str, production_date: NaiveDate) -> i64 {
        self.state
            .services
            .master_data
            .create_lot(stocklot_api::services::master_data::CreateLotInput {
                lot_number: lot_number.to_string(),
                item_id,
                production_date,
            })
            .await
            .expect("seed lot")
            .id
    }

    /// Seed one item, lot, warehouse, and unit, returning (lot_id, warehouse_id, unit_id).
    pub async fn seed_ledger_key(&self, production_date: NaiveDate) -> (i64, i64, i64) {
        let item_id = self.seed_item("ITEM-001").await;
        let lot_id = self.seed_lot(item_id, "LOT-001", production_date).await;
        let warehouse_id = self.seed_warehouse("Main Warehouse").await;
        let unit_id = self.seed_unit("kg").await;
        (lot_id, warehouse_id, unit_id)
    }
}

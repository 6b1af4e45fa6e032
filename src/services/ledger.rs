//! Ledger store: the single source of truth for on-hand quantity.
//!
//! One `inventory_records` row per (lot, warehouse, unit) key. A missing row
//! reads as zero; rows are created by the first inbound and deleted when an
//! outbound lands the quantity on exactly zero. The functions here are
//! generic over [`ConnectionTrait`] so callers can compose them with journal
//! appends and allocation changes inside a single transaction.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QuerySelect, Set,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::inventory_record::{self, Entity as InventoryRecord};
use crate::errors::ServiceError;

/// The (lot, warehouse, unit) triple identifying one stock bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct LedgerKey {
    pub lot_id: i64,
    pub warehouse_id: i64,
    pub unit_id: i64,
}

impl LedgerKey {
    pub fn new(lot_id: i64, warehouse_id: i64, unit_id: i64) -> Self {
        Self {
            lot_id,
            warehouse_id,
            unit_id,
        }
    }
}

/// Finds the inventory record for a key, if one exists.
pub async fn find_record<C: ConnectionTrait>(
    conn: &C,
    key: &LedgerKey,
) -> Result<Option<inventory_record::Model>, ServiceError> {
    let record = InventoryRecord::find()
        .filter(inventory_record::Column::LotId.eq(key.lot_id))
        .filter(inventory_record::Column::WarehouseId.eq(key.warehouse_id))
        .filter(inventory_record::Column::UnitId.eq(key.unit_id))
        .one(conn)
        .await?;
    Ok(record)
}

/// Finds the record for a key and holds an exclusive row lock until the
/// surrounding transaction ends. Every read that feeds a quantity check
/// inside a mutating transaction must go through here, so two writers on the
/// same key cannot both check against the same stale quantity. SQLite has no
/// row locks and renders no lock clause; its single writer serializes
/// instead.
pub async fn find_record_for_update<C: ConnectionTrait>(
    conn: &C,
    key: &LedgerKey,
) -> Result<Option<inventory_record::Model>, ServiceError> {
    let record = InventoryRecord::find()
        .filter(inventory_record::Column::LotId.eq(key.lot_id))
        .filter(inventory_record::Column::WarehouseId.eq(key.warehouse_id))
        .filter(inventory_record::Column::UnitId.eq(key.unit_id))
        .lock_exclusive()
        .one(conn)
        .await?;
    Ok(record)
}

/// Returns the on-hand quantity for a key; zero when no record exists.
pub async fn on_hand<C: ConnectionTrait>(
    conn: &C,
    key: &LedgerKey,
) -> Result<Decimal, ServiceError> {
    Ok(find_record(conn, key)
        .await?
        .map(|r| r.quantity)
        .unwrap_or(Decimal::ZERO))
}

/// Applies an inbound movement: creates the record on first receipt,
/// otherwise increments it. Returns the new on-hand quantity.
pub async fn apply_inbound<C: ConnectionTrait>(
    conn: &C,
    key: &LedgerKey,
    amount: Decimal,
) -> Result<Decimal, ServiceError> {
    if amount <= Decimal::ZERO {
        return Err(ServiceError::ValidationError(
            "inbound amount must be positive".to_string(),
        ));
    }

    let now = Utc::now();
    match find_record_for_update(conn, key).await? {
        Some(record) => {
            let new_quantity = record.quantity + amount;
            let mut active: inventory_record::ActiveModel = record.into();
            active.quantity = Set(new_quantity);
            active.updated_at = Set(now);
            active.update(conn).await?;
            Ok(new_quantity)
        }
        None => {
            let active = inventory_record::ActiveModel {
                lot_id: Set(key.lot_id),
                warehouse_id: Set(key.warehouse_id),
                unit_id: Set(key.unit_id),
                quantity: Set(amount),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            };
            let created = active.insert(conn).await?;
            Ok(created.quantity)
        }
    }
}

/// Applies an outbound movement. Rejects amounts exceeding on-hand stock;
/// deletes the record when the result is exactly zero. Returns the new
/// on-hand quantity.
pub async fn apply_outbound<C: ConnectionTrait>(
    conn: &C,
    key: &LedgerKey,
    amount: Decimal,
) -> Result<Decimal, ServiceError> {
    if amount <= Decimal::ZERO {
        return Err(ServiceError::ValidationError(
            "outbound amount must be positive".to_string(),
        ));
    }

    let record = find_record_for_update(conn, key).await?.ok_or_else(|| {
        ServiceError::InsufficientStock(format!(
            "no inventory for lot {}, warehouse {}, unit {}",
            key.lot_id, key.warehouse_id, key.unit_id
        ))
    })?;

    if amount > record.quantity {
        return Err(ServiceError::InsufficientStock(format!(
            "outbound quantity {} exceeds on-hand quantity {}",
            amount, record.quantity
        )));
    }

    let new_quantity = record.quantity - amount;
    if new_quantity.is_zero() {
        InventoryRecord::delete_by_id(record.id).exec(conn).await?;
    } else {
        let mut active: inventory_record::ActiveModel = record.into();
        active.quantity = Set(new_quantity);
        active.updated_at = Set(Utc::now());
        active.update(conn).await?;
    }
    Ok(new_quantity)
}

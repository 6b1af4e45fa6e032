//! Period-end stock rollup: derives one monthly snapshot per (item, lot,
//! warehouse, unit) from the prior month's closing balances and the month's
//! movement journal.
//!
//! Each run is a full recompute inside a single transaction: existing rows
//! for the target month are discarded and rewritten, so re-running after
//! back-dated movements always yields a fresh, consistent answer.

use chrono::{Months, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;

use crate::entities::{
    lot, monthly_snapshot,
    stock_movement::{self, MovementType},
    unit, warehouse,
};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::services::movements::unwrap_transaction_error;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MonthlyRollupResult {
    pub year: i32,
    pub month: u32,
    pub count: u64,
    #[schema(value_type = Vec<Object>)]
    pub rows: Vec<monthly_snapshot::Model>,
}

/// Calendar boundaries for one rollup run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct MonthWindow {
    month_start: NaiveDate,
    next_month_start: NaiveDate,
    prev_month_start: NaiveDate,
    /// Last day of the prior month; lots produced after this date are
    /// excluded from the run entirely.
    prev_month_end: NaiveDate,
}

fn month_window(year: i32, month: u32) -> Result<MonthWindow, ServiceError> {
    let month_start = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| ServiceError::ValidationError(format!("invalid year/month {year}-{month}")))?;
    let next_month_start = month_start
        .checked_add_months(Months::new(1))
        .ok_or_else(|| ServiceError::ValidationError("month out of range".to_string()))?;
    let prev_month_start = month_start
        .checked_sub_months(Months::new(1))
        .ok_or_else(|| ServiceError::ValidationError("month out of range".to_string()))?;
    let prev_month_end = month_start
        .pred_opt()
        .ok_or_else(|| ServiceError::ValidationError("month out of range".to_string()))?;

    Ok(MonthWindow {
        month_start,
        next_month_start,
        prev_month_start,
        prev_month_end,
    })
}

#[derive(Clone)]
pub struct MonthlyRollupService {
    db: Arc<DatabaseConnection>,
    event_sender: EventSender,
}

impl MonthlyRollupService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: EventSender) -> Self {
        Self { db, event_sender }
    }

    /// Recomputes the snapshot set for a month and returns the created rows.
    #[instrument(skip(self))]
    pub async fn compute(&self, year: i32, month: u32) -> Result<MonthlyRollupResult, ServiceError> {
        let window = month_window(year, month)?;

        let rows = self
            .db
            .transaction::<_, Vec<monthly_snapshot::Model>, ServiceError>(move |txn| {
                Box::pin(async move {
                    // Discard: the month is always rebuilt from scratch.
                    monthly_snapshot::Entity::delete_many()
                        .filter(monthly_snapshot::Column::Month.eq(window.month_start))
                        .exec(txn)
                        .await?;

                    // Scope: lots that existed before the month began can
                    // have contributed movement; later lots cannot.
                    let lots = lot::Entity::find()
                        .filter(lot::Column::ProductionDate.lte(window.prev_month_end))
                        .all(txn)
                        .await?;
                    let warehouse_ids: Vec<i64> = warehouse::Entity::find()
                        .select_only()
                        .column(warehouse::Column::Id)
                        .into_tuple()
                        .all(txn)
                        .await?;
                    let unit_ids: Vec<i64> = unit::Entity::find()
                        .select_only()
                        .column(unit::Column::Id)
                        .into_tuple()
                        .all(txn)
                        .await?;

                    // Prior-month closings become this month's openings.
                    let mut openings: HashMap<(i64, i64, i64), Decimal> = HashMap::new();
                    for prev in monthly_snapshot::Entity::find()
                        .filter(monthly_snapshot::Column::Month.eq(window.prev_month_start))
                        .all(txn)
                        .await?
                    {
                        openings.insert(
                            (prev.lot_id, prev.warehouse_id, prev.unit_id),
                            prev.closing_quantity,
                        );
                    }

                    // One pass over the month's journal, aggregated by key.
                    let month_from = window
                        .month_start
                        .and_hms_opt(0, 0, 0)
                        .expect("midnight is always valid")
                        .and_utc();
                    let month_to = window
                        .next_month_start
                        .and_hms_opt(0, 0, 0)
                        .expect("midnight is always valid")
                        .and_utc();

                    let mut totals: HashMap<(i64, i64, i64), (Decimal, Decimal)> = HashMap::new();
                    for movement in stock_movement::Entity::find()
                        .filter(stock_movement::Column::OccurredAt.gte(month_from))
                        .filter(stock_movement::Column::OccurredAt.lt(month_to))
                        .all(txn)
                        .await?
                    {
                        let entry = totals
                            .entry((movement.lot_id, movement.warehouse_id, movement.unit_id))
                            .or_insert((Decimal::ZERO, Decimal::ZERO));
                        match MovementType::from_str(&movement.movement_type) {
                            Some(MovementType::Inbound) => entry.0 += movement.quantity,
                            Some(MovementType::Outbound) => entry.1 += movement.quantity,
                            None => {
                                warn!(
                                    movement_id = movement.id,
                                    movement_type = %movement.movement_type,
                                    "skipping movement with unknown type"
                                );
                            }
                        }
                    }

                    let now = Utc::now();
                    let mut new_rows = Vec::new();
                    for lot in &lots {
                        for &warehouse_id in &warehouse_ids {
                            for &unit_id in &unit_ids {
                                let key = (lot.id, warehouse_id, unit_id);
                                let opening =
                                    openings.get(&key).copied().unwrap_or(Decimal::ZERO);
                                let (incoming, outgoing) = totals
                                    .get(&key)
                                    .copied()
                                    .unwrap_or((Decimal::ZERO, Decimal::ZERO));
                                let closing = opening + incoming - outgoing;

                                // All-zero rows are omitted to keep the
                                // snapshot table sparse.
                                if opening.is_zero()
                                    && incoming.is_zero()
                                    && outgoing.is_zero()
                                    && closing.is_zero()
                                {
                                    continue;
                                }

                                new_rows.push(monthly_snapshot::ActiveModel {
                                    item_id: Set(lot.item_id),
                                    lot_id: Set(lot.id),
                                    warehouse_id: Set(warehouse_id),
                                    unit_id: Set(unit_id),
                                    month: Set(window.month_start),
                                    opening_quantity: Set(opening),
                                    incoming_quantity: Set(incoming),
                                    outgoing_quantity: Set(outgoing),
                                    closing_quantity: Set(closing),
                                    created_at: Set(now),
                                    ..Default::default()
                                });
                            }
                        }
                    }

                    for row in new_rows {
                        row.insert(txn).await?;
                    }

                    let created = monthly_snapshot::Entity::find()
                        .filter(monthly_snapshot::Column::Month.eq(window.month_start))
                        .order_by_asc(monthly_snapshot::Column::LotId)
                        .order_by_asc(monthly_snapshot::Column::WarehouseId)
                        .order_by_asc(monthly_snapshot::Column::UnitId)
                        .all(txn)
                        .await?;

                    Ok(created)
                })
            })
            .await
            .map_err(unwrap_transaction_error)?;

        let count = rows.len() as u64;
        info!(year, month, count, "monthly rollup computed");

        if let Err(e) = self
            .event_sender
            .send(Event::MonthlyRollupCompleted {
                month: window.month_start,
                row_count: count,
            })
            .await
        {
            warn!(error = %e, "failed to emit rollup event");
        }

        Ok(MonthlyRollupResult {
            year,
            month,
            count,
            rows,
        })
    }

    /// Returns the stored snapshot rows for a month.
    #[instrument(skip(self))]
    pub async fn list_snapshots(
        &self,
        year: i32,
        month: u32,
    ) -> Result<Vec<monthly_snapshot::Model>, ServiceError> {
        let window = month_window(year, month)?;
        Ok(monthly_snapshot::Entity::find()
            .filter(monthly_snapshot::Column::Month.eq(window.month_start))
            .order_by_asc(monthly_snapshot::Column::LotId)
            .order_by_asc(monthly_snapshot::Column::WarehouseId)
            .order_by_asc(monthly_snapshot::Column::UnitId)
            .all(self.db.as_ref())
            .await?)
    }

    /// Distinct months with stored snapshots, newest first.
    #[instrument(skip(self))]
    pub async fn list_months(&self) -> Result<Vec<NaiveDate>, ServiceError> {
        Ok(monthly_snapshot::Entity::find()
            .select_only()
            .column(monthly_snapshot::Column::Month)
            .distinct()
            .order_by_desc(monthly_snapshot::Column::Month)
            .into_tuple()
            .all(self.db.as_ref())
            .await?)
    }
}

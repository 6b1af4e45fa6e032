//! Flat, name-resolved report rows for export.
//!
//! Reports are read-only projections: the inventory report joins the current
//! stock buckets with master data and the live allocation set, the monthly
//! report turns one month's snapshots and journal into a day-by-day balance
//! series. Both render as JSON or CSV.

use chrono::{DateTime, Months, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{instrument, warn};
use utoipa::{IntoParams, ToSchema};

use crate::entities::{
    allocation, inventory_record, item, lot, monthly_snapshot,
    stock_movement::{self, MovementType},
    unit, warehouse,
};
use crate::errors::ServiceError;

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ReportFilters {
    pub item_id: Option<i64>,
    pub warehouse_id: Option<i64>,
}

/// One stock bucket with every id resolved to its display name.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct InventoryReportRow {
    pub item_code: String,
    pub item_name: String,
    pub warehouse_name: String,
    pub lot_number: String,
    pub production_date: NaiveDate,
    pub unit_name: String,
    pub quantity: Decimal,
    pub allocated_quantity: Decimal,
    pub available_quantity: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct InventoryReport {
    pub generated_at: DateTime<Utc>,
    pub total_rows: u64,
    pub rows: Vec<InventoryReportRow>,
}

impl InventoryReport {
    pub fn to_csv(&self) -> String {
        let mut lines = vec![
            "item_code,item_name,warehouse,lot_number,production_date,quantity,unit,allocated_quantity,available_quantity"
                .to_string(),
        ];
        for row in &self.rows {
            lines.push(format!(
                "{},{},{},{},{},{},{},{},{}",
                csv_quote(&row.item_code),
                csv_quote(&row.item_name),
                csv_quote(&row.warehouse_name),
                csv_quote(&row.lot_number),
                row.production_date,
                row.quantity,
                csv_quote(&row.unit_name),
                row.allocated_quantity,
                row.available_quantity,
            ));
        }
        lines.join("\n")
    }
}

/// One day's stock flow for an item across all its keys.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DailyFlow {
    pub date: NaiveDate,
    pub inbound_quantity: Decimal,
    pub outbound_quantity: Decimal,
    /// Opening plus cumulative inbound minus cumulative outbound through
    /// this day.
    pub balance: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MonthlyItemReport {
    pub item_id: i64,
    pub item_code: String,
    pub item_name: String,
    pub opening_quantity: Decimal,
    pub closing_balance: Decimal,
    pub daily: Vec<DailyFlow>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MonthlyReport {
    pub year: i32,
    pub month: u32,
    pub generated_at: DateTime<Utc>,
    pub items: Vec<MonthlyItemReport>,
}

impl MonthlyReport {
    pub fn to_csv(&self) -> String {
        let mut lines =
            vec!["item_code,item_name,date,inbound_quantity,outbound_quantity,balance".to_string()];
        for item in &self.items {
            for day in &item.daily {
                lines.push(format!(
                    "{},{},{},{},{},{}",
                    csv_quote(&item.item_code),
                    csv_quote(&item.item_name),
                    day.date,
                    day.inbound_quantity,
                    day.outbound_quantity,
                    day.balance,
                ));
            }
        }
        lines.join("\n")
    }
}

fn csv_quote(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

#[derive(Clone)]
pub struct ReportService {
    db: Arc<DatabaseConnection>,
}

impl ReportService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Current stock with allocation columns, one row per inventory record,
    /// ordered by item name, warehouse name, then lot number.
    #[instrument(skip(self, filters))]
    pub async fn inventory_report(
        &self,
        filters: ReportFilters,
    ) -> Result<InventoryReport, ServiceError> {
        let db = self.db.as_ref();

        let items: HashMap<i64, item::Model> = item::Entity::find()
            .all(db)
            .await?
            .into_iter()
            .map(|m| (m.id, m))
            .collect();
        let lots: HashMap<i64, lot::Model> = lot::Entity::find()
            .all(db)
            .await?
            .into_iter()
            .map(|m| (m.id, m))
            .collect();
        let warehouses: HashMap<i64, String> = warehouse::Entity::find()
            .all(db)
            .await?
            .into_iter()
            .map(|m| (m.id, m.name))
            .collect();
        let units: HashMap<i64, String> = unit::Entity::find()
            .all(db)
            .await?
            .into_iter()
            .map(|m| (m.id, m.name))
            .collect();

        let mut allocated: HashMap<(i64, i64, i64), Decimal> = HashMap::new();
        for alloc in allocation::Entity::find().all(db).await? {
            *allocated
                .entry((alloc.lot_id, alloc.warehouse_id, alloc.unit_id))
                .or_insert(Decimal::ZERO) += alloc.quantity;
        }

        let mut query = inventory_record::Entity::find();
        if let Some(warehouse_id) = filters.warehouse_id {
            query = query.filter(inventory_record::Column::WarehouseId.eq(warehouse_id));
        }
        let records = query.all(db).await?;

        let mut rows = Vec::with_capacity(records.len());
        for record in records {
            let Some(lot) = lots.get(&record.lot_id) else {
                warn!(lot_id = record.lot_id, "inventory record without lot skipped");
                continue;
            };
            if let Some(item_id) = filters.item_id {
                if lot.item_id != item_id {
                    continue;
                }
            }
            let Some(item) = items.get(&lot.item_id) else {
                warn!(item_id = lot.item_id, "lot without item skipped");
                continue;
            };
            let Some(warehouse_name) = warehouses.get(&record.warehouse_id) else {
                continue;
            };
            let Some(unit_name) = units.get(&record.unit_id) else {
                continue;
            };

            let key = (record.lot_id, record.warehouse_id, record.unit_id);
            let allocated_quantity = allocated.get(&key).copied().unwrap_or(Decimal::ZERO);

            rows.push(InventoryReportRow {
                item_code: item.item_code.clone(),
                item_name: item.name.clone(),
                warehouse_name: warehouse_name.clone(),
                lot_number: lot.lot_number.clone(),
                production_date: lot.production_date,
                unit_name: unit_name.clone(),
                quantity: record.quantity,
                allocated_quantity,
                available_quantity: record.quantity - allocated_quantity,
            });
        }

        rows.sort_by(|a, b| {
            (&a.item_name, &a.warehouse_name, &a.lot_number)
                .cmp(&(&b.item_name, &b.warehouse_name, &b.lot_number))
        });

        Ok(InventoryReport {
            generated_at: Utc::now(),
            total_rows: rows.len() as u64,
            rows,
        })
    }

    /// Day-by-day stock flow per item for one month. Openings come from the
    /// month's stored snapshots, so items appear only once the month's rollup
    /// has been computed; the balance series then folds the month's journal
    /// over that opening.
    #[instrument(skip(self, filters))]
    pub async fn monthly_report(
        &self,
        year: i32,
        month: u32,
        filters: ReportFilters,
    ) -> Result<MonthlyReport, ServiceError> {
        let month_start = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
            ServiceError::ValidationError(format!("invalid year/month {year}-{month}"))
        })?;
        let next_month_start = month_start
            .checked_add_months(Months::new(1))
            .ok_or_else(|| ServiceError::ValidationError("month out of range".to_string()))?;

        let db = self.db.as_ref();

        let mut snapshot_query = monthly_snapshot::Entity::find()
            .filter(monthly_snapshot::Column::Month.eq(month_start));
        if let Some(item_id) = filters.item_id {
            snapshot_query = snapshot_query.filter(monthly_snapshot::Column::ItemId.eq(item_id));
        }
        if let Some(warehouse_id) = filters.warehouse_id {
            snapshot_query =
                snapshot_query.filter(monthly_snapshot::Column::WarehouseId.eq(warehouse_id));
        }

        let mut openings: HashMap<i64, Decimal> = HashMap::new();
        for snapshot in snapshot_query.all(db).await? {
            *openings.entry(snapshot.item_id).or_insert(Decimal::ZERO) +=
                snapshot.opening_quantity;
        }

        let lot_items: HashMap<i64, i64> = lot::Entity::find()
            .all(db)
            .await?
            .into_iter()
            .map(|l| (l.id, l.item_id))
            .collect();

        let month_from = month_start
            .and_hms_opt(0, 0, 0)
            .expect("midnight is always valid")
            .and_utc();
        let month_to = next_month_start
            .and_hms_opt(0, 0, 0)
            .expect("midnight is always valid")
            .and_utc();

        let mut movement_query = stock_movement::Entity::find()
            .filter(stock_movement::Column::OccurredAt.gte(month_from))
            .filter(stock_movement::Column::OccurredAt.lt(month_to));
        if let Some(warehouse_id) = filters.warehouse_id {
            movement_query =
                movement_query.filter(stock_movement::Column::WarehouseId.eq(warehouse_id));
        }

        // (item, day) -> (inbound, outbound). Movements for items with no
        // snapshot this month carry no opening and are left out, matching
        // the snapshot-driven item set.
        let mut flows: HashMap<(i64, NaiveDate), (Decimal, Decimal)> = HashMap::new();
        for movement in movement_query.all(db).await? {
            let Some(&item_id) = lot_items.get(&movement.lot_id) else {
                continue;
            };
            if !openings.contains_key(&item_id) {
                continue;
            }
            let day = movement.occurred_at.date_naive();
            let entry = flows
                .entry((item_id, day))
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

        let items: HashMap<i64, item::Model> = item::Entity::find()
            .all(db)
            .await?
            .into_iter()
            .map(|m| (m.id, m))
            .collect();

        let mut reports = Vec::with_capacity(openings.len());
        for (&item_id, &opening) in &openings {
            let Some(item) = items.get(&item_id) else {
                warn!(item_id, "snapshot without item skipped");
                continue;
            };

            let mut daily = Vec::new();
            let mut balance = opening;
            let mut day = month_start;
            while day < next_month_start {
                let (inbound, outbound) = flows
                    .get(&(item_id, day))
                    .copied()
                    .unwrap_or((Decimal::ZERO, Decimal::ZERO));
                balance = balance + inbound - outbound;
                daily.push(DailyFlow {
                    date: day,
                    inbound_quantity: inbound,
                    outbound_quantity: outbound,
                    balance,
                });
                day = day.succ_opt().expect("date within month range");
            }

            reports.push(MonthlyItemReport {
                item_id,
                item_code: item.item_code.clone(),
                item_name: item.name.clone(),
                opening_quantity: opening,
                closing_balance: balance,
                daily,
            });
        }

        reports.sort_by(|a, b| a.item_name.cmp(&b.item_name));

        Ok(MonthlyReport {
            year,
            month,
            generated_at: Utc::now(),
            items: reports,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn csv_quoting_doubles_embedded_quotes() {
        assert_eq!(csv_quote("plain"), "\"plain\"");
        assert_eq!(csv_quote("5\" pipe"), "\"5\"\" pipe\"");
    }

    #[test]
    fn inventory_csv_has_header_and_one_line_per_row() {
        let report = InventoryReport {
            generated_at: Utc::now(),
            total_rows: 1,
            rows: vec![InventoryReportRow {
                item_code: "ITEM-001".to_string(),
                item_name: "Widget".to_string(),
                warehouse_name: "Main Warehouse".to_string(),
                lot_number: "LOT-001".to_string(),
                production_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
                unit_name: "kg".to_string(),
                quantity: dec!(100),
                allocated_quantity: dec!(20),
                available_quantity: dec!(80),
            }],
        };

        let csv = report.to_csv();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("item_code,item_name,warehouse"));
        assert!(lines[1].contains("\"ITEM-001\""));
        assert!(lines[1].contains("2024-03-01"));
    }
}

//! Read side of the ledger: inventory listings annotated with allocated and
//! available quantities. No independent state; everything is computed from
//! the inventory records plus the live allocation set.

use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::instrument;
use utoipa::{IntoParams, ToSchema};

use crate::entities::{inventory_record, lot};
use crate::errors::ServiceError;
use crate::services::allocations::other_allocations_quantity;
use crate::services::ledger::LedgerKey;

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct InventoryFilters {
    pub item_id: Option<i64>,
    pub lot_id: Option<i64>,
    pub warehouse_id: Option<i64>,
}

/// One stock bucket with its reservation context.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct InventoryView {
    pub id: i64,
    pub lot_id: i64,
    pub warehouse_id: i64,
    pub unit_id: i64,
    pub quantity: Decimal,
    pub allocated_quantity: Decimal,
    pub available_quantity: Decimal,
}

#[derive(Clone)]
pub struct InventoryService {
    db: Arc<DatabaseConnection>,
}

impl InventoryService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self, filters))]
    pub async fn list_inventory(
        &self,
        filters: InventoryFilters,
    ) -> Result<Vec<InventoryView>, ServiceError> {
        let mut query = inventory_record::Entity::find();

        if let Some(lot_id) = filters.lot_id {
            query = query.filter(inventory_record::Column::LotId.eq(lot_id));
        }
        if let Some(warehouse_id) = filters.warehouse_id {
            query = query.filter(inventory_record::Column::WarehouseId.eq(warehouse_id));
        }
        if let Some(item_id) = filters.item_id {
            let lot_ids: Vec<i64> = lot::Entity::find()
                .filter(lot::Column::ItemId.eq(item_id))
                .select_only()
                .column(lot::Column::Id)
                .into_tuple()
                .all(self.db.as_ref())
                .await?;
            query = query.filter(inventory_record::Column::LotId.is_in(lot_ids));
        }

        let records = query
            .order_by_asc(inventory_record::Column::LotId)
            .order_by_asc(inventory_record::Column::WarehouseId)
            .order_by_asc(inventory_record::Column::UnitId)
            .all(self.db.as_ref())
            .await?;

        let mut views = Vec::with_capacity(records.len());
        for record in records {
            let key = LedgerKey::new(record.lot_id, record.warehouse_id, record.unit_id);
            let allocated =
                other_allocations_quantity(self.db.as_ref(), &key, None).await?;
            views.push(InventoryView {
                id: record.id,
                lot_id: record.lot_id,
                warehouse_id: record.warehouse_id,
                unit_id: record.unit_id,
                quantity: record.quantity,
                allocated_quantity: allocated,
                available_quantity: record.quantity - allocated,
            });
        }

        Ok(views)
    }
}

//! Allocation (reservation) workflows and the derived-quantity functions.
//!
//! An allocation claims on-hand stock for a future outbound. The capacity
//! rule is enforced at create and update time inside a transaction: the sum
//! of live allocations for a ledger key never exceeds the key's on-hand
//! quantity. `other_allocations_quantity` and `available_quantity` are the
//! single definition of that arithmetic, shared by write paths and by
//! inventory-browsing reads.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::{IntoParams, ToSchema};

use crate::entities::{allocation, lot};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::services::movements::unwrap_transaction_error;
use crate::services::{ledger, ledger::LedgerKey, master_data};

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateAllocationInput {
    pub lot_id: i64,
    pub warehouse_id: i64,
    pub unit_id: i64,
    pub quantity: Decimal,
    pub allocation_date: Option<DateTime<Utc>>,
    pub reference_number: Option<String>,
}

/// The ledger key of an allocation is immutable; only these fields change.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateAllocationInput {
    pub quantity: Option<Decimal>,
    pub allocation_date: Option<DateTime<Utc>>,
    pub reference_number: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct AllocationFilters {
    pub item_id: Option<i64>,
    pub warehouse_id: Option<i64>,
    pub lot_id: Option<i64>,
    pub reference_number: Option<String>,
}

/// Allocation annotated with the ledger context a caller needs to render
/// "allocated" and "available" columns.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AllocationDetail {
    #[serde(flatten)]
    #[schema(value_type = Object)]
    pub allocation: allocation::Model,
    pub on_hand_quantity: Decimal,
    pub other_allocations_quantity: Decimal,
    pub available_quantity: Decimal,
}

/// Sum of allocation quantities for a ledger key, optionally excluding one
/// allocation (used when re-validating that allocation's own update).
pub async fn other_allocations_quantity<C: ConnectionTrait>(
    conn: &C,
    key: &LedgerKey,
    excluding: Option<i64>,
) -> Result<Decimal, ServiceError> {
    let mut query = allocation::Entity::find()
        .filter(allocation::Column::LotId.eq(key.lot_id))
        .filter(allocation::Column::WarehouseId.eq(key.warehouse_id))
        .filter(allocation::Column::UnitId.eq(key.unit_id));
    if let Some(id) = excluding {
        query = query.filter(allocation::Column::Id.ne(id));
    }

    let allocations = query.all(conn).await?;
    Ok(allocations
        .iter()
        .fold(Decimal::ZERO, |sum, a| sum + a.quantity))
}

/// On-hand minus all other live allocations for the key.
pub async fn available_quantity<C: ConnectionTrait>(
    conn: &C,
    key: &LedgerKey,
    excluding: Option<i64>,
) -> Result<Decimal, ServiceError> {
    let on_hand = ledger::on_hand(conn, key).await?;
    let allocated = other_allocations_quantity(conn, key, excluding).await?;
    Ok(on_hand - allocated)
}

/// Service managing stock reservations.
#[derive(Clone)]
pub struct AllocationService {
    db: Arc<DatabaseConnection>,
    event_sender: EventSender,
}

impl AllocationService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: EventSender) -> Self {
        Self { db, event_sender }
    }

    #[instrument(skip(self, input), fields(lot_id = input.lot_id, warehouse_id = input.warehouse_id, unit_id = input.unit_id))]
    pub async fn create_allocation(
        &self,
        input: CreateAllocationInput,
    ) -> Result<allocation::Model, ServiceError> {
        if input.quantity <= Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "quantity must be positive".to_string(),
            ));
        }

        let key = LedgerKey::new(input.lot_id, input.warehouse_id, input.unit_id);
        let allocation_date = input.allocation_date.unwrap_or_else(Utc::now);

        let created = self
            .db
            .transaction::<_, allocation::Model, ServiceError>(move |txn| {
                Box::pin(async move {
                    master_data::ensure_key_entities_exist(txn, &key).await?;

                    // Lock the inventory row so a concurrent outbound cannot
                    // remove the stock this capacity check counts on.
                    let record =
                        ledger::find_record_for_update(txn, &key).await?.ok_or_else(|| {
                            ServiceError::NotFound(
                                "no inventory for this lot, warehouse, and unit combination"
                                    .to_string(),
                            )
                        })?;

                    let allocated = other_allocations_quantity(txn, &key, None).await?;
                    let available = record.quantity - allocated;
                    if input.quantity > available {
                        return Err(ServiceError::CapacityExceeded {
                            available,
                            requested: input.quantity,
                        });
                    }

                    let now = Utc::now();
                    let created = allocation::ActiveModel {
                        lot_id: Set(key.lot_id),
                        warehouse_id: Set(key.warehouse_id),
                        unit_id: Set(key.unit_id),
                        quantity: Set(input.quantity),
                        allocation_date: Set(allocation_date),
                        reference_number: Set(input.reference_number),
                        created_at: Set(now),
                        updated_at: Set(now),
                        ..Default::default()
                    }
                    .insert(txn)
                    .await?;

                    Ok(created)
                })
            })
            .await
            .map_err(unwrap_transaction_error)?;

        info!(allocation_id = created.id, quantity = %created.quantity, "allocation created");

        if let Err(e) = self
            .event_sender
            .send(Event::AllocationCreated {
                allocation_id: created.id,
                lot_id: created.lot_id,
                warehouse_id: created.warehouse_id,
                unit_id: created.unit_id,
                quantity: created.quantity,
            })
            .await
        {
            warn!(error = %e, "failed to emit allocation created event");
        }

        Ok(created)
    }

    #[instrument(skip(self, input))]
    pub async fn update_allocation(
        &self,
        id: i64,
        input: UpdateAllocationInput,
    ) -> Result<allocation::Model, ServiceError> {
        if let Some(quantity) = input.quantity {
            if quantity <= Decimal::ZERO {
                return Err(ServiceError::ValidationError(
                    "quantity must be positive".to_string(),
                ));
            }
        }

        let updated = self
            .db
            .transaction::<_, allocation::Model, ServiceError>(move |txn| {
                Box::pin(async move {
                    let existing = allocation::Entity::find_by_id(id)
                        .one(txn)
                        .await?
                        .ok_or_else(|| {
                            ServiceError::NotFound(format!("allocation {id} not found"))
                        })?;

                    let key = LedgerKey::new(
                        existing.lot_id,
                        existing.warehouse_id,
                        existing.unit_id,
                    );

                    if let Some(quantity) = input.quantity {
                        let record = ledger::find_record_for_update(txn, &key)
                            .await?
                            .ok_or_else(|| {
                                ServiceError::NotFound(
                                    "no inventory for this lot, warehouse, and unit combination"
                                        .to_string(),
                                )
                            })?;

                        let others = other_allocations_quantity(txn, &key, Some(id)).await?;
                        let available = record.quantity - others;
                        if quantity > available {
                            return Err(ServiceError::CapacityExceeded {
                                available,
                                requested: quantity,
                            });
                        }
                    }

                    let mut active: allocation::ActiveModel = existing.into();
                    if let Some(quantity) = input.quantity {
                        active.quantity = Set(quantity);
                    }
                    if let Some(date) = input.allocation_date {
                        active.allocation_date = Set(date);
                    }
                    if input.reference_number.is_some() {
                        active.reference_number = Set(input.reference_number);
                    }
                    active.updated_at = Set(Utc::now());

                    Ok(active.update(txn).await?)
                })
            })
            .await
            .map_err(unwrap_transaction_error)?;

        info!(allocation_id = updated.id, quantity = %updated.quantity, "allocation updated");

        if let Err(e) = self
            .event_sender
            .send(Event::AllocationUpdated {
                allocation_id: updated.id,
                quantity: updated.quantity,
            })
            .await
        {
            warn!(error = %e, "failed to emit allocation updated event");
        }

        Ok(updated)
    }

    /// Releases an allocation unconditionally, returning the removed record.
    #[instrument(skip(self))]
    pub async fn release_allocation(&self, id: i64) -> Result<allocation::Model, ServiceError> {
        let existing = allocation::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("allocation {id} not found")))?;

        allocation::Entity::delete_by_id(id)
            .exec(self.db.as_ref())
            .await?;

        info!(allocation_id = id, "allocation released");

        if let Err(e) = self
            .event_sender
            .send(Event::AllocationReleased { allocation_id: id })
            .await
        {
            warn!(error = %e, "failed to emit allocation released event");
        }

        Ok(existing)
    }

    #[instrument(skip(self))]
    pub async fn get_allocation(&self, id: i64) -> Result<AllocationDetail, ServiceError> {
        let allocation = allocation::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("allocation {id} not found")))?;

        let key = LedgerKey::new(
            allocation.lot_id,
            allocation.warehouse_id,
            allocation.unit_id,
        );
        let on_hand = ledger::on_hand(self.db.as_ref(), &key).await?;
        let others = other_allocations_quantity(self.db.as_ref(), &key, Some(id)).await?;

        Ok(AllocationDetail {
            allocation,
            on_hand_quantity: on_hand,
            other_allocations_quantity: others,
            available_quantity: on_hand - others,
        })
    }

    /// Lists allocations, newest allocation date first.
    #[instrument(skip(self, filters))]
    pub async fn list_allocations(
        &self,
        filters: AllocationFilters,
    ) -> Result<Vec<allocation::Model>, ServiceError> {
        let mut query = allocation::Entity::find();

        if let Some(warehouse_id) = filters.warehouse_id {
            query = query.filter(allocation::Column::WarehouseId.eq(warehouse_id));
        }
        if let Some(lot_id) = filters.lot_id {
            query = query.filter(allocation::Column::LotId.eq(lot_id));
        }
        if let Some(reference) = &filters.reference_number {
            query = query.filter(allocation::Column::ReferenceNumber.contains(reference));
        }
        if let Some(item_id) = filters.item_id {
            let lot_ids: Vec<i64> = lot::Entity::find()
                .filter(lot::Column::ItemId.eq(item_id))
                .select_only()
                .column(lot::Column::Id)
                .into_tuple()
                .all(self.db.as_ref())
                .await?;
            query = query.filter(allocation::Column::LotId.is_in(lot_ids));
        }

        Ok(query
            .order_by_desc(allocation::Column::AllocationDate)
            .all(self.db.as_ref())
            .await?)
    }
}

//! Inbound/outbound movement workflows and the movement journal.
//!
//! Each workflow runs as one database transaction: ledger mutation, journal
//! append, and any allocation adjustment commit together or not at all.
//! Validation always runs structural checks first, then referential
//! existence, then stock checks.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionError, TransactionTrait,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::{IntoParams, ToSchema};

use crate::entities::{
    allocation,
    lot,
    stock_movement::{self, MovementType},
};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::services::{ledger, ledger::LedgerKey, master_data};

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RecordInboundInput {
    pub lot_id: i64,
    pub warehouse_id: i64,
    pub unit_id: i64,
    pub quantity: Decimal,
    pub occurred_at: Option<DateTime<Utc>>,
    pub reference_number: Option<String>,
    pub barcode_data: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RecordOutboundInput {
    pub lot_id: i64,
    pub warehouse_id: i64,
    pub unit_id: i64,
    pub quantity: Decimal,
    pub occurred_at: Option<DateTime<Utc>>,
    pub reference_number: Option<String>,
    pub barcode_data: Option<String>,
    /// Allocation consumed by this outbound, if any. Best-effort: an id that
    /// no longer resolves is ignored rather than failing the movement.
    pub allocation_id: Option<i64>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct MovementFilters {
    pub start_date: Option<NaiveDate>,
    /// Inclusive: the whole end day is covered.
    pub end_date: Option<NaiveDate>,
    pub item_id: Option<i64>,
    pub warehouse_id: Option<i64>,
    pub lot_id: Option<i64>,
    /// "INBOUND" or "OUTBOUND"
    pub movement_type: Option<String>,
}

/// Coordinates ledger mutations with journal appends.
#[derive(Clone)]
pub struct MovementService {
    db: Arc<DatabaseConnection>,
    event_sender: EventSender,
}

impl MovementService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: EventSender) -> Self {
        Self { db, event_sender }
    }

    #[instrument(skip(self, input), fields(lot_id = input.lot_id, warehouse_id = input.warehouse_id, unit_id = input.unit_id))]
    pub async fn record_inbound(
        &self,
        input: RecordInboundInput,
    ) -> Result<stock_movement::Model, ServiceError> {
        if input.quantity <= Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "quantity must be positive".to_string(),
            ));
        }

        let key = LedgerKey::new(input.lot_id, input.warehouse_id, input.unit_id);
        let occurred_at = input.occurred_at.unwrap_or_else(Utc::now);

        let (movement, new_on_hand) = self
            .db
            .transaction::<_, (stock_movement::Model, Decimal), ServiceError>(move |txn| {
                Box::pin(async move {
                    master_data::ensure_key_entities_exist(txn, &key).await?;

                    let new_on_hand = ledger::apply_inbound(txn, &key, input.quantity).await?;

                    let movement = stock_movement::ActiveModel {
                        movement_type: Set(MovementType::Inbound.as_str().to_string()),
                        lot_id: Set(key.lot_id),
                        warehouse_id: Set(key.warehouse_id),
                        unit_id: Set(key.unit_id),
                        quantity: Set(input.quantity),
                        occurred_at: Set(occurred_at),
                        reference_number: Set(input.reference_number),
                        barcode_data: Set(input.barcode_data),
                        created_at: Set(Utc::now()),
                        ..Default::default()
                    }
                    .insert(txn)
                    .await?;

                    Ok((movement, new_on_hand))
                })
            })
            .await
            .map_err(unwrap_transaction_error)?;

        info!(
            movement_id = movement.id,
            quantity = %movement.quantity,
            new_on_hand = %new_on_hand,
            "inbound movement recorded"
        );

        if let Err(e) = self
            .event_sender
            .send(Event::InboundRecorded {
                movement_id: movement.id,
                lot_id: key.lot_id,
                warehouse_id: key.warehouse_id,
                unit_id: key.unit_id,
                quantity: movement.quantity,
                new_on_hand,
            })
            .await
        {
            warn!(error = %e, "failed to emit inbound event");
        }

        Ok(movement)
    }

    #[instrument(skip(self, input), fields(lot_id = input.lot_id, warehouse_id = input.warehouse_id, unit_id = input.unit_id))]
    pub async fn record_outbound(
        &self,
        input: RecordOutboundInput,
    ) -> Result<stock_movement::Model, ServiceError> {
        if input.quantity <= Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "quantity must be positive".to_string(),
            ));
        }

        let key = LedgerKey::new(input.lot_id, input.warehouse_id, input.unit_id);
        let occurred_at = input.occurred_at.unwrap_or_else(Utc::now);
        let linked_allocation = input.allocation_id;

        let (movement, new_on_hand, consumed_allocation) = self
            .db
            .transaction::<_, (stock_movement::Model, Decimal, Option<i64>), ServiceError>(
                move |txn| {
                    Box::pin(async move {
                        master_data::ensure_key_entities_exist(txn, &key).await?;

                        let new_on_hand =
                            ledger::apply_outbound(txn, &key, input.quantity).await?;

                        let movement = stock_movement::ActiveModel {
                            movement_type: Set(MovementType::Outbound.as_str().to_string()),
                            lot_id: Set(key.lot_id),
                            warehouse_id: Set(key.warehouse_id),
                            unit_id: Set(key.unit_id),
                            quantity: Set(input.quantity),
                            occurred_at: Set(occurred_at),
                            reference_number: Set(input.reference_number),
                            barcode_data: Set(input.barcode_data),
                            created_at: Set(Utc::now()),
                            ..Default::default()
                        }
                        .insert(txn)
                        .await?;

                        // Optional allocation consumption: fully consumed
                        // allocations are removed, larger ones reduced. A
                        // missing id is ignored.
                        let mut consumed = None;
                        if let Some(allocation_id) = linked_allocation {
                            if let Some(alloc) =
                                allocation::Entity::find_by_id(allocation_id).one(txn).await?
                            {
                                if alloc.quantity <= input.quantity {
                                    allocation::Entity::delete_by_id(alloc.id).exec(txn).await?;
                                } else {
                                    let remaining = alloc.quantity - input.quantity;
                                    let mut active: allocation::ActiveModel = alloc.into();
                                    active.quantity = Set(remaining);
                                    active.updated_at = Set(Utc::now());
                                    active.update(txn).await?;
                                }
                                consumed = Some(allocation_id);
                            }
                        }

                        Ok((movement, new_on_hand, consumed))
                    })
                },
            )
            .await
            .map_err(unwrap_transaction_error)?;

        info!(
            movement_id = movement.id,
            quantity = %movement.quantity,
            new_on_hand = %new_on_hand,
            ?consumed_allocation,
            "outbound movement recorded"
        );

        if let Err(e) = self
            .event_sender
            .send(Event::OutboundRecorded {
                movement_id: movement.id,
                lot_id: key.lot_id,
                warehouse_id: key.warehouse_id,
                unit_id: key.unit_id,
                quantity: movement.quantity,
                new_on_hand,
                consumed_allocation_id: consumed_allocation,
            })
            .await
        {
            warn!(error = %e, "failed to emit outbound event");
        }

        Ok(movement)
    }

    #[instrument(skip(self))]
    pub async fn get_movement(&self, id: i64) -> Result<stock_movement::Model, ServiceError> {
        stock_movement::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("movement {id} not found")))
    }

    /// Lists journal entries, most recent first. Each call re-executes the
    /// query; there is no stateful cursor.
    #[instrument(skip(self, filters))]
    pub async fn list_movements(
        &self,
        filters: MovementFilters,
    ) -> Result<Vec<stock_movement::Model>, ServiceError> {
        let mut query = stock_movement::Entity::find();

        if let Some(start) = filters.start_date {
            let from = start
                .and_hms_opt(0, 0, 0)
                .map(|dt| dt.and_utc())
                .ok_or_else(|| ServiceError::ValidationError("invalid start_date".into()))?;
            query = query.filter(stock_movement::Column::OccurredAt.gte(from));
        }
        if let Some(end) = filters.end_date {
            let to = end
                .succ_opt()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|dt| dt.and_utc())
                .ok_or_else(|| ServiceError::ValidationError("invalid end_date".into()))?;
            query = query.filter(stock_movement::Column::OccurredAt.lt(to));
        }
        if let Some(warehouse_id) = filters.warehouse_id {
            query = query.filter(stock_movement::Column::WarehouseId.eq(warehouse_id));
        }
        if let Some(lot_id) = filters.lot_id {
            query = query.filter(stock_movement::Column::LotId.eq(lot_id));
        }
        if let Some(movement_type) = &filters.movement_type {
            let parsed = MovementType::from_str(movement_type).ok_or_else(|| {
                ServiceError::ValidationError(format!(
                    "movement_type must be INBOUND or OUTBOUND, got {movement_type}"
                ))
            })?;
            query = query.filter(stock_movement::Column::MovementType.eq(parsed.as_str()));
        }
        if let Some(item_id) = filters.item_id {
            let lot_ids: Vec<i64> = lot::Entity::find()
                .filter(lot::Column::ItemId.eq(item_id))
                .select_only()
                .column(lot::Column::Id)
                .into_tuple()
                .all(self.db.as_ref())
                .await?;
            query = query.filter(stock_movement::Column::LotId.is_in(lot_ids));
        }

        Ok(query
            .order_by_desc(stock_movement::Column::OccurredAt)
            .all(self.db.as_ref())
            .await?)
    }
}

pub(crate) fn unwrap_transaction_error(err: TransactionError<ServiceError>) -> ServiceError {
    match err {
        TransactionError::Connection(db_err) => ServiceError::DatabaseError(db_err),
        TransactionError::Transaction(service_err) => service_err,
    }
}

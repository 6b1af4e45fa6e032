//! Reference-data management: items, units, warehouses, and lots.
//!
//! CRUD with uniqueness checks and referential-integrity guards before
//! delete. The existence lookups at the bottom are consumed by the movement
//! and allocation workflows inside their transactions.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;

use crate::entities::{
    allocation, inventory_record, item, lot, monthly_snapshot, stock_movement, unit, warehouse,
};
use crate::errors::ServiceError;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateItemInput {
    pub item_code: String,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateItemInput {
    pub item_code: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateUnitInput {
    pub name: String,
    pub conversion_rate: Option<Decimal>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateUnitInput {
    pub name: Option<String>,
    pub conversion_rate: Option<Decimal>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateWarehouseInput {
    pub name: String,
    pub location: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateWarehouseInput {
    pub name: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateLotInput {
    pub lot_number: String,
    pub item_id: i64,
    pub production_date: NaiveDate,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateLotInput {
    pub lot_number: Option<String>,
    pub production_date: Option<NaiveDate>,
}

fn required(value: &str, field: &str) -> Result<(), ServiceError> {
    if value.trim().is_empty() {
        return Err(ServiceError::ValidationError(format!(
            "{field} must not be empty"
        )));
    }
    Ok(())
}

/// Service for reference-data CRUD.
#[derive(Clone)]
pub struct MasterDataService {
    db: Arc<DatabaseConnection>,
}

impl MasterDataService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    // Items

    #[instrument(skip(self))]
    pub async fn list_items(&self) -> Result<Vec<item::Model>, ServiceError> {
        Ok(item::Entity::find()
            .order_by_asc(item::Column::ItemCode)
            .all(self.db.as_ref())
            .await?)
    }

    #[instrument(skip(self))]
    pub async fn get_item(&self, id: i64) -> Result<item::Model, ServiceError> {
        item::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("item {id} not found")))
    }

    #[instrument(skip(self, input))]
    pub async fn create_item(&self, input: CreateItemInput) -> Result<item::Model, ServiceError> {
        required(&input.item_code, "item_code")?;
        required(&input.name, "name")?;

        let duplicate = item::Entity::find()
            .filter(item::Column::ItemCode.eq(input.item_code.clone()))
            .one(self.db.as_ref())
            .await?;
        if duplicate.is_some() {
            return Err(ServiceError::Conflict(format!(
                "item code {} already exists",
                input.item_code
            )));
        }

        let now = Utc::now();
        let created = item::ActiveModel {
            item_code: Set(input.item_code),
            name: Set(input.name),
            description: Set(input.description),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(self.db.as_ref())
        .await?;

        info!(item_id = created.id, "item created");
        Ok(created)
    }

    #[instrument(skip(self, input))]
    pub async fn update_item(
        &self,
        id: i64,
        input: UpdateItemInput,
    ) -> Result<item::Model, ServiceError> {
        let existing = self.get_item(id).await?;

        if let Some(code) = &input.item_code {
            required(code, "item_code")?;
            let duplicate = item::Entity::find()
                .filter(item::Column::ItemCode.eq(code.clone()))
                .filter(item::Column::Id.ne(id))
                .one(self.db.as_ref())
                .await?;
            if duplicate.is_some() {
                return Err(ServiceError::Conflict(format!(
                    "item code {code} already exists"
                )));
            }
        }
        if let Some(name) = &input.name {
            required(name, "name")?;
        }

        let mut active: item::ActiveModel = existing.into();
        if let Some(code) = input.item_code {
            active.item_code = Set(code);
        }
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if input.description.is_some() {
            active.description = Set(input.description);
        }
        active.updated_at = Set(Utc::now());

        Ok(active.update(self.db.as_ref()).await?)
    }

    #[instrument(skip(self))]
    pub async fn delete_item(&self, id: i64) -> Result<item::Model, ServiceError> {
        let existing = self.get_item(id).await?;

        let lot_refs = lot::Entity::find()
            .filter(lot::Column::ItemId.eq(id))
            .count(self.db.as_ref())
            .await?;
        let snapshot_refs = monthly_snapshot::Entity::find()
            .filter(monthly_snapshot::Column::ItemId.eq(id))
            .count(self.db.as_ref())
            .await?;
        if lot_refs > 0 || snapshot_refs > 0 {
            return Err(ServiceError::Conflict(format!(
                "item {id} is referenced by existing lots or snapshots"
            )));
        }

        item::Entity::delete_by_id(id).exec(self.db.as_ref()).await?;
        info!(item_id = id, "item deleted");
        Ok(existing)
    }

    // Units

    #[instrument(skip(self))]
    pub async fn list_units(&self) -> Result<Vec<unit::Model>, ServiceError> {
        Ok(unit::Entity::find()
            .order_by_asc(unit::Column::Name)
            .all(self.db.as_ref())
            .await?)
    }

    #[instrument(skip(self))]
    pub async fn get_unit(&self, id: i64) -> Result<unit::Model, ServiceError> {
        unit::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("unit {id} not found")))
    }

    #[instrument(skip(self, input))]
    pub async fn create_unit(&self, input: CreateUnitInput) -> Result<unit::Model, ServiceError> {
        required(&input.name, "name")?;

        let duplicate = unit::Entity::find()
            .filter(unit::Column::Name.eq(input.name.clone()))
            .one(self.db.as_ref())
            .await?;
        if duplicate.is_some() {
            return Err(ServiceError::Conflict(format!(
                "unit {} already exists",
                input.name
            )));
        }

        let rate = input.conversion_rate.unwrap_or(Decimal::ONE);
        if rate <= Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "conversion_rate must be positive".to_string(),
            ));
        }

        let now = Utc::now();
        let created = unit::ActiveModel {
            name: Set(input.name),
            conversion_rate: Set(rate),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(self.db.as_ref())
        .await?;

        info!(unit_id = created.id, "unit created");
        Ok(created)
    }

    #[instrument(skip(self, input))]
    pub async fn update_unit(
        &self,
        id: i64,
        input: UpdateUnitInput,
    ) -> Result<unit::Model, ServiceError> {
        let existing = self.get_unit(id).await?;

        if let Some(name) = &input.name {
            required(name, "name")?;
            let duplicate = unit::Entity::find()
                .filter(unit::Column::Name.eq(name.clone()))
                .filter(unit::Column::Id.ne(id))
                .one(self.db.as_ref())
                .await?;
            if duplicate.is_some() {
                return Err(ServiceError::Conflict(format!("unit {name} already exists")));
            }
        }
        if let Some(rate) = input.conversion_rate {
            if rate <= Decimal::ZERO {
                return Err(ServiceError::ValidationError(
                    "conversion_rate must be positive".to_string(),
                ));
            }
        }

        let mut active: unit::ActiveModel = existing.into();
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(rate) = input.conversion_rate {
            active.conversion_rate = Set(rate);
        }
        active.updated_at = Set(Utc::now());

        Ok(active.update(self.db.as_ref()).await?)
    }

    #[instrument(skip(self))]
    pub async fn delete_unit(&self, id: i64) -> Result<unit::Model, ServiceError> {
        let existing = self.get_unit(id).await?;
        self.guard_key_references(unit_refs(id)).await?;
        unit::Entity::delete_by_id(id).exec(self.db.as_ref()).await?;
        info!(unit_id = id, "unit deleted");
        Ok(existing)
    }

    // Warehouses

    #[instrument(skip(self))]
    pub async fn list_warehouses(&self) -> Result<Vec<warehouse::Model>, ServiceError> {
        Ok(warehouse::Entity::find()
            .order_by_asc(warehouse::Column::Name)
            .all(self.db.as_ref())
            .await?)
    }

    #[instrument(skip(self))]
    pub async fn get_warehouse(&self, id: i64) -> Result<warehouse::Model, ServiceError> {
        warehouse::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("warehouse {id} not found")))
    }

    #[instrument(skip(self, input))]
    pub async fn create_warehouse(
        &self,
        input: CreateWarehouseInput,
    ) -> Result<warehouse::Model, ServiceError> {
        required(&input.name, "name")?;

        let duplicate = warehouse::Entity::find()
            .filter(warehouse::Column::Name.eq(input.name.clone()))
            .one(self.db.as_ref())
            .await?;
        if duplicate.is_some() {
            return Err(ServiceError::Conflict(format!(
                "warehouse {} already exists",
                input.name
            )));
        }

        let now = Utc::now();
        let created = warehouse::ActiveModel {
            name: Set(input.name),
            location: Set(input.location),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(self.db.as_ref())
        .await?;

        info!(warehouse_id = created.id, "warehouse created");
        Ok(created)
    }

    #[instrument(skip(self, input))]
    pub async fn update_warehouse(
        &self,
        id: i64,
        input: UpdateWarehouseInput,
    ) -> Result<warehouse::Model, ServiceError> {
        let existing = self.get_warehouse(id).await?;

        if let Some(name) = &input.name {
            required(name, "name")?;
            let duplicate = warehouse::Entity::find()
                .filter(warehouse::Column::Name.eq(name.clone()))
                .filter(warehouse::Column::Id.ne(id))
                .one(self.db.as_ref())
                .await?;
            if duplicate.is_some() {
                return Err(ServiceError::Conflict(format!(
                    "warehouse {name} already exists"
                )));
            }
        }

        let mut active: warehouse::ActiveModel = existing.into();
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if input.location.is_some() {
            active.location = Set(input.location);
        }
        active.updated_at = Set(Utc::now());

        Ok(active.update(self.db.as_ref()).await?)
    }

    #[instrument(skip(self))]
    pub async fn delete_warehouse(&self, id: i64) -> Result<warehouse::Model, ServiceError> {
        let existing = self.get_warehouse(id).await?;
        self.guard_key_references(warehouse_refs(id)).await?;
        warehouse::Entity::delete_by_id(id)
            .exec(self.db.as_ref())
            .await?;
        info!(warehouse_id = id, "warehouse deleted");
        Ok(existing)
    }

    // Lots

    #[instrument(skip(self))]
    pub async fn list_lots(&self, item_id: Option<i64>) -> Result<Vec<lot::Model>, ServiceError> {
        let mut query = lot::Entity::find();
        if let Some(item_id) = item_id {
            query = query.filter(lot::Column::ItemId.eq(item_id));
        }
        Ok(query
            .order_by_desc(lot::Column::ProductionDate)
            .all(self.db.as_ref())
            .await?)
    }

    #[instrument(skip(self))]
    pub async fn get_lot(&self, id: i64) -> Result<lot::Model, ServiceError> {
        lot::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("lot {id} not found")))
    }

    #[instrument(skip(self, input))]
    pub async fn create_lot(&self, input: CreateLotInput) -> Result<lot::Model, ServiceError> {
        required(&input.lot_number, "lot_number")?;

        if !item_exists(self.db.as_ref(), input.item_id).await? {
            return Err(ServiceError::NotFound(format!(
                "item {} not found",
                input.item_id
            )));
        }

        let duplicate = lot::Entity::find()
            .filter(lot::Column::LotNumber.eq(input.lot_number.clone()))
            .one(self.db.as_ref())
            .await?;
        if duplicate.is_some() {
            return Err(ServiceError::Conflict(format!(
                "lot number {} already exists",
                input.lot_number
            )));
        }

        let now = Utc::now();
        let created = lot::ActiveModel {
            lot_number: Set(input.lot_number),
            item_id: Set(input.item_id),
            production_date: Set(input.production_date),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(self.db.as_ref())
        .await?;

        info!(lot_id = created.id, "lot created");
        Ok(created)
    }

    #[instrument(skip(self, input))]
    pub async fn update_lot(
        &self,
        id: i64,
        input: UpdateLotInput,
    ) -> Result<lot::Model, ServiceError> {
        let existing = self.get_lot(id).await?;

        if let Some(number) = &input.lot_number {
            required(number, "lot_number")?;
            let duplicate = lot::Entity::find()
                .filter(lot::Column::LotNumber.eq(number.clone()))
                .filter(lot::Column::Id.ne(id))
                .one(self.db.as_ref())
                .await?;
            if duplicate.is_some() {
                return Err(ServiceError::Conflict(format!(
                    "lot number {number} already exists"
                )));
            }
        }

        let mut active: lot::ActiveModel = existing.into();
        if let Some(number) = input.lot_number {
            active.lot_number = Set(number);
        }
        if let Some(date) = input.production_date {
            active.production_date = Set(date);
        }
        active.updated_at = Set(Utc::now());

        Ok(active.update(self.db.as_ref()).await?)
    }

    #[instrument(skip(self))]
    pub async fn delete_lot(&self, id: i64) -> Result<lot::Model, ServiceError> {
        let existing = self.get_lot(id).await?;
        self.guard_key_references(lot_refs(id)).await?;
        lot::Entity::delete_by_id(id).exec(self.db.as_ref()).await?;
        info!(lot_id = id, "lot deleted");
        Ok(existing)
    }

    /// Rejects the delete when inventory, movement history, allocations, or
    /// snapshots still reference the row.
    async fn guard_key_references(&self, refs: KeyRefFilters) -> Result<(), ServiceError> {
        let db = self.db.as_ref();
        let inventory = inventory_record::Entity::find()
            .filter(refs.inventory)
            .count(db)
            .await?;
        let movements = stock_movement::Entity::find()
            .filter(refs.movements)
            .count(db)
            .await?;
        let allocations = allocation::Entity::find()
            .filter(refs.allocations)
            .count(db)
            .await?;
        let snapshots = monthly_snapshot::Entity::find()
            .filter(refs.snapshots)
            .count(db)
            .await?;

        if inventory > 0 || movements > 0 || allocations > 0 || snapshots > 0 {
            return Err(ServiceError::Conflict(
                "record is referenced by inventory, movements, allocations, or snapshots"
                    .to_string(),
            ));
        }
        Ok(())
    }
}

struct KeyRefFilters {
    inventory: sea_orm::sea_query::SimpleExpr,
    movements: sea_orm::sea_query::SimpleExpr,
    allocations: sea_orm::sea_query::SimpleExpr,
    snapshots: sea_orm::sea_query::SimpleExpr,
}

fn lot_refs(id: i64) -> KeyRefFilters {
    KeyRefFilters {
        inventory: inventory_record::Column::LotId.eq(id),
        movements: stock_movement::Column::LotId.eq(id),
        allocations: allocation::Column::LotId.eq(id),
        snapshots: monthly_snapshot::Column::LotId.eq(id),
    }
}

fn warehouse_refs(id: i64) -> KeyRefFilters {
    KeyRefFilters {
        inventory: inventory_record::Column::WarehouseId.eq(id),
        movements: stock_movement::Column::WarehouseId.eq(id),
        allocations: allocation::Column::WarehouseId.eq(id),
        snapshots: monthly_snapshot::Column::WarehouseId.eq(id),
    }
}

fn unit_refs(id: i64) -> KeyRefFilters {
    KeyRefFilters {
        inventory: inventory_record::Column::UnitId.eq(id),
        movements: stock_movement::Column::UnitId.eq(id),
        allocations: allocation::Column::UnitId.eq(id),
        snapshots: monthly_snapshot::Column::UnitId.eq(id),
    }
}

// Existence lookups consumed by the movement and allocation workflows.

pub async fn item_exists<C: ConnectionTrait>(conn: &C, id: i64) -> Result<bool, ServiceError> {
    Ok(item::Entity::find_by_id(id).one(conn).await?.is_some())
}

pub async fn lot_exists<C: ConnectionTrait>(conn: &C, id: i64) -> Result<bool, ServiceError> {
    Ok(lot::Entity::find_by_id(id).one(conn).await?.is_some())
}

pub async fn warehouse_exists<C: ConnectionTrait>(conn: &C, id: i64) -> Result<bool, ServiceError> {
    Ok(warehouse::Entity::find_by_id(id).one(conn).await?.is_some())
}

pub async fn unit_exists<C: ConnectionTrait>(conn: &C, id: i64) -> Result<bool, ServiceError> {
    Ok(unit::Entity::find_by_id(id).one(conn).await?.is_some())
}

/// Verifies every entity of a ledger key exists. Referential checks run
/// after structural validation and before any stock or capacity check so a
/// bad reference never leaks availability numbers.
pub async fn ensure_key_entities_exist<C: ConnectionTrait>(
    conn: &C,
    key: &crate::services::ledger::LedgerKey,
) -> Result<(), ServiceError> {
    if !lot_exists(conn, key.lot_id).await? {
        return Err(ServiceError::NotFound(format!(
            "lot {} not found",
            key.lot_id
        )));
    }
    if !warehouse_exists(conn, key.warehouse_id).await? {
        return Err(ServiceError::NotFound(format!(
            "warehouse {} not found",
            key.warehouse_id
        )));
    }
    if !unit_exists(conn, key.unit_id).await? {
        return Err(ServiceError::NotFound(format!(
            "unit {} not found",
            key.unit_id
        )));
    }
    Ok(())
}

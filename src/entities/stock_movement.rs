use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Direction of a stock movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MovementType {
    Inbound,
    Outbound,
}

impl MovementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementType::Inbound => "INBOUND",
            MovementType::Outbound => "OUTBOUND",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "INBOUND" => Some(MovementType::Inbound),
            "OUTBOUND" => Some(MovementType::Outbound),
            _ => None,
        }
    }
}

/// Append-only journal of inbound and outbound stock events.
///
/// Rows are immutable once created; corrections are recorded as new
/// movements. The current on-hand quantity for any key is reconstructable
/// as the net sum of its signed movement effects.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "stock_movements")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub movement_type: String,
    pub lot_id: i64,
    pub warehouse_id: i64,
    pub unit_id: i64,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub quantity: Decimal,
    pub occurred_at: DateTime<Utc>,
    pub reference_number: Option<String>,
    /// Raw scanner payload captured at the dock, if any.
    pub barcode_data: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::lot::Entity",
        from = "Column::LotId",
        to = "super::lot::Column::Id"
    )]
    Lot,
    #[sea_orm(
        belongs_to = "super::warehouse::Entity",
        from = "Column::WarehouseId",
        to = "super::warehouse::Column::Id"
    )]
    Warehouse,
    #[sea_orm(
        belongs_to = "super::unit::Entity",
        from = "Column::UnitId",
        to = "super::unit::Column::Id"
    )]
    Unit,
}

impl Related<super::lot::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Lot.def()
    }
}

impl Related<super::warehouse::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Warehouse.def()
    }
}

impl Related<super::unit::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Unit.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn movement_type_round_trips_through_storage_form() {
        assert_eq!(MovementType::Inbound.as_str(), "INBOUND");
        assert_eq!(MovementType::from_str("OUTBOUND"), Some(MovementType::Outbound));
        assert_eq!(MovementType::from_str("TRANSFER"), None);
    }
}

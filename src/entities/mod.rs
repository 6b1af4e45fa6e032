pub mod allocation;
pub mod inventory_record;
pub mod item;
pub mod lot;
pub mod monthly_snapshot;
pub mod stock_movement;
pub mod unit;
pub mod warehouse;

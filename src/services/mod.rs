pub mod allocations;
pub mod inventory;
pub mod ledger;
pub mod master_data;
pub mod movements;
pub mod reports;
pub mod rollup;

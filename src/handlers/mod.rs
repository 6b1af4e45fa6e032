pub mod allocations;
pub mod inventory;
pub mod master_data;
pub mod monthly;
pub mod movements;
pub mod reports;

use std::sync::Arc;

use crate::db::DbPool;
use crate::events::EventSender;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers.
#[derive(Clone)]
pub struct AppServices {
    pub master_data: Arc<crate::services::master_data::MasterDataService>,
    pub inventory: Arc<crate::services::inventory::InventoryService>,
    pub movements: Arc<crate::services::movements::MovementService>,
    pub allocations: Arc<crate::services::allocations::AllocationService>,
    pub rollup: Arc<crate::services::rollup::MonthlyRollupService>,
    pub reports: Arc<crate::services::reports::ReportService>,
}

impl AppServices {
    pub fn new(db_pool: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self {
            master_data: Arc::new(crate::services::master_data::MasterDataService::new(
                db_pool.clone(),
            )),
            inventory: Arc::new(crate::services::inventory::InventoryService::new(
                db_pool.clone(),
            )),
            movements: Arc::new(crate::services::movements::MovementService::new(
                db_pool.clone(),
                event_sender.clone(),
            )),
            allocations: Arc::new(crate::services::allocations::AllocationService::new(
                db_pool.clone(),
                event_sender.clone(),
            )),
            rollup: Arc::new(crate::services::rollup::MonthlyRollupService::new(
                db_pool.clone(),
                event_sender,
            )),
            reports: Arc::new(crate::services::reports::ReportService::new(db_pool)),
        }
    }
}

pub mod assets;
pub mod auth;
pub mod common;
pub mod departments;
pub mod reports;
pub mod requests;
pub mod stock_takes;

use crate::db::DbPool;
use crate::events::EventSender;
use crate::services::asset_numbers::AssetNumberGenerator;
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub departments: Arc<crate::services::departments::DepartmentService>,
    pub assets: Arc<crate::services::assets::AssetService>,
    pub requests: Arc<crate::services::requests::RequestService>,
    pub stock_takes: Arc<crate::services::stock_takes::StockTakeService>,
    pub reports: Arc<crate::services::reports::ReportService>,
}

impl AppServices {
    /// Build the service container shared by all handlers.
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>, org_tag: &str) -> Self {
        let departments = Arc::new(crate::services::departments::DepartmentService::new(
            db_pool.clone(),
            Some(event_sender.clone()),
        ));
        let assets = Arc::new(crate::services::assets::AssetService::new(
            db_pool.clone(),
            Some(event_sender.clone()),
            AssetNumberGenerator::new(org_tag),
        ));
        let requests = Arc::new(crate::services::requests::RequestService::new(
            db_pool.clone(),
            Some(event_sender.clone()),
        ));
        let stock_takes = Arc::new(crate::services::stock_takes::StockTakeService::new(
            db_pool.clone(),
            Some(event_sender),
        ));
        let reports = Arc::new(crate::services::reports::ReportService::new(db_pool));

        Self {
            departments,
            assets,
            requests,
            stock_takes,
            reports,
        }
    }
}

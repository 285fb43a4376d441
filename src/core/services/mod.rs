pub mod cash_service;
pub mod catalog_service;
pub mod checklist_service;
pub mod shift_service;
pub mod sync_service;

pub use cash_service::CashService;
pub use catalog_service::CatalogService;
pub use checklist_service::{ChecklistService, CompletionState};
pub use shift_service::ShiftService;
pub use sync_service::{SyncRegistration, SyncService};

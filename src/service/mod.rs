pub mod audit;
pub mod catalog;
pub mod discrepancy;
pub mod history;
pub mod reconciliation;
pub mod session;

pub use audit::{AuditService, CurrentUser, StaticUser};
pub use catalog::InventoryCatalog;
pub use history::{HistoryLedger, HISTORY_KEY, HISTORY_LIMIT};
pub use reconciliation::{parse_quantity, ReconciliationStore};
pub use session::AuditSession;

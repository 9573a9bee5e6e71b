pub mod product;
pub mod report;
pub mod scan;
pub mod session;

pub use product::{ProductRecord, RawRow};
pub use report::{
    percentage, AggregateStats, AuditReport, Classification, ReportRow, ScanSnapshot, ScanStatistics,
};
pub use scan::{QuantityChange, ScanOutcome};
pub use session::{HistoryEntry, SessionInfo, UNIDENTIFIED_AUDITOR};

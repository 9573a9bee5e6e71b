pub mod export;
pub mod import;
pub mod kv;

pub use export::{export_report, write_report_csv, CsvReportWriter, ReportRenderer};
pub use import::{parse_rows, read_rows};
pub use kv::{JsonFileStore, KeyValueStore, MemoryStore};

pub mod loader;

pub use loader::{BulkLoader, GroupReport, LoadReport, RecordEntry, plan};

//! Provenance tracking for derived columns.
//!
//! Every tracked operation appends a `LogEntry` to the result's log, pointing
//! back at the current targets of its operands. Recording only happens inside
//! an `enable_processing_log()` scope.
pub mod entry;
pub mod hashing;
pub mod lineage;
pub mod squeeze;
pub mod toggle;

pub use entry::{LogEntry, OperationKind, Parents, ProcessingLog, UNNAMED_VARIABLE};
pub use hashing::{derived_target, target_hash, HASH_LENGTH};
pub use lineage::LineageGraph;
pub use squeeze::preprocess_log;
pub use toggle::{
    disable_processing_log, enable_processing_log, is_processing_log_enabled, with_processing_log,
    ProcessingLogGuard,
};

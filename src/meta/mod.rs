//! Metadata records attached to variables, tables and datasets.
pub mod dedup;
pub mod types;

pub use dedup::{merge_unique, push_unique, DedupKey};
pub use types::{DatasetMeta, License, Origin, Source, TableMeta, VariableMeta};

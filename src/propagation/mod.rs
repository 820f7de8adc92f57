//! Metadata propagation.
//!
//! One rule module per family of operations. Every rule is a pure function of
//! its inputs plus an explicit `logging` flag, read once by the caller from
//! the processing-log toggle; rules never mutate their operands.

pub mod rules {
    pub mod aggregate;
    pub mod arithmetic;
    pub mod concat;
    pub mod dataset;
    pub mod merge;
    pub mod selection;
}

pub(crate) use rules::aggregate::{grouped_metadata, row_reduction_metadata};
pub(crate) use rules::arithmetic::propagate;
pub(crate) use rules::concat::stacked_metadata;
pub(crate) use rules::dataset::{combine_datasets, gather_licenses, gather_origins, gather_sources};
pub(crate) use rules::merge::merged_column_metadata;
pub(crate) use rules::selection::rename_metadata;

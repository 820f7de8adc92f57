//! Metadata propagation for catalog tables.
//!
//! Variables and tables carry their metadata (sources, licenses, origins,
//! units, titles) through arithmetic, merges, concatenations and group-bys.
//! With processing logs enabled, every derived column also records where it
//! came from.
//!
//! With the `python` feature this crate builds the `_core` extension module.

pub mod chart;
pub mod compute;
pub mod config;
pub mod display;
pub mod download;
pub mod error;
pub mod meta;
pub mod processing_log;
pub mod propagation;
pub mod table;
pub mod variable;

#[cfg(feature = "python")]
mod bindings {
    pub mod python;
}

pub use config::CatalogConfig;
pub use error::{CatalogError, Result};
pub use meta::{DatasetMeta, License, Origin, Source, TableMeta, VariableMeta};
pub use processing_log::{
    disable_processing_log, enable_processing_log, is_processing_log_enabled, preprocess_log, target_hash,
    LogEntry, ProcessingLog,
};
pub use table::{JoinHow, Table};
pub use variable::{Scalar, Series, Variable};

#[cfg(feature = "python")]
use pyo3::prelude::*;

/// The `_core` Python module.
#[cfg(feature = "python")]
#[pymodule]
fn _core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    bindings::python::register(m)
}

use super::Table;
use crate::meta::{merge_unique, DatasetMeta, License, Origin, Source};
use crate::propagation;

impl Table {
    /// Sources of every column, deduplicated by name in column order.
    pub fn gather_sources(&self) -> Vec<Source> {
        propagation::gather_sources(&self.columns)
    }

    pub fn gather_licenses(&self) -> Vec<License> {
        propagation::gather_licenses(&self.columns)
    }

    pub fn gather_origins(&self) -> Vec<Origin> {
        propagation::gather_origins(&self.columns)
    }

    /// Folds the columns' sources and licenses into the dataset metadata,
    /// after the ones it already lists.
    pub fn update_dataset_metadata(&mut self) {
        let dataset = &mut self.metadata.dataset;
        dataset.sources = merge_unique([dataset.sources.as_slice(), propagation::gather_sources(&self.columns).as_slice()]);
        dataset.licenses = merge_unique([dataset.licenses.as_slice(), propagation::gather_licenses(&self.columns).as_slice()]);
    }
}

/// Dataset metadata for a dataset made of `tables`: the first table's dataset
/// fields, with sources and licenses gathered from every column of every table.
pub fn gather_sources_from_tables(tables: &[&Table]) -> DatasetMeta {
    let mut dataset = propagation::combine_datasets(tables.iter().map(|t| &t.metadata.dataset));
    let columns = tables.iter().flat_map(|t| t.columns.iter());
    let sources = propagation::gather_sources(columns.clone());
    let licenses = propagation::gather_licenses(columns);
    dataset.sources = merge_unique([dataset.sources.as_slice(), sources.as_slice()]);
    dataset.licenses = merge_unique([dataset.licenses.as_slice(), licenses.as_slice()]);
    dataset
}

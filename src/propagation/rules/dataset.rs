//! Table- and dataset-level aggregation of provenance.
use crate::meta::{merge_unique, DatasetMeta, License, Origin, Source};
use crate::variable::Variable;

pub(crate) fn gather_sources<'a>(columns: impl IntoIterator<Item = &'a Variable>) -> Vec<Source> {
    merge_unique(columns.into_iter().map(|v| v.metadata.sources.as_slice()))
}

pub(crate) fn gather_licenses<'a>(columns: impl IntoIterator<Item = &'a Variable>) -> Vec<License> {
    merge_unique(columns.into_iter().map(|v| v.metadata.licenses.as_slice()))
}

pub(crate) fn gather_origins<'a>(columns: impl IntoIterator<Item = &'a Variable>) -> Vec<Origin> {
    merge_unique(columns.into_iter().map(|v| v.metadata.origins.as_slice()))
}

/// Combines dataset metadata: scalar fields from the first carrier, sources
/// and licenses unioned by name.
pub(crate) fn combine_datasets<'a>(datasets: impl IntoIterator<Item = &'a DatasetMeta>) -> DatasetMeta {
    let datasets: Vec<&DatasetMeta> = datasets.into_iter().collect();
    DatasetMeta {
        short_name: datasets.iter().find_map(|d| d.short_name.clone()),
        title: datasets.iter().find_map(|d| d.title.clone()),
        description: datasets.iter().find_map(|d| d.description.clone()),
        sources: merge_unique(datasets.iter().map(|d| d.sources.as_slice())),
        licenses: merge_unique(datasets.iter().map(|d| d.licenses.as_slice())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combine_datasets() {
        let a = DatasetMeta {
            sources: vec![Source::new("UN")],
            licenses: vec![License::new("CC BY 4.0")],
            ..Default::default()
        };
        let b = DatasetMeta {
            title: Some("Population".into()),
            sources: vec![Source::new("UN"), Source::new("WDI")],
            licenses: vec![License::new("CC BY 4.0")],
            ..Default::default()
        };

        let out = combine_datasets([&a, &b]);

        assert_eq!(out.title.as_deref(), Some("Population"));
        assert_eq!(out.sources, vec![Source::new("UN"), Source::new("WDI")]);
        assert_eq!(out.licenses.len(), 1);
    }
}

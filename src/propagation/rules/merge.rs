//! Rule for columns coming out of a table merge.
use crate::meta::VariableMeta;
use crate::processing_log::{LogEntry, Parents};
use crate::variable::Variable;

/// Metadata of a non-key column carried into a merge result as `output_name`.
///
/// The column keeps its own metadata. Its log gains a `merge` entry whose
/// parent is the column's target before the merge.
pub(crate) fn merged_column_metadata(source: &Variable, output_name: &str, logging: bool) -> VariableMeta {
    let mut meta = source.metadata.clone();
    if logging {
        let parents: Parents = Parents::from_iter([source.target()]);
        meta.processing_log.push(LogEntry::derived(output_name, parents, "merge"));
    }
    meta
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta::Source;

    #[test]
    fn test_merge_keeps_own_metadata() {
        let var = Variable::new("gdp", vec![1.0])
            .with_metadata(VariableMeta::new().with_unit("$").with_source(Source::new("WDI")));

        let meta = merged_column_metadata(&var, "gdp_x", true);

        assert_eq!(meta.unit.as_deref(), Some("$"));
        assert_eq!(meta.sources, var.metadata.sources);
        let entry = meta.processing_log.last().unwrap();
        assert_eq!(entry.operation, "merge");
        assert_eq!(entry.variable, "gdp_x");
        assert_eq!(entry.parents.as_slice(), ["gdp".to_string()]);
    }

    #[test]
    fn test_merge_without_logging() {
        let var = Variable::new("gdp", vec![1.0]);
        assert!(merged_column_metadata(&var, "gdp", false).processing_log.is_empty());
    }
}

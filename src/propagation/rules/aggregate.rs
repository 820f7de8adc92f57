//! Rule for reductions: group-by aggregation and row-wise reductions.
use super::arithmetic;
use crate::meta::VariableMeta;
use crate::processing_log::{LogEntry, Parents};
use crate::variable::{Reduction, Variable};

/// Metadata of `source` once aggregated per group with `reduction`.
///
/// Everything is copied verbatim; the log gains one entry with the reduction
/// as operation and the pre-aggregation target as its parent.
pub(crate) fn grouped_metadata(source: &Variable, column: &str, reduction: Reduction, logging: bool) -> VariableMeta {
    let mut meta = source.metadata.clone();
    if logging {
        let parents: Parents = Parents::from_iter([source.target()]);
        meta.processing_log.push(LogEntry::derived(column, parents, reduction.name()));
    }
    meta
}

/// Metadata of a reduction across several columns of the same rows.
///
/// Follows the arithmetic rule, with every input column as a parent.
pub(crate) fn row_reduction_metadata(
    inputs: &[&Variable],
    label: &str,
    reduction: Reduction,
    logging: bool,
) -> VariableMeta {
    arithmetic::propagate(reduction.name(), inputs, logging, || {
        (label.to_string(), inputs.iter().map(|v| v.target()).collect())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta::Source;

    #[test]
    fn test_grouped_metadata_logs_reduction() {
        let var = Variable::new("gdp", vec![1.0, 2.0])
            .with_metadata(VariableMeta::new().with_title("GDP").with_source(Source::new("WDI")));

        let meta = grouped_metadata(&var, "gdp", Reduction::Sum, true);

        assert_eq!(meta.title.as_deref(), Some("GDP"));
        let entry = meta.processing_log.last().unwrap();
        assert_eq!(entry.operation, "sum");
        assert_eq!(entry.target, "gdp#8e6ff9f926");
    }

    #[test]
    fn test_row_reduction_unions_provenance() {
        let a = Variable::new("a", vec![1.0]).with_metadata(VariableMeta::new().with_source(Source::new("UN")));
        let b = Variable::new("b", vec![2.0]).with_metadata(VariableMeta::new().with_source(Source::new("WDI")));

        let meta = row_reduction_metadata(&[&a, &b], "total", Reduction::Sum, true);

        assert_eq!(meta.sources.len(), 2);
        let entry = meta.processing_log.last().unwrap();
        assert_eq!(entry.variable, "total");
        assert_eq!(entry.parents.as_slice(), ["a".to_string(), "b".to_string()]);
    }
}

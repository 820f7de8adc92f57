//! Rule for combining operand metadata in element-wise operations.
use crate::meta::{merge_unique, VariableMeta};
use crate::processing_log::{LogEntry, OperationKind, Parents, ProcessingLog};
use crate::variable::Variable;

/// Returns the value every carrying operand agrees on, if any.
///
/// A field carried by a single operand is copied; conflicting values leave the
/// result blank. Operands that all carry the same value keep it as well: adding
/// two columns both in "kg" stays in "kg". No operand ever makes the result fail.
fn agreed<'a, T, I>(values: I) -> Option<T>
where
    T: PartialEq + Clone + 'a,
    I: IntoIterator<Item = Option<&'a T>>,
{
    let mut carried = values.into_iter().flatten();
    let first = carried.next()?;
    if carried.all(|v| v == first) {
        Some(first.clone())
    } else {
        None
    }
}

/// Merges the metadata of the operands of `operation`. The log is left empty.
pub(crate) fn combine_metadata(parents: &[&VariableMeta], operation: &str) -> VariableMeta {
    let mut meta = VariableMeta {
        title: agreed(parents.iter().map(|m| m.title.as_ref())),
        description: agreed(parents.iter().map(|m| m.description.as_ref())),
        unit: agreed(parents.iter().map(|m| m.unit.as_ref())),
        short_unit: agreed(parents.iter().map(|m| m.short_unit.as_ref())),
        sources: merge_unique(parents.iter().map(|m| m.sources.as_slice())),
        licenses: merge_unique(parents.iter().map(|m| m.licenses.as_slice())),
        origins: merge_unique(parents.iter().map(|m| m.origins.as_slice())),
        processing_log: ProcessingLog::new(),
        dimensions: agreed(parents.iter().map(|m| Some(&m.dimensions).filter(|d| !d.is_empty()))).unwrap_or_default(),
        display: agreed(parents.iter().map(|m| Some(&m.display).filter(|d| !d.is_empty()))).unwrap_or_default(),
    };

    // The result of a comparison is a boolean mask, not a quantity.
    if OperationKind::of(operation) == OperationKind::Comparison {
        meta.unit = None;
        meta.short_unit = None;
    }
    meta
}

/// Metadata for the result of `operation` over `operands`.
///
/// `describe` yields the label naming the still-unnamed result and its parent
/// identifiers in operand order (literal scalars included). It only runs when
/// `logging` is set.
pub(crate) fn propagate(
    operation: &str,
    operands: &[&Variable],
    logging: bool,
    describe: impl FnOnce() -> (String, Parents),
) -> VariableMeta {
    let metas: Vec<&VariableMeta> = operands.iter().map(|v| &v.metadata).collect();
    let mut meta = combine_metadata(&metas, operation);
    if logging {
        let (label, parents) = describe();
        meta.processing_log = ProcessingLog::merged(operands.iter().map(|v| &v.metadata.processing_log));
        meta.processing_log.push(LogEntry::derived(label, parents, operation));
    }
    meta
}

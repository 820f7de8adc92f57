//! Rule for columns stacked from several tables, or combined across two.
//!
//! Scalar fields come from the first table that carries them; provenance lists
//! are unioned in table order.
use crate::meta::{merge_unique, VariableMeta};
use crate::processing_log::{LogEntry, Parents, ProcessingLog};
use crate::variable::Variable;

fn first_present(parts: &[&Variable], field: impl Fn(&VariableMeta) -> Option<&String>) -> Option<String> {
    parts.iter().find_map(|v| field(&v.metadata)).cloned()
}

/// Metadata of column `column` built from `parts` (in table order) by `operation`.
pub(crate) fn stacked_metadata(column: &str, parts: &[&Variable], operation: &str, logging: bool) -> VariableMeta {
    if let [only] = parts {
        return only.metadata.clone();
    }

    let units: Vec<&String> = parts.iter().filter_map(|v| v.metadata.unit.as_ref()).collect();
    if units.windows(2).any(|w| w[0] != w[1]) {
        log::warn!("{} of column '{}' found conflicting units {:?}; keeping the first", operation, column, units);
    }

    let mut meta = VariableMeta {
        title: first_present(parts, |m| m.title.as_ref()),
        description: first_present(parts, |m| m.description.as_ref()),
        unit: first_present(parts, |m| m.unit.as_ref()),
        short_unit: first_present(parts, |m| m.short_unit.as_ref()),
        sources: merge_unique(parts.iter().map(|v| v.metadata.sources.as_slice())),
        licenses: merge_unique(parts.iter().map(|v| v.metadata.licenses.as_slice())),
        origins: merge_unique(parts.iter().map(|v| v.metadata.origins.as_slice())),
        processing_log: ProcessingLog::new(),
        dimensions: parts.iter().map(|v| &v.metadata.dimensions).find(|d| !d.is_empty()).cloned().unwrap_or_default(),
        display: parts.iter().map(|v| &v.metadata.display).find(|d| !d.is_empty()).cloned().unwrap_or_default(),
    };

    if logging {
        meta.processing_log = ProcessingLog::merged(parts.iter().map(|v| &v.metadata.processing_log));
        let parents: Parents = parts.iter().map(|v| v.target()).collect();
        meta.processing_log.push(LogEntry::derived(column, parents, operation));
    }
    meta
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta::Source;

    fn var(title: Option<&str>, unit: &str, source: &str) -> Variable {
        let mut meta = VariableMeta::new().with_unit(unit).with_source(Source::new(source));
        meta.title = title.map(Into::into);
        Variable::new("gdp", vec![1.0]).with_metadata(meta)
    }

    #[test]
    fn test_single_part_is_carried_unchanged() {
        let a = var(Some("GDP"), "$", "WDI");
        assert_eq!(stacked_metadata("gdp", &[&a], "concat", true), a.metadata);
    }

    #[test]
    fn test_first_table_wins_on_conflict() {
        let a = var(None, "$", "WDI");
        let b = var(Some("GDP (IMF)"), "int-$", "IMF");

        let meta = stacked_metadata("gdp", &[&a, &b], "concat", false);

        assert_eq!(meta.unit.as_deref(), Some("$"));
        // `a` has no title, so the next table fills it in.
        assert_eq!(meta.title.as_deref(), Some("GDP (IMF)"));
        let names: Vec<_> = meta.sources.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["WDI", "IMF"]);
        assert!(meta.processing_log.is_empty());
    }

    #[test]
    fn test_logs_a_concat_entry() {
        let a = var(None, "$", "WDI");
        let b = var(None, "$", "IMF");
        let meta = stacked_metadata("gdp", &[&a, &b], "concat", true);
        let entry = meta.processing_log.last().unwrap();
        assert_eq!(entry.operation, "concat");
        assert_eq!(entry.parents.as_slice(), ["gdp".to_string(), "gdp".to_string()]);
    }
}

//! Rule for renames, selections and copies: metadata travels verbatim.
use crate::meta::VariableMeta;
use crate::processing_log::{LogEntry, Parents};
use crate::variable::Variable;

/// Metadata of `source` once it is known as `new_name`.
pub(crate) fn rename_metadata(source: &Variable, new_name: &str, logging: bool) -> VariableMeta {
    let mut meta = source.metadata.clone();
    if logging {
        let parents: Parents = Parents::from_iter([source.target()]);
        meta.processing_log.push(LogEntry::derived(new_name, parents, "rename"));
    }
    meta
}

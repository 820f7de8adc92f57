//! Log compaction: folds a temporary result into the rename that names it.
use super::entry::{LogEntry, ProcessingLog};
use super::hashing::is_derived_target;
use std::collections::{HashMap, HashSet};

/// Collapses `[op -> tmp, rename tmp -> name]` pairs into `[op -> name]`.
///
/// A pair is only folded when `tmp` is consumed by that rename alone, so no
/// other entry loses its parent. Folding repeats until nothing changes, which
/// also collapses chains of renames.
pub fn preprocess_log(log: &ProcessingLog) -> ProcessingLog {
    let mut entries = log.entries().to_vec();
    loop {
        let consumers = count_consumers(&entries);
        let mut squeezed = Vec::with_capacity(entries.len());
        let mut changed = false;

        let mut iter = entries.into_iter().peekable();
        while let Some(entry) = iter.next() {
            let foldable = iter.peek().is_some_and(|next| can_squeeze(&entry, next, &consumers));
            if foldable {
                if let Some(rename) = iter.next() {
                    squeezed.push(LogEntry {
                        variable: rename.variable,
                        parents: entry.parents,
                        operation: entry.operation,
                        target: rename.target,
                    });
                    changed = true;
                    continue;
                }
            }
            squeezed.push(entry);
        }

        entries = squeezed;
        if !changed {
            break;
        }
    }
    ProcessingLog::from_entries(entries)
}

fn count_consumers(entries: &[LogEntry]) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for entry in entries {
        let unique: HashSet<&String> = entry.parents.iter().collect();
        for parent in unique {
            *counts.entry(parent.clone()).or_insert(0) += 1;
        }
    }
    counts
}

fn can_squeeze(entry: &LogEntry, next: &LogEntry, consumers: &HashMap<String, usize>) -> bool {
    entry.kind().is_squeezable()
        && is_derived_target(&entry.target)
        && next.operation == "rename"
        && next.parents.len() == 1
        && next.parents.first() == Some(&entry.target)
        && consumers.get(&entry.target) == Some(&1)
}

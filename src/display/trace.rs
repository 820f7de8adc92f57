use crate::processing_log::{LogEntry, OperationKind, ProcessingLog};
use std::collections::HashMap;
use std::fmt::Write;

/// Renders how `target` was derived, one log entry per line, walking back to
/// the raw inputs. Targets reached twice are printed once and referenced after.
pub fn format_trace(log: &ProcessingLog, target: &str) -> String {
    let mut output = String::new();
    let lineage = match log.lineage() {
        Ok(lineage) => lineage,
        Err(e) => {
            let _ = writeln!(output, "Error: {}", e);
            return output;
        }
    };
    if !lineage.contains(target) {
        let _ = writeln!(output, "Error: unknown target '{}'", target);
        return output;
    }

    let mut producers: HashMap<&str, &LogEntry> = HashMap::new();
    for entry in log {
        producers.entry(entry.target.as_str()).or_insert(entry);
    }

    let mut tracer = Tracer { producers, visited_at_level: HashMap::new(), output };
    let _ = writeln!(tracer.output, "LINEAGE TRACE for '{}':", target);
    let _ = writeln!(tracer.output, "--------------------------------------------------");
    tracer.trace_node(target, 1, "");
    tracer.output
}

struct Tracer<'a> {
    producers: HashMap<&'a str, &'a LogEntry>,
    visited_at_level: HashMap<String, usize>,
    output: String,
}

impl<'a> Tracer<'a> {
    fn trace_node(&mut self, target: &str, level: usize, prefix: &str) {
        if let Some(&first_seen) = self.visited_at_level.get(target) {
            let _ = writeln!(self.output, "{}{} -> (Ref to L{})", prefix, target, first_seen);
            return;
        }
        self.visited_at_level.insert(target.to_string(), level);

        let line_header = format!("[L{}] {}", level, target);
        let Some(entry) = self.producers.get(target).copied() else {
            let _ = writeln!(self.output, "{}{} (input)", prefix, line_header);
            return;
        };

        match entry.kind() {
            OperationKind::Create => {
                let _ = writeln!(self.output, "{}{} (created)", prefix, line_header);
            }
            kind => {
                let formula = Self::format_formula(kind, entry);
                let _ = writeln!(self.output, "{}{} = {}", prefix, line_header, formula);
                self.recurse_children(prefix, &entry.parents, level);
            }
        }
    }

    fn recurse_children(&mut self, prefix: &str, children: &[String], level: usize) {
        let stem = Self::build_child_stem(prefix);
        for (i, child) in children.iter().enumerate() {
            let connector = if i == children.len() - 1 { "`--" } else { "|--" };
            let full_prefix = format!("{}{}", stem, connector);
            self.trace_node(child, level + 1, &full_prefix);
        }
    }

    fn format_formula(kind: OperationKind, entry: &LogEntry) -> String {
        match (kind, entry.parents.as_slice()) {
            (OperationKind::Arithmetic | OperationKind::Comparison, [lhs, rhs]) => {
                format!("{} {} {}", lhs, entry.operation, rhs)
            }
            _ => format!("{}({})", entry.operation, entry.parents.join(", ")),
        }
    }

    fn build_child_stem(current_prefix: &str) -> String {
        current_prefix.replace("`--", "   ").replace("|--", "|  ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario_log() -> ProcessingLog {
        ProcessingLog::from_entries(vec![
            LogEntry::create("a"),
            LogEntry::create("b"),
            LogEntry::new("a", ["a", "b"], "+", "a#2fde09cd0a"),
            LogEntry::new("c", ["a#2fde09cd0a"], "rename", "c#a6d702bdaf"),
        ])
    }

    #[test]
    fn test_trace_of_scenario() {
        let trace = format_trace(&scenario_log(), "c#a6d702bdaf");
        let lines: Vec<&str> = trace.lines().collect();
        assert_eq!(lines[0], "LINEAGE TRACE for 'c#a6d702bdaf':");
        assert_eq!(lines[2], "[L1] c#a6d702bdaf = rename(a#2fde09cd0a)");
        assert_eq!(lines[3], "`--[L2] a#2fde09cd0a = a + b");
        assert_eq!(lines[4], "   |--[L3] a (created)");
        assert_eq!(lines[5], "   `--[L3] b (created)");
    }

    #[test]
    fn test_repeated_parent_is_referenced() {
        let log = ProcessingLog::from_entries(vec![
            LogEntry::create("a"),
            LogEntry::new("a", ["a", "a"], "*", "a#sq"),
        ]);
        let trace = format_trace(&log, "a#sq");
        assert!(trace.contains("`--a -> (Ref to L2)"));
    }

    #[test]
    fn test_unknown_target() {
        assert!(format_trace(&scenario_log(), "zzz").starts_with("Error: unknown target"));
    }
}

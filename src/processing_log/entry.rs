use super::hashing::derived_target;
use super::lineage::LineageGraph;
use super::squeeze;
use super::toggle::is_processing_log_enabled;
use crate::error::{CatalogError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use smallvec::SmallVec;
use std::collections::HashSet;

/// Label used for results that have not been assigned a column name yet.
pub const UNNAMED_VARIABLE: &str = "**TEMPORARY UNNAMED VARIABLE**";

pub type Parents = SmallVec<[String; 2]>;

/// Broad categories of logged operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Arithmetic,
    Comparison,
    Reduction,
    Rename,
    Create,
    /// Table-level operations: concat, merge, combine.
    Table,
    Other,
}

impl OperationKind {
    pub fn of(operation: &str) -> Self {
        match operation {
            "+" | "-" | "*" | "/" => Self::Arithmetic,
            "==" | "!=" | "<" | "<=" | ">" | ">=" => Self::Comparison,
            "sum" | "mean" | "min" | "max" | "count" | "first" | "last" => Self::Reduction,
            "rename" => Self::Rename,
            "create" => Self::Create,
            "concat" | "merge" | "combine" => Self::Table,
            _ => Self::Other,
        }
    }

    /// Operations whose temporary result may be folded into a following rename.
    pub fn is_squeezable(self) -> bool {
        matches!(self, Self::Arithmetic | Self::Comparison | Self::Reduction)
    }
}

/// One derivation step: `target` was produced from `parents` by `operation`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogEntry {
    pub variable: String,
    #[serde(default, skip_serializing_if = "SmallVec::is_empty")]
    pub parents: Parents,
    pub operation: String,
    pub target: String,
}

impl LogEntry {
    pub fn new<I, S>(variable: impl Into<String>, parents: I, operation: impl Into<String>, target: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            variable: variable.into(),
            parents: parents.into_iter().map(Into::into).collect(),
            operation: operation.into(),
            target: target.into(),
        }
    }

    /// A manual seed entry: `name` exists, derived from nothing.
    pub fn create(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            variable: name.clone(),
            parents: Parents::new(),
            operation: "create".to_string(),
            target: name,
        }
    }

    /// An entry whose target is the content hash of `operation` over `parents`.
    pub fn derived(variable: impl Into<String>, parents: Parents, operation: impl Into<String>) -> Self {
        let variable = variable.into();
        let operation = operation.into();
        let target = derived_target(&variable, &operation, &parents);
        Self { variable, parents, operation, target }
    }

    pub fn kind(&self) -> OperationKind {
        OperationKind::of(&self.operation)
    }

    pub fn to_dict(&self) -> Value {
        let mut map = Map::new();
        map.insert("variable".into(), Value::String(self.variable.clone()));
        if !self.parents.is_empty() {
            let parents = self.parents.iter().cloned().map(Value::String).collect();
            map.insert("parents".into(), Value::Array(parents));
        }
        map.insert("operation".into(), Value::String(self.operation.clone()));
        map.insert("target".into(), Value::String(self.target.clone()));
        Value::Object(map)
    }

    pub fn from_dict(value: &Value) -> Result<Self> {
        Self::deserialize(value).map_err(|e| CatalogError::InvalidLog(e.to_string()))
    }
}

/// The ordered derivation history of a variable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProcessingLog {
    entries: Vec<LogEntry>,
}

impl ProcessingLog {
    pub fn new() -> Self { Self::default() }

    pub fn from_entries(entries: Vec<LogEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[LogEntry] { &self.entries }
    pub fn len(&self) -> usize { self.entries.len() }
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }
    pub fn iter(&self) -> std::slice::Iter<'_, LogEntry> { self.entries.iter() }
    pub fn last(&self) -> Option<&LogEntry> { self.entries.last() }

    /// Target of the most recent entry, i.e. the current state of the variable.
    pub fn last_target(&self) -> Option<&str> {
        self.entries.last().map(|e| e.target.as_str())
    }

    /// Appends unconditionally. Used for seeding and deserialization.
    pub fn push(&mut self, entry: LogEntry) {
        self.entries.push(entry);
    }

    /// Appends only when processing logging is enabled in the current scope.
    pub fn add_entry(&mut self, entry: LogEntry) -> bool {
        if !is_processing_log_enabled() {
            return false;
        }
        log::trace!("processing log: {} {:?} -> {}", entry.operation, entry.parents, entry.target);
        self.entries.push(entry);
        true
    }

    /// Ordered union of several logs; an entry already seen is not repeated.
    pub fn merged<'a, I>(logs: I) -> Self
    where
        I: IntoIterator<Item = &'a ProcessingLog>,
    {
        let mut seen: HashSet<&LogEntry> = HashSet::new();
        let mut entries = Vec::new();
        for log in logs {
            for entry in &log.entries {
                if seen.insert(entry) {
                    entries.push(entry.clone());
                }
            }
        }
        Self { entries }
    }

    pub fn as_dict(&self) -> Vec<Value> {
        self.entries.iter().map(LogEntry::to_dict).collect()
    }

    pub fn from_dict(values: &[Value]) -> Result<Self> {
        let entries = values.iter().map(LogEntry::from_dict).collect::<Result<Vec<_>>>()?;
        Ok(Self { entries })
    }

    pub fn to_json(&self) -> String {
        Value::Array(self.as_dict()).to_string()
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| CatalogError::InvalidLog(e.to_string()))
    }

    /// Returns the log with single-consumer intermediates folded into their renames.
    pub fn preprocessed(&self) -> Self {
        squeeze::preprocess_log(self)
    }

    /// Replays the log into its lineage graph.
    pub fn lineage(&self) -> Result<LineageGraph> {
        LineageGraph::from_log(self)
    }
}

impl<'a> IntoIterator for &'a ProcessingLog {
    type Item = &'a LogEntry;
    type IntoIter = std::slice::Iter<'a, LogEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

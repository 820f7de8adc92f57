use crate::processing_log::ProcessingLog;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A legacy provenance record describing where data was taken from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Source {
    pub name: String,
    pub description: Option<String>,
    pub url: Option<String>,
    pub source_data_url: Option<String>,
    pub date_accessed: Option<String>,
    pub publication_date: Option<String>,
    pub published_by: Option<String>,
}

impl Source {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Default::default() }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct License {
    pub name: String,
    pub url: Option<String>,
}

impl License {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), url: None }
    }
}

/// Where a variable's data ultimately came from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Origin {
    pub producer: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub citation_full: Option<String>,
    pub url_main: Option<String>,
    pub url_download: Option<String>,
    pub date_accessed: Option<String>,
    pub date_published: Option<String>,
    pub license: Option<License>,
}

impl Origin {
    pub fn new(producer: impl Into<String>, title: impl Into<String>) -> Self {
        Self { producer: producer.into(), title: Some(title.into()), ..Default::default() }
    }
}

/// Column-level metadata carried by every `Variable`.
///
/// Every field is optional or defaultable, so an empty `VariableMeta` is a valid
/// operand for every propagation rule.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VariableMeta {
    pub title: Option<String>,
    pub description: Option<String>,
    pub unit: Option<String>,
    pub short_unit: Option<String>,
    pub sources: Vec<Source>,
    pub licenses: Vec<License>,
    pub origins: Vec<Origin>,
    pub processing_log: ProcessingLog,
    pub dimensions: BTreeMap<String, String>,
    /// Free-form rendering hints (e.g. `numDecimalPlaces`, `color`).
    pub display: BTreeMap<String, serde_json::Value>,
}

impl VariableMeta {
    pub fn new() -> Self { Self::default() }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    pub fn with_short_unit(mut self, short_unit: impl Into<String>) -> Self {
        self.short_unit = Some(short_unit.into());
        self
    }

    pub fn with_source(mut self, source: Source) -> Self {
        self.sources.push(source);
        self
    }

    pub fn with_license(mut self, license: License) -> Self {
        self.licenses.push(license);
        self
    }

    pub fn with_origin(mut self, origin: Origin) -> Self {
        self.origins.push(origin);
        self
    }
}

/// Metadata of the dataset that owns a table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetMeta {
    pub short_name: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub sources: Vec<Source>,
    pub licenses: Vec<License>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableMeta {
    pub short_name: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub dataset: DatasetMeta,
}

//! Chart specifications built from a table.
//!
//! The builder finds the entity and time columns by name, picks the entities
//! worth plotting and emits a serializable spec with one record per point.
use crate::config::{CatalogConfig, DEFAULT_MAX_CHART_ENTITIES};
use crate::error::{CatalogError, Result};
use crate::table::Table;
use crate::variable::{Scalar, Variable};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::collections::HashMap;

pub const ENTITY_COLUMNS: &[&str] = &["country", "entity", "entities", "location", "region"];
pub const TIME_COLUMNS: &[&str] = &["year", "years", "date", "time"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Line,
    Bar,
    Scatter,
}

/// How a column maps onto an axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Encoding {
    pub field: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl Encoding {
    fn of(var: &Variable) -> Self {
        Self {
            field: var.name().unwrap_or_default().to_string(),
            title: var.metadata.title.clone(),
            unit: var.metadata.unit.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub x: Encoding,
    pub y: Encoding,
    pub color: Encoding,
    pub entities: Vec<String>,
    pub data: Vec<Map<String, Value>>,
}

impl ChartSpec {
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| CatalogError::Serialization(e.to_string()))
    }
}

pub struct ChartBuilder<'a> {
    table: &'a Table,
    kind: ChartKind,
    x: Option<String>,
    y: Option<String>,
    entity_column: Option<String>,
    time_column: Option<String>,
    entities: Option<Vec<String>>,
    max_entities: usize,
}

impl<'a> ChartBuilder<'a> {
    pub fn new(table: &'a Table, kind: ChartKind) -> Self {
        Self {
            table,
            kind,
            x: None,
            y: None,
            entity_column: None,
            time_column: None,
            entities: None,
            max_entities: DEFAULT_MAX_CHART_ENTITIES,
        }
    }

    /// A builder keeping at most `config.max_chart_entities` entities.
    pub fn from_config(table: &'a Table, kind: ChartKind, config: &CatalogConfig) -> Self {
        Self::new(table, kind).max_entities(config.max_chart_entities)
    }

    pub fn y(mut self, column: impl Into<String>) -> Self {
        self.y = Some(column.into());
        self
    }

    /// The horizontal variable of a scatter plot.
    pub fn x(mut self, column: impl Into<String>) -> Self {
        self.x = Some(column.into());
        self
    }

    pub fn entity_column(mut self, column: impl Into<String>) -> Self {
        self.entity_column = Some(column.into());
        self
    }

    pub fn time_column(mut self, column: impl Into<String>) -> Self {
        self.time_column = Some(column.into());
        self
    }

    /// Plots exactly these entities instead of ranking them.
    pub fn entities<I, S>(mut self, entities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entities = Some(entities.into_iter().map(Into::into).collect());
        self
    }

    pub fn max_entities(mut self, n: usize) -> Self {
        self.max_entities = n;
        self
    }

    /// An explicitly named column must exist; otherwise the first column
    /// matching one of `candidates` (case-insensitively) is used.
    fn resolve(&self, explicit: &Option<String>, candidates: &[&str]) -> Result<Option<&'a Variable>> {
        let table = self.table;
        Ok(match explicit {
            Some(name) => Some(table.get(name)?),
            None => candidates.iter().find_map(|c| {
                table.columns().iter().find(|v| v.name().is_some_and(|n| n.eq_ignore_ascii_case(c)))
            }),
        })
    }

    pub fn build(self) -> Result<ChartSpec> {
        let entity = self
            .resolve(&self.entity_column, ENTITY_COLUMNS)?
            .ok_or_else(|| CatalogError::MissingDimension("entity".into()))?;
        let time = self.resolve(&self.time_column, TIME_COLUMNS)?;
        let y_name = self.y.as_deref().ok_or_else(|| CatalogError::InvalidArgument("no y column given".into()))?;
        let y = self.table.get(y_name)?;

        let x = match self.kind {
            ChartKind::Scatter => {
                let x_name =
                    self.x.as_deref().ok_or_else(|| CatalogError::InvalidArgument("scatter needs an x column".into()))?;
                self.table.get(x_name)?
            }
            ChartKind::Line | ChartKind::Bar => time.ok_or_else(|| CatalogError::MissingDimension("time".into()))?,
        };

        let selected = match &self.entities {
            Some(explicit) => explicit.clone(),
            None => self.rank_entities(entity, time, x, y),
        };

        let rows = (0..self.table.n_rows()).filter(|&row| {
            !y.values.is_null(row)
                && !x.values.is_null(row)
                && !time.is_some_and(|t| t.values.is_null(row))
                && selected.contains(&entity.values.get(row).to_string())
        });
        let data = rows
            .map(|row| {
                let mut record = Map::new();
                for var in [Some(entity), time, Some(x), Some(y)].into_iter().flatten() {
                    let field = var.name().unwrap_or_default().to_string();
                    record.insert(field, json_value(&var.values.get(row)));
                }
                record
            })
            .collect();

        Ok(ChartSpec {
            kind: self.kind,
            x: Encoding::of(x),
            y: Encoding::of(y),
            color: Encoding::of(entity),
            entities: selected,
            data,
        })
    }

    /// Top entities: by most recent value for line and bar charts, by number
    /// of complete points for scatter plots. Ties break by name.
    fn rank_entities(&self, entity: &Variable, time: Option<&Variable>, x: &Variable, y: &Variable) -> Vec<String> {
        let mut scores: HashMap<String, (Option<Scalar>, f64)> = HashMap::new();
        for row in 0..self.table.n_rows() {
            let name = entity.values.get(row).to_string();
            let score = scores.entry(name).or_insert((None, f64::NEG_INFINITY));
            match self.kind {
                ChartKind::Scatter => {
                    if !x.values.is_null(row) && !y.values.is_null(row) {
                        score.1 = score.1.max(0.0) + 1.0;
                    }
                }
                ChartKind::Line | ChartKind::Bar => {
                    let Some(value) = y.values.get(row).as_f64() else { continue };
                    let when = time.map_or(Scalar::Int(row as i64), |t| t.values.get(row));
                    if when.is_null() {
                        continue;
                    }
                    if score.0.as_ref().map_or(true, |latest| when >= *latest) {
                        *score = (Some(when), value);
                    }
                }
            }
        }

        let mut ranked: Vec<(String, f64)> =
            scores.into_iter().filter(|(_, s)| s.1.is_finite()).map(|(name, s)| (name, s.1)).collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal).then_with(|| a.0.cmp(&b.0)));
        ranked.into_iter().take(self.max_entities).map(|(name, _)| name).collect()
    }
}

fn json_value(value: &Scalar) -> Value {
    match value {
        Scalar::Float(f) if f.is_nan() => Value::Null,
        other => serde_json::to_value(other).unwrap_or(Value::Null),
    }
}

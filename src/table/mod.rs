//! Tables: row-aligned columns sharing a primary key and table metadata.
//!
//! Every operation that derives columns routes their metadata through
//! `crate::propagation`, so provenance is never dropped on the way.

pub use self::combine::combine_two_overlapping_tables;
pub use self::concat::concat;
pub use self::gather::gather_sources_from_tables;
pub use self::groupby::GroupBy;
pub use self::merge::JoinHow;

mod combine;
mod concat;
mod gather;
mod groupby;
mod merge;

use crate::error::{CatalogError, Result};
use crate::meta::{push_unique, License, Origin, Source, TableMeta};
use crate::processing_log::is_processing_log_enabled;
use crate::propagation;
use crate::variable::{Reduction, Scalar, Series, Variable};
use std::collections::HashSet;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    /// Index columns included. Each variable's name is its column name.
    columns: Vec<Variable>,
    pub primary_key: Vec<String>,
    pub metadata: TableMeta,
}

impl Table {
    pub fn new() -> Self { Self::default() }

    /// Builds a table from raw values; every column starts with empty metadata.
    pub fn from_columns<I, K, V>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Series>,
    {
        Self::from_variables(columns.into_iter().map(|(name, values)| Variable::new(name, values)))
    }

    /// Builds a table from named variables, keeping their metadata as is.
    pub fn from_variables(variables: impl IntoIterator<Item = Variable>) -> Result<Self> {
        let mut table = Self::new();
        let mut seen = HashSet::new();
        for var in variables {
            let Some(name) = var.name.clone() else {
                return Err(CatalogError::InvalidArgument("table columns must be named".into()));
            };
            if !seen.insert(name.clone()) {
                return Err(CatalogError::DuplicateColumn(name));
            }
            table.check_rows(&name, &var)?;
            table.columns.push(var);
        }
        Ok(table)
    }

    pub fn with_metadata(mut self, metadata: TableMeta) -> Self {
        self.metadata = metadata;
        self
    }

    fn check_rows(&self, name: &str, var: &Variable) -> Result<()> {
        match self.columns.first() {
            Some(first) if first.len() != var.len() => Err(CatalogError::LengthMismatch {
                op: format!("insert '{}'", name),
                left: first.len(),
                right: var.len(),
            }),
            _ => Ok(()),
        }
    }

    pub fn n_rows(&self) -> usize {
        self.columns.first().map_or(0, Variable::len)
    }

    pub fn n_columns(&self) -> usize { self.columns.len() }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().filter_map(Variable::name).collect()
    }

    /// All columns, index columns included, in table order.
    pub fn columns(&self) -> &[Variable] { &self.columns }

    /// Columns that are not part of the primary key.
    pub fn value_columns(&self) -> impl Iterator<Item = &Variable> + '_ {
        self.columns.iter().filter(move |v| !self.is_index(v))
    }

    fn is_index(&self, var: &Variable) -> bool {
        var.name().is_some_and(|n| self.primary_key.iter().any(|k| k == n))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|v| v.name() == Some(name))
    }

    pub fn get(&self, name: &str) -> Result<&Variable> {
        self.position(name)
            .map(|i| &self.columns[i])
            .ok_or_else(|| CatalogError::ColumnNotFound(name.to_string()))
    }

    pub fn get_mut(&mut self, name: &str) -> Result<&mut Variable> {
        match self.position(name) {
            Some(i) => Ok(&mut self.columns[i]),
            None => Err(CatalogError::ColumnNotFound(name.to_string())),
        }
    }

    pub(crate) fn get_all(&self, names: &[&str]) -> Result<Vec<&Variable>> {
        names.iter().map(|n| self.get(n)).collect()
    }

    /// Stores `var` as column `name`, replacing any column of that name.
    ///
    /// A variable arriving under a different name (or none) is logged as a
    /// `rename` to `name`.
    pub fn insert(&mut self, name: impl Into<String>, var: Variable) -> Result<()> {
        let name = name.into();
        let var = if var.name() == Some(name.as_str()) {
            var
        } else {
            let metadata = propagation::rename_metadata(&var, &name, is_processing_log_enabled());
            Variable { name: Some(name.clone()), values: var.values, metadata }
        };

        match self.position(&name) {
            Some(i) => {
                if self.columns.len() > 1 {
                    let other = if i == 0 { &self.columns[1] } else { &self.columns[0] };
                    if other.len() != var.len() {
                        return Err(CatalogError::LengthMismatch {
                            op: format!("insert '{}'", name),
                            left: other.len(),
                            right: var.len(),
                        });
                    }
                }
                self.columns[i] = var;
            }
            None => {
                self.check_rows(&name, &var)?;
                self.columns.push(var);
            }
        }
        Ok(())
    }

    /// A new table with only `names`, in that order. Metadata is copied verbatim.
    pub fn select(&self, names: &[&str]) -> Result<Table> {
        let columns = self.get_all(names)?.into_iter().cloned().collect();
        Ok(Table {
            columns,
            primary_key: self.primary_key.iter().filter(|k| names.contains(&k.as_str())).cloned().collect(),
            metadata: self.metadata.clone(),
        })
    }

    pub fn drop_columns(&self, names: &[&str]) -> Result<Table> {
        for name in names {
            self.get(name)?;
        }
        let keep: Vec<&str> = self.column_names().into_iter().filter(|n| !names.contains(n)).collect();
        self.select(&keep)
    }

    /// A new table with columns renamed per `mapping`, each rename logged.
    pub fn rename_columns(&self, mapping: &[(&str, &str)]) -> Result<Table> {
        let logging = is_processing_log_enabled();
        for (from, _) in mapping {
            self.get(from)?;
        }

        let mut out = self.clone();
        for (col, var) in out.columns.iter_mut().zip(&self.columns) {
            let Some(&(_, to)) = mapping.iter().find(|(from, _)| var.name() == Some(*from)) else {
                continue;
            };
            col.metadata = propagation::rename_metadata(var, to, logging);
            col.name = Some(to.to_string());
        }
        for key in out.primary_key.iter_mut() {
            if let Some(&(_, to)) = mapping.iter().find(|(from, _)| key.as_str() == *from) {
                *key = to.to_string();
            }
        }

        let mut seen = HashSet::new();
        for name in out.column_names() {
            if !seen.insert(name) {
                return Err(CatalogError::DuplicateColumn(name.to_string()));
            }
        }
        Ok(out)
    }

    pub fn set_index(&mut self, keys: &[&str]) -> Result<()> {
        self.get_all(keys)?;
        self.primary_key = keys.iter().map(|k| k.to_string()).collect();
        Ok(())
    }

    pub fn reset_index(&mut self) {
        self.primary_key.clear();
    }

    pub(crate) fn row_key(columns: &[&Variable], row: usize) -> Vec<Scalar> {
        columns.iter().map(|c| c.values.get(row)).collect()
    }

    /// Rows reordered by `keys` ascending (stable; missing values last).
    pub fn sort_by(&self, keys: &[&str]) -> Result<Table> {
        let key_columns = self.get_all(keys)?;
        let mut order: Vec<usize> = (0..self.n_rows()).collect();
        order.sort_by_cached_key(|&row| Self::row_key(&key_columns, row));
        Ok(self.take_rows(&order.into_iter().map(Some).collect::<Vec<_>>()))
    }

    /// Gathers rows by position; metadata is unchanged.
    pub(crate) fn take_rows(&self, rows: &[Option<usize>]) -> Table {
        let columns = self
            .columns
            .iter()
            .map(|v| Variable { name: v.name.clone(), values: v.values.take(rows), metadata: v.metadata.clone() })
            .collect();
        Table { columns, primary_key: self.primary_key.clone(), metadata: self.metadata.clone() }
    }

    /// Reduces `names` row by row into one unnamed variable.
    pub fn reduce_columns(&self, names: &[&str], reduction: Reduction) -> Result<Variable> {
        let inputs = self.get_all(names)?;
        let Some(first) = inputs.first() else {
            return Err(CatalogError::InvalidArgument("no columns to reduce".into()));
        };
        let series: Vec<&Series> = inputs.iter().map(|v| &v.values).collect();
        let values = Series::reduce_rows(&series, reduction)?;
        let metadata =
            propagation::row_reduction_metadata(&inputs, &first.log_label(), reduction, is_processing_log_enabled());
        Ok(Variable { name: None, values, metadata })
    }

    fn value_columns_mut(&mut self) -> impl Iterator<Item = &mut Variable> + '_ {
        let keys = &self.primary_key;
        self.columns.iter_mut().filter(move |v| !keys.iter().any(|k| v.name() == Some(k.as_str())))
    }

    /// Appends `source` to every non-index column that lacks it.
    pub fn add_source(&mut self, source: Source) {
        for var in self.value_columns_mut() {
            push_unique(&mut var.metadata.sources, source.clone());
        }
    }

    pub fn add_license(&mut self, license: License) {
        for var in self.value_columns_mut() {
            push_unique(&mut var.metadata.licenses, license.clone());
        }
    }

    pub fn add_origin(&mut self, origin: Origin) {
        for var in self.value_columns_mut() {
            push_unique(&mut var.metadata.origins, origin.clone());
        }
    }
}

use super::Table;
use crate::error::{CatalogError, Result};
use crate::processing_log::is_processing_log_enabled;
use crate::propagation;
use crate::variable::{DType, Reduction, Scalar, Series, Variable};
use log::debug;
use rayon::prelude::*;
use std::collections::BTreeMap;

/// Rows of a table bucketed by key, with keys in ascending order.
pub struct GroupBy<'a> {
    table: &'a Table,
    keys: Vec<&'a Variable>,
    groups: BTreeMap<Vec<Scalar>, Vec<usize>>,
}

impl Table {
    pub fn groupby<'a>(&'a self, keys: &[&str]) -> Result<GroupBy<'a>> {
        if keys.is_empty() {
            return Err(CatalogError::InvalidArgument("group-by needs at least one key column".into()));
        }
        let keys = self.get_all(keys)?;
        let mut groups: BTreeMap<Vec<Scalar>, Vec<usize>> = BTreeMap::new();
        for row in 0..self.n_rows() {
            groups.entry(Self::row_key(&keys, row)).or_default().push(row);
        }
        Ok(GroupBy { table: self, keys, groups })
    }
}

impl<'a> GroupBy<'a> {
    pub fn n_groups(&self) -> usize { self.groups.len() }

    /// Applies `reduction` to every non-key column.
    pub fn agg(&self, reduction: Reduction) -> Result<Table> {
        let names: Vec<&str> = self
            .table
            .columns
            .iter()
            .filter_map(Variable::name)
            .filter(|n| !self.keys.iter().any(|k| k.name() == Some(*n)))
            .collect();
        let plan: Vec<(&str, Reduction)> = names.into_iter().map(|n| (n, reduction)).collect();
        self.agg_columns(&plan)
    }

    /// Reduces each listed column with its own reduction, one output column each.
    ///
    /// Columns are reduced in parallel. Key columns keep their metadata as is;
    /// each aggregated column gains one entry naming the reduction.
    pub fn agg_columns(&self, plan: &[(&str, Reduction)]) -> Result<Table> {
        // The toggle is thread-local, so worker threads get the flag explicitly.
        let logging = is_processing_log_enabled();
        let inputs: Vec<(&Variable, Reduction)> =
            plan.iter().map(|&(name, r)| self.table.get(name).map(|var| (var, r))).collect::<Result<_>>()?;
        let groups: Vec<&Vec<usize>> = self.groups.values().collect();

        let mut columns: Vec<Variable> = self
            .keys
            .iter()
            .enumerate()
            .map(|(i, key)| Variable {
                name: key.name.clone(),
                values: Series::from_scalars(self.groups.keys().map(|k| k[i].clone()).collect(), key.values.dtype()),
                metadata: key.metadata.clone(),
            })
            .collect();

        let aggregated: Vec<Variable> = inputs
            .par_iter()
            .map(|&(var, reduction)| aggregate_column(var, reduction, &groups, logging))
            .collect::<Result<_>>()?;
        columns.extend(aggregated);

        debug!(
            "Aggregated {} rows into {} groups over {} columns",
            self.table.n_rows(),
            self.groups.len(),
            inputs.len()
        );
        Ok(Table {
            columns,
            primary_key: self.keys.iter().filter_map(|k| k.name.clone()).collect(),
            metadata: self.table.metadata.clone(),
        })
    }
}

fn aggregate_column(var: &Variable, reduction: Reduction, groups: &[&Vec<usize>], logging: bool) -> Result<Variable> {
    let name = var.name().unwrap_or_default();
    let values = groups
        .iter()
        .map(|rows| var.values.reduce(reduction, Some(rows.as_slice())))
        .collect::<Result<Vec<_>>>()?;
    let hint = if var.values.dtype() == DType::Str { DType::Str } else { DType::Float };
    Ok(Variable {
        name: var.name.clone(),
        values: Series::from_scalars(values, hint),
        metadata: propagation::grouped_metadata(var, name, reduction, logging),
    })
}

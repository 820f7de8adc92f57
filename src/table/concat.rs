use super::Table;
use crate::error::Result;
use crate::processing_log::is_processing_log_enabled;
use crate::propagation;
use crate::variable::{Series, Variable};
use log::debug;

/// Stacks `tables` row-wise.
///
/// Columns appear in first-appearance order; a column absent from a table is
/// filled with missing values for that table's rows. Table metadata comes from
/// the first table, dataset provenance is unioned.
pub fn concat(tables: &[&Table]) -> Result<Table> {
    let Some(first) = tables.first() else {
        return Ok(Table::new());
    };
    let logging = is_processing_log_enabled();

    let mut names: Vec<&str> = Vec::new();
    for table in tables {
        for name in table.column_names() {
            if !names.contains(&name) {
                names.push(name);
            }
        }
    }

    let mut columns = Vec::with_capacity(names.len());
    for name in names {
        let present: Vec<&Variable> = tables.iter().filter_map(|t| t.get(name).ok()).collect();
        // `present` is never empty: `name` came from one of the tables.
        let dtype = present[0].values.dtype();
        let parts: Vec<Series> = tables
            .iter()
            .map(|t| match t.get(name) {
                Ok(var) => var.values.clone(),
                Err(_) => Series::nulls(dtype, t.n_rows()),
            })
            .collect();

        let values = Series::concat(&parts)?;
        let metadata = propagation::stacked_metadata(name, &present, "concat", logging);
        columns.push(Variable { name: Some(name.to_string()), values, metadata });
    }

    let mut metadata = first.metadata.clone();
    metadata.dataset = propagation::combine_datasets(tables.iter().map(|t| &t.metadata.dataset));

    let out = Table { columns, primary_key: first.primary_key.clone(), metadata };
    debug!("Concatenated {} tables into {} rows x {} columns", tables.len(), out.n_rows(), out.n_columns());
    Ok(out)
}

impl Table {
    pub fn concat(&self, others: &[&Table]) -> Result<Table> {
        let mut all = vec![self];
        all.extend_from_slice(others);
        concat(&all)
    }
}

use super::Table;
use crate::error::{CatalogError, Result};
use crate::processing_log::is_processing_log_enabled;
use crate::propagation;
use crate::variable::{Scalar, Series, Variable};
use log::debug;
use std::collections::BTreeMap;

/// Combines two tables that may cover the same rows.
///
/// Rows are aligned on `index_columns` (the first table's primary key when
/// `None`) and sorted by them. For a column present in both, the first table's
/// non-missing values win and its gaps are filled from the second. A key that
/// repeats within one table keeps its first row.
pub fn combine_two_overlapping_tables(first: &Table, second: &Table, index_columns: Option<&[&str]>) -> Result<Table> {
    let index: Vec<&str> = match index_columns {
        Some(cols) => cols.to_vec(),
        None => first.primary_key.iter().map(String::as_str).collect(),
    };
    if index.is_empty() {
        return Err(CatalogError::InvalidArgument("combining tables needs index columns".into()));
    }
    let first_keys = first.get_all(&index)?;
    let second_keys = second.get_all(&index)?;
    let logging = is_processing_log_enabled();

    let mut rows: BTreeMap<Vec<Scalar>, (Option<usize>, Option<usize>)> = BTreeMap::new();
    for row in 0..first.n_rows() {
        rows.entry(Table::row_key(&first_keys, row)).or_insert((Some(row), None));
    }
    for row in 0..second.n_rows() {
        let slot = rows.entry(Table::row_key(&second_keys, row)).or_insert((None, None));
        slot.1.get_or_insert(row);
    }
    let first_rows: Vec<Option<usize>> = rows.values().map(|r| r.0).collect();
    let second_rows: Vec<Option<usize>> = rows.values().map(|r| r.1).collect();

    let mut columns = Vec::new();
    for (i, key) in first_keys.iter().enumerate() {
        columns.push(Variable {
            name: key.name.clone(),
            values: Series::from_scalars(rows.keys().map(|k| k[i].clone()).collect(), key.values.dtype()),
            metadata: key.metadata.clone(),
        });
    }

    let mut names: Vec<&str> = Vec::new();
    for name in first.column_names().into_iter().chain(second.column_names()) {
        if !index.contains(&name) && !names.contains(&name) {
            names.push(name);
        }
    }

    for name in names {
        let column = match (first.get(name).ok(), second.get(name).ok()) {
            (Some(a), Some(b)) => {
                let values = a.values.take(&first_rows).fill_missing_from(&b.values.take(&second_rows))?;
                let metadata = propagation::stacked_metadata(name, &[a, b], "combine", logging);
                Variable { name: Some(name.to_string()), values, metadata }
            }
            (Some(only), None) => realign(only, &first_rows),
            (None, Some(only)) => realign(only, &second_rows),
            (None, None) => continue,
        };
        columns.push(column);
    }

    let mut metadata = first.metadata.clone();
    metadata.dataset = propagation::combine_datasets([&first.metadata.dataset, &second.metadata.dataset]);

    debug!(
        "Combined {} and {} rows on {:?} into {} rows",
        first.n_rows(),
        second.n_rows(),
        index,
        rows.len()
    );
    Ok(Table { columns, primary_key: index.iter().map(|s| s.to_string()).collect(), metadata })
}

fn realign(var: &Variable, rows: &[Option<usize>]) -> Variable {
    Variable { name: var.name.clone(), values: var.values.take(rows), metadata: var.metadata.clone() }
}

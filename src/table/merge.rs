use super::Table;
use crate::error::{CatalogError, Result};
use crate::processing_log::is_processing_log_enabled;
use crate::propagation;
use crate::variable::{Scalar, Series, Variable};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JoinHow {
    Inner,
    Left,
    Outer,
}

type RowPair = (Option<usize>, Option<usize>);

impl Table {
    /// Joins `self` with `right` on the `on` columns.
    ///
    /// Left rows keep their order (right matches follow each left row); an
    /// outer join sorts the result by key. Key columns carry the left side's
    /// metadata; overlapping non-key columns are suffixed `_x` and `_y`.
    pub fn merge(&self, right: &Table, on: &[&str], how: JoinHow) -> Result<Table> {
        if on.is_empty() {
            return Err(CatalogError::InvalidArgument("merge needs at least one key column".into()));
        }
        let left_keys = self.get_all(on)?;
        let right_keys = right.get_all(on)?;
        let logging = is_processing_log_enabled();

        let pairs = Self::join_rows(&left_keys, self.n_rows(), &right_keys, right.n_rows(), how);
        let left_rows: Vec<Option<usize>> = pairs.iter().map(|p| p.0).collect();
        let right_rows: Vec<Option<usize>> = pairs.iter().map(|p| p.1).collect();

        let mut columns = Vec::new();
        for (left_key, right_key) in left_keys.iter().zip(&right_keys) {
            let scalars = pairs
                .iter()
                .map(|&(l, r)| match (l, r) {
                    (Some(l), _) => left_key.values.get(l),
                    (None, Some(r)) => right_key.values.get(r),
                    (None, None) => Scalar::Null,
                })
                .collect();
            columns.push(Variable {
                name: left_key.name.clone(),
                values: Series::from_scalars(scalars, left_key.values.dtype()),
                metadata: left_key.metadata.clone(),
            });
        }

        let left_names: HashSet<&str> = self.column_names().into_iter().collect();
        let right_names: HashSet<&str> = right.column_names().into_iter().collect();
        let sides = [(self, &left_rows, &right_names, "_x"), (right, &right_rows, &left_names, "_y")];
        for (table, rows, other_names, suffix) in sides {
            for var in table.columns.iter().filter(|v| !v.name().is_some_and(|n| on.contains(&n))) {
                let name = var.name().unwrap_or_default();
                let output_name =
                    if other_names.contains(name) { format!("{}{}", name, suffix) } else { name.to_string() };
                let metadata = propagation::merged_column_metadata(var, &output_name, logging);
                columns.push(Variable { name: Some(output_name), values: var.values.take(rows), metadata });
            }
        }

        let mut metadata = self.metadata.clone();
        metadata.dataset = propagation::combine_datasets([&self.metadata.dataset, &right.metadata.dataset]);
        let names: HashSet<&str> = columns.iter().filter_map(Variable::name).collect();
        let primary_key = self.primary_key.iter().filter(|k| names.contains(k.as_str())).cloned().collect();

        debug!(
            "Merged {} and {} rows on {:?} ({:?}) into {} rows",
            self.n_rows(),
            right.n_rows(),
            on,
            how,
            pairs.len()
        );
        Ok(Table { columns, primary_key, metadata })
    }

    fn join_rows(left: &[&Variable], n_left: usize, right: &[&Variable], n_right: usize, how: JoinHow) -> Vec<RowPair> {
        let mut right_index: HashMap<Vec<Scalar>, Vec<usize>> = HashMap::new();
        for row in 0..n_right {
            right_index.entry(Self::row_key(right, row)).or_default().push(row);
        }

        let mut matched = vec![false; n_right];
        let mut pairs = Vec::new();
        for row in 0..n_left {
            match right_index.get(&Self::row_key(left, row)) {
                Some(matches) => {
                    for &r in matches {
                        matched[r] = true;
                        pairs.push((Some(row), Some(r)));
                    }
                }
                None if how != JoinHow::Inner => pairs.push((Some(row), None)),
                None => {}
            }
        }

        if how == JoinHow::Outer {
            pairs.extend(matched.iter().enumerate().filter(|&(_, &m)| !m).map(|(r, _)| (None, Some(r))));
            let key = |&(l, r): &RowPair| match (l, r) {
                (Some(l), _) => Self::row_key(left, l),
                (None, Some(r)) => Self::row_key(right, r),
                (None, None) => Vec::new(),
            };
            pairs.sort_by_cached_key(key);
        }
        pairs
    }
}

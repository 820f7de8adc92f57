//! Typed column storage.
use super::scalar::Scalar;
use crate::compute::kernel::{self, BinaryOp, CompareOp};
use crate::error::{CatalogError, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DType {
    Float,
    Int,
    Bool,
    Str,
}

impl DType {
    pub fn is_numeric(self) -> bool {
        !matches!(self, DType::Str)
    }
}

/// Reductions over a column, or row-wise across several columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Reduction {
    Sum,
    Mean,
    Min,
    Max,
    Count,
    First,
    Last,
}

impl Reduction {
    pub fn name(self) -> &'static str {
        match self {
            Reduction::Sum => "sum",
            Reduction::Mean => "mean",
            Reduction::Min => "min",
            Reduction::Max => "max",
            Reduction::Count => "count",
            Reduction::First => "first",
            Reduction::Last => "last",
        }
    }
}

/// Column values. Missing values are `NaN` for floats and `None` for strings;
/// `Int` and `Bool` cannot hold them and are promoted to `Float` when needed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Series {
    Float(Vec<f64>),
    Int(Vec<i64>),
    Bool(Vec<bool>),
    Str(Vec<Option<String>>),
}

impl Series {
    pub fn len(&self) -> usize {
        match self {
            Series::Float(v) => v.len(),
            Series::Int(v) => v.len(),
            Series::Bool(v) => v.len(),
            Series::Str(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool { self.len() == 0 }

    pub fn dtype(&self) -> DType {
        match self {
            Series::Float(_) => DType::Float,
            Series::Int(_) => DType::Int,
            Series::Bool(_) => DType::Bool,
            Series::Str(_) => DType::Str,
        }
    }

    /// A column of `len` missing values able to sit next to `dtype` values.
    pub fn nulls(dtype: DType, len: usize) -> Self {
        match dtype {
            DType::Str => Series::Str(vec![None; len]),
            _ => Series::Float(vec![f64::NAN; len]),
        }
    }

    pub fn get(&self, i: usize) -> Scalar {
        match self {
            Series::Float(v) => v.get(i).map_or(Scalar::Null, |x| Scalar::Float(*x)),
            Series::Int(v) => v.get(i).map_or(Scalar::Null, |x| Scalar::Int(*x)),
            Series::Bool(v) => v.get(i).map_or(Scalar::Null, |x| Scalar::Bool(*x)),
            Series::Str(v) => match v.get(i) {
                Some(Some(s)) => Scalar::Str(s.clone()),
                _ => Scalar::Null,
            },
        }
    }

    pub fn is_null(&self, i: usize) -> bool {
        self.get(i).is_null()
    }

    pub fn iter(&self) -> impl Iterator<Item = Scalar> + '_ {
        (0..self.len()).map(move |i| self.get(i))
    }

    /// Numeric view with missing values as `NaN`. `None` for string columns.
    pub fn to_f64(&self) -> Option<Vec<f64>> {
        match self {
            Series::Float(v) => Some(v.clone()),
            Series::Int(v) => Some(v.iter().map(|&x| x as f64).collect()),
            Series::Bool(v) => Some(v.iter().map(|&x| if x { 1.0 } else { 0.0 }).collect()),
            Series::Str(_) => None,
        }
    }

    fn numeric(&self, op: &str) -> Result<Vec<f64>> {
        self.to_f64()
            .ok_or_else(|| CatalogError::TypeMismatch(format!("'{}' is not defined for string columns", op)))
    }

    fn check_len(&self, other: &Series, op: &str) -> Result<()> {
        if self.len() != other.len() {
            return Err(CatalogError::LengthMismatch { op: op.to_string(), left: self.len(), right: other.len() });
        }
        Ok(())
    }

    pub fn binary(&self, op: BinaryOp, other: &Series) -> Result<Series> {
        self.check_len(other, op.symbol())?;
        match (self, other, op) {
            (Series::Int(a), Series::Int(b), BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul) => {
                Ok(Series::Int(kernel::apply_i64(op, a, b)))
            }
            _ => {
                let a = self.numeric(op.symbol())?;
                let b = other.numeric(op.symbol())?;
                Ok(Series::Float(kernel::apply_f64(op, &a, &b)))
            }
        }
    }

    pub fn binary_scalar(&self, op: BinaryOp, value: f64, scalar_on_left: bool) -> Result<Series> {
        let integral = value.fract() == 0.0 && value.abs() < i64::MAX as f64;
        if let (Series::Int(a), true, BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul) = (self, integral, op) {
            let b = vec![value as i64; a.len()];
            let out = if scalar_on_left { kernel::apply_i64(op, &b, a) } else { kernel::apply_i64(op, a, &b) };
            return Ok(Series::Int(out));
        }
        let a = self.numeric(op.symbol())?;
        Ok(Series::Float(kernel::apply_f64_scalar(op, &a, value, scalar_on_left)))
    }

    pub fn compare(&self, op: CompareOp, other: &Series) -> Result<Series> {
        self.check_len(other, op.symbol())?;
        let out = match (self, other) {
            (Series::Str(a), Series::Str(b)) => a
                .iter()
                .zip(b)
                .map(|(x, y)| match (x, y) {
                    (Some(x), Some(y)) => op.holds(Some(x.cmp(y))),
                    _ => op.holds(None),
                })
                .collect(),
            (Series::Str(_), _) | (_, Series::Str(_)) => {
                return Err(CatalogError::TypeMismatch(format!(
                    "cannot compare string and numeric columns with '{}'",
                    op.symbol()
                )))
            }
            _ => {
                let a = self.numeric(op.symbol())?;
                let b = other.numeric(op.symbol())?;
                a.iter().zip(&b).map(|(x, y)| op.holds(x.partial_cmp(y))).collect()
            }
        };
        Ok(Series::Bool(out))
    }

    pub fn compare_scalar(&self, op: CompareOp, value: f64) -> Result<Series> {
        let a = self.numeric(op.symbol())?;
        Ok(Series::Bool(a.iter().map(|x| op.holds(x.partial_cmp(&value))).collect()))
    }

    /// Gathers rows by position; `None` yields a missing value.
    pub fn take(&self, indices: &[Option<usize>]) -> Series {
        let has_missing = indices.iter().any(|i| i.map_or(true, |i| i >= self.len()));
        match self {
            Series::Str(v) => Series::Str(
                indices.iter().map(|i| i.and_then(|i| v.get(i).cloned().flatten())).collect(),
            ),
            Series::Int(v) if !has_missing => Series::Int(indices.iter().flatten().map(|&i| v[i]).collect()),
            Series::Bool(v) if !has_missing => Series::Bool(indices.iter().flatten().map(|&i| v[i]).collect()),
            _ => {
                let values = self.to_f64().unwrap_or_default();
                Series::Float(
                    indices
                        .iter()
                        .map(|i| i.and_then(|i| values.get(i).copied()).unwrap_or(f64::NAN))
                        .collect(),
                )
            }
        }
    }

    /// Row-wise union of several columns, promoting to a common type.
    pub fn concat(parts: &[Series]) -> Result<Series> {
        let Some(first) = parts.first() else {
            return Ok(Series::Float(Vec::new()));
        };
        let dtype = first.dtype();
        let all_same = parts.iter().all(|p| p.dtype() == dtype);
        let any_str = parts.iter().any(|p| p.dtype() == DType::Str);

        if all_same {
            return Ok(match first {
                Series::Float(_) => Series::Float(parts.iter().flat_map(|p| p.to_f64().unwrap_or_default()).collect()),
                Series::Int(_) => Series::Int(parts.iter().flat_map(|p| p.ints()).collect()),
                Series::Bool(_) => Series::Bool(parts.iter().flat_map(|p| p.bools()).collect()),
                Series::Str(_) => Series::Str(parts.iter().flat_map(|p| p.strings()).collect()),
            });
        }
        if any_str {
            // Missing-only float filler is compatible with strings.
            let only_fillers = parts.iter().all(|p| p.dtype() == DType::Str || p.all_null());
            if !only_fillers {
                return Err(CatalogError::TypeMismatch("cannot concatenate string and numeric columns".into()));
            }
            return Ok(Series::Str(
                parts
                    .iter()
                    .flat_map(|p| match p {
                        Series::Str(v) => v.clone(),
                        other => vec![None; other.len()],
                    })
                    .collect(),
            ));
        }
        Ok(Series::Float(parts.iter().flat_map(|p| p.to_f64().unwrap_or_default()).collect()))
    }

    fn ints(&self) -> Vec<i64> {
        match self { Series::Int(v) => v.clone(), _ => Vec::new() }
    }

    fn bools(&self) -> Vec<bool> {
        match self { Series::Bool(v) => v.clone(), _ => Vec::new() }
    }

    fn strings(&self) -> Vec<Option<String>> {
        match self { Series::Str(v) => v.clone(), _ => Vec::new() }
    }

    pub fn all_null(&self) -> bool {
        (0..self.len()).all(|i| self.is_null(i))
    }

    /// Keeps `self` where present and falls back to `other` where missing.
    pub fn fill_missing_from(&self, other: &Series) -> Result<Series> {
        self.check_len(other, "combine")?;
        match (self, other) {
            (Series::Int(_), _) | (Series::Bool(_), _) => Ok(self.clone()),
            (Series::Str(a), Series::Str(b)) => {
                Ok(Series::Str(a.iter().zip(b).map(|(x, y)| x.clone().or_else(|| y.clone())).collect()))
            }
            (Series::Str(a), _) if other.all_null() => Ok(Series::Str(a.clone())),
            (_, Series::Str(b)) if self.all_null() => Ok(Series::Str(b.clone())),
            (Series::Str(_), _) | (_, Series::Str(_)) => {
                Err(CatalogError::TypeMismatch("cannot combine string and numeric columns".into()))
            }
            (Series::Float(a), _) => {
                let b = other.to_f64().unwrap_or_default();
                Ok(Series::Float(a.iter().zip(&b).map(|(x, y)| if x.is_nan() { *y } else { *x }).collect()))
            }
        }
    }

    /// Builds a column from cell values; `hint` decides the type of an all-missing column.
    pub fn from_scalars(values: Vec<Scalar>, hint: DType) -> Series {
        let present = || values.iter().filter(|v| !v.is_null());
        let has_missing = values.iter().any(Scalar::is_null);

        if hint == DType::Str || present().any(|v| matches!(v, Scalar::Str(_))) {
            return Series::Str(
                values
                    .into_iter()
                    .map(|v| match v {
                        Scalar::Str(s) => Some(s),
                        v if v.is_null() => None,
                        v => Some(v.to_string()),
                    })
                    .collect(),
            );
        }
        if !has_missing && !values.is_empty() && values.iter().all(|v| matches!(v, Scalar::Int(_))) {
            return Series::Int(values.iter().filter_map(|v| match v { Scalar::Int(i) => Some(*i), _ => None }).collect());
        }
        if !has_missing && !values.is_empty() && values.iter().all(|v| matches!(v, Scalar::Bool(_))) {
            return Series::Bool(values.iter().filter_map(|v| match v { Scalar::Bool(b) => Some(*b), _ => None }).collect());
        }
        if values.is_empty() {
            return Series::nulls(hint, 0);
        }
        Series::Float(values.iter().map(|v| v.as_f64().unwrap_or(f64::NAN)).collect())
    }

    /// Reduces the rows at `rows` (all rows when `None`), skipping missing values.
    pub fn reduce(&self, reduction: Reduction, rows: Option<&[usize]>) -> Result<Scalar> {
        let picked: Vec<Scalar> = match rows {
            Some(rows) => rows.iter().map(|&i| self.get(i)).collect(),
            None => self.iter().collect(),
        };
        reduce_scalars(&picked, reduction, self.dtype())
    }

    /// Reduces across several equally long columns, row by row.
    pub fn reduce_rows(columns: &[&Series], reduction: Reduction) -> Result<Series> {
        let Some(first) = columns.first() else {
            return Ok(Series::Float(Vec::new()));
        };
        let len = first.len();
        for col in columns {
            first.check_len(col, reduction.name())?;
        }
        let dtype = if columns.iter().all(|c| c.dtype() == DType::Int) { DType::Int } else { DType::Float };
        if columns.iter().any(|c| c.dtype() == DType::Str) && !matches!(reduction, Reduction::Count | Reduction::First | Reduction::Last) {
            return Err(CatalogError::TypeMismatch(format!("'{}' is not defined for string columns", reduction.name())));
        }

        let mut out = Vec::with_capacity(len);
        for i in 0..len {
            let row: Vec<Scalar> = columns.iter().map(|c| c.get(i)).collect();
            out.push(reduce_scalars(&row, reduction, dtype)?);
        }
        let hint = if columns.iter().any(|c| c.dtype() == DType::Str) { DType::Str } else { DType::Float };
        Ok(Series::from_scalars(out, hint))
    }
}

fn reduce_scalars(values: &[Scalar], reduction: Reduction, dtype: DType) -> Result<Scalar> {
    let present: Vec<&Scalar> = values.iter().filter(|v| !v.is_null()).collect();
    let needs_numbers = matches!(reduction, Reduction::Sum | Reduction::Mean);
    if needs_numbers && dtype == DType::Str {
        return Err(CatalogError::TypeMismatch(format!("'{}' is not defined for string columns", reduction.name())));
    }

    Ok(match reduction {
        Reduction::Count => Scalar::Int(present.len() as i64),
        Reduction::First => present.first().map_or(Scalar::Null, |v| (*v).clone()),
        Reduction::Last => present.last().map_or(Scalar::Null, |v| (*v).clone()),
        Reduction::Sum => {
            if matches!(dtype, DType::Int | DType::Bool) {
                let total = present
                    .iter()
                    .map(|v| match v {
                        Scalar::Int(i) => *i,
                        Scalar::Bool(b) => i64::from(*b),
                        other => other.as_f64().map_or(0, |x| x as i64),
                    })
                    .fold(0i64, i64::wrapping_add);
                Scalar::Int(total)
            } else {
                Scalar::Float(present.iter().filter_map(|v| v.as_f64()).sum())
            }
        }
        Reduction::Mean => {
            if present.is_empty() {
                Scalar::Float(f64::NAN)
            } else {
                let sum: f64 = present.iter().filter_map(|v| v.as_f64()).sum();
                Scalar::Float(sum / present.len() as f64)
            }
        }
        Reduction::Min => present.iter().min().map_or(Scalar::Null, |v| (*v).clone()),
        Reduction::Max => present.iter().max().map_or(Scalar::Null, |v| (*v).clone()),
    })
}

impl From<Vec<f64>> for Series {
    fn from(v: Vec<f64>) -> Self { Series::Float(v) }
}

impl From<Vec<i64>> for Series {
    fn from(v: Vec<i64>) -> Self { Series::Int(v) }
}

impl From<Vec<bool>> for Series {
    fn from(v: Vec<bool>) -> Self { Series::Bool(v) }
}

impl From<Vec<&str>> for Series {
    fn from(v: Vec<&str>) -> Self { Series::Str(v.into_iter().map(|s| Some(s.to_string())).collect()) }
}

impl From<Vec<String>> for Series {
    fn from(v: Vec<String>) -> Self { Series::Str(v.into_iter().map(Some).collect()) }
}

impl From<Vec<Option<String>>> for Series {
    fn from(v: Vec<Option<String>>) -> Self { Series::Str(v) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_int_arithmetic_stays_int() {
        let a = Series::from(vec![1i64, 2]);
        let b = Series::from(vec![3i64, 4]);
        assert_eq!(a.binary(BinaryOp::Add, &b).unwrap(), Series::Int(vec![4, 6]));
        assert_eq!(a.binary(BinaryOp::Div, &b).unwrap(), Series::Float(vec![1.0 / 3.0, 0.5]));
        assert_eq!(a.binary_scalar(BinaryOp::Mul, 2.0, false).unwrap(), Series::Int(vec![2, 4]));
        assert_eq!(a.binary_scalar(BinaryOp::Mul, 0.5, false).unwrap(), Series::Float(vec![0.5, 1.0]));
    }

    #[test]
    fn test_length_mismatch() {
        let a = Series::from(vec![1.0, 2.0]);
        let b = Series::from(vec![1.0]);
        let err = a.binary(BinaryOp::Add, &b).unwrap_err();
        assert_eq!(err, CatalogError::LengthMismatch { op: "+".into(), left: 2, right: 1 });
    }

    #[test]
    fn test_string_arithmetic_is_rejected() {
        let a = Series::from(vec!["x"]);
        let b = Series::from(vec![1.0]);
        assert!(matches!(a.binary(BinaryOp::Add, &b), Err(CatalogError::TypeMismatch(_))));
    }

    #[test]
    fn test_compare() {
        let a = Series::from(vec![1.0, f64::NAN, 3.0]);
        let b = Series::from(vec![2.0, 2.0, 3.0]);
        assert_eq!(a.compare(CompareOp::Lt, &b).unwrap(), Series::Bool(vec![true, false, false]));
        assert_eq!(a.compare(CompareOp::Ne, &b).unwrap(), Series::Bool(vec![true, true, false]));
        assert_eq!(a.compare_scalar(CompareOp::Ge, 3.0).unwrap(), Series::Bool(vec![false, false, true]));

        let s = Series::from(vec!["a", "b"]);
        let t = Series::from(vec!["a", "c"]);
        assert_eq!(s.compare(CompareOp::Eq, &t).unwrap(), Series::Bool(vec![true, false]));
    }

    #[test]
    fn test_take_promotes_int_with_missing() {
        let s = Series::from(vec![10i64, 20, 30]);
        assert_eq!(s.take(&[Some(2), Some(0)]), Series::Int(vec![30, 10]));
        match s.take(&[Some(1), None]) {
            Series::Float(v) => {
                assert_eq!(v[0], 20.0);
                assert!(v[1].is_nan());
            }
            other => panic!("expected float, got {:?}", other),
        }
    }

    #[test]
    fn test_concat_promotes() {
        let out = Series::concat(&[Series::from(vec![1i64]), Series::from(vec![2.5])]).unwrap();
        assert_eq!(out, Series::Float(vec![1.0, 2.5]));

        let out = Series::concat(&[Series::from(vec!["a"]), Series::nulls(DType::Float, 1)]).unwrap();
        assert_eq!(out, Series::Str(vec![Some("a".into()), None]));

        assert!(Series::concat(&[Series::from(vec!["a"]), Series::from(vec![1.0])]).is_err());
    }

    #[test]
    fn test_fill_missing_from() {
        let a = Series::from(vec![1.0, f64::NAN, 3.0]);
        let b = Series::from(vec![9.0, 2.0, 9.0]);
        assert_eq!(a.fill_missing_from(&b).unwrap(), Series::Float(vec![1.0, 2.0, 3.0]));
    }

    #[rstest]
    #[case(Reduction::Sum, Scalar::Float(4.0))]
    #[case(Reduction::Mean, Scalar::Float(2.0))]
    #[case(Reduction::Min, Scalar::Float(1.0))]
    #[case(Reduction::Max, Scalar::Float(3.0))]
    #[case(Reduction::Count, Scalar::Int(2))]
    #[case(Reduction::First, Scalar::Float(1.0))]
    #[case(Reduction::Last, Scalar::Float(3.0))]
    fn test_reduce_skips_missing(#[case] reduction: Reduction, #[case] expected: Scalar) {
        let s = Series::from(vec![1.0, f64::NAN, 3.0]);
        assert_eq!(s.reduce(reduction, None).unwrap(), expected);
    }

    #[test]
    fn test_reduce_int_sum_and_rows() {
        let s = Series::from(vec![1i64, 2, 3]);
        assert_eq!(s.reduce(Reduction::Sum, Some(&[0, 2])).unwrap(), Scalar::Int(4));

        let a = Series::from(vec![1i64, 2]);
        let b = Series::from(vec![3i64, 4]);
        assert_eq!(Series::reduce_rows(&[&a, &b], Reduction::Sum).unwrap(), Series::Int(vec![4, 6]));
        assert_eq!(Series::reduce_rows(&[&a, &b], Reduction::Mean).unwrap(), Series::Float(vec![2.0, 3.0]));
    }

    #[test]
    fn test_int_sum_is_exact_beyond_f64_precision() {
        // 2^53 + 1 has no exact f64 representation.
        let s = Series::from(vec![9_007_199_254_740_993i64, 0, 2]);
        assert_eq!(s.reduce(Reduction::Sum, None).unwrap(), Scalar::Int(9_007_199_254_740_995));
        assert_eq!(s.reduce(Reduction::Sum, Some(&[0, 1])).unwrap(), Scalar::Int(9_007_199_254_740_993));

        let flags = Series::from(vec![true, false, true]);
        assert_eq!(flags.reduce(Reduction::Sum, None).unwrap(), Scalar::Int(2));
    }

    #[test]
    fn test_from_scalars() {
        assert_eq!(Series::from_scalars(vec![Scalar::Int(1), Scalar::Int(2)], DType::Float), Series::Int(vec![1, 2]));
        match Series::from_scalars(vec![Scalar::Int(1), Scalar::Null], DType::Int) {
            Series::Float(v) => assert!(v[1].is_nan()),
            other => panic!("expected float, got {:?}", other),
        }
        assert_eq!(
            Series::from_scalars(vec![Scalar::from("x"), Scalar::Null], DType::Str),
            Series::Str(vec![Some("x".into()), None])
        );
    }
}

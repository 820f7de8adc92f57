//! Columns: typed values plus the metadata that travels with them.

pub use self::scalar::Scalar;
pub use self::series::{DType, Reduction, Series};

mod scalar;
mod series;

use crate::compute::kernel::{BinaryOp, CompareOp};
use crate::error::Result;
use crate::meta::VariableMeta;
use crate::processing_log::{is_processing_log_enabled, Parents, UNNAMED_VARIABLE};
use crate::propagation;

/// The right-hand side of an element-wise operation.
#[derive(Debug, Clone, Copy)]
pub enum Operand<'a> {
    Variable(&'a Variable),
    Scalar(f64),
}

impl<'a> From<&'a Variable> for Operand<'a> {
    fn from(v: &'a Variable) -> Self { Operand::Variable(v) }
}

impl From<f64> for Operand<'_> {
    fn from(v: f64) -> Self { Operand::Scalar(v) }
}

impl From<i64> for Operand<'_> {
    fn from(v: i64) -> Self { Operand::Scalar(v as f64) }
}

/// A named (or still unnamed) column with its metadata.
///
/// Operations never mutate their operands; every result owns fresh metadata
/// built by the propagation rules.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub name: Option<String>,
    pub values: Series,
    pub metadata: VariableMeta,
}

impl Variable {
    pub fn new(name: impl Into<String>, values: impl Into<Series>) -> Self {
        Self { name: Some(name.into()), values: values.into(), metadata: VariableMeta::default() }
    }

    pub fn unnamed(values: impl Into<Series>) -> Self {
        Self { name: None, values: values.into(), metadata: VariableMeta::default() }
    }

    pub fn with_metadata(mut self, metadata: VariableMeta) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn name(&self) -> Option<&str> { self.name.as_deref() }
    pub fn len(&self) -> usize { self.values.len() }
    pub fn is_empty(&self) -> bool { self.values.is_empty() }

    /// The identifier this variable is known by in processing logs.
    pub fn target(&self) -> String {
        self.metadata
            .processing_log
            .last_target()
            .map(str::to_string)
            .or_else(|| self.name.clone())
            .unwrap_or_else(|| UNNAMED_VARIABLE.to_string())
    }

    /// Name used for the `variable` field of entries derived from this one.
    pub(crate) fn log_label(&self) -> String {
        self.name
            .clone()
            .or_else(|| self.metadata.processing_log.last().map(|e| e.variable.clone()))
            .unwrap_or_else(|| UNNAMED_VARIABLE.to_string())
    }

    pub fn add<'a>(&self, rhs: impl Into<Operand<'a>>) -> Result<Variable> {
        self.binary(BinaryOp::Add, rhs.into())
    }

    pub fn sub<'a>(&self, rhs: impl Into<Operand<'a>>) -> Result<Variable> {
        self.binary(BinaryOp::Sub, rhs.into())
    }

    pub fn mul<'a>(&self, rhs: impl Into<Operand<'a>>) -> Result<Variable> {
        self.binary(BinaryOp::Mul, rhs.into())
    }

    pub fn div<'a>(&self, rhs: impl Into<Operand<'a>>) -> Result<Variable> {
        self.binary(BinaryOp::Div, rhs.into())
    }

    pub fn binary(&self, op: BinaryOp, rhs: Operand<'_>) -> Result<Variable> {
        let logging = is_processing_log_enabled();
        match rhs {
            Operand::Variable(other) => {
                let values = self.values.binary(op, &other.values)?;
                let metadata = propagation::propagate(op.symbol(), &[self, other], logging, || {
                    (self.log_label(), [self.target(), other.target()].into_iter().collect())
                });
                Ok(Self { name: None, values, metadata })
            }
            Operand::Scalar(value) => self.with_scalar(op, value, false, logging),
        }
    }

    /// `value - self`.
    pub fn rsub(&self, value: f64) -> Result<Variable> {
        self.with_scalar(BinaryOp::Sub, value, true, is_processing_log_enabled())
    }

    /// `value / self`.
    pub fn rdiv(&self, value: f64) -> Result<Variable> {
        self.with_scalar(BinaryOp::Div, value, true, is_processing_log_enabled())
    }

    fn with_scalar(&self, op: BinaryOp, value: f64, scalar_on_left: bool, logging: bool) -> Result<Variable> {
        let values = self.values.binary_scalar(op, value, scalar_on_left)?;
        let metadata = propagation::propagate(op.symbol(), &[self], logging, || {
            let literal = Scalar::Float(value).to_string();
            let parents: Parents = if scalar_on_left {
                [literal, self.target()].into_iter().collect()
            } else {
                [self.target(), literal].into_iter().collect()
            };
            (self.log_label(), parents)
        });
        Ok(Self { name: None, values, metadata })
    }

    pub fn compare<'a>(&self, op: CompareOp, rhs: impl Into<Operand<'a>>) -> Result<Variable> {
        let logging = is_processing_log_enabled();
        match rhs.into() {
            Operand::Variable(other) => {
                let values = self.values.compare(op, &other.values)?;
                let metadata = propagation::propagate(op.symbol(), &[self, other], logging, || {
                    (self.log_label(), [self.target(), other.target()].into_iter().collect())
                });
                Ok(Self { name: None, values, metadata })
            }
            Operand::Scalar(value) => {
                let values = self.values.compare_scalar(op, value)?;
                let metadata = propagation::propagate(op.symbol(), &[self], logging, || {
                    (self.log_label(), [self.target(), Scalar::Float(value).to_string()].into_iter().collect())
                });
                Ok(Self { name: None, values, metadata })
            }
        }
    }

    /// A copy of this variable under `name`, logged as a `rename`.
    pub fn rename(&self, name: impl Into<String>) -> Variable {
        let name = name.into();
        let metadata = propagation::rename_metadata(self, &name, is_processing_log_enabled());
        Self { name: Some(name), values: self.values.clone(), metadata }
    }

    /// Reduces the whole column to a single value. Metadata is not involved.
    pub fn reduce(&self, reduction: Reduction) -> Result<Scalar> {
        self.values.reduce(reduction, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta::Source;
    use crate::processing_log::{enable_processing_log, LogEntry, ProcessingLog};
    use rstest::rstest;

    fn seeded(name: &str, values: Vec<i64>) -> Variable {
        let mut var = Variable::new(name, values);
        var.metadata.processing_log = ProcessingLog::from_entries(vec![LogEntry::create(name)]);
        var
    }

    #[test]
    fn test_target_fallbacks() {
        assert_eq!(Variable::unnamed(vec![1.0]).target(), UNNAMED_VARIABLE);
        assert_eq!(Variable::new("gdp", vec![1.0]).target(), "gdp");
        let a = seeded("a", vec![1]);
        let b = seeded("b", vec![2]);
        let _guard = enable_processing_log();
        assert_eq!(a.add(&b).unwrap().target(), "a#2fde09cd0a");
    }

    #[test]
    fn test_add_logs_and_merges() {
        let _guard = enable_processing_log();
        let a = seeded("a", vec![1, 2]);
        let b = seeded("b", vec![3, 4]);

        let c = a.add(&b).unwrap();

        assert_eq!(c.values, Series::Int(vec![4, 6]));
        assert_eq!(c.name, None);
        let entries = c.metadata.processing_log.entries();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[2].variable, "a");
        assert_eq!(entries[2].parents.as_slice(), ["a".to_string(), "b".to_string()]);
        assert_eq!(entries[2].operation, "+");
        assert_eq!(entries[2].target, "a#2fde09cd0a");
    }

    #[test]
    fn test_operands_are_not_mutated() {
        let _guard = enable_processing_log();
        let a = seeded("a", vec![1, 2]).with_metadata(VariableMeta::new().with_source(Source::new("UN")));
        let before = a.clone();

        let _ = a.mul(2.0).unwrap();
        let _ = a.rename("x");

        assert_eq!(a, before);
    }

    #[test]
    fn test_scalar_operand_recorded_as_literal() {
        let _guard = enable_processing_log();
        let a = seeded("a", vec![1, 2]);

        let right = a.mul(2.0).unwrap();
        let left = a.rsub(10.0).unwrap();

        assert_eq!(right.values, Series::Int(vec![2, 4]));
        assert_eq!(right.metadata.processing_log.last().unwrap().parents.as_slice(), ["a".to_string(), "2".to_string()]);
        assert_eq!(left.values, Series::Int(vec![9, 8]));
        assert_eq!(left.metadata.processing_log.last().unwrap().parents.as_slice(), ["10".to_string(), "a".to_string()]);
    }

    #[test]
    fn test_disabled_logging_leaves_result_log_empty() {
        let a = seeded("a", vec![1, 2]);
        let b = seeded("b", vec![3, 4]);
        let c = a.add(&b).unwrap();
        assert!(c.metadata.processing_log.is_empty());
        assert_eq!(c.rename("c").metadata.processing_log.len(), 0);
    }

    #[rstest]
    #[case(CompareOp::Gt, vec![false, true])]
    #[case(CompareOp::Le, vec![true, false])]
    fn test_compare_drops_unit(#[case] op: CompareOp, #[case] expected: Vec<bool>) {
        let a = Variable::new("a", vec![1.0, 3.0]).with_metadata(VariableMeta::new().with_unit("m").with_title("Height"));

        let mask = a.compare(op, 2.0).unwrap();

        assert_eq!(mask.values, Series::Bool(expected));
        assert_eq!(mask.metadata.unit, None);
        assert_eq!(mask.metadata.title.as_deref(), Some("Height"));
    }

    #[test]
    fn test_length_mismatch_is_an_error() {
        let a = Variable::new("a", vec![1.0, 2.0]);
        let b = Variable::new("b", vec![1.0]);
        assert!(a.add(&b).is_err());
    }

    #[test]
    fn test_chained_label_uses_last_entry() {
        let _guard = enable_processing_log();
        let a = seeded("a", vec![1]);
        let b = seeded("b", vec![2]);

        let d = a.add(&b).unwrap().mul(&b).unwrap();

        let last = d.metadata.processing_log.last().unwrap();
        assert_eq!(last.variable, "a");
        assert_eq!(last.parents.as_slice(), ["a#2fde09cd0a".to_string(), "b".to_string()]);
    }
}

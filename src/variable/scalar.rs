use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A single cell value.
///
/// Equality, hashing and ordering are total so scalars can key group-bys and
/// sorts: numbers compare exactly by value across `Int`/`Float`, and missing values
/// sort after everything else.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl Scalar {
    pub fn is_null(&self) -> bool {
        match self {
            Scalar::Null => true,
            Scalar::Float(f) => f.is_nan(),
            _ => false,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Scalar::Int(i) => Some(*i as f64),
            Scalar::Float(f) if !f.is_nan() => Some(*f),
            _ => None,
        }
    }

    fn rank(&self) -> u8 {
        if self.is_null() {
            return 3;
        }
        match self {
            Scalar::Bool(_) => 0,
            Scalar::Int(_) | Scalar::Float(_) => 1,
            Scalar::Str(_) => 2,
            Scalar::Null => 3,
        }
    }
}

/// Exact comparison of an integer with a (non-NaN) float.
fn cmp_int_float(i: i64, f: f64) -> Ordering {
    // 2^63: the first float above every i64.
    const BOUND: f64 = 9_223_372_036_854_775_808.0;
    if f >= BOUND {
        return Ordering::Less;
    }
    if f < -BOUND {
        return Ordering::Greater;
    }
    let whole = f.trunc();
    i.cmp(&(whole as i64)).then_with(|| 0.0_f64.partial_cmp(&(f - whole)).unwrap_or(Ordering::Equal))
}

/// The integer a float is exactly equal to, if any.
fn exact_int(f: f64) -> Option<i64> {
    (f.fract() == 0.0 && cmp_int_float(f as i64, f) == Ordering::Equal).then_some(f as i64)
}

impl Ord for Scalar {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (a, b) if a.rank() != b.rank() => a.rank().cmp(&b.rank()),
            (Scalar::Bool(a), Scalar::Bool(b)) => a.cmp(b),
            (Scalar::Int(a), Scalar::Int(b)) => a.cmp(b),
            (Scalar::Str(a), Scalar::Str(b)) => a.cmp(b),
            (Scalar::Float(a), Scalar::Float(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
            (Scalar::Int(a), Scalar::Float(b)) => cmp_int_float(*a, *b),
            (Scalar::Float(a), Scalar::Int(b)) => cmp_int_float(*b, *a).reverse(),
            _ => Ordering::Equal,
        }
    }
}

impl PartialOrd for Scalar {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Scalar {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Scalar {}

impl Hash for Scalar {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self {
            Scalar::Bool(b) => b.hash(state),
            Scalar::Int(i) => i.hash(state),
            Scalar::Float(f) if !f.is_nan() => match exact_int(*f) {
                Some(i) => i.hash(state),
                None => f.to_bits().hash(state),
            },
            Scalar::Str(s) => s.hash(state),
            _ => {}
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => write!(f, "NaN"),
            Scalar::Bool(b) => write!(f, "{}", b),
            Scalar::Int(i) => write!(f, "{}", i),
            Scalar::Float(v) => write!(f, "{}", v),
            Scalar::Str(s) => write!(f, "{}", s),
        }
    }
}

impl From<f64> for Scalar {
    fn from(v: f64) -> Self { Scalar::Float(v) }
}

impl From<i64> for Scalar {
    fn from(v: i64) -> Self { Scalar::Int(v) }
}

impl From<bool> for Scalar {
    fn from(v: bool) -> Self { Scalar::Bool(v) }
}

impl From<&str> for Scalar {
    fn from(v: &str) -> Self { Scalar::Str(v.to_string()) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_numeric_equality_across_types() {
        assert_eq!(Scalar::Int(2), Scalar::Float(2.0));
        let keys: HashSet<Scalar> = [Scalar::Int(2), Scalar::Float(2.0)].into_iter().collect();
        assert_eq!(keys.len(), 1);
    }

    #[test]
    fn test_int_float_comparison_is_exact() {
        let two_53 = 9_007_199_254_740_992i64;
        let float = Scalar::Float(two_53 as f64);

        assert_eq!(Scalar::Int(two_53), float);
        assert_ne!(Scalar::Int(two_53 + 1), float);
        assert!(Scalar::Int(two_53 + 1) > float);
        assert!(Scalar::Int(-2) < Scalar::Float(-1.5));
        assert!(Scalar::Int(i64::MAX) < Scalar::Float(f64::INFINITY));

        let keys: HashSet<Scalar> = [Scalar::Int(two_53), Scalar::Int(two_53 + 1), float].into_iter().collect();
        assert_eq!(keys.len(), 2);
        let zeros: HashSet<Scalar> = [Scalar::Float(0.0), Scalar::Float(-0.0), Scalar::Int(0)].into_iter().collect();
        assert_eq!(zeros.len(), 1);
    }

    #[test]
    fn test_missing_values_sort_last() {
        let mut values = vec![Scalar::Float(f64::NAN), Scalar::Int(3), Scalar::Null, Scalar::Float(1.5)];
        values.sort();
        assert_eq!(values[0], Scalar::Float(1.5));
        assert_eq!(values[1], Scalar::Int(3));
        assert!(values[2].is_null() && values[3].is_null());
        // All missing values form one group.
        assert_eq!(Scalar::Null, Scalar::Float(f64::NAN));
    }

    #[test]
    fn test_display() {
        assert_eq!(Scalar::Float(2.5).to_string(), "2.5");
        assert_eq!(Scalar::Float(2.0).to_string(), "2");
        assert_eq!(Scalar::from("France").to_string(), "France");
    }
}

//! Element-wise numeric kernels.
//!
//! Float paths run four lanes at a time through `wide`, with a scalar loop for
//! the tail. Integer paths wrap on overflow.
use wide::f64x4;

const LANES: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    pub fn symbol(self) -> &'static str {
        match self {
            CompareOp::Eq => "==",
            CompareOp::Ne => "!=",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
        }
    }

    /// Applies the comparison to an ordering; `None` means incomparable (missing).
    pub fn holds(self, ordering: Option<std::cmp::Ordering>) -> bool {
        use std::cmp::Ordering::*;
        match (self, ordering) {
            (CompareOp::Ne, None) => true,
            (_, None) => false,
            (CompareOp::Eq, Some(o)) => o == Equal,
            (CompareOp::Ne, Some(o)) => o != Equal,
            (CompareOp::Lt, Some(o)) => o == Less,
            (CompareOp::Le, Some(o)) => o != Greater,
            (CompareOp::Gt, Some(o)) => o == Greater,
            (CompareOp::Ge, Some(o)) => o != Less,
        }
    }
}

#[inline(always)]
fn scalar(op: BinaryOp, a: f64, b: f64) -> f64 {
    match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div => a / b,
    }
}

#[inline(always)]
fn lanes(op: BinaryOp, a: f64x4, b: f64x4) -> f64x4 {
    match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div => a / b,
    }
}

#[inline(always)]
fn load(chunk: &[f64]) -> f64x4 {
    f64x4::from([chunk[0], chunk[1], chunk[2], chunk[3]])
}

/// `lhs[i] op rhs[i]`. Callers guarantee equal lengths.
pub fn apply_f64(op: BinaryOp, lhs: &[f64], rhs: &[f64]) -> Vec<f64> {
    debug_assert_eq!(lhs.len(), rhs.len());
    let mut out = Vec::with_capacity(lhs.len());

    let lhs_chunks = lhs.chunks_exact(LANES);
    let rhs_chunks = rhs.chunks_exact(LANES);
    let (lhs_tail, rhs_tail) = (lhs_chunks.remainder(), rhs_chunks.remainder());

    for (l, r) in lhs_chunks.zip(rhs_chunks) {
        out.extend_from_slice(&lanes(op, load(l), load(r)).to_array());
    }
    for (&l, &r) in lhs_tail.iter().zip(rhs_tail) {
        out.push(scalar(op, l, r));
    }
    out
}

/// `values[i] op rhs`, or `lhs op values[i]` when `scalar_on_left`.
pub fn apply_f64_scalar(op: BinaryOp, values: &[f64], rhs: f64, scalar_on_left: bool) -> Vec<f64> {
    let mut out = Vec::with_capacity(values.len());
    let splat = f64x4::splat(rhs);

    let chunks = values.chunks_exact(LANES);
    let tail = chunks.remainder();
    for chunk in chunks {
        let v = load(chunk);
        let res = if scalar_on_left { lanes(op, splat, v) } else { lanes(op, v, splat) };
        out.extend_from_slice(&res.to_array());
    }
    for &v in tail {
        out.push(if scalar_on_left { scalar(op, rhs, v) } else { scalar(op, v, rhs) });
    }
    out
}

/// Integer arithmetic for `+ - *`. Division always goes through the float path.
pub fn apply_i64(op: BinaryOp, lhs: &[i64], rhs: &[i64]) -> Vec<i64> {
    debug_assert_eq!(lhs.len(), rhs.len());
    let f: fn(i64, i64) -> i64 = match op {
        BinaryOp::Add => i64::wrapping_add,
        BinaryOp::Sub => i64::wrapping_sub,
        BinaryOp::Mul => i64::wrapping_mul,
        BinaryOp::Div => |a, b| if b == 0 { 0 } else { a.wrapping_div(b) },
    };
    lhs.iter().zip(rhs).map(|(&a, &b)| f(a, b)).collect()
}

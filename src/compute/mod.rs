//! Numeric kernels behind `Variable` arithmetic.
pub mod kernel;

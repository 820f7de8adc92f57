//! Human-readable renderings of processing logs.
pub mod trace;

pub use trace::format_trace;

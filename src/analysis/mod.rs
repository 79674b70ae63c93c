//! Score analysis.
//!
//! Grouped means and overall statistics over the combined grade table.

pub mod aggregator;

pub use aggregator::*;

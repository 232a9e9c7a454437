//! Access policy evaluation.

pub mod evaluator;

pub use evaluator::{AccessEvaluator, FileAccess, effective_level};

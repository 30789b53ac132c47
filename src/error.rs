//! Shared error types for resampling operations.
//!
//! Every variant is raised during validation, before any output row is
//! produced: a failed call never leaves a partially-resampled result behind.

/// Errors that can occur while resolving a strategy or resampling a dataset.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ResampleError {
    /// The target array has an unsupported shape or content.
    #[error("invalid target type: {0}")]
    InvalidTargetType(String),

    /// The sampling strategy cannot be resolved against the observed classes.
    #[error("invalid sampling strategy: {0}")]
    InvalidSamplingStrategy(String),

    /// A targeted class has too few rows for the requested operation.
    #[error("class {class} has {available} rows, {requested} requested")]
    EmptyClass {
        class: i64,
        available: usize,
        requested: usize,
    },

    /// Feature, target, and weight row counts disagree.
    #[error("row count mismatch: {0}")]
    ShapeMismatch(String),

    /// A per-class shrinkage map does not cover every targeted class.
    #[error("shrinkage map missing targeted classes: {missing:?}")]
    MissingShrinkage { missing: Vec<i64> },

    /// A shrinkage factor is negative or not finite.
    #[error("shrinkage factor must be a non-negative finite number, got {value}")]
    InvalidShrinkage { value: f64 },
}

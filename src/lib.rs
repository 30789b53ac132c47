//! rebalance-rs: resampling for class-imbalanced tabular datasets.
//!
//! This crate rebalances datasets before model training by resampling rows
//! so that target classes reach specified proportions. It provides random
//! over-sampling (optionally with a smoothed bootstrap), random
//! under-sampling, and a balanced fixed-size batch adapter, over dense or
//! compressed-sparse-row feature storage.

pub mod batch;
pub mod data;
pub mod error;
pub mod sampling;
pub mod strategy;
pub mod target;

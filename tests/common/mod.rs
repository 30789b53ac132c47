//! Shared data helpers for integration tests.

#![allow(dead_code)]

use std::collections::BTreeMap;

use rand::prelude::*;

use rebalance_rs::data::{DenseMatrix, FeatureMatrix};
use rebalance_rs::target::Target;

/// Generate a clustered imbalanced dataset.
///
/// Class `k` gets `sizes[k]` rows centered at `(10k, 10k, ...)` with
/// uniform noise in `[-1, 1]`. Labels are the class indices `0..sizes.len()`.
pub fn clustered_dataset(sizes: &[usize], n_features: usize, seed: u64) -> (FeatureMatrix, Target) {
    let n_rows: usize = sizes.iter().sum();
    let mut rng = StdRng::seed_from_u64(seed);

    let mut data = Vec::with_capacity(n_rows * n_features);
    let mut labels = Vec::with_capacity(n_rows);
    for (class, &size) in sizes.iter().enumerate() {
        let center = class as f32 * 10.0;
        for _ in 0..size {
            for _ in 0..n_features {
                data.push(center + rng.r#gen::<f32>() * 2.0 - 1.0);
            }
            labels.push(class as i64);
        }
    }

    (
        DenseMatrix::from_vec(data, n_rows, n_features).into(),
        Target::Labels(labels),
    )
}

/// Per-class row counts of a scalar-label target.
pub fn label_counts(target: &Target) -> BTreeMap<i64, usize> {
    let labels = match target {
        Target::Labels(l) => l,
        Target::Indicator(_) => panic!("expected scalar labels"),
    };
    let mut counts = BTreeMap::new();
    for &l in labels {
        *counts.entry(l).or_insert(0usize) += 1;
    }
    counts
}

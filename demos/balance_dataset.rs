//! Rebalancing an imbalanced dataset before training.
//!
//! This example builds a skewed two-class dataset and rebalances it three
//! ways: plain random over-sampling, over-sampling with a smoothed
//! bootstrap, and random under-sampling. It then serves the result as
//! balanced batches.
//!
//! Run with:
//! ```bash
//! cargo run --example balance_dataset
//! ```

use std::collections::BTreeMap;

use rebalance_rs::batch::{BalancedBatches, BatchConfig};
use rebalance_rs::data::{DenseMatrix, FeatureMatrix};
use rebalance_rs::sampling::{RandomOverSampler, RandomUnderSampler};
use rebalance_rs::strategy::SamplingStrategy;
use rebalance_rs::target::Target;

fn main() {
    // =========================================================================
    // Generate Imbalanced Dataset
    // =========================================================================

    // Class 0 (majority): 900 samples centered at (3, 3)
    // Class 1 (minority): 100 samples centered at (5, 5)
    let n_majority = 900;
    let n_minority = 100;
    let n_features = 2;
    let n_samples = n_majority + n_minority;

    let mut data = Vec::with_capacity(n_samples * n_features);
    let mut labels = Vec::with_capacity(n_samples);

    for i in 0..n_majority {
        let noise1 = ((i * 17) % 200) as f32 / 40.0 - 2.5;
        let noise2 = ((i * 31) % 200) as f32 / 40.0 - 2.5;
        data.push(3.0 + noise1);
        data.push(3.0 + noise2);
        labels.push(0i64);
    }
    for i in 0..n_minority {
        let noise1 = ((i * 23) % 200) as f32 / 40.0 - 2.5;
        let noise2 = ((i * 37) % 200) as f32 / 40.0 - 2.5;
        data.push(5.0 + noise1);
        data.push(5.0 + noise2);
        labels.push(1i64);
    }

    let features: FeatureMatrix = DenseMatrix::from_vec(data, n_samples, n_features).into();
    let target = Target::Labels(labels);

    println!("=== Rebalancing Example ===\n");
    println!("Original: {:?}\n", counts(&target));

    // =========================================================================
    // Plain Random Over-Sampling
    // =========================================================================

    let mut plain = RandomOverSampler::new(SamplingStrategy::Auto, 42);
    let out = plain.fit_resample(&features, &target, None).unwrap();
    println!("Over-sampled (plain):    {:?}", counts(&out.target));

    // =========================================================================
    // Smoothed Bootstrap
    // =========================================================================

    let mut smoothed = RandomOverSampler::builder()
        .seed(42u64)
        .smoothed_bootstrap(true)
        .build()
        .unwrap();
    let out = smoothed.fit_resample(&features, &target, None).unwrap();
    println!("Over-sampled (smoothed): {:?}", counts(&out.target));

    // =========================================================================
    // Random Under-Sampling
    // =========================================================================

    let mut under = RandomUnderSampler::new(SamplingStrategy::Auto, 42);
    let out = under.fit_resample(&features, &target, None).unwrap();
    println!("Under-sampled:           {:?}\n", counts(&out.target));

    // =========================================================================
    // Balanced Batches
    // =========================================================================

    let config = BatchConfig::builder()
        .batch_size(32usize)
        .seed(42u64)
        .build()
        .unwrap();
    let batches = BalancedBatches::new(features, target, None, config).unwrap();
    println!(
        "Balanced batches: {} batches of {} rows ({} balanced rows total)",
        batches.len(),
        32,
        batches.indices().len()
    );

    let first = batches.batch(0);
    println!("First batch class counts: {:?}", counts(&first.target));
}

fn counts(target: &Target) -> BTreeMap<i64, usize> {
    let labels = match target {
        Target::Labels(l) => l,
        Target::Indicator(_) => unreachable!(),
    };
    let mut counts = BTreeMap::new();
    for &l in labels {
        *counts.entry(l).or_insert(0usize) += 1;
    }
    counts
}

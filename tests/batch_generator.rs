//! Balanced batch adapter integration tests.

mod common;

use common::{clustered_dataset, label_counts};
use rebalance_rs::batch::{BalancedBatches, BatchConfig, BatchSampler};
use rebalance_rs::data::FeatureMatrix;
use rebalance_rs::error::ResampleError;
use rebalance_rs::sampling::RandomOverSampler;
use rebalance_rs::strategy::SamplingStrategy;
use rebalance_rs::target::Target;

/// A sampler stub that keeps every row, so batch math is exercised on a
/// known row count.
struct KeepAll;

impl BatchSampler for KeepAll {
    fn resample_indices(
        &mut self,
        features: &FeatureMatrix,
        _target: &Target,
    ) -> Result<Vec<u32>, ResampleError> {
        Ok((0..features.num_rows() as u32).collect())
    }
}

/// 95 resampled rows at batch size 10: nine full batches, the union of the
/// batch windows is a repeat-free subset of the 95 rows.
#[test]
fn ninety_five_rows_make_nine_batches() {
    let (features, target) = clustered_dataset(&[60, 35], 2, 0);
    let config = BatchConfig::builder()
        .batch_size(10usize)
        .seed(42u64)
        .build()
        .unwrap();
    let batches =
        BalancedBatches::with_sampler(features, target, None, &mut KeepAll, config).unwrap();

    assert_eq!(batches.indices().len(), 95);
    assert_eq!(batches.len(), 9);

    let mut union: Vec<u32> = Vec::new();
    for batch_idx in 0..batches.len() {
        union.extend_from_slice(&batches.indices()[batch_idx * 10..(batch_idx + 1) * 10]);
    }
    assert_eq!(union.len(), 90);
    let before = union.len();
    union.sort_unstable();
    union.dedup();
    assert_eq!(union.len(), before, "a row repeated across batches");
    assert!(union.iter().all(|&i| i < 95));
}

#[test]
fn default_sampler_balances_classes() {
    let (features, target) = clustered_dataset(&[60, 35], 2, 1);
    let config = BatchConfig::builder()
        .batch_size(5usize)
        .seed(7u64)
        .build()
        .unwrap();
    let batches = BalancedBatches::new(features, target, None, config).unwrap();

    // Default under-sampler equalizes to the minority count.
    assert_eq!(batches.indices().len(), 70);

    let mut class0 = 0usize;
    let mut class1 = 0usize;
    for batch in batches.iter() {
        for (&c, &n) in label_counts(&batch.target).iter() {
            match c {
                0 => class0 += n,
                1 => class1 += n,
                _ => unreachable!(),
            }
        }
    }
    assert_eq!(class0 + class1, 70);
    assert_eq!(class0, 35);
    assert_eq!(class1, 35);
}

#[test]
fn batches_are_deterministic_and_idempotent() {
    let (features, target) = clustered_dataset(&[60, 35], 3, 2);
    let config = BatchConfig::builder()
        .batch_size(8usize)
        .seed(42u64)
        .build()
        .unwrap();

    let a = BalancedBatches::new(features.clone(), target.clone(), None, config).unwrap();
    let b = BalancedBatches::new(features, target, None, config).unwrap();

    assert_eq!(a.indices(), b.indices());
    for i in 0..a.len() {
        let first = a.batch(i);
        let again = a.batch(i);
        let other = b.batch(i);
        assert_eq!(first.features, again.features);
        assert_eq!(first.features, other.features);
        assert_eq!(first.target, other.target);
    }
}

#[test]
fn weight_component_shape_is_preserved() {
    let (features, target) = clustered_dataset(&[60, 35], 2, 3);
    let config = BatchConfig::builder()
        .batch_size(10usize)
        .build()
        .unwrap();

    let unweighted =
        BalancedBatches::new(features.clone(), target.clone(), None, config).unwrap();
    assert!(unweighted.batch(0).weights.is_none());

    let weights: Vec<f32> = (0..95).map(|i| i as f32).collect();
    let weighted = BalancedBatches::new(features, target, Some(weights), config).unwrap();
    let batch = weighted.batch(0);
    assert_eq!(batch.weights.unwrap().len(), 10);
}

#[test]
fn over_sampler_plugs_in() {
    let (features, target) = clustered_dataset(&[60, 35], 2, 4);
    let mut sampler = RandomOverSampler::new(SamplingStrategy::Auto, 42);
    let config = BatchConfig::builder()
        .batch_size(10usize)
        .seed(42u64)
        .build()
        .unwrap();
    let batches =
        BalancedBatches::with_sampler(features, target, None, &mut sampler, config).unwrap();

    // Over-sampling equalizes up: 60 + 60 = 120 rows, 12 batches.
    assert_eq!(batches.indices().len(), 120);
    assert_eq!(batches.len(), 12);

    let mut counts = std::collections::BTreeMap::new();
    for batch in batches.iter() {
        for (c, n) in label_counts(&batch.target) {
            *counts.entry(c).or_insert(0usize) += n;
        }
    }
    assert_eq!(counts[&0], 60);
    assert_eq!(counts[&1], 60);
}

#[test]
fn batch_rows_match_source_rows() {
    let (features, target) = clustered_dataset(&[60, 35], 3, 5);
    let config = BatchConfig::builder()
        .batch_size(10usize)
        .seed(9u64)
        .build()
        .unwrap();
    let batches =
        BalancedBatches::with_sampler(features.clone(), target, None, &mut KeepAll, config)
            .unwrap();

    let batch = batches.batch(2);
    let window = &batches.indices()[20..30];
    for (pos, &origin) in window.iter().enumerate() {
        for col in 0..3 {
            assert_eq!(
                batch.features.get(pos, col),
                features.get(origin as usize, col)
            );
        }
    }
}

//! Resampling engines.
//!
//! # Available Samplers
//!
//! - [`RandomOverSampler`]: duplicate minority-class rows at random, with
//!   an optional smoothed bootstrap that perturbs duplicates with
//!   class-conditional Gaussian noise
//! - [`RandomUnderSampler`]: keep a random subset of majority-class rows
//!
//! # Determinism
//!
//! Each sampler threads a single `Xoshiro256PlusPlus` seeded from its
//! `seed` through every stochastic draw, in a fixed order: per-class donor
//! draws ascending by class code, then (smoothed mode) per-row Gaussian
//! draws, then the final output permutation. Two calls with the same seed
//! and inputs produce bit-identical outputs.
//!
//! # Fitted state
//!
//! A sampler retains the resolved strategy and the provenance indices of
//! its most recent `fit_resample` call; both are overwritten by the next
//! call. Instances are not synchronized: concurrent fits on one instance
//! must be serialized by the caller.

mod logger;
mod over;
mod under;

pub use logger::{ResampleLogger, Verbosity};
pub use over::{RandomOverSampler, RandomOverSamplerBuilder};
pub use under::{RandomUnderSampler, RandomUnderSamplerBuilder};

use std::collections::BTreeMap;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::data::FeatureMatrix;
use crate::error::ResampleError;
use crate::strategy::ResolvedStrategy;
use crate::target::Target;

// ============================================================================
// Shrinkage
// ============================================================================

/// Smoothed-bootstrap perturbation magnitude, per class or shared.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Shrinkage {
    /// One factor applied to every targeted class.
    Constant(f64),
    /// Per-class factors; must cover every targeted class.
    PerClass(BTreeMap<i64, f64>),
}

impl Default for Shrinkage {
    fn default() -> Self {
        Self::Constant(1.0)
    }
}

impl Shrinkage {
    /// Resolve to one factor per targeted class, validating coverage and
    /// value range before any sampling happens.
    ///
    /// # Errors
    ///
    /// [`ResampleError::MissingShrinkage`] when a per-class map omits a
    /// targeted class; [`ResampleError::InvalidShrinkage`] for negative or
    /// non-finite factors. A missing entry is never defaulted.
    pub fn factors_for(
        &self,
        resolved: &ResolvedStrategy,
    ) -> Result<BTreeMap<i64, f64>, ResampleError> {
        match self {
            Shrinkage::Constant(value) => {
                check_factor(*value)?;
                Ok(resolved.classes().map(|c| (c, *value)).collect())
            }
            Shrinkage::PerClass(map) => {
                let missing: Vec<i64> =
                    resolved.classes().filter(|c| !map.contains_key(c)).collect();
                if !missing.is_empty() {
                    return Err(ResampleError::MissingShrinkage { missing });
                }
                let mut factors = BTreeMap::new();
                for class in resolved.classes() {
                    let value = map[&class];
                    check_factor(value)?;
                    factors.insert(class, value);
                }
                Ok(factors)
            }
        }
    }
}

fn check_factor(value: f64) -> Result<(), ResampleError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ResampleError::InvalidShrinkage { value });
    }
    Ok(())
}

// ============================================================================
// Resampling result
// ============================================================================

/// Output of one `fit_resample` call.
#[derive(Debug, Clone)]
pub struct Resampled {
    /// Resampled feature matrix, storage kind matching the input unless
    /// densification was requested.
    pub features: FeatureMatrix,
    /// Resampled target, representation matching the input.
    pub target: Target,
    /// Resampled per-row weights; `None` when none were supplied.
    pub weights: Option<Vec<f32>>,
    /// Provenance: for each output row, the original row it derives from.
    pub sample_indices: Vec<u32>,
}

// ============================================================================
// Shared helpers
// ============================================================================

/// Check that feature, target, and weight row counts agree.
pub(crate) fn validate_shapes(
    features: &FeatureMatrix,
    target: &Target,
    weights: Option<&[f32]>,
) -> Result<(), ResampleError> {
    let rows = features.num_rows();
    if target.num_rows() != rows {
        return Err(ResampleError::ShapeMismatch(format!(
            "features have {} rows but target has {}",
            rows,
            target.num_rows()
        )));
    }
    if let Some(w) = weights {
        if w.len() != rows {
            return Err(ResampleError::ShapeMismatch(format!(
                "features have {} rows but weights have {}",
                rows,
                w.len()
            )));
        }
    }
    Ok(())
}

/// Original-row indices of every row labeled `class`.
pub(crate) fn rows_of_class(codes: &[i64], class: i64) -> Vec<u32> {
    codes
        .iter()
        .enumerate()
        .filter(|(_, &c)| c == class)
        .map(|(i, _)| i as u32)
        .collect()
}

/// A random permutation of `0..n` drawn from `rng`.
pub(crate) fn permutation<R: Rng>(n: usize, rng: &mut R) -> Vec<u32> {
    let mut indices: Vec<u32> = (0..n as u32).collect();
    indices.shuffle(rng);
    indices
}

/// Gather `values[i]` for each index, in order.
pub(crate) fn gather<T: Copy>(values: &[T], indices: &[u32]) -> Vec<T> {
    indices.iter().map(|&i| values[i as usize]).collect()
}

/// Draw `k` indices without replacement via partial Fisher-Yates shuffle.
///
/// Returns sorted values. `k` must not exceed `items.len()`.
pub(crate) fn sample_without_replacement<R: Rng>(
    items: &[u32],
    k: usize,
    rng: &mut R,
) -> Vec<u32> {
    debug_assert!(k <= items.len());
    let mut positions: Vec<usize> = (0..items.len()).collect();
    for i in 0..k {
        let j = rng.gen_range(i..positions.len());
        positions.swap(i, j);
    }
    let mut sampled: Vec<u32> = positions[..k].iter().map(|&p| items[p]).collect();
    sampled.sort_unstable();
    sampled
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DenseMatrix;
    use crate::strategy::{class_counts, resolve, SamplingMode, SamplingStrategy};
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    fn resolved_for(codes: &[i64]) -> ResolvedStrategy {
        resolve(
            &SamplingStrategy::Auto,
            &class_counts(codes),
            SamplingMode::OverSampling,
        )
        .unwrap()
    }

    #[test]
    fn constant_shrinkage_covers_all_classes() {
        let resolved = resolved_for(&[0, 0, 0, 1, 2]);
        let factors = Shrinkage::Constant(0.5).factors_for(&resolved).unwrap();
        assert_eq!(factors[&1], 0.5);
        assert_eq!(factors[&2], 0.5);
        assert_eq!(factors.len(), 2);
    }

    #[test]
    fn per_class_shrinkage_missing_class_fails() {
        let resolved = resolved_for(&[0, 0, 0, 1, 2]);
        let map: BTreeMap<i64, f64> = [(1, 0.5)].into_iter().collect();
        let err = Shrinkage::PerClass(map).factors_for(&resolved).unwrap_err();
        assert_eq!(err, ResampleError::MissingShrinkage { missing: vec![2] });
    }

    #[test]
    fn negative_shrinkage_fails() {
        let resolved = resolved_for(&[0, 0, 1]);
        let err = Shrinkage::Constant(-1.0).factors_for(&resolved).unwrap_err();
        assert!(matches!(err, ResampleError::InvalidShrinkage { .. }));
    }

    #[test]
    fn zero_shrinkage_is_valid() {
        let resolved = resolved_for(&[0, 0, 1]);
        let factors = Shrinkage::Constant(0.0).factors_for(&resolved).unwrap();
        assert_eq!(factors[&1], 0.0);
    }

    #[test]
    fn validate_shapes_catches_weight_mismatch() {
        let features: FeatureMatrix =
            DenseMatrix::from_vec(vec![1.0, 2.0, 3.0, 4.0], 2, 2).into();
        let target = Target::Labels(vec![0, 1]);
        assert!(validate_shapes(&features, &target, Some(&[1.0, 1.0])).is_ok());
        let err = validate_shapes(&features, &target, Some(&[1.0])).unwrap_err();
        assert!(matches!(err, ResampleError::ShapeMismatch(_)));
    }

    #[test]
    fn rows_of_class_picks_matching_rows() {
        assert_eq!(rows_of_class(&[1, 0, 1, 1], 1), vec![0, 2, 3]);
        assert!(rows_of_class(&[1, 0], 9).is_empty());
    }

    #[test]
    fn sample_without_replacement_no_repeats() {
        let items: Vec<u32> = (0..100).collect();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(42);
        let sampled = sample_without_replacement(&items, 40, &mut rng);
        assert_eq!(sampled.len(), 40);
        let mut deduped = sampled.clone();
        deduped.dedup();
        assert_eq!(deduped.len(), 40);
        assert!(sampled.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn permutation_is_reproducible() {
        let mut rng1 = Xoshiro256PlusPlus::seed_from_u64(7);
        let mut rng2 = Xoshiro256PlusPlus::seed_from_u64(7);
        assert_eq!(permutation(50, &mut rng1), permutation(50, &mut rng2));
    }
}

//! Balanced fixed-size batches over a resampled dataset.
//!
//! [`BalancedBatches`] runs a sampler once at construction to obtain a
//! balanced set of original-row indices, shuffles them once, and then
//! serves deterministic fixed-size batches by slicing the original arrays.
//! Indexing is stateless: requesting the same batch twice returns identical
//! content, and the whole sequence can be replayed any number of times.

use derive_builder::Builder;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::data::FeatureMatrix;
use crate::error::ResampleError;
use crate::sampling::{RandomOverSampler, RandomUnderSampler};
use crate::strategy::SamplingStrategy;
use crate::target::Target;

// ============================================================================
// BatchSampler
// ============================================================================

/// A sampler that can supply balanced original-row indices for batching.
///
/// Both resamplers qualify: their provenance indices point into the
/// original arrays, which is exactly what batch slicing needs.
pub trait BatchSampler {
    /// Resample and return the provenance indices.
    fn resample_indices(
        &mut self,
        features: &FeatureMatrix,
        target: &Target,
    ) -> Result<Vec<u32>, ResampleError>;
}

impl BatchSampler for RandomUnderSampler {
    fn resample_indices(
        &mut self,
        features: &FeatureMatrix,
        target: &Target,
    ) -> Result<Vec<u32>, ResampleError> {
        Ok(self.fit_resample(features, target, None)?.sample_indices)
    }
}

impl BatchSampler for RandomOverSampler {
    fn resample_indices(
        &mut self,
        features: &FeatureMatrix,
        target: &Target,
    ) -> Result<Vec<u32>, ResampleError> {
        Ok(self.fit_resample(features, target, None)?.sample_indices)
    }
}

// ============================================================================
// Configuration
// ============================================================================

/// Batch sequence configuration.
#[derive(Debug, Clone, Copy, PartialEq, Builder)]
#[builder(setter(into), default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BatchConfig {
    /// Rows per batch.
    #[builder(default = "32")]
    pub batch_size: usize,

    /// Whether sparse feature slices keep their sparse storage.
    /// When `false`, each batch is densified.
    #[builder(default = "false")]
    pub sparse: bool,

    /// Seed for the construction-time shuffle (and the default sampler).
    #[builder(default = "0")]
    pub seed: u64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: 32,
            sparse: false,
            seed: 0,
        }
    }
}

impl BatchConfig {
    /// Fluent configuration builder.
    pub fn builder() -> BatchConfigBuilder {
        BatchConfigBuilder::default()
    }
}

// ============================================================================
// BalancedBatches
// ============================================================================

/// One batch of rows.
///
/// `weights` is present exactly when weights were supplied at construction,
/// so callers see the same two-vs-three component shape they put in.
#[derive(Debug, Clone)]
pub struct Batch {
    /// Feature rows for this batch.
    pub features: FeatureMatrix,
    /// Target rows for this batch.
    pub target: Target,
    /// Weight rows for this batch, if weights were supplied.
    pub weights: Option<Vec<f32>>,
}

/// A finite, restartable sequence of balanced fixed-size batches.
///
/// The shuffled index order is fixed at construction; afterwards the
/// sequence is immutable and safe to read from multiple threads.
/// Trailing rows beyond the last full batch are dropped, not padded.
///
/// # Example
///
/// ```
/// use rebalance_rs::batch::{BalancedBatches, BatchConfig};
/// use rebalance_rs::data::DenseMatrix;
/// use rebalance_rs::target::Target;
///
/// let features = DenseMatrix::from_vec(vec![0.0; 20], 10, 2).into();
/// let target = Target::Labels(vec![0, 0, 0, 0, 0, 0, 0, 1, 1, 1]);
///
/// let config = BatchConfig::builder().batch_size(2usize).build().unwrap();
/// let batches = BalancedBatches::new(features, target, None, config).unwrap();
/// // The default sampler balances to 3 + 3 rows: three batches of two.
/// assert_eq!(batches.len(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct BalancedBatches {
    features: FeatureMatrix,
    target: Target,
    weights: Option<Vec<f32>>,
    indices: Vec<u32>,
    batch_size: usize,
    sparse: bool,
}

impl BalancedBatches {
    /// Build a batch sequence using the default balancing sampler
    /// (equalizing under-sampler seeded from the config seed).
    pub fn new(
        features: FeatureMatrix,
        target: Target,
        weights: Option<Vec<f32>>,
        config: BatchConfig,
    ) -> Result<Self, ResampleError> {
        let mut sampler = RandomUnderSampler::new(SamplingStrategy::Auto, config.seed);
        Self::with_sampler(features, target, weights, &mut sampler, config)
    }

    /// Build a batch sequence with a caller-supplied sampler.
    ///
    /// The sampler runs exactly once; its provenance indices are shuffled
    /// once with a generator seeded from `config.seed`.
    pub fn with_sampler<S: BatchSampler + ?Sized>(
        features: FeatureMatrix,
        target: Target,
        weights: Option<Vec<f32>>,
        sampler: &mut S,
        config: BatchConfig,
    ) -> Result<Self, ResampleError> {
        if config.batch_size == 0 {
            return Err(ResampleError::ShapeMismatch(
                "batch size must be positive".into(),
            ));
        }
        if target.num_rows() != features.num_rows() {
            return Err(ResampleError::ShapeMismatch(format!(
                "features have {} rows but target has {}",
                features.num_rows(),
                target.num_rows()
            )));
        }
        if let Some(w) = &weights {
            if w.len() != features.num_rows() {
                return Err(ResampleError::ShapeMismatch(format!(
                    "features have {} rows but weights have {}",
                    features.num_rows(),
                    w.len()
                )));
            }
        }

        let mut indices = sampler.resample_indices(&features, &target)?;
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(config.seed);
        indices.shuffle(&mut rng);

        Ok(Self {
            features,
            target,
            weights,
            indices,
            batch_size: config.batch_size,
            sparse: config.sparse,
        })
    }

    /// Number of full batches. Trailing rows are dropped.
    pub fn len(&self) -> usize {
        self.indices.len() / self.batch_size
    }

    /// Whether the sequence contains no full batch.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The shuffled original-row indices backing the sequence.
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Get batch `i`. Pure and idempotent.
    ///
    /// # Panics
    ///
    /// Panics if `i >= len()`.
    pub fn batch(&self, i: usize) -> Batch {
        assert!(
            i < self.len(),
            "Batch index {} out of bounds for {} batches",
            i,
            self.len()
        );
        let window = &self.indices[i * self.batch_size..(i + 1) * self.batch_size];

        let mut features = self.features.take_rows(window);
        if !self.sparse {
            features = features.densified();
        }
        let target = self.target.take_rows(window);
        let weights = self
            .weights
            .as_ref()
            .map(|w| window.iter().map(|&i| w[i as usize]).collect());

        Batch {
            features,
            target,
            weights,
        }
    }

    /// Iterate over all batches in order.
    pub fn iter(&self) -> BatchIter<'_> {
        BatchIter {
            batches: self,
            next: 0,
        }
    }
}

/// Iterator over the batches of a [`BalancedBatches`] sequence.
#[derive(Debug, Clone)]
pub struct BatchIter<'a> {
    batches: &'a BalancedBatches,
    next: usize,
}

impl Iterator for BatchIter<'_> {
    type Item = Batch;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.batches.len() {
            return None;
        }
        let batch = self.batches.batch(self.next);
        self.next += 1;
        Some(batch)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.batches.len() - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for BatchIter<'_> {}

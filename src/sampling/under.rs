//! Random under-sampling.

use derive_builder::Builder;
use rand::Rng;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::data::FeatureMatrix;
use crate::error::ResampleError;
use crate::sampling::{
    gather, permutation, rows_of_class, sample_without_replacement, validate_shapes,
    ResampleLogger, Resampled, Verbosity,
};
use crate::strategy::{class_counts, resolve, ResolvedStrategy, SamplingMode, SamplingStrategy};
use crate::target::{EncodedTarget, Target};

/// Under-sample majority classes by keeping a random subset of their rows.
///
/// Untargeted classes pass through unchanged. Kept indices are drawn
/// without replacement by default; with `replacement` enabled a kept row
/// may be selected more than once (and provenance entries may repeat).
///
/// # Example
///
/// ```
/// use rebalance_rs::data::DenseMatrix;
/// use rebalance_rs::sampling::RandomUnderSampler;
/// use rebalance_rs::target::Target;
///
/// let features = DenseMatrix::from_vec(vec![0.0; 8], 4, 2).into();
/// let target = Target::Labels(vec![0, 0, 0, 1]);
///
/// let mut sampler = RandomUnderSampler::builder().seed(42u64).build().unwrap();
/// let out = sampler.fit_resample(&features, &target, None).unwrap();
/// assert_eq!(out.features.num_rows(), 2);
/// ```
#[derive(Debug, Clone, Builder)]
#[builder(setter(into), default)]
pub struct RandomUnderSampler {
    /// Per-class target policy.
    #[builder(default)]
    pub strategy: SamplingStrategy,

    /// Seed for all stochastic draws.
    #[builder(default = "0")]
    pub seed: u64,

    /// Whether kept indices are drawn with replacement.
    #[builder(default = "false")]
    pub replacement: bool,

    /// Progress output level.
    #[builder(default)]
    pub verbosity: Verbosity,

    /// Strategy resolved by the most recent fit.
    #[builder(setter(skip))]
    resolved: Option<ResolvedStrategy>,

    /// Provenance indices of the most recent fit.
    #[builder(setter(skip))]
    sample_indices: Option<Vec<u32>>,
}

impl Default for RandomUnderSampler {
    fn default() -> Self {
        Self {
            strategy: SamplingStrategy::default(),
            seed: 0,
            replacement: false,
            verbosity: Verbosity::default(),
            resolved: None,
            sample_indices: None,
        }
    }
}

impl RandomUnderSampler {
    /// Fluent configuration builder.
    pub fn builder() -> RandomUnderSamplerBuilder {
        RandomUnderSamplerBuilder::default()
    }

    /// Create a sampler with the given strategy and seed, defaults otherwise.
    pub fn new(strategy: SamplingStrategy, seed: u64) -> Self {
        Self {
            strategy,
            seed,
            ..Self::default()
        }
    }

    /// Provenance indices of the most recent fit, if any.
    ///
    /// Length equals the output row count; without replacement the entries
    /// are a repeat-free subset of the original row indices. Overwritten by
    /// the next [`fit_resample`](Self::fit_resample) call.
    pub fn sample_indices(&self) -> Option<&[u32]> {
        self.sample_indices.as_deref()
    }

    /// Strategy resolved by the most recent fit, if any.
    pub fn resolved_strategy(&self) -> Option<&ResolvedStrategy> {
        self.resolved.as_ref()
    }

    /// Resample the dataset, cutting targeted classes to their resolved
    /// keep-counts.
    ///
    /// The kept subset is assembled class by class in ascending class
    /// order, then permuted once; features, target, weights, and
    /// provenance are permuted identically. All validation happens before
    /// any row is drawn.
    pub fn fit_resample(
        &mut self,
        features: &FeatureMatrix,
        target: &Target,
        weights: Option<&[f32]>,
    ) -> Result<Resampled, ResampleError> {
        validate_shapes(features, target, weights)?;
        let encoded = EncodedTarget::encode(target)?;
        let counts = class_counts(encoded.codes());
        let resolved = resolve(&self.strategy, &counts, SamplingMode::UnderSampling)?;

        // Validate every targeted class before drawing anything.
        for (class, n_keep) in resolved.iter() {
            let available = counts.get(&class).copied().unwrap_or(0);
            if n_keep > available {
                return Err(ResampleError::EmptyClass {
                    class,
                    available,
                    requested: n_keep,
                });
            }
        }

        let logger = ResampleLogger::new(self.verbosity);
        logger.class_counts("before", &counts);

        let mut rng = Xoshiro256PlusPlus::seed_from_u64(self.seed);

        let mut kept: Vec<u32> = Vec::new();
        for (&class, _) in counts.iter() {
            let class_rows = rows_of_class(encoded.codes(), class);
            match resolved.get(class) {
                Some(n_keep) => {
                    logger.class_draw(class, n_keep, class_rows.len());
                    if self.replacement {
                        kept.extend(
                            (0..n_keep).map(|_| class_rows[rng.gen_range(0..class_rows.len())]),
                        );
                    } else {
                        kept.extend(sample_without_replacement(&class_rows, n_keep, &mut rng));
                    }
                }
                None => kept.extend_from_slice(&class_rows),
            }
        }

        // One atomic permutation across all row-aligned arrays.
        let perm = permutation(kept.len(), &mut rng);
        let out_indices = gather(&kept, &perm);

        let out_features = features.take_rows(&out_indices);
        let out_codes = gather(encoded.codes(), &out_indices);
        let out_weights = weights.map(|w| gather(w, &out_indices));

        logger.class_counts("after", &class_counts(&out_codes));

        let out_target = encoded.decode(&out_codes);
        self.resolved = Some(resolved);
        self.sample_indices = Some(out_indices.clone());

        Ok(Resampled {
            features: out_features,
            target: out_target,
            weights: out_weights,
            sample_indices: out_indices,
        })
    }
}

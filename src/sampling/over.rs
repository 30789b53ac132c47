//! Random over-sampling with optional smoothed bootstrap.

use derive_builder::Builder;
use rand::Rng;
use rand::SeedableRng;
use rand_distr::StandardNormal;
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::data::{DenseMatrix, FeatureMatrix};
use crate::error::ResampleError;
use crate::sampling::{
    gather, permutation, rows_of_class, validate_shapes, ResampleLogger, Resampled, Shrinkage,
    Verbosity,
};
use crate::strategy::{class_counts, resolve, ResolvedStrategy, SamplingMode, SamplingStrategy};
use crate::target::{EncodedTarget, Target};

/// Over-sample minority classes by duplicating rows at random with
/// replacement.
///
/// With `smoothed_bootstrap` enabled, each duplicated row is perturbed with
/// class-conditional Gaussian noise before being appended: the per-feature
/// scale is the class's population standard deviation, shrunk by a
/// bandwidth constant and the configured [`Shrinkage`] factor. A class with
/// a single row has zero scale, so its smoothed duplicates degenerate to
/// exact copies.
///
/// The input storage kind (dense or sparse) is preserved in the output
/// unless `sparse_output` is disabled.
///
/// # Example
///
/// ```
/// use rebalance_rs::data::DenseMatrix;
/// use rebalance_rs::sampling::RandomOverSampler;
/// use rebalance_rs::target::Target;
///
/// let features = DenseMatrix::from_vec(vec![0.0, 0.0, 1.0, 1.0, 2.0, 2.0], 3, 2).into();
/// let target = Target::Labels(vec![0, 0, 1]);
///
/// let mut sampler = RandomOverSampler::builder().seed(42u64).build().unwrap();
/// let out = sampler.fit_resample(&features, &target, None).unwrap();
/// assert_eq!(out.features.num_rows(), 4);
/// ```
#[derive(Debug, Clone, Builder)]
#[builder(setter(into), default)]
pub struct RandomOverSampler {
    /// Per-class target policy.
    #[builder(default)]
    pub strategy: SamplingStrategy,

    /// Seed for all stochastic draws.
    #[builder(default = "0")]
    pub seed: u64,

    /// Whether to perturb duplicated rows instead of copying them verbatim.
    #[builder(default = "false")]
    pub smoothed_bootstrap: bool,

    /// Perturbation magnitude for the smoothed bootstrap.
    #[builder(default)]
    pub shrinkage: Shrinkage,

    /// Whether sparse input keeps its sparse storage in the output.
    /// When `false`, sparse results are densified.
    #[builder(default = "true")]
    pub sparse_output: bool,

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

impl Default for RandomOverSampler {
    fn default() -> Self {
        Self {
            strategy: SamplingStrategy::default(),
            seed: 0,
            smoothed_bootstrap: false,
            shrinkage: Shrinkage::default(),
            sparse_output: true,
            verbosity: Verbosity::default(),
            resolved: None,
            sample_indices: None,
        }
    }
}

impl RandomOverSampler {
    /// Fluent configuration builder.
    pub fn builder() -> RandomOverSamplerBuilder {
        RandomOverSamplerBuilder::default()
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
    /// Length equals the output row count; each entry is the original row
    /// the output row derives from. Overwritten by the next
    /// [`fit_resample`](Self::fit_resample) call.
    pub fn sample_indices(&self) -> Option<&[u32]> {
        self.sample_indices.as_deref()
    }

    /// Strategy resolved by the most recent fit, if any.
    pub fn resolved_strategy(&self) -> Option<&ResolvedStrategy> {
        self.resolved.as_ref()
    }

    /// Resample the dataset so targeted classes reach their resolved counts.
    ///
    /// Original rows are always retained; per class, the configured number
    /// of donor rows is drawn with replacement and appended (verbatim, or
    /// perturbed when `smoothed_bootstrap` is set). The assembled output is
    /// permuted once so class blocks are not trivially separable; features,
    /// target, weights, and provenance are permuted identically.
    ///
    /// All validation happens before any row is drawn: a failed call leaves
    /// the fitted state untouched.
    pub fn fit_resample(
        &mut self,
        features: &FeatureMatrix,
        target: &Target,
        weights: Option<&[f32]>,
    ) -> Result<Resampled, ResampleError> {
        validate_shapes(features, target, weights)?;
        let encoded = EncodedTarget::encode(target)?;
        let counts = class_counts(encoded.codes());
        let resolved = resolve(&self.strategy, &counts, SamplingMode::OverSampling)?;
        let shrinkage = if self.smoothed_bootstrap {
            Some(self.shrinkage.factors_for(&resolved)?)
        } else {
            None
        };

        let logger = ResampleLogger::new(self.verbosity);
        logger.class_counts("before", &counts);

        let mut rng = Xoshiro256PlusPlus::seed_from_u64(self.seed);
        let n = features.num_rows();

        let mut indices: Vec<u32> = (0..n as u32).collect();
        let mut codes: Vec<i64> = encoded.codes().to_vec();
        let mut out_weights = weights.map(|w| w.to_vec());
        let mut blocks: Vec<FeatureMatrix> = vec![features.clone()];

        for (class, n_add) in resolved.iter() {
            if n_add == 0 {
                continue;
            }
            let class_rows = rows_of_class(encoded.codes(), class);
            if class_rows.is_empty() {
                return Err(ResampleError::EmptyClass {
                    class,
                    available: 0,
                    requested: n_add,
                });
            }
            logger.class_draw(class, n_add, class_rows.len());

            let donors: Vec<u32> = (0..n_add)
                .map(|_| class_rows[rng.gen_range(0..class_rows.len())])
                .collect();

            let block = match &shrinkage {
                Some(factors) => smoothed_block(
                    features,
                    &class_rows,
                    &donors,
                    factors[&class],
                    &mut rng,
                ),
                None => features.take_rows(&donors),
            };
            blocks.push(block);

            if let (Some(out), Some(original)) = (out_weights.as_mut(), weights) {
                out.extend(donors.iter().map(|&d| original[d as usize]));
            }
            codes.extend(std::iter::repeat(class).take(n_add));
            indices.extend_from_slice(&donors);
        }

        let stacked = FeatureMatrix::stack(blocks);

        // One atomic permutation across all row-aligned arrays.
        let perm = permutation(stacked.num_rows(), &mut rng);
        let mut out_features = stacked.take_rows(&perm);
        let out_codes = gather(&codes, &perm);
        let out_weights = out_weights.map(|w| gather(&w, &perm));
        let out_indices = gather(&indices, &perm);

        if !self.sparse_output {
            out_features = out_features.densified();
        }

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

/// Build one perturbed block for a class.
///
/// Bandwidth follows Silverman's rule of thumb on the class subset:
/// `(4 / ((f + 2) * m)) ^ (1 / (f + 4))` with `f` features and `m` class
/// rows. The block is materialized densely (additive noise has no sparse
/// form), then re-encoded into the input's storage kind.
fn smoothed_block<R: Rng>(
    features: &FeatureMatrix,
    class_rows: &[u32],
    donors: &[u32],
    shrinkage: f64,
    rng: &mut R,
) -> FeatureMatrix {
    let f = features.num_features();
    let m = class_rows.len();

    let scale = features.column_scales(class_rows);
    let constant = (4.0 / ((f as f64 + 2.0) * m as f64)).powf(1.0 / (f as f64 + 4.0));
    let factors: Vec<f64> = scale
        .iter()
        .map(|&s| shrinkage * constant * s as f64)
        .collect();

    let mut data = vec![0.0f32; donors.len() * f];
    let mut row = vec![0.0f32; f];
    for (r, &donor) in donors.iter().enumerate() {
        features.copy_row(donor as usize, &mut row);
        let out = &mut data[r * f..(r + 1) * f];
        for (col, slot) in out.iter_mut().enumerate() {
            let noise: f64 = rng.sample(StandardNormal);
            *slot = row[col] + (noise * factors[col]) as f32;
        }
    }

    features.rebuild(DenseMatrix::from_vec(data, donors.len(), f))
}

//! Sampling-strategy resolution.
//!
//! A [`SamplingStrategy`] is a user-facing policy; resolution turns it,
//! together with the observed per-class counts, into a concrete
//! [`ResolvedStrategy`]: an immutable map from class code to the number of
//! rows to add (over-sampling) or keep (under-sampling). All validation
//! happens here, before any row is drawn.
//!
//! # Reference classes
//!
//! Named and ratio strategies resolve against a reference class count: the
//! majority count for over-sampling, the minority count for under-sampling.
//! When every class has the same count there is no strict majority or
//! minority and resolution fails rather than guessing.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::ResampleError;

// ============================================================================
// Strategy configuration
// ============================================================================

/// Per-class target policy for resampling.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SamplingStrategy {
    /// Equalize every class to the reference class count
    /// (majority for over-sampling, minority for under-sampling).
    Auto,
    /// Size every targeted class relative to the reference class count:
    /// target = round(ratio × reference count).
    Ratio(f64),
    /// Explicit per-class quantities, used as-is: rows to add for
    /// over-sampling, rows to keep for under-sampling.
    Counts(BTreeMap<i64, usize>),
}

impl Default for SamplingStrategy {
    fn default() -> Self {
        Self::Auto
    }
}

impl fmt::Display for SamplingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => write!(f, "Auto"),
            Self::Ratio(r) => write!(f, "Ratio({:.3})", r),
            Self::Counts(map) => write!(f, "Counts({} classes)", map.len()),
        }
    }
}

/// Which engine the strategy is resolved for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SamplingMode {
    /// Add rows until targeted classes reach their targets.
    OverSampling,
    /// Keep a subset of rows per targeted class.
    UnderSampling,
    /// Cleaning methods: only the targeted-class set is resolved; the
    /// method itself decides which rows to drop.
    CleanSampling,
}

// ============================================================================
// Resolved strategy
// ============================================================================

/// Immutable per-class quantities produced by [`resolve`].
///
/// Iteration order is ascending by class code, which fixes the order in
/// which the engine consumes random draws.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedStrategy {
    targets: BTreeMap<i64, usize>,
}

impl ResolvedStrategy {
    /// Iterate over (class, quantity) pairs in ascending class order.
    pub fn iter(&self) -> impl Iterator<Item = (i64, usize)> + '_ {
        self.targets.iter().map(|(&c, &n)| (c, n))
    }

    /// Quantity for a class, if targeted.
    pub fn get(&self, class: i64) -> Option<usize> {
        self.targets.get(&class).copied()
    }

    /// Whether a class is targeted.
    pub fn contains(&self, class: i64) -> bool {
        self.targets.contains_key(&class)
    }

    /// Number of targeted classes.
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Whether no class is targeted.
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// The targeted class codes, ascending.
    pub fn classes(&self) -> impl Iterator<Item = i64> + '_ {
        self.targets.keys().copied()
    }
}

/// Observed per-class row counts, ascending by class code.
pub fn class_counts(codes: &[i64]) -> BTreeMap<i64, usize> {
    let mut counts = BTreeMap::new();
    for &code in codes {
        *counts.entry(code).or_insert(0usize) += 1;
    }
    counts
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve a strategy against observed class counts for the given mode.
///
/// # Errors
///
/// Returns [`ResampleError::InvalidSamplingStrategy`] when a named class is
/// absent from the data, a computed delta would be negative, the ratio is
/// out of range, or the reference class cannot be determined (all classes
/// tied).
pub fn resolve(
    strategy: &SamplingStrategy,
    counts: &BTreeMap<i64, usize>,
    mode: SamplingMode,
) -> Result<ResolvedStrategy, ResampleError> {
    if counts.is_empty() {
        return Err(ResampleError::InvalidSamplingStrategy(
            "no classes observed in the target".into(),
        ));
    }

    let majority = counts.values().copied().max().unwrap_or(0);
    let minority = counts.values().copied().min().unwrap_or(0);

    let targets = match (mode, strategy) {
        (SamplingMode::OverSampling, SamplingStrategy::Auto) => {
            check_strict_spread(majority, minority)?;
            counts
                .iter()
                .filter(|(_, &n)| n < majority)
                .map(|(&c, &n)| (c, majority - n))
                .collect()
        }
        (SamplingMode::OverSampling, SamplingStrategy::Ratio(r)) => {
            check_ratio(*r)?;
            if *r > 1.0 {
                return Err(ResampleError::InvalidSamplingStrategy(format!(
                    "over-sampling ratio must be in (0, 1], got {}",
                    r
                )));
            }
            check_strict_spread(majority, minority)?;
            let target = (r * majority as f64).round() as usize;
            let mut resolved = BTreeMap::new();
            for (&class, &n) in counts.iter().filter(|(_, &n)| n < majority) {
                if n > target {
                    return Err(ResampleError::InvalidSamplingStrategy(format!(
                        "ratio {} puts class {} at {} rows, below its observed {}",
                        r, class, target, n
                    )));
                }
                resolved.insert(class, target - n);
            }
            resolved
        }
        (SamplingMode::OverSampling, SamplingStrategy::Counts(map)) => {
            check_classes_exist(map, counts)?;
            map.iter().map(|(&c, &n)| (c, n)).collect()
        }
        (SamplingMode::UnderSampling, SamplingStrategy::Auto) => {
            check_strict_spread(majority, minority)?;
            counts
                .iter()
                .filter(|(_, &n)| n > minority)
                .map(|(&c, _)| (c, minority))
                .collect()
        }
        (SamplingMode::UnderSampling, SamplingStrategy::Ratio(r)) => {
            check_ratio(*r)?;
            check_strict_spread(majority, minority)?;
            let target = (r * minority as f64).round() as usize;
            let mut resolved = BTreeMap::new();
            for (&class, &n) in counts.iter().filter(|(_, &n)| n > minority) {
                if target > n {
                    return Err(ResampleError::InvalidSamplingStrategy(format!(
                        "ratio {} puts class {} at {} rows, above its observed {}",
                        r, class, target, n
                    )));
                }
                resolved.insert(class, target);
            }
            resolved
        }
        (SamplingMode::UnderSampling, SamplingStrategy::Counts(map)) => {
            check_classes_exist(map, counts)?;
            map.iter().map(|(&c, &n)| (c, n)).collect()
        }
        (SamplingMode::CleanSampling, SamplingStrategy::Auto) => {
            check_strict_spread(majority, minority)?;
            counts
                .iter()
                .filter(|(_, &n)| n > minority)
                .map(|(&c, &n)| (c, n))
                .collect()
        }
        (SamplingMode::CleanSampling, _) => {
            return Err(ResampleError::InvalidSamplingStrategy(
                "clean-sampling accepts only the equalize strategy, not ratios or explicit counts"
                    .into(),
            ));
        }
    };

    Ok(ResolvedStrategy { targets })
}

/// Named and ratio strategies need a strict majority/minority to resolve
/// against; all classes tied means there is none.
fn check_strict_spread(majority: usize, minority: usize) -> Result<(), ResampleError> {
    if majority == minority {
        return Err(ResampleError::InvalidSamplingStrategy(format!(
            "all classes have {} rows; no reference class to resolve against",
            majority
        )));
    }
    Ok(())
}

fn check_ratio(r: f64) -> Result<(), ResampleError> {
    if !r.is_finite() || r <= 0.0 {
        return Err(ResampleError::InvalidSamplingStrategy(format!(
            "ratio must be a positive finite number, got {}",
            r
        )));
    }
    Ok(())
}

fn check_classes_exist(
    map: &BTreeMap<i64, usize>,
    counts: &BTreeMap<i64, usize>,
) -> Result<(), ResampleError> {
    for &class in map.keys() {
        if !counts.contains_key(&class) {
            return Err(ResampleError::InvalidSamplingStrategy(format!(
                "class {} is not present in the target",
                class
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(pairs: &[(i64, usize)]) -> BTreeMap<i64, usize> {
        pairs.iter().copied().collect()
    }

    #[test]
    fn class_counts_ascending() {
        let c = class_counts(&[2, 0, 2, 1, 2]);
        let pairs: Vec<_> = c.into_iter().collect();
        assert_eq!(pairs, vec![(0, 1), (1, 1), (2, 3)]);
    }

    #[test]
    fn auto_over_equalizes_to_majority() {
        let resolved = resolve(
            &SamplingStrategy::Auto,
            &counts(&[(0, 100), (1, 30), (2, 60)]),
            SamplingMode::OverSampling,
        )
        .unwrap();
        assert_eq!(resolved.get(1), Some(70));
        assert_eq!(resolved.get(2), Some(40));
        assert_eq!(resolved.get(0), None);
    }

    #[test]
    fn auto_under_equalizes_to_minority() {
        let resolved = resolve(
            &SamplingStrategy::Auto,
            &counts(&[(0, 100), (1, 30), (2, 60)]),
            SamplingMode::UnderSampling,
        )
        .unwrap();
        assert_eq!(resolved.get(0), Some(30));
        assert_eq!(resolved.get(2), Some(30));
        assert_eq!(resolved.get(1), None);
    }

    #[test]
    fn auto_all_tied_fails() {
        for mode in [SamplingMode::OverSampling, SamplingMode::UnderSampling] {
            let err = resolve(&SamplingStrategy::Auto, &counts(&[(0, 50), (1, 50)]), mode)
                .unwrap_err();
            assert!(matches!(err, ResampleError::InvalidSamplingStrategy(_)));
        }
    }

    #[test]
    fn ratio_over_rounds_to_target() {
        // target = round(0.5 * 100) = 50; class 1 gains 20.
        let resolved = resolve(
            &SamplingStrategy::Ratio(0.5),
            &counts(&[(0, 100), (1, 30)]),
            SamplingMode::OverSampling,
        )
        .unwrap();
        assert_eq!(resolved.get(1), Some(20));
    }

    #[test]
    fn ratio_over_negative_delta_fails() {
        // target = round(0.2 * 100) = 20 < observed 30.
        let err = resolve(
            &SamplingStrategy::Ratio(0.2),
            &counts(&[(0, 100), (1, 30)]),
            SamplingMode::OverSampling,
        )
        .unwrap_err();
        assert!(matches!(err, ResampleError::InvalidSamplingStrategy(_)));
    }

    #[test]
    fn ratio_over_above_one_fails() {
        let err = resolve(
            &SamplingStrategy::Ratio(1.5),
            &counts(&[(0, 100), (1, 30)]),
            SamplingMode::OverSampling,
        )
        .unwrap_err();
        assert!(matches!(err, ResampleError::InvalidSamplingStrategy(_)));
    }

    #[test]
    fn ratio_under_keeps_multiple_of_minority() {
        // target = round(2.0 * 30) = 60 rows kept for the majority.
        let resolved = resolve(
            &SamplingStrategy::Ratio(2.0),
            &counts(&[(0, 100), (1, 30)]),
            SamplingMode::UnderSampling,
        )
        .unwrap();
        assert_eq!(resolved.get(0), Some(60));
        assert_eq!(resolved.get(1), None);
    }

    #[test]
    fn ratio_under_would_add_rows_fails() {
        // target = round(4.0 * 30) = 120 > observed 100.
        let err = resolve(
            &SamplingStrategy::Ratio(4.0),
            &counts(&[(0, 100), (1, 30)]),
            SamplingMode::UnderSampling,
        )
        .unwrap_err();
        assert!(matches!(err, ResampleError::InvalidSamplingStrategy(_)));
    }

    #[test]
    fn invalid_ratio_values_fail() {
        for r in [0.0, -0.5, f64::NAN, f64::INFINITY] {
            let err = resolve(
                &SamplingStrategy::Ratio(r),
                &counts(&[(0, 10), (1, 5)]),
                SamplingMode::UnderSampling,
            )
            .unwrap_err();
            assert!(matches!(err, ResampleError::InvalidSamplingStrategy(_)));
        }
    }

    #[test]
    fn explicit_counts_used_as_is() {
        let resolved = resolve(
            &SamplingStrategy::Counts(counts(&[(1, 70)])),
            &counts(&[(0, 100), (1, 30)]),
            SamplingMode::OverSampling,
        )
        .unwrap();
        assert_eq!(resolved.get(1), Some(70));
        assert_eq!(resolved.len(), 1);
    }

    #[test]
    fn explicit_counts_absent_class_fails() {
        let err = resolve(
            &SamplingStrategy::Counts(counts(&[(9, 10)])),
            &counts(&[(0, 100), (1, 30)]),
            SamplingMode::OverSampling,
        )
        .unwrap_err();
        assert!(matches!(err, ResampleError::InvalidSamplingStrategy(_)));
    }

    #[test]
    fn clean_sampling_targets_non_minority() {
        let resolved = resolve(
            &SamplingStrategy::Auto,
            &counts(&[(0, 100), (1, 30), (2, 60)]),
            SamplingMode::CleanSampling,
        )
        .unwrap();
        assert_eq!(resolved.get(0), Some(100));
        assert_eq!(resolved.get(2), Some(60));
        assert_eq!(resolved.get(1), None);
    }

    #[test]
    fn clean_sampling_rejects_ratio_and_counts() {
        let observed = counts(&[(0, 100), (1, 30)]);
        for strategy in [
            SamplingStrategy::Ratio(0.5),
            SamplingStrategy::Counts(counts(&[(1, 10)])),
        ] {
            let err = resolve(&strategy, &observed, SamplingMode::CleanSampling).unwrap_err();
            assert!(matches!(err, ResampleError::InvalidSamplingStrategy(_)));
        }
    }

    #[test]
    fn empty_counts_fail() {
        let err = resolve(
            &SamplingStrategy::Auto,
            &BTreeMap::new(),
            SamplingMode::OverSampling,
        )
        .unwrap_err();
        assert!(matches!(err, ResampleError::InvalidSamplingStrategy(_)));
    }

    #[test]
    fn resolved_iterates_ascending() {
        let resolved = resolve(
            &SamplingStrategy::Auto,
            &counts(&[(5, 10), (-3, 2), (1, 4)]),
            SamplingMode::OverSampling,
        )
        .unwrap();
        let classes: Vec<i64> = resolved.classes().collect();
        assert_eq!(classes, vec![-3, 1]);
    }
}

//! Target-type normalization.
//!
//! Resampling math wants exactly one integer class code per row. Scalar
//! label vectors already have that shape; one-hot indicator matrices
//! (multilabel treated as one-vs-all) are collapsed to the column index of
//! their single `1.0` and expanded back after resampling. The encoding is
//! bijective: [`EncodedTarget::decode`] restores the representation the
//! caller supplied.

use crate::data::DenseMatrix;
use crate::error::ResampleError;

/// Classification shape of a target array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    /// At most two distinct scalar classes.
    Binary,
    /// Three or more distinct scalar classes.
    Multiclass,
    /// One-hot indicator rows, collapsed to one-vs-all codes.
    MultilabelIndicator,
}

/// A target array in one of the supported representations.
#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    /// One scalar class code per row.
    Labels(Vec<i64>),
    /// One-hot indicator matrix: exactly one `1.0` per row.
    Indicator(DenseMatrix),
}

impl Target {
    /// Number of rows.
    pub fn num_rows(&self) -> usize {
        match self {
            Target::Labels(labels) => labels.len(),
            Target::Indicator(m) => m.num_rows(),
        }
    }

    /// Gather the given rows (repeats allowed), preserving representation.
    pub fn take_rows(&self, indices: &[u32]) -> Self {
        match self {
            Target::Labels(labels) => {
                Target::Labels(indices.iter().map(|&i| labels[i as usize]).collect())
            }
            Target::Indicator(m) => Target::Indicator(m.take_rows(indices)),
        }
    }
}

/// A normalized target: one `i64` code per row plus the information needed
/// to reverse the encoding.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedTarget {
    codes: Vec<i64>,
    kind: TargetKind,
    /// Indicator column count; distinct-class count for scalar labels.
    n_classes: usize,
}

impl EncodedTarget {
    /// Classify and normalize a target array.
    ///
    /// # Errors
    ///
    /// Returns [`ResampleError::InvalidTargetType`] for empty targets, for
    /// indicator entries outside `{0.0, 1.0}`, and for indicator rows that
    /// do not contain exactly one `1.0` (multilabel beyond one-vs-all is
    /// not supported).
    pub fn encode(target: &Target) -> Result<Self, ResampleError> {
        match target {
            Target::Labels(labels) => {
                if labels.is_empty() {
                    return Err(ResampleError::InvalidTargetType(
                        "target has no rows".into(),
                    ));
                }
                let mut distinct: Vec<i64> = labels.clone();
                distinct.sort_unstable();
                distinct.dedup();
                let kind = if distinct.len() <= 2 {
                    TargetKind::Binary
                } else {
                    TargetKind::Multiclass
                };
                Ok(Self {
                    codes: labels.clone(),
                    kind,
                    n_classes: distinct.len(),
                })
            }
            Target::Indicator(m) => {
                if m.num_rows() == 0 || m.num_features() == 0 {
                    return Err(ResampleError::InvalidTargetType(
                        "indicator target has no rows or no columns".into(),
                    ));
                }
                let mut codes = Vec::with_capacity(m.num_rows());
                for row in 0..m.num_rows() {
                    let mut hot: Option<usize> = None;
                    for (col, &v) in m.row_slice(row).iter().enumerate() {
                        if v == 1.0 {
                            if hot.is_some() {
                                return Err(ResampleError::InvalidTargetType(format!(
                                    "indicator row {} has more than one active class",
                                    row
                                )));
                            }
                            hot = Some(col);
                        } else if v != 0.0 {
                            return Err(ResampleError::InvalidTargetType(format!(
                                "indicator entry ({}, {}) is {}, expected 0 or 1",
                                row, col, v
                            )));
                        }
                    }
                    match hot {
                        Some(col) => codes.push(col as i64),
                        None => {
                            return Err(ResampleError::InvalidTargetType(format!(
                                "indicator row {} has no active class",
                                row
                            )))
                        }
                    }
                }
                Ok(Self {
                    codes,
                    kind: TargetKind::MultilabelIndicator,
                    n_classes: m.num_features(),
                })
            }
        }
    }

    /// The normalized class codes, one per row.
    #[inline]
    pub fn codes(&self) -> &[i64] {
        &self.codes
    }

    /// Classification shape of the original target.
    #[inline]
    pub fn kind(&self) -> TargetKind {
        self.kind
    }

    /// Number of distinct classes (indicator columns for indicator input).
    #[inline]
    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    /// Reverse the encoding for a (possibly resampled) code array.
    ///
    /// Scalar input decodes to scalar labels; indicator input decodes to a
    /// one-hot matrix with the column count seen at encode time.
    pub fn decode(&self, codes: &[i64]) -> Target {
        match self.kind {
            TargetKind::Binary | TargetKind::Multiclass => Target::Labels(codes.to_vec()),
            TargetKind::MultilabelIndicator => {
                let mut data = vec![0.0f32; codes.len() * self.n_classes];
                for (row, &code) in codes.iter().enumerate() {
                    debug_assert!((code as usize) < self.n_classes);
                    data[row * self.n_classes + code as usize] = 1.0;
                }
                Target::Indicator(DenseMatrix::from_vec(data, codes.len(), self.n_classes))
            }
        }
    }
}

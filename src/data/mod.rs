//! Feature-matrix storage for resampling.
//!
//! # Overview
//!
//! Two storage kinds are supported: [`DenseMatrix`] (row-major dense) and
//! [`CsrMatrix`] (compressed sparse row). [`FeatureMatrix`] wraps both
//! behind a storage tag and implements the small capability surface the
//! resampling engine needs — gather rows, stack row blocks, per-column
//! scale over a row subset, densify, and rebuild a dense block in the
//! input's storage kind — once per kind. The engine itself never inspects
//! storage.
//!
//! # Storage preservation
//!
//! Every operation on [`FeatureMatrix`] returns the same storage kind it
//! was given, unless the caller asks for densification explicitly.

mod dense;
mod sparse;

pub use dense::DenseMatrix;
pub use sparse::CsrMatrix;

/// Storage kind tag for a [`FeatureMatrix`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    /// Row-major dense storage.
    Dense,
    /// Compressed sparse row storage.
    Sparse,
}

/// Feature matrix with dense or sparse storage.
///
/// The variant chosen by the caller is preserved through resampling:
/// a sparse input yields a sparse output of the same format unless
/// densification is requested.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureMatrix {
    /// Row-major dense storage.
    Dense(DenseMatrix),
    /// Compressed sparse row storage.
    Sparse(CsrMatrix),
}

impl FeatureMatrix {
    /// Storage kind of this matrix.
    #[inline]
    pub fn kind(&self) -> StorageKind {
        match self {
            FeatureMatrix::Dense(_) => StorageKind::Dense,
            FeatureMatrix::Sparse(_) => StorageKind::Sparse,
        }
    }

    /// Whether this matrix uses sparse storage.
    #[inline]
    pub fn is_sparse(&self) -> bool {
        matches!(self, FeatureMatrix::Sparse(_))
    }

    /// Number of rows.
    #[inline]
    pub fn num_rows(&self) -> usize {
        match self {
            FeatureMatrix::Dense(m) => m.num_rows(),
            FeatureMatrix::Sparse(m) => m.num_rows(),
        }
    }

    /// Number of features (columns).
    #[inline]
    pub fn num_features(&self) -> usize {
        match self {
            FeatureMatrix::Dense(m) => m.num_features(),
            FeatureMatrix::Sparse(m) => m.num_features(),
        }
    }

    /// Get element at (row, col), or `None` if out of bounds.
    ///
    /// Unstored sparse entries read as `0.0`.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Option<f32> {
        match self {
            FeatureMatrix::Dense(m) => m.get(row, col),
            FeatureMatrix::Sparse(m) => m.get(row, col),
        }
    }

    /// Copy row `i` into a dense buffer.
    ///
    /// # Panics
    ///
    /// Panics if `buf.len() < num_features()` or `i >= num_rows()`.
    pub fn copy_row(&self, i: usize, buf: &mut [f32]) {
        match self {
            FeatureMatrix::Dense(m) => m.copy_row(i, buf),
            FeatureMatrix::Sparse(m) => m.copy_row(i, buf),
        }
    }

    /// Gather the given rows (repeats allowed), preserving storage kind.
    pub fn take_rows(&self, indices: &[u32]) -> Self {
        match self {
            FeatureMatrix::Dense(m) => FeatureMatrix::Dense(m.take_rows(indices)),
            FeatureMatrix::Sparse(m) => FeatureMatrix::Sparse(m.take_rows(indices)),
        }
    }

    /// Stack matrices vertically, in order.
    ///
    /// # Panics
    ///
    /// Panics if `blocks` is empty or the blocks mix storage kinds.
    pub fn stack(blocks: Vec<Self>) -> Self {
        assert!(!blocks.is_empty(), "Cannot stack zero blocks");
        match blocks[0].kind() {
            StorageKind::Dense => {
                let dense: Vec<DenseMatrix> = blocks
                    .into_iter()
                    .map(|b| match b {
                        FeatureMatrix::Dense(m) => m,
                        FeatureMatrix::Sparse(_) => panic!("Cannot stack mixed storage kinds"),
                    })
                    .collect();
                FeatureMatrix::Dense(DenseMatrix::vstack(&dense))
            }
            StorageKind::Sparse => {
                let sparse: Vec<CsrMatrix> = blocks
                    .into_iter()
                    .map(|b| match b {
                        FeatureMatrix::Sparse(m) => m,
                        FeatureMatrix::Dense(_) => panic!("Cannot stack mixed storage kinds"),
                    })
                    .collect();
                FeatureMatrix::Sparse(CsrMatrix::vstack(&sparse))
            }
        }
    }

    /// Per-column population standard deviation over a subset of rows.
    ///
    /// Sparse storage computes this without densifying.
    pub fn column_scales(&self, rows: &[u32]) -> Vec<f32> {
        match self {
            FeatureMatrix::Dense(m) => m.column_std(rows),
            FeatureMatrix::Sparse(m) => m.column_std(rows),
        }
    }

    /// Re-encode a dense row block into this matrix's storage kind.
    ///
    /// Used when a block had to be materialized densely (e.g. additive
    /// perturbation) but the assembled output must match the input storage.
    pub fn rebuild(&self, block: DenseMatrix) -> Self {
        match self {
            FeatureMatrix::Dense(_) => FeatureMatrix::Dense(block),
            FeatureMatrix::Sparse(_) => FeatureMatrix::Sparse(CsrMatrix::from_dense(&block)),
        }
    }

    /// Expand into a dense matrix, regardless of storage kind.
    pub fn to_dense(&self) -> DenseMatrix {
        match self {
            FeatureMatrix::Dense(m) => m.clone(),
            FeatureMatrix::Sparse(m) => m.to_dense(),
        }
    }

    /// Convert into the dense variant, consuming self.
    ///
    /// A no-op for matrices that are already dense.
    pub fn densified(self) -> Self {
        match self {
            FeatureMatrix::Dense(m) => FeatureMatrix::Dense(m),
            FeatureMatrix::Sparse(m) => FeatureMatrix::Dense(m.to_dense()),
        }
    }
}

impl From<DenseMatrix> for FeatureMatrix {
    fn from(m: DenseMatrix) -> Self {
        FeatureMatrix::Dense(m)
    }
}

impl From<CsrMatrix> for FeatureMatrix {
    fn from(m: CsrMatrix) -> Self {
        FeatureMatrix::Sparse(m)
    }
}

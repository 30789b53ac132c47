//! Dense row-major feature matrix.
//!
//! Resampling only ever gathers and stacks whole rows, so a single owned
//! row-major form is sufficient. Missing values are represented as
//! `f32::NAN` and travel with their row like any other value.

/// Dense matrix with row-major storage.
///
/// Rows are contiguous, which makes row gathering ([`take_rows`]) and
/// vertical stacking ([`vstack`]) plain memcpy loops.
///
/// # Example
///
/// ```
/// use rebalance_rs::data::DenseMatrix;
///
/// let m = DenseMatrix::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 2, 3);
/// assert_eq!(m.row_slice(0), &[1.0, 2.0, 3.0]);
/// assert_eq!(m.row_slice(1), &[4.0, 5.0, 6.0]);
/// ```
///
/// [`take_rows`]: DenseMatrix::take_rows
/// [`vstack`]: DenseMatrix::vstack
#[derive(Debug, Clone, PartialEq)]
pub struct DenseMatrix {
    data: Box<[f32]>,
    num_rows: usize,
    num_cols: usize,
}

impl DenseMatrix {
    /// Create a dense matrix from a row-major `Vec`, taking ownership.
    ///
    /// # Panics
    ///
    /// Panics if `data.len() != num_rows * num_cols`.
    pub fn from_vec(data: Vec<f32>, num_rows: usize, num_cols: usize) -> Self {
        assert_eq!(
            data.len(),
            num_rows * num_cols,
            "Data length {} does not match dimensions {}x{}",
            data.len(),
            num_rows,
            num_cols
        );
        Self {
            data: data.into_boxed_slice(),
            num_rows,
            num_cols,
        }
    }

    /// Number of rows.
    #[inline]
    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    /// Number of features (columns).
    #[inline]
    pub fn num_features(&self) -> usize {
        self.num_cols
    }

    /// Get the underlying data as a row-major slice.
    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Get element at (row, col), or `None` if out of bounds.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Option<f32> {
        if row >= self.num_rows || col >= self.num_cols {
            return None;
        }
        Some(self.data[row * self.num_cols + col])
    }

    /// Get a row as a contiguous slice. O(1).
    ///
    /// # Panics
    ///
    /// Panics if `row >= num_rows`.
    #[inline]
    pub fn row_slice(&self, row: usize) -> &[f32] {
        assert!(row < self.num_rows, "Row index {} out of bounds", row);
        let start = row * self.num_cols;
        &self.data[start..start + self.num_cols]
    }

    /// Copy row `i` into a dense buffer.
    ///
    /// # Panics
    ///
    /// Panics if `buf.len() < num_features()` or `i >= num_rows()`.
    pub fn copy_row(&self, i: usize, buf: &mut [f32]) {
        assert!(
            buf.len() >= self.num_cols,
            "Buffer too small: {} < {}",
            buf.len(),
            self.num_cols
        );
        buf[..self.num_cols].copy_from_slice(self.row_slice(i));
    }

    /// Gather the given rows (repeats allowed) into a new matrix.
    ///
    /// # Panics
    ///
    /// Panics if any index is out of bounds.
    pub fn take_rows(&self, indices: &[u32]) -> Self {
        let mut data = Vec::with_capacity(indices.len() * self.num_cols);
        for &i in indices {
            data.extend_from_slice(self.row_slice(i as usize));
        }
        Self {
            data: data.into_boxed_slice(),
            num_rows: indices.len(),
            num_cols: self.num_cols,
        }
    }

    /// Stack matrices vertically, in order.
    ///
    /// # Panics
    ///
    /// Panics if `blocks` is empty or the column counts disagree.
    pub fn vstack(blocks: &[Self]) -> Self {
        assert!(!blocks.is_empty(), "Cannot stack zero blocks");
        let num_cols = blocks[0].num_cols;
        let num_rows: usize = blocks.iter().map(|b| b.num_rows).sum();

        let mut data = Vec::with_capacity(num_rows * num_cols);
        for block in blocks {
            assert_eq!(
                block.num_cols, num_cols,
                "Column count mismatch: {} != {}",
                block.num_cols, num_cols
            );
            data.extend_from_slice(&block.data);
        }
        Self {
            data: data.into_boxed_slice(),
            num_rows,
            num_cols,
        }
    }

    /// Per-column population standard deviation over a subset of rows.
    ///
    /// Returns one value per feature. An empty subset yields all zeros.
    pub fn column_std(&self, rows: &[u32]) -> Vec<f32> {
        let n = rows.len();
        if n == 0 {
            return vec![0.0; self.num_cols];
        }

        let mut sum = vec![0.0f64; self.num_cols];
        let mut sum_sq = vec![0.0f64; self.num_cols];
        for &r in rows {
            for (col, &v) in self.row_slice(r as usize).iter().enumerate() {
                let v = v as f64;
                sum[col] += v;
                sum_sq[col] += v * v;
            }
        }

        sum.iter()
            .zip(&sum_sq)
            .map(|(&s, &sq)| {
                let mean = s / n as f64;
                let var = (sq / n as f64 - mean * mean).max(0.0);
                var.sqrt() as f32
            })
            .collect()
    }
}

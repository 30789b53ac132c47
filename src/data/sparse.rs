//! Compressed Sparse Row (CSR) matrix for row-wise access.
//!
//! CSR format is optimal for resampling, where every operation gathers or
//! stacks whole rows: a row is a contiguous slice of stored values, so
//! duplication and filtering never touch the rest of the matrix.

use super::dense::DenseMatrix;

/// Compressed Sparse Row matrix.
///
/// # Structure
///
/// - `values`: stored values, row by row
/// - `col_indices`: column index for each value
/// - `row_ptrs`: starting index in values/col_indices for each row
///
/// For row `i`, the values are `values[row_ptrs[i]..row_ptrs[i+1]]` with
/// corresponding columns `col_indices[row_ptrs[i]..row_ptrs[i+1]]`.
///
/// # Example
///
/// ```
/// use rebalance_rs::data::{CsrMatrix, DenseMatrix};
///
/// let dense = DenseMatrix::from_vec(vec![
///     1.0, 0.0, 2.0,
///     0.0, 3.0, 0.0,
/// ], 2, 3);
///
/// let csr = CsrMatrix::from_dense(&dense);
/// assert_eq!(csr.nnz(), 3);
/// assert_eq!(csr.row(0), (&[0u32, 2][..], &[1.0f32, 2.0][..]));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CsrMatrix {
    /// Stored values, row by row.
    values: Box<[f32]>,
    /// Column index for each value.
    col_indices: Box<[u32]>,
    /// Row pointers: row_ptrs[i] is the start index for row i.
    /// Length is num_rows + 1, with row_ptrs[num_rows] = nnz.
    row_ptrs: Box<[u32]>,
    /// Number of rows.
    num_rows: usize,
    /// Number of columns (features).
    num_cols: usize,
}

impl CsrMatrix {
    /// Create a CSR matrix from a dense matrix.
    ///
    /// Exact zeros are not stored. NaN values ARE stored (they are not
    /// equal to zero).
    pub fn from_dense(dense: &DenseMatrix) -> Self {
        let num_rows = dense.num_rows();
        let num_cols = dense.num_features();

        let mut values = Vec::new();
        let mut col_indices = Vec::new();
        let mut row_ptrs = Vec::with_capacity(num_rows + 1);
        row_ptrs.push(0u32);

        for row in 0..num_rows {
            for (col, &v) in dense.row_slice(row).iter().enumerate() {
                if v != 0.0 {
                    values.push(v);
                    col_indices.push(col as u32);
                }
            }
            row_ptrs.push(values.len() as u32);
        }

        Self {
            values: values.into_boxed_slice(),
            col_indices: col_indices.into_boxed_slice(),
            row_ptrs: row_ptrs.into_boxed_slice(),
            num_rows,
            num_cols,
        }
    }

    /// Number of rows.
    #[inline]
    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    /// Number of columns (features).
    #[inline]
    pub fn num_features(&self) -> usize {
        self.num_cols
    }

    /// Number of stored (non-zero) elements.
    #[inline]
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Density: ratio of stored elements to total elements.
    pub fn density(&self) -> f64 {
        let total = self.num_rows * self.num_cols;
        if total == 0 {
            return 1.0;
        }
        self.nnz() as f64 / total as f64
    }

    /// Get the (column indices, values) pair for a row. O(1).
    ///
    /// # Panics
    ///
    /// Panics if `row >= num_rows`.
    #[inline]
    pub fn row(&self, row: usize) -> (&[u32], &[f32]) {
        assert!(row < self.num_rows, "Row index {} out of bounds", row);
        let start = self.row_ptrs[row] as usize;
        let end = self.row_ptrs[row + 1] as usize;
        (&self.col_indices[start..end], &self.values[start..end])
    }

    /// Get element at (row, col), or `None` if out of bounds.
    ///
    /// Unstored in-bounds entries read as `0.0`.
    pub fn get(&self, row: usize, col: usize) -> Option<f32> {
        if row >= self.num_rows || col >= self.num_cols {
            return None;
        }
        let (cols, vals) = self.row(row);
        match cols.binary_search(&(col as u32)) {
            Ok(pos) => Some(vals[pos]),
            Err(_) => Some(0.0),
        }
    }

    /// Copy row `i` into a dense buffer, filling unstored positions with 0.0.
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
        buf[..self.num_cols].fill(0.0);
        let (cols, vals) = self.row(i);
        for (&c, &v) in cols.iter().zip(vals) {
            buf[c as usize] = v;
        }
    }

    /// Expand into a dense row-major matrix.
    pub fn to_dense(&self) -> DenseMatrix {
        let mut data = vec![0.0f32; self.num_rows * self.num_cols];
        for row in 0..self.num_rows {
            let (cols, vals) = self.row(row);
            let base = row * self.num_cols;
            for (&c, &v) in cols.iter().zip(vals) {
                data[base + c as usize] = v;
            }
        }
        DenseMatrix::from_vec(data, self.num_rows, self.num_cols)
    }

    /// Gather the given rows (repeats allowed) into a new matrix.
    ///
    /// Stays sparse: only the selected rows' stored entries are copied.
    ///
    /// # Panics
    ///
    /// Panics if any index is out of bounds.
    pub fn take_rows(&self, indices: &[u32]) -> Self {
        let nnz: usize = indices
            .iter()
            .map(|&i| {
                let i = i as usize;
                (self.row_ptrs[i + 1] - self.row_ptrs[i]) as usize
            })
            .sum();

        let mut values = Vec::with_capacity(nnz);
        let mut col_indices = Vec::with_capacity(nnz);
        let mut row_ptrs = Vec::with_capacity(indices.len() + 1);
        row_ptrs.push(0u32);

        for &i in indices {
            let (cols, vals) = self.row(i as usize);
            values.extend_from_slice(vals);
            col_indices.extend_from_slice(cols);
            row_ptrs.push(values.len() as u32);
        }

        Self {
            values: values.into_boxed_slice(),
            col_indices: col_indices.into_boxed_slice(),
            row_ptrs: row_ptrs.into_boxed_slice(),
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
        let nnz: usize = blocks.iter().map(|b| b.nnz()).sum();

        let mut values = Vec::with_capacity(nnz);
        let mut col_indices = Vec::with_capacity(nnz);
        let mut row_ptrs = Vec::with_capacity(num_rows + 1);
        row_ptrs.push(0u32);

        for block in blocks {
            assert_eq!(
                block.num_cols, num_cols,
                "Column count mismatch: {} != {}",
                block.num_cols, num_cols
            );
            let offset = values.len() as u32;
            values.extend_from_slice(&block.values);
            col_indices.extend_from_slice(&block.col_indices);
            row_ptrs.extend(block.row_ptrs[1..].iter().map(|&p| p + offset));
        }

        Self {
            values: values.into_boxed_slice(),
            col_indices: col_indices.into_boxed_slice(),
            row_ptrs: row_ptrs.into_boxed_slice(),
            num_rows,
            num_cols,
        }
    }

    /// Per-column population standard deviation over a subset of rows.
    ///
    /// Computed from running sum and sum-of-squares over the stored entries
    /// of the selected rows; implicit zeros contribute only to the row
    /// count, so the matrix is never densified.
    pub fn column_std(&self, rows: &[u32]) -> Vec<f32> {
        let n = rows.len();
        if n == 0 {
            return vec![0.0; self.num_cols];
        }

        let mut sum = vec![0.0f64; self.num_cols];
        let mut sum_sq = vec![0.0f64; self.num_cols];
        for &r in rows {
            let (cols, vals) = self.row(r as usize);
            for (&c, &v) in cols.iter().zip(vals) {
                let v = v as f64;
                sum[c as usize] += v;
                sum_sq[c as usize] += v * v;
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

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sample() -> CsrMatrix {
        CsrMatrix::from_dense(&DenseMatrix::from_vec(
            vec![
                1.0, 0.0, 2.0, // row 0
                0.0, 3.0, 0.0, // row 1
                4.0, 0.0, 5.0, // row 2
            ],
            3,
            3,
        ))
    }

    #[test]
    fn from_dense_basic() {
        let csr = sample();
        assert_eq!(csr.num_rows(), 3);
        assert_eq!(csr.num_features(), 3);
        assert_eq!(csr.nnz(), 5);
    }

    #[test]
    fn row_access() {
        let csr = sample();
        assert_eq!(csr.row(0), (&[0u32, 2][..], &[1.0f32, 2.0][..]));
        assert_eq!(csr.row(1), (&[1u32][..], &[3.0f32][..]));
    }

    #[test]
    fn get_reads_implicit_zeros() {
        let csr = sample();
        assert_eq!(csr.get(0, 1), Some(0.0));
        assert_eq!(csr.get(0, 2), Some(2.0));
        assert_eq!(csr.get(3, 0), None);
    }

    #[test]
    fn handles_nan() {
        let dense = DenseMatrix::from_vec(vec![1.0, f32::NAN], 1, 2);
        let csr = CsrMatrix::from_dense(&dense);
        // NaN is stored, it is not an implicit zero.
        assert_eq!(csr.nnz(), 2);
        assert!(csr.get(0, 1).unwrap().is_nan());
    }

    #[test]
    fn dense_roundtrip() {
        let dense = DenseMatrix::from_vec(vec![1.0, 0.0, 0.0, 3.0, 0.0, 5.0], 2, 3);
        let back = CsrMatrix::from_dense(&dense).to_dense();
        assert_eq!(back.as_slice(), dense.as_slice());
    }

    #[test]
    fn take_rows_with_repeats_stays_sparse() {
        let csr = sample();
        let taken = csr.take_rows(&[1, 1, 0]);
        assert_eq!(taken.num_rows(), 3);
        assert_eq!(taken.nnz(), 4);
        assert_eq!(taken.row(0), (&[1u32][..], &[3.0f32][..]));
        assert_eq!(taken.row(2), (&[0u32, 2][..], &[1.0f32, 2.0][..]));
    }

    #[test]
    fn vstack_offsets_row_ptrs() {
        let csr = sample();
        let stacked = CsrMatrix::vstack(&[csr.clone(), csr.take_rows(&[2])]);
        assert_eq!(stacked.num_rows(), 4);
        assert_eq!(stacked.nnz(), 7);
        assert_eq!(stacked.row(3), (&[0u32, 2][..], &[4.0f32, 5.0][..]));
    }

    #[test]
    fn column_std_counts_implicit_zeros() {
        // Column 0 over all rows: values 1.0, 0.0, 4.0.
        let csr = sample();
        let dense_std = csr.to_dense().column_std(&[0, 1, 2]);
        let sparse_std = csr.column_std(&[0, 1, 2]);
        for (a, b) in sparse_std.iter().zip(&dense_std) {
            assert_relative_eq!(*a, *b, epsilon = 1e-6);
        }
    }

    #[test]
    fn density() {
        let csr = sample();
        assert_relative_eq!(csr.density(), 5.0 / 9.0, epsilon = 1e-12);
    }
}

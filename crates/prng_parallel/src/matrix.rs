//! Dense row-major matrix for bulk sampling output.
//!
//! Storage is one flat `Vec<F>` indexed as `row * cols + col`, the same
//! layout used for path buffers elsewhere in the workspace.

use std::ops::{Index, IndexMut};

/// Owned `rows x cols` matrix in row-major order.
///
/// # Examples
///
/// ```rust
/// use prng_parallel::DenseMatrix;
///
/// let m = DenseMatrix::from_fn(2, 3, |r, c| (10 * r + c) as f64);
/// assert_eq!(m.shape(), (2, 3));
/// assert_eq!(m[(1, 2)], 12.0);
/// assert_eq!(m.row(1), &[10.0, 11.0, 12.0]);
/// assert_eq!(m.column(1).copied().collect::<Vec<_>>(), vec![1.0, 11.0]);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct DenseMatrix<F> {
    rows: usize,
    cols: usize,
    data: Vec<F>,
}

impl<F> DenseMatrix<F> {
    /// Builds a matrix by evaluating `f(row, col)` row by row.
    pub fn from_fn<G>(rows: usize, cols: usize, mut f: G) -> Self
    where
        G: FnMut(usize, usize) -> F,
    {
        let mut data = Vec::with_capacity(rows * cols);
        for r in 0..rows {
            for c in 0..cols {
                data.push(f(r, c));
            }
        }
        Self { rows, cols, data }
    }

    /// Wraps row-major `data`, or returns it back if the length is not
    /// `rows * cols`.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<F>) -> Result<Self, Vec<F>> {
        match rows.checked_mul(cols) {
            Some(len) if len == data.len() => Ok(Self { rows, cols, data }),
            _ => Err(data),
        }
    }

    /// Number of rows.
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// `(rows, cols)`.
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Total number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the matrix has no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Element at `(row, col)`, or `None` if out of range.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Option<&F> {
        if row < self.rows && col < self.cols {
            self.data.get(row * self.cols + col)
        } else {
            None
        }
    }

    /// Row `row` as a contiguous slice.
    ///
    /// # Panics
    ///
    /// Panics if `row >= rows`.
    pub fn row(&self, row: usize) -> &[F] {
        assert!(row < self.rows, "row {} out of range for {} rows", row, self.rows);
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    /// Iterator over column `col`, top to bottom.
    ///
    /// # Panics
    ///
    /// Panics if `col >= cols`.
    pub fn column(&self, col: usize) -> impl ExactSizeIterator<Item = &F> + '_ {
        assert!(col < self.cols, "column {} out of range for {} columns", col, self.cols);
        (0..self.rows).map(move |r| &self.data[r * self.cols + col])
    }

    /// All elements in row-major order.
    #[inline]
    pub fn as_slice(&self) -> &[F] {
        &self.data
    }

    /// Consumes the matrix, returning the row-major buffer.
    #[inline]
    pub fn into_vec(self) -> Vec<F> {
        self.data
    }

    #[inline]
    fn offset(&self, (row, col): (usize, usize)) -> usize {
        assert!(
            row < self.rows && col < self.cols,
            "index ({}, {}) out of range for {}x{} matrix",
            row,
            col,
            self.rows,
            self.cols
        );
        row * self.cols + col
    }
}

impl<F> Index<(usize, usize)> for DenseMatrix<F> {
    type Output = F;

    #[inline]
    fn index(&self, index: (usize, usize)) -> &F {
        &self.data[self.offset(index)]
    }
}

impl<F> IndexMut<(usize, usize)> for DenseMatrix<F> {
    #[inline]
    fn index_mut(&mut self, index: (usize, usize)) -> &mut F {
        let offset = self.offset(index);
        &mut self.data[offset]
    }
}

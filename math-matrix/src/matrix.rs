//! Dense matrix container, arithmetic and reductions.

use std::fmt;
use std::ops::{Index, IndexMut};

use ndarray::{Array1, Array2, Zip, s};

use crate::error::{MatrixError, Result};

/// Dense, row-major matrix of `f64` with value semantics.
///
/// Dimensions are fixed at construction. Cloning performs a deep copy, and
/// every operation that produces a matrix returns a fresh one; the only
/// in-place writers are [`replace`](Self::replace), [`set`](Self::set),
/// the swap helpers and `IndexMut`.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    data: Array2<f64>,
}

impl Matrix {
    /// Zero-filled `rows x cols` matrix.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            data: Array2::zeros((rows, cols)),
        }
    }

    /// Matrix with every element set to `value`.
    pub fn filled(rows: usize, cols: usize, value: f64) -> Self {
        Self {
            data: Array2::from_elem((rows, cols), value),
        }
    }

    /// Matrix with `diagonal` on the main diagonal and `off_diagonal` elsewhere.
    ///
    /// `with_diagonal(n, n, 0.0, 1.0)` is the identity, `with_diagonal(n, n, 0.0, s)`
    /// a scaled identity.
    pub fn with_diagonal(rows: usize, cols: usize, off_diagonal: f64, diagonal: f64) -> Self {
        Self {
            data: Array2::from_shape_fn((rows, cols), |(i, j)| {
                if i == j { diagonal } else { off_diagonal }
            }),
        }
    }

    /// `n x n` identity.
    pub fn identity(n: usize) -> Self {
        Self::with_diagonal(n, n, 0.0, 1.0)
    }

    /// Square diagonal matrix built from `values`.
    pub fn from_diagonal(values: &[f64]) -> Self {
        let n = values.len();
        let mut m = Self::zeros(n, n);
        for (i, &v) in values.iter().enumerate() {
            m.data[[i, i]] = v;
        }
        m
    }

    /// Builds a matrix from row-major `values`.
    pub fn from_vec(rows: usize, cols: usize, values: Vec<f64>) -> Result<Self> {
        let len = values.len();
        Array2::from_shape_vec((rows, cols), values)
            .map(|data| Self { data })
            .map_err(|_| MatrixError::InvalidShape { len, rows, cols })
    }

    /// `n x 1` column vector.
    pub fn column_vector(values: &Array1<f64>) -> Self {
        let n = values.len();
        Self {
            data: Array2::from_shape_fn((n, 1), |(i, _)| values[i]),
        }
    }

    /// `1 x n` row vector.
    pub fn row_vector(values: &Array1<f64>) -> Self {
        let n = values.len();
        Self {
            data: Array2::from_shape_fn((1, n), |(_, j)| values[j]),
        }
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.data.nrows()
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.data.ncols()
    }

    /// `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows(), self.cols())
    }

    /// `true` when rows == cols.
    pub fn is_square(&self) -> bool {
        self.rows() == self.cols()
    }

    /// `true` when the matrix holds no element.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Borrow the underlying array.
    pub fn as_array(&self) -> &Array2<f64> {
        &self.data
    }

    /// Consume the matrix and return the underlying array.
    pub fn into_array(self) -> Array2<f64> {
        self.data
    }

    /// Flattened elements in row-major order.
    pub fn to_vec(&self) -> Vec<f64> {
        self.data.iter().copied().collect()
    }

    /// Checked element read.
    pub fn get(&self, row: usize, col: usize) -> Result<f64> {
        self.check_row(row)?;
        self.check_col(col)?;
        Ok(self.data[[row, col]])
    }

    /// Checked element write.
    pub fn set(&mut self, row: usize, col: usize, value: f64) -> Result<()> {
        self.check_row(row)?;
        self.check_col(col)?;
        self.data[[row, col]] = value;
        Ok(())
    }

    fn check_row(&self, row: usize) -> Result<()> {
        if row >= self.rows() {
            return Err(MatrixError::IndexOutOfRange {
                axis: "row",
                index: row,
                extent: self.rows(),
            });
        }
        Ok(())
    }

    fn check_col(&self, col: usize) -> Result<()> {
        if col >= self.cols() {
            return Err(MatrixError::IndexOutOfRange {
                axis: "column",
                index: col,
                extent: self.cols(),
            });
        }
        Ok(())
    }

    fn check_same_shape(&self, other: &Matrix, op: &'static str) -> Result<()> {
        if self.shape() != other.shape() {
            return Err(MatrixError::DimensionMismatch {
                op,
                left: self.shape(),
                right: other.shape(),
            });
        }
        Ok(())
    }

    // ------------------------------ Arithmetic ------------------------------

    /// Element-wise sum.
    pub fn plus(&self, other: &Matrix) -> Result<Matrix> {
        self.check_same_shape(other, "plus")?;
        Ok(Self {
            data: &self.data + &other.data,
        })
    }

    /// Element-wise difference.
    pub fn minus(&self, other: &Matrix) -> Result<Matrix> {
        self.check_same_shape(other, "minus")?;
        Ok(Self {
            data: &self.data - &other.data,
        })
    }

    /// Matrix product `self * other`.
    pub fn mult(&self, other: &Matrix) -> Result<Matrix> {
        if self.cols() != other.rows() {
            return Err(MatrixError::DimensionMismatch {
                op: "mult",
                left: self.shape(),
                right: other.shape(),
            });
        }
        Ok(Self {
            data: self.data.dot(&other.data),
        })
    }

    /// Product with a scalar.
    pub fn scale(&self, factor: f64) -> Matrix {
        Self {
            data: self.data.mapv(|v| v * factor),
        }
    }

    /// Hadamard (element-wise) product.
    pub fn had(&self, other: &Matrix) -> Result<Matrix> {
        self.check_same_shape(other, "had")?;
        Ok(Self {
            data: &self.data * &other.data,
        })
    }

    /// Transpose.
    pub fn trans(&self) -> Matrix {
        Self {
            data: self.data.t().to_owned(),
        }
    }

    // ------------------------------ Extraction ------------------------------

    /// Row `i` as a `1 x cols` matrix.
    pub fn row(&self, i: usize) -> Result<Matrix> {
        self.check_row(i)?;
        Ok(Self {
            data: self.data.slice(s![i..i + 1, ..]).to_owned(),
        })
    }

    /// Column `j` as a `rows x 1` matrix.
    pub fn col(&self, j: usize) -> Result<Matrix> {
        self.check_col(j)?;
        Ok(Self {
            data: self.data.slice(s![.., j..j + 1]).to_owned(),
        })
    }

    /// Copy of the `rows x cols` block whose top-left corner is `(row, col)`.
    pub fn block(&self, row: usize, col: usize, rows: usize, cols: usize) -> Result<Matrix> {
        if row + rows > self.rows() || col + cols > self.cols() {
            return Err(MatrixError::BlockOutOfBounds {
                row,
                col,
                block: (rows, cols),
                target: self.shape(),
            });
        }
        Ok(Self {
            data: self
                .data
                .slice(s![row..row + rows, col..col + cols])
                .to_owned(),
        })
    }

    /// Writes `m` into this matrix with its top-left corner at `(row, col)`.
    pub fn replace(&mut self, m: &Matrix, row: usize, col: usize) -> Result<()> {
        if row + m.rows() > self.rows() || col + m.cols() > self.cols() {
            return Err(MatrixError::BlockOutOfBounds {
                row,
                col,
                block: m.shape(),
                target: self.shape(),
            });
        }
        self.data
            .slice_mut(s![row..row + m.rows(), col..col + m.cols()])
            .assign(&m.data);
        Ok(())
    }

    /// Swaps rows `a` and `b` in place.
    pub fn swap_rows(&mut self, a: usize, b: usize) -> Result<()> {
        self.check_row(a)?;
        self.check_row(b)?;
        if a != b {
            for j in 0..self.cols() {
                self.data.swap([a, j], [b, j]);
            }
        }
        Ok(())
    }

    /// Swaps columns `a` and `b` in place.
    pub fn swap_cols(&mut self, a: usize, b: usize) -> Result<()> {
        self.check_col(a)?;
        self.check_col(b)?;
        if a != b {
            for i in 0..self.rows() {
                self.data.swap([i, a], [i, b]);
            }
        }
        Ok(())
    }

    // ------------------------------ Reductions ------------------------------

    /// Smallest element.
    pub fn min(&self) -> Result<f64> {
        self.min_at().map(|(v, _, _)| v)
    }

    /// Largest element.
    pub fn max(&self) -> Result<f64> {
        self.max_at().map(|(v, _, _)| v)
    }

    /// Smallest element and its `(row, col)`; the first occurrence wins on ties.
    pub fn min_at(&self) -> Result<(f64, usize, usize)> {
        self.extremum_at("min", |candidate, best| candidate < best)
    }

    /// Largest element and its `(row, col)`; the first occurrence wins on ties.
    pub fn max_at(&self) -> Result<(f64, usize, usize)> {
        self.extremum_at("max", |candidate, best| candidate > best)
    }

    fn extremum_at(
        &self,
        op: &'static str,
        better: impl Fn(f64, f64) -> bool,
    ) -> Result<(f64, usize, usize)> {
        if self.is_empty() {
            return Err(MatrixError::Empty { op });
        }
        let mut best = (self.data[[0, 0]], 0, 0);
        for ((i, j), &v) in self.data.indexed_iter() {
            if better(v, best.0) {
                best = (v, i, j);
            }
        }
        Ok(best)
    }

    /// Largest absolute element (0 for an empty matrix).
    pub fn max_abs(&self) -> f64 {
        self.data.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()))
    }

    /// Sum of row `i`.
    pub fn sum_row(&self, i: usize) -> Result<f64> {
        self.check_row(i)?;
        Ok(self.data.row(i).sum())
    }

    /// Sum of column `j`.
    pub fn sum_col(&self, j: usize) -> Result<f64> {
        self.check_col(j)?;
        Ok(self.data.column(j).sum())
    }

    /// Row sums as a `rows x 1` matrix.
    pub fn sum_rows(&self) -> Matrix {
        let sums: Array1<f64> = self.data.rows().into_iter().map(|r| r.sum()).collect();
        Self::column_vector(&sums)
    }

    /// Column sums as a `1 x cols` matrix.
    pub fn sum_cols(&self) -> Matrix {
        let sums: Array1<f64> = self
            .data
            .columns()
            .into_iter()
            .map(|c| c.sum())
            .collect();
        Self::row_vector(&sums)
    }

    /// Sum of all elements.
    pub fn sum(&self) -> f64 {
        self.data.sum()
    }

    /// Sum of squared elements.
    pub fn sum2(&self) -> f64 {
        self.data.iter().map(|v| v * v).sum()
    }

    /// Frobenius norm, `sqrt(sum2)`.
    pub fn norm(&self) -> f64 {
        self.sum2().sqrt()
    }

    /// Quadratic form `vᵗ · self · v` for a column vector `v`.
    pub fn quadratic_form(&self, v: &Matrix) -> Result<f64> {
        let product = v.trans().mult(self)?.mult(v)?;
        if product.shape() != (1, 1) {
            return Err(MatrixError::DimensionMismatch {
                op: "quadratic_form",
                left: self.shape(),
                right: v.shape(),
            });
        }
        Ok(product.data[[0, 0]])
    }

    // ------------------------------ Sorting ------------------------------

    /// Sorts every column independently in ascending order.
    ///
    /// Returns the sorted matrix and, per column, the original row index of
    /// each sorted element. The sort is stable.
    pub fn sort(&self) -> (Matrix, Array2<usize>) {
        let (rows, cols) = self.shape();
        let mut sorted = Self::zeros(rows, cols);
        let mut ix = Array2::<usize>::zeros((rows, cols));
        for j in 0..cols {
            let column = self.data.column(j);
            let mut order: Vec<usize> = (0..rows).collect();
            order.sort_by(|&a, &b| column[a].total_cmp(&column[b]));
            for (i, &src) in order.iter().enumerate() {
                sorted.data[[i, j]] = column[src];
                ix[[i, j]] = src;
            }
        }
        (sorted, ix)
    }

    /// Permutes whole rows so that column `col` is ascending (stable).
    ///
    /// Returns the permuted matrix and the original index of each row.
    pub fn sortrows(&self, col: usize) -> Result<(Matrix, Vec<usize>)> {
        self.check_col(col)?;
        let key = self.data.column(col);
        let mut order: Vec<usize> = (0..self.rows()).collect();
        order.sort_by(|&a, &b| key[a].total_cmp(&key[b]));
        let mut sorted = Self::zeros(self.rows(), self.cols());
        for (dst, &src) in order.iter().enumerate() {
            sorted.data.row_mut(dst).assign(&self.data.row(src));
        }
        Ok((sorted, order))
    }

    /// `true` when both matrices share a shape and all elements agree within `tol`.
    pub fn approx_eq(&self, other: &Matrix, tol: f64) -> bool {
        self.shape() == other.shape()
            && Zip::from(&self.data)
                .and(&other.data)
                .all(|&a, &b| (a - b).abs() <= tol)
    }
}

impl From<Array2<f64>> for Matrix {
    fn from(data: Array2<f64>) -> Self {
        Self { data }
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = f64;

    fn index(&self, (i, j): (usize, usize)) -> &f64 {
        &self.data[[i, j]]
    }
}

impl IndexMut<(usize, usize)> for Matrix {
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut f64 {
        &mut self.data[[i, j]]
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.data.rows() {
            let cells: Vec<String> = row.iter().map(|v| format!("{v:>12.6}")).collect();
            writeln!(f, "{}", cells.join(" "))?;
        }
        Ok(())
    }
}

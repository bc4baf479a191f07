//! Dense matrix operations
//!
//! Row-major dense matrix representation. `IntMat` (a `Matrix<i64>`) is the
//! constraint-matrix type of the whole crate and, because equality and
//! hashing are by content, also the key under which the divide-and-conquer
//! builder shares identical sub-problems.

use crate::error::{CountError, Result};
use crate::rational::Rational;
use std::fmt;

/// Dense matrix in row-major order
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Matrix<T> {
    data: Vec<T>,
    rows: usize,
    cols: usize,
}

/// Integer constraint matrix
pub type IntMat = Matrix<i64>;

impl<T: Clone> Matrix<T> {
    /// Create a matrix from a flat vector (row-major order)
    pub fn from_flat(data: Vec<T>, rows: usize, cols: usize) -> Self {
        assert_eq!(data.len(), rows * cols);
        Self { data, rows, cols }
    }

    /// Create a matrix from a function of `(row, col)`
    pub fn from_fn(rows: usize, cols: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut data = Vec::with_capacity(rows * cols);
        for i in 0..rows {
            for j in 0..cols {
                data.push(f(i, j));
            }
        }
        Self { data, rows, cols }
    }

    /// Get matrix dimensions
    pub fn dims(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Access element at (i, j)
    pub fn get(&self, i: usize, j: usize) -> &T {
        &self.data[i * self.cols + j]
    }

    /// Mutable access to element at (i, j)
    pub fn get_mut(&mut self, i: usize, j: usize) -> &mut T {
        &mut self.data[i * self.cols + j]
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Get a row as a slice
    pub fn row(&self, i: usize) -> &[T] {
        let start = i * self.cols;
        &self.data[start..start + self.cols]
    }

    /// Swap two rows in place
    pub fn swap_rows(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        for j in 0..self.cols {
            self.data.swap(a * self.cols + j, b * self.cols + j);
        }
    }

    pub fn transpose(&self) -> Self {
        Self::from_fn(self.cols, self.rows, |i, j| self.get(j, i).clone())
    }

    /// Sub-matrix keeping the listed rows, in the listed order
    pub fn row_restrict(&self, rows: &[usize]) -> Self {
        Self::from_fn(rows.len(), self.cols, |i, j| self.get(rows[i], j).clone())
    }

    /// Sub-matrix keeping the listed columns, in the listed order
    pub fn col_restrict(&self, cols: &[usize]) -> Self {
        Self::from_fn(self.rows, cols.len(), |i, j| self.get(i, cols[j]).clone())
    }
}

impl IntMat {
    /// Build a constraint matrix from rows, rejecting empty, ragged or
    /// negative input.
    pub fn from_rows(rows: &[Vec<i64>]) -> Result<Self> {
        let m = rows.len();
        let n = rows.first().map_or(0, Vec::len);
        if m == 0 || n == 0 {
            return Err(CountError::EmptyMatrix);
        }
        let mut data = Vec::with_capacity(m * n);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != n {
                return Err(CountError::RaggedMatrix {
                    row: i,
                    expected: n,
                    actual: row.len(),
                });
            }
            for (j, &v) in row.iter().enumerate() {
                if v < 0 {
                    return Err(CountError::NegativeMatrixEntry {
                        row: i,
                        col: j,
                        value: v,
                    });
                }
            }
            data.extend_from_slice(row);
        }
        Ok(Self::from_flat(data, m, n))
    }

    /// Create a zero matrix
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            data: vec![0; rows * cols],
            rows,
            cols,
        }
    }

    /// `r = A x`
    pub fn mul_vec(&self, x: &[i64]) -> Vec<i64> {
        (0..self.rows)
            .map(|i| self.row(i).iter().zip(x).map(|(a, b)| a * b).sum())
            .collect()
    }

    /// Sum of each row
    pub fn row_sums(&self) -> Vec<i64> {
        (0..self.rows).map(|i| self.row(i).iter().sum()).collect()
    }

    pub fn is_zero_row(&self, i: usize) -> bool {
        self.row(i).iter().all(|&v| v == 0)
    }

    /// Index of the first all-zero column, if any
    pub fn zero_column(&self) -> Option<usize> {
        (0..self.cols).find(|&j| (0..self.rows).all(|i| *self.get(i, j) == 0))
    }

    pub fn to_rational(&self) -> Matrix<Rational> {
        Matrix {
            data: self.data.iter().map(|&v| Rational::from(v)).collect(),
            rows: self.rows,
            cols: self.cols,
        }
    }
}

impl Matrix<Rational> {
    /// Create a zero rational matrix
    pub fn zeros_rational(rows: usize, cols: usize) -> Self {
        Self {
            data: vec![Rational::zero(); rows * cols],
            rows,
            cols,
        }
    }

    /// Create a rational identity matrix
    pub fn identity_rational(n: usize) -> Self {
        Self::from_fn(n, n, |i, j| {
            if i == j {
                Rational::one()
            } else {
                Rational::zero()
            }
        })
    }

    /// Matrix product `self * other`
    pub fn mul_mat(&self, other: &Self) -> Self {
        assert_eq!(self.cols, other.rows);
        Self::from_fn(self.rows, other.cols, |i, j| {
            let mut sum = Rational::zero();
            for k in 0..self.cols {
                let a = self.get(i, k);
                if !a.is_zero() {
                    sum = &sum + &(a * other.get(k, j));
                }
            }
            sum
        })
    }
}

impl fmt::Display for IntMat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in 0..self.rows {
            let row: Vec<String> = self.row(i).iter().map(i64::to_string).collect();
            writeln!(f, "[{}]", row.join(" "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matrix_access() {
        let m = IntMat::from_flat((0..6).collect(), 2, 3);

        assert_eq!(*m.get(0, 0), 0);
        assert_eq!(*m.get(0, 2), 2);
        assert_eq!(*m.get(1, 0), 3);
        assert_eq!(*m.get(1, 2), 5);
        assert_eq!(m.row(1), &[3, 4, 5]);
    }

    #[test]
    fn test_from_rows_rejects_bad_shapes() {
        assert_eq!(IntMat::from_rows(&[]), Err(CountError::EmptyMatrix));
        assert_eq!(IntMat::from_rows(&[vec![]]), Err(CountError::EmptyMatrix));
        assert!(matches!(
            IntMat::from_rows(&[vec![1, 0], vec![1]]),
            Err(CountError::RaggedMatrix { row: 1, expected: 2, actual: 1 })
        ));
        assert!(matches!(
            IntMat::from_rows(&[vec![1, -1]]),
            Err(CountError::NegativeMatrixEntry { row: 0, col: 1, value: -1 })
        ));
    }

    #[test]
    fn test_restrictions_and_products() {
        let m = IntMat::from_rows(&[vec![1, 0, 2], vec![0, 1, 1]]).unwrap();
        assert_eq!(m.mul_vec(&[1, 2, 3]), vec![7, 5]);
        assert_eq!(m.row_sums(), vec![3, 2]);
        assert_eq!(m.col_restrict(&[2, 0]), IntMat::from_rows(&[vec![2, 1], vec![1, 0]]).unwrap());
        assert_eq!(m.row_restrict(&[1]), IntMat::from_rows(&[vec![0, 1, 1]]).unwrap());
        assert_eq!(m.transpose().dims(), (3, 2));
        assert_eq!(m.zero_column(), None);

        let z = IntMat::from_rows(&[vec![1, 0], vec![1, 0]]).unwrap();
        assert_eq!(z.zero_column(), Some(1));
    }

    #[test]
    fn test_content_equality_is_key_equality() {
        use std::collections::HashSet;
        let a = IntMat::from_rows(&[vec![1, 1], vec![0, 1]]).unwrap();
        let b = IntMat::from_flat(vec![1, 1, 0, 1], 2, 2);
        let c = IntMat::from_flat(vec![1, 1, 0, 1], 1, 4);
        let set: HashSet<IntMat> = [a, b, c].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_rational_product() {
        let m = IntMat::from_rows(&[vec![1, 2], vec![3, 4]]).unwrap().to_rational();
        let id = Matrix::identity_rational(2);
        assert_eq!(m.mul_mat(&id), m);
    }
}

//! Counting problems: the matrix `A` plus its domain knowledge
//!
//! A [`CountingProblem`] owns the constraint matrix and tells the counters
//! three things about right-hand sides:
//!
//! - which ones can possibly have solutions ([`CountingProblem::admissible_b`]),
//! - how to move one into the canonical representative of its symmetry class
//!   ([`CountingProblem::to_normal_form`]),
//! - how to cut a set of variables into two well-separated halves
//!   ([`CountingProblem::split_vars_by_ref`]).
//!
//! Only the first is needed for correctness; the other two decide how much
//! work the caches can share.

use crate::error::{CountError, Result};
use crate::matrix::IntMat;
use crate::permutation::Permutation;

/// Count non-negative integer `x` with `A x = b`
pub trait CountingProblem: Send + Sync {
    /// The constraint matrix `A`
    fn matrix(&self) -> &IntMat;

    /// Cheap necessary condition for `A x = b` to have non-negative solutions
    fn admissible_b(&self, b: &[i64]) -> bool {
        b.len() == self.matrix().rows() && b.iter().all(|&v| v >= 0)
    }

    /// Permutation taking `b` to the canonical representative of its
    /// symmetry class. The count must be invariant under it.
    fn to_normal_form(&self, b: &[i64]) -> Permutation {
        Permutation::identity(b.len())
    }

    /// Split `var_set` (original column indices) into two non-empty parts,
    /// returned as positions into `var_set`. `None` lets the builder split
    /// the set in half.
    fn split_vars_by_ref(&self, _var_set: &[usize]) -> Option<(Vec<usize>, Vec<usize>)> {
        None
    }
}

/// A bare matrix with no symmetry or geometry information
#[derive(Debug, Clone)]
pub struct GeneralProblem {
    a: IntMat,
}

impl GeneralProblem {
    pub fn new(a: IntMat) -> Self {
        Self { a }
    }

    /// Build from rows, rejecting empty, ragged or negative input
    pub fn from_rows(rows: &[Vec<i64>]) -> Result<Self> {
        Ok(Self::new(IntMat::from_rows(rows)?))
    }
}

impl CountingProblem for GeneralProblem {
    fn matrix(&self) -> &IntMat {
        &self.a
    }
}

/// Contingency tables with fixed row and column totals.
///
/// Cell `(i, j)` of a `rows × cols` table is variable `i * cols + j`.
/// Constraint `i < rows` is the total of row `i`; constraint `rows + j` is
/// the total of column `j`.
#[derive(Debug, Clone)]
pub struct ContingencyTableProblem {
    rows: usize,
    cols: usize,
    a: IntMat,
}

impl ContingencyTableProblem {
    pub fn new(rows: usize, cols: usize) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(CountError::InvalidProblem(format!(
                "contingency table must be at least 1x1, got {}x{}",
                rows, cols
            )));
        }
        let mut a = IntMat::zeros(rows + cols, rows * cols);
        for i in 0..rows {
            for j in 0..cols {
                let cell = i * cols + j;
                *a.get_mut(i, cell) = 1;
                *a.get_mut(rows + j, cell) = 1;
            }
        }
        Ok(Self { rows, cols, a })
    }

    pub fn table_rows(&self) -> usize {
        self.rows
    }

    pub fn table_cols(&self) -> usize {
        self.cols
    }

    /// `(row, col)` of a cell variable
    pub fn cell_coords(&self, cell: usize) -> (usize, usize) {
        (cell / self.cols, cell % self.cols)
    }

    /// Right-hand side for the given row and column totals, or `None` if
    /// their lengths do not match the table
    pub fn encode_b(&self, row_totals: &[i64], col_totals: &[i64]) -> Option<Vec<i64>> {
        if row_totals.len() != self.table_rows() || col_totals.len() != self.table_cols() {
            return None;
        }
        Some(row_totals.iter().chain(col_totals).copied().collect())
    }

    /// Row and column totals of a table given cell by cell
    pub fn margins(&self, cells: &[i64]) -> Vec<i64> {
        self.a.mul_vec(cells)
    }
}

impl CountingProblem for ContingencyTableProblem {
    fn matrix(&self) -> &IntMat {
        &self.a
    }

    fn admissible_b(&self, b: &[i64]) -> bool {
        if b.len() != self.rows + self.cols || b.iter().any(|&v| v < 0) {
            return false;
        }
        let row_total: i64 = b[..self.rows].iter().sum();
        let col_total: i64 = b[self.rows..].iter().sum();
        row_total == col_total
    }

    fn to_normal_form(&self, b: &[i64]) -> Permutation {
        let n = b.len();
        let by_row = Permutation::sorting_perm(b, 0, self.rows, n);
        let by_col = Permutation::sorting_perm(b, self.rows, n, n);
        // disjoint supports, so the order of composition does not matter
        by_row.compose(&by_col)
    }

    fn split_vars_by_ref(&self, var_set: &[usize]) -> Option<(Vec<usize>, Vec<usize>)> {
        if var_set.len() <= 1 {
            return None;
        }
        let coords: Vec<[usize; 2]> = var_set
            .iter()
            .map(|&v| {
                let (i, j) = self.cell_coords(v);
                [i, j]
            })
            .collect();

        // widest spatial coordinate; ties go to the column coordinate
        let spread = |k: usize| {
            let lo = coords.iter().map(|c| c[k]).min().unwrap_or(0);
            let hi = coords.iter().map(|c| c[k]).max().unwrap_or(0);
            hi - lo
        };
        let axis = if spread(1) >= spread(0) { 1 } else { 0 };

        // c < mean  <=>  c * len < sum, kept in integers for determinism
        let len = coords.len();
        let sum: usize = coords.iter().map(|c| c[axis]).sum();
        let (left, right): (Vec<usize>, Vec<usize>) =
            (0..len).partition(|&p| coords[p][axis] * len < sum);

        if left.is_empty() || right.is_empty() {
            return None;
        }
        Some((left, right))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contingency_matrix() {
        let p = ContingencyTableProblem::new(2, 3).unwrap();
        let a = p.matrix();
        assert_eq!(a.dims(), (5, 6));
        assert_eq!(a.row(0), &[1, 1, 1, 0, 0, 0]);
        assert_eq!(a.row(1), &[0, 0, 0, 1, 1, 1]);
        assert_eq!(a.row(2), &[1, 0, 0, 1, 0, 0]);
        assert_eq!(a.row(4), &[0, 0, 1, 0, 0, 1]);
        assert_eq!(p.cell_coords(4), (1, 1));
        assert_eq!(p.margins(&[1, 2, 3, 4, 5, 6]), vec![6, 15, 5, 7, 9]);
        assert!(ContingencyTableProblem::new(0, 3).is_err());
    }

    #[test]
    fn test_admissible() {
        let p = ContingencyTableProblem::new(2, 2).unwrap();
        assert!(p.admissible_b(&[1, 2, 3, 0]));
        assert!(!p.admissible_b(&[1, 2, 3, 1]));
        assert!(!p.admissible_b(&[1, -1, 0, 0]));
        assert!(!p.admissible_b(&[1, 1, 2]));

        let g = GeneralProblem::from_rows(&[vec![1, 1]]).unwrap();
        assert!(g.admissible_b(&[3]));
        assert!(!g.admissible_b(&[-3]));
    }

    #[test]
    fn test_normal_form_sorts_each_block() {
        let p = ContingencyTableProblem::new(3, 2).unwrap();
        let b = [5, 1, 3, 6, 3];
        let perm = p.to_normal_form(&b);
        assert_eq!(perm.apply(&b), vec![1, 3, 5, 3, 6]);

        let g = GeneralProblem::from_rows(&[vec![1, 1], vec![1, 0]]).unwrap();
        assert!(g.to_normal_form(&[2, 1]).is_identity());
    }

    #[test]
    fn test_split_by_widest_coordinate() {
        let p = ContingencyTableProblem::new(4, 2).unwrap();
        let all: Vec<usize> = (0..8).collect();
        let (left, right) = p.split_vars_by_ref(&all).unwrap();
        // rows are the wider axis: rows 0,1 against rows 2,3
        assert_eq!(left, vec![0, 1, 2, 3]);
        assert_eq!(right, vec![4, 5, 6, 7]);

        // a single table row splits along columns
        let row: Vec<usize> = vec![4, 5];
        let (l, r) = p.split_vars_by_ref(&row).unwrap();
        assert_eq!((l, r), (vec![0], vec![1]));

        assert!(p.split_vars_by_ref(&[3]).is_none());
    }

    #[test]
    fn test_split_tie_uses_columns() {
        let p = ContingencyTableProblem::new(2, 2).unwrap();
        let (left, right) = p.split_vars_by_ref(&[0, 1, 2, 3]).unwrap();
        // equal spread on both axes: column 0 against column 1
        assert_eq!(left, vec![0, 2]);
        assert_eq!(right, vec![1, 3]);
    }

    #[test]
    fn test_encode_b() {
        let p = ContingencyTableProblem::new(2, 3).unwrap();
        assert_eq!(p.encode_b(&[4, 2], &[1, 2, 3]), Some(vec![4, 2, 1, 2, 3]));
        assert_eq!(p.encode_b(&[1, 2, 3], &[4, 2]), None);
    }
}

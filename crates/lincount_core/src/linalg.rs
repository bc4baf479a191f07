//! Exact dense linear algebra over the rationals
//!
//! Everything here is Gauss-Jordan elimination on `Matrix<Rational>`:
//!
//! - [`rank`] and [`row_basis`] decide full row / column rank,
//! - [`solve`] finds the solution of a consistent system,
//! - [`inverse`] and [`pseudo_inverse`] build the operators used by
//!   terminal nodes.
//!
//! Because arithmetic is exact, "invertible" and "integral" are decided
//! without tolerances.

use crate::matrix::{IntMat, Matrix};
use crate::rational::Rational;

/// Reduce `aug` to reduced row echelon form, eliminating only over the first
/// `ncols` columns (the remaining columns are carried along).
///
/// Returns the pivot column of each of the leading `rank` rows.
fn gauss_jordan(aug: &mut Matrix<Rational>, ncols: usize) -> Vec<usize> {
    let (rows, total) = aug.dims();
    let mut pivots = Vec::new();
    let mut r = 0;

    for col in 0..ncols {
        if r >= rows {
            break;
        }

        // Find pivot
        let pivot = match (r..rows).find(|&i| !aug.get(i, col).is_zero()) {
            Some(p) => p,
            None => continue,
        };
        aug.swap_rows(r, pivot);

        // Scale pivot row
        let inv = match aug.get(r, col).recip() {
            Some(v) => v,
            None => continue,
        };
        for j in col..total {
            let v = aug.get(r, j) * &inv;
            *aug.get_mut(r, j) = v;
        }

        // Eliminate
        for i in 0..rows {
            if i == r {
                continue;
            }
            let factor = aug.get(i, col).clone();
            if factor.is_zero() {
                continue;
            }
            for j in col..total {
                let sub = &factor * aug.get(r, j);
                let v = aug.get(i, j) - &sub;
                *aug.get_mut(i, j) = v;
            }
        }

        pivots.push(col);
        r += 1;
    }

    pivots
}

/// Rank of an integer matrix
pub fn rank(a: &IntMat) -> usize {
    let mut work = a.to_rational();
    gauss_jordan(&mut work, a.cols()).len()
}

/// Indices of a basis of the row space of `a`, chosen greedily: row `i` is
/// in the basis iff it is independent of the rows before it.
pub fn row_basis(a: &IntMat) -> Vec<usize> {
    // pivot columns of A^T are the earliest independent rows of A
    let mut work = a.transpose().to_rational();
    gauss_jordan(&mut work, a.rows())
}

/// Solve `a x = b`, returning `None` when the system is inconsistent.
///
/// When the system is under-determined the free variables are set to zero;
/// callers only use this on full-column-rank systems, where the solution is
/// unique.
pub fn solve(a: &Matrix<Rational>, b: &[Rational]) -> Option<Vec<Rational>> {
    let (rows, cols) = a.dims();
    assert_eq!(b.len(), rows);

    let mut aug = Matrix::from_fn(rows, cols + 1, |i, j| {
        if j < cols {
            a.get(i, j).clone()
        } else {
            b[i].clone()
        }
    });
    let pivots = gauss_jordan(&mut aug, cols);

    // inconsistent if a zero row has a non-zero right-hand side
    if (pivots.len()..rows).any(|i| !aug.get(i, cols).is_zero()) {
        return None;
    }

    let mut x = vec![Rational::zero(); cols];
    for (r, &c) in pivots.iter().enumerate() {
        x[c] = aug.get(r, cols).clone();
    }
    Some(x)
}

/// Inverse of a square matrix, `None` if singular
pub fn inverse(a: &Matrix<Rational>) -> Option<Matrix<Rational>> {
    let (n, cols) = a.dims();
    assert_eq!(n, cols, "inverse of a non-square matrix");

    let mut aug = Matrix::from_fn(n, 2 * n, |i, j| {
        if j < n {
            a.get(i, j).clone()
        } else if j - n == i {
            Rational::one()
        } else {
            Rational::zero()
        }
    });
    if gauss_jordan(&mut aug, n).len() < n {
        return None;
    }
    Some(Matrix::from_fn(n, n, |i, j| aug.get(i, n + j).clone()))
}

/// Left pseudo-inverse `(AᵀA)⁻¹Aᵀ` of a full-column-rank matrix.
///
/// Returns `None` when `a` has more columns than rows or `AᵀA` is singular,
/// i.e. whenever `A x = b` can have more than one solution.
pub fn pseudo_inverse(a: &IntMat) -> Option<Matrix<Rational>> {
    if a.cols() > a.rows() {
        return None;
    }
    let ar = a.to_rational();
    let at = ar.transpose();
    let ata = at.mul_mat(&ar);
    let ata_inv = inverse(&ata)?;
    Some(ata_inv.mul_mat(&at))
}

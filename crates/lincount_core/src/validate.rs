//! Matrix preconditions shared by every counter
//!
//! Counting is only well defined when every right-hand side has finitely
//! many non-negative solutions, which holds exactly when `x = 0` is the only
//! non-negative solution of `A x = 0`. This is checked with one linear
//! program:
//!
//! ```text
//! maximize  Σ x_j
//! s.t.      A x     = 0
//!           Σ x + s = 1
//!           x, s   >= 0
//! ```
//!
//! A positive optimum exhibits a non-zero ray of the solution cone.

use crate::error::{CountError, Result};
use crate::matrix::{IntMat, Matrix};
use crate::rational::Rational;
use crate::simplex::{maximize, LpOutcome};

/// Reject matrices whose solution sets may be infinite
pub fn check_matrix(a: &IntMat) -> Result<()> {
    let (m, n) = a.dims();
    if m == 0 || n == 0 {
        return Err(CountError::EmptyMatrix);
    }
    if let Some(col) = a.zero_column() {
        return Err(CountError::ZeroColumn(col));
    }
    if has_positive_ray(a) {
        return Err(CountError::UnboundedCone);
    }
    Ok(())
}

/// Whether `A x = 0` has a non-zero solution with `x >= 0`
pub fn has_positive_ray(a: &IntMat) -> bool {
    let (m, n) = a.dims();
    // columns: x_0 .. x_{n-1}, slack s
    let lp = Matrix::from_fn(m + 1, n + 1, |i, j| {
        if i < m {
            if j < n {
                Rational::from(*a.get(i, j))
            } else {
                Rational::zero()
            }
        } else {
            Rational::one()
        }
    });
    let mut rhs = vec![Rational::zero(); m + 1];
    rhs[m] = Rational::one();
    let cost: Vec<Rational> = (0..=n)
        .map(|j| if j < n { Rational::one() } else { Rational::zero() })
        .collect();

    match maximize(&lp, &rhs, &cost) {
        LpOutcome::Optimal { value, .. } => value.is_positive(),
        // x = 0, s = 1 is always feasible and Σx <= 1 bounds the objective
        LpOutcome::Unbounded | LpOutcome::Infeasible => true,
    }
}

//! Exhaustive enumeration
//!
//! Walks every `x` in the box `0 <= x_j <= min_i floor(b_i / A_ij)` and
//! checks `A x == b`. Exponential in the number of columns; used as the
//! reference answer in tests and by the optional cross-check.

use crate::counter::{check_target, NonNegativeCounter};
use crate::error::{CountError, Result};
use crate::matrix::IntMat;
use crate::problem::CountingProblem;
use crate::sequence::{BoundedSeq, Sequencer};
use crate::validate::check_matrix;
use num_bigint::BigUint;
use num_traits::Zero;
use std::sync::Arc;

/// Count `x >= 0` (or `x` in `{0,1}^n` when `zero_one`) with `A x = b`
/// by enumeration.
pub fn brute_force_count(a: &IntMat, b: &[i64], zero_one: bool) -> Result<BigUint> {
    check_target(b, a.rows())?;
    if let Some(col) = a.zero_column() {
        return Err(CountError::ZeroColumn(col));
    }
    Ok(enumerate(a, b, zero_one))
}

/// Enumeration without argument checks; `a` must have no zero column.
pub(crate) fn enumerate(a: &IntMat, b: &[i64], zero_one: bool) -> BigUint {
    let (m, n) = a.dims();
    let bounds: Vec<i64> = (0..n)
        .map(|j| {
            let bound = (0..m)
                .filter(|&i| *a.get(i, j) > 0)
                .map(|i| b[i] / a.get(i, j))
                .min()
                .unwrap_or(0);
            if zero_one {
                bound.min(1)
            } else {
                bound
            }
        })
        .collect();

    let seq = BoundedSeq::up_to(bounds);
    let mut count = BigUint::zero();
    if let Some(mut x) = seq.first() {
        loop {
            if a.mul_vec(&x) == b {
                count += 1u32;
            }
            if !seq.advance(&mut x) {
                break;
            }
        }
    }
    count
}

/// [`NonNegativeCounter`] backed by [`brute_force_count`]
pub struct BruteForceCounter {
    problem: Arc<dyn CountingProblem>,
    zero_one: bool,
}

impl BruteForceCounter {
    pub fn new<P: CountingProblem + 'static>(problem: P) -> Result<Self> {
        Self::from_shared(Arc::new(problem), false)
    }

    /// Count 0/1 solutions only
    pub fn zero_one<P: CountingProblem + 'static>(problem: P) -> Result<Self> {
        Self::from_shared(Arc::new(problem), true)
    }

    pub fn from_shared(problem: Arc<dyn CountingProblem>, zero_one: bool) -> Result<Self> {
        check_matrix(problem.matrix())?;
        Ok(Self { problem, zero_one })
    }
}

impl NonNegativeCounter for BruteForceCounter {
    fn count_non_negative_solutions(&self, b: &[i64]) -> Result<BigUint> {
        let a = self.problem.matrix();
        check_target(b, a.rows())?;
        if self.obviously_empty(b) {
            return Ok(BigUint::zero());
        }
        Ok(enumerate(a, b, self.zero_one))
    }

    fn obviously_empty(&self, b: &[i64]) -> bool {
        !self.problem.admissible_b(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::{ContingencyTableProblem, GeneralProblem};

    #[test]
    fn test_coin_change() {
        // x0 + 2 x1 + 5 x2 = 10
        let a = IntMat::from_rows(&[vec![1, 2, 5]]).unwrap();
        assert_eq!(brute_force_count(&a, &[10], false).unwrap(), BigUint::from(10u32));
        assert_eq!(brute_force_count(&a, &[0], false).unwrap(), BigUint::from(1u32));
        assert_eq!(brute_force_count(&a, &[4], true).unwrap(), BigUint::from(0u32));
        assert_eq!(brute_force_count(&a, &[8], true).unwrap(), BigUint::from(1u32));
        assert_eq!(brute_force_count(&a, &[7], true).unwrap(), BigUint::from(1u32));
    }

    #[test]
    fn test_two_by_two_tables() {
        // 2x2 tables with all margins t: t + 1 tables
        let counter = BruteForceCounter::new(ContingencyTableProblem::new(2, 2).unwrap()).unwrap();
        for t in 0..5 {
            let n = counter.count_non_negative_solutions(&[t; 4]).unwrap();
            assert_eq!(n, BigUint::from((t + 1) as u32));
        }
        // inadmissible margins
        assert!(counter.count_non_negative_solutions(&[1, 0, 0, 0]).unwrap().is_zero());
    }

    #[test]
    fn test_argument_errors() {
        let a = IntMat::from_rows(&[vec![1, 0]]).unwrap();
        assert_eq!(brute_force_count(&a, &[1], false), Err(CountError::ZeroColumn(1)));

        let p = GeneralProblem::from_rows(&[vec![1, 1]]).unwrap();
        let counter = BruteForceCounter::new(p).unwrap();
        assert_eq!(
            counter.count_non_negative_solutions(&[-1]),
            Err(CountError::NegativeTarget { index: 0, value: -1 })
        );
    }
}

//! Terminal nodes: full-column-rank systems
//!
//! When `A` has full column rank, `A x = b` has at most one solution,
//! `x = (AᵀA)⁻¹Aᵀ b`. The pseudo-inverse is stored as an integer matrix
//! over a common denominator so each query is pure integer arithmetic.

use crate::linalg::pseudo_inverse;
use crate::matrix::{IntMat, Matrix};
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, ToPrimitive, Zero};

#[derive(Debug, Clone)]
pub struct TerminalNode {
    a: IntMat,
    /// `denom * (AᵀA)⁻¹Aᵀ`, `n × m`
    numer: Matrix<BigInt>,
    denom: BigInt,
    zero_one: bool,
}

impl TerminalNode {
    /// `None` unless `a` has full column rank
    pub fn try_build(a: &IntMat, zero_one: bool) -> Option<Self> {
        let pinv = pseudo_inverse(a)?;
        let denom = pinv
            .as_slice()
            .iter()
            .fold(BigInt::one(), |acc, q| acc.lcm(&q.denominator));
        let (n, m) = pinv.dims();
        let numer = Matrix::from_fn(n, m, |j, i| {
            let q = pinv.get(j, i);
            &q.numerator * (&denom / &q.denominator)
        });
        Some(Self {
            a: a.clone(),
            numer,
            denom,
            zero_one,
        })
    }

    pub fn matrix(&self) -> &IntMat {
        &self.a
    }

    /// The unique solution of `A x = b`, if it is non-negative and integral
    /// (and 0/1 in zero-one mode)
    pub fn solve(&self, b: &[i64]) -> Option<Vec<i64>> {
        let (n, m) = self.numer.dims();
        let mut x = Vec::with_capacity(n);
        for j in 0..n {
            let mut s = BigInt::zero();
            for i in 0..m {
                let c = self.numer.get(j, i);
                if !c.is_zero() && b[i] != 0 {
                    s += c * b[i];
                }
            }
            let (q, r) = s.div_rem(&self.denom);
            if !r.is_zero() || q.is_negative() {
                return None;
            }
            let xj = q.to_i64()?;
            if self.zero_one && xj > 1 {
                return None;
            }
            x.push(xj);
        }
        // b outside the column space still has a least-squares preimage
        (self.a.mul_vec(&x) == b).then_some(x)
    }

    /// Zero or one
    pub fn count(&self, b: &[i64]) -> u32 {
        u32::from(self.solve(b).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mat(rows: &[Vec<i64>]) -> IntMat {
        IntMat::from_rows(rows).unwrap()
    }

    #[test]
    fn test_square_system() {
        // x0 + x1 = b0, x1 = b1
        let t = TerminalNode::try_build(&mat(&[vec![1, 1], vec![0, 1]]), false).unwrap();
        assert_eq!(t.solve(&[5, 2]), Some(vec![3, 2]));
        assert_eq!(t.count(&[2, 5]), 0); // x0 would be negative
        assert_eq!(t.count(&[0, 0]), 1);
    }

    #[test]
    fn test_tall_system_checks_consistency() {
        // x0 = b0, x0 = b1, 2 x0 = b2
        let t = TerminalNode::try_build(&mat(&[vec![1], vec![1], vec![2]]), false).unwrap();
        assert_eq!(t.count(&[3, 3, 6]), 1);
        assert_eq!(t.count(&[3, 3, 7]), 0);
        assert_eq!(t.count(&[2, 4, 6]), 0);
    }

    #[test]
    fn test_fractional_solution_rejected() {
        let t = TerminalNode::try_build(&mat(&[vec![2]]), false).unwrap();
        assert_eq!(t.count(&[3]), 0);
        assert_eq!(t.solve(&[4]), Some(vec![2]));
    }

    #[test]
    fn test_zero_one_mode() {
        let t = TerminalNode::try_build(&mat(&[vec![1, 0], vec![0, 1]]), true).unwrap();
        assert_eq!(t.count(&[1, 1]), 1);
        assert_eq!(t.count(&[2, 1]), 0);
    }

    #[test]
    fn test_rank_deficient_is_not_terminal() {
        assert!(TerminalNode::try_build(&mat(&[vec![1, 1], vec![2, 2]]), false).is_none());
        assert!(TerminalNode::try_build(&mat(&[vec![1, 1, 1]]), false).is_none());
    }
}

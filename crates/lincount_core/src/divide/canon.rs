//! Row canonicalization
//!
//! Rewrites `A x = b` as an equivalent full-row-rank system `A' x = b'`:
//! `A'` keeps a basis of the rows of `A`, sorted lexicographically so that
//! sub-problems differing only in row order or redundant rows share one
//! canonical matrix. Every other row is a fixed rational combination of the
//! basis rows, which `b` must reproduce exactly or the system is empty.

use crate::linalg::{row_basis, solve};
use crate::matrix::IntMat;
use crate::rational::Rational;
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::One;

/// How an original row relates to the canonical system
#[derive(Debug, Clone, PartialEq, Eq)]
enum RowRole {
    /// Row `k` of the canonical matrix
    Basis(usize),
    /// All-zero row: `b_i` must be 0
    Zero,
    /// `denom * row_i = Σ coeff * row_k` over original basis rows `k`
    Dependent {
        denom: BigInt,
        terms: Vec<(usize, BigInt)>,
    },
}

#[derive(Debug, Clone)]
pub struct RowCanon {
    roles: Vec<RowRole>,
    /// original index of canonical row `k`
    basis: Vec<usize>,
    canonical: IntMat,
}

impl RowCanon {
    pub fn build(a: &IntMat) -> Self {
        let mut basis = row_basis(a);
        basis.sort_by(|&p, &q| a.row(p).cmp(a.row(q)).then(p.cmp(&q)));
        let canonical = a.row_restrict(&basis);

        // columns are the basis rows, so solving gives the row combination
        let basis_t = canonical.transpose().to_rational();
        let roles = (0..a.rows())
            .map(|i| {
                if let Some(k) = basis.iter().position(|&p| p == i) {
                    RowRole::Basis(k)
                } else if a.is_zero_row(i) {
                    RowRole::Zero
                } else {
                    let target: Vec<Rational> = a.row(i).iter().map(|&v| Rational::from(v)).collect();
                    let coeffs = solve(&basis_t, &target).unwrap_or_else(|| {
                        unreachable!("row {} outside the span of the row basis", i)
                    });
                    dependent_role(&basis, &coeffs)
                }
            })
            .collect();

        Self {
            roles,
            basis,
            canonical,
        }
    }

    /// Full-row-rank matrix with the same solution set
    pub fn canonical(&self) -> &IntMat {
        &self.canonical
    }

    /// Rows dropped as zero or dependent
    pub fn dropped_rows(&self) -> usize {
        self.roles.len() - self.basis.len()
    }

    /// No rows dropped and none reordered
    pub fn is_identity(&self) -> bool {
        self.roles
            .iter()
            .enumerate()
            .all(|(i, role)| matches!(role, RowRole::Basis(k) if *k == i))
    }

    /// Whether `b` satisfies every zero and dependent row relation
    pub fn consistent(&self, b: &[i64]) -> bool {
        self.roles.iter().enumerate().all(|(i, role)| match role {
            RowRole::Basis(_) => true,
            RowRole::Zero => b[i] == 0,
            RowRole::Dependent { denom, terms } => {
                let lhs = denom * b[i];
                let rhs: BigInt = terms.iter().map(|(k, c)| c * b[*k]).sum();
                lhs == rhs
            }
        })
    }

    /// Right-hand side of the canonical system, or `None` when `b` breaks a
    /// row relation (and so has no solutions)
    pub fn map(&self, b: &[i64]) -> Option<Vec<i64>> {
        if !self.consistent(b) {
            return None;
        }
        Some(self.basis.iter().map(|&p| b[p]).collect())
    }
}

fn dependent_role(basis: &[usize], coeffs: &[Rational]) -> RowRole {
    let denom = coeffs
        .iter()
        .fold(BigInt::one(), |acc, q| acc.lcm(&q.denominator));
    let terms = coeffs
        .iter()
        .enumerate()
        .filter(|(_, q)| !q.is_zero())
        .map(|(k, q)| (basis[k], &q.numerator * (&denom / &q.denominator)))
        .collect();
    RowRole::Dependent { denom, terms }
}

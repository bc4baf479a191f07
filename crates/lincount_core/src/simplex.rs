//! Exact two-phase simplex
//!
//! Solves `maximize cᵀx subject to A x = b, x ≥ 0` over the rationals with a
//! dense tableau. Bland's rule picks both the entering and the leaving
//! variable, so the method terminates even on the fully degenerate systems
//! the boundedness check produces (`b = 0` in every row but one).
//!
//! # Phases
//!
//! 1. One artificial variable per row; minimise their sum. A positive
//!    optimum means the system is infeasible.
//! 2. Artificials still basic at level zero are pivoted out (or their row is
//!    recognised as redundant), then the real objective is maximised over
//!    the original columns only.

use crate::matrix::Matrix;
use crate::rational::Rational;

/// Result of a linear program
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LpOutcome {
    /// Optimal vertex and objective value
    Optimal { x: Vec<Rational>, value: Rational },
    /// The objective grows without bound on the feasible region
    Unbounded,
    /// No `x ≥ 0` satisfies `A x = b`
    Infeasible,
}

struct Tableau {
    /// rows × (vars + 1); last column is the right-hand side
    t: Matrix<Rational>,
    basis: Vec<usize>,
    vars: usize,
}

impl Tableau {
    fn rhs(&self, i: usize) -> &Rational {
        self.t.get(i, self.vars)
    }

    fn pivot(&mut self, row: usize, col: usize) {
        let total = self.vars + 1;
        let inv = self
            .t
            .get(row, col)
            .recip()
            .expect("pivot on a zero entry");
        for j in 0..total {
            let v = self.t.get(row, j) * &inv;
            *self.t.get_mut(row, j) = v;
        }
        for i in 0..self.t.rows() {
            if i == row {
                continue;
            }
            let factor = self.t.get(i, col).clone();
            if factor.is_zero() {
                continue;
            }
            for j in 0..total {
                let sub = &factor * self.t.get(row, j);
                let v = self.t.get(i, j) - &sub;
                *self.t.get_mut(i, j) = v;
            }
        }
        self.basis[row] = col;
    }

    /// Maximise `cost · x` over the columns flagged in `allowed`.
    ///
    /// Returns `false` if the objective is unbounded.
    fn optimize(&mut self, cost: &[Rational], allowed: &[bool]) -> bool {
        loop {
            // Bland: lowest-index column with positive reduced cost
            let entering = (0..self.vars).filter(|&j| allowed[j]).find(|&j| {
                let mut d = cost[j].clone();
                for (i, &bi) in self.basis.iter().enumerate() {
                    let a = self.t.get(i, j);
                    if !a.is_zero() && !cost[bi].is_zero() {
                        d = &d - &(&cost[bi] * a);
                    }
                }
                d.is_positive()
            });
            let col = match entering {
                Some(j) => j,
                None => return true,
            };

            // ratio test, ties broken by lowest basic variable index
            let mut leaving: Option<(usize, Rational)> = None;
            for i in 0..self.t.rows() {
                let a = self.t.get(i, col);
                if !a.is_positive() {
                    continue;
                }
                let ratio = self.rhs(i) / a;
                let better = match &leaving {
                    None => true,
                    Some((li, lr)) => {
                        ratio < *lr || (ratio == *lr && self.basis[i] < self.basis[*li])
                    }
                };
                if better {
                    leaving = Some((i, ratio));
                }
            }
            match leaving {
                Some((row, _)) => self.pivot(row, col),
                None => return false,
            }
        }
    }

    fn value_of(&self, var: usize) -> Rational {
        self.basis
            .iter()
            .position(|&b| b == var)
            .map_or_else(Rational::zero, |i| self.rhs(i).clone())
    }
}

/// Solve `maximize cᵀx s.t. A x = b, x ≥ 0`
pub fn maximize(a: &Matrix<Rational>, b: &[Rational], c: &[Rational]) -> LpOutcome {
    let (m, n) = a.dims();
    assert_eq!(b.len(), m);
    assert_eq!(c.len(), n);

    // tableau [A | I | b] with every b_i made non-negative
    let vars = n + m;
    let t = Matrix::from_fn(m, vars + 1, |i, j| {
        let flip = b[i].is_negative();
        let v = if j < n {
            a.get(i, j).clone()
        } else if j < vars {
            if j - n == i {
                Rational::one()
            } else {
                return Rational::zero();
            }
        } else {
            b[i].clone()
        };
        if flip && j != n + i {
            -v
        } else {
            v
        }
    });
    let mut tab = Tableau {
        t,
        basis: (n..vars).collect(),
        vars,
    };

    // Phase 1: maximise -(sum of artificials)
    let phase1_cost: Vec<Rational> = (0..vars)
        .map(|j| if j < n { Rational::zero() } else { -Rational::one() })
        .collect();
    let all = vec![true; vars];
    tab.optimize(&phase1_cost, &all);
    if (n..vars).any(|j| tab.value_of(j).is_positive()) {
        return LpOutcome::Infeasible;
    }

    // drive zero-level artificials out of the basis
    for i in 0..m {
        if tab.basis[i] < n {
            continue;
        }
        if let Some(j) = (0..n).find(|&j| !tab.t.get(i, j).is_zero()) {
            tab.pivot(i, j);
        }
        // otherwise the row is redundant; its artificial stays basic at zero
        // and no original column can ever pivot on it
    }

    // Phase 2
    let phase2_cost: Vec<Rational> = (0..vars)
        .map(|j| if j < n { c[j].clone() } else { Rational::zero() })
        .collect();
    let original: Vec<bool> = (0..vars).map(|j| j < n).collect();
    if !tab.optimize(&phase2_cost, &original) {
        return LpOutcome::Unbounded;
    }

    let x: Vec<Rational> = (0..n).map(|j| tab.value_of(j)).collect();
    let value = x
        .iter()
        .zip(c)
        .fold(Rational::zero(), |acc, (xi, ci)| &acc + &(xi * ci));
    LpOutcome::Optimal { x, value }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::IntMat;

    fn q(n: i64) -> Rational {
        Rational::from(n)
    }

    fn qs(v: &[i64]) -> Vec<Rational> {
        v.iter().map(|&x| q(x)).collect()
    }

    #[test]
    fn test_simple_optimum() {
        // max x0 + 2 x1  s.t.  x0 + x1 + s = 4,  x1 + t = 3
        let a = IntMat::from_rows(&[vec![1, 1, 1, 0], vec![0, 1, 0, 1]])
            .unwrap()
            .to_rational();
        match maximize(&a, &qs(&[4, 3]), &qs(&[1, 2, 0, 0])) {
            LpOutcome::Optimal { x, value } => {
                assert_eq!(value, q(7));
                assert_eq!(x[0], q(1));
                assert_eq!(x[1], q(3));
            }
            other => panic!("expected optimum, got {:?}", other),
        }
    }

    #[test]
    fn test_unbounded() {
        // max x0  s.t.  x0 - x1 = 1
        let a = Matrix::from_flat(vec![q(1), q(-1)], 1, 2);
        assert_eq!(maximize(&a, &qs(&[1]), &qs(&[1, 0])), LpOutcome::Unbounded);
    }

    #[test]
    fn test_infeasible() {
        // x0 + x1 = -1 has no non-negative solution
        let a = IntMat::from_rows(&[vec![1, 1]]).unwrap().to_rational();
        assert_eq!(maximize(&a, &qs(&[-1]), &qs(&[1, 1])), LpOutcome::Infeasible);
    }

    #[test]
    fn test_degenerate_redundant_rows() {
        // duplicated homogeneous rows plus a normalisation row
        let a = Matrix::from_flat(
            qs(&[1, -1, 0, 1, -1, 0, 1, 1, 1]),
            3,
            3,
        );
        match maximize(&a, &qs(&[0, 0, 1]), &qs(&[1, 1, 0])) {
            LpOutcome::Optimal { value, x } => {
                assert_eq!(value, q(1));
                assert_eq!(x[0], x[1]);
            }
            other => panic!("expected optimum, got {:?}", other),
        }
    }
}

//! Divide-and-conquer counting
//!
//! # Overview
//!
//! [`DivideAndConquerCounter`] decomposes `A` once, at construction, into a
//! [`SolutionTree`] and answers each query by walking it. Queries are first
//! moved to the problem's normal form, so symmetric right-hand sides hit the
//! same cache entries.
//!
//! # Key Components
//!
//! - [`TerminalNode`] - full-column-rank leaves (zero or one solution)
//! - [`RowCanon`] - reduction to a full-row-rank canonical system
//! - [`SolutionTree`] - the arena of nodes plus the split-node convolution
//!
//! # Example
//!
//! ```ignore
//! use lincount_core::{ContingencyTableProblem, DivideAndConquerCounter, NonNegativeCounter};
//!
//! let problem = ContingencyTableProblem::new(3, 3)?;
//! let counter = DivideAndConquerCounter::new(problem)?;
//! // 3x3 tables with every margin equal to 2
//! assert_eq!(counter.count_non_negative_solutions(&[2; 6])?, 21u32.into());
//! ```

pub mod canon;
pub mod terminal;
pub mod tree;

pub use canon::RowCanon;
pub use terminal::TerminalNode;
pub use tree::{NodeId, SolutionTree, TreeStats};

use crate::cache::CacheStats;
use crate::config::CountConfig;
use crate::counter::{check_target, NonNegativeCounter};
use crate::error::Result;
use crate::intvec::IntVec;
use crate::problem::CountingProblem;
use crate::sequence::{BoundedSeq, Sequencer};
use crate::validate::check_matrix;
use num_bigint::BigUint;
use num_traits::{One, Zero};
use rustc_hash::FxHashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Counts solutions by recursive column splitting
pub struct DivideAndConquerCounter {
    problem: Arc<dyn CountingProblem>,
    tree: SolutionTree,
}

impl DivideAndConquerCounter {
    /// Count all non-negative integer solutions
    pub fn new<P: CountingProblem + 'static>(problem: P) -> Result<Self> {
        Self::with_config(problem, CountConfig::default())
    }

    /// Count only solutions with every `x_j` in `{0, 1}`
    pub fn zero_one<P: CountingProblem + 'static>(problem: P) -> Result<Self> {
        Self::zero_one_with_config(problem, CountConfig::default())
    }

    pub fn zero_one_with_config<P: CountingProblem + 'static>(problem: P, config: CountConfig) -> Result<Self> {
        Self::from_shared(Arc::new(problem), true, config)
    }

    pub fn with_config<P: CountingProblem + 'static>(problem: P, config: CountConfig) -> Result<Self> {
        Self::from_shared(Arc::new(problem), false, config)
    }

    /// Build over a shared problem; fails if `A` admits unbounded solution sets
    pub fn from_shared(
        problem: Arc<dyn CountingProblem>,
        zero_one: bool,
        config: CountConfig,
    ) -> Result<Self> {
        check_matrix(problem.matrix())?;
        let tree = SolutionTree::build(problem.as_ref(), zero_one, &config);
        Ok(Self { problem, tree })
    }

    pub fn tree(&self) -> &SolutionTree {
        &self.tree
    }

    pub fn stats(&self) -> &TreeStats {
        self.tree.stats()
    }

    pub fn is_zero_one(&self) -> bool {
        self.tree.is_zero_one()
    }

    /// Every `b` in the box `0 <= b <= rowsums(A)` with at least one solution,
    /// mapped to its count.
    ///
    /// On a zero-one counter the box covers every reachable right-hand side,
    /// so the result is the complete table of 0/1 solution counts.
    pub fn zero_one_solution_counts(&self) -> FxHashMap<IntVec, BigUint> {
        let start = Instant::now();
        let bounds = self.problem.matrix().row_sums();
        let seq = BoundedSeq::up_to(bounds);
        let mut counts = FxHashMap::default();
        if let Some(mut b) = seq.first() {
            loop {
                let n = self.count_checked(&b);
                if !n.is_zero() {
                    counts.insert(IntVec::from(b.as_slice()), n);
                }
                if !seq.advance(&mut b) {
                    break;
                }
            }
        }
        info!(
            entries = counts.len(),
            elapsed = start.elapsed().as_secs_f64(),
            "enumerated zero/one solution counts"
        );
        counts
    }

    /// Count for a right-hand side already known to be well formed
    fn count_checked(&self, b: &[i64]) -> BigUint {
        if self.obviously_empty(b) {
            return BigUint::zero();
        }
        if b.iter().all(|&v| v == 0) {
            return BigUint::one();
        }
        let perm = self.problem.to_normal_form(b);
        self.tree.count(&perm.apply(b))
    }
}

impl NonNegativeCounter for DivideAndConquerCounter {
    fn count_non_negative_solutions(&self, b: &[i64]) -> Result<BigUint> {
        check_target(b, self.problem.matrix().rows())?;
        Ok(self.count_checked(b))
    }

    fn obviously_empty(&self, b: &[i64]) -> bool {
        !self.problem.admissible_b(b) || self.tree.obviously_empty(b)
    }

    fn cache_len(&self) -> usize {
        self.tree.cache_len()
    }

    fn clear_cache(&self) {
        self.tree.clear_cache()
    }

    fn cache_stats(&self) -> CacheStats {
        self.tree.cache_stats()
    }
}

impl std::fmt::Display for DivideAndConquerCounter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "dq({})", self.tree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brute;
    use crate::cache::EvictionPolicy;
    use crate::error::CountError;
    use crate::problem::{ContingencyTableProblem, GeneralProblem};

    #[test]
    fn test_small_tables() {
        let counter =
            DivideAndConquerCounter::with_config(ContingencyTableProblem::new(3, 3).unwrap(), CountConfig::serial())
                .unwrap();
        let n = |b: &[i64]| counter.count_non_negative_solutions(b).unwrap();
        assert_eq!(n(&[0; 6]), BigUint::from(1u32));
        assert_eq!(n(&[1; 6]), BigUint::from(6u32)); // permutation matrices
        assert_eq!(n(&[2; 6]), BigUint::from(21u32));
        assert_eq!(n(&[3; 6]), BigUint::from(55u32));
        assert!(n(&[1, 1, 1, 1, 1, 2]).is_zero());
    }

    #[test]
    fn test_symmetric_margins_agree() {
        let counter = DivideAndConquerCounter::new(ContingencyTableProblem::new(2, 3).unwrap()).unwrap();
        let a = counter.count_non_negative_solutions(&[4, 2, 1, 2, 3]).unwrap();
        let b = counter.count_non_negative_solutions(&[2, 4, 3, 1, 2]).unwrap();
        assert_eq!(a, b);
        let p = ContingencyTableProblem::new(2, 3).unwrap();
        assert_eq!(a, brute::enumerate(p.matrix(), &[4, 2, 1, 2, 3], false));
    }

    #[test]
    fn test_rejects_bad_input() {
        assert_eq!(
            DivideAndConquerCounter::new(GeneralProblem::from_rows(&[vec![1, 0]]).unwrap()).err(),
            Some(CountError::ZeroColumn(1))
        );
        let counter = DivideAndConquerCounter::new(GeneralProblem::from_rows(&[vec![1, 2]]).unwrap()).unwrap();
        assert_eq!(
            counter.count_non_negative_solutions(&[-3]),
            Err(CountError::NegativeTarget { index: 0, value: -3 })
        );
        assert_eq!(
            counter.count_non_negative_solutions(&[1, 1]),
            Err(CountError::DimensionMismatch {
                expected: 1,
                actual: 2
            })
        );
    }

    #[test]
    fn test_zero_one_solution_counts() {
        let problem = ContingencyTableProblem::new(2, 2).unwrap();
        let counter = DivideAndConquerCounter::zero_one(problem).unwrap();
        let counts = counter.zero_one_solution_counts();
        // 16 0/1 tables in total
        let total: BigUint = counts.values().sum();
        assert_eq!(total, BigUint::from(16u32));
        // identity and anti-identity
        assert_eq!(counts[&IntVec::from(vec![1, 1, 1, 1])], BigUint::from(2u32));
        assert_eq!(counts[&IntVec::from(vec![0, 0, 0, 0])], BigUint::from(1u32));
    }

    #[test]
    fn test_zero_one_with_config() {
        let counter = DivideAndConquerCounter::zero_one_with_config(
            ContingencyTableProblem::new(3, 3).unwrap(),
            CountConfig::serial().with_eviction(EvictionPolicy::Lru { capacity: 4 }),
        )
        .unwrap();
        assert!(counter.is_zero_one());
        // 0/1 tables with every margin 1 are permutation matrices
        assert_eq!(counter.count_non_negative_solutions(&[1; 6]).unwrap(), BigUint::from(6u32));
        assert_eq!(counter.count_non_negative_solutions(&[2; 6]).unwrap(), BigUint::from(6u32));
        assert!(counter.count_non_negative_solutions(&[3; 6]).unwrap().is_one());
        assert!(counter.count_non_negative_solutions(&[4; 6]).unwrap().is_zero());
    }

    #[test]
    fn test_display() {
        let counter = DivideAndConquerCounter::new(GeneralProblem::from_rows(&[vec![1, 1]]).unwrap()).unwrap();
        assert_eq!(counter.to_string(), "dq((split(1\\1,2;terminal[1,1],terminal[1,1])))");
    }
}

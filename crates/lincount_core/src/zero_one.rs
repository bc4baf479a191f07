//! Even/odd counting
//!
//! Every non-negative integer solution splits uniquely as `x = z + 2y` with
//! `z` in `{0,1}^n` and `y >= 0`. Writing `r = A z`, this gives
//!
//! ```text
//! count(0) = 1
//! count(b) = Σ_{r ≡ b (mod 2), r <= b}  zo(r) · count((b - r) / 2)
//! ```
//!
//! where `zo(r)` is the number of 0/1 vectors `z` with `A z = r`. Each step
//! at least halves `b`, so the recursion depth is logarithmic in `max b`.
//!
//! The 0/1 table is grouped by residue class `r mod 2`. Only groups whose
//! residue is already in normal form are stored; a lookup normalizes the
//! residue of `b`, reads that group and maps its keys back through the
//! inverse permutation.

use crate::brute;
use crate::cache::{CacheStats, MemoCache};
use crate::config::CountConfig;
use crate::counter::{check_target, NonNegativeCounter};
use crate::divide::DivideAndConquerCounter;
use crate::error::{CountError, Result};
use crate::intvec::IntVec;
use crate::permutation::Permutation;
use crate::problem::CountingProblem;
use crate::sequence::{CubeSeq, Sequencer};
use crate::validate::check_matrix;
use num_bigint::BigUint;
use num_traits::{One, Zero};
use rustc_hash::FxHashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// How the table of 0/1 solution counts is produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ZeroOneSource {
    /// Walk all `2^n` vectors in `{0,1}^n`
    #[default]
    Enumerate,
    /// Count with a zero-one [`DivideAndConquerCounter`] over the box of
    /// reachable right-hand sides
    DivideAndConquer,
}

/// Every `b = A z` for `z` in `{0,1}^n`, with the number of such `z`
pub fn enumerate_zero_one_counts(problem: &dyn CountingProblem) -> FxHashMap<IntVec, BigUint> {
    let a = problem.matrix();
    let mut counts: FxHashMap<IntVec, BigUint> = FxHashMap::default();
    let seq = CubeSeq::new(a.cols(), 2);
    if let Some(mut z) = seq.first() {
        loop {
            let r = a.mul_vec(&z);
            if problem.admissible_b(&r) {
                *counts.entry(IntVec::from(r)).or_insert_with(BigUint::zero) += 1u32;
            }
            if !seq.advance(&mut z) {
                break;
            }
        }
    }
    counts
}

/// Read-only residue-class table of 0/1 solution counts
#[derive(Debug)]
pub struct ZeroOneStore {
    /// normalized residue -> (rhs, count) with that residue
    groups: FxHashMap<IntVec, Vec<(IntVec, BigUint)>>,
    entries: usize,
}

impl ZeroOneStore {
    /// Organize `counts` by residue, keeping only normalized residue groups.
    ///
    /// # Errors
    /// [`CountError::AsymmetricZeroOneTable`] if the counts are not invariant
    /// under the problem's normal-form permutations, which would make the
    /// thinned table lose information.
    pub fn build(problem: &dyn CountingProblem, counts: &FxHashMap<IntVec, BigUint>) -> Result<Self> {
        let mut group_sizes: FxHashMap<IntVec, usize> = FxHashMap::default();
        for (b, c) in counts {
            if !c.is_zero() {
                *group_sizes.entry(b.mod2()).or_insert(0) += 1;
            }
        }

        let mut groups: FxHashMap<IntVec, Vec<(IntVec, BigUint)>> = FxHashMap::default();
        let mut entries = 0;
        for (b, c) in counts {
            if c.is_zero() {
                continue;
            }
            let residue = b.mod2();
            let perm = problem.to_normal_form(&residue);
            let normal = IntVec::from(perm.apply(&residue));

            // the image of b in the normalized group must carry the same count
            let image = IntVec::from(perm.apply(b));
            if counts.get(&image) != Some(c)
                || group_sizes.get(&residue) != group_sizes.get(&normal)
            {
                return Err(CountError::AsymmetricZeroOneTable);
            }

            if residue == normal {
                groups.entry(residue).or_default().push((b.clone(), c.clone()));
                entries += 1;
            }
        }
        for group in groups.values_mut() {
            group.sort();
        }
        Ok(Self { groups, entries })
    }

    /// Stored (thinned) entries
    pub fn len(&self) -> usize {
        self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries == 0
    }

    /// Every `(r, zo(r))` with `r ≡ b (mod 2)`
    pub fn lookup(&self, problem: &dyn CountingProblem, b: &[i64]) -> Vec<(Vec<i64>, BigUint)> {
        let residue: Vec<i64> = b.iter().map(|v| v & 1).collect();
        let perm: Permutation = problem.to_normal_form(&residue);
        let normal = IntVec::from(perm.apply(&residue));
        match self.groups.get(&normal) {
            Some(group) => group
                .iter()
                .map(|(r, c)| (perm.apply_inverse(r), c.clone()))
                .collect(),
            None => Vec::new(),
        }
    }
}

/// Counts solutions with the even/odd recursion
pub struct ZeroOneCounter {
    problem: Arc<dyn CountingProblem>,
    store: ZeroOneStore,
    cache: MemoCache,
}

impl ZeroOneCounter {
    pub fn new<P: CountingProblem + 'static>(problem: P) -> Result<Self> {
        Self::with_config(problem, ZeroOneSource::default(), CountConfig::default())
    }

    pub fn with_config<P: CountingProblem + 'static>(
        problem: P,
        source: ZeroOneSource,
        config: CountConfig,
    ) -> Result<Self> {
        Self::from_shared(Arc::new(problem), source, config)
    }

    pub fn from_shared(
        problem: Arc<dyn CountingProblem>,
        source: ZeroOneSource,
        config: CountConfig,
    ) -> Result<Self> {
        check_matrix(problem.matrix())?;
        let start = Instant::now();
        let counts = match source {
            ZeroOneSource::Enumerate => enumerate_zero_one_counts(problem.as_ref()),
            ZeroOneSource::DivideAndConquer => {
                DivideAndConquerCounter::from_shared(Arc::clone(&problem), true, config.clone())?
                    .zero_one_solution_counts()
            }
        };
        let store = ZeroOneStore::build(problem.as_ref(), &counts)?;
        info!(
            source = ?source,
            reachable = counts.len(),
            stored = store.len(),
            elapsed = start.elapsed().as_secs_f64(),
            "built zero/one store"
        );
        if config.cross_check_enabled() {
            for (b, c) in &counts {
                assert_eq!(&brute::enumerate(problem.matrix(), b, true), c, "zero/one count for {}", b);
            }
        }
        Ok(Self {
            problem,
            store,
            cache: config.new_cache(),
        })
    }

    pub fn store(&self) -> &ZeroOneStore {
        &self.store
    }

    /// `b` non-negative and of the right length
    fn count_checked(&self, b: &[i64]) -> BigUint {
        if self.obviously_empty(b) {
            return BigUint::zero();
        }
        if b.iter().all(|&v| v == 0) {
            return BigUint::one();
        }
        let perm = self.problem.to_normal_form(b);
        let normal = IntVec::from(perm.apply(b));
        self.cache.get_or_compute(normal.clone(), || self.eval(&normal))
    }

    /// `b` normalized, admissible and non-zero
    fn eval(&self, b: &[i64]) -> BigUint {
        let mut total = BigUint::zero();
        let mut half = vec![0; b.len()];
        for (r, multiplicity) in self.store.lookup(self.problem.as_ref(), b) {
            if r.iter().zip(b).any(|(ri, bi)| ri > bi) {
                continue;
            }
            for i in 0..b.len() {
                half[i] = (b[i] - r[i]) >> 1;
            }
            if half.iter().all(|&v| v == 0) {
                total += multiplicity;
            } else {
                let sub = self.count_checked(&half);
                if !sub.is_zero() {
                    total += multiplicity * sub;
                }
            }
        }
        total
    }
}

impl NonNegativeCounter for ZeroOneCounter {
    fn count_non_negative_solutions(&self, b: &[i64]) -> Result<BigUint> {
        check_target(b, self.problem.matrix().rows())?;
        Ok(self.count_checked(b))
    }

    fn obviously_empty(&self, b: &[i64]) -> bool {
        !self.problem.admissible_b(b)
    }

    fn cache_len(&self) -> usize {
        self.cache.len()
    }

    fn clear_cache(&self) {
        self.cache.clear()
    }

    fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

impl std::fmt::Display for ZeroOneCounter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (m, n) = self.problem.matrix().dims();
        write!(f, "zo({},{})", m, n)
    }
}

//! Square contingency tables by semi-regular halves
//!
//! An `n × n` table whose rows and columns all sum to `t` is cut into its
//! first `n/2` columns and the rest. The left half has `n/2` columns summing
//! to `t` and some row totals `x`; the right half then has row totals
//! `t - x`. Both halves are symmetric under reordering their rows, so only
//! sorted `x` are visited, each weighted by its number of orderings:
//!
//! ```text
//! count(n, t) = Σ_{x sorted, Σx = (n/2)·t} perms(x) · semi(n/2, t, x) · semi(n - n/2, t, t - x)
//! ```
//!
//! A semi-regular table (`k` columns summing to `t`, row totals `r`) is cut
//! the same way across its rows, which leaves ordinary contingency tables
//! with small margins. Those go to per-shape sub-counters that are built
//! once and shared by every query.

use crate::cache::lock;
use crate::config::CountConfig;
use crate::counter::NonNegativeCounter;
use crate::divide::DivideAndConquerCounter;
use crate::error::{CountError, Result};
use crate::problem::ContingencyTableProblem;
use crate::sequence::{OrderedSumSeq, Sequencer};
use crate::zero_one::{ZeroOneCounter, ZeroOneSource};
use num_bigint::BigUint;
use num_traits::{One, Zero};
use rustc_hash::FxHashMap;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tracing::{debug, info};

/// Shapes with at most this many cells use the even/odd counter
const ZERO_ONE_MAX_CELLS: usize = 28;

/// Counter for one table shape
struct SubCounter {
    problem: ContingencyTableProblem,
    counter: Box<dyn NonNegativeCounter>,
}

impl SubCounter {
    fn build(rows: usize, cols: usize, config: &CountConfig) -> Result<Self> {
        let problem = ContingencyTableProblem::new(rows, cols)?;
        let shared = Arc::new(problem.clone());
        let counter: Box<dyn NonNegativeCounter> = if rows * cols <= ZERO_ONE_MAX_CELLS {
            Box::new(ZeroOneCounter::from_shared(
                shared,
                ZeroOneSource::DivideAndConquer,
                config.clone(),
            )?)
        } else {
            Box::new(DivideAndConquerCounter::from_shared(shared, false, config.clone())?)
        };
        debug!(rows, cols, "built table sub-counter");
        Ok(Self { problem, counter })
    }
}

/// The sub-counters one query needs: shapes `a×a`, `a×b` and `b×b` with
/// `a = n/2` and `b = n - a`
struct Halves {
    small: usize,
    /// indexed by `[rows - small][cols - small]`, rows <= cols
    shapes: [[Option<Arc<SubCounter>>; 2]; 2],
}

impl Halves {
    fn get(&self, rows: usize, cols: usize) -> &SubCounter {
        match &self.shapes[rows - self.small][cols - self.small] {
            Some(c) => c,
            None => unreachable!("no sub-counter for a {}x{} table", rows, cols),
        }
    }

    /// Tables with the given margins, in whichever orientation the shared
    /// sub-counters hold
    fn count_tables(&self, row_totals: &[i64], col_totals: &[i64]) -> BigUint {
        let mut rows = row_totals.to_vec();
        let mut cols = col_totals.to_vec();
        rows.sort_unstable();
        cols.sort_unstable();
        let swap = if rows.len() != cols.len() {
            rows.len() > cols.len()
        } else {
            rows > cols
        };
        if swap {
            std::mem::swap(&mut rows, &mut cols);
        }
        let sub = self.get(rows.len(), cols.len());
        match sub.problem.encode_b(&rows, &cols) {
            Some(b) => match sub.counter.count_non_negative_solutions(&b) {
                Ok(n) => n,
                Err(e) => unreachable!("table margins are non-negative and well formed: {}", e),
            },
            None => unreachable!("sub-counter shape mismatch"),
        }
    }

    /// Tables with `cols` columns each summing to `col_total` and the given
    /// row totals
    fn count_semi(&self, cols: usize, col_total: i64, row_totals: &[i64]) -> BigUint {
        let (top, bottom) = row_totals.split_at(row_totals.len() / 2);
        let seq = OrderedSumSeq::new(cols, col_total, top.iter().sum());
        let mut total = BigUint::zero();
        let mut y = vec![0; cols];
        if let Some(mut x) = seq.first() {
            loop {
                let upper = self.count_tables(top, &x);
                if !upper.is_zero() {
                    for (yi, xi) in y.iter_mut().zip(&x) {
                        *yi = col_total - xi;
                    }
                    let lower = self.count_tables(bottom, &y);
                    if !lower.is_zero() {
                        total += OrderedSumSeq::permutations(&x) * upper * lower;
                    }
                }
                if !seq.advance(&mut x) {
                    break;
                }
            }
        }
        total
    }
}

/// Counts `n × n` tables with every row and column summing to `total`
pub struct SquareTableCounter {
    config: CountConfig,
    sub_counters: Mutex<FxHashMap<(usize, usize), Arc<SubCounter>>>,
}

impl SquareTableCounter {
    /// The outer sum of each query follows `config`; sub-counters always
    /// run serially
    pub fn new(config: CountConfig) -> Self {
        Self {
            config,
            sub_counters: Mutex::new(FxHashMap::default()),
        }
    }

    fn sub_counter(&self, rows: usize, cols: usize) -> Result<Arc<SubCounter>> {
        let mut map = lock(&self.sub_counters);
        if let Some(c) = map.get(&(rows, cols)) {
            return Ok(Arc::clone(c));
        }
        let config = CountConfig {
            parallel: false,
            ..self.config.clone()
        };
        let c = Arc::new(SubCounter::build(rows, cols, &config)?);
        map.insert((rows, cols), Arc::clone(&c));
        Ok(c)
    }

    fn halves(&self, n: usize) -> Result<Halves> {
        let small = n / 2;
        let large = n - small;
        let mut shapes: [[Option<Arc<SubCounter>>; 2]; 2] = Default::default();
        for rows in small..=large {
            for cols in rows..=large {
                shapes[rows - small][cols - small] = Some(self.sub_counter(rows, cols)?);
            }
        }
        Ok(Halves { small, shapes })
    }

    /// Number of `n × n` non-negative integer tables with all row and
    /// column sums equal to `total`.
    ///
    /// # Errors
    /// [`CountError::InvalidProblem`] if `n == 0`.
    pub fn count_sq_tables(&self, n: usize, total: i64) -> Result<BigUint> {
        if n == 0 {
            return Err(CountError::InvalidProblem("square table must be at least 1x1".to_string()));
        }
        if total < 0 {
            return Ok(BigUint::zero());
        }
        if total == 0 || n == 1 {
            return Ok(BigUint::one());
        }

        let start = Instant::now();
        let halves = self.halves(n)?;
        let left = n / 2;
        let right = n - left;
        let seq = OrderedSumSeq::new(n, total, left as i64 * total);
        let term = |x: &[i64]| -> BigUint {
            let left_count = halves.count_semi(left, total, x);
            if left_count.is_zero() {
                return left_count;
            }
            let mut y: Vec<i64> = x.iter().map(|v| total - v).collect();
            y.sort_unstable();
            let right_count = halves.count_semi(right, total, &y);
            OrderedSumSeq::permutations(x) * left_count * right_count
        };
        let count = self.config.top_reducer().reduce(&term, &seq);
        info!(
            n,
            total,
            elapsed = start.elapsed().as_secs_f64(),
            cache = self.cache_len(),
            "counted square tables"
        );
        Ok(count)
    }

    /// Memoized entries per sub-counter shape, sorted by shape
    pub fn cache_sizes(&self) -> Vec<((usize, usize), usize)> {
        let map = lock(&self.sub_counters);
        let mut sizes: Vec<_> = map.iter().map(|(&shape, c)| (shape, c.counter.cache_len())).collect();
        sizes.sort_unstable();
        sizes
    }

    pub fn cache_len(&self) -> usize {
        self.cache_sizes().iter().map(|(_, n)| n).sum()
    }

    pub fn clear_cache(&self) {
        for c in lock(&self.sub_counters).values() {
            c.counter.clear_cache();
        }
    }
}

impl Default for SquareTableCounter {
    fn default() -> Self {
        Self::new(CountConfig::default())
    }
}

impl std::fmt::Debug for SquareTableCounter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SquareTableCounter")
            .field("config", &self.config)
            .field("cache_sizes", &self.cache_sizes())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trivial_cases() {
        let c = SquareTableCounter::new(CountConfig::serial());
        assert_eq!(c.count_sq_tables(1, 7).unwrap(), BigUint::one());
        assert_eq!(c.count_sq_tables(5, 0).unwrap(), BigUint::one());
        assert!(c.count_sq_tables(3, -1).unwrap().is_zero());
        assert!(matches!(c.count_sq_tables(0, 1), Err(CountError::InvalidProblem(_))));
        // nothing built for the short cuts
        assert!(c.cache_sizes().is_empty());
    }

    #[test]
    fn test_small_squares() {
        let c = SquareTableCounter::new(CountConfig::serial());
        // permutation matrices
        assert_eq!(c.count_sq_tables(3, 1).unwrap(), BigUint::from(6u32));
        assert_eq!(c.count_sq_tables(2, 5).unwrap(), BigUint::from(6u32));
        assert_eq!(c.count_sq_tables(3, 3).unwrap(), BigUint::from(55u32));
    }

    #[test]
    fn test_semi_table_count() {
        let c = SquareTableCounter::new(CountConfig::serial());
        let halves = c.halves(4).unwrap();
        // 4 rows with totals 0,0,1,1 and 2 columns summing to 1
        assert_eq!(halves.count_semi(2, 1, &[0, 0, 1, 1]), BigUint::from(2u32));
        assert_eq!(halves.count_tables(&[2, 1], &[1, 2]), BigUint::from(2u32));
    }

    #[test]
    fn test_parallel_matches_serial_and_reuses_sub_counters() {
        let serial = SquareTableCounter::new(CountConfig::serial());
        let parallel = SquareTableCounter::new(CountConfig::parallel(4));
        for t in 0..=4 {
            assert_eq!(
                serial.count_sq_tables(5, t).unwrap(),
                parallel.count_sq_tables(5, t).unwrap(),
                "t = {}",
                t
            );
        }
        let shapes: Vec<(usize, usize)> = serial.cache_sizes().into_iter().map(|(s, _)| s).collect();
        assert_eq!(shapes, vec![(2, 2), (2, 3), (3, 3)]);
        assert!(serial.cache_len() > 0);
        serial.clear_cache();
        assert_eq!(serial.cache_len(), 0);
    }
}

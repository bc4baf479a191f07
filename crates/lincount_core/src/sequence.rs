//! Sequencers: deterministic walks over integer vectors
//!
//! A [`Sequencer`] produces a first vector and then mutates it in place to
//! each successor, the way an odometer ticks. Walks are lexicographic with
//! the right-most coordinate moving fastest, so two runs over the same
//! sequencer visit exactly the same vectors in the same order.
//!
//! Sequencers are shared read-only between worker threads; all iteration
//! state lives in the caller's buffer.

use num_bigint::BigUint;
use num_traits::One;

/// Deterministic iteration over integer vectors
pub trait Sequencer: Send + Sync {
    /// First vector of the walk, or `None` if the walk is empty
    fn first(&self) -> Option<Vec<i64>>;

    /// Move `x` to its successor. Returns `false` once the walk is over,
    /// after which the contents of `x` are unspecified.
    fn advance(&self, x: &mut [i64]) -> bool;
}

/// The one-dimensional walk `[a], [a+1], ..., [b-1]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeSeq {
    pub start: i64,
    pub end: i64,
}

impl RangeSeq {
    pub fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    /// Number of values visited
    pub fn len(&self) -> usize {
        (self.end - self.start).max(0) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Sequencer for RangeSeq {
    fn first(&self) -> Option<Vec<i64>> {
        (self.start < self.end).then(|| vec![self.start])
    }

    fn advance(&self, x: &mut [i64]) -> bool {
        x[0] += 1;
        x[0] < self.end
    }
}

/// Every `x` with `lower <= x <= upper` coordinatewise.
///
/// Only the first `iter_dim` coordinates move; the remaining ones are held
/// at `lower` so callers can reserve trailing slots for their own use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundedSeq {
    lower: Vec<i64>,
    upper: Vec<i64>,
    iter_dim: usize,
}

impl BoundedSeq {
    pub fn new(lower: Vec<i64>, upper: Vec<i64>) -> Self {
        let iter_dim = lower.len();
        Self::with_iter_dim(lower, upper, iter_dim)
    }

    /// Walk from zero up to `upper`
    pub fn up_to(upper: Vec<i64>) -> Self {
        Self::new(vec![0; upper.len()], upper)
    }

    pub fn with_iter_dim(lower: Vec<i64>, upper: Vec<i64>, iter_dim: usize) -> Self {
        assert_eq!(lower.len(), upper.len(), "bound dimensions differ");
        assert!(iter_dim <= lower.len());
        Self {
            lower,
            upper,
            iter_dim,
        }
    }
}

impl Sequencer for BoundedSeq {
    fn first(&self) -> Option<Vec<i64>> {
        let empty = (0..self.iter_dim).any(|i| self.lower[i] > self.upper[i]);
        (!empty).then(|| self.lower.clone())
    }

    fn advance(&self, x: &mut [i64]) -> bool {
        for i in (0..self.iter_dim).rev() {
            if x[i] < self.upper[i] {
                x[i] += 1;
                return true;
            }
            x[i] = self.lower[i];
        }
        false
    }
}

/// Every `x` in `{0, ..., bound-1}^dim`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CubeSeq {
    pub dim: usize,
    pub bound: i64,
}

impl CubeSeq {
    pub fn new(dim: usize, bound: i64) -> Self {
        Self { dim, bound }
    }
}

impl Sequencer for CubeSeq {
    fn first(&self) -> Option<Vec<i64>> {
        (self.bound > 0 || self.dim == 0).then(|| vec![0; self.dim])
    }

    fn advance(&self, x: &mut [i64]) -> bool {
        for i in (0..x.len()).rev() {
            if x[i] < self.bound - 1 {
                x[i] += 1;
                return true;
            }
            x[i] = 0;
        }
        false
    }
}

/// Every non-decreasing `x` of length `dim` with `0 <= x_i <= bound` and
/// `sum(x) == total`, in lexicographic order.
///
/// Each vector stands for [`OrderedSumSeq::permutations`] distinct
/// rearrangements of itself, so a sum of a symmetric function over all
/// vectors with that total can walk the sorted representatives only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderedSumSeq {
    pub dim: usize,
    pub bound: i64,
    pub total: i64,
}

impl OrderedSumSeq {
    pub fn new(dim: usize, bound: i64, total: i64) -> Self {
        Self { dim, bound, total }
    }

    /// Number of distinct orderings of the sorted vector `x`
    pub fn permutations(x: &[i64]) -> BigUint {
        let mut denom = BigUint::one();
        let mut run = 0;
        for (i, v) in x.iter().enumerate() {
            run = if i > 0 && x[i - 1] == *v { run + 1 } else { 1 };
            denom *= run as u64;
        }
        factorial(x.len()) / denom
    }

    /// Smallest completion of `x[from..]` with entries `>= lo` summing to
    /// `remaining`
    fn fill(&self, x: &mut [i64], from: usize, mut lo: i64, mut remaining: i64) -> bool {
        let d = x.len();
        for i in from..d {
            let slots = (d - i) as i64;
            if remaining < slots * lo || remaining > slots * self.bound {
                return false;
            }
            let v = lo.max(remaining - (slots - 1) * self.bound);
            x[i] = v;
            lo = v;
            remaining -= v;
        }
        remaining == 0
    }
}

fn factorial(n: usize) -> BigUint {
    (1..=n as u64).fold(BigUint::one(), |acc, k| acc * k)
}

impl Sequencer for OrderedSumSeq {
    fn first(&self) -> Option<Vec<i64>> {
        if self.bound < 0 || self.total < 0 {
            return None;
        }
        let mut x = vec![0; self.dim];
        self.fill(&mut x, 0, 0, self.total).then_some(x)
    }

    fn advance(&self, x: &mut [i64]) -> bool {
        let d = x.len();
        if d < 2 {
            return false;
        }
        // the last coordinate is fixed by the total
        let mut prefix: i64 = x[..d - 1].iter().sum();
        for i in (0..d - 1).rev() {
            prefix -= x[i];
            let v = x[i] + 1;
            let remaining = self.total - prefix;
            if v <= self.bound && (d - i) as i64 * v <= remaining && self.fill(x, i + 1, v, remaining - v) {
                x[i] = v;
                return true;
            }
        }
        false
    }
}

/// Collect a whole walk, mostly useful in tests and diagnostics
pub fn collect(seq: &dyn Sequencer) -> Vec<Vec<i64>> {
    let mut out = Vec::new();
    if let Some(mut x) = seq.first() {
        loop {
            out.push(x.clone());
            if !seq.advance(&mut x) {
                break;
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range() {
        assert_eq!(collect(&RangeSeq::new(2, 5)), vec![vec![2], vec![3], vec![4]]);
        assert!(collect(&RangeSeq::new(3, 3)).is_empty());
        assert_eq!(RangeSeq::new(-1, 4).len(), 5);
    }

    #[test]
    fn test_bounded_is_lexicographic() {
        let seq = BoundedSeq::new(vec![1, 0], vec![2, 2]);
        assert_eq!(
            collect(&seq),
            vec![
                vec![1, 0],
                vec![1, 1],
                vec![1, 2],
                vec![2, 0],
                vec![2, 1],
                vec![2, 2]
            ]
        );
        assert!(BoundedSeq::new(vec![3], vec![2]).first().is_none());
    }

    #[test]
    fn test_bounded_iter_dim_holds_tail() {
        let seq = BoundedSeq::with_iter_dim(vec![0, 0, 7], vec![1, 1, 9], 2);
        let walk = collect(&seq);
        assert_eq!(walk.len(), 4);
        assert!(walk.iter().all(|x| x[2] == 7));

        // no moving coordinates: a single vector
        let fixed = BoundedSeq::with_iter_dim(vec![5], vec![5], 0);
        assert_eq!(collect(&fixed), vec![vec![5]]);
    }

    #[test]
    fn test_cube() {
        assert_eq!(collect(&CubeSeq::new(3, 4)).len(), 64);
        assert_eq!(collect(&CubeSeq::new(2, 2)).last(), Some(&vec![1, 1]));
        assert!(collect(&CubeSeq::new(2, 0)).is_empty());
    }

    #[test]
    fn test_ordered_sum_walk() {
        let walk = collect(&OrderedSumSeq::new(4, 3, 5));
        assert!(walk.iter().all(|x| x.windows(2).all(|w| w[0] <= w[1])));
        assert!(walk.iter().all(|x| x.iter().sum::<i64>() == 5 && x[3] <= 3));
        assert!(walk.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(walk.first(), Some(&vec![0, 0, 2, 3]));
        assert_eq!(walk.last(), Some(&vec![1, 1, 1, 2]));
    }

    #[test]
    fn test_ordered_sum_permutations_cover_cube() {
        // weighted sorted vectors count every vector with that total once
        for total in 0..=9 {
            let seq = OrderedSumSeq::new(4, 3, total);
            let weighted: BigUint = collect(&seq).iter().map(|x| OrderedSumSeq::permutations(x)).sum();
            let direct = collect(&CubeSeq::new(4, 4))
                .iter()
                .filter(|x| x.iter().sum::<i64>() == total)
                .count();
            assert_eq!(weighted, BigUint::from(direct), "total = {}", total);
        }
        assert_eq!(OrderedSumSeq::permutations(&[0, 0, 1, 1]), BigUint::from(6u32));
        assert_eq!(OrderedSumSeq::permutations(&[]), BigUint::one());
    }

    #[test]
    fn test_ordered_sum_edges() {
        assert!(OrderedSumSeq::new(2, 1, 3).first().is_none());
        assert!(OrderedSumSeq::new(2, 1, -1).first().is_none());
        assert_eq!(collect(&OrderedSumSeq::new(1, 4, 4)), vec![vec![4]]);
        assert_eq!(collect(&OrderedSumSeq::new(0, 4, 0)), vec![Vec::<i64>::new()]);
        assert_eq!(collect(&OrderedSumSeq::new(3, 5, 0)), vec![vec![0, 0, 0]]);
    }
}

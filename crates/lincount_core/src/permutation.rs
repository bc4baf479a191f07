//! Permutations used to bring right-hand sides into canonical form
//!
//! A permutation `p` of `{0..n-1}` moves entry `i` of a vector to position
//! `p[i]`. Composition follows the left-to-right convention
//! `(T∘P)(x) = P(T(x))`.

use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Permutation {
    perm: Box<[usize]>,
}

impl Permutation {
    /// Build from an image table; `perm` must be a bijection on `0..len`.
    ///
    /// # Panics
    /// If `perm` is not a permutation.
    pub fn new(perm: Vec<usize>) -> Self {
        let n = perm.len();
        let mut seen = vec![false; n];
        for &p in &perm {
            assert!(p < n && !seen[p], "not a permutation: {:?}", perm);
            seen[p] = true;
        }
        Self { perm: perm.into() }
    }

    pub fn identity(n: usize) -> Self {
        Self {
            perm: (0..n).collect(),
        }
    }

    pub fn dim(&self) -> usize {
        self.perm.len()
    }

    pub fn is_identity(&self) -> bool {
        self.perm.iter().enumerate().all(|(i, &p)| i == p)
    }

    /// Image of index `i`
    pub fn image(&self, i: usize) -> usize {
        self.perm[i]
    }

    /// `r[p[i]] = x[i]`
    pub fn apply<T: Copy + Default>(&self, x: &[T]) -> Vec<T> {
        debug_assert_eq!(x.len(), self.perm.len());
        let mut r = vec![T::default(); x.len()];
        for (i, &p) in self.perm.iter().enumerate() {
            r[p] = x[i];
        }
        r
    }

    /// `r[i] = x[p[i]]`, so `apply_inverse(apply(x)) == x`
    pub fn apply_inverse<T: Copy>(&self, x: &[T]) -> Vec<T> {
        debug_assert_eq!(x.len(), self.perm.len());
        self.perm.iter().map(|&p| x[p]).collect()
    }

    pub fn inverse(&self) -> Self {
        let mut inv = vec![0; self.perm.len()];
        for (i, &p) in self.perm.iter().enumerate() {
            inv[p] = i;
        }
        Self { perm: inv.into() }
    }

    /// Permutation `r` with `r.apply(x) == other.apply(self.apply(x))`
    pub fn compose(&self, other: &Permutation) -> Permutation {
        assert_eq!(self.dim(), other.dim());
        Self {
            perm: self.perm.iter().map(|&p| other.perm[p]).collect(),
        }
    }

    /// Permutation of length `total_len` that stably sorts `values[from..to]`
    /// into non-decreasing order and fixes every other index.
    ///
    /// Ties keep their original relative order, so equal inputs always give
    /// bit-identical canonical results.
    pub fn sorting_perm(values: &[i64], from: usize, to: usize, total_len: usize) -> Self {
        assert!(from <= to && to <= total_len && to <= values.len());
        let mut perm: Vec<usize> = (0..total_len).collect();
        let mut order: Vec<usize> = (from..to).collect();
        order.sort_by_key(|&i| (values[i], i));
        for (k, &orig) in order.iter().enumerate() {
            perm[orig] = from + k;
        }
        Self { perm: perm.into() }
    }
}

impl fmt::Display for Permutation {
    /// Cycle notation, fixed points omitted
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut pending: BTreeSet<usize> = (0..self.perm.len()).collect();
        while let Some(k) = pending.pop_first() {
            if self.perm[k] == k {
                continue;
            }
            write!(f, "({}", k)?;
            let mut pt = self.perm[k];
            while pending.remove(&pt) {
                write!(f, " {}", pt)?;
                pt = self.perm[pt];
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}

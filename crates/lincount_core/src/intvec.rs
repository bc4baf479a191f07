//! Immutable integer vectors used as cache keys

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;

use rustc_hash::FxHasher;

/// Immutable integer vector with a precomputed hash.
///
/// Ordering is lexicographic (shorter vectors first on a common prefix), and
/// equality is by value, so the ordering agrees with hash equality.
#[derive(Clone)]
pub struct IntVec {
    data: Box<[i64]>,
    hash: u64,
}

impl IntVec {
    pub fn new(data: impl Into<Box<[i64]>>) -> Self {
        let data = data.into();
        let mut hasher = FxHasher::default();
        data.hash(&mut hasher);
        Self {
            hash: hasher.finish(),
            data,
        }
    }

    pub fn zeros(dim: usize) -> Self {
        Self::new(vec![0; dim])
    }

    pub fn dim(&self) -> usize {
        self.data.len()
    }

    pub fn as_slice(&self) -> &[i64] {
        &self.data
    }

    /// The precomputed hash, also used to pick a cache shard
    pub fn hash_code(&self) -> u64 {
        self.hash
    }

    pub fn is_zero(&self) -> bool {
        self.data.iter().all(|&v| v == 0)
    }

    pub fn sum(&self) -> i64 {
        self.data.iter().sum()
    }

    /// Coordinatewise residue modulo 2 (entries are expected non-negative)
    pub fn mod2(&self) -> IntVec {
        IntVec::new(self.data.iter().map(|v| v & 1).collect::<Vec<_>>())
    }
}

impl Deref for IntVec {
    type Target = [i64];

    fn deref(&self) -> &[i64] {
        &self.data
    }
}

impl From<Vec<i64>> for IntVec {
    fn from(v: Vec<i64>) -> Self {
        Self::new(v)
    }
}

impl From<&[i64]> for IntVec {
    fn from(v: &[i64]) -> Self {
        Self::new(v.to_vec())
    }
}

impl PartialEq for IntVec {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash && self.data == other.data
    }
}

impl Eq for IntVec {}

impl Hash for IntVec {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash);
    }
}

impl PartialOrd for IntVec {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for IntVec {
    fn cmp(&self, other: &Self) -> Ordering {
        self.data.cmp(&other.data)
    }
}

impl fmt::Debug for IntVec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IntVec{}", self)
    }
}

impl fmt::Display for IntVec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, v) in self.data.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", v)?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{BTreeSet, HashSet};

    #[test]
    fn test_value_semantics() {
        let a = IntVec::from(vec![1, 2, 3]);
        let b = IntVec::from(&[1, 2, 3][..]);
        assert_eq!(a, b);
        assert_eq!(a.hash_code(), b.hash_code());

        let set: HashSet<IntVec> = [a.clone(), b, IntVec::from(vec![3, 2, 1])].into_iter().collect();
        assert_eq!(set.len(), 2);
        assert_eq!(a.to_string(), "[1, 2, 3]");
    }

    #[test]
    fn test_hash_is_fx() {
        let mut hasher = FxHasher::default();
        [4i64, -1, 7][..].hash(&mut hasher);
        assert_eq!(IntVec::from(vec![4, -1, 7]).hash_code(), hasher.finish());
    }

    #[test]
    fn test_lexicographic_order() {
        let mut set = BTreeSet::new();
        set.insert(IntVec::from(vec![1, 2]));
        set.insert(IntVec::from(vec![0, 9]));
        set.insert(IntVec::from(vec![1, 1]));
        set.insert(IntVec::from(vec![1]));
        let order: Vec<Vec<i64>> = set.iter().map(|v| v.to_vec()).collect();
        assert_eq!(order, vec![vec![0, 9], vec![1], vec![1, 1], vec![1, 2]]);
    }

    #[test]
    fn test_helpers() {
        let v = IntVec::from(vec![3, 0, 4]);
        assert_eq!(v.mod2().as_slice(), &[1, 0, 0]);
        assert_eq!(v.sum(), 7);
        assert!(!v.is_zero());
        assert!(IntVec::zeros(4).is_zero());
    }
}

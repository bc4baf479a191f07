//! The counting front end shared by every algorithm

use crate::cache::CacheStats;
use crate::error::{CountError, Result};
use num_bigint::BigUint;

/// Counts non-negative integer solutions of `A x = b` for a fixed `A`
pub trait NonNegativeCounter: Send + Sync {
    /// Number of `x >= 0` (integral) with `A x = b`.
    ///
    /// # Errors
    /// [`CountError::DimensionMismatch`] if `b` has the wrong length and
    /// [`CountError::NegativeTarget`] if any entry is negative. Right-hand
    /// sides that simply have no solutions return `Ok(0)`.
    fn count_non_negative_solutions(&self, b: &[i64]) -> Result<BigUint>;

    /// Cheap test: `true` means the count is certainly zero. Returning
    /// `false` is always safe.
    fn obviously_empty(&self, b: &[i64]) -> bool;

    /// Memoized entries across all caches (best effort)
    fn cache_len(&self) -> usize {
        0
    }

    /// Drop every memoized entry (best effort)
    fn clear_cache(&self) {}

    fn cache_stats(&self) -> CacheStats {
        CacheStats::default()
    }
}

/// Reject right-hand sides of the wrong shape or with negative entries
pub fn check_target(b: &[i64], rows: usize) -> Result<()> {
    if b.len() != rows {
        return Err(CountError::DimensionMismatch {
            expected: rows,
            actual: b.len(),
        });
    }
    match b.iter().position(|&v| v < 0) {
        Some(index) => Err(CountError::NegativeTarget {
            index,
            value: b[index],
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_target() {
        assert_eq!(check_target(&[0, 3], 2), Ok(()));
        assert_eq!(
            check_target(&[1, -2, -1], 3),
            Err(CountError::NegativeTarget { index: 1, value: -2 })
        );
        assert_eq!(
            check_target(&[1], 2),
            Err(CountError::DimensionMismatch {
                expected: 2,
                actual: 1
            })
        );
    }
}

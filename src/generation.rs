//! Structural-modification counter backing the fail-fast cursors.
//!
//! Each collection embeds one `Generation` and bumps it on every
//! structural mutation. A cursor copies a `Stamp` when it is created and
//! hands it back on every call; a mismatch means the collection was
//! mutated by some route other than that cursor.
//!
//! Every `Generation` also carries a process-unique owner id, so a stamp
//! taken from one collection is rejected by any other, even when their
//! version counters happen to agree.

use crate::error::{CollectionError, Result};
use core::sync::atomic::{AtomicU64, Ordering};

static NEXT_OWNER: AtomicU64 = AtomicU64::new(1);

/// Per-instance version counter. Embed in a collection and call
/// `bump()` from every mutating entry point.
#[derive(Debug)]
pub struct Generation {
    owner: u64,
    value: u64,
}

/// Copy of a `Generation` taken at a point in time.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Stamp {
    owner: u64,
    value: u64,
}

impl Default for Generation {
    fn default() -> Self {
        Self::new()
    }
}

impl Generation {
    /// A fresh counter at version 0 with an owner id no other live or
    /// future `Generation` shares.
    pub fn new() -> Self {
        Self {
            owner: NEXT_OWNER.fetch_add(1, Ordering::Relaxed),
            value: 0,
        }
    }

    #[inline]
    pub fn bump(&mut self) {
        self.value = self.value.wrapping_add(1);
    }

    #[inline]
    pub fn current(&self) -> u64 {
        self.value
    }

    #[inline]
    pub fn stamp(&self) -> Stamp {
        Stamp {
            owner: self.owner,
            value: self.value,
        }
    }

    /// Fails with `WrongCollection` when `stamp` came from another
    /// collection, and with `ConcurrentModification` unless it was taken
    /// at the current generation.
    #[inline]
    pub fn verify(&self, stamp: Stamp) -> Result<()> {
        if stamp.owner != self.owner {
            tracing::trace!(
                stamp_owner = stamp.owner,
                owner = self.owner,
                "cursor used on a foreign collection"
            );
            return Err(CollectionError::WrongCollection);
        }
        if stamp.value == self.value {
            return Ok(());
        }
        tracing::trace!(
            expected = stamp.value,
            found = self.value,
            "stale cursor detected"
        );
        Err(CollectionError::ConcurrentModification {
            expected: stamp.value,
            found: self.value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_stamp_verifies() {
        let g = Generation::new();
        let s = g.stamp();
        assert!(g.verify(s).is_ok());
    }

    #[test]
    fn bump_invalidates_older_stamps() {
        let mut g = Generation::new();
        let s = g.stamp();
        g.bump();
        assert_eq!(
            g.verify(s),
            Err(CollectionError::ConcurrentModification {
                expected: 0,
                found: 1
            })
        );
        assert!(g.verify(g.stamp()).is_ok());
    }

    /// Invariant: equal versions on two generations never make their stamps interchangeable.
    #[test]
    fn stamps_are_bound_to_their_owner() {
        let a = Generation::new();
        let b = Generation::new();
        assert_eq!(a.current(), b.current());
        assert_eq!(b.verify(a.stamp()), Err(CollectionError::WrongCollection));
        assert_eq!(a.verify(b.stamp()), Err(CollectionError::WrongCollection));
    }

    #[test]
    fn counter_wraps_instead_of_overflowing() {
        let mut g = Generation::new();
        g.value = u64::MAX;
        g.bump();
        assert_eq!(g.current(), 0);
    }
}

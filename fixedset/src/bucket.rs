//! Second-level tables
//!
//! A [`PendingBucket`] collects the keys that one top-level hash assigned to
//! it. When that hash meets the space bound, each pending bucket is consumed
//! by [`PendingBucket::initialize()`] to produce a [`Bucket`]: a table with
//! `k * k` slots for its `k` keys and a private hash that sends each of those
//! keys to a different slot.
//!
//! With `k * k` slots the expected number of colliding pairs under a random
//! member of the family is below one half, so each placement attempt succeeds
//! with probability above one half.

use crate::hash::UniversalHash;
use rand_core::RngCore;
use std::num::NonZeroU32;
use tracing::trace;

/// Keys assigned to one bucket by the top-level hash currently under test
#[derive(Debug, Default, Clone)]
pub(crate) struct PendingBucket {
    /// Keys in the order they were added. Never contains duplicates, since
    /// the top-level table only partitions distinct keys.
    keys: Vec<i64>,
}

impl PendingBucket {
    /// Create an empty bucket.
    pub(crate) fn new() -> Self {
        Default::default()
    }

    /// Append a key that hashes to this bucket.
    #[inline(always)]
    pub(crate) fn add_key(&mut self, key: i64) {
        self.keys.push(key);
    }

    /// Forget all keys, before partitioning again with a new top-level hash.
    pub(crate) fn clear_keys(&mut self) {
        self.keys.clear();
    }

    /// Number of keys collected so far
    pub(crate) fn len(&self) -> usize {
        self.keys.len()
    }

    /// Number of slots this bucket will occupy once finalized
    pub(crate) fn slots(&self) -> usize {
        self.len().saturating_mul(self.len())
    }

    /// Finalize the bucket, searching for a collision-free hash.
    ///
    /// Each attempt samples new coefficients and places every key from the
    /// start. Returns `Err(())` if all `max_attempts` attempts had a collision.
    pub(crate) fn initialize<R: RngCore>(
        self,
        rng: &mut R,
        max_attempts: NonZeroU32,
    ) -> Result<Bucket, ()> {
        if self.keys.is_empty() {
            return Ok(Bucket::Empty);
        }
        let mut slots = vec![None; self.slots()].into_boxed_slice();
        for attempt in 1..=max_attempts.get() {
            let hash = UniversalHash::sample(rng);
            if place(&hash, &self.keys, &mut slots).is_ok() {
                trace!(keys = self.keys.len(), attempt, "bucket placed");
                return Ok(Bucket::Table { hash, slots });
            }
            slots.fill(None);
        }
        Err(())
    }
}

/// Run one placement pass, stopping at the first collision.
///
/// On `Err(())` the slots are left partially filled and must be reset.
#[inline(always)]
fn place(hash: &UniversalHash, keys: &[i64], slots: &mut [Option<i64>]) -> Result<(), ()> {
    let size = slots.len();
    for &key in keys {
        let slot = &mut slots[hash.index(key, size)];
        if slot.is_some() {
            return Err(());
        }
        *slot = Some(key);
    }
    Ok(())
}

/// Finalized second-level table
///
/// Immutable once built. A slot holds `Some(key)` for a stored key, so no key
/// value needs to be reserved to mark empty slots.
#[derive(Debug, Clone)]
pub(crate) enum Bucket {
    /// No keys were assigned here. Lookups never hash.
    Empty,
    /// At least one key, with `keys * keys` slots.
    Table {
        /// Bucket-local hash with no collisions among the stored keys
        hash: UniversalHash,
        /// Slot array indexed by `hash`
        slots: Box<[Option<i64>]>,
    },
}

impl Bucket {
    /// Check whether `key` was stored in this bucket.
    #[inline(always)]
    pub(crate) fn contains(&self, key: i64) -> bool {
        match self {
            Bucket::Empty => false,
            Bucket::Table { hash, slots } => slots[hash.index(key, slots.len())] == Some(key),
        }
    }

    /// Number of slots allocated for this bucket
    pub(crate) fn slots(&self) -> usize {
        match self {
            Bucket::Empty => 0,
            Bucket::Table { slots, .. } => slots.len(),
        }
    }

    /// Iterate over the stored keys, in slot order.
    pub(crate) fn keys(&self) -> impl Iterator<Item = i64> + '_ {
        let slots: &[Option<i64>] = match self {
            Bucket::Empty => &[],
            Bucket::Table { slots, .. } => &slots[..],
        };
        slots.iter().flatten().copied()
    }
}

#![cfg_attr(docsrs, feature(doc_auto_cfg, doc_cfg))]
#![doc = include_str!("../README.md")]
// @@ begin lint list maintained by maint/add_warning @@
#![allow(renamed_and_removed_lints)] // @@REMOVE_WHEN(ci_arti_stable)
#![allow(unknown_lints)] // @@REMOVE_WHEN(ci_arti_nightly)
#![warn(missing_docs)]
#![warn(noop_method_call)]
#![warn(unreachable_pub)]
#![warn(clippy::all)]
#![deny(clippy::await_holding_lock)]
#![deny(clippy::cargo_common_metadata)]
#![deny(clippy::cast_lossless)]
#![deny(clippy::checked_conversions)]
#![warn(clippy::cognitive_complexity)]
#![deny(clippy::debug_assert_with_mut_call)]
#![deny(clippy::exhaustive_enums)]
#![deny(clippy::exhaustive_structs)]
#![deny(clippy::expl_impl_clone_on_copy)]
#![deny(clippy::fallible_impl_from)]
#![deny(clippy::implicit_clone)]
#![deny(clippy::large_stack_arrays)]
#![warn(clippy::manual_ok_or)]
#![deny(clippy::missing_docs_in_private_items)]
#![warn(clippy::needless_borrow)]
#![warn(clippy::needless_pass_by_value)]
#![warn(clippy::option_option)]
#![deny(clippy::print_stderr)]
#![deny(clippy::print_stdout)]
#![warn(clippy::rc_buffer)]
#![deny(clippy::ref_option_ref)]
#![warn(clippy::semicolon_if_nothing_returned)]
#![warn(clippy::trait_duplication_in_bounds)]
#![deny(clippy::unchecked_duration_subtraction)]
#![deny(clippy::unnecessary_wraps)]
#![warn(clippy::unseparated_literal_suffix)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::mod_module_files)]
#![allow(clippy::let_unit_value)] // This can reasonably be done for explicitness
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::significant_drop_in_scrutinee)] // arti/-/merge_requests/588/#note_2812945
#![allow(clippy::result_large_err)] // temporary workaround for arti#587
#![allow(clippy::needless_raw_string_hashes)] // complained-about code is fine, often best
#![allow(clippy::needless_lifetimes)] // See arti#1765
//! <!-- @@ end lint list maintained by maint/add_warning @@ -->

mod bucket;
mod err;
mod hash;

use crate::bucket::{Bucket, PendingBucket};
use crate::hash::UniversalHash;
use rand::{rngs::StdRng, SeedableRng};
use rand_core::RngCore;
use std::num::NonZeroU32;
use tracing::debug;

pub use crate::err::Error;

/// Upper bound on second-level slots, as a multiple of the key count
///
/// A random top-level hash meets this bound with probability at least one
/// half, since the expected sum of squared bucket sizes is below `2n`.
pub const SPACE_FACTOR: usize = 4;

/// Default limit on attempts for each retry loop
///
/// Every attempt succeeds with probability above one half, so hitting this
/// limit with a working random source has probability below `2^-256`.
pub const DEFAULT_MAX_ATTEMPTS: NonZeroU32 = match NonZeroU32::new(256) {
    Some(value) => value,
    None => panic!("attempt limit must be nonzero"),
};

/// Static set of `i64` keys with worst-case constant time membership tests
///
/// Built once by [`FixedSet::new()`] or a [`FixedSetBuilder`], and immutable
/// afterward. Lookups take one top-level hash, one bucket-local hash, and a
/// single comparison, and never allocate. A built set is [`Sync`], so it can
/// answer lookups from many threads at once.
#[derive(Debug, Clone)]
pub struct FixedSet {
    /// Top-level hash, choosing a bucket for each key
    hash: UniversalHash,

    /// One bucket per stored key
    ///
    /// Empty exactly when the set is empty. The top-level hash is never
    /// evaluated in that case, since there is no table to index.
    buckets: Box<[Bucket]>,

    /// Number of distinct keys stored
    len: usize,
}

impl FixedSet {
    /// Build a set from a list of keys, with default options.
    ///
    /// Duplicate keys are stored once. Randomness comes from
    /// [`rand::thread_rng()`].
    pub fn new(keys: &[i64]) -> Result<Self, Error> {
        FixedSetBuilder::new().build(keys)
    }

    /// Check whether `key` is a member of the set.
    #[inline]
    pub fn contains(&self, key: i64) -> bool {
        if self.buckets.is_empty() {
            return false;
        }
        self.buckets[self.hash.index(key, self.buckets.len())].contains(key)
    }

    /// Number of distinct keys in the set
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check whether the set holds no keys at all.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iterate over every key in the set, each exactly once.
    ///
    /// The order depends on the random hash functions chosen during
    /// construction and carries no meaning.
    pub fn iter(&self) -> impl Iterator<Item = i64> + '_ {
        self.buckets.iter().flat_map(Bucket::keys)
    }

    /// Describe the memory layout chosen during construction.
    pub fn space(&self) -> SpaceUsage {
        SpaceUsage {
            keys: self.len,
            buckets: self.buckets.len(),
            slots: self.buckets.iter().map(Bucket::slots).sum(),
        }
    }
}

/// Table sizes of a built [`FixedSet`]
///
/// `slots` never exceeds [`SPACE_FACTOR`] times `keys`.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[non_exhaustive]
pub struct SpaceUsage {
    /// Number of distinct keys stored
    pub keys: usize,
    /// Number of top-level buckets, equal to `keys`
    pub buckets: usize,
    /// Total second-level slots, the sum of squared bucket key counts
    pub slots: usize,
}

/// Builder for creating [`FixedSet`] instances with custom settings
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct FixedSetBuilder {
    /// Limit on top-level hashes tried before giving up
    max_table_attempts: NonZeroU32,

    /// Limit on bucket-local hashes tried, per bucket, before giving up
    max_bucket_attempts: NonZeroU32,
}

impl FixedSetBuilder {
    /// Create a new [`FixedSetBuilder`] with default settings.
    ///
    /// Immediately calling [`Self::build()`] would be equivalent to using
    /// [`FixedSet::new()`].
    pub fn new() -> Self {
        Self {
            max_table_attempts: DEFAULT_MAX_ATTEMPTS,
            max_bucket_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Select a new limit on top-level hash attempts.
    pub fn max_table_attempts(&mut self, attempts: NonZeroU32) -> &mut Self {
        self.max_table_attempts = attempts;
        self
    }

    /// Select a new limit on hash attempts for each bucket.
    pub fn max_bucket_attempts(&mut self, attempts: NonZeroU32) -> &mut Self {
        self.max_bucket_attempts = attempts;
        self
    }

    /// Build a [`FixedSet`] using the thread-local random number generator.
    pub fn build(&self, keys: &[i64]) -> Result<FixedSet, Error> {
        self.build_from_rng(&mut rand::thread_rng(), keys)
    }

    /// Build a [`FixedSet`] deterministically from a 64-bit seed.
    ///
    /// The same seed, keys, and settings always produce the same layout.
    pub fn build_from_seed(&self, seed: u64, keys: &[i64]) -> Result<FixedSet, Error> {
        self.build_from_rng(&mut StdRng::seed_from_u64(seed), keys)
    }

    /// Build a [`FixedSet`] from an arbitrary [`RngCore`].
    ///
    /// Keys are deduplicated first. A top-level hash is then resampled until
    /// the buckets it produces fit within [`SPACE_FACTOR`] slots per key, and
    /// finally each bucket searches for its own collision-free hash.
    pub fn build_from_rng<R: RngCore>(&self, rng: &mut R, keys: &[i64]) -> Result<FixedSet, Error> {
        let keys = distinct_keys(keys);
        let (hash, pending) = partition(rng, &keys, self.max_table_attempts)?;

        let attempts = self.max_bucket_attempts;
        let buckets = pending
            .into_iter()
            .enumerate()
            .map(|(index, bucket)| {
                let len = bucket.len();
                bucket
                    .initialize(rng, attempts)
                    .map_err(|()| Error::BucketAttempts {
                        bucket: index,
                        keys: len,
                        attempts: attempts.get(),
                    })
            })
            .collect::<Result<Box<[Bucket]>, Error>>()?;

        let set = FixedSet {
            hash,
            buckets,
            len: keys.len(),
        };
        debug!(keys = set.len, slots = set.space().slots, "fixed set built");
        Ok(set)
    }
}

impl Default for FixedSetBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Sorted copy of `keys` with duplicates removed
fn distinct_keys(keys: &[i64]) -> Vec<i64> {
    let mut keys = keys.to_vec();
    keys.sort_unstable();
    keys.dedup();
    keys
}

/// Search for a top-level hash that meets the space bound.
///
/// Returns the accepted hash along with one pending bucket per key, filled
/// with the keys that hash assigns to it. `keys` must not contain duplicates.
fn partition<R: RngCore>(
    rng: &mut R,
    keys: &[i64],
    max_attempts: NonZeroU32,
) -> Result<(UniversalHash, Vec<PendingBucket>), Error> {
    let size = keys.len();
    let max_slots = size.saturating_mul(SPACE_FACTOR);
    let mut buckets = vec![PendingBucket::new(); size];

    for attempt in 1..=max_attempts.get() {
        let hash = UniversalHash::sample(rng);
        for &key in keys {
            buckets[hash.index(key, size)].add_key(key);
        }

        let slots = buckets
            .iter()
            .map(PendingBucket::slots)
            .fold(0_usize, usize::saturating_add);
        if slots <= max_slots {
            debug!(keys = size, slots, attempt, "top-level hash accepted");
            return Ok((hash, buckets));
        }

        debug!(keys = size, slots, max_slots, attempt, "top-level hash rejected");
        for bucket in &mut buckets {
            bucket.clear_keys();
        }
    }

    Err(Error::TableAttempts {
        attempts: max_attempts.get(),
    })
}

#[cfg(test)]
mod test {
    #![allow(clippy::unwrap_used)]

    use super::{distinct_keys, partition, FixedSetBuilder, SPACE_FACTOR};
    use rand::{rngs::StdRng, SeedableRng};
    use std::num::NonZeroU32;

    #[test]
    fn distinct_keys_sorted() {
        assert_eq!(distinct_keys(&[3, 1, 3, -2, 1]), vec![-2, 1, 3]);
        assert!(distinct_keys(&[]).is_empty());
    }

    #[test]
    fn partition_meets_bound() {
        let keys: Vec<i64> = (0..1000).map(|i| i * i - 5000).collect();
        let mut rng = StdRng::seed_from_u64(7);
        let (_, buckets) = partition(&mut rng, &keys, NonZeroU32::new(64).unwrap()).unwrap();
        assert_eq!(buckets.len(), keys.len());
        assert_eq!(buckets.iter().map(|b| b.len()).sum::<usize>(), keys.len());
        let slots: usize = buckets.iter().map(|b| b.slots()).sum();
        assert!(slots <= SPACE_FACTOR * keys.len());
    }

    #[test]
    fn partition_empty() {
        let mut rng = StdRng::seed_from_u64(0);
        let (_, buckets) = partition(&mut rng, &[], NonZeroU32::MIN).unwrap();
        assert!(buckets.is_empty());
    }

    #[test]
    fn builder_settings() {
        let mut builder = FixedSetBuilder::new();
        assert_eq!(builder, FixedSetBuilder::default());
        builder
            .max_table_attempts(NonZeroU32::new(3).unwrap())
            .max_bucket_attempts(NonZeroU32::new(5).unwrap());
        assert_eq!(builder.max_table_attempts.get(), 3);
        assert_eq!(builder.max_bucket_attempts.get(), 5);
        assert_ne!(builder, FixedSetBuilder::default());
    }
}

//! Error types for the `fixedset` crate

/// Errors that could occur while building a [`crate::FixedSet`]
///
/// Construction is a Las Vegas algorithm. Each retry loop succeeds with
/// probability at least one half per attempt, so these errors only show up
/// with an attempt limit that is far too small, or with a broken random source.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The top-level hash never spread the keys well enough.
    ///
    /// Every sampled top-level hash left the sum of squared bucket sizes
    /// above the space bound of four slots per key.
    #[error("no top-level hash met the space bound after {attempts} attempts")]
    TableAttempts {
        /// Number of top-level hashes that were tried
        attempts: u32,
    },

    /// One bucket never found a collision-free placement for its keys.
    #[error("bucket {bucket} holding {keys} keys had collisions in all {attempts} attempts")]
    BucketAttempts {
        /// Index of the failing bucket in the top-level table
        bucket: usize,
        /// Number of keys assigned to that bucket
        keys: usize,
        /// Number of bucket-local hashes that were tried
        attempts: u32,
    },
}

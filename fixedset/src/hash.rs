//! Universal hash family shared by both table levels
//!
//! The top-level table and every bucket each own one [`UniversalHash`]: a
//! pair of random coefficients for the Carter-Wegman family
//! `h(x) = ((a * x + b) mod P) mod m`. Both levels resample their own
//! coefficients on every retry, from whichever [`RngCore`] drives the build.
//!
//! Keys are signed, but the family is defined over non-negative integers below
//! `P`. We map each key to a `u64` by flipping its sign bit, which is a
//! bijection, and pick `P` just above `2^64` so that no two keys can ever share
//! a residue. The coefficient `a` may need 65 bits, so products are reduced in
//! two halves to stay within `u128`.

use rand::Rng;
use rand_core::RngCore;

/// Prime modulus for the hash family, `2^64 + 13`.
///
/// This is the smallest prime above `2^64`.
pub(crate) const PRIME: u128 = (1 << 64) + 13;

/// Map a signed key onto `[0, 2^64)`, preserving order.
#[inline(always)]
fn key_to_u64(key: i64) -> u64 {
    (key as u64) ^ (1 << 63)
}

/// Compute `(a * x) mod PRIME` for any coefficient `a < PRIME`.
///
/// The low 64 bits and the single high bit of `a` are multiplied separately,
/// and each partial product fits in a `u128` before reduction.
#[inline(always)]
fn mul_mod(a: u128, x: u64) -> u128 {
    let x = u128::from(x);
    let low = ((a & u128::from(u64::MAX)) * x) % PRIME;
    let high = (((a >> 64) * x) << 64) % PRIME;
    (low + high) % PRIME
}

/// Coefficients of one member of the universal hash family
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub(crate) struct UniversalHash {
    /// Multiplier, in `[1, PRIME - 1]`
    ///
    /// Never zero, or every key would hash to `b`.
    a: u128,
    /// Offset, in `[0, PRIME - 1]`
    b: u128,
}

impl UniversalHash {
    /// Draw fresh coefficients uniformly from the random source.
    #[inline]
    pub(crate) fn sample<R: RngCore>(rng: &mut R) -> Self {
        Self {
            a: rng.gen_range(1..PRIME),
            b: rng.gen_range(0..PRIME),
        }
    }

    /// Hash a key before the final reduction, as `(a * x + b) mod PRIME`.
    ///
    /// This is injective in the key for any fixed coefficients.
    #[inline(always)]
    fn residue(&self, key: i64) -> u128 {
        (mul_mod(self.a, key_to_u64(key)) + self.b) % PRIME
    }

    /// Hash a key to a slot index in `[0, size)`.
    ///
    /// `size` must be nonzero.
    #[inline(always)]
    pub(crate) fn index(&self, key: i64, size: usize) -> usize {
        debug_assert!(size > 0);
        // The remainder is below `size`, so it always fits back in a usize.
        (self.residue(key) % size as u128) as usize
    }
}

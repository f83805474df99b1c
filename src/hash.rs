//! String hashing used to place keys into buckets
//!
//! The mix is cyrb53: two independent 32-bit lanes fold in every UTF-16 code unit of the key with
//! a multiply-xor step, then a final avalanche crosses the lanes. The result keeps 21 bits of the
//! second lane above the 32 bits of the first, giving a 53-bit value.

/// Seed of the first lane
const LANE_1_SEED: u32 = 0xdead_beef;
/// Seed of the second lane
const LANE_2_SEED: u32 = 0x41c6_ce57;
/// Per-unit multiplier of the first lane
const LANE_1_MUL: u32 = 2_654_435_761;
/// Per-unit multiplier of the second lane
const LANE_2_MUL: u32 = 1_597_334_677;
/// First avalanche multiplier
const AVALANCHE_MUL_1: u32 = 2_246_822_507;
/// Second avalanche multiplier
const AVALANCHE_MUL_2: u32 = 3_266_489_909;
/// Bits of the second lane kept in the final value
const HIGH_BITS_MASK: u32 = 0x001f_ffff;

/// Hashes `key` into a 53-bit value.
///
/// The value depends only on the key text, so it is stable across bucket array sizes.
#[must_use]
pub fn cyrb53(key: &str) -> u64 {
    let (h1, h2) = key.encode_utf16().fold((LANE_1_SEED, LANE_2_SEED), |(h1, h2), unit| {
        let unit = u32::from(unit);
        ((h1 ^ unit).wrapping_mul(LANE_1_MUL), (h2 ^ unit).wrapping_mul(LANE_2_MUL))
    });

    let mut h1 = (h1 ^ h1.wrapping_shr(16)).wrapping_mul(AVALANCHE_MUL_1);
    h1 ^= (h2 ^ h2.wrapping_shr(13)).wrapping_mul(AVALANCHE_MUL_2);
    let mut h2 = (h2 ^ h2.wrapping_shr(16)).wrapping_mul(AVALANCHE_MUL_1);
    h2 ^= (h1 ^ h1.wrapping_shr(13)).wrapping_mul(AVALANCHE_MUL_2);

    u64::from(h2 & HIGH_BITS_MASK).wrapping_shl(32) | u64::from(h1)
}

/// Maps `key` to a bucket in `[0, buckets_len)`.
///
/// The index is defined modulo the array length, so it has to be recomputed whenever the bucket
/// array is resized. Returns 0 for an empty bucket array.
#[must_use]
pub fn bucket_index(key: &str, buckets_len: usize) -> usize {
    u64::try_from(buckets_len)
        .ok()
        .and_then(|len| cyrb53(key).checked_rem(len))
        .and_then(|index| usize::try_from(index).ok())
        .unwrap_or(0)
}

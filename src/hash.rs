//! Key fingerprinting and bucket resolution.
//!
//! The fingerprint is the classic base-31 polynomial over UTF-16 code
//! units, accumulated in a wrapping `i32`. It is deterministic across
//! processes and platforms; it makes no promise about distribution, and
//! collisions are resolved by chaining in the bucket table.

/// Multiplier applied to the running fingerprint before adding each code unit.
pub const MULTIPLIER: i32 = 31;

/// Computes the fingerprint of `key`.
///
/// Equivalent to `sum(c[i] * 31^(n - 1 - i))` with every intermediate step
/// wrapped to a signed 32-bit integer. The empty string hashes to `0`.
#[inline]
pub fn fingerprint(key: &str) -> i32 {
    key.encode_utf16().fold(0i32, |acc, unit| {
        acc.wrapping_mul(MULTIPLIER).wrapping_add(i32::from(unit))
    })
}

/// Maps a fingerprint onto a bucket in `[0, capacity)`.
///
/// Equal to the absolute value of the truncated remainder
/// `|fingerprint % capacity|`, so negative fingerprints land on the same
/// bucket as their magnitude would.
/// `capacity` must be non-zero; the map never holds a zero-sized table.
#[inline]
pub fn bucket_index(fingerprint: i32, capacity: usize) -> usize {
    debug_assert!(capacity > 0, "bucket table must never be empty");
    match usize::try_from(fingerprint.unsigned_abs()) {
        Ok(magnitude) => magnitude % capacity,
        Err(_) => (u64::from(fingerprint.unsigned_abs()) % capacity as u64) as usize,
    }
}

//! Key hashing and slot selection.
//!
//! The low 8 bits of a key's hash select its bucket, the remaining bits pick
//! the home slot inside that bucket's table. Files are only readable with the
//! hash function they were written with.

use xxhash_rust::xxh64::xxh64;

const SEED: u64 = 0;

/// Hashes a key with XXH64.
#[inline]
pub fn hash_key(key: &[u8]) -> u64 {
    xxh64(key, SEED)
}

/// Bucket (table index) for a hash.
#[inline]
pub fn bucket_of(hash: u64) -> usize {
    (hash & 0xff) as usize
}

/// First slot to probe for `hash` in a table of `length` slots.
///
/// `length` must be non-zero.
#[inline]
pub fn home_slot(hash: u64, length: u64) -> u64 {
    (hash >> 8) % length
}

//! Stock hash functions usable as table hashers.
//!
//! Every function here maps `(key, capacity)` to an index in `[0, capacity)`
//! and is deterministic for a fixed capacity, which is the whole contract a
//! table hasher has to meet. The arithmetic hashers cover integer keys, the
//! rolling hashers cover string keys, and [`folded`] covers any key that
//! implements [`Hash`](core::hash::Hash) (feature `foldhash`).
//!
//! All of them panic if `capacity` is zero; tables guarantee a positive
//! capacity before hashing, so the panic only fires on direct misuse.

#[cfg(feature = "foldhash")]
use core::hash::BuildHasher;
#[cfg(feature = "foldhash")]
use core::hash::Hash;

/// Division-method hash for integer keys: `key mod capacity`.
///
/// Uses the Euclidean remainder so negative keys land in range.
///
/// # Examples
///
/// ```
/// use twin_hash::hash::int_div;
///
/// assert_eq!(int_div(&10_i64, 4), 2);
/// assert_eq!(int_div(&-3_i64, 4), 1);
/// ```
pub fn int_div<K>(key: &K, capacity: usize) -> usize
where
    K: Copy + Into<i128>,
{
    assert!(capacity > 0, "capacity must be positive");
    (*key).into().rem_euclid(capacity as i128) as usize
}

/// Multiplicative-method hash: `floor(capacity * frac(multiplier * key))`.
///
/// `multiplier` must lie strictly between 0 and 1. The fractional part is
/// taken as a Euclidean remainder of 1.0 so negative keys land in range.
#[cfg(feature = "std")]
pub fn int_mult<K>(key: &K, multiplier: f64, capacity: usize) -> usize
where
    K: Copy + Into<i128>,
{
    assert!(capacity > 0, "capacity must be positive");
    assert!(
        multiplier > 0.0 && multiplier < 1.0,
        "multiplier must lie in (0, 1)"
    );
    let fraction = (multiplier * (*key).into() as f64).rem_euclid(1.0);
    // f64 rounding of `capacity * fraction` can land exactly on `capacity`.
    ((capacity as f64 * fraction) as usize).min(capacity - 1)
}

/// [`int_mult`] fixed to Knuth's constant `(sqrt(5) - 1) / 2`.
///
/// # Examples
///
/// ```
/// use twin_hash::hash::int_mult_knuth;
///
/// let bucket = int_mult_knuth(&1_i64, 8);
/// assert!(bucket < 8);
/// ```
#[cfg(feature = "std")]
pub fn int_mult_knuth<K>(key: &K, capacity: usize) -> usize
where
    K: Copy + Into<i128>,
{
    int_mult(key, (5.0_f64.sqrt() - 1.0) / 2.0, capacity)
}

/// Rolling string hash: `h := (multiplier * h + byte) mod capacity` per byte.
///
/// The seed is reduced `mod capacity` up front, so every named variant stays
/// usable at small capacities. The named variants below fix `seed` and
/// `multiplier` to well-known pairs.
///
/// # Examples
///
/// ```
/// use twin_hash::hash::str_rolling;
///
/// // An empty key hashes to the reduced seed.
/// assert_eq!(str_rolling("", 5381, 33, 100), 81);
/// assert!(str_rolling("towel", 0, 31, 42) < 42);
/// ```
pub fn str_rolling<K>(key: &K, seed: usize, multiplier: usize, capacity: usize) -> usize
where
    K: AsRef<str> + ?Sized,
{
    assert!(capacity > 0, "capacity must be positive");
    let modulus = capacity as u128;
    let mut h = seed as u128 % modulus;
    for byte in key.as_ref().bytes() {
        h = (multiplier as u128 * h + u128::from(byte)) % modulus;
    }
    h as usize
}

/// djb2: seed 5381, multiplier 33, additive combining.
pub fn str_djb2<K>(key: &K, capacity: usize) -> usize
where
    K: AsRef<str> + ?Sized,
{
    str_rolling(key, 5381, 33, capacity)
}

/// djb2a: seed 5381, multiplier 33, xor combining.
pub fn str_djb2a<K>(key: &K, capacity: usize) -> usize
where
    K: AsRef<str> + ?Sized,
{
    assert!(capacity > 0, "capacity must be positive");
    let modulus = capacity as u128;
    let mut h = 5381 % modulus;
    for byte in key.as_ref().bytes() {
        h = ((33 * h) ^ u128::from(byte)) % modulus;
    }
    h as usize
}

/// Java-style string hash: seed 0, multiplier 31.
pub fn str_java<K>(key: &K, capacity: usize) -> usize
where
    K: AsRef<str> + ?Sized,
{
    str_rolling(key, 0, 31, capacity)
}

/// K&R (2nd edition) string hash: seed 0, multiplier 31.
pub fn str_kr2e<K>(key: &K, capacity: usize) -> usize
where
    K: AsRef<str> + ?Sized,
{
    str_rolling(key, 0, 31, capacity)
}

/// SGI STL string hash: seed 0, multiplier 5.
pub fn str_sgistl<K>(key: &K, capacity: usize) -> usize
where
    K: AsRef<str> + ?Sized,
{
    str_rolling(key, 0, 5, capacity)
}

/// STLport string hash: seed 0, multiplier 33.
pub fn str_stlport<K>(key: &K, capacity: usize) -> usize
where
    K: AsRef<str> + ?Sized,
{
    str_rolling(key, 0, 33, capacity)
}

/// Hashes any `K: Hash` through `foldhash` and reduces the digest mod
/// `capacity`.
///
/// This is the stock hasher for key types the arithmetic and string hashers
/// do not cover, and the sensible default when the hash function itself is
/// not the point.
///
/// # Examples
///
/// ```
/// use twin_hash::hash::folded;
///
/// let bucket = folded(&("compound", 7_u8), 16);
/// assert!(bucket < 16);
/// assert_eq!(bucket, folded(&("compound", 7_u8), 16));
/// ```
#[cfg(feature = "foldhash")]
pub fn folded<K>(key: &K, capacity: usize) -> usize
where
    K: Hash + ?Sized,
{
    assert!(capacity > 0, "capacity must be positive");
    let digest = foldhash::fast::FixedState::default().hash_one(key);
    (digest % capacity as u64) as usize
}

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use alloc::vec::Vec;

    use super::*;

    const SAMPLES: &[&str] = &["", "a", "ab", "towel", "dont panic", "heart of gold"];

    #[test]
    fn division_maps_into_range() {
        for capacity in 1..64_usize {
            for key in -100..100_i64 {
                assert!(int_div(&key, capacity) < capacity);
            }
        }
    }

    #[test]
    fn division_is_plain_remainder_for_non_negative_keys() {
        assert_eq!(int_div(&0_i64, 7), 0);
        assert_eq!(int_div(&13_i64, 7), 6);
        assert_eq!(int_div(&7_i64, 1), 0);
    }

    #[test]
    fn negative_keys_land_in_range() {
        assert_eq!(int_div(&-3_i64, 4), 1);
        assert_eq!(int_div(&-8_i64, 4), 0);
    }

    #[cfg(feature = "std")]
    #[test]
    fn multiplicative_maps_into_range() {
        for capacity in 1..64_usize {
            for key in -100..100_i64 {
                assert!(int_mult(&key, 0.381, capacity) < capacity);
                assert!(int_mult_knuth(&key, capacity) < capacity);
            }
        }
    }

    #[cfg(feature = "std")]
    #[test]
    fn knuth_constant_matches_hand_computation() {
        // frac(0.6180339887 * 1) * 8 = 4.94, frac(0.6180339887 * 2) * 8 = 1.88
        assert_eq!(int_mult_knuth(&1_i64, 8), 4);
        assert_eq!(int_mult_knuth(&2_i64, 8), 1);
    }

    #[cfg(feature = "std")]
    #[test]
    #[should_panic(expected = "multiplier")]
    fn multiplier_outside_unit_interval_panics() {
        int_mult(&1_i64, 1.5, 8);
    }

    #[test]
    #[should_panic(expected = "capacity")]
    fn zero_capacity_panics() {
        int_div(&1_i64, 0);
    }

    #[test]
    fn rolling_hashes_map_into_range() {
        for capacity in 1..64_usize {
            for sample in SAMPLES {
                assert!(str_djb2(sample, capacity) < capacity);
                assert!(str_djb2a(sample, capacity) < capacity);
                assert!(str_java(sample, capacity) < capacity);
                assert!(str_sgistl(sample, capacity) < capacity);
                assert!(str_stlport(sample, capacity) < capacity);
            }
        }
    }

    #[test]
    fn empty_key_hashes_to_reduced_seed() {
        assert_eq!(str_djb2("", 10_000), 5381);
        assert_eq!(str_djb2("", 100), 81);
        assert_eq!(str_java("", 100), 0);
    }

    #[test]
    fn java_and_kr2e_share_parameters() {
        for sample in SAMPLES {
            assert_eq!(str_java(sample, 1024), str_kr2e(sample, 1024));
        }
    }

    #[test]
    fn variants_disagree_somewhere() {
        let disagrees = |a: fn(&str, usize) -> usize, b: fn(&str, usize) -> usize| {
            SAMPLES.iter().any(|&sample| a(sample, 8192) != b(sample, 8192))
        };
        assert!(disagrees(str_djb2, str_djb2a));
        assert!(disagrees(str_djb2, str_java));
        assert!(disagrees(str_sgistl, str_stlport));
    }

    #[test]
    fn rolling_hash_accepts_owned_strings() {
        let owned = String::from("towel");
        assert_eq!(str_djb2(&owned, 64), str_djb2("towel", 64));
    }

    #[test]
    fn rolling_hash_is_deterministic_per_capacity() {
        let first: Vec<usize> = SAMPLES.iter().map(|s| str_djb2(s, 53)).collect();
        let second: Vec<usize> = SAMPLES.iter().map(|s| str_djb2(s, 53)).collect();
        assert_eq!(first, second);
    }

    #[cfg(feature = "foldhash")]
    #[test]
    fn folded_maps_into_range_and_repeats() {
        for capacity in 1..64_usize {
            let bucket = folded(&"towel", capacity);
            assert!(bucket < capacity);
            assert_eq!(bucket, folded(&"towel", capacity));
        }
        assert!(folded(&(1_u8, 2_u16, 3_u32), 17) < 17);
    }
}

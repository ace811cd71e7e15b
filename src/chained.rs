use alloc::boxed::Box;
use alloc::vec::Vec;
use core::cmp::Ordering;
use core::fmt;
use core::fmt::Debug;
use core::iter;
use core::mem;

struct Node<K, V> {
    key: K,
    value: V,
    next: Option<Box<Node<K, V>>>,
}

type Bucket<K, V> = Option<Box<Node<K, V>>>;

/// A hash table resolving collisions by separate chaining.
///
/// Each bucket heads an owned singly linked chain of entries; colliding keys
/// are prepended, so a chain lists its entries most-recent-first. The bucket
/// count is fixed at construction and the table never resizes: lookups
/// degrade gracefully as chains grow instead of the table reallocating, and
/// unlinking a located entry is O(1).
///
/// The table is generic over a hasher `H: Fn(&K, usize) -> usize`, which must
/// map every key to `[0, bucket_count)` deterministically, and a comparator
/// `C: Fn(&K, &K) -> Ordering`, which decides key equality. Both are fixed
/// for the table's lifetime. The stock hashers in [`crate::hash`] and
/// `Ord::cmp` plug in directly.
///
/// # Examples
///
/// ```
/// use twin_hash::ChainedTable;
/// use twin_hash::hash;
///
/// let mut table = ChainedTable::new(16, hash::int_div, i64::cmp);
/// table.insert(1_i64, "one");
/// table.insert(17, "seventeen"); // collides with 1 under mod 16
/// assert_eq!(table.get(&1), Some(&"one"));
/// assert_eq!(table.get(&17), Some(&"seventeen"));
/// assert_eq!(table.len(), 2);
/// ```
pub struct ChainedTable<K, V, H, C> {
    buckets: Vec<Bucket<K, V>>,
    len: usize,
    hasher: H,
    comparator: C,
}

impl<K, V, H, C> ChainedTable<K, V, H, C> {
    /// Returns the number of live entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the table holds no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the bucket count chosen at construction.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    /// Returns `len / capacity`. Informational only: this table never
    /// resizes, so nothing bounds the ratio.
    #[inline]
    pub fn load_factor(&self) -> f64 {
        self.len as f64 / self.buckets.len() as f64
    }

    /// Drops every entry, keeping the bucket count.
    ///
    /// Chains are released iteratively, so arbitrarily long chains cannot
    /// overflow the stack on release.
    pub fn clear(&mut self) {
        for bucket in &mut self.buckets {
            let mut cursor = bucket.take();
            while let Some(mut node) = cursor {
                cursor = node.next.take();
            }
        }
        self.len = 0;
    }

    /// Iterates over `(&key, &value)` pairs, bucket order first, then chain
    /// order (most-recent-first) within a bucket.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            buckets: self.buckets.iter(),
            cursor: None,
        }
    }

    /// Iterates over the live keys in the same order as [`iter`](Self::iter).
    ///
    /// # Examples
    ///
    /// ```
    /// use twin_hash::ChainedTable;
    /// use twin_hash::hash;
    ///
    /// let mut table = ChainedTable::new(8, hash::int_div, i64::cmp);
    /// table.insert(1_i64, "a");
    /// table.insert(9, "b"); // same bucket as 1, prepended in front of it
    /// table.insert(2, "c");
    ///
    /// let keys: Vec<&i64> = table.keys().collect();
    /// assert_eq!(keys, [&9, &1, &2]);
    /// ```
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    /// Calls `visit` once per live entry, in [`iter`](Self::iter) order.
    ///
    /// Traversal state lives in the closure's captures; the shared borrow on
    /// the table means the visitor cannot mutate it mid-walk.
    ///
    /// # Examples
    ///
    /// ```
    /// use twin_hash::ChainedTable;
    /// use twin_hash::hash;
    ///
    /// let mut table = ChainedTable::new(8, hash::int_div, i64::cmp);
    /// table.insert(2_i64, 20_u32);
    /// table.insert(3, 30);
    ///
    /// let mut total = 0;
    /// table.traverse(|_, value| total += value);
    /// assert_eq!(total, 50);
    /// ```
    pub fn traverse<F>(&self, mut visit: F)
    where
        F: FnMut(&K, &V),
    {
        for (key, value) in self.iter() {
            visit(key, value);
        }
    }

    /// Detaches every entry and returns an iterator of owned `(key, value)`
    /// pairs. The table is left empty with its bucket count intact; pairs
    /// not pulled from the iterator are dropped with it.
    pub fn drain(&mut self) -> Drain<K, V> {
        let bucket_count = self.buckets.len();
        let chains = mem::replace(&mut self.buckets, Self::empty_buckets(bucket_count));
        self.len = 0;
        Drain {
            buckets: chains.into_iter(),
            cursor: None,
        }
    }

    fn empty_buckets(bucket_count: usize) -> Vec<Bucket<K, V>> {
        iter::repeat_with(|| None).take(bucket_count).collect()
    }
}

impl<K, V, H, C> ChainedTable<K, V, H, C>
where
    H: Fn(&K, usize) -> usize,
    C: Fn(&K, &K) -> Ordering,
{
    /// Creates an empty table with `bucket_count` buckets.
    ///
    /// Panics if `bucket_count` is zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use twin_hash::ChainedTable;
    /// use twin_hash::hash;
    ///
    /// let table: ChainedTable<i64, &str, _, _> =
    ///     ChainedTable::new(97, hash::int_div, i64::cmp);
    /// assert!(table.is_empty());
    /// assert_eq!(table.capacity(), 97);
    /// ```
    pub fn new(bucket_count: usize, hasher: H, comparator: C) -> Self {
        assert!(bucket_count > 0, "bucket count must be positive");
        Self {
            buckets: Self::empty_buckets(bucket_count),
            len: 0,
            hasher,
            comparator,
        }
    }

    /// Inserts `key -> value`, replacing and returning the previous value if
    /// the key is already present.
    ///
    /// A new entry is prepended to its bucket's chain.
    ///
    /// # Examples
    ///
    /// ```
    /// use twin_hash::ChainedTable;
    /// use twin_hash::hash;
    ///
    /// let mut table = ChainedTable::new(16, hash::int_div, i64::cmp);
    /// assert_eq!(table.insert(1_i64, "old"), None);
    /// assert_eq!(table.insert(1, "new"), Some("old"));
    /// assert_eq!(table.len(), 1);
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let index = self.bucket_index(&key);
        let mut cursor = self.buckets[index].as_deref_mut();
        while let Some(node) = cursor {
            if (self.comparator)(&key, &node.key) == Ordering::Equal {
                return Some(mem::replace(&mut node.value, value));
            }
            cursor = node.next.as_deref_mut();
        }
        let next = self.buckets[index].take();
        self.buckets[index] = Some(Box::new(Node { key, value, next }));
        self.len += 1;
        None
    }

    /// Inserts `key -> value` only if the key is absent; an occupied key
    /// returns the rejected pair unchanged in `Err`.
    ///
    /// # Examples
    ///
    /// ```
    /// use twin_hash::ChainedTable;
    /// use twin_hash::hash;
    ///
    /// let mut table = ChainedTable::new(16, hash::int_div, i64::cmp);
    /// assert_eq!(table.try_insert(1_i64, "kept"), Ok(()));
    /// assert_eq!(table.try_insert(1, "rejected"), Err((1, "rejected")));
    /// assert_eq!(table.get(&1), Some(&"kept"));
    /// ```
    pub fn try_insert(&mut self, key: K, value: V) -> Result<(), (K, V)> {
        let index = self.bucket_index(&key);
        let mut cursor = self.buckets[index].as_deref();
        while let Some(node) = cursor {
            if (self.comparator)(&key, &node.key) == Ordering::Equal {
                return Err((key, value));
            }
            cursor = node.next.as_deref();
        }
        let next = self.buckets[index].take();
        self.buckets[index] = Some(Box::new(Node { key, value, next }));
        self.len += 1;
        Ok(())
    }

    /// Returns a reference to the value stored for `key`.
    pub fn get(&self, key: &K) -> Option<&V> {
        let index = self.bucket_index(key);
        let mut cursor = self.buckets[index].as_deref();
        while let Some(node) = cursor {
            if (self.comparator)(key, &node.key) == Ordering::Equal {
                return Some(&node.value);
            }
            cursor = node.next.as_deref();
        }
        None
    }

    /// Returns a mutable reference to the value stored for `key`.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let index = self.bucket_index(key);
        let mut cursor = self.buckets[index].as_deref_mut();
        while let Some(node) = cursor {
            if (self.comparator)(key, &node.key) == Ordering::Equal {
                return Some(&mut node.value);
            }
            cursor = node.next.as_deref_mut();
        }
        None
    }

    /// Returns `true` if `key` has a live entry.
    pub fn contains_key(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Removes `key`'s entry and returns its value. Absent keys are a no-op
    /// returning `None`.
    ///
    /// # Examples
    ///
    /// ```
    /// use twin_hash::ChainedTable;
    /// use twin_hash::hash;
    ///
    /// let mut table = ChainedTable::new(16, hash::int_div, i64::cmp);
    /// table.insert(1_i64, "one");
    /// assert_eq!(table.remove(&1), Some("one"));
    /// assert_eq!(table.remove(&1), None);
    /// assert!(table.is_empty());
    /// ```
    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.remove_entry(key).map(|(_, value)| value)
    }

    /// Removes `key`'s entry and returns the owned `(key, value)` pair.
    pub fn remove_entry(&mut self, key: &K) -> Option<(K, V)> {
        let index = self.bucket_index(key);
        let mut link = &mut self.buckets[index];
        loop {
            match link.take() {
                None => return None,
                Some(mut node) => {
                    if (self.comparator)(key, &node.key) == Ordering::Equal {
                        *link = node.next.take();
                        self.len -= 1;
                        let Node { key, value, .. } = *node;
                        return Some((key, value));
                    }
                    // Not it: reattach the node and advance to its tail.
                    link = &mut link.insert(node).next;
                }
            }
        }
    }

    fn bucket_index(&self, key: &K) -> usize {
        let index = (self.hasher)(key, self.buckets.len());
        debug_assert!(
            index < self.buckets.len(),
            "hasher returned an out-of-range bucket"
        );
        index
    }
}

impl<K, V, H, C> Debug for ChainedTable<K, V, H, C>
where
    K: Debug,
    V: Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, H, C> Clone for ChainedTable<K, V, H, C>
where
    K: Clone,
    V: Clone,
    H: Clone,
    C: Clone,
{
    fn clone(&self) -> Self {
        let mut buckets = Vec::with_capacity(self.buckets.len());
        for bucket in &self.buckets {
            // Rebuild the chain front-to-back so the clone keeps its order.
            let mut head: Bucket<K, V> = None;
            let mut tail = &mut head;
            let mut cursor = bucket.as_deref();
            while let Some(node) = cursor {
                let appended = tail.insert(Box::new(Node {
                    key: node.key.clone(),
                    value: node.value.clone(),
                    next: None,
                }));
                tail = &mut appended.next;
                cursor = node.next.as_deref();
            }
            buckets.push(head);
        }
        Self {
            buckets,
            len: self.len,
            hasher: self.hasher.clone(),
            comparator: self.comparator.clone(),
        }
    }
}

impl<K, V, H, C> Drop for ChainedTable<K, V, H, C> {
    fn drop(&mut self) {
        self.clear();
    }
}

/// Borrowed iterator over a [`ChainedTable`]'s `(&key, &value)` pairs.
pub struct Iter<'a, K, V> {
    buckets: core::slice::Iter<'a, Bucket<K, V>>,
    cursor: Option<&'a Node<K, V>>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(node) = self.cursor {
                self.cursor = node.next.as_deref();
                return Some((&node.key, &node.value));
            }
            self.cursor = self.buckets.next()?.as_deref();
        }
    }
}

/// Borrowed iterator over a [`ChainedTable`]'s live keys.
pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(key, _)| key)
    }
}

/// Owning iterator returned by [`ChainedTable::drain`].
///
/// Dropping it releases any pairs that were not pulled, iteratively.
pub struct Drain<K, V> {
    buckets: alloc::vec::IntoIter<Bucket<K, V>>,
    cursor: Bucket<K, V>,
}

impl<K, V> Iterator for Drain<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(node) = self.cursor.take() {
                let Node { key, value, next } = *node;
                self.cursor = next;
                return Some((key, value));
            }
            self.cursor = self.buckets.next()?;
        }
    }
}

impl<K, V> Drop for Drain<K, V> {
    fn drop(&mut self) {
        for _ in &mut *self {}
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use alloc::vec::Vec;
    use core::hash::Hash;
    use core::hash::Hasher;
    use std::collections::HashMap;

    use rand::TryRngCore;
    use rand::rngs::OsRng;
    use siphasher::sip::SipHasher;

    use super::*;
    use crate::hash;

    fn sip_bucket(k0: u64, k1: u64) -> impl Fn(&u64, usize) -> usize {
        move |key, capacity| {
            let mut hasher = SipHasher::new_with_keys(k0, k1);
            key.hash(&mut hasher);
            (hasher.finish() % capacity as u64) as usize
        }
    }

    #[test]
    fn insert_and_get() {
        let mut table = ChainedTable::new(16, hash::int_div, i64::cmp);
        for key in 0..100_i64 {
            assert_eq!(table.insert(key, key * 10), None);
        }
        for key in 0..100_i64 {
            assert_eq!(table.get(&key), Some(&(key * 10)));
        }
        assert_eq!(table.get(&100), None);
        assert_eq!(table.len(), 100);
    }

    #[test]
    fn upsert_returns_previous_value() {
        let mut table = ChainedTable::new(8, hash::int_div, i64::cmp);
        assert_eq!(table.insert(3, "first"), None);
        assert_eq!(table.insert(3, "second"), Some("first"));
        assert_eq!(table.insert(3, "third"), Some("second"));
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(&3), Some(&"third"));
    }

    #[test]
    fn try_insert_rejects_duplicate() {
        let mut table = ChainedTable::new(8, hash::int_div, i64::cmp);
        assert_eq!(table.try_insert(5, 50), Ok(()));
        assert_eq!(table.try_insert(5, 99), Err((5, 99)));
        assert_eq!(table.get(&5), Some(&50));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn collisions_prepend_within_bucket() {
        let mut table = ChainedTable::new(4, hash::int_div, i64::cmp);
        table.insert(1, "a");
        table.insert(5, "b");
        table.insert(9, "c");
        // All in bucket 1, most recent first.
        let keys: Vec<&i64> = table.keys().collect();
        assert_eq!(keys, [&9, &5, &1]);
        assert_eq!(table.get(&1), Some(&"a"));
        assert_eq!(table.get(&5), Some(&"b"));
        assert_eq!(table.get(&9), Some(&"c"));
    }

    #[test]
    fn remove_from_head_middle_and_tail() {
        let mut table = ChainedTable::new(4, hash::int_div, i64::cmp);
        for key in [1, 5, 9, 13] {
            table.insert(key, key);
        }
        // Chain in bucket 1 is 13 -> 9 -> 5 -> 1.
        assert_eq!(table.remove(&13), Some(13)); // head
        assert_eq!(table.remove(&5), Some(5)); // middle
        assert_eq!(table.remove(&1), Some(1)); // tail
        assert_eq!(table.remove(&9), Some(9)); // only survivor
        assert!(table.is_empty());
    }

    #[test]
    fn remove_absent_is_noop() {
        let mut table = ChainedTable::new(8, hash::int_div, i64::cmp);
        table.insert(1, "one");
        assert_eq!(table.remove(&2), None);
        assert_eq!(table.remove_entry(&9), None);
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(&1), Some(&"one"));
    }

    #[test]
    fn keys_walk_buckets_in_order() {
        let mut table = ChainedTable::new(8, hash::int_div, i64::cmp);
        table.insert(6, "f");
        table.insert(1, "a");
        table.insert(9, "b");
        table.insert(2, "c");
        let keys: Vec<&i64> = table.keys().collect();
        assert_eq!(keys, [&9, &1, &2, &6]);
    }

    #[test]
    fn traverse_carries_state_in_closure() {
        let mut table = ChainedTable::new(8, hash::int_div, i64::cmp);
        for key in 0..10_i64 {
            table.insert(key, key * 2);
        }
        let mut count = 0;
        let mut total = 0;
        table.traverse(|key, value| {
            count += 1;
            total += key + value;
        });
        assert_eq!(count, 10);
        assert_eq!(total, (0..10).map(|k| k * 3).sum::<i64>());
    }

    #[test]
    fn size_accounts_for_live_entries() {
        let mut table = ChainedTable::new(4, hash::int_div, i64::cmp);
        for key in 0..32_i64 {
            table.insert(key, key);
        }
        // Nothing bounds the ratio in a chained table.
        assert_eq!(table.load_factor(), 8.0);
        for key in 0..16_i64 {
            table.remove(&key);
        }
        table.insert(2, 2);
        assert_eq!(table.len(), 17);
        assert_eq!(table.iter().count(), 17);
    }

    #[test]
    fn clear_is_idempotent() {
        let mut table = ChainedTable::new(8, hash::int_div, i64::cmp);
        for key in 0..20_i64 {
            table.insert(key, key);
        }
        table.clear();
        assert!(table.is_empty());
        assert_eq!(table.iter().count(), 0);
        table.clear();
        assert!(table.is_empty());
        assert_eq!(table.capacity(), 8);
        table.insert(1, 1);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn drain_empties_but_keeps_bucket_count() {
        let mut table = ChainedTable::new(8, hash::int_div, i64::cmp);
        for key in 0..12_i64 {
            table.insert(key, key * 7);
        }
        let mut drained: Vec<(i64, i64)> = table.drain().collect();
        drained.sort_unstable();
        let expected: Vec<(i64, i64)> = (0..12).map(|k| (k, k * 7)).collect();
        assert_eq!(drained, expected);
        assert!(table.is_empty());
        assert_eq!(table.capacity(), 8);
        table.insert(3, 3);
        assert_eq!(table.get(&3), Some(&3));
    }

    #[test]
    fn partially_consumed_drain_drops_the_rest() {
        let mut table = ChainedTable::new(8, hash::int_div, i64::cmp);
        for key in 0..10_i64 {
            table.insert(key, key);
        }
        let mut drain = table.drain();
        assert!(drain.next().is_some());
        drop(drain);
        assert!(table.is_empty());
    }

    #[test]
    fn get_mut_updates_in_place() {
        let mut table = ChainedTable::new(8, hash::int_div, i64::cmp);
        table.insert(4, 40);
        if let Some(value) = table.get_mut(&4) {
            *value += 2;
        }
        assert_eq!(table.get(&4), Some(&42));
        assert_eq!(table.get_mut(&5), None);
    }

    #[test]
    fn string_keys_with_rolling_hash() {
        let mut table = ChainedTable::new(13, hash::str_djb2, Ord::cmp);
        table.insert(String::from("marvin"), 1_u32);
        table.insert(String::from("trillian"), 2);
        table.insert(String::from("zaphod"), 3);
        assert_eq!(table.get(&String::from("trillian")), Some(&2));
        assert!(table.contains_key(&String::from("marvin")));
        assert_eq!(table.remove(&String::from("zaphod")), Some(3));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn clone_preserves_entries() {
        let mut table = ChainedTable::new(4, hash::int_div, i64::cmp);
        for key in 0..10_i64 {
            table.insert(key, key);
        }
        let cloned = table.clone();
        table.insert(99, 99);
        assert_eq!(cloned.len(), 10);
        assert_eq!(cloned.get(&99), None);
        let original: Vec<&i64> = table.keys().filter(|&&k| k != 99).collect();
        let kept: Vec<&i64> = cloned.keys().collect();
        assert_eq!(original, kept);
    }

    #[test]
    #[should_panic(expected = "bucket count")]
    fn zero_bucket_count_panics() {
        let _: ChainedTable<i64, (), _, _> = ChainedTable::new(0, hash::int_div, i64::cmp);
    }

    #[test]
    fn randomized_against_std_map() {
        let k0 = OsRng.try_next_u64().unwrap();
        let k1 = OsRng.try_next_u64().unwrap();
        let mut table = ChainedTable::new(64, sip_bucket(k0, k1), u64::cmp);
        let mut model: HashMap<u64, u64> = HashMap::new();

        let mut keys = Vec::new();
        for round in 0..2_000_u64 {
            let key = OsRng.try_next_u64().unwrap() % 512;
            keys.push(key);
            assert_eq!(table.insert(key, round), model.insert(key, round));
        }
        for key in keys.iter().step_by(3) {
            assert_eq!(table.remove(key), model.remove(key));
        }

        assert_eq!(table.len(), model.len());
        for (key, value) in &model {
            assert_eq!(table.get(key), Some(value));
        }
        let mut seen = 0;
        table.traverse(|key, value| {
            seen += 1;
            assert_eq!(model.get(key), Some(value));
        });
        assert_eq!(seen, model.len());
    }
}

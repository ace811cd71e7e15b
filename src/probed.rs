use alloc::vec::Vec;
use core::cmp::Ordering;
use core::fmt;
use core::fmt::Debug;
use core::iter;
use core::mem;

#[derive(Clone)]
enum Slot<K, V> {
    Empty,
    Occupied { key: K, value: V },
    Tombstone,
}

/// Outcome of a probe sequence: the slot holding the key, or the slot an
/// insert may claim (`None` when every slot is occupied).
enum Probe {
    Hit(usize),
    Miss(Option<usize>),
}

/// A hash table resolving collisions by open addressing with linear probing.
///
/// Entries live in a flat slot array. A colliding insert walks forward from
/// its hashed slot, wrapping at the end, until it finds a free slot. Removal
/// leaves a tombstone so later probes keep walking past the vacated slot;
/// inserts reclaim the first tombstone on their path.
///
/// The table resizes itself to hold the load factor `len / capacity` between
/// 1/8 and 1/2: capacity doubles when an insertion finds the factor at or
/// above 0.5, and halves (never below 1) when a removal leaves it at or
/// below 0.125. Every resize rehashes every entry under the new capacity.
///
/// The hasher `H: Fn(&K, usize) -> usize` must map every key to
/// `[0, capacity)` deterministically for each capacity it is called with;
/// the comparator `C: Fn(&K, &K) -> Ordering` decides key equality. Both are
/// fixed for the table's lifetime, and the stock hashers in [`crate::hash`]
/// plus `Ord::cmp` plug in directly.
///
/// # Examples
///
/// ```
/// use twin_hash::ProbedTable;
/// use twin_hash::hash;
///
/// let mut table = ProbedTable::new(8, hash::int_div, i64::cmp);
/// for key in 0..4_i64 {
///     table.insert(key, key * key);
/// }
/// assert_eq!(table.capacity(), 8);
///
/// // The fifth insertion sees the table half full and doubles it first.
/// table.insert(4, 16);
/// assert_eq!(table.capacity(), 16);
/// assert_eq!(table.get(&3), Some(&9));
/// ```
#[derive(Clone)]
pub struct ProbedTable<K, V, H, C> {
    slots: Vec<Slot<K, V>>,
    len: usize,
    hasher: H,
    comparator: C,
}

impl<K, V, H, C> ProbedTable<K, V, H, C> {
    /// Returns the number of live entries. Tombstones do not count.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the table holds no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the current slot count.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns `len / capacity`, or 0.0 for a table with no slots yet.
    pub fn load_factor(&self) -> f64 {
        if self.slots.is_empty() {
            return 0.0;
        }
        self.len as f64 / self.slots.len() as f64
    }

    /// Drops every entry and erases every tombstone, keeping the capacity.
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            *slot = Slot::Empty;
        }
        self.len = 0;
    }

    /// Iterates over `(&key, &value)` pairs in slot order. The order is an
    /// artifact of hashing and probe history; no guarantee attaches to it.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            slots: self.slots.iter(),
        }
    }

    /// Iterates over the live keys in the same order as [`iter`](Self::iter).
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    /// Calls `visit` once per live entry, in [`iter`](Self::iter) order.
    ///
    /// Traversal state lives in the closure's captures; the shared borrow on
    /// the table means the visitor cannot mutate it mid-walk.
    pub fn traverse<F>(&self, mut visit: F)
    where
        F: FnMut(&K, &V),
    {
        for (key, value) in self.iter() {
            visit(key, value);
        }
    }

    /// Detaches every entry and returns an iterator of owned `(key, value)`
    /// pairs. The table is left empty, tombstones erased, capacity intact;
    /// pairs not pulled from the iterator are dropped with it.
    pub fn drain(&mut self) -> Drain<K, V> {
        let capacity = self.slots.len();
        let slots = mem::replace(&mut self.slots, Self::empty_slots(capacity));
        self.len = 0;
        Drain {
            slots: slots.into_iter(),
        }
    }

    fn empty_slots(capacity: usize) -> Vec<Slot<K, V>> {
        iter::repeat_with(|| Slot::Empty).take(capacity).collect()
    }
}

impl<K, V, H, C> ProbedTable<K, V, H, C>
where
    H: Fn(&K, usize) -> usize,
    C: Fn(&K, &K) -> Ordering,
{
    /// Creates an empty table with `capacity` slots.
    ///
    /// A zero capacity is accepted: the first insertion grows the table
    /// before any key is hashed, so the hasher never sees a zero capacity.
    ///
    /// # Examples
    ///
    /// ```
    /// use twin_hash::ProbedTable;
    /// use twin_hash::hash;
    ///
    /// let table: ProbedTable<i64, &str, _, _> =
    ///     ProbedTable::new(16, hash::int_div, i64::cmp);
    /// assert_eq!(table.capacity(), 16);
    /// assert!(table.is_empty());
    /// ```
    pub fn new(capacity: usize, hasher: H, comparator: C) -> Self {
        Self {
            slots: Self::empty_slots(capacity),
            len: 0,
            hasher,
            comparator,
        }
    }

    /// Inserts `key -> value`, replacing and returning the previous value if
    /// the key is already present.
    ///
    /// The growth check runs first, before the table looks for the key, so
    /// an insert over an existing key can still double the capacity.
    ///
    /// # Examples
    ///
    /// ```
    /// use twin_hash::ProbedTable;
    /// use twin_hash::hash;
    ///
    /// let mut table = ProbedTable::new(8, hash::int_div, i64::cmp);
    /// assert_eq!(table.insert(1_i64, "old"), None);
    /// assert_eq!(table.insert(1, "new"), Some("old"));
    /// assert_eq!(table.len(), 1);
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.grow_if_needed();
        match self.probe(&key) {
            Probe::Hit(index) => {
                let Slot::Occupied { value: occupant, .. } = &mut self.slots[index] else {
                    unreachable!("probe hit a slot that is not occupied");
                };
                Some(mem::replace(occupant, value))
            }
            Probe::Miss(Some(index)) => {
                self.slots[index] = Slot::Occupied { key, value };
                self.len += 1;
                None
            }
            Probe::Miss(None) => unreachable!("a grown table always has a free slot"),
        }
    }

    /// Inserts `key -> value` only if the key is absent; an occupied key
    /// returns the rejected pair unchanged in `Err`.
    ///
    /// # Examples
    ///
    /// ```
    /// use twin_hash::ProbedTable;
    /// use twin_hash::hash;
    ///
    /// let mut table = ProbedTable::new(8, hash::int_div, i64::cmp);
    /// assert_eq!(table.try_insert(1_i64, "kept"), Ok(()));
    /// assert_eq!(table.try_insert(1, "rejected"), Err((1, "rejected")));
    /// assert_eq!(table.get(&1), Some(&"kept"));
    /// ```
    pub fn try_insert(&mut self, key: K, value: V) -> Result<(), (K, V)> {
        self.grow_if_needed();
        match self.probe(&key) {
            Probe::Hit(_) => Err((key, value)),
            Probe::Miss(Some(index)) => {
                self.slots[index] = Slot::Occupied { key, value };
                self.len += 1;
                Ok(())
            }
            Probe::Miss(None) => unreachable!("a grown table always has a free slot"),
        }
    }

    /// Returns a reference to the value stored for `key`.
    pub fn get(&self, key: &K) -> Option<&V> {
        if self.len == 0 {
            return None;
        }
        match self.probe(key) {
            Probe::Hit(index) => {
                let Slot::Occupied { value, .. } = &self.slots[index] else {
                    unreachable!("probe hit a slot that is not occupied");
                };
                Some(value)
            }
            Probe::Miss(_) => None,
        }
    }

    /// Returns a mutable reference to the value stored for `key`.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        if self.len == 0 {
            return None;
        }
        match self.probe(key) {
            Probe::Hit(index) => {
                let Slot::Occupied { value, .. } = &mut self.slots[index] else {
                    unreachable!("probe hit a slot that is not occupied");
                };
                Some(value)
            }
            Probe::Miss(_) => None,
        }
    }

    /// Returns `true` if `key` has a live entry.
    pub fn contains_key(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Removes `key`'s entry and returns its value, leaving a tombstone in
    /// its slot. Absent keys are a size-preserving no-op returning `None`.
    ///
    /// A removal that leaves the load factor at or below 0.125 halves the
    /// capacity (never below 1).
    ///
    /// # Examples
    ///
    /// ```
    /// use twin_hash::ProbedTable;
    /// use twin_hash::hash;
    ///
    /// let mut table = ProbedTable::new(8, hash::int_div, i64::cmp);
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
        if self.len == 0 {
            return None;
        }
        let index = match self.probe(key) {
            Probe::Hit(index) => index,
            Probe::Miss(_) => return None,
        };
        let Slot::Occupied { key, value } = mem::replace(&mut self.slots[index], Slot::Tombstone)
        else {
            unreachable!("probe hit a slot that is not occupied");
        };
        self.len -= 1;
        self.shrink_if_sparse();
        Some((key, value))
    }

    /// Rehashes every entry into a table of at least `new_capacity` slots,
    /// erasing tombstones. The capacity is doubled as often as needed to
    /// keep the live entries below the growth threshold, so a request the
    /// entries do not fit under is rounded up rather than honored.
    ///
    /// Panics if `new_capacity` is zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use twin_hash::ProbedTable;
    /// use twin_hash::hash;
    ///
    /// let mut table = ProbedTable::new(8, hash::int_div, i64::cmp);
    /// table.insert(1_i64, "one");
    /// table.resize(64);
    /// assert_eq!(table.capacity(), 64);
    /// assert_eq!(table.get(&1), Some(&"one"));
    /// ```
    pub fn resize(&mut self, new_capacity: usize) {
        assert!(new_capacity > 0, "new capacity must be positive");
        self.rebuild(new_capacity);
    }

    /// Walks the probe sequence for `key`. The scan is bounded by the slot
    /// count: a pass over every slot without finding the key or an empty
    /// slot is a miss, with the first tombstone seen as the insert
    /// candidate. Tombstones never end the scan.
    fn probe(&self, key: &K) -> Probe {
        let capacity = self.slots.len();
        let mut index = (self.hasher)(key, capacity);
        debug_assert!(index < capacity, "hasher returned an out-of-range slot");
        let mut tombstone = None;
        for _ in 0..capacity {
            match &self.slots[index] {
                Slot::Empty => return Probe::Miss(Some(tombstone.unwrap_or(index))),
                Slot::Occupied { key: occupant, .. } => {
                    if (self.comparator)(key, occupant) == Ordering::Equal {
                        return Probe::Hit(index);
                    }
                }
                Slot::Tombstone => {
                    if tombstone.is_none() {
                        tombstone = Some(index);
                    }
                }
            }
            index = (index + 1) % capacity;
        }
        Probe::Miss(tombstone)
    }

    fn grow_if_needed(&mut self) {
        if 2 * self.len >= self.slots.len() {
            let target = (self.slots.len() * 2).max(1);
            self.rebuild(target);
        }
    }

    fn shrink_if_sparse(&mut self) {
        if 8 * self.len <= self.slots.len() {
            let target = (self.slots.len() / 2).max(1);
            if target < self.slots.len() {
                self.rebuild(target);
            }
        }
    }

    fn rebuild(&mut self, requested: usize) {
        let mut capacity = requested.max(1);
        // Double until the live entries sit below the growth threshold, so
        // re-placing them cannot call for another resize mid-pass.
        while 2 * self.len >= capacity {
            capacity *= 2;
        }
        let old = mem::replace(&mut self.slots, Vec::new());
        let mut slots = Self::empty_slots(capacity);
        for slot in old {
            if let Slot::Occupied { key, value } = slot {
                Self::place(&self.hasher, &mut slots, key, value);
            }
        }
        self.slots = slots;
    }

    /// Raw placement into storage known to have a free slot and no entry
    /// for `key`. Does not touch `len`.
    fn place(hasher: &H, slots: &mut [Slot<K, V>], key: K, value: V) {
        let capacity = slots.len();
        let mut index = hasher(&key, capacity);
        debug_assert!(index < capacity, "hasher returned an out-of-range slot");
        while matches!(slots[index], Slot::Occupied { .. }) {
            index = (index + 1) % capacity;
        }
        slots[index] = Slot::Occupied { key, value };
    }
}

impl<K, V, H, C> Debug for ProbedTable<K, V, H, C>
where
    K: Debug,
    V: Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Borrowed iterator over a [`ProbedTable`]'s `(&key, &value)` pairs.
pub struct Iter<'a, K, V> {
    slots: core::slice::Iter<'a, Slot<K, V>>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.slots.next()? {
                Slot::Occupied { key, value } => return Some((key, value)),
                Slot::Empty | Slot::Tombstone => {}
            }
        }
    }
}

/// Borrowed iterator over a [`ProbedTable`]'s live keys.
pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(key, _)| key)
    }
}

/// Owning iterator returned by [`ProbedTable::drain`].
pub struct Drain<K, V> {
    slots: alloc::vec::IntoIter<Slot<K, V>>,
}

impl<K, V> Iterator for Drain<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.slots.next()? {
                Slot::Occupied { key, value } => return Some((key, value)),
                Slot::Empty | Slot::Tombstone => {}
            }
        }
    }
}

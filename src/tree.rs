use alloc::boxed::Box;
use alloc::vec::Vec;
use core::cmp::Ordering;
use core::fmt;
use core::fmt::Debug;
use core::mem;

struct Node<K, V> {
    key: K,
    value: V,
    left: Link<K, V>,
    right: Link<K, V>,
}

type Link<K, V> = Option<Box<Node<K, V>>>;

/// An ordered map backed by an unbalanced binary search tree.
///
/// Ordering comes from the same comparator contract the hash tables use, a
/// `C: Fn(&K, &K) -> Ordering` fixed at construction, so a table keyed by a
/// custom ordering can hand the identical function to both containers. No
/// rebalancing is performed: the shape of the tree is the insertion order's
/// doing, and a sorted insertion sequence degenerates into a list.
///
/// Iteration is in comparator order. Removing a node with two children
/// promotes its in-order predecessor, the maximum of the left subtree.
///
/// # Examples
///
/// ```
/// use twin_hash::TreeMap;
///
/// let mut map = TreeMap::new(i64::cmp);
/// map.insert(2_i64, "b");
/// map.insert(1, "a");
/// map.insert(3, "c");
///
/// let keys: Vec<&i64> = map.keys().collect();
/// assert_eq!(keys, [&1, &2, &3]);
/// assert_eq!(map.min(), Some((&1, &"a")));
/// ```
pub struct TreeMap<K, V, C> {
    root: Link<K, V>,
    len: usize,
    comparator: C,
}

impl<K, V, C> TreeMap<K, V, C> {
    /// Returns the number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the map holds no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.root = None;
        self.len = 0;
    }

    /// Returns the height of the tree as an edge count. Empty and
    /// single-node trees both have height 0.
    pub fn height(&self) -> usize {
        self.root.as_deref().map_or(0, Self::depth)
    }

    fn depth(node: &Node<K, V>) -> usize {
        let left = node.left.as_deref().map_or(0, |child| 1 + Self::depth(child));
        let right = node.right.as_deref().map_or(0, |child| 1 + Self::depth(child));
        left.max(right)
    }

    /// Returns the smallest entry.
    pub fn min(&self) -> Option<(&K, &V)> {
        let mut node = self.root.as_deref()?;
        while let Some(left) = node.left.as_deref() {
            node = left;
        }
        Some((&node.key, &node.value))
    }

    /// Returns the largest entry.
    pub fn max(&self) -> Option<(&K, &V)> {
        let mut node = self.root.as_deref()?;
        while let Some(right) = node.right.as_deref() {
            node = right;
        }
        Some((&node.key, &node.value))
    }

    /// Removes and returns the smallest entry.
    pub fn remove_min(&mut self) -> Option<(K, V)> {
        let node = Self::detach_min(&mut self.root)?;
        self.len -= 1;
        let Node { key, value, .. } = *node;
        Some((key, value))
    }

    /// Removes and returns the largest entry.
    pub fn remove_max(&mut self) -> Option<(K, V)> {
        let node = Self::detach_max(&mut self.root)?;
        self.len -= 1;
        let Node { key, value, .. } = *node;
        Some((key, value))
    }

    /// Iterates over `(&key, &value)` pairs in comparator order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        let mut iter = Iter { stack: Vec::new() };
        iter.descend(self.root.as_deref());
        iter
    }

    /// Iterates over the keys in comparator order.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    /// Calls `visit` once per entry, smallest key first.
    pub fn traverse_in_order<F>(&self, mut visit: F)
    where
        F: FnMut(&K, &V),
    {
        for (key, value) in self.iter() {
            visit(key, value);
        }
    }

    /// Detaches the minimum node. Its right subtree takes its place.
    fn detach_min(link: &mut Link<K, V>) -> Option<Box<Node<K, V>>> {
        match link {
            None => None,
            Some(node) if node.left.is_some() => Self::detach_min(&mut node.left),
            Some(_) => {
                let mut node = link.take()?;
                *link = node.right.take();
                Some(node)
            }
        }
    }

    /// Detaches the maximum node. Its left subtree takes its place.
    fn detach_max(link: &mut Link<K, V>) -> Option<Box<Node<K, V>>> {
        match link {
            None => None,
            Some(node) if node.right.is_some() => Self::detach_max(&mut node.right),
            Some(_) => {
                let mut node = link.take()?;
                *link = node.left.take();
                Some(node)
            }
        }
    }

    /// Unlinks the node at `link`, splicing its subtrees back together.
    fn unlink(link: &mut Link<K, V>) -> Option<Box<Node<K, V>>> {
        let mut node = link.take()?;
        *link = match (node.left.take(), node.right.take()) {
            (None, rest) | (rest, None) => rest,
            (mut left, right) => {
                // Two children: the in-order predecessor, the maximum of
                // the left subtree, takes the node's place.
                let Some(mut replacement) = Self::detach_max(&mut left) else {
                    unreachable!("a node with two children has a non-empty left subtree");
                };
                replacement.left = left;
                replacement.right = right;
                Some(replacement)
            }
        };
        Some(node)
    }
}

impl<K, V, C> TreeMap<K, V, C>
where
    C: Fn(&K, &K) -> Ordering,
{
    /// Creates an empty map ordered by `comparator`.
    ///
    /// # Examples
    ///
    /// ```
    /// use twin_hash::TreeMap;
    ///
    /// let map: TreeMap<i64, &str, _> = TreeMap::new(i64::cmp);
    /// assert!(map.is_empty());
    /// ```
    pub fn new(comparator: C) -> Self {
        Self {
            root: None,
            len: 0,
            comparator,
        }
    }

    /// Inserts `key -> value`, replacing and returning the previous value if
    /// the key is already present.
    ///
    /// # Examples
    ///
    /// ```
    /// use twin_hash::TreeMap;
    ///
    /// let mut map = TreeMap::new(i64::cmp);
    /// assert_eq!(map.insert(1_i64, "old"), None);
    /// assert_eq!(map.insert(1, "new"), Some("old"));
    /// assert_eq!(map.len(), 1);
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let mut previous = None;
        Self::upsert(&self.comparator, &mut self.root, key, value, &mut previous);
        if previous.is_none() {
            self.len += 1;
        }
        previous
    }

    /// Inserts `key -> value` only if the key is absent; an occupied key
    /// returns the rejected pair unchanged in `Err`.
    pub fn try_insert(&mut self, key: K, value: V) -> Result<(), (K, V)> {
        let mut rejected = None;
        Self::insert_absent(&self.comparator, &mut self.root, key, value, &mut rejected);
        match rejected {
            Some(pair) => Err(pair),
            None => {
                self.len += 1;
                Ok(())
            }
        }
    }

    /// Returns a reference to the value stored for `key`.
    pub fn get(&self, key: &K) -> Option<&V> {
        let mut cursor = self.root.as_deref();
        while let Some(node) = cursor {
            cursor = match (self.comparator)(key, &node.key) {
                Ordering::Less => node.left.as_deref(),
                Ordering::Greater => node.right.as_deref(),
                Ordering::Equal => return Some(&node.value),
            };
        }
        None
    }

    /// Returns a mutable reference to the value stored for `key`.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let mut cursor = self.root.as_deref_mut();
        while let Some(node) = cursor {
            cursor = match (self.comparator)(key, &node.key) {
                Ordering::Less => node.left.as_deref_mut(),
                Ordering::Greater => node.right.as_deref_mut(),
                Ordering::Equal => return Some(&mut node.value),
            };
        }
        None
    }

    /// Returns `true` if `key` has an entry.
    pub fn contains_key(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Removes `key`'s entry and returns its value. Absent keys are a no-op
    /// returning `None`.
    ///
    /// # Examples
    ///
    /// ```
    /// use twin_hash::TreeMap;
    ///
    /// let mut map = TreeMap::new(i64::cmp);
    /// for key in [50_i64, 30, 70] {
    ///     map.insert(key, ());
    /// }
    /// assert_eq!(map.remove(&30), Some(()));
    /// assert_eq!(map.remove(&30), None);
    /// assert_eq!(map.len(), 2);
    /// ```
    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.remove_entry(key).map(|(_, value)| value)
    }

    /// Removes `key`'s entry and returns the owned `(key, value)` pair.
    pub fn remove_entry(&mut self, key: &K) -> Option<(K, V)> {
        let node = Self::extract(&self.comparator, &mut self.root, key)?;
        self.len -= 1;
        let Node { key, value, .. } = *node;
        Some((key, value))
    }

    /// Returns the greatest key at most `key`, if any.
    ///
    /// # Examples
    ///
    /// ```
    /// use twin_hash::TreeMap;
    ///
    /// let mut map = TreeMap::new(i64::cmp);
    /// for key in [20_i64, 40, 60] {
    ///     map.insert(key, ());
    /// }
    /// assert_eq!(map.floor(&50), Some(&40));
    /// assert_eq!(map.floor(&40), Some(&40));
    /// assert_eq!(map.floor(&10), None);
    /// ```
    pub fn floor(&self, key: &K) -> Option<&K> {
        let mut best = None;
        let mut cursor = self.root.as_deref();
        while let Some(node) = cursor {
            cursor = match (self.comparator)(key, &node.key) {
                Ordering::Less => node.left.as_deref(),
                Ordering::Greater => {
                    best = Some(&node.key);
                    node.right.as_deref()
                }
                Ordering::Equal => return Some(&node.key),
            };
        }
        best
    }

    /// Returns the smallest key at least `key`, if any.
    pub fn ceiling(&self, key: &K) -> Option<&K> {
        let mut best = None;
        let mut cursor = self.root.as_deref();
        while let Some(node) = cursor {
            cursor = match (self.comparator)(key, &node.key) {
                Ordering::Greater => node.right.as_deref(),
                Ordering::Less => {
                    best = Some(&node.key);
                    node.left.as_deref()
                }
                Ordering::Equal => return Some(&node.key),
            };
        }
        best
    }

    /// Collects the keys in `[low, high]`, both bounds inclusive, in
    /// comparator order. Subtrees that cannot intersect the range are not
    /// descended into.
    ///
    /// # Examples
    ///
    /// ```
    /// use twin_hash::TreeMap;
    ///
    /// let mut map = TreeMap::new(i64::cmp);
    /// for key in [10_i64, 20, 30, 40, 50] {
    ///     map.insert(key, ());
    /// }
    /// assert_eq!(map.keys_range(&20, &40), [&20, &30, &40]);
    /// ```
    pub fn keys_range(&self, low: &K, high: &K) -> Vec<&K> {
        let mut keys = Vec::new();
        Self::collect_range(&self.comparator, self.root.as_deref(), low, high, &mut keys);
        keys
    }

    /// Checks that the tree is a valid search tree under its comparator and
    /// that every key lies in `[low, high]`. An empty map passes.
    pub fn is_bst(&self, low: &K, high: &K) -> bool {
        if !Self::ordered(&self.comparator, self.root.as_deref(), None, None) {
            return false;
        }
        let above_low = self
            .min()
            .map_or(true, |(key, _)| (self.comparator)(low, key) != Ordering::Greater);
        let below_high = self
            .max()
            .map_or(true, |(key, _)| (self.comparator)(key, high) != Ordering::Greater);
        above_low && below_high
    }

    fn upsert(
        comparator: &C,
        link: &mut Link<K, V>,
        key: K,
        value: V,
        previous: &mut Option<V>,
    ) {
        match link {
            None => {
                *link = Some(Box::new(Node {
                    key,
                    value,
                    left: None,
                    right: None,
                }));
            }
            Some(node) => match comparator(&key, &node.key) {
                Ordering::Less => Self::upsert(comparator, &mut node.left, key, value, previous),
                Ordering::Greater => Self::upsert(comparator, &mut node.right, key, value, previous),
                Ordering::Equal => *previous = Some(mem::replace(&mut node.value, value)),
            },
        }
    }

    fn insert_absent(
        comparator: &C,
        link: &mut Link<K, V>,
        key: K,
        value: V,
        rejected: &mut Option<(K, V)>,
    ) {
        match link {
            None => {
                *link = Some(Box::new(Node {
                    key,
                    value,
                    left: None,
                    right: None,
                }));
            }
            Some(node) => match comparator(&key, &node.key) {
                Ordering::Less => {
                    Self::insert_absent(comparator, &mut node.left, key, value, rejected);
                }
                Ordering::Greater => {
                    Self::insert_absent(comparator, &mut node.right, key, value, rejected);
                }
                Ordering::Equal => *rejected = Some((key, value)),
            },
        }
    }

    fn extract(comparator: &C, link: &mut Link<K, V>, key: &K) -> Option<Box<Node<K, V>>> {
        match link {
            None => None,
            Some(node) => match comparator(key, &node.key) {
                Ordering::Less => Self::extract(comparator, &mut node.left, key),
                Ordering::Greater => Self::extract(comparator, &mut node.right, key),
                Ordering::Equal => Self::unlink(link),
            },
        }
    }

    fn collect_range<'a>(
        comparator: &C,
        node: Option<&'a Node<K, V>>,
        low: &K,
        high: &K,
        keys: &mut Vec<&'a K>,
    ) {
        let Some(node) = node else { return };
        let above_low = comparator(low, &node.key) != Ordering::Greater;
        let below_high = comparator(&node.key, high) != Ordering::Greater;
        if above_low {
            Self::collect_range(comparator, node.left.as_deref(), low, high, keys);
        }
        if above_low && below_high {
            keys.push(&node.key);
        }
        if below_high {
            Self::collect_range(comparator, node.right.as_deref(), low, high, keys);
        }
    }

    fn ordered(
        comparator: &C,
        node: Option<&Node<K, V>>,
        low: Option<&K>,
        high: Option<&K>,
    ) -> bool {
        let Some(node) = node else { return true };
        if let Some(bound) = low {
            if comparator(&node.key, bound) != Ordering::Greater {
                return false;
            }
        }
        if let Some(bound) = high {
            if comparator(&node.key, bound) != Ordering::Less {
                return false;
            }
        }
        Self::ordered(comparator, node.left.as_deref(), low, Some(&node.key))
            && Self::ordered(comparator, node.right.as_deref(), Some(&node.key), high)
    }
}

impl<K, V, C> Debug for TreeMap<K, V, C>
where
    K: Debug,
    V: Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Borrowed in-order iterator over a [`TreeMap`]'s `(&key, &value)` pairs.
pub struct Iter<'a, K, V> {
    stack: Vec<&'a Node<K, V>>,
}

impl<'a, K, V> Iter<'a, K, V> {
    fn descend(&mut self, mut link: Option<&'a Node<K, V>>) {
        while let Some(node) = link {
            self.stack.push(node);
            link = node.left.as_deref();
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.descend(node.right.as_deref());
        Some((&node.key, &node.value))
    }
}

/// Borrowed in-order iterator over a [`TreeMap`]'s keys.
pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(key, _)| key)
    }
}

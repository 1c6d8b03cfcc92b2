//! OrderedMap: chained bucket index plus a circular order list over one arena.

use crate::error::InvalidKeyError;
use crate::hash::{bucket_index, fingerprint};
use core::fmt;
use core::mem;
use core::ops::Index;
use core::sync::atomic::{AtomicU64, Ordering};
use slotmap::{DefaultKey, SlotMap};

/// Bucket count used when none is given.
pub const DEFAULT_CAPACITY: usize = 11;
/// Fraction of the bucket count that may be occupied before a resize.
pub const DEFAULT_LOAD_FACTOR: f64 = 0.75;
/// Smallest bucket count a map will ever hold.
pub const MIN_CAPACITY: usize = 1;
/// Smallest accepted load factor. Below it the first insertion would need
/// more than a thousand buckets just to reach a threshold of one.
pub const MIN_LOAD_FACTOR: f64 = 1.0 / 1024.0;

#[derive(Debug, Clone)]
pub(crate) struct Entry<V> {
    pub(crate) key: String,
    pub(crate) value: V,
    hash: i32,
    chain_next: Option<DefaultKey>,
}

/// Position in the circular order list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Links {
    pub(crate) before: DefaultKey,
    pub(crate) after: DefaultKey,
}

impl Links {
    fn detached(k: DefaultKey) -> Self {
        Links {
            before: k,
            after: k,
        }
    }
}

/// Arena node. `entry` is `None` only for the header.
#[derive(Debug, Clone)]
pub(crate) struct Node<V> {
    pub(crate) entry: Option<Entry<V>>,
    pub(crate) links: Links,
}

/// A string-keyed map that iterates in insertion order, where re-setting a
/// key moves it to the newest end.
///
/// All nodes live in a single arena; the bucket chains and the order list
/// only hold arena keys, so neither structure owns an entry.
pub struct OrderedMap<V> {
    pub(crate) slots: SlotMap<DefaultKey, Node<V>>,
    pub(crate) header: DefaultKey,
    buckets: Vec<Option<DefaultKey>>,
    pub(crate) len: usize,
    load_factor: f64,
    threshold: usize,
    // Bumped on every change to membership or order.
    pub(crate) version: u64,
    // Distinct per instance, clones included.
    pub(crate) id: u64,
}

static NEXT_MAP_ID: AtomicU64 = AtomicU64::new(0);

fn next_map_id() -> u64 {
    NEXT_MAP_ID.fetch_add(1, Ordering::Relaxed)
}

pub(crate) fn threshold_for(capacity: usize, load_factor: f64) -> usize {
    // Float-to-int casts saturate, so huge factors clamp to usize::MAX.
    (capacity as f64 * load_factor).floor() as usize
}

fn next_capacity(capacity: usize) -> usize {
    capacity.saturating_mul(2).saturating_add(1)
}

/// Smallest capacity on the `2n + 1` growth path from `capacity` whose
/// threshold admits `len` entries.
pub(crate) fn capacity_for(mut capacity: usize, load_factor: f64, len: usize) -> usize {
    capacity = capacity.max(MIN_CAPACITY);
    while threshold_for(capacity, load_factor) < len {
        let next = next_capacity(capacity);
        if next == capacity {
            break;
        }
        capacity = next;
    }
    capacity
}

impl<V> OrderedMap<V> {
    /// Creates an empty map with [`DEFAULT_CAPACITY`] buckets and
    /// [`DEFAULT_LOAD_FACTOR`].
    pub fn new() -> Self {
        Self::from_parts(DEFAULT_CAPACITY, DEFAULT_LOAD_FACTOR)
    }

    /// Creates an empty map with `capacity` buckets (at least one).
    pub fn with_capacity(capacity: usize) -> Self {
        Self::from_parts(capacity, DEFAULT_LOAD_FACTOR)
    }

    /// `load_factor` must already be validated.
    pub(crate) fn from_parts(capacity: usize, load_factor: f64) -> Self {
        let capacity = capacity.max(MIN_CAPACITY);
        let mut slots = SlotMap::with_key();
        let header = slots.insert_with_key(|k| Node {
            entry: None,
            links: Links::detached(k),
        });
        Self {
            slots,
            header,
            buckets: vec![None; capacity],
            len: 0,
            load_factor,
            threshold: threshold_for(capacity, load_factor),
            version: 0,
            id: next_map_id(),
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of buckets in the index.
    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }
    pub fn load_factor(&self) -> f64 {
        self.load_factor
    }
    /// Entry count the map may hold before the next insertion resizes it.
    pub fn threshold(&self) -> usize {
        self.threshold
    }

    fn find(&self, key: &str, hash: i32) -> Option<DefaultKey> {
        let mut cursor = self.buckets[bucket_index(hash, self.capacity())];
        while let Some(k) = cursor {
            let entry = self.slots.get(k)?.entry.as_ref()?;
            if entry.hash == hash && entry.key == key {
                return Some(k);
            }
            cursor = entry.chain_next;
        }
        None
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        let k = self.find(key, fingerprint(key))?;
        self.slots[k].entry.as_ref().map(|e| &e.value)
    }

    /// Mutable access to a value. Does not move the entry in iteration order.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        let k = self.find(key, fingerprint(key))?;
        self.slots[k].entry.as_mut().map(|e| &mut e.value)
    }

    pub fn has(&self, key: &str) -> bool {
        self.find(key, fingerprint(key)).is_some()
    }

    /// Oldest entry in iteration order.
    pub fn front(&self) -> Option<(&str, &V)> {
        self.entry_pair(self.slots[self.header].links.after)
    }

    /// Newest entry in iteration order.
    pub fn back(&self) -> Option<(&str, &V)> {
        self.entry_pair(self.slots[self.header].links.before)
    }

    fn entry_pair(&self, k: DefaultKey) -> Option<(&str, &V)> {
        self.slots
            .get(k)?
            .entry
            .as_ref()
            .map(|e| (e.key.as_str(), &e.value))
    }

    /// Sets `key` to `value` and returns the map for chaining.
    ///
    /// A new key is appended at the newest end. An existing key has its
    /// value replaced and is moved to the newest end.
    pub fn set(&mut self, key: impl Into<String>, value: V) -> &mut Self {
        let _ = self.insert(key, value);
        self
    }

    /// Like [`set`](Self::set) for keys that arrive unchecked, e.g. from a
    /// foreign boundary. Rejects a missing key or one that is not UTF-8
    /// without touching the map.
    pub fn try_set<B>(&mut self, key: Option<B>, value: V) -> Result<&mut Self, InvalidKeyError>
    where
        B: AsRef<[u8]>,
    {
        let bytes = key.ok_or(InvalidKeyError::Missing)?;
        let key = core::str::from_utf8(bytes.as_ref())?;
        Ok(self.set(key, value))
    }

    /// Same as [`set`](Self::set) but hands back the replaced value, if any.
    pub fn insert(&mut self, key: impl Into<String>, value: V) -> Option<V> {
        let key = key.into();
        let hash = fingerprint(&key);
        if let Some(k) = self.find(&key, hash) {
            let old = self.slots[k]
                .entry
                .as_mut()
                .map(|e| mem::replace(&mut e.value, value));
            self.touch(k);
            return old;
        }

        self.len += 1;
        if self.len > self.threshold {
            self.grow(capacity_for(self.capacity(), self.load_factor, self.len));
        }

        let bucket = bucket_index(hash, self.capacity());
        let header = self.header;
        let k = self.slots.insert(Node {
            entry: Some(Entry {
                key,
                value,
                hash,
                chain_next: self.buckets[bucket],
            }),
            links: Links::detached(header),
        });
        self.buckets[bucket] = Some(k);
        self.link_last(k);
        self.version += 1;
        None
    }

    /// Makes room for `additional` more entries without resizing.
    pub fn reserve(&mut self, additional: usize) {
        let wanted = self.len.saturating_add(additional);
        let capacity = capacity_for(self.capacity(), self.load_factor, wanted);
        if capacity > self.capacity() {
            self.grow(capacity);
        }
    }

    /// Removes `key`; returns whether it was present.
    pub fn delete(&mut self, key: &str) -> bool {
        self.remove(key).is_some()
    }

    /// Removes `key` and returns its value.
    pub fn remove(&mut self, key: &str) -> Option<V> {
        let hash = fingerprint(key);
        let bucket = bucket_index(hash, self.capacity());
        let mut prev: Option<DefaultKey> = None;
        let mut cursor = self.buckets[bucket];
        while let Some(k) = cursor {
            let entry = self.slots.get(k)?.entry.as_ref()?;
            if entry.hash == hash && entry.key == key {
                let next = entry.chain_next;
                match prev {
                    None => self.buckets[bucket] = next,
                    Some(p) => {
                        if let Some(pe) = self.slots[p].entry.as_mut() {
                            pe.chain_next = next;
                        }
                    }
                }
                self.unlink(k);
                self.len -= 1;
                self.version += 1;
                return self.slots.remove(k)?.entry.map(|e| e.value);
            }
            prev = cursor;
            cursor = entry.chain_next;
        }
        None
    }

    /// Drops every entry. Both the index and the order list return to
    /// their empty state; the bucket count is kept.
    pub fn clear(&mut self) {
        let header = self.header;
        self.slots.retain(|k, _| k == header);
        self.slots[header].links = Links::detached(header);
        self.buckets.fill(None);
        log::trace!("cleared {} entries", self.len);
        self.len = 0;
        self.version += 1;
    }

    fn link_last(&mut self, k: DefaultKey) {
        let header = self.header;
        let last = self.slots[header].links.before;
        self.slots[k].links = Links {
            before: last,
            after: header,
        };
        self.slots[last].links.after = k;
        self.slots[header].links.before = k;
    }

    fn unlink(&mut self, k: DefaultKey) {
        let Links { before, after } = self.slots[k].links;
        self.slots[before].links.after = after;
        self.slots[after].links.before = before;
        self.slots[k].links = Links::detached(k);
    }

    fn touch(&mut self, k: DefaultKey) {
        if self.slots[self.header].links.before != k {
            self.unlink(k);
            self.link_last(k);
        }
        self.version += 1;
    }

    /// Rebuilds the chains for `capacity` buckets by walking the order list
    /// oldest to newest. The order list itself is left alone.
    fn grow(&mut self, capacity: usize) {
        let old_capacity = self.capacity();
        let mut buckets = vec![None; capacity];
        let mut cursor = self.slots[self.header].links.after;
        while cursor != self.header {
            let node = &mut self.slots[cursor];
            if let Some(entry) = node.entry.as_mut() {
                let b = bucket_index(entry.hash, capacity);
                entry.chain_next = buckets[b];
                buckets[b] = Some(cursor);
            }
            cursor = node.links.after;
        }
        self.buckets = buckets;
        self.threshold = threshold_for(capacity, self.load_factor);
        log::debug!(
            "resized from {} to {} buckets at {} entries (threshold {})",
            old_capacity,
            capacity,
            self.len,
            self.threshold
        );
    }

    /// Panics if the index and the order list disagree.
    #[cfg(test)]
    pub(crate) fn assert_invariants(&self) {
        use std::collections::HashSet;

        // Order list: symmetric links, closes on the header, visits `len` entries.
        let header = &self.slots[self.header];
        assert!(header.entry.is_none(), "header must carry no entry");
        let mut seen = HashSet::new();
        let mut cursor = self.header;
        loop {
            let links = self.slots[cursor].links;
            assert_eq!(self.slots[links.after].links.before, cursor);
            assert_eq!(self.slots[links.before].links.after, cursor);
            cursor = links.after;
            if cursor == self.header {
                break;
            }
            assert!(seen.insert(cursor), "order list revisits a node");
        }
        assert_eq!(seen.len(), self.len);
        assert_eq!(self.slots.len(), self.len + 1, "arena holds stray nodes");

        // Chains: each entry appears once, in the bucket its hash selects.
        let mut chained = HashSet::new();
        for (b, head) in self.buckets.iter().enumerate() {
            let mut cursor = *head;
            while let Some(k) = cursor {
                let entry = self.slots[k].entry.as_ref().expect("chain holds header");
                assert_eq!(entry.hash, fingerprint(&entry.key));
                assert_eq!(bucket_index(entry.hash, self.capacity()), b);
                assert!(chained.insert(k), "entry chained twice");
                cursor = entry.chain_next;
            }
        }
        assert_eq!(chained, seen);
        assert!(self.len <= self.threshold || self.threshold == usize::MAX);
        assert_eq!(self.threshold, threshold_for(self.capacity(), self.load_factor));
    }
}

impl<V: Clone> Clone for OrderedMap<V> {
    /// Copies entries, order and sizing. The copy is a distinct map, so
    /// cursors taken from `self` are not valid on it.
    fn clone(&self) -> Self {
        Self {
            slots: self.slots.clone(),
            header: self.header,
            buckets: self.buckets.clone(),
            len: self.len,
            load_factor: self.load_factor,
            threshold: self.threshold,
            version: self.version,
            id: next_map_id(),
        }
    }
}

impl<V> Default for OrderedMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Index<&str> for OrderedMap<V> {
    type Output = V;

    /// Panics if `key` is absent.
    fn index(&self, key: &str) -> &V {
        match self.get(key) {
            Some(v) => v,
            None => panic!("no entry found for key {key:?}"),
        }
    }
}

impl<V: fmt::Debug> fmt::Debug for OrderedMap<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Two maps are equal when they yield the same pairs in the same order.
impl<V: PartialEq> PartialEq for OrderedMap<V> {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl<V: Eq> Eq for OrderedMap<V> {}

impl<K: Into<String>, V> Extend<(K, V)> for OrderedMap<V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        self.reserve(iter.size_hint().0);
        for (k, v) in iter {
            self.set(k, v);
        }
    }
}

impl<K: Into<String>, V> FromIterator<(K, V)> for OrderedMap<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs<V: Clone>(m: &OrderedMap<V>) -> Vec<(String, V)> {
        m.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    /// Invariant: a fresh map is empty with its header self-looped.
    #[test]
    fn new_map_is_empty_self_loop() {
        let m: OrderedMap<i32> = OrderedMap::new();
        assert!(m.is_empty());
        assert_eq!(m.capacity(), DEFAULT_CAPACITY);
        assert_eq!(m.threshold(), 8);
        let links = m.slots[m.header].links;
        assert_eq!(links.before, m.header);
        assert_eq!(links.after, m.header);
        assert!(m.front().is_none());
        assert!(m.back().is_none());
        m.assert_invariants();
    }

    /// Invariant: a zero capacity is clamped to the minimum.
    #[test]
    fn zero_capacity_clamped() {
        let mut m = OrderedMap::with_capacity(0);
        assert_eq!(m.capacity(), MIN_CAPACITY);
        assert_eq!(m.threshold(), 0);
        m.set("a", 1);
        assert_eq!(m.capacity(), 3);
        assert_eq!(m.get("a"), Some(&1));
        m.assert_invariants();
    }

    /// Invariant: re-setting a key replaces its value, moves it to the end,
    /// and leaves `len` unchanged.
    #[test]
    fn set_existing_touches() {
        let mut m = OrderedMap::new();
        m.set("a", 1).set("b", 2).set("c", 3);
        assert_eq!(m.insert("a", 10), Some(1));
        assert_eq!(m.len(), 3);
        assert_eq!(
            pairs(&m),
            vec![("b".into(), 2), ("c".into(), 3), ("a".into(), 10)]
        );
        assert_eq!(m.front(), Some(("b", &2)));
        assert_eq!(m.back(), Some(("a", &10)));
        m.assert_invariants();
    }

    /// Invariant: touching the newest entry keeps the order intact.
    #[test]
    fn touch_newest_is_stable() {
        let mut m = OrderedMap::new();
        m.set("a", 1).set("b", 2);
        m.set("b", 3);
        assert_eq!(pairs(&m), vec![("a".into(), 1), ("b".into(), 3)]);
        m.assert_invariants();
    }

    /// Invariant: resize follows `2n + 1` and keeps every association and
    /// the relative order.
    #[test]
    fn resize_preserves_order_and_values() {
        let mut m = OrderedMap::with_capacity(2);
        assert_eq!(m.threshold(), 1);
        let keys: Vec<String> = (0..40).map(|i| format!("key-{i}")).collect();
        for (i, k) in keys.iter().enumerate() {
            m.set(k.as_str(), i);
            m.assert_invariants();
        }
        assert!(m.capacity() > 2);
        assert_eq!(m.capacity(), 95); // 2 -> 5 -> 11 -> 23 -> 47 -> 95
        let got: Vec<&str> = m.keys().collect();
        let want: Vec<&str> = keys.iter().map(String::as_str).collect();
        assert_eq!(got, want);
        for (i, k) in keys.iter().enumerate() {
            assert_eq!(m.get(k), Some(&i));
        }
    }

    /// Invariant: a tiny load factor grows far enough in a single insertion
    /// to keep `len <= threshold`.
    #[test]
    fn tiny_load_factor_grows_until_fit() {
        let mut m = OrderedMap::from_parts(1, 0.05);
        for i in 0..5 {
            m.set(i.to_string(), i);
            assert!(m.len() <= m.threshold());
        }
        m.assert_invariants();
    }

    /// Invariant: removal works at the head, middle and tail of a chain.
    #[test]
    fn delete_within_single_chain() {
        // One bucket forces every key into the same chain.
        let mut m = OrderedMap::from_parts(1, 100.0);
        for k in ["a", "b", "c", "d", "e"] {
            m.set(k, k.to_uppercase());
        }
        assert_eq!(m.capacity(), 1);
        assert!(m.delete("e")); // chain head
        assert!(m.delete("c")); // middle
        assert!(m.delete("a")); // chain tail
        assert!(!m.delete("a"));
        assert_eq!(m.len(), 2);
        assert_eq!(
            pairs(&m),
            vec![("b".into(), "B".to_string()), ("d".into(), "D".to_string())]
        );
        m.assert_invariants();
    }

    /// Invariant: deleting an absent key is a no-op.
    #[test]
    fn delete_absent_is_noop() {
        let mut m = OrderedMap::new();
        m.set("x", 1);
        let version = m.version;
        assert!(!m.delete("y"));
        assert_eq!(m.remove("y"), None);
        assert_eq!(m.len(), 1);
        assert_eq!(m.version, version);
        m.assert_invariants();
    }

    /// Invariant: `remove` returns the owned value and frees the arena slot.
    #[test]
    fn remove_returns_value() {
        let mut m = OrderedMap::new();
        m.set("k", String::from("v"));
        assert_eq!(m.remove("k"), Some(String::from("v")));
        assert_eq!(m.slots.len(), 1);
        assert!(m.is_empty());
        m.assert_invariants();
    }

    /// Invariant: clear resets the order list together with the index.
    #[test]
    fn clear_resets_both_structures() {
        let mut m = OrderedMap::with_capacity(2);
        for i in 0..10 {
            m.set(format!("old{i}"), i);
        }
        let capacity = m.capacity();
        m.clear();
        m.assert_invariants();
        assert!(m.is_empty());
        assert_eq!(m.capacity(), capacity);
        assert!(m.iter().next().is_none());

        m.set("new", 1);
        assert_eq!(pairs(&m), vec![("new".into(), 1)]);
        m.assert_invariants();
    }

    /// Invariant: `try_set` rejects bad keys without touching the map.
    #[test]
    fn try_set_rejects_invalid_keys() {
        let mut m = OrderedMap::new();
        m.set("a", 1);
        let version = m.version;

        assert_eq!(
            m.try_set(None::<&str>, 2).map(|_| ()),
            Err(InvalidKeyError::Missing)
        );
        assert!(matches!(
            m.try_set(Some(&[0xc3u8, 0x28][..]), 3),
            Err(InvalidKeyError::NotUtf8(_))
        ));
        assert_eq!(m.len(), 1);
        assert_eq!(m.version, version);
        assert_eq!(pairs(&m), vec![("a".into(), 1)]);

        m.try_set(Some("b"), 4).unwrap().try_set(Some(b"c"), 5).unwrap();
        assert_eq!(m.keys().collect::<Vec<_>>(), ["a", "b", "c"]);
    }

    /// Invariant: `get_mut` changes the value without moving the entry.
    #[test]
    fn get_mut_does_not_touch() {
        let mut m = OrderedMap::new();
        m.set("a", 1).set("b", 2);
        *m.get_mut("a").unwrap() += 40;
        assert_eq!(pairs(&m), vec![("a".into(), 41), ("b".into(), 2)]);
        assert!(m.get_mut("zz").is_none());
    }

    /// Invariant: `reserve` grows ahead of time so later inserts do not.
    #[test]
    fn reserve_pregrows() {
        let mut m: OrderedMap<u8> = OrderedMap::with_capacity(2);
        m.reserve(20);
        assert!(m.threshold() >= 20);
        let capacity = m.capacity();
        for i in 0..20u8 {
            m.set(i.to_string(), i);
        }
        assert_eq!(m.capacity(), capacity);
        m.assert_invariants();
    }

    /// Invariant: equality is order sensitive; Debug prints in order.
    #[test]
    fn eq_and_debug_follow_order() {
        let a: OrderedMap<i32> = [("x", 1), ("y", 2)].into_iter().collect();
        let b: OrderedMap<i32> = [("y", 2), ("x", 1)].into_iter().collect();
        let c = a.clone();
        assert_ne!(a, b);
        assert_eq!(a, c);
        assert_eq!(format!("{a:?}"), r#"{"x": 1, "y": 2}"#);
        assert_eq!(a["y"], 2);
    }

    #[test]
    #[should_panic(expected = "no entry found for key")]
    fn index_missing_panics() {
        let m: OrderedMap<i32> = OrderedMap::new();
        let _v = m["nope"];
    }

    #[test]
    fn capacity_for_walks_growth_path() {
        assert_eq!(capacity_for(11, 0.75, 0), 11);
        assert_eq!(capacity_for(11, 0.75, 8), 11);
        assert_eq!(capacity_for(11, 0.75, 9), 23);
        assert_eq!(capacity_for(0, 0.75, 1), 3);
    }
}

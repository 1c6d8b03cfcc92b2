//! Higher-order helpers layered on [`OrderedMap::iter`]. Each one visits
//! entries oldest to newest and never touches the structure directly.

use crate::ordered_map::OrderedMap;

impl<V> OrderedMap<V> {
    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(&str, &V),
    {
        for (k, v) in self.iter() {
            f(k, v);
        }
    }

    /// Collects `f(key, value)` for every entry, in order.
    pub fn map<T, F>(&self, mut f: F) -> Vec<T>
    where
        F: FnMut(&str, &V) -> T,
    {
        self.iter().map(|(k, v)| f(k, v)).collect()
    }

    /// Builds a new map with the same keys in the same order and `f`
    /// applied to each value. Capacity and load factor carry over, so the
    /// copy never resizes while it is filled.
    pub fn map_to<U, F>(&self, mut f: F) -> OrderedMap<U>
    where
        F: FnMut(&V) -> U,
    {
        let mut out = OrderedMap::from_parts(self.capacity(), self.load_factor());
        for (k, v) in self.iter() {
            out.set(k, f(v));
        }
        out
    }

    /// Left fold over `(key, value)` pairs.
    pub fn foldl<A, F>(&self, init: A, mut f: F) -> A
    where
        F: FnMut(A, &str, &V) -> A,
    {
        self.iter().fold(init, |acc, (k, v)| f(acc, k, v))
    }

    /// Linear scan for a value.
    pub fn contains_value(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.values().any(|v| v == value)
    }
}

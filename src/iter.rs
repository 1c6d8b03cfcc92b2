//! Iteration in order-list order, plus a detached fail-fast cursor.
//!
//! The borrowed iterators hold `&OrderedMap` or `&mut OrderedMap` for their
//! whole lifetime, so the map cannot change underneath them. `Cursor` is
//! for traversals that need to let go of the borrow between steps; it
//! checks the map's version on every step instead.

use crate::error::CursorError;
use crate::ordered_map::{Links, Node, OrderedMap};
use core::iter::FusedIterator;
use slotmap::{DefaultKey, SecondaryMap, SlotMap};

impl<V> OrderedMap<V> {
    /// Pairs from oldest to newest.
    pub fn iter(&self) -> Iter<'_, V> {
        let Links { before, after } = self.slots[self.header].links;
        Iter {
            slots: &self.slots,
            front: after,
            back: before,
            remaining: self.len,
        }
    }

    /// Mutable pairs from oldest to newest.
    ///
    /// Unlike [`iter`](Self::iter) this is not lazy: creating the iterator
    /// allocates a side table sized to the arena and visits every slot
    /// once before the first item is yielded.
    pub fn iter_mut(&mut self) -> IterMut<'_, V> {
        let Links { before, after } = self.slots[self.header].links;
        let remaining = self.len;
        // Split the arena into disjoint per-node borrows keyed by slot so the
        // walk can follow the links while handing out `&mut V`.
        let mut parts = SecondaryMap::with_capacity(self.slots.capacity());
        for (k, node) in self.slots.iter_mut() {
            let links = node.links;
            if let Some(entry) = node.entry.as_mut() {
                parts.insert(
                    k,
                    PartMut {
                        key: entry.key.as_str(),
                        value: &mut entry.value,
                        links,
                    },
                );
            }
        }
        IterMut {
            parts,
            front: after,
            back: before,
            remaining,
        }
    }

    pub fn keys(&self) -> Keys<'_, V> {
        Keys { inner: self.iter() }
    }

    pub fn values(&self) -> Values<'_, V> {
        Values { inner: self.iter() }
    }

    /// Same up-front cost as [`iter_mut`](Self::iter_mut).
    pub fn values_mut(&mut self) -> ValuesMut<'_, V> {
        ValuesMut {
            inner: self.iter_mut(),
        }
    }

    /// Starts a detached traversal at the oldest entry.
    pub fn cursor(&self) -> Cursor {
        Cursor {
            next: self.slots[self.header].links.after,
            version: self.version,
            map_id: self.id,
        }
    }
}

/// Borrowed iterator over `(key, value)` in insertion order.
pub struct Iter<'a, V> {
    slots: &'a SlotMap<DefaultKey, Node<V>>,
    front: DefaultKey,
    back: DefaultKey,
    remaining: usize,
}

impl<V> Clone for Iter<'_, V> {
    fn clone(&self) -> Self {
        Iter {
            slots: self.slots,
            front: self.front,
            back: self.back,
            remaining: self.remaining,
        }
    }
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (&'a str, &'a V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let node = self.slots.get(self.front)?;
        self.front = node.links.after;
        self.remaining -= 1;
        node.entry.as_ref().map(|e| (e.key.as_str(), &e.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> DoubleEndedIterator for Iter<'_, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let node = self.slots.get(self.back)?;
        self.back = node.links.before;
        self.remaining -= 1;
        node.entry.as_ref().map(|e| (e.key.as_str(), &e.value))
    }
}

impl<V> ExactSizeIterator for Iter<'_, V> {}
impl<V> FusedIterator for Iter<'_, V> {}

struct PartMut<'a, V> {
    key: &'a str,
    value: &'a mut V,
    links: Links,
}

/// Borrowed iterator over `(key, &mut value)` in insertion order.
///
/// Holds one disjoint borrow per entry, gathered when it is created; each
/// step then follows the order links through that table.
pub struct IterMut<'a, V> {
    parts: SecondaryMap<DefaultKey, PartMut<'a, V>>,
    front: DefaultKey,
    back: DefaultKey,
    remaining: usize,
}

impl<'a, V> Iterator for IterMut<'a, V> {
    type Item = (&'a str, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let part = self.parts.remove(self.front)?;
        self.front = part.links.after;
        self.remaining -= 1;
        Some((part.key, part.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> DoubleEndedIterator for IterMut<'_, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let part = self.parts.remove(self.back)?;
        self.back = part.links.before;
        self.remaining -= 1;
        Some((part.key, part.value))
    }
}

impl<V> ExactSizeIterator for IterMut<'_, V> {}
impl<V> FusedIterator for IterMut<'_, V> {}

pub struct Keys<'a, V> {
    inner: Iter<'a, V>,
}

impl<'a, V> Iterator for Keys<'a, V> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        self.inner.next().map(|(k, _)| k)
    }
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<V> DoubleEndedIterator for Keys<'_, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(k, _)| k)
    }
}

impl<V> ExactSizeIterator for Keys<'_, V> {}

pub struct Values<'a, V> {
    inner: Iter<'a, V>,
}

impl<'a, V> Iterator for Values<'a, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<&'a V> {
        self.inner.next().map(|(_, v)| v)
    }
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<V> DoubleEndedIterator for Values<'_, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(_, v)| v)
    }
}

impl<V> ExactSizeIterator for Values<'_, V> {}

pub struct ValuesMut<'a, V> {
    inner: IterMut<'a, V>,
}

impl<'a, V> Iterator for ValuesMut<'a, V> {
    type Item = &'a mut V;

    fn next(&mut self) -> Option<&'a mut V> {
        self.inner.next().map(|(_, v)| v)
    }
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<V> ExactSizeIterator for ValuesMut<'_, V> {}

/// Owning iterator; yields `(String, V)` from oldest to newest.
pub struct IntoIter<V> {
    slots: SlotMap<DefaultKey, Node<V>>,
    front: DefaultKey,
    back: DefaultKey,
    remaining: usize,
}

impl<V> Iterator for IntoIter<V> {
    type Item = (String, V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let node = self.slots.remove(self.front)?;
        self.front = node.links.after;
        self.remaining -= 1;
        node.entry.map(|e| (e.key, e.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> DoubleEndedIterator for IntoIter<V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let node = self.slots.remove(self.back)?;
        self.back = node.links.before;
        self.remaining -= 1;
        node.entry.map(|e| (e.key, e.value))
    }
}

impl<V> ExactSizeIterator for IntoIter<V> {}

impl<V> IntoIterator for OrderedMap<V> {
    type Item = (String, V);
    type IntoIter = IntoIter<V>;

    fn into_iter(self) -> IntoIter<V> {
        let Links { before, after } = self.slots[self.header].links;
        IntoIter {
            remaining: self.len,
            slots: self.slots,
            front: after,
            back: before,
        }
    }
}

impl<'a, V> IntoIterator for &'a OrderedMap<V> {
    type Item = (&'a str, &'a V);
    type IntoIter = Iter<'a, V>;

    fn into_iter(self) -> Iter<'a, V> {
        self.iter()
    }
}

impl<'a, V> IntoIterator for &'a mut OrderedMap<V> {
    type Item = (&'a str, &'a mut V);
    type IntoIter = IterMut<'a, V>;

    fn into_iter(self) -> IterMut<'a, V> {
        self.iter_mut()
    }
}

/// A traversal position that does not borrow the map.
///
/// Every [`advance`](Cursor::advance) compares the version recorded at
/// creation against the map's current one. Any insertion of a new key,
/// re-set of an existing key, removal, or clear in between makes the next
/// step fail with [`CursorError::Modified`] instead of skipping or
/// revisiting entries. Value changes through `get_mut`/`iter_mut` do not
/// count as modifications.
///
/// Advancing against any map other than the one that created it (a clone
/// included) fails with [`CursorError::ForeignMap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    next: DefaultKey,
    version: u64,
    map_id: u64,
}

impl Cursor {
    /// Yields the next pair, `Ok(None)` once the newest entry was passed.
    pub fn advance<'a, V>(
        &mut self,
        map: &'a OrderedMap<V>,
    ) -> Result<Option<(&'a str, &'a V)>, CursorError> {
        if self.map_id != map.id {
            return Err(CursorError::ForeignMap);
        }
        if self.version != map.version {
            return Err(CursorError::Modified {
                expected: self.version,
                found: map.version,
            });
        }
        if self.next == map.header {
            return Ok(None);
        }
        let Some(node) = map.slots.get(self.next) else {
            return Ok(None);
        };
        self.next = node.links.after;
        Ok(node.entry.as_ref().map(|e| (e.key.as_str(), &e.value)))
    }
}

//! ordered-chain-map: a single-threaded, string-keyed hash map that
//! iterates in insertion order, with re-set keys moved to the newest end.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: O(1) average lookup and O(1) insertion/removal anywhere in the
//!   iteration order, with both views always agreeing.
//! - Two link structures over one set of nodes:
//!   - Index: a table of singly linked bucket chains; a new entry is
//!     prepended to the chain its key hashes to.
//!   - Order list: a circular doubly linked list anchored at a keyless
//!     header node. `header.after` is the oldest entry and
//!     `header.before` the newest; an empty map is a header self-loop.
//!
//! Storage
//! - Every node, the header included, lives in one `SlotMap` arena. Chain
//!   heads, chain links and order links are generational arena keys, so
//!   neither structure owns a node and a removed node can never be reached
//!   again through a stale key.
//! - Each entry caches its key fingerprint; resizing reuses it and never
//!   rereads the key.
//!
//! Hashing and growth
//! - Fingerprint: base-31 polynomial over UTF-16 code units, wrapping in a
//!   signed 32-bit integer. Bucket = `|fingerprint % capacity|`.
//! - Default capacity 11, default load factor 0.75, threshold =
//!   `floor(capacity * load_factor)`. When an insertion pushes `len` past
//!   the threshold the capacity follows `2n + 1` until it fits again and
//!   the chains are rebuilt in one walk of the order list. The order list
//!   is not touched by a resize.
//!
//! Mutation rules
//! - `set` on a new key appends; on an existing key it replaces the value
//!   and moves the entry to the newest end ("touch").
//! - `delete`/`remove` splice the entry out of its chain and the order
//!   list, then free the arena slot.
//! - `clear` resets the index, the order list and the arena together and
//!   keeps the bucket count.
//! - Every operation either completes on both structures or, for a
//!   rejected key in `try_set`, changes nothing.
//!
//! Traversal
//! - Borrowed iterators hold the map borrow, so mutation during iteration
//!   does not compile.
//! - `Cursor` is a detached position checked against a version counter
//!   that is bumped on any change to membership or order; a stale cursor
//!   errors instead of skipping or revisiting entries.
//!
//! Notes and non-goals
//! - Not thread-safe; callers sharing a map across threads must serialize
//!   access themselves.
//! - Keys are immutable once inserted.
//! - Structural events (resize, clear, bulk pre-grow) are reported through
//!   the `log` facade at debug/trace level.

mod builder;
mod consumers;
pub mod error;
pub mod hash;
pub mod iter;
mod ordered_map;
mod ordered_map_proptest;

// Public surface
pub use builder::OrderedMapBuilder;
pub use error::{ConfigError, CursorError, InvalidKeyError};
pub use iter::{Cursor, IntoIter, Iter, IterMut, Keys, Values, ValuesMut};
pub use ordered_map::{
    OrderedMap, DEFAULT_CAPACITY, DEFAULT_LOAD_FACTOR, MIN_CAPACITY, MIN_LOAD_FACTOR,
};

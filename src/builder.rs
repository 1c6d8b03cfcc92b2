//! Construction options for [`OrderedMap`].

use crate::error::ConfigError;
use crate::ordered_map::{OrderedMap, DEFAULT_CAPACITY, DEFAULT_LOAD_FACTOR, MIN_LOAD_FACTOR};

/// Configures the bucket count and load factor of a new map.
///
/// ```
/// use ordered_chain_map::OrderedMapBuilder;
///
/// let map = OrderedMapBuilder::new()
///     .initial_capacity(4)
///     .load_factor(0.5)
///     .build_from([("a", 1), ("b", 2), ("c", 3)])
///     .unwrap();
/// assert_eq!(map.keys().collect::<Vec<_>>(), ["a", "b", "c"]);
/// assert!(map.capacity() > 4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderedMapBuilder {
    initial_capacity: usize,
    load_factor: f64,
}

impl Default for OrderedMapBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderedMapBuilder {
    pub const fn new() -> Self {
        Self {
            initial_capacity: DEFAULT_CAPACITY,
            load_factor: DEFAULT_LOAD_FACTOR,
        }
    }

    /// Bucket count to start with. Zero is raised to the minimum of one.
    pub fn initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    /// Must be finite and at least [`MIN_LOAD_FACTOR`]; checked by the
    /// `build` methods.
    pub fn load_factor(mut self, load_factor: f64) -> Self {
        self.load_factor = load_factor;
        self
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.load_factor.is_finite() && self.load_factor >= MIN_LOAD_FACTOR {
            Ok(())
        } else {
            Err(ConfigError::LoadFactor(self.load_factor))
        }
    }

    pub fn build<V>(self) -> Result<OrderedMap<V>, ConfigError> {
        self.validate()?;
        Ok(OrderedMap::from_parts(self.initial_capacity, self.load_factor))
    }

    /// Builds a map holding `entries` in the order given.
    ///
    /// Capacity is grown up front from the iterator's lower size bound, then
    /// every pair goes through [`OrderedMap::set`], so a repeated key keeps
    /// the last value and the position of its last occurrence.
    pub fn build_from<K, V, I>(self, entries: I) -> Result<OrderedMap<V>, ConfigError>
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut map = self.build()?;
        let entries = entries.into_iter();
        let hint = entries.size_hint().0;
        let before = map.capacity();
        map.reserve(hint);
        if map.capacity() > before {
            log::debug!(
                "pre-grew bucket table from {} to {} for {} entries",
                before,
                map.capacity(),
                hint
            );
        }
        map.extend(entries);
        Ok(map)
    }
}

impl<V> OrderedMap<V> {
    /// Shorthand for `OrderedMapBuilder` with both knobs set.
    pub fn with_capacity_and_load_factor(
        capacity: usize,
        load_factor: f64,
    ) -> Result<Self, ConfigError> {
        OrderedMapBuilder::new()
            .initial_capacity(capacity)
            .load_factor(load_factor)
            .build()
    }
}

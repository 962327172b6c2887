use super::ThreadedBstMap;
use crate::raw::RawThreadedMap;

impl<K, V> ThreadedBstMap<K, V> {
    /// Creates an empty map with capacity for at least `capacity` entries.
    ///
    /// This is an extension and is not part of the standard `BTreeMap` API.
    ///
    /// # Examples
    ///
    /// ```
    /// use weft_tree::ThreadedBstMap;
    ///
    /// let map: ThreadedBstMap<i32, i32> = ThreadedBstMap::with_capacity(32);
    /// assert!(map.is_empty());
    /// ```
    ///
    /// # Complexity
    ///
    /// O(capacity) for memory allocation.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        ThreadedBstMap {
            raw: RawThreadedMap::with_capacity(capacity),
        }
    }

    /// Returns the current capacity for the map.
    ///
    /// This is an extension and is not part of the standard `BTreeMap` API.
    ///
    /// # Examples
    ///
    /// ```
    /// use weft_tree::ThreadedBstMap;
    ///
    /// let map: ThreadedBstMap<i32, i32> = ThreadedBstMap::with_capacity(32);
    /// assert_eq!(map.capacity(), 32);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.raw.capacity()
    }
}

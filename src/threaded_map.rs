use core::borrow::Borrow;
use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::iter::FusedIterator;
use core::ops::Index;

use crate::raw::{Handle, RawThreadedMap};

mod capacity;

/// An ordered map based on a [threaded binary search tree].
///
/// Given a key type with a [total order], an ordered map stores its entries
/// in key order. That means that keys must be of a type that implements the
/// [`Ord`] trait, such that two keys can always be compared to determine
/// their [`Ordering`]. Examples of keys with a total order are strings with
/// lexicographical order, and numbers with their natural order.
///
/// `ThreadedBstMap` differs from the standard ordered maps in two deliberate
/// ways, both inherited from its contract:
///
/// - **Insertion never replaces.** [`insert`](ThreadedBstMap::insert) on a
///   key that is already present leaves the map untouched and returns
///   `false`. There is no way to mutate a stored value short of
///   [`clear`](ThreadedBstMap::clear)ing and rebuilding the map.
/// - **There is no deletion.** Entries leave the map only through
///   [`clear`](ThreadedBstMap::clear) or by consuming the map.
///
/// Iterators obtained from [`iter`](ThreadedBstMap::iter),
/// [`keys`](ThreadedBstMap::keys), or [`values`](ThreadedBstMap::values)
/// produce their items in key order by following the threads, taking
/// amortized constant time and constant space per item returned. The
/// [`begin`](ThreadedBstMap::begin)/[`next`](ThreadedBstMap::next) pair
/// exposes the same walk as a resumable cursor owned by the map itself.
///
/// It is a logic error for a key to be modified in such a way that the key's
/// ordering relative to any other key, as determined by the [`Ord`] trait,
/// changes while it is in the map. This is normally only possible through
/// [`Cell`], [`RefCell`], global state, I/O, or unsafe code. The behavior
/// resulting from such a logic error is not specified, but will be
/// encapsulated to the `ThreadedBstMap` that observed the logic error and not
/// result in undefined behavior.
///
/// # Examples
///
/// ```
/// use weft_tree::ThreadedBstMap;
///
/// // type inference lets us omit an explicit type signature (which
/// // would be `ThreadedBstMap<&str, &str>` in this example).
/// let mut movie_reviews = ThreadedBstMap::new();
///
/// // review some movies.
/// movie_reviews.insert("Office Space",       "Deals with real issues in the workplace.");
/// movie_reviews.insert("Pulp Fiction",       "Masterpiece.");
/// movie_reviews.insert("The Godfather",      "Very enjoyable.");
/// movie_reviews.insert("The Blues Brothers", "Eye lyked it a lot.");
///
/// // check for a specific one.
/// if !movie_reviews.contains_key("Les Miserables") {
///     println!("We've got {} reviews, but Les Miserables ain't one.",
///              movie_reviews.len());
/// }
///
/// // look up the values associated with some keys.
/// let to_find = ["Up!", "Office Space"];
/// for movie in &to_find {
///     match movie_reviews.get(movie) {
///        Some(review) => println!("{movie}: {review}"),
///        None => println!("{movie} is unreviewed.")
///     }
/// }
///
/// // Look up the value for a key (will panic if the key is not found).
/// println!("Movie review: {}", movie_reviews["Office Space"]);
///
/// // iterate over everything.
/// for (movie, review) in &movie_reviews {
///     println!("{movie}: \"{review}\"");
/// }
/// ```
///
/// A `ThreadedBstMap` with a known list of items can be initialized from an
/// array:
///
/// ```
/// use weft_tree::ThreadedBstMap;
///
/// let solar_distance = ThreadedBstMap::from([
///     ("Mercury", 0.4),
///     ("Venus", 0.7),
///     ("Earth", 1.0),
///     ("Mars", 1.5),
/// ]);
/// ```
///
/// # Background
///
/// A binary search tree yields its keys in sorted order under an inorder
/// traversal, but the textbook traversal needs either recursion or an
/// explicit stack - O(height) space - because after finishing a left subtree
/// there is no link back up to the node that comes next. A *threaded* tree
/// recycles the wasted null right-child slots to store exactly that link:
/// wherever a node has no right subtree, its right slot instead references
/// the node's inorder successor. Stepping through the whole tree then needs
/// no memory beyond a single cursor: from a threaded node, follow the thread
/// (one hop); from a node with a real right subtree, descend to that
/// subtree's leftmost node.
///
/// The price is paid at insertion time. A new node always enters the tree as
/// a threaded leaf, and inserting to the right of a previously-threaded node
/// must hand the parent's old thread over to the new node before the parent's
/// slot is converted into a true child link. Getting that hand-over wrong
/// silently breaks the successor chain for every node that used to reach its
/// successor through the parent - which is why this implementation models the
/// right slot as a tagged union and rebuilds threads from scratch (by
/// re-inserting) whenever a tree is cloned.
///
/// The tree is otherwise a plain BST: no rebalancing, so operations degrade
/// from O(log n) to O(n) on adversarial (e.g. sorted) insertion orders.
///
/// [threaded binary search tree]: https://en.wikipedia.org/wiki/Threaded_binary_tree
/// [total order]: https://en.wikipedia.org/wiki/Total_order
/// [`Cell`]: core::cell::Cell
/// [`RefCell`]: core::cell::RefCell
pub struct ThreadedBstMap<K, V> {
    raw: RawThreadedMap<K, V>,
}

/// An iterator over the entries of a `ThreadedBstMap`.
///
/// This `struct` is created by the [`iter`] method on [`ThreadedBstMap`]. See
/// its documentation for more.
///
/// The iterator walks the tree's threads, so it runs in constant space and is
/// forward-only: threads link each node to its successor, not its
/// predecessor, so there is no `DoubleEndedIterator` implementation.
///
/// # Examples
///
/// ```
/// use weft_tree::ThreadedBstMap;
///
/// let map = ThreadedBstMap::from([(1, "a"), (2, "b")]);
/// let mut iter = map.iter();
/// assert_eq!(iter.next(), Some((&1, &"a")));
/// assert_eq!(iter.next(), Some((&2, &"b")));
/// assert_eq!(iter.next(), None);
/// ```
///
/// [`iter`]: ThreadedBstMap::iter
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, K, V> {
    tree: Option<&'a RawThreadedMap<K, V>>,
    next: Option<Handle>,
    remaining: usize,
}

/// An owning iterator over the entries of a `ThreadedBstMap`, sorted by key.
///
/// This `struct` is created by the [`into_iter`] method on [`ThreadedBstMap`]
/// (provided by the [`IntoIterator`] trait). See its documentation for more.
///
/// # Examples
///
/// ```
/// use weft_tree::ThreadedBstMap;
///
/// let map = ThreadedBstMap::from([(1, "a"), (2, "b")]);
/// let mut iter = map.into_iter();
/// assert_eq!(iter.next(), Some((1, "a")));
/// assert_eq!(iter.next_back(), Some((2, "b")));
/// assert_eq!(iter.next(), None);
/// ```
///
/// [`into_iter`]: IntoIterator::into_iter
pub struct IntoIter<K, V> {
    inner: alloc::vec::IntoIter<(K, V)>,
}

/// An iterator over the keys of a `ThreadedBstMap`.
///
/// This `struct` is created by the [`keys`] method on [`ThreadedBstMap`]. See
/// its documentation for more.
///
/// # Examples
///
/// ```
/// use weft_tree::ThreadedBstMap;
///
/// let map = ThreadedBstMap::from([(2, "b"), (1, "a")]);
/// let keys: Vec<_> = map.keys().copied().collect();
/// assert_eq!(keys, [1, 2]);
/// ```
///
/// [`keys`]: ThreadedBstMap::keys
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

/// An iterator over the values of a `ThreadedBstMap`.
///
/// This `struct` is created by the [`values`] method on [`ThreadedBstMap`].
/// See its documentation for more.
///
/// # Examples
///
/// ```
/// use weft_tree::ThreadedBstMap;
///
/// let map = ThreadedBstMap::from([(1, "a"), (2, "b")]);
/// let values: Vec<_> = map.values().copied().collect();
/// assert_eq!(values, ["a", "b"]);
/// ```
///
/// [`values`]: ThreadedBstMap::values
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

/// An owning iterator over the keys of a `ThreadedBstMap`.
///
/// This `struct` is created by the [`into_keys`] method on
/// [`ThreadedBstMap`]. See its documentation for more.
///
/// # Examples
///
/// ```
/// use weft_tree::ThreadedBstMap;
///
/// let map = ThreadedBstMap::from([(2, "b"), (1, "a")]);
/// let mut keys = map.into_keys();
/// assert_eq!(keys.next(), Some(1));
/// assert_eq!(keys.next_back(), Some(2));
/// assert_eq!(keys.next(), None);
/// ```
///
/// [`into_keys`]: ThreadedBstMap::into_keys
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct IntoKeys<K, V> {
    inner: IntoIter<K, V>,
}

/// An owning iterator over the values of a `ThreadedBstMap`.
///
/// This `struct` is created by the [`into_values`] method on
/// [`ThreadedBstMap`]. See its documentation for more.
///
/// # Examples
///
/// ```
/// use weft_tree::ThreadedBstMap;
///
/// let map = ThreadedBstMap::from([(1, "hello"), (2, "goodbye")]);
/// let mut values = map.into_values();
/// assert_eq!(values.next(), Some("hello"));
/// assert_eq!(values.next_back(), Some("goodbye"));
/// assert_eq!(values.next(), None);
/// ```
///
/// [`into_values`]: ThreadedBstMap::into_values
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct IntoValues<K, V> {
    inner: IntoIter<K, V>,
}

impl<K, V> ThreadedBstMap<K, V> {
    /// Makes a new, empty `ThreadedBstMap`.
    ///
    /// Does not allocate anything on its own.
    ///
    /// # Complexity
    ///
    /// O(1)
    ///
    /// # Examples
    ///
    /// ```
    /// use weft_tree::ThreadedBstMap;
    ///
    /// let mut map = ThreadedBstMap::new();
    ///
    /// // entries can now be inserted into the empty map
    /// map.insert(1, "a");
    /// ```
    #[must_use]
    pub const fn new() -> ThreadedBstMap<K, V> {
        ThreadedBstMap {
            raw: RawThreadedMap::new(),
        }
    }

    /// Clears the map, removing all elements.
    ///
    /// This is the only way entries ever leave a borrowed map: the contract
    /// has no per-key removal.
    ///
    /// # Complexity
    ///
    /// O(n)
    ///
    /// # Examples
    ///
    /// ```
    /// use weft_tree::ThreadedBstMap;
    ///
    /// let mut a = ThreadedBstMap::new();
    /// a.insert(1, "a");
    /// a.clear();
    /// assert!(a.is_empty());
    /// ```
    pub fn clear(&mut self) {
        self.raw.clear();
    }

    /// Returns the number of entries in the map.
    ///
    /// # Complexity
    ///
    /// O(1)
    ///
    /// # Examples
    ///
    /// ```
    /// use weft_tree::ThreadedBstMap;
    ///
    /// let mut a = ThreadedBstMap::new();
    /// assert_eq!(a.len(), 0);
    /// a.insert(1, "a");
    /// assert_eq!(a.len(), 1);
    /// ```
    #[must_use]
    pub const fn len(&self) -> usize {
        self.raw.len()
    }

    /// Returns `true` if the map contains no entries.
    ///
    /// # Examples
    ///
    /// ```
    /// use weft_tree::ThreadedBstMap;
    ///
    /// let mut a = ThreadedBstMap::new();
    /// assert!(a.is_empty());
    /// a.insert(1, "a");
    /// assert!(!a.is_empty());
    /// ```
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Gets an iterator over the entries of the map, sorted by key.
    ///
    /// The iterator follows the tree's threads: O(1) space, amortized O(1)
    /// per step, forward-only. It is independent of the
    /// [`begin`](ThreadedBstMap::begin)/[`next`](ThreadedBstMap::next)
    /// cursor and any number of iterators may be live at once.
    ///
    /// # Examples
    ///
    /// ```
    /// use weft_tree::ThreadedBstMap;
    ///
    /// let mut map = ThreadedBstMap::new();
    /// map.insert(3, "c");
    /// map.insert(2, "b");
    /// map.insert(1, "a");
    ///
    /// for (key, value) in map.iter() {
    ///     println!("{key}: {value}");
    /// }
    ///
    /// let (first_key, first_value) = map.iter().next().unwrap();
    /// assert_eq!((*first_key, *first_value), (1, "a"));
    /// ```
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            tree: Some(&self.raw),
            next: self.raw.first_inorder(),
            remaining: self.raw.len(),
        }
    }

    /// Gets an iterator over the keys of the map, in sorted order.
    ///
    /// # Examples
    ///
    /// ```
    /// use weft_tree::ThreadedBstMap;
    ///
    /// let mut a = ThreadedBstMap::new();
    /// a.insert(2, "b");
    /// a.insert(1, "a");
    ///
    /// let keys: Vec<_> = a.keys().copied().collect();
    /// assert_eq!(keys, [1, 2]);
    /// ```
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    /// Gets an iterator over the values of the map, in order by key.
    ///
    /// # Examples
    ///
    /// ```
    /// use weft_tree::ThreadedBstMap;
    ///
    /// let mut a = ThreadedBstMap::new();
    /// a.insert(1, "hello");
    /// a.insert(2, "goodbye");
    ///
    /// let values: Vec<&str> = a.values().copied().collect();
    /// assert_eq!(values, ["hello", "goodbye"]);
    /// ```
    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }
}

impl<K: Ord, V> ThreadedBstMap<K, V> {
    /// Returns a reference to the value corresponding to the key.
    ///
    /// The key may be any borrowed form of the map's key type, but the
    /// ordering on the borrowed form *must* match the ordering on the key
    /// type.
    ///
    /// # Complexity
    ///
    /// O(log n) on random insertion orders, O(n) worst case.
    ///
    /// # Examples
    ///
    /// ```
    /// use weft_tree::ThreadedBstMap;
    ///
    /// let mut map = ThreadedBstMap::new();
    /// map.insert(1, "a");
    /// assert_eq!(map.get(&1), Some(&"a"));
    /// assert_eq!(map.get(&2), None);
    /// ```
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.get(key)
    }

    /// Returns the key-value pair corresponding to the supplied key.
    ///
    /// The supplied key may be any borrowed form of the map's key type, but
    /// the ordering on the borrowed form *must* match the ordering on the key
    /// type.
    ///
    /// # Examples
    ///
    /// ```
    /// use weft_tree::ThreadedBstMap;
    ///
    /// let mut map = ThreadedBstMap::new();
    /// map.insert(1, "a");
    /// assert_eq!(map.get_key_value(&1), Some((&1, &"a")));
    /// assert_eq!(map.get_key_value(&2), None);
    /// ```
    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.get_key_value(key)
    }

    /// Returns `true` if the map contains a value for the specified key.
    ///
    /// # Examples
    ///
    /// ```
    /// use weft_tree::ThreadedBstMap;
    ///
    /// let mut map = ThreadedBstMap::new();
    /// map.insert(1, "a");
    /// assert!(map.contains_key(&1));
    /// assert!(!map.contains_key(&2));
    /// ```
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.contains_key(key)
    }

    /// Returns a clone of the value for the given key, or `V::default()` if
    /// the key is not present.
    ///
    /// Associative-array-style lookup. A returned default is
    /// indistinguishable from a stored default value; when the distinction
    /// matters, use [`get`](ThreadedBstMap::get), which reports absence
    /// explicitly.
    ///
    /// # Examples
    ///
    /// ```
    /// use weft_tree::ThreadedBstMap;
    ///
    /// let mut map = ThreadedBstMap::new();
    /// map.insert(1, 10);
    /// assert_eq!(map.get_or_default(&1), 10);
    /// assert_eq!(map.get_or_default(&7), 0);
    /// ```
    pub fn get_or_default<Q>(&self, key: &Q) -> V
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
        V: Clone + Default,
    {
        self.raw.get(key).cloned().unwrap_or_default()
    }

    /// Returns the first key-value pair in the map. The key in this pair is
    /// the minimum key in the map.
    ///
    /// # Examples
    ///
    /// ```
    /// use weft_tree::ThreadedBstMap;
    ///
    /// let mut map = ThreadedBstMap::new();
    /// assert_eq!(map.first_key_value(), None);
    /// map.insert(2, "a");
    /// map.insert(1, "b");
    /// assert_eq!(map.first_key_value(), Some((&1, &"b")));
    /// ```
    #[allow(clippy::must_use_candidate)]
    pub fn first_key_value(&self) -> Option<(&K, &V)> {
        self.raw.first_key_value()
    }

    /// Returns the last key-value pair in the map. The key in this pair is
    /// the maximum key in the map.
    ///
    /// # Examples
    ///
    /// ```
    /// use weft_tree::ThreadedBstMap;
    ///
    /// let mut map = ThreadedBstMap::new();
    /// map.insert(1, "b");
    /// map.insert(2, "a");
    /// assert_eq!(map.last_key_value(), Some((&2, &"a")));
    /// ```
    #[allow(clippy::must_use_candidate)]
    pub fn last_key_value(&self) -> Option<(&K, &V)> {
        self.raw.last_key_value()
    }

    /// Returns the key linked immediately to the right of `key`, whether that
    /// link is a thread or a true child.
    ///
    /// When the node is threaded this is its inorder successor. When the node
    /// owns a right subtree this is the *immediate* right child's key, which
    /// is the inorder successor only if that subtree has no left spine. The
    /// operation reports raw topology - the key to the right, whatever that
    /// relationship is - not a deep successor search.
    ///
    /// Returns `None` if `key` is not in the map, or if the matching node has
    /// nothing to its right (it holds the maximum key).
    ///
    /// # Examples
    ///
    /// ```
    /// use weft_tree::ThreadedBstMap;
    ///
    /// let mut map = ThreadedBstMap::new();
    /// map.insert(2, "b");
    /// map.insert(1, "a");
    /// map.insert(3, "c");
    ///
    /// // 1 is threaded to its successor 2; 2 owns 3 as a right child.
    /// assert_eq!(map.right_of(&1), Some(&2));
    /// assert_eq!(map.right_of(&2), Some(&3));
    /// assert_eq!(map.right_of(&3), None);
    /// assert_eq!(map.right_of(&9), None);
    /// ```
    pub fn right_of<Q>(&self, key: &Q) -> Option<&K>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.right_of(key)
    }

    /// Inserts a key-value pair into the map.
    ///
    /// Returns `true` if the pair was inserted. If the key is already
    /// present the map is left untouched - the stored value is *not*
    /// replaced - and `false` is returned.
    ///
    /// # Complexity
    ///
    /// O(log n) on random insertion orders, O(n) worst case.
    ///
    /// # Examples
    ///
    /// ```
    /// use weft_tree::ThreadedBstMap;
    ///
    /// let mut map = ThreadedBstMap::new();
    /// assert!(map.insert(37, "a"));
    /// assert!(!map.is_empty());
    ///
    /// assert!(!map.insert(37, "b"));
    /// assert_eq!(map.get(&37), Some(&"a"));
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> bool {
        self.raw.insert(key, value)
    }

    /// Resets the map's traversal cursor to the first inorder key, so that
    /// the following [`next`](ThreadedBstMap::next) call reports the minimum
    /// key.
    ///
    /// The map carries a single cursor; calling `begin` abandons any
    /// traversal already in progress. On an empty map the cursor starts out
    /// exhausted. Inserting while a traversal is in progress leaves the
    /// cursor's subsequent output unspecified (though never unsafe).
    ///
    /// # Complexity
    ///
    /// O(log n) - one walk down the left spine.
    ///
    /// # Examples
    ///
    /// ```
    /// use weft_tree::ThreadedBstMap;
    ///
    /// let mut map = ThreadedBstMap::new();
    /// map.insert(2, "b");
    /// map.insert(1, "a");
    ///
    /// map.begin();
    /// assert_eq!(map.next(), Some(&1));
    /// assert_eq!(map.next(), Some(&2));
    /// assert_eq!(map.next(), None);
    /// ```
    pub fn begin(&mut self) {
        self.raw.begin();
    }

    /// Reports the key under the traversal cursor and advances the cursor,
    /// or returns `None` if the traversal is exhausted (and keeps returning
    /// `None` until the next [`begin`](ThreadedBstMap::begin)).
    ///
    /// Advancing is O(1) along a thread and walks a left spine after a true
    /// right child; a full traversal visits every key in O(n) total with no
    /// auxiliary space.
    ///
    /// # Examples
    ///
    /// ```
    /// use weft_tree::ThreadedBstMap;
    ///
    /// let mut map = ThreadedBstMap::new();
    /// for key in [30, 15, 50] {
    ///     map.insert(key, ());
    /// }
    ///
    /// map.begin();
    /// let mut keys = Vec::new();
    /// while let Some(&key) = map.next() {
    ///     keys.push(key);
    /// }
    /// assert_eq!(keys, [15, 30, 50]);
    /// ```
    // Deliberately named after the traversal contract, not `Iterator::next`;
    // the borrowing iterators cover the trait-shaped use case.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<&K> {
        self.raw.next()
    }

    /// Creates a consuming iterator visiting all the keys, in sorted order.
    /// The map cannot be used after calling this.
    ///
    /// # Examples
    ///
    /// ```
    /// use weft_tree::ThreadedBstMap;
    ///
    /// let mut a = ThreadedBstMap::new();
    /// a.insert(2, "b");
    /// a.insert(1, "a");
    ///
    /// let keys: Vec<i32> = a.into_keys().collect();
    /// assert_eq!(keys, [1, 2]);
    /// ```
    pub fn into_keys(self) -> IntoKeys<K, V> {
        IntoKeys {
            inner: self.into_iter(),
        }
    }

    /// Creates a consuming iterator visiting all the values, in order by key.
    /// The map cannot be used after calling this.
    ///
    /// # Examples
    ///
    /// ```
    /// use weft_tree::ThreadedBstMap;
    ///
    /// let mut a = ThreadedBstMap::new();
    /// a.insert(1, "hello");
    /// a.insert(2, "goodbye");
    ///
    /// let values: Vec<&str> = a.into_values().collect();
    /// assert_eq!(values, ["hello", "goodbye"]);
    /// ```
    pub fn into_values(self) -> IntoValues<K, V> {
        IntoValues {
            inner: self.into_iter(),
        }
    }
}

impl<K: fmt::Display, V: fmt::Display> ThreadedBstMap<K, V> {
    /// Writes a structural listing of the map to `output`.
    ///
    /// After two banner lines and the entry count, each node is written on
    /// its own line in inorder: `(key,value)` for a node owning a right
    /// subtree or holding the maximum key, `(key,value,thread_key)` for a
    /// threaded node, where `thread_key` is the inorder successor the thread
    /// references. A trailing banner line closes the listing.
    ///
    /// Intended for structural verification and debugging; [`Debug`] gives
    /// the conventional map rendering.
    ///
    /// # Errors
    ///
    /// Propagates any error returned by `output`.
    ///
    /// # Examples
    ///
    /// ```
    /// use weft_tree::ThreadedBstMap;
    ///
    /// let mut map = ThreadedBstMap::new();
    /// map.insert(2, "b");
    /// map.insert(1, "a");
    /// map.insert(3, "c");
    ///
    /// let mut listing = String::new();
    /// map.dump(&mut listing).unwrap();
    /// assert!(listing.contains("** size: 3"));
    /// assert!(listing.contains("(1,a,2)"));
    /// assert!(listing.contains("(2,b)"));
    /// ```
    pub fn dump<W: fmt::Write>(&self, output: &mut W) -> fmt::Result {
        writeln!(output, "{:*<50}", "")?;
        writeln!(output, "{:*^50}", " ThreadedBstMap ")?;
        writeln!(output, "** size: {}", self.len())?;
        self.raw.dump_into(output)?;
        writeln!(output, "{:*<50}", "")
    }
}

impl<K: Clone + Ord, V: Clone> Clone for ThreadedBstMap<K, V> {
    /// Deep-copies the map by re-inserting every entry from a preorder walk
    /// of `self`, so the copy's threads are rebuilt by the insertion logic
    /// rather than copied, and the trees share no structure.
    fn clone(&self) -> Self {
        ThreadedBstMap {
            raw: self.raw.clone(),
        }
    }

    fn clone_from(&mut self, source: &Self) {
        self.raw.clone_from(&source.raw);
    }
}

impl<K: Hash, V: Hash> Hash for ThreadedBstMap<K, V> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.len().hash(state);
        for (k, v) in self {
            k.hash(state);
            v.hash(state);
        }
    }
}

impl<K: PartialEq, V: PartialEq> PartialEq for ThreadedBstMap<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().zip(other.iter()).all(|(a, b)| a == b)
    }
}

impl<K: Eq, V: Eq> Eq for ThreadedBstMap<K, V> {}

impl<K: PartialOrd, V: PartialOrd> PartialOrd for ThreadedBstMap<K, V> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.iter().partial_cmp(other.iter())
    }
}

impl<K: Ord, V: Ord> Ord for ThreadedBstMap<K, V> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.iter().cmp(other.iter())
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for ThreadedBstMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V> Default for ThreadedBstMap<K, V> {
    fn default() -> Self {
        ThreadedBstMap::new()
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for ThreadedBstMap<K, V> {
    /// Builds a map from the pairs of an iterator. Where the iterator
    /// repeats a key, the *first* occurrence wins, per the map's no-replace
    /// insertion.
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut map = ThreadedBstMap::new();
        map.extend(iter);
        map
    }
}

impl<K: Ord, V> Extend<(K, V)> for ThreadedBstMap<K, V> {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<'a, K: Ord + Copy, V: Copy> Extend<(&'a K, &'a V)> for ThreadedBstMap<K, V> {
    fn extend<T: IntoIterator<Item = (&'a K, &'a V)>>(&mut self, iter: T) {
        for (&k, &v) in iter {
            self.insert(k, v);
        }
    }
}

impl<'a, K, V> IntoIterator for &'a ThreadedBstMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}

impl<K, V> IntoIterator for ThreadedBstMap<K, V> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    /// Gets an owning iterator over the entries of the map, sorted by key.
    ///
    /// # Examples
    ///
    /// ```
    /// use weft_tree::ThreadedBstMap;
    ///
    /// let map = ThreadedBstMap::from([(2, "b"), (1, "a")]);
    /// let mut iter = map.into_iter();
    /// assert_eq!(iter.next(), Some((1, "a")));
    /// assert_eq!(iter.next_back(), Some((2, "b")));
    /// ```
    fn into_iter(mut self) -> IntoIter<K, V> {
        let entries = self.raw.drain_to_vec();
        IntoIter {
            inner: entries.into_iter(),
        }
    }
}

impl<K, Q, V> Index<&Q> for ThreadedBstMap<K, V>
where
    K: Borrow<Q> + Ord,
    Q: ?Sized + Ord,
{
    type Output = V;

    fn index(&self, key: &Q) -> &V {
        self.get(key).expect("no entry found for key")
    }
}

impl<K: Ord, V, const N: usize> From<[(K, V); N]> for ThreadedBstMap<K, V> {
    fn from(arr: [(K, V); N]) -> Self {
        arr.into_iter().collect()
    }
}

impl<'a, K: 'a, V: 'a> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let tree = self.tree?;
        let handle = self.next?;

        self.next = tree.step_inorder(handle);
        self.remaining -= 1;

        let node = tree.node(handle);
        Some((node.key(), tree.value(node.value())))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

impl<K: fmt::Debug, V> fmt::Debug for Iter<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Iter").field("remaining", &self.remaining).finish()
    }
}

impl<'a, K: 'a, V: 'a> Default for Iter<'a, K, V> {
    /// Creates an empty `threaded_map::Iter`.
    ///
    /// ```
    /// # use weft_tree::threaded_map;
    /// let iter: threaded_map::Iter<'_, u8, u8> = Default::default();
    /// assert_eq!(iter.len(), 0);
    /// ```
    fn default() -> Self {
        Iter {
            tree: None,
            next: None,
            remaining: 0,
        }
    }
}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Iter {
            tree: self.tree,
            next: self.next,
            remaining: self.remaining,
        }
    }
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for IntoIter<K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back()
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V> FusedIterator for IntoIter<K, V> {}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for IntoIter<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntoIter").field("remaining", &self.inner.len()).finish()
    }
}

impl<K, V> Default for IntoIter<K, V> {
    /// Creates an empty `threaded_map::IntoIter`.
    ///
    /// ```
    /// # use weft_tree::threaded_map;
    /// let iter: threaded_map::IntoIter<u8, u8> = Default::default();
    /// assert_eq!(iter.len(), 0);
    /// ```
    fn default() -> Self {
        IntoIter {
            inner: alloc::vec::Vec::new().into_iter(),
        }
    }
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V> FusedIterator for Keys<'_, K, V> {}

impl<K: fmt::Debug, V> fmt::Debug for Keys<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keys").field("remaining", &self.inner.remaining).finish()
    }
}

impl<K, V> Default for Keys<'_, K, V> {
    fn default() -> Self {
        Keys {
            inner: Iter::default(),
        }
    }
}

impl<K, V> Clone for Keys<'_, K, V> {
    fn clone(&self) -> Self {
        Keys {
            inner: self.inner.clone(),
        }
    }
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V> FusedIterator for Values<'_, K, V> {}

impl<K, V> fmt::Debug for Values<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Values").field("remaining", &self.inner.remaining).finish()
    }
}

impl<K, V> Default for Values<'_, K, V> {
    fn default() -> Self {
        Values {
            inner: Iter::default(),
        }
    }
}

impl<K, V> Clone for Values<'_, K, V> {
    fn clone(&self) -> Self {
        Values {
            inner: self.inner.clone(),
        }
    }
}

impl<K, V> Iterator for IntoKeys<K, V> {
    type Item = K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for IntoKeys<K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(k, _)| k)
    }
}

impl<K, V> ExactSizeIterator for IntoKeys<K, V> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V> FusedIterator for IntoKeys<K, V> {}

impl<K, V> fmt::Debug for IntoKeys<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntoKeys").field("remaining", &self.inner.len()).finish()
    }
}

impl<K, V> Default for IntoKeys<K, V> {
    fn default() -> Self {
        IntoKeys {
            inner: IntoIter::default(),
        }
    }
}

impl<K, V> Iterator for IntoValues<K, V> {
    type Item = V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for IntoValues<K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(_, v)| v)
    }
}

impl<K, V> ExactSizeIterator for IntoValues<K, V> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V> FusedIterator for IntoValues<K, V> {}

impl<K, V> fmt::Debug for IntoValues<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntoValues").field("remaining", &self.inner.len()).finish()
    }
}

impl<K, V> Default for IntoValues<K, V> {
    fn default() -> Self {
        IntoValues {
            inner: IntoIter::default(),
        }
    }
}

use std::cmp::Ordering;
use std::fmt;
use std::iter;
use std::mem;

use log::{debug, trace};
use rand::rngs::StdRng;
use rand::SeedableRng;
use slab::Slab;

use super::height::{new_level, HeightSource};
use super::{MapError, MemTable, Res};

/// Sentinel width used when no capacity (or a zero capacity) is given.
pub const DEFAULT_CAPACITY: usize = 16;

type NodeId = usize;

// Stored in a forward slot, `None` ends the chain. Used as a traversal
// position, `None` is the sentinel.
type Link = Option<NodeId>;

struct Node<K, V> {
    key: K,
    value: V,
    // One slot per level the node sits on; the length is its height.
    next: Box<[Link]>,
}

impl<K, V> Node<K, V> {
    fn new(key: K, value: V, height: usize) -> Self {
        Self {
            key,
            value,
            next: vec![None; height].into_boxed_slice(),
        }
    }

    #[inline(always)]
    fn height(&self) -> usize {
        self.next.len()
    }
}

/// Ordered map over a probabilistic skip list.
///
/// Nodes live in a slab and link to each other by index, so relinking one
/// level never invalidates a link held at another. The sentinel is kept
/// apart from the slab as a fixed array of `capacity` links; a node is
/// never taller than the sentinel.
///
/// Node heights follow a Geometric(0.5) law truncated at `capacity`,
/// drawn from `R`. Any [`rand::RngCore`] works; the default is an
/// entropy-seeded [`StdRng`].
///
/// ```
/// use skipmap::SkipListMap;
///
/// let mut map = SkipListMap::with_capacity(4);
/// assert!(map.insert(10, "a"));
/// assert!(map.insert(5, "b"));
/// assert!(!map.insert(10, "c"));
///
/// assert_eq!(map.search(&10), Some(&"a"));
/// assert!(map.remove(&5));
/// assert_eq!(map.search(&5), None);
/// ```
pub struct SkipListMap<K, V, R = StdRng> {
    sentinels: Vec<Link>,
    nodes: Slab<Node<K, V>>,
    // counts[h - 1] is the number of nodes of height h
    counts: Vec<usize>,
    height: usize,
    // Splice points from the last descent, one per level.
    preds: Vec<Link>,
    rng: R,
}

impl<K: Ord, V> SkipListMap<K, V> {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Creates a map whose tallest node may have `capacity` levels.
    /// A zero capacity falls back to [`DEFAULT_CAPACITY`].
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_rng(capacity, StdRng::from_entropy())
    }
}

impl<K: Ord, V> Default for SkipListMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, R> SkipListMap<K, V, R>
where
    K: Ord,
    R: HeightSource,
{
    /// Creates a map that draws node heights from `rng`.
    pub fn with_rng(capacity: usize, rng: R) -> Self {
        let capacity = if capacity == 0 {
            DEFAULT_CAPACITY
        } else {
            capacity
        };
        debug!("skiplist created with capacity {}", capacity);

        Self {
            sentinels: vec![None; capacity],
            nodes: Slab::new(),
            counts: vec![0; capacity],
            height: 1,
            preds: vec![None; capacity],
            rng,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.sentinels[0].is_none()
    }

    /// Tallest height a node can be assigned.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.sentinels.len()
    }

    /// Height of the tallest node present, or 1 when empty.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.find(key).is_some()
    }

    pub fn search(&self, key: &K) -> Option<&V> {
        self.find(key).map(|id| &self.nodes[id].value)
    }

    pub fn search_mut(&mut self, key: &K) -> Option<&mut V> {
        let id = self.find(key)?;
        Some(&mut self.nodes[id].value)
    }

    /// Inserts `key` unless it is already present. Returns whether the
    /// map changed; a duplicate leaves the stored value untouched.
    pub fn insert(&mut self, key: K, value: V) -> bool {
        self.try_insert(key, value).is_ok()
    }

    pub fn try_insert(&mut self, key: K, value: V) -> Res<()> {
        if self.is_empty() {
            let height = self.new_height();
            let id = self.nodes.insert(Node::new(key, value, height));
            self.sentinels[..height].fill(Some(id));
            trace!("linked first node {} at height {}", id, height);

            self.note_inserted(height);
            return Ok(());
        }

        if self.descend(&key).is_some() {
            return Err(MapError::DuplicateKey);
        }

        let height = self.new_height();
        let id = self.nodes.insert(Node::new(key, value, height));

        for level in 0..height {
            let pred = self.preds[level];
            let succ = self.next_of(pred, level);
            self.nodes[id].next[level] = succ;
            self.set_next(pred, level, Some(id));
        }
        trace!("linked node {} at height {}", id, height);

        self.note_inserted(height);
        Ok(())
    }

    /// Removes `key`. Returns false if it was not present.
    pub fn remove(&mut self, key: &K) -> bool {
        self.try_remove(key).is_ok()
    }

    pub fn try_remove(&mut self, key: &K) -> Res<V> {
        if self.is_empty() {
            return Err(MapError::KeyNotFound);
        }

        let id = self.descend(key).ok_or(MapError::KeyNotFound)?;
        let height = self.nodes[id].height();

        for level in (0..height).rev() {
            let mut pred = self.preds[level];
            loop {
                match self.next_of(pred, level) {
                    Some(next) if next == id => break,
                    Some(next) => pred = Some(next),
                    None => unreachable!("node {id} is not linked at level {level}"),
                }
            }

            let succ = self.nodes[id].next[level];
            self.set_next(pred, level, succ);
        }
        trace!("unlinked node {} from {} levels", id, height);

        let node = self.nodes.remove(id);
        self.note_removed(height);
        Ok(node.value)
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.sentinels.fill(None);
        self.counts.fill(0);
        self.preds.fill(None);
        self.height = 1;
    }

    fn new_height(&mut self) -> usize {
        let capacity = self.capacity();
        let height = new_level(&mut self.rng, capacity);
        debug_assert!((1..=capacity).contains(&height));
        height
    }

    fn note_inserted(&mut self, height: usize) {
        if height > self.height {
            debug!("height raised {} -> {}", self.height, height);
            self.height = height;
        }
        self.counts[height - 1] += 1;
    }

    fn note_removed(&mut self, height: usize) {
        self.counts[height - 1] -= 1;
        if self.counts[height - 1] != 0 || height != self.height {
            return;
        }

        while self.height > 1 && self.counts[self.height - 1] == 0 {
            self.height -= 1;
        }
        debug!("height lowered {} -> {}", height, self.height);
    }

    #[inline(always)]
    fn next_of(&self, at: Link, level: usize) -> Link {
        match at {
            None => self.sentinels[level],
            Some(id) => self.nodes[id].next[level],
        }
    }

    #[inline(always)]
    fn set_next(&mut self, at: Link, level: usize, to: Link) {
        match at {
            None => self.sentinels[level] = to,
            Some(id) => self.nodes[id].next[level] = to,
        }
    }

    // Drop-down search. Stops at the first node whose key matches.
    fn find(&self, key: &K) -> Option<NodeId> {
        if self.is_empty() {
            return None;
        }

        let mut at: Link = None;
        for level in (0..self.height).rev() {
            while let Some(next) = self.next_of(at, level) {
                match self.nodes[next].key.cmp(key) {
                    Ordering::Less => at = Some(next),
                    Ordering::Equal => return Some(next),
                    Ordering::Greater => break,
                }
            }
        }
        None
    }

    // Full descent recording, for every level, the last node left of `key`
    // on that level. Levels at or above the current height splice at the
    // sentinel. Returns the node holding `key`, if any.
    fn descend(&mut self, key: &K) -> Option<NodeId> {
        self.preds[self.height..].fill(None);

        let mut at: Link = None;
        let mut found = None;
        for level in (0..self.height).rev() {
            while let Some(next) = self.next_of(at, level) {
                match self.nodes[next].key.cmp(key) {
                    Ordering::Less => at = Some(next),
                    Ordering::Equal => {
                        found = Some(next);
                        break;
                    }
                    Ordering::Greater => break,
                }
            }
            self.preds[level] = at;
        }
        found
    }

    // Keys chained at `level`, in link order.
    fn level_keys(&self, level: usize) -> impl Iterator<Item = &K> + '_ {
        iter::successors(self.sentinels[level], move |&id| self.nodes[id].next[level])
            .map(move |id| &self.nodes[id].key)
    }
}

impl<K, V, R> fmt::Debug for SkipListMap<K, V, R>
where
    K: Ord + fmt::Debug,
    R: HeightSource,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let levels: Vec<Vec<&K>> = (0..self.height)
            .rev()
            .map(|level| self.level_keys(level).collect())
            .collect();

        f.debug_struct("SkipListMap")
            .field("len", &self.len())
            .field("height", &self.height)
            .field("levels", &levels)
            .finish()
    }
}

impl<K: Ord, V> MemTable<K, V> for SkipListMap<K, V> {
    fn new(size: Option<usize>) -> Self {
        Self::with_capacity(size.unwrap_or(DEFAULT_CAPACITY))
    }

    fn create(&mut self, key: Option<K>, val: V) -> Res<()> {
        let key = key.ok_or(MapError::InvalidKey)?;
        self.try_insert(key, val)
    }

    fn read(&self, key: Option<&K>) -> Res<&V> {
        let key = key.ok_or(MapError::InvalidKey)?;
        self.search(key).ok_or(MapError::KeyNotFound)
    }

    fn update(&mut self, key: Option<&K>, new_val: V) -> Res<V> {
        let key = key.ok_or(MapError::InvalidKey)?;
        let val = self.search_mut(key).ok_or(MapError::KeyNotFound)?;
        Ok(mem::replace(val, new_val))
    }

    fn delete(&mut self, key: Option<&K>) -> Res<V> {
        let key = key.ok_or(MapError::InvalidKey)?;
        self.try_remove(key)
    }
}

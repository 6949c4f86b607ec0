//! HashTable: separate-chaining map with an absent-key slot and fail-fast cursors.
//!
//! Each bucket roots a singly-linked chain of boxed entries; an entry owns
//! its successor. Entries carry their precomputed `u64` hash, so growing the
//! bucket array relinks the existing boxes without calling `K: Hash` again.
//! The absent key is stored as `None`, hashes to `0` and therefore always
//! lives in bucket 0.

use crate::config::{grown_capacity, TableConfig};
use crate::error::{CollectionError, Result};
use crate::generation::{Generation, Stamp};
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use std::collections::hash_map::RandomState;
use std::collections::BTreeSet;

type Link<K, V> = Option<Box<Entry<K, V>>>;

struct Entry<K, V> {
    key: Option<K>,
    value: V,
    hash: u64,
    next: Link<K, V>,
}

impl<K, V> Entry<K, V> {
    fn matches<Q>(&self, hash: u64, q: Option<&Q>) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        match (&self.key, q) {
            (None, None) => true,
            (Some(k), Some(q)) => self.hash == hash && k.borrow() == q,
            _ => false,
        }
    }
}

pub struct HashTable<K, V, S = RandomState> {
    hasher: S,
    buckets: Vec<Link<K, V>>,
    len: usize,
    load_factor: f64,
    generation: Generation,
}

fn empty_buckets<K, V>(capacity: usize) -> Vec<Link<K, V>> {
    let mut buckets = Vec::with_capacity(capacity);
    buckets.resize_with(capacity, || None);
    buckets
}

// Unlinks one box at a time so long chains never recurse on drop.
fn drop_chain<K, V>(mut link: Link<K, V>) {
    while let Some(mut entry) = link {
        link = entry.next.take();
    }
}

impl<K, V> HashTable<K, V>
where
    K: Eq + Hash,
{
    pub fn new() -> Self {
        Self::with_hasher(RandomState::new())
    }

    /// A table with `capacity` buckets (at least one) and the default
    /// load factor.
    pub fn with_capacity(capacity: usize) -> Self {
        let config = TableConfig::new().with_initial_capacity(capacity.max(1));
        Self::build(config, RandomState::new())
    }

    pub fn with_config(config: TableConfig) -> Result<Self> {
        Self::with_config_and_hasher(config, RandomState::new())
    }
}

impl<K, V> Default for HashTable<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Borrowing iterator over `(key, value)` pairs in bucket order, then chain
/// order. The absent key is yielded as `None`.
pub struct Iter<'a, K, V> {
    buckets: core::slice::Iter<'a, Link<K, V>>,
    chain: Option<&'a Entry<K, V>>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (Option<&'a K>, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(entry) = self.chain {
                self.chain = entry.next.as_deref();
                self.remaining -= 1;
                return Some((entry.key.as_ref(), &entry.value));
            }
            self.chain = self.buckets.next()?.as_deref();
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

/// Values in the same order `Iter` yields their entries.
pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {}

// Structural accessors; no key hashing or comparison happens here.
impl<K, V, S> HashTable<K, V, S> {
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Current number of buckets. Only ever grows.
    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    pub fn load_factor(&self) -> f64 {
        self.load_factor
    }

    /// Structural modification counter observed by cursors.
    pub fn version(&self) -> u64 {
        self.generation.current()
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            buckets: self.buckets.iter(),
            chain: None,
            remaining: self.len,
        }
    }

    /// Lazy view of every `(key, value)` pair. A fresh call restarts.
    pub fn entries(&self) -> Iter<'_, K, V> {
        self.iter()
    }

    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    /// Fail-fast cursor positioned before the first entry.
    pub fn cursor(&self) -> TableCursor {
        TableCursor {
            slot: 0,
            position: 0,
            last: None,
            stamp: self.generation.stamp(),
        }
    }

    /// Drops every entry. Bumps the version once.
    pub fn clear(&mut self) {
        tracing::trace!(len = self.len, "hash table cleared");
        for link in self.buckets.iter_mut() {
            drop_chain(link.take());
        }
        self.len = 0;
        self.generation.bump();
    }

    fn slot(&self, hash: u64) -> usize {
        (hash % self.buckets.len() as u64) as usize
    }

    fn chain(&self, slot: usize) -> impl Iterator<Item = &Entry<K, V>> {
        let head = self.buckets.get(slot).and_then(|link| link.as_deref());
        core::iter::successors(head, |e| e.next.as_deref())
    }

    fn entry_at(&self, slot: usize, position: usize) -> Option<&Entry<K, V>> {
        self.chain(slot).nth(position)
    }

    /// Number of entries not sitting in the bucket their hash selects.
    #[cfg(test)]
    pub(crate) fn misplaced(&self) -> usize {
        (0..self.buckets.len())
            .map(|slot| self.chain(slot).filter(|e| self.slot(e.hash) != slot).count())
            .sum()
    }

    /// First occupied `(slot, position)` at or after the given one.
    fn next_position(&self, mut slot: usize, mut position: usize) -> Option<(usize, usize)> {
        while slot < self.buckets.len() {
            if self.entry_at(slot, position).is_some() {
                return Some((slot, position));
            }
            slot += 1;
            position = 0;
        }
        None
    }

    /// Unlinks the entry at `position` in the chain rooted at `slot`,
    /// relinking its predecessor (or the bucket head) to its successor.
    fn unlink_at(&mut self, slot: usize, position: usize) -> Result<(Option<K>, V)> {
        let mut link = self
            .buckets
            .get_mut(slot)
            .ok_or(CollectionError::InternalConsistency("bucket index past capacity"))?;
        for _ in 0..position {
            link = match link {
                Some(entry) => &mut entry.next,
                None => {
                    return Err(CollectionError::InternalConsistency(
                        "chain ended before unlink position",
                    ))
                }
            };
        }
        let mut removed = link.take().ok_or(CollectionError::InternalConsistency(
            "unlink position holds no entry",
        ))?;
        *link = removed.next.take();
        self.len -= 1;
        self.generation.bump();
        let Entry { key, value, .. } = *removed;
        Ok((key, value))
    }
}

impl<K, V, S> HashTable<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    pub fn with_hasher(hasher: S) -> Self {
        Self::build(TableConfig::default(), hasher)
    }

    pub fn with_config_and_hasher(config: TableConfig, hasher: S) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config, hasher))
    }

    fn build(config: TableConfig, hasher: S) -> Self {
        Self {
            hasher,
            buckets: empty_buckets(config.initial_capacity),
            len: 0,
            load_factor: config.load_factor,
            generation: Generation::new(),
        }
    }

    fn make_hash<Q>(&self, q: Option<&Q>) -> u64
    where
        Q: ?Sized + Hash,
    {
        q.map_or(0, |q| self.hasher.hash_one(q))
    }

    /// Inserts or overwrites. Returns the previous value for the key.
    ///
    /// The load factor is checked before the write, so the table may grow
    /// even when the key is already present. An overwrite bumps the
    /// version but leaves `len` unchanged.
    pub fn put(&mut self, key: K, value: V) -> Result<Option<V>> {
        self.put_entry(Some(key), value)
    }

    /// `put` for the absent key.
    pub fn put_null(&mut self, value: V) -> Result<Option<V>> {
        self.put_entry(None, value)
    }

    fn put_entry(&mut self, key: Option<K>, value: V) -> Result<Option<V>> {
        self.grow_if_needed()?;
        let hash = self.make_hash(key.as_ref());
        let slot = self.slot(hash);

        let mut link = &mut self.buckets[slot];
        loop {
            match link {
                None => {
                    *link = Some(Box::new(Entry {
                        key,
                        value,
                        hash,
                        next: None,
                    }));
                    self.len += 1;
                    self.generation.bump();
                    return Ok(None);
                }
                Some(entry) => {
                    if entry.matches(hash, key.as_ref()) {
                        let previous = core::mem::replace(&mut entry.value, value);
                        self.generation.bump();
                        return Ok(Some(previous));
                    }
                    link = &mut entry.next;
                }
            }
        }
    }

    fn grow_if_needed(&mut self) -> Result<()> {
        let capacity = self.buckets.len();
        if (self.len as f64) / (capacity as f64) < self.load_factor {
            return Ok(());
        }

        let new_capacity = grown_capacity(capacity);
        let old = core::mem::replace(&mut self.buckets, empty_buckets(new_capacity));
        let mut moved = 0usize;
        for mut link in old {
            while let Some(mut entry) = link {
                link = entry.next.take();
                let slot = (entry.hash % new_capacity as u64) as usize;
                Self::append(&mut self.buckets[slot], entry);
                moved += 1;
            }
        }
        self.generation.bump();
        tracing::debug!(
            old_capacity = capacity,
            new_capacity,
            len = self.len,
            "hash table resized"
        );

        if moved != self.len {
            return Err(CollectionError::InternalConsistency(
                "resize did not carry over every entry",
            ));
        }
        Ok(())
    }

    // Appends at the chain tail so relative order within a bucket survives a resize.
    fn append(mut link: &mut Link<K, V>, entry: Box<Entry<K, V>>) {
        loop {
            match link {
                Some(existing) => link = &mut existing.next,
                None => {
                    *link = Some(entry);
                    return;
                }
            }
        }
    }

    fn find_entry<Q>(&self, q: Option<&Q>) -> Option<&Entry<K, V>>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = self.make_hash(q);
        self.chain(self.slot(hash)).find(|e| e.matches(hash, q))
    }

    fn find_entry_mut<Q>(&mut self, q: Option<&Q>) -> Option<&mut Entry<K, V>>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = self.make_hash(q);
        let slot = self.slot(hash);
        let mut link = self.buckets[slot].as_deref_mut();
        while let Some(entry) = link {
            if entry.matches(hash, q) {
                return Some(entry);
            }
            link = entry.next.as_deref_mut();
        }
        None
    }

    /// `(slot, position)` of the entry for `q`, if any.
    fn locate<Q>(&self, q: Option<&Q>) -> Option<(usize, usize)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = self.make_hash(q);
        let slot = self.slot(hash);
        self.chain(slot)
            .position(|e| e.matches(hash, q))
            .map(|position| (slot, position))
    }

    pub fn get<Q>(&self, q: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.find_entry(Some(q)).map(|e| &e.value)
    }

    pub fn get_null(&self) -> Option<&V> {
        self.find_entry::<K>(None).map(|e| &e.value)
    }

    /// Mutable access to a value. Does not count as a structural change.
    pub fn get_mut<Q>(&mut self, q: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.find_entry_mut(Some(q)).map(|e| &mut e.value)
    }

    pub fn contains_key<Q>(&self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.find_entry(Some(q)).is_some()
    }

    pub fn contains_null_key(&self) -> bool {
        self.find_entry::<K>(None).is_some()
    }

    /// Linear scan over every stored value.
    pub fn contains_value(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.values().any(|v| v == value)
    }

    /// Removes the entry for `q`, returning its value. Absent keys leave
    /// the table, including its version, untouched.
    ///
    /// `Err` only reports a chain that no longer holds the entry `q` was
    /// just found at.
    pub fn remove<Q>(&mut self, q: &Q) -> Result<Option<V>>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let Some((slot, position)) = self.locate(Some(q)) else {
            return Ok(None);
        };
        let (_, value) = self.unlink_at(slot, position)?;
        Ok(Some(value))
    }

    /// `remove` for the absent key.
    pub fn remove_null(&mut self) -> Result<Option<V>> {
        let Some((slot, position)) = self.locate::<K>(None) else {
            return Ok(None);
        };
        let (_, value) = self.unlink_at(slot, position)?;
        Ok(Some(value))
    }

    /// Overwrites the value only when `key` is already present.
    pub fn replace(&mut self, key: K, value: V) -> Result<Option<V>> {
        if self.contains_key(&key) {
            return self.put(key, value);
        }
        Ok(None)
    }

    /// `put` for every pair, in iteration order.
    pub fn put_all<I>(&mut self, pairs: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        for (k, v) in pairs {
            self.put(k, v)?;
        }
        Ok(())
    }

    /// Every key in natural order; the absent key, if stored, sorts first.
    pub fn keys(&self) -> BTreeSet<Option<&K>>
    where
        K: Ord,
    {
        self.iter().map(|(k, _)| k).collect()
    }
}

impl<K, V, S> Drop for HashTable<K, V, S> {
    fn drop(&mut self) {
        for link in self.buckets.iter_mut() {
            drop_chain(link.take());
        }
    }
}

impl<K, V, S> fmt::Debug for HashTable<K, V, S>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<'a, K, V, S> IntoIterator for &'a HashTable<K, V, S> {
    type Item = (Option<&'a K>, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Detached fail-fast iterator over a `HashTable`.
///
/// The cursor holds no borrow; each call takes the table it was created
/// from. Any structural change made to the table by another route after
/// the cursor's last call makes the next `next`/`remove` fail with
/// `ConcurrentModification`. Removing through the cursor resynchronizes it.
/// Passing any table other than the creating one fails with
/// `WrongCollection`.
///
/// The cursor keeps a `(bucket, chain position)` pair rather than a
/// pointer, so each `next`/`has_next` re-walks the current chain from its
/// head. A step costs O(chain length), which the load factor keeps short;
/// a table whose keys all collide into one chain makes a full sweep
/// quadratic. Use `iter()` when no removal is needed.
#[derive(Debug, Clone)]
pub struct TableCursor {
    slot: usize,
    position: usize,
    last: Option<(usize, usize)>,
    stamp: Stamp,
}

impl TableCursor {
    pub fn has_next<K, V, S>(&self, table: &HashTable<K, V, S>) -> bool {
        table.next_position(self.slot, self.position).is_some()
    }

    /// Advances to the next entry. `Ok(None)` once every bucket is exhausted.
    pub fn next<'a, K, V, S>(
        &mut self,
        table: &'a HashTable<K, V, S>,
    ) -> Result<Option<(Option<&'a K>, &'a V)>> {
        table.generation.verify(self.stamp)?;
        let Some((slot, position)) = table.next_position(self.slot, self.position) else {
            return Ok(None);
        };
        let entry = table
            .entry_at(slot, position)
            .ok_or(CollectionError::InternalConsistency("cursor lost its entry"))?;
        self.slot = slot;
        self.position = position + 1;
        self.last = Some((slot, position));
        Ok(Some((entry.key.as_ref(), &entry.value)))
    }

    /// Removes the entry most recently returned by `next`.
    pub fn remove<K, V, S>(&mut self, table: &mut HashTable<K, V, S>) -> Result<(Option<K>, V)> {
        table.generation.verify(self.stamp)?;
        let (slot, position) = self.last.take().ok_or(CollectionError::IllegalState)?;
        let removed = table.unlink_at(slot, position)?;
        if slot == self.slot && position < self.position {
            self.position -= 1;
        }
        self.stamp = table.generation.stamp();
        Ok(removed)
    }
}

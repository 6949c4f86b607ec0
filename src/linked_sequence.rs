//! LinkedSequence: doubly-linked list over a slot arena, with midpoint
//! index lookup and a bidirectional fail-fast cursor.
//!
//! Nodes live in a `SlotMap` and refer to their neighbours by generational
//! key, so `prev` is a plain non-owning handle and splicing or unlinking is
//! O(1) once the node is known. Indexed access walks from whichever end is
//! closer.

use crate::error::{CollectionError, Result};
use crate::generation::{Generation, Stamp};
use core::fmt;
use core::ops::{Bound, RangeBounds};
use slotmap::{new_key_type, SlotMap};

new_key_type! {
    struct NodeKey;
}

#[derive(Debug, Clone)]
struct Node<T> {
    value: T,
    prev: Option<NodeKey>,
    next: Option<NodeKey>,
}

const BROKEN_LINKS: CollectionError =
    CollectionError::InternalConsistency("sequence links disagree with length");

pub struct LinkedSequence<T> {
    nodes: SlotMap<NodeKey, Node<T>>,
    head: Option<NodeKey>,
    tail: Option<NodeKey>,
    generation: Generation,
}

impl<T> LinkedSequence<T> {
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            head: None,
            tail: None,
            generation: Generation::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Structural modification counter observed by cursors.
    pub fn version(&self) -> u64 {
        self.generation.current()
    }

    pub fn first(&self) -> Option<&T> {
        self.head.and_then(|k| self.nodes.get(k)).map(|n| &n.value)
    }

    pub fn last(&self) -> Option<&T> {
        self.tail.and_then(|k| self.nodes.get(k)).map(|n| &n.value)
    }

    fn node(&self, key: NodeKey) -> Result<&Node<T>> {
        self.nodes.get(key).ok_or(BROKEN_LINKS)
    }

    fn node_mut(&mut self, key: NodeKey) -> Result<&mut Node<T>> {
        self.nodes.get_mut(key).ok_or(BROKEN_LINKS)
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.len() {
            return Err(CollectionError::IndexOutOfBounds {
                index,
                len: self.len(),
            });
        }
        Ok(())
    }

    fn check_position(&self, index: usize) -> Result<()> {
        if index > self.len() {
            return Err(CollectionError::IndexOutOfBounds {
                index,
                len: self.len(),
            });
        }
        Ok(())
    }

    /// Key of the node at `index`, walking forward from the head when the
    /// index is in the first half and backward from the tail otherwise.
    fn node_at(&self, index: usize) -> Result<NodeKey> {
        self.check_index(index)?;
        let len = self.len();
        let (start, steps, forward) = if 2 * index < len {
            (self.head, index, true)
        } else {
            (self.tail, len - 1 - index, false)
        };

        let mut key = start.ok_or(BROKEN_LINKS)?;
        for _ in 0..steps {
            let node = self.node(key)?;
            let step = if forward { node.next } else { node.prev };
            key = step.ok_or(BROKEN_LINKS)?;
        }
        Ok(key)
    }

    /// Node an insertion at `index` goes in front of; `None` means append.
    fn successor_for(&self, index: usize) -> Result<Option<NodeKey>> {
        self.check_position(index)?;
        if index == self.len() {
            return Ok(None);
        }
        self.node_at(index).map(Some)
    }

    /// Links an already internally linked run `first..=last` in front of
    /// `before` (or after the tail when `before` is `None`).
    fn splice(&mut self, first: NodeKey, last: NodeKey, before: Option<NodeKey>) -> Result<()> {
        let after = match before {
            Some(b) => self.node(b)?.prev,
            None => self.tail,
        };

        match after {
            Some(a) => self.node_mut(a)?.next = Some(first),
            None => self.head = Some(first),
        }
        self.node_mut(first)?.prev = after;
        self.node_mut(last)?.next = before;
        match before {
            Some(b) => self.node_mut(b)?.prev = Some(last),
            None => self.tail = Some(last),
        }
        Ok(())
    }

    /// Removes `key` from the arena and joins its neighbours.
    fn unlink(&mut self, key: NodeKey) -> Result<T> {
        let node = self.nodes.remove(key).ok_or(BROKEN_LINKS)?;
        match node.prev {
            Some(p) => self.node_mut(p)?.next = node.next,
            None => self.head = node.next,
        }
        match node.next {
            Some(n) => self.node_mut(n)?.prev = node.prev,
            None => self.tail = node.prev,
        }
        self.generation.bump();
        Ok(node.value)
    }

    fn detached(&mut self, value: T) -> NodeKey {
        self.nodes.insert(Node {
            value,
            prev: None,
            next: None,
        })
    }

    pub fn get(&self, index: usize) -> Result<&T> {
        let key = self.node_at(index)?;
        Ok(&self.node(key)?.value)
    }

    pub fn get_mut(&mut self, index: usize) -> Result<&mut T> {
        let key = self.node_at(index)?;
        Ok(&mut self.node_mut(key)?.value)
    }

    /// Replaces the value at `index`, returning the old one. Counts as a
    /// modification for any open cursor.
    pub fn set(&mut self, index: usize, value: T) -> Result<T> {
        let key = self.node_at(index)?;
        let old = core::mem::replace(&mut self.node_mut(key)?.value, value);
        self.generation.bump();
        Ok(old)
    }

    /// Appends after the current tail.
    pub fn add(&mut self, value: T) {
        let key = self.detached(value);
        let linked = self.splice(key, key, None);
        debug_assert!(linked.is_ok(), "tail link broken on append: {linked:?}");
        self.generation.bump();
    }

    /// Inserts so that `value` ends up at `index`. Valid for `0..=len`.
    pub fn insert(&mut self, index: usize, value: T) -> Result<()> {
        let before = self.successor_for(index)?;
        let key = self.detached(value);
        self.splice(key, key, before)?;
        self.generation.bump();
        Ok(())
    }

    /// Inserts every value from `values` starting at `index`, preserving
    /// their order. `None` or an empty input changes nothing and returns
    /// `Ok(false)`. The index is validated first either way.
    pub fn add_all<I>(&mut self, index: usize, values: Option<I>) -> Result<bool>
    where
        I: IntoIterator<Item = T>,
    {
        let before = self.successor_for(index)?;
        let Some(values) = values else {
            return Ok(false);
        };
        // Drain the caller's iterator before touching the arena, so a panic
        // while producing values leaves the sequence as it was.
        let values: Vec<T> = values.into_iter().collect();

        let mut run: Option<(NodeKey, NodeKey)> = None;
        for value in values {
            let key = self.detached(value);
            run = match run {
                None => Some((key, key)),
                Some((first, last)) => {
                    self.node_mut(last)?.next = Some(key);
                    self.node_mut(key)?.prev = Some(last);
                    Some((first, key))
                }
            };
        }

        let Some((first, last)) = run else {
            return Ok(false);
        };
        self.splice(first, last, before)?;
        self.generation.bump();
        Ok(true)
    }

    pub fn remove(&mut self, index: usize) -> Result<T> {
        let key = self.node_at(index)?;
        self.unlink(key)
    }

    pub fn index_of(&self, value: &T) -> Option<usize>
    where
        T: PartialEq,
    {
        self.iter().position(|v| v == value)
    }

    /// Scans from the tail.
    pub fn last_index_of(&self, value: &T) -> Option<usize>
    where
        T: PartialEq,
    {
        self.iter().rposition(|v| v == value)
    }

    pub fn contains(&self, value: &T) -> bool
    where
        T: PartialEq,
    {
        self.index_of(value).is_some()
    }

    pub fn clear(&mut self) {
        tracing::trace!(len = self.len(), "sequence cleared");
        self.nodes.clear();
        self.head = None;
        self.tail = None;
        self.generation.bump();
    }

    /// Independent copy of the values in `range`.
    ///
    /// Both `from..to` and `from..=to` are accepted, following slice
    /// conventions: `0..0` is valid on an empty sequence, a start past the
    /// end is `InvalidRange`, an end past `len` is `IndexOutOfBounds`.
    pub fn sub_list<R>(&self, range: R) -> Result<LinkedSequence<T>>
    where
        R: RangeBounds<usize>,
        T: Clone,
    {
        let len = self.len();
        let start = match range.start_bound() {
            Bound::Included(&s) => s,
            Bound::Excluded(&s) => s
                .checked_add(1)
                .ok_or(CollectionError::IndexOutOfBounds { index: s, len })?,
            Bound::Unbounded => 0,
        };
        let end = match range.end_bound() {
            Bound::Included(&e) => e
                .checked_add(1)
                .ok_or(CollectionError::IndexOutOfBounds { index: e, len })?,
            Bound::Excluded(&e) => e,
            Bound::Unbounded => len,
        };
        if start > end {
            return Err(CollectionError::InvalidRange { start, end });
        }
        if end > len {
            return Err(CollectionError::IndexOutOfBounds { index: end, len });
        }

        let mut copy = LinkedSequence::new();
        if start == end {
            return Ok(copy);
        }
        let mut key = Some(self.node_at(start)?);
        for _ in start..end {
            let node = self.node(key.ok_or(BROKEN_LINKS)?)?;
            copy.add(node.value.clone());
            key = node.next;
        }
        Ok(copy)
    }

    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            front: self.head,
            back: self.tail,
            remaining: self.len(),
        }
    }

    /// Fail-fast cursor positioned before the first element.
    pub fn cursor(&self) -> ListCursor {
        ListCursor {
            index: 0,
            node: self.head,
            last: None,
            stamp: self.generation.stamp(),
        }
    }

    /// Fail-fast cursor whose first `next` returns the element at `index`.
    /// Valid for `0..=len`.
    pub fn cursor_at(&self, index: usize) -> Result<ListCursor> {
        let node = self.successor_for(index)?;
        Ok(ListCursor {
            index,
            node,
            last: None,
            stamp: self.generation.stamp(),
        })
    }
}

impl<T> Default for LinkedSequence<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Clone for LinkedSequence<T> {
    fn clone(&self) -> Self {
        self.iter().cloned().collect()
    }
}

impl<T: PartialEq> PartialEq for LinkedSequence<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<T: Eq> Eq for LinkedSequence<T> {}

impl<T: fmt::Debug> fmt::Debug for LinkedSequence<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T> FromIterator<T> for LinkedSequence<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut list = LinkedSequence::new();
        list.extend(iter);
        list
    }
}

impl<T> Extend<T> for LinkedSequence<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.add(value);
        }
    }
}

impl<'a, T> IntoIterator for &'a LinkedSequence<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Borrowing front-to-back iterator; also walks back-to-front.
pub struct Iter<'a, T> {
    list: &'a LinkedSequence<T>,
    front: Option<NodeKey>,
    back: Option<NodeKey>,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let list: &'a LinkedSequence<T> = self.list;
        let node = list.nodes.get(self.front?)?;
        self.front = node.next;
        self.remaining -= 1;
        Some(&node.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T> DoubleEndedIterator for Iter<'a, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let list: &'a LinkedSequence<T> = self.list;
        let node = list.nodes.get(self.back?)?;
        self.back = node.prev;
        self.remaining -= 1;
        Some(&node.value)
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

/// Detached bidirectional fail-fast iterator over a `LinkedSequence`.
///
/// The cursor sits between two elements; `next` returns the one after it
/// and `previous` the one before. It holds no borrow, so every call takes
/// the sequence; a structural change made by any other route fails the
/// next `next`/`previous`/`remove` with `ConcurrentModification`, and
/// passing any sequence other than the creating one fails with
/// `WrongCollection`.
#[derive(Debug, Clone)]
pub struct ListCursor {
    index: usize,
    node: Option<NodeKey>,
    last: Option<NodeKey>,
    stamp: Stamp,
}

impl ListCursor {
    pub fn has_next<T>(&self, list: &LinkedSequence<T>) -> bool {
        self.index < list.len()
    }

    pub fn has_previous(&self) -> bool {
        self.index > 0
    }

    /// Index of the element `next` would return.
    pub fn next_index(&self) -> usize {
        self.index
    }

    /// Index of the element `previous` would return.
    pub fn previous_index(&self) -> Option<usize> {
        self.index.checked_sub(1)
    }

    pub fn next<'a, T>(&mut self, list: &'a LinkedSequence<T>) -> Result<&'a T> {
        list.generation.verify(self.stamp)?;
        let key = self.node.ok_or(CollectionError::NoSuchElement)?;
        let node = list.node(key)?;
        self.node = node.next;
        self.index += 1;
        self.last = Some(key);
        Ok(&node.value)
    }

    pub fn previous<'a, T>(&mut self, list: &'a LinkedSequence<T>) -> Result<&'a T> {
        list.generation.verify(self.stamp)?;
        let before = match self.node {
            Some(k) => list.node(k)?.prev,
            None => list.tail,
        };
        let key = before.ok_or(CollectionError::NoSuchElement)?;
        let node = list.node(key)?;
        self.node = Some(key);
        self.index -= 1;
        self.last = Some(key);
        Ok(&node.value)
    }

    /// Removes the element last returned by `next` or `previous`.
    pub fn remove<T>(&mut self, list: &mut LinkedSequence<T>) -> Result<T> {
        list.generation.verify(self.stamp)?;
        let key = self.last.take().ok_or(CollectionError::IllegalState)?;
        if self.node == Some(key) {
            // Returned by `previous`: the cursor sat right before it.
            self.node = list.node(key)?.next;
        } else {
            self.index -= 1;
        }
        let value = list.unlink(key)?;
        self.stamp = list.generation.stamp();
        Ok(value)
    }

    /// Always fails: positional writes through a cursor are not supported.
    pub fn set<T>(&mut self, _value: T) -> Result<()> {
        Err(CollectionError::Unsupported("set through a sequence cursor"))
    }

    /// Always fails: positional inserts through a cursor are not supported.
    pub fn add<T>(&mut self, _value: T) -> Result<()> {
        Err(CollectionError::Unsupported("add through a sequence cursor"))
    }
}

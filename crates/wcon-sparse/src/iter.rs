use std::collections::{btree_map, BTreeMap};
use std::iter::FusedIterator;

/// Borrowing iterator returned by [`SparseList::iter`](crate::SparseList::iter).
///
/// Walks positions from zero. Termination is driven by the number of present
/// entries seen, not by the highest key, so the walk ends on the item that
/// completes the count.
#[derive(Debug, Clone)]
pub struct Iter<'a, T> {
    base: &'a BTreeMap<usize, T>,
    index: usize,
    hits: usize,
    span: usize,
}

impl<'a, T> Iter<'a, T> {
    pub(crate) fn new(base: &'a BTreeMap<usize, T>) -> Self {
        Self {
            base,
            index: 0,
            hits: 0,
            span: crate::span_of(base),
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = Option<&'a T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.hits >= self.base.len() {
            return None;
        }
        let item = self.base.get(&self.index);
        if item.is_some() {
            self.hits += 1;
        }
        self.index = self.index.saturating_add(1);
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = if self.hits >= self.base.len() {
            0
        } else {
            self.span.saturating_sub(self.index)
        };
        (remaining, Some(remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}

/// Owning iterator over a [`SparseList`](crate::SparseList), with the same
/// padding and termination rule as [`Iter`].
#[derive(Debug)]
pub struct IntoIter<T> {
    base: BTreeMap<usize, T>,
    index: usize,
}

impl<T> IntoIter<T> {
    pub(crate) fn new(base: BTreeMap<usize, T>) -> Self {
        Self { base, index: 0 }
    }
}

impl<T> Iterator for IntoIter<T> {
    type Item = Option<T>;

    fn next(&mut self) -> Option<Self::Item> {
        // Entries are removed as they are yielded, so an empty map means every
        // present entry has been seen.
        if self.base.is_empty() {
            return None;
        }
        let item = self.base.remove(&self.index);
        self.index = self.index.saturating_add(1);
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self
            .base
            .keys()
            .next_back()
            .map_or(0, |&last| (last - self.index).saturating_add(1));
        (remaining, Some(remaining))
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}

impl<T> FusedIterator for IntoIter<T> {}

/// Present `(index, value)` pairs in ascending index order.
#[derive(Debug, Clone)]
pub struct Entries<'a, T> {
    inner: btree_map::Iter<'a, usize, T>,
}

impl<'a, T> Entries<'a, T> {
    pub(crate) fn new(base: &'a BTreeMap<usize, T>) -> Self {
        Self { inner: base.iter() }
    }
}

impl<'a, T> Iterator for Entries<'a, T> {
    type Item = (usize, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(&index, value)| (index, value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> DoubleEndedIterator for Entries<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(&index, value)| (index, value))
    }
}

impl<T> ExactSizeIterator for Entries<'_, T> {}

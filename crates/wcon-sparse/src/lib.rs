//! Sparse integer-indexed lists.
//!
//! A [`SparseList`] wraps a mapping from non-negative index to value and
//! presents it as an ordered sequence. Absent indices are not stored; they
//! show up as `None` while iterating and as `null` when serialized.
//!
//! # Example
//!
//! ```
//! use wcon_sparse::SparseList;
//!
//! let list: SparseList<&str> = [(0, "a"), (2, "b")].into_iter().collect();
//! let items: Vec<Option<&&str>> = list.iter().collect();
//! assert_eq!(items, vec![Some(&"a"), None, Some(&"b")]);
//!
//! assert!(list.get(1).is_err());
//! assert_eq!(list.to_string(), "[a, , b]");
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::{Serialize, Serializer};
use thiserror::Error;

mod iter;

pub use iter::{Entries, IntoIter, Iter};

/// Errors raised by [`SparseList`] lookups.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SparseListError {
    /// Nothing was ever stored at this index.
    #[error("index {0} not found")]
    IndexNotFound(usize),
}

/// An ordered sequence backed by a sparse `index -> value` mapping.
///
/// The list owns its backing map. Reads of an absent index fail with
/// [`SparseListError::IndexNotFound`], which is distinct from reading a stored
/// value that happens to be null-like (e.g. `serde_json::Value::Null`).
#[derive(Clone, PartialEq, Eq)]
pub struct SparseList<T> {
    base: BTreeMap<usize, T>,
}

impl<T> SparseList<T> {
    pub fn new() -> Self {
        Self {
            base: BTreeMap::new(),
        }
    }

    /// Takes ownership of `base` as the backing mapping.
    pub fn from_map(base: BTreeMap<usize, T>) -> Self {
        Self { base }
    }

    /// Looks up the value stored at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`SparseListError::IndexNotFound`] if nothing is stored there.
    pub fn get(&self, index: usize) -> Result<&T, SparseListError> {
        self.base
            .get(&index)
            .ok_or(SparseListError::IndexNotFound(index))
    }

    /// Mutable counterpart of [`SparseList::get`].
    ///
    /// # Errors
    ///
    /// Returns [`SparseListError::IndexNotFound`] if nothing is stored there.
    pub fn get_mut(&mut self, index: usize) -> Result<&mut T, SparseListError> {
        self.base
            .get_mut(&index)
            .ok_or(SparseListError::IndexNotFound(index))
    }

    /// Stores `value` at `index`, returning the value it replaced.
    ///
    /// Any index is accepted; writing far past the current end simply widens
    /// the gap that iteration pads with `None`.
    pub fn set(&mut self, index: usize, value: T) -> Option<T> {
        self.base.insert(index, value)
    }

    pub fn remove(&mut self, index: usize) -> Option<T> {
        self.base.remove(&index)
    }

    pub fn contains(&self, index: usize) -> bool {
        self.base.contains_key(&index)
    }

    /// Number of present entries. Gaps are not counted.
    pub fn len(&self) -> usize {
        self.base.len()
    }

    pub fn is_empty(&self) -> bool {
        self.base.is_empty()
    }

    /// Number of items [`SparseList::iter`] yields: one past the highest
    /// present index, or zero when the list is empty. Saturates at
    /// `usize::MAX`.
    pub fn span(&self) -> usize {
        span_of(&self.base)
    }

    /// Iterates positions `0, 1, 2, ...`, yielding the stored value or `None`
    /// for a gap, and stops once every present entry has been yielded.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(&self.base)
    }

    /// Present entries only, in ascending index order.
    pub fn entries(&self) -> Entries<'_, T> {
        Entries::new(&self.base)
    }

    /// Materializes the padded sequence.
    pub fn into_padded(self) -> Vec<Option<T>> {
        self.into_iter().collect()
    }

    pub fn as_map(&self) -> &BTreeMap<usize, T> {
        &self.base
    }

    pub fn into_map(self) -> BTreeMap<usize, T> {
        self.base
    }
}

pub(crate) fn span_of<T>(base: &BTreeMap<usize, T>) -> usize {
    base.keys()
        .next_back()
        .map_or(0, |last| last.saturating_add(1))
}

impl<T> Default for SparseList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> From<BTreeMap<usize, T>> for SparseList<T> {
    fn from(base: BTreeMap<usize, T>) -> Self {
        Self::from_map(base)
    }
}

impl<T> FromIterator<(usize, T)> for SparseList<T> {
    fn from_iter<I: IntoIterator<Item = (usize, T)>>(iter: I) -> Self {
        Self::from_map(iter.into_iter().collect())
    }
}

impl<T> Extend<(usize, T)> for SparseList<T> {
    fn extend<I: IntoIterator<Item = (usize, T)>>(&mut self, iter: I) {
        self.base.extend(iter);
    }
}

impl<'a, T> IntoIterator for &'a SparseList<T> {
    type Item = Option<&'a T>;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T> IntoIterator for SparseList<T> {
    type Item = Option<T>;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter::new(self.base)
    }
}

/// Serializes as a sequence following [`SparseList::iter`]: gaps become
/// `null`.
impl<T: Serialize> Serialize for SparseList<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

/// Display rendering for logs and debugging.
///
/// Entries are written in index order. A jump of more than one index between
/// consecutive entries is marked with a lone space token instead of a run of
/// nulls, so the output is not meant to be parsed back.
impl<T: fmt::Display> fmt::Display for SparseList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        let mut last: Option<usize> = None;
        for (&index, value) in &self.base {
            let jump = match last {
                Some(last) => index - last > 1,
                None => index > 0,
            };
            if jump {
                if last.is_some() {
                    f.write_str(",")?;
                }
                f.write_str(" ")?;
            }
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{value}")?;
            last = Some(index);
        }
        f.write_str("]")
    }
}

impl<T: fmt::Debug> fmt::Debug for SparseList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SparseList(")?;
        f.debug_map().entries(self.base.iter()).finish()?;
        f.write_str(")")
    }
}

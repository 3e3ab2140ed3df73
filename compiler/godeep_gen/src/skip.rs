//! Shallow-copy selectors.
//!
//! A selector names a path below the receiver: `Inner.Items` for a nested
//! field, `Items[i]` for the elements of a slice or array, `Lookup[k]` for
//! the entries of a map (keys and values alike). The generated copy stops
//! descending where a selector matches; whatever the parent step already
//! copied stays shallow.

use std::cell::Cell;
use std::collections::BTreeMap;

#[derive(Clone, Debug, Default)]
pub struct SkipSet {
    /// Selector to whether it matched a walked path.
    selectors: BTreeMap<String, Cell<bool>>,
}

impl SkipSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a comma-separated selector list. Blank entries are ignored.
    pub fn parse(list: &str) -> Self {
        list.split(',')
            .map(str::trim)
            .filter(|selector| !selector.is_empty())
            .collect()
    }

    pub fn insert(&mut self, selector: impl Into<String>) {
        self.selectors.insert(selector.into(), Cell::new(false));
    }

    /// Whether `path` is selected, recording the match.
    pub fn matches(&self, path: &str) -> bool {
        match self.selectors.get(path) {
            Some(hit) => {
                hit.set(true);
                true
            }
            None => false,
        }
    }

    /// Selectors that never matched, sorted.
    pub fn unmatched(&self) -> Vec<&str> {
        self.selectors
            .iter()
            .filter(|(_, hit)| !hit.get())
            .map(|(selector, _)| selector.as_str())
            .collect()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.selectors.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for SkipSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = SkipSet::new();
        for selector in iter {
            set.insert(selector);
        }
        set
    }
}

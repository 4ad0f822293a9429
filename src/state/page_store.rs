//! Insertion-ordered page store and the visited-URL set

use crate::state::{PageRecord, PathHop};
use std::collections::{HashMap, HashSet};

/// URL -> PageRecord mapping that iterates in discovery order
///
/// Search results are returned in the order pages were first recorded, so the
/// store keeps records in a vector and indexes them by URL.
#[derive(Debug, Clone, Default)]
pub struct PageStore {
    records: Vec<PageRecord>,
    index: HashMap<String, usize>,
}

impl PageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a record; returns false (and keeps the existing record) if the
    /// URL is already present
    pub fn insert(&mut self, record: PageRecord) -> bool {
        if self.index.contains_key(&record.url) {
            return false;
        }
        self.index.insert(record.url.clone(), self.records.len());
        self.records.push(record);
        true
    }

    pub fn get(&self, url: &str) -> Option<&PageRecord> {
        self.index.get(url).map(|&i| &self.records[i])
    }

    pub fn contains(&self, url: &str) -> bool {
        self.index.contains_key(url)
    }

    /// Replaces the discovery path of a record when the new one is strictly
    /// shallower
    ///
    /// Returns the previous depth if the record was updated.
    pub fn reconcile_path(
        &mut self,
        url: &str,
        path_info: &[PathHop],
        parent_url: Option<&str>,
    ) -> Option<u32> {
        let &i = self.index.get(url)?;
        let record = &mut self.records[i];
        let new_depth = path_info.len().checked_sub(1)? as u32;
        if new_depth >= record.depth {
            return None;
        }

        let previous = record.depth;
        record.depth = new_depth;
        record.path_info = path_info.to_vec();
        record.parent_url = parent_url.map(str::to_string);
        Some(previous)
    }

    /// Iterates records in insertion (discovery) order
    pub fn iter(&self) -> impl Iterator<Item = &PageRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Deepest recorded depth, or 0 for an empty store
    pub fn max_depth(&self) -> u32 {
        self.records.iter().map(|r| r.depth).max().unwrap_or(0)
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.index.clear();
    }
}

impl FromIterator<PageRecord> for PageStore {
    fn from_iter<I: IntoIterator<Item = PageRecord>>(iter: I) -> Self {
        let mut store = PageStore::new();
        for record in iter {
            store.insert(record);
        }
        store
    }
}

/// URLs that have been fetched and recorded in the page store
///
/// Persists across runs through the cache. The per-run "already queued" set is
/// owned by the traversal itself and never stored here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisitedSet {
    urls: HashSet<String>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a URL visited; returns false if it already was
    pub fn insert(&mut self, url: impl Into<String>) -> bool {
        self.urls.insert(url.into())
    }

    pub fn contains(&self, url: &str) -> bool {
        self.urls.contains(url)
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.urls.iter()
    }

    pub fn clear(&mut self) {
        self.urls.clear();
    }
}

impl FromIterator<String> for VisitedSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            urls: iter.into_iter().collect(),
        }
    }
}

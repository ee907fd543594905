use crate::state::SeenSet;
use std::collections::{BTreeMap, HashSet};

/// Seen-sets of every subscribed feed, keyed by feed URL
///
/// Owned by the scheduler: it is handed to each round and handed back with
/// that round's updates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestionState {
    feeds: BTreeMap<String, SeenSet>,
}

impl IngestionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.feeds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.feeds.is_empty()
    }

    pub fn get(&self, url: &str) -> Option<&SeenSet> {
        self.feeds.get(url)
    }

    pub fn contains_feed(&self, url: &str) -> bool {
        self.feeds.contains_key(url)
    }

    /// Removes and returns the seen-set of a feed (empty if unknown)
    pub fn take(&mut self, url: &str) -> SeenSet {
        self.feeds.remove(url).unwrap_or_default()
    }

    pub fn insert(&mut self, url: impl Into<String>, seen: SeenSet) {
        self.feeds.insert(url.into(), seen);
    }

    /// Iterates feeds in URL order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SeenSet)> {
        self.feeds.iter().map(|(url, seen)| (url.as_str(), seen))
    }

    /// Total number of identifiers across all feeds
    pub fn total_entries(&self) -> usize {
        self.feeds.values().map(SeenSet::len).sum()
    }

    /// Drops every feed whose URL is not in `active`
    ///
    /// Returns the removed URLs in order.
    pub fn prune<'a>(&mut self, active: impl IntoIterator<Item = &'a str>) -> Vec<String> {
        let active: HashSet<&str> = active.into_iter().collect();
        let removed: Vec<String> = self
            .feeds
            .keys()
            .filter(|url| !active.contains(url.as_str()))
            .cloned()
            .collect();

        for url in &removed {
            self.feeds.remove(url);
        }
        removed
    }
}

use crate::ingest::FeedItem;
use std::collections::VecDeque;

/// Maximum number of identifiers remembered per feed
pub const SEEN_CAPACITY: usize = 999;

/// Ordered history of identifiers already delivered for one feed
///
/// Oldest entries sit at the front. The list only grows at the back and
/// shrinks from the front, so retained entries never change order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeenSet {
    entries: VecDeque<String>,
}

impl SeenSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates identifiers from oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.entries.iter().any(|e| e == identifier)
    }

    /// Appends an identifier as the newest entry
    pub fn push(&mut self, identifier: impl Into<String>) {
        self.entries.push_back(identifier.into());
    }

    /// Checks whether an item was already recorded
    ///
    /// Matches the raw identifier, the raw link, and the link with its scheme
    /// flipped between `http://` and `https://`.
    pub fn has_seen(&self, item: &FeedItem) -> bool {
        self.contains(&item.guid)
            || self.contains(&item.link)
            || self.contains(&item.link.replacen("http://", "https://", 1))
            || self.contains(&item.link.replacen("https://", "http://", 1))
    }

    /// Drops the oldest entries until at most `capacity` remain
    ///
    /// Returns the number of evicted entries.
    pub fn truncate_front(&mut self, capacity: usize) -> usize {
        let excess = self.entries.len().saturating_sub(capacity);
        self.entries.drain(..excess);
        excess
    }
}

impl FromIterator<String> for SeenSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl From<Vec<String>> for SeenSet {
    fn from(entries: Vec<String>) -> Self {
        Self {
            entries: entries.into(),
        }
    }
}

/// Splits fetched items into novel ones and records them
///
/// An empty `prior` is a feed seen for the first time: every item is recorded
/// as a baseline and nothing is reported as novel. Otherwise items not
/// matched by [`SeenSet::has_seen`] are appended and returned in fetch order.
/// The resulting seen-set is capped at [`SEEN_CAPACITY`].
pub fn mark_and_filter_new(items: Vec<FeedItem>, prior: SeenSet) -> (Vec<FeedItem>, SeenSet) {
    let mut seen = prior;

    if seen.is_empty() {
        for item in &items {
            seen.push(item.identifier());
        }
    }

    let mut novel = Vec::new();
    for item in items {
        if !seen.has_seen(&item) {
            seen.push(item.identifier());
            novel.push(item);
        }
    }

    let evicted = seen.truncate_front(SEEN_CAPACITY);
    if evicted > 0 {
        tracing::trace!("Evicted {} oldest identifiers", evicted);
    }

    (novel, seen)
}

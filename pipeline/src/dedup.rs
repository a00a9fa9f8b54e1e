//! Transaction ids seen recently, for duplicate detection.

use {
    simplefees_types::{AccountId, Timestamp, TransactionId},
    std::collections::BTreeMap,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Seen {
    /// Node that first handled the id, if any node has.
    handled_by: Option<AccountId>,
}

#[derive(Debug, Clone)]
pub struct DedupCache {
    window_secs: u64,
    entries: BTreeMap<TransactionId, Seen>,
}

impl DedupCache {
    pub fn new(window_secs: u64) -> Self {
        Self {
            window_secs,
            entries: BTreeMap::new(),
        }
    }

    /// Accepted at ingest or already handled.
    pub fn contains(&self, id: &TransactionId) -> bool {
        self.entries.contains_key(id)
    }

    pub fn handled_by(&self, id: &TransactionId) -> Option<AccountId> {
        self.entries.get(id).and_then(|seen| seen.handled_by)
    }

    pub fn record_submitted(&mut self, id: TransactionId) {
        self.entries.entry(id).or_insert(Seen { handled_by: None });
    }

    /// Keeps the first handling node.
    pub fn record_handled(&mut self, id: TransactionId, node: AccountId) {
        let seen = self.entries.entry(id).or_insert(Seen { handled_by: None });
        seen.handled_by.get_or_insert(node);
    }

    /// Forgets ids whose valid start is older than the window.
    pub fn purge(&mut self, now: Timestamp) {
        let window = i64::try_from(self.window_secs).unwrap_or(i64::MAX);
        let cutoff = now.minus_secs(window);
        self.entries.retain(|id, _| id.valid_start >= cutoff);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

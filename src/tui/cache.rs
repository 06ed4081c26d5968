//! Per-tab issue detail cache.

use crate::data::IssueDetail;
use std::collections::HashMap;
use std::sync::Arc;

/// Issue details keyed by issue key.
///
/// Entries are shared with the detail pane through `Arc`, so a cached issue
/// can be displayed without cloning the comment bodies.
///
/// Every key also has a generation that moves forward whenever its entry is
/// invalidated (and for all keys on `clear`). A fetch records the generation
/// it started under; results from an older generation are refused so a slow
/// response cannot put back data the cache was told to forget.
#[derive(Debug, Default)]
pub struct IssueCache {
    entries: HashMap<String, Arc<IssueDetail>>,
    invalidations: HashMap<String, u64>,
    epoch: u64,
}

impl IssueCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<Arc<IssueDetail>> {
        self.entries.get(key).cloned()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn generation(&self, key: &str) -> u64 {
        self.epoch + self.invalidations.get(key).copied().unwrap_or(0)
    }

    /// Store a detail fetched under `generation`. Returns `None` without
    /// touching the cache when the key was invalidated after the fetch began.
    pub fn insert(
        &mut self,
        detail: impl Into<Arc<IssueDetail>>,
        generation: u64,
    ) -> Option<Arc<IssueDetail>> {
        let detail = detail.into();
        let current = self.generation(detail.key());
        if generation < current {
            tracing::debug!(
                "Refusing outdated {} (generation {} < {})",
                detail.key(),
                generation,
                current
            );
            return None;
        }
        self.entries
            .insert(detail.key().to_string(), Arc::clone(&detail));
        Some(detail)
    }

    /// Drop the entry for `key` so the next read goes back to the server.
    /// Fetches already in flight for `key` become outdated even if nothing
    /// was cached yet.
    pub fn invalidate(&mut self, key: &str) -> bool {
        *self.invalidations.entry(key.to_string()).or_insert(0) += 1;
        let removed = self.entries.remove(key).is_some();
        if removed {
            tracing::debug!("Evicted {} from issue cache", key);
        }
        removed
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.epoch += 1;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

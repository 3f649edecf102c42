//! Skip set: source identifiers exempt from interception.

use std::collections::HashSet;
use std::sync::RwLock;

use log::debug;

/// A wholesale-replaceable set of source identifiers.
///
/// Lookups are plain string equality; the host supplies pre-normalized keys.
/// There is no per-entry mutation: the only write operation swaps the whole
/// set and drops the previous one.
#[derive(Default)]
pub struct SkipSet {
    sources: RwLock<HashSet<String>>,
}

impl SkipSet {
    pub fn new() -> Self {
        SkipSet::default()
    }

    /// Replace the entire set.
    pub fn replace(&self, sources: HashSet<String>) {
        debug!("skip set replaced ({} entries)", sources.len());
        let mut current = self.sources.write().expect("skip set lock poisoned");
        *current = sources;
    }

    /// Whether `source` is exempt from interception.
    pub fn contains(&self, source: &str) -> bool {
        let sources = self.sources.read().expect("skip set lock poisoned");
        sources.contains(source)
    }

    pub fn is_empty(&self) -> bool {
        let sources = self.sources.read().expect("skip set lock poisoned");
        sources.is_empty()
    }
}

//! Memoization of rendered fragments.
//!
//! Entries are keyed by node id and context signature. Each node keeps a
//! small LRU of its own so a node rendered under many different contexts
//! cannot grow the cache without bound.

use lru::LruCache;
use std::collections::HashMap;
use std::num::NonZeroUsize;

use crate::parser::NodeId;
use crate::renderer::fragment::Fragment;
use crate::renderer::traits::ContextSignature;

pub const DEFAULT_ENTRIES_PER_NODE: usize = 4;

pub struct RenderCache {
    per_node: HashMap<NodeId, LruCache<ContextSignature, Option<Fragment>>>,
    capacity: NonZeroUsize,
    hits: usize,
    misses: usize,
}

impl RenderCache {
    pub fn new(entries_per_node: usize) -> Self {
        Self {
            per_node: HashMap::new(),
            capacity: NonZeroUsize::new(entries_per_node).unwrap_or(NonZeroUsize::MIN),
            hits: 0,
            misses: 0,
        }
    }

    /// `Some(result)` on a hit; the cached result may itself be `None`.
    pub fn get(&mut self, id: NodeId, signature: &ContextSignature) -> Option<Option<Fragment>> {
        let hit = self
            .per_node
            .get_mut(&id)
            .and_then(|entries| entries.get(signature))
            .cloned();
        match hit {
            Some(_) => self.hits += 1,
            None => self.misses += 1,
        }
        hit
    }

    pub fn insert(&mut self, id: NodeId, signature: ContextSignature, fragment: Option<Fragment>) {
        let capacity = self.capacity;
        self.per_node
            .entry(id)
            .or_insert_with(|| LruCache::new(capacity))
            .put(signature, fragment);
    }

    pub fn clear(&mut self) {
        self.per_node.clear();
        self.reset_stats();
    }

    pub fn reset_stats(&mut self) {
        self.hits = 0;
        self.misses = 0;
    }

    /// Number of cached entries across all nodes.
    pub fn len(&self) -> usize {
        self.per_node.values().map(LruCache::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn entries_for(&self, id: NodeId) -> usize {
        self.per_node.get(&id).map_or(0, LruCache::len)
    }

    pub fn stats(&self) -> (usize, usize) {
        (self.hits, self.misses)
    }
}

impl Default for RenderCache {
    fn default() -> Self {
        Self::new(DEFAULT_ENTRIES_PER_NODE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::fragment::InlineFragment;
    use crate::renderer::traits::TableHints;

    fn signature(width: usize) -> ContextSignature {
        ContextSignature {
            width,
            preformatted: false,
            depth: 1,
            list: None,
            table: TableHints::default(),
        }
    }

    #[test]
    fn test_hit_and_miss() {
        let mut cache = RenderCache::default();
        let fragment = Some(Fragment::Inline(InlineFragment::new("x")));

        assert_eq!(cache.get(NodeId(1), &signature(80)), None);
        cache.insert(NodeId(1), signature(80), fragment.clone());
        assert_eq!(cache.get(NodeId(1), &signature(80)), Some(fragment));
        assert_eq!(cache.get(NodeId(1), &signature(40)), None);
        assert_eq!(cache.stats(), (1, 2));
    }

    #[test]
    fn test_entries_are_bounded_per_node() {
        let mut cache = RenderCache::new(2);
        for width in 0..10 {
            cache.insert(NodeId(7), signature(width), None);
        }
        cache.insert(NodeId(8), signature(1), None);

        assert_eq!(cache.entries_for(NodeId(7)), 2);
        assert_eq!(cache.len(), 3);
        // The most recent entries survive.
        assert_eq!(cache.get(NodeId(7), &signature(9)), Some(None));
        assert_eq!(cache.get(NodeId(7), &signature(0)), None);
    }

    #[test]
    fn test_clear() {
        let mut cache = RenderCache::default();
        cache.insert(NodeId(1), signature(80), None);
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.stats(), (0, 0));
    }
}

//! Run-scoped state passed explicitly into every resolver call.

use std::collections::HashMap;

use crate::associations::{AssociationCache, AssociationKind};
use crate::document::RawNode;
use crate::types::NaturalKey;

/// A standalone term node seen earlier in the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PooledTerm {
    pub key: NaturalKey,
    pub source_id: String,
}

/// Term pools and association cache for one import run.
///
/// Owned by a single writer (the importer) and discarded with the run; the
/// cache alone can be carried into a later run with [`RunContext::with_cache`].
#[derive(Debug, Default)]
pub struct RunContext {
    pools: HashMap<AssociationKind, Vec<PooledTerm>>,
    cache: AssociationCache,
    warnings: Vec<String>,
}

impl RunContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a run with a cache left over from a previous one.
    pub fn with_cache(cache: AssociationCache) -> Self {
        Self {
            cache,
            ..Self::default()
        }
    }

    /// Add a standalone term node to its kind's pool.
    ///
    /// Returns `false` (and records a warning) when the node has no usable
    /// key or its key is already pooled; the first registration wins.
    pub fn register(&mut self, kind: AssociationKind, node: &RawNode) -> bool {
        let Some(key) = kind.pool_key(node) else {
            self.warn(format!("{} has no {kind} slug, not registered", node.source_id()));
            return false;
        };

        let pool = self.pools.entry(kind).or_default();
        if let Some(existing) = pool.iter().find(|term| term.key == key) {
            let message = format!(
                "duplicate {kind} {key} in {} (keeping {})",
                node.source_id(),
                existing.source_id
            );
            self.warn(message);
            return false;
        }

        pool.push(PooledTerm {
            key,
            source_id: node.source_id(),
        });
        true
    }

    /// First pooled term of `kind` with a matching natural key.
    pub fn find_pooled(&self, kind: AssociationKind, key: &NaturalKey) -> Option<&PooledTerm> {
        self.pools.get(&kind)?.iter().find(|term| &term.key == key)
    }

    pub fn pool_len(&self, kind: AssociationKind) -> usize {
        self.pools.get(&kind).map_or(0, Vec::len)
    }

    pub fn cache(&self) -> &AssociationCache {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut AssociationCache {
        &mut self.cache
    }

    /// Hand the cache on to a later run, dropping the pools.
    pub fn into_cache(self) -> AssociationCache {
        self.cache
    }

    pub fn warn(&mut self, message: String) {
        tracing::warn!(%message, "Import warning");
        self.warnings.push(message);
    }

    /// Drain warnings gathered so far.
    pub fn take_warnings(&mut self) -> Vec<String> {
        std::mem::take(&mut self.warnings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(id: &str, slug: &str, name: &str) -> RawNode {
        RawNode::new("tag")
            .with_field("term_id", id)
            .with_field("tag_slug", slug)
            .with_field("tag_name", name)
    }

    #[test]
    fn register_and_find() {
        let mut ctx = RunContext::new();
        assert!(ctx.register(AssociationKind::Tag, &tag("1", "foo", "Foo")));
        let found = ctx
            .find_pooled(AssociationKind::Tag, &NaturalKey::new("foo", "Foo"))
            .unwrap();
        assert_eq!(found.source_id, "tag#1");
        assert!(ctx
            .find_pooled(AssociationKind::Category, &NaturalKey::new("foo", "Foo"))
            .is_none());
    }

    #[test]
    fn duplicate_keeps_first_and_warns() {
        let mut ctx = RunContext::new();
        ctx.register(AssociationKind::Tag, &tag("1", "foo", "Foo"));
        assert!(!ctx.register(AssociationKind::Tag, &tag("2", "foo", "Foo")));
        assert_eq!(ctx.pool_len(AssociationKind::Tag), 1);

        let found = ctx
            .find_pooled(AssociationKind::Tag, &NaturalKey::new("foo", "Foo"))
            .unwrap();
        assert_eq!(found.source_id, "tag#1");

        let warnings = ctx.take_warnings();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("keeping tag#1"));
        assert!(ctx.take_warnings().is_empty());
    }

    #[test]
    fn term_without_slug_is_not_pooled() {
        let mut ctx = RunContext::new();
        assert!(!ctx.register(AssociationKind::Tag, &tag("1", "", "Foo")));
        assert_eq!(ctx.pool_len(AssociationKind::Tag), 0);
    }

    #[test]
    fn cache_survives_into_next_run() {
        let mut ctx = RunContext::new();
        ctx.register(AssociationKind::Tag, &tag("1", "foo", "Foo"));
        ctx.cache_mut().insert(
            AssociationKind::Tag,
            NaturalKey::new("foo", "Foo"),
            crate::types::ImportedRecord {
                record_type: crate::types::RecordType::Tag,
                id: 4,
            },
        );

        let next = RunContext::with_cache(ctx.into_cache());
        assert_eq!(next.pool_len(AssociationKind::Tag), 0);
        assert_eq!(next.cache().len(), 1);
    }
}

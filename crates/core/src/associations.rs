//! Association resolution: turns inline term references into target rows,
//! creating each distinct term at most once per run.

use std::collections::HashMap;

use serde::Serialize;

use crate::context::RunContext;
use crate::document::{NestedReference, RawNode};
use crate::error::CoreError;
use crate::mapper::{map_term, ImportDefaults, AUTHOR_ATTRIBUTE};
use crate::store::{IdentityDirectory, RecordStore};
use crate::types::{ImportedRecord, MappedAttributes, NaturalKey, RecordType};

// ---------------------------------------------------------------------------
// Association kinds
// ---------------------------------------------------------------------------

/// Kind of term an item can reference inline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AssociationKind {
    Tag,
    Category,
}

impl AssociationKind {
    pub const ALL: [AssociationKind; 2] = [Self::Tag, Self::Category];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tag => "tag",
            Self::Category => "category",
        }
    }

    /// Discriminator value carried in a reference's `domain` attribute.
    pub fn domain(&self) -> &'static str {
        match self {
            Self::Tag => "post_tag",
            Self::Category => "category",
        }
    }

    /// Kind for a reference `domain`; `None` for domains with no target.
    pub fn from_domain(domain: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.domain() == domain)
    }

    pub fn record_type(&self) -> RecordType {
        match self {
            Self::Tag => RecordType::Tag,
            Self::Category => RecordType::BlogCategory,
        }
    }

    /// `(slug, display name)` fields of the standalone term node.
    pub fn pool_key_fields(&self) -> (&'static str, &'static str) {
        match self {
            Self::Tag => ("tag_slug", "tag_name"),
            Self::Category => ("category_nicename", "cat_name"),
        }
    }

    /// Natural key of a standalone term node, if it carries a slug.
    pub fn pool_key(&self, node: &RawNode) -> Option<NaturalKey> {
        let (slug_field, name_field) = self.pool_key_fields();
        let slug = node.field(slug_field).filter(|s| !s.is_empty())?;
        Some(NaturalKey::new(slug, node.field(name_field).unwrap_or_default()))
    }
}

impl std::fmt::Display for AssociationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl NestedReference {
    pub fn kind(&self) -> Option<AssociationKind> {
        AssociationKind::from_domain(&self.domain)
    }

    pub fn natural_key(&self) -> NaturalKey {
        NaturalKey::new(self.nicename.clone(), self.name.clone())
    }
}

// ---------------------------------------------------------------------------
// Cache
// ---------------------------------------------------------------------------

/// Natural key → imported row, scoped to one run unless handed on.
#[derive(Debug, Clone, Default)]
pub struct AssociationCache {
    entries: HashMap<(AssociationKind, NaturalKey), ImportedRecord>,
}

impl AssociationCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, kind: AssociationKind, key: &NaturalKey) -> Option<&ImportedRecord> {
        self.entries.get(&(kind, key.clone()))
    }

    /// Record a resolved row. The first row cached for a key is kept.
    pub fn insert(&mut self, kind: AssociationKind, key: NaturalKey, record: ImportedRecord) {
        self.entries.entry((kind, key)).or_insert(record);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Split a node's references by kind, keeping their original order.
/// References with an unknown domain are dropped.
pub fn partition_references(
    references: &[NestedReference],
) -> HashMap<AssociationKind, Vec<&NestedReference>> {
    let mut partitioned: HashMap<AssociationKind, Vec<&NestedReference>> = HashMap::new();
    for reference in references {
        match reference.kind() {
            Some(kind) => partitioned.entry(kind).or_default().push(reference),
            None => tracing::debug!(domain = %reference.domain, "Ignoring reference domain"),
        }
    }
    partitioned
}

/// Resolve every reference of one kind to its imported row, in order.
///
/// A reference must match a standalone term node registered earlier in the
/// run. Cached rows are reused; otherwise the store is asked for a row left
/// by a previous run before a new one is created.
pub async fn resolve<S: RecordStore>(
    ctx: &mut RunContext,
    store: &S,
    defaults: &ImportDefaults,
    kind: AssociationKind,
    references: &[&NestedReference],
) -> Result<Vec<ImportedRecord>, CoreError> {
    let mut resolved = Vec::with_capacity(references.len());

    for reference in references {
        let key = reference.natural_key();
        if ctx.find_pooled(kind, &key).is_none() {
            return Err(CoreError::DanglingReference { kind, key });
        }

        if let Some(record) = ctx.cache().get(kind, &key) {
            resolved.push(record.clone());
            continue;
        }

        let record = match store.find_by_natural_key(kind.record_type(), &key).await? {
            Some(existing) => {
                tracing::debug!(kind = %kind, key = %key, id = existing.id, "Reusing stored term");
                existing
            }
            None => {
                let attributes = map_term(kind, &key, defaults);
                let created = store.create(kind.record_type(), &attributes).await?;
                tracing::debug!(kind = %kind, key = %key, id = created.id, "Created term");
                created
            }
        };

        ctx.cache_mut().insert(kind, key, record.clone());
        resolved.push(record);
    }

    Ok(resolved)
}

/// Point `author_id` at the creator's linked record when one exists.
///
/// Best effort: a missing user, a missing linked record or a lookup error
/// all leave the default author in place.
pub async fn resolve_author<D: IdentityDirectory>(
    directory: &D,
    node: &RawNode,
    attributes: &mut MappedAttributes,
) {
    let Some(login) = node.field("dc").filter(|l| !l.is_empty()) else {
        return;
    };

    let identity = match directory.find_user(login).await {
        Ok(Some(identity)) => identity,
        Ok(None) => {
            tracing::debug!(login, "No user for creator, keeping default author");
            return;
        }
        Err(e) => {
            tracing::warn!(login, error = %e, "User lookup failed, keeping default author");
            return;
        }
    };

    match directory.find_linked_record(&identity).await {
        Ok(Some(linked)) => attributes.insert(AUTHOR_ATTRIBUTE, linked.id),
        Ok(None) => tracing::debug!(login, "User has no linked record, keeping default author"),
        Err(e) => {
            tracing::warn!(login, error = %e, "Linked record lookup failed, keeping default author")
        }
    }
}

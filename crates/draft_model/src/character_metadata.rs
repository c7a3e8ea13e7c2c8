// Copyright (c) 2026 Element Creations Ltd
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

//! Per-character style and entity metadata.
//!
//! Every UTF-16 code unit of a block carries one [`CharacterMetadata`]. Values
//! are interned: two requests for the same `(entity, styles)` pair return the
//! same allocation, so pointer equality doubles as value equality when
//! runs of characters are compared.
//!
//! The pool only holds weak references. Entries whose metadata is no longer
//! used by any document are pruned as the pool grows.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError, Weak};

use once_cell::sync::Lazy;

/// An unordered set of inline style tags such as `"BOLD"` or `"ITALIC"`.
///
/// Stored sorted, which is also the canonical form used for interning.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StyleSet(BTreeSet<String>);

impl StyleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, style: &str) -> bool {
        self.0.contains(style)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// A copy of this set with `style` added.
    pub fn with(&self, style: &str) -> Self {
        let mut styles = self.0.clone();
        styles.insert(style.to_owned());
        Self(styles)
    }

    /// A copy of this set with `style` removed.
    pub fn without(&self, style: &str) -> Self {
        let mut styles = self.0.clone();
        styles.remove(style);
        Self(styles)
    }
}

impl<S: Into<String>> FromIterator<S> for StyleSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

#[derive(PartialEq, Eq, Hash)]
struct MetadataValue {
    style: StyleSet,
    entity: Option<String>,
}

type PoolKey = (Option<String>, StyleSet);

/// Smallest pool size at which dead entries are swept.
const MIN_PRUNE_THRESHOLD: usize = 1024;

struct MetadataPool {
    entries: HashMap<PoolKey, Weak<MetadataValue>>,
    prune_at: usize,
}

impl MetadataPool {
    fn intern(&mut self, style: StyleSet, entity: Option<String>) -> Arc<MetadataValue> {
        let key = (entity, style);
        if let Some(existing) = self.entries.get(&key).and_then(Weak::upgrade) {
            return existing;
        }

        if self.entries.len() >= self.prune_at {
            self.entries.retain(|_, value| value.strong_count() > 0);
            self.prune_at =
                (self.entries.len() * 2).max(MIN_PRUNE_THRESHOLD);
        }

        let (entity, style) = key.clone();
        let value = Arc::new(MetadataValue { style, entity });
        self.entries.insert(key, Arc::downgrade(&value));
        value
    }
}

static POOL: Lazy<Mutex<MetadataPool>> = Lazy::new(|| {
    Mutex::new(MetadataPool {
        entries: HashMap::new(),
        prune_at: MIN_PRUNE_THRESHOLD,
    })
});

static EMPTY: Lazy<CharacterMetadata> =
    Lazy::new(|| CharacterMetadata::intern(StyleSet::new(), None));

/// The interned `(entity, style)` pair attached to one character.
#[derive(Clone)]
pub struct CharacterMetadata(Arc<MetadataValue>);

impl CharacterMetadata {
    /// The metadata of an unstyled character without an entity.
    pub fn empty() -> Self {
        EMPTY.clone()
    }

    /// Fetch the interned metadata for `style` and `entity`.
    pub fn create(style: &StyleSet, entity: Option<&str>) -> Self {
        if style.is_empty() && entity.is_none() {
            return Self::empty();
        }
        Self::intern(style.clone(), entity.map(str::to_owned))
    }

    fn intern(style: StyleSet, entity: Option<String>) -> Self {
        let mut pool = POOL.lock().unwrap_or_else(PoisonError::into_inner);
        Self(pool.intern(style, entity))
    }

    pub fn style(&self) -> &StyleSet {
        &self.0.style
    }

    pub fn entity(&self) -> Option<&str> {
        self.0.entity.as_deref()
    }

    pub fn has_style(&self, style: &str) -> bool {
        self.0.style.contains(style)
    }

    /// Metadata with `style` added. Returns `self` if already present.
    pub fn apply_style(&self, style: &str) -> Self {
        if self.has_style(style) {
            return self.clone();
        }
        Self::create(&self.0.style.with(style), self.entity())
    }

    /// Metadata with `style` removed. Returns `self` if absent.
    pub fn remove_style(&self, style: &str) -> Self {
        if !self.has_style(style) {
            return self.clone();
        }
        Self::create(&self.0.style.without(style), self.entity())
    }

    /// Metadata with the entity replaced. Returns `self` if unchanged.
    pub fn apply_entity(&self, entity: Option<&str>) -> Self {
        if self.entity() == entity {
            return self.clone();
        }
        Self::create(&self.0.style, entity)
    }

    /// Whether both values share one allocation.
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }

    /// Whether both characters carry the same style set.
    pub(crate) fn same_style(a: &Self, b: &Self) -> bool {
        Self::ptr_eq(a, b) || a.0.style == b.0.style
    }

    /// Whether both characters reference the same entity.
    pub(crate) fn same_entity(a: &Self, b: &Self) -> bool {
        Self::ptr_eq(a, b) || a.0.entity == b.0.entity
    }
}

impl Default for CharacterMetadata {
    fn default() -> Self {
        Self::empty()
    }
}

impl PartialEq for CharacterMetadata {
    fn eq(&self, other: &Self) -> bool {
        Self::ptr_eq(self, other) || self.0 == other.0
    }
}

impl Eq for CharacterMetadata {}

impl fmt::Debug for CharacterMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CharacterMetadata")
            .field("style", &self.0.style)
            .field("entity", &self.0.entity)
            .finish()
    }
}

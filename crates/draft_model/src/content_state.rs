// Copyright (c) 2026 Element Creations Ltd
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

//! The immutable document snapshot.
//!
//! A [`ContentState`] bundles the ordered block map, the document's entity
//! table and the selections before and after the transaction that produced
//! it. It is a cheap handle: cloning shares the snapshot, and
//! [`ContentState::ptr_eq`] tells whether two handles are the same snapshot.

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::block_map::{BlockMap, BlockMapUpdates};
use crate::error::{Result, TransactionError};
use crate::keys::generate_random_key;
use crate::{
    BlockType, ContentBlock, DraftEntity, EntityData, EntityMap, Mutability,
    SelectionState,
};

static LINE_BREAK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\r\n?|\n").expect("line break pattern is a valid regex")
});

#[derive(Clone, Debug, PartialEq)]
struct ContentStateInner {
    block_map: BlockMap,
    entity_map: EntityMap,
    selection_before: SelectionState,
    selection_after: SelectionState,
}

#[derive(Clone, Debug)]
pub struct ContentState(Arc<ContentStateInner>);

impl ContentState {
    /// A document made of `blocks` in order, with both selections collapsed
    /// at the start of the first block.
    pub fn create_from_block_array<I>(
        blocks: I,
        entity_map: Option<EntityMap>,
    ) -> Self
    where
        I: IntoIterator<Item = ContentBlock>,
    {
        let block_map = BlockMap::from_blocks(blocks);
        let selection = block_map
            .first()
            .map(|block| SelectionState::create_empty(block.key()))
            .unwrap_or_default();
        Self::from_parts(
            block_map,
            entity_map.unwrap_or_default(),
            selection.clone(),
            selection,
        )
    }

    /// One unstyled block per line of `text`. `\r\n`, `\r` and `\n` all
    /// separate lines.
    pub fn create_from_text(text: &str) -> Self {
        Self::create_from_text_with_delimiter(text, &LINE_BREAK)
    }

    pub fn create_from_text_with_delimiter(text: &str, delimiter: &Regex) -> Self {
        let blocks = delimiter.split(text).map(|line| {
            let line = line.replace('\r', "");
            ContentBlock::new(generate_random_key(), BlockType::Unstyled, &line)
        });
        Self::create_from_block_array(blocks, None)
    }

    /// A document with a single empty unstyled block.
    pub fn create_empty() -> Self {
        Self::create_from_text("")
    }

    pub(crate) fn from_parts(
        block_map: BlockMap,
        entity_map: EntityMap,
        selection_before: SelectionState,
        selection_after: SelectionState,
    ) -> Self {
        let content = Self(Arc::new(ContentStateInner {
            block_map,
            entity_map,
            selection_before,
            selection_after,
        }));
        content.assert_invariants();
        content
    }

    fn map_inner<F>(&self, f: F) -> Self
    where
        F: FnOnce(&mut ContentStateInner),
    {
        let mut inner = (*self.0).clone();
        f(&mut inner);
        let content = Self(Arc::new(inner));
        content.assert_invariants();
        content
    }

    // ───────────────────────────────────────────────────────────────────
    // Queries
    // ───────────────────────────────────────────────────────────────────

    pub fn block_map(&self) -> &BlockMap {
        &self.0.block_map
    }

    pub fn entity_map(&self) -> &EntityMap {
        &self.0.entity_map
    }

    pub fn selection_before(&self) -> &SelectionState {
        &self.0.selection_before
    }

    pub fn selection_after(&self) -> &SelectionState {
        &self.0.selection_after
    }

    pub fn block_for_key(&self, key: &str) -> Option<&Arc<ContentBlock>> {
        self.0.block_map.get(key)
    }

    /// Like [`ContentState::block_for_key`], for keys that must exist.
    pub(crate) fn require_block(&self, key: &str) -> Result<&Arc<ContentBlock>> {
        self.block_for_key(key)
            .ok_or_else(|| TransactionError::BlockNotFound(key.to_owned()))
    }

    pub fn key_before(&self, key: &str) -> Option<&str> {
        self.0.block_map.key_before(key)
    }

    pub fn key_after(&self, key: &str) -> Option<&str> {
        self.0.block_map.key_after(key)
    }

    pub fn block_before(&self, key: &str) -> Option<&Arc<ContentBlock>> {
        self.key_before(key).and_then(|k| self.block_for_key(k))
    }

    pub fn block_after(&self, key: &str) -> Option<&Arc<ContentBlock>> {
        self.key_after(key).and_then(|k| self.block_for_key(k))
    }

    pub fn first_block(&self) -> Option<&Arc<ContentBlock>> {
        self.0.block_map.first()
    }

    pub fn last_block(&self) -> Option<&Arc<ContentBlock>> {
        self.0.block_map.last()
    }

    pub fn blocks(&self) -> impl DoubleEndedIterator<Item = &Arc<ContentBlock>> {
        self.0.block_map.blocks()
    }

    /// The text of every block joined by `delimiter` (default `"\n"`).
    pub fn plain_text(&self, delimiter: Option<&str>) -> String {
        self.blocks()
            .map(|block| block.text_string())
            .collect::<Vec<_>>()
            .join(delimiter.unwrap_or("\n"))
    }

    /// Whether the document contains anything but one empty block.
    pub fn has_text(&self) -> bool {
        self.0.block_map.len() > 1
            || self.first_block().is_some_and(|block| !block.is_empty())
    }

    // ───────────────────────────────────────────────────────────────────
    // Entities
    // ───────────────────────────────────────────────────────────────────

    /// Register a new entity. Returns the new snapshot and the entity key.
    pub fn create_entity(
        &self,
        entity_type: impl Into<String>,
        mutability: Mutability,
        data: EntityData,
    ) -> (Self, String) {
        self.add_entity(DraftEntity::new(entity_type, mutability, data))
    }

    pub fn add_entity(&self, entity: DraftEntity) -> (Self, String) {
        let mut entity_map = self.0.entity_map.clone();
        let key = entity_map.add(entity);
        (self.with_entity_map(entity_map), key)
    }

    pub fn entity(&self, key: &str) -> Result<&DraftEntity> {
        self.0.entity_map.lookup(key)
    }

    pub fn merge_entity_data(&self, key: &str, data: EntityData) -> Result<Self> {
        let mut entity_map = self.0.entity_map.clone();
        entity_map.merge_data(key, data)?;
        Ok(self.with_entity_map(entity_map))
    }

    pub fn replace_entity_data(
        &self,
        key: &str,
        data: EntityData,
    ) -> Result<Self> {
        let mut entity_map = self.0.entity_map.clone();
        entity_map.replace_data(key, data)?;
        Ok(self.with_entity_map(entity_map))
    }

    pub fn last_created_entity_key(&self) -> Option<String> {
        self.0.entity_map.last_created_key()
    }

    // ───────────────────────────────────────────────────────────────────
    // Builders
    // ───────────────────────────────────────────────────────────────────

    // Setting a field to its current value returns the same snapshot.

    pub fn with_block_map(&self, block_map: BlockMap) -> Self {
        if BlockMap::ptr_eq(&self.0.block_map, &block_map) {
            return self.clone();
        }
        self.map_inner(|inner| inner.block_map = block_map)
    }

    pub fn with_entity_map(&self, entity_map: EntityMap) -> Self {
        self.map_inner(|inner| inner.entity_map = entity_map)
    }

    pub fn with_selection_before(&self, selection: SelectionState) -> Self {
        if self.0.selection_before == selection {
            return self.clone();
        }
        self.map_inner(|inner| inner.selection_before = selection)
    }

    pub fn with_selection_after(&self, selection: SelectionState) -> Self {
        if self.0.selection_after == selection {
            return self.clone();
        }
        self.map_inner(|inner| inner.selection_after = selection)
    }

    /// Merge `updates` into the block map and set both selections.
    pub(crate) fn with_updates(
        &self,
        updates: BlockMapUpdates,
        selection_before: SelectionState,
        selection_after: SelectionState,
    ) -> Self {
        let block_map = self.0.block_map.merge(updates);
        if BlockMap::ptr_eq(&self.0.block_map, &block_map) {
            return self.with_selections(selection_before, selection_after);
        }
        // One step, so that no intermediate snapshot points at removed blocks
        self.map_inner(|inner| {
            inner.block_map = block_map;
            inner.selection_before = selection_before;
            inner.selection_after = selection_after;
        })
    }

    pub(crate) fn with_selections(
        &self,
        selection_before: SelectionState,
        selection_after: SelectionState,
    ) -> Self {
        if self.0.selection_before == selection_before
            && self.0.selection_after == selection_after
        {
            return self.clone();
        }
        self.map_inner(|inner| {
            inner.selection_before = selection_before;
            inner.selection_after = selection_after;
        })
    }

    /// Whether both handles refer to the same snapshot.
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }

    // ───────────────────────────────────────────────────────────────────
    // Invariants
    // ───────────────────────────────────────────────────────────────────

    /// Check structural invariants when the `assert-invariants` feature is
    /// enabled. Does nothing otherwise.
    pub fn assert_invariants(&self) {
        cfg_if::cfg_if! {
            if #[cfg(feature = "assert-invariants")] {
                self.explicitly_assert_invariants();
            }
        }
    }

    /// Panic if any block's character list is out of step with its text, or
    /// if a selection refers to a block that does not exist.
    pub fn explicitly_assert_invariants(&self) {
        for block in self.blocks() {
            assert_eq!(
                block.characters().len(),
                block.len(),
                "block {} has {} characters for {} code units",
                block.key(),
                block.characters().len(),
                block.len(),
            );
        }
        if self.0.block_map.is_empty() {
            return;
        }
        for selection in [&self.0.selection_before, &self.0.selection_after] {
            for key in [selection.anchor_key(), selection.focus_key()] {
                assert!(
                    self.0.block_map.contains_key(key),
                    "selection refers to missing block {key}"
                );
            }
        }
    }
}

impl PartialEq for ContentState {
    fn eq(&self, other: &Self) -> bool {
        Self::ptr_eq(self, other) || self.0 == other.0
    }
}

impl Default for ContentState {
    fn default() -> Self {
        Self::create_empty()
    }
}

// Copyright (c) 2026 Element Creations Ltd
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

//! The ordered map of blocks that makes up a document.
//!
//! Both the map and each block are reference counted. A transaction that
//! leaves a block untouched keeps its allocation, and a transaction that
//! changes nothing keeps the map's allocation, so renderers can use
//! [`BlockMap::ptr_eq`] and [`Arc::ptr_eq`] as cheap "did this change?"
//! checks.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::error::{Result, TransactionError};
use crate::ContentBlock;

/// A patch for [`merge_map_updates`]: `None` removes the key.
pub type BlockMapUpdates = IndexMap<String, Option<Arc<ContentBlock>>>;

#[derive(Clone, Debug, Default)]
pub struct BlockMap(Arc<IndexMap<String, Arc<ContentBlock>>>);

impl BlockMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a map from blocks in reading order. Later duplicates of a key
    /// replace earlier ones.
    pub fn from_blocks<I, B>(blocks: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: Into<Arc<ContentBlock>>,
    {
        Self(Arc::new(
            blocks
                .into_iter()
                .map(|block| {
                    let block = block.into();
                    (block.key().to_owned(), block)
                })
                .collect(),
        ))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Arc<ContentBlock>> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn index_of(&self, key: &str) -> Option<usize> {
        self.0.get_index_of(key)
    }

    pub fn keys(&self) -> impl DoubleEndedIterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn blocks(&self) -> impl DoubleEndedIterator<Item = &Arc<ContentBlock>> {
        self.0.values()
    }

    pub fn first(&self) -> Option<&Arc<ContentBlock>> {
        self.0.first().map(|(_, block)| block)
    }

    pub fn last(&self) -> Option<&Arc<ContentBlock>> {
        self.0.last().map(|(_, block)| block)
    }

    pub fn key_before(&self, key: &str) -> Option<&str> {
        let index = self.index_of(key)?;
        let before = index.checked_sub(1)?;
        self.0.get_index(before).map(|(k, _)| k.as_str())
    }

    pub fn key_after(&self, key: &str) -> Option<&str> {
        let index = self.index_of(key)?;
        self.0.get_index(index + 1).map(|(k, _)| k.as_str())
    }

    /// Blocks from `start_key` through `end_key` inclusive, in order.
    ///
    /// If `end_key` precedes `start_key` only the start block is returned.
    pub fn range(
        &self,
        start_key: &str,
        end_key: &str,
    ) -> Result<Vec<&Arc<ContentBlock>>> {
        let start = self.require_index(start_key)?;
        let end = self.require_index(end_key)?.max(start);
        Ok(self.0.values().skip(start).take(end - start + 1).collect())
    }

    /// Replace the blocks from `start_key` through `end_key` with `blocks`,
    /// keeping everything outside the range in place.
    pub(crate) fn replace_range<I>(
        &self,
        start_key: &str,
        end_key: &str,
        blocks: I,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = Arc<ContentBlock>>,
    {
        let start = self.require_index(start_key)?;
        let end = self.require_index(end_key)?.max(start);
        let entry = |(key, block): (&String, &Arc<ContentBlock>)| {
            (key.clone(), block.clone())
        };
        let next = self
            .0
            .iter()
            .take(start)
            .map(entry)
            .chain(
                blocks
                    .into_iter()
                    .map(|block| (block.key().to_owned(), block)),
            )
            .chain(self.0.iter().skip(end + 1).map(entry))
            .collect();
        Ok(Self(Arc::new(next)))
    }

    fn require_index(&self, key: &str) -> Result<usize> {
        self.index_of(key)
            .ok_or_else(|| TransactionError::BlockNotFound(key.to_owned()))
    }

    /// Whether both maps share one allocation.
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }

    pub fn merge(&self, updates: BlockMapUpdates) -> Self {
        merge_map_updates(self, updates)
    }
}

impl PartialEq for BlockMap {
    fn eq(&self, other: &Self) -> bool {
        Self::ptr_eq(self, other)
            || (self.len() == other.len()
                && self.0.iter().zip(other.0.iter()).all(
                    |((ka, a), (kb, b))| {
                        ka == kb && (Arc::ptr_eq(a, b) || a == b)
                    },
                ))
    }
}

impl FromIterator<ContentBlock> for BlockMap {
    fn from_iter<I: IntoIterator<Item = ContentBlock>>(iter: I) -> Self {
        Self::from_blocks(iter)
    }
}

/// Apply `updates` to `map`.
///
/// - keys mapped to `None` are removed;
/// - keys mapped to the block already stored (same allocation) are kept;
/// - keys mapped to another block are replaced in place;
/// - keys only present in `updates` are appended in patch order.
///
/// When no update changes anything the original map is returned, sharing
/// its allocation.
pub fn merge_map_updates(map: &BlockMap, updates: BlockMapUpdates) -> BlockMap {
    let changed = updates.iter().any(|(key, update)| {
        match (map.get(key), update) {
            (Some(existing), Some(block)) => !Arc::ptr_eq(existing, block),
            (None, None) => false,
            _ => true,
        }
    });
    if !changed {
        return map.clone();
    }

    let mut next = (*map.0).clone();
    for (key, update) in updates {
        match update {
            Some(block) => {
                next.insert(key, block);
            }
            None => {
                next.shift_remove(&key);
            }
        }
    }
    BlockMap(Arc::new(next))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::{merge_map_updates, BlockMap, BlockMapUpdates};
    use crate::{BlockType, ContentBlock};

    fn block(key: &str, text: &str) -> ContentBlock {
        ContentBlock::new(key, BlockType::Unstyled, text)
    }

    fn sample() -> BlockMap {
        BlockMap::from_blocks([
            block("a", "one"),
            block("b", "two"),
            block("c", "three"),
        ])
    }

    fn keys(map: &BlockMap) -> Vec<&str> {
        map.keys().collect()
    }

    #[test]
    fn empty_patch_returns_the_same_map() {
        let map = sample();
        let merged = merge_map_updates(&map, BlockMapUpdates::new());
        assert!(BlockMap::ptr_eq(&map, &merged));
    }

    #[test]
    fn identical_values_return_the_same_map() {
        let map = sample();
        let mut updates = BlockMapUpdates::new();
        updates.insert("b".into(), Some(map.get("b").unwrap().clone()));
        updates.insert("zzz".into(), None);
        let merged = map.merge(updates);
        assert!(BlockMap::ptr_eq(&map, &merged));
    }

    #[test]
    fn replaced_values_keep_position_and_share_untouched_blocks() {
        let map = sample();
        let mut updates = BlockMapUpdates::new();
        updates.insert("b".into(), Some(Arc::new(block("b", "TWO"))));
        let merged = map.merge(updates);

        assert!(!BlockMap::ptr_eq(&map, &merged));
        assert_eq!(keys(&merged), vec!["a", "b", "c"]);
        assert_eq!(merged.get("b").unwrap().text_string(), "TWO");
        assert!(Arc::ptr_eq(map.get("a").unwrap(), merged.get("a").unwrap()));
        assert!(Arc::ptr_eq(map.get("c").unwrap(), merged.get("c").unwrap()));
    }

    #[test]
    fn removals_and_appends() {
        let map = sample();
        let mut updates = BlockMapUpdates::new();
        updates.insert("a".into(), None);
        updates.insert("d".into(), Some(Arc::new(block("d", "four"))));
        let merged = map.merge(updates);
        assert_eq!(keys(&merged), vec!["b", "c", "d"]);
        assert_eq!(keys(&map), vec!["a", "b", "c"]);
    }

    #[test]
    fn neighbours() {
        let map = sample();
        assert_eq!(map.key_before("a"), None);
        assert_eq!(map.key_before("b"), Some("a"));
        assert_eq!(map.key_after("b"), Some("c"));
        assert_eq!(map.key_after("c"), None);
        assert_eq!(map.key_after("missing"), None);
    }

    #[test]
    fn range_is_inclusive() {
        let map = sample();
        let range: Vec<&str> =
            map.range("a", "b").unwrap().iter().map(|b| b.key()).collect();
        assert_eq!(range, vec!["a", "b"]);
        assert_eq!(map.range("c", "c").unwrap().len(), 1);
        assert!(map.range("a", "nope").is_err());
    }

    #[test]
    fn replace_range_splices_in_place() {
        let map = sample();
        let replaced = map
            .replace_range(
                "a",
                "b",
                [Arc::new(block("x", "")), Arc::new(block("y", ""))],
            )
            .unwrap();
        assert_eq!(keys(&replaced), vec!["x", "y", "c"]);
        assert!(Arc::ptr_eq(map.get("c").unwrap(), replaced.get("c").unwrap()));
    }

    #[test]
    fn value_equality_ignores_allocation() {
        assert_eq!(sample(), sample());
        assert_ne!(sample(), BlockMap::from_blocks([block("a", "one")]));
    }
}

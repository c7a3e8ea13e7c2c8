// Copyright (c) 2026 Element Creations Ltd
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

//! Copying a selection out of a document and pasting it back in.

use std::collections::HashSet;
use std::sync::Arc;

use super::{remove_entities_at_edges, require_collapsed};
use crate::block_map::BlockMap;
use crate::error::{Result, TransactionError};
use crate::keys::generate_key_where;
use crate::{BlockData, BlockType, ContentBlock, ContentState, SelectionState};

/// What happens to the target block's data when a single fragment block is
/// pasted into it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MergeBlockData {
    /// The fragment's data replaces the target's.
    #[default]
    ReplaceWithNewData,
    /// The fragment's data is the base and the target's keys win.
    MergeOldDataToNewData,
}

/// A copy of `fragment` in which every block has a fresh key.
pub fn randomize_block_map_keys(fragment: &BlockMap) -> BlockMap {
    let mut fresh: HashSet<String> = HashSet::with_capacity(fragment.len());
    fragment
        .blocks()
        .map(|block| {
            let key = generate_key_where(|key| {
                !fragment.contains_key(key) && !fresh.contains(key)
            });
            fresh.insert(key.clone());
            block.with_key(key)
        })
        .collect()
}

/// The selected blocks, trimmed to the selection and re-keyed.
///
/// Immutable and segmented entities cut by the selection edges are not
/// carried into the fragment.
pub fn get_content_state_fragment(
    content: &ContentState,
    selection: &SelectionState,
) -> Result<BlockMap> {
    let start_key = selection.start_key();
    let start_offset = selection.start_offset();
    let end_key = selection.end_key();
    let end_offset = selection.end_offset();

    let without_edge_entities = remove_entities_at_edges(content, selection)?;
    let trimmed: BlockMap = without_edge_entities
        .block_map()
        .range(start_key, end_key)?
        .into_iter()
        .map(|block| {
            let (start, end) = match (block.key(), start_key == end_key) {
                (_, true) => (start_offset, end_offset),
                (key, false) if key == start_key => (start_offset, block.len()),
                (key, false) if key == end_key => (0, end_offset),
                _ => return (**block).clone(),
            };
            let (units, characters) = block.slice(start, end);
            block.with_content(units.to_vec(), characters.to_vec())
        })
        .collect();
    Ok(randomize_block_map_keys(&trimmed))
}

/// Paste `fragment` at the collapsed `selection`.
///
/// A single-block fragment is spliced into the target block. A longer
/// fragment splits the target: its head absorbs the first fragment block,
/// the middle blocks are inserted as they are, and the last fragment block
/// absorbs the target's tail. The cursor ends up after the pasted text.
pub fn insert_fragment_into_content_state(
    content: &ContentState,
    selection: &SelectionState,
    fragment: &BlockMap,
    merge_block_data: MergeBlockData,
) -> Result<ContentState> {
    require_collapsed(selection, "insert_fragment_into_content_state")?;
    let fragment = randomize_block_map_keys(fragment);
    let (Some(first), Some(last)) = (fragment.first(), fragment.last()) else {
        return Err(TransactionError::EmptyFragment);
    };

    let target_key = selection.start_key();
    let target_offset = selection.start_offset();
    let target = content.require_block(target_key)?;

    if fragment.len() == 1 {
        let data = match merge_block_data {
            MergeBlockData::ReplaceWithNewData => first.data().clone(),
            MergeBlockData::MergeOldDataToNewData => {
                overlay(first.data(), target.data())
            }
        };
        let mut block_type = target.block_type().clone();
        if !target.is_empty() && block_type == BlockType::Unstyled {
            block_type = first.block_type().clone();
        }
        let updated = target
            .splice(
                target_offset,
                target_offset,
                first.text().as_slice(),
                first.characters(),
            )
            .with_type(block_type)
            .with_data(data);

        let block_map = content.block_map().replace_range(
            target_key,
            target_key,
            [Arc::new(updated)],
        )?;
        let final_offset = target_offset + first.len();
        return Ok(content.with_block_map(block_map).with_selections(
            selection.clone(),
            selection.collapsed_at(target_key, final_offset),
        ));
    }

    let (head_units, head_chars) = target.slice(0, target_offset);
    let head_type = if head_units.is_empty() {
        first.block_type().clone()
    } else {
        target.block_type().clone()
    };
    let head = target
        .with_content(
            [head_units, first.text().as_slice()].concat(),
            [head_chars, first.characters()].concat(),
        )
        .with_type(head_type)
        .with_data(first.data().clone());

    let (tail_units, tail_chars) = target.slice(target_offset, target.len());
    let final_key = generate_key_where(|key| {
        !content.block_map().contains_key(key) && !fragment.contains_key(key)
    });
    let tail = last
        .with_content(
            [last.text().as_slice(), tail_units].concat(),
            [last.characters(), tail_chars].concat(),
        )
        .with_key(final_key.clone());

    let middle_count = fragment.len() - 2;
    let blocks = std::iter::once(Arc::new(head))
        .chain(fragment.blocks().skip(1).take(middle_count).cloned())
        .chain(std::iter::once(Arc::new(tail)));
    let block_map =
        content.block_map().replace_range(target_key, target_key, blocks)?;

    Ok(content.with_block_map(block_map).with_selections(
        selection.clone(),
        selection.collapsed_at(&final_key, last.len()),
    ))
}

/// Merge `data` over `base`, keys of `data` winning.
fn overlay(base: &BlockData, data: &BlockData) -> BlockData {
    let mut merged = base.clone();
    merged.extend(data.clone());
    merged
}

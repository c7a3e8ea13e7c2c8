// Copyright (c) 2026 Element Creations Ltd
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

//! Document transactions.
//!
//! Each function maps a [`ContentState`] and a selection to a new
//! [`ContentState`]. Blocks that a transaction does not touch are shared
//! with the input, and a transaction that changes nothing returns the input
//! snapshot itself. Every function records the selection it was given and
//! where the cursor should go next in `selection_before`/`selection_after`.

mod apply_entity;
mod character_removal_range;
mod fragment;
pub mod inline_style;
mod insert_text;
mod modify_block;
mod remove_entities_at_edges;
mod remove_range;
mod split_block;

use std::sync::Arc;

pub use apply_entity::{
    apply_entity_to_content_block, apply_entity_to_content_state,
};
pub use character_removal_range::{
    get_character_removal_range, get_entity_removal_range, RemovalDirection,
};
pub use fragment::{
    get_content_state_fragment, insert_fragment_into_content_state,
    randomize_block_map_keys, MergeBlockData,
};
pub use insert_text::insert_text_into_content_state;
pub use modify_block::{
    adjust_block_depth_for_content_state, modify_block_for_content_state,
};
pub use remove_entities_at_edges::remove_entities_at_edges;
pub use remove_range::remove_range_from_content_state;
pub use split_block::split_block_in_content_state;

use crate::block_map::BlockMapUpdates;
use crate::character_metadata::CharacterMetadata;
use crate::error::{Result, TransactionError};
use crate::{ContentBlock, ContentState, SelectionState};

pub(crate) fn require_collapsed(
    selection: &SelectionState,
    operation: &'static str,
) -> Result<()> {
    if selection.is_collapsed() {
        Ok(())
    } else {
        Err(TransactionError::SelectionNotCollapsed { operation })
    }
}

/// The blocks from the selection's start block through its end block.
fn selected_blocks<'a>(
    content: &'a ContentState,
    selection: &SelectionState,
) -> Result<Vec<&'a Arc<ContentBlock>>> {
    content
        .block_map()
        .range(selection.start_key(), selection.end_key())
}

/// The part of `block` covered by `selection`, as a `[start, end)` range.
fn selected_span(
    block: &ContentBlock,
    selection: &SelectionState,
) -> (usize, usize) {
    let start = if block.key() == selection.start_key() {
        selection.start_offset()
    } else {
        0
    };
    let end = if block.key() == selection.end_key() {
        selection.end_offset()
    } else {
        block.len()
    };
    (start, end)
}

/// Apply `op` to every selected character. Both selections of the result
/// are set to `selection`.
fn map_selected_characters<F>(
    content: &ContentState,
    selection: &SelectionState,
    mut op: F,
) -> Result<ContentState>
where
    F: FnMut(&CharacterMetadata) -> CharacterMetadata,
{
    let mut updates = BlockMapUpdates::new();
    for block in selected_blocks(content, selection)? {
        let (start, end) = selected_span(block, selection);
        if let Some(updated) = block.map_characters(start, end, &mut op) {
            updates.insert(block.key().to_owned(), Some(Arc::new(updated)));
        }
    }
    Ok(content.with_updates(updates, selection.clone(), selection.clone()))
}

// Copyright (c) 2026 Element Creations Ltd
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use std::sync::Arc;

use super::selected_blocks;
use crate::block_map::BlockMapUpdates;
use crate::error::Result;
use crate::{ContentState, SelectionState};

/// Delete the selected text.
///
/// Across blocks, the start block keeps its key, type, depth and data and
/// absorbs whatever follows the selection in the end block; every block
/// after the start block up to and including the end block is dropped.
/// A collapsed selection returns `content` unchanged.
pub fn remove_range_from_content_state(
    content: &ContentState,
    selection: &SelectionState,
) -> Result<ContentState> {
    if selection.is_collapsed() {
        return Ok(content.clone());
    }

    let start_key = selection.start_key();
    let start_offset = selection.start_offset();
    let end_offset = selection.end_offset();
    let blocks = selected_blocks(content, selection)?;
    let (Some(start_block), Some(end_block)) = (blocks.first(), blocks.last())
    else {
        return Ok(content.clone());
    };

    let (head_units, head_chars) = start_block.slice(0, start_offset);
    let (tail_units, tail_chars) = end_block.slice(end_offset, end_block.len());
    let merged = start_block.with_content(
        [head_units, tail_units].concat(),
        [head_chars, tail_chars].concat(),
    );

    let mut updates = BlockMapUpdates::new();
    updates.insert(start_key.to_owned(), Some(Arc::new(merged)));
    for block in blocks.iter().skip(1) {
        updates.insert(block.key().to_owned(), None);
    }

    Ok(content.with_updates(
        updates,
        selection.clone(),
        selection.collapsed_at(start_key, start_offset),
    ))
}

// Copyright (c) 2026 Element Creations Ltd
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use super::map_selected_characters;
use crate::error::Result;
use crate::{ContentBlock, ContentState, SelectionState};

/// Set the entity of `[start, end)` of `block`. `None` clears it.
///
/// Returns `None` when every character already had that entity.
pub fn apply_entity_to_content_block(
    block: &ContentBlock,
    start: usize,
    end: usize,
    entity_key: Option<&str>,
) -> Option<ContentBlock> {
    block.map_characters(start, end, |c| c.apply_entity(entity_key))
}

/// Set the entity of every selected character. `None` clears it.
pub fn apply_entity_to_content_state(
    content: &ContentState,
    selection: &SelectionState,
    entity_key: Option<&str>,
) -> Result<ContentState> {
    map_selected_characters(content, selection, |c| c.apply_entity(entity_key))
}

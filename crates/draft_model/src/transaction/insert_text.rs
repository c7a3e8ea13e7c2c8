// Copyright (c) 2026 Element Creations Ltd
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use std::sync::Arc;

use super::require_collapsed;
use crate::block_map::BlockMapUpdates;
use crate::character_metadata::CharacterMetadata;
use crate::error::Result;
use crate::{ContentState, SelectionState};

/// Insert `text` at the collapsed `selection`, every new character carrying
/// `metadata`.
///
/// Only `selection_after` is updated; it collapses after the new text.
pub fn insert_text_into_content_state(
    content: &ContentState,
    selection: &SelectionState,
    text: &str,
    metadata: &CharacterMetadata,
) -> Result<ContentState> {
    require_collapsed(selection, "insert_text_into_content_state")?;

    let units: Vec<u16> = text.encode_utf16().collect();
    if units.is_empty() {
        return Ok(content.clone());
    }

    let key = selection.start_key();
    let offset = selection.start_offset();
    let block = content.require_block(key)?;
    let characters = vec![metadata.clone(); units.len()];
    let updated = block.splice(offset, offset, &units, &characters);

    let mut updates = BlockMapUpdates::new();
    updates.insert(key.to_owned(), Some(Arc::new(updated)));
    let new_offset = offset + units.len();
    Ok(content.with_updates(
        updates,
        content.selection_before().clone(),
        selection.with_offsets(new_offset, new_offset),
    ))
}

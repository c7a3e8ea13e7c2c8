// Copyright (c) 2026 Element Creations Ltd
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use std::sync::Arc;

use crate::block_map::BlockMapUpdates;
use crate::character_metadata::CharacterMetadata;
use crate::error::{Result, TransactionError};
use crate::{ContentBlock, ContentState, EntityMap, Mutability, SelectionState};

/// Detach immutable and segmented entities that straddle either edge of
/// `selection`.
///
/// An entity straddles an offset when the characters on both sides of it
/// belong to it. Such an entity cannot be partially kept, so the whole run
/// loses its entity (the text itself stays). Sets `selection_after` to
/// `selection`.
pub fn remove_entities_at_edges(
    content: &ContentState,
    selection: &SelectionState,
) -> Result<ContentState> {
    let entity_map = content.entity_map();
    let mut updates = BlockMapUpdates::new();

    let start_key = selection.start_key();
    let start_block = content.require_block(start_key)?;
    let updated_start =
        remove_for_block(entity_map, start_block, selection.start_offset())?;

    let end_key = selection.end_key();
    let end_block = if start_key == end_key {
        updated_start.clone()
    } else {
        content.require_block(end_key)?.clone()
    };
    let updated_end =
        remove_for_block(entity_map, &end_block, selection.end_offset())?;

    if !Arc::ptr_eq(&updated_start, start_block) {
        updates.insert(start_key.to_owned(), Some(updated_start));
    }
    if !Arc::ptr_eq(&updated_end, &end_block) || updates.contains_key(end_key)
    {
        updates.insert(end_key.to_owned(), Some(updated_end));
    }

    Ok(content
        .with_block_map(content.block_map().merge(updates))
        .with_selection_after(selection.clone()))
}

/// The contiguous run of `entity_key` that contains `offset`.
pub(crate) fn removal_range(
    characters: &[CharacterMetadata],
    entity_key: &str,
    offset: usize,
) -> Result<(usize, usize)> {
    let mut range = None;
    crate::find_ranges::find_ranges(
        characters,
        CharacterMetadata::same_entity,
        |character| character.entity() == Some(entity_key),
        |start, end| {
            if start <= offset && offset <= end {
                range = Some((start, end));
            }
        },
    );
    range.ok_or_else(|| {
        TransactionError::EntityRangeMismatch(entity_key.to_owned())
    })
}

fn remove_for_block(
    entity_map: &EntityMap,
    block: &Arc<ContentBlock>,
    offset: usize,
) -> Result<Arc<ContentBlock>> {
    let before = offset.checked_sub(1).and_then(|i| block.entity_at(i));
    let after = block.entity_at(offset);

    let Some(entity_key) = after.filter(|after| Some(*after) == before) else {
        return Ok(block.clone());
    };
    if entity_map.lookup(entity_key)?.mutability() == Mutability::Mutable {
        return Ok(block.clone());
    }

    let (start, end) = removal_range(block.characters(), entity_key, offset)?;
    Ok(block
        .map_characters(start, end, |c| c.apply_entity(None))
        .map_or_else(|| block.clone(), Arc::new))
}

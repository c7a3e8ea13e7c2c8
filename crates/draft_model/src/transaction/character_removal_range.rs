// Copyright (c) 2026 Element Creations Ltd
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

//! Widening a removal so that it respects entity mutability.
//!
//! Deleting part of an immutable entity deletes all of it. Deleting part of
//! a segmented entity deletes whole space-separated words, taking one
//! neighbouring space with them so that no double space is left behind.

use strum_macros::{AsRefStr, Display, EnumString};

use crate::error::{Result, TransactionError};
use crate::{ContentBlock, EntityMap, Mutability, SelectionState};

const SPACE: u16 = b' ' as u16;

/// The direction a deletion is travelling in.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, AsRefStr, Display, EnumString,
)]
#[strum(serialize_all = "lowercase")]
pub enum RemovalDirection {
    Forward,
    #[default]
    Backward,
}

/// Adjust `selection` so that removing it leaves every entity it touches in
/// a consistent state.
///
/// Mutable entities are left alone. The returned selection is forward.
pub fn get_character_removal_range(
    entity_map: &EntityMap,
    start_block: &ContentBlock,
    end_block: &ContentBlock,
    selection: &SelectionState,
    direction: RemovalDirection,
) -> Result<SelectionState> {
    let start = selection.start_offset();
    let end = selection.end_offset();
    let start_entity = start_block.entity_at(start);
    let end_entity = end
        .checked_sub(1)
        .and_then(|last| end_block.entity_at(last));

    match (start_entity, end_entity) {
        (None, None) => Ok(selection.clone()),
        (Some(start_key), Some(end_key)) if start_key == end_key => {
            get_entity_removal_range(
                entity_map,
                start_block,
                selection,
                direction,
                start_key,
                true,
                true,
            )
        }
        (Some(start_key), Some(end_key)) => {
            let from_start = get_entity_removal_range(
                entity_map,
                start_block,
                selection,
                direction,
                start_key,
                false,
                true,
            )?;
            let from_end = get_entity_removal_range(
                entity_map, end_block, selection, direction, end_key, false,
                false,
            )?;
            Ok(selection.to_forward().with_offsets(
                from_start.start_offset(),
                from_end.end_offset(),
            ))
        }
        (Some(start_key), None) => {
            let from_start = get_entity_removal_range(
                entity_map,
                start_block,
                selection,
                direction,
                start_key,
                false,
                true,
            )?;
            let forward = selection.to_forward();
            let focus = forward.focus_offset();
            Ok(forward.with_offsets(from_start.start_offset(), focus))
        }
        (None, Some(end_key)) => {
            let from_end = get_entity_removal_range(
                entity_map, end_block, selection, direction, end_key, false,
                false,
            )?;
            let forward = selection.to_forward();
            let anchor = forward.anchor_offset();
            Ok(forward.with_offsets(anchor, from_end.end_offset()))
        }
    }
}

/// The removal range for one entity of `block`.
///
/// `entity_at_start` tells whether the entity sits at the selection start
/// (otherwise at its end); `entire_selection_within_entity` whether the
/// selection lies inside that single entity.
pub fn get_entity_removal_range(
    entity_map: &EntityMap,
    block: &ContentBlock,
    selection: &SelectionState,
    direction: RemovalDirection,
    entity_key: &str,
    entire_selection_within_entity: bool,
    entity_at_start: bool,
) -> Result<SelectionState> {
    let mut start = selection.start_offset();
    let mut end = selection.end_offset();
    let mutability = entity_map.lookup(entity_key)?.mutability();
    if mutability == Mutability::Mutable {
        return Ok(selection.to_forward());
    }

    let side = if entity_at_start { start } else { end };
    let mut ranges = Vec::new();
    block.find_entity_ranges(
        |c| c.entity() == Some(entity_key),
        |range_start, range_end| {
            if range_start <= side && side <= range_end {
                ranges.push((range_start, range_end));
            }
        },
    );
    let &[(entity_start, entity_end)] = ranges.as_slice() else {
        return Err(TransactionError::EntityRangeMismatch(
            entity_key.to_owned(),
        ));
    };

    if mutability == Mutability::Immutable {
        return Ok(selection
            .to_forward()
            .with_offsets(entity_start, entity_end));
    }

    if !entire_selection_within_entity {
        if entity_at_start {
            end = entity_end;
        } else {
            start = entity_start;
        }
    }
    let text = &block.text().as_slice()[entity_start..entity_end];
    let (removal_start, removal_end) =
        segment_removal_range(start, end, text, entity_start, direction);
    Ok(selection
        .to_forward()
        .with_offsets(removal_start, removal_end))
}

/// The run of whole segments of `text` (which starts at `entity_start`)
/// that overlaps `[selection_start, selection_end)`.
fn segment_removal_range(
    selection_start: usize,
    selection_end: usize,
    text: &[u16],
    entity_start: usize,
    direction: RemovalDirection,
) -> (usize, usize) {
    let pieces: Vec<&[u16]> = text.split(|unit| *unit == SPACE).collect();
    let last = pieces.len() - 1;
    // Each segment owns one of its neighbouring spaces.
    let lengths = pieces.iter().enumerate().map(|(index, piece)| {
        let owns_space = match direction {
            RemovalDirection::Forward => index > 0,
            RemovalDirection::Backward => index < last,
        };
        piece.len() + usize::from(owns_space)
    });

    let mut removal: Option<(usize, usize)> = None;
    let mut segment_start = entity_start;
    for length in lengths {
        let segment_end = segment_start + length;
        if selection_start < segment_end && segment_start < selection_end {
            removal = Some(match removal {
                Some((start, _)) => (start, segment_end),
                None => (segment_start, segment_end),
            });
        } else if removal.is_some() {
            break;
        }
        segment_start = segment_end;
    }

    let Some((mut removal_start, mut removal_end)) = removal else {
        return (selection_start, selection_end);
    };

    let entity_end = entity_start + text.len();
    let at_start = removal_start == entity_start;
    let at_end = removal_end == entity_end;
    if at_start != at_end {
        match direction {
            RemovalDirection::Forward if removal_end != entity_end => {
                removal_end += 1;
            }
            RemovalDirection::Backward if removal_start != entity_start => {
                removal_start -= 1;
            }
            _ => {}
        }
    }
    (removal_start, removal_end)
}

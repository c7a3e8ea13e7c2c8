// Copyright (c) 2026 Element Creations Ltd
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

//! Plain-text key commands: typing, backspace and delete.
//!
//! A collapsed selection is first widened by a "strategy" (one grapheme
//! cluster, or one word) in the direction of the key, and the resulting
//! range is removed with [`modifier::remove_range`], so immutable and
//! segmented entities are handled the same way as for a selected range.

use unicode_segmentation::UnicodeSegmentation;

use crate::editor_state::{ChangeType, EditorState};
use crate::error::Result;
use crate::{
    modifier, ContentBlock, ContentState, Mutability, RemovalDirection,
    SelectionState,
};

/// Remove the selection, or the grapheme cluster before the cursor.
pub fn backspace(state: &EditorState) -> Result<EditorState> {
    remove_character(state, RemovalDirection::Backward)
}

/// Remove the selection, or the grapheme cluster after the cursor.
pub fn delete(state: &EditorState) -> Result<EditorState> {
    remove_character(state, RemovalDirection::Forward)
}

/// Remove the selection, or the word before the cursor together with the
/// whitespace that follows it.
pub fn backspace_word(state: &EditorState) -> Result<EditorState> {
    remove_word(state, RemovalDirection::Backward)
}

/// Remove the selection, or the whitespace and word after the cursor.
pub fn delete_word(state: &EditorState) -> Result<EditorState> {
    remove_word(state, RemovalDirection::Forward)
}

/// Type `chars` over the selection.
///
/// The new text takes the current inline style. It joins the entity around
/// the cursor only when that entity is mutable.
pub fn insert_characters(state: &EditorState, chars: &str) -> Result<EditorState> {
    if chars.is_empty() {
        return Ok(state.clone());
    }
    let content = state.current_content();
    let selection = state.selection();
    let entity_key = entity_key_for_selection(content, selection);
    let content = modifier::replace_text(
        content,
        selection,
        chars,
        &state.current_inline_style(),
        entity_key.as_deref(),
    )?;
    Ok(state.push(content, ChangeType::InsertCharacters, true))
}

/// The entity that text typed over `selection` should carry.
///
/// For a cursor this is the entity on both sides of it; for a range, the
/// entity of its first character. Only mutable entities qualify.
pub fn entity_key_for_selection(
    content: &ContentState,
    selection: &SelectionState,
) -> Option<String> {
    let block = content.block_for_key(selection.start_key())?;
    let offset = selection.start_offset();
    let entity_key = if selection.is_collapsed() {
        let before = block.entity_at(offset.checked_sub(1)?)?;
        if block.entity_at(offset) != Some(before) {
            return None;
        }
        before
    } else {
        block.entity_at(offset)?
    };
    content
        .entity_map()
        .get(entity_key)
        .filter(|entity| entity.mutability() == Mutability::Mutable)
        .map(|_| entity_key.to_owned())
}

fn remove_character(
    state: &EditorState,
    direction: RemovalDirection,
) -> Result<EditorState> {
    let removed = remove_text_with_strategy(state, direction, |block, offset| {
        let text = block.text_string();
        match direction {
            RemovalDirection::Backward => grapheme_before(&text, offset),
            RemovalDirection::Forward => grapheme_after(&text, offset),
        }
    })?;
    if ContentState::ptr_eq(&removed, state.current_content()) {
        return Ok(state.clone());
    }

    let selection = state.selection();
    let change_type = match (selection.is_collapsed(), direction) {
        (false, _) => ChangeType::RemoveRange,
        (true, RemovalDirection::Backward) => ChangeType::BackspaceCharacter,
        (true, RemovalDirection::Forward) => ChangeType::DeleteCharacter,
    };
    let removed = removed.with_selection_before(selection.clone());
    Ok(state.push(removed, change_type, true))
}

fn remove_word(
    state: &EditorState,
    direction: RemovalDirection,
) -> Result<EditorState> {
    let removed = remove_text_with_strategy(state, direction, |block, offset| {
        let text = block.text_string();
        let (before, after) = split_at_utf16(&text, offset);
        match direction {
            RemovalDirection::Backward => word_before(before),
            RemovalDirection::Forward => word_after(after),
        }
    })?;
    if ContentState::ptr_eq(&removed, state.current_content()) {
        return Ok(state.clone());
    }
    Ok(state.push(removed, ChangeType::RemoveRange, true))
}

/// Remove the selection, or for a cursor the range that `distance` measures
/// from it. `distance` gets the cursor block and offset and returns a length
/// in UTF-16 units; 0 means "cross into the neighbouring block".
fn remove_text_with_strategy<F>(
    state: &EditorState,
    direction: RemovalDirection,
    distance: F,
) -> Result<ContentState>
where
    F: FnOnce(&ContentBlock, usize) -> usize,
{
    let content = state.current_content();
    let selection = state.selection();
    let target = if selection.is_collapsed() {
        let block = content.require_block(selection.start_key())?;
        let offset = selection.start_offset();
        let distance = distance(block, offset).max(1);
        match direction {
            RemovalDirection::Backward => {
                move_selection_backward(content, selection, distance)
            }
            RemovalDirection::Forward => {
                move_selection_forward(content, selection, distance)
            }
        }
    } else {
        selection.clone()
    };
    if target.is_collapsed() {
        return Ok(content.clone());
    }
    modifier::remove_range(content, &target, direction)
}

/// Extend the focus backwards by up to `distance` units, or to the end of
/// the block before when that would cross the block start.
fn move_selection_backward(
    content: &ContentState,
    selection: &SelectionState,
    distance: usize,
) -> SelectionState {
    let key = selection.start_key();
    let offset = selection.start_offset();
    let (focus_key, focus_offset) = if distance > offset {
        match content.block_before(key) {
            Some(before) => (before.key(), before.len()),
            None => (key, 0),
        }
    } else {
        (key, offset - distance)
    };
    selection
        .with_focus(focus_key, focus_offset)
        .with_is_backward(true)
}

/// Extend the focus forwards by up to `distance` units, or to the start of
/// the block after when that would cross the block end.
fn move_selection_forward(
    content: &ContentState,
    selection: &SelectionState,
    distance: usize,
) -> SelectionState {
    let key = selection.start_key();
    let offset = selection.start_offset();
    let block_len = content.block_for_key(key).map_or(0, |block| block.len());
    let (focus_key, focus_offset) = if distance > block_len.saturating_sub(offset) {
        match content.block_after(key) {
            Some(after) => (after.key(), 0),
            None => (key, block_len),
        }
    } else {
        (key, offset + distance)
    };
    selection.with_focus(focus_key, focus_offset)
}

fn utf16_len(text: &str) -> usize {
    text.encode_utf16().count()
}

/// Split `text` at a UTF-16 offset, rounding down to a char boundary.
fn split_at_utf16(text: &str, offset: usize) -> (&str, &str) {
    let mut units = 0;
    for (index, ch) in text.char_indices() {
        if units >= offset {
            return text.split_at(index);
        }
        units += ch.len_utf16();
    }
    (text, "")
}

/// UTF-16 length of the grapheme cluster ending at `offset`.
fn grapheme_before(text: &str, offset: usize) -> usize {
    let mut start = 0;
    let mut last = 0;
    for grapheme in text.graphemes(true) {
        let end = start + utf16_len(grapheme);
        if end > offset {
            break;
        }
        last = end - start;
        start = end;
    }
    if start == offset {
        last
    } else {
        offset - start
    }
}

/// UTF-16 length of the grapheme cluster starting at `offset`.
fn grapheme_after(text: &str, offset: usize) -> usize {
    let mut start = 0;
    for grapheme in text.graphemes(true) {
        let end = start + utf16_len(grapheme);
        if end > offset {
            return end - offset;
        }
        start = end;
    }
    0
}

fn is_word(segment: &str) -> bool {
    segment.chars().any(char::is_alphanumeric)
}

/// UTF-16 length of the last word of `text` and anything after it.
fn word_before(text: &str) -> usize {
    let mut length = 0;
    for segment in text.split_word_bounds().rev() {
        length += utf16_len(segment);
        if is_word(segment) {
            break;
        }
    }
    length
}

/// UTF-16 length of the first word of `text` and anything before it.
fn word_after(text: &str) -> usize {
    let mut length = 0;
    for segment in text.split_word_bounds() {
        length += utf16_len(segment);
        if is_word(segment) {
            break;
        }
    }
    length
}

// Copyright (c) 2026 Element Creations Ltd
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

//! Formatting commands that editors bind to toolbar buttons and shortcuts.

use crate::block_map::BlockMapUpdates;
use crate::editor_state::{ChangeType, EditorState};
use crate::error::Result;
use crate::transaction::adjust_block_depth_for_content_state;
use crate::{modifier, BlockType, ContentState, RemovalDirection, SelectionState};

/// Entity type treated as a hyperlink.
pub const LINK_ENTITY_TYPE: &str = "LINK";

/// Type of the block holding the start of the selection.
pub fn current_block_type(state: &EditorState) -> Option<BlockType> {
    state
        .current_content()
        .block_for_key(state.selection().start_key())
        .map(|block| block.block_type().clone())
}

/// Whether any selected character of the anchor block belongs to a link.
pub fn current_block_contains_link(state: &EditorState) -> bool {
    let selection = state.selection();
    let content = state.current_content();
    let Some(block) = content.block_for_key(selection.anchor_key()) else {
        return false;
    };
    let end = selection.end_offset().min(block.len());
    let start = selection.start_offset().min(end);
    block.characters()[start..end].iter().any(|character| {
        character
            .entity()
            .and_then(|key| content.entity_map().get(key))
            .is_some_and(|entity| entity.entity_type() == LINK_ENTITY_TYPE)
    })
}

/// Dispatch a named key command. Returns `None` for commands this module
/// does not handle or that have nothing to do.
pub fn handle_key_command(
    state: &EditorState,
    command: &str,
) -> Result<Option<EditorState>> {
    match command {
        "bold" => toggle_inline_style(state, "BOLD").map(Some),
        "italic" => toggle_inline_style(state, "ITALIC").map(Some),
        "underline" => toggle_inline_style(state, "UNDERLINE").map(Some),
        "code" => toggle_inline_style(state, "CODE").map(Some),
        "backspace" | "backspace-word" | "backspace-to-start-of-line" => {
            on_backspace(state)
        }
        "delete" | "delete-word" | "delete-to-end-of-block" => on_delete(state),
        _ => Ok(None),
    }
}

/// Insert a line break inside the current block.
pub fn insert_soft_newline(state: &EditorState) -> Result<EditorState> {
    let content = modifier::insert_text(
        state.current_content(),
        state.selection(),
        "\n",
        &state.current_inline_style(),
        None,
    )?;
    let selection = content.selection_after().clone();
    Ok(state
        .push(content, ChangeType::InsertCharacters, true)
        .force_selection(selection))
}

/// Backspace at the very start of a block: remove an atomic block above,
/// or else drop the block's own style. `None` when neither applies.
pub fn on_backspace(state: &EditorState) -> Result<Option<EditorState>> {
    let selection = state.selection();
    if !selection.is_collapsed()
        || selection.anchor_offset() != 0
        || selection.focus_offset() != 0
    {
        return Ok(None);
    }

    let content = state.current_content();
    if let Some(before) = content.block_before(selection.start_key()) {
        if before.block_type() == &BlockType::Atomic {
            let mut updates = BlockMapUpdates::new();
            updates.insert(before.key().to_owned(), None);
            let without_atomic =
                content.with_updates(updates, selection.clone(), selection.clone());
            if !ContentState::ptr_eq(&without_atomic, content) {
                return Ok(Some(state.push(
                    without_atomic,
                    ChangeType::RemoveRange,
                    true,
                )));
            }
        }
    }

    Ok(try_to_remove_block_style(state)?.map(|without_style| {
        state.push(without_style, ChangeType::ChangeBlockType, true)
    }))
}

/// Delete at the very end of a block followed by an atomic block removes
/// that block. `None` otherwise.
pub fn on_delete(state: &EditorState) -> Result<Option<EditorState>> {
    let selection = state.selection();
    if !selection.is_collapsed() {
        return Ok(None);
    }
    let content = state.current_content();
    let block = content.require_block(selection.start_key())?;
    if selection.start_offset() < block.len() {
        return Ok(None);
    }
    let Some(after) = content.block_after(block.key()) else {
        return Ok(None);
    };
    if after.block_type() != &BlockType::Atomic {
        return Ok(None);
    }

    let target = selection.with_focus(after.key(), after.len());
    let without_atomic =
        modifier::remove_range(content, &target, RemovalDirection::Forward)?;
    if ContentState::ptr_eq(&without_atomic, content) {
        return Ok(None);
    }
    Ok(Some(state.push(without_atomic, ChangeType::RemoveRange, true)))
}

/// Indent (or with `shift`, outdent) the selected list items.
///
/// A list item can sit at most one level deeper than the list item above
/// it, and never deeper than `max_depth`. Anything else is left alone.
pub fn on_tab(
    state: &EditorState,
    shift: bool,
    max_depth: usize,
) -> Result<EditorState> {
    let selection = state.selection();
    let key = selection.anchor_key();
    if key != selection.focus_key() {
        return Ok(state.clone());
    }

    let content = state.current_content();
    let block = content.require_block(key)?;
    if !block.block_type().is_list_item() {
        return Ok(state.clone());
    }
    let Some(above) = content.block_before(key) else {
        return Ok(state.clone());
    };
    if !above.block_type().is_list_item() {
        return Ok(state.clone());
    }
    if !shift && block.depth() == max_depth {
        return Ok(state.clone());
    }

    let max_depth = max_depth.min(above.depth() + 1);
    let adjusted = adjust_block_depth_for_content_state(
        content,
        selection,
        if shift { -1 } else { 1 },
        max_depth,
    )?;
    Ok(state.push(adjusted, ChangeType::AdjustDepth, true))
}

/// Switch the selected blocks to `block_type`, or back to unstyled if the
/// first of them already has it.
///
/// A selection that ends at offset 0 of a later block does not touch that
/// block. Selections that include an atomic block are left alone.
pub fn toggle_block_type(
    state: &EditorState,
    block_type: BlockType,
) -> Result<EditorState> {
    let selection = state.selection();
    let content = state.current_content();
    let start_key = selection.start_key();
    let mut target = selection.clone();

    if start_key != selection.end_key() && selection.end_offset() == 0 {
        if let Some(before_end) = content.block_before(selection.end_key()) {
            target = SelectionState::new(
                start_key,
                selection.start_offset(),
                before_end.key(),
                before_end.len(),
            );
        }
    }

    let blocks = content
        .block_map()
        .range(target.start_key(), target.end_key())?;
    if blocks
        .iter()
        .any(|block| block.block_type() == &BlockType::Atomic)
    {
        return Ok(state.clone());
    }

    let first = content.require_block(start_key)?;
    let type_to_set = if first.block_type() == &block_type {
        BlockType::Unstyled
    } else {
        block_type
    };
    let content = modifier::set_block_type(content, &target, type_to_set)?;
    Ok(state.push(content, ChangeType::ChangeBlockType, true))
}

/// Toggle `style` on the selection.
///
/// For a cursor this only changes the style override used for the next
/// typed characters. For a range the document itself changes.
pub fn toggle_inline_style(
    state: &EditorState,
    style: &str,
) -> Result<EditorState> {
    let selection = state.selection();
    let current = state.current_inline_style();

    if selection.is_collapsed() {
        let toggled = if current.contains(style) {
            current.without(style)
        } else {
            current.with(style)
        };
        return Ok(state.set_inline_style_override(Some(toggled)));
    }

    let content = state.current_content();
    let content = if current.contains(style) {
        modifier::remove_inline_style(content, selection, style)?
    } else {
        modifier::apply_inline_style(content, selection, style)?
    };
    Ok(state.push(content, ChangeType::ChangeInlineStyle, true))
}

/// Attach `entity_key` to `target`, or with `None` remove links from it.
pub fn toggle_link(
    state: &EditorState,
    target: &SelectionState,
    entity_key: Option<&str>,
) -> Result<EditorState> {
    let content =
        modifier::apply_entity(state.current_content(), target, entity_key)?;
    Ok(state.push(content, ChangeType::ApplyEntity, true))
}

/// At offset 0 of a styled block, the content with that block unstyled.
///
/// A code block directly below a non-empty code block keeps its type so
/// that backspace joins the two instead.
pub fn try_to_remove_block_style(
    state: &EditorState,
) -> Result<Option<ContentState>> {
    let selection = state.selection();
    if !selection.is_collapsed() || selection.anchor_offset() != 0 {
        return Ok(None);
    }

    let content = state.current_content();
    let key = selection.anchor_key();
    let block = content.require_block(key)?;
    let block_type = block.block_type();
    if block_type == &BlockType::CodeBlock
        && content.block_before(key).is_some_and(|before| {
            before.block_type() == &BlockType::CodeBlock && !before.is_empty()
        })
    {
        return Ok(None);
    }
    if block_type == &BlockType::Unstyled {
        return Ok(None);
    }
    modifier::set_block_type(content, selection, BlockType::Unstyled).map(Some)
}

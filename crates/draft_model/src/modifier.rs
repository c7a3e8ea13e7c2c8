// Copyright (c) 2026 Element Creations Ltd
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

//! High-level edits.
//!
//! These compose the primitives in [`crate::transaction`] the way an editor
//! needs them: for instance typing over a selection first detaches any
//! immutable entity cut by the selection, then removes the selected text,
//! then inserts the new text. Prefer these over the primitives unless you
//! know the intermediate states are consistent.

use crate::block_map::BlockMap;
use crate::character_metadata::{CharacterMetadata, StyleSet};
use crate::error::Result;
use crate::transaction::{
    self, apply_entity_to_content_state, get_character_removal_range,
    get_content_state_fragment, insert_fragment_into_content_state,
    insert_text_into_content_state, modify_block_for_content_state,
    remove_entities_at_edges, remove_range_from_content_state,
    require_collapsed, split_block_in_content_state, MergeBlockData,
    RemovalDirection,
};
use crate::{BlockData, BlockType, ContentState, SelectionState};

/// Replace the text of `range` with `text`, styled with `inline_style` and
/// attached to `entity_key`.
pub fn replace_text(
    content: &ContentState,
    range: &SelectionState,
    text: &str,
    inline_style: &StyleSet,
    entity_key: Option<&str>,
) -> Result<ContentState> {
    let without_entities = remove_entities_at_edges(content, range)?;
    let without_text =
        remove_range_from_content_state(&without_entities, range)?;
    let character = CharacterMetadata::create(inline_style, entity_key);
    insert_text_into_content_state(
        &without_text,
        without_text.selection_after(),
        text,
        &character,
    )
}

/// Insert `text` at the collapsed `target`.
pub fn insert_text(
    content: &ContentState,
    target: &SelectionState,
    text: &str,
    inline_style: &StyleSet,
    entity_key: Option<&str>,
) -> Result<ContentState> {
    require_collapsed(target, "insert_text")?;
    replace_text(content, target, text, inline_style, entity_key)
}

/// Cut `removal` and paste it at `target`.
///
/// `target` is interpreted in the document after the removal.
pub fn move_text(
    content: &ContentState,
    removal: &SelectionState,
    target: &SelectionState,
) -> Result<ContentState> {
    let moved = get_content_state_fragment(content, removal)?;
    let after_removal =
        remove_range(content, removal, RemovalDirection::Backward)?;
    replace_with_fragment(
        &after_removal,
        target,
        &moved,
        MergeBlockData::ReplaceWithNewData,
    )
}

/// Replace `target` with the blocks of `fragment`.
pub fn replace_with_fragment(
    content: &ContentState,
    target: &SelectionState,
    fragment: &BlockMap,
    merge_block_data: MergeBlockData,
) -> Result<ContentState> {
    let without_entities = remove_entities_at_edges(content, target)?;
    let without_text =
        remove_range_from_content_state(&without_entities, target)?;
    insert_fragment_into_content_state(
        &without_text,
        without_text.selection_after(),
        fragment,
        merge_block_data,
    )
}

/// Delete `range`, widening it over immutable and segmented entities it
/// sits inside.
pub fn remove_range(
    content: &ContentState,
    range: &SelectionState,
    direction: RemovalDirection,
) -> Result<ContentState> {
    let range = range.to_forward();
    if range.anchor_key() == range.focus_key() {
        let block = content.require_block(range.anchor_key())?;
        let start_entity = block.entity_at(range.start_offset());
        let end_entity = range
            .end_offset()
            .checked_sub(1)
            .and_then(|last| block.entity_at(last));
        if start_entity.is_some() && start_entity == end_entity {
            let adjusted = get_character_removal_range(
                content.entity_map(),
                block,
                block,
                &range,
                direction,
            )?;
            return remove_range_from_content_state(content, &adjusted);
        }
    }

    let without_entities = remove_entities_at_edges(content, &range)?;
    remove_range_from_content_state(&without_entities, &range)
}

/// Remove `selection`, then split the block at the cursor.
pub fn split_block(
    content: &ContentState,
    selection: &SelectionState,
) -> Result<ContentState> {
    let without_entities = remove_entities_at_edges(content, selection)?;
    let without_text =
        remove_range_from_content_state(&without_entities, selection)?;
    split_block_in_content_state(&without_text, without_text.selection_after())
}

pub fn apply_inline_style(
    content: &ContentState,
    selection: &SelectionState,
    style: &str,
) -> Result<ContentState> {
    transaction::inline_style::add(content, selection, style)
}

pub fn remove_inline_style(
    content: &ContentState,
    selection: &SelectionState,
    style: &str,
) -> Result<ContentState> {
    transaction::inline_style::remove(content, selection, style)
}

/// Change the type of every selected block. Depth resets to 0.
pub fn set_block_type(
    content: &ContentState,
    selection: &SelectionState,
    block_type: BlockType,
) -> Result<ContentState> {
    modify_block_for_content_state(content, selection, |block| {
        block.with_type(block_type.clone()).with_depth(0)
    })
}

/// Replace the data of every selected block.
pub fn set_block_data(
    content: &ContentState,
    selection: &SelectionState,
    data: BlockData,
) -> Result<ContentState> {
    modify_block_for_content_state(content, selection, |block| {
        block.with_data(data.clone())
    })
}

/// Shallow-merge `data` into the data of every selected block.
pub fn merge_block_data(
    content: &ContentState,
    selection: &SelectionState,
    data: BlockData,
) -> Result<ContentState> {
    modify_block_for_content_state(content, selection, |block| {
        let mut merged = block.data().clone();
        merged.extend(data.clone());
        block.with_data(merged)
    })
}

/// Attach `entity_key` to the selected text, or detach entities with `None`.
pub fn apply_entity(
    content: &ContentState,
    selection: &SelectionState,
    entity_key: Option<&str>,
) -> Result<ContentState> {
    let without_entities = remove_entities_at_edges(content, selection)?;
    apply_entity_to_content_state(&without_entities, selection, entity_key)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{ContentBlock, EntityData, Mutability};

    fn content() -> ContentState {
        ContentState::create_from_block_array(
            [
                ContentBlock::new("a", BlockType::Unstyled, "Hello world"),
                ContentBlock::new("b", BlockType::HeaderOne, "Second line"),
            ],
            None,
        )
    }

    fn texts(content: &ContentState) -> Vec<String> {
        content.blocks().map(|b| b.text_string()).collect()
    }

    fn range(key: &str, start: usize, end: usize) -> SelectionState {
        SelectionState::new(key, start, key, end)
    }

    /// "Hello world" with "world" in an entity of the given mutability.
    fn with_entity(mutability: Mutability) -> (ContentState, String) {
        let (content, key) =
            content().create_entity("TOKEN", mutability, EntityData::new());
        let content =
            apply_entity(&content, &range("a", 6, 11), Some(key.as_str()))
                .unwrap();
        (content, key)
    }

    #[test]
    fn replace_text_styles_the_new_text() {
        let result = replace_text(
            &content(),
            &range("a", 0, 5),
            "Howdy",
            &StyleSet::from_iter(["ITALIC"]),
            None,
        )
        .unwrap();
        let block = result.block_for_key("a").unwrap();
        assert_eq!(block.text_string(), "Howdy world");
        assert!(block.characters()[0].has_style("ITALIC"));
        assert!(!block.characters()[5].has_style("ITALIC"));
        assert_eq!(result.selection_after().focus_offset(), 5);
    }

    #[test]
    fn insert_text_requires_a_cursor() {
        assert!(insert_text(
            &content(),
            &range("a", 0, 5),
            "x",
            &StyleSet::new(),
            None
        )
        .is_err());
    }

    #[test]
    fn typing_inside_an_immutable_entity_detaches_it() {
        let (content, _) = with_entity(Mutability::Immutable);
        let result = insert_text(
            &content,
            &range("a", 8, 8),
            "X",
            &StyleSet::new(),
            None,
        )
        .unwrap();
        let block = result.block_for_key("a").unwrap();
        assert_eq!(block.text_string(), "Hello woXrld");
        assert!(block.characters().iter().all(|c| c.entity().is_none()));
    }

    #[test]
    fn removing_inside_an_immutable_entity_removes_all_of_it() {
        let (content, _) = with_entity(Mutability::Immutable);
        let result =
            remove_range(&content, &range("a", 7, 9), RemovalDirection::Backward)
                .unwrap();
        assert_eq!(result.block_for_key("a").unwrap().text_string(), "Hello ");
    }

    #[test]
    fn removing_inside_a_mutable_entity_removes_only_the_range() {
        let (content, key) = with_entity(Mutability::Mutable);
        let result =
            remove_range(&content, &range("a", 7, 9), RemovalDirection::Backward)
                .unwrap();
        let block = result.block_for_key("a").unwrap();
        assert_eq!(block.text_string(), "Hello wld");
        assert_eq!(block.entity_at(6), Some(key.as_str()));
    }

    #[test]
    fn backward_range_is_normalised() {
        let result = remove_range(
            &content(),
            &SelectionState::new("a", 5, "a", 0).with_is_backward(true),
            RemovalDirection::Backward,
        )
        .unwrap();
        assert_eq!(texts(&result)[0], " world");
    }

    #[test]
    fn split_block_replaces_the_selection() {
        let result = split_block(&content(), &range("a", 5, 6)).unwrap();
        assert_eq!(texts(&result), vec!["Hello", "world", "Second line"]);
    }

    #[test]
    fn move_text_pastes_at_the_target() {
        let result = move_text(
            &content(),
            &range("a", 0, 6),
            &range("b", 6, 6),
        )
        .unwrap();
        assert_eq!(texts(&result), vec!["world", "Second Hello line"]);
    }

    #[test]
    fn set_block_type_resets_depth() {
        let deep = content()
            .with_block_map(BlockMap::from_blocks([ContentBlock::new(
                "a",
                BlockType::OrderedListItem,
                "x",
            )
            .with_depth(3)]))
            .with_selections(range("a", 0, 0), range("a", 0, 0));
        let result =
            set_block_type(&deep, &range("a", 0, 0), BlockType::Blockquote)
                .unwrap();
        let block = result.block_for_key("a").unwrap();
        assert_eq!(block.block_type(), &BlockType::Blockquote);
        assert_eq!(block.depth(), 0);
    }

    #[test]
    fn block_data_set_and_merge() {
        let selection = SelectionState::new("a", 0, "b", 0);
        let data = |value: serde_json::Value| -> BlockData {
            value.as_object().cloned().unwrap()
        };
        let set =
            set_block_data(&content(), &selection, data(json!({ "a": 1 })))
                .unwrap();
        let merged =
            merge_block_data(&set, &selection, data(json!({ "b": 2 }))).unwrap();
        for block in merged.blocks() {
            assert_eq!(block.data().get("a"), Some(&json!(1)));
            assert_eq!(block.data().get("b"), Some(&json!(2)));
        }
    }
}

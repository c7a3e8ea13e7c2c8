// Copyright (c) 2026 Element Creations Ltd
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use std::sync::Arc;

use super::{modify_block_for_content_state, require_collapsed};
use crate::error::Result;
use crate::keys::generate_key_where;
use crate::{BlockData, BlockType, ContentState, SelectionState};

/// Split the block at the collapsed `selection` in two.
///
/// The head keeps the original key. The tail gets a fresh key, the same
/// type and depth, and empty data; the cursor moves to its start.
///
/// Splitting an empty list item instead turns it into an unstyled block at
/// depth 0, which is how a user leaves a list.
pub fn split_block_in_content_state(
    content: &ContentState,
    selection: &SelectionState,
) -> Result<ContentState> {
    require_collapsed(selection, "split_block_in_content_state")?;

    let key = selection.anchor_key();
    let offset = selection.anchor_offset();
    let block = content.require_block(key)?;

    if block.is_empty() && block.block_type().is_list_item() {
        return modify_block_for_content_state(content, selection, |block| {
            block.with_type(BlockType::Unstyled).with_depth(0)
        });
    }

    let (head_units, head_chars) = block.slice(0, offset);
    let above = block.with_content(head_units.to_vec(), head_chars.to_vec());
    let (tail_units, tail_chars) = block.slice(offset, block.len());
    let key_below =
        generate_key_where(|key| !content.block_map().contains_key(key));
    let below = block
        .with_content(tail_units.to_vec(), tail_chars.to_vec())
        .with_key(key_below.clone())
        .with_data(BlockData::new());

    let block_map = content.block_map().replace_range(
        key,
        key,
        [Arc::new(above), Arc::new(below)],
    )?;
    Ok(content.with_block_map(block_map).with_selections(
        selection.clone(),
        selection.collapsed_at(&key_below, 0),
    ))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::split_block_in_content_state;
    use crate::{
        BlockData, BlockType, ContentBlock, ContentState, SelectionState,
    };

    fn content(block_type: BlockType, text: &str) -> ContentState {
        let data: BlockData =
            json!({ "align": "left" }).as_object().cloned().unwrap();
        ContentState::create_from_block_array(
            [
                ContentBlock::new("a", block_type, text)
                    .with_depth(1)
                    .with_data(data),
                ContentBlock::new("z", BlockType::Unstyled, "after"),
            ],
            None,
        )
    }

    #[test]
    fn splits_text_and_moves_the_cursor_to_the_tail() {
        let result = split_block_in_content_state(
            &content(BlockType::HeaderTwo, "HelloWorld"),
            &SelectionState::new("a", 5, "a", 5),
        )
        .unwrap();

        let keys: Vec<&str> = result.block_map().keys().collect();
        assert_eq!(keys.len(), 3);
        assert_eq!(keys[0], "a");
        assert_eq!(keys[2], "z");

        let head = result.block_for_key("a").unwrap();
        let tail = result.block_after("a").unwrap();
        assert_eq!(head.text_string(), "Hello");
        assert_eq!(tail.text_string(), "World");
        assert_eq!(tail.block_type(), &BlockType::HeaderTwo);
        assert_eq!(tail.depth(), 1);
        assert!(tail.data().is_empty());
        assert_eq!(head.data().len(), 1);

        let after = result.selection_after();
        assert_eq!(after.anchor_key(), tail.key());
        assert_eq!(after.anchor_offset(), 0);
        assert!(after.is_collapsed());
    }

    #[test]
    fn empty_list_item_becomes_unstyled() {
        let content = content(BlockType::UnorderedListItem, "");
        let result = split_block_in_content_state(
            &content,
            &SelectionState::new("a", 0, "a", 0),
        )
        .unwrap();
        assert_eq!(result.block_map().len(), 2);
        let block = result.block_for_key("a").unwrap();
        assert_eq!(block.block_type(), &BlockType::Unstyled);
        assert_eq!(block.depth(), 0);
    }

    #[test]
    fn empty_non_list_block_still_splits() {
        let result = split_block_in_content_state(
            &content(BlockType::Unstyled, ""),
            &SelectionState::new("a", 0, "a", 0),
        )
        .unwrap();
        assert_eq!(result.block_map().len(), 3);
    }

    #[test]
    fn range_selection_is_rejected() {
        assert!(split_block_in_content_state(
            &content(BlockType::Unstyled, "abc"),
            &SelectionState::new("a", 0, "a", 2),
        )
        .is_err());
    }
}

// Copyright (c) 2026 Element Creations Ltd
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use std::sync::Arc;

use super::selected_blocks;
use crate::block_map::BlockMapUpdates;
use crate::error::Result;
use crate::{ContentBlock, ContentState, SelectionState};

/// Replace every block the selection touches with `op(block)`.
///
/// Blocks for which `op` returns an equal block keep their allocation.
pub fn modify_block_for_content_state<F>(
    content: &ContentState,
    selection: &SelectionState,
    mut op: F,
) -> Result<ContentState>
where
    F: FnMut(&ContentBlock) -> ContentBlock,
{
    let mut updates = BlockMapUpdates::new();
    for block in selected_blocks(content, selection)? {
        let modified = op(block);
        if modified != **block {
            updates.insert(block.key().to_owned(), Some(Arc::new(modified)));
        }
    }
    Ok(content.with_updates(updates, selection.clone(), selection.clone()))
}

/// Shift the depth of every selected block by `adjustment`, clamped to
/// `[0, max_depth]`.
pub fn adjust_block_depth_for_content_state(
    content: &ContentState,
    selection: &SelectionState,
    adjustment: isize,
    max_depth: usize,
) -> Result<ContentState> {
    modify_block_for_content_state(content, selection, |block| {
        let depth = block
            .depth()
            .saturating_add_signed(adjustment)
            .min(max_depth);
        block.with_depth(depth)
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::{
        adjust_block_depth_for_content_state, modify_block_for_content_state,
    };
    use crate::{BlockType, ContentBlock, ContentState, SelectionState};

    fn content() -> ContentState {
        ContentState::create_from_block_array(
            [
                ContentBlock::new("a", BlockType::UnorderedListItem, "one"),
                ContentBlock::new("b", BlockType::UnorderedListItem, "two")
                    .with_depth(1),
                ContentBlock::new("c", BlockType::Unstyled, "three"),
            ],
            None,
        )
    }

    fn depths(content: &ContentState) -> Vec<usize> {
        content.blocks().map(|b| b.depth()).collect()
    }

    #[test]
    fn modifies_every_selected_block() {
        let result = modify_block_for_content_state(
            &content(),
            &SelectionState::new("a", 1, "b", 0),
            |block| block.with_type(BlockType::Blockquote),
        )
        .unwrap();
        let types: Vec<BlockType> =
            result.blocks().map(|b| b.block_type().clone()).collect();
        assert_eq!(
            types,
            vec![BlockType::Blockquote, BlockType::Blockquote, BlockType::Unstyled]
        );
    }

    #[test]
    fn depth_is_clamped() {
        let selection = SelectionState::new("a", 0, "c", 0);
        let deeper =
            adjust_block_depth_for_content_state(&content(), &selection, 1, 1)
                .unwrap();
        assert_eq!(depths(&deeper), vec![1, 1, 1]);

        let shallower =
            adjust_block_depth_for_content_state(&content(), &selection, -1, 4)
                .unwrap();
        assert_eq!(depths(&shallower), vec![0, 0, 0]);
    }

    #[test]
    fn unchanged_blocks_keep_their_allocation() {
        let content = content();
        let result = adjust_block_depth_for_content_state(
            &content,
            &SelectionState::new("a", 0, "b", 0),
            0,
            4,
        )
        .unwrap();
        assert!(Arc::ptr_eq(
            content.block_for_key("a").unwrap(),
            result.block_for_key("a").unwrap()
        ));
        assert!(content.block_map() == result.block_map());
    }
}

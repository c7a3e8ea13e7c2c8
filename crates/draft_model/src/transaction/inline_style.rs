// Copyright (c) 2026 Element Creations Ltd
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

//! Adding and removing inline styles over a selection.

use super::map_selected_characters;
use crate::error::Result;
use crate::{ContentState, SelectionState};

/// Add `style` to every selected character.
pub fn add(
    content: &ContentState,
    selection: &SelectionState,
    style: &str,
) -> Result<ContentState> {
    map_selected_characters(content, selection, |c| c.apply_style(style))
}

/// Remove `style` from every selected character.
pub fn remove(
    content: &ContentState,
    selection: &SelectionState,
    style: &str,
) -> Result<ContentState> {
    map_selected_characters(content, selection, |c| c.remove_style(style))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::{add, remove};
    use crate::{BlockType, ContentBlock, ContentState, SelectionState};

    fn content() -> ContentState {
        ContentState::create_from_block_array(
            [
                ContentBlock::new("a", BlockType::Unstyled, "abc"),
                ContentBlock::new("b", BlockType::Unstyled, "def"),
                ContentBlock::new("c", BlockType::Unstyled, "ghi"),
                ContentBlock::new("d", BlockType::Unstyled, "jkl"),
            ],
            None,
        )
    }

    fn bold_mask(content: &ContentState, key: &str) -> String {
        content
            .block_for_key(key)
            .unwrap()
            .characters()
            .iter()
            .map(|c| if c.has_style("BOLD") { 'B' } else { '.' })
            .collect()
    }

    #[test]
    fn add_covers_the_middle_blocks_entirely() {
        let selection = SelectionState::new("a", 1, "c", 2);
        let result = add(&content(), &selection, "BOLD").unwrap();
        assert_eq!(bold_mask(&result, "a"), ".BB");
        assert_eq!(bold_mask(&result, "b"), "BBB");
        assert_eq!(bold_mask(&result, "c"), "BB.");
        assert_eq!(bold_mask(&result, "d"), "...");
        assert_eq!(result.selection_before(), &selection);
        assert_eq!(result.selection_after(), &selection);
    }

    #[test]
    fn remove_only_touches_the_selection() {
        let all = SelectionState::new("a", 0, "d", 3);
        let styled = add(&content(), &all, "BOLD").unwrap();
        let result =
            remove(&styled, &SelectionState::new("b", 1, "b", 2), "BOLD")
                .unwrap();
        assert_eq!(bold_mask(&result, "b"), "B.B");
        assert_eq!(bold_mask(&result, "a"), "BBB");
        assert!(Arc::ptr_eq(
            styled.block_for_key("a").unwrap(),
            result.block_for_key("a").unwrap()
        ));
    }

    #[test]
    fn styles_accumulate() {
        let selection = SelectionState::new("a", 0, "a", 3);
        let result = add(&content(), &selection, "BOLD").unwrap();
        let result = add(&result, &selection, "ITALIC").unwrap();
        let style = result.block_for_key("a").unwrap().inline_style_at(1);
        assert_eq!(style.iter().collect::<Vec<_>>(), vec!["BOLD", "ITALIC"]);
    }
}

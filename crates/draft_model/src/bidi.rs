// Copyright (c) 2026 Element Creations Ltd
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

//! Text direction of blocks.
//!
//! A block's direction is that of its first strongly directional letter.
//! Blocks without one (empty, digits, punctuation) inherit the direction of
//! the block before them, so a reply typed after an Arabic paragraph keeps
//! the same alignment until the user types a letter.

use std::sync::Arc;

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use strum_macros::{AsRefStr, Display, EnumString};

use crate::ContentState;

static STRONG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?P<rtl>[[\p{Hebrew}\p{Arabic}\p{Syriac}\p{Thaana}\p{Nko}\p{Samaritan}\p{Mandaic}\p{Adlam}]&&\p{L}])|(?P<ltr>\p{L})",
    )
    .expect("strong direction pattern is a valid regex")
});

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, AsRefStr, Display, EnumString,
)]
#[strum(serialize_all = "UPPERCASE")]
pub enum Direction {
    #[default]
    Ltr,
    Rtl,
    Neutral,
}

/// Direction of the first strong character of `text`, or `Neutral`.
pub fn first_strong_direction(text: &str) -> Direction {
    match STRONG.captures(text) {
        Some(captures) if captures.name("rtl").is_some() => Direction::Rtl,
        Some(_) => Direction::Ltr,
        None => Direction::Neutral,
    }
}

/// Resolves block directions in reading order, falling back to the last
/// resolved direction for neutral text.
#[derive(Clone, Debug)]
pub struct BidiService {
    default_direction: Direction,
    last_direction: Direction,
}

impl BidiService {
    pub fn new(default_direction: Direction) -> Self {
        Self {
            default_direction,
            last_direction: default_direction,
        }
    }

    pub fn reset(&mut self) {
        self.last_direction = self.default_direction;
    }

    pub fn direction(&mut self, text: &str) -> Direction {
        let direction = first_strong_direction(text);
        if direction != Direction::Neutral {
            self.last_direction = direction;
        }
        self.last_direction
    }
}

impl Default for BidiService {
    fn default() -> Self {
        Self::new(Direction::Ltr)
    }
}

/// Direction per block key, in block order.
pub type DirectionMap = Arc<IndexMap<String, Direction>>;

/// Compute the direction of every block of `content`.
///
/// `previous` is the content the previous map was computed for. A block's
/// direction only depends on the blocks up to it, so the leading blocks
/// shared with `previous` keep their entries and the scan starts after
/// them. When the result equals the previous map, in order, the previous
/// map is returned so that it keeps its identity.
pub fn direction_map(
    content: &ContentState,
    previous: Option<(&ContentState, &DirectionMap)>,
) -> DirectionMap {
    let mut next: IndexMap<String, Direction> =
        IndexMap::with_capacity(content.block_map().len());
    if let Some((previous_content, previous_map)) = previous {
        let unchanged = content
            .blocks()
            .zip(previous_content.blocks())
            .zip(previous_map.iter())
            .take_while(|((block, previous_block), (key, _))| {
                Arc::ptr_eq(*block, *previous_block) && block.key() == key.as_str()
            });
        for (_, (key, direction)) in unchanged {
            next.insert(key.clone(), *direction);
        }
    }

    let mut service = BidiService::default();
    if let Some((_, direction)) = next.last() {
        service.last_direction = *direction;
    }
    for block in content.blocks().skip(next.len()) {
        let direction = service.direction(&block.text_string());
        next.insert(block.key().to_owned(), direction);
    }

    match previous {
        Some((_, previous)) if previous.iter().eq(next.iter()) => previous.clone(),
        _ => Arc::new(next),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::{direction_map, first_strong_direction, BidiService, Direction};
    use crate::{BlockMapUpdates, BlockType, ContentBlock, ContentState};

    #[test]
    fn first_strong_character_decides() {
        assert_eq!(first_strong_direction("hello"), Direction::Ltr);
        assert_eq!(first_strong_direction("שלום"), Direction::Rtl);
        assert_eq!(first_strong_direction("مرحبا"), Direction::Rtl);
        assert_eq!(first_strong_direction("123 שלום abc"), Direction::Rtl);
        assert_eq!(first_strong_direction("123 abc שלום"), Direction::Ltr);
        assert_eq!(first_strong_direction("42 !?"), Direction::Neutral);
        assert_eq!(first_strong_direction(""), Direction::Neutral);
    }

    #[test]
    fn neutral_text_inherits_the_last_direction() {
        let mut service = BidiService::default();
        assert_eq!(service.direction("123"), Direction::Ltr);
        assert_eq!(service.direction("שלום"), Direction::Rtl);
        assert_eq!(service.direction("123"), Direction::Rtl);
        service.reset();
        assert_eq!(service.direction(""), Direction::Ltr);
    }

    #[test]
    fn direction_map_covers_every_block() {
        let content = ContentState::create_from_text("abc\nשלום\n...\nxyz");
        let map = direction_map(&content, None);
        let directions: Vec<Direction> = map.values().copied().collect();
        assert_eq!(
            directions,
            vec![
                Direction::Ltr,
                Direction::Rtl,
                Direction::Rtl,
                Direction::Ltr
            ]
        );
    }

    #[test]
    fn unchanged_direction_map_keeps_its_identity() {
        let content = ContentState::create_from_text("abc\nשלום");
        let first = direction_map(&content, None);
        let second = direction_map(&content, Some((&content, &first)));
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn reordered_blocks_get_a_new_map() {
        let content = ContentState::create_from_text("abc\nשלום");
        let first = direction_map(&content, None);
        let first_key = content.first_block().unwrap().key().to_owned();
        let block = content.first_block().unwrap().clone();

        let mut removal = BlockMapUpdates::new();
        removal.insert(first_key.clone(), None);
        let mut append = BlockMapUpdates::new();
        append.insert(first_key.clone(), Some(block));
        let moved = content.block_map().merge(removal).merge(append);
        let reordered = content.with_block_map(moved);

        let second = direction_map(&reordered, Some((&content, &first)));
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(second.keys().last(), Some(&first_key));
        // The Hebrew block now comes first, so "abc" is still left to right
        assert_eq!(
            second.values().copied().collect::<Vec<_>>(),
            vec![Direction::Rtl, Direction::Ltr]
        );
    }

    #[test]
    fn leading_blocks_resume_the_last_direction() {
        let content = ContentState::create_from_text("שלום\n123");
        let first = direction_map(&content, None);
        let last_key = content.last_block().unwrap().key().to_owned();
        let edited = ContentBlock::new(last_key.as_str(), BlockType::Unstyled, "456");
        let mut updates = BlockMapUpdates::new();
        updates.insert(last_key.clone(), Some(Arc::new(edited)));
        let edited = content.with_block_map(content.block_map().merge(updates));

        let second = direction_map(&edited, Some((&content, &first)));
        assert_eq!(second.get(&last_key), Some(&Direction::Rtl));
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn names_are_uppercase() {
        assert_eq!(Direction::Rtl.to_string(), "RTL");
        assert_eq!("LTR".parse::<Direction>().unwrap(), Direction::Ltr);
    }
}

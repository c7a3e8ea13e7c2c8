// Copyright (c) 2026 Element Creations Ltd
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

//! A single block of text: one paragraph, list item, heading, etc.
//!
//! Text is stored as UTF-16 code units, consistent with the offsets used by
//! platform text APIs. The character list always has exactly one
//! [`CharacterMetadata`] per code unit.

use serde_json::{Map, Value};
use widestring::{U16Str, U16String};

use crate::character_metadata::{CharacterMetadata, StyleSet};
use crate::find_ranges::find_ranges;
use crate::BlockType;

/// Arbitrary JSON attached to a block.
pub type BlockData = Map<String, Value>;

#[derive(Clone, Debug, PartialEq)]
pub struct ContentBlock {
    key: String,
    block_type: BlockType,
    text: U16String,
    characters: Vec<CharacterMetadata>,
    depth: usize,
    data: BlockData,
}

impl ContentBlock {
    /// An unstyled-text block of `block_type`.
    pub fn new(
        key: impl Into<String>,
        block_type: BlockType,
        text: &str,
    ) -> Self {
        let text = U16String::from_str(text);
        let characters = vec![CharacterMetadata::empty(); text.len()];
        Self {
            key: key.into(),
            block_type,
            text,
            characters,
            depth: 0,
            data: BlockData::new(),
        }
    }

    /// Build a block from its parts.
    ///
    /// A character list whose length does not match the text is padded with
    /// empty metadata or truncated, and a warning is logged.
    pub fn from_parts(
        key: impl Into<String>,
        block_type: BlockType,
        text: U16String,
        mut characters: Vec<CharacterMetadata>,
        depth: usize,
        data: BlockData,
    ) -> Self {
        let key = key.into();
        if characters.len() != text.len() {
            tracing::warn!(
                block = %key,
                text_len = text.len(),
                characters_len = characters.len(),
                "character list does not match block text; normalising"
            );
            characters.resize(text.len(), CharacterMetadata::empty());
        }
        Self {
            key,
            block_type,
            text,
            characters,
            depth,
            data,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn block_type(&self) -> &BlockType {
        &self.block_type
    }

    pub fn text(&self) -> &U16Str {
        &self.text
    }

    /// The text decoded to a Rust string (lone surrogates become U+FFFD).
    pub fn text_string(&self) -> String {
        self.text.to_string_lossy()
    }

    pub fn characters(&self) -> &[CharacterMetadata] {
        &self.characters
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn data(&self) -> &BlockData {
        &self.data
    }

    /// Length in UTF-16 code units.
    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Styles of the character at `offset`; empty when out of range.
    pub fn inline_style_at(&self, offset: usize) -> StyleSet {
        self.characters
            .get(offset)
            .map(|c| c.style().clone())
            .unwrap_or_default()
    }

    /// Entity key of the character at `offset`.
    pub fn entity_at(&self, offset: usize) -> Option<&str> {
        self.characters.get(offset).and_then(CharacterMetadata::entity)
    }

    /// Report runs of characters with identical styles that pass `filter`.
    pub fn find_style_ranges<F, C>(&self, filter: F, found: C)
    where
        F: FnMut(&CharacterMetadata) -> bool,
        C: FnMut(usize, usize),
    {
        find_ranges(
            &self.characters,
            CharacterMetadata::same_style,
            filter,
            found,
        );
    }

    /// Report runs of characters with the same entity that pass `filter`.
    pub fn find_entity_ranges<F, C>(&self, filter: F, found: C)
    where
        F: FnMut(&CharacterMetadata) -> bool,
        C: FnMut(usize, usize),
    {
        find_ranges(
            &self.characters,
            CharacterMetadata::same_entity,
            filter,
            found,
        );
    }

    pub fn with_key(&self, key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..self.clone()
        }
    }

    pub fn with_type(&self, block_type: BlockType) -> Self {
        Self {
            block_type,
            ..self.clone()
        }
    }

    pub fn with_depth(&self, depth: usize) -> Self {
        Self {
            depth,
            ..self.clone()
        }
    }

    pub fn with_data(&self, data: BlockData) -> Self {
        Self {
            data,
            ..self.clone()
        }
    }

    /// Replace the text and characters, keeping key, type, depth and data.
    pub(crate) fn with_content(
        &self,
        text: Vec<u16>,
        characters: Vec<CharacterMetadata>,
    ) -> Self {
        Self::from_parts(
            self.key.clone(),
            self.block_type.clone(),
            U16String::from_vec(text),
            characters,
            self.depth,
            self.data.clone(),
        )
    }

    /// Units and characters of `[start, end)`, clamped to the block.
    pub(crate) fn slice(
        &self,
        start: usize,
        end: usize,
    ) -> (&[u16], &[CharacterMetadata]) {
        let end = end.min(self.len());
        let start = start.min(end);
        (
            &self.text.as_slice()[start..end],
            &self.characters[start..end],
        )
    }

    /// The block with `[start, end)` replaced by `units`/`characters`.
    pub(crate) fn splice(
        &self,
        start: usize,
        end: usize,
        units: &[u16],
        characters: &[CharacterMetadata],
    ) -> Self {
        let (head_units, head_chars) = self.slice(0, start);
        let (tail_units, tail_chars) = self.slice(end.max(start), self.len());
        self.with_content(
            [head_units, units, tail_units].concat(),
            [head_chars, characters, tail_chars].concat(),
        )
    }

    /// Apply `op` to every character of `[start, end)`.
    ///
    /// Returns `None` if `op` left every character untouched, so callers can
    /// keep the original block allocation.
    pub(crate) fn map_characters<F>(
        &self,
        start: usize,
        end: usize,
        mut op: F,
    ) -> Option<Self>
    where
        F: FnMut(&CharacterMetadata) -> CharacterMetadata,
    {
        let end = end.min(self.len());
        let mut characters: Option<Vec<CharacterMetadata>> = None;
        for index in start.min(end)..end {
            let current = &self.characters[index];
            let next = op(current);
            if CharacterMetadata::ptr_eq(current, &next) {
                continue;
            }
            characters.get_or_insert_with(|| self.characters.clone())[index] =
                next;
        }
        characters.map(|characters| Self {
            characters,
            ..self.clone()
        })
    }
}

#[cfg(test)]
mod tests {
    use widestring::U16String;

    use super::{BlockData, ContentBlock};
    use crate::{BlockType, CharacterMetadata, StyleSet};

    fn bold() -> CharacterMetadata {
        CharacterMetadata::empty().apply_style("BOLD")
    }

    fn sample() -> ContentBlock {
        // "abcde" with "bc" bold and "de" in entity 1
        let plain = CharacterMetadata::empty();
        let linked = plain.apply_entity(Some("1"));
        ContentBlock::from_parts(
            "k",
            BlockType::Unstyled,
            U16String::from_str("abcde"),
            vec![plain, bold(), bold(), linked.clone(), linked],
            0,
            BlockData::new(),
        )
    }

    #[test]
    fn new_block_has_one_character_per_code_unit() {
        let block = ContentBlock::new("k", BlockType::Unstyled, "a\u{1F4A9}b");
        assert_eq!(block.len(), 4);
        assert_eq!(block.characters().len(), 4);
        assert_eq!(block.text_string(), "a\u{1F4A9}b");
    }

    #[test]
    fn from_parts_normalises_character_list() {
        let block = ContentBlock::from_parts(
            "k",
            BlockType::Unstyled,
            U16String::from_str("abc"),
            vec![bold()],
            0,
            BlockData::new(),
        );
        assert_eq!(block.characters().len(), 3);
        assert_eq!(block.characters()[2], CharacterMetadata::empty());
    }

    #[test]
    fn style_and_entity_lookups() {
        let block = sample();
        assert!(block.inline_style_at(1).contains("BOLD"));
        assert_eq!(block.inline_style_at(99), StyleSet::new());
        assert_eq!(block.entity_at(3), Some("1"));
        assert_eq!(block.entity_at(0), None);
    }

    #[test]
    fn find_style_ranges_reports_runs() {
        let mut ranges = Vec::new();
        sample().find_style_ranges(|c| c.has_style("BOLD"), |s, e| {
            ranges.push((s, e))
        });
        assert_eq!(ranges, vec![(1, 3)]);
    }

    #[test]
    fn find_entity_ranges_reports_runs() {
        let mut ranges = Vec::new();
        sample().find_entity_ranges(|c| c.entity().is_some(), |s, e| {
            ranges.push((s, e))
        });
        assert_eq!(ranges, vec![(3, 5)]);
    }

    #[test]
    fn splice_replaces_text_and_characters() {
        let block = sample();
        let units: Vec<u16> = "XY".encode_utf16().collect();
        let spliced = block.splice(
            1,
            3,
            &units,
            &[CharacterMetadata::empty(), CharacterMetadata::empty()],
        );
        assert_eq!(spliced.text_string(), "aXYde");
        assert!(spliced.inline_style_at(1).is_empty());
        assert_eq!(spliced.entity_at(3), Some("1"));
        assert_eq!(spliced.key(), "k");
    }

    #[test]
    fn map_characters_reports_no_change() {
        let block = sample();
        assert!(block.map_characters(1, 3, |c| c.apply_style("BOLD")).is_none());
        let changed = block
            .map_characters(0, 1, |c| c.apply_style("BOLD"))
            .unwrap();
        assert!(changed.inline_style_at(0).contains("BOLD"));
    }
}

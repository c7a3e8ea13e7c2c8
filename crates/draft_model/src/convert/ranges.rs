// Copyright (c) 2026 Element Creations Ltd
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

//! Conversion between per-character metadata and raw code point ranges.

use std::collections::HashMap;

use indexmap::IndexSet;
use widestring::U16Str;

use crate::character_metadata::StyleSet;
use crate::convert::raw::{RawEntityRange, RawInlineStyleRange};
use crate::find_ranges::find_ranges;
use crate::ContentBlock;

/// Number of code points in `units`. A lone surrogate counts as one.
fn code_point_len(units: &[u16]) -> usize {
    char::decode_utf16(units.iter().copied()).count()
}

/// UTF-16 offset of each code point of `text`, followed by the text length.
fn code_point_offsets(text: &U16Str) -> Vec<usize> {
    let mut offsets = Vec::with_capacity(text.len() + 1);
    let mut units = 0;
    for decoded in char::decode_utf16(text.as_slice().iter().copied()) {
        offsets.push(units);
        units += decoded.map_or(1, char::len_utf16);
    }
    offsets.push(units);
    offsets
}

/// The UTF-16 span of a raw `(offset, length)` range, clamped to the text.
fn utf16_span(offsets: &[usize], offset: usize, length: usize) -> (usize, usize) {
    let last = offsets.len() - 1;
    let start = offset.min(last);
    let end = offset.saturating_add(length).min(last);
    (offsets[start], offsets[end])
}

/// One range per maximal run of each style, grouped by style in order of
/// first appearance.
pub fn encode_inline_style_ranges(block: &ContentBlock) -> Vec<RawInlineStyleRange> {
    let units = block.text().as_slice();
    let styles: IndexSet<&str> = block
        .characters()
        .iter()
        .flat_map(|character| character.style().iter())
        .collect();

    let mut ranges = Vec::new();
    for style in styles {
        let has_style: Vec<bool> = block
            .characters()
            .iter()
            .map(|character| character.has_style(style))
            .collect();
        find_ranges(
            &has_style,
            |a, b| a == b,
            |has| *has,
            |start, end| {
                ranges.push(RawInlineStyleRange {
                    style: style.to_owned(),
                    offset: code_point_len(&units[..start]),
                    length: code_point_len(&units[start..end]),
                })
            },
        );
    }
    ranges
}

/// One range per run of a single entity, keyed through `storage_keys`.
/// Entities missing from `storage_keys` are skipped.
pub fn encode_entity_ranges(
    block: &ContentBlock,
    storage_keys: &HashMap<String, usize>,
) -> Vec<RawEntityRange> {
    let units = block.text().as_slice();
    let mut ranges = Vec::new();
    block.find_entity_ranges(
        |character| character.entity().is_some(),
        |start, end| {
            let Some(&key) = block
                .entity_at(start)
                .and_then(|entity| storage_keys.get(entity))
            else {
                return;
            };
            ranges.push(RawEntityRange {
                key,
                offset: code_point_len(&units[..start]),
                length: code_point_len(&units[start..end]),
            });
        },
    );
    ranges
}

/// The style set of every UTF-16 unit of `text`.
pub fn decode_inline_style_ranges(
    text: &U16Str,
    ranges: &[RawInlineStyleRange],
) -> Vec<StyleSet> {
    let offsets = code_point_offsets(text);
    let mut styles = vec![StyleSet::new(); text.len()];
    for range in ranges {
        let (start, end) = utf16_span(&offsets, range.offset, range.length);
        for style in &mut styles[start..end] {
            *style = style.with(&range.style);
        }
    }
    styles
}

/// The entity key of every UTF-16 unit of `text`.
///
/// `local_keys` maps raw keys to keys of the document being built; ranges
/// whose raw key it lacks are dropped.
pub fn decode_entity_ranges(
    text: &U16Str,
    ranges: &[RawEntityRange],
    local_keys: &HashMap<usize, String>,
) -> Vec<Option<String>> {
    let offsets = code_point_offsets(text);
    let mut entities = vec![None; text.len()];
    for range in ranges {
        let Some(key) = local_keys.get(&range.key) else {
            tracing::debug!(key = range.key, "dropping range of unknown entity");
            continue;
        };
        let (start, end) = utf16_span(&offsets, range.offset, range.length);
        entities[start..end].fill(Some(key.clone()));
    }
    entities
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use widestring::U16String;

    use super::{
        decode_entity_ranges, decode_inline_style_ranges,
        encode_entity_ranges, encode_inline_style_ranges,
    };
    use crate::convert::raw::{RawEntityRange, RawInlineStyleRange};
    use crate::transaction::{apply_entity_to_content_state, inline_style};
    use crate::{BlockType, ContentBlock, ContentState, EntityData, Mutability, SelectionState};

    fn style_range(style: &str, offset: usize, length: usize) -> RawInlineStyleRange {
        RawInlineStyleRange {
            style: style.to_owned(),
            offset,
            length,
        }
    }

    fn content(text: &str) -> ContentState {
        ContentState::create_from_block_array(
            [ContentBlock::new("a", BlockType::Unstyled, text)],
            None,
        )
    }

    fn range(start: usize, end: usize) -> SelectionState {
        SelectionState::new("a", start, "a", end)
    }

    #[test]
    fn style_ranges_count_code_points() {
        // The emoji is one code point but two UTF-16 units
        let content = inline_style::add(&content("a😀bc"), &range(1, 4), "BOLD")
            .unwrap();
        let content = inline_style::add(&content, &range(0, 1), "ITALIC").unwrap();
        let content = inline_style::add(&content, &range(4, 5), "ITALIC").unwrap();
        let block = content.block_for_key("a").unwrap();

        let mut ranges = encode_inline_style_ranges(block);
        ranges.sort_by(|a, b| (&a.style, a.offset).cmp(&(&b.style, b.offset)));
        assert_eq!(
            ranges,
            vec![
                style_range("BOLD", 1, 2),
                style_range("ITALIC", 0, 1),
                style_range("ITALIC", 3, 1),
            ]
        );
    }

    #[test]
    fn decoding_styles_maps_back_to_utf16() {
        let text = U16String::from_str("a😀bc");
        let styles = decode_inline_style_ranges(
            &text,
            &[style_range("BOLD", 1, 2), style_range("CODE", 2, 10)],
        );
        let bold: Vec<bool> = styles.iter().map(|s| s.contains("BOLD")).collect();
        assert_eq!(bold, vec![false, true, true, true, false]);
        let code: Vec<bool> = styles.iter().map(|s| s.contains("CODE")).collect();
        assert_eq!(code, vec![false, false, false, true, true]);
    }

    #[test]
    fn entity_ranges_use_storage_keys() {
        let (content, key) =
            content("😀 link").create_entity("LINK", Mutability::Mutable, EntityData::new());
        let content =
            apply_entity_to_content_state(&content, &range(3, 7), Some(key.as_str()))
                .unwrap();
        let block = content.block_for_key("a").unwrap();

        let storage = HashMap::from([(key.clone(), 0)]);
        assert_eq!(
            encode_entity_ranges(block, &storage),
            vec![RawEntityRange {
                key: 0,
                offset: 2,
                length: 4
            }]
        );
        assert!(encode_entity_ranges(block, &HashMap::new()).is_empty());
    }

    #[test]
    fn unknown_entity_keys_are_dropped() {
        let text = U16String::from_str("abcd");
        let local = HashMap::from([(0, "7".to_owned())]);
        let entities = decode_entity_ranges(
            &text,
            &[
                RawEntityRange {
                    key: 0,
                    offset: 0,
                    length: 2,
                },
                RawEntityRange {
                    key: 1,
                    offset: 2,
                    length: 2,
                },
            ],
            &local,
        );
        assert_eq!(
            entities,
            vec![Some("7".to_owned()), Some("7".to_owned()), None, None]
        );
    }
}

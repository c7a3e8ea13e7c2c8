// Copyright (c) 2026 Element Creations Ltd
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

//! Conversion to and from the raw document format used for storage and
//! transport.
//!
//! Converting to raw renumbers the entities used by the blocks densely from
//! 0, in order of first appearance; entities no block refers to are left
//! out. Converting from raw creates fresh entities in a new entity map.

mod ranges;
mod raw;

use std::collections::HashMap;

use widestring::U16String;

pub use ranges::{
    decode_entity_ranges, decode_inline_style_ranges,
    encode_entity_ranges, encode_inline_style_ranges,
};
pub use raw::{
    RawDraftContentBlock, RawDraftContentState, RawDraftEntity,
    RawEntityRange, RawInlineStyleRange,
};

use crate::error::{ConvertError, Result};
use crate::keys::generate_random_key;
use crate::{
    BlockType, CharacterMetadata, ContentBlock, ContentState, EntityMap,
};

/// The raw form of `content`.
///
/// Fails if a block refers to an entity missing from the entity map.
pub fn convert_to_raw(content: &ContentState) -> Result<RawDraftContentState> {
    let mut storage_keys: HashMap<String, usize> = HashMap::new();
    let mut used_entities = Vec::new();
    for block in content.blocks() {
        block.find_entity_ranges(
            |character| character.entity().is_some(),
            |start, _| {
                if let Some(entity) = block.entity_at(start) {
                    if !storage_keys.contains_key(entity) {
                        storage_keys.insert(entity.to_owned(), used_entities.len());
                        used_entities.push(entity.to_owned());
                    }
                }
            },
        );
    }

    let blocks = content
        .blocks()
        .map(|block| RawDraftContentBlock {
            key: Some(block.key().to_owned()),
            text: block.text_string(),
            block_type: Some(block.block_type().as_str().to_owned()),
            depth: block.depth(),
            inline_style_ranges: encode_inline_style_ranges(block),
            entity_ranges: encode_entity_ranges(block, &storage_keys),
            data: block.data().clone(),
        })
        .collect();

    let entity_map = used_entities
        .iter()
        .enumerate()
        .map(|(index, key)| {
            let entity = content.entity(key)?;
            Ok((
                index.to_string(),
                RawDraftEntity {
                    entity_type: entity.entity_type().to_owned(),
                    mutability: entity.mutability(),
                    data: entity.data().clone(),
                },
            ))
        })
        .collect::<Result<_>>()?;

    Ok(RawDraftContentState { blocks, entity_map })
}

/// Build a document from its raw form, filling in defaults for missing
/// fields.
pub fn convert_from_raw(raw: &RawDraftContentState) -> ContentState {
    let mut entity_map = EntityMap::new();
    let mut local_keys: HashMap<usize, String> = HashMap::new();
    for (raw_key, entity) in &raw.entity_map {
        let key = entity_map.create(
            entity.entity_type.clone(),
            entity.mutability,
            entity.data.clone(),
        );
        match raw_key.parse::<usize>() {
            Ok(raw_key) => {
                local_keys.insert(raw_key, key);
            }
            Err(_) => {
                tracing::warn!(key = %raw_key, "ignoring entity with a non-numeric key")
            }
        }
    }

    let blocks = raw.blocks.iter().map(|block| {
        let text = U16String::from_str(&block.text);
        let styles = decode_inline_style_ranges(&text, &block.inline_style_ranges);
        let entities =
            decode_entity_ranges(&text, &block.entity_ranges, &local_keys);
        let characters = styles
            .iter()
            .zip(&entities)
            .map(|(style, entity)| CharacterMetadata::create(style, entity.as_deref()))
            .collect();

        ContentBlock::from_parts(
            block.key.clone().unwrap_or_else(generate_random_key),
            block
                .block_type
                .as_deref()
                .map_or(BlockType::Unstyled, BlockType::parse),
            text,
            characters,
            block.depth,
            block.data.clone(),
        )
    });

    ContentState::create_from_block_array(blocks, Some(entity_map))
}

/// Serialize `content` as raw JSON.
pub fn convert_to_json(content: &ContentState) -> Result<String, ConvertError> {
    Ok(serde_json::to_string(&convert_to_raw(content)?)?)
}

/// Parse raw JSON into a document.
pub fn convert_from_json(json: &str) -> Result<ContentState, ConvertError> {
    let raw: RawDraftContentState = serde_json::from_str(json)?;
    Ok(convert_from_raw(&raw))
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use serde_json::json;
    use speculoos::prelude::*;

    use super::{convert_from_json, convert_from_raw, convert_to_json, convert_to_raw};
    use crate::error::ConvertError;
    use crate::{modifier, BlockType, ContentState, EntityData, Mutability, SelectionState};

    const DOCUMENT: &str = indoc! {r#"
        {
            "blocks": [
                {
                    "key": "first",
                    "text": "Hello 😀 world",
                    "type": "header-one",
                    "depth": 0,
                    "inlineStyleRanges": [
                        { "style": "BOLD", "offset": 0, "length": 5 },
                        { "style": "ITALIC", "offset": 8, "length": 5 }
                    ],
                    "entityRanges": [{ "key": 5, "offset": 8, "length": 5 }],
                    "data": { "align": "left" }
                },
                {
                    "key": "second",
                    "text": "item",
                    "type": "unordered-list-item",
                    "depth": 2
                }
            ],
            "entityMap": {
                "5": { "type": "LINK", "mutability": "MUTABLE", "data": { "url": "https://example.org" } }
            }
        }
    "#};

    #[test]
    fn from_raw_builds_blocks_and_entities() {
        let content = convert_from_json(DOCUMENT).unwrap();
        let first = content.block_for_key("first").unwrap();
        assert_eq!(first.block_type(), &BlockType::HeaderOne);
        assert_eq!(first.data()["align"], "left");
        assert!(first.characters()[4].has_style("BOLD"));
        assert!(!first.characters()[5].has_style("BOLD"));
        // "world" starts at code point 8, UTF-16 unit 9
        assert!(!first.characters()[8].has_style("ITALIC"));
        assert!(first.characters()[9].has_style("ITALIC"));

        let entity_key = first.entity_at(9).unwrap();
        let entity = content.entity(entity_key).unwrap();
        assert_eq!(entity.entity_type(), "LINK");
        assert_eq!(entity.data()["url"], "https://example.org");

        let second = content.block_for_key("second").unwrap();
        assert_eq!(second.depth(), 2);
        assert!(second.data().is_empty());
    }

    #[test]
    fn round_trip_preserves_ranges_and_renumbers_entities() {
        let content = convert_from_json(DOCUMENT).unwrap();
        let raw = convert_to_raw(&content).unwrap();

        assert_eq!(raw.entity_map.keys().collect::<Vec<_>>(), vec!["0"]);
        let first = &raw.blocks[0];
        assert_eq!(first.key.as_deref(), Some("first"));
        assert_eq!(first.block_type.as_deref(), Some("header-one"));
        assert_eq!(first.entity_ranges[0].key, 0);
        assert_eq!(
            (first.entity_ranges[0].offset, first.entity_ranges[0].length),
            (8, 5)
        );
        let mut styles: Vec<(String, usize, usize)> = first
            .inline_style_ranges
            .iter()
            .map(|r| (r.style.clone(), r.offset, r.length))
            .collect();
        styles.sort();
        assert_eq!(
            styles,
            vec![("BOLD".to_owned(), 0, 5), ("ITALIC".to_owned(), 8, 5)]
        );
        assert_eq!(raw.blocks[1].depth, 2);
        assert_eq!(raw.blocks[1].block_type.as_deref(), Some("unordered-list-item"));

        let again = convert_to_raw(&convert_from_raw(&raw)).unwrap();
        assert_eq!(again, raw);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let content = convert_from_json(r#"{ "blocks": [{ "text": "plain" }] }"#).unwrap();
        let block = content.first_block().unwrap();
        assert_eq!(block.block_type(), &BlockType::Unstyled);
        assert!(!block.key().is_empty());
        assert_eq!(block.depth(), 0);
        assert!(block.characters().iter().all(|c| c.style().is_empty()));
    }

    #[test]
    fn unused_entities_are_left_out() {
        let content = ContentState::create_from_text("abc");
        let (content, _) =
            content.create_entity("LINK", Mutability::Mutable, EntityData::new());
        let (content, used) =
            content.create_entity("MENTION", Mutability::Immutable, EntityData::new());
        let key = content.first_block().unwrap().key().to_owned();
        let content = modifier::apply_entity(
            &content,
            &SelectionState::new(&key, 0, &key, 1),
            Some(used.as_str()),
        )
        .unwrap();

        let raw = convert_to_raw(&content).unwrap();
        assert_eq!(raw.entity_map.len(), 1);
        assert_eq!(raw.entity_map["0"].entity_type, "MENTION");
    }

    #[test]
    fn json_output_is_camel_case() {
        let content = convert_from_json(DOCUMENT).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&convert_to_json(&content).unwrap()).unwrap();
        assert_eq!(value["blocks"][0]["inlineStyleRanges"][0]["style"], "BOLD");
        assert_eq!(value["blocks"][0]["entityRanges"][0]["key"], json!(0));
        assert_eq!(value["entityMap"]["0"]["mutability"], "MUTABLE");
    }

    #[test]
    fn invalid_json_is_an_error() {
        assert_that!(matches!(
            convert_from_json("{ \"blocks\": 3 }"),
            Err(ConvertError::Json(_))
        ))
        .is_true();
    }
}

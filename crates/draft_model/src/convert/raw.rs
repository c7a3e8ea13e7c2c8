// Copyright (c) 2026 Element Creations Ltd
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

//! The raw, JSON-friendly shape of a document.
//!
//! Offsets and lengths in the raw format count Unicode code points, not
//! UTF-16 units. Entity keys are small integers local to one raw document.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

use crate::{BlockData, EntityData, Mutability};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDraftContentState {
    pub blocks: Vec<RawDraftContentBlock>,
    #[serde(default)]
    pub entity_map: IndexMap<String, RawDraftEntity>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDraftContentBlock {
    /// A random key is generated when missing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default)]
    pub text: String,
    /// `unstyled` when missing.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub block_type: Option<String>,
    #[serde(default)]
    pub depth: usize,
    #[serde(default)]
    pub inline_style_ranges: Vec<RawInlineStyleRange>,
    #[serde(default)]
    pub entity_ranges: Vec<RawEntityRange>,
    #[serde(default)]
    pub data: BlockData,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawInlineStyleRange {
    pub style: String,
    pub offset: usize,
    pub length: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEntityRange {
    /// Key into [`RawDraftContentState::entity_map`]. Accepted as a number
    /// or a numeric string; always written as a number.
    #[serde(deserialize_with = "number_or_string")]
    pub key: usize,
    pub offset: usize,
    pub length: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawDraftEntity {
    #[serde(rename = "type")]
    pub entity_type: String,
    pub mutability: Mutability,
    #[serde(default)]
    pub data: EntityData,
}

fn number_or_string<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Key {
        Number(usize),
        String(String),
    }

    match Key::deserialize(deserializer)? {
        Key::Number(key) => Ok(key),
        Key::String(key) => key.parse().map_err(serde::de::Error::custom),
    }
}

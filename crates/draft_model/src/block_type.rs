// Copyright (c) 2026 Element Creations Ltd
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

//! Block-level types.
//!
//! The names are the strings used on the wire (see [`crate::convert`]).
//! Unknown names parse into [`BlockType::Custom`] so that embedders can
//! define their own block kinds.

use std::fmt;
use std::str::FromStr;

use strum_macros::{EnumString, IntoStaticStr};

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, EnumString, IntoStaticStr)]
#[strum(serialize_all = "kebab-case")]
pub enum BlockType {
    #[default]
    Unstyled,
    Paragraph,
    HeaderOne,
    HeaderTwo,
    HeaderThree,
    HeaderFour,
    HeaderFive,
    HeaderSix,
    UnorderedListItem,
    OrderedListItem,
    Blockquote,
    CodeBlock,
    Atomic,
    #[strum(default)]
    Custom(String),
}

impl BlockType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Custom(name) => name,
            other => <&'static str>::from(other),
        }
    }

    pub fn is_list_item(&self) -> bool {
        matches!(self, Self::UnorderedListItem | Self::OrderedListItem)
    }

    /// Parse a wire name, falling back to `unstyled` for an empty string.
    pub fn parse(name: &str) -> Self {
        if name.is_empty() {
            return Self::Unstyled;
        }
        Self::from_str(name).unwrap_or_else(|_| Self::Custom(name.to_owned()))
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

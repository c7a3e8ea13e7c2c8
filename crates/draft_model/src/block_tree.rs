// Copyright (c) 2026 Element Creations Ltd
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

//! The render partition of a block.
//!
//! A block is cut into [`DecoratorRange`]s wherever the decoration key
//! changes, and each of those into [`LeafRange`]s wherever the inline style
//! changes. A renderer emits one component per decorator range and one
//! styled span per leaf. Offsets are UTF-16 and block-absolute.

use std::sync::Arc;

use crate::character_metadata::CharacterMetadata;
use crate::decorator::Decorator;
use crate::find_ranges::find_ranges;
use crate::{ContentBlock, ContentState};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LeafRange {
    pub start: usize,
    pub end: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecoratorRange {
    pub start: usize,
    pub end: usize,
    pub decorator_key: Option<String>,
    pub leaves: Vec<LeafRange>,
}

/// The cached tree of one block.
pub type BlockTree = Arc<[DecoratorRange]>;

/// Compute the tree of `block`, asking `decorator` (if any) for decorations.
pub fn generate(
    content: &ContentState,
    block: &ContentBlock,
    decorator: Option<&dyn Decorator>,
) -> BlockTree {
    let decorations =
        decorator.map(|decorator| decorator.decorations(block, content));
    generate_with_decorations(block, decorations.as_deref())
}

/// Compute the tree of `block` from precomputed decorations.
pub fn generate_with_decorations(
    block: &ContentBlock,
    decorations: Option<&[Option<String>]>,
) -> BlockTree {
    if block.is_empty() {
        return Arc::new([DecoratorRange {
            start: 0,
            end: 0,
            decorator_key: None,
            leaves: vec![LeafRange { start: 0, end: 0 }],
        }]);
    }

    let undecorated;
    let decorations = match decorations {
        Some(decorations) if decorations.len() == block.len() => decorations,
        other => {
            if let Some(decorations) = other {
                tracing::warn!(
                    block = block.key(),
                    decorations = decorations.len(),
                    text_len = block.len(),
                    "decorations do not cover the block; ignoring them"
                );
            }
            undecorated = vec![None; block.len()];
            &undecorated[..]
        }
    };

    let mut tree = Vec::new();
    find_ranges(
        decorations,
        |a, b| a == b,
        |_| true,
        |start, end| {
            tree.push(DecoratorRange {
                start,
                end,
                decorator_key: decorations[start].clone(),
                leaves: generate_leaves(
                    &block.characters()[start..end],
                    start,
                ),
            })
        },
    );
    tree.into()
}

fn generate_leaves(
    characters: &[CharacterMetadata],
    offset: usize,
) -> Vec<LeafRange> {
    let mut leaves = Vec::new();
    find_ranges(
        characters,
        CharacterMetadata::same_style,
        |_| true,
        |start, end| {
            leaves.push(LeafRange {
                start: start + offset,
                end: end + offset,
            })
        },
    );
    leaves
}

// Copyright (c) 2026 Element Creations Ltd
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

//! An immutable rich text document model and edit transaction engine.
//!
//! A [`ContentState`] is an ordered map of [`ContentBlock`]s plus the
//! document's entities. Edits in [`modifier`] and [`transaction`] map one
//! snapshot to the next and share every untouched block, and
//! [`EditorState`] pairs a snapshot with the selection and keeps the
//! render caches in step with it.

pub mod bidi;
mod block;
pub mod block_map;
pub mod block_tree;
mod block_type;
mod character_metadata;
pub mod commands;
mod content_state;
pub mod convert;
pub mod decorator;
mod editor_state;
mod entity;
mod error;
mod find_ranges;
mod keys;
pub mod modifier;
pub mod rich_utils;
mod selection;
pub mod transaction;

pub use crate::bidi::{BidiService, Direction, DirectionMap};
pub use crate::block::{BlockData, ContentBlock};
pub use crate::block_map::{merge_map_updates, BlockMap, BlockMapUpdates};
pub use crate::block_tree::{BlockTree, DecoratorRange, LeafRange};
pub use crate::block_type::BlockType;
pub use crate::character_metadata::{CharacterMetadata, StyleSet};
pub use crate::content_state::ContentState;
pub use crate::convert::{
    convert_from_json, convert_from_raw, convert_to_json, convert_to_raw,
    RawDraftContentState,
};
pub use crate::decorator::{
    CompositeDecorator, Decorator, DecoratorEntry, DecoratorStrategy,
};
pub use crate::editor_state::{
    ChangeType, EditorState, EditorStateConfig, EditorStatePatch, TreeMap,
};
pub use crate::entity::{DraftEntity, EntityData, EntityMap, Mutability};
pub use crate::error::{ConvertError, Result, TransactionError};
pub use crate::find_ranges::{collect_ranges, find_ranges};
pub use crate::keys::generate_random_key;
pub use crate::selection::SelectionState;
pub use crate::transaction::{MergeBlockData, RemovalDirection};

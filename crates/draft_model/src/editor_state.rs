// Copyright (c) 2026 Element Creations Ltd
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

//! The top-level editor snapshot.
//!
//! [`EditorState`] pairs the current [`ContentState`] with the live
//! selection, the decorator, and two per-block caches derived from them:
//! the render tree of each block and each block's text direction.
//! [`EditorState::set`] is the single place where a new snapshot is made,
//! and it keeps both caches consistent while recomputing as little as
//! possible.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use strum_macros::{AsRefStr, Display, EnumString};

use crate::bidi::{direction_map, DirectionMap};
use crate::block_tree::{self, BlockTree};
use crate::character_metadata::StyleSet;
use crate::decorator::Decorator;
use crate::{ContentState, SelectionState};

/// Render tree per block key, in block order.
pub type TreeMap = Arc<IndexMap<String, BlockTree>>;

/// What kind of edit produced the current content.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, AsRefStr, Display, EnumString,
)]
#[strum(serialize_all = "kebab-case")]
pub enum ChangeType {
    AdjustDepth,
    ApplyEntity,
    BackspaceCharacter,
    ChangeBlockData,
    ChangeBlockType,
    ChangeInlineStyle,
    /// Blocks reordered by the host through the block map.
    MoveBlock,
    DeleteCharacter,
    InsertCharacters,
    InsertFragment,
    RemoveRange,
    SplitBlock,
}

/// Fields to change in [`EditorState::set`]. `None` leaves a field as it is;
/// for optional fields `Some(None)` clears it.
#[derive(Clone, Default)]
pub struct EditorStatePatch {
    pub current_content: Option<ContentState>,
    pub selection: Option<SelectionState>,
    pub decorator: Option<Option<Arc<dyn Decorator>>>,
    pub direction_map: Option<DirectionMap>,
    pub force_selection: Option<bool>,
    pub in_composition_mode: Option<bool>,
    pub inline_style_override: Option<Option<StyleSet>>,
    pub last_change_type: Option<Option<ChangeType>>,
    pub natively_rendered_content: Option<Option<ContentState>>,
}

/// Everything needed to build an [`EditorState`] from scratch.
#[derive(Clone)]
pub struct EditorStateConfig {
    pub current_content: ContentState,
    pub decorator: Option<Arc<dyn Decorator>>,
    /// Defaults to a cursor at the start of the first block.
    pub selection: Option<SelectionState>,
    pub force_selection: bool,
    pub in_composition_mode: bool,
    pub inline_style_override: Option<StyleSet>,
    pub last_change_type: Option<ChangeType>,
}

impl EditorStateConfig {
    pub fn new(current_content: ContentState) -> Self {
        Self {
            current_content,
            decorator: None,
            selection: None,
            force_selection: false,
            in_composition_mode: false,
            inline_style_override: None,
            last_change_type: None,
        }
    }

    pub fn with_decorator(mut self, decorator: Arc<dyn Decorator>) -> Self {
        self.decorator = Some(decorator);
        self
    }

    pub fn with_selection(mut self, selection: SelectionState) -> Self {
        self.selection = Some(selection);
        self
    }
}

#[derive(Clone)]
struct EditorStateInner {
    current_content: ContentState,
    selection: SelectionState,
    decorator: Option<Arc<dyn Decorator>>,
    direction_map: DirectionMap,
    tree_map: TreeMap,
    force_selection: bool,
    in_composition_mode: bool,
    inline_style_override: Option<StyleSet>,
    last_change_type: Option<ChangeType>,
    natively_rendered_content: Option<ContentState>,
}

#[derive(Clone)]
pub struct EditorState(Arc<EditorStateInner>);

impl EditorState {
    pub fn create(config: EditorStateConfig) -> Self {
        let content = config.current_content;
        let tree_map = generate_new_tree_map(&content, config.decorator.as_deref());
        let direction_map = direction_map(&content, None);
        let selection = config.selection.unwrap_or_else(|| {
            content
                .first_block()
                .map(|block| SelectionState::create_empty(block.key()))
                .unwrap_or_default()
        });
        Self(Arc::new(EditorStateInner {
            current_content: content,
            selection,
            decorator: config.decorator,
            direction_map,
            tree_map,
            force_selection: config.force_selection,
            in_composition_mode: config.in_composition_mode,
            inline_style_override: config.inline_style_override,
            last_change_type: config.last_change_type,
            natively_rendered_content: None,
        }))
    }

    /// An editor over a single empty block.
    pub fn create_empty(decorator: Option<Arc<dyn Decorator>>) -> Self {
        Self::create_with_content(ContentState::create_empty(), decorator)
    }

    /// An editor over `content` with the cursor at its start.
    pub fn create_with_content(
        content: ContentState,
        decorator: Option<Arc<dyn Decorator>>,
    ) -> Self {
        if content.block_map().is_empty() {
            return Self::create_empty(decorator);
        }
        Self::create(EditorStateConfig {
            decorator,
            ..EditorStateConfig::new(content)
        })
    }

    // ───────────────────────────────────────────────────────────────────
    // Accessors
    // ───────────────────────────────────────────────────────────────────

    pub fn current_content(&self) -> &ContentState {
        &self.0.current_content
    }

    pub fn selection(&self) -> &SelectionState {
        &self.0.selection
    }

    pub fn decorator(&self) -> Option<&Arc<dyn Decorator>> {
        self.0.decorator.as_ref()
    }

    pub fn direction_map(&self) -> &DirectionMap {
        &self.0.direction_map
    }

    pub fn tree_map(&self) -> &TreeMap {
        &self.0.tree_map
    }

    pub fn block_tree(&self, block_key: &str) -> Option<&BlockTree> {
        self.0.tree_map.get(block_key)
    }

    pub fn must_force_selection(&self) -> bool {
        self.0.force_selection
    }

    pub fn is_in_composition_mode(&self) -> bool {
        self.0.in_composition_mode
    }

    pub fn inline_style_override(&self) -> Option<&StyleSet> {
        self.0.inline_style_override.as_ref()
    }

    pub fn last_change_type(&self) -> Option<ChangeType> {
        self.0.last_change_type
    }

    pub fn natively_rendered_content(&self) -> Option<&ContentState> {
        self.0.natively_rendered_content.as_ref()
    }

    /// Whether both handles refer to the same snapshot.
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }

    // ───────────────────────────────────────────────────────────────────
    // Transitions
    // ───────────────────────────────────────────────────────────────────

    /// Apply `patch`, regenerating the render trees that it invalidates.
    ///
    /// A new decorator regenerates every tree except those of unchanged
    /// blocks whose decorations are the same allocation under both
    /// decorators. New content regenerates the trees of blocks that are not
    /// the same allocation as before, and drops trees of removed blocks.
    pub fn set(&self, patch: EditorStatePatch) -> Self {
        let mut inner = (*self.0).clone();
        let existing_decorator = inner.decorator.clone();
        let decorator = patch
            .decorator
            .clone()
            .unwrap_or_else(|| existing_decorator.clone());
        let new_content = patch
            .current_content
            .clone()
            .unwrap_or_else(|| inner.current_content.clone());

        if !same_decorator(decorator.as_ref(), existing_decorator.as_ref()) {
            inner.tree_map = match (&decorator, &existing_decorator) {
                (Some(decorator), Some(existing)) => {
                    regenerate_tree_for_new_decorator(
                        &new_content,
                        &inner.current_content,
                        &inner.tree_map,
                        decorator.as_ref(),
                        existing.as_ref(),
                    )
                }
                _ => generate_new_tree_map(&new_content, decorator.as_deref()),
            };
            inner.decorator = decorator;
            inner.natively_rendered_content = None;
        } else if !ContentState::ptr_eq(&new_content, &inner.current_content) {
            inner.tree_map = regenerate_tree_for_new_blocks(
                &inner.current_content,
                &inner.tree_map,
                &new_content,
                decorator.as_deref(),
            );
        }

        let EditorStatePatch {
            current_content,
            selection,
            decorator: _,
            direction_map,
            force_selection,
            in_composition_mode,
            inline_style_override,
            last_change_type,
            natively_rendered_content,
        } = patch;
        if let Some(content) = current_content {
            inner.current_content = content;
        }
        if let Some(selection) = selection {
            inner.selection = selection;
        }
        if let Some(direction_map) = direction_map {
            inner.direction_map = direction_map;
        }
        if let Some(force_selection) = force_selection {
            inner.force_selection = force_selection;
        }
        if let Some(in_composition_mode) = in_composition_mode {
            inner.in_composition_mode = in_composition_mode;
        }
        if let Some(style) = inline_style_override {
            inner.inline_style_override = style;
        }
        if let Some(change_type) = last_change_type {
            inner.last_change_type = change_type;
        }
        if let Some(content) = natively_rendered_content {
            inner.natively_rendered_content = content;
        }
        Self(Arc::new(inner))
    }

    /// Make `content` current, as the result of an edit of `change_type`.
    ///
    /// The selection moves to `content.selection_after()`. Pushing the
    /// current content again returns this state unchanged.
    pub fn push(
        &self,
        content: ContentState,
        change_type: ChangeType,
        force_selection: bool,
    ) -> Self {
        if ContentState::ptr_eq(&self.0.current_content, &content) {
            return self.clone();
        }
        let direction_map = direction_map(
            &content,
            Some((&self.0.current_content, &self.0.direction_map)),
        );
        tracing::trace!(%change_type, "pushing content");
        let selection = content.selection_after().clone();
        self.set(EditorStatePatch {
            current_content: Some(content),
            direction_map: Some(direction_map),
            last_change_type: Some(Some(change_type)),
            selection: Some(selection),
            force_selection: Some(force_selection),
            inline_style_override: Some(None),
            ..Default::default()
        })
    }

    /// Adopt a selection reported by the platform, without forcing it back.
    pub fn accept_selection(&self, selection: SelectionState) -> Self {
        self.set(EditorStatePatch {
            selection: Some(selection),
            force_selection: Some(false),
            natively_rendered_content: Some(None),
            inline_style_override: Some(None),
            ..Default::default()
        })
    }

    /// Set a selection that the platform must render, focusing the editor.
    pub fn force_selection(&self, selection: SelectionState) -> Self {
        let selection = if selection.has_focus() {
            selection
        } else {
            selection.with_has_focus(true)
        };
        self.set(EditorStatePatch {
            selection: Some(selection),
            force_selection: Some(true),
            natively_rendered_content: Some(None),
            inline_style_override: Some(None),
            ..Default::default()
        })
    }

    /// Collapse the selection at the end of the last block.
    pub fn move_selection_to_end(&self) -> Self {
        let Some(last) = self.0.current_content.last_block() else {
            return self.clone();
        };
        let selection =
            SelectionState::new(last.key(), last.len(), last.key(), last.len());
        self.accept_selection(selection)
    }

    /// Move the cursor to the end and focus the editor there.
    pub fn move_focus_to_end(&self) -> Self {
        let moved = self.move_selection_to_end();
        let selection = moved.selection().clone();
        moved.force_selection(selection)
    }

    /// Styles to apply to the next typed character, overriding those of the
    /// surrounding text. `None` clears the override.
    pub fn set_inline_style_override(&self, style: Option<StyleSet>) -> Self {
        self.set(EditorStatePatch {
            inline_style_override: Some(style),
            ..Default::default()
        })
    }

    pub fn set_composition_mode(&self, in_composition_mode: bool) -> Self {
        self.set(EditorStatePatch {
            in_composition_mode: Some(in_composition_mode),
            ..Default::default()
        })
    }

    pub fn set_decorator(&self, decorator: Option<Arc<dyn Decorator>>) -> Self {
        self.set(EditorStatePatch {
            decorator: Some(decorator),
            ..Default::default()
        })
    }

    // ───────────────────────────────────────────────────────────────────
    // Queries
    // ───────────────────────────────────────────────────────────────────

    /// The styles the next typed character would get.
    ///
    /// The override wins. Otherwise a cursor takes the style of the
    /// character before it (or the first character of its block), and a
    /// range takes the style of its first character. Empty positions look
    /// upwards for the closest preceding character.
    pub fn current_inline_style(&self) -> StyleSet {
        if let Some(style) = &self.0.inline_style_override {
            return style.clone();
        }
        let content = &self.0.current_content;
        let selection = &self.0.selection;
        let key = selection.start_key();
        let offset = selection.start_offset();
        let Some(block) = content.block_for_key(key) else {
            return StyleSet::new();
        };

        if selection.is_collapsed() {
            if offset > 0 {
                return block.inline_style_at(offset - 1);
            }
            if !block.is_empty() {
                return block.inline_style_at(0);
            }
        } else {
            if offset < block.len() {
                return block.inline_style_at(offset);
            }
            if offset > 0 {
                return block.inline_style_at(offset - 1);
            }
        }
        look_upward_for_inline_style(content, key)
    }

    pub fn is_selection_at_start_of_content(&self) -> bool {
        self.0
            .current_content
            .first_block()
            .is_some_and(|first| self.0.selection.has_edge_within(first.key(), 0, 0))
    }

    pub fn is_selection_at_end_of_content(&self) -> bool {
        self.0.current_content.last_block().is_some_and(|last| {
            self.0
                .selection
                .has_edge_within(last.key(), last.len(), last.len())
        })
    }
}

impl fmt::Debug for EditorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditorState")
            .field("current_content", &self.0.current_content)
            .field("selection", &self.0.selection)
            .field("has_decorator", &self.0.decorator.is_some())
            .field("direction_map", &self.0.direction_map)
            .field("force_selection", &self.0.force_selection)
            .field("in_composition_mode", &self.0.in_composition_mode)
            .field("inline_style_override", &self.0.inline_style_override)
            .field("last_change_type", &self.0.last_change_type)
            .finish_non_exhaustive()
    }
}

fn same_decorator(
    a: Option<&Arc<dyn Decorator>>,
    b: Option<&Arc<dyn Decorator>>,
) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => Arc::ptr_eq(a, b),
        (None, None) => true,
        _ => false,
    }
}

fn look_upward_for_inline_style(content: &ContentState, from_key: &str) -> StyleSet {
    content
        .blocks()
        .rev()
        .skip_while(|block| block.key() != from_key)
        .skip(1)
        .find(|block| !block.is_empty())
        .map(|block| block.inline_style_at(block.len() - 1))
        .unwrap_or_default()
}

fn generate_new_tree_map(
    content: &ContentState,
    decorator: Option<&dyn Decorator>,
) -> TreeMap {
    tracing::debug!(blocks = content.block_map().len(), "generating all block trees");
    Arc::new(
        content
            .blocks()
            .map(|block| {
                let tree = block_tree::generate(content, block, decorator);
                (block.key().to_owned(), tree)
            })
            .collect(),
    )
}

fn regenerate_tree_for_new_blocks(
    previous_content: &ContentState,
    previous_tree_map: &TreeMap,
    content: &ContentState,
    decorator: Option<&dyn Decorator>,
) -> TreeMap {
    let mut regenerated = 0;
    let tree_map: IndexMap<String, BlockTree> = content
        .blocks()
        .map(|block| {
            let key = block.key();
            let cached = previous_content
                .block_for_key(key)
                .filter(|previous| Arc::ptr_eq(previous, block))
                .and_then(|_| previous_tree_map.get(key));
            let tree = match cached {
                Some(tree) => tree.clone(),
                None => {
                    regenerated += 1;
                    block_tree::generate(content, block, decorator)
                }
            };
            (key.to_owned(), tree)
        })
        .collect();

    tracing::debug!(
        regenerated,
        blocks = tree_map.len(),
        "regenerated block trees for new content"
    );
    if regenerated == 0 && previous_tree_map.keys().eq(tree_map.keys()) {
        return previous_tree_map.clone();
    }
    Arc::new(tree_map)
}

fn regenerate_tree_for_new_decorator(
    content: &ContentState,
    previous_content: &ContentState,
    previous_tree_map: &TreeMap,
    decorator: &dyn Decorator,
    existing_decorator: &dyn Decorator,
) -> TreeMap {
    let mut regenerated = 0;
    let tree_map: IndexMap<String, BlockTree> = content
        .blocks()
        .map(|block| {
            let key = block.key();
            let decorations = decorator.decorations(block, content);
            let cached = previous_content
                .block_for_key(key)
                .filter(|previous| Arc::ptr_eq(previous, block))
                .and_then(|_| previous_tree_map.get(key))
                .filter(|_| {
                    let existing = existing_decorator.decorations(block, content);
                    Arc::ptr_eq(&decorations, &existing)
                });
            let tree = match cached {
                Some(tree) => tree.clone(),
                None => {
                    regenerated += 1;
                    block_tree::generate_with_decorations(
                        block,
                        Some(&decorations),
                    )
                }
            };
            (key.to_owned(), tree)
        })
        .collect();

    tracing::debug!(
        regenerated,
        blocks = tree_map.len(),
        "regenerated block trees for new decorator"
    );
    Arc::new(tree_map)
}

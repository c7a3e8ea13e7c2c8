// Copyright (c) 2026 Element Creations Ltd
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

//! Decorators mark runs of text for special rendering (links, hashtags,
//! mentions...) without changing the document itself.

use std::fmt;
use std::sync::Arc;

use regex::Regex;
use serde_json::Value;

use crate::{ContentBlock, ContentState};

/// Something that can label runs of a block's text.
pub trait Decorator: Send + Sync {
    /// One entry per UTF-16 code unit of `block`: the decoration key covering
    /// that unit, or `None`.
    ///
    /// Returning the same allocation for an unchanged block lets
    /// [`crate::EditorState`] keep the block's cached tree.
    fn decorations(
        &self,
        block: &ContentBlock,
        content: &ContentState,
    ) -> Arc<[Option<String>]>;

    /// The renderer component registered for a decoration key.
    fn component_for_key(&self, key: &str) -> Option<&str>;

    /// Extra props to hand to that component.
    fn props_for_key(&self, key: &str) -> Option<&Value>;
}

/// A strategy reports `(start, end)` UTF-16 ranges of `block` to decorate.
pub type DecoratorStrategy = Arc<
    dyn Fn(&ContentBlock, &mut dyn FnMut(usize, usize), &ContentState)
        + Send
        + Sync,
>;

#[derive(Clone)]
pub struct DecoratorEntry {
    pub strategy: DecoratorStrategy,
    pub component: String,
    pub props: Option<Value>,
}

impl DecoratorEntry {
    pub fn new(strategy: DecoratorStrategy, component: impl Into<String>) -> Self {
        Self {
            strategy,
            component: component.into(),
            props: None,
        }
    }

    pub fn with_props(mut self, props: Value) -> Self {
        self.props = Some(props);
        self
    }
}

impl fmt::Debug for DecoratorEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecoratorEntry")
            .field("component", &self.component)
            .field("props", &self.props)
            .finish_non_exhaustive()
    }
}

/// Runs a list of strategies in order. Where two strategies claim
/// overlapping text the one registered first wins, and the later range is
/// dropped entirely.
///
/// Keys have the form `"<entry index>.<occurrence>"`, e.g. `"1.0"` for the
/// first range found by the second entry.
#[derive(Clone, Debug, Default)]
pub struct CompositeDecorator {
    entries: Vec<DecoratorEntry>,
}

impl CompositeDecorator {
    pub fn new(entries: Vec<DecoratorEntry>) -> Self {
        Self { entries }
    }

    fn entry_for_key(&self, key: &str) -> Option<&DecoratorEntry> {
        let index = key.split('.').next()?.parse::<usize>().ok()?;
        self.entries.get(index)
    }
}

impl Decorator for CompositeDecorator {
    fn decorations(
        &self,
        block: &ContentBlock,
        content: &ContentState,
    ) -> Arc<[Option<String>]> {
        let mut decorations: Vec<Option<String>> = vec![None; block.len()];

        for (index, entry) in self.entries.iter().enumerate() {
            let mut occurrence = 0;
            let mut claim = |start: usize, end: usize| {
                let end = end.min(decorations.len());
                if start >= end {
                    return;
                }
                let slice = &mut decorations[start..end];
                if slice.iter().any(Option::is_some) {
                    return;
                }
                let key = format!("{index}.{occurrence}");
                slice.fill(Some(key));
                occurrence += 1;
            };
            (entry.strategy)(block, &mut claim, content);
        }

        decorations.into()
    }

    fn component_for_key(&self, key: &str) -> Option<&str> {
        self.entry_for_key(key).map(|entry| entry.component.as_str())
    }

    fn props_for_key(&self, key: &str) -> Option<&Value> {
        self.entry_for_key(key).and_then(|entry| entry.props.as_ref())
    }
}

/// Decorate every run of characters whose entity has type `entity_type`.
pub fn entity_strategy(entity_type: impl Into<String>) -> DecoratorStrategy {
    let entity_type = entity_type.into();
    Arc::new(
        move |block: &ContentBlock,
              found: &mut dyn FnMut(usize, usize),
              content: &ContentState| {
            let has_type = |key: &str| {
                content
                    .entity_map()
                    .get(key)
                    .is_some_and(|entity| entity.entity_type() == entity_type)
            };
            block.find_entity_ranges(
                |character| character.entity().is_some_and(&has_type),
                |start, end| found(start, end),
            );
        },
    )
}

/// Decorate every match of `pattern` in the block text.
pub fn regex_strategy(pattern: Regex) -> DecoratorStrategy {
    Arc::new(
        move |block: &ContentBlock,
              found: &mut dyn FnMut(usize, usize),
              _: &ContentState| {
            let text = block.text_string();
            let mut units_before = 0;
            let mut bytes_before = 0;
            for found_match in pattern.find_iter(&text) {
                units_before += text[bytes_before..found_match.start()]
                    .encode_utf16()
                    .count();
                let length = found_match.as_str().encode_utf16().count();
                found(units_before, units_before + length);
                units_before += length;
                bytes_before = found_match.end();
            }
        },
    )
}

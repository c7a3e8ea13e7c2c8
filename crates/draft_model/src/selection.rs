// Copyright (c) 2026 Element Creations Ltd
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

//! Selection management.
//!
//! A selection is an anchor point (where the user started selecting) and a
//! focus point (where they stopped), each a block key plus a UTF-16 offset
//! within that block. `is_backward` records whether the focus lies before the
//! anchor in document order; start/end are derived from it.

/// An immutable cursor or range selection.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct SelectionState {
    anchor_key: String,
    anchor_offset: usize,
    focus_key: String,
    focus_offset: usize,
    is_backward: bool,
    has_focus: bool,
}

impl SelectionState {
    /// A forward selection from the anchor point to the focus point.
    pub fn new(
        anchor_key: impl Into<String>,
        anchor_offset: usize,
        focus_key: impl Into<String>,
        focus_offset: usize,
    ) -> Self {
        Self {
            anchor_key: anchor_key.into(),
            anchor_offset,
            focus_key: focus_key.into(),
            focus_offset,
            is_backward: false,
            has_focus: false,
        }
    }

    /// A collapsed, unfocused cursor at the start of `key`.
    pub fn create_empty(key: impl Into<String>) -> Self {
        let key = key.into();
        Self::new(key.clone(), 0, key, 0)
    }

    pub fn anchor_key(&self) -> &str {
        &self.anchor_key
    }

    pub fn anchor_offset(&self) -> usize {
        self.anchor_offset
    }

    pub fn focus_key(&self) -> &str {
        &self.focus_key
    }

    pub fn focus_offset(&self) -> usize {
        self.focus_offset
    }

    pub fn is_backward(&self) -> bool {
        self.is_backward
    }

    pub fn has_focus(&self) -> bool {
        self.has_focus
    }

    /// Key of the earlier point in document order.
    pub fn start_key(&self) -> &str {
        if self.is_backward {
            &self.focus_key
        } else {
            &self.anchor_key
        }
    }

    pub fn start_offset(&self) -> usize {
        if self.is_backward {
            self.focus_offset
        } else {
            self.anchor_offset
        }
    }

    /// Key of the later point in document order.
    pub fn end_key(&self) -> &str {
        if self.is_backward {
            &self.anchor_key
        } else {
            &self.focus_key
        }
    }

    pub fn end_offset(&self) -> usize {
        if self.is_backward {
            self.anchor_offset
        } else {
            self.focus_offset
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor_key == self.focus_key
            && self.anchor_offset == self.focus_offset
    }

    /// Whether the start or the end of the selection falls inside
    /// `[start, end]` of block `block_key`.
    ///
    /// For a selection within one block both edges are tested. When the
    /// selection spans blocks, only the edge that lives in `block_key` is.
    pub fn has_edge_within(
        &self,
        block_key: &str,
        start: usize,
        end: usize,
    ) -> bool {
        let within = |offset: usize| start <= offset && offset <= end;

        if self.anchor_key == self.focus_key && self.anchor_key == block_key {
            return within(self.start_offset()) || within(self.end_offset());
        }

        if block_key != self.anchor_key && block_key != self.focus_key {
            return false;
        }

        let offset = if block_key == self.anchor_key {
            self.anchor_offset
        } else {
            self.focus_offset
        };
        within(offset)
    }

    pub fn with_anchor(&self, key: impl Into<String>, offset: usize) -> Self {
        Self {
            anchor_key: key.into(),
            anchor_offset: offset,
            ..self.clone()
        }
    }

    pub fn with_focus(&self, key: impl Into<String>, offset: usize) -> Self {
        Self {
            focus_key: key.into(),
            focus_offset: offset,
            ..self.clone()
        }
    }

    /// Move both points within their current blocks.
    pub fn with_offsets(&self, anchor_offset: usize, focus_offset: usize) -> Self {
        Self {
            anchor_offset,
            focus_offset,
            ..self.clone()
        }
    }

    pub fn with_is_backward(&self, is_backward: bool) -> Self {
        Self {
            is_backward,
            ..self.clone()
        }
    }

    pub fn with_has_focus(&self, has_focus: bool) -> Self {
        Self {
            has_focus,
            ..self.clone()
        }
    }

    /// A forward cursor at `(key, offset)`, keeping the focus flag.
    pub fn collapsed_at(&self, key: &str, offset: usize) -> Self {
        Self {
            anchor_key: key.to_owned(),
            anchor_offset: offset,
            focus_key: key.to_owned(),
            focus_offset: offset,
            is_backward: false,
            has_focus: self.has_focus,
        }
    }

    /// The same range expressed as a forward selection.
    pub fn to_forward(&self) -> Self {
        if !self.is_backward {
            return self.clone();
        }
        Self {
            anchor_key: self.focus_key.clone(),
            anchor_offset: self.focus_offset,
            focus_key: self.anchor_key.clone(),
            focus_offset: self.anchor_offset,
            is_backward: false,
            has_focus: self.has_focus,
        }
    }

    /// A compact human-readable form, e.g. `Anchor: a:0, Focus: b:3, ...`.
    pub fn serialize(&self) -> String {
        format!(
            "Anchor: {}:{}, Focus: {}:{}, Is Backward: {}, Has Focus: {}",
            self.anchor_key,
            self.anchor_offset,
            self.focus_key,
            self.focus_offset,
            self.is_backward,
            self.has_focus,
        )
    }
}

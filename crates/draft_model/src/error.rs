// Copyright (c) 2026 Element Creations Ltd
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

//! Error types.
//!
//! Every error in this crate is a *contract violation*: the caller passed a
//! selection, fragment or key that the operation's documented preconditions
//! forbid. Nothing is partially applied when an error is returned because all
//! document values are immutable.

use thiserror::Error;

/// A violated precondition of a transaction or query.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TransactionError {
    #[error("`{operation}` should only be called with a collapsed selection")]
    SelectionNotCollapsed { operation: &'static str },

    #[error("`insert_fragment` should not be called with an empty fragment")]
    EmptyFragment,

    #[error("block `{0}` does not exist in the block map")]
    BlockNotFound(String),

    #[error("entity `{0}` does not exist in the entity map")]
    EntityNotFound(String),

    #[error("expected exactly one range of entity `{0}` at the removal edge")]
    EntityRangeMismatch(String),
}

pub type Result<T, E = TransactionError> = std::result::Result<T, E>;

/// Failure while converting to or from the raw wire format.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Transaction(#[from] TransactionError),
}

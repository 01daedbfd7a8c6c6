// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;

use crate::context::ProcessContext;
use crate::errors::ProcessError;

/// Persists the difference between an entity's before and after state.
///
/// | `old`   | `new`   | meaning  |
/// |---------|---------|----------|
/// | `Some`  | `None`  | delete   |
/// | `None`  | `Some`  | create   |
/// | `Some`  | `Some`  | update   |
///
/// The engine never calls `save` with both sides `None`.
#[async_trait]
pub trait Repository<E>: Send + Sync {
    /// Returns the authoritative saved entity (e.g. with generated ids), or
    /// `None` when the result is intentionally discarded.
    async fn save(
        &self,
        ctx: &ProcessContext,
        old: Option<&E>,
        new: Option<&E>,
    ) -> Result<Option<E>, ProcessError>;
}

/// The `(old, new)` pair of a save call, classified.
#[derive(Debug, PartialEq)]
pub enum Change<'a, E> {
    Create(&'a E),
    Update { old: &'a E, new: &'a E },
    Delete(&'a E),
}

impl<E> Clone for Change<'_, E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> Copy for Change<'_, E> {}

impl<'a, E> Change<'a, E> {
    /// `None` only for the `(None, None)` pair.
    pub fn classify(old: Option<&'a E>, new: Option<&'a E>) -> Option<Self> {
        match (old, new) {
            (None, Some(new)) => Some(Change::Create(new)),
            (Some(old), Some(new)) => Some(Change::Update { old, new }),
            (Some(old), None) => Some(Change::Delete(old)),
            (None, None) => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Change::Create(_) => "create",
            Change::Update { .. } => "update",
            Change::Delete(_) => "delete",
        }
    }
}

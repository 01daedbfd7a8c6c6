// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for the save phase.

use std::fmt::{Display, Formatter};

use super::StructuredLog;

/// A child subtree is being cascaded into during save.
///
/// `change` is one of `create`, `update`, `delete`.
///
/// # Log Level
/// `debug!`
///
/// # Example
/// ```
/// use the_canopy::observability::messages::save::SaveCascade;
///
/// let msg = SaveCascade {
///     change: "delete",
///     entity_type: "LineItem",
///     type_key: "items",
///     entity_key: "1",
/// };
///
/// assert_eq!(msg.to_string(), "Cascading delete into 'LineItem' at items/1");
/// ```
pub struct SaveCascade<'a> {
    pub change: &'a str,
    pub entity_type: &'a str,
    pub type_key: &'a str,
    pub entity_key: &'a str,
}

impl Display for SaveCascade<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Cascading {} into '{}' at {}/{}",
            self.change, self.entity_type, self.type_key, self.entity_key
        )
    }
}

impl StructuredLog for SaveCascade<'_> {
    fn log(&self) {
        tracing::debug!(
            change = self.change,
            entity_type = self.entity_type,
            type_key = self.type_key,
            entity_key = self.entity_key,
            "{}", self
        );
    }
}

/// The repository accepted a change.
///
/// # Log Level
/// `debug!`
pub struct EntityPersisted<'a> {
    pub change: &'a str,
    pub entity_type: &'a str,
    pub returned: bool,
}

impl Display for EntityPersisted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Persisted {} of '{}' (returned entity: {})",
            self.change, self.entity_type, self.returned
        )
    }
}

impl StructuredLog for EntityPersisted<'_> {
    fn log(&self) {
        tracing::debug!(
            change = self.change,
            entity_type = self.entity_type,
            returned = self.returned,
            "{}", self
        );
    }
}

// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for processor registration and configuration loading.

use std::fmt::{Display, Formatter};

use super::StructuredLog;

/// A processor was registered for an entity type.
///
/// # Log Level
/// `debug!`
pub struct ProcessorRegistered<'a> {
    pub entity_type: &'a str,
    pub replaced: bool,
}

impl Display for ProcessorRegistered<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        if self.replaced {
            write!(f, "Replaced processor for '{}'", self.entity_type)
        } else {
            write!(f, "Registered processor for '{}'", self.entity_type)
        }
    }
}

impl StructuredLog for ProcessorRegistered<'_> {
    fn log(&self) {
        if self.replaced {
            tracing::warn!(entity_type = self.entity_type, "{}", self);
        } else {
            tracing::debug!(entity_type = self.entity_type, "{}", self);
        }
    }
}

/// A configuration file was loaded.
///
/// # Log Level
/// `info!`
///
/// # Example
/// ```
/// use the_canopy::observability::messages::registry::ConfigLoaded;
///
/// let msg = ConfigLoaded {
///     path: "configs/engine.yaml",
///     format: "yaml",
/// };
///
/// assert_eq!(msg.to_string(), "Loaded yaml configuration from 'configs/engine.yaml'");
/// ```
pub struct ConfigLoaded<'a> {
    pub path: &'a str,
    pub format: &'a str,
}

impl Display for ConfigLoaded<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Loaded {} configuration from '{}'", self.format, self.path)
    }
}

impl StructuredLog for ConfigLoaded<'_> {
    fn log(&self) {
        tracing::info!(path = self.path, format = self.format, "{}", self);
    }
}

// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! * `processor` - process lifecycle, per-level phase events, collaborator selection
//! * `save` - save-phase cascades and repository writes
//! * `registry` - processor registration and configuration loading

use std::fmt::Display;
use tracing::Span;

pub mod processor;
pub mod registry;
pub mod save;

/// A log message that knows its own level and structured fields.
pub trait StructuredLog: Display {
    /// Emit the event at the level documented on the message type.
    fn log(&self);

    /// Span carrying the message fields, for instrumenting a unit of work.
    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("canopy", span_name = name)
    }
}
